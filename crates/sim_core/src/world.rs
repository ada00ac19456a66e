//! The explicit world context.
//!
//! Everything that would otherwise be process-global (uid counters, the
//! hostility table, registries) lives here, so several worlds can run side by
//! side and tests never share state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Constants, EntityKind, FactionId, HostilityTable, Motive, Order, PilotRegistry, RosterRule,
    Ship, ShipRegistry, ShipSample, ShipStats, ShipTemplate, SimError, StarSystemDef,
    SubstepTrace, SystemId, Uid, UidAllocator, Vec2, WeaponSlots, WorldContent, MAX_WEAPON_SLOTS,
};

/// Placement and behavior for one new ship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub system: SystemId,
    pub faction: FactionId,
    pub position: Vec2,
    pub orientation: f32,
    pub order: Order,
    /// Seed for the pilot's private patrol generator.
    pub rng_seed: u32,
}

#[derive(Debug, Clone)]
pub struct WorldContext {
    /// Static world array. A system's id is its index here.
    pub systems: Arc<[StarSystemDef]>,
    pub constants: Constants,
    pub roster: Vec<RosterRule>,
    pub uids: UidAllocator,
    pub hostility: HostilityTable,
    pub ships: ShipRegistry,
    pub pilots: PilotRegistry,
    pub trace: SubstepTrace,
    observed_system: Option<SystemId>,
    /// Ships as published by the previous tick.
    last_frame: Vec<ShipSample>,
    seed: u64,
    tick: u64,
    spawned: bool,
}

impl WorldContext {
    pub fn new(content: &WorldContent, seed: u64) -> Self {
        let faction_count = content
            .factions
            .iter()
            .map(|f| f.id.index() + 1)
            .max()
            .unwrap_or(0);
        let mut hostility = HostilityTable::new(faction_count);
        for o in &content.hostility_overrides {
            hostility.set(o.a, o.b, o.hostile, o.mirror);
        }
        let systems: Arc<[StarSystemDef]> = content.systems.clone().into();
        Self {
            ships: ShipRegistry::new(systems.len()),
            systems,
            constants: content.constants.clone(),
            roster: content.roster.clone(),
            uids: UidAllocator::new(),
            hostility,
            pilots: PilotRegistry::new(),
            trace: SubstepTrace::default(),
            observed_system: None,
            last_frame: Vec::new(),
            seed,
            tick: 0,
            spawned: false,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks completed so far.
    pub fn tick_index(&self) -> u64 {
        self.tick
    }

    pub(crate) fn advance_tick(&mut self) {
        self.tick += 1;
    }

    pub fn is_spawned(&self) -> bool {
        self.spawned
    }

    pub(crate) fn mark_spawned(&mut self) {
        self.spawned = true;
    }

    /// Keep `ships` as the latest published frame. Returns true when it differs
    /// from the one before.
    pub(crate) fn remember_frame(&mut self, ships: &[ShipSample]) -> bool {
        if self.last_frame.as_slice() == ships {
            return false;
        }
        self.last_frame = ships.to_vec();
        true
    }

    pub fn observed_system(&self) -> Option<SystemId> {
        self.observed_system
    }

    /// Only the observed system records substep traces.
    pub fn set_observed_system(&mut self, system: Option<SystemId>) -> Result<(), SimError> {
        if let Some(id) = system {
            if id.index() >= self.systems.len() {
                return Err(SimError::UnknownSystem(id));
            }
        }
        self.observed_system = system;
        Ok(())
    }

    pub fn set_hostility(&mut self, a: FactionId, b: FactionId, hostile: bool, mirror: bool) {
        self.hostility.set(a, b, hostile, mirror);
    }

    /// Create a ship and its pilot motive together. Returns the ship UID.
    pub fn spawn_ship(
        &mut self,
        template: &ShipTemplate,
        request: SpawnRequest,
    ) -> Result<Uid, SimError> {
        if request.system.index() >= self.systems.len() {
            return Err(SimError::UnknownSystem(request.system));
        }
        if template.weapons.len() > MAX_WEAPON_SLOTS {
            return Err(SimError::TooManyWeapons(template.weapons.len()));
        }
        let uid = self.uids.allocate(EntityKind::Ship);
        let pilot = self.uids.allocate(EntityKind::Pilot);
        let ship = Ship {
            uid,
            faction: request.faction,
            pilot,
            position: request.position,
            orientation: request.orientation,
            velocity: Vec2::ZERO,
            stats: ShipStats {
                hp: template.stats.hp.min(template.stats.max_hp),
                ..template.stats
            },
            weapons: template.weapons.iter().cloned().collect::<WeaponSlots>(),
            active: true,
        };
        self.ships.add(request.system, ship)?;

        let mut motive = Motive::new(pilot, request.rng_seed, self.constants.arrive_distance);
        motive.assign_order(request.order);
        self.pilots.register(motive);
        debug!(%uid, %pilot, system = %request.system, "ship spawned");
        Ok(uid)
    }

    pub fn assign_order(&mut self, pilot: Uid, order: Order) -> Result<(), SimError> {
        let motive = self
            .pilots
            .get_mut(pilot)
            .ok_or(SimError::UnknownPilot(pilot))?;
        motive.assign_order(order);
        Ok(())
    }

    /// Remove a ship from its slot and discard its pilot's motive.
    pub fn remove_ship(&mut self, uid: Uid) -> Option<Ship> {
        let ship = self.ships.remove(uid)?;
        self.pilots.unregister(ship.pilot);
        Some(ship)
    }

    /// Swap-remove every destroyed ship and unregister its pilot.
    pub fn reap_destroyed(&mut self) -> Vec<(SystemId, Ship)> {
        let reaped = self.ships.reap_inactive();
        for (system, ship) in &reaped {
            self.pilots.unregister(ship.pilot);
            debug!(uid = %ship.uid, %system, "destroyed ship reaped");
        }
        reaped
    }

    pub fn motive(&self, pilot: Uid) -> Option<&Motive> {
        self.pilots.get(pilot)
    }

    pub fn ship(&self, uid: Uid) -> Option<&Ship> {
        self.ships.get(uid)
    }
}
