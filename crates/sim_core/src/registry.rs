//! Ship slot arrays and pilot motives.
//!
//! Each star system owns a dense `Vec<Ship>`. Removal is swap-with-last, so a
//! slot index is only meaningful until the next removal in that system; the
//! ownership map is the authority for where a UID lives right now.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::{Motive, SimError, Ship, SystemId, Uid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipLocation {
    pub system: SystemId,
    pub slot: usize,
}

pub type ShipLocations = AHashMap<Uid, ShipLocation>;

#[derive(Debug, Clone, Default)]
pub struct ShipRegistry {
    systems: Vec<Vec<Ship>>,
    locations: ShipLocations,
}

impl ShipRegistry {
    pub fn new(system_count: usize) -> Self {
        Self {
            systems: vec![Vec::new(); system_count],
            locations: AHashMap::new(),
        }
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Live slots in `system`. Zero for an unknown system.
    pub fn live_count(&self, system: SystemId) -> usize {
        self.systems.get(system.index()).map_or(0, Vec::len)
    }

    pub fn total_count(&self) -> usize {
        self.locations.len()
    }

    pub fn slots(&self, system: SystemId) -> &[Ship] {
        self.systems
            .get(system.index())
            .map_or(&[][..], Vec::as_slice)
    }

    pub fn locate(&self, uid: Uid) -> Option<ShipLocation> {
        self.locations.get(&uid).copied()
    }

    pub fn locations(&self) -> &ShipLocations {
        &self.locations
    }

    pub fn get(&self, uid: Uid) -> Option<&Ship> {
        let loc = self.locate(uid)?;
        self.systems.get(loc.system.index())?.get(loc.slot)
    }

    pub fn get_mut(&mut self, uid: Uid) -> Option<&mut Ship> {
        let loc = self.locate(uid)?;
        self.systems.get_mut(loc.system.index())?.get_mut(loc.slot)
    }

    /// Mutable slot array of one system alongside the (read-only) ownership map.
    pub fn split_system_mut(&mut self, system: SystemId) -> Option<(&mut [Ship], &ShipLocations)> {
        let slots = self.systems.get_mut(system.index())?;
        Some((slots.as_mut_slice(), &self.locations))
    }

    /// Append `ship` to `system`, returning its slot.
    pub fn add(&mut self, system: SystemId, ship: Ship) -> Result<usize, SimError> {
        if self.locations.contains_key(&ship.uid) {
            return Err(SimError::DuplicateShip(ship.uid));
        }
        let slots = self
            .systems
            .get_mut(system.index())
            .ok_or(SimError::UnknownSystem(system))?;
        let slot = slots.len();
        self.locations.insert(ship.uid, ShipLocation { system, slot });
        slots.push(ship);
        Ok(slot)
    }

    /// Swap-remove `uid` from its system, fixing up the ship moved into its slot.
    pub fn remove(&mut self, uid: Uid) -> Option<Ship> {
        let loc = self.locations.remove(&uid)?;
        let slots = &mut self.systems[loc.system.index()];
        let removed = slots.swap_remove(loc.slot);
        if let Some(moved) = slots.get(loc.slot) {
            self.locations.insert(moved.uid, loc);
        }
        Some(removed)
    }

    /// Transfer a ship into another system's slot array.
    pub fn move_to_system(&mut self, uid: Uid, to: SystemId) -> Result<usize, SimError> {
        if to.index() >= self.systems.len() {
            return Err(SimError::UnknownSystem(to));
        }
        let ship = self.remove(uid).ok_or(SimError::UnknownShip(uid))?;
        self.add(to, ship)
    }

    /// Swap-remove every inactive ship in every system.
    pub fn reap_inactive(&mut self) -> Vec<(SystemId, Ship)> {
        let mut reaped = Vec::new();
        for index in 0..self.systems.len() {
            let system = SystemId(index as u32);
            let mut slot = 0;
            while slot < self.systems[index].len() {
                if self.systems[index][slot].active {
                    slot += 1;
                    continue;
                }
                let uid = self.systems[index][slot].uid;
                if let Some(ship) = self.remove(uid) {
                    reaped.push((system, ship));
                }
            }
        }
        reaped
    }

    pub fn iter(&self) -> impl Iterator<Item = (SystemId, &Ship)> {
        self.systems.iter().enumerate().flat_map(|(index, slots)| {
            slots.iter().map(move |ship| (SystemId(index as u32), ship))
        })
    }

    /// True when every slot is indexed by the ownership map and vice versa.
    pub fn is_consistent(&self) -> bool {
        let slot_total: usize = self.systems.iter().map(Vec::len).sum();
        slot_total == self.locations.len()
            && self.systems.iter().enumerate().all(|(index, slots)| {
                slots.iter().enumerate().all(|(slot, ship)| {
                    self.locations.get(&ship.uid)
                        == Some(&ShipLocation {
                            system: SystemId(index as u32),
                            slot,
                        })
                })
            })
    }
}

/// Pilot UID -> motive.
#[derive(Debug, Clone, Default)]
pub struct PilotRegistry {
    motives: AHashMap<Uid, Motive>,
}

impl PilotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, motive: Motive) {
        self.motives.insert(motive.pilot(), motive);
    }

    pub fn unregister(&mut self, pilot: Uid) -> Option<Motive> {
        self.motives.remove(&pilot)
    }

    pub fn get(&self, pilot: Uid) -> Option<&Motive> {
        self.motives.get(&pilot)
    }

    pub fn get_mut(&mut self, pilot: Uid) -> Option<&mut Motive> {
        self.motives.get_mut(&pilot)
    }

    pub fn contains(&self, pilot: Uid) -> bool {
        self.motives.contains_key(&pilot)
    }

    pub fn len(&self) -> usize {
        self.motives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motives.is_empty()
    }
}
