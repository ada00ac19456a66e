//! Shared test fixtures for sim_core and downstream crates.
//!
//! `base_content()` is a two-system, two-faction world with no roster, so tests
//! place ships by hand. `fleet_content()` adds a hostile roster on both sides.

use crate::{
    BulletDescriptor, Constants, EntityKind, FactionDef, FactionId, InitialOrder, Order,
    RosterRule, Ship, ShipStats, ShipTemplate, SpawnRequest, StarSystemDef, SystemId, Uid, Vec2,
    Weapon, WeaponSlots, WorldContent, WorldContext,
};

/// A faction-0 ship at `position` with 100 hp, speed 5, agility 1, unarmed.
/// Its pilot uid shares the ship's counter.
pub fn ship_at(counter: u64, position: Vec2) -> Ship {
    Ship {
        uid: Uid::new(EntityKind::Ship, counter),
        faction: FactionId(0),
        pilot: Uid::new(EntityKind::Pilot, counter),
        position,
        orientation: 0.0,
        velocity: Vec2::ZERO,
        stats: ShipStats {
            hp: 100.0,
            max_hp: 100.0,
            max_speed: 5.0,
            agility: 1.0,
        },
        weapons: WeaponSlots::new(),
        active: true,
    }
}

pub fn weapon(range: f32, rate: f32, damage_per_shot: f32) -> Weapon {
    Weapon {
        range,
        rate,
        damage_per_shot,
        shots_accumulator: 0.0,
        bullet: BulletDescriptor {
            speed: 40.0,
            size: 0.5,
            color: 0xFFAA_33FF,
        },
    }
}

pub fn template(max_speed: f32, weapons: Vec<Weapon>) -> ShipTemplate {
    ShipTemplate {
        stats: ShipStats {
            hp: 100.0,
            max_hp: 100.0,
            max_speed,
            agility: 0.0,
        },
        weapons,
    }
}

pub fn base_constants() -> Constants {
    Constants {
        logic_step_seconds: 1.0,
        arrive_distance: 0.2,
        attack_range: 5.0,
        acquire_radius: None,
        spawn_radius: 20.0,
    }
}

pub fn base_content() -> WorldContent {
    WorldContent {
        content_version: "test".to_string(),
        systems: vec![
            StarSystemDef {
                id: SystemId(0),
                name: "Test Prime".to_string(),
                position: Vec2::ZERO,
                planets: vec![],
            },
            StarSystemDef {
                id: SystemId(1),
                name: "Test Secundus".to_string(),
                position: Vec2::new(100.0, 0.0),
                planets: vec![],
            },
        ],
        factions: vec![
            FactionDef {
                id: FactionId(0),
                name: "Blue".to_string(),
            },
            FactionDef {
                id: FactionId(1),
                name: "Red".to_string(),
            },
        ],
        hostility_overrides: vec![],
        roster: vec![],
        constants: base_constants(),
    }
}

/// Two hostile factions, `per_side` armed hunters each, in every system.
pub fn fleet_content(per_side: u32) -> WorldContent {
    let mut content = base_content();
    content.roster = [FactionId(0), FactionId(1)]
        .into_iter()
        .map(|faction| RosterRule {
            faction,
            ships_per_system: per_side,
            template: template(5.0, vec![weapon(5.0, 1.0, 10.0)]),
            order: InitialOrder::AttackAllEnemies,
        })
        .collect();
    content
}

pub fn base_world(seed: u64) -> WorldContext {
    WorldContext::new(&base_content(), seed)
}

pub fn spawn_request(system: u32, faction: u16, position: Vec2, order: Order) -> SpawnRequest {
    SpawnRequest {
        system: SystemId(system),
        faction: FactionId(faction),
        position,
        orientation: 0.0,
        order,
        rng_seed: 0x00C0_FFEE,
    }
}
