use super::*;
use crate::test_fixtures::{base_world, ship_at, spawn_request, template, weapon};

mod engine;
mod motive;

// --- Shared test helpers ------------------------------------------------

fn patrol_at_origin(radius: f32) -> Order {
    Order::Patrol {
        center: Vec2::ZERO,
        radius,
    }
}

fn hunter_order() -> Order {
    Order::AttackAllEnemies {
        range: 5.0,
        acquire_radius: None,
        friendly_fire: false,
    }
}

/// Unarmed ship with speed 5 and instant turning.
fn spawn_unarmed(world: &mut WorldContext, faction: u16, position: Vec2, order: Order) -> Uid {
    world
        .spawn_ship(
            &template(5.0, vec![]),
            spawn_request(0, faction, position, order),
        )
        .unwrap()
}

/// One gun: range 5, one shot per tick, 10 damage.
fn spawn_gunship(world: &mut WorldContext, faction: u16, position: Vec2, order: Order) -> Uid {
    world
        .spawn_ship(
            &template(5.0, vec![weapon(5.0, 1.0, 10.0)]),
            spawn_request(0, faction, position, order),
        )
        .unwrap()
}

fn pilot_of(world: &WorldContext, ship: Uid) -> Uid {
    world.ship(ship).unwrap().pilot
}
