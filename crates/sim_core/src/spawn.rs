use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::world::SpawnRequest;
use crate::{InitialOrder, Order, RosterRule, SimError, SystemId, Uid, Vec2, WorldContext};

/// Place every roster rule's ships in every system. Returns the number spawned.
///
/// Each system draws from its own generator seeded from the world seed, so a
/// system's layout does not depend on how many systems precede it. On error
/// every ship spawned by this call is removed again.
pub(crate) fn populate_initial_roster(world: &mut WorldContext) -> Result<usize, SimError> {
    let mut spawned = Vec::new();
    match spawn_roster(world, &mut spawned) {
        Ok(()) => Ok(spawned.len()),
        Err(err) => {
            for uid in spawned {
                world.remove_ship(uid);
            }
            Err(err)
        }
    }
}

fn spawn_roster(world: &mut WorldContext, spawned: &mut Vec<Uid>) -> Result<(), SimError> {
    let roster = world.roster.clone();
    let spawn_radius = world.constants.spawn_radius.max(0.0);

    for index in 0..world.systems.len() {
        let system = SystemId(index as u32);
        let mut rng = ChaCha8Rng::seed_from_u64(system_seed(world.seed(), system));

        for rule in &roster {
            for _ in 0..rule.ships_per_system {
                let angle = rng.gen_range(0.0..TAU);
                let distance = spawn_radius * rng.gen::<f32>().sqrt();
                let position = Vec2::from_angle(angle) * distance;
                let request = SpawnRequest {
                    system,
                    faction: rule.faction,
                    position,
                    orientation: rng.gen_range(0.0..TAU),
                    order: initial_order(world, rule, position),
                    rng_seed: rng.gen(),
                };
                spawned.push(world.spawn_ship(&rule.template, request)?);
            }
        }
    }
    Ok(())
}

fn system_seed(world_seed: u64, system: SystemId) -> u64 {
    world_seed ^ u64::from(system.0).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn initial_order(world: &WorldContext, rule: &RosterRule, spawn_point: Vec2) -> Order {
    match rule.order {
        InitialOrder::Idle => Order::Idle,
        InitialOrder::Patrol { radius } => Order::Patrol {
            center: spawn_point,
            radius,
        },
        InitialOrder::AttackAllEnemies => Order::AttackAllEnemies {
            range: engagement_range(world.constants.attack_range, rule),
            acquire_radius: world.constants.acquire_radius,
            friendly_fire: false,
        },
    }
}

/// Close to the reach of the shortest gun so every slot can fire, never
/// further out than the configured attack range.
fn engagement_range(attack_range: f32, rule: &RosterRule) -> f32 {
    rule.template
        .weapons
        .iter()
        .map(|w| w.range)
        .fold(attack_range, f32::min)
}
