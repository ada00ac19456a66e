use tracing::{info, trace};

use crate::spawn::populate_initial_roster;
use crate::step::update_systems;
use crate::{ShipFrame, ShipSample, SimError, TickOutput, WorldContext};

/// Advance the world by one tick.
///
/// Order of operations:
/// 1. Spawn the initial roster (first call only).
/// 2. Reset the substep trace for the observed system.
/// 3. Run the step updater over every system.
/// 4. Reap ships destroyed this tick.
/// 5. Increment the tick counter and capture the ship frame.
///
/// `dynamic_data_changed` is false when the frame equals the previous tick's
/// and the tick fired nothing and traced nothing.
pub fn tick(world: &mut WorldContext) -> Result<TickOutput, SimError> {
    if !world.is_spawned() {
        let spawned = populate_initial_roster(world)?;
        world.mark_spawned();
        info!(ships = spawned, systems = world.systems.len(), "initial roster spawned");
    }

    let dt = world.constants.logic_step_seconds;
    let observed = world.observed_system();
    let trace_version = world.trace.version;
    world.trace.begin_tick(observed);
    let events = update_systems(world, dt);
    world.trace.end_tick();

    let reaped = world.reap_destroyed();
    world.advance_tick();
    trace!(
        tick = world.tick_index(),
        events = events.len(),
        reaped = reaped.len(),
        "tick complete"
    );

    let frame = capture_frame(world);
    let dynamic_data_changed = world.remember_frame(&frame.ships)
        || !events.is_empty()
        || world.trace.version != trace_version;

    Ok(TickOutput {
        tick: world.tick_index(),
        frame,
        events,
        trace: world.trace.clone(),
        dynamic_data_changed,
    })
}

/// Copy every live ship into a frame, in system then slot order.
pub fn capture_frame(world: &WorldContext) -> ShipFrame {
    let ships = world
        .ships
        .iter()
        .map(|(system, ship)| ShipSample {
            uid: ship.uid,
            system,
            faction: ship.faction,
            position: ship.position,
            velocity: ship.velocity,
            orientation: ship.orientation,
            hp: ship.stats.hp,
            max_hp: ship.stats.max_hp,
            active: ship.active,
        })
        .collect();
    ShipFrame {
        tick: world.tick_index(),
        ships,
    }
}
