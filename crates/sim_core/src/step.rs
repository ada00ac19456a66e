use tracing::warn;

use crate::behavior::{execute_action, BehaviorContext};
use crate::{
    CombatEvent, HostilityTable, PilotRegistry, ShipRegistry, SubstepTrace, SystemId, Vec2,
    WorldContext,
};

/// Animate every active, piloted ship in every system for one tick.
///
/// Per ship: advance the motive, run the top action through the behavior
/// table, fold the outcome back into the motive. Ships whose pilot has no
/// registered motive are left alone. Returns the combat events produced.
pub fn update_systems(world: &mut WorldContext, dt: f32) -> Vec<CombatEvent> {
    let tick = world.tick_index();
    let observed = world.observed_system();
    let WorldContext {
        ships,
        pilots,
        hostility,
        trace,
        ..
    } = world;

    let mut events = Vec::new();
    for index in 0..ships.system_count() {
        let system = SystemId(index as u32);
        let system_trace = (observed == Some(system)).then_some(&mut *trace);
        update_system(
            SystemPass {
                tick,
                system,
                dt,
                hostility: &*hostility,
            },
            ships,
            pilots,
            system_trace,
            &mut events,
        );
    }
    events
}

#[derive(Clone, Copy)]
struct SystemPass<'a> {
    tick: u64,
    system: SystemId,
    dt: f32,
    hostility: &'a HostilityTable,
}

fn update_system(
    pass: SystemPass<'_>,
    ships: &mut ShipRegistry,
    pilots: &mut PilotRegistry,
    mut trace: Option<&mut SubstepTrace>,
    events: &mut Vec<CombatEvent>,
) {
    let Some((slots, locations)) = ships.split_system_mut(pass.system) else {
        return;
    };

    // Destroyed ships keep their slots until the reap pass, so indices stay
    // valid for the whole loop.
    for slot in 0..slots.len() {
        if !slots[slot].active {
            continue;
        }
        let Some(motive) = pilots.get_mut(slots[slot].pilot) else {
            continue;
        };
        if let Err(err) = motive.advance(&slots[slot]) {
            warn!(ship = %slots[slot].uid, %err, "motive could not plan; ship skipped this tick");
            continue;
        }
        let Some(action) = motive.current_action().copied() else {
            slots[slot].velocity = Vec2::ZERO;
            continue;
        };

        let mut ctx = BehaviorContext {
            tick: pass.tick,
            system: pass.system,
            slots: &mut *slots,
            slot,
            locations,
            hostility: pass.hostility,
            dt: pass.dt,
            events: &mut *events,
            trace: trace.as_deref_mut(),
        };
        let outcome = execute_action(&action, &mut ctx);
        motive.apply_outcome(outcome);
    }
}
