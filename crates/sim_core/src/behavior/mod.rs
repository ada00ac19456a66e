//! Action behaviors and the table that dispatches to them.
//!
//! Each [`ActionKind`] maps to exactly one [`ActionBehavior`]. Behaviors get
//! the acting system's slot array and the acting slot index; they mutate ships
//! only through that slice and report completion as an [`ActionOutcome`].

pub mod combat;
pub mod movement;
pub mod targeting;

use crate::{
    Action, ActionKind, ActionOutcome, CombatEvent, HostilityTable, Ship, ShipLocations,
    SubstepTrace, SystemId, Vec2,
};

use movement::{steer_toward, MoveRequest, MoveStatus};

pub struct BehaviorContext<'a> {
    pub tick: u64,
    pub system: SystemId,
    pub slots: &'a mut [Ship],
    pub slot: usize,
    pub locations: &'a ShipLocations,
    pub hostility: &'a HostilityTable,
    pub dt: f32,
    pub events: &'a mut Vec<CombatEvent>,
    pub trace: Option<&'a mut SubstepTrace>,
}

pub trait ActionBehavior: Sync {
    fn kind(&self) -> ActionKind;

    fn execute(&self, action: &Action, ctx: &mut BehaviorContext<'_>) -> ActionOutcome;
}

pub struct MoveBehavior;
pub struct AttackBehavior;
pub struct AcquireBehavior;

/// Indexed by [`ActionKind::index`].
static BEHAVIORS: [&dyn ActionBehavior; ActionKind::COUNT] =
    [&MoveBehavior, &AttackBehavior, &AcquireBehavior];

pub fn behavior_for(kind: ActionKind) -> &'static dyn ActionBehavior {
    BEHAVIORS[kind.index()]
}

pub fn execute_action(action: &Action, ctx: &mut BehaviorContext<'_>) -> ActionOutcome {
    behavior_for(action.kind()).execute(action, ctx)
}

impl ActionBehavior for MoveBehavior {
    fn kind(&self) -> ActionKind {
        ActionKind::Move
    }

    fn execute(&self, action: &Action, ctx: &mut BehaviorContext<'_>) -> ActionOutcome {
        let Action::Move {
            destination,
            speed,
            arrive_distance,
        } = *action
        else {
            return ActionOutcome::InProgress;
        };
        let request = MoveRequest {
            destination,
            speed,
            arrive_distance,
        };
        let ship = &mut ctx.slots[ctx.slot];
        match steer_toward(ship, request, ctx.dt, ctx.trace.as_deref_mut()) {
            MoveStatus::Arrived => ActionOutcome::Completed,
            MoveStatus::Moving => ActionOutcome::InProgress,
        }
    }
}

impl ActionBehavior for AttackBehavior {
    fn kind(&self) -> ActionKind {
        ActionKind::Attack
    }

    fn execute(&self, action: &Action, ctx: &mut BehaviorContext<'_>) -> ActionOutcome {
        let Action::Attack {
            target,
            range,
            friendly_fire,
        } = *action
        else {
            return ActionOutcome::InProgress;
        };

        let Some(location) = ctx.locations.get(&target) else {
            return ActionOutcome::TargetLost;
        };
        if location.system != ctx.system
            || location.slot == ctx.slot
            || location.slot >= ctx.slots.len()
        {
            return ActionOutcome::TargetLost;
        }

        let (attacker, victim) = pair_mut(ctx.slots, ctx.slot, location.slot);
        if victim.uid != target
            || !targeting::is_valid_target(attacker, victim, ctx.hostility, friendly_fire)
        {
            return ActionOutcome::TargetLost;
        }

        let offset = victim.position - attacker.position;
        if offset.length() > range {
            let request = MoveRequest {
                destination: victim.position,
                speed: attacker.stats.max_speed,
                arrive_distance: range,
            };
            steer_toward(attacker, request, ctx.dt, ctx.trace.as_deref_mut());
        } else {
            attacker.velocity = Vec2::ZERO;
            if offset.length_squared() > f32::EPSILON {
                attacker.orientation = offset.angle();
            }
        }

        if combat::fire_weapons(attacker, victim, ctx.tick, ctx.system, ctx.events) {
            ActionOutcome::TargetLost
        } else {
            ActionOutcome::InProgress
        }
    }
}

impl ActionBehavior for AcquireBehavior {
    fn kind(&self) -> ActionKind {
        ActionKind::Acquire
    }

    fn execute(&self, action: &Action, ctx: &mut BehaviorContext<'_>) -> ActionOutcome {
        let Action::Acquire {
            radius,
            friendly_fire,
        } = *action
        else {
            return ActionOutcome::InProgress;
        };
        ctx.slots[ctx.slot].velocity = Vec2::ZERO;
        match targeting::find_nearest_target(
            ctx.slots,
            ctx.slot,
            ctx.hostility,
            radius,
            friendly_fire,
        ) {
            Some(slot) => ActionOutcome::TargetAcquired(ctx.slots[slot].uid),
            None => ActionOutcome::InProgress,
        }
    }
}

/// Two distinct mutable slots from one array.
fn pair_mut(slots: &mut [Ship], a: usize, b: usize) -> (&mut Ship, &mut Ship) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = slots.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = slots.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
