//! Pilot behavior state: the current order and the actions derived from it.
//!
//! The motivator runs once per tick per pilot. It looks at the order and makes
//! sure the action the order currently calls for sits on top of the stack,
//! replacing an equivalent top in place so a steady order never deepens the
//! stack.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::{Action, ActionOutcome, ActionStack, SimError, Ship, Uid, Vec2};

/// Samples drawn before a patrol point too close to the ship is accepted anyway.
pub const PATROL_SAMPLE_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Order {
    Idle,
    Patrol {
        center: Vec2,
        radius: f32,
    },
    AttackTarget {
        target: Uid,
        range: f32,
        friendly_fire: bool,
    },
    AttackAllEnemies {
        range: f32,
        acquire_radius: Option<f32>,
        friendly_fire: bool,
    },
}

/// Marsaglia xorshift, 32-bit. One per pilot, advanced in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    pub fn new(seed: u32) -> Self {
        // Zero is a fixed point of the generator.
        let state = if seed == 0 { 0x9E37_79B9 } else { seed };
        Self { state }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motive {
    pilot: Uid,
    order: Order,
    target: Option<Uid>,
    arrive_distance: f32,
    actions: ActionStack,
    roam_point: Option<Vec2>,
    rng: XorShift32,
}

impl Motive {
    pub fn new(pilot: Uid, seed: u32, arrive_distance: f32) -> Self {
        Self {
            pilot,
            order: Order::Idle,
            target: None,
            arrive_distance,
            actions: ActionStack::new(),
            roam_point: None,
            rng: XorShift32::new(seed),
        }
    }

    pub fn pilot(&self) -> Uid {
        self.pilot
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn target(&self) -> Option<Uid> {
        self.target
    }

    pub fn arrive_distance(&self) -> f32 {
        self.arrive_distance
    }

    pub fn actions(&self) -> &ActionStack {
        &self.actions
    }

    pub fn current_action(&self) -> Option<&Action> {
        self.actions.current()
    }

    pub fn roam_point(&self) -> Option<Vec2> {
        self.roam_point
    }

    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    /// Switch orders. Actions queued for the previous order are dropped.
    pub fn assign_order(&mut self, order: Order) {
        self.actions.clear();
        self.roam_point = None;
        self.target = match order {
            Order::AttackTarget { target, .. } => Some(target),
            _ => None,
        };
        self.order = order;
    }

    /// Reconcile the top of the stack with the current order.
    pub fn advance(&mut self, ship: &Ship) -> Result<(), SimError> {
        match self.order {
            Order::Idle => Ok(()),
            Order::Patrol { center, radius } => {
                self.ensure_patrol(ship.position, ship.stats.max_speed, center, radius)
            }
            Order::AttackTarget {
                target,
                range,
                friendly_fire,
            } => self.ensure_attack(target, range, friendly_fire),
            Order::AttackAllEnemies {
                range,
                acquire_radius,
                friendly_fire,
            } => match self.target {
                Some(target) => self.ensure_attack(target, range, friendly_fire),
                None => self.ensure_acquire(acquire_radius, friendly_fire),
            },
        }
    }

    /// Keep a `Move` toward the current roam point on top, sampling a new point
    /// when there is none or the ship has reached it.
    pub fn ensure_patrol(
        &mut self,
        origin: Vec2,
        speed: f32,
        center: Vec2,
        radius: f32,
    ) -> Result<(), SimError> {
        let destination = match self.roam_point {
            Some(point) if origin.distance(point) > self.arrive_distance => point,
            _ => {
                let point = self.sample_patrol_point(origin, center, radius);
                self.roam_point = Some(point);
                point
            }
        };
        let action = Action::Move {
            destination,
            speed,
            arrive_distance: self.arrive_distance,
        };
        if matches!(self.actions.current(), Some(Action::Move { .. })) {
            self.actions.replace_current(action);
            Ok(())
        } else {
            self.actions.ensure(action)
        }
    }

    pub fn ensure_attack(
        &mut self,
        target: Uid,
        range: f32,
        friendly_fire: bool,
    ) -> Result<(), SimError> {
        let action = Action::Attack {
            target,
            range,
            friendly_fire,
        };
        if matches!(self.actions.current(), Some(Action::Acquire { .. })) {
            self.actions.replace_current(action);
            Ok(())
        } else {
            self.actions.ensure(action)
        }
    }

    pub fn ensure_acquire(
        &mut self,
        radius: Option<f32>,
        friendly_fire: bool,
    ) -> Result<(), SimError> {
        let action = Action::Acquire {
            radius,
            friendly_fire,
        };
        if matches!(self.actions.current(), Some(Action::Attack { .. })) {
            self.actions.replace_current(action);
            Ok(())
        } else {
            self.actions.ensure(action)
        }
    }

    pub fn complete_current_action(&mut self) -> Option<Action> {
        self.actions.pop()
    }

    /// Fold a behavior's completion signal back into the motive.
    pub fn apply_outcome(&mut self, outcome: ActionOutcome) {
        match outcome {
            ActionOutcome::InProgress => {}
            ActionOutcome::Completed => {
                self.complete_current_action();
            }
            ActionOutcome::TargetAcquired(target) => {
                self.target = Some(target);
                self.complete_current_action();
            }
            ActionOutcome::TargetLost => self.on_target_lost(),
        }
    }

    fn on_target_lost(&mut self) {
        self.target = None;
        self.complete_current_action();
        if matches!(self.order, Order::AttackTarget { .. }) {
            self.assign_order(Order::Idle);
        }
    }

    fn sample_patrol_point(&mut self, origin: Vec2, center: Vec2, radius: f32) -> Vec2 {
        let radius = radius.max(0.0);
        let min_hop = self.arrive_distance * 2.0;
        let mut candidate = center;
        for _ in 0..PATROL_SAMPLE_ATTEMPTS {
            let angle = self.rng.next_f32() * TAU;
            let distance = radius * self.rng.next_f32().sqrt();
            candidate = center + Vec2::from_angle(angle) * distance;
            if candidate.distance(origin) > min_hop {
                break;
            }
        }
        candidate
    }
}
