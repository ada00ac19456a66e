//! Concrete actions and the per-pilot action stack.
//!
//! The top of the stack is the action the pilot is currently executing. The
//! motivator reconciles it once per tick; the step updater pops it when the
//! behavior reports completion.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{SimError, Uid, Vec2};

/// Tolerance for treating two actions as the same action.
pub const ACTION_EPSILON: f32 = 1e-3;

/// Hard ceiling on stack depth. Reaching it is reported, never truncated.
pub const MAX_ACTION_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Move {
        destination: Vec2,
        speed: f32,
        arrive_distance: f32,
    },
    Attack {
        target: Uid,
        range: f32,
        friendly_fire: bool,
    },
    Acquire {
        radius: Option<f32>,
        friendly_fire: bool,
    },
}

/// Discriminant of [`Action`], used to index the behavior table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Move = 0,
    Attack = 1,
    Acquire = 2,
}

impl ActionKind {
    pub const COUNT: usize = 3;

    pub fn index(self) -> usize {
        self as usize
    }
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() <= ACTION_EPSILON
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Move { .. } => ActionKind::Move,
            Action::Attack { .. } => ActionKind::Attack,
            Action::Acquire { .. } => ActionKind::Acquire,
        }
    }

    /// Same kind and same parameters within [`ACTION_EPSILON`].
    pub fn is_equivalent(&self, other: &Action) -> bool {
        match (self, other) {
            (
                Action::Move {
                    destination: d1,
                    speed: s1,
                    arrive_distance: a1,
                },
                Action::Move {
                    destination: d2,
                    speed: s2,
                    arrive_distance: a2,
                },
            ) => d1.distance(*d2) <= ACTION_EPSILON && close(*s1, *s2) && close(*a1, *a2),
            (
                Action::Attack {
                    target: t1,
                    range: r1,
                    friendly_fire: f1,
                },
                Action::Attack {
                    target: t2,
                    range: r2,
                    friendly_fire: f2,
                },
            ) => t1 == t2 && close(*r1, *r2) && f1 == f2,
            (
                Action::Acquire {
                    radius: r1,
                    friendly_fire: f1,
                },
                Action::Acquire {
                    radius: r2,
                    friendly_fire: f2,
                },
            ) => {
                let radius_match = match (r1, r2) {
                    (Some(a), Some(b)) => close(*a, *b),
                    (None, None) => true,
                    _ => false,
                };
                radius_match && f1 == f2
            }
            _ => false,
        }
    }
}

/// Completion signal a behavior reports back to the pilot's motive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    InProgress,
    /// The action finished; pop it.
    Completed,
    /// Acquisition found a target.
    TargetAcquired(Uid),
    /// The attack target is gone, inactive, or no longer a valid target.
    TargetLost,
}

/// Array-backed stack; spills to the heap with geometric growth past the
/// inline capacity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionStack {
    entries: SmallVec<[Action; 4]>,
}

impl ActionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current(&self) -> Option<&Action> {
        self.entries.last()
    }

    pub fn push(&mut self, action: Action) -> Result<(), SimError> {
        if self.entries.len() >= MAX_ACTION_DEPTH {
            return Err(SimError::ActionStackOverflow {
                depth: self.entries.len(),
            });
        }
        self.entries.push(action);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Action> {
        self.entries.pop()
    }

    /// Overwrite the top entry. Returns false on an empty stack.
    pub fn replace_current(&mut self, action: Action) -> bool {
        match self.entries.last_mut() {
            Some(top) => {
                *top = action;
                true
            }
            None => false,
        }
    }

    /// Replace the top in place when it is equivalent to `action`, push otherwise.
    pub fn ensure(&mut self, action: Action) -> Result<(), SimError> {
        match self.entries.last_mut() {
            Some(top) if top.is_equivalent(&action) => {
                *top = action;
                Ok(())
            }
            _ => self.push(action),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.entries.iter()
    }
}
