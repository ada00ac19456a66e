//! `sim_core`: deterministic fleet simulation tick.
//!
//! No IO, no threads. All mutable state lives in an explicit [`WorldContext`];
//! all randomness is seeded from it.

mod action;
pub mod behavior;
mod engine;
mod error;
mod hostility;
mod id;
mod motive;
mod registry;
mod spawn;
mod step;
mod trace;
mod types;
mod world;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use action::{
    Action, ActionKind, ActionOutcome, ActionStack, ACTION_EPSILON, MAX_ACTION_DEPTH,
};
pub use engine::{capture_frame, tick};
pub use error::SimError;
pub use hostility::HostilityTable;
pub use id::UidAllocator;
pub use motive::{Motive, Order, XorShift32, PATROL_SAMPLE_ATTEMPTS};
pub use registry::{PilotRegistry, ShipLocation, ShipLocations, ShipRegistry};
pub use step::update_systems;
pub use trace::SubstepTrace;
pub use types::*;
pub use world::{SpawnRequest, WorldContext};

#[cfg(test)]
mod tests;
