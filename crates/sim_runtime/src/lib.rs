//! `sim_runtime`: runs a `sim_core` world on a worker thread and paces it
//! against the caller's frame clock.
//!
//! The caller owns the main loop: [`Runtime::init`], then [`Runtime::tick`]
//! once per rendered frame, then [`Runtime::shutdown`]. At most one logic
//! tick is ever in flight.

mod error;
pub mod interpolation;
mod runtime;
mod sim_thread;
mod state;
mod step_manager;

pub use error::RuntimeError;
pub use runtime::{Runtime, RuntimeSettings, ShutdownReport};
pub use sim_thread::{ControlCommand, SimulationThread, TickResult};
pub use state::{
    InterpolatedShip, LogicListener, LogicSnapshot, RenderListener, RenderSnapshot, RunMode,
    StateService,
};
pub use step_manager::{FrameReport, StepManager};
