use sim_core::{SimError, SystemId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid runtime settings: {0}")]
    InvalidSettings(String),
    #[error("unknown star system {0}")]
    UnknownSystem(SystemId),
    #[error("failed to start the simulation thread")]
    WorkerSpawn(#[source] std::io::Error),
    #[error("the simulation thread has stopped")]
    WorkerStopped,
    #[error("simulation error")]
    Sim(#[from] SimError),
}
