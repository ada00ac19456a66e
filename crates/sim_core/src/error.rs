use thiserror::Error;

use crate::{SystemId, Uid};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("unknown star system {0}")]
    UnknownSystem(SystemId),

    #[error("unknown ship {0}")]
    UnknownShip(Uid),

    #[error("ship {0} is already registered")]
    DuplicateShip(Uid),

    #[error("unknown pilot {0}")]
    UnknownPilot(Uid),

    #[error("action stack is full ({depth} entries)")]
    ActionStackOverflow { depth: usize },

    #[error("ship template has {0} weapons, at most 8 slots are available")]
    TooManyWeapons(usize),
}
