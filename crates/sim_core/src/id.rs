use serde::{Deserialize, Serialize};

use crate::{EntityKind, Uid};

/// Monotonic per-kind counters. Owned by a `WorldContext`, so separate worlds
/// never share id space.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UidAllocator {
    next_ship: u64,
    next_pilot: u64,
}

impl UidAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, kind: EntityKind) -> Uid {
        let counter = match kind {
            EntityKind::Ship => &mut self.next_ship,
            EntityKind::Pilot => &mut self.next_pilot,
        };
        *counter += 1;
        Uid::new(kind, *counter)
    }

    /// Number of ids handed out so far for `kind`.
    pub fn issued(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Ship => self.next_ship,
            EntityKind::Pilot => self.next_pilot,
        }
    }
}
