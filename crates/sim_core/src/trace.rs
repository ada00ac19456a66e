use serde::{Deserialize, Serialize};

use crate::{SystemId, TraceSample, Uid, Vec2};

/// Intra-tick position samples for the observed system.
///
/// Cleared at the start of every tick. `version` advances only when a tick
/// actually recorded samples, so consumers can skip unchanged traces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubstepTrace {
    pub version: u64,
    pub system: Option<SystemId>,
    pub samples: Vec<TraceSample>,
}

impl SubstepTrace {
    pub fn begin_tick(&mut self, observed: Option<SystemId>) {
        self.system = observed;
        self.samples.clear();
    }

    pub fn record(&mut self, ship: Uid, t: f32, position: Vec2, orientation: f32) {
        self.samples.push(TraceSample {
            ship,
            t,
            position,
            orientation,
        });
    }

    pub fn end_tick(&mut self) {
        if !self.samples.is_empty() {
            self.version += 1;
        }
    }

    pub fn samples_for(&self, ship: Uid) -> impl Iterator<Item = &TraceSample> {
        self.samples.iter().filter(move |s| s.ship == ship)
    }
}
