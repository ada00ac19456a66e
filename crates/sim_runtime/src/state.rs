//! Logic and render snapshots and the service that publishes them.
//!
//! The logic snapshot is the canonical run state at a tick boundary. The render
//! snapshot is derived from it plus a triple buffer of ship frames: `previous`
//! and `current` bracket the interval being drawn, `next` holds a finished tick
//! waiting to be promoted. Listeners run synchronously on the caller thread.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sim_core::{FactionId, ShipFrame, ShipSample, StarSystemDef, SubstepTrace, SystemId, Uid, Vec2};

use crate::interpolation::{blend_orientation, hermite_position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunMode {
    /// No ticks are scheduled except explicit single steps.
    #[default]
    Paused,
    /// Manual stepping: one tick per step request.
    Step,
    /// Ticks are scheduled on the wall clock, scaled by the speed multiplier.
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicSnapshot {
    pub run_mode: RunMode,
    pub speed_multiplier: f32,
    /// Ticks completed and collected by the caller.
    pub tick: u64,
    pub logic_step_seconds: f32,
    pub step_requested: bool,
    #[serde(skip)]
    pub systems: Arc<[StarSystemDef]>,
    pub selected_system: Option<SystemId>,
}

impl LogicSnapshot {
    /// Wall-clock seconds per tick at the current speed.
    pub fn step_duration(&self) -> f32 {
        self.logic_step_seconds / self.speed_multiplier
    }
}

/// One ship as drawn this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InterpolatedShip {
    pub uid: Uid,
    pub system: SystemId,
    pub faction: FactionId,
    pub position: Vec2,
    pub orientation: f32,
    pub hp: f32,
    pub max_hp: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub previous: Vec<ShipSample>,
    pub current: Vec<ShipSample>,
    pub next: Vec<ShipSample>,
    /// Bumped on every promotion.
    pub ships_version: u64,
    /// Position inside the current interval, in `[0, 1]`.
    pub progress: f32,
    pub ships: Vec<InterpolatedShip>,
    pub trace: SubstepTrace,
    pub trace_version: u64,
}

/// Frames waiting in the triple buffer.
#[derive(Debug, Default)]
struct ShipBuffers {
    previous: Option<ShipFrame>,
    current: Option<ShipFrame>,
    next: Option<(ShipFrame, SubstepTrace)>,
}

pub type LogicListener = Box<dyn FnMut(&LogicSnapshot)>;
pub type RenderListener = Box<dyn FnMut(&RenderSnapshot)>;

pub struct StateService {
    logic: LogicSnapshot,
    render: RenderSnapshot,
    buffers: ShipBuffers,
    logic_listeners: Vec<LogicListener>,
    render_listeners: Vec<RenderListener>,
}

impl StateService {
    pub fn new(logic: LogicSnapshot) -> Self {
        Self {
            logic,
            render: RenderSnapshot::default(),
            buffers: ShipBuffers::default(),
            logic_listeners: Vec::new(),
            render_listeners: Vec::new(),
        }
    }

    pub fn logic(&self) -> &LogicSnapshot {
        &self.logic
    }

    pub fn render(&self) -> &RenderSnapshot {
        &self.render
    }

    pub fn on_logic_commit(&mut self, listener: impl FnMut(&LogicSnapshot) + 'static) {
        self.logic_listeners.push(Box::new(listener));
    }

    pub fn on_render_change(&mut self, listener: impl FnMut(&RenderSnapshot) + 'static) {
        self.render_listeners.push(Box::new(listener));
    }

    /// Mutate the logic snapshot and notify every logic listener.
    pub fn commit_logic(&mut self, update: impl FnOnce(&mut LogicSnapshot)) {
        update(&mut self.logic);
        for listener in &mut self.logic_listeners {
            listener(&self.logic);
        }
    }

    pub fn has_next(&self) -> bool {
        self.buffers.next.is_some()
    }

    pub fn has_current(&self) -> bool {
        self.buffers.current.is_some()
    }

    /// Park a finished tick until the next promotion. Returns false (and drops
    /// nothing) when the slot is already taken.
    pub fn stage_next(&mut self, frame: ShipFrame, trace: SubstepTrace) -> bool {
        if self.buffers.next.is_some() {
            return false;
        }
        self.buffers.next = Some((frame, trace));
        true
    }

    /// next -> current -> previous. Returns false when nothing was staged.
    pub fn promote(&mut self) -> bool {
        let Some((frame, trace)) = self.buffers.next.take() else {
            return false;
        };
        self.buffers.previous = self.buffers.current.take();
        self.buffers.current = Some(frame);
        self.render.ships_version += 1;
        if trace.version != self.render.trace.version {
            self.render.trace_version += 1;
        }
        self.render.trace = trace;
        true
    }

    /// Rebuild the render snapshot at `progress` and notify render listeners
    /// when any field changed.
    pub fn refresh_render(&mut self, progress: f32) {
        let progress = progress.clamp(0.0, 1.0);
        let step_seconds = self.logic.logic_step_seconds;
        let previous = self.buffers.previous.as_ref();
        let current = self.buffers.current.as_ref();

        let updated = RenderSnapshot {
            previous: samples(previous),
            current: samples(current),
            next: samples(self.buffers.next.as_ref().map(|(frame, _)| frame)),
            ships_version: self.render.ships_version,
            progress,
            ships: interpolate(previous, current, step_seconds, progress),
            trace: self.render.trace.clone(),
            trace_version: self.render.trace_version,
        };
        if updated == self.render {
            return;
        }
        self.render = updated;
        for listener in &mut self.render_listeners {
            listener(&self.render);
        }
    }
}

fn samples(frame: Option<&ShipFrame>) -> Vec<ShipSample> {
    frame.map(|f| f.ships.clone()).unwrap_or_default()
}

/// Ships present in `current`, placed between their `previous` and `current`
/// samples. Ships new this tick sit at their current position.
fn interpolate(
    previous: Option<&ShipFrame>,
    current: Option<&ShipFrame>,
    step_seconds: f32,
    progress: f32,
) -> Vec<InterpolatedShip> {
    let Some(current) = current else {
        return Vec::new();
    };
    let before: HashMap<Uid, &ShipSample> = previous
        .map(|f| f.ships.iter().map(|s| (s.uid, s)).collect())
        .unwrap_or_default();

    current
        .ships
        .iter()
        .map(|now| {
            let (position, orientation) = match before.get(&now.uid) {
                Some(then) => (
                    hermite_position(
                        then.position,
                        then.velocity,
                        now.position,
                        now.velocity,
                        step_seconds,
                        progress,
                    ),
                    blend_orientation(then.orientation, now.orientation, progress),
                ),
                None => (now.position, now.orientation),
            };
            InterpolatedShip {
                uid: now.uid,
                system: now.system,
                faction: now.faction,
                position,
                orientation,
                hp: now.hp,
                max_hp: now.max_hp,
            }
        })
        .collect()
}
