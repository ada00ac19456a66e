//! The caller-owned facade: `init`, then `tick` once per frame, then `shutdown`.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sim_core::{CombatEvent, FactionId, Order, SystemId, Uid, WorldContext};
use tracing::{info, warn};

use crate::sim_thread::{ControlCommand, SimulationThread};
use crate::state::{LogicSnapshot, RenderSnapshot, RunMode, StateService};
use crate::step_manager::{FrameReport, StepManager};
use crate::RuntimeError;

/// Caller-side options, validated at [`Runtime::init`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    pub run_mode: RunMode,
    /// Ticks per logic step of wall time. Must be positive.
    pub speed_multiplier: f32,
    /// System whose ships record substep traces.
    pub observed_system: Option<SystemId>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Auto,
            speed_multiplier: 1.0,
            observed_system: None,
        }
    }
}

impl RuntimeSettings {
    pub fn validate(&self, world: &WorldContext) -> Result<(), RuntimeError> {
        validate_speed(self.speed_multiplier)?;
        if let Some(system) = self.observed_system {
            if system.index() >= world.systems.len() {
                return Err(RuntimeError::UnknownSystem(system));
            }
        }
        let step = world.constants.logic_step_seconds;
        if !(step.is_finite() && step > 0.0) {
            return Err(RuntimeError::InvalidSettings(format!(
                "logic_step_seconds must be positive, got {step}"
            )));
        }
        Ok(())
    }
}

fn validate_speed(speed: f32) -> Result<(), RuntimeError> {
    if speed.is_finite() && speed > 0.0 {
        Ok(())
    } else {
        Err(RuntimeError::InvalidSettings(format!(
            "speed_multiplier must be positive, got {speed}"
        )))
    }
}

/// Totals reported by [`Runtime::shutdown`].
#[derive(Debug)]
pub struct ShutdownReport {
    pub ticks_collected: u64,
    /// The world as the worker left it; `None` if the worker panicked.
    pub world: Option<WorldContext>,
}

pub struct Runtime {
    thread: SimulationThread,
    steps: StepManager,
    state: StateService,
    events: Vec<CombatEvent>,
}

impl Runtime {
    /// Validate `settings` against `world`, then hand the world to a new
    /// simulation thread.
    pub fn init(mut world: WorldContext, settings: RuntimeSettings) -> Result<Self, RuntimeError> {
        settings.validate(&world)?;
        world.set_observed_system(settings.observed_system)?;

        let logic = LogicSnapshot {
            run_mode: settings.run_mode,
            speed_multiplier: settings.speed_multiplier,
            tick: world.tick_index(),
            logic_step_seconds: world.constants.logic_step_seconds,
            step_requested: false,
            systems: world.systems.clone(),
            selected_system: settings.observed_system,
        };
        info!(
            systems = world.systems.len(),
            seed = world.seed(),
            mode = ?settings.run_mode,
            "runtime starting"
        );
        let thread = SimulationThread::start(world)?;
        Ok(Self {
            thread,
            steps: StepManager::new(),
            state: StateService::new(logic),
            events: Vec::new(),
        })
    }

    /// Load content from `content_dir`, build a world and start it.
    pub fn load(content_dir: &str, seed: u64, settings: RuntimeSettings) -> anyhow::Result<Self> {
        let content = sim_world::load_content(content_dir)?;
        let world = sim_world::build_world(&content, seed);
        Runtime::init(world, settings).context("starting runtime")
    }

    /// Advance by one rendered frame of `frame_dt` wall-clock seconds.
    pub fn tick(&mut self, frame_dt: f32) -> Result<FrameReport, RuntimeError> {
        if !self.thread.is_alive() {
            return Err(RuntimeError::WorkerStopped);
        }
        let report = self.steps.update(frame_dt, &self.thread, &mut self.state)?;
        self.events.extend(report.events.iter().cloned());
        Ok(report)
    }

    /// Stop the worker after any in-flight tick and return what it leaves behind.
    pub fn shutdown(mut self) -> ShutdownReport {
        let world = self.thread.stop();
        let ticks_collected = self.state.logic().tick;
        info!(ticks = ticks_collected, "runtime stopped");
        ShutdownReport {
            ticks_collected,
            world,
        }
    }

    pub fn logic_snapshot(&self) -> &LogicSnapshot {
        self.state.logic()
    }

    pub fn render_snapshot(&self) -> &RenderSnapshot {
        self.state.render()
    }

    pub fn step_manager(&self) -> &StepManager {
        &self.steps
    }

    pub fn is_busy(&self) -> bool {
        self.thread.is_busy()
    }

    /// Block until the worker finishes its current tick. Returns false on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.thread.wait_idle(timeout)
    }

    pub fn set_run_mode(&mut self, mode: RunMode) {
        self.state.commit_logic(|logic| logic.run_mode = mode);
    }

    pub fn set_speed(&mut self, speed_multiplier: f32) -> Result<(), RuntimeError> {
        validate_speed(speed_multiplier)?;
        self.state
            .commit_logic(|logic| logic.speed_multiplier = speed_multiplier);
        Ok(())
    }

    /// Schedule exactly one tick on a following frame, whatever the run mode.
    pub fn request_step(&mut self) {
        self.state.commit_logic(|logic| logic.step_requested = true);
    }

    pub fn set_hostility(&mut self, a: FactionId, b: FactionId, hostile: bool, mirror: bool) {
        self.send(ControlCommand::SetHostility {
            a,
            b,
            hostile,
            mirror,
        });
    }

    pub fn assign_order(&mut self, pilot: Uid, order: Order) {
        self.send(ControlCommand::AssignOrder { pilot, order });
    }

    /// Select the system whose ships record substep traces.
    pub fn observe_system(&mut self, system: Option<SystemId>) -> Result<(), RuntimeError> {
        if let Some(id) = system {
            if id.index() >= self.state.logic().systems.len() {
                warn!(system = %id, "observe request for unknown system");
                return Err(RuntimeError::UnknownSystem(id));
            }
        }
        self.send(ControlCommand::ObserveSystem(system));
        self.state
            .commit_logic(|logic| logic.selected_system = system);
        Ok(())
    }

    /// Combat events collected since the last drain, oldest first.
    pub fn drain_combat_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn on_logic_commit(&mut self, listener: impl FnMut(&LogicSnapshot) + 'static) {
        self.state.on_logic_commit(listener);
    }

    pub fn on_render_change(&mut self, listener: impl FnMut(&RenderSnapshot) + 'static) {
        self.state.on_render_change(listener);
    }

    fn send(&self, command: ControlCommand) {
        if !self.thread.send_command(command) {
            warn!(?command, "control command dropped: simulation thread stopped");
        }
    }
}
