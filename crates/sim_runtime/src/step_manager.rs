//! Caller-side pacing: when to schedule a tick, when to promote its frame.

use sim_core::CombatEvent;
use tracing::trace;

use crate::sim_thread::SimulationThread;
use crate::state::{RunMode, StateService};
use crate::RuntimeError;

/// What one frame did.
#[derive(Debug, Default)]
pub struct FrameReport {
    pub scheduled: bool,
    pub promoted: bool,
    /// Tick index of a result collected this frame.
    pub completed_tick: Option<u64>,
    pub events: Vec<CombatEvent>,
}

/// Wall-clock accumulator for scheduling plus the visual clock that drives
/// interpolation progress. Both are in seconds.
#[derive(Debug, Default)]
pub struct StepManager {
    accumulator: f32,
    visual_time: f32,
}

impl StepManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn visual_time(&self) -> f32 {
        self.visual_time
    }

    /// Advance both clocks by `frame_dt` and move the pipeline along:
    /// collect a finished tick, promote it when its interval is due, schedule
    /// the next one, then refresh the render snapshot.
    pub fn update(
        &mut self,
        frame_dt: f32,
        thread: &SimulationThread,
        state: &mut StateService,
    ) -> Result<FrameReport, RuntimeError> {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.max(0.0)
        } else {
            0.0
        };
        let mut report = FrameReport::default();

        if !state.has_next() {
            if let Some(result) = thread.take_result() {
                let output = result?;
                report.completed_tick = Some(output.tick);
                report.events = output.events;
                // Nothing to draw differently: keep the buffers, only count the tick.
                if output.dynamic_data_changed {
                    state.stage_next(output.frame, output.trace);
                }
                state.commit_logic(|logic| logic.tick = output.tick);
            }
        }

        let duration = state.logic().step_duration();
        self.visual_time += frame_dt;
        if state.has_next() && (!state.has_current() || self.visual_time >= duration) {
            report.promoted = state.promote();
            self.visual_time = 0.0;
        }

        report.scheduled = self.schedule(frame_dt, duration, thread, state);

        let progress = if duration > 0.0 {
            (self.visual_time / duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        state.refresh_render(progress);
        Ok(report)
    }

    fn schedule(
        &mut self,
        frame_dt: f32,
        duration: f32,
        thread: &SimulationThread,
        state: &mut StateService,
    ) -> bool {
        if state.logic().step_requested {
            if !thread.try_schedule_step() {
                return false;
            }
            self.accumulator = 0.0;
            self.visual_time = 0.0;
            state.commit_logic(|logic| logic.step_requested = false);
            trace!("single step scheduled");
            return true;
        }

        if state.logic().run_mode != RunMode::Auto {
            return false;
        }
        // Capped at one step so a long stall cannot queue a burst of catch-up ticks.
        self.accumulator = (self.accumulator + frame_dt).min(duration);
        if self.accumulator < duration || !thread.try_schedule_step() {
            return false;
        }
        self.accumulator -= duration;
        trace!(visual_time = self.visual_time, "tick scheduled");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LogicSnapshot;
    use sim_core::test_fixtures::{base_world, fleet_content};
    use sim_core::WorldContext;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn setup(run_mode: RunMode, world: WorldContext) -> (SimulationThread, StateService) {
        let logic = LogicSnapshot {
            run_mode,
            speed_multiplier: 1.0,
            tick: 0,
            logic_step_seconds: world.constants.logic_step_seconds,
            step_requested: false,
            systems: world.systems.clone(),
            selected_system: None,
        };
        (SimulationThread::start(world).unwrap(), StateService::new(logic))
    }

    #[test]
    fn accumulator_never_exceeds_one_step() {
        let (thread, mut state) = setup(RunMode::Auto, WorldContext::new(&fleet_content(1), 7));
        let mut steps = StepManager::new();
        // A long stall schedules one tick, not a burst.
        let report = steps.update(30.0, &thread, &mut state).unwrap();
        assert!(report.scheduled);
        assert_eq!(steps.accumulator(), 0.0);
        assert!(thread.wait_idle(WAIT));

        let report = steps.update(30.0, &thread, &mut state).unwrap();
        assert_eq!(report.completed_tick, Some(1));
        assert!(report.promoted);
        assert!(report.scheduled);
        assert!(steps.accumulator() <= state.logic().step_duration());
    }

    #[test]
    fn paused_mode_ignores_wall_time() {
        let (thread, mut state) = setup(RunMode::Paused, base_world(1));
        let mut steps = StepManager::new();
        for _ in 0..5 {
            let report = steps.update(1.0, &thread, &mut state).unwrap();
            assert!(!report.scheduled);
        }
        assert_eq!(steps.accumulator(), 0.0);
        assert!(!thread.is_busy());
    }

    #[test]
    fn step_request_schedules_once_in_step_mode() {
        let (thread, mut state) = setup(RunMode::Step, base_world(1));
        let mut steps = StepManager::new();
        state.commit_logic(|logic| logic.step_requested = true);

        let report = steps.update(0.1, &thread, &mut state).unwrap();
        assert!(report.scheduled);
        assert!(!state.logic().step_requested);
        assert_eq!(steps.visual_time(), 0.0);
        assert!(thread.wait_idle(WAIT));

        let report = steps.update(0.1, &thread, &mut state).unwrap();
        assert_eq!(report.completed_tick, Some(1));
        assert!(!report.scheduled);
        assert_eq!(state.logic().tick, 1);
    }

    #[test]
    fn promotion_waits_for_the_visual_interval() {
        let (thread, mut state) = setup(RunMode::Auto, WorldContext::new(&fleet_content(1), 7));
        let mut steps = StepManager::new();
        let mut promotions = 0;
        for _ in 0..20 {
            let report = steps.update(0.25, &thread, &mut state).unwrap();
            if report.promoted {
                promotions += 1;
            }
            let progress = state.render().progress;
            assert!((0.0..=1.0).contains(&progress));
            assert!(thread.wait_idle(WAIT));
        }
        // Ticks scheduled at frames 4, 8, .., 20; the last is still uncollected.
        assert_eq!(promotions, 4);
        assert_eq!(state.render().ships_version, 4);
        assert!(thread.has_result());
    }

    #[test]
    fn unchanged_ticks_are_counted_but_not_promoted() {
        // No ships: every tick is static.
        let (thread, mut state) = setup(RunMode::Auto, base_world(1));
        let mut steps = StepManager::new();
        for _ in 0..6 {
            steps.update(1.0, &thread, &mut state).unwrap();
            assert!(thread.wait_idle(WAIT));
        }
        assert_eq!(state.logic().tick, 5);
        assert_eq!(state.render().ships_version, 0);
        assert!(!state.has_current());
    }
}
