//! Integration tests: a caller-owned frame loop driving the runtime.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use sim_core::test_fixtures::{base_world, fleet_content};
use sim_core::{SystemId, WorldContext};
use sim_runtime::{RunMode, Runtime, RuntimeError, RuntimeSettings};

const WAIT: Duration = Duration::from_secs(5);

fn settings(run_mode: RunMode) -> RuntimeSettings {
    RuntimeSettings {
        run_mode,
        ..RuntimeSettings::default()
    }
}

fn fleet_world(seed: u64) -> WorldContext {
    WorldContext::new(&fleet_content(3), seed)
}

/// One frame, then let the worker finish whatever it was given.
fn frame(runtime: &mut Runtime, dt: f32) {
    runtime.tick(dt).unwrap();
    assert!(runtime.wait_idle(WAIT));
}

#[test]
fn auto_mode_runs_one_tick_per_step_duration() {
    // Logic step is 1s; four frames per tick.
    let mut runtime = Runtime::init(fleet_world(1), settings(RunMode::Auto)).unwrap();
    let mut last_version = 0;
    for _ in 0..40 {
        frame(&mut runtime, 0.25);
        let render = runtime.render_snapshot();
        assert!((0.0..=1.0).contains(&render.progress));
        assert!(render.ships_version >= last_version);
        last_version = render.ships_version;
    }
    let ticks = runtime.logic_snapshot().tick;
    assert!((8..=10).contains(&ticks), "ticks={ticks}");
    assert!(!runtime.render_snapshot().ships.is_empty());

    let report = runtime.shutdown();
    assert_eq!(report.ticks_collected, ticks);
    assert!(report.world.unwrap().tick_index() >= ticks);
}

#[test]
fn doubling_speed_doubles_the_tick_rate() {
    let mut runtime = Runtime::init(fleet_world(1), settings(RunMode::Auto)).unwrap();
    runtime.set_speed(2.0).unwrap();
    for _ in 0..40 {
        frame(&mut runtime, 0.25);
    }
    let ticks = runtime.logic_snapshot().tick;
    assert!((17..=20).contains(&ticks), "ticks={ticks}");
    assert!(matches!(
        runtime.set_speed(0.0),
        Err(RuntimeError::InvalidSettings(_))
    ));
}

#[test]
fn paused_runtime_only_moves_on_request() {
    let mut runtime = Runtime::init(fleet_world(2), settings(RunMode::Paused)).unwrap();
    for _ in 0..10 {
        frame(&mut runtime, 0.5);
    }
    assert_eq!(runtime.logic_snapshot().tick, 0);
    assert!(runtime.render_snapshot().ships.is_empty());

    runtime.request_step();
    assert!(runtime.logic_snapshot().step_requested);
    let report = runtime.tick(0.5).unwrap();
    assert!(report.scheduled);
    assert!(!runtime.logic_snapshot().step_requested);
    assert!(runtime.wait_idle(WAIT));

    for _ in 0..10 {
        frame(&mut runtime, 0.5);
    }
    assert_eq!(runtime.logic_snapshot().tick, 1);
    assert_eq!(runtime.render_snapshot().ships_version, 1);
    assert_eq!(runtime.render_snapshot().ships.len(), 12);
}

#[test]
fn listeners_see_commits_and_render_changes() {
    let mut runtime = Runtime::init(fleet_world(3), settings(RunMode::Auto)).unwrap();
    let commits = Rc::new(Cell::new(0u32));
    let renders = Rc::new(Cell::new(0u32));
    let c = Rc::clone(&commits);
    runtime.on_logic_commit(move |_| c.set(c.get() + 1));
    let r = Rc::clone(&renders);
    runtime.on_render_change(move |_| r.set(r.get() + 1));

    for _ in 0..12 {
        frame(&mut runtime, 0.25);
    }
    let ticks = u32::try_from(runtime.logic_snapshot().tick).unwrap();
    assert!(ticks >= 2);
    assert_eq!(commits.get(), ticks);
    assert!(renders.get() >= ticks);

    runtime.set_run_mode(RunMode::Paused);
    assert_eq!(commits.get(), ticks + 1);
}

#[test]
fn combat_events_are_drained_once() {
    let mut runtime = Runtime::init(fleet_world(4), settings(RunMode::Auto)).unwrap();
    for _ in 0..40 {
        frame(&mut runtime, 1.0);
    }
    let events = runtime.drain_combat_events();
    assert!(!events.is_empty());
    assert!(events.windows(2).all(|w| w[0].tick <= w[1].tick));
    assert!(runtime.drain_combat_events().is_empty());
}

#[test]
fn observed_system_produces_traces() {
    let settings = RuntimeSettings {
        run_mode: RunMode::Auto,
        speed_multiplier: 1.0,
        observed_system: Some(SystemId(1)),
    };
    let mut runtime = Runtime::init(fleet_world(5), settings).unwrap();
    for _ in 0..10 {
        frame(&mut runtime, 1.0);
    }
    let render = runtime.render_snapshot();
    assert!(render.trace_version > 0);
    assert_eq!(render.trace.system, Some(SystemId(1)));

    assert!(matches!(
        runtime.observe_system(Some(SystemId(8))),
        Err(RuntimeError::UnknownSystem(SystemId(8)))
    ));
    runtime.observe_system(None).unwrap();
    assert_eq!(runtime.logic_snapshot().selected_system, None);
}

#[test]
fn init_rejects_bad_settings() {
    let bad_speed = RuntimeSettings {
        speed_multiplier: -1.0,
        ..RuntimeSettings::default()
    };
    assert!(matches!(
        Runtime::init(base_world(1), bad_speed),
        Err(RuntimeError::InvalidSettings(_))
    ));

    let bad_system = RuntimeSettings {
        observed_system: Some(SystemId(2)),
        ..RuntimeSettings::default()
    };
    assert!(matches!(
        Runtime::init(base_world(1), bad_system),
        Err(RuntimeError::UnknownSystem(SystemId(2)))
    ));
}

#[test]
fn loads_the_shipped_content() {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../../content");
    let mut runtime = Runtime::load(dir, 9, settings(RunMode::Auto)).unwrap();
    for _ in 0..4 {
        frame(&mut runtime, 1.0);
    }
    assert!(runtime.logic_snapshot().tick >= 2);
    let json = serde_json::to_string(runtime.render_snapshot()).unwrap();
    assert!(json.contains("ships_version"));
    runtime.shutdown();
}
