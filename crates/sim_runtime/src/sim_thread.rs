//! The single worker thread that owns the world and runs ticks.
//!
//! The caller hands over at most one tick at a time. Everything the worker
//! shares with the caller sits behind one mutex; the condition variable wakes
//! the worker for new work and wakes waiters when a tick completes.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use sim_core::{FactionId, Order, SimError, SystemId, TickOutput, Uid, WorldContext};
use tracing::{debug, info, warn};

use crate::RuntimeError;

/// World mutations requested from the caller thread. Queued, then applied by
/// the worker immediately before its next tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    SetHostility {
        a: FactionId,
        b: FactionId,
        hostile: bool,
        mirror: bool,
    },
    AssignOrder {
        pilot: Uid,
        order: Order,
    },
    ObserveSystem(Option<SystemId>),
}

pub type TickResult = Result<TickOutput, SimError>;

#[derive(Default)]
struct Slot {
    accepting: bool,
    running: bool,
    has_task: bool,
    processing: bool,
    commands: Vec<ControlCommand>,
    result: Option<TickResult>,
}

struct Shared {
    slot: Mutex<Slot>,
    wake: Condvar,
}

pub struct SimulationThread {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<WorldContext>>,
}

impl SimulationThread {
    /// Move `world` onto a new named worker thread.
    pub fn start(world: WorldContext) -> Result<Self, RuntimeError> {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot {
                accepting: true,
                running: true,
                ..Slot::default()
            }),
            wake: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("sim-worker".to_string())
            .spawn(move || worker_loop(world, &worker_shared))
            .map_err(RuntimeError::WorkerSpawn)?;
        info!("simulation thread started");
        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    /// Queue one tick. Returns false when the thread is not accepting work, a
    /// tick is already queued or running, or a finished tick has not been
    /// collected yet.
    pub fn try_schedule_step(&self) -> bool {
        let mut slot = self.shared.slot.lock();
        if !slot.accepting || slot.has_task || slot.processing || slot.result.is_some() {
            return false;
        }
        slot.has_task = true;
        self.shared.wake.notify_all();
        true
    }

    pub fn take_result(&self) -> Option<TickResult> {
        self.shared.slot.lock().result.take()
    }

    pub fn has_result(&self) -> bool {
        self.shared.slot.lock().result.is_some()
    }

    /// A tick is queued or running.
    pub fn is_busy(&self) -> bool {
        let slot = self.shared.slot.lock();
        slot.has_task || slot.processing
    }

    /// False once the worker has exited, including by panic.
    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Queue a command for the next tick. Returns false after `stop`.
    pub fn send_command(&self, command: ControlCommand) -> bool {
        let mut slot = self.shared.slot.lock();
        if !slot.accepting {
            return false;
        }
        slot.commands.push(command);
        true
    }

    /// Block until no tick is queued or running, or `timeout` passes.
    /// Returns true when the thread went idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let mut slot = self.shared.slot.lock();
        while slot.has_task || slot.processing {
            if self.shared.wake.wait_for(&mut slot, timeout).timed_out() {
                return !(slot.has_task || slot.processing);
            }
        }
        true
    }

    /// Stop accepting work, let a running tick finish, join the worker and
    /// hand back its world. `None` if the worker panicked or was already stopped.
    pub fn stop(&mut self) -> Option<WorldContext> {
        {
            let mut slot = self.shared.slot.lock();
            slot.accepting = false;
            slot.running = false;
            self.shared.wake.notify_all();
        }
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(world) => {
                info!(tick = world.tick_index(), "simulation thread stopped");
                Some(world)
            }
            Err(_) => {
                warn!("simulation thread panicked");
                None
            }
        }
    }
}

impl Drop for SimulationThread {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}

fn worker_loop(mut world: WorldContext, shared: &Shared) -> WorldContext {
    loop {
        let commands = {
            let mut slot = shared.slot.lock();
            while slot.running && !slot.has_task {
                shared.wake.wait(&mut slot);
            }
            // A tick accepted before `stop` still runs.
            if !slot.has_task {
                break;
            }
            slot.has_task = false;
            slot.processing = true;
            std::mem::take(&mut slot.commands)
        };

        apply_commands(&mut world, commands);
        let result = sim_core::tick(&mut world);
        if let Err(err) = &result {
            warn!(%err, tick = world.tick_index(), "tick failed");
        }

        let mut slot = shared.slot.lock();
        slot.result = Some(result);
        slot.processing = false;
        shared.wake.notify_all();
    }
    world
}

fn apply_commands(world: &mut WorldContext, commands: Vec<ControlCommand>) {
    for command in commands {
        debug!(?command, "applying control command");
        match command {
            ControlCommand::SetHostility {
                a,
                b,
                hostile,
                mirror,
            } => world.set_hostility(a, b, hostile, mirror),
            ControlCommand::AssignOrder { pilot, order } => {
                if let Err(err) = world.assign_order(pilot, order) {
                    warn!(%err, "order rejected");
                }
            }
            ControlCommand::ObserveSystem(system) => {
                if let Err(err) = world.set_observed_system(system) {
                    warn!(%err, "observe request rejected");
                }
            }
        }
    }
}
