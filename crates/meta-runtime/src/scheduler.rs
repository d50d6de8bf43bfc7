use log::debug;
use meta_core::{Program, Registry};
use serde::Serialize;

use crate::clock::FrameClock;
use crate::config::EngineConfig;
use crate::interpreter::{self, DispatchStats};
use crate::surface::FrameSnapshot;

/// Outcome of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameReport {
    /// Frame number just completed.
    pub frame: u64,
    /// Step applied this frame, in seconds.
    pub dt: f64,
    /// Handlers that ran.
    pub handlers: usize,
    /// Builtin calls executed.
    pub calls: usize,
}

/// Drives one simulation: owns its entities, bound handlers, and clock.
///
/// Each frame dispatches the tick event to every entity in registry order.
pub struct Scheduler {
    registry: Registry,
    program: Program,
    clock: FrameClock,
    tick_event: String,
    last_dt: f64,
    total_calls: u64,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("frame", &self.clock.frame())
            .field("entities", &self.registry.len())
            .field("tick_event", &self.tick_event)
            .finish()
    }
}

impl Scheduler {
    /// Create a scheduler at frame 0.
    pub fn new(registry: Registry, program: Program, config: &EngineConfig) -> Self {
        Self {
            registry,
            program,
            clock: FrameClock::new(config.max_frame_dt),
            tick_event: config.tick_event.clone(),
            last_dt: 0.0,
            total_calls: 0,
        }
    }

    /// Advance one frame of length `dt`.
    pub fn tick(&mut self, dt: f64) -> FrameReport {
        let stats =
            interpreter::broadcast(&self.program, &mut self.registry, &self.tick_event, dt);
        let frame = self.clock.advance(dt);
        self.last_dt = dt;
        self.total_calls += stats.calls as u64;
        debug!(
            "frame {frame}: dt={dt:.4} handlers={} calls={}",
            stats.handlers, stats.calls
        );
        FrameReport {
            frame,
            dt,
            handlers: stats.handlers,
            calls: stats.calls,
        }
    }

    /// Advance one frame observed at host time `now` (seconds).
    pub fn on_frame(&mut self, now: f64) -> FrameReport {
        let dt = self.clock.delta(now);
        self.tick(dt)
    }

    /// Advance `n` frames of constant `dt`. Returns the last report, if any.
    pub fn run(&mut self, n: u64, dt: f64) -> Option<FrameReport> {
        (0..n).map(|_| self.tick(dt)).last()
    }

    /// Deliver a host event to every entity handling it.
    pub fn dispatch(&mut self, event: &str, arg: f64) -> DispatchStats {
        let stats = interpreter::broadcast(&self.program, &mut self.registry, event, arg);
        self.total_calls += stats.calls as u64;
        stats
    }

    /// Deliver a host event to one entity by name.
    pub fn dispatch_to(&mut self, entity: &str, event: &str, arg: f64) -> DispatchStats {
        let Some(id) = self.registry.entity(entity).map(|e| e.id) else {
            return DispatchStats::default();
        };
        let stats = interpreter::dispatch(&self.program, &mut self.registry, id, event, arg);
        self.total_calls += stats.calls as u64;
        stats
    }

    /// Copy out the state reached by the last completed frame.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.clock.frame(),
            dt: self.last_dt,
            elapsed: self.clock.elapsed(),
            entities: self.registry.snapshot(),
        }
    }

    /// Live entity state.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The bound handlers.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Frame timing state.
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Builtin calls executed since start.
    pub fn total_calls(&self) -> u64 {
        self.total_calls
    }

    /// Frames completed so far.
    pub fn current_frame(&self) -> u64 {
        self.clock.frame()
    }
}
