use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::interpreter::DispatchStats;
use crate::scheduler::{FrameReport, Scheduler};
use crate::surface::RenderSurface;

/// Identifies one started simulation.
///
/// Handles outlive the simulation they name: once a surface is restarted,
/// older handles no longer match and cannot affect the new simulation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationHandle {
    surface: String,
    generation: u64,
}

impl SimulationHandle {
    /// The surface the simulation was started on.
    pub fn surface(&self) -> &str {
        &self.surface
    }

    /// Start counter value, unique per engine.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct RunningSimulation {
    scheduler: Scheduler,
    generation: u64,
}

/// Owns render surfaces and the simulation running on each of them.
///
/// At most one simulation runs per surface. All mutation happens through
/// `&mut self` on the caller's thread.
pub struct Engine {
    config: EngineConfig,
    surfaces: BTreeMap<String, Box<dyn RenderSurface>>,
    running: BTreeMap<String, RunningSimulation>,
    next_generation: u64,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("surfaces", &self.surfaces.keys().collect::<Vec<_>>())
            .field("running", &self.running.keys().collect::<Vec<_>>())
            .field("next_generation", &self.next_generation)
            .finish()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// An engine with no surfaces and nothing running.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            surfaces: BTreeMap::new(),
            running: BTreeMap::new(),
            next_generation: 1,
        }
    }

    /// The configuration scripts are started with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register a surface under its id, returning any surface it replaces.
    pub fn register_surface(
        &mut self,
        surface: Box<dyn RenderSurface>,
    ) -> Option<Box<dyn RenderSurface>> {
        let id = surface.id().to_string();
        debug!("registering surface `{id}`");
        self.surfaces.insert(id, surface)
    }

    /// The surface registered under `surface_id`.
    pub fn surface(&self, surface_id: &str) -> Option<&dyn RenderSurface> {
        self.surfaces.get(surface_id).map(|s| s.as_ref())
    }

    /// Access a surface by downcasting to a concrete type.
    pub fn surface_as<T: RenderSurface + 'static>(&self, surface_id: &str) -> Option<&T> {
        self.surfaces
            .get(surface_id)
            .and_then(|s| s.as_any().downcast_ref::<T>())
    }

    /// Access a surface mutably by downcasting to a concrete type.
    pub fn surface_as_mut<T: RenderSurface + 'static>(&mut self, surface_id: &str) -> Option<&mut T> {
        self.surfaces
            .get_mut(surface_id)
            .and_then(|s| s.as_any_mut().downcast_mut::<T>())
    }

    /// Compile `script` and run it on `surface_id`, replacing whatever ran
    /// there before.
    ///
    /// The script is fully loaded before the surface is touched, so a
    /// rejected script leaves the current simulation running.
    pub fn start_app(&mut self, surface_id: &str, script: &str) -> EngineResult<SimulationHandle> {
        let loaded = meta_dsl::load(script, &self.config.defaults)?;
        if !self.surfaces.contains_key(surface_id) {
            return Err(EngineError::UnknownSurface(surface_id.to_string()));
        }

        if let Some(old) = self.running.remove(surface_id) {
            warn!(
                "replacing simulation {} on `{surface_id}` after {} frames",
                old.generation,
                old.scheduler.current_frame()
            );
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        info!(
            "starting simulation {generation} on `{surface_id}` with {} entities",
            loaded.registry.len()
        );
        let scheduler = Scheduler::new(loaded.registry, loaded.program, &self.config);
        self.running.insert(
            surface_id.to_string(),
            RunningSimulation {
                scheduler,
                generation,
            },
        );
        Ok(SimulationHandle {
            surface: surface_id.to_string(),
            generation,
        })
    }

    /// Drive every running simulation one frame at host time `now`.
    pub fn frame(&mut self, now: f64) -> Vec<(String, FrameReport)> {
        let mut reports = Vec::with_capacity(self.running.len());
        for (id, sim) in &mut self.running {
            let report = sim.scheduler.on_frame(now);
            if let Some(surface) = self.surfaces.get_mut(id) {
                surface.present(&sim.scheduler.snapshot());
            }
            reports.push((id.clone(), report));
        }
        reports
    }

    /// Drive one surface's simulation one frame at host time `now`.
    pub fn frame_surface(&mut self, surface_id: &str, now: f64) -> EngineResult<FrameReport> {
        self.step(surface_id, |scheduler| scheduler.on_frame(now))
    }

    /// Advance one surface's simulation by exactly `dt`.
    pub fn tick_surface(&mut self, surface_id: &str, dt: f64) -> EngineResult<FrameReport> {
        self.step(surface_id, |scheduler| scheduler.tick(dt))
    }

    fn step(
        &mut self,
        surface_id: &str,
        advance: impl FnOnce(&mut Scheduler) -> FrameReport,
    ) -> EngineResult<FrameReport> {
        let sim = self
            .running
            .get_mut(surface_id)
            .ok_or_else(|| EngineError::NotRunning(surface_id.to_string()))?;
        let report = advance(&mut sim.scheduler);
        if let Some(surface) = self.surfaces.get_mut(surface_id) {
            surface.present(&sim.scheduler.snapshot());
        }
        Ok(report)
    }

    /// Stop the simulation on `surface_id`.
    pub fn stop(&mut self, surface_id: &str) -> EngineResult<()> {
        let sim = self
            .running
            .remove(surface_id)
            .ok_or_else(|| EngineError::NotRunning(surface_id.to_string()))?;
        info!(
            "stopped simulation {} on `{surface_id}` at frame {}",
            sim.generation,
            sim.scheduler.current_frame()
        );
        Ok(())
    }

    /// Stop the simulation `handle` names, if it is still the one running.
    pub fn stop_handle(&mut self, handle: &SimulationHandle) -> bool {
        let current = self
            .running
            .get(&handle.surface)
            .is_some_and(|sim| sim.generation == handle.generation);
        if !current {
            debug!(
                "ignoring stale handle {} for `{}`",
                handle.generation, handle.surface
            );
            return false;
        }
        self.stop(&handle.surface).is_ok()
    }

    /// The scheduler running on `surface_id`.
    pub fn simulation(&self, surface_id: &str) -> Option<&Scheduler> {
        self.running.get(surface_id).map(|sim| &sim.scheduler)
    }

    /// Handle for the simulation currently running on `surface_id`.
    pub fn handle(&self, surface_id: &str) -> Option<SimulationHandle> {
        self.running.get(surface_id).map(|sim| SimulationHandle {
            surface: surface_id.to_string(),
            generation: sim.generation,
        })
    }

    /// Whether a simulation is running on `surface_id`.
    pub fn is_running(&self, surface_id: &str) -> bool {
        self.running.contains_key(surface_id)
    }

    /// Surfaces with a running simulation, sorted by id.
    pub fn running_surfaces(&self) -> impl Iterator<Item = &str> {
        self.running.keys().map(String::as_str)
    }

    /// Fire a host event at the simulation on `surface_id`.
    pub fn dispatch_event(
        &mut self,
        surface_id: &str,
        event: &str,
        arg: f64,
    ) -> EngineResult<DispatchStats> {
        let sim = self
            .running
            .get_mut(surface_id)
            .ok_or_else(|| EngineError::NotRunning(surface_id.to_string()))?;
        Ok(sim.scheduler.dispatch(event, arg))
    }
}
