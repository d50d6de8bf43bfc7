use meta_core::{ComponentDefaults, Vec3};
use serde::{Deserialize, Serialize};

/// Longest frame step the clock will report, in seconds.
pub const DEFAULT_MAX_FRAME_DT: f64 = 0.1;

/// Event dispatched to every entity once per frame.
pub const DEFAULT_TICK_EVENT: &str = "Tick";

/// Configuration for an engine and the simulations it starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on the `dt` derived from host timestamps.
    pub max_frame_dt: f64,
    /// Name of the per-frame event.
    pub tick_event: String,
    /// Initial component values for entities of newly started scripts.
    pub defaults: ComponentDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_frame_dt: DEFAULT_MAX_FRAME_DT,
            tick_event: DEFAULT_TICK_EVENT.to_string(),
            defaults: ComponentDefaults::default(),
        }
    }
}

impl EngineConfig {
    /// Set the upper bound on host-derived frame steps.
    pub fn with_max_frame_dt(mut self, max_frame_dt: f64) -> Self {
        self.max_frame_dt = max_frame_dt;
        self
    }

    /// Set the name of the per-frame event.
    pub fn with_tick_event(mut self, event: impl Into<String>) -> Self {
        self.tick_event = event.into();
        self
    }

    /// Replace the component defaults.
    pub fn with_defaults(mut self, defaults: ComponentDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Set the initial velocity of every `Physics` entity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.defaults = self.defaults.with_velocity(velocity);
        self
    }
}
