//! Frame-driven execution of Metascript programs.
//!
//! A [`Scheduler`] owns one loaded script's entities and dispatches the tick
//! event to them once per frame. The [`Engine`] maps render surfaces to
//! schedulers and is the entry point hosts use to start, drive, and stop
//! scripts.

/// Frame counter and host-timestamp to `dt` conversion.
pub mod clock;
/// Configuration types for engines and simulations.
pub mod config;
/// The engine facade: surfaces, running simulations, and handles.
pub mod engine;
/// Error types for the runtime crate.
pub mod error;
/// Evaluation of bound handlers.
pub mod interpreter;
/// Per-simulation frame loop.
pub mod scheduler;
/// The contract between simulations and whatever displays them.
pub mod surface;

/// Re-export of [`clock::FrameClock`].
pub use clock::FrameClock;
/// Re-exports of [`config::EngineConfig`] and its defaults.
pub use config::{DEFAULT_MAX_FRAME_DT, DEFAULT_TICK_EVENT, EngineConfig};
/// Re-exports of [`engine::Engine`] and [`engine::SimulationHandle`].
pub use engine::{Engine, SimulationHandle};
/// Re-exports of [`error::EngineError`] and [`error::EngineResult`].
pub use error::{EngineError, EngineResult};
/// Re-export of [`interpreter::DispatchStats`].
pub use interpreter::DispatchStats;
/// Re-exports of [`scheduler::Scheduler`] and [`scheduler::FrameReport`].
pub use scheduler::{FrameReport, Scheduler};
/// Re-exports of [`surface::FrameSnapshot`], [`surface::RecordingSurface`], and [`surface::RenderSurface`].
pub use surface::{FrameSnapshot, RecordingSurface, RenderSurface};
