//! Core types for Metascript: vectors, components, entities, and bound programs.
//!
//! This crate defines the data model that scripts compile into. It is
//! independent of the parser: a [`Registry`] and a [`Program`] can be built
//! programmatically, and the runtime only ever sees these types.

/// Builtin functions callable from event handlers.
pub mod builtin;
/// Component kinds, component data, and configurable defaults.
pub mod component;
/// Entity identifiers and runtime entity records.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Bound (resolved) handler programs.
pub mod program;
/// The authoritative set of live entities.
pub mod registry;
/// Runtime values and arithmetic.
pub mod value;
/// Three-lane vector math.
pub mod vec3;

/// Re-export builtin types.
pub use builtin::{Builtin, ParamType};
/// Re-export component types.
pub use component::{ComponentDefaults, ComponentKind, ComponentSet, Physics, Transform};
/// Re-export entity types.
pub use entity::{Entity, EntityId};
/// Re-export error types.
pub use error::{CoreError, CoreResult, ResolutionError};
/// Re-export program types.
pub use program::{BoundCall, BoundExpr, BoundHandler, EntityProgram, Field, Program};
/// Re-export registry types.
pub use registry::{EntitySnapshot, Registry};
/// Re-export value types.
pub use value::{Axis, BinaryOp, Value, ValueType};
/// Re-export vector type.
pub use vec3::Vec3;
