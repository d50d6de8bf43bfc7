use std::ops::Range;

use crate::component::ComponentKind;
use crate::entity::EntityId;
use crate::value::ValueType;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised when manipulating a registry directly.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// The requested entity ID does not exist.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// An entity with the same name already exists.
    #[error("entity already exists: \"{0}\"")]
    DuplicateName(String),
}

/// Load-time failures binding a parsed script to components and builtins.
///
/// Every variant names the entity it occurred in and carries the byte span
/// of the offending source text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolutionError {
    /// A declared component name is not a known component kind.
    #[error("entity `{entity}` declares unknown component `{component}`")]
    UnknownComponent {
        /// The declaring entity.
        entity: String,
        /// The unrecognized component name.
        component: String,
        /// Span of the component name.
        span: Range<usize>,
    },

    /// A handler calls a function that is not in the builtin table.
    #[error("entity `{entity}` calls unknown builtin `{name}`")]
    UnknownBuiltin {
        /// The calling entity.
        entity: String,
        /// The unrecognized function name.
        name: String,
        /// Span of the function name.
        span: Range<usize>,
    },

    /// A builtin is called on an entity lacking the component it mutates.
    #[error("entity `{entity}` calls `{builtin}`, which requires missing component `{component}`")]
    MissingComponent {
        /// The calling entity.
        entity: String,
        /// The builtin that was called.
        builtin: String,
        /// The component the builtin requires.
        component: ComponentKind,
        /// Span of the call.
        span: Range<usize>,
    },

    /// An expression reads a component field the entity does not have.
    #[error("entity `{entity}` reads `{variable}`, which requires missing component `{component}`")]
    UnreadableVariable {
        /// The reading entity.
        entity: String,
        /// The field that was read.
        variable: String,
        /// The component owning the field.
        component: ComponentKind,
        /// Span of the identifier.
        span: Range<usize>,
    },

    /// An identifier is neither the handler parameter nor a component field.
    #[error("entity `{entity}` uses unknown variable `{name}`")]
    UnknownVariable {
        /// The entity whose handler uses the name.
        entity: String,
        /// The unresolved identifier.
        name: String,
        /// Span of the identifier.
        span: Range<usize>,
    },

    /// A field access names something other than `x`, `y`, or `z`.
    #[error("entity `{entity}` accesses unknown field `.{field}`")]
    UnknownField {
        /// The entity whose handler uses the field.
        entity: String,
        /// The unrecognized field name.
        field: String,
        /// Span of the field access.
        span: Range<usize>,
    },

    /// A field access is applied to a scalar expression.
    #[error("entity `{entity}` accesses `.{field}` on a scalar")]
    FieldOnScalar {
        /// The entity whose handler uses the field.
        entity: String,
        /// The field name.
        field: String,
        /// Span of the field access.
        span: Range<usize>,
    },

    /// A builtin argument has the wrong type.
    #[error(
        "entity `{entity}` passes a {found} as argument {position} of `{builtin}`, expected a {expected}"
    )]
    ArgumentType {
        /// The calling entity.
        entity: String,
        /// The builtin that was called.
        builtin: String,
        /// One-based argument position.
        position: usize,
        /// The type the builtin accepts.
        expected: ValueType,
        /// The type the argument has.
        found: ValueType,
        /// Span of the argument.
        span: Range<usize>,
    },

    /// A builtin is called with the wrong number of arguments.
    #[error("entity `{entity}` calls `{builtin}` with {found} argument(s), expected {expected}")]
    Arity {
        /// The calling entity.
        entity: String,
        /// The builtin that was called.
        builtin: String,
        /// Number of parameters the builtin takes.
        expected: usize,
        /// Number of arguments supplied.
        found: usize,
        /// Span of the call.
        span: Range<usize>,
    },

    /// Two entities share a name.
    #[error("entity `{entity}` is declared more than once")]
    DuplicateEntity {
        /// The repeated entity name.
        entity: String,
        /// Span of the second declaration's name.
        span: Range<usize>,
    },

    /// Two handlers for the same event on one entity.
    #[error("entity `{entity}` has more than one `{event}` handler")]
    DuplicateHandler {
        /// The declaring entity.
        entity: String,
        /// The repeated event name.
        event: String,
        /// Span of the second handler's event name.
        span: Range<usize>,
    },
}

impl ResolutionError {
    /// The entity the error occurred in.
    pub fn entity(&self) -> &str {
        match self {
            Self::UnknownComponent { entity, .. }
            | Self::UnknownBuiltin { entity, .. }
            | Self::MissingComponent { entity, .. }
            | Self::UnreadableVariable { entity, .. }
            | Self::UnknownVariable { entity, .. }
            | Self::UnknownField { entity, .. }
            | Self::FieldOnScalar { entity, .. }
            | Self::ArgumentType { entity, .. }
            | Self::Arity { entity, .. }
            | Self::DuplicateEntity { entity, .. }
            | Self::DuplicateHandler { entity, .. } => entity,
        }
    }

    /// Byte span of the offending source text.
    pub fn span(&self) -> Range<usize> {
        match self {
            Self::UnknownComponent { span, .. }
            | Self::UnknownBuiltin { span, .. }
            | Self::MissingComponent { span, .. }
            | Self::UnreadableVariable { span, .. }
            | Self::UnknownVariable { span, .. }
            | Self::UnknownField { span, .. }
            | Self::FieldOnScalar { span, .. }
            | Self::ArgumentType { span, .. }
            | Self::Arity { span, .. }
            | Self::DuplicateEntity { span, .. }
            | Self::DuplicateHandler { span, .. } => span.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_component_message_names_entity_and_component() {
        let e = ResolutionError::MissingComponent {
            entity: "Plane".into(),
            builtin: "rotateX".into(),
            component: ComponentKind::Transform,
            span: 40..50,
        };
        assert_eq!(
            e.to_string(),
            "entity `Plane` calls `rotateX`, which requires missing component `Transform`"
        );
        assert_eq!(e.entity(), "Plane");
        assert_eq!(e.span(), 40..50);
    }
}
