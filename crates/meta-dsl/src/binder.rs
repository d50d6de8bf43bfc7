use std::collections::HashSet;

use log::debug;
use meta_core::{
    Axis, BinaryOp, BoundCall, BoundExpr, BoundHandler, Builtin, ComponentDefaults,
    ComponentKind, ComponentSet, Entity, EntityProgram, Field, Program, Registry,
    ResolutionError, Value, ValueType,
};

use crate::ast::*;

/// Resolve a parsed script into a registry of entities and their bound
/// handlers.
///
/// Binding walks the declarations in order:
/// 1. map component names to [`ComponentKind`]s and build the entity from `defaults`
/// 2. resolve each call against the builtin table, check the entity has the
///    component it mutates, and type-check its arguments
///
/// The first error aborts binding.
pub fn bind(
    script: &Script,
    defaults: &ComponentDefaults,
) -> Result<(Registry, Program), ResolutionError> {
    let mut registry = Registry::new();
    let mut program = Program::new();

    for decl in &script.entities {
        let decl = &decl.node;
        let kinds = component_kinds(decl)?;
        let components = defaults.components_for(&decl.name.node, &kinds);

        let binder = Binder {
            entity: &decl.name.node,
            components: &components,
        };
        let handlers = binder.bind_handlers(&decl.handlers)?;
        debug!(
            "bound entity `{}` with {:?} and {} handler(s)",
            decl.name.node,
            kinds,
            handlers.len()
        );

        registry
            .insert(Entity::new(decl.name.node.clone(), components))
            .map_err(|_| ResolutionError::DuplicateEntity {
                entity: decl.name.node.clone(),
                span: decl.name.span.clone(),
            })?;
        program.push(EntityProgram { handlers });
    }

    Ok((registry, program))
}

fn component_kinds(decl: &EntityDecl) -> Result<Vec<ComponentKind>, ResolutionError> {
    let mut kinds = Vec::with_capacity(decl.components.len());
    for name in &decl.components {
        let kind = ComponentKind::parse(&name.node).ok_or_else(|| {
            ResolutionError::UnknownComponent {
                entity: decl.name.node.clone(),
                component: name.node.clone(),
                span: name.span.clone(),
            }
        })?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

struct Binder<'a> {
    entity: &'a str,
    components: &'a ComponentSet,
}

impl Binder<'_> {
    fn bind_handlers(
        &self,
        handlers: &[Spanned<EventHandler>],
    ) -> Result<Vec<BoundHandler>, ResolutionError> {
        let mut seen = HashSet::new();
        let mut bound = Vec::with_capacity(handlers.len());
        for handler in handlers {
            let handler = &handler.node;
            if !seen.insert(handler.event.node.as_str()) {
                return Err(ResolutionError::DuplicateHandler {
                    entity: self.entity.to_string(),
                    event: handler.event.node.clone(),
                    span: handler.event.span.clone(),
                });
            }
            let body = handler
                .body
                .iter()
                .map(|stmt| self.bind_call(&handler.param.node, stmt))
                .collect::<Result<Vec<_>, _>>()?;
            bound.push(BoundHandler {
                event: handler.event.node.clone(),
                param: handler.param.node.clone(),
                body,
            });
        }
        Ok(bound)
    }

    fn bind_call(
        &self,
        param: &str,
        stmt: &Spanned<Statement>,
    ) -> Result<BoundCall, ResolutionError> {
        let call = &stmt.node;
        let builtin =
            Builtin::lookup(&call.name.node).ok_or_else(|| ResolutionError::UnknownBuiltin {
                entity: self.entity.to_string(),
                name: call.name.node.clone(),
                span: call.name.span.clone(),
            })?;

        let required = builtin.required_component();
        if !self.components.has(required) {
            return Err(ResolutionError::MissingComponent {
                entity: self.entity.to_string(),
                builtin: builtin.name().to_string(),
                component: required,
                span: stmt.span.clone(),
            });
        }

        let params = builtin.params();
        if params.len() != call.args.len() {
            return Err(ResolutionError::Arity {
                entity: self.entity.to_string(),
                builtin: builtin.name().to_string(),
                expected: params.len(),
                found: call.args.len(),
                span: stmt.span.clone(),
            });
        }

        let mut args = Vec::with_capacity(params.len());
        for (i, (arg, expected)) in call.args.iter().zip(params).enumerate() {
            let (expr, found) = self.bind_expr(param, arg)?;
            if !expected.accepts(found) {
                return Err(ResolutionError::ArgumentType {
                    entity: self.entity.to_string(),
                    builtin: builtin.name().to_string(),
                    position: i + 1,
                    expected: expected.value_type(),
                    found,
                    span: arg.span.clone(),
                });
            }
            args.push(expr);
        }

        Ok(BoundCall {
            builtin,
            args,
            span: stmt.span.clone(),
        })
    }

    fn bind_expr(
        &self,
        param: &str,
        expr: &Spanned<Expr>,
    ) -> Result<(BoundExpr, ValueType), ResolutionError> {
        match &expr.node {
            Expr::Number(n) => Ok((BoundExpr::Const(Value::Scalar(*n)), ValueType::Scalar)),
            Expr::Ident(name) if name == param => Ok((BoundExpr::Param, ValueType::Scalar)),
            Expr::Ident(name) => {
                let field = Field::parse(name).ok_or_else(|| ResolutionError::UnknownVariable {
                    entity: self.entity.to_string(),
                    name: name.clone(),
                    span: expr.span.clone(),
                })?;
                if !self.components.has(field.component()) {
                    return Err(ResolutionError::UnreadableVariable {
                        entity: self.entity.to_string(),
                        variable: name.clone(),
                        component: field.component(),
                        span: expr.span.clone(),
                    });
                }
                Ok((BoundExpr::Field(field), ValueType::Vector))
            }
            Expr::Field(base, field) => {
                let axis =
                    Axis::parse(&field.node).ok_or_else(|| ResolutionError::UnknownField {
                        entity: self.entity.to_string(),
                        field: field.node.clone(),
                        span: field.span.clone(),
                    })?;
                let (base, ty) = self.bind_expr(param, base)?;
                if ty == ValueType::Scalar {
                    return Err(ResolutionError::FieldOnScalar {
                        entity: self.entity.to_string(),
                        field: field.node.clone(),
                        span: expr.span.clone(),
                    });
                }
                Ok((BoundExpr::Lane(Box::new(base), axis), ValueType::Scalar))
            }
            Expr::Neg(inner) => {
                let (inner, ty) = self.bind_expr(param, inner)?;
                Ok((BoundExpr::Neg(Box::new(inner)), ty))
            }
            Expr::Binary(op, lhs, rhs) => {
                let (l, lt) = self.bind_expr(param, lhs)?;
                let (r, rt) = self.bind_expr(param, rhs)?;
                Ok((
                    BoundExpr::Binary(*op, Box::new(l), Box::new(r)),
                    BinaryOp::result_type(lt, rt),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer, parser};
    use meta_core::{EntityId, Vec3};

    fn bind_source(source: &str) -> Result<(Registry, Program), ResolutionError> {
        bind_with(source, &ComponentDefaults::default())
    }

    fn bind_with(
        source: &str,
        defaults: &ComponentDefaults,
    ) -> Result<(Registry, Program), ResolutionError> {
        let tokens = lexer::lex(source).unwrap();
        let script = parser::parse(source, &tokens).unwrap();
        bind(&script, defaults)
    }

    fn tick(components: &str, body: &str) -> String {
        format!("entity E {{ components: [{components}]; on Tick(dt) {{ {body} }} }}")
    }

    #[test]
    fn bind_cube() {
        let (registry, program) = bind_source(
            "entity Cube {
                components: [Transform, Physics];
                on Tick(dt) { rotateX(0.01); rotateY(0.015); rotateZ(0.02); }
            }",
        )
        .unwrap();
        let cube = registry.entity("Cube").unwrap();
        assert!(cube.has(ComponentKind::Transform));
        assert!(cube.has(ComponentKind::Physics));

        let handler = program.handler(cube.id, "Tick").unwrap();
        let builtins: Vec<_> = handler.body.iter().map(|c| c.builtin).collect();
        assert_eq!(
            builtins,
            vec![Builtin::RotateX, Builtin::RotateY, Builtin::RotateZ]
        );
        assert_eq!(
            handler.body[1].args,
            vec![BoundExpr::Const(Value::Scalar(0.015))]
        );
    }

    #[test]
    fn entities_keep_declaration_order() {
        let (registry, program) = bind_source(
            "entity B { components: [Physics]; } entity A { components: [Transform]; }",
        )
        .unwrap();
        let names: Vec<_> = registry.entities().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(registry.entity("A").unwrap().id, EntityId(1));
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn velocity_times_dt_binds_to_vector() {
        let (_, program) = bind_source(&tick("Physics", "move(velocity * dt);")).unwrap();
        let call = &program.handler(EntityId(0), "Tick").unwrap().body[0];
        assert_eq!(
            call.args[0],
            BoundExpr::Binary(
                BinaryOp::Mul,
                Box::new(BoundExpr::Field(Field::Velocity)),
                Box::new(BoundExpr::Param)
            )
        );
    }

    #[test]
    fn defaults_initialise_components() {
        let defaults = ComponentDefaults::default()
            .with_velocity(Vec3::new(1.0, 0.0, 0.0))
            .with_entity_position("E", Vec3::new(0.0, 5.0, 0.0));
        let (registry, _) = bind_with(&tick("Physics", ""), &defaults).unwrap();
        let physics = registry.entity("E").unwrap().components.physics.unwrap();
        assert_eq!(physics.velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(physics.position, Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn unknown_component() {
        let err = bind_source("entity A { components: [Physics, Health]; }").unwrap_err();
        assert_eq!(
            err,
            ResolutionError::UnknownComponent {
                entity: "A".into(),
                component: "Health".into(),
                span: 33..39,
            }
        );
    }

    #[test]
    fn component_names_are_case_sensitive() {
        let err = bind_source("entity A { components: [physics]; }").unwrap_err();
        assert!(matches!(err, ResolutionError::UnknownComponent { .. }));
    }

    #[test]
    fn rotate_without_transform_is_missing_component() {
        let source = "entity Plane { components: [Physics]; on Tick(dt) { rotateX(0.1); } }";
        let err = bind_source(source).unwrap_err();
        match &err {
            ResolutionError::MissingComponent {
                entity,
                builtin,
                component,
                span,
            } => {
                assert_eq!(entity, "Plane");
                assert_eq!(builtin, "rotateX");
                assert_eq!(*component, ComponentKind::Transform);
                assert_eq!(span.start, source.find("rotateX").unwrap());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("Transform"));
    }

    #[test]
    fn move_without_physics_is_missing_component() {
        let err = bind_source(&tick("Transform", "move(1);")).unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::MissingComponent {
                component: ComponentKind::Physics,
                ..
            }
        ));
    }

    #[test]
    fn unknown_builtin() {
        let err = bind_source(&tick("Physics", "takeDamage(10);")).unwrap_err();
        assert!(matches!(err, ResolutionError::UnknownBuiltin { ref name, .. } if name == "takeDamage"));
    }

    #[test]
    fn reading_a_field_requires_its_component() {
        let err = bind_source(&tick("Transform", "rotateX(velocity.x);")).unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::UnreadableVariable {
                component: ComponentKind::Physics,
                ..
            }
        ));
    }

    #[test]
    fn unknown_variable() {
        let err = bind_source(&tick("Physics", "move(speed);")).unwrap_err();
        assert!(matches!(err, ResolutionError::UnknownVariable { ref name, .. } if name == "speed"));
    }

    #[test]
    fn handler_parameter_name_is_scoped_to_its_handler() {
        let source = "entity E { components: [Physics];
            on Tick(dt) { move(dt); }
            on Push(force) { move(dt); } }";
        let err = bind_source(source).unwrap_err();
        assert!(matches!(err, ResolutionError::UnknownVariable { ref name, .. } if name == "dt"));
    }

    #[test]
    fn lane_access() {
        let (_, program) =
            bind_source(&tick("Transform, Physics", "rotateX(velocity.x * dt);")).unwrap();
        let call = &program.handler(EntityId(0), "Tick").unwrap().body[0];
        assert!(matches!(
            &call.args[0],
            BoundExpr::Binary(BinaryOp::Mul, lhs, _)
                if **lhs == BoundExpr::Lane(Box::new(BoundExpr::Field(Field::Velocity)), Axis::X)
        ));
    }

    #[test]
    fn field_on_scalar() {
        let err = bind_source(&tick("Transform", "rotateX(dt.x);")).unwrap_err();
        assert!(matches!(err, ResolutionError::FieldOnScalar { .. }));
    }

    #[test]
    fn unknown_field() {
        let err = bind_source(&tick("Physics", "move(velocity.w);")).unwrap_err();
        assert!(matches!(err, ResolutionError::UnknownField { ref field, .. } if field == "w"));
    }

    #[test]
    fn vector_argument_to_scalar_parameter() {
        let err = bind_source(&tick("Transform, Physics", "rotateX(velocity);")).unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::ArgumentType {
                position: 1,
                expected: ValueType::Scalar,
                found: ValueType::Vector,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "entity `E` passes a vector as argument 1 of `rotateX`, expected a scalar"
        );
    }

    #[test]
    fn scalar_argument_to_vector_parameter_is_accepted() {
        assert!(bind_source(&tick("Physics", "move(dt);")).is_ok());
    }

    #[test]
    fn arity_is_checked() {
        let err = bind_source(&tick("Physics", "move(1, 2);")).unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::Arity {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn duplicate_handler() {
        let source = "entity E { components: [Physics];
            on Tick(dt) { move(dt); }
            on Tick(t) { move(t); } }";
        let err = bind_source(source).unwrap_err();
        assert!(matches!(err, ResolutionError::DuplicateHandler { ref event, .. } if event == "Tick"));
    }

    #[test]
    fn duplicate_entity_in_hand_built_script() {
        let decl = Spanned::new(
            EntityDecl {
                name: Spanned::new("A".to_string(), 7..8),
                components: vec![Spanned::new("Physics".to_string(), 0..0)],
                handlers: vec![],
            },
            0..0,
        );
        let script = Script {
            entities: vec![decl.clone(), decl],
        };
        let err = bind(&script, &ComponentDefaults::default()).unwrap_err();
        assert!(matches!(err, ResolutionError::DuplicateEntity { .. }));
    }

    #[test]
    fn first_error_wins() {
        let source = "entity A { components: [Physics]; on Tick(dt) { rotateX(1); } }
            entity B { components: [Nope]; }";
        let err = bind_source(source).unwrap_err();
        assert_eq!(err.entity(), "A");
    }
}
