//! Canonical source printer.
//!
//! Output is stable: two-space indentation, one statement per line, a blank
//! line between sections, and parentheses only where precedence requires
//! them. Printing a parsed script and parsing the result yields an equal AST.
//! Non-finite literals, which only constant folding can produce, print as the
//! divisions that fold back to them.

use std::fmt::Write;

use crate::ast::{EntityDecl, EventHandler, Expr, Script, Spanned, Statement};

const INDENT: &str = "  ";

/// Render a whole script in canonical form.
pub fn print_script(script: &Script) -> String {
    let mut out = String::new();
    for (i, decl) in script.entities.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        print_entity(&mut out, &decl.node);
    }
    out
}

fn print_entity(out: &mut String, decl: &EntityDecl) {
    let components: Vec<&str> = decl.components.iter().map(|c| c.node.as_str()).collect();
    let _ = writeln!(out, "entity {} {{", decl.name.node);
    let _ = writeln!(out, "{INDENT}components: [{}];", components.join(", "));
    for handler in &decl.handlers {
        out.push('\n');
        print_handler(out, &handler.node);
    }
    out.push_str("}\n");
}

fn print_handler(out: &mut String, handler: &EventHandler) {
    let _ = write!(
        out,
        "{INDENT}on {}({}) {{",
        handler.event.node, handler.param.node
    );
    if handler.body.is_empty() {
        out.push_str("}\n");
        return;
    }
    out.push('\n');
    for stmt in &handler.body {
        let _ = writeln!(out, "{INDENT}{INDENT}{}", print_statement(&stmt.node));
    }
    let _ = writeln!(out, "{INDENT}}}");
}

/// Render a single statement, including the trailing semicolon.
pub fn print_statement(stmt: &Statement) -> String {
    let args: Vec<String> = stmt.args.iter().map(|a| print_expr(&a.node)).collect();
    format!("{}({});", stmt.name.node, args.join(", "))
}

/// Render an expression with minimal parentheses.
pub fn print_expr(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

fn write_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Number(n) if n.is_nan() => out.push_str("(0 / 0)"),
        Expr::Number(n) if n.is_infinite() => {
            out.push_str(if *n > 0.0 { "(1 / 0)" } else { "(-1 / 0)" });
        }
        Expr::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Expr::Ident(name) => out.push_str(name),
        Expr::Field(base, field) => {
            // `1.x` would not lex as a field access, so literals get parens too.
            let wrap = !matches!(base.node, Expr::Ident(_) | Expr::Field(_, _));
            write_operand(out, base, wrap);
            out.push('.');
            out.push_str(&field.node);
        }
        Expr::Neg(inner) => {
            out.push('-');
            write_operand(out, inner, matches!(inner.node, Expr::Binary(..)));
        }
        Expr::Binary(op, lhs, rhs) => {
            let prec = op.precedence();
            write_operand(out, lhs, lhs.node.precedence() < prec);
            let _ = write!(out, " {} ", op.symbol());
            write_operand(out, rhs, rhs.node.precedence() <= prec);
        }
    }
}

fn write_operand(out: &mut String, operand: &Spanned<Expr>, parens: bool) {
    if parens {
        out.push('(');
        write_expr(out, &operand.node);
        out.push(')');
    } else {
        write_expr(out, &operand.node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fold, lexer, parser};
    use meta_core::ComponentDefaults;
    use meta_core::BinaryOp;
    use proptest::prelude::*;

    fn parse(source: &str) -> Script {
        let tokens = lexer::lex(source).unwrap();
        parser::parse(source, &tokens).unwrap()
    }

    fn reprint(expr: &str) -> String {
        let source = format!("entity A {{ components: [Physics]; on Tick(dt) {{ move({expr}); }} }}");
        let script = parse(&source);
        print_expr(&script.statements().next().unwrap().node.args[0].node)
    }

    #[test]
    fn canonical_layout() {
        let script = parse(
            "entity Cube{components:[Transform,Physics];on Tick(dt){rotateX(0.01);rotateY(0.015);rotateZ(0.02);}}
             entity Plane { components: [Physics]; on Tick(dt) { move(velocity*dt); } on Reset(t) { } }",
        );
        insta::assert_snapshot!(print_script(&script), @r"
        entity Cube {
          components: [Transform, Physics];

          on Tick(dt) {
            rotateX(0.01);
            rotateY(0.015);
            rotateZ(0.02);
          }
        }

        entity Plane {
          components: [Physics];

          on Tick(dt) {
            move(velocity * dt);
          }

          on Reset(t) {}
        }
        ");
    }

    #[test]
    fn entity_without_handlers() {
        let script = parse("entity A { components: [Physics]; }");
        assert_eq!(print_script(&script), "entity A {\n  components: [Physics];\n}\n");
    }

    #[test]
    fn redundant_parentheses_are_dropped() {
        assert_eq!(reprint("((velocity) * (dt))"), "velocity * dt");
        assert_eq!(reprint("(1 * 2) + 3"), "1 * 2 + 3");
        assert_eq!(reprint("(1 - 2) - 3"), "1 - 2 - 3");
    }

    #[test]
    fn required_parentheses_are_kept() {
        assert_eq!(reprint("(1 + 2) * 3"), "(1 + 2) * 3");
        assert_eq!(reprint("1 - (2 - 3)"), "1 - (2 - 3)");
        assert_eq!(reprint("1 / (2 * 3)"), "1 / (2 * 3)");
        assert_eq!(reprint("-(1 + dt)"), "-(1 + dt)");
        assert_eq!(reprint("(velocity * dt).x"), "(velocity * dt).x");
    }

    #[test]
    fn unary_and_fields() {
        assert_eq!(reprint("- - dt"), "--dt");
        assert_eq!(reprint("-velocity.x"), "-velocity.x");
        assert_eq!(reprint("(-velocity).x"), "(-velocity).x");
    }

    #[test]
    fn numbers_keep_their_value() {
        assert_eq!(reprint("0.015"), "0.015");
        assert_eq!(reprint("2.0"), "2");
        assert_eq!(reprint("10"), "10");
    }

    #[test]
    fn non_finite_literals_print_as_divisions() {
        let source = "entity A { components: [Physics]; on Tick(dt) {
            move(1 / 0); accelerate(-(1 / 0)); setPosition(0 / 0); } }";
        let mut script = parse(source);
        fold::fold_script(&mut script);
        let printed = print_script(&script);
        assert!(printed.contains("move((1 / 0));"));
        assert!(printed.contains("accelerate((-1 / 0));"));
        assert!(printed.contains("setPosition((0 / 0));"));

        let mut reparsed = parse(&printed);
        fold::fold_script(&mut reparsed);
        assert_eq!(print_script(&reparsed), printed);
        assert!(crate::load(&printed, &ComponentDefaults::default()).is_ok());
    }

    fn sp(e: Expr) -> Box<Spanned<Expr>> {
        Box::new(Spanned::new(e, 0..0))
    }

    fn arb_expr() -> impl Strategy<Value = Expr> {
        let leaf = prop_oneof![
            (0u32..4000).prop_map(|n| Expr::Number(f64::from(n) / 8.0)),
            prop::sample::select(vec!["dt", "velocity", "position", "rotation"])
                .prop_map(|s| Expr::Ident(s.to_string())),
        ];
        leaf.prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|e| Expr::Neg(sp(e))),
                (inner.clone(), prop::sample::select(vec!["x", "y", "z"]))
                    .prop_map(|(e, f)| Expr::Field(sp(e), Spanned::new(f.to_string(), 0..0))),
                (
                    prop::sample::select(vec![
                        BinaryOp::Add,
                        BinaryOp::Sub,
                        BinaryOp::Mul,
                        BinaryOp::Div
                    ]),
                    inner.clone(),
                    inner
                )
                    .prop_map(|(op, l, r)| Expr::Binary(op, sp(l), sp(r))),
            ]
        })
    }

    /// Like [`arb_expr`] but with zeros, so folding can divide by zero.
    fn arb_folding_expr() -> impl Strategy<Value = Expr> {
        let leaf = prop_oneof![
            (0u32..8).prop_map(|n| Expr::Number(f64::from(n) / 2.0)),
            Just(Expr::Ident("dt".to_string())),
        ];
        leaf.prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|e| Expr::Neg(sp(e))),
                (
                    prop::sample::select(vec![
                        BinaryOp::Add,
                        BinaryOp::Sub,
                        BinaryOp::Mul,
                        BinaryOp::Div
                    ]),
                    inner.clone(),
                    inner
                )
                    .prop_map(|(op, l, r)| Expr::Binary(op, sp(l), sp(r))),
            ]
        })
    }

    proptest! {
        #[test]
        fn print_then_parse_is_identity(expr in arb_expr(), event in "[A-Z][a-z]{0,6}") {
            let script = Script {
                entities: vec![Spanned::new(
                    EntityDecl {
                        name: Spanned::new("E".to_string(), 0..0),
                        components: vec![Spanned::new("Physics".to_string(), 0..0)],
                        handlers: vec![Spanned::new(
                            EventHandler {
                                event: Spanned::new(event, 0..0),
                                param: Spanned::new("dt".to_string(), 0..0),
                                body: vec![Spanned::new(
                                    Statement {
                                        name: Spanned::new("move".to_string(), 0..0),
                                        args: vec![Spanned::new(expr, 0..0)],
                                    },
                                    0..0,
                                )],
                            },
                            0..0,
                        )],
                    },
                    0..0,
                )],
            };
            let printed = print_script(&script);
            let reparsed = parse(&printed);
            prop_assert_eq!(&reparsed, &script);
            prop_assert_eq!(print_script(&reparsed), printed);
        }

        #[test]
        fn folded_output_reparses_to_the_same_text(expr in arb_folding_expr()) {
            let source = format!(
                "entity E {{ components: [Physics]; on Tick(dt) {{ move({}); }} }}",
                print_expr(&expr)
            );
            let mut script = parse(&source);
            fold::fold_script(&mut script);
            let printed = print_script(&script);
            let mut reparsed = parse(&printed);
            fold::fold_script(&mut reparsed);
            prop_assert_eq!(print_script(&reparsed), printed);
        }
    }
}
