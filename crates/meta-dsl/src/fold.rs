//! Constant folding over the AST.

use meta_core::Value;

use crate::ast::{Expr, Script, Spanned};

/// Fold every constant sub-expression in the script, in place.
pub fn fold_script(script: &mut Script) {
    for decl in &mut script.entities {
        for handler in &mut decl.node.handlers {
            for stmt in &mut handler.node.body {
                for arg in &mut stmt.node.args {
                    fold_expr(arg);
                }
            }
        }
    }
}

/// Fold `expr` bottom-up. Literal-only operations become a single literal;
/// division by zero folds to the IEEE result.
pub fn fold_expr(expr: &mut Spanned<Expr>) {
    let folded = match &mut expr.node {
        Expr::Number(_) | Expr::Ident(_) => None,
        Expr::Field(base, _) => {
            fold_expr(base);
            None
        }
        Expr::Neg(inner) => {
            fold_expr(inner);
            match inner.node {
                Expr::Number(n) => Some(-n),
                _ => None,
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            fold_expr(lhs);
            fold_expr(rhs);
            match (&lhs.node, &rhs.node) {
                (Expr::Number(a), Expr::Number(b)) => {
                    Value::binary(*op, Value::Scalar(*a), Value::Scalar(*b)).as_scalar()
                }
                _ => None,
            }
        }
    };
    if let Some(n) = folded {
        expr.node = Expr::Number(n);
    }
}

/// Number of operator nodes that folding would eliminate.
pub fn foldable_ops(expr: &Expr) -> usize {
    fn count(expr: &Expr) -> (usize, bool) {
        match expr {
            Expr::Number(_) => (0, true),
            Expr::Ident(_) => (0, false),
            Expr::Field(base, _) => (count(&base.node).0, false),
            Expr::Neg(inner) => {
                let (n, constant) = count(&inner.node);
                (n + usize::from(constant), constant)
            }
            Expr::Binary(_, l, r) => {
                let (ln, lc) = count(&l.node);
                let (rn, rc) = count(&r.node);
                let constant = lc && rc;
                (ln + rn + usize::from(constant), constant)
            }
        }
    }
    count(expr).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer, parser, printer};

    fn fold(expr: &str) -> Spanned<Expr> {
        let source = format!("entity A {{ components: [Physics]; on Tick(dt) {{ move({expr}); }} }}");
        let tokens = lexer::lex(&source).unwrap();
        let mut script = parser::parse(&source, &tokens).unwrap();
        fold_script(&mut script);
        script.statements().next().unwrap().node.args[0].clone()
    }

    #[test]
    fn folds_literal_arithmetic() {
        assert_eq!(fold("1 + 2 * 3").node, Expr::Number(7.0));
        assert_eq!(fold("-(4 / 2)").node, Expr::Number(-2.0));
        assert_eq!(fold("((0.5))").node, Expr::Number(0.5));
    }

    #[test]
    fn leaves_variables_alone() {
        let folded = fold("velocity * (2 * 0.5) + dt");
        assert_eq!(printer::print_expr(&folded.node), "velocity * 1 + dt");
    }

    #[test]
    fn left_associativity_limits_folding() {
        // (dt * 2) * 3: the literals never share a node.
        assert_eq!(printer::print_expr(&fold("dt * 2 * 3").node), "dt * 2 * 3");
        assert_eq!(printer::print_expr(&fold("dt * (2 * 3)").node), "dt * 6");
    }

    #[test]
    fn division_by_zero_follows_ieee() {
        assert_eq!(fold("1 / 0").node, Expr::Number(f64::INFINITY));
        assert!(matches!(fold("0 / 0").node, Expr::Number(n) if n.is_nan()));
    }

    #[test]
    fn folded_span_covers_the_original_expression() {
        let folded = fold("1 + 2");
        assert!(folded.span.end - folded.span.start >= 5);
    }

    #[test]
    fn counts_foldable_operators() {
        assert_eq!(foldable_ops(&fold_free("1 + 2 * 3")), 2);
        assert_eq!(foldable_ops(&fold_free("velocity * dt")), 0);
        assert_eq!(foldable_ops(&fold_free("-1 + dt")), 1);
    }

    fn fold_free(expr: &str) -> Expr {
        let source = format!("entity A {{ components: [Physics]; on Tick(dt) {{ move({expr}); }} }}");
        let tokens = lexer::lex(&source).unwrap();
        let script = parser::parse(&source, &tokens).unwrap();
        script.statements().next().unwrap().node.args[0].node.clone()
    }
}
