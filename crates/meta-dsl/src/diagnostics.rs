use ariadne::{Color, Label, Report, ReportKind, Source};
use meta_core::{Builtin, ResolutionError};
use std::collections::HashSet;
use std::fmt;

use crate::ast::Script;
use crate::lexer::{LexError, LexErrorKind};
use crate::parser::ParseError;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The script cannot be loaded.
    Error,
    /// The script loads, but probably not as intended.
    Warning,
}

/// A diagnostic message with source location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: Severity,
    /// Byte range the diagnostic points at.
    pub span: std::ops::Range<usize>,
    /// Headline message.
    pub message: String,
    /// Text attached to the underlined span; defaults to the message.
    pub label: Option<String>,
    /// Extra hint printed below the source excerpt.
    pub note: Option<String>,
}

impl Diagnostic {
    /// An error at `span`.
    pub fn error(span: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            span,
            message: message.into(),
            label: None,
            note: None,
        }
    }

    /// A warning at `span`.
    pub fn warning(span: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            span,
            message: message.into(),
            label: None,
            note: None,
        }
    }

    /// Set the span label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the note printed below the excerpt.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{prefix}: {}", self.message)
    }
}

impl From<&LexError> for Diagnostic {
    fn from(e: &LexError) -> Self {
        match e.kind {
            LexErrorKind::UnexpectedCharacter => {
                Diagnostic::error(e.span.clone(), format!("unexpected character {:?}", e.found))
                    .with_label("not valid here")
            }
            LexErrorKind::NumberOutOfRange => {
                Diagnostic::error(e.span.clone(), "number literal out of range")
                    .with_label("too large for a 64-bit float")
            }
        }
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(e: &ParseError) -> Self {
        let label = match &e.found {
            Some(tok) => format!("found `{tok}`"),
            None => "script ends here".to_string(),
        };
        Diagnostic::error(e.span.clone(), e.message.clone()).with_label(label)
    }
}

impl From<&ResolutionError> for Diagnostic {
    fn from(e: &ResolutionError) -> Self {
        let label = match e {
            ResolutionError::UnknownComponent { .. } => "not a component",
            ResolutionError::UnknownBuiltin { .. } => "not a builtin",
            ResolutionError::MissingComponent { .. } => "component not declared",
            ResolutionError::UnreadableVariable { .. } => "component not declared",
            ResolutionError::UnknownVariable { .. } => "not defined",
            ResolutionError::UnknownField { .. } => "expected x, y or z",
            ResolutionError::FieldOnScalar { .. } => "this is a scalar",
            ResolutionError::ArgumentType { .. } => "wrong type",
            ResolutionError::Arity { .. } => "wrong number of arguments",
            ResolutionError::DuplicateEntity { .. } => "declared again here",
            ResolutionError::DuplicateHandler { .. } => "handled again here",
        };
        let diag = Diagnostic::error(e.span(), e.to_string()).with_label(label);
        match e {
            ResolutionError::MissingComponent {
                entity, component, ..
            }
            | ResolutionError::UnreadableVariable {
                entity, component, ..
            } => diag.with_note(format!(
                "add `{component}` to the components of `{entity}`"
            )),
            ResolutionError::UnknownBuiltin { .. } => {
                let names: Vec<_> = Builtin::ALL.iter().map(|b| b.name()).collect();
                diag.with_note(format!("available builtins: {}", names.join(", ")))
            }
            _ => diag,
        }
    }
}

/// Render diagnostics using ariadne for pretty terminal output.
/// Render diagnostics against `source` with ariadne, one report each.
pub fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };
        let color = match diag.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let span = (filename, diag.span.clone());
        let mut report = Report::build(kind, span).with_message(&diag.message);

        let label_text = diag.label.as_deref().unwrap_or(&diag.message);
        report = report.with_label(
            Label::new((filename, diag.span.clone()))
                .with_message(label_text)
                .with_color(color),
        );
        if let Some(note) = &diag.note {
            report = report.with_note(note);
        }

        report
            .finish()
            .write((filename, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}

/// Warnings for scripts that load but likely contain a mistake.
///
/// Currently flags components declared more than once in one entity; the
/// binder keeps only the first.
pub fn lint(script: &Script) -> Vec<Diagnostic> {
    let mut warnings = Vec::new();
    for decl in &script.entities {
        let entity = &decl.node;
        let mut seen = HashSet::new();
        for component in &entity.components {
            if !seen.insert(component.node.as_str()) {
                warnings.push(
                    Diagnostic::warning(
                        component.span.clone(),
                        format!(
                            "component `{}` is declared more than once in entity `{}`",
                            component.node, entity.name.node
                        ),
                    )
                    .with_label("already declared")
                    .with_note("the repeat has no effect and can be removed"),
                );
            }
        }
    }
    warnings
}
