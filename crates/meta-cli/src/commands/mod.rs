pub mod check;
pub mod fmt;
pub mod run;
pub mod stats;

use std::path::Path;

use meta_core::Vec3;
use meta_dsl::diagnostics::{Diagnostic, Severity, render_diagnostics};

/// Read a script file into a string.
fn read_script(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read '{}': {e}", path.display()))
}

/// Print diagnostics to stderr using ariadne, followed by a count line.
fn print_diagnostics(source: &str, path: &Path, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    let filename = path.display().to_string();
    let rendered = render_diagnostics(source, &filename, diagnostics);
    eprint!("{rendered}");

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = diagnostics.len() - errors;
    eprintln!(
        "  {} error{}, {} warning{}",
        errors,
        if errors == 1 { "" } else { "s" },
        warnings,
        if warnings == 1 { "" } else { "s" },
    );
}

/// Parse `x,y,z` into a vector.
pub fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let lanes = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid number '{}' in '{s}'", part.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    match lanes.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected three comma-separated numbers, got '{s}'")),
    }
}

/// Format a vector for table cells.
fn format_vec3(v: Option<Vec3>) -> String {
    match v {
        Some(v) => format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z),
        None => "--".to_string(),
    }
}
