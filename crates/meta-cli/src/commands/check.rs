use std::path::Path;

use meta_core::ComponentDefaults;
use meta_dsl::ScriptStats;
use meta_dsl::diagnostics::lint;

pub fn run(file: &Path) -> Result<(), String> {
    let source = super::read_script(file)?;

    match meta_dsl::load(&source, &ComponentDefaults::default()) {
        Ok(loaded) => {
            super::print_diagnostics(&source, file, &lint(&loaded.script));
            let stats = ScriptStats::collect(&loaded.script);
            println!("  All checks passed for '{}'.", file.display());
            println!(
                "  {} entities, {} handlers, {} statements",
                stats.entities, stats.handlers, stats.statements
            );
            Ok(())
        }
        Err(err) => {
            super::print_diagnostics(&source, file, &err.diagnostics());
            Err(format!("check failed: {err}"))
        }
    }
}
