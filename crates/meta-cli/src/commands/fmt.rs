use std::path::Path;

use meta_dsl::SyntaxError;
use meta_dsl::printer::print_script;

pub fn run(file: &Path, write: bool, check: bool) -> Result<(), String> {
    let source = super::read_script(file)?;

    let script = match meta_dsl::parse_source(&source) {
        Ok(script) => script,
        Err(errors) => {
            let diagnostics: Vec<_> = errors.iter().map(SyntaxError::to_diagnostic).collect();
            super::print_diagnostics(&source, file, &diagnostics);
            return Err(format!("cannot format '{}'", file.display()));
        }
    };

    let formatted = print_script(&script);
    let unchanged = formatted == source;

    if check {
        if unchanged {
            println!("  '{}' is formatted.", file.display());
            return Ok(());
        }
        return Err(format!("'{}' is not formatted", file.display()));
    }

    if write {
        if unchanged {
            println!("  '{}' already formatted.", file.display());
        } else {
            std::fs::write(file, &formatted)
                .map_err(|e| format!("cannot write '{}': {e}", file.display()))?;
            println!("  Formatted '{}'.", file.display());
        }
        return Ok(());
    }

    print!("{formatted}");
    Ok(())
}
