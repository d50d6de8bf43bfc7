use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use serde_json::{Map, Value, json};

use meta_dsl::ScriptStats;
use meta_dsl::stats::Category;

pub fn run(dir: &Path, top: usize, as_json: bool) -> Result<(), String> {
    let files = meta_dsl::script_files(dir)
        .map_err(|e| format!("cannot read directory '{}': {e}", dir.display()))?;
    if files.is_empty() {
        return Err(format!(
            "no .{} files found in '{}'",
            meta_dsl::SCRIPT_EXTENSION,
            dir.display()
        ));
    }

    let mut stats = ScriptStats::default();
    let mut skipped = 0;
    for file in &files {
        let source = super::read_script(file)?;
        match meta_dsl::parse_source(&source) {
            Ok(script) => stats.merge(&ScriptStats::collect(&script)),
            Err(errors) => {
                skipped += 1;
                eprintln!(
                    "  {} '{}' ({} syntax error{})",
                    "skipping".yellow(),
                    file.display(),
                    errors.len(),
                    if errors.len() == 1 { "" } else { "s" },
                );
            }
        }
    }

    if as_json {
        println!("{}", to_json(&stats, top, skipped));
        return Ok(());
    }

    println!(
        "  {} scripts, {} entities, {} handlers, {} statements",
        stats.scripts, stats.entities, stats.handlers, stats.statements
    );
    if skipped > 0 {
        println!("  {skipped} skipped");
    }

    for category in Category::ALL {
        let entries = stats.top(category, top);
        if entries.is_empty() {
            continue;
        }
        println!();
        println!("  {}", category.title().bold().underline());
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Name", "Count"]);
        for (name, count) in entries {
            table.add_row(vec![name.to_string(), count.to_string()]);
        }
        println!("{table}");
    }

    Ok(())
}

fn to_json(stats: &ScriptStats, top: usize, skipped: usize) -> Value {
    let mut tables = Map::new();
    for category in Category::ALL {
        let entries: Vec<Value> = stats
            .top(category, top)
            .into_iter()
            .map(|(name, count)| json!({ "name": name, "count": count }))
            .collect();
        tables.insert(category.title().to_string(), Value::Array(entries));
    }
    json!({
        "scripts": stats.scripts,
        "skipped": skipped,
        "entities": stats.entities,
        "handlers": stats.handlers,
        "statements": stats.statements,
        "top": tables,
    })
}
