//! `sextant analyze` command implementation.

use std::path::Path;
use std::time::Instant;

use colored::Colorize;
use sextant::store::SqliteSink;

/// Run the analyze command.
pub fn run(
    program: &Path,
    project: &str,
    db: &Path,
    clean: bool,
    export: Option<&Path>,
) -> Result<(), sextant::Error> {
    println!("{} {}...", "Analyzing".cyan().bold(), program.display());
    let start = Instant::now();

    let program = sextant::load_program(program)?;
    let analysis = sextant::analyze(&program, project)?;

    // Display results
    println!();
    println!(
        "{} {} packages, {} structs, {} interfaces, {} functions",
        "Extracted".green().bold(),
        analysis.stats.packages,
        analysis.stats.structs,
        analysis.stats.interfaces,
        analysis.stats.functions
    );
    println!(
        "{} {} call edges, {} implements edges",
        "Resolved".green().bold(),
        analysis.stats.calls,
        analysis.stats.implements
    );

    if analysis.stats.packages_with_errors > 0 {
        println!(
            "{}: {} packages (front-end type errors)",
            "Skipped".yellow(),
            analysis.stats.packages_with_errors
        );
    }

    if let Some(path) = export {
        std::fs::write(path, serde_json::to_string_pretty(&analysis)?)?;
        println!("{} {}", "Exported".green().bold(), path.display());
    }

    if clean {
        println!("{}", "Replacing existing graph contents".yellow());
    }
    let mut sink = SqliteSink::open(db)?;
    sextant::load(&analysis, &mut sink, clean)?;

    println!("{} {}", "Loaded".green().bold(), db.display());
    println!("{}: {:.2?}", "Duration".dimmed(), start.elapsed());

    Ok(())
}
