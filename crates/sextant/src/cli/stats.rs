//! `sextant stats` command implementation.

use std::path::Path;

use colored::Colorize;
use sextant::store::SqliteSink;

/// Run the stats command.
pub fn run(db: &Path) -> Result<(), sextant::Error> {
    let sink = SqliteSink::open(db)?;

    // Get database size
    let db_size_str = match std::fs::metadata(db) {
        Ok(meta) => format_size(meta.len()),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => {
                tracing::debug!("Database file not found");
                "not created".to_string()
            }
            std::io::ErrorKind::PermissionDenied => {
                tracing::warn!(path = %db.display(), "Permission denied reading database");
                "permission denied".to_string()
            }
            _ => {
                tracing::debug!(error = %e, "Failed to get database file size");
                "size unknown".to_string()
            }
        },
    };

    let stats = sink.stats()?;

    println!("{}", "Sextant Graph Statistics".cyan().bold());
    println!();

    // Database info
    println!(
        "  {}: {} ({})",
        "Database".white().bold(),
        db.display(),
        db_size_str
    );
    println!();

    // Node counts
    println!(
        "  {}: {}",
        "Packages".white().bold(),
        stats.packages.to_string().green()
    );
    println!(
        "  {}: {}",
        "Structs".white().bold(),
        stats.structs.to_string().green()
    );
    println!(
        "  {}: {}",
        "Interfaces".white().bold(),
        stats.interfaces.to_string().green()
    );
    println!(
        "  {}: {}",
        "Functions".white().bold(),
        stats.functions.to_string().green()
    );
    println!();

    // Edge counts
    println!(
        "  {}: {}",
        "Call Edges".white().bold(),
        stats.calls.to_string().green()
    );
    println!(
        "  {}: {}",
        "Implements Edges".white().bold(),
        stats.implements.to_string().green()
    );
    println!(
        "  {}: {}",
        "Method Links".white().bold(),
        stats.methods.to_string().green()
    );
    println!(
        "  {}: {}",
        "Package Memberships".white().bold(),
        stats.memberships.to_string().green()
    );

    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
