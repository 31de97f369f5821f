use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;
use waypost::discovery::{Discovery, NamingFilter, PathDeriver, PlannedMount};

pub struct RoutesConfig {
    pub dir: PathBuf,
    pub extensions: Vec<String>,
    pub index_names: Vec<String>,
    pub json: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct RouteRow {
    path: String,
    source: String,
}

/// Print the mount table of a routes directory.
pub fn execute(config: &RoutesConfig) -> Result<(), String> {
    let rows = plan(config)?;

    if config.json {
        let json = serde_json::to_string_pretty(&rows)
            .map_err(|e| format!("Failed to serialize routes: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    if rows.is_empty() {
        println!(
            "  {} No route modules found in {}",
            "!".yellow(),
            config.dir.display().to_string().cyan()
        );
        return Ok(());
    }

    let width = rows.iter().map(|row| row.path.len()).max().unwrap_or(0).max(10);

    println!();
    println!(
        "  {}  {}",
        format!("{:<width$}", "MOUNT PATH").bold(),
        "SOURCE".bold()
    );
    println!("  {}", "─".repeat(width + 2 + 30).dimmed());
    for row in &rows {
        println!(
            "  {}  {}",
            format!("{:<width$}", row.path).green(),
            row.source.dimmed()
        );
    }
    println!();
    println!("  {} {} route module(s)", "✓".green(), rows.len());

    Ok(())
}

fn plan(config: &RoutesConfig) -> Result<Vec<RouteRow>, String> {
    let discovery = Discovery::new(&config.dir)
        .filter(NamingFilter::with_extensions(&config.extensions))
        .deriver(PathDeriver::with_index_names(&config.index_names));

    let planned = discovery.plan().map_err(|e| e.to_string())?;
    Ok(planned.iter().map(row).collect())
}

fn row(mount: &PlannedMount) -> RouteRow {
    RouteRow {
        path: mount.path.to_pattern(),
        source: mount.entry.manifest_key(),
    }
}
