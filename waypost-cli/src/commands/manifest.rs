use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use waypost::discovery::{Discovery, NamingFilter, codegen};

pub struct ManifestConfig {
    pub dir: PathBuf,
    pub output: Option<PathBuf>,
    pub export: String,
    pub crate_path: String,
    pub extensions: Vec<String>,
}

/// Generate manifest source and print it or write it to `output`.
pub fn execute(config: &ManifestConfig) -> Result<(), String> {
    let (source, modules) = render(config)?;

    match &config.output {
        Some(path) => {
            fs::write(path, source)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            println!(
                "  {} Wrote {} route module(s) to {}",
                "✓".green(),
                modules,
                path.display().to_string().cyan()
            );
        }
        None => print!("{}", source),
    }

    Ok(())
}

fn render(config: &ManifestConfig) -> Result<(String, usize), String> {
    let discovery =
        Discovery::new(&config.dir).filter(NamingFilter::with_extensions(&config.extensions));
    let planned = discovery.plan().map_err(|e| e.to_string())?;

    let options = codegen::CodegenOptions {
        export: config.export.clone(),
        crate_path: config.crate_path.clone(),
    };
    Ok((codegen::render_manifest(&planned, &options), planned.len()))
}
