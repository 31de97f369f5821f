//! Waypost CLI - inspect route directories and generate route manifests.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "waypost")]
#[command(author, version, about = "CLI tool for the Waypost web framework", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Display version information
    Version,
    /// Show where every route module in a directory would be mounted
    Routes {
        /// Routes directory to scan
        #[arg(env = "WAYPOST_ROUTES_DIR", default_value = "src/routes")]
        dir: PathBuf,
        /// Route module extensions, comma separated
        #[arg(long, env = "WAYPOST_ROUTE_EXTENSIONS", value_delimiter = ',', default_value = "rs")]
        ext: Vec<String>,
        /// Stems that mount at their directory, comma separated
        #[arg(long, env = "WAYPOST_INDEX_NAMES", value_delimiter = ',', default_value = "index,mod")]
        index: Vec<String>,
        /// Print the mount table as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate the manifest source for a routes directory
    Manifest {
        /// Routes directory to scan
        #[arg(env = "WAYPOST_ROUTES_DIR", default_value = "src/routes")]
        dir: PathBuf,
        /// Output file path (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Name of the function each route module exports
        #[arg(long, default_value = "router")]
        export: String,
        /// Path of the waypost crate as seen from the generated code
        #[arg(long, default_value = "::waypost")]
        crate_path: String,
        /// Route module extensions, comma separated
        #[arg(long, env = "WAYPOST_ROUTE_EXTENSIONS", value_delimiter = ',', default_value = "rs")]
        ext: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            print_version();
        }
        Some(Commands::Routes {
            dir,
            ext,
            index,
            json,
        }) => {
            let config = commands::routes::RoutesConfig {
                dir,
                extensions: ext,
                index_names: index,
                json,
            };
            if let Err(e) = commands::routes::execute(&config) {
                eprintln!("{} {}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        }
        Some(Commands::Manifest {
            dir,
            output,
            export,
            crate_path,
            ext,
        }) => {
            let config = commands::manifest::ManifestConfig {
                dir,
                output,
                export,
                crate_path,
                extensions: ext,
            };
            if let Err(e) = commands::manifest::execute(&config) {
                eprintln!("{} {}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        }
        None => {
            println!("waypost {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Run {} for usage information.", "waypost --help".cyan());
        }
    }
}

fn print_version() {
    println!("waypost-cli {}", env!("CARGO_PKG_VERSION"));
}
