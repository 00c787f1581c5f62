//! Module dependency analysis tool
//!
//! This binary resolves a set of shader modules, requested by name, against a
//! module library and prints the composition order together with the
//! dependency level of every module involved. Without `--manifest` the
//! predefined core library is used.
//!
//! # Usage
//! ```bash
//! analyze project64 project
//! analyze --manifest modules.yaml --json lighting picking
//! ```

use clap::Parser;
use serde::Serialize;
use shadertools::{DepthMap, ModuleRegistry, predefined};
use std::path::PathBuf;

/// Command-line arguments for the module analyzer
#[derive(Parser)]
#[command(version, about = "Resolves shader module dependencies and prints the composition order")]
struct Args {
    /// Shader modules to resolve, in request order
    #[arg(required = true)]
    modules: Vec<String>,

    /// YAML module library manifest (defaults to the predefined core library)
    #[arg(long, short)]
    manifest: Option<PathBuf>,

    /// Level assigned to the requested modules in the depth map
    #[arg(long, short, default_value_t = 0)]
    base_level: usize,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// JSON report of a resolution
#[derive(Serialize)]
struct Report<'a> {
    /// Module names in composition order
    order: &'a [String],
    /// Dependency level of every involved module
    levels: &'a DepthMap,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let max_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let subscriber = tracing_subscriber::fmt().with_max_level(max_level).with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let registry = match &args.manifest {
        Some(path) => {
            tracing::debug!("Loading module library from {}", path.display());
            ModuleRegistry::from_file(path)?
        }
        None => predefined::load_registry()?,
    };

    let requested = registry.lookup(args.modules.as_slice())?;
    let order = shadertools::resolve_modules(&requested);
    let levels = shadertools::dependency_levels(&requested, args.base_level);

    if args.json {
        let report = Report { order: &order, levels: &levels };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Composition order:");
    for (index, name) in order.iter().enumerate() {
        println!("  {:>2}. {name}", index + 1);
    }

    println!("Dependency levels:");
    for (level, names) in levels.groups() {
        println!("  level {level}: {}", names.join(", "));
    }

    Ok(())
}
