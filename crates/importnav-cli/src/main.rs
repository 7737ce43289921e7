#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use importnav_core::{Resolver, ResolverConfig};
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "importnav")]
#[command(author, version, about = "Resolve JS/TS import specifiers to files", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true, value_name = "PATH", env = "IMPORTNAV_ROOT")]
    root: Option<PathBuf>,

    /// Config snapshot lifetime in seconds
    #[arg(long, global = true, value_name = "SECS")]
    ttl_secs: Option<u64>,

    /// Maximum hits collected by the workspace search fallback
    #[arg(long, global = true, value_name = "N")]
    search_limit: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve a specifier to a file
    Resolve {
        /// The specifier as written in the source (quotes allowed)
        specifier: String,

        /// File containing the import
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
    },

    /// Resolve a specifier and show every step taken
    Explain {
        /// The specifier as written in the source (quotes allowed)
        specifier: String,

        /// File containing the import
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
    },

    /// Show the alias configuration in effect
    Config {
        /// File whose nearest path-mapping config should be used
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.json);

    if matches!(cli.command, Commands::Version) {
        return commands::version::run(cli.json);
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let root = cli.root.as_deref().map_or_else(|| cwd.clone(), |r| absolute(&cwd, r));

    let mut config = ResolverConfig::from_env(root);
    if let Some(secs) = cli.ttl_secs {
        config = config.with_cache_ttl(Duration::from_secs(secs));
    }
    if let Some(limit) = cli.search_limit {
        config = config.with_search_limit(limit);
    }
    let resolver = Resolver::new(config);

    let rt = tokio::runtime::Runtime::new().into_diagnostic()?;

    match &cli.command {
        Commands::Version => Ok(()),
        Commands::Resolve { specifier, from } => {
            let from = from.as_deref().map(|f| absolute(&cwd, f));
            let found = rt.block_on(commands::resolve::run(
                &resolver,
                specifier,
                from.as_deref(),
                cli.json,
            ))?;
            if !found {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Explain { specifier, from } => {
            let from = from.as_deref().map(|f| absolute(&cwd, f));
            rt.block_on(commands::explain::run(
                &resolver,
                specifier,
                from.as_deref(),
                cli.json,
            ))
        }
        Commands::Config { from } => {
            let from = from.as_deref().map(|f| absolute(&cwd, f));
            rt.block_on(commands::config::run(&resolver, from.as_deref(), cli.json))
        }
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
