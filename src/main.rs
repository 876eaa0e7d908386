use clap::{Args, Parser, Subcommand};
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

#[macro_use]
mod output;

mod commands;
mod config;
mod console;
mod extractor;
mod storage;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Pull the offline-access token out of a local storage snapshot",
    long_about = None
)]
#[command(propagate_version = true)]
struct Cli {
    /// Only print results
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Trace every matching entry
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Config file (default: <config dir>/offline-token/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScanArgs {
    /// Local storage snapshot (JSON dump), or - for stdin
    #[arg(short, long, env = "OFFLINE_TOKEN_STORAGE", default_value = "-")]
    storage: String,
    /// Key substring to look for (default: offline_access)
    #[arg(long)]
    marker: Option<String>,
    /// Dot-separated path to the token (default: body.access_token)
    #[arg(long)]
    field: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the token and display it
    Extract {
        #[command(flatten)]
        scan: ScanArgs,
        /// Print only the token, without newline; fail if absent
        #[arg(long)]
        raw: bool,
    },

    /// List keys containing the marker and whether they hold a token
    Keys {
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Check current version info
    Version,
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract { scan, raw } => {
            let cfg = config::resolve(cli.config.as_deref(), scan.marker, scan.field)?;
            commands::extract::handle_extract(&scan.storage, &cfg, raw)
        }
        Commands::Keys { scan } => {
            let cfg = config::resolve(cli.config.as_deref(), scan.marker, scan.field)?;
            commands::keys::handle_keys(&scan.storage, &cfg)
        }
        Commands::Version => {
            o_result!("offline-token version: {}", env!("CARGO_PKG_VERSION").cyan());
            Ok(())
        }
    }
}

fn main() {
    // .env may set OFFLINE_TOKEN_STORAGE; a missing file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    output::init(output::Verbosity::from_flags(cli.quiet, cli.verbose));

    if let Err(e) = run(cli) {
        o_error!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}
