//! Draftable CLI
//!
//! Administrative commands over a draft snapshot database

use clap::{Parser, Subcommand};
use draftable_core::logging_facility::{init, Profile};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "draftable")]
#[command(about = "Draftable - inspect, diff and prune draft snapshots", long_about = None)]
struct Cli {
    /// SQLite database holding the snapshots
    #[arg(long, global = true, default_value = "drafts.db")]
    db: PathBuf,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON logs on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List snapshots across all subjects
    List(commands::list::ListArgs),
    /// Show the differences between two versions of a subject
    Diff(commands::diff::DiffArgs),
    /// Delete snapshots older than a number of days
    ClearOld(commands::clear_old::ClearOldArgs),
}

fn main() {
    let cli = Cli::parse();

    init(if cli.log_json {
        Profile::Production
    } else {
        Profile::Cli
    });

    let target = commands::Target {
        db: cli.db,
        config: cli.config,
    };
    let result = match cli.command {
        Commands::List(args) => commands::list::execute(&target, args),
        Commands::Diff(args) => commands::diff::execute(&target, args),
        Commands::ClearOld(args) => commands::clear_old::execute(&target, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
