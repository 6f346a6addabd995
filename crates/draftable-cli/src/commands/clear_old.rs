//! Clear-old command
//!
//! Usage: draftable clear-old [--days N] [--dry-run] [--force]

use clap::Args;
use std::io::{self, BufRead, Write};

use super::{format_time, snapshot_table, CommandResult, Target};

#[derive(Debug, Args)]
pub struct ClearOldArgs {
    /// Delete snapshots created more than this many days ago
    #[arg(long, default_value_t = 90, allow_negative_numbers = true)]
    pub days: i64,

    /// Report what would be deleted without deleting
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

pub fn execute(target: &Target, args: ClearOldArgs) -> CommandResult {
    if args.days <= 0 {
        return Err(format!("--days must be positive, got {}", args.days).into());
    }
    let mut manager = target.open()?;

    if args.dry_run {
        let report = manager.purge_older_than(args.days, true)?;
        println!(
            "Would delete {} draft(s) created before {}",
            report.matched,
            format_time(&report.cutoff)
        );
        if !report.examples.is_empty() {
            println!("{}", snapshot_table(&report.examples));
        }
        return Ok(());
    }

    let preview = manager.purge_older_than(args.days, true)?;
    if preview.matched == 0 {
        println!("No drafts older than {} days.", args.days);
        return Ok(());
    }

    if !args.force && !confirm(preview.matched, args.days)? {
        println!("Aborted.");
        return Ok(());
    }

    let report = manager.purge_older_than(args.days, false)?;
    println!("Deleted {} draft(s).", report.deleted);
    Ok(())
}

fn confirm(count: usize, days: i64) -> io::Result<bool> {
    print!(
        "Delete {} draft(s) older than {} days? [y/N] ",
        count, days
    );
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
