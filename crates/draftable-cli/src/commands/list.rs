//! List command
//!
//! Usage: draftable list [--subject-type T] [--published | --unpublished] [--limit N]

use clap::Args;
use draftable_core::store::{PublicationStatus, SnapshotFilter};

use super::{snapshot_table, CommandResult, Target};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only subjects whose type contains this text
    #[arg(long)]
    pub subject_type: Option<String>,

    /// Only published snapshots
    #[arg(long, conflicts_with = "unpublished")]
    pub published: bool,

    /// Only unpublished snapshots
    #[arg(long)]
    pub unpublished: bool,

    /// Maximum rows to show
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

impl ListArgs {
    fn filter(&self) -> SnapshotFilter {
        let status = if self.published {
            PublicationStatus::Published
        } else if self.unpublished {
            PublicationStatus::Unpublished
        } else {
            PublicationStatus::Any
        };
        let mut filter = SnapshotFilter::new()
            .with_status(status)
            .with_limit(self.limit);
        if let Some(subject_type) = &self.subject_type {
            filter = filter.with_subject_type(subject_type.clone());
        }
        filter
    }
}

pub fn execute(target: &Target, args: ListArgs) -> CommandResult {
    let manager = target.open()?;
    let snapshots = manager.list_drafts(&args.filter())?;

    if snapshots.is_empty() {
        println!("No drafts found.");
        return Ok(());
    }

    println!("{}", snapshot_table(&snapshots));
    println!("Showing {} draft(s)", snapshots.len());
    Ok(())
}
