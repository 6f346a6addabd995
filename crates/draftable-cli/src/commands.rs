pub mod clear_old;
pub mod diff;
pub mod list;

use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, ContentArrangement, Table};
use draftable_core::{DraftConfig, Snapshot};
use draftable_engine::DraftManager;
use draftable_store::SqliteSnapshotStore;
use std::path::PathBuf;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Database and configuration every command runs against
#[derive(Debug, Clone)]
pub struct Target {
    pub db: PathBuf,
    pub config: Option<PathBuf>,
}

impl Target {
    pub fn load_config(&self) -> Result<DraftConfig, Box<dyn std::error::Error>> {
        match &self.config {
            Some(path) => Ok(DraftConfig::load(path)?),
            None => Ok(DraftConfig::default()),
        }
    }

    pub fn open(&self) -> Result<DraftManager<SqliteSnapshotStore>, Box<dyn std::error::Error>> {
        let config = self.load_config()?;
        Ok(DraftManager::open_sqlite(&self.db, config)?)
    }
}

pub fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.into_iter().map(Cell::new).collect::<Vec<_>>());
    table
}

pub fn format_time(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Table of snapshot rows as shown by `list` and `clear-old --dry-run`
pub fn snapshot_table(snapshots: &[Snapshot]) -> Table {
    let mut table = new_table(vec![
        "ID",
        "Subject",
        "Subject ID",
        "Version",
        "Creator",
        "Status",
        "Created",
    ]);
    for snapshot in snapshots {
        table.add_row(vec![
            Cell::new(snapshot.id),
            Cell::new(snapshot.subject.short_type()),
            Cell::new(snapshot.subject.subject_id),
            Cell::new(snapshot.version),
            Cell::new(
                snapshot
                    .created_by
                    .map_or_else(|| "-".to_string(), |actor| actor.to_string()),
            ),
            Cell::new(if snapshot.is_published() {
                "published"
            } else {
                "draft"
            }),
            Cell::new(format_time(&snapshot.created_at)),
        ]);
    }
    table
}
