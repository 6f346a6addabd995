//! Administrative operations
//!
//! Listing, version-to-version diffs and age-based purges. These back the
//! `draftable` CLI but are plain library calls.

use chrono::{DateTime, Duration, Utc};
use draftable_core::diff::{self, DiffSummary, PayloadDiff};
use draftable_core::errors::DraftError;
use draftable_core::model::Snapshot;
use draftable_core::store::{SnapshotFilter, SnapshotStore};
use draftable_core::subject::validate_subject;
use draftable_core::{log_op_end, log_op_error, log_op_start, SubjectRef};
use std::time::Instant;

use crate::manager::DraftManager;
use crate::Result;

/// Example rows reported by a purge preview
pub const PURGE_EXAMPLE_LIMIT: usize = 5;

/// Two versions of one subject and the diff between them
#[derive(Debug, Clone, PartialEq)]
pub struct VersionDiff {
    pub from: Snapshot,
    pub to: Snapshot,
    pub diff: PayloadDiff,
    pub summary: DiffSummary,
}

/// Outcome of an age purge (or its dry run)
#[derive(Debug, Clone, PartialEq)]
pub struct PurgeReport {
    pub days: i64,
    pub cutoff: DateTime<Utc>,
    /// Snapshots older than the cutoff (subject to `keep_published`)
    pub matched: usize,
    /// Snapshots actually removed; 0 on a dry run
    pub deleted: usize,
    pub dry_run: bool,
    /// Oldest matching snapshots, populated on dry runs
    pub examples: Vec<Snapshot>,
}

impl<St: SnapshotStore> DraftManager<St> {
    /// Filtered listing across all subjects, newest first.
    ///
    /// # Errors
    ///
    /// `Persistence` on store failure.
    pub fn list_drafts(&self, filter: &SnapshotFilter) -> Result<Vec<Snapshot>> {
        self.store().list(filter)
    }

    /// Diff two named versions of a subject.
    ///
    /// # Errors
    ///
    /// - `NotFound`: either version is missing
    /// - `Persistence`: store failure
    pub fn diff_versions(&self, subject: &SubjectRef, from: u32, to: u32) -> Result<VersionDiff> {
        log_op_start!(
            "diff_versions",
            subject_type = subject.subject_type.as_str(),
            subject_id = subject.subject_id
        );
        let start = Instant::now();

        let result = self.diff_versions_impl(subject, from, to).map_err(|e| {
            log_op_error!(
                "diff_versions",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "diff_versions",
            duration_ms = start.elapsed().as_millis() as u64,
            changes = result.summary.total_changes as u64
        );
        Ok(result)
    }

    fn diff_versions_impl(&self, subject: &SubjectRef, from: u32, to: u32) -> Result<VersionDiff> {
        validate_subject(subject)?;
        let find = |version: u32| -> Result<Snapshot> {
            self.store()
                .find_by_subject_and_version(subject, version)?
                .ok_or_else(|| {
                    DraftError::VersionNotFound {
                        subject: subject.clone(),
                        version,
                    }
                    .into()
                })
        };
        let from = find(from)?;
        let to = find(to)?;

        let diff = diff::compare_snapshots(&from, &to);
        let summary = diff::summary_between(&from, &to);
        Ok(VersionDiff {
            from,
            to,
            diff,
            summary,
        })
    }

    /// Delete snapshots created more than `days` days ago.
    ///
    /// With `dry_run` nothing is deleted and up to five of the oldest
    /// matching snapshots are returned as examples. Published snapshots are
    /// spared when `cleanup.keep_published` is set.
    ///
    /// # Errors
    ///
    /// - `InvalidInput`: `days` is not positive
    /// - `Persistence`: store failure
    pub fn purge_older_than(&mut self, days: i64, dry_run: bool) -> Result<PurgeReport> {
        log_op_start!("purge_older_than", days = days, dry_run = dry_run);
        let start = Instant::now();

        let result = self.purge_older_than_impl(days, dry_run).map_err(|e| {
            log_op_error!(
                "purge_older_than",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "purge_older_than",
            duration_ms = start.elapsed().as_millis() as u64,
            matched = result.matched as u64,
            deleted = result.deleted as u64
        );
        Ok(result)
    }

    fn purge_older_than_impl(&mut self, days: i64, dry_run: bool) -> Result<PurgeReport> {
        let invalid = || DraftError::InvalidRetention {
            name: "days".to_string(),
            value: days,
        };
        if days <= 0 {
            return Err(invalid().into());
        }
        let cutoff = Duration::try_days(days)
            .and_then(|span| Utc::now().checked_sub_signed(span))
            .ok_or_else(invalid)?;
        let keep_published = self.config().cleanup.keep_published;

        let matched = self.store().count_older_than(cutoff, keep_published)?;
        let mut report = PurgeReport {
            days,
            cutoff,
            matched,
            deleted: 0,
            dry_run,
            examples: Vec::new(),
        };
        if matched == 0 {
            return Ok(report);
        }

        if dry_run {
            report.examples =
                self.store()
                    .list_older_than(cutoff, keep_published, PURGE_EXAMPLE_LIMIT)?;
        } else {
            report.deleted = self.store_mut().delete_older_than(cutoff, keep_published)?;
        }
        Ok(report)
    }

    /// Run the configured age purge when `cleanup.enabled` is set.
    ///
    /// Returns the number of deleted snapshots (0 when disabled).
    ///
    /// # Errors
    ///
    /// Propagates `purge_older_than` errors.
    pub fn run_scheduled_cleanup(&mut self) -> Result<usize> {
        if !self.config().cleanup.enabled {
            return Ok(0);
        }
        let days = i64::from(self.config().cleanup.days_to_keep);
        Ok(self.purge_older_than(days, false)?.deleted)
    }
}
