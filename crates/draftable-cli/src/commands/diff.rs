//! Diff command
//!
//! Usage: draftable diff <SUBJECT_TYPE> <SUBJECT_ID> <V1> <V2> [--format table|json|text]

use clap::{Args, ValueEnum};
use comfy_table::Cell;
use draftable_core::diff::{self, truncate_value};
use draftable_core::SubjectRef;
use draftable_engine::VersionDiff;

use super::{new_table, CommandResult, Target};

/// Values longer than this are cut in table output
const TABLE_VALUE_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiffFormat {
    Table,
    Json,
    Text,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Subject type, e.g. "App\Models\Post"
    pub subject_type: String,

    pub subject_id: i64,

    /// Older version
    pub version1: u32,

    /// Newer version
    pub version2: u32,

    #[arg(long, value_enum, default_value_t = DiffFormat::Table)]
    pub format: DiffFormat,
}

pub fn execute(target: &Target, args: DiffArgs) -> CommandResult {
    let manager = target.open()?;
    let subject = SubjectRef::new(args.subject_type, args.subject_id);
    let result = manager
        .diff_versions(&subject, args.version1, args.version2)
        .map_err(|e| e.message().to_string())?;

    if args.format == DiffFormat::Json {
        println!("{}", render_json(&subject, &result)?);
        return Ok(());
    }

    if result.diff.is_empty() {
        println!(
            "No differences between version {} and {}.",
            args.version1, args.version2
        );
        return Ok(());
    }

    println!(
        "Comparing {} version {} -> {}",
        subject, args.version1, args.version2
    );
    match args.format {
        DiffFormat::Text => print!("{}", diff::render_text(&result.diff)),
        _ => {
            let mut table = new_table(vec!["Field", "Change", "Old", "New"]);
            for (field, change) in &result.diff {
                table.add_row(vec![
                    Cell::new(field),
                    Cell::new(change.kind),
                    Cell::new(truncate_value(&change.old, TABLE_VALUE_WIDTH)),
                    Cell::new(truncate_value(&change.new, TABLE_VALUE_WIDTH)),
                ]);
            }
            println!("{}", table);
        }
    }
    println!("{} field(s) changed", result.summary.total_changes);
    Ok(())
}

fn render_json(
    subject: &SubjectRef,
    result: &VersionDiff,
) -> Result<String, Box<dyn std::error::Error>> {
    let document = serde_json::json!({
        "subject": subject,
        "version_from": result.from.version,
        "version_to": result.to.version,
        "changes": result.diff,
        "summary": result.summary,
    });
    Ok(serde_json::to_string_pretty(&document)?)
}
