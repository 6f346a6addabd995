//! Migration runner
//!
//! Applies migrations with checksums and idempotency

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::get_migrations;
use draftable_core::config::validate_table_name;
use draftable_core::errors::ExError;
use rusqlite::{Connection, OptionalExtension};

/// Apply all pending migrations for the snapshot table `table`
///
/// Already-applied migrations are skipped after their checksum is verified.
pub fn apply_migrations(conn: &mut Connection, table: &str) -> Result<()> {
    validate_table_name(table).map_err(|e| ExError::from(e).with_op("apply_migrations"))?;

    create_schema_version_table(conn)?;

    for migration in get_migrations() {
        let id = migration.id_for(table);
        let sql = migration.render(table);
        apply_migration(conn, &id, &sql)?;
    }

    Ok(())
}

/// Migration ids recorded in `schema_version`, in application order
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    create_schema_version_table(conn)?;
    let mut stmt = conn
        .prepare("SELECT migration_id FROM schema_version ORDER BY id")
        .map_err(from_rusqlite)?;
    let ids = stmt
        .query_map([], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(ids)
}

/// Create the schema_version table if it doesn't exist
fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT
        )",
        [],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

/// Apply a single migration if not already applied
fn apply_migration(conn: &mut Connection, migration_id: &str, sql: &str) -> Result<()> {
    let checksum = compute_checksum(sql);

    let recorded: Option<Option<String>> = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?",
            [migration_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    match recorded {
        Some(Some(expected)) if expected != checksum => {
            return Err(checksum_mismatch(migration_id, &expected, &checksum));
        }
        Some(_) => {
            tracing::debug!(migration_id, "migration already applied");
            return Ok(());
        }
        None => {}
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;

    tx.execute_batch(sql)
        .map_err(|e| migration_error(migration_id, &e.to_string()))?;

    let now = chrono::Utc::now().timestamp();
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?, ?, ?)",
        rusqlite::params![migration_id, now, checksum],
    )
    .map_err(from_rusqlite)?;

    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(migration_id, "migration applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftable_core::errors::ExErrorKind;

    #[test]
    fn test_apply_migrations() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn, "drafts").unwrap();
        assert_eq!(
            applied_migrations(&conn).unwrap(),
            vec!["001_create_drafts:drafts".to_string()]
        );
    }

    #[test]
    fn test_idempotency() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn, "drafts").unwrap();
        apply_migrations(&mut conn, "drafts").unwrap();
        assert_eq!(applied_migrations(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_two_tables_in_one_database() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn, "drafts").unwrap();
        apply_migrations(&mut conn, "page_drafts").unwrap();
        assert_eq!(applied_migrations(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_checksum_mismatch_detected() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn, "drafts").unwrap();
        conn.execute(
            "UPDATE schema_version SET checksum = 'tampered' WHERE migration_id = ?",
            ["001_create_drafts:drafts"],
        )
        .unwrap();
        let err = apply_migrations(&mut conn, "drafts").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert!(err.message().contains("Checksum mismatch"));
    }

    #[test]
    fn test_invalid_table_name_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        let err = apply_migrations(&mut conn, "drafts; DROP").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }
}
