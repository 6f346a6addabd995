//! SQLite-backed snapshot store

use chrono::{DateTime, TimeZone, Utc};
use draftable_core::model::{NewSnapshot, Snapshot};
use draftable_core::payload::Payload;
use draftable_core::store::{PublicationStatus, SnapshotFilter, SnapshotStore, StoreResult};
use draftable_core::{DraftConfig, SubjectRef};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::db;
use crate::errors::{encode_error, from_rusqlite, payload_error, timestamp_error, Result};
use crate::migrations::apply_migrations;

const COLUMNS: &str =
    "id, subject_type, subject_id, payload, version, created_by, published_at, created_at, updated_at";

/// SQLite parameter limit headroom for `IN (...)` deletes
const DELETE_CHUNK: usize = 500;

/// Row as stored, before payload and timestamp decoding
struct RawRow {
    id: i64,
    subject_type: String,
    subject_id: i64,
    payload: String,
    version: u32,
    created_by: Option<i64>,
    published_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            subject_type: row.get(1)?,
            subject_id: row.get(2)?,
            payload: row.get(3)?,
            version: row.get(4)?,
            created_by: row.get(5)?,
            published_at: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn decode(self) -> Result<Snapshot> {
        let payload: Payload =
            serde_json::from_str(&self.payload).map_err(|e| payload_error(self.id, e))?;
        Ok(Snapshot {
            id: self.id,
            subject: SubjectRef::new(self.subject_type, self.subject_id),
            payload,
            version: self.version,
            created_by: self.created_by,
            published_at: self
                .published_at
                .map(|ms| from_millis("published_at", ms))
                .transpose()?,
            created_at: from_millis("created_at", self.created_at)?,
            updated_at: from_millis("updated_at", self.updated_at)?,
        })
    }
}

fn from_millis(column: &str, millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| timestamp_error(column, millis))
}

/// Snapshot store on a single SQLite connection.
///
/// The table name comes from configuration and is validated as an
/// identifier before it is spliced into SQL.
pub struct SqliteSnapshotStore {
    conn: Connection,
    table: String,
}

impl SqliteSnapshotStore {
    /// Open (or create) a database file and migrate the configured table.
    pub fn open<P: AsRef<Path>>(path: P, config: &DraftConfig) -> Result<Self> {
        let conn = db::open(path)?;
        Self::from_connection(conn, &config.table_name)
    }

    /// In-memory database, mainly for tests.
    pub fn open_in_memory(table: &str) -> Result<Self> {
        Self::from_connection(db::open_in_memory()?, table)
    }

    /// Configure and migrate an existing connection.
    pub fn from_connection(mut conn: Connection, table: &str) -> Result<Self> {
        db::configure(&conn)?;
        apply_migrations(&mut conn, table)?;
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Underlying connection, for administrative SQL and tests
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Overwrite `created_at` (imports and age-purge tests).
    pub fn set_created_at(&mut self, id: i64, at: DateTime<Utc>) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                &format!("UPDATE {} SET created_at = ?1 WHERE id = ?2", self.table),
                params![at.timestamp_millis(), id],
            )
            .map_err(from_rusqlite)?;
        Ok(changed > 0)
    }

    fn query_one(&self, sql: &str, params: impl rusqlite::Params) -> Result<Option<Snapshot>> {
        self.conn
            .query_row(sql, params, RawRow::from_row)
            .optional()
            .map_err(from_rusqlite)?
            .map(RawRow::decode)
            .transpose()
    }

    fn query_many(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Snapshot>> {
        let mut stmt = self.conn.prepare(sql).map_err(from_rusqlite)?;
        let raw = stmt
            .query_map(params, RawRow::from_row)
            .map_err(from_rusqlite)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(from_rusqlite)?;
        raw.into_iter().map(RawRow::decode).collect()
    }

    fn age_clause(keep_published: bool) -> &'static str {
        if keep_published {
            "created_at < ?1 AND published_at IS NULL"
        } else {
            "created_at < ?1"
        }
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn insert(&mut self, snapshot: NewSnapshot) -> StoreResult<Snapshot> {
        let payload = serde_json::to_string(&snapshot.payload).map_err(encode_error)?;
        let now = Utc::now();
        let millis = now.timestamp_millis();

        self.conn
            .execute(
                &format!(
                    "INSERT INTO {} (subject_type, subject_id, payload, version, created_by, published_at, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?6)",
                    self.table
                ),
                params![
                    snapshot.subject.subject_type,
                    snapshot.subject.subject_id,
                    payload,
                    snapshot.version,
                    snapshot.created_by,
                    millis,
                ],
            )
            .map_err(|e| {
                from_rusqlite(e)
                    .with_op("insert_snapshot")
                    .with_subject(snapshot.subject.clone())
                    .with_version(snapshot.version)
            })?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(
            snapshot_id = id,
            subject = %snapshot.subject,
            version = snapshot.version,
            "snapshot inserted"
        );

        // Round-trip through millisecond precision so the returned snapshot
        // equals what a later read produces.
        let stored_at = from_millis("created_at", millis)?;
        Ok(snapshot.into_snapshot(id, stored_at))
    }

    fn find_by_id(&self, id: i64) -> StoreResult<Option<Snapshot>> {
        self.query_one(
            &format!("SELECT {} FROM {} WHERE id = ?1", COLUMNS, self.table),
            params![id],
        )
    }

    fn find_by_subject_and_version(
        &self,
        subject: &SubjectRef,
        version: u32,
    ) -> StoreResult<Option<Snapshot>> {
        self.query_one(
            &format!(
                "SELECT {} FROM {} WHERE subject_type = ?1 AND subject_id = ?2 AND version = ?3",
                COLUMNS, self.table
            ),
            params![subject.subject_type, subject.subject_id, version],
        )
    }

    fn list_by_subject(&self, subject: &SubjectRef) -> StoreResult<Vec<Snapshot>> {
        self.query_many(
            &format!(
                "SELECT {} FROM {} WHERE subject_type = ?1 AND subject_id = ?2 ORDER BY version DESC",
                COLUMNS, self.table
            ),
            params![subject.subject_type, subject.subject_id],
        )
    }

    fn latest_for_subject(&self, subject: &SubjectRef) -> StoreResult<Option<Snapshot>> {
        self.query_one(
            &format!(
                "SELECT {} FROM {} WHERE subject_type = ?1 AND subject_id = ?2 ORDER BY version DESC LIMIT 1",
                COLUMNS, self.table
            ),
            params![subject.subject_type, subject.subject_id],
        )
    }

    fn max_version(&self, subject: &SubjectRef) -> StoreResult<Option<u32>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT MAX(version) FROM {} WHERE subject_type = ?1 AND subject_id = ?2",
                    self.table
                ),
                params![subject.subject_type, subject.subject_id],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)
    }

    fn count_unpublished(&self, subject: &SubjectRef) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM {} WHERE subject_type = ?1 AND subject_id = ?2 AND published_at IS NULL",
                    self.table
                ),
                params![subject.subject_type, subject.subject_id],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        Ok(count as usize)
    }

    fn mark_published(&mut self, id: i64, at: DateTime<Utc>) -> StoreResult<bool> {
        let millis = at.timestamp_millis();
        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE {} SET published_at = ?1, updated_at = ?1 WHERE id = ?2 AND published_at IS NULL",
                    self.table
                ),
                params![millis, id],
            )
            .map_err(|e| from_rusqlite(e).with_op("mark_published").with_snapshot_id(id))?;
        Ok(changed == 1)
    }

    fn update_payload(&mut self, id: i64, payload: &Payload) -> StoreResult<bool> {
        let encoded = serde_json::to_string(payload).map_err(encode_error)?;
        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE {} SET payload = ?1, updated_at = ?2 WHERE id = ?3",
                    self.table
                ),
                params![encoded, Utc::now().timestamp_millis(), id],
            )
            .map_err(from_rusqlite)?;
        Ok(changed == 1)
    }

    fn delete_by_ids(&mut self, ids: &[i64]) -> StoreResult<usize> {
        let mut deleted = 0;
        for chunk in ids.chunks(DELETE_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            deleted += self
                .conn
                .execute(
                    &format!("DELETE FROM {} WHERE id IN ({})", self.table, placeholders),
                    params_from_iter(chunk.iter()),
                )
                .map_err(from_rusqlite)?;
        }
        Ok(deleted)
    }

    fn count_older_than(&self, cutoff: DateTime<Utc>, keep_published: bool) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM {} WHERE {}",
                    self.table,
                    Self::age_clause(keep_published)
                ),
                params![cutoff.timestamp_millis()],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        Ok(count as usize)
    }

    fn list_older_than(
        &self,
        cutoff: DateTime<Utc>,
        keep_published: bool,
        limit: usize,
    ) -> StoreResult<Vec<Snapshot>> {
        self.query_many(
            &format!(
                "SELECT {} FROM {} WHERE {} ORDER BY created_at ASC, id ASC LIMIT ?2",
                COLUMNS,
                self.table,
                Self::age_clause(keep_published)
            ),
            params![cutoff.timestamp_millis(), limit as i64],
        )
    }

    fn delete_older_than(
        &mut self,
        cutoff: DateTime<Utc>,
        keep_published: bool,
    ) -> StoreResult<usize> {
        self.conn
            .execute(
                &format!(
                    "DELETE FROM {} WHERE {}",
                    self.table,
                    Self::age_clause(keep_published)
                ),
                params![cutoff.timestamp_millis()],
            )
            .map_err(from_rusqlite)
    }

    fn list(&self, filter: &SnapshotFilter) -> StoreResult<Vec<Snapshot>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(subject_type) = &filter.subject_type {
            conditions.push("instr(subject_type, ?) > 0");
            values.push(SqlValue::Text(subject_type.clone()));
        }
        match filter.status {
            PublicationStatus::Any => {}
            PublicationStatus::Published => conditions.push("published_at IS NOT NULL"),
            PublicationStatus::Unpublished => conditions.push("published_at IS NULL"),
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        // Negative LIMIT means no limit in SQLite.
        values.push(SqlValue::Integer(filter.limit.map_or(-1, |l| l as i64)));

        self.query_many(
            &format!(
                "SELECT {} FROM {} {} ORDER BY created_at DESC, id DESC LIMIT ?",
                COLUMNS, self.table, where_clause
            ),
            params_from_iter(values),
        )
    }

    fn begin(&mut self) -> StoreResult<()> {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| from_rusqlite(e).with_op("begin"))
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| from_rusqlite(e).with_op("commit"))
    }

    fn rollback(&mut self) -> StoreResult<()> {
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| from_rusqlite(e).with_op("rollback"))
    }
}
