//! Embedded SQL migrations
//!
//! Migrations are embedded at compile time using include_str! and carry a
//! `{table}` placeholder for the snapshot table name.

const TABLE_PLACEHOLDER: &str = "{table}";

/// Migration template
pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

impl Migration {
    /// Migration id recorded in `schema_version` for this table
    pub fn id_for(&self, table: &str) -> String {
        format!("{}:{}", self.id, table)
    }

    /// SQL with the table name substituted
    pub fn render(&self, table: &str) -> String {
        self.sql.replace(TABLE_PLACEHOLDER, table)
    }
}

/// Get all embedded migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_create_drafts",
        sql: include_str!("../../migrations/001_create_drafts.sql"),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_every_placeholder() {
        let migration = &get_migrations()[0];
        let sql = migration.render("post_drafts");
        assert!(!sql.contains(TABLE_PLACEHOLDER));
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS post_drafts"));
        assert!(sql.contains("idx_post_drafts_subject_version"));
        assert_eq!(migration.id_for("post_drafts"), "001_create_drafts:post_drafts");
    }
}
