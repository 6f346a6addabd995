//! Draft engine configuration
//!
//! Loaded from TOML or built in code. Every field has a default, so an
//! empty file is a valid configuration.
//!
//! ```toml
//! table_name = "drafts"
//! auto_publish = false
//! max_versions = 10
//!
//! [events]
//! draft_published = false
//!
//! [cleanup]
//! days_to_keep = 30
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{DraftError, Result};

/// Per-event enable flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub draft_created: bool,
    pub draft_published: bool,
    pub version_restored: bool,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            draft_created: true,
            draft_published: true,
            version_restored: true,
        }
    }
}

impl EventsConfig {
    /// Whether the event with this name is enabled; unknown names are off.
    pub fn is_enabled(&self, name: &str) -> bool {
        match name {
            "draft_created" => self.draft_created,
            "draft_published" => self.draft_published,
            "version_restored" => self.version_restored,
            _ => false,
        }
    }
}

/// Age-based cleanup settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub enabled: bool,
    pub days_to_keep: u32,
    /// Exclude published snapshots from age purges
    pub keep_published: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            days_to_keep: 30,
            keep_published: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    /// Master switch for auto-save on write
    pub enabled: bool,
    /// Snapshot table name; must be a plain SQL identifier
    pub table_name: String,
    pub auto_save_draft: bool,
    pub auto_publish: bool,
    /// Versions kept per subject by retention; 0 = unlimited
    pub max_versions: u32,
    pub events: EventsConfig,
    pub cleanup: CleanupConfig,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            table_name: "drafts".to_string(),
            auto_save_draft: false,
            auto_publish: false,
            max_versions: 10,
            events: EventsConfig::default(),
            cleanup: CleanupConfig::default(),
        }
    }
}

impl DraftConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for malformed TOML or an invalid table name.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: DraftConfig = toml::from_str(text).map_err(|e| DraftError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DraftError::InvalidConfig {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    ///
    /// `InvalidConfig` if `table_name` is not `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn validate(&self) -> Result<()> {
        validate_table_name(&self.table_name)
    }

    /// Whether writes should be followed by a draft save.
    pub fn auto_save_active(&self) -> bool {
        self.enabled && self.auto_save_draft
    }
}

/// Check that `name` can be spliced into SQL as a table name.
///
/// # Errors
///
/// `InvalidConfig` unless `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_table_name(name: &str) -> Result<()> {
    if !is_identifier(name) {
        return Err(DraftError::InvalidConfig {
            reason: format!("table_name '{}' is not a valid identifier", name),
        });
    }
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
