use draftable_core_types::SubjectRef;
use thiserror::Error;

/// Result type alias using DraftError
pub type Result<T> = std::result::Result<T, DraftError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// raised by the versioning engine. Each kind maps to a stable error code that
/// callers can match on programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    NotFound,

    // Versioning
    /// Another writer already holds this (subject, version) pair
    VersionConflict,
    /// The snapshot has already left the unpublished state
    AlreadyPublished,
    /// Transaction boundary misuse (nested begin, commit without begin)
    Transaction,

    // Integration/IO
    Persistence,
    Serialization,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::VersionConflict => "ERR_VERSION_CONFLICT",
            ExErrorKind::AlreadyPublished => "ERR_ALREADY_PUBLISHED",
            ExErrorKind::Transaction => "ERR_TRANSACTION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification plus optional context (operation, subject,
/// version, snapshot id) for debugging and for user-facing messages.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    subject: Option<SubjectRef>,
    version: Option<u32>,
    snapshot_id: Option<i64>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            subject: None,
            version: None,
            snapshot_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add subject context
    pub fn with_subject(mut self, subject: SubjectRef) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Add version context
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Add snapshot id context
    pub fn with_snapshot_id(mut self, id: i64) -> Self {
        self.snapshot_id = Some(id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the subject context, if any
    pub fn subject(&self) -> Option<&SubjectRef> {
        self.subject.as_ref()
    }

    /// Get the version context, if any
    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// Get the snapshot id context, if any
    pub fn snapshot_id(&self) -> Option<i64> {
        self.snapshot_id
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(subject) = &self.subject {
            write!(f, " (subject: {})", subject)?;
        }
        if let Some(version) = self.version {
            write!(f, " (version: {})", version)?;
        }
        if let Some(id) = self.snapshot_id {
            write!(f, " (snapshot_id: {})", id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for draft operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DraftError {
    /// Subject type is empty or otherwise unusable as a snapshot key
    #[error("Invalid subject: {reason}")]
    InvalidSubject { reason: String },

    /// Retention or age parameter is not positive
    #[error("Invalid retention parameter {name}: must be positive, got {value}")]
    InvalidRetention { name: String, value: i64 },

    /// No snapshot exists at the requested version
    #[error("Version {version} not found for {subject}")]
    VersionNotFound { subject: SubjectRef, version: u32 },

    /// Snapshot belongs to a different subject than the one supplied
    #[error("Snapshot {snapshot_id} belongs to {owner}, not {subject}")]
    SubjectMismatch {
        snapshot_id: i64,
        owner: SubjectRef,
        subject: SubjectRef,
    },

    /// Snapshot is already published (terminal state)
    #[error("Snapshot {snapshot_id} is already published")]
    AlreadyPublished { snapshot_id: i64 },

    /// A payload path could not be written
    #[error("Invalid payload path '{path}': {reason}")]
    InvalidPayloadPath { path: String, reason: String },

    /// Configuration could not be loaded or is invalid
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Serialization error (JSON/TOML encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Conversion from DraftError to ExError
impl From<DraftError> for ExError {
    fn from(err: DraftError) -> Self {
        match err {
            DraftError::InvalidSubject { reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Invalid subject: {}", reason)),

            DraftError::InvalidRetention { name, value } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("{} must be positive, got {}", name, value)),

            DraftError::VersionNotFound { subject, version } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_message(format!("Version {} not found for {}", version, subject))
                    .with_subject(subject)
                    .with_version(version)
            }

            DraftError::SubjectMismatch {
                snapshot_id,
                owner,
                subject,
            } => ExError::new(ExErrorKind::InvalidInput)
                .with_snapshot_id(snapshot_id)
                .with_subject(subject)
                .with_message(format!("Snapshot belongs to {}", owner)),

            DraftError::AlreadyPublished { snapshot_id } => {
                ExError::new(ExErrorKind::AlreadyPublished)
                    .with_snapshot_id(snapshot_id)
                    .with_message("Snapshot is already published")
            }

            DraftError::InvalidPayloadPath { path, reason } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_message(format!("Invalid payload path '{}': {}", path, reason))
            }

            DraftError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::Config).with_message(reason)
            }

            DraftError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            DraftError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to DraftError
impl From<serde_json::Error> for DraftError {
    fn from(err: serde_json::Error) -> Self {
        DraftError::Serialization {
            message: err.to_string(),
        }
    }
}
