//! Error types for funnel operations.

/// Result type for funnel operations.
pub type Result<T> = std::result::Result<T, FunnelError>;

/// Errors that can occur while running the funnel.
#[derive(Debug, thiserror::Error)]
pub enum FunnelError {
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{service} returned {status}: {body}")]
    ExternalService {
        service: String,
        status: u16,
        body: String,
    },

    #[error("No adapter registered for platform '{0}'")]
    UnsupportedPlatform(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid stored value: {0}")]
    InvalidState(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config load error: {0}")]
    Config(#[from] config::ConfigError),
}

impl FunnelError {
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Whether this is one of the failure kinds a command reports and
    /// recovers from, as opposed to an infrastructure fault.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::Conflict(_)
                | Self::Configuration(_)
                | Self::ExternalService { .. }
                | Self::UnsupportedPlatform(_)
                | Self::InvalidInput(_)
                | Self::Http(_)
                | Self::Config(_)
        )
    }

    /// Translate store integrity violations into domain errors.
    ///
    /// Unique violations become `Conflict`, foreign-key violations become
    /// `NotFound`; everything else passes through as `Database`.
    pub(crate) fn from_write(
        err: sqlx::Error,
        context: impl FnOnce() -> (&'static str, String),
    ) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                let (kind, key) = context();
                return Self::Conflict(format!("{kind} '{key}' already exists"));
            }
            if db.is_foreign_key_violation() {
                let (kind, key) = context();
                return Self::not_found(kind, key);
            }
        }
        Self::Database(err)
    }
}
