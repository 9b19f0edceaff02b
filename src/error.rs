use thiserror::Error;

/// Main error type for the engine.
#[derive(Error, Debug)]
pub enum AppError {
    /// Local persistence failure (disk, corruption, busy database).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Cloud operation attempted with no signed-in user.
    #[error("Not signed in")]
    NotAuthenticated,

    /// Network or backend failure during a cloud push/pull.
    #[error("Remote error: {0}")]
    Remote(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether this is the explicit "not signed in" failure.
    ///
    /// Callers use this to skip cloud mirroring silently instead of
    /// reporting a sync fault.
    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, AppError::NotAuthenticated)
    }
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, AppError>;
