use thiserror::Error;

/// Application-wide error types.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Search error: {0}")]
    Search(#[from] EngineError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Outcome of a failed call against the search engine.
///
/// `SchemaDrift` is kept apart from every other rejection so that the
/// query path can branch on it explicitly and recover once.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The engine rejected a query because a sort attribute is not sortable.
    #[error("index schema drift: {message}")]
    SchemaDrift { message: String },

    /// Any other request the engine rejected.
    #[error("engine rejected request ({code}): {message}")]
    Api { code: String, message: String },

    /// An asynchronous engine task finished in the failed state.
    #[error("engine task failed: {message}")]
    Task { message: String },

    /// Network, HTTP or authentication failure reaching the engine.
    #[error("engine unavailable: {message}")]
    Unavailable { message: String },
}

impl EngineError {
    pub fn is_schema_drift(&self) -> bool {
        matches!(self, EngineError::SchemaDrift { .. })
    }
}

/// Helper conversion from anyhow::Error
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
