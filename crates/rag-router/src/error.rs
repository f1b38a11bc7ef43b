//! Error types for the routing and retrieval system

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, Error>;

/// Router errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing credentials, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Query or index embedding does not match the index dimension
    #[error("Embedding dimension mismatch: index has {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Classifier produced a malformed or out-of-enumeration result
    #[error("Classification failed: {0}")]
    Classification(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector index error
    #[error("Vector index error: {0}")]
    VectorDb(String),

    /// Encyclopedia lookup failed
    #[error("Encyclopedia lookup failed: {0}")]
    Encyclopedia(String),

    /// Web search failed
    #[error("Web search failed: {0}")]
    WebSearch(String),

    /// A source could not be fetched during ingestion
    #[error("Failed to fetch '{source_id}': {message}")]
    Fetch { source_id: String, message: String },

    /// External call exceeded its time budget
    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a classification error
    pub fn classification(message: impl Into<String>) -> Self {
        Self::Classification(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector db error
    pub fn vector_db(message: impl Into<String>) -> Self {
        Self::VectorDb(message.into())
    }

    /// Create a fetch error for an ingestion source
    pub fn fetch(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Fatal configuration problems that must abort the request
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::DimensionMismatch { .. })
    }

    /// Network or service failures of an external capability
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Encyclopedia(_)
                | Self::WebSearch(_)
                | Self::Fetch { .. }
                | Self::Timeout { .. }
                | Self::Http(_)
        )
    }
}

impl From<redb::Error> for Error {
    fn from(err: redb::Error) -> Self {
        Error::VectorDb(err.to_string())
    }
}

macro_rules! redb_error {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Error {
                fn from(err: $ty) -> Self {
                    Error::VectorDb(err.to_string())
                }
            }
        )*
    };
}

redb_error!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError
);

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Error::Config(_) | Error::DimensionMismatch { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error")
            }
            Error::Classification(_) => (StatusCode::BAD_GATEWAY, "classification_error"),
            Error::Embedding(_) => (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error"),
            Error::VectorDb(_) => (StatusCode::INTERNAL_SERVER_ERROR, "vector_db_error"),
            Error::Encyclopedia(_) => (StatusCode::BAD_GATEWAY, "encyclopedia_error"),
            Error::WebSearch(_) => (StatusCode::BAD_GATEWAY, "web_search_error"),
            Error::Fetch { .. } => (StatusCode::BAD_GATEWAY, "fetch_error"),
            Error::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Http(_) => (StatusCode::BAD_GATEWAY, "http_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy() {
        assert!(Error::config("missing key").is_configuration());
        assert!(Error::DimensionMismatch { expected: 3, actual: 4 }.is_configuration());
        assert!(!Error::classification("bogus").is_configuration());
        assert!(!Error::classification("bogus").is_transient());
        assert!(Error::WebSearch("500".into()).is_transient());
        assert!(Error::Timeout { operation: "lookup".into(), secs: 1 }.is_transient());
    }

    #[test]
    fn test_status_codes() {
        let resp = Error::classification("bogus").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = Error::config("missing key").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
