//! Error types for the Year of Prayer API client.
//!
//! # Design
//! Two layers. `BackendError` is what the backend clients and the transport
//! produce: HTTP status problems, (de)serialization failures and transport
//! failures. `ApiError` is what the facade returns: either the caller's
//! input was rejected (`InvalidInput`, whether by a local guard or by the
//! backend's `validate`) or a backend failure passed through untouched.

use thiserror::Error;

/// Result alias used by the facade.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `ApiService` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The input was rejected before the delegated operation ran.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A backend client or the transport failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ApiError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Errors returned by backend clients and HTTP transports.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend returned 404, usually an unknown API key.
    #[error("resource not found")]
    NotFound,

    /// The backend returned a status the client does not expect.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
