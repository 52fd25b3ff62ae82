//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::Validation`] → 400
/// - [`ServiceError::Configuration`], [`ServiceError::Decoding`],
///   [`ServiceError::Cryptographic`] → 500
/// - [`ServiceError::Storage`] → 503
///
/// "Not found" is deliberately absent: it is an expected outcome and travels
/// as `None` / `false` instead.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required input was missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Key or IV material was rejected when building the cipher.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A stored ciphertext was not valid base64.
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// A ciphertext decoded but could not be decrypted or unpadded.
    #[error("cryptographic failure: {0}")]
    Cryptographic(String),

    /// The storage backend failed or is unavailable.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::Configuration(_) => 500,
            ServiceError::Decoding(_) => 500,
            ServiceError::Cryptographic(_) => 500,
            ServiceError::Storage(_) => 503,
        }
    }

    /// Short machine-readable code used in [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::Configuration(_) => "configuration_error",
            ServiceError::Decoding(_) => "decoding_error",
            ServiceError::Cryptographic(_) => "cryptographic_error",
            ServiceError::Storage(_) => "storage_unavailable",
        }
    }

    /// Returns `true` if the message is safe to echo back to the caller.
    ///
    /// Only validation messages describe caller input; everything else may
    /// reference stored data or backend internals.
    pub fn is_client_facing(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }
}
