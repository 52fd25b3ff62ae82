//! Request and response types exchanged over the public HTTP API.
//!
//! Everything in this module is plaintext at the boundary. Ciphertext never
//! appears here except through the explicit `?encrypted=true` read mode, which
//! serialises the stored record type directly.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Plaintext view of a stored record.
///
/// Used both as the request body for `POST /records` / `PUT /records/{id}`
/// (where `id` is ignored and defaults to `0`) and as the response body for
/// every plaintext read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDto {
    /// Storage-assigned surrogate identifier.
    #[serde(default)]
    pub id: i64,
    /// Document number of the record owner.
    pub user_document: String,
    /// Payment card token.
    pub credit_card_token: String,
    /// Monetary amount in minor units. Not confidential.
    pub value: i64,
}

impl RecordDto {
    /// Construct a DTO for submission (id left at `0`).
    pub fn new(
        user_document: impl Into<String>,
        credit_card_token: impl Into<String>,
        value: i64,
    ) -> Self {
        Self {
            id: 0,
            user_document: user_document.into(),
            credit_card_token: credit_card_token.into(),
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"validation_error"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the storage backend answered the readiness probe.
    pub storage_ready: bool,
    /// Number of records currently stored (0 when storage is not ready).
    pub records_stored: usize,
}
