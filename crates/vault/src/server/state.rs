//! Shared application state injected into every Axum handler.

use crate::service::RecordService;

/// Application state shared across all request handlers.
///
/// [`RecordService`] is `Arc`-backed, so Axum can clone the state for each
/// request without copying key material or storage handles.
#[derive(Clone)]
pub struct AppState {
    /// Encrypting record service.
    pub records: RecordService,
}

impl AppState {
    /// Create a new [`AppState`] around the given service.
    pub fn new(records: RecordService) -> Self {
        Self { records }
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory storage and a fixed test key, for handler and router tests.
    pub fn for_tests() -> Self {
        use std::sync::Arc;

        use crate::crypto::AesCbcCipher;
        use crate::storage::MemoryRepository;

        let cipher = AesCbcCipher::from_text("0123456789abcdef0123456789abcdef", "abcdef9876543210")
            .expect("test key and IV have valid lengths");
        Self::new(RecordService::new(
            Arc::new(MemoryRepository::new()),
            Arc::new(cipher),
        ))
    }
}
