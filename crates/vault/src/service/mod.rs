//! Record orchestration between the HTTP boundary and storage.
//!
//! # Responsibilities
//!
//! - Encrypt every string field before it reaches storage.
//! - Decrypt every string field before it leaves through a plaintext DTO.
//! - Report unknown ids as `None` / `false`, never as an error.
//!
//! Crypto and storage failures are mapped into [`ServiceError`] here and
//! propagated without retry.

pub mod records;

pub use records::RecordService;

use common::ServiceError;

use crate::crypto::CipherError;
use crate::storage::StorageError;

impl From<CipherError> for ServiceError {
    fn from(e: CipherError) -> Self {
        match e {
            CipherError::InvalidKeyLength(_) | CipherError::InvalidIvLength(_) => {
                ServiceError::Configuration(e.to_string())
            }
            CipherError::Decoding(_) => ServiceError::Decoding(e.to_string()),
            CipherError::Cryptographic => ServiceError::Cryptographic(e.to_string()),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(e: StorageError) -> Self {
        ServiceError::Storage(e.to_string())
    }
}
