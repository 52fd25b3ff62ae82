//! AES-256-CBC field encryption primitives.
//!
//! This module is intentionally free of storage and HTTP dependencies.
//! It provides the encrypt/decrypt operations used by the record codec.
//!
//! # Ciphertext format
//!
//! ```text
//! base64(AES-256-CBC(key, iv, PKCS7(utf8(plaintext))))
//! ```
//!
//! There is no version prefix; the stored format is exactly the base64 text.

pub mod cipher;

pub use cipher::{AesCbcCipher, CipherError, FieldCipher};
