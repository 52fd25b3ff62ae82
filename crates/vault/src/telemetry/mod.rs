//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No plaintext, ciphertext or key material** in any span attribute or log
//!   field. Record ids, counts and error kinds only.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), overridden
//!   by `RUST_LOG`.

pub mod init;

pub use init::init_telemetry;
