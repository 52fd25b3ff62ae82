//! `field-vault` service library: stores payment records with their document
//! and card-token fields encrypted at rest.
//!
//! The `vault` binary wires these modules together; see `main.rs` for the
//! startup sequence.

pub mod config;
pub mod crypto;
pub mod record;
pub mod server;
pub mod service;
pub mod storage;
pub mod telemetry;
