//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Translate requests into [`crate::service::RecordService`] calls and map
//!   results, "not found" and [`common::ServiceError`] onto HTTP responses.
//! - Inject shared application state (`AppState`) into handlers.

pub mod handlers;
pub mod router;
pub mod state;
