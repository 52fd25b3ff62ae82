//! Payment record model and its cipher binding.
//!
//! A record exists in two explicit forms:
//!
//! - [`ProtectedRecord`]: plain data, what storage persists and returns. Its
//!   string fields are opaque; nothing here transforms them.
//! - [`BoundRecord`]: a record plus a borrowed cipher. Setters encrypt,
//!   accessors decrypt. Bound records are built fresh per operation and the
//!   binding is never stored.
//!
//! # Invariants
//!
//! - A record built with [`BoundRecord::create_with_encryption`] holds
//!   ciphertext in both string fields.
//! - Plaintext DTOs are only ever produced by decrypting stored text, never by
//!   copying stored text directly.

pub mod bound;
pub mod model;

pub use bound::BoundRecord;
pub use model::{ProtectedRecord, MAX_STORED_FIELD_LEN};
