//! [`ProtectedRecord`]: the stored shape of a payment record.

use common::ServiceError;
use serde::{Deserialize, Serialize};

/// Longest stored text accepted for either encrypted field.
///
/// Matches the column limit of the persisted shape. Ciphertext is roughly
/// 4/3 of the padded plaintext, so this admits plaintexts up to 367 bytes.
pub const MAX_STORED_FIELD_LEN: usize = 500;

/// A payment record exactly as storage holds it.
///
/// This type has no behaviour: `user_document` and `card_token` carry whatever
/// text was assigned, which is ciphertext whenever the record went through a
/// [`super::BoundRecord`]. Serialising it exposes the stored bytes verbatim;
/// that is the transport-only read mode, not a plaintext view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedRecord {
    /// Surrogate id assigned by storage on insert; `0` until then.
    pub id: i64,
    /// Stored user document text.
    pub user_document: String,
    /// Stored credit card token text.
    #[serde(rename = "creditCardToken")]
    pub card_token: String,
    /// Monetary amount; stored unmodified.
    pub value: i64,
}

impl ProtectedRecord {
    /// Build an unsaved record holding the given field text verbatim.
    pub fn new(user_document: impl Into<String>, card_token: impl Into<String>, value: i64) -> Self {
        Self {
            id: 0,
            user_document: user_document.into(),
            card_token: card_token.into(),
            value,
        }
    }

    /// Copy of this record carrying the given storage id.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Check the stored field text against [`MAX_STORED_FIELD_LEN`].
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] naming the first oversized field.
    pub fn validate(&self) -> Result<(), ServiceError> {
        for (name, text) in [
            ("userDocument", &self.user_document),
            ("creditCardToken", &self.card_token),
        ] {
            if text.len() > MAX_STORED_FIELD_LEN {
                return Err(ServiceError::Validation(format!(
                    "{name} is too long once encrypted ({} > {MAX_STORED_FIELD_LEN} bytes)",
                    text.len()
                )));
            }
        }
        Ok(())
    }
}
