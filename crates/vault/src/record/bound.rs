//! [`BoundRecord`]: a stored record paired with the cipher that reads and writes it.

use common::RecordDto;

use super::model::ProtectedRecord;
use crate::crypto::{CipherError, FieldCipher};

/// A [`ProtectedRecord`] with a borrowed [`FieldCipher`] attached.
///
/// Setters encrypt before storing; the `decrypted_*` accessors decrypt what is
/// stored. The binding exists only for the lifetime of the borrow and is never
/// part of the stored or serialised record.
pub struct BoundRecord<'c> {
    record: ProtectedRecord,
    cipher: &'c dyn FieldCipher,
}

impl<'c> BoundRecord<'c> {
    /// Attach `cipher` to an existing record without touching its fields.
    ///
    /// Used on read paths, where `record` already holds ciphertext.
    pub fn bind(cipher: &'c dyn FieldCipher, record: ProtectedRecord) -> Self {
        Self { record, cipher }
    }

    /// Build a new record whose string fields are the encryption of the
    /// given plaintexts.
    pub fn create_with_encryption(
        cipher: &'c dyn FieldCipher,
        user_document: &str,
        card_token: &str,
        value: i64,
    ) -> Self {
        let mut bound = Self::bind(cipher, ProtectedRecord::default());
        bound.set_user_document(user_document);
        bound.set_card_token(card_token);
        bound.set_value(value);
        bound
    }

    /// Encrypt and store a new user document.
    pub fn set_user_document(&mut self, plaintext: &str) {
        self.record.user_document = self.cipher.encrypt(plaintext);
    }

    /// Encrypt and store a new card token.
    pub fn set_card_token(&mut self, plaintext: &str) {
        self.record.card_token = self.cipher.encrypt(plaintext);
    }

    pub fn set_value(&mut self, value: i64) {
        self.record.value = value;
    }

    /// Decrypt the stored user document.
    ///
    /// # Errors
    ///
    /// Propagates [`CipherError`] if the stored text is not a valid ciphertext.
    pub fn decrypted_user_document(&self) -> Result<String, CipherError> {
        self.cipher.decrypt(&self.record.user_document)
    }

    /// Decrypt the stored card token.
    ///
    /// # Errors
    ///
    /// Propagates [`CipherError`] if the stored text is not a valid ciphertext.
    pub fn decrypted_card_token(&self) -> Result<String, CipherError> {
        self.cipher.decrypt(&self.record.card_token)
    }

    pub fn id(&self) -> i64 {
        self.record.id
    }

    pub fn value(&self) -> i64 {
        self.record.value
    }

    /// The stored (ciphertext) form of this record.
    pub fn record(&self) -> &ProtectedRecord {
        &self.record
    }

    /// Drop the binding and keep the stored form.
    pub fn into_record(self) -> ProtectedRecord {
        self.record
    }

    /// Plaintext DTO, always re-derived by decrypting the stored fields.
    ///
    /// # Errors
    ///
    /// Propagates [`CipherError`] from either field.
    pub fn to_dto(&self) -> Result<RecordDto, CipherError> {
        Ok(RecordDto {
            id: self.record.id,
            user_document: self.decrypted_user_document()?,
            credit_card_token: self.decrypted_card_token()?,
            value: self.record.value,
        })
    }
}

impl std::fmt::Debug for BoundRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundRecord")
            .field("id", &self.record.id)
            .field("value", &self.record.value)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::AesCbcCipher;

    fn cipher() -> AesCbcCipher {
        AesCbcCipher::from_text("0123456789abcdef0123456789abcdef", "abcdef9876543210").unwrap()
    }

    /// Reversible stand-in that makes "was this encrypted?" easy to assert.
    struct Rot13;

    impl FieldCipher for Rot13 {
        fn encrypt(&self, plaintext: &str) -> String {
            format!("enc:{}", rot13(plaintext))
        }

        fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
            ciphertext
                .strip_prefix("enc:")
                .map(rot13)
                .ok_or(CipherError::Cryptographic)
        }
    }

    fn rot13(s: &str) -> String {
        s.chars()
            .map(|c| match c {
                'a'..='z' => (((c as u8 - b'a') + 13) % 26 + b'a') as char,
                'A'..='Z' => (((c as u8 - b'A') + 13) % 26 + b'A') as char,
                _ => c,
            })
            .collect()
    }

    #[test]
    fn create_with_encryption_stores_ciphertext() {
        let c = cipher();
        let bound = BoundRecord::create_with_encryption(&c, "12345678901", "1234567890123456", 1000);
        let stored = bound.record();
        assert_ne!(stored.user_document, "12345678901");
        assert_ne!(stored.card_token, "1234567890123456");
        assert_eq!(stored.user_document, c.encrypt("12345678901"));
        assert_eq!(stored.card_token, c.encrypt("1234567890123456"));
        assert_eq!(stored.value, 1000);
        assert_eq!(stored.id, 0);
    }

    #[test]
    fn decrypted_accessors_return_plaintext() {
        let c = cipher();
        let bound = BoundRecord::create_with_encryption(&c, "doc", "card", 42);
        assert_eq!(bound.decrypted_user_document().unwrap(), "doc");
        assert_eq!(bound.decrypted_card_token().unwrap(), "card");
        assert_eq!(bound.value(), 42);
    }

    #[test]
    fn bind_does_not_transform_existing_fields() {
        let c = Rot13;
        let stored = ProtectedRecord::new("enc:qbp", "enc:pneq", 9).with_id(3);
        let bound = BoundRecord::bind(&c, stored.clone());
        assert_eq!(bound.record(), &stored);
        assert_eq!(bound.id(), 3);
        assert_eq!(bound.decrypted_user_document().unwrap(), "doc");
        assert_eq!(bound.decrypted_card_token().unwrap(), "card");
    }

    #[test]
    fn setters_replace_ciphertext() {
        let c = cipher();
        let mut bound = BoundRecord::create_with_encryption(&c, "old-doc", "old-card", 1);
        let before = bound.record().clone();
        bound.set_user_document("new-doc");
        bound.set_card_token("new-card");
        bound.set_value(2);
        assert_ne!(bound.record().user_document, before.user_document);
        assert_ne!(bound.record().card_token, before.card_token);
        assert_eq!(bound.decrypted_user_document().unwrap(), "new-doc");
        assert_eq!(bound.decrypted_card_token().unwrap(), "new-card");
        assert_eq!(bound.value(), 2);
    }

    #[test]
    fn to_dto_decrypts_both_fields() {
        let c = Rot13;
        let bound = BoundRecord::bind(&c, ProtectedRecord::new("enc:qbp", "enc:pneq", 5).with_id(11));
        let dto = bound.to_dto().unwrap();
        assert_eq!(
            dto,
            RecordDto {
                id: 11,
                user_document: "doc".into(),
                credit_card_token: "card".into(),
                value: 5,
            }
        );
    }

    #[test]
    fn to_dto_fails_on_plaintext_in_storage() {
        let c = Rot13;
        let bound = BoundRecord::bind(&c, ProtectedRecord::new("raw", "enc:pneq", 5));
        assert!(matches!(bound.to_dto(), Err(CipherError::Cryptographic)));
    }

    #[test]
    fn into_record_keeps_ciphertext() {
        let c = Rot13;
        let record = BoundRecord::create_with_encryption(&c, "abc", "xyz", 0).into_record();
        assert_eq!(record.user_document, "enc:nop");
        assert_eq!(record.card_token, "enc:klm");
    }

    #[test]
    fn debug_hides_field_text() {
        let c = Rot13;
        let bound = BoundRecord::create_with_encryption(&c, "secret", "secret", 0);
        let rendered = format!("{bound:?}");
        assert!(!rendered.contains("secret"));
        assert!(!rendered.contains("enc:"));
    }
}
