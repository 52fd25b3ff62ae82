//! AES-256-CBC encryption and decryption of individual string fields.
//!
//! **Algorithm:** AES-256 in CBC mode with PKCS#7 padding, a fixed key and a
//! fixed IV supplied once at construction. The ciphertext is returned as
//! standard (padded) base64 text.
//!
//! **Known limitation:** with a fixed IV the output is deterministic. Identical
//! plaintexts always produce identical ciphertexts, so equality of ciphertext
//! leaks equality of plaintext. There is also no integrity tag: many
//! corruptions surface as a padding failure, but some decrypt to garbage
//! without being detected. Stored data and tests depend on the deterministic
//! output, so switching to per-record nonces is a data migration, not a patch.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of the CBC initialisation vector (one AES block).
pub const IV_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("encryption key must be exactly {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The IV is the wrong length (must be [`IV_LEN`] bytes).
    #[error("initialization vector must be exactly {IV_LEN} bytes, got {0}")]
    InvalidIvLength(usize),

    /// The ciphertext is not valid base64.
    #[error("ciphertext is not valid base64: {0}")]
    Decoding(#[from] base64::DecodeError),

    /// Decryption or unpadding failed, or the plaintext is not UTF-8.
    #[error("ciphertext could not be decrypted")]
    Cryptographic,
}

/// Symmetric encrypt/decrypt primitive for a single string field.
///
/// Implementations must be safe to share across requests; the only state they
/// may hold is read-only key material.
pub trait FieldCipher: Send + Sync {
    /// Encrypt `plaintext` and return the ciphertext as text.
    fn encrypt(&self, plaintext: &str) -> String;

    /// Reverse [`FieldCipher::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Decoding`] if the text is not valid base64 and
    /// [`CipherError::Cryptographic`] if it decodes but does not decrypt.
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;
}

/// Fixed-size secret buffer, zeroed on drop.
struct SecretBytes<const N: usize>(Box<[u8; N]>);

impl<const N: usize> SecretBytes<N> {
    fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != N {
            return None;
        }
        let mut buf = Box::new([0u8; N]);
        buf.copy_from_slice(bytes);
        Some(Self(buf))
    }
}

impl<const N: usize> Drop for SecretBytes<N> {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

/// AES-256-CBC [`FieldCipher`] with a process-wide key and IV.
///
/// Each call builds its own block-mode context from the stored key and IV, so
/// a single instance can serve concurrent requests without locking.
pub struct AesCbcCipher {
    key: SecretBytes<KEY_LEN>,
    iv: SecretBytes<IV_LEN>,
}

impl AesCbcCipher {
    /// Build a cipher from raw key and IV bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] or
    /// [`CipherError::InvalidIvLength`] if either slice has the wrong length.
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CipherError> {
        let key = SecretBytes::from_slice(key).ok_or(CipherError::InvalidKeyLength(key.len()))?;
        let iv = SecretBytes::from_slice(iv).ok_or(CipherError::InvalidIvLength(iv.len()))?;
        Ok(Self { key, iv })
    }

    /// Build a cipher from key and IV given as text; the UTF-8 bytes are used.
    ///
    /// # Errors
    ///
    /// Same as [`AesCbcCipher::new`]. Lengths are counted in bytes, so a
    /// 32-character key containing multi-byte characters is rejected.
    pub fn from_text(key: &str, iv: &str) -> Result<Self, CipherError> {
        Self::new(key.as_bytes(), iv.as_bytes())
    }
}

impl FieldCipher for AesCbcCipher {
    fn encrypt(&self, plaintext: &str) -> String {
        let ciphertext = Aes256CbcEnc::new(&(*self.key.0).into(), &(*self.iv.0).into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        STANDARD.encode(ciphertext)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let raw = STANDARD.decode(ciphertext)?;
        let plaintext = Aes256CbcDec::new(&(*self.key.0).into(), &(*self.iv.0).into())
            .decrypt_padded_vec_mut::<Pkcs7>(&raw)
            .map_err(|_| CipherError::Cryptographic)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::Cryptographic)
    }
}

impl std::fmt::Debug for AesCbcCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.write_str("AesCbcCipher([REDACTED])")
    }
}
