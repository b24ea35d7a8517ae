//! Session marker encryption.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE as BASE64_URL, Engine as _};
use rand::Rng;

/// Required key length in bytes.
pub const KEY_LEN: usize = 32;

/// Nonce length prepended to every sealed value.
pub const NONCE_LEN: usize = 12;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid key: expected {KEY_LEN} bytes, got {0}")]
    InvalidKey(usize),
    #[error("Encryption error: {0}")]
    Encryption(String),
    #[error("Decryption error: {0}")]
    Decryption(String),
}

/// AES-256-GCM sealer producing `base64url(nonce || ciphertext)`.
#[derive(Clone)]
pub struct SessionCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for SessionCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionCipher { .. }")
    }
}

impl SessionCipher {
    /// Create a cipher from a 32-byte key.
    ///
    /// # Errors
    /// Returns [`CryptoError::InvalidKey`] if `key` is not [`KEY_LEN`] bytes.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != KEY_LEN {
            return Err(CryptoError::InvalidKey(key.len()));
        }
        let cipher =
            Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKey(key.len()))?;
        Ok(Self { cipher })
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    ///
    /// # Errors
    /// Returns [`CryptoError::Encryption`] if the AEAD rejects the input.
    pub fn seal(&self, plaintext: &str) -> Result<String, CryptoError> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::rng().random();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend(ciphertext);
        Ok(BASE64_URL.encode(combined))
    }

    /// Decrypt a value produced by [`SessionCipher::seal`].
    ///
    /// # Errors
    /// Returns [`CryptoError::Decryption`] for bad base64, truncated input, a
    /// failed tag check or a non UTF-8 plaintext.
    pub fn open(&self, sealed: &str) -> Result<String, CryptoError> {
        let data = BASE64_URL
            .decode(sealed)
            .map_err(|e| CryptoError::Decryption(e.to_string()))?;

        if data.len() < NONCE_LEN {
            return Err(CryptoError::Decryption("ciphertext too short".into()));
        }

        let (nonce, ciphertext) = data.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| CryptoError::Decryption(e.to_string()))?;

        String::from_utf8(plaintext).map_err(|e| CryptoError::Decryption(e.to_string()))
    }
}
