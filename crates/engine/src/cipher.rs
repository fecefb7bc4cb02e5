//! Symmetric value cipher.
//!
//! Every monetary field is sealed with AES-256-GCM under a key derived from a
//! [`Scope`]. A user scope's key is `HMAC-SHA256(default key, scope)`, so the
//! id stored next to a value is not enough to open it; without a configured
//! key it degrades to `SHA-256(scope)`. The global scope uses
//! `SHA-256(default key)` and requires the key. Each call draws a fresh 96-bit nonce, so sealing the same
//! value twice never yields the same text.
//!
//! The stored format is `base64(nonce || ciphertext)` with the standard
//! alphabet and padding.

use std::fmt;

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::{EngineError, ResultEngine};

/// Size of the AES-GCM nonce in bytes (96 bits).
const NONCE_SIZE: usize = 12;

/// Identifies whose data is being encrypted.
///
/// Record values are always sealed under [`Scope::user`]; the empty scope
/// falls back to the configured default key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scope(String);

impl Scope {
    /// The scope of a user's records: the decimal rendering of the user id.
    #[must_use]
    pub fn user(user_id: i64) -> Self {
        Self(user_id.to_string())
    }

    /// The empty scope, backed by the configured default key.
    #[must_use]
    pub fn global() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Scope {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Authenticated encryption of single values, keyed per [`Scope`].
#[derive(Clone, Default)]
pub struct ValueCipher {
    default_key: Option<Zeroizing<String>>,
}

impl fmt::Debug for ValueCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCipher")
            .field("default_key", &self.default_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ValueCipher {
    /// Builds a cipher. `default_key` is the key material used for the global
    /// scope; an empty string counts as missing.
    #[must_use]
    pub fn new(default_key: Option<&str>) -> Self {
        Self {
            default_key: default_key
                .filter(|key| !key.is_empty())
                .map(|key| Zeroizing::new(key.to_string())),
        }
    }

    fn derive_key(&self, scope: &Scope) -> ResultEngine<Zeroizing<[u8; 32]>> {
        let mut key = Zeroizing::new([0u8; 32]);
        match (scope.is_global(), self.default_key.as_deref()) {
            (true, None) => {
                return Err(EngineError::Configuration(
                    "encryption key is not configured".to_string(),
                ));
            }
            (true, Some(default_key)) => {
                key.copy_from_slice(Sha256::digest(default_key.as_bytes()).as_slice());
            }
            (false, Some(default_key)) => {
                let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(default_key.as_bytes())
                    .map_err(|err| EngineError::Crypto(format!("invalid key material: {err}")))?;
                mac.update(scope.as_str().as_bytes());
                key.copy_from_slice(mac.finalize().into_bytes().as_slice());
            }
            (false, None) => {
                key.copy_from_slice(Sha256::digest(scope.as_str().as_bytes()).as_slice());
            }
        }
        Ok(key)
    }

    fn aead(&self, scope: &Scope) -> ResultEngine<Aes256Gcm> {
        let key = self.derive_key(scope)?;
        <Aes256Gcm as KeyInit>::new_from_slice(key.as_slice())
            .map_err(|err| EngineError::Crypto(format!("failed to create cipher: {err}")))
    }

    /// Seals `plaintext` and returns `base64(nonce || ciphertext)`.
    pub fn encrypt(&self, scope: &Scope, plaintext: &str) -> ResultEngine<String> {
        let aead = self.aead(scope)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = aead
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| EngineError::Crypto("encryption failed".to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(nonce.as_slice());
        blob.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(blob))
    }

    /// Opens a blob produced by [`ValueCipher::encrypt`] under the same scope.
    pub fn decrypt(&self, scope: &Scope, encoded: &str) -> ResultEngine<String> {
        let aead = self.aead(scope)?;

        let blob = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|err| EngineError::Decoding(format!("invalid base64 ciphertext: {err}")))?;
        if blob.len() < NONCE_SIZE {
            return Err(EngineError::Decoding("ciphertext too short".to_string()));
        }

        let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);
        let plaintext = aead
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                EngineError::Authentication("tag mismatch: wrong scope or tampered data".to_string())
            })?;

        String::from_utf8(plaintext)
            .map_err(|_| EngineError::Decoding("plaintext is not valid UTF-8".to_string()))
    }
}
