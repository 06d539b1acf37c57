//! # Encryption Module
//!
//! AES-256-GCM for field confidentiality and integrity.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      FIELD ENCRYPTION                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  AES-256-GCM(                                                           │
//! │    key       = PBKDF2(password, salt),                                  │
//! │    nonce     = 12 random bytes,                                         │
//! │    plaintext = UTF-8 field text,                                        │
//! │    aad       = (none)                                                   │
//! │  )                                                                      │
//! │           ↓                                                             │
//! │  Ciphertext + 16-byte Auth Tag                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Size of the encryption key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// A nonce (number used once) for AES-GCM encryption
///
/// ## Critical Security Requirement
///
/// **NEVER reuse a nonce with the same key!**
///
/// Every sealed field gets its own salt and therefore its own key, so in
/// practice each key encrypts exactly one message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce(pub [u8; NONCE_SIZE]);

impl Nonce {
    /// Generate a cryptographically random nonce
    pub fn random() -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// An AES-256-GCM encryption key
///
/// Zeroized when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build a key by writing into its own buffer, so the bytes never sit
    /// in an unmanaged stack copy
    pub(crate) fn fill_with(fill: impl FnOnce(&mut [u8; KEY_SIZE])) -> Self {
        let mut key = Self([0u8; KEY_SIZE]);
        fill(&mut key.0);
        key
    }

    /// Borrow the raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// Encrypt bytes using AES-256-GCM under a fresh random nonce
///
/// ## Returns
///
/// Tuple of (nonce, ciphertext_with_tag)
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8]) -> Result<(Nonce, Vec<u8>)> {
    let nonce = Nonce::random();
    let ciphertext = encrypt_with_nonce(key, &nonce, plaintext)?;
    Ok((nonce, ciphertext))
}

/// Encrypt bytes using AES-256-GCM under a caller-chosen nonce
///
/// The caller is responsible for never pairing this nonce with this key
/// again.
pub fn encrypt_with_nonce(key: &EncryptionKey, nonce: &Nonce, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(&key.0)
        .map_err(|e| Error::EncryptionFailed(format!("Invalid key: {}", e)))?;

    cipher
        .encrypt(AesNonce::from_slice(&nonce.0), plaintext)
        .map_err(|e| Error::EncryptionFailed(format!("Encryption failed: {}", e)))
}

/// Decrypt bytes using AES-256-GCM
///
/// ## Errors
///
/// Returns `AuthenticationFailed` if the tag does not verify, which covers a
/// wrong key, a wrong nonce, and any modification of the ciphertext.
pub fn decrypt(key: &EncryptionKey, nonce: &Nonce, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(&key.0)
        .map_err(|e| Error::KeyDerivationFailed(format!("Invalid key: {}", e)))?;

    cipher
        .decrypt(AesNonce::from_slice(&nonce.0), ciphertext)
        .map_err(|_| Error::AuthenticationFailed)
}

// ============================================================================
// TESTS
// ============================================================================
