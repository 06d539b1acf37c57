//! # Key Derivation
//!
//! Turns a password into an AES-256 key.
//!
//! ## Derivation
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   PASSWORD KEY DERIVATION                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  password (UTF-8 bytes)      salt (16 random bytes, stored in token)    │
//! │           │                              │                              │
//! │           └──────────────┬───────────────┘                              │
//! │                          ▼                                              │
//! │         PBKDF2-HMAC-SHA256 (≥ 250,000 rounds)                           │
//! │                          │                                              │
//! │                          ▼                                              │
//! │               Encryption Key (32 bytes)                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A key is derived fresh for every sealed field with its own salt, so
//! no two fields ever share a key, and nonce reuse under one key cannot
//! happen no matter how many files a document holds.
//!
//! ## Security Considerations
//!
//! | Aspect | Design Choice |
//! |--------|---------------|
//! | KDF Algorithm | PBKDF2 with HMAC-SHA256 |
//! | Work Factor | 250,000 rounds minimum |
//! | Salt | 128 bits from the OS CSPRNG, per field |
//! | Key Lifetime | One seal/open call, zeroized on drop |

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use super::encryption::EncryptionKey;
use crate::config::KdfParams;

/// Size of the PBKDF2 salt in bytes (128 bits)
pub const SALT_SIZE: usize = 16;

/// A per-field PBKDF2 salt
///
/// Not secret: it travels in the first 16 bytes of every token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Salt(pub [u8; SALT_SIZE]);

impl Salt {
    /// Generate a cryptographically random salt
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// Derive an AES-256 key from a password and salt
///
/// Deterministic for a given `(password, salt, params)`; this is what lets
/// `open` rebuild the key `seal` used.
pub fn derive_key(password: &str, salt: &Salt, params: &KdfParams) -> EncryptionKey {
    EncryptionKey::fill_with(|key| {
        pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt.0, params.iterations(), key)
    })
}

// ============================================================================
// TESTS
// ============================================================================
