//! # Cryptography Module
//!
//! Password-based sealing of individual document fields.
//!
//! ## Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  seal(password, text)                                                   │
//! │  ─────────────────────                                                  │
//! │  1. salt  ← CSPRNG (16 bytes)                                           │
//! │  2. nonce ← CSPRNG (12 bytes)                                           │
//! │  3. key   ← PBKDF2-HMAC-SHA256(password, salt, 250k rounds)  [kdf]      │
//! │  4. ct    ← AES-256-GCM(key, nonce, text)               [encryption]    │
//! │  5. token ← base64(salt ‖ nonce ‖ ct)                     [envelope]    │
//! │                                                                         │
//! │  open(password, token) reverses each step; the GCM tag is the only      │
//! │  integrity check and a mismatch is always `AuthenticationFailed`.       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`kdf`] - Password → key derivation and salts
//! - [`encryption`] - AES-256-GCM primitive
//! - [`envelope`] - Self-describing base64 tokens

pub mod encryption;
pub mod envelope;
pub mod kdf;

pub use encryption::{decrypt, encrypt, EncryptionKey, Nonce, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use envelope::{open, open_with_params, seal, seal_with_params, HEADER_SIZE};
pub use kdf::{derive_key, Salt, SALT_SIZE};
