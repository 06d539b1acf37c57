//! # Error Handling
//!
//! This module provides the error type shared by every layer of the vault.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Token Errors                                                      │
//! │  │   ├── MalformedToken        - Not base64, or shorter than 28 bytes  │
//! │  │   ├── AuthenticationFailed  - Wrong password or tampered data       │
//! │  │   ├── InvalidEncoding       - Opened bytes are not UTF-8 / JSON     │
//! │  │   ├── KeyDerivationFailed   - PBKDF2 could not produce a key        │
//! │  │   └── EncryptionFailed      - AES-GCM primitive fault while sealing │
//! │  │                                                                      │
//! │  ├── Document Errors                                                   │
//! │  │   ├── UnsupportedVersion    - Unknown format version tag            │
//! │  │   ├── SerializationError    - Could not serialize to JSON           │
//! │  │   └── DeserializationError  - Outer document shape is unreadable    │
//! │  │                                                                      │
//! │  ├── Configuration Errors                                              │
//! │  │   └── InvalidConfig         - Rejected codec configuration          │
//! │  │                                                                      │
//! │  └── Internal Errors                                                   │
//! │      └── Internal              - A worker task died                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is retryable: reopening the same token with the same
//! password cannot change the outcome.

use thiserror::Error;

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the vault
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ========================================================================
    // Token Errors (100-199)
    // ========================================================================

    /// The token is not base64 or too short to hold a salt and nonce
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// AEAD tag verification failed.
    ///
    /// Deliberately carries no detail: a wrong password and a tampered
    /// ciphertext must look identical to the caller.
    #[error("Authentication failed: wrong password or corrupted data")]
    AuthenticationFailed,

    /// Decrypted content is not valid UTF-8, or annotations are not valid JSON
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Key derivation failed
    #[error("Failed to derive key: {0}")]
    KeyDerivationFailed(String),

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // ========================================================================
    // Document Errors (200-299)
    // ========================================================================

    /// The document carries a version tag this build does not know
    #[error("Unsupported document version: {0}")]
    UnsupportedVersion(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    // ========================================================================
    // Configuration Errors (300-399)
    // ========================================================================

    /// Invalid codec configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 100-199: Token / crypto
    /// - 200-299: Document
    /// - 300-399: Configuration
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Token (100-199)
            Error::MalformedToken(_) => 100,
            Error::AuthenticationFailed => 101,
            Error::InvalidEncoding(_) => 102,
            Error::KeyDerivationFailed(_) => 103,
            Error::EncryptionFailed(_) => 104,

            // Document (200-299)
            Error::UnsupportedVersion(_) => 200,
            Error::SerializationError(_) => 201,
            Error::DeserializationError(_) => 202,

            // Configuration (300-399)
            Error::InvalidConfig(_) => 300,

            // Internal (900-999)
            Error::Internal(_) => 900,
        }
    }

    /// Check if this error requires user action
    ///
    /// A failed authentication is the only condition a user can fix, by
    /// entering the right password.
    pub fn requires_user_action(&self) -> bool {
        matches!(self, Error::AuthenticationFailed)
    }

    /// Check if this error indicates damaged data rather than a bad input
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::MalformedToken(_) | Error::InvalidEncoding(_) | Error::DeserializationError(_)
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::MalformedToken(format!("Invalid base64: {}", err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::InvalidEncoding(format!("Plaintext is not UTF-8: {}", err))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Internal(format!("Worker task failed: {}", err))
    }
}

// ============================================================================
// TESTS
// ============================================================================
