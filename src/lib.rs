//! # Solution Vault
//!
//! Password-protected storage format for code solutions: one or more named
//! source files plus inline review annotations, safe to put through any
//! untrusted storage or transport.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SOLUTION VAULT                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   PlainDocument ───── encode ─────► EncryptedSolution ("2.0")           │
//! │        ▲                                   │                            │
//! │        │                                   ▼                            │
//! │        └──────── decode ◄──── EncodedDocument (untagged / 1.0 / 2.0)    │
//! │                                                                         │
//! │   ┌──────────────────────── solution ───────────────────────────────┐   │
//! │   │  version dispatch · legacy upgrade · per-file fan-out           │   │
//! │   └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                 │ one seal/open per field               │
//! │   ┌──────────────────────── crypto ─────────────────────────────────┐   │
//! │   │  PBKDF2-HMAC-SHA256 → AES-256-GCM → base64(salt‖nonce‖ct)       │   │
//! │   └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`config`] - Key derivation and concurrency settings
//! - [`encoding`] - Base64 transcoding for large buffers
//! - [`crypto`] - Password-based sealing of single fields
//! - [`solution`] - Document model, wire formats, and the codec
//!
//! ## Security Model
//!
//! | Property | Guarantee |
//! |----------|-----------|
//! | Confidentiality | Code and annotations are unreadable without the password |
//! | Integrity | Any modified field fails with `AuthenticationFailed` |
//! | Key isolation | Every field has its own salt and therefore its own key |
//! | Inspectability | Title, file names and languages stay in clear text |
//!
//! Encoding always produces the newest format. Decoding accepts every
//! format ever produced and rejects anything else.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod solution;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use config::{CodecConfig, KdfParams};
pub use crypto::{open, seal};
pub use error::{Error, Result};
pub use solution::{
    decode, decode_concurrent, decode_file, decode_json, encode, encode_concurrent, upgrade,
    Annotation, Codec, EncodedDocument, EncryptedSolution, EncryptedSolutionFile, FileVersion,
    NumberRange, PlainDocument, PlainFile,
};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of this crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns the document format version this build writes
pub fn format_version() -> FileVersion {
    FileVersion::CURRENT
}

// ============================================================================
// TESTS
// ============================================================================
