//! # Solution Documents
//!
//! A solution is a titled, ordered set of source files, each carrying
//! inline review annotations. This module converts between the decrypted
//! form the application works with and the versioned encrypted form that
//! is stored or transmitted.
//!
//! ## Modules
//!
//! - [`decrypted`] - `PlainDocument`, `PlainFile`, `Annotation`
//! - [`encrypted`] - Wire formats and version detection
//! - [`codec`] - Sequential encode/decode, single-file decode, upgrade
//! - [`concurrent`] - The same operations with per-field fan-out
//!
//! ## Example
//!
//! ```ignore
//! use solution_vault::solution::{decode_json, encode, PlainDocument, PlainFile};
//!
//! let doc = PlainDocument::new("Week 3", vec![PlainFile::new("main.py", "python", "print(1)")]);
//! let json = encode("password", &doc)?.to_json()?;
//! assert_eq!(decode_json("password", &json)?, doc);
//! ```

pub mod codec;
pub mod concurrent;
pub mod decrypted;
pub mod encrypted;

pub use codec::{decode, decode_file, decode_json, encode, upgrade, Codec};
pub use concurrent::{decode_concurrent, encode_concurrent};
pub use decrypted::{Annotation, NumberRange, PlainDocument, PlainFile, UNNAMED, UNTITLED};
pub use encrypted::{
    EncodedDocument, EncryptedSolution, EncryptedSolutionFile, FileVersion, LegacySolution,
};
