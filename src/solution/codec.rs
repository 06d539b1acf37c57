//! Mapping between [`PlainDocument`] and the encrypted wire formats.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SOLUTION CODEC                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  encode(password, PlainDocument) ──► EncryptedSolution ("2.0")          │
//! │     per file: seal(code), seal(json(annotations))                      │
//! │                                                                         │
//! │  decode(password, EncodedDocument) ──► PlainDocument                    │
//! │     Current ──► open every file's code + annotations, keep order        │
//! │     Legacy  ──► upgrade to "Untitled" / one file named "unnamed"        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Code and annotations are always sealed separately, each with its own
//! salt and key. One file can be opened without opening the rest, and a
//! damaged field fails on its own. Any failing field fails the whole
//! decode; there is no partial document.

use super::decrypted::{Annotation, PlainDocument, PlainFile, UNNAMED, UNTITLED};
use super::encrypted::{
    EncodedDocument, EncryptedSolution, EncryptedSolutionFile, FileVersion, LegacySolution,
};
use crate::config::{CodecConfig, KdfParams};
use crate::crypto::envelope::{open_with_params, seal_with_params};
use crate::error::{Error, Result};

/// Encoder/decoder bound to a configuration
///
/// The free functions in this module use `Codec::default()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    /// Create a codec with the given configuration
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Create a codec configured from the environment
    pub fn from_env() -> Result<Self> {
        CodecConfig::from_env().map(Self::new)
    }

    /// The active configuration
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub(crate) fn kdf(&self) -> &KdfParams {
        &self.config.kdf
    }

    /// Encrypt a document into the current format
    pub fn encode(&self, password: &str, document: &PlainDocument) -> Result<EncryptedSolution> {
        tracing::debug!(files = document.files.len(), "Encoding solution");

        let files = document
            .files
            .iter()
            .map(|file| self.encode_file(password, file))
            .collect::<Result<Vec<_>>>()?;

        Ok(EncryptedSolution::new(document.title.clone(), files))
    }

    /// Encrypt a single file
    pub fn encode_file(&self, password: &str, file: &PlainFile) -> Result<EncryptedSolutionFile> {
        Ok(EncryptedSolutionFile {
            name: file.name.clone(),
            language: file.language.clone(),
            code: seal_with_params(password, &file.code, self.kdf())?,
            annotations: seal_annotations(password, &file.annotations, self.kdf())?,
        })
    }

    /// Decrypt a document of any known version
    pub fn decode(&self, password: &str, document: &EncodedDocument) -> Result<PlainDocument> {
        let version = document.version();
        tracing::debug!(
            version = version.map_or("untagged", |v| v.as_str()),
            "Decoding solution"
        );

        let result = match document {
            EncodedDocument::Current(solution) => self.decode_current(password, solution),
            EncodedDocument::Legacy(solution) => self.decode_legacy(password, solution),
        };

        if let Err(ref err) = result {
            tracing::warn!(code = err.code(), "Failed to decode solution: {}", err);
        }

        result
    }

    /// Parse and decrypt a JSON document
    pub fn decode_json(&self, password: &str, json: &str) -> Result<PlainDocument> {
        let document = EncodedDocument::from_json(json).map_err(|err| {
            tracing::warn!(code = err.code(), "Rejected solution document: {}", err);
            err
        })?;
        self.decode(password, &document)
    }

    /// Decrypt one file of a current-format document
    pub fn decode_file(&self, password: &str, file: &EncryptedSolutionFile) -> Result<PlainFile> {
        Ok(PlainFile {
            name: file.name.clone(),
            language: file.language.clone(),
            code: open_with_params(password, &file.code, self.kdf())?,
            annotations: open_annotations(password, &file.annotations, self.kdf())?,
        })
    }

    /// Re-encode a document of any known version into the current format
    pub fn upgrade(&self, password: &str, document: &EncodedDocument) -> Result<EncryptedSolution> {
        let plain = self.decode(password, document)?;
        self.encode(password, &plain)
    }

    fn decode_current(&self, password: &str, solution: &EncryptedSolution) -> Result<PlainDocument> {
        ensure_version(solution.version, &[FileVersion::V2])?;

        let files = solution
            .files
            .iter()
            .map(|file| self.decode_file(password, file))
            .collect::<Result<Vec<_>>>()?;

        Ok(PlainDocument {
            title: solution.title.clone(),
            files,
        })
    }

    fn decode_legacy(&self, password: &str, solution: &LegacySolution) -> Result<PlainDocument> {
        if let Some(version) = solution.version {
            ensure_version(version, &[FileVersion::V1])?;
        }

        let code = open_with_params(password, &solution.code, self.kdf())?;
        let annotations = open_annotations(password, &solution.annotations, self.kdf())?;

        Ok(upgrade_legacy(&solution.language, code, annotations))
    }
}

/// Shape a legacy single-file payload as a current document
pub(crate) fn upgrade_legacy(
    language: &str,
    code: String,
    annotations: Vec<Annotation>,
) -> PlainDocument {
    PlainDocument {
        title: UNTITLED.to_string(),
        files: vec![PlainFile {
            name: UNNAMED.to_string(),
            language: language.to_string(),
            code,
            annotations,
        }],
    }
}

/// Serialize and seal an annotation list
pub(crate) fn seal_annotations(
    password: &str,
    annotations: &[Annotation],
    params: &KdfParams,
) -> Result<String> {
    let json = serde_json::to_string(annotations)?;
    seal_with_params(password, &json, params)
}

/// Open and parse an annotation list
///
/// An opened token that is not a JSON annotation array is corruption, not
/// an empty list.
pub(crate) fn open_annotations(
    password: &str,
    token: &str,
    params: &KdfParams,
) -> Result<Vec<Annotation>> {
    let json = open_with_params(password, token, params)?;
    serde_json::from_str(&json)
        .map_err(|e| Error::InvalidEncoding(format!("Annotations are not a valid list: {}", e)))
}

pub(crate) fn ensure_version(found: FileVersion, accepted: &[FileVersion]) -> Result<()> {
    if accepted.contains(&found) {
        Ok(())
    } else {
        Err(Error::UnsupportedVersion(found.to_string()))
    }
}

// ============================================================================
// DEFAULT-CONFIGURATION SHORTHANDS
// ============================================================================

/// Encrypt a document into the current format
pub fn encode(password: &str, document: &PlainDocument) -> Result<EncryptedSolution> {
    Codec::default().encode(password, document)
}

/// Decrypt a document of any known version
pub fn decode(password: &str, document: &EncodedDocument) -> Result<PlainDocument> {
    Codec::default().decode(password, document)
}

/// Parse and decrypt a JSON document
pub fn decode_json(password: &str, json: &str) -> Result<PlainDocument> {
    Codec::default().decode_json(password, json)
}

/// Decrypt one file of a current-format document
pub fn decode_file(password: &str, file: &EncryptedSolutionFile) -> Result<PlainFile> {
    Codec::default().decode_file(password, file)
}

/// Re-encode a document of any known version into the current format
pub fn upgrade(password: &str, document: &EncodedDocument) -> Result<EncryptedSolution> {
    Codec::default().upgrade(password, document)
}

// ============================================================================
// TESTS
// ============================================================================
