//! The encrypted, version-tagged wire format.
//!
//! ## Format History
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DOCUMENT FORMAT VERSIONS                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  (no tag)  { language, code, annotations }          decode only         │
//! │  "1.0"     { version, language, code, annotations } decode only         │
//! │  "2.0"     { version, title, files: [                encode + decode    │
//! │                { name, language, code, annotations }, ... ] }           │
//! │                                                                         │
//! │  `code` and `annotations` are sealed tokens; everything else is         │
//! │  clear text so a document can be inspected without the password.       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The version tag is read before the rest of the document is parsed, and
//! the set of accepted tags is closed: an unknown tag is rejected outright.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Field holding the format version tag
const VERSION_FIELD: &str = "version";

/// Known document format versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileVersion {
    /// Single file, no title
    #[serde(rename = "1.0")]
    V1,
    /// Multiple named files and a title
    #[serde(rename = "2.0")]
    V2,
}

impl FileVersion {
    /// The version every freshly encoded document carries
    pub const CURRENT: FileVersion = FileVersion::V2;

    /// The wire tag
    pub fn as_str(&self) -> &'static str {
        match self {
            FileVersion::V1 => "1.0",
            FileVersion::V2 => "2.0",
        }
    }

    /// Parse a wire tag; `None` for anything unknown
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "1.0" => Some(FileVersion::V1),
            "2.0" => Some(FileVersion::V2),
            _ => None,
        }
    }
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file of a current-format document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSolutionFile {
    /// Clear-text file name
    pub name: String,
    /// Clear-text language identifier
    pub language: String,
    /// Sealed source code
    pub code: String,
    /// Sealed JSON array of annotations
    pub annotations: String,
}

/// A current-format ("2.0") document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSolution {
    /// Format version tag
    pub version: FileVersion,
    /// Clear-text title
    pub title: String,
    /// Files in display order
    pub files: Vec<EncryptedSolutionFile>,
}

impl EncryptedSolution {
    /// Create a document stamped with [`FileVersion::CURRENT`]
    pub fn new(title: impl Into<String>, files: Vec<EncryptedSolutionFile>) -> Self {
        Self {
            version: FileVersion::CURRENT,
            title: title.into(),
            files,
        }
    }

    /// Serialize to compact JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A single-file document in the untagged or "1.0" format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySolution {
    /// `None` for the oldest, untagged documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<FileVersion>,
    /// Clear-text language identifier
    pub language: String,
    /// Sealed source code
    pub code: String,
    /// Sealed JSON array of annotations
    pub annotations: String,
}

/// Any document this crate can decode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EncodedDocument {
    /// "2.0"
    Current(EncryptedSolution),
    /// Untagged or "1.0"
    Legacy(LegacySolution),
}

impl EncodedDocument {
    /// Parse a document from JSON text
    ///
    /// ## Errors
    ///
    /// - `DeserializationError`: not JSON, not an object, or missing fields
    ///   required by its version
    /// - `UnsupportedVersion`: the tag is present but unknown
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::DeserializationError(format!("Document is not JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Parse a document from an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        let version = read_version_tag(&value)?;

        match version {
            None | Some(FileVersion::V1) => serde_json::from_value::<LegacySolution>(value)
                .map(EncodedDocument::Legacy)
                .map_err(|e| shape_error(version, e)),
            Some(FileVersion::V2) => serde_json::from_value::<EncryptedSolution>(value)
                .map(EncodedDocument::Current)
                .map_err(|e| shape_error(version, e)),
        }
    }

    /// The document's version tag; `None` for untagged legacy documents
    pub fn version(&self) -> Option<FileVersion> {
        match self {
            EncodedDocument::Current(solution) => Some(solution.version),
            EncodedDocument::Legacy(solution) => solution.version,
        }
    }

    /// Whether this document is already in the newest format
    pub fn is_current(&self) -> bool {
        self.version() == Some(FileVersion::CURRENT)
    }

    /// Serialize back to JSON in the shape it was read in
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<EncryptedSolution> for EncodedDocument {
    fn from(solution: EncryptedSolution) -> Self {
        EncodedDocument::Current(solution)
    }
}

impl From<LegacySolution> for EncodedDocument {
    fn from(solution: LegacySolution) -> Self {
        EncodedDocument::Legacy(solution)
    }
}

impl<'de> Deserialize<'de> for EncodedDocument {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        EncodedDocument::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// Read the version tag without looking at the rest of the document.
///
/// Only a missing tag means the untagged format. Any present value that is
/// not a known tag string is rejected, `null` included.
fn read_version_tag(value: &Value) -> Result<Option<FileVersion>> {
    let object = value.as_object().ok_or_else(|| {
        Error::DeserializationError("Document must be a JSON object".to_string())
    })?;

    match object.get(VERSION_FIELD) {
        None => Ok(None),
        Some(Value::String(tag)) => FileVersion::parse(tag)
            .map(Some)
            .ok_or_else(|| Error::UnsupportedVersion(tag.clone())),
        Some(other) => Err(Error::UnsupportedVersion(other.to_string())),
    }
}

fn shape_error(version: Option<FileVersion>, err: serde_json::Error) -> Error {
    let label = version.map_or("untagged", |v| v.as_str());
    Error::DeserializationError(format!("Invalid {} document: {}", label, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_version_tags() {
        assert_eq!(FileVersion::CURRENT, FileVersion::V2);
        assert_eq!(FileVersion::parse("1.0"), Some(FileVersion::V1));
        assert_eq!(FileVersion::parse("2.0"), Some(FileVersion::V2));
        assert_eq!(FileVersion::parse("2"), None);
        assert_eq!(FileVersion::V2.to_string(), "2.0");
        assert_eq!(serde_json::to_value(FileVersion::V1).unwrap(), json!("1.0"));
    }

    #[test]
    fn test_untagged_document_is_legacy() {
        let doc = EncodedDocument::from_value(json!({
            "language": "py", "code": "Y29kZQ==", "annotations": "W10="
        }))
        .unwrap();

        assert_eq!(doc.version(), None);
        assert!(matches!(doc, EncodedDocument::Legacy(_)));
        assert!(!doc.is_current());
    }

    #[test]
    fn test_null_tag_is_rejected() {
        let err = EncodedDocument::from_value(json!({
            "version": null, "language": "py", "code": "", "annotations": ""
        }));
        assert_eq!(err, Err(Error::UnsupportedVersion("null".into())));
    }

    #[test]
    fn test_v1_document_is_legacy() {
        let doc = EncodedDocument::from_value(json!({
            "version": "1.0", "language": "rs", "code": "", "annotations": ""
        }))
        .unwrap();
        assert_eq!(doc.version(), Some(FileVersion::V1));
        assert!(matches!(doc, EncodedDocument::Legacy(_)));
    }

    #[test]
    fn test_v2_document_is_current() {
        let doc = EncodedDocument::from_json(
            r#"{"version":"2.0","title":"T","files":[
                {"name":"a.go","language":"go","code":"c","annotations":"a"}]}"#,
        )
        .unwrap();

        assert!(doc.is_current());
        match doc {
            EncodedDocument::Current(solution) => {
                assert_eq!(solution.title, "T");
                assert_eq!(solution.files.len(), 1);
                assert_eq!(solution.files[0].name, "a.go");
            }
            EncodedDocument::Legacy(_) => panic!("expected current document"),
        }
    }

    #[test]
    fn test_unknown_tags_are_rejected() {
        let err = EncodedDocument::from_value(json!({ "version": "9.9", "title": "T", "files": [] }));
        assert_eq!(err, Err(Error::UnsupportedVersion("9.9".into())));

        let err = EncodedDocument::from_value(json!({ "version": 2, "files": [] }));
        assert_eq!(err, Err(Error::UnsupportedVersion("2".into())));

        // Rejected on the tag alone, whatever the remaining shape
        let err = EncodedDocument::from_value(json!({ "version": "3.0", "anything": true }));
        assert_eq!(err, Err(Error::UnsupportedVersion("3.0".into())));
    }

    #[test]
    fn test_bad_shapes_are_deserialization_errors() {
        assert!(matches!(
            EncodedDocument::from_json("not json"),
            Err(Error::DeserializationError(_))
        ));
        assert!(matches!(
            EncodedDocument::from_value(json!(["2.0"])),
            Err(Error::DeserializationError(_))
        ));
        // "2.0" without files
        assert!(matches!(
            EncodedDocument::from_value(json!({ "version": "2.0", "title": "T" })),
            Err(Error::DeserializationError(_))
        ));
        // untagged without code
        assert!(matches!(
            EncodedDocument::from_value(json!({ "language": "py", "annotations": "" })),
            Err(Error::DeserializationError(_))
        ));
    }

    #[test]
    fn test_serialization_keeps_shape() {
        let legacy = EncodedDocument::Legacy(LegacySolution {
            version: None,
            language: "py".into(),
            code: "c".into(),
            annotations: "a".into(),
        });
        assert_eq!(
            serde_json::to_value(&legacy).unwrap(),
            json!({ "language": "py", "code": "c", "annotations": "a" })
        );

        let current: EncodedDocument = EncryptedSolution::new("T", vec![]).into();
        assert_eq!(
            serde_json::to_value(&current).unwrap(),
            json!({ "version": "2.0", "title": "T", "files": [] })
        );
    }

    #[test]
    fn test_serde_deserialize_goes_through_dispatch() {
        let doc: EncodedDocument =
            serde_json::from_str(r#"{"version":"2.0","title":"","files":[]}"#).unwrap();
        assert!(doc.is_current());

        let err = serde_json::from_str::<EncodedDocument>(r#"{"version":"0.1"}"#).unwrap_err();
        assert!(err.to_string().contains("Unsupported document version"));
    }
}
