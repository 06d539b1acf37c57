//! The decrypted, version-agnostic document model.
//!
//! Whatever format version a document was stored in, decoding always
//! yields these types, and encoding always starts from them.

use serde::{Deserialize, Serialize};

/// Title given to documents from formats that had no title
pub const UNTITLED: &str = "Untitled";

/// Name given to the single file of formats that had no file names
pub const UNNAMED: &str = "unnamed";

/// An inclusive `[from, to]` range, serialized as a two-element array
///
/// `from <= to` is expected but not enforced here; whoever builds an
/// annotation is responsible for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumberRange(pub u32, pub u32);

impl NumberRange {
    /// Create a range from its bounds
    pub fn new(from: u32, to: u32) -> Self {
        Self(from, to)
    }
}

/// A review comment anchored to a region of a file
///
/// `comment` is plain text. Renderers must escape it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// The comment text
    pub comment: String,
    /// Lines covered, inclusive
    pub line: NumberRange,
    /// Columns covered, inclusive
    pub column: NumberRange,
}

impl Annotation {
    /// Create an annotation
    pub fn new(comment: impl Into<String>, line: NumberRange, column: NumberRange) -> Self {
        Self {
            comment: comment.into(),
            line,
            column,
        }
    }
}

/// One source file of a solution, in clear text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainFile {
    /// File name; expected, not required, to be unique within a document
    pub name: String,
    /// Language identifier understood by the editor
    pub language: String,
    /// Source code
    pub code: String,
    /// Review annotations, in display order
    pub annotations: Vec<Annotation>,
}

impl PlainFile {
    /// Create a file without annotations
    pub fn new(
        name: impl Into<String>,
        language: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            code: code.into(),
            annotations: Vec::new(),
        }
    }

    /// Builder-style helper to attach annotations
    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }
}

/// A decrypted solution: a title and an ordered list of files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainDocument {
    /// Human-readable title
    pub title: String,
    /// Files in display order
    pub files: Vec<PlainFile>,
}

impl PlainDocument {
    /// Create a document
    pub fn new(title: impl Into<String>, files: Vec<PlainFile>) -> Self {
        Self {
            title: title.into(),
            files,
        }
    }

    /// Look up a file by name (first match wins)
    pub fn file(&self, name: &str) -> Option<&PlainFile> {
        self.files.iter().find(|f| f.name == name)
    }
}
