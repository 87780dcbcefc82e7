//! # MIME Type Value
//!
//! `MimeType` is an opaque `type/subtype` string. It is not parsed or
//! normalized: two values are the same type only if their strings are equal
//! or the policy declares them equivalent (see [`crate::policy`]).

use serde::{Deserialize, Serialize};

/// Fallback type when no signal identifies a resource.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Generic OLE2 compound document, used when the specific Office format
/// cannot be identified from the content.
pub const COMPOUND_DOCUMENT: &str = "application/x-ole-storage";

/// A media type identifier such as `text/csv`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MimeType(String);

impl MimeType {
    /// Wrap a type string as-is.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Wrap a type string, treating empty or whitespace-only input as absent.
    pub fn non_empty(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The universal fallback, `application/octet-stream`.
    pub fn octet_stream() -> Self {
        Self(OCTET_STREAM.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The segment before the first `/` (`text` for `text/csv`).
    pub fn top_level(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for MimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MimeType {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MimeType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for MimeType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Render an optional type for messages and logs.
pub fn display_or_unknown(mime: Option<&MimeType>) -> &str {
    mime.map(MimeType::as_str).unwrap_or("unknown")
}
