//! # Error Types
//!
//! Two families of failure:
//!
//! - **Rejections** ([`TypeRejection`]) are expected business outcomes: the
//!   upload's metadata and content disagree, or the resolved type is not
//!   permitted. They carry the form field (`upload`) and a rendered,
//!   user-facing message.
//! - **Faults** ([`PolicyError`], [`ValidationError::Stream`]) mean the
//!   environment is broken: a policy file that does not parse, an upload
//!   stream that cannot be read. They abort startup or the call and are
//!   never reported as a type mismatch.

use std::path::PathBuf;

use thiserror::Error;

use crate::mime::{display_or_unknown, MimeType};

/// Form field that rejections are attached to.
pub const UPLOAD_FIELD: &str = "upload";

/// Errors raised while loading or compiling a type policy.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// The policy file does not exist.
    #[error("policy file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// JSON parsing failed.
    #[error("failed to parse JSON policy at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// YAML parsing failed.
    #[error("failed to parse YAML policy at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// The policy compiled into the binary does not parse.
    #[error("embedded default policy is invalid: {0}")]
    Embedded(#[source] serde_json::Error),

    /// An override entry is not `*`, `type/*` or `type/subtype`.
    #[error("invalid override pattern {pattern:?} for generic type {generic}")]
    InvalidOverridePattern { generic: String, pattern: String },

    /// An allowed extension is empty or contains a path separator.
    #[error("invalid allowed extension {extension:?}")]
    InvalidExtension { extension: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Two candidate types that cannot be reconciled.
///
/// Either side may be absent when an archive's extension and content
/// disagree and one of them produced no type at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "conflicting types '{}' and '{}'",
    display_or_unknown(.first.as_ref()),
    display_or_unknown(.second.as_ref())
)]
pub struct TypeConflict {
    pub first: Option<MimeType>,
    pub second: Option<MimeType>,
}

impl TypeConflict {
    pub fn new(first: Option<MimeType>, second: Option<MimeType>) -> Self {
        Self { first, second }
    }
}

/// Why a resource was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionKind {
    /// The extension is not allowed, or the resolved type is not on the
    /// allow-list.
    UnsupportedType,
    /// Two type signals conflict.
    MismatchedType(TypeConflict),
}

/// A validated business rejection, ready to show to the uploader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct TypeRejection {
    /// Form field the message belongs to. Always [`UPLOAD_FIELD`].
    pub field: &'static str,
    pub kind: RejectionKind,
    /// Rendered message, including the support contact.
    pub message: String,
}

impl TypeRejection {
    pub fn is_mismatch(&self) -> bool {
        matches!(self.kind, RejectionKind::MismatchedType(_))
    }

    /// The conflicting pair, for mismatches.
    pub fn conflict(&self) -> Option<&TypeConflict> {
        match &self.kind {
            RejectionKind::MismatchedType(conflict) => Some(conflict),
            RejectionKind::UnsupportedType => None,
        }
    }
}

/// Errors returned by resource validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The resource's types are inconsistent or not permitted.
    #[error(transparent)]
    Rejected(#[from] TypeRejection),

    /// The upload stream could not be read or rewound.
    #[error("failed to read upload stream: {0}")]
    Stream(#[from] std::io::Error),
}

impl ValidationError {
    /// The business rejection, if this is one.
    pub fn rejection(&self) -> Option<&TypeRejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            Self::Stream(_) => None,
        }
    }
}
