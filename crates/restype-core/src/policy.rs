//! # Type Policy
//!
//! The policy describes which MIME types are interchangeable, which generic
//! types may be refined by more specific ones, which types are
//! self-describing archives, and which file extensions are accepted at all.
//!
//! ## Source format
//!
//! A policy file is a JSON object (or the equivalent YAML document):
//!
//! ```json
//! {
//!   "extra_mimetypes": { ".shp": "x-gis/x-shapefile" },
//!   "allowed_extensions": ["csv", "pdf", "zip"],
//!   "allowed_overrides": { "text/plain": ["text/*", "application/xml"] },
//!   "equal_types": [["text/xml", "application/xml"]],
//!   "archive_types": ["application/zip"],
//!   "generic_types": ["text/plain", "application/octet-stream"]
//! }
//! ```
//!
//! Every key is optional. `generic_types` defaults to the keys of
//! `allowed_overrides`. A default policy is compiled into the crate and used
//! when no file is configured.
//!
//! ## Lifecycle
//!
//! [`TypePolicy`] is compiled once from a [`PolicyFile`] and never mutated
//! afterwards; share it behind an `Arc` across validations.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::mime::MimeType;

const EMBEDDED_POLICY: &str = include_str!("../resources/resource_types.json");

/// Raw, deserialized policy document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyFile {
    /// Extension to type additions for the extension resolver.
    pub extra_mimetypes: BTreeMap<String, String>,
    /// Bare extensions accepted for uploads. Empty means no restriction.
    pub allowed_extensions: Vec<String>,
    /// Generic type to override patterns.
    pub allowed_overrides: BTreeMap<String, Vec<String>>,
    /// Groups of interchangeable types.
    pub equal_types: Vec<Vec<String>>,
    /// Self-describing container types.
    pub archive_types: Vec<String>,
    /// Types too ambiguous to be trusted alone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_types: Option<Vec<String>>,
}

impl PolicyFile {
    /// The policy compiled into the crate.
    pub fn embedded() -> Result<Self, PolicyError> {
        serde_json::from_str(EMBEDDED_POLICY).map_err(PolicyError::Embedded)
    }

    /// Load a policy file, choosing the parser from the extension:
    /// `.yaml`/`.yml` for YAML, anything else for JSON.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PolicyError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                PolicyError::Io(e)
            }
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| PolicyError::YamlParse {
                path: path.to_path_buf(),
                source: e,
            }),
            _ => serde_json::from_str(&content).map_err(|e| PolicyError::JsonParse {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

/// One entry of an override list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverridePattern {
    /// `*`: any present type.
    Any,
    /// `type/*`: any type with this top-level segment.
    TopLevel(String),
    /// `type/subtype`: this type or anything equivalent to it.
    Exact(MimeType),
}

impl OverridePattern {
    fn parse(generic: &str, raw: &str) -> Result<Self, PolicyError> {
        let invalid = || PolicyError::InvalidOverridePattern {
            generic: generic.to_string(),
            pattern: raw.to_string(),
        };

        let raw = raw.trim();
        if raw == "*" {
            return Ok(Self::Any);
        }
        let (top, sub) = raw.split_once('/').ok_or_else(invalid)?;
        if top.is_empty() || sub.is_empty() || top == "*" || sub.contains('/') {
            return Err(invalid());
        }
        if sub == "*" {
            Ok(Self::TopLevel(top.to_string()))
        } else if sub.contains('*') {
            Err(invalid())
        } else {
            Ok(Self::Exact(MimeType::from(raw)))
        }
    }

    /// Source form of the pattern.
    pub fn as_source(&self) -> String {
        match self {
            Self::Any => "*".to_string(),
            Self::TopLevel(top) => format!("{top}/*"),
            Self::Exact(mime) => mime.to_string(),
        }
    }
}

/// Case-insensitive filename suffix filter built from bare extensions.
#[derive(Debug, Clone)]
pub struct AllowedExtensions {
    extensions: Vec<String>,
    pattern: Regex,
}

impl AllowedExtensions {
    /// Compile the extension list. Returns `Ok(None)` for an empty list.
    pub fn compile(extensions: &[String]) -> Result<Option<Self>, PolicyError> {
        let mut cleaned = Vec::with_capacity(extensions.len());
        for raw in extensions {
            let ext = raw.trim().trim_start_matches('.');
            if ext.is_empty() || ext.contains(['/', '\\']) || ext.contains(char::is_whitespace) {
                return Err(PolicyError::InvalidExtension {
                    extension: raw.clone(),
                });
            }
            cleaned.push(ext.to_string());
        }
        if cleaned.is_empty() {
            return Ok(None);
        }

        let alternation = cleaned
            .iter()
            .map(|ext| regex::escape(ext))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&format!(r"\.({alternation})$"))
            .case_insensitive(true)
            .build()
            .map_err(|_| PolicyError::InvalidExtension {
                extension: cleaned.join(","),
            })?;

        Ok(Some(Self {
            extensions: cleaned,
            pattern,
        }))
    }

    pub fn matches(&self, filename: &str) -> bool {
        self.pattern.is_match(filename)
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

/// Compiled, immutable type policy.
#[derive(Debug, Clone)]
pub struct TypePolicy {
    pub(crate) equal_types: Vec<Vec<MimeType>>,
    pub(crate) overrides: BTreeMap<MimeType, Vec<OverridePattern>>,
    generic_types: BTreeSet<MimeType>,
    archive_types: BTreeSet<MimeType>,
    allowed_extensions: Option<AllowedExtensions>,
    extra_mimetypes: BTreeMap<String, MimeType>,
}

impl TypePolicy {
    /// Compile a policy document.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidOverridePattern` or
    /// `PolicyError::InvalidExtension` for malformed entries.
    pub fn compile(file: &PolicyFile) -> Result<Self, PolicyError> {
        let mut overrides = BTreeMap::new();
        for (generic, patterns) in &file.allowed_overrides {
            let parsed = patterns
                .iter()
                .map(|p| OverridePattern::parse(generic, p))
                .collect::<Result<Vec<_>, _>>()?;
            overrides.insert(MimeType::from(generic.as_str()), parsed);
        }

        let equal_types = file
            .equal_types
            .iter()
            .map(|group| group.iter().map(|t| MimeType::from(t.as_str())).collect())
            .collect();

        let generic_types = match &file.generic_types {
            Some(types) => types.iter().map(|t| MimeType::from(t.as_str())).collect(),
            None => overrides.keys().cloned().collect(),
        };

        let archive_types = file
            .archive_types
            .iter()
            .map(|t| MimeType::from(t.as_str()))
            .collect();

        let allowed_extensions = AllowedExtensions::compile(&file.allowed_extensions)?;
        if let Some(allowed) = &allowed_extensions {
            tracing::debug!(extensions = ?allowed.extensions(), "allowed file extensions");
        }

        let extra_mimetypes = file
            .extra_mimetypes
            .iter()
            .map(|(ext, mime)| {
                let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
                (ext, MimeType::from(mime.as_str()))
            })
            .collect();

        Ok(Self {
            equal_types,
            overrides,
            generic_types,
            archive_types,
            allowed_extensions,
            extra_mimetypes,
        })
    }

    /// Compile the embedded default policy.
    pub fn embedded() -> Result<Self, PolicyError> {
        Self::compile(&PolicyFile::embedded()?)
    }

    /// Load and compile a policy file.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        Self::compile(&PolicyFile::load(path)?)
    }

    /// Whether `mime` is a member of the generic type set. Absent is never
    /// generic.
    pub fn is_generic(&self, mime: Option<&MimeType>) -> bool {
        mime.is_some_and(|m| self.generic_types.contains(m))
    }

    /// Whether `mime` is a member of the archive type set. Absent is never
    /// an archive.
    pub fn is_archive(&self, mime: Option<&MimeType>) -> bool {
        mime.is_some_and(|m| self.archive_types.contains(m))
    }

    pub fn allowed_extensions(&self) -> Option<&AllowedExtensions> {
        self.allowed_extensions.as_ref()
    }

    /// Extension (lowercase, no dot) to type additions.
    pub fn extra_mimetypes(&self) -> &BTreeMap<String, MimeType> {
        &self.extra_mimetypes
    }

    /// Render the compiled policy back into its document form.
    pub fn to_policy_file(&self) -> PolicyFile {
        PolicyFile {
            extra_mimetypes: self
                .extra_mimetypes
                .iter()
                .map(|(ext, mime)| (format!(".{ext}"), mime.to_string()))
                .collect(),
            allowed_extensions: self
                .allowed_extensions
                .as_ref()
                .map(|a| a.extensions().to_vec())
                .unwrap_or_default(),
            allowed_overrides: self
                .overrides
                .iter()
                .map(|(generic, patterns)| {
                    (
                        generic.to_string(),
                        patterns.iter().map(OverridePattern::as_source).collect(),
                    )
                })
                .collect(),
            equal_types: self
                .equal_types
                .iter()
                .map(|group| group.iter().map(MimeType::to_string).collect())
                .collect(),
            archive_types: self.archive_types.iter().map(MimeType::to_string).collect(),
            generic_types: Some(self.generic_types.iter().map(MimeType::to_string).collect()),
        }
    }
}
