//! # Validator Settings
//!
//! Environment-level configuration, read once at startup:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `RESTYPE_TYPES_FILE` | JSON or YAML policy file | embedded policy |
//! | `RESTYPE_SUPPORT_CONTACT` | contact appended to rejection messages | `the site owner.` |
//! | `RESTYPE_MIMETYPES_ALLOWED` | comma-separated final-type allow-list | `*` |
//! | `RESTYPE_INTERNAL_URL_PREFIXES` | comma-separated prefixes of our own download URLs | none |

use std::path::PathBuf;

use crate::mime::MimeType;

/// Contact used when none is configured.
pub const DEFAULT_SUPPORT_CONTACT: &str = "the site owner.";

pub const ENV_TYPES_FILE: &str = "RESTYPE_TYPES_FILE";
pub const ENV_SUPPORT_CONTACT: &str = "RESTYPE_SUPPORT_CONTACT";
pub const ENV_MIMETYPES_ALLOWED: &str = "RESTYPE_MIMETYPES_ALLOWED";
pub const ENV_INTERNAL_URL_PREFIXES: &str = "RESTYPE_INTERNAL_URL_PREFIXES";

/// Final-type allow-list. `*` admits everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    entries: Vec<MimeType>,
}

impl AllowList {
    /// Parse a comma-separated list. Blank entries are dropped; an empty
    /// result admits everything.
    pub fn parse(raw: &str) -> Self {
        let entries: Vec<MimeType> = raw.split(',').filter_map(MimeType::non_empty).collect();
        if entries.is_empty() {
            Self::any()
        } else {
            Self { entries }
        }
    }

    pub fn any() -> Self {
        Self {
            entries: vec![MimeType::from("*")],
        }
    }

    pub fn entries(&self) -> &[MimeType] {
        &self.entries
    }

    pub fn is_unrestricted(&self) -> bool {
        self.entries.iter().any(|e| e.as_str() == "*")
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::any()
    }
}

/// Startup settings for a [`crate::ResourceTypeValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorSettings {
    /// Policy file; `None` selects the embedded policy.
    pub types_file: Option<PathBuf>,
    support_contact: String,
    pub allowed_mimetypes: AllowList,
    /// URL prefixes served by this system. Such URLs are re-validated like
    /// stored uploads instead of being skipped as remote links.
    pub internal_url_prefixes: Vec<String>,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            types_file: None,
            support_contact: DEFAULT_SUPPORT_CONTACT.to_string(),
            allowed_mimetypes: AllowList::any(),
            internal_url_prefixes: Vec::new(),
        }
    }
}

impl ValidatorSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let types_file = lookup(ENV_TYPES_FILE)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let allowed_mimetypes = lookup(ENV_MIMETYPES_ALLOWED)
            .map(|raw| AllowList::parse(&raw))
            .unwrap_or_default();
        let internal_url_prefixes = lookup(ENV_INTERNAL_URL_PREFIXES)
            .map(|raw| split_list(&raw))
            .unwrap_or_default();

        Self {
            types_file,
            allowed_mimetypes,
            internal_url_prefixes,
            ..Self::default()
        }
        .with_support_contact(lookup(ENV_SUPPORT_CONTACT).as_deref().unwrap_or(""))
    }

    /// Set the support contact. Blank input keeps the default.
    pub fn with_support_contact(mut self, contact: &str) -> Self {
        let contact = contact.trim();
        self.support_contact = if contact.is_empty() {
            DEFAULT_SUPPORT_CONTACT.to_string()
        } else {
            contact.to_string()
        };
        self
    }

    pub fn support_contact(&self) -> &str {
        &self.support_contact
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
