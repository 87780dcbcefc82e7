//! # Resource Type Validation
//!
//! Decides whether a resource's filename, declared format, claimed MIME
//! type and (for uploads) sniffed content agree, and records the resolved
//! type on the resource.
//!
//! ## Branches
//!
//! The record is classified once into a [`ResourceSource`]:
//!
//! - **Uploaded**: an upload with a filename is present. Its stream is
//!   sniffed (first [`SNIFF_PREFIX_LEN`] bytes, the whole stream for
//!   ambiguous compound documents) and always rewound to byte 0.
//! - **Remote link**: no upload and the URL is scheme-qualified and not one
//!   of our own download URLs. Not under our control; skipped.
//! - **Stored**: no upload, URL is a bare name or one of our own download
//!   URLs. Filename and format are re-checked; there is no sniffed type.
//!
//! ## Security Invariant
//!
//! `record.mimetype` is written only after every check, including the
//! allow-list, has passed. A rejected resource keeps whatever value the
//! caller put there.

use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PolicyError, TypeConflict, TypeRejection, ValidationError};
use crate::messages::RejectionMessages;
use crate::mime::{display_or_unknown, MimeType, COMPOUND_DOCUMENT};
use crate::policy::TypePolicy;
use crate::resolver::{ExtensionResolver, TypeResolver};
use crate::settings::{AllowList, ValidatorSettings};
use crate::sniff::{ContentSniffer, Sniffed, SNIFF_PREFIX_LEN};

static REMOTE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z+]+://").expect("valid remote URL regex"));

/// An uploaded file: its client-side name and a seekable byte stream.
#[derive(Debug)]
pub struct Upload<R> {
    pub filename: String,
    pub stream: R,
}

impl<R> Upload<R> {
    pub fn new(filename: impl Into<String>, stream: R) -> Self {
        Self {
            filename: filename.into(),
            stream,
        }
    }
}

/// Resource metadata as submitted by the caller.
#[derive(Debug)]
pub struct ResourceRecord<R> {
    /// Only used in log lines.
    pub id: Option<String>,
    pub url: Option<String>,
    pub format: Option<String>,
    pub mimetype: Option<String>,
    pub upload: Option<Upload<R>>,
}

impl<R> Default for ResourceRecord<R> {
    fn default() -> Self {
        Self {
            id: None,
            url: None,
            format: None,
            mimetype: None,
            upload: None,
        }
    }
}

/// A record with no upload stream.
pub type StoredRecord = ResourceRecord<std::io::Cursor<Vec<u8>>>;

impl<R> ResourceRecord<R> {
    /// A record carrying an upload.
    pub fn with_upload(
        url: impl Into<String>,
        format: impl Into<String>,
        upload: Upload<R>,
    ) -> Self {
        Self {
            url: Some(url.into()),
            format: Some(format.into()),
            upload: Some(upload),
            ..Self::default()
        }
    }

    /// A record without an upload, as re-submitted on update.
    pub fn stored(url: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            format: Some(format.into()),
            ..Self::default()
        }
    }
}

/// Successful validation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The resolved type, also written to `record.mimetype`.
    Resolved(MimeType),
    /// Remote link resource; the record was not inspected or changed.
    SkippedRemoteLink,
}

impl ValidationOutcome {
    pub fn resolved(&self) -> Option<&MimeType> {
        match self {
            Self::Resolved(mime) => Some(mime),
            Self::SkippedRemoteLink => None,
        }
    }
}

/// Where a record's evidence comes from.
enum ResourceSource<'a, R> {
    Uploaded(&'a mut Upload<R>),
    RemoteLink(Option<&'a str>),
    Stored(String),
}

/// Type reconciliation engine bound to one policy.
///
/// Immutable after construction and `Send + Sync`; share one instance
/// across requests.
pub struct ResourceTypeValidator {
    policy: Arc<TypePolicy>,
    resolver: Arc<dyn TypeResolver>,
    sniffer: Arc<dyn ContentSniffer>,
    messages: RejectionMessages,
    allowed_mimetypes: AllowList,
    internal_url_prefixes: Vec<String>,
}

impl std::fmt::Debug for ResourceTypeValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceTypeValidator")
            .field("policy", &self.policy)
            .field("allowed_mimetypes", &self.allowed_mimetypes)
            .field("internal_url_prefixes", &self.internal_url_prefixes)
            .finish_non_exhaustive()
    }
}

impl ResourceTypeValidator {
    /// Build a validator over a compiled policy. The resolver is the
    /// built-in extension table overlaid with the policy's extras.
    pub fn new(
        policy: Arc<TypePolicy>,
        sniffer: Arc<dyn ContentSniffer>,
        settings: &ValidatorSettings,
    ) -> Self {
        let resolver = Arc::new(ExtensionResolver::for_policy(&policy));
        Self {
            policy,
            resolver,
            sniffer,
            messages: RejectionMessages::new(settings.support_contact()),
            allowed_mimetypes: settings.allowed_mimetypes.clone(),
            internal_url_prefixes: settings.internal_url_prefixes.clone(),
        }
    }

    /// Load the configured policy file (or the embedded policy) and build a
    /// validator.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError` if the policy cannot be read or compiled.
    pub fn from_settings(
        settings: &ValidatorSettings,
        sniffer: Arc<dyn ContentSniffer>,
    ) -> Result<Self, PolicyError> {
        let policy = match &settings.types_file {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading type policy");
                TypePolicy::load(path)?
            }
            None => TypePolicy::embedded()?,
        };
        Ok(Self::new(Arc::new(policy), sniffer, settings))
    }

    /// Replace the extension resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn TypeResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn policy(&self) -> &TypePolicy {
        &self.policy
    }

    pub fn messages(&self) -> &RejectionMessages {
        &self.messages
    }

    pub fn allowed_mimetypes(&self) -> &AllowList {
        &self.allowed_mimetypes
    }

    /// [`TypePolicy::resolve_candidate_type`] with the conflict rendered as
    /// a user-facing rejection.
    pub fn resolve_candidate_type(
        &self,
        candidates: &[Option<MimeType>],
        allow_generic_override: bool,
    ) -> Result<MimeType, TypeRejection> {
        self.policy
            .resolve_candidate_type(candidates, allow_generic_override)
            .map_err(|conflict| self.messages.mismatch(conflict))
    }

    pub fn is_mimetype_allowed(&self, mime: &MimeType) -> bool {
        self.policy.is_mimetype_allowed(&self.allowed_mimetypes, mime)
    }

    fn classify<'a, R>(
        &self,
        upload: Option<&'a mut Upload<R>>,
        url: Option<&'a str>,
    ) -> ResourceSource<'a, R> {
        if let Some(upload) = upload.filter(|u| !u.filename.is_empty()) {
            return ResourceSource::Uploaded(upload);
        }
        let Some(url) = url else {
            return ResourceSource::RemoteLink(None);
        };
        if self.internal_url_prefixes.iter().any(|p| url.starts_with(p.as_str())) {
            return ResourceSource::Stored(last_path_segment(url).to_string());
        }
        if REMOTE_URL.is_match(url) {
            ResourceSource::RemoteLink(Some(url))
        } else {
            ResourceSource::Stored(url.to_string())
        }
    }

    fn sniff_upload<R: Read + Seek>(&self, stream: &mut R) -> std::io::Result<Option<MimeType>> {
        let prefix = read_then_rewind(stream, Some(SNIFF_PREFIX_LEN))?;
        let sniffed = match self.sniffer.sniff(&prefix) {
            Sniffed::Type(mime) => Some(mime),
            Sniffed::Indeterminate => None,
            Sniffed::AmbiguousCompound => {
                // The prefix was the whole file if it came up short.
                let full = if prefix.len() < SNIFF_PREFIX_LEN {
                    prefix
                } else {
                    read_then_rewind(stream, None)?
                };
                tracing::debug!(bytes = full.len(), "re-sniffing compound document");
                match self.sniffer.sniff(&full) {
                    Sniffed::Type(mime) => Some(mime),
                    Sniffed::AmbiguousCompound => Some(MimeType::from(COMPOUND_DOCUMENT)),
                    Sniffed::Indeterminate => None,
                }
            }
        };
        Ok(sniffed)
    }

    /// Validate a resource and record its resolved MIME type.
    ///
    /// # Errors
    ///
    /// - `ValidationError::Rejected` with an "unsupported" rejection if the
    ///   filename's extension is not allowed or the resolved type is not on
    ///   the allow-list.
    /// - `ValidationError::Rejected` with a "mismatched" rejection if two
    ///   type signals conflict.
    /// - `ValidationError::Stream` if the upload cannot be read or rewound.
    pub fn validate<R: Read + Seek>(
        &self,
        record: &mut ResourceRecord<R>,
    ) -> Result<ValidationOutcome, ValidationError> {
        let ResourceRecord {
            id,
            url,
            format,
            mimetype,
            upload,
        } = record;
        let label = id.as_deref().unwrap_or("new resource");

        let (filename, sniffed_type) = match self.classify(upload.as_mut(), url.as_deref()) {
            ResourceSource::Uploaded(upload) => {
                let sniffed = self.sniff_upload(&mut upload.stream)?;
                tracing::debug!(
                    resource = label,
                    sniffed = display_or_unknown(sniffed.as_ref()),
                    "upload sniffing indicates MIME type"
                );
                (upload.filename.clone(), sniffed)
            }
            ResourceSource::RemoteLink(link) => {
                tracing::debug!(
                    resource = label,
                    url = link.unwrap_or("<none>"),
                    "not an uploaded resource, skipping validation"
                );
                return Ok(ValidationOutcome::SkippedRemoteLink);
            }
            ResourceSource::Stored(filename) => {
                tracing::debug!(
                    resource = label,
                    "no upload in progress, sanity-checking metadata"
                );
                (filename, None)
            }
        };

        if let Some(allowed) = self.policy.allowed_extensions() {
            if !allowed.matches(&filename) {
                tracing::debug!(resource = label, filename = %filename, "extension not allowed");
                return Err(self.messages.unsupported().into());
            }
        }

        let claimed_type = mimetype.as_deref().and_then(MimeType::non_empty);
        let filename_type = self.resolver.guess_type(&filename);
        let format_type = self
            .resolver
            .guess_format_type(format.as_deref().unwrap_or(""));
        tracing::debug!(
            resource = label,
            claimed = display_or_unknown(claimed_type.as_ref()),
            filename = display_or_unknown(filename_type.as_ref()),
            format = display_or_unknown(format_type.as_ref()),
            "declared MIME types"
        );

        let policy = &self.policy;
        let is_archive_upload =
            policy.is_archive(filename_type.as_ref()) || policy.is_archive(sniffed_type.as_ref());
        let (resolved, best_guess) = if is_archive_upload {
            let outcome = policy.override_permitted(filename_type.as_ref(), sniffed_type.as_ref());
            if !outcome.permitted {
                tracing::debug!(resource = label, "archive extension and content disagree");
                let conflict = TypeConflict::new(filename_type, sniffed_type);
                return Err(self.messages.mismatch(conflict).into());
            }
            // A well-formed archive may declare any format.
            let declared = format_type
                .clone()
                .or_else(|| claimed_type.clone())
                .or_else(|| filename_type.clone());
            let best_guess = format_type.or(filename_type).or(claimed_type);
            (
                declared.unwrap_or_else(MimeType::octet_stream),
                best_guess.unwrap_or_else(MimeType::octet_stream),
            )
        } else {
            // Sniffing may not refine a generic extension declared with
            // a generic format.
            let allow_generic_override = !(policy.is_generic(filename_type.as_ref())
                && policy.is_generic(format_type.as_ref()))
                || policy.is_archive(filename_type.as_ref());
            let candidates = [
                filename_type.clone(),
                format_type.clone(),
                sniffed_type.clone(),
                claimed_type.clone(),
            ];
            let resolved = policy
                .resolve_candidate_type(&candidates, allow_generic_override)
                .map_err(|conflict| {
                    tracing::debug!(
                        resource = label,
                        url = url.as_deref().unwrap_or("<none>"),
                        filename = display_or_unknown(filename_type.as_ref()),
                        format = display_or_unknown(format_type.as_ref()),
                        sniffed = display_or_unknown(sniffed_type.as_ref()),
                        claimed = display_or_unknown(claimed_type.as_ref()),
                        "best guess at MIME type failed"
                    );
                    self.messages.mismatch(conflict)
                })?;
            (resolved.clone(), resolved)
        };

        tracing::debug!(resource = label, best_guess = %best_guess, "best guess at MIME type");
        if !self.is_mimetype_allowed(&best_guess) {
            return Err(self.messages.unsupported().into());
        }

        *mimetype = Some(resolved.to_string());
        Ok(ValidationOutcome::Resolved(resolved))
    }
}

/// Read from the start of `stream` (up to `limit` bytes), then seek back to
/// the start whether or not the read succeeded.
fn read_then_rewind<R: Read + Seek>(
    stream: &mut R,
    limit: Option<usize>,
) -> std::io::Result<Vec<u8>> {
    stream.seek(SeekFrom::Start(0))?;
    let mut buf = Vec::new();
    let read = match limit {
        Some(limit) => stream.by_ref().take(limit as u64).read_to_end(&mut buf),
        None => stream.read_to_end(&mut buf),
    };
    let rewound = stream.seek(SeekFrom::Start(0));
    read?;
    rewound?;
    Ok(buf)
}

fn last_path_segment(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}
