//! # restype-core — Resource Type Reconciliation
//!
//! Decides what MIME type an uploaded (or previously stored) resource really
//! has, given several independent and possibly dishonest signals: the
//! filename extension, the user-selected format label, the client-claimed
//! type and the type sniffed from the file's bytes. Disagreement that the
//! policy cannot reconcile is a rejection, which is what stops content-type
//! spoofing.
//!
//! ## Key Design Principles
//!
//! 1. **Policy is data.** Equivalence groups, override patterns, generic and
//!    archive types, and the extension filter come from a JSON or YAML
//!    [`PolicyFile`], compiled once into an immutable [`TypePolicy`].
//!
//! 2. **Absent is not a type.** A missing signal is `None` and never matches
//!    anything but another missing signal. It cannot confirm or refine.
//!
//! 3. **Sniffing is pluggable.** The engine depends on the
//!    [`ContentSniffer`] trait only; `restype-sniff` provides the magic-byte
//!    implementation.
//!
//! 4. **Commit last.** [`ResourceTypeValidator::validate`] writes the
//!    resolved type to the record only after every check has passed.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `restype-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests. `expect` only on constant
//!   regex literals.

pub mod error;
pub mod messages;
pub mod mime;
pub mod policy;
pub mod reconcile;
pub mod resolver;
pub mod settings;
pub mod sniff;
pub mod validate;

// Re-export primary types for ergonomic imports.
pub use error::{
    PolicyError, RejectionKind, TypeConflict, TypeRejection, ValidationError, UPLOAD_FIELD,
};
pub use messages::RejectionMessages;
pub use mime::{display_or_unknown, MimeType, COMPOUND_DOCUMENT, OCTET_STREAM};
pub use policy::{AllowedExtensions, OverridePattern, PolicyFile, TypePolicy};
pub use reconcile::OverrideOutcome;
pub use resolver::{extension_of, ExtensionResolver, TypeResolver};
pub use settings::{AllowList, ValidatorSettings};
pub use sniff::{ContentSniffer, Sniffed, SNIFF_PREFIX_LEN};
pub use validate::{
    ResourceRecord, ResourceTypeValidator, StoredRecord, Upload, ValidationOutcome,
};
