//! Rejection message templates.
//!
//! Templates are fixed apart from the support contact, which is validated at
//! configuration time, so rendering cannot fail at request time.

use crate::error::{RejectionKind, TypeConflict, TypeRejection, UPLOAD_FIELD};
use crate::mime::display_or_unknown;

/// Collapse every run of whitespace to a single space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rendered rejection messages for one support contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionMessages {
    unsupported: String,
    mismatch_prefix: String,
    mismatch_suffix: String,
}

impl RejectionMessages {
    pub fn new(support_contact: &str) -> Self {
        let unsupported = normalize_whitespace(&format!(
            "This file type is not supported.
             If possible, upload the file in another format.
             If you continue to have problems, contact {support_contact}"
        ));
        let mismatch_prefix = normalize_whitespace(
            "Mismatched file type. Please ensure that the selected format is
             compatible with the file extension and file contents.
             Unable to determine whether the file is of type",
        );
        let mismatch_suffix = normalize_whitespace(&format!(
            "If possible, upload the file in another format.
             If you continue to have problems, contact {support_contact}"
        ));
        Self {
            unsupported,
            mismatch_prefix,
            mismatch_suffix,
        }
    }

    /// Message for an unsupported extension or a disallowed final type.
    pub fn unsupported_message(&self) -> &str {
        &self.unsupported
    }

    /// Message naming the two conflicting types.
    pub fn mismatch_message(&self, conflict: &TypeConflict) -> String {
        format!(
            "{} '{}' or '{}'. {}",
            self.mismatch_prefix,
            display_or_unknown(conflict.first.as_ref()),
            display_or_unknown(conflict.second.as_ref()),
            self.mismatch_suffix
        )
    }

    pub fn unsupported(&self) -> TypeRejection {
        TypeRejection {
            field: UPLOAD_FIELD,
            kind: RejectionKind::UnsupportedType,
            message: self.unsupported.clone(),
        }
    }

    pub fn mismatch(&self, conflict: TypeConflict) -> TypeRejection {
        TypeRejection {
            field: UPLOAD_FIELD,
            message: self.mismatch_message(&conflict),
            kind: RejectionKind::MismatchedType(conflict),
        }
    }
}
