//! # Type Reconciliation
//!
//! Comparison rules over a compiled [`TypePolicy`]:
//!
//! - [`TypePolicy::types_equivalent`]: exact match or co-membership of an
//!   equivalence group.
//! - [`TypePolicy::override_permitted`]: whether one type may stand in for
//!   a generic one, checked in both directions.
//! - [`TypePolicy::resolve_candidate_type`]: left fold over candidate
//!   signals producing one best type or a [`TypeConflict`].
//! - [`TypePolicy::is_mimetype_allowed`]: the final allow-list gate.
//!
//! ## Absent signals
//!
//! An absent type (`None`) is equivalent only to another absent type. It
//! never matches an override pattern, not even `*`, so a missing signal can
//! neither confirm nor refine a present one.

use crate::error::TypeConflict;
use crate::mime::MimeType;
use crate::policy::{OverridePattern, TypePolicy};
use crate::settings::AllowList;

/// Result of an override check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideOutcome {
    pub permitted: bool,
    /// The more specific side when permitted, otherwise `None`.
    pub specific: Option<MimeType>,
}

impl OverrideOutcome {
    fn permitted(specific: Option<MimeType>) -> Self {
        Self {
            permitted: true,
            specific,
        }
    }

    fn denied() -> Self {
        Self {
            permitted: false,
            specific: None,
        }
    }
}

impl TypePolicy {
    /// Whether `a` and `b` are interchangeable.
    pub fn types_equivalent(&self, a: Option<&MimeType>, b: Option<&MimeType>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a == b
                    || self
                        .equal_types
                        .iter()
                        .any(|group| group.contains(a) && group.contains(b))
            }
            _ => false,
        }
    }

    fn matches_pattern(&self, mime: &MimeType, pattern: &OverridePattern) -> bool {
        match pattern {
            OverridePattern::Any => true,
            OverridePattern::TopLevel(top) => mime.top_level() == top,
            OverridePattern::Exact(exact) => self.types_equivalent(Some(exact), Some(mime)),
        }
    }

    fn matches_override_list(&self, mime: &MimeType, patterns: &[OverridePattern]) -> bool {
        patterns.iter().any(|p| self.matches_pattern(mime, p))
    }

    /// Whether one of `type1`/`type2` is a generic type that the other may
    /// refine, and if so which side is the specific one.
    ///
    /// Equivalent inputs are trivially permitted, returning `type2`.
    pub fn override_permitted(
        &self,
        type1: Option<&MimeType>,
        type2: Option<&MimeType>,
    ) -> OverrideOutcome {
        if self.types_equivalent(type1, type2) {
            return OverrideOutcome::permitted(type2.cloned());
        }
        let (Some(type1), Some(type2)) = (type1, type2) else {
            return OverrideOutcome::denied();
        };

        for (generic, patterns) in &self.overrides {
            if self.types_equivalent(Some(generic), Some(type1))
                && self.matches_override_list(type2, patterns)
            {
                return OverrideOutcome::permitted(Some(type2.clone()));
            }
            if self.types_equivalent(Some(generic), Some(type2))
                && self.matches_override_list(type1, patterns)
            {
                return OverrideOutcome::permitted(Some(type1.clone()));
            }
        }
        OverrideOutcome::denied()
    }

    /// Coalesce candidate types into the best single type.
    ///
    /// Absent candidates are ignored and candidates equivalent to the current
    /// best confirm it. With `allow_generic_override`, a generic best may be
    /// replaced by a more specific candidate (or a specific best may absorb a
    /// generic candidate). Any other disagreement stops the fold with a
    /// [`TypeConflict`]. If every candidate is absent the result is
    /// `application/octet-stream`.
    pub fn resolve_candidate_type(
        &self,
        candidates: &[Option<MimeType>],
        allow_generic_override: bool,
    ) -> Result<MimeType, TypeConflict> {
        let mut best: Option<MimeType> = None;

        for candidate in candidates.iter().flatten() {
            if self.types_equivalent(Some(candidate), best.as_ref()) {
                continue;
            }
            let Some(current) = best.as_ref() else {
                best = Some(candidate.clone());
                continue;
            };
            if allow_generic_override {
                let outcome = self.override_permitted(Some(current), Some(candidate));
                if outcome.permitted {
                    best = outcome.specific;
                    continue;
                }
            }
            return Err(TypeConflict::new(best, Some(candidate.clone())));
        }

        Ok(best.unwrap_or_else(MimeType::octet_stream))
    }

    /// Whether `mime` passes the allow-list: some entry is `*` or equivalent
    /// to it.
    pub fn is_mimetype_allowed(&self, allowed: &AllowList, mime: &MimeType) -> bool {
        allowed.entries().iter().any(|entry| {
            entry.as_str() == "*" || self.types_equivalent(Some(entry), Some(mime))
        })
    }
}
