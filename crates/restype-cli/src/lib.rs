//! # restype-cli — Command-Line Interface
//!
//! Provides the `restype` command for exercising the type reconciliation
//! engine outside a host application.
//!
//! ## Subcommands
//!
//! - `restype check` — validate a local file as an upload.
//! - `restype revalidate` — re-check stored metadata without content.
//! - `restype coalesce` — resolve a list of candidate types directly.
//! - `restype policy` — print the effective policy.
//!
//! ```bash
//! restype check data/report.csv --format CSV
//! restype revalidate --url example.csv --format PDF
//! restype coalesce text/plain - text/csv
//! restype --policy types.yaml policy --yaml
//! ```
//!
//! Exit codes: 0 on success, 1 on rejection, 2 on operational error.

pub mod check;
pub mod coalesce;
pub mod policy;
pub mod revalidate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use restype_core::{AllowList, ResourceTypeValidator, TypeRejection, ValidatorSettings};
use restype_sniff::MagicSniffer;

/// Exit code for a rejected resource.
pub const EXIT_REJECTED: u8 = 1;

/// Policy and message settings shared by every subcommand. Each flag
/// overrides its environment variable.
#[derive(Args, Debug, Default, Clone)]
pub struct PolicyArgs {
    /// Policy file, JSON or YAML (overrides RESTYPE_TYPES_FILE).
    #[arg(long, global = true, value_name = "PATH")]
    pub policy: Option<PathBuf>,

    /// Support contact for rejection messages (overrides RESTYPE_SUPPORT_CONTACT).
    #[arg(long, global = true, value_name = "TEXT")]
    pub contact: Option<String>,

    /// Comma-separated allow-list of final types (overrides RESTYPE_MIMETYPES_ALLOWED).
    #[arg(long, global = true, value_name = "LIST")]
    pub allowed: Option<String>,
}

impl PolicyArgs {
    /// Apply the flags on top of `base`.
    pub fn apply(&self, base: ValidatorSettings) -> ValidatorSettings {
        let mut settings = match &self.contact {
            Some(contact) => base.with_support_contact(contact),
            None => base,
        };
        if let Some(path) = &self.policy {
            settings.types_file = Some(path.clone());
        }
        if let Some(raw) = &self.allowed {
            settings.allowed_mimetypes = AllowList::parse(raw);
        }
        settings
    }
}

/// Build a validator using the magic-byte sniffer.
pub fn build_validator(settings: &ValidatorSettings) -> Result<ResourceTypeValidator> {
    ResourceTypeValidator::from_settings(settings, Arc::new(MagicSniffer::new()))
        .context("failed to load type policy")
}

/// Print a rejection the way the host application would show it.
pub(crate) fn report_rejection(subject: &str, rejection: &TypeRejection) -> u8 {
    println!("REJECTED: {subject}");
    println!("  {}: {}", rejection.field, rejection.message);
    EXIT_REJECTED
}
