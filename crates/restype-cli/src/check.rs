//! # Check Subcommand
//!
//! Validates a local file as if it were being uploaded: the file's name,
//! the given format and claimed type, and its sniffed content must agree.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use restype_core::{
    ResourceRecord, ResourceTypeValidator, Upload, ValidationError, ValidationOutcome,
};

/// Arguments for the `restype check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// File to validate.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Declared format label (e.g. CSV).
    #[arg(long)]
    pub format: Option<String>,

    /// Client-claimed MIME type.
    #[arg(long)]
    pub mimetype: Option<String>,

    /// Upload filename, if different from the file's own name.
    #[arg(long)]
    pub name: Option<String>,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 when the file resolves, 1 when it is rejected.
pub fn run_check(args: &CheckArgs, validator: &ResourceTypeValidator) -> Result<u8> {
    let file = File::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    let name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let mut record = ResourceRecord {
        url: Some(name.clone()),
        format: args.format.clone(),
        mimetype: args.mimetype.clone(),
        upload: Some(Upload::new(name.clone(), file)),
        ..ResourceRecord::default()
    };

    match validator.validate(&mut record) {
        Ok(ValidationOutcome::Resolved(mime)) => {
            println!("{name}: {mime}");
            Ok(0)
        }
        Ok(ValidationOutcome::SkippedRemoteLink) => {
            println!("{name}: not validated (no upload filename)");
            Ok(0)
        }
        Err(ValidationError::Rejected(rejection)) => Ok(crate::report_rejection(&name, &rejection)),
        Err(e) => Err(e).with_context(|| format!("failed to validate {}", args.file.display())),
    }
}
