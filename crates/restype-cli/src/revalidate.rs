//! # Revalidate Subcommand
//!
//! Re-checks stored resource metadata with no file content: the URL's
//! extension, format and claimed type must agree. Remote links are
//! reported and left alone.

use anyhow::Result;
use clap::Args;

use restype_core::{ResourceTypeValidator, StoredRecord, ValidationError, ValidationOutcome};

/// Arguments for the `restype revalidate` subcommand.
#[derive(Args, Debug)]
pub struct RevalidateArgs {
    /// Resource URL or stored filename.
    #[arg(long)]
    pub url: String,

    /// Declared format label.
    #[arg(long)]
    pub format: Option<String>,

    /// Previously recorded MIME type.
    #[arg(long)]
    pub mimetype: Option<String>,
}

/// Execute the revalidate subcommand.
pub fn run_revalidate(args: &RevalidateArgs, validator: &ResourceTypeValidator) -> Result<u8> {
    let mut record = StoredRecord {
        url: Some(args.url.clone()),
        format: args.format.clone(),
        mimetype: args.mimetype.clone(),
        ..StoredRecord::default()
    };

    match validator.validate(&mut record) {
        Ok(ValidationOutcome::Resolved(mime)) => {
            println!("{}: {mime}", args.url);
            Ok(0)
        }
        Ok(ValidationOutcome::SkippedRemoteLink) => {
            println!("{}: remote link, not validated", args.url);
            Ok(0)
        }
        Err(ValidationError::Rejected(rejection)) => {
            Ok(crate::report_rejection(&args.url, &rejection))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restype_core::ValidatorSettings;

    fn run(url: &str, format: &str) -> u8 {
        let validator = crate::build_validator(&ValidatorSettings::default()).unwrap();
        let args = RevalidateArgs {
            url: url.to_string(),
            format: Some(format.to_string()),
            mimetype: None,
        };
        run_revalidate(&args, &validator).unwrap()
    }

    #[test]
    fn consistent_metadata_passes() {
        assert_eq!(run("example.csv", "CSV"), 0);
    }

    #[test]
    fn inconsistent_metadata_is_rejected() {
        assert_eq!(run("example.csv", "PDF"), 1);
    }

    #[test]
    fn remote_links_are_skipped() {
        assert_eq!(run("http://example.com/foo.csv", "PDF"), 0);
    }
}
