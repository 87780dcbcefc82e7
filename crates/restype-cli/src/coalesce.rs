//! # Coalesce Subcommand
//!
//! Runs candidate coalescing directly on types given on the command line.
//! `-` stands for an absent candidate.

use anyhow::Result;
use clap::Args;

use restype_core::{MimeType, ResourceTypeValidator};

/// Arguments for the `restype coalesce` subcommand.
#[derive(Args, Debug)]
pub struct CoalesceArgs {
    /// Disallow refining generic types.
    #[arg(long)]
    pub no_override: bool,

    /// Candidate types in order; `-` is an absent candidate.
    #[arg(value_name = "TYPE", allow_hyphen_values = true)]
    pub candidates: Vec<String>,
}

/// Parse a command-line candidate.
pub fn parse_candidate(raw: &str) -> Option<MimeType> {
    if raw.trim() == "-" {
        None
    } else {
        MimeType::non_empty(raw)
    }
}

/// Execute the coalesce subcommand.
pub fn run_coalesce(args: &CoalesceArgs, validator: &ResourceTypeValidator) -> Result<u8> {
    let candidates: Vec<Option<MimeType>> =
        args.candidates.iter().map(|c| parse_candidate(c)).collect();

    match validator.resolve_candidate_type(&candidates, !args.no_override) {
        Ok(mime) => {
            println!("{mime}");
            Ok(0)
        }
        Err(rejection) => Ok(crate::report_rejection(&args.candidates.join(" "), &rejection)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restype_core::ValidatorSettings;

    fn run(candidates: &[&str], no_override: bool) -> u8 {
        let validator = crate::build_validator(&ValidatorSettings::default()).unwrap();
        let args = CoalesceArgs {
            no_override,
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        };
        run_coalesce(&args, &validator).unwrap()
    }

    #[test]
    fn dash_is_absent() {
        assert_eq!(parse_candidate("-"), None);
        assert_eq!(parse_candidate(""), None);
        assert_eq!(parse_candidate("text/csv"), Some(MimeType::from("text/csv")));
    }

    #[test]
    fn refinement_depends_on_override_flag() {
        assert_eq!(run(&["text/plain", "-", "text/csv"], false), 0);
        assert_eq!(run(&["text/plain", "-", "text/csv"], true), 1);
    }

    #[test]
    fn no_candidates_resolve() {
        assert_eq!(run(&[], false), 0);
        assert_eq!(run(&["-", "-"], true), 0);
    }
}
