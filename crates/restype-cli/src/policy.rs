//! # Policy Subcommand
//!
//! Prints the effective type policy after loading and compiling, so the
//! result of defaults (such as `generic_types`) is visible.

use anyhow::{Context, Result};
use clap::Args;

use restype_core::ResourceTypeValidator;

/// Arguments for the `restype policy` subcommand.
#[derive(Args, Debug)]
pub struct PolicyShowArgs {
    /// Print YAML instead of JSON.
    #[arg(long)]
    pub yaml: bool,
}

/// Render the validator's policy.
pub fn render_policy(args: &PolicyShowArgs, validator: &ResourceTypeValidator) -> Result<String> {
    let document = validator.policy().to_policy_file();
    if args.yaml {
        serde_yaml::to_string(&document).context("failed to serialize policy as YAML")
    } else {
        serde_json::to_string_pretty(&document).context("failed to serialize policy as JSON")
    }
}

/// Execute the policy subcommand.
pub fn run_policy(args: &PolicyShowArgs, validator: &ResourceTypeValidator) -> Result<u8> {
    println!("{}", render_policy(args, validator)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use restype_core::{PolicyFile, ValidatorSettings};

    fn validator() -> ResourceTypeValidator {
        crate::build_validator(&ValidatorSettings::default()).unwrap()
    }

    #[test]
    fn json_output_parses_back() {
        let rendered = render_policy(&PolicyShowArgs { yaml: false }, &validator()).unwrap();
        let parsed: PolicyFile = serde_json::from_str(&rendered).unwrap();
        assert!(parsed.archive_types.contains(&"application/zip".to_string()));
        assert!(parsed.generic_types.is_some());
    }

    #[test]
    fn yaml_output_parses_back() {
        let rendered = render_policy(&PolicyShowArgs { yaml: true }, &validator()).unwrap();
        let parsed: PolicyFile = serde_yaml::from_str(&rendered).unwrap();
        assert!(parsed.allowed_extensions.contains(&"csv".to_string()));
    }
}
