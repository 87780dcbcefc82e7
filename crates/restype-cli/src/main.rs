//! # restype CLI entry point
//!
//! Parses command-line arguments, builds the validator from the environment
//! plus flag overrides, and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use restype_cli::check::{run_check, CheckArgs};
use restype_cli::coalesce::{run_coalesce, CoalesceArgs};
use restype_cli::policy::{run_policy, PolicyShowArgs};
use restype_cli::revalidate::{run_revalidate, RevalidateArgs};
use restype_cli::{build_validator, PolicyArgs};
use restype_core::ValidatorSettings;

/// Exit code for configuration and I/O failures.
const EXIT_OPERATIONAL: u8 = 2;

/// Resource type reconciliation.
///
/// Checks that a file's name, declared format, claimed MIME type and actual
/// content agree, and reports the resolved type or the rejection a user
/// would see.
#[derive(Parser, Debug)]
#[command(name = "restype", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    policy: PolicyArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a local file as an upload.
    Check(CheckArgs),

    /// Re-check stored metadata (URL, format, claimed type) without content.
    Revalidate(RevalidateArgs),

    /// Resolve candidate types directly (`-` for an absent candidate).
    Coalesce(CoalesceArgs),

    /// Print the effective type policy.
    Policy(PolicyShowArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = cli.policy.apply(ValidatorSettings::from_env());
    tracing::debug!(
        policy = ?settings.types_file,
        allowed = ?settings.allowed_mimetypes.entries(),
        "resolved settings"
    );

    let result = build_validator(&settings).and_then(|validator| match &cli.command {
        Commands::Check(args) => run_check(args, &validator),
        Commands::Revalidate(args) => run_revalidate(args, &validator),
        Commands::Coalesce(args) => run_coalesce(args, &validator),
        Commands::Policy(args) => run_policy(args, &validator),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_OPERATIONAL)
        }
    }
}
