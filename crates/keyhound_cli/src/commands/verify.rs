//! Verify command - checks one key against its provider's API.

use std::io::Read as _;
use std::time::Duration;

use anyhow::Context as _;
use console::style;
use keyhound_providers::{ProviderRegistry, Verdict, VerificationOutcome};

use crate::VerifyArgs;
use crate::ui::{self, colors, print_command_header};

/// Executes the `keyhound verify` command.
pub fn run(args: &VerifyArgs) -> super::Result {
    print_command_header("verify");

    let secret = read_secret(args)?;
    let timeout = Duration::from_secs(args.timeout_secs);
    let registry = ProviderRegistry::with_verification_timeout(timeout)?;

    let outcome = tokio::runtime::Runtime::new()
        .context("failed to start async runtime")?
        .block_on(registry.verify(&args.provider, &secret))?;

    print_outcome(&args.provider, &outcome);

    if outcome.verdict == Verdict::Valid {
        std::process::exit(ui::exit::LIVE_KEYS);
    }

    Ok(())
}

fn read_secret(args: &VerifyArgs) -> anyhow::Result<String> {
    if let Some(secret) = &args.secret {
        return Ok(secret.clone());
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read key from stdin")?;

    let secret = buffer.trim();
    anyhow::ensure!(!secret.is_empty(), "no key provided on stdin");
    Ok(secret.to_string())
}

fn print_outcome(provider: &str, outcome: &VerificationOutcome) {
    let (glyph, label) = match outcome.verdict {
        Verdict::Valid => (colors::error().apply_to(ui::indicators::ERROR), style("LIVE").red().bold()),
        Verdict::Invalid => (
            colors::success().apply_to(ui::indicators::SUCCESS),
            style("invalid").green(),
        ),
        Verdict::Unverifiable => (
            colors::warning().apply_to(ui::indicators::WARNING),
            style("unverifiable").yellow(),
        ),
    };

    println!("{glyph} {} key is {label}", colors::emphasis().apply_to(provider));

    if let Some(detail) = &outcome.detail {
        println!("  {}", colors::muted().apply_to(detail.as_ref()));
    }

    if let Some(transport_error) = &outcome.transport_error {
        println!("  {}", colors::muted().apply_to(transport_error.as_ref()));
    }

    if outcome.verdict == Verdict::Valid {
        println!();
        ui::print_warning("this key is live - rotate it and notify the owner");
    }

    println!();
}
