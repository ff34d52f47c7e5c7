//! # Commands
//!
//! - `keyhound hunt` - Search public code for leaked keys and track them
//! - `keyhound verify` - Check a single key against its provider's API
//! - `keyhound rules` - List detection rules
//! - `keyhound init` - Create configuration file

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod commands;
mod harvest;
mod runner;
mod storage;
mod ui;

use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use console::style;
pub use keyhound_core::CONFIG_FILENAME;
use keyhound_core::prelude::*;

use crate::ui::colors;

fn parse_confidence(s: &str) -> Result<Confidence, String> {
    match s.to_lowercase().as_str() {
        "low" => Ok(Confidence::Low),
        "medium" => Ok(Confidence::Medium),
        "high" => Ok(Confidence::High),
        _ => Err(format!(
            "invalid confidence tier '{s}' (expected 'low', 'medium', or 'high')"
        )),
    }
}

const REPO_URL: &str = "https://github.com/keyhound/keyhound";

#[derive(Debug, Parser)]
#[command(
    name = "keyhound",
    version,
    styles = ui::clap_styles(),
    arg_required_else_help = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(visible_alias = "h")]
    Hunt(HuntArgs),

    #[command(visible_alias = "v")]
    Verify(VerifyArgs),

    #[command(visible_alias = "r")]
    Rules(RulesArgs),

    Init(InitArgs),
}

/// Arguments for the `keyhound hunt` command.
#[derive(Debug, Parser)]
pub struct HuntArgs {
    /// Code-search queries. Overrides the queries in `.keyhound.toml`.
    pub queries: Vec<String>,

    /// Path to `.keyhound.toml` configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verify detected keys against provider APIs.
    #[arg(long)]
    pub verify: bool,

    /// Maximum result pages to fetch per query.
    #[arg(long, value_name = "N")]
    pub max_pages: Option<u32>,

    /// Directory for the key store. Defaults to `.keyhound/`.
    #[arg(short, long, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Keep results in memory only; nothing is written to disk.
    #[arg(long)]
    pub dry_run: bool,

    /// Minimum confidence tier to report (low, medium, or high).
    #[arg(long, value_parser = parse_confidence)]
    pub minimum_confidence: Option<Confidence>,

    /// Always exit with code 0, even when live keys are found.
    #[arg(long)]
    pub exit_zero: bool,
}

/// Arguments for the `keyhound verify` command.
#[derive(Debug, Parser)]
pub struct VerifyArgs {
    /// Provider identifier (e.g. `anthropic`, `openai`).
    pub provider: String,

    /// The raw key to check. Reads from stdin when omitted.
    pub secret: Option<String>,

    /// Timeout for the verification request, in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

/// Arguments for the `keyhound rules` command.
#[derive(Debug, Parser)]
pub struct RulesArgs {
    /// Filter rules by provider identifier.
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Filter rules by confidence tier (low, medium, or high).
    #[arg(short, long, value_parser = parse_confidence)]
    pub tier: Option<Confidence>,

    /// Show rule details including regex and context keywords.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Arguments for the `keyhound init` command.
#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(short, long)]
    pub force: bool,

    /// Write the config file to a custom path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn main() {
    #[cfg(feature = "tracing")]
    {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).without_time())
            .with(EnvFilter::from_default_env())
            .init();
    }

    let cli = parse_cli();

    if let Err(e) = run(cli.command) {
        ui::print_error(&format!("{e:#}"));
        std::process::exit(ui::exit::ERROR);
    }
}

fn parse_cli() -> Cli {
    let cmd = Cli::command().about(build_about()).after_help(build_after_help());

    let matches = cmd.get_matches();

    #[expect(clippy::expect_used, reason = "clap already validated args; this cannot fail")]
    Cli::from_arg_matches(&matches).expect("failed to parse arguments")
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Hunt(args) => commands::hunt::run(&args),
        Command::Verify(args) => commands::verify::run(&args),
        Command::Rules(args) => commands::rules::run(args.provider.as_deref(), args.tier, args.verbose),
        Command::Init(args) => commands::init::run(args.force, args.output),
    }
}

fn build_about() -> String {
    format!(
        r"
  {} hunts public code search for leaked AI-provider API keys,
  verifies whether they are still live, and tracks each key's
  status over time so rotation actually happens.",
        colors::accent().apply_to("keyhound").bold()
    )
}

fn build_after_help() -> String {
    format!(
        r"
  {}
    keyhound hunt                        Run the queries in .keyhound.toml
    keyhound hunt 'sk-ant-api03-'        Hunt a single query
    keyhound hunt --verify               Also check keys against provider APIs
    keyhound verify anthropic KEY        Check one key by hand
    keyhound rules --verbose             Show rule regexes and keywords
    keyhound init                        Create config file

  Learn more: {}",
        style("Examples:").bold(),
        colors::accent().apply_to(REPO_URL).underlined()
    )
}
