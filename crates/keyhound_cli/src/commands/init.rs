//! Init command - creates `.keyhound.toml` configuration file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context as _;
use console::style;

use crate::CONFIG_FILENAME;
use crate::ui::{colors, format_duration, indicators, print_command_header, print_info};

/// Default configuration written by `keyhound init`.
const CONFIG_TEMPLATE: &str = r#"# keyhound configuration
# https://github.com/keyhound/keyhound

# Code-search queries to hunt, in execution order.
# The search token is read from the KEYHOUND_GITHUB_TOKEN environment
# variable, never from this file.
queries = [
    # "sk-ant-api03- in:file",
    # "AIza in:file language:python",
]

# Result pages fetched per query, and results per page.
max_pages = 3
per_page = 50

# Minimum delay between page fetches, in milliseconds.
page_delay_ms = 2000

# Concurrent verification workers.
workers = 4

# Timeouts for search and verification requests, in seconds.
search_timeout_secs = 10
verify_timeout_secs = 10

# Minimum confidence tier to report: "low", "medium", or "high".
minimum_confidence = "low"

# Built-in rule ids to disable.
disabled_rules = [
    # "generic/prefixed-key",
]

# Custom detection rules.
# [[rules]]
# id = "custom/acme-token"
# name = "Acme Token"
# regex = '\bacme_[a-z0-9]{40}\b'
# confidence = "high"
# context_keywords = ["acme"]
"#;

/// Executes the `keyhound init` command, writing a `.keyhound.toml` file.
pub fn run(force: bool, output_path: Option<PathBuf>) -> super::Result {
    print_command_header("init");

    let output_path = output_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

    if output_path.exists() && !force {
        println!(
            "{} {} already exists",
            colors::warning().apply_to(indicators::WARNING),
            style(output_path.display()).bold()
        );
        println!("  {}", colors::secondary().apply_to("pass --force to overwrite"));
        println!();
        return Ok(());
    }

    let start = Instant::now();
    std::fs::write(&output_path, CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    print_results(&output_path, start.elapsed());
    Ok(())
}

fn print_results(config_path: &Path, elapsed: std::time::Duration) {
    println!();
    println!(
        "{} {} {}",
        colors::success().apply_to(indicators::ADDED),
        style(config_path.display()).bold(),
        colors::muted().apply_to(format!("({})", format_duration(elapsed)))
    );

    println!();
    print_info("Add queries to the config, then run `keyhound hunt`");
}
