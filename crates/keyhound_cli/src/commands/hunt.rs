//! Hunt command - harvests code search and tracks detected keys.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use console::style;
use keyhound_core::prelude::*;
use keyhound_providers::ProviderRegistry;

use crate::harvest::{CodeSearchClient, Harvester, SearchClient};
use crate::runner::{self, HuntContext, HuntReport};
use crate::storage::JsonStore;
use crate::ui::{self, colors, format_duration, pluralise_word, print_command_header};
use crate::{CONFIG_FILENAME, HuntArgs};

const DEFAULT_STORE_DIR: &str = ".keyhound";

/// Executes the `keyhound hunt` command.
pub fn run(args: &HuntArgs) -> super::Result {
    print_command_header("hunt");

    let config = load_config(args.config.as_deref())?;
    let queries = effective_queries(args, &config);

    if queries.is_empty() {
        ui::print_info("no queries configured - add some to .keyhound.toml or pass them as arguments");
        return Ok(());
    }

    let pipeline = build_pipeline(&config)?;
    let start = Instant::now();

    let report = tokio::runtime::Runtime::new()
        .context("failed to start async runtime")?
        .block_on(execute(args, &config, &queries, &pipeline))?;

    print_report(&report, start.elapsed());

    if report.live_keys > 0 && !args.exit_zero {
        std::process::exit(ui::exit::LIVE_KEYS);
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = path.map_or_else(|| PathBuf::from(CONFIG_FILENAME), Path::to_path_buf);
    Ok(Config::load(&path)?)
}

fn effective_queries(args: &HuntArgs, config: &Config) -> Vec<String> {
    if args.queries.is_empty() {
        config.queries.clone()
    } else {
        args.queries.clone()
    }
}

fn build_pipeline(config: &Config) -> anyhow::Result<ClassificationPipeline> {
    let rules = config.compile_rules()?;
    Ok(ClassificationPipeline::new(RuleLibrary::new(rules)))
}

async fn execute(
    args: &HuntArgs,
    config: &Config,
    queries: &[String],
    pipeline: &ClassificationPipeline,
) -> anyhow::Result<HuntReport> {
    let harvester = build_harvester(args, config)?;
    let ctx = build_context(args, config)?;
    let minimum_confidence = args.minimum_confidence.unwrap_or(config.minimum_confidence);

    runner::run_hunt(queries, &harvester, pipeline, minimum_confidence, config.workers, &ctx).await
}

fn build_harvester(args: &HuntArgs, config: &Config) -> anyhow::Result<Harvester> {
    let token = Config::github_token();
    if token.is_none() {
        ui::print_warning(&format!(
            "{} is not set; unauthenticated search is heavily rate-limited",
            keyhound_core::config::TOKEN_ENV
        ));
    }

    let client = CodeSearchClient::new(Duration::from_secs(config.search_timeout_secs), token)?;
    let max_pages = args.max_pages.unwrap_or(config.max_pages);

    Ok(Harvester::new(
        Arc::new(client) as Arc<dyn SearchClient>,
        max_pages,
        config.per_page,
        Duration::from_millis(config.page_delay_ms),
    ))
}

fn build_context(args: &HuntArgs, config: &Config) -> anyhow::Result<HuntContext> {
    let registry = if args.verify {
        let timeout = Duration::from_secs(config.verify_timeout_secs);
        Some(Arc::new(ProviderRegistry::with_verification_timeout(timeout)?))
    } else {
        None
    };

    if args.dry_run {
        let store = Arc::new(MemoryStore::new());
        return Ok(HuntContext {
            store: Arc::clone(&store) as Arc<dyn MetadataStore>,
            vault: store as Arc<dyn SecretVault>,
            registry,
        });
    }

    let dir = args
        .store
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));
    let store = Arc::new(JsonStore::open(&dir)?);

    Ok(HuntContext {
        store: Arc::clone(&store) as Arc<dyn MetadataStore>,
        vault: store as Arc<dyn SecretVault>,
        registry,
    })
}

fn print_report(report: &HuntReport, elapsed: Duration) {
    println!();
    println!(
        "{} {} {} across {} {} {}",
        colors::success().apply_to(ui::indicators::SUCCESS),
        colors::emphasis().apply_to(report.candidates),
        colors::muted().apply_to(pluralise_word(report.candidates, "candidate", "candidates")),
        colors::emphasis().apply_to(report.pages_fetched),
        colors::muted().apply_to(pluralise_word(report.pages_fetched, "page", "pages")),
        colors::muted().apply_to(format!("({})", format_duration(elapsed)))
    );

    if report.new_keys > 0 {
        println!(
            "{} {} new {}",
            colors::success().apply_to(ui::indicators::ADDED),
            colors::emphasis().apply_to(report.new_keys),
            colors::muted().apply_to(pluralise_word(report.new_keys, "key", "keys"))
        );
    }

    if report.live_keys > 0 {
        println!(
            "{} {} {} {}",
            colors::error().apply_to(ui::indicators::ERROR),
            colors::error().apply_to(report.live_keys),
            style("LIVE").red().bold(),
            colors::muted().apply_to(pluralise_word(report.live_keys, "key", "keys"))
        );
    }

    if report.abandoned_queries > 0 {
        println!(
            "{} {} {} abandoned after rate limiting",
            colors::warning().apply_to(ui::indicators::WARNING),
            colors::emphasis().apply_to(report.abandoned_queries),
            colors::muted().apply_to(pluralise_word(report.abandoned_queries, "query", "queries"))
        );
    }

    if report.verify_failures > 0 {
        println!(
            "{} {} verification {} failed",
            colors::warning().apply_to(ui::indicators::WARNING),
            colors::emphasis().apply_to(report.verify_failures),
            colors::muted().apply_to(pluralise_word(report.verify_failures, "attempt", "attempts"))
        );
    }

    if report.store_failures > 0 {
        println!(
            "{} {} store {} failed; affected keys were not persisted",
            colors::warning().apply_to(ui::indicators::WARNING),
            colors::emphasis().apply_to(report.store_failures),
            colors::muted().apply_to(pluralise_word(report.store_failures, "write", "writes"))
        );
    }

    println!();
}
