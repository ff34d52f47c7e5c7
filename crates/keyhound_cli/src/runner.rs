//! Hunt orchestration: harvest, classify, persist, verify.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use keyhound_core::prelude::*;
use keyhound_providers::ProviderRegistry;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
#[cfg(feature = "tracing")]
use tracing::warn;

use crate::harvest::{HarvestError, Harvester};
use crate::ui;

/// Shared state handed to every candidate-processing task.
pub struct HuntContext {
    /// Public-safe metadata destination.
    pub store: Arc<dyn MetadataStore>,
    /// Restricted raw-secret destination.
    pub vault: Arc<dyn SecretVault>,
    /// Verification dispatch, if `--verify` was requested.
    pub registry: Option<Arc<ProviderRegistry>>,
}

/// Aggregated statistics from one hunt run.
#[derive(Debug, Default, Clone, Copy)]
pub struct HuntReport {
    /// Result pages fetched across all queries.
    pub pages_fetched: usize,
    /// Blobs run through the classification pipeline.
    pub blobs_classified: usize,
    /// Candidates surviving context validation and dedup.
    pub candidates: usize,
    /// Keys recorded for the first time this run.
    pub new_keys: usize,
    /// Keys whose most recent check came back valid.
    pub live_keys: usize,
    /// Verification attempts that failed with a configuration error.
    pub verify_failures: usize,
    /// Candidates whose store or vault write failed.
    pub store_failures: usize,
    /// Queries abandoned after persistent rate limiting.
    pub abandoned_queries: usize,
}

/// One mutex per key id, so concurrent tasks never interleave the
/// read-verify-update sequence for the same key.
#[derive(Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<KeyId, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    /// Returns the lock for `key_id`, creating it on first use.
    pub async fn for_key(&self, key_id: &KeyId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(key_id.clone()).or_default())
    }
}

/// Runs the full hunt: every query, every page, every candidate.
///
/// Harvest errors are contained per query - a rate-limited or failing query
/// is logged and abandoned while the remaining queries still run. Store
/// errors are contained per candidate the same way: the failed write is
/// warned and counted in the report while the remaining candidates complete,
/// so a transient backend outage never discards the run's results.
pub async fn run_hunt(
    queries: &[String],
    harvester: &Harvester,
    pipeline: &ClassificationPipeline,
    minimum_confidence: Confidence,
    workers: usize,
    ctx: &HuntContext,
) -> anyhow::Result<HuntReport> {
    let mut report = HuntReport::default();
    let mut candidates = Vec::new();

    for query in queries {
        // Pages fetched before a failure still count; only the rest of the
        // query is abandoned.
        if let Err(e) = harvest_query(query, harvester, pipeline, minimum_confidence, &mut candidates, &mut report).await
        {
            ui::print_warning(&e.to_string());
            #[cfg(feature = "tracing")]
            warn!(query = %query, error = %e, "query abandoned");
            report.abandoned_queries += 1;
        }
    }

    report.candidates = candidates.len();
    process_candidates(candidates, workers, ctx, &mut report).await?;

    Ok(report)
}

async fn harvest_query(
    query: &str,
    harvester: &Harvester,
    pipeline: &ClassificationPipeline,
    minimum_confidence: Confidence,
    candidates: &mut Vec<Candidate>,
    report: &mut HuntReport,
) -> Result<(), HarvestError> {
    let mut session = harvester.session(query);

    while let Some(page) = session.next_page().await? {
        report.pages_fetched += 1;

        for hit in &page.hits {
            let content = hit.content();
            if content.is_empty() {
                continue;
            }

            report.blobs_classified += 1;
            let origin = Origin::new(&hit.repository, &hit.path);

            candidates.extend(
                pipeline
                    .classify(&content, &origin)
                    .into_iter()
                    .filter(|c| c.confidence >= minimum_confidence),
            );
        }
    }

    Ok(())
}

async fn process_candidates(
    candidates: Vec<Candidate>,
    workers: usize,
    ctx: &HuntContext,
    report: &mut HuntReport,
) -> anyhow::Result<()> {
    if candidates.is_empty() {
        return Ok(());
    }

    let locks = Arc::new(KeyLocks::default());
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let progress = ui::create_verify_progress(candidates.len());
    let mut tasks = JoinSet::new();

    for candidate in candidates {
        let locks = Arc::clone(&locks);
        let semaphore = Arc::clone(&semaphore);
        let store = Arc::clone(&ctx.store);
        let vault = Arc::clone(&ctx.vault);
        let registry = ctx.registry.clone();

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            anyhow::Ok(process_candidate(&candidate, &locks, store.as_ref(), vault.as_ref(), registry.as_deref()).await)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let outcome = joined??;
        progress.inc(1);

        report.new_keys += usize::from(outcome.new_key);
        report.live_keys += usize::from(outcome.live);
        report.verify_failures += usize::from(outcome.verify_failed);
        report.store_failures += usize::from(outcome.store_failed);
    }

    progress.finish_and_clear();
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
struct CandidateOutcome {
    new_key: bool,
    live: bool,
    verify_failed: bool,
    store_failed: bool,
}

async fn process_candidate(
    candidate: &Candidate,
    locks: &KeyLocks,
    store: &dyn MetadataStore,
    vault: &dyn SecretVault,
    registry: Option<&ProviderRegistry>,
) -> CandidateOutcome {
    let lock = locks.for_key(&candidate.key_id).await;
    let _guard = lock.lock().await;

    let mut outcome = CandidateOutcome::default();

    let mut record = match load_or_record(candidate, store, vault, &mut outcome) {
        Ok(record) => record,
        Err(e) => {
            // The candidate still counts in the report; the next run
            // re-harvests and retries the write.
            ui::print_warning(&format!("could not persist {}: {e}", candidate.key_id));
            #[cfg(feature = "tracing")]
            warn!(key_id = %candidate.key_id, error = %e, "store write failed");
            outcome.store_failed = true;
            return outcome;
        }
    };

    if let Some(registry) = registry
        && registry.supports_verification(&candidate.provider)
    {
        verify_record(candidate, &mut record, registry, store, &mut outcome).await;
    }

    outcome.live = record.status == KeyStatus::Valid;
    outcome
}

fn load_or_record(
    candidate: &Candidate,
    store: &dyn MetadataStore,
    vault: &dyn SecretVault,
    outcome: &mut CandidateOutcome,
) -> Result<KeyRecord, StoreError> {
    match store.get(&candidate.key_id)? {
        Some(existing) => Ok(existing),
        None => {
            let record = KeyRecord::from_candidate(candidate, Utc::now());
            store.upsert(&record)?;
            vault.store(&candidate.key_id, candidate.secret.expose())?;
            outcome.new_key = true;
            Ok(record)
        }
    }
}

async fn verify_record(
    candidate: &Candidate,
    record: &mut KeyRecord,
    registry: &ProviderRegistry,
    store: &dyn MetadataStore,
    outcome: &mut CandidateOutcome,
) {
    match registry.verify(&candidate.provider, candidate.secret.expose()).await {
        Ok(verification) => {
            if record.apply_outcome(&verification).is_applied()
                && let Err(e) = store.update_status(&record.key_id, record.status, record.last_verified)
            {
                ui::print_warning(&format!("could not persist status for {}: {e}", record.key_id));
                outcome.store_failed = true;
            }
        }
        Err(e) => {
            // Configuration errors; transport failures already arrive as
            // unverifiable outcomes and change nothing.
            ui::print_warning(&format!("could not verify {}: {e}", record.key_id));
            outcome.verify_failed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use keyhound_providers::{BearerVerifier, BoxFuture, KeyVerifier, Provider, RuleDef};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::harvest::{PageFetch, SearchClient, SearchHit, SearchPage};

    /// Client that serves one page containing the given blobs.
    struct OnePageClient {
        blobs: Vec<String>,
    }

    impl SearchClient for OnePageClient {
        fn fetch_page<'a>(
            &'a self,
            _query: &'a str,
            page: u32,
            _per_page: u32,
        ) -> BoxFuture<'a, Result<PageFetch, HarvestError>> {
            let hits = self
                .blobs
                .iter()
                .enumerate()
                .map(|(i, blob)| SearchHit {
                    repository: format!("acme/repo-{i}"),
                    path: "config.py".to_string(),
                    fragments: vec![blob.clone()],
                })
                .collect();

            Box::pin(async move {
                Ok(PageFetch::Page(SearchPage {
                    page,
                    total_count: 1,
                    hits,
                    has_next: false,
                }))
            })
        }
    }

    /// Store whose first upsert fails, emulating a transient backend outage.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        tripped: AtomicBool,
    }

    impl MetadataStore for FlakyStore {
        fn upsert(&self, record: &KeyRecord) -> Result<(), StoreError> {
            if !self.tripped.swap(true, Ordering::SeqCst) {
                return Err(StoreError::Backend("transient write failure".to_string()));
            }
            self.inner.upsert(record)
        }

        fn update_status(
            &self,
            key_id: &KeyId,
            status: KeyStatus,
            last_verified: Option<chrono::DateTime<Utc>>,
        ) -> Result<(), StoreError> {
            self.inner.update_status(key_id, status, last_verified)
        }

        fn get(&self, key_id: &KeyId) -> Result<Option<KeyRecord>, StoreError> {
            self.inner.get(key_id)
        }
    }

    impl SecretVault for FlakyStore {
        fn store(&self, key_id: &KeyId, raw_secret: &str) -> Result<(), StoreError> {
            SecretVault::store(&self.inner, key_id, raw_secret)
        }
    }

    /// Provider registered as `groq` whose verifier hits the given base URL.
    fn groq_provider_at(base_url: &str) -> &'static dyn Provider {
        struct TestProvider {
            verifier: BearerVerifier,
        }

        impl Provider for TestProvider {
            fn id(&self) -> &'static str {
                "groq"
            }

            fn name(&self) -> &'static str {
                "Groq"
            }

            fn rules(&self) -> &'static [RuleDef] {
                &[]
            }

            fn verifier(&self) -> Option<&dyn KeyVerifier> {
                Some(&self.verifier)
            }
        }

        Box::leak(Box::new(TestProvider {
            verifier: BearerVerifier {
                provider: "Groq",
                api_url: Box::leak(format!("{base_url}/v1/models").into_boxed_str()),
                scheme: "Bearer",
            },
        }))
    }

    fn verifying_registry(base_url: &str) -> Arc<ProviderRegistry> {
        let mut registry = ProviderRegistry::from_providers(vec![groq_provider_at(base_url)]);
        registry.enable_verification(Duration::from_secs(2)).unwrap();
        Arc::new(registry)
    }

    fn context(store: Arc<MemoryStore>) -> HuntContext {
        HuntContext {
            store: Arc::clone(&store) as Arc<dyn MetadataStore>,
            vault: store as Arc<dyn SecretVault>,
            registry: None,
        }
    }

    fn harvester(blobs: Vec<String>) -> Harvester {
        Harvester::new(Arc::new(OnePageClient { blobs }), 3, 50, Duration::ZERO)
    }

    fn groq_key() -> String {
        format!("gsk_{}", "aB3x".repeat(13))
    }

    #[tokio::test]
    async fn hunt_records_detected_key_and_vaults_secret() {
        let store = Arc::new(MemoryStore::new());
        let ctx = context(Arc::clone(&store));
        let harvester = harvester(vec![format!("GROQ_API_KEY={}", groq_key())]);
        let pipeline = ClassificationPipeline::new(RuleLibrary::builtin().unwrap());

        let report = run_hunt(
            &["gsk_".to_string()],
            &harvester,
            &pipeline,
            Confidence::Low,
            2,
            &ctx,
        )
        .await
        .unwrap();

        assert_eq!(report.candidates, 1);
        assert_eq!(report.new_keys, 1);
        assert_eq!(report.live_keys, 0);
        assert_eq!(store.record_count().unwrap(), 1);
        assert_eq!(store.secret_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn hunt_deduplicates_same_key_across_blobs() {
        let store = Arc::new(MemoryStore::new());
        let ctx = context(Arc::clone(&store));
        let key = groq_key();
        let harvester = harvester(vec![
            format!("GROQ_API_KEY={key}"),
            format!("client = Groq(api_key=\"{key}\")"),
        ]);
        let pipeline = ClassificationPipeline::new(RuleLibrary::builtin().unwrap());

        let report = run_hunt(
            &["gsk_".to_string()],
            &harvester,
            &pipeline,
            Confidence::Low,
            4,
            &ctx,
        )
        .await
        .unwrap();

        // Two candidates, one key: only the first registers as new.
        assert_eq!(report.candidates, 2);
        assert_eq!(report.new_keys, 1);
        assert_eq!(store.record_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn hunt_filters_below_minimum_confidence() {
        let store = Arc::new(MemoryStore::new());
        let ctx = context(Arc::clone(&store));
        // Generic dash-separated token with a context keyword: Low tier.
        let harvester = harvester(vec![format!("api_key = ak-{}", "xY7w".repeat(8))]);
        let pipeline = ClassificationPipeline::new(RuleLibrary::builtin().unwrap());

        let report = run_hunt(
            &["api_key".to_string()],
            &harvester,
            &pipeline,
            Confidence::High,
            2,
            &ctx,
        )
        .await
        .unwrap();

        assert_eq!(report.candidates, 0);
        assert_eq!(store.record_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn hunt_without_registry_leaves_status_unknown() {
        let store = Arc::new(MemoryStore::new());
        let ctx = context(Arc::clone(&store));
        let harvester = harvester(vec![format!("GROQ_API_KEY={}", groq_key())]);
        let pipeline = ClassificationPipeline::new(RuleLibrary::builtin().unwrap());

        run_hunt(
            &["gsk_".to_string()],
            &harvester,
            &pipeline,
            Confidence::Low,
            2,
            &ctx,
        )
        .await
        .unwrap();

        for record in store.records().unwrap() {
            assert_eq!(record.status, KeyStatus::Unknown);
            assert!(record.last_verified.is_none());
        }
    }

    #[tokio::test]
    async fn hunt_survives_transient_store_failure() {
        let store = Arc::new(FlakyStore::default());
        let ctx = HuntContext {
            store: Arc::clone(&store) as Arc<dyn MetadataStore>,
            vault: Arc::clone(&store) as Arc<dyn SecretVault>,
            registry: None,
        };
        let harvester = harvester(vec![
            format!("GROQ_API_KEY={}", groq_key()),
            format!("GROQ_API_KEY=gsk_{}", "zQ9k".repeat(13)),
        ]);
        let pipeline = ClassificationPipeline::new(RuleLibrary::builtin().unwrap());

        let report = run_hunt(
            &["gsk_".to_string()],
            &harvester,
            &pipeline,
            Confidence::Low,
            1,
            &ctx,
        )
        .await
        .unwrap();

        // The failed write is counted, the other candidate still lands.
        assert_eq!(report.candidates, 2);
        assert_eq!(report.store_failures, 1);
        assert_eq!(report.new_keys, 1);
        assert_eq!(store.inner.record_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn hunt_with_verification_marks_live_key_valid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let mut ctx = context(Arc::clone(&store));
        ctx.registry = Some(verifying_registry(&server.uri()));

        let harvester = harvester(vec![format!("GROQ_API_KEY={}", groq_key())]);
        let pipeline = ClassificationPipeline::new(RuleLibrary::builtin().unwrap());

        let report = run_hunt(
            &["gsk_".to_string()],
            &harvester,
            &pipeline,
            Confidence::Low,
            2,
            &ctx,
        )
        .await
        .unwrap();

        assert_eq!(report.live_keys, 1);
        assert_eq!(report.verify_failures, 0);

        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, KeyStatus::Valid);
        assert!(records[0].last_verified.is_some());
    }

    #[tokio::test]
    async fn hunt_leaves_valid_status_when_verification_unreachable() {
        let store = Arc::new(MemoryStore::new());
        let harvester = harvester(vec![format!("GROQ_API_KEY={}", groq_key())]);
        let pipeline = ClassificationPipeline::new(RuleLibrary::builtin().unwrap());

        // First hunt records the key; mark it valid as a prior check would.
        run_hunt(
            &["gsk_".to_string()],
            &harvester,
            &pipeline,
            Confidence::Low,
            2,
            &context(Arc::clone(&store)),
        )
        .await
        .unwrap();

        let key_id = store.records().unwrap()[0].key_id.clone();
        let verified_at = Utc::now();
        store
            .update_status(&key_id, KeyStatus::Valid, Some(verified_at))
            .unwrap();

        // Re-detecting the key with an unreachable verification endpoint
        // must leave the persisted status and timestamp untouched.
        let mut ctx = context(Arc::clone(&store));
        ctx.registry = Some(verifying_registry("http://127.0.0.1:1"));

        let report = run_hunt(
            &["gsk_".to_string()],
            &harvester,
            &pipeline,
            Confidence::Low,
            2,
            &ctx,
        )
        .await
        .unwrap();

        let record = store.get(&key_id).unwrap().unwrap();
        assert_eq!(record.status, KeyStatus::Valid);
        assert_eq!(record.last_verified, Some(verified_at));
        assert_eq!(report.live_keys, 1);
        assert_eq!(report.verify_failures, 0);
    }

    #[tokio::test]
    async fn key_locks_hand_out_same_lock_for_same_key() {
        let locks = KeyLocks::default();
        let secret = SecretText::new("sk-ant-lock-test");
        let key_id = KeyId::new("anthropic", &secret);

        let a = locks.for_key(&key_id).await;
        let b = locks.for_key(&key_id).await;

        assert!(Arc::ptr_eq(&a, &b));
    }
}
