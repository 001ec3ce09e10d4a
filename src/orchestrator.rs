use std::path::Path;

use crate::artifacts::{self, ArtifactWriter};
use crate::config::{OrchestratorConfig, ScrapeRequest};
use crate::error::{ScrapeError, Stage};
use crate::fetchers::PageFetcher;
use crate::normalize;
use crate::paginate::PaginationInferrer;
use crate::results::{AggregateResult, PerUrlResult, TokenCounts, UrlFailure, UrlOutcome};
use crate::state::{RunState, RunStateMachine};

/// Working state for one run: created on launch, mutated while scraping,
/// discarded on completion. Nothing about a run lives outside this object
/// and the state machine.
struct RunContext {
    run_name: String,
    writer: ArtifactWriter,
    aggregate: AggregateResult,
}

impl RunContext {
    fn new(output_root: &Path, seed_url: &str) -> Self {
        let run_name = artifacts::run_folder_name(seed_url);
        let writer = ArtifactWriter::new(output_root, &run_name);
        Self {
            run_name,
            writer,
            aggregate: AggregateResult::new(),
        }
    }
}

/// Drives the sequential multi-URL scrape workflow.
///
/// URLs are processed strictly one at a time: fetch, normalize, persist,
/// infer pagination, record. Per-URL failures are trapped and recorded; only
/// an invalid request prevents a run from starting. The fetcher's shared
/// automation handle is released exactly once per run, after the whole
/// batch, on every exit path.
pub struct Orchestrator {
    config: OrchestratorConfig,
    fetcher: Box<dyn PageFetcher>,
    inferrer: Box<dyn PaginationInferrer>,
    state: RunStateMachine,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        fetcher: Box<dyn PageFetcher>,
        inferrer: Box<dyn PaginationInferrer>,
    ) -> Self {
        Self {
            config,
            fetcher,
            inferrer,
            state: RunStateMachine::new(),
        }
    }

    /// The current lifecycle state, for progress indication.
    pub fn state(&self) -> RunState {
        self.state.current()
    }

    /// Process every URL in the request and return the aggregated results.
    ///
    /// Produces exactly one outcome per input URL, in submission order, with
    /// token and cost totals summed over the successful entries.
    pub async fn run(&mut self, request: &ScrapeRequest) -> Result<AggregateResult, ScrapeError> {
        // Invalid requests are rejected before any state change or resource
        // acquisition
        request.validate()?;
        self.state.launch()?;

        let mut ctx = RunContext::new(&self.config.output_root, &request.urls[0]);
        ::log::info!(
            "Starting run {} over {} URLs",
            ctx.run_name,
            request.urls.len()
        );

        // Every per-URL failure is trapped inside the loop, so control always
        // reaches the release and completion steps below
        for (position, url) in request.urls.iter().enumerate() {
            let index = position + 1;
            ::log::info!("Processing URL {}/{}: {}", index, request.urls.len(), url);

            let outcome = self.process_url(index, url, request, &ctx.writer).await;
            if let UrlOutcome::Failed(failure) = &outcome {
                ::log::error!(
                    "{} failed at the {} stage: {}",
                    failure.url,
                    failure.stage,
                    failure.message
                );
            }
            ctx.aggregate.record(outcome);
        }

        // Release the shared automation handle exactly once per run
        self.fetcher.release().await;
        self.state.complete()?;

        ::log::info!(
            "Run {} complete: {} URLs, {} failures, {} input / {} output tokens, ${:.6}",
            ctx.run_name,
            ctx.aggregate.len(),
            ctx.aggregate.failure_count(),
            ctx.aggregate.total_input_tokens,
            ctx.aggregate.total_output_tokens,
            ctx.aggregate.total_cost
        );

        Ok(ctx.aggregate)
    }

    /// Run one URL through fetch, normalize, persist, and pagination
    /// inference. Any stage error becomes the URL's recorded failure;
    /// nothing propagates to the batch.
    async fn process_url(
        &mut self,
        index: usize,
        url: &str,
        request: &ScrapeRequest,
        writer: &ArtifactWriter,
    ) -> UrlOutcome {
        let raw = match self.fetcher.fetch(url, false).await {
            Ok(raw) => raw,
            Err(e) => return UrlOutcome::Failed(UrlFailure::new(url, Stage::Fetch, &e)),
        };

        let text = normalize::normalize(&raw);

        // The artifact index is the URL's 1-based position in the batch, a
        // durable naming contract that holds even when earlier URLs failed
        let artifact_path = match writer.persist(&text, &artifacts::artifact_filename(index)) {
            Ok(path) => path,
            Err(e) => return UrlOutcome::Failed(UrlFailure::new(url, Stage::Persist, &e)),
        };

        if !request.pagination_enabled {
            return UrlOutcome::Scraped(PerUrlResult {
                url: url.to_string(),
                artifact_path,
                page_urls: Vec::new(),
                token_counts: TokenCounts::default(),
                cost: 0.0,
            });
        }

        match self
            .inferrer
            .infer(url, request.pagination_hint.as_deref(), &request.model, &text)
            .await
        {
            Ok(outcome) => UrlOutcome::Scraped(PerUrlResult {
                url: url.to_string(),
                artifact_path,
                page_urls: outcome.result.page_urls,
                token_counts: outcome.token_counts,
                cost: outcome.cost,
            }),
            Err(e) => UrlOutcome::Failed(UrlFailure::new(url, Stage::Infer, &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, ProviderError};
    use crate::paginate::{PaginationOutcome, PaginationResult};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fetcher that fails for scripted URLs and counts releases.
    struct ScriptedFetcher {
        failing: Vec<String>,
        release_count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&mut self, url: &str, _attended: bool) -> Result<String, FetchError> {
            if self.failing.iter().any(|u| u == url) {
                return Err(FetchError::Navigation {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                });
            }
            Ok(format!(
                "<html><head><title>Page</title></head><body><p>Content for {}</p></body></html>",
                url
            ))
        }

        async fn release(&mut self) {
            self.release_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Inferrer that replies with a fixed outcome, or a scripted failure.
    struct FixedInferrer {
        page_urls: Vec<String>,
        token_counts: TokenCounts,
        cost: f64,
        fail: bool,
    }

    #[async_trait]
    impl PaginationInferrer for FixedInferrer {
        async fn infer(
            &self,
            _url: &str,
            _hint: Option<&str>,
            _model: &str,
            _content: &str,
        ) -> Result<PaginationOutcome, ProviderError> {
            if self.fail {
                return Err(ProviderError::MalformedPayload(
                    "scripted inference failure".to_string(),
                ));
            }
            Ok(PaginationOutcome {
                result: PaginationResult {
                    page_urls: self.page_urls.clone(),
                },
                token_counts: self.token_counts,
                cost: self.cost,
            })
        }
    }

    fn request(urls: &[&str]) -> ScrapeRequest {
        ScrapeRequest {
            urls: urls.iter().map(|s| s.to_string()).collect(),
            model: "gpt-4o-mini".to_string(),
            pagination_enabled: true,
            pagination_hint: None,
        }
    }

    fn orchestrator(
        output_root: &Path,
        failing_urls: &[&str],
        inferrer: FixedInferrer,
    ) -> (Orchestrator, Arc<AtomicUsize>) {
        let release_count = Arc::new(AtomicUsize::new(0));
        let fetcher = ScriptedFetcher {
            failing: failing_urls.iter().map(|s| s.to_string()).collect(),
            release_count: Arc::clone(&release_count),
        };
        let config = OrchestratorConfig {
            output_root: output_root.to_path_buf(),
            ..OrchestratorConfig::default()
        };
        let orchestrator = Orchestrator::new(config, Box::new(fetcher), Box::new(inferrer));
        (orchestrator, release_count)
    }

    fn two_pages_inferrer() -> FixedInferrer {
        FixedInferrer {
            page_urls: vec![
                "https://a.example/list?page=2".to_string(),
                "https://a.example/list?page=3".to_string(),
            ],
            token_counts: TokenCounts::new(120, 40),
            cost: 0.002,
            fail: false,
        }
    }

    #[tokio::test]
    async fn test_single_url_run() {
        let root = tempfile::tempdir().unwrap();
        let (mut orchestrator, releases) = orchestrator(root.path(), &[], two_pages_inferrer());

        let result = orchestrator
            .run(&request(&["https://a.example/list"]))
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        match &result.outcomes[0] {
            UrlOutcome::Scraped(entry) => {
                assert_eq!(entry.url, "https://a.example/list");
                assert_eq!(
                    entry.page_urls,
                    vec![
                        "https://a.example/list?page=2",
                        "https://a.example/list?page=3"
                    ]
                );
                assert_eq!(entry.token_counts, TokenCounts::new(120, 40));
                // The artifact landed under the run folder with its 1-based name
                assert!(entry.artifact_path.ends_with("artifact_1.md"));
                assert!(entry.artifact_path.exists());
            }
            other => panic!("expected a scraped outcome, got {:?}", other),
        }

        assert_eq!(result.total_input_tokens, 120);
        assert_eq!(result.total_output_tokens, 40);
        assert!((result.total_cost - 0.002).abs() < 1e-9);

        assert_eq!(orchestrator.state(), RunState::Completed);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_url_fetch_failure_is_recorded_and_batch_continues() {
        let root = tempfile::tempdir().unwrap();
        let (mut orchestrator, releases) = orchestrator(
            root.path(),
            &["https://b.example/items"],
            two_pages_inferrer(),
        );

        let result = orchestrator
            .run(&request(&["https://a.example/list", "https://b.example/items"]))
            .await
            .unwrap();

        // One entry per input URL, in submission order
        assert_eq!(result.len(), 2);
        assert!(!result.outcomes[0].is_failure());
        match &result.outcomes[1] {
            UrlOutcome::Failed(failure) => {
                assert_eq!(failure.url, "https://b.example/items");
                assert_eq!(failure.stage, Stage::Fetch);
            }
            other => panic!("expected a failure outcome, got {:?}", other),
        }

        // Totals reflect only the first URL's contribution
        assert_eq!(result.total_input_tokens, 120);
        assert_eq!(result.total_output_tokens, 40);
        assert!((result.total_cost - 0.002).abs() < 1e-9);

        // The run still completed, and the handle was released exactly once
        assert_eq!(orchestrator.state(), RunState::Completed);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_artifact_numbering_matches_batch_position_across_failures() {
        let root = tempfile::tempdir().unwrap();
        let (mut orchestrator, _) = orchestrator(
            root.path(),
            &["https://a.example/first"],
            two_pages_inferrer(),
        );

        let result = orchestrator
            .run(&request(&["https://a.example/first", "https://a.example/second"]))
            .await
            .unwrap();

        assert!(result.outcomes[0].is_failure());
        match &result.outcomes[1] {
            UrlOutcome::Scraped(entry) => {
                // Position 2 keeps artifact_2 even though position 1 failed
                assert!(entry.artifact_path.ends_with("artifact_2.md"));
                assert!(entry.artifact_path.exists());
                assert!(!entry.artifact_path.with_file_name("artifact_1.md").exists());
            }
            other => panic!("expected a scraped outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validation_failure_leaves_idle_and_touches_nothing() {
        let root = tempfile::tempdir().unwrap();
        let (mut orchestrator, releases) = orchestrator(root.path(), &[], two_pages_inferrer());

        let err = orchestrator.run(&request(&[])).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Validation(_)));
        assert_eq!(orchestrator.state(), RunState::Idle);
        assert_eq!(releases.load(Ordering::SeqCst), 0);

        let err = orchestrator.run(&request(&["   "])).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Validation(_)));
        assert_eq!(orchestrator.state(), RunState::Idle);
    }

    #[tokio::test]
    async fn test_zero_discovered_pages_is_a_valid_result() {
        let root = tempfile::tempdir().unwrap();
        let inferrer = FixedInferrer {
            page_urls: Vec::new(),
            token_counts: TokenCounts::new(50, 5),
            cost: 0.0001,
            fail: false,
        };
        let (mut orchestrator, _) = orchestrator(root.path(), &[], inferrer);

        let result = orchestrator
            .run(&request(&["https://a.example/single-page"]))
            .await
            .unwrap();

        match &result.outcomes[0] {
            UrlOutcome::Scraped(entry) => {
                assert!(entry.page_urls.is_empty());
                assert_eq!(entry.token_counts, TokenCounts::new(50, 5));
            }
            other => panic!("expected a scraped outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_inference_failure_is_recorded_after_artifact_persists() {
        let root = tempfile::tempdir().unwrap();
        let inferrer = FixedInferrer {
            page_urls: Vec::new(),
            token_counts: TokenCounts::default(),
            cost: 0.0,
            fail: true,
        };
        let (mut orchestrator, _) = orchestrator(root.path(), &[], inferrer);

        let result = orchestrator
            .run(&request(&["https://a.example/list"]))
            .await
            .unwrap();

        match &result.outcomes[0] {
            UrlOutcome::Failed(failure) => assert_eq!(failure.stage, Stage::Infer),
            other => panic!("expected a failure outcome, got {:?}", other),
        }

        // Nothing was silently coerced into the totals
        assert_eq!(result.total_input_tokens, 0);
        assert_eq!(result.total_cost, 0.0);

        // The artifact was already written before inference gave up
        let run_folder = std::fs::read_dir(root.path()).unwrap().next().unwrap().unwrap();
        assert!(run_folder.path().join("artifact_1.md").exists());
    }

    #[tokio::test]
    async fn test_relaunch_after_completion() {
        let root = tempfile::tempdir().unwrap();
        let (mut orchestrator, releases) = orchestrator(root.path(), &[], two_pages_inferrer());

        orchestrator
            .run(&request(&["https://a.example/list"]))
            .await
            .unwrap();
        let second = orchestrator
            .run(&request(&["https://a.example/list"]))
            .await
            .unwrap();

        assert_eq!(second.len(), 1);
        assert_eq!(orchestrator.state(), RunState::Completed);
        // One release per run
        assert_eq!(releases.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_duplicate_urls_produce_independent_outcomes() {
        let root = tempfile::tempdir().unwrap();
        let (mut orchestrator, _) = orchestrator(root.path(), &[], two_pages_inferrer());

        let result = orchestrator
            .run(&request(&["https://a.example/list", "https://a.example/list"]))
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.total_input_tokens, 240);
        assert!((result.total_cost - 0.004).abs() < 1e-9);
    }
}
