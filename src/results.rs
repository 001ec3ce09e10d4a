use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Stage;

/// Token usage reported by the pagination inference backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounts {
    /// Tokens consumed by the prompt
    pub input: u64,
    /// Tokens produced in the reply
    pub output: u64,
}

impl TokenCounts {
    pub fn new(input: u64, output: u64) -> Self {
        Self { input, output }
    }
}

/// The result of processing one URL successfully.
///
/// Produced once per URL and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerUrlResult {
    /// URL as submitted in the request
    pub url: String,

    /// Where the normalized artifact was written
    pub artifact_path: PathBuf,

    /// Pagination URLs proposed by the inference backend, in reply order.
    /// Empty when the page has no discoverable pagination.
    pub page_urls: Vec<String>,

    /// Token usage for this URL's inference call
    pub token_counts: TokenCounts,

    /// Estimated inference cost in USD
    pub cost: f64,
}

/// The error-flagged placeholder recorded when one URL's processing fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlFailure {
    /// URL as submitted in the request
    pub url: String,

    /// Which processing stage gave up on this URL
    pub stage: Stage,

    /// Human-readable failure description
    pub message: String,
}

impl UrlFailure {
    pub fn new(url: &str, stage: Stage, error: &dyn std::fmt::Display) -> Self {
        Self {
            url: url.to_string(),
            stage,
            message: error.to_string(),
        }
    }
}

/// One entry per input URL: either a scraped result or a recorded failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum UrlOutcome {
    Scraped(PerUrlResult),
    Failed(UrlFailure),
}

impl UrlOutcome {
    /// The URL this outcome belongs to.
    pub fn url(&self) -> &str {
        match self {
            UrlOutcome::Scraped(result) => &result.url,
            UrlOutcome::Failed(failure) => &failure.url,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, UrlOutcome::Failed(_))
    }
}

/// Cross-request accounting for one run.
///
/// Outcomes preserve request order, one entry per input URL. Duplicate input
/// URLs produce duplicate independent entries, which is why this is an
/// ordered list keyed by each entry's own `url` rather than a map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateResult {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cost: f64,
    pub outcomes: Vec<UrlOutcome>,
}

impl AggregateResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one URL's outcome, folding token and cost contributions into
    /// the running totals. Failures contribute nothing to the totals.
    pub fn record(&mut self, outcome: UrlOutcome) {
        if let UrlOutcome::Scraped(result) = &outcome {
            self.total_input_tokens += result.token_counts.input;
            self.total_output_tokens += result.token_counts.output;
            self.total_cost += result.cost;
        }
        self.outcomes.push(outcome);
    }

    /// Number of recorded outcomes (successes and failures alike).
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Count of outcomes that recorded a failure.
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }
}
