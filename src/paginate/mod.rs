pub mod llm;

pub use llm::LlmPaginationInferrer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderError;
use crate::results::TokenCounts;

/// Pagination links proposed for one page, in reply order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationResult {
    pub page_urls: Vec<String>,
}

impl PaginationResult {
    /// Normalize an accepted wire shape into the single internal form.
    ///
    /// Backends answer either with an object carrying a `page_urls` key or
    /// with a bare list of URLs; both map here, at the collaborator
    /// boundary, so nothing downstream ever inspects the wire shape. A
    /// missing `page_urls` key means no pagination was found and yields an
    /// empty result.
    pub fn from_wire(value: &Value) -> Result<Self, ProviderError> {
        let page_urls = match value {
            Value::Array(items) => collect_urls(items)?,
            Value::Object(map) => match map.get("page_urls") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => collect_urls(items)?,
                Some(other) => {
                    return Err(ProviderError::MalformedPayload(format!(
                        "page_urls is not a list: {}",
                        other
                    )));
                }
            },
            other => {
                return Err(ProviderError::MalformedPayload(format!(
                    "expected an object or a list, got: {}",
                    other
                )));
            }
        };

        Ok(Self { page_urls })
    }
}

fn collect_urls(items: &[Value]) -> Result<Vec<String>, ProviderError> {
    items
        .iter()
        .map(|item| {
            item.as_str().map(|s| s.to_string()).ok_or_else(|| {
                ProviderError::MalformedPayload(format!("page URL entry is not a string: {}", item))
            })
        })
        .collect()
}

/// Everything one inference call produces: the normalized pagination links,
/// the token usage, and the estimated cost in USD.
#[derive(Debug, Clone, Default)]
pub struct PaginationOutcome {
    pub result: PaginationResult,
    pub token_counts: TokenCounts,
    pub cost: f64,
}

/// The pagination inference collaborator.
///
/// Given a URL, optional operator guidance, a model identifier, and the
/// page's normalized content, the backend proposes the URLs of subsequent
/// pages. Failures (bad credentials, quota, malformed replies) surface as
/// `ProviderError` and are recorded per URL by the orchestrator.
#[async_trait]
pub trait PaginationInferrer: Send + Sync {
    async fn infer(
        &self,
        url: &str,
        hint: Option<&str>,
        model: &str,
        content: &str,
    ) -> Result<PaginationOutcome, ProviderError>;
}
