use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::ProviderError;
use crate::paginate::{PaginationInferrer, PaginationOutcome, PaginationResult};
use crate::pricing;
use crate::results::TokenCounts;

/// Upper bound on the normalized content quoted into the prompt
const MAX_CONTENT_CHARS: usize = 16_000;

const SYSTEM_PROMPT: &str = "You analyze the readable text of a web page and identify pagination. \
Reply with a JSON object of the form {\"page_urls\": [...]} listing the absolute URLs of the \
subsequent pages of the same listing, in order. Reply with an empty list when the page has no \
pagination.";

/// Pagination inference over an OpenAI-compatible chat completions API.
///
/// The reply is parsed through the wire normalizer, token usage is taken
/// from the provider's accounting, and cost comes from the pricing table for
/// the selected model.
pub struct LlmPaginationInferrer {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl LlmPaginationInferrer {
    pub fn new(api_base: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl PaginationInferrer for LlmPaginationInferrer {
    async fn infer(
        &self,
        url: &str,
        hint: Option<&str>,
        model: &str,
        content: &str,
    ) -> Result<PaginationOutcome, ProviderError> {
        // Unknown models have no rates, so their usage could never be
        // accounted; refuse before spending tokens
        let pricing =
            pricing::pricing_for(model).ok_or_else(|| ProviderError::UnknownModel(model.to_string()))?;

        let body = json!({
            "model": model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(url, hint, content)},
            ],
            "response_format": {"type": "json_object"},
        });

        ::log::debug!("Requesting pagination inference for {} via {}", url, model);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;

        let token_counts = usage_from_payload(&payload)?;
        let reply = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ProviderError::MalformedPayload("reply carries no message content".to_string())
            })?;

        let wire: Value = serde_json::from_str(reply).map_err(|e| {
            ProviderError::MalformedPayload(format!("reply is not valid JSON: {}", e))
        })?;
        let result = PaginationResult::from_wire(&wire)?;

        let cost = pricing.cost(token_counts);

        ::log::debug!(
            "Inference for {} proposed {} page URLs ({} in / {} out tokens, ${:.6})",
            url,
            result.page_urls.len(),
            token_counts.input,
            token_counts.output,
            cost
        );

        Ok(PaginationOutcome {
            result,
            token_counts,
            cost,
        })
    }
}

/// Builds the user prompt from the page URL, optional operator guidance, and
/// a bounded excerpt of the normalized content.
fn build_prompt(url: &str, hint: Option<&str>, content: &str) -> String {
    let excerpt: String = content.chars().take(MAX_CONTENT_CHARS).collect();

    let mut prompt = format!("Page URL: {}\n", url);
    if let Some(hint) = hint {
        if !hint.trim().is_empty() {
            prompt.push_str(&format!("Operator guidance: {}\n", hint.trim()));
        }
    }
    prompt.push_str("\nPage content:\n");
    prompt.push_str(&excerpt);
    prompt
}

/// Extracts token usage from the provider payload.
///
/// Missing or malformed usage fields are a hard error here: coercing them to
/// zero would silently skew the run's cost accounting.
fn usage_from_payload(payload: &Value) -> Result<TokenCounts, ProviderError> {
    let usage = payload.get("usage").ok_or_else(|| {
        ProviderError::MalformedPayload("payload carries no usage object".to_string())
    })?;

    let input = usage
        .get("prompt_tokens")
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            ProviderError::MalformedPayload(
                "usage.prompt_tokens missing or not a non-negative integer".to_string(),
            )
        })?;

    let output = usage
        .get("completion_tokens")
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            ProviderError::MalformedPayload(
                "usage.completion_tokens missing or not a non-negative integer".to_string(),
            )
        })?;

    Ok(TokenCounts::new(input, output))
}
