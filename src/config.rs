use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::ScrapeError;

/// One batch of URLs to scrape, plus the inference settings for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRequest {
    /// URLs to process, in submission order
    pub urls: Vec<String>,

    /// Model identifier used for pagination inference and cost accounting
    #[serde(default = "default_model")]
    pub model: String,

    /// Whether to run pagination inference per URL
    #[serde(default = "default_pagination_enabled")]
    pub pagination_enabled: bool,

    /// Optional free-text guidance passed into the inference prompt
    #[serde(default)]
    pub pagination_hint: Option<String>,
}

impl ScrapeRequest {
    /// Build a request from a whitespace-separated URL batch, the form the
    /// presentation layer collects input in.
    pub fn from_batch(batch: &str, model: &str, pagination_hint: Option<String>) -> Self {
        Self {
            urls: batch.split_whitespace().map(|s| s.to_string()).collect(),
            model: model.to_string(),
            pagination_enabled: default_pagination_enabled(),
            pagination_hint,
        }
    }

    /// Reject requests no run should start for: an empty batch, or a batch
    /// containing blank entries.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.urls.is_empty() {
            return Err(ScrapeError::Validation(
                "enter at least one URL".to_string(),
            ));
        }
        if self.urls.iter().any(|url| url.trim().is_empty()) {
            return Err(ScrapeError::Validation(
                "URL entries must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the orchestration engine and its collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Directory that per-run output folders are created under
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Base URL of the OpenAI-compatible chat completions endpoint
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            webdriver_url: default_webdriver_url(),
            api_base: default_api_base(),
        }
    }
}

impl OrchestratorConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

/// Default value for the output root
fn default_output_root() -> PathBuf {
    PathBuf::from("output")
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

/// Default value for api_base
fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Default model selection
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Pagination inference is always on in the current scope
fn default_pagination_enabled() -> bool {
    true
}
