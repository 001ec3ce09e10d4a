use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::state::StateError;

/// The stage of per-URL processing in which a failure occurred.
///
/// Every recorded failure names its stage so the caller can tell a dead page
/// apart from a broken provider or an unwritable output folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Retrieving the raw page markup
    Fetch,
    /// Converting raw markup into readable text
    Normalize,
    /// Writing the normalized artifact to disk
    Persist,
    /// Asking the LLM backend for pagination links
    Infer,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Normalize => "normalize",
            Stage::Persist => "persist",
            Stage::Infer => "infer",
        };
        write!(f, "{}", name)
    }
}

/// Run-level errors that prevent a batch from starting or finishing.
///
/// Per-URL failures never surface here; they are recorded in the aggregate
/// result and the batch keeps going.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// The request failed validation; no state change, no resource acquired.
    #[error("invalid scrape request: {0}")]
    Validation(String),

    /// A lifecycle transition was rejected by the run state machine.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Errors from the page fetch collaborator.
#[derive(Error, Debug)]
pub enum FetchError {
    /// No WebDriver server answered on the configured or fallback endpoints.
    #[error("failed to connect to any WebDriver server")]
    NoWebDriver,

    /// Navigation or source retrieval failed for a page.
    #[error("failed to load {url}: {message}")]
    Navigation { url: String, message: String },

    /// The WebDriver session disappeared mid-request.
    #[error("WebDriver session lost while loading {url}")]
    SessionLost { url: String },

    /// Attended fetches are a reserved mode with no implemented behavior.
    #[error("attended fetch mode is reserved and not supported")]
    AttendedUnsupported,
}

/// Errors from the pagination inference collaborator.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport-level failure talking to the provider.
    #[error("pagination request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status (bad credentials,
    /// quota exhaustion, and similar).
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The selected model has no pricing entry, so cost cannot be accounted.
    #[error("no pricing entry for model {0}")]
    UnknownModel(String),

    /// The provider reply did not carry the expected fields, or carried them
    /// malformed. Token and cost fields are never silently coerced to zero.
    #[error("malformed provider payload: {0}")]
    MalformedPayload(String),
}

/// Errors writing artifacts to durable storage.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to create output folder {path}: {source}")]
    CreateFolder {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
