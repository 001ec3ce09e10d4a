pub mod webdriver;

pub use webdriver::WebDriverFetcher;

use async_trait::async_trait;

use crate::error::FetchError;

/// The page retrieval collaborator.
///
/// Implementations own a single, non-reentrant browser-automation resource:
/// it is acquired implicitly by the first fetch and held for the whole
/// batch, so no two fetches may run concurrently against one fetcher.
#[async_trait]
pub trait PageFetcher: Send {
    /// Retrieve the raw markup for `url` after rendering.
    ///
    /// `attended` requests a fetch mode with manual browser interaction;
    /// that mode is reserved and implementations may reject it.
    async fn fetch(&mut self, url: &str, attended: bool) -> Result<String, FetchError>;

    /// Release the underlying automation resource.
    ///
    /// Idempotent: safe to call when no resource is held. The orchestrator
    /// calls this exactly once per run, on every exit path.
    async fn release(&mut self);
}
