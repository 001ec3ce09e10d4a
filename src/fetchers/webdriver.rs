use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};

use crate::error::FetchError;
use crate::fetchers::PageFetcher;

/// Fetches pages through a WebDriver session.
///
/// The session is a shared, non-reentrant handle: it is opened lazily on the
/// first fetch, reused for every URL in the batch, and closed once by
/// `release`.
pub struct WebDriverFetcher {
    webdriver_url: String,
    client: Option<Client>,
}

impl WebDriverFetcher {
    pub fn new(webdriver_url: &str) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            client: None,
        }
    }

    /// Connects to the WebDriver instance, trying common fallback endpoints
    /// when the configured one refuses.
    async fn connect(&self) -> Option<Client> {
        match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Some(client);
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
            }
        }

        // If we couldn't connect, try with common alternative URLs
        let fallback_urls = [
            "http://localhost:9515", // ChromeDriver default
            "http://localhost:4444", // Selenium default
            "http://127.0.0.1:4444", // Try with IP instead of localhost
        ];

        for url in fallback_urls.iter() {
            if *url == self.webdriver_url {
                continue; // Skip if it's the same as the one we already tried
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            match ClientBuilder::native().connect(url).await {
                Ok(client) => {
                    ::log::debug!("Connected to fallback WebDriver at {}", url);
                    return Some(client);
                }
                Err(_) => {
                    // Don't log errors for fallbacks to avoid log spam
                }
            }
        }

        ::log::error!("Failed to connect to any WebDriver server");
        ::log::error!("Make sure a WebDriver server is running, or pass --webdriver-url");
        None
    }
}

#[async_trait]
impl PageFetcher for WebDriverFetcher {
    async fn fetch(&mut self, url: &str, attended: bool) -> Result<String, FetchError> {
        if attended {
            // Reserved mode: the Waiting lifecycle hook exists, but no
            // attended behavior is defined yet
            return Err(FetchError::AttendedUnsupported);
        }

        // Lazily open the session on the first fetch of the batch
        if self.client.is_none() {
            ::log::debug!("Opening WebDriver session");
            match self.connect().await {
                Some(client) => self.client = Some(client),
                None => return Err(FetchError::NoWebDriver),
            }
        }

        // We now have a client - unwrap safely
        let client = self.client.as_ref().unwrap();

        if let Err(e) = client.goto(url).await {
            return Err(classify_error(e, url));
        }

        match client.source().await {
            Ok(source) => {
                ::log::debug!("Fetched {} ({} bytes of markup)", url, source.len());
                Ok(source)
            }
            Err(e) => Err(classify_error(e, url)),
        }
    }

    async fn release(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            } else {
                ::log::debug!("WebDriver session closed");
            }
        }
    }
}

/// Maps a WebDriver command failure onto the fetch error taxonomy.
fn classify_error(error: fantoccini::error::CmdError, url: &str) -> FetchError {
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost WebDriver session while loading {}", url);
        FetchError::SessionLost {
            url: url.to_string(),
        }
    } else {
        ::log::error!("Failed to load {}: {}", url, error);
        FetchError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
