use async_trait::async_trait;
use reqwest::Client;

use crate::error::{ScrapingError, ScrapingResult};
use crate::ScraperConfig;

/// Source of raw statement pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> ScrapingResult<String>;
}

/// HTTP fetcher for statement pages, retrying failed attempts with a fixed delay.
#[derive(Clone)]
pub struct StatementFetcher {
    client: Client,
    config: ScraperConfig,
}

impl StatementFetcher {
    pub fn new(config: ScraperConfig) -> ScrapingResult<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone());

        if let Some(proxy_url) = &config.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Fetch the page body at `url`.
    ///
    /// Transport errors and non-success statuses are retried up to
    /// `max_retries` times before giving up.
    pub async fn fetch_page(&self, url: &str) -> ScrapingResult<String> {
        let attempts = self.config.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.try_fetch(url).await {
                Ok(body) => {
                    tracing::debug!("Fetched {} ({} bytes, attempt {})", url, body.len(), attempt);
                    return Ok(body);
                }
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < attempts {
                        tracing::warn!(
                            "Fetch of {} failed ({}), retry {}/{} in {:.1}s",
                            url,
                            last_error,
                            attempt,
                            self.config.max_retries,
                            self.config.retry_delay.as_secs_f64()
                        );
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
            }
        }

        Err(ScrapingError::Fetch {
            url: url.to_string(),
            reason: last_error,
        })
    }

    async fn try_fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl PageSource for StatementFetcher {
    async fn fetch_page(&self, url: &str) -> ScrapingResult<String> {
        StatementFetcher::fetch_page(self, url).await
    }
}
