use crate::api::types::{LatestPricesResponse, PriceRecord};
use crate::config::ApiConfig;
use crate::error::{PorssisahkoError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use std::time::Duration;

/// Anything that can hand the update cycle a fresh list of price records
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the latest records. Errors are transient from the caller's view.
    async fn latest_prices(&self) -> Result<Vec<PriceRecord>>;
}

/// HTTP client for `latest-prices.json`
pub struct PorssisahkoClient {
    http: reqwest::Client,
    url: String,
    logger: StructuredLogger,
}

impl PorssisahkoClient {
    /// Build a client with the configured timeout and user agent
    pub fn new(cfg: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .user_agent(cfg.user_agent.clone())
            .build()?;
        Ok(Self {
            http,
            url: cfg.url.clone(),
            logger: get_logger_with_context(
                LogContext::new("api").with_field("url", cfg.url.clone()),
            ),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PriceSource for PorssisahkoClient {
    async fn latest_prices(&self) -> Result<Vec<PriceRecord>> {
        self.logger.debug("Fetching latest prices");

        let resp = self
            .http
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            self.logger
                .error(&format!("API request failed with status {}", status.as_u16()));
            return Err(PorssisahkoError::http_status(status.as_u16()));
        }

        // Read the body first so a malformed payload surfaces as a parse error
        let body = resp.text().await?;
        let parsed: LatestPricesResponse = serde_json::from_str(&body)?;
        if parsed.prices.is_empty() {
            self.logger.warn("API returned an empty price list");
        }
        Ok(parsed.prices)
    }
}
