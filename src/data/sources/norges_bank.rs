//! Norges Bank SDMX REST API
//!
//! Serves the `EXR` dataset as SDMX-JSON, no API key required.

use super::{ExchangeRateSource, RateRequest};
use crate::data::sdmx::ExchangeRatesResponse;
use crate::error::{ExrError, Result};
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;
use uuid::Uuid;

pub const NORGES_BANK_BASE_URL: &str = "https://data.norges-bank.no";

/// Norges Bank exchange-rate source
#[derive(Debug, Clone)]
pub struct NorgesBankSource {
    client: Client,
    base_url: String,
}

impl NorgesBankSource {
    pub fn new() -> Result<Self> {
        Self::with_base_url(NORGES_BANK_BASE_URL)
    }

    /// Point the source at another host (mirrors, test servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("rusty-exr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExrError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of a request, without query
    pub fn url(&self, request: &RateRequest) -> String {
        format!("{}{}", self.base_url, request.path())
    }
}

impl ExchangeRateSource for NorgesBankSource {
    async fn fetch(&self, request: &RateRequest) -> Result<ExchangeRatesResponse> {
        let request_id = Uuid::new_v4().simple().to_string();
        let request_id = &request_id[..8];
        debug!("[{}] GET {}{}", request_id, self.base_url, request);

        let response = self
            .client
            .get(self.url(request))
            .query(&request.query_pairs())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ExrError::Network(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExrError::Network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            warn!("[{}] Norges Bank returned {}", request_id, status);
            return Err(ExrError::Http {
                status: status.as_u16(),
                body,
            });
        }

        debug!("[{}] {} {} bytes", request_id, status, body.len());
        ExchangeRatesResponse::from_json(&body)
    }

    fn name(&self) -> &str {
        "norges-bank"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;

    #[tokio::test]
    async fn test_source_creation() {
        let source = NorgesBankSource::new();
        assert!(source.is_ok());
    }

    #[test]
    fn test_url() {
        let source = NorgesBankSource::with_base_url("http://localhost:8080/").unwrap();
        assert_eq!(source.base_url(), "http://localhost:8080");
        let request = RateRequest::latest(vec![Currency::USD]);
        assert_eq!(source.url(&request), "http://localhost:8080/api/data/EXR/B.USD.NOK.SP");
        assert_eq!(source.name(), "norges-bank");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let source = NorgesBankSource::with_base_url("http://127.0.0.1:9").unwrap();
        let err = source.fetch(&RateRequest::latest(vec![Currency::USD])).await.unwrap_err();
        assert!(matches!(err, ExrError::Network(_)));
    }
}
