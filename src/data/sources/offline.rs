//! Offline data source - always fails
//!
//! Forces the fallback chain onto cached or bundled data without touching the
//! network.

use super::{ExchangeRateSource, RateRequest};
use crate::data::sdmx::ExchangeRatesResponse;
use crate::error::{ExrError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl OfflineSource {
    pub fn new() -> Self {
        Self
    }
}

impl ExchangeRateSource for OfflineSource {
    async fn fetch(&self, request: &RateRequest) -> Result<ExchangeRatesResponse> {
        Err(ExrError::Network(format!("offline, not requesting {}", request.path())))
    }

    fn name(&self) -> &str {
        "offline"
    }
}
