//! Exchange-rate data sources
//!
//! - [`OfflineSource`]: never reaches the network, for `--offline` runs and tests
//! - [`NorgesBankSource`]: the Norges Bank SDMX REST API (feature `async`)

pub mod offline;
#[cfg(feature = "async")]
pub mod norges_bank;

pub use offline::OfflineSource;
#[cfg(feature = "async")]
pub use norges_bank::NorgesBankSource;

use super::frequency::SeriesFrequency;
use super::sdmx::ExchangeRatesResponse;
use crate::currency::{Currency, PIVOT_CURRENCY};
use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which observations of each series to request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservationWindow {
    /// Every observation between two dates, inclusive
    Interval { start: NaiveDate, end: NaiveDate },
    /// The latest `n` observations of each series
    LastN(u32),
}

impl Default for ObservationWindow {
    fn default() -> Self {
        ObservationWindow::LastN(1)
    }
}

/// Response language of descriptive fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApiLocale {
    English,
    #[default]
    Norwegian,
}

impl ApiLocale {
    pub fn code(&self) -> &'static str {
        match self {
            ApiLocale::English => "en",
            ApiLocale::Norwegian => "no",
        }
    }
}

/// One request for the `EXR` dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRequest {
    /// Base currencies to fetch; empty fetches every currency
    pub currencies: Vec<Currency>,
    pub frequency: SeriesFrequency,
    pub window: ObservationWindow,
    pub locale: ApiLocale,
    /// Quote currency of every requested series
    #[serde(default = "default_pivot")]
    pub pivot: Currency,
}

fn default_pivot() -> Currency {
    PIVOT_CURRENCY
}

impl RateRequest {
    pub fn new(currencies: Vec<Currency>, frequency: SeriesFrequency, window: ObservationWindow) -> Self {
        Self {
            currencies,
            frequency,
            window,
            locale: ApiLocale::default(),
            pivot: PIVOT_CURRENCY,
        }
    }

    /// Quote the requested series in `pivot` instead of NOK
    pub fn with_pivot(mut self, pivot: Currency) -> Self {
        self.pivot = pivot;
        self
    }

    /// Latest observation of each listed currency
    pub fn latest(currencies: Vec<Currency>) -> Self {
        Self::new(currencies, SeriesFrequency::Business, ObservationWindow::LastN(1))
    }

    /// Resource path, e.g. `/api/data/EXR/B.USD+SEK.NOK.SP`
    pub fn path(&self) -> String {
        let codes: Vec<&str> = self
            .currencies
            .iter()
            .filter(|c| **c != self.pivot)
            .map(|c| c.code())
            .collect();
        format!(
            "/api/data/EXR/{}.{}.{}.SP",
            self.frequency.code(),
            codes.join("+"),
            self.pivot.code()
        )
    }

    /// Query parameters in request order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("format", "sdmx-json".to_string())];
        match self.window {
            ObservationWindow::Interval { start, end } => {
                pairs.push(("startPeriod", self.frequency.format_date(start)));
                pairs.push(("endPeriod", self.frequency.format_date(end)));
            }
            ObservationWindow::LastN(n) => pairs.push(("lastNObservations", n.to_string())),
        }
        pairs.push(("locale", self.locale.code().to_string()));
        pairs
    }
}

impl fmt::Display for RateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query: Vec<String> = self
            .query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{}?{}", self.path(), query.join("&"))
    }
}

/// Fetch collaborator: produces a raw dataset or fails.
///
/// Transport and retry concerns stay behind this trait; callers only see
/// success or failure.
pub trait ExchangeRateSource: Send + Sync {
    fn fetch(
        &self,
        request: &RateRequest,
    ) -> impl std::future::Future<Output = Result<ExchangeRatesResponse>> + Send;

    /// Get the source name
    fn name(&self) -> &str;
}
