//! Core types and constants

use crate::currency::{Currency, PIVOT_CURRENCY};
use crate::data::frequency::SeriesFrequency;
use crate::decimal::RoundingMode;
use crate::fx::pair::CurrencyPair;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp type used throughout the library
pub type Timestamp = DateTime<Utc>;

/// Exchange rate: 1 unit of base equals `Rate` units of quote
pub type Rate = f64;

/// Tenor code of spot rates
pub const SPOT_TENOR: &str = "SP";

/// Name of the bundled fixture dataset
pub const DEFAULT_FIXTURE: &str = "exr_all";

/// Explicit settings for the decode / rebase pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// The currency every decoded series is quoted against
    pub pivot: Currency,
    /// Series with any other tenor are dropped by the decoder
    pub expected_tenor: String,
    /// Fractional digits of cross-rate display values
    pub cross_rate_scale: u32,
    pub rounding: RoundingMode,
    pub fixture_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pivot: PIVOT_CURRENCY,
            expected_tenor: SPOT_TENOR.to_string(),
            cross_rate_scale: 4,
            rounding: RoundingMode::HalfUp,
            fixture_name: DEFAULT_FIXTURE.to_string(),
        }
    }
}

/// One dated rate of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Index into the observation (time) dimension of the source dataset
    pub index: usize,
    pub value: Rate,
    /// `value` rounded for display, `"N/A"` when the source value was not a number
    pub display_value: String,
    /// Period key as published, e.g. `2023-06-01`, `2023-06` or `2023`
    pub period_key: String,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
}

/// A time series of rates for one currency pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeSeries {
    pub id: usize,
    pub frequency: SeriesFrequency,
    pub base_currency: Currency,
    pub base_unit: f64,
    pub quote_currency: Currency,
    pub observations: Vec<Observation>,
    /// Fractional digits used for `display_value`
    pub decimals: u32,
    /// Collection code, e.g. `C` for 14:15 CET rates
    pub collection: String,
}

impl ExchangeSeries {
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.base_currency, self.quote_currency)
    }

    pub fn first_observation(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last_observation(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Smallest finite value, `None` when there is none
    pub fn min_value(&self) -> Option<Rate> {
        self.finite_values().reduce(f64::min)
    }

    /// Largest finite value, `None` when there is none
    pub fn max_value(&self) -> Option<Rate> {
        self.finite_values().reduce(f64::max)
    }

    /// Observation for a period key
    pub fn observation_at(&self, period_key: &str) -> Option<&Observation> {
        self.observations.iter().find(|o| o.period_key == period_key)
    }

    fn finite_values(&self) -> impl Iterator<Item = Rate> + '_ {
        self.observations.iter().map(|o| o.value).filter(|v| v.is_finite())
    }
}
