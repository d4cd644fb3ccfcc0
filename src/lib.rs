//! # rusty_exr
//!
//! Exchange rates from Norges Bank's SDMX-JSON data API, rebased onto any
//! published currency.
//!
//! Every series the bank publishes is quoted against NOK. A dataset is decoded
//! into [`types::ExchangeSeries`], then rebased: with NOK as the base each rate
//! is inverted, with any other base `C` every rate becomes a cross rate
//! `C/D = (NOK per C) / (NOK per D)`. When the network is unavailable the last
//! good dataset, then a packaged sample, is used instead.
//!
//! ## Example
//!
//! ```rust
//! use rusty_exr::prelude::*;
//!
//! let response = bundled_fixture("exr_all").unwrap();
//! let dataset = DatasetDecoder::default().decode(&response).unwrap();
//!
//! let mut config = ConversionConfig::first_run();
//! config.set_base_currency(Currency::EUR);
//! let result = prepare(&dataset, &config, PIVOT_CURRENCY, &Rebaser::default(), false).unwrap();
//!
//! assert!(result.series.iter().all(|s| s.base_currency == Currency::EUR));
//! ```

pub mod amount_input;
pub mod conversion;
pub mod currency;
pub mod data;
pub mod decimal;
pub mod error;
pub mod export;
pub mod fx;
pub mod settings;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::amount_input::{sanitize, AmountFormat, AmountInput};
    pub use crate::conversion::{prepare, ConversionResult, ConversionService, ConversionSession, ViewState};
    pub use crate::currency::{Currency, PIVOT_CURRENCY};
    pub use crate::data::store::{bundled_fixture, DatasetStore, FileDatasetStore, InMemoryDatasetStore};
    pub use crate::data::{
        DatasetDecoder, DecodedDataset, ExchangeRateSource, FallbackChain, ObservationWindow, Provenance,
        RateRequest, SeriesFrequency,
    };
    pub use crate::decimal::{NumberLocale, RoundingMode};
    pub use crate::error::{ExrError, Result};
    pub use crate::fx::{CurrencyPair, Rebaser};
    pub use crate::settings::{ConversionConfig, SettingsStore};
    pub use crate::types::*;
}
