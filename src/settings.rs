//! Persisted conversion settings
//!
//! The settings are loaded once at startup, changed by user actions and saved
//! after every change. Where they are kept is up to the [`SettingsStore`].

use crate::currency::{Currency, PIVOT_CURRENCY};
use crate::data::frequency::SeriesFrequency;
use crate::data::sources::{ObservationWindow, RateRequest};
use crate::error::{ExrError, Result};
use chrono::{Duration, NaiveDate, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Selection used the first time the application runs
pub const DEFAULT_SELECTION: [Currency; 7] = [
    Currency::NOK,
    Currency::SEK,
    Currency::DKK,
    Currency::ISK,
    Currency::GBP,
    Currency::EUR,
    Currency::USD,
];

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ExrError::ConfigError(format!(
                "Interval start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The week ending on `today`
    pub fn last_week(today: NaiveDate) -> Self {
        Self {
            start: today - Duration::weeks(1),
            end: today,
        }
    }

    pub fn window(&self) -> ObservationWindow {
        ObservationWindow::Interval {
            start: self.start,
            end: self.end,
        }
    }
}

impl Default for DateInterval {
    fn default() -> Self {
        Self::last_week(Utc::now().date_naive())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    #[serde(default)]
    pub frequency: SeriesFrequency,
    #[serde(default)]
    pub interval: DateInterval,
    /// Currencies shown, in display order, without duplicates
    #[serde(default)]
    pub selected_currencies: Vec<Currency>,
    /// Currencies missing from the last dataset
    #[serde(default)]
    pub excluded_currencies: Vec<Currency>,
    #[serde(default = "default_base")]
    pub base_currency: Currency,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_base() -> Currency {
    PIVOT_CURRENCY
}

fn default_multiplier() -> f64 {
    1.0
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            frequency: SeriesFrequency::default(),
            interval: DateInterval::default(),
            selected_currencies: Vec::new(),
            excluded_currencies: Vec::new(),
            base_currency: PIVOT_CURRENCY,
            multiplier: 1.0,
        }
    }
}

impl ConversionConfig {
    /// Defaults plus the first-run selection
    pub fn first_run() -> Self {
        Self {
            selected_currencies: DEFAULT_SELECTION.to_vec(),
            ..Self::default()
        }
    }

    /// Catalog currencies that are neither selected, excluded nor the base
    pub fn available_currencies(&self) -> Vec<Currency> {
        Currency::all()
            .iter()
            .copied()
            .filter(|c| {
                !self.excluded_currencies.contains(c)
                    && !self.selected_currencies.contains(c)
                    && *c != self.base_currency
            })
            .collect()
    }

    /// Selected currencies, plus the base when it is not the pivot and not selected
    pub fn required_currencies_for_request(&self, pivot: Currency) -> Vec<Currency> {
        let mut list = self.selected_currencies.clone();
        if self.base_currency != pivot && !list.contains(&self.base_currency) {
            list.push(self.base_currency);
        }
        list
    }

    pub fn required_currencies_for_presentation(&self, pivot: Currency) -> Vec<Currency> {
        self.required_currencies_for_request(pivot)
    }

    /// Request for the required currencies quoted in `pivot`; `None` asks for
    /// the latest observation only
    pub fn rate_request(&self, window: Option<ObservationWindow>, pivot: Currency) -> RateRequest {
        RateRequest::new(
            self.required_currencies_for_request(pivot),
            self.frequency,
            window.unwrap_or_default(),
        )
        .with_pivot(pivot)
    }

    pub fn set_base_currency(&mut self, currency: Currency) {
        self.base_currency = currency;
    }

    /// Replace the selection; later duplicates are dropped.
    pub fn update_selected_currencies(&mut self, currencies: Vec<Currency>) {
        let mut unique = Vec::with_capacity(currencies.len());
        for currency in currencies {
            if !unique.contains(&currency) {
                unique.push(currency);
            }
        }
        self.selected_currencies = unique;
    }

    pub fn set_multiplier(&mut self, multiplier: f64) -> Result<()> {
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(ExrError::ConfigError(format!(
                "Multiplier must be a non-negative number, got {}",
                multiplier
            )));
        }
        self.multiplier = multiplier;
        Ok(())
    }

    /// Record the currencies missing from the latest dataset, replacing any
    /// earlier exclusions. When the base is one of them it is reset to
    /// `pivot`; returns whether that happened.
    pub fn mark_excluded(&mut self, missing: &[Currency], pivot: Currency) -> bool {
        self.excluded_currencies = missing.to_vec();
        if missing.contains(&self.base_currency) {
            self.base_currency = pivot;
            return true;
        }
        false
    }
}

/// Configuration collaborator
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Option<ConversionConfig>>;
    fn save(&self, config: &ConversionConfig) -> Result<()>;
}

/// Saved settings, or the first-run defaults when there are none or they cannot be read
pub fn load_or_default<C: SettingsStore + ?Sized>(store: &C) -> ConversionConfig {
    match store.load() {
        Ok(Some(config)) => config,
        Ok(None) => {
            debug!("No saved settings, using first-run defaults");
            ConversionConfig::first_run()
        }
        Err(e) => {
            warn!("Could not load settings, using defaults: {}", e);
            ConversionConfig::first_run()
        }
    }
}

/// Settings kept for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    config: RwLock<Option<ConversionConfig>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ConversionConfig) -> Self {
        Self {
            config: RwLock::new(Some(config)),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Option<ConversionConfig>> {
        Ok(self
            .config
            .read()
            .map_err(|e| ExrError::Cache(format!("Lock error: {}", e)))?
            .clone())
    }

    fn save(&self, config: &ConversionConfig) -> Result<()> {
        *self
            .config
            .write()
            .map_err(|e| ExrError::Cache(format!("Lock error: {}", e)))? = Some(config.clone());
        Ok(())
    }
}

/// Settings stored as pretty-printed JSON
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn load(&self) -> Result<Option<ConversionConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&text).map_err(|e| {
            ExrError::ConfigError(format!("Invalid settings file {}: {}", self.path.display(), e))
        })?;
        Ok(Some(config))
    }

    fn save(&self, config: &ConversionConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(config)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
