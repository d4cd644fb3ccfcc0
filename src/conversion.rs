//! Conversion pipeline and service
//!
//! [`prepare`] is the single pure pipeline from a decoded dataset to
//! presentation-ready series: missing-currency detection, filter, rebase and
//! sort. [`ConversionService`] wraps it with the fallback chain, persisted
//! settings and recovery from a base currency the dataset cannot serve.

use crate::currency::Currency;
use crate::data::decoder::DecodedDataset;
use crate::data::fallback::{FallbackChain, FetchOutcome, Provenance};
use crate::data::sources::{ExchangeRateSource, ObservationWindow};
use crate::data::store::DatasetStore;
use crate::error::{ExrError, Result};
use crate::fx::{filter_series, sort_series, Rebaser};
use crate::settings::{ConversionConfig, SettingsStore, DEFAULT_SELECTION};
use crate::types::{ExchangeSeries, PipelineConfig, Timestamp};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// Rates ready for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub requested_base: Currency,
    /// Every series has `base_currency == requested_base`
    pub series: Vec<ExchangeSeries>,
    pub prepared_at: Timestamp,
    pub provenance: Provenance,
    pub provenance_message: String,
    /// Requested currencies the dataset had no series for
    pub missing_currencies: BTreeSet<Currency>,
    /// Amount of the base currency being converted, when tracked
    pub multiplier: Option<f64>,
    /// Base currency that had to be given up for the pivot
    pub recovered_from: Option<Currency>,
}

impl ConversionResult {
    fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self.provenance_message = provenance.message().to_string();
        self
    }

    /// `rate` applied to the tracked multiplier (1 when untracked)
    pub fn convert(&self, rate: f64) -> f64 {
        rate * self.multiplier.unwrap_or(1.0)
    }

    pub fn series_for(&self, quote: Currency) -> Option<&ExchangeSeries> {
        self.series.iter().find(|s| s.quote_currency == quote)
    }

    pub fn quote_currencies(&self) -> Vec<Currency> {
        self.series.iter().map(|s| s.quote_currency).collect()
    }
}

/// Requested currencies other than the pivot that have no decoded series
pub fn missing_currencies(
    dataset: &DecodedDataset,
    config: &ConversionConfig,
    pivot: Currency,
) -> BTreeSet<Currency> {
    config
        .required_currencies_for_request(pivot)
        .into_iter()
        .filter(|c| *c != pivot && !dataset.contains_base(*c))
        .collect()
}

/// Turn a decoded dataset into rates from `config.base_currency`.
///
/// Fails with [`ExrError::MissingSeriesData`] when the base currency is not
/// the pivot and the dataset has no series for it.
pub fn prepare(
    dataset: &DecodedDataset,
    config: &ConversionConfig,
    pivot: Currency,
    rebaser: &Rebaser,
    track_multiplier: bool,
) -> Result<ConversionResult> {
    let missing = missing_currencies(dataset, config, pivot);
    if !missing.is_empty() {
        debug!("Dataset is missing {:?}", missing);
    }

    let included = config.required_currencies_for_presentation(pivot);
    let filtered = filter_series(dataset.series.clone(), &included);
    let mut series = rebaser.rebase(filtered, config.base_currency, &config.selected_currencies)?;
    sort_series(&mut series, &config.selected_currencies);

    Ok(ConversionResult {
        requested_base: config.base_currency,
        series,
        prepared_at: dataset.prepared_at,
        provenance: Provenance::Live,
        provenance_message: String::new(),
        missing_currencies: missing,
        multiplier: track_multiplier.then_some(config.multiplier),
        recovered_from: None,
    })
}

/// Fetch, persist and prepare, recovering once from an unusable base currency
pub struct ConversionService<S, D, C> {
    chain: FallbackChain<S, D>,
    settings: C,
    rebaser: Rebaser,
    pivot: Currency,
    window: Option<ObservationWindow>,
    track_multiplier: bool,
}

impl<S, D, C> ConversionService<S, D, C>
where
    S: ExchangeRateSource,
    D: DatasetStore,
    C: SettingsStore,
{
    pub fn new(source: S, store: D, settings: C, config: &PipelineConfig) -> Self {
        Self {
            chain: FallbackChain::new(source, store, config),
            settings,
            rebaser: Rebaser::new(config),
            pivot: config.pivot,
            window: None,
            track_multiplier: true,
        }
    }

    /// Request this window instead of the latest observation
    pub fn with_window(mut self, window: ObservationWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_multiplier_tracking(mut self, track: bool) -> Self {
        self.track_multiplier = track;
        self
    }

    pub fn chain(&self) -> &FallbackChain<S, D> {
        &self.chain
    }

    pub fn settings(&self) -> &C {
        &self.settings
    }

    /// Saved settings or first-run defaults
    pub fn load_config(&self) -> ConversionConfig {
        crate::settings::load_or_default(&self.settings)
    }

    /// Fetch through the fallback chain and prepare rates for `config`.
    ///
    /// `config` is updated and persisted when currencies turn out to be
    /// missing or the base currency has to fall back to the pivot.
    pub async fn refresh(&self, config: &mut ConversionConfig) -> Result<ConversionResult> {
        if config.selected_currencies.is_empty() {
            config.update_selected_currencies(DEFAULT_SELECTION.to_vec());
        }
        let request = config.rate_request(self.window, self.pivot);
        let outcome = self.chain.fetch(&request).await?;
        self.apply(outcome, config)
    }

    /// Run the pipeline over an already fetched dataset.
    ///
    /// Exclusions always follow this dataset, so a currency that comes back
    /// becomes selectable again.
    pub fn apply(&self, outcome: FetchOutcome, config: &mut ConversionConfig) -> Result<ConversionResult> {
        let requested_base = config.base_currency;
        let mut missing = missing_currencies(&outcome.dataset, config, self.pivot);
        let mut recovered_from = None;
        let excluded: Vec<Currency> = missing.iter().copied().collect();
        if config.excluded_currencies != excluded {
            if config.mark_excluded(&excluded, self.pivot) {
                warn!(
                    "No {} series in dataset, base currency reset to {}",
                    requested_base, self.pivot
                );
                recovered_from = Some(requested_base);
            }
            self.persist(config);
        }

        let result = match self.run(&outcome.dataset, config) {
            Err(ExrError::MissingSeriesData(currency)) if currency != self.pivot => {
                warn!(
                    "Cannot rebase onto {}, falling back to {}",
                    currency, self.pivot
                );
                config.set_base_currency(self.pivot);
                if !config.excluded_currencies.contains(&currency) {
                    config.excluded_currencies.push(currency);
                }
                self.persist(config);
                missing.insert(currency);
                recovered_from = Some(currency);
                self.run(&outcome.dataset, config)?
            }
            other => other?,
        };

        if outcome.provenance != Provenance::Live {
            info!("Showing {} data", outcome.provenance);
        }
        // prepare saw the reset config, so report what this dataset lacked
        missing.extend(result.missing_currencies.iter().copied());
        Ok(ConversionResult {
            recovered_from,
            missing_currencies: missing,
            ..result.with_provenance(outcome.provenance)
        })
    }

    fn run(&self, dataset: &DecodedDataset, config: &ConversionConfig) -> Result<ConversionResult> {
        prepare(dataset, config, self.pivot, &self.rebaser, self.track_multiplier)
    }

    fn persist(&self, config: &ConversionConfig) {
        if let Err(e) = self.settings.save(config) {
            warn!("Could not save settings: {}", e);
        }
    }
}

/// Identifies one request in a [`RequestGuard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

/// Lets only the most recently started request apply its result
#[derive(Debug, Default)]
pub struct RequestGuard {
    generation: AtomicU64,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding every earlier one
    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }
}

/// What the presentation layer shows
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Initial,
    Loading,
    Loaded(ConversionResult),
    Failed { message: String },
}

/// User-facing text for a failed refresh
pub fn failure_message(error: &ExrError) -> String {
    if error.is_terminal() {
        "Please try again later.".to_string()
    } else {
        format!("{}.\nPlease try again later.", error)
    }
}

/// View state plus supersession of overlapping refreshes
#[derive(Debug, Default)]
pub struct ConversionSession {
    guard: RequestGuard,
    state: ViewState,
}

impl ConversionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Start a refresh. With `show_loading` the state switches to `Loading`,
    /// otherwise the current rates stay visible until the result arrives.
    pub fn begin(&mut self, show_loading: bool) -> RequestTicket {
        if show_loading {
            self.state = ViewState::Loading;
        }
        self.guard.begin()
    }

    /// Apply a finished refresh; results of superseded requests are dropped.
    /// Returns whether the state changed.
    pub fn finish(&mut self, ticket: RequestTicket, result: Result<ConversionResult>) -> bool {
        if !self.guard.is_current(ticket) {
            debug!("Discarding result of superseded request {:?}", ticket);
            return false;
        }
        self.state = match result {
            Ok(result) => ViewState::Loaded(result),
            Err(e) => ViewState::Failed {
                message: failure_message(&e),
            },
        };
        true
    }
}
