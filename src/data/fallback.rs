//! Offline fallback chain: live fetch, then last good dataset, then fixture
//!
//! The first stage that yields a dataset with at least one decoded series wins.
//! A live dataset is saved as last good only after it decodes successfully, and
//! only once the fetch has completed, so dropping the future mid-request leaves
//! the cache untouched.

use super::decoder::{DatasetDecoder, DecodedDataset};
use super::sdmx::ExchangeRatesResponse;
use super::sources::{ExchangeRateSource, RateRequest};
use super::store::DatasetStore;
use crate::error::{ExrError, Result};
use crate::types::PipelineConfig;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a dataset came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    Live,
    Cached,
    Fixture,
}

impl Provenance {
    /// Notice shown next to the rates; empty for live data
    pub fn message(&self) -> &'static str {
        match self {
            Provenance::Live => "",
            Provenance::Cached => "offline, showing previous result",
            Provenance::Fixture => "offline — no previous result — showing packaged sample data",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Live => "live",
            Provenance::Cached => "cached",
            Provenance::Fixture => "fixture",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decoded dataset and its origin
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub dataset: DecodedDataset,
    pub provenance: Provenance,
}

pub struct FallbackChain<S, D> {
    source: S,
    store: D,
    decoder: DatasetDecoder,
    fixture_name: String,
}

impl<S: ExchangeRateSource, D: DatasetStore> FallbackChain<S, D> {
    pub fn new(source: S, store: D, config: &PipelineConfig) -> Self {
        Self {
            source,
            store,
            decoder: DatasetDecoder::new(config),
            fixture_name: config.fixture_name.clone(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    /// Run the chain for one request.
    ///
    /// Fails with [`ExrError::AllSourcesExhausted`] listing why each stage fell
    /// through; never returns an empty dataset.
    pub async fn fetch(&self, request: &RateRequest) -> Result<FetchOutcome> {
        let mut failures = Vec::with_capacity(3);

        match self.live(request).await {
            Ok(dataset) => return Ok(self.outcome(dataset, Provenance::Live)),
            Err(e) => {
                warn!("Live fetch from {} failed: {}", self.source.name(), e);
                failures.push(format!("live ({}): {}", self.source.name(), e));
            }
        }

        match self.store.load_last_good() {
            Ok(Some(response)) => match self.decode_non_empty(&response) {
                Ok(dataset) => return Ok(self.outcome(dataset, Provenance::Cached)),
                Err(e) => failures.push(format!("cached: {}", e)),
            },
            Ok(None) => failures.push("cached: no previous result".to_string()),
            Err(e) => failures.push(format!("cached: {}", e)),
        }

        match self.store.load_fixture(&self.fixture_name) {
            Some(response) => match self.decode_non_empty(&response) {
                Ok(dataset) => return Ok(self.outcome(dataset, Provenance::Fixture)),
                Err(e) => failures.push(format!("fixture {}: {}", self.fixture_name, e)),
            },
            None => failures.push(format!("fixture {}: not available", self.fixture_name)),
        }

        warn!("All data sources exhausted");
        Err(ExrError::AllSourcesExhausted(failures))
    }

    async fn live(&self, request: &RateRequest) -> Result<DecodedDataset> {
        let response = self.source.fetch(request).await?;
        let dataset = self.decode_non_empty(&response)?;
        if let Err(e) = self.store.save_last_good(&response) {
            warn!("Could not save last good dataset: {}", e);
        }
        Ok(dataset)
    }

    fn decode_non_empty(&self, response: &ExchangeRatesResponse) -> Result<DecodedDataset> {
        let dataset = self.decoder.decode(response)?;
        if dataset.is_empty() {
            return Err(ExrError::DecodeStructure(format!(
                "no usable series ({} skipped)",
                dataset.skipped.len()
            )));
        }
        Ok(dataset)
    }

    fn outcome(&self, dataset: DecodedDataset, provenance: Provenance) -> FetchOutcome {
        if provenance != Provenance::Live {
            info!("Using {} data: {}", provenance, provenance.message());
        }
        FetchOutcome { dataset, provenance }
    }
}
