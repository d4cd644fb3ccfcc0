//! Integration tests for the offline fallback chain and the conversion service

use rusty_exr::conversion::{ConversionService, ConversionSession, ViewState};
use rusty_exr::currency::Currency;
use rusty_exr::data::sdmx::ExchangeRatesResponse;
use rusty_exr::data::sources::{ExchangeRateSource, OfflineSource, RateRequest};
use rusty_exr::data::store::{bundled_fixture, DatasetStore, FileDatasetStore, InMemoryDatasetStore};
use rusty_exr::data::{FallbackChain, Provenance};
use rusty_exr::error::{ExrError, Result};
use rusty_exr::settings::{ConversionConfig, MemorySettingsStore, SettingsStore};
use rusty_exr::types::PipelineConfig;
use std::time::Duration;
use tempfile::TempDir;

/// Never resolves
struct PendingSource;

impl ExchangeRateSource for PendingSource {
    async fn fetch(&self, _request: &RateRequest) -> Result<ExchangeRatesResponse> {
        std::future::pending().await
    }

    fn name(&self) -> &str {
        "pending"
    }
}

struct FixedSource(ExchangeRatesResponse);

impl ExchangeRateSource for FixedSource {
    async fn fetch(&self, _request: &RateRequest) -> Result<ExchangeRatesResponse> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

fn cached_response() -> ExchangeRatesResponse {
    let mut response = bundled_fixture("exr_all").unwrap();
    response.meta.id = "CACHED".to_string();
    response
}

fn request() -> RateRequest {
    RateRequest::latest(vec![Currency::USD, Currency::EUR])
}

#[tokio::test]
async fn test_cached_wins_over_fixture() {
    let store = InMemoryDatasetStore::with_last_good(cached_response());
    assert!(store.load_fixture("exr_all").is_some());
    let chain = FallbackChain::new(OfflineSource::new(), store, &PipelineConfig::default());

    let outcome = chain.fetch(&request()).await.unwrap();
    assert_eq!(outcome.provenance, Provenance::Cached);
    assert!(outcome.provenance.message().contains("previous result"));
    assert!(!outcome.provenance.message().contains("packaged"));
}

#[tokio::test]
async fn test_fixture_when_nothing_cached() {
    let chain = FallbackChain::new(OfflineSource::new(), InMemoryDatasetStore::new(), &PipelineConfig::default());
    let outcome = chain.fetch(&request()).await.unwrap();
    assert_eq!(outcome.provenance, Provenance::Fixture);
    assert_eq!(outcome.dataset.series.len(), 8);
}

#[tokio::test]
async fn test_exhausted_lists_every_stage() {
    let chain = FallbackChain::new(
        OfflineSource::new(),
        InMemoryDatasetStore::without_fixtures(),
        &PipelineConfig::default(),
    );
    match chain.fetch(&request()).await {
        Err(ExrError::AllSourcesExhausted(reasons)) => assert_eq!(reasons.len(), 3),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_live_fetch_leaves_cache_untouched() {
    let dir = TempDir::new().unwrap();
    let store = FileDatasetStore::new(dir.path());
    store.save_last_good(&cached_response()).unwrap();
    let saved_at = store.last_saved_at().unwrap();

    let chain = FallbackChain::new(OfflineSource::new(), store, &PipelineConfig::default());
    let outcome = chain.fetch(&request()).await.unwrap();
    assert_eq!(outcome.provenance, Provenance::Cached);

    assert_eq!(chain.store().load_last_good().unwrap(), Some(cached_response()));
    assert_eq!(chain.store().last_saved_at().unwrap(), saved_at);
}

#[tokio::test]
async fn test_cancelled_fetch_leaves_cache_untouched() {
    let dir = TempDir::new().unwrap();
    let chain = FallbackChain::new(
        PendingSource,
        FileDatasetStore::new(dir.path()),
        &PipelineConfig::default(),
    );

    let result = tokio::time::timeout(Duration::from_millis(20), chain.fetch(&request())).await;
    assert!(result.is_err());
    assert!(chain.store().load_last_good().unwrap().is_none());
    assert!(!chain.store().last_good_path().exists());
}

#[tokio::test]
async fn test_live_result_becomes_the_offline_result() {
    let dir = TempDir::new().unwrap();
    let live = FallbackChain::new(
        FixedSource(cached_response()),
        FileDatasetStore::new(dir.path()),
        &PipelineConfig::default(),
    );
    assert_eq!(live.fetch(&request()).await.unwrap().provenance, Provenance::Live);

    let offline = FallbackChain::new(
        OfflineSource::new(),
        FileDatasetStore::new(dir.path()),
        &PipelineConfig::default(),
    );
    let outcome = offline.fetch(&request()).await.unwrap();
    assert_eq!(outcome.provenance, Provenance::Cached);
}

#[tokio::test]
async fn test_service_offline_refresh_uses_fixture() {
    let service = ConversionService::new(
        OfflineSource::new(),
        InMemoryDatasetStore::new(),
        MemorySettingsStore::new(),
        &PipelineConfig::default(),
    );
    let mut config = service.load_config();
    config.set_base_currency(Currency::USD);

    let result = service.refresh(&mut config).await.unwrap();
    assert_eq!(result.provenance, Provenance::Fixture);
    assert_eq!(result.provenance_message, Provenance::Fixture.message());
    assert!(result.series.iter().all(|s| s.base_currency == Currency::USD));
}

#[tokio::test]
async fn test_service_recovers_and_persists() {
    let service = ConversionService::new(
        OfflineSource::new(),
        InMemoryDatasetStore::new(),
        MemorySettingsStore::new(),
        &PipelineConfig::default(),
    );
    let mut config = ConversionConfig::first_run();
    config.set_base_currency(Currency::PLN);

    let result = service.refresh(&mut config).await.unwrap();
    assert_eq!(result.recovered_from, Some(Currency::PLN));
    assert_eq!(result.requested_base, Currency::NOK);

    let saved = service.settings().load().unwrap().unwrap();
    assert_eq!(saved.base_currency, Currency::NOK);
    assert!(saved.excluded_currencies.contains(&Currency::PLN));
}

#[tokio::test]
async fn test_session_discards_superseded_refresh() {
    let service = ConversionService::new(
        OfflineSource::new(),
        InMemoryDatasetStore::new(),
        MemorySettingsStore::new(),
        &PipelineConfig::default(),
    );
    let mut session = ConversionSession::new();
    let first = session.begin(true);
    assert_eq!(session.state(), &ViewState::Loading);
    let second = session.begin(false);

    let mut config = service.load_config();
    let newer = service.refresh(&mut config).await;
    assert!(session.finish(second, newer));
    let older = service.refresh(&mut config).await;
    assert!(!session.finish(first, older));

    assert!(matches!(session.state(), ViewState::Loaded(_)));
}
