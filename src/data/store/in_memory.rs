//! In-memory dataset store
//!
//! Holds the last good dataset for the lifetime of the process. Extra fixtures
//! can be registered by name; the bundled ones are served unless disabled.

use super::{bundled_fixture, DatasetStore};
use crate::data::sdmx::ExchangeRatesResponse;
use crate::error::{ExrError, Result};
use hashbrown::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
pub struct InMemoryDatasetStore {
    last_good: Arc<RwLock<Option<ExchangeRatesResponse>>>,
    fixtures: Arc<RwLock<HashMap<String, ExchangeRatesResponse>>>,
    serve_bundled: bool,
}

impl InMemoryDatasetStore {
    pub fn new() -> Self {
        Self {
            last_good: Arc::new(RwLock::new(None)),
            fixtures: Arc::new(RwLock::new(HashMap::new())),
            serve_bundled: true,
        }
    }

    /// A store that knows no fixtures at all
    pub fn without_fixtures() -> Self {
        Self {
            serve_bundled: false,
            ..Self::new()
        }
    }

    /// Start with a last good dataset already in place
    pub fn with_last_good(dataset: ExchangeRatesResponse) -> Self {
        let store = Self::new();
        if let Ok(mut slot) = store.last_good.write() {
            *slot = Some(dataset);
        }
        store
    }

    /// Register or replace a fixture
    pub fn insert_fixture(&self, name: impl Into<String>, dataset: ExchangeRatesResponse) -> Result<()> {
        self.fixtures
            .write()
            .map_err(|e| ExrError::Cache(format!("Lock error: {}", e)))?
            .insert(name.into(), dataset);
        Ok(())
    }

    pub fn clear_last_good(&self) -> Result<()> {
        *self
            .last_good
            .write()
            .map_err(|e| ExrError::Cache(format!("Lock error: {}", e)))? = None;
        Ok(())
    }
}

impl Default for InMemoryDatasetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetStore for InMemoryDatasetStore {
    fn load_last_good(&self) -> Result<Option<ExchangeRatesResponse>> {
        Ok(self
            .last_good
            .read()
            .map_err(|e| ExrError::Cache(format!("Lock error: {}", e)))?
            .clone())
    }

    fn save_last_good(&self, dataset: &ExchangeRatesResponse) -> Result<()> {
        *self
            .last_good
            .write()
            .map_err(|e| ExrError::Cache(format!("Lock error: {}", e)))? = Some(dataset.clone());
        Ok(())
    }

    fn load_fixture(&self, name: &str) -> Option<ExchangeRatesResponse> {
        let registered = self
            .fixtures
            .read()
            .ok()
            .and_then(|fixtures| fixtures.get(name).cloned());
        match registered {
            Some(dataset) => Some(dataset),
            None if self.serve_bundled => bundled_fixture(name),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> ExchangeRatesResponse {
        bundled_fixture("exr_all").unwrap()
    }

    #[test]
    fn test_last_good_round_trip() {
        let store = InMemoryDatasetStore::new();
        assert!(store.load_last_good().unwrap().is_none());

        store.save_last_good(&fixture()).unwrap();
        assert_eq!(store.load_last_good().unwrap(), Some(fixture()));

        store.clear_last_good().unwrap();
        assert!(store.load_last_good().unwrap().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let store = InMemoryDatasetStore::new();
        let other = store.clone();
        store.save_last_good(&fixture()).unwrap();
        assert!(other.load_last_good().unwrap().is_some());
    }

    #[test]
    fn test_fixtures() {
        let store = InMemoryDatasetStore::new();
        assert!(store.load_fixture("exr_all").is_some());
        assert!(store.load_fixture("custom").is_none());

        store.insert_fixture("custom", fixture()).unwrap();
        assert!(store.load_fixture("custom").is_some());

        let bare = InMemoryDatasetStore::without_fixtures();
        assert!(bare.load_fixture("exr_all").is_none());
    }

    #[test]
    fn test_with_last_good() {
        let store = InMemoryDatasetStore::with_last_good(fixture());
        assert!(store.load_last_good().unwrap().is_some());
    }
}
