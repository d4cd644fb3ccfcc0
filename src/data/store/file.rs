//! File-backed dataset store
//!
//! Layout under the store directory:
//! - `last_good.json`: the last good response plus when it was saved
//! - `fixtures/<name>.json`: optional fixtures that override the bundled ones

use super::{bundled_fixture, DatasetStore};
use crate::data::sdmx::ExchangeRatesResponse;
use crate::error::{ExrError, Result};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const LAST_GOOD_FILE: &str = "last_good.json";
const FIXTURE_DIR: &str = "fixtures";

#[derive(Debug, Serialize, Deserialize)]
struct LastGoodRecord {
    saved_at: DateTime<Utc>,
    response: ExchangeRatesResponse,
}

#[derive(Debug, Clone)]
pub struct FileDatasetStore {
    dir: PathBuf,
}

impl FileDatasetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn last_good_path(&self) -> PathBuf {
        self.dir.join(LAST_GOOD_FILE)
    }

    fn fixture_path(&self, name: &str) -> PathBuf {
        self.dir.join(FIXTURE_DIR).join(format!("{}.json", name))
    }

    /// When the last good dataset was saved, if there is one
    pub fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.read_record()?.map(|r| r.saved_at))
    }

    fn read_record(&self) -> Result<Option<LastGoodRecord>> {
        let path = self.last_good_path();
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        let record = serde_json::from_str(&text).map_err(|e| {
            ExrError::Cache(format!("Corrupt cache file {}: {}", path.display(), e))
        })?;
        Ok(Some(record))
    }
}

impl DatasetStore for FileDatasetStore {
    fn load_last_good(&self) -> Result<Option<ExchangeRatesResponse>> {
        Ok(self.read_record()?.map(|r| r.response))
    }

    /// Written to a temporary file first, then renamed over the old one.
    fn save_last_good(&self, dataset: &ExchangeRatesResponse) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            ExrError::Cache(format!("Failed to create directory {}: {}", self.dir.display(), e))
        })?;

        let record = LastGoodRecord {
            saved_at: Utc::now(),
            response: dataset.clone(),
        };
        let path = self.last_good_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(&record)?)?;
        fs::rename(&tmp, &path)?;
        debug!("Saved last good dataset to {}", path.display());
        Ok(())
    }

    fn load_fixture(&self, name: &str) -> Option<ExchangeRatesResponse> {
        let path = self.fixture_path(name);
        if path.exists() {
            match fs::read_to_string(&path)
                .map_err(ExrError::from)
                .and_then(|text| ExchangeRatesResponse::from_json(&text))
            {
                Ok(response) => return Some(response),
                Err(e) => warn!("Ignoring fixture {}: {}", path.display(), e),
            }
        }
        bundled_fixture(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> ExchangeRatesResponse {
        bundled_fixture("exr_all").unwrap()
    }

    #[test]
    fn test_missing_cache_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileDatasetStore::new(dir.path());
        assert!(store.load_last_good().unwrap().is_none());
        assert!(store.last_saved_at().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = FileDatasetStore::new(dir.path().join("nested"));
        store.save_last_good(&fixture()).unwrap();

        assert!(store.last_good_path().exists());
        assert!(!store.last_good_path().with_extension("json.tmp").exists());
        assert_eq!(store.load_last_good().unwrap(), Some(fixture()));
        assert!(store.last_saved_at().unwrap().is_some());
    }

    #[test]
    fn test_corrupt_cache_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = FileDatasetStore::new(dir.path());
        fs::write(store.last_good_path(), "{not json").unwrap();
        assert!(matches!(store.load_last_good(), Err(ExrError::Cache(_))));
    }

    #[test]
    fn test_fixture_override_and_bundled() {
        let dir = TempDir::new().unwrap();
        let store = FileDatasetStore::new(dir.path());
        assert!(store.load_fixture("exr_all").is_some());
        assert!(store.load_fixture("custom").is_none());

        let mut custom = fixture();
        custom.meta.id = "CUSTOM".to_string();
        fs::create_dir_all(dir.path().join("fixtures")).unwrap();
        fs::write(dir.path().join("fixtures/custom.json"), custom.to_json().unwrap()).unwrap();
        assert_eq!(store.load_fixture("custom").unwrap().meta.id, "CUSTOM");
    }
}
