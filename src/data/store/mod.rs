//! Storage for the last good dataset and for bundled fixtures
//!
//! Stores keep raw responses. They never decode or interpret what they hold.

pub mod file;
pub mod in_memory;

pub use file::FileDatasetStore;
pub use in_memory::InMemoryDatasetStore;

use crate::data::sdmx::ExchangeRatesResponse;
use crate::error::Result;
use crate::types::DEFAULT_FIXTURE;
use log::warn;

const EXR_ALL: &str = include_str!("fixtures/exr_all.json");

/// Cache/fixture collaborator of the fallback chain
pub trait DatasetStore: Send + Sync {
    /// The most recent dataset that decoded successfully, if any
    fn load_last_good(&self) -> Result<Option<ExchangeRatesResponse>>;

    fn save_last_good(&self, dataset: &ExchangeRatesResponse) -> Result<()>;

    /// A static dataset shipped with the application
    fn load_fixture(&self, name: &str) -> Option<ExchangeRatesResponse>;
}

/// Names of the fixtures compiled into the crate
pub fn bundled_fixture_names() -> &'static [&'static str] {
    &[DEFAULT_FIXTURE]
}

/// Parse a fixture compiled into the crate
pub fn bundled_fixture(name: &str) -> Option<ExchangeRatesResponse> {
    let text = match name {
        DEFAULT_FIXTURE => EXR_ALL,
        _ => return None,
    };
    match ExchangeRatesResponse::from_json(text) {
        Ok(response) => Some(response),
        Err(e) => {
            warn!("Bundled fixture {} is unreadable: {}", name, e);
            None
        }
    }
}
