//! Exchange-rate data: wire format, decoding, sources and storage

pub mod decoder;
pub mod dimensions;
pub mod fallback;
pub mod frequency;
pub mod sdmx;
pub mod sources;
pub mod store;

pub use decoder::{DatasetDecoder, DecodedDataset, SkippedSeries};
pub use fallback::{FallbackChain, FetchOutcome, Provenance};
pub use frequency::SeriesFrequency;
pub use sdmx::ExchangeRatesResponse;
pub use sources::{ExchangeRateSource, ObservationWindow, RateRequest};
pub use store::DatasetStore;
