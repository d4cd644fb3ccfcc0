//! Rate algebra: currency pairs, rebasing and presentation order
//!
//! ```
//! use rusty_exr::currency::Currency;
//! use rusty_exr::fx::{filter_series, sort_series, Rebaser};
//! # use rusty_exr::types::ExchangeSeries;
//! # fn rebase(series: Vec<ExchangeSeries>) -> rusty_exr::error::Result<Vec<ExchangeSeries>> {
//! let selected = [Currency::SEK, Currency::USD, Currency::NOK];
//! let mut rebased = Rebaser::default().rebase(filter_series(series, &selected), Currency::SEK, &selected)?;
//! sort_series(&mut rebased, &selected);
//! # Ok(rebased)
//! # }
//! ```

pub mod arrange;
pub mod pair;
pub mod rebase;

pub use arrange::{filter_series, sort_series};
pub use pair::CurrencyPair;
pub use rebase::Rebaser;
