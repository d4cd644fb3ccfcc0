//! Restrict series to a currency set and order them for presentation

use crate::currency::Currency;
use crate::types::ExchangeSeries;

/// Keep series whose base currency is in `included`, preserving order.
pub fn filter_series(series: Vec<ExchangeSeries>, included: &[Currency]) -> Vec<ExchangeSeries> {
    series
        .into_iter()
        .filter(|s| included.contains(&s.base_currency))
        .collect()
}

/// Stable sort by the position of each quote currency in `priority`.
/// Currencies missing from `priority` go last in their current order.
pub fn sort_series(series: &mut [ExchangeSeries], priority: &[Currency]) {
    series.sort_by_key(|s| {
        priority
            .iter()
            .position(|c| *c == s.quote_currency)
            .unwrap_or(usize::MAX)
    });
}
