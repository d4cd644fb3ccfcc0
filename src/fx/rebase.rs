//! Base-currency rebasing
//!
//! Decoded series are all `X -> pivot` (1 X = v pivot). The rebaser turns them
//! into series quoted from a requested base currency: a plain inversion when the
//! base is the pivot, a two-hop cross rate through the pivot otherwise.

use super::pair::CurrencyPair;
use crate::currency::Currency;
use crate::decimal::{format_scaled, RoundingMode};
use crate::error::{ExrError, Result};
use crate::types::{ExchangeSeries, Observation, PipelineConfig, Rate};
use hashbrown::HashMap;
use log::{debug, warn};

#[derive(Debug, Clone)]
pub struct Rebaser {
    pub pivot: Currency,
    /// Fractional digits of cross-rate display values
    pub cross_rate_scale: u32,
    pub rounding: RoundingMode,
}

impl Rebaser {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            pivot: config.pivot,
            cross_rate_scale: config.cross_rate_scale,
            rounding: config.rounding,
        }
    }

    /// Re-express `series` from `base`.
    ///
    /// `outputs` are the currencies the caller will present; when the pivot is
    /// among them, the `base -> pivot` series is kept at the end of the result.
    /// Fails with [`ExrError::MissingSeriesData`] when `base` is not the pivot
    /// and no `base -> pivot` series exists.
    pub fn rebase(
        &self,
        series: Vec<ExchangeSeries>,
        base: Currency,
        outputs: &[Currency],
    ) -> Result<Vec<ExchangeSeries>> {
        let series: Vec<ExchangeSeries> = series
            .into_iter()
            .filter(|s| {
                let quoted = s.quote_currency == self.pivot;
                if !quoted {
                    warn!("Ignoring series {} not quoted in {}", s.pair(), self.pivot);
                }
                quoted
            })
            .collect();

        if base == self.pivot {
            return Ok(series.iter().filter_map(|s| self.invert_series(s)).collect());
        }

        let mut remaining = series;
        let position = remaining
            .iter()
            .position(|s| s.base_currency == base)
            .ok_or(ExrError::MissingSeriesData(base))?;
        let pivot_rate = remaining.remove(position);

        let mut rebased: Vec<ExchangeSeries> = {
            let pivot_values: HashMap<&str, Rate> = pivot_rate
                .observations
                .iter()
                .map(|o| (o.period_key.as_str(), o.value))
                .collect();
            remaining
                .iter()
                .filter_map(|s| self.cross_series(&pivot_rate, &pivot_values, s))
                .collect()
        };

        if outputs.contains(&self.pivot) {
            debug!("Keeping {} alongside cross rates", pivot_rate.pair());
            rebased.push(pivot_rate);
        }
        Ok(rebased)
    }

    /// Invert every observation and swap base and quote.
    ///
    /// Display values keep the series' own `decimals`. Observations that cannot
    /// be inverted are dropped; `None` when none remain.
    pub fn invert_series(&self, series: &ExchangeSeries) -> Option<ExchangeSeries> {
        let pair = series.pair().inverse();
        let observations: Vec<Observation> = series
            .observations
            .iter()
            .filter_map(|o| {
                let inverted = CurrencyPair::invert_rate(o.value)
                    .map(|v| v * series.base_unit)
                    .and_then(|v| self.observation(o, v, series.decimals));
                match inverted {
                    Ok(observation) => Some(observation),
                    Err(e) => {
                        warn!("{} {}: {}", pair, o.period_key, e);
                        None
                    }
                }
            })
            .collect();

        if observations.is_empty() {
            warn!("Dropping {}: no invertible observations", pair);
            return None;
        }

        Some(ExchangeSeries {
            id: series.id,
            frequency: series.frequency,
            base_currency: pair.base,
            base_unit: 1.0,
            quote_currency: pair.quote,
            observations,
            decimals: series.decimals,
            collection: series.collection.clone(),
        })
    }

    /// `C -> D` from `C -> pivot` and `D -> pivot`, matched on period key.
    fn cross_series(
        &self,
        pivot_rate: &ExchangeSeries,
        pivot_values: &HashMap<&str, Rate>,
        series: &ExchangeSeries,
    ) -> Option<ExchangeSeries> {
        let pair = CurrencyPair::new(pivot_rate.base_currency, series.base_currency);
        let observations: Vec<Observation> = series
            .observations
            .iter()
            .filter_map(|o| {
                let Some(base_value) = pivot_values.get(o.period_key.as_str()) else {
                    warn!(
                        "{} {}: no {} rate for this period",
                        pair, o.period_key, pivot_rate.base_currency
                    );
                    return None;
                };
                let crossed = CurrencyPair::cross_rate(*base_value, o.value)
                    .and_then(|v| self.observation(o, v, self.cross_rate_scale));
                match crossed {
                    Ok(observation) => Some(observation),
                    Err(e) => {
                        warn!("{} {}: {}", pair, o.period_key, e);
                        None
                    }
                }
            })
            .collect();

        if observations.is_empty() {
            warn!("Dropping {}: no matching observations", pair);
            return None;
        }

        Some(ExchangeSeries {
            id: series.id,
            frequency: series.frequency,
            base_currency: pair.base,
            base_unit: 1.0,
            quote_currency: pair.quote,
            observations,
            decimals: self.cross_rate_scale,
            collection: series.collection.clone(),
        })
    }

    fn observation(&self, source: &Observation, value: Rate, scale: u32) -> Result<Observation> {
        let display_value = format_scaled(value, scale, self.rounding)
            .ok_or_else(|| ExrError::InvalidData(format!("Cannot format rate {}", value)))?;
        Ok(Observation {
            value,
            display_value,
            ..source.clone()
        })
    }
}

impl Default for Rebaser {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}
