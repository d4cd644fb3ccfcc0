//! Dataset decoder: SDMX-JSON response -> flat list of pivot-quoted series
//!
//! Decoding is total over individual series. A malformed series is skipped and
//! recorded in [`DecodedDataset::skipped`]; only a response without a data set
//! or without a time dimension fails as a whole.

use super::dimensions::{AttributeId, DimensionTable, SeriesDimensionId};
use super::frequency::SeriesFrequency;
use super::sdmx::{ExchangeRatesResponse, RawSeries};
use crate::currency::Currency;
use crate::decimal::{format_scaled, RoundingMode};
use crate::error::{ExrError, Result};
use crate::types::{ExchangeSeries, Observation, PipelineConfig, Timestamp};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Display value of an observation whose source value is not a number
pub const NOT_AVAILABLE: &str = "N/A";

/// A raw series the decoder did not accept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSeries {
    pub key: String,
    pub reason: String,
}

impl From<SkippedSeries> for ExrError {
    fn from(skipped: SkippedSeries) -> Self {
        ExrError::SeriesSkipped {
            key: skipped.key,
            reason: skipped.reason,
        }
    }
}

/// Output of one decode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedDataset {
    pub prepared_at: Timestamp,
    pub series: Vec<ExchangeSeries>,
    pub skipped: Vec<SkippedSeries>,
}

impl DecodedDataset {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Currencies that have a decoded series, in series order
    pub fn base_currencies(&self) -> Vec<Currency> {
        self.series.iter().map(|s| s.base_currency).collect()
    }

    pub fn contains_base(&self, currency: Currency) -> bool {
        self.series.iter().any(|s| s.base_currency == currency)
    }
}

/// Decodes responses of the `EXR` dataset
#[derive(Debug, Clone)]
pub struct DatasetDecoder {
    expected_tenor: String,
    rounding: RoundingMode,
}

impl DatasetDecoder {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            expected_tenor: config.expected_tenor.clone(),
            rounding: config.rounding,
        }
    }

    /// Decode every series of the first data set.
    pub fn decode(&self, response: &ExchangeRatesResponse) -> Result<DecodedDataset> {
        let data_set = response
            .data
            .data_sets
            .first()
            .ok_or_else(|| ExrError::DecodeStructure("response has no data set".to_string()))?;
        let table = DimensionTable::from_structure(&response.data.structure)?;

        let mut entries: Vec<(&String, &RawSeries)> = data_set.series.iter().collect();
        entries.sort_by_cached_key(|(key, _)| numeric_key(key));

        let mut series = Vec::with_capacity(entries.len());
        let mut skipped = Vec::new();
        for (key, raw) in entries {
            match self.decode_series(key, raw, &table) {
                Ok(Some(mut decoded)) => {
                    decoded.id = series.len();
                    series.push(decoded);
                }
                Ok(None) => {}
                Err(reason) => {
                    warn!("Skipping series {}: {}", key, reason);
                    skipped.push(SkippedSeries {
                        key: key.clone(),
                        reason,
                    });
                }
            }
        }

        debug!(
            "Decoded {} series ({} skipped) prepared at {}",
            series.len(),
            skipped.len(),
            response.meta.prepared
        );

        Ok(DecodedDataset {
            prepared_at: response.meta.prepared,
            series,
            skipped,
        })
    }

    /// `Ok(None)` for series dropped silently (non-spot tenor).
    fn decode_series(
        &self,
        key: &str,
        raw: &RawSeries,
        table: &DimensionTable<'_>,
    ) -> std::result::Result<Option<ExchangeSeries>, String> {
        if let Some(reason) = &raw.malformed {
            return Err(format!("malformed entry: {}", reason));
        }
        let parts: Vec<&str> = key.split(':').collect();

        let freq = table.resolve(SeriesDimensionId::Frequency, &parts)?;
        let frequency = SeriesFrequency::from_code(&freq.id)
            .ok_or_else(|| format!("unknown frequency {}", freq.id))?;
        let base = table.resolve(SeriesDimensionId::BaseCurrency, &parts)?;
        let base_currency =
            Currency::from_code(&base.id).ok_or_else(|| format!("unknown base currency {}", base.id))?;
        let quote = table.resolve(SeriesDimensionId::QuoteCurrency, &parts)?;
        let quote_currency = Currency::from_code(&quote.id)
            .ok_or_else(|| format!("unknown quote currency {}", quote.id))?;
        let tenor = table.resolve(SeriesDimensionId::Tenor, &parts)?;
        if tenor.id != self.expected_tenor {
            debug!(
                "Ignoring series {}: tenor {} ({}), expected {}",
                key, tenor.id, tenor.name, self.expected_tenor
            );
            return Ok(None);
        }
        if base_currency == quote_currency {
            return Err(format!("base and quote are both {}", base_currency));
        }

        let decimals: u32 = parse_attribute(table, AttributeId::Decimals, &raw.attributes)?;
        let _calculated: bool = table
            .attribute(AttributeId::Calculated, &raw.attributes)
            .and_then(|v| match v.id.trim().to_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(format!("CALCULATED value {:?} is not a boolean", other)),
            })?;
        let unit_mult: i32 = parse_attribute(table, AttributeId::UnitMult, &raw.attributes)?;
        let collection = table
            .attribute(AttributeId::Collection, &raw.attributes)?
            .id
            .clone();

        let unit_scale = 10f64.powi(unit_mult);
        let observations = self.decode_observations(key, raw, table, frequency, unit_scale, decimals);
        if observations.is_empty() {
            return Err("no observations".to_string());
        }

        Ok(Some(ExchangeSeries {
            id: 0,
            frequency,
            base_currency,
            base_unit: 1.0,
            quote_currency,
            observations,
            decimals,
            collection,
        }))
    }

    fn decode_observations(
        &self,
        key: &str,
        raw: &RawSeries,
        table: &DimensionTable<'_>,
        frequency: SeriesFrequency,
        unit_scale: f64,
        decimals: u32,
    ) -> Vec<Observation> {
        let mut indexed: Vec<(usize, &Vec<Option<String>>)> = Vec::with_capacity(raw.observations.len());
        for (raw_key, values) in &raw.observations {
            match raw_key.trim().parse::<usize>() {
                Ok(index) => indexed.push((index, values)),
                Err(_) => warn!("Series {}: dropping observation with key {:?}", key, raw_key),
            }
        }
        indexed.sort_by_key(|(index, _)| *index);

        let mut observations = Vec::with_capacity(indexed.len());
        for (index, values) in indexed {
            let Some(period) = table.period(index) else {
                warn!(
                    "Series {}: observation index {} outside time dimension of {}",
                    key,
                    index,
                    table.period_count()
                );
                continue;
            };
            if period.start > period.end {
                warn!("Series {}: period {} ends before it starts", key, period.id);
                continue;
            }
            if frequency.parse_period_key(&period.id).is_none() {
                warn!(
                    "Series {}: period key {:?} does not match {} frequency",
                    key, period.id, frequency
                );
                continue;
            }

            let value = values
                .first()
                .and_then(|v| v.as_deref())
                .and_then(|v| v.trim().parse::<f64>().ok())
                .map_or(f64::NAN, |v| v / unit_scale);
            let display_value = format_scaled(value, decimals, self.rounding)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());

            observations.push(Observation {
                index,
                value,
                display_value,
                period_key: period.id.clone(),
                period_start: period.start,
                period_end: period.end,
            });
        }
        observations
    }
}

impl Default for DatasetDecoder {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

fn parse_attribute<T: std::str::FromStr>(
    table: &DimensionTable<'_>,
    attribute: AttributeId,
    slots: &[Option<usize>],
) -> std::result::Result<T, String> {
    let value = table.attribute(attribute, slots)?;
    value
        .id
        .trim()
        .parse()
        .map_err(|_| format!("{} value {:?} is not a number", attribute.id(), value.id))
}

/// Compound key as numbers for ordering; unparsable parts sort last.
fn numeric_key(key: &str) -> Vec<usize> {
    key.split(':')
        .map(|part| part.trim().parse().unwrap_or(usize::MAX))
        .collect()
}
