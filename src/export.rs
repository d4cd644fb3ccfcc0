//! CSV export of prepared rates

use crate::conversion::ConversionResult;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct RateRow<'a> {
    base: &'a str,
    quote: &'a str,
    period: &'a str,
    value: f64,
    display_value: &'a str,
    converted: Option<f64>,
}

/// Write one row per observation: `base,quote,period,value,display_value,converted`.
///
/// `converted` is the value times the tracked multiplier, empty when the
/// multiplier is not tracked.
pub fn write_csv<W: Write>(result: &ConversionResult, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for series in &result.series {
        for obs in &series.observations {
            csv.serialize(RateRow {
                base: series.base_currency.code(),
                quote: series.quote_currency.code(),
                period: &obs.period_key,
                value: obs.value,
                display_value: &obs.display_value,
                converted: result.multiplier.map(|m| obs.value * m),
            })?;
        }
    }
    csv.flush()?;
    Ok(())
}
