//! Series frequency and period-key formats

use crate::error::{ExrError, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Observation frequency of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SeriesFrequency {
    /// One observation per year, keyed `yyyy`
    Annual,
    /// One observation per month, keyed `yyyy-MM`
    Monthly,
    /// One observation per business day, keyed `yyyy-MM-dd`
    #[default]
    Business,
}

impl SeriesFrequency {
    /// Code used in the `FREQ` dimension and in request paths
    pub fn code(&self) -> &'static str {
        match self {
            SeriesFrequency::Annual => "A",
            SeriesFrequency::Monthly => "M",
            SeriesFrequency::Business => "B",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "A" => Some(SeriesFrequency::Annual),
            "M" => Some(SeriesFrequency::Monthly),
            "B" => Some(SeriesFrequency::Business),
            _ => None,
        }
    }

    /// chrono format string of a period key
    pub fn date_format(&self) -> &'static str {
        match self {
            SeriesFrequency::Annual => "%Y",
            SeriesFrequency::Monthly => "%Y-%m",
            SeriesFrequency::Business => "%Y-%m-%d",
        }
    }

    /// Format a date as a period key (used for `startPeriod` / `endPeriod`)
    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(self.date_format()).to_string()
    }

    /// Parse a period key into the first calendar day of the period.
    pub fn parse_period_key(&self, key: &str) -> Option<NaiveDate> {
        let key = key.trim();
        match self {
            // chrono cannot build a date from a year alone
            SeriesFrequency::Annual => {
                if key.len() != 4 {
                    return None;
                }
                NaiveDate::from_ymd_opt(key.parse().ok()?, 1, 1)
            }
            SeriesFrequency::Monthly => NaiveDate::parse_from_str(&format!("{}-01", key), "%Y-%m-%d").ok(),
            SeriesFrequency::Business => NaiveDate::parse_from_str(key, "%Y-%m-%d").ok(),
        }
    }

    /// First and last calendar day of the period a key names
    pub fn period_bounds(&self, key: &str) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.parse_period_key(key)?;
        let end = match self {
            SeriesFrequency::Annual => NaiveDate::from_ymd_opt(start.year(), 12, 31)?,
            SeriesFrequency::Monthly => start.checked_add_months(Months::new(1))?.pred_opt()?,
            SeriesFrequency::Business => start,
        };
        Some((start, end))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesFrequency::Annual => "annual",
            SeriesFrequency::Monthly => "monthly",
            SeriesFrequency::Business => "business",
        }
    }
}

impl FromStr for SeriesFrequency {
    type Err = ExrError;

    /// Accepts codes (`B`) and names (`business`), case-insensitive
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "a" | "annual" | "yearly" => Ok(SeriesFrequency::Annual),
            "m" | "monthly" => Ok(SeriesFrequency::Monthly),
            "b" | "business" | "daily" => Ok(SeriesFrequency::Business),
            _ => Err(ExrError::ConfigError(format!("Unknown frequency: {}", s))),
        }
    }
}

impl fmt::Display for SeriesFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
