//! Decimal rounding and locale-aware number formatting
//!
//! Values are rounded through an exact decimal representation so that
//! `2.675` rounds half-up to `2.68`, not to the `2.67` a binary float gives.

use crate::error::{ExrError, Result};
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Largest scale a `Decimal` can carry
const MAX_SCALE: u32 = 28;

/// Rounding mode applied when reducing fractional digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Ties round away from zero (`0.125` -> `0.13`)
    #[default]
    HalfUp,
    /// Ties round to the even neighbour (`0.125` -> `0.12`)
    HalfEven,
    /// Toward negative infinity
    Down,
    /// Toward positive infinity
    Up,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::Down => RoundingStrategy::ToNegativeInfinity,
            RoundingMode::Up => RoundingStrategy::ToPositiveInfinity,
        }
    }
}

fn round_decimal(value: Decimal, scale: u32, mode: RoundingMode) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(scale.min(MAX_SCALE), mode.strategy());
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

fn rounded_decimal(value: f64, scale: u32, mode: RoundingMode) -> Option<Decimal> {
    Some(round_decimal(Decimal::from_f64(value)?, scale, mode))
}

/// Round `value` to `scale` fractional digits. `None` for NaN, infinities and
/// magnitudes beyond the decimal range.
pub fn round_scaled(value: f64, scale: u32, mode: RoundingMode) -> Option<f64> {
    rounded_decimal(value, scale, mode)?.to_f64()
}

/// Format `value` with exactly `scale` fractional digits, e.g. `format_scaled(10.0, 4, ..)`
/// gives `"10.0000"`.
pub fn format_scaled(value: f64, scale: u32, mode: RoundingMode) -> Option<String> {
    let mut rounded = rounded_decimal(value, scale, mode)?;
    rounded.rescale(scale.min(MAX_SCALE));
    Some(rounded.to_string())
}

/// Insert `separator` every three digits from the right.
pub fn group_digits(digits: &str, separator: Option<char>) -> String {
    let Some(separator) = separator else {
        return digits.to_string();
    };
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// Decimal and grouping separators of a number locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberLocale {
    pub decimal_separator: char,
    pub grouping_separator: Option<char>,
}

impl NumberLocale {
    /// Create a locale, rejecting separators that would make input ambiguous
    pub fn new(decimal_separator: char, grouping_separator: Option<char>) -> Result<Self> {
        let locale = Self {
            decimal_separator,
            grouping_separator,
        };
        locale.validate()?;
        Ok(locale)
    }

    /// `1,234.56`
    pub fn en_us() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: Some(','),
        }
    }

    /// `1 234,56` with a no-break space
    pub fn nb_no() -> Self {
        Self {
            decimal_separator: ',',
            grouping_separator: Some('\u{a0}'),
        }
    }

    /// `1.234,56`
    pub fn de_de() -> Self {
        Self {
            decimal_separator: ',',
            grouping_separator: Some('.'),
        }
    }

    /// Look up a preset by name (`en_us`, `nb_no`, `de_de`, case-insensitive, `-` accepted)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().replace('-', "_").as_str() {
            "en_us" | "en" => Some(Self::en_us()),
            "nb_no" | "no" | "nb" => Some(Self::nb_no()),
            "de_de" | "de" => Some(Self::de_de()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.decimal_separator.is_ascii_digit() {
            return Err(ExrError::ConfigError(format!(
                "Decimal separator cannot be a digit: {:?}",
                self.decimal_separator
            )));
        }
        if let Some(grouping) = self.grouping_separator {
            if grouping.is_ascii_digit() {
                return Err(ExrError::ConfigError(format!(
                    "Grouping separator cannot be a digit: {:?}",
                    grouping
                )));
            }
            if grouping == self.decimal_separator {
                return Err(ExrError::ConfigError(format!(
                    "Decimal and grouping separators must differ, both are {:?}",
                    grouping
                )));
            }
        }
        Ok(())
    }

    /// Parse text written in this locale. Grouping separators are ignored and a
    /// trailing decimal separator is accepted (`"100,"` parses as 100).
    pub fn parse(&self, text: &str) -> Option<f64> {
        self.parse_decimal(text)?.to_f64()
    }

    /// Like [`NumberLocale::parse`], keeping the exact decimal value
    pub fn parse_decimal(&self, text: &str) -> Option<Decimal> {
        let mut normalized: String = text
            .chars()
            .filter(|c| Some(*c) != self.grouping_separator)
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect();
        if normalized.ends_with('.') {
            normalized.pop();
        }
        if normalized.is_empty() {
            return None;
        }
        Decimal::from_str(&normalized).ok()
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::en_us()
    }
}

/// Format `value` for display in `locale`: rounded to at most
/// `max_fraction_digits`, trailing fractional zeros dropped, integer part grouped.
pub fn format_grouped(
    value: f64,
    locale: &NumberLocale,
    max_fraction_digits: u32,
    mode: RoundingMode,
) -> Option<String> {
    Some(format_decimal_grouped(
        Decimal::from_f64(value)?,
        locale,
        max_fraction_digits,
        mode,
    ))
}

/// [`format_grouped`] for a value that is already a `Decimal`
pub fn format_decimal_grouped(
    value: Decimal,
    locale: &NumberLocale,
    max_fraction_digits: u32,
    mode: RoundingMode,
) -> String {
    let rounded = round_decimal(value, max_fraction_digits, mode).normalize();
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (text.as_str(), ""),
    };

    let mut out = String::with_capacity(text.len() + 4);
    if negative {
        out.push('-');
    }
    out.push_str(&group_digits(integer, locale.grouping_separator));
    if !fraction.is_empty() {
        out.push(locale.decimal_separator);
        out.push_str(fraction);
    }
    out
}
