//! Sanitising and formatting of a typed amount
//!
//! [`sanitize`] turns whatever was typed into a well-formed, grouped number in
//! the configured locale. [`AmountInput`] wraps it with the display rule used
//! while the user is still typing: trailing zeros and a trailing decimal
//! separator are kept until a non-zero digit makes the canonical form safe to
//! show.

use crate::decimal::{format_decimal_grouped, format_grouped, group_digits, NumberLocale, RoundingMode};
use crate::error::ExrError;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_INTEGER_DIGITS: usize = 15;
pub const DEFAULT_MAX_FRACTION_DIGITS: u32 = 2;

/// Limits and locale for amount input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountFormat {
    pub locale: NumberLocale,
    pub max_integer_digits: usize,
    pub max_fraction_digits: u32,
    pub rounding: RoundingMode,
}

impl AmountFormat {
    pub fn new(locale: NumberLocale) -> Self {
        Self {
            locale,
            ..Self::default()
        }
    }
}

impl Default for AmountFormat {
    fn default() -> Self {
        Self {
            locale: NumberLocale::en_us(),
            max_integer_digits: DEFAULT_MAX_INTEGER_DIGITS,
            max_fraction_digits: DEFAULT_MAX_FRACTION_DIGITS,
            rounding: RoundingMode::HalfUp,
        }
    }
}

/// Clean up typed text. Total and idempotent.
///
/// Keeps digits and the two separators, drops leading grouping separators,
/// adds a `0` before a leading decimal separator, keeps only the first decimal
/// separator, regroups the integer part (truncated to `max_integer_digits`)
/// and truncates the fraction to `max_fraction_digits`.
///
/// ```
/// use rusty_exr::amount_input::{sanitize, AmountFormat};
///
/// let format = AmountFormat::default();
/// assert_eq!(sanitize("1234.567", &format), "1,234.56");
/// assert_eq!(sanitize(".5", &format), "0.5");
/// ```
pub fn sanitize(input: &str, format: &AmountFormat) -> String {
    let decimal = format.locale.decimal_separator;
    let grouping = format.locale.grouping_separator;
    let is_grouping = |c: char| Some(c) == grouping;

    let filtered: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == decimal || is_grouping(*c))
        .collect();
    let trimmed = filtered.trim_start_matches(is_grouping);

    let (integer, fraction) = match trimmed.split_once(decimal) {
        Some((integer, rest)) => (integer, Some(rest)),
        None => (trimmed, None),
    };

    let integer_digits: String = integer
        .chars()
        .filter(char::is_ascii_digit)
        .take(format.max_integer_digits.max(1))
        .collect();

    let mut out = if integer_digits.is_empty() && fraction.is_some() {
        "0".to_string()
    } else {
        group_digits(&integer_digits, grouping)
    };

    if let Some(fraction) = fraction {
        out.push(decimal);
        out.extend(
            fraction
                .chars()
                .filter(char::is_ascii_digit)
                .take(format.max_fraction_digits as usize),
        );
    }
    out
}

/// State of an amount field
#[derive(Debug, Clone, PartialEq)]
pub struct AmountInput {
    pub text: String,
    /// Parsed value; `NaN` when the text is not a number
    pub value: f64,
    pub error: Option<String>,
    format: AmountFormat,
}

impl AmountInput {
    /// Start from an existing multiplier, shown in canonical form
    pub fn new(multiplier: f64, format: AmountFormat) -> Self {
        let text = format_grouped(
            multiplier,
            &format.locale,
            format.max_fraction_digits,
            format.rounding,
        )
        .unwrap_or_default();
        Self {
            text,
            value: multiplier,
            error: None,
            format,
        }
    }

    pub fn format(&self) -> &AmountFormat {
        &self.format
    }

    /// Apply an edit and decide what to show
    pub fn on_edit(&mut self, input: &str) {
        let sanitized = sanitize(input, &self.format);
        let locale = self.format.locale;

        let Some(parsed) = locale.parse_decimal(&sanitized) else {
            self.value = f64::NAN;
            self.error = Some(ExrError::InputNotANumber(sanitized.clone()).to_string());
            self.text = sanitized;
            return;
        };

        self.value = parsed.to_f64().unwrap_or(f64::NAN);
        self.error = None;

        if parsed.is_zero() {
            self.text = sanitized;
            return;
        }

        let canonical = format_decimal_grouped(
            parsed,
            &locale,
            self.format.max_fraction_digits,
            self.format.rounding,
        );
        let ends_in_nonzero_digit = sanitized
            .chars()
            .last()
            .is_some_and(|c| ('1'..='9').contains(&c));

        self.text = if !sanitized.contains(locale.decimal_separator) || ends_in_nonzero_digit {
            canonical
        } else {
            sanitized
        };
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.value = 0.0;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en() -> AmountFormat {
        AmountFormat::default()
    }

    #[test]
    fn test_sanitize_examples() {
        let f = en();
        assert_eq!(sanitize("1,234.5", &f), "1,234.5");
        assert_eq!(sanitize("1234.567", &f), "1,234.56");
        assert_eq!(sanitize("", &f), "");
        assert_eq!(sanitize("...", &f), "0.");
        assert_eq!(sanitize("0000.000000", &f), "0,000.00");
        assert_eq!(sanitize("abc12x3", &f), "123");
        assert_eq!(sanitize(",,,5", &f), "5");
        assert_eq!(sanitize("1.2.3", &f), "1.23");
        assert_eq!(sanitize("1.,5", &f), "1.5");
    }

    #[test]
    fn test_sanitize_truncates_integer_digits() {
        let f = en();
        assert_eq!(
            sanitize("12345678901234567890", &f),
            "123,456,789,012,345"
        );
    }

    #[test]
    fn test_sanitize_norwegian_locale() {
        let f = AmountFormat::new(NumberLocale::nb_no());
        assert_eq!(sanitize("1234,5", &f), "1\u{a0}234,5");
        assert_eq!(sanitize("1 234.5", &f), "12\u{a0}345");
        assert_eq!(sanitize(",25", &f), "0,25");
    }

    #[test]
    fn test_sanitize_is_idempotent_on_examples() {
        let f = en();
        for input in ["1,234.5", "...", "0000.000000", ".,5", "9,9,9,9.999", ",1,2"] {
            let once = sanitize(input, &f);
            assert_eq!(sanitize(&once, &f), once, "input {:?}", input);
        }
    }

    #[test]
    fn test_new_shows_canonical_multiplier() {
        let input = AmountInput::new(1000.0, en());
        assert_eq!(input.text, "1,000");
        assert_eq!(input.value, 1000.0);

        let input = AmountInput::new(2.5, en());
        assert_eq!(input.text, "2.5");
    }

    #[test]
    fn test_edit_keeps_trailing_zero_and_separator() {
        let mut input = AmountInput::new(1.0, en());

        input.on_edit("12.");
        assert_eq!(input.text, "12.");
        assert_eq!(input.value, 12.0);

        input.on_edit("12.0");
        assert_eq!(input.text, "12.0");

        input.on_edit("12.05");
        assert_eq!(input.text, "12.05");
        assert!((input.value - 12.05).abs() < 1e-9);
    }

    #[test]
    fn test_edit_regroups_integers() {
        let mut input = AmountInput::new(1.0, en());
        input.on_edit("1234567");
        assert_eq!(input.text, "1,234,567");
        assert_eq!(input.value, 1_234_567.0);
        assert!(input.error.is_none());
    }

    #[test]
    fn test_edit_zero_keeps_typed_text() {
        let mut input = AmountInput::new(1.0, en());
        input.on_edit("0.00");
        assert_eq!(input.text, "0.00");
        assert_eq!(input.value, 0.0);
    }

    #[test]
    fn test_edit_not_a_number() {
        let mut input = AmountInput::new(1.0, en());
        input.on_edit("abc");
        assert_eq!(input.text, "");
        assert!(input.value.is_nan());
        assert!(input.error.as_deref().unwrap().contains("not a number"));

        input.on_edit("5");
        assert!(input.error.is_none());
        assert_eq!(input.value, 5.0);
    }

    #[test]
    fn test_clear() {
        let mut input = AmountInput::new(42.0, en());
        input.clear();
        assert_eq!(input.text, "");
        assert_eq!(input.value, 0.0);
        assert!(input.error.is_none());
    }
}
