//! Currency pairs and the rate algebra behind inversion and cross rates

use crate::currency::Currency;
use crate::error::{ExrError, Result};
use crate::types::Rate;
use std::fmt;

/// Currency pair, read "1 base = rate quote"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    pub base: Currency,
    pub quote: Currency,
}

impl CurrencyPair {
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

    /// Get inverse pair
    pub fn inverse(&self) -> Self {
        Self {
            base: self.quote,
            quote: self.base,
        }
    }

    /// Invert a rate for the inverse pair
    pub fn invert_rate(rate: Rate) -> Result<Rate> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ExrError::InvalidData(format!(
                "Cannot invert non-positive rate: {}",
                rate
            )));
        }
        Ok(1.0 / rate)
    }

    /// Cross rate through an intermediate currency.
    ///
    /// With `1 C = base_to_mid M` and `1 D = quote_to_mid M`, `1 C = cross D`:
    ///
    /// ```
    /// use rusty_exr::fx::CurrencyPair;
    ///
    /// // 1 SEK = 1.00 NOK, 1 USD = 0.10 NOK
    /// let sek_usd = CurrencyPair::cross_rate(1.00, 0.10).unwrap();
    /// assert!((sek_usd - 10.0).abs() < 1e-12);
    /// ```
    pub fn cross_rate(base_to_mid: Rate, quote_to_mid: Rate) -> Result<Rate> {
        if !quote_to_mid.is_finite() || quote_to_mid <= 0.0 {
            return Err(ExrError::InvalidData(format!(
                "Cannot calculate cross rate with quote rate {}",
                quote_to_mid
            )));
        }
        if !base_to_mid.is_finite() || base_to_mid <= 0.0 {
            return Err(ExrError::InvalidData(format!(
                "Cannot calculate cross rate with base rate {}",
                base_to_mid
            )));
        }
        Ok(base_to_mid / quote_to_mid)
    }

    /// Parse from string (e.g., "EUR/NOK" or "EURNOK")
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (base, quote) = match s.split_once('/') {
            Some(parts) => parts,
            None if s.len() == 6 && s.is_ascii() => s.split_at(3),
            None => {
                return Err(ExrError::InvalidData(format!(
                    "Invalid currency pair format: {}",
                    s
                )))
            }
        };
        let lookup = |code: &str| {
            Currency::from_code(code)
                .ok_or_else(|| ExrError::InvalidData(format!("Unknown currency: {}", code)))
        };
        Ok(Self::new(lookup(base)?, lookup(quote)?))
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inverse_pair() {
        let pair = CurrencyPair::new(Currency::USD, Currency::NOK);
        assert_eq!(pair.inverse(), CurrencyPair::new(Currency::NOK, Currency::USD));
        assert_eq!(pair.to_string(), "USD/NOK");
    }

    #[test]
    fn test_invert_rate() {
        assert_relative_eq!(CurrencyPair::invert_rate(0.1).unwrap(), 10.0);
        assert!(CurrencyPair::invert_rate(0.0).is_err());
        assert!(CurrencyPair::invert_rate(-1.0).is_err());
        assert!(CurrencyPair::invert_rate(f64::NAN).is_err());
    }

    #[test]
    fn test_cross_rate() {
        // EUR = 11.5 NOK, SEK = 1.0 NOK
        assert_relative_eq!(CurrencyPair::cross_rate(11.5, 1.0).unwrap(), 11.5);
        assert!(CurrencyPair::cross_rate(1.0, 0.0).is_err());
        assert!(CurrencyPair::cross_rate(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            CurrencyPair::parse("EUR/NOK").unwrap(),
            CurrencyPair::new(Currency::EUR, Currency::NOK)
        );
        assert_eq!(
            CurrencyPair::parse("sekusd").unwrap(),
            CurrencyPair::new(Currency::SEK, Currency::USD)
        );
        assert!(CurrencyPair::parse("EUR-NOK").is_err());
        assert!(CurrencyPair::parse("EUR/XYZ").is_err());
    }
}
