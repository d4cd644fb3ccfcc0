//! Currency catalog
//!
//! The fixed set of currencies the Norges Bank `EXR` dataset can quote, plus
//! the three indices it publishes alongside them (TWI, I44, XDR).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The currency every series in the dataset is natively quoted against.
pub const PIVOT_CURRENCY: Currency = Currency::NOK;

/// Currency enumeration (ISO 4217 codes, plus Norges Bank index codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    AUD,
    BDT,
    BYN,
    BYR,
    BRL,
    BGN,
    CAD,
    CNY,
    HRK,
    CZK,
    DKK,
    EUR,
    HKD,
    HUF,
    ISK,
    INR,
    IDR,
    ILS,
    JPY,
    LTL,
    MYR,
    MXN,
    MMK,
    RON,
    TWD,
    NOK,
    NZD,
    PKR,
    PHP,
    PLN,
    GBP,
    RUB,
    SGD,
    ZAR,
    KRW,
    SEK,
    CHF,
    THB,
    TRY,
    VND,
    USD,
    /// Import-weighted krone exchange rate
    I44,
    /// IMF special drawing rights
    XDR,
    /// Trade-weighted krone exchange rate
    TWI,
}

const ALL: [Currency; 44] = [
    Currency::AUD,
    Currency::BDT,
    Currency::BYN,
    Currency::BYR,
    Currency::BRL,
    Currency::BGN,
    Currency::CAD,
    Currency::CNY,
    Currency::HRK,
    Currency::CZK,
    Currency::DKK,
    Currency::EUR,
    Currency::HKD,
    Currency::HUF,
    Currency::ISK,
    Currency::INR,
    Currency::IDR,
    Currency::ILS,
    Currency::JPY,
    Currency::LTL,
    Currency::MYR,
    Currency::MXN,
    Currency::MMK,
    Currency::RON,
    Currency::TWD,
    Currency::NOK,
    Currency::NZD,
    Currency::PKR,
    Currency::PHP,
    Currency::PLN,
    Currency::GBP,
    Currency::RUB,
    Currency::SGD,
    Currency::ZAR,
    Currency::KRW,
    Currency::SEK,
    Currency::CHF,
    Currency::THB,
    Currency::TRY,
    Currency::VND,
    Currency::USD,
    Currency::I44,
    Currency::XDR,
    Currency::TWI,
];

impl Currency {
    /// (code, name, symbol)
    fn details(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            Currency::AUD => ("AUD", "Australian dollar", "$"),
            Currency::BDT => ("BDT", "Bangladeshi taka", "৳"),
            Currency::BYN => ("BYN", "Belarusian new rouble", "p."),
            Currency::BYR => ("BYR", "Belarusian Ruble", "Br"),
            Currency::BRL => ("BRL", "Brazilian real", "R$"),
            Currency::BGN => ("BGN", "Bulgarian lev", "лв"),
            Currency::CAD => ("CAD", "Canadian dollar", "$"),
            Currency::CNY => ("CNY", "Chinese yuan", "¥"),
            Currency::HRK => ("HRK", "Croatian kuna", "kn"),
            Currency::CZK => ("CZK", "Czech koruna", "Kč"),
            Currency::DKK => ("DKK", "Danish krone", "kr."),
            Currency::EUR => ("EUR", "Euro", "€"),
            Currency::HKD => ("HKD", "Hong Kong dollar", "HK$"),
            Currency::HUF => ("HUF", "Hungarian forint", "Ft"),
            Currency::ISK => ("ISK", "Icelandic krona", "kr"),
            Currency::INR => ("INR", "Indian rupee", "₹"),
            Currency::IDR => ("IDR", "Indonesian rupiah", "Rp"),
            Currency::ILS => ("ILS", "Israeli new shekel", "₪"),
            Currency::JPY => ("JPY", "Japanese yen", "¥"),
            Currency::LTL => ("LTL", "Lithuanian litas", "Lt"),
            Currency::MYR => ("MYR", "Malaysian ringgit", "RM"),
            Currency::MXN => ("MXN", "Mexican peso", "$"),
            Currency::MMK => ("MMK", "Myanmar kyat", "K"),
            Currency::RON => ("RON", "New Romanian leu", "lei"),
            Currency::TWD => ("TWD", "New Taiwan dollar", "NT$"),
            Currency::NOK => ("NOK", "Norwegian krone", "kr"),
            Currency::NZD => ("NZD", "New Zealand dollar", "$"),
            Currency::PKR => ("PKR", "Pakistani rupee", "₨"),
            Currency::PHP => ("PHP", "Philippine peso", "₱"),
            Currency::PLN => ("PLN", "Polish zloty", "zł"),
            Currency::GBP => ("GBP", "Pound sterling", "£"),
            Currency::RUB => ("RUB", "Russian rouble", "₽"),
            Currency::SGD => ("SGD", "Singapore dollar", "$"),
            Currency::ZAR => ("ZAR", "South African rand", "R"),
            Currency::KRW => ("KRW", "South Korean won", "₩"),
            Currency::SEK => ("SEK", "Swedish krona", "kr"),
            Currency::CHF => ("CHF", "Swiss franc", "CHF"),
            Currency::THB => ("THB", "Thai baht", "฿"),
            Currency::TRY => ("TRY", "Turkish lira", "TL"),
            Currency::VND => ("VND", "Vietnamese dong", "₫"),
            Currency::USD => ("USD", "US dollar", "$"),
            Currency::I44 => ("I44", "Import-weighted krone exchange rate", ""),
            Currency::XDR => ("XDR", "IMF, special drawing rights", ""),
            Currency::TWI => ("TWI", "Trade-weighted krone exchange rate", ""),
        }
    }

    /// Get ISO 4217 code
    pub fn code(&self) -> &'static str {
        self.details().0
    }

    /// Get English display name
    pub fn name(&self) -> &'static str {
        self.details().1
    }

    /// Get currency symbol (empty for index series)
    pub fn symbol(&self) -> &'static str {
        self.details().2
    }

    /// Parse from code, case-insensitive
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        ALL.iter().copied().find(|c| c.code().eq_ignore_ascii_case(code))
    }

    /// Get all supported currencies, in catalog order
    pub fn all() -> &'static [Currency] {
        &ALL
    }

    /// Index series are not tradeable currencies
    pub fn is_index(&self) -> bool {
        matches!(self, Currency::I44 | Currency::XDR | Currency::TWI)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Parse a comma- or plus-separated list of codes such as `"SEK,EUR"` or `"SEK+EUR"`.
///
/// Duplicates are dropped, first occurrence wins.
pub fn parse_code_list(list: &str) -> Result<Vec<Currency>, String> {
    let mut out = Vec::new();
    for code in list.split(|c| c == ',' || c == '+').map(str::trim).filter(|s| !s.is_empty()) {
        let currency = Currency::from_code(code).ok_or_else(|| format!("Unknown currency: {}", code))?;
        if !out.contains(&currency) {
            out.push(currency);
        }
    }
    Ok(out)
}
