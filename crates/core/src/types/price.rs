//! Type-safe price representation using decimal arithmetic.
//!
//! The backend serializes money as decimal strings (`"499.00"`); prices are
//! never floats on the wire or in memory.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Price of a line: unit amount times quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency_code: self.currency_code,
        }
    }

    /// Format for display (e.g., `₹ 499.00`).
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} {:.2}", self.currency_code.symbol(), self.amount)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// The display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// The ISO 4217 code as a string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn rupees(s: &str) -> Price {
        Price::new(Decimal::from_str(s).unwrap(), CurrencyCode::INR)
    }

    #[test]
    fn test_display_two_decimal_places() {
        assert_eq!(rupees("499").display(), "₹ 499.00");
        assert_eq!(rupees("499.5").display(), "₹ 499.50");
    }

    #[test]
    fn test_times() {
        let line = rupees("500").times(2);
        assert_eq!(line.amount, Decimal::from_str("1000").unwrap());
    }

    #[test]
    fn test_serde_string_amount() {
        let price = rupees("499.00");
        let json = serde_json::to_string(&price).unwrap();
        assert!(json.contains("\"499.00\""));

        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, price);
    }

    #[test]
    fn test_deserialize_defaults_currency() {
        let parsed: Price = serde_json::from_str(r#"{"amount":"10.00"}"#).unwrap();
        assert_eq!(parsed.currency_code, CurrencyCode::INR);
    }
}
