//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are computed by the marketplace backend; the storefront only
//! carries and formats them. The backend sends amounts either as JSON
//! numbers or as decimal strings, and both deserialize into [`Price`].

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary amount in the marketplace currency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

/// Where the currency symbol goes relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolPlacement {
    /// `$12.50`
    Before,
    /// `12.50 EGP`
    #[default]
    After,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from minor units (piastres, cents).
    #[must_use]
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Amount rounded half away from zero to two decimal places.
    fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Format for display with two decimal places and the given symbol.
    ///
    /// ```
    /// use souq_core::Price;
    /// use souq_core::types::price::SymbolPlacement;
    ///
    /// let price = Price::from_minor(1250);
    /// assert_eq!(price.format("EGP", SymbolPlacement::After), "12.50 EGP");
    /// assert_eq!(price.format("$", SymbolPlacement::Before), "$12.50");
    /// ```
    #[must_use]
    pub fn format(&self, symbol: &str, placement: SymbolPlacement) -> String {
        let amount = self.rounded();
        match placement {
            SymbolPlacement::Before => format!("{symbol}{amount:.2}"),
            SymbolPlacement::After => format!("{amount:.2} {symbol}"),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_string_and_number() {
        let from_str: Price = serde_json::from_str("\"19.90\"").unwrap();
        let from_num: Price = serde_json::from_str("19.9").unwrap();
        assert_eq!(from_str, Price::from_minor(1990));
        assert_eq!(from_num, Price::from_minor(1990));
    }

    #[test]
    fn test_format_rounds_to_two_places() {
        let price = Price::new(Decimal::new(12_345, 3));
        assert_eq!(price.to_string(), "12.35");
        assert_eq!(price.format("EGP", SymbolPlacement::After), "12.35 EGP");
    }

    #[test]
    fn test_format_pads_whole_amounts() {
        let price: Price = serde_json::from_str("7").unwrap();
        assert_eq!(price.format("$", SymbolPlacement::Before), "$7.00");
    }

    #[test]
    fn test_zero() {
        assert!(Price::default().is_zero());
        assert!(!Price::from_minor(1).is_zero());
    }
}
