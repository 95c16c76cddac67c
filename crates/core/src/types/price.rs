//! Type-safe price representation using decimal arithmetic.
//!
//! Catalogue and cart prices arrive as decimal amounts in the currency's
//! standard unit; order totals and checkout amounts arrive as integer minor
//! units (cents). Both are turned into a [`Price`] before display.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
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

    /// Create a price from an amount in minor units (e.g., cents).
    #[must_use]
    pub fn from_minor_units(minor: i64, currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::new(minor, 2), currency_code)
    }

    /// Format for display, e.g. `"$19.99"`.
    #[must_use]
    pub fn display(&self) -> String {
        let mut amount = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(2);
        format!("{}{amount}", self.currency_code.symbol())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Format a min/max pair the way product cards show it.
///
/// Equal bounds collapse to a single price: `"$24.99"`; otherwise
/// `"$24.99 - $34.99"`.
#[must_use]
pub fn format_price_range(min: Decimal, max: Decimal, currency_code: CurrencyCode) -> String {
    let low = Price::new(min, currency_code);
    if min == max {
        low.display()
    } else {
        format!("{low} - {}", Price::new(max, currency_code))
    }
}

/// ISO 4217 currency codes accepted at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// All supported currencies, in the order the checkout form lists them.
    pub const ALL: [Self; 5] = [Self::USD, Self::EUR, Self::GBP, Self::CAD, Self::AUD];

    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Upper-case ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a currency code is not supported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported currency: {0}")]
pub struct UnknownCurrency(pub String);

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCurrency(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_two_decimals() {
        let price = Price::new(Decimal::new(25, 0), CurrencyCode::USD);
        assert_eq!(price.display(), "$25.00");

        let price = Price::new(Decimal::new(8999, 2), CurrencyCode::GBP);
        assert_eq!(price.to_string(), "£89.99");
    }

    #[test]
    fn test_display_rounds_extra_precision() {
        let price = Price::new(Decimal::new(19_995, 3), CurrencyCode::USD);
        assert_eq!(price.display(), "$20.00");
    }

    #[test]
    fn test_from_minor_units() {
        let price = Price::from_minor_units(12_999, CurrencyCode::EUR);
        assert_eq!(price.amount, Decimal::new(12_999, 2));
        assert_eq!(price.display(), "€129.99");
    }

    #[test]
    fn test_price_range_collapses_equal_bounds() {
        let p = Decimal::new(2499, 2);
        assert_eq!(format_price_range(p, p, CurrencyCode::USD), "$24.99");
    }

    #[test]
    fn test_price_range_shows_both_bounds() {
        assert_eq!(
            format_price_range(
                Decimal::new(2499, 2),
                Decimal::new(3499, 2),
                CurrencyCode::USD
            ),
            "$24.99 - $34.99"
        );
    }

    #[test]
    fn test_currency_from_str_is_case_insensitive() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!(" Gbp ".parse::<CurrencyCode>().unwrap(), CurrencyCode::GBP);
        assert!("JPY".parse::<CurrencyCode>().is_err());
    }
}
