//! Type-safe money amounts using decimal arithmetic.
//!
//! All amounts in the shop are Argentine pesos. Documents store them as plain
//! JSON numbers, so `Money` serializes transparently as a number.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize, Serializer};

/// A non-currency-tagged decimal amount in the shop currency.
///
/// Whole amounts serialize as JSON integers, fractional ones as floats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero pesos.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from whole pesos.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Create an amount from cents (e.g. `123_050` is `1230.50`).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply a unit price by a quantity, saturating at the decimal range.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Lossy conversion for APIs that only accept floating point numbers.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract().is_zero()
            && let Some(units) = self.0.to_i64()
        {
            return serializer.serialize_i64(units);
        }
        serializer.serialize_f64(self.to_f64())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

/// ISO 4217 currency codes accepted by the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    ARS,
    USD,
}

impl CurrencyCode {
    /// The ISO code string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ARS => "ARS",
            Self::USD => "USD",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        assert_eq!(Money::from_cents(123_050).to_string(), "$1230.50");
    }

    #[test]
    fn test_times_and_sum() {
        let jam = Money::from_units(1850);
        let dulce = Money::from_cents(123_050);
        let total: Money = [jam.times(2), dulce].iter().sum();
        assert_eq!(total, Money::from_cents(493_050));
    }

    #[test]
    fn test_serializes_as_number() {
        let whole = serde_json::to_value(Money::from_units(1500)).unwrap();
        assert_eq!(whole, serde_json::json!(1500));

        let fractional = serde_json::to_value(Money::from_cents(123_050)).unwrap();
        assert_eq!(fractional, serde_json::json!(1230.5));
    }

    #[test]
    fn test_deserializes_integers_and_floats() {
        let whole: Option<Money> = serde_json::from_str("1500").ok();
        assert_eq!(whole, Some(Money::from_units(1500)));

        let fractional: Option<Money> = serde_json::from_str("1230.5").ok();
        assert_eq!(fractional, Some(Money::from_cents(123_050)));
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let huge = Money::new(Decimal::MAX);
        assert_eq!(huge.times(u32::MAX), huge);
        assert_eq!(huge + Money::from_units(1), huge);

        let mut total = huge;
        total += huge;
        assert_eq!(total, huge);
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::from_units(-1).is_negative());
        assert!(!Money::ZERO.is_negative());
        assert!(Money::ZERO.is_zero());
    }
}
