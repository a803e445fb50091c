//! Amount type for monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. Transaction amounts are always
//! positive; totals and balances built from them may be negative.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Represents how an amount should be written to a `String`.
///
/// # Examples
///  - `AmountFormat::Plain` -> `-60000.5`
///  - `AmountFormat::Fixed` -> `-60000.50`
///  - `AmountFormat::Money` -> `-60,000.50`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AmountFormat {
    /// No thousands separators, no trailing zeros. This is the form written to CSV files.
    #[default]
    Plain,
    /// Exactly two decimal places, no thousands separators.
    Fixed,
    /// Thousands separators and exactly two decimal places. This is the form used in reports.
    Money,
}

/// Represents a monetary amount.
///
/// # Examples
///
/// ```
/// # use cashbook::model::{Amount, AmountFormat};
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1500.50").unwrap();
/// assert_eq!(amount.to_string(), "1500.5");
/// assert_eq!(amount.format(AmountFormat::Money), "1,500.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    /// The largest amount a single transaction may carry: one trillion.
    pub const MAX_ENTRY: Amount =
        Amount::new(Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0));

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value().is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// Returns true if the amount is usable on a transaction: greater than zero and no larger
    /// than [`Amount::MAX_ENTRY`].
    pub fn is_valid_entry(&self) -> bool {
        self.is_positive() && *self <= Self::MAX_ENTRY
    }

    /// Writes the amount using `format`.
    pub fn format(&self, format: AmountFormat) -> String {
        match format {
            AmountFormat::Plain => self.value.normalize().to_string(),
            AmountFormat::Fixed => format!("{:.2}", self.value.round_dp(2)),
            AmountFormat::Money => {
                let (sign, num) = if self.is_negative() {
                    ("-", self.value().abs())
                } else {
                    ("", self.value())
                };
                let rounded = num.round_dp(2);
                format!(
                    "{sign}{}",
                    format_num::format_num!(",.2", rounded.to_f64().unwrap_or_default())
                )
            }
        }
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(String);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a number", self.0)
    }
}

impl Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parses a plain number such as `250`, `12.5`, `+3` or `1e3`. Currency symbols and thousands
    /// separators are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Amount::new)
            .map_err(|_| AmountError(s.to_string()))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(AmountFormat::Plain))
    }
}

// Totals saturate at the `Decimal` bounds instead of overflowing.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount::new(self.value.saturating_add(rhs.value))
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount::new(self.value.saturating_sub(rhs.value))
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + *a)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // A string keeps the exact decimal value through JSON.
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        /// Older data files store amounts as JSON numbers.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(serde_json::Number),
        }

        let s = match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s,
            Repr::Number(n) => n.to_string(),
        };
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Amount::new(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
