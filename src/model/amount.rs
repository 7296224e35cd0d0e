//! Amount type for reading monetary display text and writing fixed-point totals.
//!
//! This module provides the `Amount` type which wraps `Decimal`. It parses display text that may
//! carry a currency symbol and thousands separators, and it formats values with exactly two decimal
//! places using half-up rounding.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Currency symbols that may lead an amount, after the optional minus sign.
const SYMBOLS: [char; 2] = ['$', '€'];

/// Represents how amounts were (or should be) formatted.
///
/// # Examples
///  - `AmountFormat{ symbol: Some('$'), commas: true }` -> `-$60,000.00`
///  - `AmountFormat{ symbol: None, commas: true }` -> `-60,000.00`
///  - `AmountFormat{ symbol: None, commas: false }` -> `-60000.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AmountFormat {
    /// The currency symbol present in the formatting, if any.
    symbol: Option<char>,
    /// Whether commas are present as thousands separators in the formatting.
    commas: bool,
}

impl AmountFormat {
    /// Plain fixed point: `-60000.00`. This is how the results page shows totals.
    pub const PLAIN: AmountFormat = AmountFormat {
        symbol: None,
        commas: false,
    };

    /// Plain fixed point, optionally with thousands separators.
    pub const fn with_commas(commas: bool) -> Self {
        Self {
            symbol: None,
            commas,
        }
    }

    pub fn commas(&self) -> bool {
        self.commas
    }
}

/// Represents a monetary amount.
///
/// Formatting is considered significant for the purposes of equality, so for numeric comparisons,
/// you should access the `Decimal` value and use that.
///
/// # Examples
///
/// ```
/// # use ledger_rollup::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-$1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "-$1,250.50");
/// ```
///
/// ```
/// # use ledger_rollup::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("-5000.00").unwrap();
/// let b = Amount::from_str("-€5,000.00").unwrap();
/// assert_ne!(a, b);
/// assert_eq!(a.value(), b.value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    /// The parsed numerical value.
    value: Decimal,
    /// The way the numerical value was parsed from, or should be written to, a `String`.
    format: AmountFormat,
}

impl Amount {
    /// Creates a new Amount with plain fixed-point formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: AmountFormat::PLAIN,
        }
    }

    pub const fn new_with_format(value: Decimal, format: AmountFormat) -> Self {
        Self { value, format }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn format(&self) -> AmountFormat {
        self.format
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is strictly below zero.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// The value rounded half-up (away from zero) to two decimal places.
    pub fn rounded(&self) -> Decimal {
        let rounded = self
            .value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        // Avoid rendering "-0.00" when something like -0.001 rounds to zero.
        if rounded.is_zero() {
            Decimal::ZERO
        } else {
            rounded
        }
    }
}

/// An error that can occur when parsing strings into `Amount` values.
#[derive(Debug)]
pub enum AmountError {
    /// A sign after the leading minus or the currency symbol, e.g. `--5` or `-$-5`.
    MisplacedSign(String),
    /// The digits are not a decimal number.
    Decimal(rust_decimal::Error),
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::MisplacedSign(text) => write!(f, "'{text}' has a misplaced sign"),
            AmountError::Decimal(e) => Display::fmt(e, f),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::MisplacedSign(_) => None,
            AmountError::Decimal(e) => Some(e),
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // An empty cell is rendered for a zero amount
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (symbol, number) = match unsigned.chars().next() {
            Some(c) if SYMBOLS.contains(&c) => (Some(c), &unsigned[c.len_utf8()..]),
            _ => (None, unsigned),
        };

        // The only sign allowed is the leading minus
        if number.starts_with(['-', '+']) {
            return Err(AmountError::MisplacedSign(trimmed.to_string()));
        }

        // Remove commas (thousand separators)
        let without_commas = number.replace(',', "");
        let commas = without_commas.len() < number.len();

        let value = Decimal::from_str(&without_commas).map_err(AmountError::Decimal)?;
        let value = if negative { -value } else { value };
        Ok(Amount {
            value,
            format: AmountFormat { symbol, commas },
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded();
        let sign = if rounded.is_sign_negative() { "-" } else { "" };
        let num = rounded.abs();

        let symbol = match self.format.symbol {
            Some(c) => c.to_string(),
            None => String::new(),
        };

        let fixed = format!("{num:.2}");
        if self.format.commas {
            let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
            write!(f, "{sign}{symbol}{}.{frac}", group_thousands(int))
        } else {
            write!(f, "{sign}{symbol}{fixed}")
        }
    }
}

/// Inserts a comma between every group of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (ix, c) in digits.chars().enumerate() {
        if ix > 0 && (digits.len() - ix) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
