//! Money type for prices and document totals
//!
//! Amounts are stored in minor units (cents) as i64 so that line totals and
//! quote/invoice sums never accumulate floating-point error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

/// A monetary amount in minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create an amount from minor units
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Zero
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Amount in minor units
    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parse an amount such as "12", "12.5", "12.50" or "-3.99"
    ///
    /// A leading currency symbol is ignored. More than two decimals is an
    /// error rather than a silent truncation.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let raw = s.trim();
        let (negative, rest) = match raw.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, raw),
        };
        let rest = rest.trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.');

        let invalid = || MoneyParseError::InvalidFormat(raw.to_string());

        let (units, fraction) = match rest.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (rest, ""),
        };
        if units.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooPrecise(raw.to_string()));
        }

        let units: i64 = if units.is_empty() {
            0
        } else {
            units.parse().map_err(|_| invalid())?
        };
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let cents = units * 100 + fraction;
        Ok(Self(if negative { -cents } else { cents }))
    }

    /// Format with a currency symbol, e.g. "$12.50" or "-$3.99"
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{}{}{}", sign, symbol, Self(self.0.abs()))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

/// Unit price times quantity
impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * i64::from(quantity))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, m| acc + m)
    }
}

/// Error parsing a money string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    TooPrecise(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(s) => write!(f, "Invalid amount: '{}'", s),
            Self::TooPrecise(s) => write!(f, "Amount has more than two decimals: '{}'", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("12").unwrap().cents(), 1200);
        assert_eq!(Money::parse("12.5").unwrap().cents(), 1250);
        assert_eq!(Money::parse("$12.50").unwrap().cents(), 1250);
        assert_eq!(Money::parse("-3.99").unwrap().cents(), -399);
        assert_eq!(Money::parse(".75").unwrap().cents(), 75);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Money::parse("abc"),
            Err(MoneyParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            Money::parse("1.999"),
            Err(MoneyParseError::TooPrecise(_))
        ));
        assert!(Money::parse("").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1250).to_string(), "12.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::from_cents(-399).format_with_symbol("$"), "-$3.99");
    }

    #[test]
    fn test_line_total_and_sum() {
        let unit = Money::from_cents(1999);
        assert_eq!((unit * 3).cents(), 5997);

        let total: Money = vec![Money::from_cents(100), Money::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total.cents(), 350);
    }
}
