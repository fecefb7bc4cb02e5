use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::EngineError;

/// Signed money amount represented as **whole currency units**.
///
/// Use this type for **all** monetary values in the engine (record values,
/// liability balances, cashflow totals). Fractional input is truncated toward
/// zero when converting from [`Decimal`], which is the precision the ledger
/// stores at rest.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(200_000);
/// assert_eq!(amount.units(), 200_000);
/// assert_eq!(amount.to_string(), "200000");
/// ```
///
/// Parsing stored plaintext (integer text, or decimal text which is
/// truncated):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("1500".parse::<Money>().unwrap().units(), 1500);
/// assert_eq!("12.9".parse::<Money>().unwrap().units(), 12);
/// assert!("abc".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from whole units.
    #[must_use]
    pub const fn new(units: i64) -> Self {
        Self(units)
    }

    /// Returns the raw value in whole units.
    #[must_use]
    pub const fn units(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// The amount as a [`Decimal`] with no fractional digits.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl TryFrom<Decimal> for Money {
    type Error = EngineError;

    /// Truncates toward zero; rejects values outside the `i64` range.
    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        value
            .trunc()
            .to_i64()
            .map(Money)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses decrypted plaintext.
    ///
    /// Any decimal text is accepted and truncated to whole units; anything
    /// else is a [`EngineError::Parse`], which signals corrupted data or a
    /// scope mismatch rather than bad user input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::Parse("empty amount".to_string()));
        }

        let decimal = Decimal::from_str(trimmed)
            .map_err(|_| EngineError::Parse(format!("not a number: {trimmed:?}")))?;

        decimal
            .trunc()
            .to_i64()
            .map(Money)
            .ok_or_else(|| EngineError::Parse("amount out of range".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_plain_integer_text() {
        assert_eq!(Money::new(0).to_string(), "0");
        assert_eq!(Money::new(200_000).to_string(), "200000");
        assert_eq!(Money::new(-1050).to_string(), "-1050");
    }

    #[test]
    fn parse_accepts_integer_and_truncates_decimals() {
        assert_eq!("10".parse::<Money>().unwrap().units(), 10);
        assert_eq!("-7".parse::<Money>().unwrap().units(), -7);
        assert_eq!(" 42 ".parse::<Money>().unwrap().units(), 42);
        assert_eq!("12.99".parse::<Money>().unwrap().units(), 12);
        assert_eq!("-12.99".parse::<Money>().unwrap().units(), -12);
    }

    #[test]
    fn parse_rejects_non_numeric_text() {
        assert!(matches!("".parse::<Money>(), Err(EngineError::Parse(_))));
        assert!(matches!("12a".parse::<Money>(), Err(EngineError::Parse(_))));
        assert!(matches!("ten".parse::<Money>(), Err(EngineError::Parse(_))));
    }

    #[test]
    fn decimal_conversion_truncates_toward_zero() {
        assert_eq!(Money::try_from(Decimal::new(150_075, 2)).unwrap(), Money::new(1500));
        assert_eq!(Money::try_from(Decimal::new(-150_075, 2)).unwrap(), Money::new(-1500));
        assert_eq!(Money::try_from(Decimal::MAX).unwrap_err(), EngineError::InvalidAmount("amount too large".to_string()));
    }

    #[test]
    fn sum_and_arithmetic() {
        let total: Money = [Money::new(5), Money::new(-2), Money::new(10)].into_iter().sum();
        assert_eq!(total, Money::new(13));
        assert_eq!(Money::new(5) - Money::new(8), Money::new(-3));
        assert_eq!(-Money::new(4), Money::new(-4));
    }
}
