//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are always non-negative. They are stored as decimal text so no
//! precision is lost in SQLite, which has no native decimal type.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a number")]
    NotANumber,
    /// The input is a negative number.
    #[error("price cannot be negative")]
    Negative,
    /// The input is above [`Price::MAX`].
    #[error("price cannot exceed {}", Price::MAX)]
    TooLarge,
    /// A line subtotal or total does not fit in a decimal.
    #[error("amount is too large")]
    Overflow,
}

/// A non-negative amount of money.
///
/// There is no currency attached: the shop sells in a single currency.
/// Entered unit prices are at most [`Price::MAX`]; stored totals may be
/// larger. Arithmetic is checked and reports [`PriceError::Overflow`].
///
/// ## Examples
///
/// ```
/// use shopfront_core::Price;
///
/// assert_eq!(Price::parse("10").unwrap().to_string(), "10.00");
/// assert_eq!(Price::parse("").unwrap(), Price::ZERO);
/// assert!(Price::parse("-1").is_err());
/// assert!(Price::parse("ten").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "Decimal", try_from = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest unit price [`Price::parse`] accepts (one billion).
    pub const MAX: Self = Self(Decimal::from_parts(1_000_000_000, 0, 0, false, 0));

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount.normalize()))
    }

    /// Parse a unit price from user input.
    ///
    /// Surrounding whitespace is ignored and an empty string is a zero price.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal number, is negative,
    /// or is above [`Price::MAX`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::ZERO);
        }
        let price = Self::from_decimal_str(s)?;
        if price > Self::MAX {
            return Err(PriceError::TooLarge);
        }
        Ok(price)
    }

    fn from_decimal_str(s: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(s).map_err(|_| PriceError::NotANumber)?;
        Self::new(amount)
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the product does not fit.
    pub fn times(self, quantity: u32) -> Result<Self, PriceError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Self)
            .ok_or(PriceError::Overflow)
    }

    /// Sum of two amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the sum does not fit.
    pub fn checked_add(self, rhs: Self) -> Result<Self, PriceError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(PriceError::Overflow)
    }

    /// Sum of all amounts, zero when empty.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the running total does not fit.
    pub fn total(amounts: impl IntoIterator<Item = Self>) -> Result<Self, PriceError> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, Self::checked_add)
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// SQLx support (with sqlite feature), stored as decimal TEXT
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Price {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Price {
    fn decode(
        value: <sqlx::Sqlite as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self::from_decimal_str(&s)?)
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode(self.0.to_string(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Price::parse("10").unwrap().amount(), Decimal::from(10));
        assert_eq!(Price::parse(" 2.50 ").unwrap().to_string(), "2.50");
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
    }

    #[test]
    fn test_parse_empty_is_zero() {
        assert_eq!(Price::parse("").unwrap(), Price::ZERO);
        assert_eq!(Price::parse("   ").unwrap(), Price::ZERO);
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(Price::parse("-0.01"), Err(PriceError::Negative));
    }

    #[test]
    fn test_parse_not_a_number() {
        assert_eq!(Price::parse("abc"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse("1,5"), Err(PriceError::NotANumber));
    }

    #[test]
    fn test_times_and_total() {
        let p1 = Price::parse("10").unwrap();
        let p2 = Price::parse("5").unwrap();
        let total = Price::total([p1.times(2).unwrap(), p2.times(1).unwrap()]).unwrap();
        assert_eq!(total, Price::parse("25").unwrap());
        assert_eq!(Price::total([]).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_parse_rejects_amounts_above_max() {
        assert_eq!(Price::parse("1000000000").unwrap(), Price::MAX);
        assert_eq!(
            Price::parse("1000000000.01"),
            Err(PriceError::TooLarge)
        );
        assert_eq!(
            Price::parse("50000000000000000000000000000"),
            Err(PriceError::TooLarge)
        );
        assert_eq!(
            Price::parse("79228162514264337593543950335"),
            Err(PriceError::TooLarge)
        );
    }

    #[test]
    fn test_largest_line_does_not_overflow() {
        let line = Price::MAX.times(u32::MAX).unwrap();
        assert_eq!(
            line.amount(),
            Decimal::from(1_000_000_000_u64) * Decimal::from(u32::MAX)
        );
        assert!(Price::total([line, line, line]).is_ok());
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let huge = Price(Decimal::MAX);
        assert_eq!(huge.times(2), Err(PriceError::Overflow));
        assert_eq!(huge.checked_add(Price::MAX), Err(PriceError::Overflow));
        assert_eq!(Price::total([huge, huge]), Err(PriceError::Overflow));
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        let ok: Price = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(ok, Price::parse("12.5").unwrap());
        assert!(serde_json::from_str::<Price>("\"-1\"").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"12.5\"");
    }

    #[test]
    fn test_equal_amounts_compare_equal_regardless_of_scale() {
        assert_eq!(Price::parse("10.00").unwrap(), Price::parse("10").unwrap());
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::parse("3.5").unwrap().to_string(), "3.50");
        assert_eq!(Price::ZERO.to_string(), "0.00");
    }
}
