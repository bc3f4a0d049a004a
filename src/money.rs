//! Monetary amounts with at most two decimal places, stored as integer cents.

use std::{fmt, str::FromStr};

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Error;

/// A signed amount of money with at most two decimal places.
///
/// Every `Money` fits in an `i64` number of cents, which is how it is stored in
/// the database. Amounts are written to clients as decimal strings with exactly
/// two decimal places, e.g. `"-12.30"`, and may be read from either a string or
/// a JSON number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    /// Zero dollars and zero cents.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Create an amount from a whole number of cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Create an amount from a decimal.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `value` has more than two decimal
    /// places (ignoring trailing zeros) or does not fit in an `i64` of cents.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        let value = value.normalize();

        if value.scale() > 2 {
            return Err(Error::InvalidAmount(format!(
                "{value} has more than two decimal places"
            )));
        }

        Self::checked(value).ok_or_else(|| Error::InvalidAmount(format!("{value} is too large")))
    }

    /// `value` as money, or `None` if it does not fit in an `i64` of cents.
    fn checked(value: Decimal) -> Option<Self> {
        to_cents(value).map(|_| Self(value))
    }

    /// Whether the amount is at least one cent.
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Addition that returns `None` if the sum cannot be stored.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).and_then(Self::checked)
    }

    /// Subtraction that returns `None` if the difference cannot be stored.
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).and_then(Self::checked)
    }
}

fn to_cents(value: Decimal) -> Option<i64> {
    value.checked_mul(Decimal::ONE_HUNDRED)?.to_i64()
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = Error;

    /// Parse a decimal string such as `"12"`, `"12.3"` or `"-12.34"`.
    ///
    /// More than two decimal places is an error rather than being rounded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| Error::InvalidAmount(format!("\"{s}\" is not a decimal number")))?;

        Self::new(value)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;

        Money::new(value).map_err(de::Error::custom)
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        to_cents(self.0).map(ToSqlOutput::from).ok_or_else(|| {
            rusqlite::Error::ToSqlConversionFailure(format!("{self} is too large").into())
        })
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Money::from_cents)
    }
}

#[cfg(test)]
mod money_tests {
    use std::str::FromStr;

    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::Error;

    use super::Money;

    #[test]
    fn display_pads_cents() {
        assert_eq!(Money::from_cents(10_000).to_string(), "100.00");
        assert_eq!(Money::from_cents(1_205).to_string(), "12.05");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn parse_accepts_up_to_two_decimal_places() {
        assert_eq!(Money::from_str("12").unwrap(), Money::from_cents(1_200));
        assert_eq!(Money::from_str("12.3").unwrap(), Money::from_cents(1_230));
        assert_eq!(Money::from_str("12.300").unwrap(), Money::from_cents(1_230));
        assert_eq!(Money::from_str("0.01").unwrap(), Money::from_cents(1));
        assert_eq!(Money::from_str("-7.50").unwrap(), Money::from_cents(-750));
    }

    #[test]
    fn parse_rejects_extra_precision_and_garbage() {
        assert!(matches!(
            Money::from_str("12.345"),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(Money::from_str("abc"), Err(Error::InvalidAmount(_))));
        assert!(matches!(Money::from_str(""), Err(Error::InvalidAmount(_))));
        assert!(matches!(
            Money::from_str("99999999999999999999"),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn new_checks_scale() {
        assert_eq!(Money::new(dec!(4.5)), Ok(Money::from_cents(450)));
        assert!(matches!(Money::new(dec!(0.001)), Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn deserialize_from_string_or_number() {
        let from_string: Money = serde_json::from_value(json!("100.50")).unwrap();
        let from_float: Money = serde_json::from_value(json!(100.5)).unwrap();
        let from_integer: Money = serde_json::from_value(json!(100)).unwrap();

        assert_eq!(from_string, Money::from_cents(10_050));
        assert_eq!(from_float, Money::from_cents(10_050));
        assert_eq!(from_integer, Money::from_cents(10_000));
    }

    #[test]
    fn deserialize_rejects_fractions_of_a_cent() {
        assert!(serde_json::from_value::<Money>(json!("1.005")).is_err());
        assert!(serde_json::from_value::<Money>(json!(1.005)).is_err());
    }

    #[test]
    fn serialize_as_two_decimal_string() {
        let value = serde_json::to_value(Money::from_cents(20_000)).unwrap();

        assert_eq!(value, json!("200.00"));
    }

    #[test]
    fn checked_arithmetic_stays_within_cents_range() {
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
        assert_eq!(
            Money::from_cents(500).checked_sub(Money::from_cents(800)),
            Some(Money::from_cents(-300))
        );
    }

    #[test]
    fn stored_as_integer_cents() {
        let connection = Connection::open_in_memory().unwrap();
        let amount = Money::from_str("12.34").unwrap();

        let (stored, read_back): (i64, Money) = connection
            .query_row("SELECT ?1, ?1", (amount,), |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap();

        assert_eq!(stored, 1_234);
        assert_eq!(read_back, amount);
    }
}
