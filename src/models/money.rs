//! Money type for representing euro amounts
//!
//! Internally stores amounts in cents (i64) to avoid floating-point precision
//! issues. Aggregations over `Money` are exact; rounding exists only at the
//! display boundary. Parsing follows the German decimal convention used by
//! bank exports (thousands separator `.`, decimal separator `,`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A monetary amount stored as euro cents
///
/// Negative amounts are expenses, positive amounts are income. The sign is
/// part of the value and is never altered implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole euros
    pub const fn from_euros(euros: i64) -> Self {
        Self(euros * 100)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the whole euros portion (truncated toward zero)
    pub const fn euros(&self) -> i64 {
        self.0 / 100
    }

    /// Get the cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is positive (income)
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Check if the amount is negative (expense)
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Re-sign this amount's magnitude to match the sign of `original`
    ///
    /// Edits in the UI supply a magnitude; the original sign of the edited
    /// transaction always wins so an edit can never flip expense to income.
    pub const fn resign_to(&self, original: Money) -> Self {
        if original.0 < 0 {
            Self(-self.0.abs())
        } else {
            Self(self.0.abs())
        }
    }

    /// Parse a German-formatted amount string ("1.234,56" -> 1234.56 EUR)
    ///
    /// Thousands separators (`.`) are stripped and the decimal comma is
    /// honored. A leading `-` or `+` sign is accepted. Returns `None` on
    /// anything unparseable; import mappers fall back to zero with a
    /// warning rather than failing the row.
    pub fn parse_de(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        // Strip thousands separators, then split on the decimal comma
        let cleaned: String = s.chars().filter(|c| *c != '.').collect();
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return None;
        }

        let (euro_str, cent_str) = match cleaned.split_once(',') {
            Some((e, c)) => (e, c),
            None => (cleaned, ""),
        };

        let euros: i64 = if euro_str.is_empty() {
            0
        } else {
            euro_str.parse().ok()?
        };

        let cents: i64 = match cent_str.len() {
            0 => 0,
            // Decimal digits only; a sign or stray symbol after the comma
            // makes the whole string unparseable
            _ if !cent_str.bytes().all(|b| b.is_ascii_digit()) => return None,
            1 => cent_str.parse::<i64>().ok()? * 10,
            // Bank exports carry at most two decimals; extra digits are
            // truncated rather than rounded
            _ => cent_str[..2].parse().ok()?,
        };

        let total = euros.checked_mul(100)?.checked_add(cents)?;
        Some(Self(if negative { -total } else { total }))
    }

    /// Format as a plain decimal string with German separators ("1.234,56")
    pub fn format_de(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let euros = self.euros().abs();
        let mut grouped = String::new();
        let digits = euros.to_string();
        let len = digits.len();
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        format!("{}{},{:02}", sign, grouped, self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} €", self.format_de())
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

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let m = Money::from_cents(1050);
        assert_eq!(m.cents(), 1050);
        assert_eq!(m.euros(), 10);
        assert_eq!(m.cents_part(), 50);
    }

    #[test]
    fn test_parse_de() {
        assert_eq!(Money::parse_de("1.234,56").unwrap().cents(), 123456);
        assert_eq!(Money::parse_de("-1.234,56").unwrap().cents(), -123456);
        assert_eq!(Money::parse_de("0,05").unwrap().cents(), 5);
        assert_eq!(Money::parse_de("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse_de("10,5").unwrap().cents(), 1050);
        assert_eq!(Money::parse_de("+3,00").unwrap().cents(), 300);
        assert_eq!(Money::parse_de("1.000.000,00").unwrap().cents(), 100_000_000);
    }

    #[test]
    fn test_parse_de_rejects_garbage() {
        assert!(Money::parse_de("").is_none());
        assert!(Money::parse_de("abc").is_none());
        assert!(Money::parse_de("12,3a").is_none());
        assert!(Money::parse_de("-").is_none());
        // Multibyte characters after the decimal comma must not panic
        assert!(Money::parse_de("1,5€").is_none());
        assert!(Money::parse_de("1,€50").is_none());
        assert!(Money::parse_de("1,-5").is_none());
    }

    #[test]
    fn test_parse_de_rejects_overflow() {
        // i64::MAX euros does not fit in cents
        assert!(Money::parse_de("9223372036854775807").is_none());
        assert!(Money::parse_de("-9223372036854775807,99").is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1050)), "10,50 €");
        assert_eq!(format!("{}", Money::from_cents(-123456)), "-1.234,56 €");
        assert_eq!(format!("{}", Money::from_cents(0)), "0,00 €");
        assert_eq!(format!("{}", Money::from_cents(5)), "0,05 €");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
    }

    #[test]
    fn test_resign_to() {
        let original = Money::from_cents(-5000);
        // Edited magnitude keeps the original expense sign
        assert_eq!(Money::from_cents(7500).resign_to(original).cents(), -7500);
        assert_eq!(Money::from_cents(-7500).resign_to(original).cents(), -7500);

        let income = Money::from_cents(5000);
        assert_eq!(Money::from_cents(-7500).resign_to(income).cents(), 7500);
    }

    #[test]
    fn test_sum() {
        let amounts = vec![
            Money::from_cents(100),
            Money::from_cents(200),
            Money::from_cents(-300),
        ];
        let total: Money = amounts.into_iter().sum();
        assert_eq!(total.cents(), 0);
    }

    #[test]
    fn test_serialization() {
        let m = Money::from_cents(1050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "1050");

        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deserialized);
    }
}
