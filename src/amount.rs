use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when a value cannot be turned into an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("'{0}' is not a decimal number")]
    NotNumeric(String),
    #[error("amount is not a finite number")]
    NonFinite,
    #[error("amount is out of range")]
    Overflow,
    #[error("'{0}' has more than 4 decimal places")]
    Precision(String),
}

/// What to do with digits past the fourth decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round half away from zero.
    HalfAwayFromZero,
    /// Round toward negative infinity, so the result never exceeds the input.
    Floor,
    /// Refuse to drop any nonzero digit.
    Exact,
}

/// Fixed-point decimal with 4 decimal places, stored as a scaled integer.
///
/// The range is that of `i64` scaled down by 10 000, about ±922 337 203 685 477.
/// Anything larger fails with [`AmountError::Overflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    const SCALE: i64 = 10_000;
    const DECIMALS: u32 = 4;

    pub const ZERO: Amount = Amount(0);

    pub fn from_scaled(value: i64) -> Self {
        Amount(value)
    }

    /// Convert a float, rounding to the nearest ten-thousandth.
    pub fn from_float(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NonFinite);
        }
        let scaled = (value * Self::SCALE as f64).round();
        // i64::MAX as f64 rounds up to 2^63, which is itself out of range
        if scaled >= i64::MAX as f64 || scaled < i64::MIN as f64 {
            return Err(AmountError::Overflow);
        }
        Ok(Amount(scaled as i64))
    }

    /// Convert a float through its shortest decimal form, so `0.1` is exactly
    /// one tenth rather than the nearest binary fraction.
    pub fn from_float_with(value: f64, rounding: Rounding) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NonFinite);
        }
        Self::parse_with(&value.to_string(), rounding)
    }

    /// Parse decimal text, treating digits past the fourth decimal per `rounding`.
    pub fn parse_with(s: &str, rounding: Rounding) -> Result<Self, AmountError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }
        let not_numeric = || AmountError::NotNumeric(trimmed.to_string());

        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(not_numeric());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(not_numeric());
        }

        let mut scaled: i64 = 0;
        for digit in whole.bytes() {
            scaled = scaled
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(digit - b'0')))
                .ok_or(AmountError::Overflow)?;
        }

        let frac = frac.as_bytes();
        for place in 0..Self::DECIMALS as usize {
            let digit = frac.get(place).map_or(0, |d| i64::from(d - b'0'));
            scaled = scaled
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or(AmountError::Overflow)?;
        }

        let rest = frac.get(Self::DECIMALS as usize..).unwrap_or_default();
        let truncated = rest.iter().any(|&d| d != b'0');
        let bump = match rounding {
            Rounding::HalfAwayFromZero => rest.first().is_some_and(|&d| d >= b'5'),
            Rounding::Floor => negative && truncated,
            Rounding::Exact if truncated => {
                return Err(AmountError::Precision(trimmed.to_string()));
            }
            Rounding::Exact => false,
        };
        if bump {
            scaled = scaled.checked_add(1).ok_or(AmountError::Overflow)?;
        }

        Ok(Amount(if negative { -scaled } else { scaled }))
    }

    pub fn scaled(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Render with `places` decimals (at most 4), rounding half away from zero.
    pub fn to_fixed(self, places: u32) -> String {
        let places = places.min(Self::DECIMALS);
        let step = 10u64.pow(Self::DECIMALS - places);
        let abs = self.0.unsigned_abs();
        let rounded = abs / step + u64::from(abs % step >= step.div_ceil(2) && step > 1);

        let sign = if self.0 < 0 && rounded != 0 { "-" } else { "" };
        if places == 0 {
            return format!("{sign}{rounded}");
        }
        let unit = 10u64.pow(places);
        let whole = rounded / unit;
        let frac = rounded % unit;
        format!("{sign}{whole}.{frac:0width$}", width = places as usize)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / Self::SCALE as u64;
        let frac = abs % Self::SCALE as u64;
        write!(f, "{sign}{whole}.{frac:04}")
    }
}

/// Parses plain decimal text such as `"12.5"`, `"-3"` or `" 0.125 "`.
///
/// Digits past the fourth decimal are rounded half away from zero.
impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with(s, Rounding::HalfAwayFromZero)
    }
}

/// Amounts leave the crate as decimal strings so no precision is lost on the wire.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
