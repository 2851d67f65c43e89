//! Fixed-point LBC amounts.
//!
//! The ledger's smallest unit is 0.00000001 LBC (one dewey). Amounts are
//! stored as a signed count of deweys, so two amounts that print the same
//! with 8 decimals always compare equal.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::CoreError;

/// Number of decimal digits the daemon accepts.
pub const DECIMALS: u32 = 8;

/// Deweys in one LBC.
pub const DEWEYS_PER_LBC: i64 = 100_000_000;

/// An amount of LBC with exactly 8 decimal digits.
///
/// May be negative: a support adjustment can remove stake.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Self = Self(0);

    /// Create from a raw dewey count.
    pub const fn from_deweys(deweys: i64) -> Self {
        Self(deweys)
    }

    /// Raw dewey count.
    pub const fn as_deweys(self) -> i64 {
        self.0
    }

    /// Create from whole LBC.
    pub const fn from_lbc(lbc: i64) -> Self {
        Self(lbc * DEWEYS_PER_LBC)
    }

    /// Round a floating point LBC value to the nearest dewey.
    pub fn from_lbc_f64(lbc: f64) -> Result<Self, CoreError> {
        let deweys = (lbc * DEWEYS_PER_LBC as f64).round();
        if !deweys.is_finite() || deweys.abs() >= i64::MAX as f64 {
            return Err(CoreError::InvalidAmount(lbc.to_string()));
        }
        Ok(Self(deweys as i64))
    }

    /// Approximate value in LBC, for display and ratios only.
    pub fn to_lbc_f64(self) -> f64 {
        self.0 as f64 / DEWEYS_PER_LBC as f64
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let unit = DEWEYS_PER_LBC as u64;
        let text = format!("{sign}{}.{:08}", abs / unit, abs % unit);
        f.pad(&text)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({self})")
    }
}

/// Parses decimal strings such as `"12"`, `"0.5"` or `"-3.00000001"`.
///
/// Digits past the eighth decimal are rounded half-up.
impl FromStr for Amount {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidAmount(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };

        let mut frac: i64 = 0;
        for (i, b) in frac_part.bytes().enumerate() {
            let digit = i64::from(b - b'0');
            if i < DECIMALS as usize {
                frac = frac * 10 + digit;
            } else {
                if i == DECIMALS as usize && digit >= 5 {
                    frac += 1;
                }
                break;
            }
        }
        for _ in frac_part.len()..DECIMALS as usize {
            frac *= 10;
        }

        let deweys = whole
            .checked_mul(DEWEYS_PER_LBC)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -deweys } else { deweys }))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The daemon sends amounts as strings; numbers are accepted too.
impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => s.parse().map_err(D::Error::custom),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(whole) => whole
                    .checked_mul(DEWEYS_PER_LBC)
                    .map(Amount)
                    .ok_or_else(|| D::Error::custom(format!("amount out of range: {n}"))),
                None => Amount::from_lbc_f64(n.as_f64().unwrap_or(f64::NAN))
                    .map_err(D::Error::custom),
            },
            serde_json::Value::Null => Ok(Amount::ZERO),
            other => Err(D::Error::custom(format!("expected amount, got {other}"))),
        }
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
