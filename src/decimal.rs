//! Fixed-point decimal numbers.
//!
//! A [`Decimal`] is an integer mantissa plus a number of decimal places, so
//! `Decimal::new(12345, 2)` is `123.45`. Token amounts travel as decimals to
//! keep full precision through attribute marshalling.

use std::fmt;
use std::str::FromStr;

use crate::error::DecimalError;

/// Fixed-point decimal with an `i128` mantissa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal {
    value: i128,
    decimals: u32,
}

fn pow10(exp: u32) -> Result<i128, DecimalError> {
    10i128.checked_pow(exp).ok_or(DecimalError::Overflow)
}

impl Decimal {
    pub const fn new(value: i128, decimals: u32) -> Self {
        Self { value, decimals }
    }

    /// Raw mantissa.
    pub fn mantissa(&self) -> i128 {
        self.value
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn is_negative(&self) -> bool {
        self.value < 0
    }

    /// Parse a plain decimal string such as `-12.5` or `.75`.
    ///
    /// The number of fractional digits becomes the scale, so `"1.500"`
    /// parses with 3 decimals.
    pub fn parse(input: &str) -> Result<Self, DecimalError> {
        let s = input.trim();
        let invalid = || DecimalError::Invalid(input.to_string());

        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let mut value: i128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(i128::from(b - b'0')))
                .ok_or(DecimalError::Overflow)?;
        }
        if negative {
            value = -value;
        }

        Ok(Self {
            value,
            decimals: frac_part.len() as u32,
        })
    }

    /// Convert a float via its shortest round-trip representation.
    pub fn from_f64(value: f64) -> Result<Self, DecimalError> {
        if !value.is_finite() {
            return Err(DecimalError::NotFinite);
        }
        Self::parse(&format!("{value}"))
    }

    /// Change the number of decimal places, truncating toward zero when
    /// precision is dropped.
    pub fn rebase(&self, decimals: u32) -> Result<Self, DecimalError> {
        if decimals >= self.decimals {
            let factor = pow10(decimals - self.decimals)?;
            let value = self.value.checked_mul(factor).ok_or(DecimalError::Overflow)?;
            Ok(Self { value, decimals })
        } else {
            let factor = pow10(self.decimals - decimals)?;
            Ok(Self {
                value: self.value / factor,
                decimals,
            })
        }
    }

    /// Like [`rebase`](Self::rebase) but rounds half away from zero.
    pub fn round(&self, decimals: u32) -> Result<Self, DecimalError> {
        if decimals >= self.decimals {
            return self.rebase(decimals);
        }
        let factor = pow10(self.decimals - decimals)?;
        let mut quotient = self.value / factor;
        let remainder = self.value % factor;
        if remainder.unsigned_abs() * 2 >= factor.unsigned_abs() {
            quotient += self.value.signum();
        }
        Ok(Self {
            value: quotient,
            decimals,
        })
    }

    pub fn to_f64(&self) -> f64 {
        self.value as f64 / 10f64.powi(self.decimals as i32)
    }

    /// Human-readable form: at most `max_fraction` fractional digits (rounded),
    /// trailing zeros dropped, integer part grouped by thousands.
    ///
    /// `Decimal::parse("1234567.891").format_grouped(2)` gives `"1,234,567.89"`.
    pub fn format_grouped(&self, max_fraction: u32) -> String {
        let rounded = self.round(max_fraction).unwrap_or(*self);
        let plain = rounded.to_string();

        let (sign, unsigned) = match plain.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", plain.as_str()),
        };
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f.trim_end_matches('0')),
            None => (unsigned, ""),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if rounded.value == 0 { "" } else { sign };
        if frac_part.is_empty() {
            format!("{sign}{grouped}")
        } else {
            format!("{sign}{grouped}.{frac_part}")
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.value.unsigned_abs().to_string();
        let scale = self.decimals as usize;
        let sign = if self.value < 0 { "-" } else { "" };

        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }

        let padded = if digits.len() <= scale {
            format!("{}{digits}", "0".repeat(scale - digits.len() + 1))
        } else {
            digits
        };
        let split = padded.len() - scale;
        write!(f, "{sign}{}.{}", &padded[..split], &padded[split..])
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// =============================================================================
// Tests
// =============================================================================
