//! Numeral encodings for counter and RAM devices.
//!
//! Numbers cross the device boundary as symbol strings. Two families are
//! supported:
//! - positional b-ary: digit `i` has value `i`, most significant first,
//!   zero renders as the first digit;
//! - bijective b-adic: digit `i` has value `i + 1`, zero renders as the
//!   empty string. Base 1 is unary.
//!
//! Signed values carry a leading `-`. Parsing the empty string yields zero
//! in both families.

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

use crate::error::DeviceError;

/// A digit set plus a numeral family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Numeral {
    digits: Vec<char>,
    bijective: bool,
}

impl Numeral {
    /// Positional numerals over `digits` (at least two).
    ///
    /// # Errors
    ///
    /// Fails on fewer than two digits, repeated digits, or a `-` digit.
    pub fn positional(digits: &str) -> Result<Self, DeviceError> {
        Self::build(digits, false)
    }

    /// Bijective numerals over `digits` (at least one).
    ///
    /// # Errors
    ///
    /// Fails on an empty digit set, repeated digits, or a `-` digit.
    pub fn bijective(digits: &str) -> Result<Self, DeviceError> {
        Self::build(digits, true)
    }

    /// Plain decimal.
    #[must_use]
    pub fn decimal() -> Self {
        Self {
            digits: "0123456789".chars().collect(),
            bijective: false,
        }
    }

    fn build(digits: &str, bijective: bool) -> Result<Self, DeviceError> {
        let chars: Vec<char> = digits.chars().collect();
        let min = if bijective { 1 } else { 2 };
        if chars.len() < min {
            return Err(DeviceError::NumeralBase {
                min,
                found: chars.len(),
            });
        }
        if chars.contains(&'-') {
            return Err(DeviceError::SignDigit);
        }
        for (i, ch) in chars.iter().enumerate() {
            if chars[..i].contains(ch) {
                return Err(DeviceError::DuplicateSymbol(*ch));
            }
        }
        Ok(Self {
            digits: chars,
            bijective,
        })
    }

    /// Number base.
    #[must_use]
    pub fn base(&self) -> usize {
        self.digits.len()
    }

    /// Whether this is a bijective (b-adic) encoding.
    #[must_use]
    pub fn is_bijective(&self) -> bool {
        self.bijective
    }

    /// Digit set, rendered.
    #[must_use]
    pub fn digits(&self) -> String {
        self.digits.iter().collect()
    }

    fn digit_value(&self, ch: char) -> Option<usize> {
        let position = self.digits.iter().position(|&d| d == ch)?;
        Some(if self.bijective { position + 1 } else { position })
    }

    fn invalid(&self, text: &str) -> DeviceError {
        DeviceError::InvalidNumeral {
            text: text.to_string(),
            digits: self.digits(),
        }
    }

    /// Parse a non-negative number.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNumeral` if any character is not a digit.
    pub fn parse_unsigned(&self, text: &str) -> Result<BigUint, DeviceError> {
        let base = BigUint::from(self.base());
        let mut value = BigUint::zero();
        for ch in text.chars() {
            let digit = self.digit_value(ch).ok_or_else(|| self.invalid(text))?;
            value = value * &base + BigUint::from(digit);
        }
        Ok(value)
    }

    /// Parse a number with an optional leading `-`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNumeral` if the magnitude is not a numeral.
    pub fn parse_signed(&self, text: &str) -> Result<BigInt, DeviceError> {
        let (sign, magnitude) = match text.strip_prefix('-') {
            Some(rest) => (Sign::Minus, rest),
            None => (Sign::Plus, text),
        };
        let magnitude = self
            .parse_unsigned(magnitude)
            .map_err(|_| self.invalid(text))?;
        Ok(BigInt::from_biguint(sign, magnitude))
    }

    /// Render a non-negative number.
    #[must_use]
    pub fn render_unsigned(&self, value: &BigUint) -> String {
        if value.is_zero() {
            return if self.bijective {
                String::new()
            } else {
                self.digits[0].to_string()
            };
        }
        let base = BigUint::from(self.base());
        let mut rest = value.clone();
        let mut out = Vec::new();
        while !rest.is_zero() {
            let (quotient, remainder) = rest.div_rem(&base);
            let remainder = remainder.to_usize().expect("remainder below base");
            if self.bijective {
                if remainder == 0 {
                    out.push(self.digits[self.base() - 1]);
                    rest = quotient - BigUint::one();
                } else {
                    out.push(self.digits[remainder - 1]);
                    rest = quotient;
                }
            } else {
                out.push(self.digits[remainder]);
                rest = quotient;
            }
        }
        out.iter().rev().collect()
    }

    /// Render a number, prefixing negatives with `-`.
    #[must_use]
    pub fn render_signed(&self, value: &BigInt) -> String {
        let magnitude = self.render_unsigned(value.magnitude());
        if value.sign() == Sign::Minus {
            format!("-{magnitude}")
        } else {
            magnitude
        }
    }
}

impl Default for Numeral {
    fn default() -> Self {
        Self::decimal()
    }
}
