//! Signed and unsigned counters over arbitrary-precision integers.

use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, Zero};

use crate::device::DeviceKind;
use crate::error::DeviceError;
use crate::numeral::Numeral;
use crate::terminator::{Initialiser, Terminator};
use crate::text::Tokens;

fn check_terminator(kind: DeviceKind, terminator: &Terminator) -> Result<(), DeviceError> {
    match terminator {
        Terminator::Always | Terminator::Zero => Ok(()),
        other => Err(DeviceError::UnsupportedTerminator {
            kind,
            terminator: other.name(),
        }),
    }
}

/// Signed counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    numeral: Numeral,
    initialiser: Initialiser,
    terminator: Terminator,
    value: BigInt,
}

impl Counter {
    /// Create a counter.
    ///
    /// # Errors
    ///
    /// Only the `Always` and `Zero` terminators are supported.
    pub fn new(
        numeral: Numeral,
        initialiser: Initialiser,
        terminator: Terminator,
    ) -> Result<Self, DeviceError> {
        check_terminator(DeviceKind::Counter, &terminator)?;
        Ok(Self {
            numeral,
            initialiser,
            terminator,
            value: BigInt::zero(),
        })
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> &BigInt {
        &self.value
    }

    /// Numeral encoding used for input and output.
    #[must_use]
    pub fn numeral(&self) -> &Numeral {
        &self.numeral
    }

    pub(crate) fn initialise(&mut self, input: &str) -> Result<(), DeviceError> {
        self.value = match self.initialiser {
            Initialiser::Blank => BigInt::zero(),
            Initialiser::Input => self.numeral.parse_signed(input)?,
        };
        Ok(())
    }

    pub(crate) fn initialiser(&self) -> Initialiser {
        self.initialiser
    }

    pub(crate) fn terminating(&self) -> bool {
        match self.terminator {
            Terminator::Always => true,
            Terminator::Zero => self.value.is_zero(),
            _ => false,
        }
    }

    pub(crate) fn terminate(&self) -> String {
        self.numeral.render_signed(&self.value)
    }

    pub(crate) fn terminator(&self) -> Terminator {
        self.terminator.clone()
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Signed counter operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterOp {
    /// Leave the value alone.
    Noop,
    /// Add one.
    Inc,
    /// Subtract one.
    Dec,
    /// Require zero.
    Zero,
    /// Require a value above zero.
    Positive,
    /// Require a value below zero.
    Negative,
}

const COUNTER_KEYWORDS: [(&str, CounterOp); 6] = [
    ("noop", CounterOp::Noop),
    ("inc", CounterOp::Inc),
    ("dec", CounterOp::Dec),
    ("zero", CounterOp::Zero),
    ("positive", CounterOp::Positive),
    ("negative", CounterOp::Negative),
];

impl CounterOp {
    fn test(self) -> bool {
        matches!(self, Self::Zero | Self::Positive | Self::Negative)
    }

    pub(crate) fn applicable(&self, counter: &Counter) -> bool {
        match self {
            Self::Noop | Self::Inc | Self::Dec => true,
            Self::Zero => counter.value.is_zero(),
            Self::Positive => counter.value.is_positive(),
            Self::Negative => counter.value.is_negative(),
        }
    }

    pub(crate) fn apply(&self, counter: &mut Counter) {
        match self {
            Self::Inc => counter.value += BigInt::one(),
            Self::Dec => counter.value -= BigInt::one(),
            Self::Noop | Self::Zero | Self::Positive | Self::Negative => {}
        }
    }

    pub(crate) fn intersects(&self, other: &Self) -> bool {
        !(self.test() && other.test()) || self == other
    }

    pub(crate) fn intersects_terminator(&self, terminator: &Terminator) -> bool {
        match terminator {
            Terminator::Always => true,
            Terminator::Zero => !matches!(self, Self::Positive | Self::Negative),
            _ => false,
        }
    }

    pub(crate) fn parse(text: &str) -> Result<Self, DeviceError> {
        let mut tokens = Tokens::new(DeviceKind::Counter, text);
        let word = tokens.expect("a counter operation")?;
        let op = COUNTER_KEYWORDS
            .iter()
            .find(|(keyword, _)| *keyword == word)
            .map(|(_, op)| *op)
            .ok_or_else(|| tokens.error(format!("unknown keyword `{word}`")))?;
        tokens.finish()?;
        Ok(op)
    }
}

impl fmt::Display for CounterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (keyword, _) = COUNTER_KEYWORDS
            .iter()
            .find(|(_, op)| op == self)
            .copied()
            .unwrap_or(("noop", Self::Noop));
        f.write_str(keyword)
    }
}

/// Counter that never goes below zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedCounter {
    numeral: Numeral,
    initialiser: Initialiser,
    terminator: Terminator,
    value: BigUint,
}

impl UnsignedCounter {
    /// Create an unsigned counter.
    ///
    /// # Errors
    ///
    /// Only the `Always` and `Zero` terminators are supported.
    pub fn new(
        numeral: Numeral,
        initialiser: Initialiser,
        terminator: Terminator,
    ) -> Result<Self, DeviceError> {
        check_terminator(DeviceKind::UnsignedCounter, &terminator)?;
        Ok(Self {
            numeral,
            initialiser,
            terminator,
            value: BigUint::zero(),
        })
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// Numeral encoding used for input and output.
    #[must_use]
    pub fn numeral(&self) -> &Numeral {
        &self.numeral
    }

    pub(crate) fn initialise(&mut self, input: &str) -> Result<(), DeviceError> {
        self.value = match self.initialiser {
            Initialiser::Blank => BigUint::zero(),
            Initialiser::Input => self.numeral.parse_unsigned(input)?,
        };
        Ok(())
    }

    pub(crate) fn initialiser(&self) -> Initialiser {
        self.initialiser
    }

    pub(crate) fn terminating(&self) -> bool {
        match self.terminator {
            Terminator::Always => true,
            Terminator::Zero => self.value.is_zero(),
            _ => false,
        }
    }

    pub(crate) fn terminate(&self) -> String {
        self.numeral.render_unsigned(&self.value)
    }

    pub(crate) fn terminator(&self) -> Terminator {
        self.terminator.clone()
    }
}

impl fmt::Display for UnsignedCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Unsigned counter operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsignedCounterOp {
    /// Leave the value alone.
    Noop,
    /// Add one.
    Inc,
    /// Subtract one; needs a positive value.
    Dec,
    /// Require zero.
    Zero,
    /// Require a value above zero.
    Positive,
}

const UNSIGNED_KEYWORDS: [(&str, UnsignedCounterOp); 5] = [
    ("noop", UnsignedCounterOp::Noop),
    ("inc", UnsignedCounterOp::Inc),
    ("dec", UnsignedCounterOp::Dec),
    ("zero", UnsignedCounterOp::Zero),
    ("positive", UnsignedCounterOp::Positive),
];

impl UnsignedCounterOp {
    fn needs_positive(self) -> bool {
        matches!(self, Self::Dec | Self::Positive)
    }

    pub(crate) fn applicable(&self, counter: &UnsignedCounter) -> bool {
        match self {
            Self::Noop | Self::Inc => true,
            Self::Zero => counter.value.is_zero(),
            Self::Dec | Self::Positive => !counter.value.is_zero(),
        }
    }

    pub(crate) fn apply(&self, counter: &mut UnsignedCounter) {
        match self {
            Self::Inc => counter.value += BigUint::one(),
            Self::Dec => counter.value -= BigUint::one(),
            Self::Noop | Self::Zero | Self::Positive => {}
        }
    }

    pub(crate) fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Zero, b) | (b, Self::Zero) => !b.needs_positive(),
            _ => true,
        }
    }

    pub(crate) fn intersects_terminator(&self, terminator: &Terminator) -> bool {
        match terminator {
            Terminator::Always => true,
            Terminator::Zero => !self.needs_positive(),
            _ => false,
        }
    }

    pub(crate) fn parse(text: &str) -> Result<Self, DeviceError> {
        let mut tokens = Tokens::new(DeviceKind::UnsignedCounter, text);
        let word = tokens.expect("a counter operation")?;
        let op = UNSIGNED_KEYWORDS
            .iter()
            .find(|(keyword, _)| *keyword == word)
            .map(|(_, op)| *op)
            .ok_or_else(|| tokens.error(format!("unknown keyword `{word}`")))?;
        tokens.finish()?;
        Ok(op)
    }
}

impl fmt::Display for UnsignedCounterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (keyword, _) = UNSIGNED_KEYWORDS
            .iter()
            .find(|(_, op)| op == self)
            .copied()
            .unwrap_or(("noop", Self::Noop));
        f.write_str(keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_counter_goes_negative() {
        let mut counter =
            Counter::new(Numeral::decimal(), Initialiser::Input, Terminator::Zero).unwrap();
        counter.initialise("1").unwrap();
        CounterOp::Dec.apply(&mut counter);
        assert!(counter.terminating());
        CounterOp::Dec.apply(&mut counter);
        assert!(CounterOp::Negative.applicable(&counter));
        assert_eq!(counter.terminate(), "-1");
    }

    #[test]
    fn test_unsigned_dec_needs_positive() {
        let counter =
            UnsignedCounter::new(Numeral::decimal(), Initialiser::Blank, Terminator::Zero).unwrap();
        assert!(!UnsignedCounterOp::Dec.applicable(&counter));
        assert!(!UnsignedCounterOp::Dec.intersects(&UnsignedCounterOp::Zero));
        assert!(UnsignedCounterOp::Dec.intersects(&UnsignedCounterOp::Positive));
        assert!(!UnsignedCounterOp::Dec.intersects_terminator(&Terminator::Zero));
    }

    #[test]
    fn test_sign_tests_are_exclusive() {
        use CounterOp::*;
        assert!(!Zero.intersects(&Positive));
        assert!(!Positive.intersects(&Negative));
        assert!(Zero.intersects(&Zero));
        assert!(Inc.intersects(&Negative));
        assert!(!Negative.intersects_terminator(&Terminator::Zero));
    }

    #[test]
    fn test_keywords_round_trip() {
        for (keyword, op) in COUNTER_KEYWORDS {
            assert_eq!(CounterOp::parse(keyword), Ok(op));
            assert_eq!(op.to_string(), keyword);
        }
        assert!(UnsignedCounterOp::parse("negative").is_err());
        assert!(Counter::new(Numeral::decimal(), Initialiser::Blank, Terminator::Home).is_err());
    }
}
