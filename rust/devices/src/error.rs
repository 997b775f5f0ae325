//! Errors raised while building devices, operations and device inputs.

use crate::alphabet::Symbol;
use crate::device::DeviceKind;

/// Errors from device and operation construction.
///
/// These describe malformed programs or malformed inputs. Invariant
/// violations at run time (applying an operation that is not applicable,
/// terminating a device that is not terminating) panic instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// An alphabet was declared without symbols.
    #[error("alphabet is empty")]
    EmptyAlphabet,
    /// An alphabet or digit set lists the same character twice.
    #[error("character {0:?} appears twice")]
    DuplicateSymbol(char),
    /// A character is not part of the device alphabet.
    #[error("{symbol:?} is not in alphabet {alphabet:?}")]
    UnknownSymbol {
        /// Offending character.
        symbol: char,
        /// The alphabet, rendered.
        alphabet: String,
    },
    /// A symbol code lies outside the alphabet bound.
    #[error("symbol {symbol} exceeds alphabet bound {bound}")]
    SymbolOutOfRange {
        /// Offending code.
        symbol: Symbol,
        /// Alphabet bound.
        bound: u32,
    },
    /// A numeral encoding has too few digits for its family.
    #[error("numeral needs at least {min} digits, got {found}")]
    NumeralBase {
        /// Minimum digit count.
        min: usize,
        /// Declared digit count.
        found: usize,
    },
    /// `-` is reserved for the sign.
    #[error("'-' cannot be used as a numeral digit")]
    SignDigit,
    /// Text does not spell a number in the device's numeral encoding.
    #[error("{text:?} is not a numeral over digits {digits:?}")]
    InvalidNumeral {
        /// Offending text.
        text: String,
        /// The digit set, rendered.
        digits: String,
    },
    /// The device kind has no notion of this termination condition.
    #[error("{kind} devices do not support the {terminator} terminator")]
    UnsupportedTerminator {
        /// Device kind.
        kind: DeviceKind,
        /// Terminator name.
        terminator: &'static str,
    },
    /// A register index is out of range.
    #[error("register r{register} out of range for {count} registers")]
    RegisterOutOfRange {
        /// Offending register.
        register: usize,
        /// Registers available.
        count: usize,
    },
    /// RAM devices need an accumulator.
    #[error("ram devices need at least one register")]
    NoRegisters,
    /// More registers were declared than a RAM device supports.
    #[error("{count} registers declared, at most {max} supported")]
    TooManyRegisters {
        /// Declared count.
        count: usize,
        /// Supported maximum.
        max: usize,
    },
    /// An operation was validated against a device of another kind.
    #[error("{operation} operation cannot drive a {device} device")]
    WrongKind {
        /// Kind the operation belongs to.
        operation: DeviceKind,
        /// Kind of the device it was paired with.
        device: DeviceKind,
    },
    /// Operation text could not be parsed.
    #[error("cannot parse {kind} operation {text:?}: {reason}")]
    Syntax {
        /// Device kind the text was parsed for.
        kind: DeviceKind,
        /// Offending text.
        text: String,
        /// What went wrong.
        reason: String,
    },
}
