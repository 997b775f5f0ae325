//! One-way, read-only input.

use std::fmt;
use std::sync::Arc;

use crate::alphabet::{Alphabet, Symbol};
use crate::device::DeviceKind;
use crate::error::DeviceError;
use crate::terminator::Terminator;
use crate::text::Tokens;

/// Input reader. Always loaded from the machine input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    alphabet: Arc<Alphabet>,
    terminator: Terminator,
    symbols: Vec<Symbol>,
    cursor: usize,
}

impl Input {
    /// Create an input reader.
    ///
    /// # Errors
    ///
    /// Only the `Always` and `Consumed` terminators are supported.
    pub fn new(alphabet: Arc<Alphabet>, terminator: Terminator) -> Result<Self, DeviceError> {
        if !matches!(terminator, Terminator::Always | Terminator::Consumed) {
            return Err(DeviceError::UnsupportedTerminator {
                kind: DeviceKind::Input,
                terminator: terminator.name(),
            });
        }
        Ok(Self {
            alphabet,
            terminator,
            symbols: Vec::new(),
            cursor: 0,
        })
    }

    /// Device alphabet.
    #[must_use]
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Next unread symbol.
    #[must_use]
    pub fn peek(&self) -> Option<Symbol> {
        self.symbols.get(self.cursor).copied()
    }

    /// Number of symbols read so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub(crate) fn initialise(&mut self, input: &str) -> Result<(), DeviceError> {
        self.symbols = self.alphabet.encode_str(input)?;
        self.cursor = 0;
        Ok(())
    }

    pub(crate) fn terminating(&self) -> bool {
        match self.terminator {
            Terminator::Always => true,
            Terminator::Consumed => self.cursor == self.symbols.len(),
            _ => false,
        }
    }

    pub(crate) fn terminate(&self) -> String {
        self.alphabet.render(&self.symbols[self.cursor..])
    }

    pub(crate) fn terminator(&self) -> Terminator {
        self.terminator.clone()
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (read, unread) = self.symbols.split_at(self.cursor);
        write!(
            f,
            "{}|{}",
            self.alphabet.render(read),
            self.alphabet.render(unread)
        )
    }
}

/// Input operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputOp {
    /// Leave the input alone.
    Noop,
    /// Read the given symbol.
    Scan(Symbol),
    /// Require the given symbol next, without reading it.
    Peek(Symbol),
    /// Read any one symbol.
    Skip,
    /// Require the input to be exhausted.
    End,
}

impl InputOp {
    pub(crate) fn applicable(&self, input: &Input) -> bool {
        match self {
            Self::Noop => true,
            Self::Scan(c) | Self::Peek(c) => input.peek() == Some(*c),
            Self::Skip => input.peek().is_some(),
            Self::End => input.peek().is_none(),
        }
    }

    pub(crate) fn apply(&self, input: &mut Input) {
        if matches!(self, Self::Scan(_) | Self::Skip) {
            input.cursor += 1;
        }
    }

    pub(crate) fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Noop, _) | (_, Self::Noop) => true,
            (Self::End, Self::End) => true,
            (Self::End, _) | (_, Self::End) => false,
            (Self::Scan(a) | Self::Peek(a), Self::Scan(b) | Self::Peek(b)) => a == b,
            (Self::Skip, _) | (_, Self::Skip) => true,
        }
    }

    pub(crate) fn intersects_terminator(&self, terminator: &Terminator) -> bool {
        match terminator {
            Terminator::Always => true,
            Terminator::Consumed => matches!(self, Self::Noop | Self::End),
            _ => false,
        }
    }

    pub(crate) fn check(&self, input: &Input) -> Result<(), DeviceError> {
        match self {
            Self::Scan(c) | Self::Peek(c) => input.alphabet.check(*c),
            Self::Noop | Self::Skip | Self::End => Ok(()),
        }
    }

    pub(crate) fn parse(text: &str, input: &Input) -> Result<Self, DeviceError> {
        let mut tokens = Tokens::new(DeviceKind::Input, text);
        let op = match tokens.expect("an input operation")? {
            "noop" => Self::Noop,
            "scan" => Self::Scan(tokens.symbol(&input.alphabet)?),
            "peek" => Self::Peek(tokens.symbol(&input.alphabet)?),
            "skip" => Self::Skip,
            "end" => Self::End,
            other => return Err(tokens.error(format!("unknown keyword `{other}`"))),
        };
        tokens.finish()?;
        Ok(op)
    }

    pub(crate) fn write(&self, input: &Input, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = |c: &Symbol| input.alphabet.render(&[*c]);
        match self {
            Self::Noop => f.write_str("noop"),
            Self::Scan(c) => write!(f, "scan {}", symbol(c)),
            Self::Peek(c) => write!(f, "peek {}", symbol(c)),
            Self::Skip => f.write_str("skip"),
            Self::End => f.write_str("end"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(text: &str) -> Input {
        let alphabet = Arc::new(Alphabet::try_from("ab").unwrap());
        let mut input = Input::new(alphabet, Terminator::Consumed).unwrap();
        input.initialise(text).unwrap();
        input
    }

    #[test]
    fn test_scan_advances_and_consumes() {
        let mut device = input("ab");
        assert!(InputOp::Scan(0).applicable(&device));
        assert!(!InputOp::Scan(1).applicable(&device));
        assert!(!InputOp::End.applicable(&device));
        InputOp::Scan(0).apply(&mut device);
        InputOp::Peek(1).apply(&mut device);
        assert_eq!(device.position(), 1);
        InputOp::Skip.apply(&mut device);
        assert!(InputOp::End.applicable(&device));
        assert!(device.terminating());
        assert_eq!(device.terminate(), "");
    }

    #[test]
    fn test_conflict_table() {
        use InputOp::*;
        assert!(Scan(0).intersects(&Peek(0)));
        assert!(!Scan(0).intersects(&Scan(1)));
        assert!(!Scan(0).intersects(&End));
        assert!(Skip.intersects(&Peek(1)));
        assert!(!Skip.intersects(&End));
        assert!(Noop.intersects(&End));
        assert!(End.intersects_terminator(&Terminator::Consumed));
        assert!(!Scan(0).intersects_terminator(&Terminator::Consumed));
        assert!(Scan(0).intersects_terminator(&Terminator::Always));
    }

    #[test]
    fn test_rejects_unknown_input_and_terminator() {
        let alphabet = Arc::new(Alphabet::try_from("ab").unwrap());
        assert!(Input::new(Arc::clone(&alphabet), Terminator::Empty).is_err());
        let mut device = Input::new(alphabet, Terminator::Always).unwrap();
        assert!(device.initialise("abc").is_err());
    }
}
