//! Write-only output.

use std::fmt;
use std::sync::Arc;

use crate::alphabet::{Alphabet, Symbol};
use crate::device::DeviceKind;
use crate::error::DeviceError;
use crate::terminator::Terminator;
use crate::text::Tokens;

/// Output writer. Starts empty and may halt at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    alphabet: Arc<Alphabet>,
    written: Vec<Symbol>,
}

impl Output {
    /// Create an output writer.
    #[must_use]
    pub fn new(alphabet: Arc<Alphabet>) -> Self {
        Self {
            alphabet,
            written: Vec::new(),
        }
    }

    /// Device alphabet.
    #[must_use]
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Symbols written so far.
    #[must_use]
    pub fn written(&self) -> &[Symbol] {
        &self.written
    }

    pub(crate) fn initialise(&mut self) {
        self.written.clear();
    }

    pub(crate) fn terminate(&self) -> String {
        self.alphabet.render(&self.written)
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.alphabet.render(&self.written))
    }
}

/// Output operations. Both are always applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputOp {
    /// Write nothing.
    Noop,
    /// Append a symbol.
    Print(Symbol),
}

impl OutputOp {
    pub(crate) fn apply(&self, output: &mut Output) {
        if let Self::Print(c) = self {
            output.written.push(*c);
        }
    }

    pub(crate) fn intersects_terminator(&self, terminator: &Terminator) -> bool {
        matches!(terminator, Terminator::Always)
    }

    pub(crate) fn check(&self, output: &Output) -> Result<(), DeviceError> {
        match self {
            Self::Noop => Ok(()),
            Self::Print(c) => output.alphabet.check(*c),
        }
    }

    pub(crate) fn parse(text: &str, output: &Output) -> Result<Self, DeviceError> {
        let mut tokens = Tokens::new(DeviceKind::Output, text);
        let op = match tokens.expect("an output operation")? {
            "noop" => Self::Noop,
            "print" => Self::Print(tokens.symbol(&output.alphabet)?),
            other => return Err(tokens.error(format!("unknown keyword `{other}`"))),
        };
        tokens.finish()?;
        Ok(op)
    }

    pub(crate) fn write(&self, output: &Output, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Noop => f.write_str("noop"),
            Self::Print(c) => write!(f, "print {}", output.alphabet.render(&[*c])),
        }
    }
}
