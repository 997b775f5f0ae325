//! Turing-style tape.

use std::fmt;
use std::sync::Arc;

use super::head::{Motion, Shift};
use crate::alphabet::{Alphabet, Symbol};
use crate::device::DeviceKind;
use crate::error::DeviceError;
use crate::terminator::{Initialiser, Terminator};
use crate::text::Tokens;

/// One-way infinite tape of symbols with a single head.
///
/// Cell 0 is the home cell and always starts blank. `cells` grows to the
/// right on demand, so `head < cells.len()` holds at all times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    alphabet: Arc<Alphabet>,
    blank: Symbol,
    initialiser: Initialiser,
    terminator: Terminator,
    cells: Vec<Symbol>,
    head: usize,
}

impl Tape {
    /// Create a tape whose unwritten cells hold `blank`.
    ///
    /// # Errors
    ///
    /// The blank must belong to the alphabet; only the `Always` and `Home`
    /// terminators are supported.
    pub fn new(
        alphabet: Arc<Alphabet>,
        blank: Symbol,
        initialiser: Initialiser,
        terminator: Terminator,
    ) -> Result<Self, DeviceError> {
        alphabet.check(blank)?;
        if !matches!(terminator, Terminator::Always | Terminator::Home) {
            return Err(DeviceError::UnsupportedTerminator {
                kind: DeviceKind::Tape,
                terminator: terminator.name(),
            });
        }
        Ok(Self {
            alphabet,
            blank,
            initialiser,
            terminator,
            cells: vec![blank],
            head: 0,
        })
    }

    /// Device alphabet.
    #[must_use]
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Blank symbol.
    #[must_use]
    pub fn blank(&self) -> Symbol {
        self.blank
    }

    /// Head position.
    #[must_use]
    pub fn head(&self) -> usize {
        self.head
    }

    /// Symbol under the head.
    #[must_use]
    pub fn read(&self) -> Symbol {
        self.cells[self.head]
    }

    pub(crate) fn initialise(&mut self, input: &str) -> Result<(), DeviceError> {
        self.cells.clear();
        self.cells.push(self.blank);
        if self.initialiser == Initialiser::Input {
            self.cells.extend(self.alphabet.encode_str(input)?);
        }
        self.head = 0;
        Ok(())
    }

    pub(crate) fn initialiser(&self) -> Initialiser {
        self.initialiser
    }

    pub(crate) fn terminating(&self) -> bool {
        match self.terminator {
            Terminator::Always => true,
            Terminator::Home => self.head == 0,
            _ => false,
        }
    }

    pub(crate) fn terminate(&self) -> String {
        let is_blank = |c: &Symbol| *c == self.blank;
        let start = self.cells.iter().position(|c| !is_blank(c));
        let end = self.cells.iter().rposition(|c| !is_blank(c));
        match (start, end) {
            (Some(start), Some(end)) => self.alphabet.render(&self.cells[start..=end]),
            _ => String::new(),
        }
    }

    pub(crate) fn terminator(&self) -> Terminator {
        self.terminator.clone()
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (before, after) = self.cells.split_at(self.head);
        write!(
            f,
            "{}[{}]{}",
            self.alphabet.render(before),
            self.alphabet.render(&after[..1]),
            self.alphabet.render(&after[1..])
        )
    }
}

/// Compound tape operation.
///
/// The parts run in a fixed order: home check, look, print, move. The
/// default value is the no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TapeOp {
    /// Require the head on the home cell.
    pub home: bool,
    /// Require this symbol under the head.
    pub look: Option<Symbol>,
    /// Overwrite the cell under the head.
    pub print: Option<Symbol>,
    /// Move the head afterwards.
    pub shift: Shift,
}

impl TapeOp {
    fn motion(&self) -> Motion {
        Motion {
            home: self.home,
            shift: self.shift,
        }
    }

    pub(crate) fn applicable(&self, tape: &Tape) -> bool {
        self.motion().allows(tape.head) && self.look.map_or(true, |c| tape.read() == c)
    }

    pub(crate) fn apply(&self, tape: &mut Tape) {
        if let Some(c) = self.print {
            tape.cells[tape.head] = c;
        }
        self.shift.apply(&mut tape.head);
        if tape.head == tape.cells.len() {
            tape.cells.push(tape.blank);
        }
    }

    pub(crate) fn intersects(&self, other: &Self) -> bool {
        let looks = match (self.look, other.look) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };
        looks && self.motion().meets(other.motion())
    }

    pub(crate) fn intersects_terminator(&self, terminator: &Terminator) -> bool {
        match terminator {
            Terminator::Always => self.motion().satisfiable(),
            Terminator::Home => self.motion().reaches_home(),
            _ => false,
        }
    }

    pub(crate) fn check(&self, tape: &Tape) -> Result<(), DeviceError> {
        for c in self.look.iter().chain(self.print.iter()) {
            tape.alphabet.check(*c)?;
        }
        Ok(())
    }

    pub(crate) fn parse(text: &str, tape: &Tape) -> Result<Self, DeviceError> {
        let mut tokens = Tokens::new(DeviceKind::Tape, text);
        let mut op = Self::default();
        let mut moved = false;
        let mut first = true;
        while let Some(word) = tokens.next_word() {
            match word {
                "noop" if first => {
                    tokens.finish()?;
                    return Ok(op);
                }
                "home" if !op.home => op.home = true,
                "look" if op.look.is_none() => op.look = Some(tokens.symbol(&tape.alphabet)?),
                "print" if op.print.is_none() => op.print = Some(tokens.symbol(&tape.alphabet)?),
                word => match Shift::from_keyword(word) {
                    Some(shift) if !moved => {
                        op.shift = shift;
                        moved = true;
                    }
                    _ => return Err(tokens.error(format!("unexpected `{word}`"))),
                },
            }
            first = false;
        }
        if first {
            return Err(tokens.error("expected a tape operation"));
        }
        Ok(op)
    }

    pub(crate) fn write(&self, tape: &Tape, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::default() {
            return f.write_str("noop");
        }
        let mut parts = Vec::new();
        if self.home {
            parts.push("home".to_string());
        }
        if let Some(c) = self.look {
            parts.push(format!("look {}", tape.alphabet.render(&[c])));
        }
        if let Some(c) = self.print {
            parts.push(format!("print {}", tape.alphabet.render(&[c])));
        }
        if self.shift != Shift::Stay {
            parts.push(self.shift.to_string());
        }
        f.write_str(&parts.join(" "))
    }
}
