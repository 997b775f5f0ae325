//! Stack and queue storage.
//!
//! Both keep a plain symbol sequence; only the end that `take`/`peek` read
//! differs. The conflict tables are identical.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::alphabet::{Alphabet, Symbol};
use crate::device::DeviceKind;
use crate::error::DeviceError;
use crate::terminator::{Initialiser, Terminator};
use crate::text::Tokens;

/// Which end items leave from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discipline {
    /// Last in, first out (stack).
    Lifo,
    /// First in, first out (queue).
    Fifo,
}

impl Discipline {
    fn kind(self) -> DeviceKind {
        match self {
            Self::Lifo => DeviceKind::Stack,
            Self::Fifo => DeviceKind::Queue,
        }
    }

    /// Text keywords for put, take and peek.
    fn keywords(self) -> [&'static str; 3] {
        match self {
            Self::Lifo => STACK_KEYWORDS,
            Self::Fifo => QUEUE_KEYWORDS,
        }
    }
}

const STACK_KEYWORDS: [&str; 3] = ["push", "pop", "top"];
const QUEUE_KEYWORDS: [&str; 3] = ["enqueue", "dequeue", "front"];

/// Stack or queue of symbols.
///
/// Items are stored back-to-front for a stack (the top is the back) and
/// front-to-back for a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    alphabet: Arc<Alphabet>,
    discipline: Discipline,
    initialiser: Initialiser,
    terminator: Terminator,
    items: VecDeque<Symbol>,
}

impl Sequence {
    /// Create a stack (`Lifo`) or queue (`Fifo`).
    ///
    /// # Errors
    ///
    /// Only the `Always` and `Empty` terminators are supported.
    pub fn new(
        alphabet: Arc<Alphabet>,
        discipline: Discipline,
        initialiser: Initialiser,
        terminator: Terminator,
    ) -> Result<Self, DeviceError> {
        if !matches!(terminator, Terminator::Always | Terminator::Empty) {
            return Err(DeviceError::UnsupportedTerminator {
                kind: discipline.kind(),
                terminator: terminator.name(),
            });
        }
        Ok(Self {
            alphabet,
            discipline,
            initialiser,
            terminator,
            items: VecDeque::new(),
        })
    }

    /// Device alphabet.
    #[must_use]
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Stack or queue.
    #[must_use]
    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    /// Number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item the next take would remove.
    #[must_use]
    pub fn head(&self) -> Option<Symbol> {
        match self.discipline {
            Discipline::Lifo => self.items.back().copied(),
            Discipline::Fifo => self.items.front().copied(),
        }
    }

    pub(crate) fn initialise(&mut self, input: &str) -> Result<(), DeviceError> {
        self.items.clear();
        if self.initialiser == Initialiser::Input {
            self.items.extend(self.alphabet.encode_str(input)?);
        }
        Ok(())
    }

    pub(crate) fn initialiser(&self) -> Initialiser {
        self.initialiser
    }

    pub(crate) fn terminating(&self) -> bool {
        match self.terminator {
            Terminator::Always => true,
            Terminator::Empty => self.items.is_empty(),
            _ => false,
        }
    }

    pub(crate) fn terminate(&self) -> String {
        let items: Vec<Symbol> = self.items.iter().copied().collect();
        self.alphabet.render(&items)
    }

    pub(crate) fn terminator(&self) -> Terminator {
        self.terminator.clone()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        f.write_str(&self.terminate())?;
        f.write_str("]")
    }
}

/// Stack and queue operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceOp {
    /// Leave the items alone.
    Noop,
    /// Push (stack) or enqueue (queue) a symbol.
    Put(Symbol),
    /// Pop or dequeue the given symbol.
    Take(Symbol),
    /// Require the given symbol at the top or front.
    Peek(Symbol),
    /// Require no items.
    Empty,
}

impl SequenceOp {
    pub(crate) fn applicable(&self, sequence: &Sequence) -> bool {
        match self {
            Self::Noop | Self::Put(_) => true,
            Self::Take(c) | Self::Peek(c) => sequence.head() == Some(*c),
            Self::Empty => sequence.is_empty(),
        }
    }

    pub(crate) fn apply(&self, sequence: &mut Sequence) {
        match self {
            Self::Put(c) => sequence.items.push_back(*c),
            Self::Take(_) => {
                match sequence.discipline {
                    Discipline::Lifo => sequence.items.pop_back(),
                    Discipline::Fifo => sequence.items.pop_front(),
                };
            }
            Self::Noop | Self::Peek(_) | Self::Empty => {}
        }
    }

    pub(crate) fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Noop | Self::Put(_), _) | (_, Self::Noop | Self::Put(_)) => true,
            (Self::Empty, Self::Empty) => true,
            (Self::Empty, _) | (_, Self::Empty) => false,
            (Self::Take(a) | Self::Peek(a), Self::Take(b) | Self::Peek(b)) => a == b,
        }
    }

    pub(crate) fn intersects_terminator(&self, terminator: &Terminator) -> bool {
        match terminator {
            Terminator::Always => true,
            Terminator::Empty => matches!(self, Self::Noop | Self::Put(_) | Self::Empty),
            _ => false,
        }
    }

    pub(crate) fn check(&self, sequence: &Sequence) -> Result<(), DeviceError> {
        match self {
            Self::Put(c) | Self::Take(c) | Self::Peek(c) => sequence.alphabet.check(*c),
            Self::Noop | Self::Empty => Ok(()),
        }
    }

    pub(crate) fn parse(text: &str, sequence: &Sequence) -> Result<Self, DeviceError> {
        let discipline = sequence.discipline;
        let [put, take, peek] = discipline.keywords();
        let mut tokens = Tokens::new(discipline.kind(), text);
        let op = match tokens.expect("an operation")? {
            "noop" => Self::Noop,
            "empty" => Self::Empty,
            word if word == put => Self::Put(tokens.symbol(&sequence.alphabet)?),
            word if word == take => Self::Take(tokens.symbol(&sequence.alphabet)?),
            word if word == peek => Self::Peek(tokens.symbol(&sequence.alphabet)?),
            other => return Err(tokens.error(format!("unknown keyword `{other}`"))),
        };
        tokens.finish()?;
        Ok(op)
    }

    pub(crate) fn write(&self, sequence: &Sequence, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [put, take, peek] = sequence.discipline.keywords();
        let symbol = |c: &Symbol| sequence.alphabet.render(&[*c]);
        match self {
            Self::Noop => f.write_str("noop"),
            Self::Put(c) => write!(f, "{put} {}", symbol(c)),
            Self::Take(c) => write!(f, "{take} {}", symbol(c)),
            Self::Peek(c) => write!(f, "{peek} {}", symbol(c)),
            Self::Empty => f.write_str("empty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(discipline: Discipline, input: &str) -> Sequence {
        let alphabet = Arc::new(Alphabet::try_from("abc").unwrap());
        let mut sequence =
            Sequence::new(alphabet, discipline, Initialiser::Input, Terminator::Empty).unwrap();
        sequence.initialise(input).unwrap();
        sequence
    }

    #[test]
    fn test_stack_takes_from_the_back() {
        let mut stack = sequence(Discipline::Lifo, "ab");
        assert_eq!(stack.head(), Some(1));
        assert!(SequenceOp::Take(1).applicable(&stack));
        SequenceOp::Take(1).apply(&mut stack);
        SequenceOp::Put(2).apply(&mut stack);
        assert_eq!(stack.terminate(), "ac");
        assert!(!stack.terminating());
    }

    #[test]
    fn test_queue_takes_from_the_front() {
        let mut queue = sequence(Discipline::Fifo, "ab");
        assert_eq!(queue.head(), Some(0));
        SequenceOp::Take(0).apply(&mut queue);
        SequenceOp::Take(1).apply(&mut queue);
        assert!(SequenceOp::Empty.applicable(&queue));
        assert!(queue.terminating());
    }

    #[test]
    fn test_conflict_table() {
        use SequenceOp::*;
        assert!(Take(0).intersects(&Peek(0)));
        assert!(!Take(0).intersects(&Take(1)));
        assert!(!Peek(2).intersects(&Empty));
        assert!(Put(0).intersects(&Empty));
        assert!(Put(0).intersects(&Take(1)));
        assert!(Empty.intersects_terminator(&Terminator::Empty));
        assert!(!Take(0).intersects_terminator(&Terminator::Empty));
    }

    #[test]
    fn test_keywords_follow_discipline() {
        let stack = sequence(Discipline::Lifo, "");
        let queue = sequence(Discipline::Fifo, "");
        assert_eq!(SequenceOp::parse("push a", &stack), Ok(SequenceOp::Put(0)));
        assert_eq!(SequenceOp::parse("enqueue a", &queue), Ok(SequenceOp::Put(0)));
        assert!(SequenceOp::parse("push a", &queue).is_err());
        assert!(SequenceOp::parse("pop z", &stack).is_err());
    }
}
