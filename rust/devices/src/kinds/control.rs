//! Finite-state control unit.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::device::DeviceKind;
use crate::error::DeviceError;
use crate::terminator::Terminator;
use crate::text::Tokens;

/// Control state index.
pub type StateId = usize;

/// Finite-state control.
///
/// States with an output label are accepting: the control agrees to halt
/// there and reports the label as its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    start: StateId,
    labels: Arc<BTreeMap<StateId, String>>,
    state: StateId,
}

impl Control {
    /// Create a control unit with a start state and accepting-state labels.
    #[must_use]
    pub fn new(start: StateId, labels: BTreeMap<StateId, String>) -> Self {
        Self {
            start,
            labels: Arc::new(labels),
            state: start,
        }
    }

    /// Start state.
    #[must_use]
    pub fn start(&self) -> StateId {
        self.start
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> StateId {
        self.state
    }

    /// Output labels of accepting states.
    #[must_use]
    pub fn labels(&self) -> &BTreeMap<StateId, String> {
        &self.labels
    }

    pub(crate) fn initialise(&mut self) {
        self.state = self.start;
    }

    pub(crate) fn terminating(&self) -> bool {
        self.labels.contains_key(&self.state)
    }

    pub(crate) fn terminate(&self) -> String {
        self.labels.get(&self.state).cloned().unwrap_or_default()
    }

    pub(crate) fn terminator(&self) -> Terminator {
        Terminator::Accepting(Arc::clone(&self.labels))
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.state)
    }
}

/// Control operation: move from one state to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    /// Required current state.
    pub from: StateId,
    /// State after the step.
    pub to: StateId,
}

impl Transition {
    /// Create a transition.
    #[must_use]
    pub fn new(from: StateId, to: StateId) -> Self {
        Self { from, to }
    }

    pub(crate) fn applicable(&self, control: &Control) -> bool {
        control.state == self.from
    }

    pub(crate) fn apply(&self, control: &mut Control) {
        control.state = self.to;
    }

    pub(crate) fn intersects(&self, other: &Self) -> bool {
        self.from == other.from
    }

    pub(crate) fn intersects_terminator(&self, terminator: &Terminator) -> bool {
        match terminator {
            Terminator::Always => true,
            Terminator::Accepting(labels) => labels.contains_key(&self.from),
            _ => false,
        }
    }

    pub(crate) fn parse(text: &str) -> Result<Self, DeviceError> {
        let mut tokens = Tokens::new(DeviceKind::Control, text);
        let from = tokens.number("a state")?;
        tokens.keyword("to")?;
        let to = tokens.number("a state")?;
        tokens.finish()?;
        Ok(Self { from, to })
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}
