//! Initialisers and terminators.
//!
//! Both are closed enums shared across device kinds. Each kind admits a
//! subset of terminators; constructors reject the rest.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::kinds::control::StateId;

/// How a device loads its state on `initialise(input)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initialiser {
    /// Start empty (zero, blank tape, no items).
    #[default]
    Blank,
    /// Load the machine input into the device.
    Input,
}

/// Condition under which a device agrees to halt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminator {
    /// Any configuration is terminating.
    Always,
    /// Control: the current state has an output label.
    Accepting(Arc<BTreeMap<StateId, String>>),
    /// Input: every symbol has been read.
    Consumed,
    /// Stack/queue: no items left.
    Empty,
    /// Counter: value is zero.
    Zero,
    /// Tape/RAM: the head is back on cell 0.
    Home,
}

impl Terminator {
    /// Short name used in errors and printing.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Accepting(_) => "accepting",
            Self::Consumed => "consumed",
            Self::Empty => "empty",
            Self::Zero => "zero",
            Self::Home => "home",
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
