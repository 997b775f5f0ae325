//! The closed set of device kinds and the `Device` union.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::error::DeviceError;
use crate::kinds::{
    Control, Counter, Discipline, Input, Output, Ram, Sequence, Tape, UnsignedCounter,
};
use crate::terminator::{Initialiser, Terminator};

/// Device kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Finite-state control.
    Control,
    /// One-way input reader.
    Input,
    /// Output writer.
    Output,
    /// Symbol stack.
    Stack,
    /// Symbol queue.
    Queue,
    /// Signed counter.
    Counter,
    /// Counter bounded below by zero.
    UnsignedCounter,
    /// Turing tape.
    Tape,
    /// Registers plus memory.
    Ram,
}

impl DeviceKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Control,
        Self::Input,
        Self::Output,
        Self::Stack,
        Self::Queue,
        Self::Counter,
        Self::UnsignedCounter,
        Self::Tape,
        Self::Ram,
    ];

    /// Snake-case name, as used in program descriptions.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Input => "input",
            Self::Output => "output",
            Self::Stack => "stack",
            Self::Queue => "queue",
            Self::Counter => "counter",
            Self::UnsignedCounter => "unsigned_counter",
            Self::Tape => "tape",
            Self::Ram => "ram",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A machine component.
///
/// Cloning deep-copies the mutable state; encoders and control labels are
/// shared behind `Arc` because they never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Device {
    /// Finite-state control.
    Control(Control),
    /// Input reader.
    Input(Input),
    /// Output writer.
    Output(Output),
    /// Stack, a `Sequence` with `Lifo` discipline.
    Stack(Sequence),
    /// Queue, a `Sequence` with `Fifo` discipline.
    Queue(Sequence),
    /// Signed counter.
    Counter(Counter),
    /// Unsigned counter.
    UnsignedCounter(UnsignedCounter),
    /// Turing tape.
    Tape(Tape),
    /// Random-access machine.
    Ram(Ram),
}

impl Device {
    /// Stack over `alphabet`.
    ///
    /// # Errors
    ///
    /// See [`Sequence::new`].
    pub fn stack(
        alphabet: Arc<Alphabet>,
        initialiser: Initialiser,
        terminator: Terminator,
    ) -> Result<Self, DeviceError> {
        Sequence::new(alphabet, Discipline::Lifo, initialiser, terminator).map(Self::Stack)
    }

    /// Queue over `alphabet`.
    ///
    /// # Errors
    ///
    /// See [`Sequence::new`].
    pub fn queue(
        alphabet: Arc<Alphabet>,
        initialiser: Initialiser,
        terminator: Terminator,
    ) -> Result<Self, DeviceError> {
        Sequence::new(alphabet, Discipline::Fifo, initialiser, terminator).map(Self::Queue)
    }

    /// Kind tag.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Control(_) => DeviceKind::Control,
            Self::Input(_) => DeviceKind::Input,
            Self::Output(_) => DeviceKind::Output,
            Self::Stack(_) => DeviceKind::Stack,
            Self::Queue(_) => DeviceKind::Queue,
            Self::Counter(_) => DeviceKind::Counter,
            Self::UnsignedCounter(_) => DeviceKind::UnsignedCounter,
            Self::Tape(_) => DeviceKind::Tape,
            Self::Ram(_) => DeviceKind::Ram,
        }
    }

    /// How the device loads its state.
    #[must_use]
    pub fn initialiser(&self) -> Initialiser {
        match self {
            Self::Input(_) => Initialiser::Input,
            Self::Control(_) | Self::Output(_) => Initialiser::Blank,
            Self::Stack(d) | Self::Queue(d) => d.initialiser(),
            Self::Counter(d) => d.initialiser(),
            Self::UnsignedCounter(d) => d.initialiser(),
            Self::Tape(d) => d.initialiser(),
            Self::Ram(d) => d.initialiser(),
        }
    }

    /// Condition under which the device agrees to halt.
    #[must_use]
    pub fn terminator(&self) -> Terminator {
        match self {
            Self::Control(d) => d.terminator(),
            Self::Input(d) => d.terminator(),
            Self::Output(_) => Terminator::Always,
            Self::Stack(d) | Self::Queue(d) => d.terminator(),
            Self::Counter(d) => d.terminator(),
            Self::UnsignedCounter(d) => d.terminator(),
            Self::Tape(d) => d.terminator(),
            Self::Ram(d) => d.terminator(),
        }
    }

    /// Reset the device and load `input` if its initialiser asks for it.
    ///
    /// # Errors
    ///
    /// Fails when an input-fed device cannot encode `input`.
    pub fn initialise(&mut self, input: &str) -> Result<(), DeviceError> {
        match self {
            Self::Control(d) => d.initialise(),
            Self::Input(d) => d.initialise(input)?,
            Self::Output(d) => d.initialise(),
            Self::Stack(d) | Self::Queue(d) => d.initialise(input)?,
            Self::Counter(d) => d.initialise(input)?,
            Self::UnsignedCounter(d) => d.initialise(input)?,
            Self::Tape(d) => d.initialise(input)?,
            Self::Ram(d) => d.initialise(input)?,
        }
        Ok(())
    }

    /// Whether the current configuration satisfies the terminator.
    #[must_use]
    pub fn terminating(&self) -> bool {
        match self {
            Self::Control(d) => d.terminating(),
            Self::Input(d) => d.terminating(),
            Self::Output(_) => true,
            Self::Stack(d) | Self::Queue(d) => d.terminating(),
            Self::Counter(d) => d.terminating(),
            Self::UnsignedCounter(d) => d.terminating(),
            Self::Tape(d) => d.terminating(),
            Self::Ram(d) => d.terminating(),
        }
    }

    /// Final output of the device.
    ///
    /// # Panics
    ///
    /// Panics if the device is not terminating.
    #[must_use]
    pub fn terminate(&self) -> String {
        assert!(
            self.terminating(),
            "terminate called on non-terminating {} device",
            self.kind()
        );
        match self {
            Self::Control(d) => d.terminate(),
            Self::Input(d) => d.terminate(),
            Self::Output(d) => d.terminate(),
            Self::Stack(d) | Self::Queue(d) => d.terminate(),
            Self::Counter(d) => d.terminate(),
            Self::UnsignedCounter(d) => d.terminate(),
            Self::Tape(d) => d.terminate(),
            Self::Ram(d) => d.terminate(),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.kind())?;
        match self {
            Self::Control(d) => fmt::Display::fmt(d, f),
            Self::Input(d) => fmt::Display::fmt(d, f),
            Self::Output(d) => fmt::Display::fmt(d, f),
            Self::Stack(d) | Self::Queue(d) => fmt::Display::fmt(d, f),
            Self::Counter(d) => fmt::Display::fmt(d, f),
            Self::UnsignedCounter(d) => fmt::Display::fmt(d, f),
            Self::Tape(d) => fmt::Display::fmt(d, f),
            Self::Ram(d) => fmt::Display::fmt(d, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_clone_diverges() {
        let alphabet = Arc::new(Alphabet::try_from("ab").unwrap());
        let mut original =
            Device::stack(alphabet, Initialiser::Input, Terminator::Empty).unwrap();
        original.initialise("ab").unwrap();
        let copy = original.clone();
        original.initialise("").unwrap();
        assert!(original.terminating());
        assert!(!copy.terminating());
        assert_eq!(copy.to_string(), "stack [ab]");
    }

    #[test]
    #[should_panic(expected = "non-terminating control")]
    fn test_terminate_checks_terminator() {
        let control = Control::new(0, BTreeMap::new());
        let _ = Device::Control(control).terminate();
    }

    #[test]
    fn test_kind_names_match_serde() {
        for kind in DeviceKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
