//! The `Operation` union and its dispatch onto devices.

use std::fmt;
use std::sync::Arc;

use crate::device::{Device, DeviceKind};
use crate::error::DeviceError;
use crate::kinds::{
    CounterOp, InputOp, OutputOp, RamOp, SequenceOp, TapeOp, Transition, UnsignedCounterOp,
};
use crate::terminator::Terminator;

/// Shared handle to an immutable operation.
pub type OpRef = Arc<Operation>;

/// An atomic, kind-specific device step.
///
/// Operations never change after construction and are shared across every
/// machine built from the same program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Control transition.
    Control(Transition),
    /// Input step.
    Input(InputOp),
    /// Output step.
    Output(OutputOp),
    /// Stack step.
    Stack(SequenceOp),
    /// Queue step.
    Queue(SequenceOp),
    /// Signed counter step.
    Counter(CounterOp),
    /// Unsigned counter step.
    UnsignedCounter(UnsignedCounterOp),
    /// Compound tape step.
    Tape(TapeOp),
    /// RAM step.
    Ram(RamOp),
}

impl Operation {
    /// Kind of device this operation drives.
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

    /// Whether this operation belongs to `kind`.
    #[must_use]
    pub fn accepts(&self, kind: DeviceKind) -> bool {
        self.kind() == kind
    }

    /// The do-nothing operation for a device kind. Control has none.
    #[must_use]
    pub fn noop(kind: DeviceKind) -> Option<Self> {
        Some(match kind {
            DeviceKind::Control => return None,
            DeviceKind::Input => Self::Input(InputOp::Noop),
            DeviceKind::Output => Self::Output(OutputOp::Noop),
            DeviceKind::Stack => Self::Stack(SequenceOp::Noop),
            DeviceKind::Queue => Self::Queue(SequenceOp::Noop),
            DeviceKind::Counter => Self::Counter(CounterOp::Noop),
            DeviceKind::UnsignedCounter => Self::UnsignedCounter(UnsignedCounterOp::Noop),
            DeviceKind::Tape => Self::Tape(TapeOp::default()),
            DeviceKind::Ram => Self::Ram(RamOp::Noop),
        })
    }

    /// The control transition, if this is one.
    #[must_use]
    pub fn transition(&self) -> Option<Transition> {
        match self {
            Self::Control(t) => Some(*t),
            _ => None,
        }
    }

    /// Validate against a concrete device: matching kind, symbols within
    /// the alphabet bound, registers within range.
    ///
    /// # Errors
    ///
    /// Returns `WrongKind`, `SymbolOutOfRange` or `RegisterOutOfRange`.
    pub fn check(&self, device: &Device) -> Result<(), DeviceError> {
        match (self, device) {
            (Self::Control(_), Device::Control(_))
            | (Self::Counter(_), Device::Counter(_))
            | (Self::UnsignedCounter(_), Device::UnsignedCounter(_)) => Ok(()),
            (Self::Input(op), Device::Input(d)) => op.check(d),
            (Self::Output(op), Device::Output(d)) => op.check(d),
            (Self::Stack(op), Device::Stack(d)) | (Self::Queue(op), Device::Queue(d)) => {
                op.check(d)
            }
            (Self::Tape(op), Device::Tape(d)) => op.check(d),
            (Self::Ram(op), Device::Ram(d)) => op.check(d),
            _ => Err(DeviceError::WrongKind {
                operation: self.kind(),
                device: device.kind(),
            }),
        }
    }

    /// Whether the operation can run on the device's current state.
    /// Always false for a device of another kind.
    #[must_use]
    pub fn applicable(&self, device: &Device) -> bool {
        match (self, device) {
            (Self::Control(op), Device::Control(d)) => op.applicable(d),
            (Self::Input(op), Device::Input(d)) => op.applicable(d),
            (Self::Output(_), Device::Output(_)) => true,
            (Self::Stack(op), Device::Stack(d)) | (Self::Queue(op), Device::Queue(d)) => {
                op.applicable(d)
            }
            (Self::Counter(op), Device::Counter(d)) => op.applicable(d),
            (Self::UnsignedCounter(op), Device::UnsignedCounter(d)) => op.applicable(d),
            (Self::Tape(op), Device::Tape(d)) => op.applicable(d),
            (Self::Ram(op), Device::Ram(d)) => op.applicable(d),
            _ => false,
        }
    }

    /// Run the operation.
    ///
    /// # Panics
    ///
    /// Panics if the operation is not applicable to `device`.
    pub fn apply(&self, device: &mut Device) {
        assert!(
            self.applicable(device),
            "operation `{self:?}` is not applicable to {device}"
        );
        match (self, device) {
            (Self::Control(op), Device::Control(d)) => op.apply(d),
            (Self::Input(op), Device::Input(d)) => op.apply(d),
            (Self::Output(op), Device::Output(d)) => op.apply(d),
            (Self::Stack(op), Device::Stack(d)) | (Self::Queue(op), Device::Queue(d)) => {
                op.apply(d);
            }
            (Self::Counter(op), Device::Counter(d)) => op.apply(d),
            (Self::UnsignedCounter(op), Device::UnsignedCounter(d)) => op.apply(d),
            (Self::Tape(op), Device::Tape(d)) => op.apply(d),
            (Self::Ram(op), Device::Ram(d)) => op.apply(d),
            _ => unreachable!("applicable operations match their device kind"),
        }
    }

    /// Whether some device state makes both operations applicable.
    /// Operations of different kinds never intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Control(a), Self::Control(b)) => a.intersects(b),
            (Self::Input(a), Self::Input(b)) => a.intersects(b),
            (Self::Output(_), Self::Output(_)) => true,
            (Self::Stack(a), Self::Stack(b)) | (Self::Queue(a), Self::Queue(b)) => a.intersects(b),
            (Self::Counter(a), Self::Counter(b)) => a.intersects(b),
            (Self::UnsignedCounter(a), Self::UnsignedCounter(b)) => a.intersects(b),
            (Self::Tape(a), Self::Tape(b)) => a.intersects(b),
            (Self::Ram(a), Self::Ram(b)) => a.intersects(b),
            _ => false,
        }
    }

    /// Whether some device state makes the operation applicable while
    /// `terminator` reports termination.
    #[must_use]
    pub fn intersects_terminator(&self, terminator: &Terminator) -> bool {
        match self {
            Self::Control(op) => op.intersects_terminator(terminator),
            Self::Input(op) => op.intersects_terminator(terminator),
            Self::Output(op) => op.intersects_terminator(terminator),
            Self::Stack(op) | Self::Queue(op) => op.intersects_terminator(terminator),
            Self::Counter(op) => op.intersects_terminator(terminator),
            Self::UnsignedCounter(op) => op.intersects_terminator(terminator),
            Self::Tape(op) => op.intersects_terminator(terminator),
            Self::Ram(op) => op.intersects_terminator(terminator),
        }
    }

    /// Parse the text form of an operation for `device`, then validate it.
    ///
    /// # Errors
    ///
    /// Returns `Syntax` for malformed text and the [`Operation::check`]
    /// errors for well-formed text that does not fit the device.
    pub fn parse(text: &str, device: &Device) -> Result<Self, DeviceError> {
        let op = match device {
            Device::Control(_) => Self::Control(Transition::parse(text)?),
            Device::Input(d) => Self::Input(InputOp::parse(text, d)?),
            Device::Output(d) => Self::Output(OutputOp::parse(text, d)?),
            Device::Stack(d) => Self::Stack(SequenceOp::parse(text, d)?),
            Device::Queue(d) => Self::Queue(SequenceOp::parse(text, d)?),
            Device::Counter(_) => Self::Counter(CounterOp::parse(text)?),
            Device::UnsignedCounter(_) => Self::UnsignedCounter(UnsignedCounterOp::parse(text)?),
            Device::Tape(d) => Self::Tape(TapeOp::parse(text, d)?),
            Device::Ram(_) => Self::Ram(RamOp::parse(text)?),
        };
        op.check(device)?;
        Ok(op)
    }

    /// Text form, rendered with the device's encoder.
    #[must_use]
    pub fn display<'a>(&'a self, device: &'a Device) -> Displayed<'a> {
        Displayed {
            operation: self,
            device,
        }
    }
}

/// An operation paired with the device that renders its symbols.
#[derive(Debug, Clone, Copy)]
pub struct Displayed<'a> {
    operation: &'a Operation,
    device: &'a Device,
}

impl fmt::Display for Displayed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.operation, self.device) {
            (Operation::Control(op), _) => write!(f, "{op}"),
            (Operation::Input(op), Device::Input(d)) => op.write(d, f),
            (Operation::Output(op), Device::Output(d)) => op.write(d, f),
            (Operation::Stack(op), Device::Stack(d)) | (Operation::Queue(op), Device::Queue(d)) => {
                op.write(d, f)
            }
            (Operation::Counter(op), _) => write!(f, "{op}"),
            (Operation::UnsignedCounter(op), _) => write!(f, "{op}"),
            (Operation::Tape(op), Device::Tape(d)) => op.write(d, f),
            (Operation::Ram(op), _) => write!(f, "{op}"),
            (op, device) => write!(f, "<{} operation on {} device>", op.kind(), device.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use assert_matches::assert_matches;

    use super::*;
    use crate::alphabet::Alphabet;
    use crate::kinds::Control;
    use crate::terminator::Initialiser;

    fn stack() -> Device {
        let alphabet = Arc::new(Alphabet::try_from("xy").unwrap());
        Device::stack(alphabet, Initialiser::Blank, Terminator::Empty).unwrap()
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let control = Device::Control(Control::new(0, BTreeMap::new()));
        let op = Operation::Stack(SequenceOp::Noop);
        assert!(!op.accepts(DeviceKind::Control));
        assert_matches!(
            op.check(&control),
            Err(DeviceError::WrongKind {
                operation: DeviceKind::Stack,
                device: DeviceKind::Control,
            })
        );
        assert!(!op.applicable(&control));
        assert!(!op.intersects(&Operation::Queue(SequenceOp::Noop)));
    }

    #[test]
    fn test_symbol_bound_is_checked() {
        let op = Operation::Stack(SequenceOp::Put(7));
        assert_matches!(
            op.check(&stack()),
            Err(DeviceError::SymbolOutOfRange { symbol: 7, bound: 2 })
        );
    }

    #[test]
    fn test_parse_and_display_through_device() {
        let device = stack();
        let op = Operation::parse("push y", &device).unwrap();
        assert_eq!(op, Operation::Stack(SequenceOp::Put(1)));
        assert_eq!(op.display(&device).to_string(), "push y");
        assert_matches!(
            Operation::parse("push z", &device),
            Err(DeviceError::UnknownSymbol { symbol: 'z', .. })
        );
    }

    #[test]
    #[should_panic(expected = "not applicable")]
    fn test_apply_requires_applicability() {
        let mut device = stack();
        Operation::Stack(SequenceOp::Take(0)).apply(&mut device);
    }
}
