//! Devices and operations for lockstep abstract machines.
//!
//! A machine is a fixed list of devices (a finite control, an input
//! reader, stacks, counters, tapes, ...) driven in lockstep by instructions
//! holding one operation per device. This crate defines the devices, their
//! operations, and the two compile-time conflict predicates used by the
//! determinism analysis:
//!
//! - [`Operation::intersects`]: some device state makes both operations
//!   applicable;
//! - [`Operation::intersects_terminator`]: some device state makes the
//!   operation applicable while the device's [`Terminator`] holds.
//!
//! Both are exact for every kind: they are true if and only if such a state
//! exists.

pub mod alphabet;
pub mod device;
pub mod error;
pub mod intern;
pub mod kinds;
pub mod numeral;
pub mod operation;
pub mod terminator;

mod text;

pub use alphabet::{Alphabet, Symbol};
pub use device::{Device, DeviceKind};
pub use error::DeviceError;
pub use intern::OperationPool;
pub use numeral::Numeral;
pub use operation::{OpRef, Operation};
pub use terminator::{Initialiser, Terminator};
