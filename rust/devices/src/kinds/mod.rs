//! Per-kind device state and operations.

pub mod control;
pub mod counter;
pub mod head;
pub mod input;
pub mod output;
pub mod ram;
pub mod sequence;
pub mod tape;

pub use control::{Control, StateId, Transition};
pub use counter::{Counter, CounterOp, UnsignedCounter, UnsignedCounterOp};
pub use head::Shift;
pub use input::{Input, InputOp};
pub use output::{Output, OutputOp};
pub use ram::{Arith, Ram, RamCell, RamOp, Register, Sign, MAX_REGISTERS, MAX_SHIFT};
pub use sequence::{Discipline, Sequence, SequenceOp};
pub use tape::{Tape, TapeOp};
