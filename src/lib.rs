//! Interpreter for abstract machines built from lockstep devices.
//!
//! Re-exports the device model from `lockstep-devices` and the compiler,
//! machine and explorer from `lockstep-vm`, so that a program can be
//! loaded, run and explored through one crate.

pub use lockstep_devices as devices;
pub use lockstep_vm as vm;

pub use lockstep_devices::{
    Alphabet, Device, DeviceError, DeviceKind, Initialiser, Numeral, OpRef, Operation,
    OperationPool, Symbol, Terminator,
};
pub use lockstep_vm::loader::load_program;
pub use lockstep_vm::{
    Bucket, Choice, Conflict, Explorer, ExplorerConfig, ExplorerError, Focus, LoadError, Machine,
    MachineError, MachineState, OutputClass, Program, ProgramError, Summary,
};
