//! Error types for compiling, running, loading and exploring programs.

use std::path::PathBuf;

use lockstep_devices::{DeviceError, DeviceKind};

/// A device list and operation table that do not form a valid program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    /// A program needs at least one device.
    #[error("program has no devices")]
    NoDevices,
    /// The flat table is not a whole number of rows.
    #[error("{operations} operations do not split into rows of {devices}")]
    RaggedTable {
        /// Table length.
        operations: usize,
        /// Row width.
        devices: usize,
    },
    /// An operation sits in the slot of a device of another kind.
    #[error("row {row}, slot {slot}: expected a {expected} operation, found {found}")]
    KindMismatch {
        /// Declared row.
        row: usize,
        /// Device slot.
        slot: usize,
        /// Kind of the device in that slot.
        expected: DeviceKind,
        /// Kind of the operation.
        found: DeviceKind,
    },
    /// An operation does not fit its device (symbol or register bounds).
    #[error("row {row}, slot {slot}: {source}")]
    Device {
        /// Declared row.
        row: usize,
        /// Device slot.
        slot: usize,
        /// Underlying device error.
        #[source]
        source: DeviceError,
    },
    /// A control state lies beyond the search table bound.
    #[error("row {row}: control state {state} exceeds the limit of {max} states")]
    StateRange {
        /// Declared row.
        row: usize,
        /// Offending state.
        state: usize,
        /// Supported number of states.
        max: usize,
    },
    /// Row indices would not fit the trace encoding.
    #[error("{rows} rows need {bits} trace bits, more than the {max} supported")]
    TraceWidth {
        /// Number of rows.
        rows: usize,
        /// Bits required.
        bits: u32,
        /// Supported maximum.
        max: u32,
    },
}

/// Errors from driving a single machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    /// A device could not load the input.
    #[error("device {slot} rejected input {input:?}: {source}")]
    Input {
        /// Device slot.
        slot: usize,
        /// The rejected input.
        input: String,
        /// Underlying device error.
        #[source]
        source: DeviceError,
    },
    /// A choice was made that is not among the current candidates.
    #[error("{choice} is not a current candidate")]
    NotACandidate {
        /// The rejected choice, rendered.
        choice: String,
    },
}

/// Errors from reading a program description.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// TOML syntax or schema error.
    #[error("invalid TOML program: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON syntax or schema error.
    #[error("invalid JSON program: {0}")]
    Json(#[from] serde_json::Error),
    /// The file extension names no supported format.
    #[error("unsupported program format {0:?} (expected .toml or .json)")]
    Format(PathBuf),
    /// An instruction row lists the wrong number of operations.
    #[error("instruction {row} has {found} operations, expected {expected}")]
    RowWidth {
        /// Declared row.
        row: usize,
        /// Number of devices.
        expected: usize,
        /// Operations given.
        found: usize,
    },
    /// A device declaration is invalid.
    #[error("device {slot}: {source}")]
    Device {
        /// Device slot.
        slot: usize,
        /// Underlying device error.
        #[source]
        source: DeviceError,
    },
    /// An operation could not be parsed for its device.
    #[error("instruction {row}, device {slot}: {source}")]
    Operation {
        /// Declared row.
        row: usize,
        /// Device slot.
        slot: usize,
        /// Underlying device error.
        #[source]
        source: DeviceError,
    },
    /// The description parsed but does not compile.
    #[error(transparent)]
    Program(#[from] ProgramError),
}

/// Errors surfaced by the explorer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExplorerError {
    /// At least one input could not be loaded; the machine was filed as
    /// invalid.
    #[error("input {index}: {source}")]
    Input {
        /// Position in the input list.
        index: usize,
        /// Underlying machine error.
        #[source]
        source: MachineError,
    },
    /// The background thread could not be started.
    #[error("failed to spawn explorer thread: {0}")]
    Spawn(String),
    /// The background operation panicked.
    #[error("explorer operation panicked: {0}")]
    Panicked(String),
}
