//! Per-machine execution state.
//!
//! A [`Machine`] owns its devices and shares its [`Program`]. After every
//! mutation it recomputes the set of applicable rows:
//!
//! - no candidate: `Blocked`;
//! - one candidate: `Running` with that choice pinned;
//! - several: `Running` with no choice pinned until [`Machine::choose`].

use std::fmt;
use std::sync::Arc;

use lockstep_devices::Device;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::bits::PackedArray;
use crate::error::MachineError;
use crate::program::Program;

/// Lifecycle of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineState {
    /// Not initialised, or initialisation failed.
    Invalid,
    /// At least one candidate is available.
    Running,
    /// Every device agreed to halt; outputs are collected.
    Halted,
    /// No row applies and the devices do not all agree to halt.
    Blocked,
}

/// One way to continue a running machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
    /// Apply the sorted row.
    Row(usize),
    /// Halt and collect outputs.
    Terminate,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row(row) => write!(f, "row {row}"),
            Self::Terminate => f.write_str("terminate"),
        }
    }
}

/// One run of a program.
#[derive(Debug, Clone)]
pub struct Machine {
    program: Arc<Program>,
    devices: Vec<Device>,
    state: MachineState,
    next: Option<Choice>,
    candidates: Vec<Choice>,
    output: Vec<String>,
    trace: PackedArray,
}

impl Machine {
    /// Create an uninitialised machine.
    #[must_use]
    pub fn new(program: Arc<Program>) -> Self {
        let devices = program.devices().to_vec();
        let trace = PackedArray::new(program.computation_bits());
        Self {
            program,
            devices,
            state: MachineState::Invalid,
            next: None,
            candidates: Vec::new(),
            output: Vec::new(),
            trace,
        }
    }

    /// Shared program.
    #[must_use]
    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    /// Device states, in slot order.
    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> MachineState {
        self.state
    }

    /// The choice the next step will take, if one is pinned.
    #[must_use]
    pub fn next_choice(&self) -> Option<Choice> {
        self.next
    }

    /// Every applicable choice, in table order; `Terminate` last.
    #[must_use]
    pub fn candidates(&self) -> &[Choice] {
        &self.candidates
    }

    /// Per-device outputs. Empty unless halted.
    #[must_use]
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Packed trace of the rows applied so far.
    #[must_use]
    pub fn trace(&self) -> &PackedArray {
        &self.trace
    }

    /// Number of rows applied.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.trace.len()
    }

    /// Applied sorted rows, oldest first.
    #[must_use]
    #[allow(clippy::as_conversions)]
    pub fn history(&self) -> Vec<usize> {
        // trace entries are at most MAX_TRACE_BITS wide
        self.trace.iter().map(|row| row as usize).collect()
    }

    /// Whether the machine is running but waits for [`Machine::choose`].
    #[must_use]
    pub fn needs_choice(&self) -> bool {
        self.state == MachineState::Running && self.next.is_none()
    }

    /// Reset every device with `input` and compute the first candidates.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::Input`] if an input-fed device cannot load
    /// `input`; the machine is left `Invalid`.
    pub fn initialise(&mut self, input: &str) -> Result<(), MachineError> {
        self.output.clear();
        self.trace.clear();
        self.next = None;
        self.candidates.clear();
        self.state = MachineState::Invalid;
        for (slot, device) in self.devices.iter_mut().enumerate() {
            device
                .initialise(input)
                .map_err(|source| MachineError::Input {
                    slot,
                    input: input.to_string(),
                    source,
                })?;
        }
        self.refresh();
        Ok(())
    }

    fn refresh(&mut self) {
        let window = match self.program.control_slot() {
            Some(slot) => match &self.devices[slot] {
                Device::Control(control) => self.program.window(control.state()),
                _ => unreachable!("control slot holds a control device"),
            },
            None => 0..self.program.rows(),
        };
        self.candidates.clear();
        for row in window {
            let ops = self.program.row(row);
            if ops
                .iter()
                .zip(&self.devices)
                .all(|(op, device)| op.applicable(device))
            {
                self.candidates.push(Choice::Row(row));
            }
        }
        if self.devices.iter().all(Device::terminating) {
            self.candidates.push(Choice::Terminate);
        }
        match self.candidates.as_slice() {
            [] => {
                self.state = MachineState::Blocked;
                self.next = None;
            }
            [only] => {
                self.state = MachineState::Running;
                self.next = Some(*only);
            }
            _ => {
                self.state = MachineState::Running;
                self.next = None;
            }
        }
    }

    /// Pin one of the current candidates as the next step.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::NotACandidate`] if `choice` is not currently
    /// applicable.
    pub fn choose(&mut self, choice: Choice) -> Result<(), MachineError> {
        if self.state != MachineState::Running || !self.candidates.contains(&choice) {
            return Err(MachineError::NotACandidate {
                choice: choice.to_string(),
            });
        }
        self.next = Some(choice);
        Ok(())
    }

    /// Take the pinned step. Returns `false` when nothing was pinned.
    pub fn next(&mut self) -> bool {
        if self.state != MachineState::Running {
            return false;
        }
        match self.next.take() {
            None => false,
            Some(Choice::Terminate) => {
                self.terminate();
                true
            }
            Some(Choice::Row(row)) => {
                self.apply(row);
                true
            }
        }
    }

    #[allow(clippy::as_conversions)]
    fn apply(&mut self, row: usize) {
        let ops = self.program.row(row);
        for (op, device) in ops.iter().zip(self.devices.iter_mut()) {
            op.apply(device);
        }
        // row < 2^computation_bits
        self.trace.push(row as u64);
        self.refresh();
        trace!(row, state = ?self.state, candidates = self.candidates.len(), "applied row");
    }

    /// Step until the machine stops running or needs a choice. Returns the
    /// number of steps taken, termination included.
    pub fn run(&mut self) -> u64 {
        let mut steps = 0;
        while self.next() {
            steps += 1;
        }
        steps
    }

    /// Halt and collect every device's output. No-op when already halted.
    ///
    /// # Panics
    ///
    /// Panics if some device is not in a terminating configuration.
    pub fn terminate(&mut self) {
        if self.state == MachineState::Halted {
            return;
        }
        assert!(
            self.devices.iter().all(Device::terminating),
            "terminate called on a machine whose devices do not all agree to halt"
        );
        self.output = self.devices.iter().map(Device::terminate).collect();
        self.state = MachineState::Halted;
        self.next = None;
        self.candidates.clear();
        trace!(output = ?self.output, "machine halted");
    }
}
