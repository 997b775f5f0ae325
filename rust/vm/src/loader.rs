//! Program descriptions: serde documents that compile into a [`Program`].
//!
//! ```toml
//! [[device]]
//! kind = "control"
//! start = 0
//! accept = [{ state = 0, label = "even" }, { state = 1, label = "odd" }]
//!
//! [[device]]
//! kind = "input"
//! alphabet = "ab"
//!
//! [[instruction]]
//! ops = ["0 to 1", "scan a"]
//! ```
//!
//! Each instruction lists one operation per device in the operation text
//! form. Terminators default to `always`, except for inputs which default
//! to `consumed`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use lockstep_devices::kinds::{Control, Counter, Input, Output, Ram, StateId, Tape, UnsignedCounter};
use lockstep_devices::{
    Alphabet, Device, DeviceError, Initialiser, Numeral, Operation, OperationPool, Terminator,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::program::Program;

/// Read a `.json` or `.toml` document. Other extensions try JSON, then
/// TOML.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match path.extension().and_then(std::ffi::OsStr::to_str) {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("toml") => Ok(toml::from_str(&content)?),
        _ => serde_json::from_str(&content)
            .or_else(|_| toml::from_str(&content))
            .map_err(|_| LoadError::Format(path.to_path_buf())),
    }
}

/// Load and compile a program description.
///
/// # Errors
///
/// Returns a [`LoadError`] if the file cannot be read or parsed, or the
/// description does not compile.
pub fn load_program(path: &Path) -> Result<Program, LoadError> {
    let spec: ProgramSpec = read_document(path)?;
    spec.compile(&mut OperationPool::new())
}

/// Accepting control state with its output label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptSpec {
    /// Control state.
    pub state: StateId,
    /// Output reported when halting there.
    pub label: String,
}

/// Numeral encoding of a counter or RAM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumeralSpec {
    /// Digit characters, lowest first.
    pub digits: String,
    /// Bijective (b-adic) rather than positional.
    #[serde(default)]
    pub bijective: bool,
}

impl NumeralSpec {
    fn build(spec: Option<&Self>) -> Result<Numeral, DeviceError> {
        match spec {
            None => Ok(Numeral::decimal()),
            Some(spec) if spec.bijective => Numeral::bijective(&spec.digits),
            Some(spec) => Numeral::positional(&spec.digits),
        }
    }
}

/// Terminator names usable in descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminatorSpec {
    /// Halting is always allowed.
    Always,
    /// Input fully read.
    Consumed,
    /// Stack or queue empty.
    Empty,
    /// Counter at zero.
    Zero,
    /// Head on the home cell.
    Home,
}

impl TerminatorSpec {
    fn build(spec: Option<Self>, default: Terminator) -> Terminator {
        match spec {
            None => default,
            Some(Self::Always) => Terminator::Always,
            Some(Self::Consumed) => Terminator::Consumed,
            Some(Self::Empty) => Terminator::Empty,
            Some(Self::Zero) => Terminator::Zero,
            Some(Self::Home) => Terminator::Home,
        }
    }
}

/// One device declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceSpec {
    /// Finite control.
    Control {
        /// Start state.
        #[serde(default)]
        start: StateId,
        /// Accepting states.
        #[serde(default)]
        accept: Vec<AcceptSpec>,
    },
    /// Input reader.
    Input {
        /// Alphabet characters.
        alphabet: String,
        /// Halting condition.
        #[serde(default)]
        terminator: Option<TerminatorSpec>,
    },
    /// Output writer.
    Output {
        /// Alphabet characters.
        alphabet: String,
    },
    /// Stack.
    Stack {
        /// Alphabet characters.
        alphabet: String,
        /// Whether the stack starts with the input.
        #[serde(default)]
        initialiser: Initialiser,
        /// Halting condition.
        #[serde(default)]
        terminator: Option<TerminatorSpec>,
    },
    /// Queue.
    Queue {
        /// Alphabet characters.
        alphabet: String,
        /// Whether the queue starts with the input.
        #[serde(default)]
        initialiser: Initialiser,
        /// Halting condition.
        #[serde(default)]
        terminator: Option<TerminatorSpec>,
    },
    /// Signed counter.
    Counter {
        /// Numeral encoding; decimal when absent.
        #[serde(default)]
        numeral: Option<NumeralSpec>,
        /// Whether the counter starts with the parsed input.
        #[serde(default)]
        initialiser: Initialiser,
        /// Halting condition.
        #[serde(default)]
        terminator: Option<TerminatorSpec>,
    },
    /// Unsigned counter.
    UnsignedCounter {
        /// Numeral encoding; decimal when absent.
        #[serde(default)]
        numeral: Option<NumeralSpec>,
        /// Whether the counter starts with the parsed input.
        #[serde(default)]
        initialiser: Initialiser,
        /// Halting condition.
        #[serde(default)]
        terminator: Option<TerminatorSpec>,
    },
    /// Turing tape.
    Tape {
        /// Alphabet characters.
        alphabet: String,
        /// Blank character; must be in the alphabet.
        blank: char,
        /// Whether the tape starts with the input.
        #[serde(default)]
        initialiser: Initialiser,
        /// Halting condition.
        #[serde(default)]
        terminator: Option<TerminatorSpec>,
    },
    /// Random-access machine.
    Ram {
        /// Register count.
        registers: usize,
        /// Numeral encoding; decimal when absent.
        #[serde(default)]
        numeral: Option<NumeralSpec>,
        /// Whether register 0 starts with the parsed input.
        #[serde(default)]
        initialiser: Initialiser,
        /// Halting condition.
        #[serde(default)]
        terminator: Option<TerminatorSpec>,
    },
}

impl DeviceSpec {
    /// Build the prototype device.
    ///
    /// # Errors
    ///
    /// Returns a [`DeviceError`] for invalid alphabets, numerals or
    /// terminators.
    pub fn build(&self) -> Result<Device, DeviceError> {
        let alphabet = |chars: &str| Alphabet::try_from(chars).map(Arc::new);
        let always = Terminator::Always;
        Ok(match self {
            Self::Control { start, accept } => {
                let labels: BTreeMap<StateId, String> = accept
                    .iter()
                    .map(|a| (a.state, a.label.clone()))
                    .collect();
                Device::Control(Control::new(*start, labels))
            }
            Self::Input {
                alphabet: chars,
                terminator,
            } => Device::Input(Input::new(
                alphabet(chars)?,
                TerminatorSpec::build(*terminator, Terminator::Consumed),
            )?),
            Self::Output { alphabet: chars } => Device::Output(Output::new(alphabet(chars)?)),
            Self::Stack {
                alphabet: chars,
                initialiser,
                terminator,
            } => Device::stack(
                alphabet(chars)?,
                *initialiser,
                TerminatorSpec::build(*terminator, always),
            )?,
            Self::Queue {
                alphabet: chars,
                initialiser,
                terminator,
            } => Device::queue(
                alphabet(chars)?,
                *initialiser,
                TerminatorSpec::build(*terminator, always),
            )?,
            Self::Counter {
                numeral,
                initialiser,
                terminator,
            } => Device::Counter(Counter::new(
                NumeralSpec::build(numeral.as_ref())?,
                *initialiser,
                TerminatorSpec::build(*terminator, always),
            )?),
            Self::UnsignedCounter {
                numeral,
                initialiser,
                terminator,
            } => Device::UnsignedCounter(UnsignedCounter::new(
                NumeralSpec::build(numeral.as_ref())?,
                *initialiser,
                TerminatorSpec::build(*terminator, always),
            )?),
            Self::Tape {
                alphabet: chars,
                blank,
                initialiser,
                terminator,
            } => {
                let alphabet = alphabet(chars)?;
                let blank = alphabet.encode(*blank)?;
                Device::Tape(Tape::new(
                    alphabet,
                    blank,
                    *initialiser,
                    TerminatorSpec::build(*terminator, always),
                )?)
            }
            Self::Ram {
                registers,
                numeral,
                initialiser,
                terminator,
            } => Device::Ram(Ram::new(
                *registers,
                NumeralSpec::build(numeral.as_ref())?,
                *initialiser,
                TerminatorSpec::build(*terminator, always),
            )?),
        })
    }
}

/// One instruction row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionSpec {
    /// One operation per device, in device order.
    pub ops: Vec<String>,
}

/// A whole program description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSpec {
    /// Devices, in slot order.
    pub device: Vec<DeviceSpec>,
    /// Instruction rows, in declaration order.
    #[serde(default)]
    pub instruction: Vec<InstructionSpec>,
}

impl ProgramSpec {
    /// Build the devices, parse every operation through `pool`, and
    /// compile.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] naming the first offending device, row or
    /// operation.
    pub fn compile(&self, pool: &mut OperationPool) -> Result<Program, LoadError> {
        let devices = self
            .device
            .iter()
            .enumerate()
            .map(|(slot, spec)| {
                spec.build()
                    .map_err(|source| LoadError::Device { slot, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut operations = Vec::with_capacity(devices.len() * self.instruction.len());
        for (row, instruction) in self.instruction.iter().enumerate() {
            if instruction.ops.len() != devices.len() {
                return Err(LoadError::RowWidth {
                    row,
                    expected: devices.len(),
                    found: instruction.ops.len(),
                });
            }
            for (slot, (text, device)) in instruction.ops.iter().zip(&devices).enumerate() {
                let op = Operation::parse(text, device)
                    .map_err(|source| LoadError::Operation { row, slot, source })?;
                operations.push(pool.intern(op));
            }
        }
        Ok(Program::compile(devices, operations)?)
    }
}

/// Text form of every row of `program`, in declaration order.
#[must_use]
pub fn print_rows(program: &Program) -> Vec<Vec<String>> {
    let mut rows = vec![Vec::new(); program.rows()];
    for sorted in 0..program.rows() {
        let Some(declared) = program.source_row(sorted) else {
            continue;
        };
        rows[declared] = program
            .row(sorted)
            .iter()
            .zip(program.devices())
            .map(|(op, device)| op.display(device).to_string())
            .collect();
    }
    rows
}
