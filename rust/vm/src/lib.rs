//! Compiler, execution engine and explorer for lockstep machines.
//!
//! A [`Program`] is a list of device prototypes plus a table of
//! instructions, one operation per device. Compilation checks every
//! operation against its slot, decides whether the program is
//! deterministic, and groups the rows by control state so that a running
//! [`Machine`] only scans the rows leaving its current state.
//!
//! # Architecture
//!
//! - **Program** ([`program`]): validation, determinism analysis, search table
//! - **Machine** ([`machine`]): device states, candidates, bit-packed trace
//! - **Population** ([`population`]): machines bucketed by state, with a focus
//! - **Explorer** ([`explorer`]): background stepping, rayon-sharded rounds
//! - **Loader** ([`loader`]): TOML/JSON program descriptions
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use lockstep_vm::{loader, Explorer, ExplorerConfig};
//!
//! let program = Arc::new(loader::load_program("demos/even_a.toml".as_ref())?);
//! let mut explorer = Explorer::new(program, ExplorerConfig::default());
//! explorer.initialise(&["abba", "aab"])?;
//! explorer.run_all()?;
//! explorer.wait()?;
//! println!("{:?}", explorer.summary());
//! ```

pub mod bits;
pub mod config;
pub mod error;
pub mod explorer;
pub mod loader;
pub mod machine;
pub mod population;
pub mod program;

mod worker;

pub use bits::PackedArray;
pub use config::ExplorerConfig;
pub use error::{ExplorerError, LoadError, MachineError, ProgramError};
pub use explorer::{Explorer, OutputClass, Summary};
pub use machine::{Choice, Machine, MachineState};
pub use population::{Bucket, Focus, Population};
pub use program::{Conflict, Program, MAX_STATES, MAX_TRACE_BITS};
