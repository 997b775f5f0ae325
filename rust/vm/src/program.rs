//! Compile a device list and a flat operation table into a [`Program`].
//!
//! Compilation validates every operation against its device slot, runs the
//! determinism analysis and, when a control unit is present, reorders the
//! rows so that each control state owns a contiguous window of the table.

use std::ops::Range;

use lockstep_devices::kinds::StateId;
use lockstep_devices::{Device, DeviceKind, OpRef};
use serde::Serialize;
use tracing::debug;

use crate::error::ProgramError;

/// Widest trace entry supported.
pub const MAX_TRACE_BITS: u32 = 32;

/// Control states a search table may cover. Transitions must name states
/// below this bound.
pub const MAX_STATES: usize = 1 << 20;

/// A reason the program is not deterministic. Rows are declared rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Conflict {
    /// Both rows can be applicable in the same configuration.
    Rows(usize, usize),
    /// The row can be applicable while every device agrees to halt.
    Termination(usize),
}

/// Immutable compiled program, shared by every machine built from it.
#[derive(Debug, Clone)]
pub struct Program {
    devices: Vec<Device>,
    table: Vec<OpRef>,
    control: Option<usize>,
    search_table: Vec<usize>,
    source_rows: Vec<usize>,
    conflicts: Vec<Conflict>,
    computation_bits: u32,
}

impl Program {
    /// Compile `devices` with the row-major operation table `operations`.
    ///
    /// The devices become prototypes: each machine starts from a clone.
    ///
    /// # Errors
    ///
    /// Returns a [`ProgramError`] if the device list is empty, the table is
    /// not a whole number of rows, an operation does not belong to its
    /// slot's device, a transition names a state of [`MAX_STATES`] or above,
    /// or the table is too large for the trace encoding.
    pub fn compile(devices: Vec<Device>, operations: Vec<OpRef>) -> Result<Self, ProgramError> {
        let width = devices.len();
        if width == 0 {
            return Err(ProgramError::NoDevices);
        }
        if operations.len() % width != 0 {
            return Err(ProgramError::RaggedTable {
                operations: operations.len(),
                devices: width,
            });
        }
        let rows = operations.len() / width;

        for (index, op) in operations.iter().enumerate() {
            let (row, slot) = (index / width, index % width);
            let device = &devices[slot];
            if !op.accepts(device.kind()) {
                return Err(ProgramError::KindMismatch {
                    row,
                    slot,
                    expected: device.kind(),
                    found: op.kind(),
                });
            }
            op.check(device)
                .map_err(|source| ProgramError::Device { row, slot, source })?;
        }

        let computation_bits = trace_bits(rows);
        if computation_bits > MAX_TRACE_BITS {
            return Err(ProgramError::TraceWidth {
                rows,
                bits: computation_bits,
                max: MAX_TRACE_BITS,
            });
        }

        let control = devices
            .iter()
            .position(|device| device.kind() == DeviceKind::Control);

        let (source_rows, search_table) = match control {
            Some(slot) => {
                let transition = |row: usize| {
                    operations[row * width + slot]
                        .transition()
                        .unwrap_or_else(|| unreachable!("control slot holds transitions"))
                };
                let mut states = 0;
                for row in 0..rows {
                    let highest = transition(row).from.max(transition(row).to);
                    if highest >= MAX_STATES {
                        return Err(ProgramError::StateRange {
                            row,
                            state: highest,
                            max: MAX_STATES,
                        });
                    }
                    states = states.max(highest + 1);
                }
                let identity: Vec<usize> = (0..rows).collect();
                let by_to = counting_sort(&identity, states, |row| transition(row).to);
                let by_from = counting_sort(&by_to, states, |row| transition(row).from);
                let table = window_offsets(&by_from, states, |row| transition(row).from);
                (by_from, table)
            }
            None => ((0..rows).collect(), Vec::new()),
        };

        let table: Vec<OpRef> = source_rows
            .iter()
            .flat_map(|&row| operations[row * width..(row + 1) * width].iter().cloned())
            .collect();

        let mut program = Self {
            devices,
            table,
            control,
            search_table,
            source_rows,
            conflicts: Vec::new(),
            computation_bits,
        };
        program.conflicts = program.find_conflicts();

        debug!(
            devices = width,
            rows,
            states = program.states(),
            deterministic = program.is_deterministic(),
            conflicts = program.conflicts.len(),
            "compiled program"
        );
        Ok(program)
    }

    /// Pairwise and termination conflicts, each requiring overlap on every
    /// device slot.
    fn find_conflicts(&self) -> Vec<Conflict> {
        let rows = self.rows();
        let terminators: Vec<_> = self.devices.iter().map(Device::terminator).collect();
        let mut conflicts = Vec::new();
        for i in 0..rows {
            let row_i = self.row(i);
            if row_i
                .iter()
                .zip(&terminators)
                .all(|(op, terminator)| op.intersects_terminator(terminator))
            {
                conflicts.push(Conflict::Termination(self.source_rows[i]));
            }
            for j in (i + 1)..rows {
                let row_j = self.row(j);
                if row_i.iter().zip(row_j).all(|(a, b)| a.intersects(b)) {
                    let (a, b) = (self.source_rows[i], self.source_rows[j]);
                    conflicts.push(Conflict::Rows(a.min(b), a.max(b)));
                }
            }
        }
        conflicts.sort_unstable();
        conflicts
    }

    /// Prototype devices, in slot order.
    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Operations per row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.devices.len()
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.table.len() / self.devices.len()
    }

    /// The flattened table, row-major, in sorted row order.
    #[must_use]
    pub fn table(&self) -> &[OpRef] {
        &self.table
    }

    /// Operations of sorted row `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn row(&self, row: usize) -> &[OpRef] {
        let width = self.width();
        &self.table[row * width..(row + 1) * width]
    }

    /// Declared position of sorted row `row`.
    #[must_use]
    pub fn source_row(&self, row: usize) -> Option<usize> {
        self.source_rows.get(row).copied()
    }

    /// Slot of the control unit, if any.
    #[must_use]
    pub fn control_slot(&self) -> Option<usize> {
        self.control
    }

    /// Number of control states covered by the search table.
    #[must_use]
    pub fn states(&self) -> usize {
        self.search_table.len().saturating_sub(1)
    }

    /// Offsets of each state's window; `states() + 1` entries.
    #[must_use]
    pub fn search_table(&self) -> &[usize] {
        &self.search_table
    }

    /// Rows whose control transition starts at `state`. Without a control
    /// unit every row is a candidate.
    #[must_use]
    pub fn window(&self, state: StateId) -> Range<usize> {
        if self.control.is_none() {
            return 0..self.rows();
        }
        match (self.search_table.get(state), self.search_table.get(state + 1)) {
            (Some(&start), Some(&end)) => start..end,
            _ => 0..0,
        }
    }

    /// Whether no two rows and no row and natural termination can be
    /// enabled together.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Every detected conflict, sorted.
    #[must_use]
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Bits per trace entry.
    #[must_use]
    pub fn computation_bits(&self) -> u32 {
        self.computation_bits
    }
}

/// `ceil(log2(rows))`, zero for a single row or none.
fn trace_bits(rows: usize) -> u32 {
    if rows <= 1 {
        0
    } else {
        usize::BITS - (rows - 1).leading_zeros()
    }
}

/// Stable counting sort of `order` by `key`, with keys below `buckets`.
fn counting_sort(order: &[usize], buckets: usize, key: impl Fn(usize) -> usize) -> Vec<usize> {
    let mut starts = window_offsets(order, buckets, &key);
    let mut sorted = vec![0; order.len()];
    for &row in order {
        let slot = &mut starts[key(row)];
        sorted[*slot] = row;
        *slot += 1;
    }
    sorted
}

/// Prefix sums of bucket sizes: `buckets + 1` offsets.
fn window_offsets(order: &[usize], buckets: usize, key: impl Fn(usize) -> usize) -> Vec<usize> {
    let mut offsets = vec![0; buckets + 1];
    for &row in order {
        offsets[key(row) + 1] += 1;
    }
    for i in 0..buckets {
        offsets[i + 1] += offsets[i];
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_bits() {
        assert_eq!(trace_bits(0), 0);
        assert_eq!(trace_bits(1), 0);
        assert_eq!(trace_bits(2), 1);
        assert_eq!(trace_bits(5), 3);
        assert_eq!(trace_bits(8), 3);
        assert_eq!(trace_bits(9), 4);
    }

    #[test]
    fn test_counting_sort_is_stable() {
        let keys = [2, 0, 1, 0, 2];
        let sorted = counting_sort(&[0, 1, 2, 3, 4], 3, |row| keys[row]);
        assert_eq!(sorted, vec![1, 3, 2, 0, 4]);
        assert_eq!(window_offsets(&sorted, 3, |row| keys[row]), vec![0, 2, 3, 5]);
    }
}
