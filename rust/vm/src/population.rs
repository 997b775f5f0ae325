//! Machine populations partitioned by state, with a movable focus.

use std::collections::BTreeMap;

use tracing::debug;

use crate::machine::{Machine, MachineState};

/// A bucket of the population.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Machines whose input could not be loaded.
    Invalid,
    /// Machines that can still step.
    Running,
    /// Machines with no applicable row.
    Blocked,
    /// Halted machines with this output vector.
    Halted(Vec<String>),
}

/// Location of one machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Focus {
    /// Bucket holding the machine.
    pub bucket: Bucket,
    /// Position within the bucket.
    pub index: usize,
}

/// A machine handed to a worker, remembering whether it holds the focus.
#[derive(Debug, Clone)]
pub(crate) struct Tracked {
    pub(crate) machine: Machine,
    pub(crate) focus: bool,
}

impl Tracked {
    pub(crate) fn branch(machine: Machine) -> Self {
        Self {
            machine,
            focus: false,
        }
    }
}

/// Advance `machine` one step along its default choice, and a clone of it
/// along every other candidate.
///
/// The default is the pinned choice if there is one, else the first
/// candidate. Returns the clones, in candidate order, and the number of
/// steps taken.
pub fn branch(machine: &mut Machine) -> (Vec<Machine>, u64) {
    if machine.state() != MachineState::Running {
        return (Vec::new(), 0);
    }
    let candidates = machine.candidates().to_vec();
    let Some(default) = machine.next_choice().or_else(|| candidates.first().copied()) else {
        return (Vec::new(), 0);
    };
    let mut clones = Vec::with_capacity(candidates.len().saturating_sub(1));
    let mut steps = 0;
    for choice in candidates.into_iter().filter(|c| *c != default) {
        let mut clone = machine.clone();
        if clone.choose(choice).is_ok() && clone.next() {
            steps += 1;
        }
        clones.push(clone);
    }
    if machine.choose(default).is_ok() && machine.next() {
        steps += 1;
    }
    if !clones.is_empty() {
        debug!(branches = clones.len() + 1, "machine branched");
    }
    (clones, steps)
}

/// Machines partitioned by state; halted machines further by output.
#[derive(Debug, Clone, Default)]
pub struct Population {
    invalid: Vec<Machine>,
    running: Vec<Machine>,
    blocked: Vec<Machine>,
    halted: BTreeMap<Vec<String>, Vec<Machine>>,
    focus: Option<Focus>,
}

impl Population {
    /// Create an empty population.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every machine and the focus.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Add a machine to the bucket matching its state.
    pub fn file(&mut self, machine: Machine) -> Focus {
        let (bucket, list) = match machine.state() {
            MachineState::Invalid => (Bucket::Invalid, &mut self.invalid),
            MachineState::Running => (Bucket::Running, &mut self.running),
            MachineState::Blocked => (Bucket::Blocked, &mut self.blocked),
            MachineState::Halted => {
                let key = machine.output().to_vec();
                (
                    Bucket::Halted(key.clone()),
                    self.halted.entry(key).or_default(),
                )
            }
        };
        list.push(machine);
        Focus {
            bucket,
            index: list.len() - 1,
        }
    }

    fn bucket(&self, bucket: &Bucket) -> Option<&Vec<Machine>> {
        match bucket {
            Bucket::Invalid => Some(&self.invalid),
            Bucket::Running => Some(&self.running),
            Bucket::Blocked => Some(&self.blocked),
            Bucket::Halted(key) => self.halted.get(key),
        }
    }

    fn bucket_mut(&mut self, bucket: &Bucket) -> Option<&mut Vec<Machine>> {
        match bucket {
            Bucket::Invalid => Some(&mut self.invalid),
            Bucket::Running => Some(&mut self.running),
            Bucket::Blocked => Some(&mut self.blocked),
            Bucket::Halted(key) => self.halted.get_mut(key),
        }
    }

    /// Machine at `focus`.
    #[must_use]
    pub fn get(&self, focus: &Focus) -> Option<&Machine> {
        self.bucket(&focus.bucket)?.get(focus.index)
    }

    /// Current focus.
    #[must_use]
    pub fn focus(&self) -> Option<&Focus> {
        self.focus.as_ref()
    }

    /// The focused machine.
    #[must_use]
    pub fn focused(&self) -> Option<&Machine> {
        self.focus.as_ref().and_then(|focus| self.get(focus))
    }

    /// Move the focus. Returns `false`, leaving the focus unchanged, if
    /// nothing lives at `focus`.
    pub fn set_focus(&mut self, focus: Focus) -> bool {
        if self.get(&focus).is_none() {
            return false;
        }
        self.focus = Some(focus);
        true
    }

    /// Drop the focus.
    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    /// Remove the focused machine; the focus is cleared.
    fn take_focused(&mut self) -> Option<Machine> {
        let focus = self.focus.take()?;
        let list = self.bucket_mut(&focus.bucket)?;
        if focus.index >= list.len() {
            return None;
        }
        let machine = list.remove(focus.index);
        if let Bucket::Halted(key) = &focus.bucket {
            if list.is_empty() {
                self.halted.remove(key);
            }
        }
        Some(machine)
    }

    /// Branch the focused machine once and refile everything; the focus
    /// follows the original machine. Returns the steps taken, zero when
    /// the focus is unset or not running.
    pub fn step_focus(&mut self) -> u64 {
        if self.focused().map(Machine::state) != Some(MachineState::Running) {
            return 0;
        }
        let Some(mut machine) = self.take_focused() else {
            return 0;
        };
        let (clones, steps) = branch(&mut machine);
        for clone in clones {
            self.file(clone);
        }
        self.focus = Some(self.file(machine));
        steps
    }

    /// Whether the focused machine can still step.
    #[must_use]
    pub fn focus_running(&self) -> bool {
        self.focused().map(Machine::state) == Some(MachineState::Running)
    }

    /// Hand every running machine to the caller, remembering the focus.
    pub(crate) fn drain_running(&mut self) -> Vec<Tracked> {
        let focused = match &self.focus {
            Some(Focus {
                bucket: Bucket::Running,
                index,
            }) => Some(*index),
            _ => None,
        };
        if focused.is_some() {
            self.focus = None;
        }
        self.running
            .drain(..)
            .enumerate()
            .map(|(i, machine)| Tracked {
                machine,
                focus: Some(i) == focused,
            })
            .collect()
    }

    /// File machines returned by workers, in order.
    pub(crate) fn merge(&mut self, machines: impl IntoIterator<Item = Tracked>) {
        for tracked in machines {
            let location = self.file(tracked.machine);
            if tracked.focus {
                self.focus = Some(location);
            }
        }
    }

    /// Machines that failed to initialise.
    #[must_use]
    pub fn invalid(&self) -> &[Machine] {
        &self.invalid
    }

    /// Machines that can still step.
    #[must_use]
    pub fn running(&self) -> &[Machine] {
        &self.running
    }

    /// Machines with nothing applicable.
    #[must_use]
    pub fn blocked(&self) -> &[Machine] {
        &self.blocked
    }

    /// Halted machines grouped by output vector.
    #[must_use]
    pub fn halted(&self) -> &BTreeMap<Vec<String>, Vec<Machine>> {
        &self.halted
    }

    /// Number of halted machines.
    #[must_use]
    pub fn halted_len(&self) -> usize {
        self.halted.values().map(Vec::len).sum()
    }

    /// Total number of machines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.invalid.len() + self.running.len() + self.blocked.len() + self.halted_len()
    }

    /// Whether there are no machines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
