//! Shard processing for the parallel explorer operations.
//!
//! A shard is a contiguous slice of the running bucket. Workers never touch
//! the shared population: they consume their shard and hand back every
//! machine, stepped or not, for the explorer to refile in order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::machine::MachineState;
use crate::population::{branch, Tracked};

/// What a worker hands back.
#[derive(Debug, Default)]
pub(crate) struct ShardOutcome {
    pub(crate) machines: Vec<Tracked>,
    pub(crate) steps: u64,
}

impl ShardOutcome {
    fn settle(&mut self, mut item: Tracked, steps: &AtomicU64) -> Vec<Tracked> {
        let (clones, taken) = branch(&mut item.machine);
        self.steps += taken;
        steps.fetch_add(taken, Ordering::Relaxed);
        self.machines.push(item);
        clones.into_iter().map(Tracked::branch).collect()
    }
}

/// Stop requests polled between machines.
#[derive(Debug, Default)]
pub(crate) struct Stop {
    pub(crate) pause: AtomicBool,
    pub(crate) halted: AtomicBool,
    pub(crate) on_halt: bool,
}

impl Stop {
    pub(crate) fn new(on_halt: bool) -> Self {
        Self {
            on_halt,
            ..Self::default()
        }
    }

    pub(crate) fn paused(&self) -> bool {
        self.pause.load(Ordering::Acquire)
    }

    /// Whether a worker should hand back the rest of its shard.
    pub(crate) fn requested(&self) -> bool {
        self.paused() || (self.on_halt && self.halted.load(Ordering::Acquire))
    }

    fn record(&self, item: &Tracked) {
        if item.machine.state() == MachineState::Halted {
            self.halted.store(true, Ordering::Release);
        }
    }
}

/// Split `items` into at most `workers` contiguous shards.
pub(crate) fn shard(mut items: Vec<Tracked>, workers: usize) -> Vec<Vec<Tracked>> {
    let size = items.len().div_ceil(workers.max(1)).max(1);
    let mut shards = Vec::new();
    while items.len() > size {
        let rest = items.split_off(size);
        shards.push(items);
        items = rest;
    }
    if !items.is_empty() {
        shards.push(items);
    }
    shards
}

/// Branch every machine of the shard once. Clones are not stepped again.
/// Once `pause` is raised the remaining machines are returned untouched.
pub(crate) fn step_shard(
    items: Vec<Tracked>,
    pause: &AtomicBool,
    steps: &AtomicU64,
) -> ShardOutcome {
    let mut outcome = ShardOutcome::default();
    for item in items {
        if pause.load(Ordering::Acquire) {
            outcome.machines.push(item);
            continue;
        }
        let clones = outcome.settle(item, steps);
        outcome.machines.extend(clones);
    }
    outcome
}

/// Drive the shard round-robin: each visit branches one machine once, and
/// every machine still running, clones included, rejoins the back of the
/// queue. Stops when nothing runs, `budget` steps have been spent, or `stop`
/// is requested; the rest of the queue is handed back in order.
pub(crate) fn run_shard(
    items: Vec<Tracked>,
    stop: &Stop,
    steps: &AtomicU64,
    budget: u64,
) -> ShardOutcome {
    let mut queue: VecDeque<Tracked> = items.into();
    let mut outcome = ShardOutcome::default();
    while let Some(mut item) = queue.pop_front() {
        let exhausted = outcome.steps >= budget || stop.requested();
        if exhausted || item.machine.state() != MachineState::Running {
            outcome.machines.push(item);
            continue;
        }
        let (clones, taken) = branch(&mut item.machine);
        outcome.steps += taken;
        steps.fetch_add(taken, Ordering::Relaxed);
        let stalled = taken == 0;
        for next in std::iter::once(item).chain(clones.into_iter().map(Tracked::branch)) {
            stop.record(&next);
            if next.machine.state() == MachineState::Running && !stalled {
                queue.push_back(next);
            } else {
                outcome.machines.push(next);
            }
        }
    }
    outcome
}
