//! Exploration of non-deterministic programs.
//!
//! An [`Explorer`] owns a population of machines built from one program.
//! Every operation that advances machines runs on a background thread and
//! returns immediately; callers [`Explorer::wait`] for it, poll with
//! [`Explorer::wait_for`], or interrupt it with [`Explorer::pause`]. At most
//! one operation is in flight at a time.
//!
//! `step`/`run` drive the focused machine on the background thread.
//! `step_all`/`run_all` drain the running bucket into contiguous shards and
//! process them on a rayon pool, then refile every machine in shard order.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ExplorerConfig;
use crate::error::ExplorerError;
use crate::machine::Machine;
use crate::population::{Focus, Population, Tracked};
use crate::program::Program;
use crate::worker::{run_shard, shard, step_shard, ShardOutcome, Stop};

/// One halted output vector and how many machines produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputClass {
    /// Per-device outputs.
    pub output: Vec<String>,
    /// Machines in the class.
    pub machines: usize,
}

/// Snapshot of the population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Whether the program passed the determinism check.
    pub deterministic: bool,
    /// Steps taken since the last `initialise`.
    pub steps: u64,
    /// Machines whose input could not be loaded.
    pub invalid: usize,
    /// Machines that can still step.
    pub running: usize,
    /// Machines with no applicable row.
    pub blocked: usize,
    /// Halted machines.
    pub halted: usize,
    /// Halted machines grouped by output.
    pub classes: Vec<OutputClass>,
}

struct Shared {
    program: Arc<Program>,
    population: Mutex<Population>,
    stop: Stop,
    steps: AtomicU64,
    pool: ThreadPool,
    config: ExplorerConfig,
}

impl Shared {
    fn population(&self) -> MutexGuard<'_, Population> {
        self.population.lock().expect("population lock poisoned")
    }

    fn paused(&self) -> bool {
        self.stop.paused()
    }

    fn step(&self) {
        let steps = self.population().step_focus();
        self.steps.fetch_add(steps, Ordering::Relaxed);
    }

    /// Step the focus until it stops running. The lock is released between
    /// steps so that readers are not starved.
    fn run(&self) {
        let start = self.steps.load(Ordering::Relaxed);
        loop {
            if self.paused() || self.over_limit(start) {
                break;
            }
            let mut population = self.population();
            if !population.focus_running() {
                break;
            }
            let steps = population.step_focus();
            drop(population);
            self.steps.fetch_add(steps, Ordering::Relaxed);
        }
    }

    fn over_limit(&self, start: u64) -> bool {
        self.config
            .step_limit
            .is_some_and(|limit| self.steps.load(Ordering::Relaxed) - start >= limit)
    }

    /// Process the current running bucket once on the pool.
    fn round(&self, job: impl Fn(Vec<Tracked>) -> ShardOutcome + Sync) -> usize {
        let running = self.population().drain_running();
        let machines = running.len();
        let shards = shard(running, self.config.workers);
        let outcomes: Vec<ShardOutcome> =
            self.pool.install(|| shards.into_par_iter().map(&job).collect());
        let mut population = self.population();
        for outcome in outcomes {
            population.merge(outcome.machines);
        }
        machines
    }

    fn step_all(&self) {
        let machines = self.round(|items| step_shard(items, &self.stop.pause, &self.steps));
        debug!(machines, "stepped running machines");
    }

    fn run_all(&self) {
        let start = self.steps.load(Ordering::Relaxed);
        self.stop.halted.store(false, Ordering::Release);
        let mut rounds = 0_u64;
        loop {
            if self.stop.requested()
                || self.over_limit(start)
                || self.population().running().is_empty()
            {
                break;
            }
            let budget = match self.config.step_limit {
                Some(limit) => {
                    let spent = self.steps.load(Ordering::Relaxed) - start;
                    self.config.round_budget.min(limit.saturating_sub(spent))
                }
                None => self.config.round_budget,
            }
            .max(1);
            self.round(|items| run_shard(items, &self.stop, &self.steps, budget));
            rounds += 1;
        }
        if self.stop.on_halt && self.stop.halted.load(Ordering::Acquire) {
            debug!("stopped at the first halted machine");
        }
        debug!(rounds, steps = self.steps.load(Ordering::Relaxed) - start, "run_all finished");
    }
}

/// Sets the completion flag even when the operation unwinds.
struct DoneGuard(Arc<(Mutex<bool>, Condvar)>);

impl Drop for DoneGuard {
    fn drop(&mut self) {
        let (flag, signal) = &*self.0;
        // poisoning cannot hide the flag from waiters
        let mut done = flag.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *done = true;
        signal.notify_all();
    }
}

struct InFlight {
    name: &'static str,
    handle: JoinHandle<()>,
    done: Arc<(Mutex<bool>, Condvar)>,
}

/// Explorer over a population of machines running one program.
pub struct Explorer {
    shared: Arc<Shared>,
    in_flight: Option<InFlight>,
}

impl std::fmt::Debug for Explorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explorer")
            .field("config", &self.shared.config)
            .field("steps", &self.steps())
            .field("in_flight", &self.in_flight.as_ref().map(|op| op.name))
            .finish_non_exhaustive()
    }
}

impl Explorer {
    /// Create an explorer with an empty population.
    ///
    /// # Panics
    ///
    /// Panics if the worker pool cannot be created.
    #[must_use]
    pub fn new(program: Arc<Program>, config: ExplorerConfig) -> Self {
        let workers = config.workers;
        let config = config.with_workers(workers);
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("lockstep-worker-{i}"))
            .build()
            .expect("thread pool build failed");
        if !program.is_deterministic() {
            debug!(
                conflicts = program.conflicts().len(),
                "exploring a non-deterministic program"
            );
        }
        Self {
            shared: Arc::new(Shared {
                program,
                population: Mutex::new(Population::new()),
                stop: Stop::new(config.stop_on_halt),
                steps: AtomicU64::new(0),
                pool,
                config,
            }),
            in_flight: None,
        }
    }

    /// Program being explored.
    #[must_use]
    pub fn program(&self) -> &Arc<Program> {
        &self.shared.program
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ExplorerConfig {
        &self.shared.config
    }

    /// Steps taken since the last [`Explorer::initialise`].
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.shared.steps.load(Ordering::Relaxed)
    }

    /// Whether no operation is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.in_flight
            .as_ref()
            .map_or(true, |op| op.handle.is_finished())
    }

    /// Replace the population with one fresh machine per input. Machines
    /// whose input is rejected are filed as invalid. The focus moves to the
    /// first machine.
    ///
    /// # Errors
    ///
    /// Returns the first rejected input, after the whole population has been
    /// built, or the failure of the previous operation.
    pub fn initialise<S: AsRef<str>>(&mut self, inputs: &[S]) -> Result<(), ExplorerError> {
        self.wait()?;
        let mut first_error = None;
        let mut population = self.shared.population();
        population.clear();
        for (index, input) in inputs.iter().enumerate() {
            let mut machine = Machine::new(Arc::clone(&self.shared.program));
            if let Err(source) = machine.initialise(input.as_ref()) {
                warn!(index, error = %source, "input rejected");
                first_error.get_or_insert(ExplorerError::Input { index, source });
            }
            let location = population.file(machine);
            if index == 0 {
                population.set_focus(location);
            }
        }
        drop(population);
        self.shared.steps.store(0, Ordering::Relaxed);
        debug!(machines = inputs.len(), "population initialised");
        first_error.map_or(Ok(()), Err)
    }

    fn launch(
        &mut self,
        name: &'static str,
        job: impl FnOnce(&Shared) + Send + 'static,
    ) -> Result<(), ExplorerError> {
        self.wait()?;
        self.shared.stop.pause.store(false, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let done = Arc::new((Mutex::new(false), Condvar::new()));
        let guard = DoneGuard(Arc::clone(&done));
        let handle = std::thread::Builder::new()
            .name(format!("lockstep-{name}"))
            .spawn(move || {
                let _guard = guard;
                job(shared.as_ref());
            })
            .map_err(|err| ExplorerError::Spawn(err.to_string()))?;
        debug!(operation = name, "launched");
        self.in_flight = Some(InFlight { name, handle, done });
        Ok(())
    }

    /// Branch the focused machine once. No-op when the focus is unset or
    /// not running.
    ///
    /// # Errors
    ///
    /// Returns the failure of the previous operation, or
    /// [`ExplorerError::Spawn`].
    pub fn step(&mut self) -> Result<(), ExplorerError> {
        self.launch("step", Shared::step)
    }

    /// Step the focused machine until it stops running, the step limit is
    /// reached, or [`Explorer::pause`] is called.
    ///
    /// # Errors
    ///
    /// As [`Explorer::step`].
    pub fn run(&mut self) -> Result<(), ExplorerError> {
        self.launch("run", Shared::run)
    }

    /// Branch every running machine once, in parallel.
    ///
    /// # Errors
    ///
    /// As [`Explorer::step`].
    pub fn step_all(&mut self) -> Result<(), ExplorerError> {
        self.launch("step_all", Shared::step_all)
    }

    /// Drive every running machine, and every clone spawned on the way,
    /// until none is running, the step limit is reached, or
    /// [`Explorer::pause`] is called. With `stop_on_halt`, every worker also
    /// stops at its next machine once any machine halts.
    ///
    /// # Errors
    ///
    /// As [`Explorer::step`].
    pub fn run_all(&mut self) -> Result<(), ExplorerError> {
        self.launch("run_all", Shared::run_all)
    }

    /// Ask the in-flight operation to stop at the next machine boundary.
    pub fn pause(&self) {
        self.shared.stop.pause.store(true, Ordering::Release);
    }

    /// Block until the in-flight operation finishes.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Panicked`] if the operation panicked.
    pub fn wait(&mut self) -> Result<(), ExplorerError> {
        let Some(op) = self.in_flight.take() else {
            return Ok(());
        };
        op.handle.join().map_err(|payload| {
            let message = panic_message(payload.as_ref());
            warn!(operation = op.name, %message, "operation panicked");
            ExplorerError::Panicked(message)
        })
    }

    /// Block for at most `timeout`. Returns `true` when nothing is in
    /// flight any more.
    ///
    /// # Panics
    ///
    /// Panics if the completion lock is poisoned.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let Some(op) = &self.in_flight else {
            return true;
        };
        let (flag, signal) = &*op.done;
        let done = flag.lock().expect("completion lock poisoned");
        let (done, _) = signal
            .wait_timeout_while(done, timeout, |done| !*done)
            .expect("completion lock poisoned");
        *done
    }

    /// Run `f` against the population under its lock.
    ///
    /// While `step_all` or `run_all` is in flight, the machines handed to
    /// workers are absent from the population until their round ends.
    ///
    /// # Panics
    ///
    /// Panics if the population lock is poisoned.
    pub fn with_population<R>(&self, f: impl FnOnce(&Population) -> R) -> R {
        f(&self.shared.population())
    }

    /// Current focus.
    #[must_use]
    pub fn focus(&self) -> Option<Focus> {
        self.with_population(|population| population.focus().cloned())
    }

    /// Move the focus. Returns `false` if nothing lives at `focus`, or if an
    /// operation is in flight, since workers may be moving the focused
    /// machine.
    pub fn set_focus(&self, focus: Focus) -> bool {
        if !self.is_idle() {
            debug!("focus change refused while an operation is in flight");
            return false;
        }
        self.shared.population().set_focus(focus)
    }

    /// Clone of the focused machine.
    #[must_use]
    pub fn focused(&self) -> Option<Machine> {
        self.with_population(|population| population.focused().cloned())
    }

    /// Output vectors of every halted class, in sorted order.
    #[must_use]
    pub fn output(&self) -> Vec<Vec<String>> {
        self.with_population(|population| population.halted().keys().cloned().collect())
    }

    /// Whether some halted machine has a device output equal to `needle`.
    #[must_use]
    pub fn find_output(&self, needle: &str) -> bool {
        self.with_population(|population| {
            population
                .halted()
                .keys()
                .any(|output| output.iter().any(|device| device == needle))
        })
    }

    /// Some halted machine with exactly this output vector.
    #[must_use]
    pub fn witness(&self, output: &[String]) -> Option<Machine> {
        self.with_population(|population| {
            population
                .halted()
                .get(output)
                .and_then(|machines| machines.first().cloned())
        })
    }

    /// Counts per bucket and output class.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let steps = self.steps();
        self.with_population(|population| Summary {
            deterministic: self.shared.program.is_deterministic(),
            steps,
            invalid: population.invalid().len(),
            running: population.running().len(),
            blocked: population.blocked().len(),
            halted: population.halted_len(),
            classes: population
                .halted()
                .iter()
                .map(|(output, machines)| OutputClass {
                    output: output.clone(),
                    machines: machines.len(),
                })
                .collect(),
        })
    }
}

impl Drop for Explorer {
    fn drop(&mut self) {
        self.pause();
        if let Err(err) = self.wait() {
            warn!(error = %err, "in-flight operation failed during drop");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
