//! Shared fixtures for program, machine and explorer tests.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use lockstep_devices::kinds::Control;
use lockstep_devices::{Alphabet, Device, Initialiser, Operation, OperationPool, Terminator};
use lockstep_vm::loader::load_program;
use lockstep_vm::population::branch;
use lockstep_vm::{Explorer, ExplorerConfig, Machine, MachineState, Program};
use proptest::test_runner::{Config, RngAlgorithm, TestRng, TestRunner};

/// Deterministic seed for reproducibility.
pub const SEED: [u8; 32] = [
    0x4C, 0x6F, 0x63, 0x6B, 0x73, 0x74, 0x65, 0x70, // "Lockstep"
    0x56, 0x6D, 0x45, 0x78, 0x70, 0x6C, 0x6F, 0x72, // "VmExplor"
    0x65, 0x72, 0x53, 0x75, 0x69, 0x74, 0x65, 0x56, // "erSuiteV"
    0x31, 0x2D, 0x52, 0x75, 0x73, 0x74, 0x30, 0x31, // "1-Rust01"
];

/// Fixed-seed proptest runner.
pub fn make_runner(cases: u32) -> TestRunner {
    TestRunner::new_with_rng(
        Config {
            cases,
            ..Config::default()
        },
        TestRng::from_seed(RngAlgorithm::ChaCha, &SEED),
    )
}

// ============================================================================
// Programs
// ============================================================================

pub fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

pub fn load(name: &str) -> Arc<Program> {
    Arc::new(load_program(&demo(name)).unwrap())
}

pub fn alphabet(chars: &str) -> Arc<Alphabet> {
    Arc::new(Alphabet::try_from(chars).unwrap())
}

pub fn control(accepting: &[usize]) -> Device {
    let labels: BTreeMap<usize, String> = accepting
        .iter()
        .map(|state| (*state, format!("q{state}")))
        .collect();
    Device::Control(Control::new(0, labels))
}

pub fn stack(chars: &str, initialiser: Initialiser, terminator: Terminator) -> Device {
    Device::stack(alphabet(chars), initialiser, terminator).unwrap()
}

/// Parse row-major operation texts against `devices` and intern them.
pub fn table(devices: &[Device], rows: &[Vec<String>]) -> Vec<lockstep_devices::OpRef> {
    let mut pool = OperationPool::new();
    rows.iter()
        .flat_map(|row| row.iter().zip(devices))
        .map(|(text, device)| pool.intern(Operation::parse(text, device).unwrap()))
        .collect()
}

pub fn compile(devices: Vec<Device>, rows: &[&[&str]]) -> Arc<Program> {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
    let ops = table(&devices, &rows);
    Arc::new(Program::compile(devices, ops).unwrap())
}

/// One stack whose two pushes are always applicable together, and whose
/// `Always` terminator competes with both.
pub fn ambiguous_stack() -> Arc<Program> {
    compile(
        vec![stack("ab", Initialiser::Blank, Terminator::Always)],
        &[&["push a"], &["push b"], &["pop a"]],
    )
}

/// A control unit looping on state 0 forever.
pub fn spinner() -> Arc<Program> {
    compile(vec![control(&[])], &[&["0 to 0"]])
}

/// A control unit that either loops on state 0 or moves to the accepting
/// state 1.
pub fn looping_exit() -> Arc<Program> {
    compile(vec![control(&[1])], &[&["0 to 0"], &["0 to 1"]])
}

// ============================================================================
// Machines
// ============================================================================

pub fn machine(program: &Arc<Program>, input: &str) -> Machine {
    let mut machine = Machine::new(Arc::clone(program));
    machine.initialise(input).unwrap();
    machine
}

pub fn run(program: &Arc<Program>, input: &str) -> Machine {
    let mut machine = machine(program, input);
    machine.run();
    machine
}

pub fn control_state(machine: &Machine) -> usize {
    match &machine.devices()[0] {
        Device::Control(control) => control.state(),
        other => panic!("slot 0 holds {other}"),
    }
}

/// Every configuration reachable from `start` in at most `depth` branch
/// steps, `start` included.
pub fn explore(start: Machine, depth: usize) -> Vec<Machine> {
    let mut seen = vec![start.clone()];
    let mut frontier = vec![start];
    for _ in 0..depth {
        let mut next = Vec::new();
        for mut machine in frontier {
            if machine.state() != MachineState::Running {
                continue;
            }
            let (clones, _) = branch(&mut machine);
            next.push(machine);
            next.extend(clones);
        }
        seen.extend(next.iter().cloned());
        frontier = next;
    }
    seen
}

// ============================================================================
// Explorers
// ============================================================================

pub fn explorer(program: Arc<Program>, workers: usize) -> Explorer {
    Explorer::new(program, ExplorerConfig::default().with_workers(workers))
}

/// Bucket name and rendered devices of every machine, sorted.
pub fn membership(explorer: &Explorer) -> Vec<(String, String)> {
    let render = |bucket: &str, machine: &Machine| {
        let devices: Vec<String> = machine.devices().iter().map(ToString::to_string).collect();
        (
            bucket.to_string(),
            format!("{} {:?}", devices.join(" | "), machine.history()),
        )
    };
    let mut rows = explorer.with_population(|population| {
        let mut rows = Vec::new();
        rows.extend(population.invalid().iter().map(|m| render("invalid", m)));
        rows.extend(population.running().iter().map(|m| render("running", m)));
        rows.extend(population.blocked().iter().map(|m| render("blocked", m)));
        for (output, machines) in population.halted() {
            let bucket = format!("halted {output:?}");
            rows.extend(machines.iter().map(|m| render(&bucket, m)));
        }
        rows
    });
    rows.sort();
    rows
}
