//! Shared fixtures for device conflict tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use lockstep_devices::kinds::{Control, Counter, Input, Ram, Tape, UnsignedCounter};
use lockstep_devices::{Alphabet, Device, Initialiser, Numeral, Operation, Terminator};
use proptest::test_runner::{Config, RngAlgorithm, TestRng, TestRunner};

/// Deterministic seed for reproducibility.
pub const SEED: [u8; 32] = [
    0x4C, 0x6F, 0x63, 0x6B, 0x73, 0x74, 0x65, 0x70, // "Lockstep"
    0x44, 0x65, 0x76, 0x69, 0x63, 0x65, 0x43, 0x6F, // "DeviceCo"
    0x6E, 0x66, 0x6C, 0x69, 0x63, 0x74, 0x53, 0x75, // "nflictSu"
    0x69, 0x74, 0x65, 0x56, 0x31, 0x2D, 0x30, 0x31, // "iteV1-01"
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

pub fn input(chars: &str, terminator: Terminator) -> Device {
    Device::Input(Input::new(alphabet(chars), terminator).unwrap())
}

pub fn stack(chars: &str) -> Device {
    Device::stack(alphabet(chars), Initialiser::Input, Terminator::Empty).unwrap()
}

pub fn queue(chars: &str) -> Device {
    Device::queue(alphabet(chars), Initialiser::Input, Terminator::Empty).unwrap()
}

pub fn counter() -> Device {
    Device::Counter(Counter::new(Numeral::decimal(), Initialiser::Input, Terminator::Zero).unwrap())
}

pub fn unsigned_counter() -> Device {
    Device::UnsignedCounter(
        UnsignedCounter::new(Numeral::decimal(), Initialiser::Input, Terminator::Zero).unwrap(),
    )
}

pub fn tape(chars: &str) -> Device {
    Device::Tape(Tape::new(alphabet(chars), 0, Initialiser::Input, Terminator::Home).unwrap())
}

pub fn ram(registers: usize) -> Device {
    Device::Ram(
        Ram::new(
            registers,
            Numeral::decimal(),
            Initialiser::Input,
            Terminator::Home,
        )
        .unwrap(),
    )
}

pub fn parse_all(device: &Device, texts: &[&str]) -> Vec<Operation> {
    texts
        .iter()
        .map(|text| Operation::parse(text, device).unwrap())
        .collect()
}

/// Every state reachable from `inputs` in at most `depth` applications of
/// `ops`, deduplicated.
pub fn reachable(prototype: &Device, inputs: &[&str], ops: &[Operation], depth: usize) -> Vec<Device> {
    let mut seen = HashSet::new();
    let mut states = Vec::new();
    let mut frontier = Vec::new();
    for input in inputs {
        let mut device = prototype.clone();
        device.initialise(input).unwrap();
        if seen.insert(format!("{device:?}")) {
            frontier.push(device.clone());
            states.push(device);
        }
    }
    for _ in 0..depth {
        let mut next = Vec::new();
        for state in &frontier {
            for op in ops.iter().filter(|op| op.applicable(state)) {
                let mut successor = state.clone();
                op.apply(&mut successor);
                if seen.insert(format!("{successor:?}")) {
                    next.push(successor.clone());
                    states.push(successor);
                }
            }
        }
        frontier = next;
    }
    states
}

/// Check the conflict predicates against the witness states.
///
/// Soundness always: a witness of joint applicability implies a conflict.
/// With `exact`, the converse too: every claimed conflict has a witness.
pub fn assert_conflicts(prototype: &Device, states: &[Device], ops: &[Operation], exact: bool) {
    let terminator = prototype.terminator();
    for a in ops {
        let halting = states
            .iter()
            .any(|s| a.applicable(s) && s.terminating());
        let claimed = a.intersects_terminator(&terminator);
        if halting {
            assert!(claimed, "{a:?} misses terminator {terminator}");
        }
        if exact {
            assert_eq!(claimed, halting, "{a:?} vs terminator {terminator}");
        }
        for b in ops {
            let joint = states
                .iter()
                .any(|s| a.applicable(s) && b.applicable(s));
            let claimed = a.intersects(b);
            assert_eq!(claimed, b.intersects(a), "{a:?} / {b:?} not symmetric");
            if joint {
                assert!(claimed, "{a:?} / {b:?} jointly applicable but disjoint");
            }
            if exact {
                assert_eq!(claimed, joint, "{a:?} / {b:?}");
            }
        }
    }
}
