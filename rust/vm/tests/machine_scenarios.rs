//! End-to-end machine runs over small programs.

#[allow(dead_code, unreachable_pub)]
mod helpers;

use std::sync::Arc;

use assert_matches::assert_matches;
use lockstep_devices::{Device, Initialiser, Terminator};
use lockstep_vm::{Choice, MachineError, MachineState};

use helpers::{compile, control, control_state, load, machine, run, stack};

#[test]
fn test_even_a_scenarios() {
    let program = load("even_a.toml");
    assert!(program.is_deterministic());

    let even = run(&program, "aa");
    assert_eq!(even.state(), MachineState::Halted);
    assert_eq!(control_state(&even), 0);
    assert_eq!(even.output(), ["even", ""]);

    let odd = run(&program, "a");
    assert_eq!(odd.state(), MachineState::Halted);
    assert_eq!(control_state(&odd), 1);
    assert_eq!(odd.output(), ["odd", ""]);

    let mut empty = machine(&program, "");
    assert_eq!(empty.candidates(), [Choice::Terminate]);
    assert_eq!(empty.run(), 1);
    assert_eq!(empty.state(), MachineState::Halted);
    assert_eq!(control_state(&empty), 0);
    assert_eq!(empty.steps(), 0);
}

#[test]
fn test_halted_output_is_stable() {
    let program = load("even_a.toml");
    let mut machine = run(&program, "abab");
    let output = machine.output().to_vec();
    let steps = machine.steps();

    machine.terminate();
    assert_eq!(machine.run(), 0);
    assert!(!machine.next());
    assert_eq!(machine.output(), output.as_slice());
    assert_eq!(machine.steps(), steps);
}

#[test]
fn test_reinitialise_resets_run() {
    let program = load("even_a.toml");
    let mut machine = run(&program, "aaa");
    assert_eq!(machine.output(), ["odd", ""]);

    machine.initialise("bb").unwrap();
    assert_eq!(machine.state(), MachineState::Running);
    assert!(machine.output().is_empty());
    assert_eq!(machine.steps(), 0);
    machine.run();
    assert_eq!(machine.output(), ["even", ""]);
}

#[test]
fn test_rejected_input_leaves_machine_invalid() {
    let program = load("even_a.toml");
    let mut machine = lockstep_vm::Machine::new(Arc::clone(&program));
    assert_matches!(
        machine.initialise("abc"),
        Err(MachineError::Input { slot: 1, .. })
    );
    assert_eq!(machine.state(), MachineState::Invalid);
    assert_eq!(machine.run(), 0);
}

#[test]
fn test_trace_round_trips_across_word_boundaries() {
    // 37 rows need 6 trace bits, so entries straddle every 64-bit word.
    const STATES: usize = 37;
    let rows: Vec<String> = (0..STATES)
        .rev()
        .map(|from| format!("{from} to {}", from + 1))
        .collect();
    let rows: Vec<[&str; 1]> = rows.iter().map(|text| [text.as_str()]).collect();
    let rows: Vec<&[&str]> = rows.iter().map(|row| row.as_slice()).collect();
    let program = compile(vec![control(&[STATES])], &rows);
    assert_eq!(program.computation_bits(), 6);

    let machine = run(&program, "");
    assert_eq!(machine.state(), MachineState::Halted);
    assert_eq!(machine.steps(), STATES);
    assert_eq!(machine.history(), (0..STATES).collect::<Vec<_>>());

    let declared: Vec<usize> = machine
        .history()
        .into_iter()
        .filter_map(|row| program.source_row(row))
        .collect();
    assert_eq!(declared, (0..STATES).rev().collect::<Vec<_>>());
}

#[test]
fn test_pending_choice_stops_run() {
    let program = load("palindrome.toml");
    assert!(!program.is_deterministic());

    let mut machine = machine(&program, "abba");
    assert!(machine.needs_choice());
    assert_eq!(machine.candidates().len(), 2);
    assert_eq!(machine.run(), 0);

    // Always continue reading until the middle, then guess.
    machine.choose(machine.candidates()[0]).unwrap();
    assert!(machine.next());
    machine.choose(machine.candidates()[0]).unwrap();
    assert!(machine.next());
    let guess = machine.candidates()[1];
    machine.choose(guess).unwrap();
    machine.run();
    assert_eq!(machine.state(), MachineState::Halted);
    assert_eq!(machine.output(), ["palindrome", "", ""]);
}

#[test]
fn test_wrong_guess_blocks() {
    let program = load("palindrome.toml");
    let mut machine = machine(&program, "ab");
    let guess = machine.candidates()[1];
    machine.choose(guess).unwrap();
    assert!(machine.next());
    assert_eq!(machine.state(), MachineState::Blocked);
    assert!(machine.candidates().is_empty());
    assert_matches!(
        machine.choose(Choice::Terminate),
        Err(MachineError::NotACandidate { .. })
    );
}

#[test]
fn test_tape_flip() {
    let program = load("flip.json");
    assert!(program.is_deterministic());

    let machine = run(&program, "abba");
    assert_eq!(machine.state(), MachineState::Halted);
    assert_eq!(machine.output(), ["done", "baab"]);
    match &machine.devices()[1] {
        Device::Tape(tape) => assert_eq!(tape.head(), 0),
        other => panic!("unexpected device {other}"),
    }

    assert_eq!(run(&program, "").output(), ["done", ""]);
}

#[test]
fn test_stack_without_control_scans_whole_table() {
    let program = compile(
        vec![stack("ab", Initialiser::Input, Terminator::Empty)],
        &[&["pop a"], &["pop b"]],
    );
    assert!(program.is_deterministic());
    assert_eq!(program.window(7), 0..2);

    let machine = run(&program, "abba");
    assert_eq!(machine.state(), MachineState::Halted);
    assert_eq!(machine.steps(), 4);
    assert_eq!(machine.history(), vec![0, 1, 1, 0]);
}
