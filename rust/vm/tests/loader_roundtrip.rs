//! Program descriptions, configuration files and the operation text form.

#[allow(dead_code, unreachable_pub)]
mod helpers;

use assert_matches::assert_matches;
use lockstep_devices::kinds::{Counter, Input, Output, Ram, Tape, UnsignedCounter};
use lockstep_devices::{Device, Initialiser, Numeral, Operation, Terminator};
use lockstep_vm::loader::{load_program, print_rows};
use lockstep_vm::{ExplorerConfig, LoadError};

use helpers::{alphabet, control, demo, stack};

fn assert_round_trip(device: &Device, texts: &[&str]) {
    for text in texts {
        let op = Operation::parse(text, device).unwrap();
        let printed = op.display(device).to_string();
        let reparsed = Operation::parse(&printed, device)
            .unwrap_or_else(|err| panic!("`{printed}` (from `{text}`) does not parse: {err}"));
        assert_eq!(op, reparsed, "`{text}` printed as `{printed}`");
    }
}

#[test]
fn test_demo_rows_reparse() {
    for name in ["even_a.toml", "palindrome.toml", "flip.json"] {
        let program = load_program(&demo(name)).unwrap();
        let printed = print_rows(&program);
        assert_eq!(printed.len(), program.rows());
        for sorted in 0..program.rows() {
            let declared = program.source_row(sorted).unwrap();
            for (slot, device) in program.devices().iter().enumerate() {
                let op = Operation::parse(&printed[declared][slot], device).unwrap();
                assert_eq!(&op, program.row(sorted)[slot].as_ref(), "{name}");
            }
        }
    }
}

#[test]
fn test_operation_text_round_trips() {
    assert_round_trip(&control(&[1]), &["0 to 1", "12 to 0"]);

    let input = Device::Input(Input::new(alphabet("ab"), Terminator::Consumed).unwrap());
    assert_round_trip(&input, &["noop", "scan a", "peek b", "skip", "end"]);

    let output = Device::Output(Output::new(alphabet("xy")));
    assert_round_trip(&output, &["noop", "print y"]);

    let stack = stack("ab", Initialiser::Blank, Terminator::Empty);
    assert_round_trip(&stack, &["noop", "push a", "pop b", "top a", "empty"]);

    let queue = Device::queue(alphabet("ab"), Initialiser::Input, Terminator::Always).unwrap();
    assert_round_trip(&queue, &["noop", "enqueue a", "dequeue b", "front a", "empty"]);

    let counter = Device::Counter(
        Counter::new(Numeral::decimal(), Initialiser::Input, Terminator::Zero).unwrap(),
    );
    assert_round_trip(
        &counter,
        &["noop", "inc", "dec", "zero", "positive", "negative"],
    );

    let unsigned = Device::UnsignedCounter(
        UnsignedCounter::new(Numeral::decimal(), Initialiser::Blank, Terminator::Always).unwrap(),
    );
    assert_round_trip(&unsigned, &["noop", "inc", "dec", "zero", "positive"]);

    let tape = Device::Tape(
        Tape::new(alphabet("_ab"), 0, Initialiser::Input, Terminator::Home).unwrap(),
    );
    assert_round_trip(
        &tape,
        &[
            "noop",
            "stay",
            "left",
            "home right",
            "right print a look b",
            "look _ print b left",
        ],
    );

    let ram = Device::Ram(
        Ram::new(4, Numeral::decimal(), Initialiser::Input, Terminator::Home).unwrap(),
    );
    assert_round_trip(
        &ram,
        &[
            "noop",
            "set r0 -17",
            "set r3 123456789012345678901234567890",
            "add r0 r1 r2",
            "shr r3 r3 r0",
            "test r1 negative",
            "load r0 r1",
            "store r2 r3",
            "stay",
            "home look zero write r1 right",
            "left",
        ],
    );
}

#[test]
fn test_rejects_operations_for_other_devices() {
    let ram = Device::Ram(
        Ram::new(2, Numeral::decimal(), Initialiser::Blank, Terminator::Always).unwrap(),
    );
    assert!(Operation::parse("set r2 1", &ram).is_err());
    assert!(Operation::parse("push a", &control(&[])).is_err());
    let stack = stack("ab", Initialiser::Blank, Terminator::Always);
    assert!(Operation::parse("look a", &stack).is_err());
    assert!(Operation::parse("push c", &stack).is_err());
}

#[test]
fn test_loads_json_and_toml() {
    let json = load_program(&demo("flip.json")).unwrap();
    assert_eq!(json.width(), 2);
    assert_eq!(json.rows(), 6);
    assert_eq!(json.states(), 4);

    let toml = load_program(&demo("palindrome.toml")).unwrap();
    assert_eq!(toml.width(), 3);
    assert_eq!(toml.rows(), 5);
    assert_eq!(toml.search_table(), [0, 3, 5]);
}

#[test]
fn test_missing_file_is_io_error() {
    assert_matches!(
        load_program(&demo("missing.toml")),
        Err(LoadError::Io { .. })
    );
}

#[test]
fn test_explorer_config_file() {
    let config = ExplorerConfig::from_file(&demo("explorer.toml")).unwrap();
    assert_eq!(config.workers, 4);
    assert!(!config.stop_on_halt);
    assert_eq!(config.round_budget, 1024);
    assert_eq!(config.step_limit, Some(1_000_000));
}
