// Trace formatting and time-travel debugging over complete programs

use pm0vm::console::BufferedConsole;
use pm0vm::interpreter::config::VmConfig;
use pm0vm::interpreter::debugger::Debugger;
use pm0vm::interpreter::engine::{HaltReason, Machine};
use pm0vm::interpreter::errors::VmError;
use pm0vm::interpreter::trace;
use pm0vm::memory::Addr;
use pm0vm::parser::read_program;
use std::path::Path;

fn load_demo(name: &str) -> Machine {
    let path = Path::new("demos").join(name);
    let program = read_program(&path).expect("Failed to read demo program");
    Machine::load(&program, &VmConfig::default()).expect("Loading failed")
}

#[test]
fn test_trace_text_layout() {
    let mut machine = load_demo("add.txt");
    let mut console = BufferedConsole::new();
    let mut lines = vec![
        trace::header().to_string(),
        trace::initial_values(&machine.registers()),
    ];

    machine
        .run(&mut console, |outcome| lines.push(outcome.trace.to_string()))
        .expect("Execution failed");

    assert_eq!(lines[0], "\t\t\t\tPC\tBP\tSP\tstack");
    assert_eq!(lines[1], "Initial values:\t\t\t10\t499\t500");
    assert_eq!(lines[2], "\tLIT\t0\t5\t13\t499\t499\t5 ");
    assert_eq!(lines[3], "\tLIT\t0\t3\t16\t499\t498\t5 3 ");
    assert_eq!(lines[4], "\tADD\t0\t1\t19\t499\t499\t8 ");
    assert_eq!(lines[5], "\tSYS\t0\t1\t22\t499\t500\t");
    assert_eq!(lines.len(), 7);
}

#[test]
fn test_trace_marks_activation_records() {
    let mut machine = load_demo("double.txt");
    let mut console = BufferedConsole::with_inputs([21]);
    let mut rows = Vec::new();

    let result = machine.run(&mut console, |outcome| rows.push(outcome.trace.clone()));
    assert_eq!(result, Ok(HaltReason::Halt));

    // After the callee's INC the new record is visible below the caller's locals
    // Rows: JMP, INC, SYS, STO, CAL, then the callee's INC
    assert_eq!(rows[5].mnemonic, "INC");
    assert_eq!(
        rows[5].to_string(),
        "\tINC\t0\t3\t16\t495\t493\t0 0 0 21 | 499 499 43 "
    );
    // The boundary disappears with the record
    let after_return = rows
        .iter()
        .find(|row| row.mnemonic == "RTN")
        .expect("procedure returns");
    assert!(!after_return.to_string().contains('|'));
    assert_eq!(after_return.stack_values(), vec![0, 0, 0, 42]);
}

#[test]
fn test_debugger_time_travel() {
    let machine = load_demo("double.txt");
    let mut debugger = Debugger::new(machine, 16 * 1024 * 1024).expect("initial snapshot");

    // First SYS input pauses until a value is supplied
    debugger.step_forward().expect("JMP");
    debugger.step_forward().expect("INC");
    assert!(debugger.needs_input());
    assert_eq!(debugger.step_forward(), Err(VmError::InputRequired));
    debugger.provide_input(21);

    for _ in 0..3 {
        debugger.step_forward().expect("step");
    }
    assert_eq!(debugger.current_trace().map(|row| row.mnemonic), Some("CAL"));
    assert_eq!(debugger.history_position(), 5);
    assert_eq!(debugger.machine().frames().depth(), 1);
    assert_eq!(debugger.machine().registers().bp, Addr::new(495));

    debugger.step_backward().expect("back over CAL");
    assert_eq!(debugger.machine().frames().depth(), 0);
    assert_eq!(debugger.machine().registers().bp, Addr::new(499));

    assert_eq!(debugger.run_to_end(), Ok(10));
    assert!(debugger.is_finished());
    assert_eq!(debugger.terminal().values(), vec![42]);

    // Replaying history does not ask for input again
    debugger.rewind_to_start().expect("rewind");
    assert!(debugger.terminal().lines.is_empty());
    assert_eq!(debugger.run_to_end(), Ok(14));
    assert_eq!(debugger.terminal().values(), vec![42]);
    assert_eq!(debugger.total_snapshots(), 15);
}
