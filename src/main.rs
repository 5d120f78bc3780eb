// pm0vm: PM/0 stack machine with execution tracing and a time-travel TUI

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use pm0vm::console::LineConsole;
use pm0vm::interpreter::config::VmConfig;
use pm0vm::interpreter::constants::DEFAULT_SNAPSHOT_LIMIT;
use pm0vm::interpreter::debugger::Debugger;
use pm0vm::interpreter::engine::{ExecState, HaltReason, Machine};
use pm0vm::interpreter::trace;
use pm0vm::parser::read_program;
use pm0vm::ui::App;

const EXIT_LOAD_FAILURE: u8 = 1;
const EXIT_RUNTIME_FAILURE: u8 = 2;

/// Command-line options
struct Options {
    program: PathBuf,
    tui: bool,
    /// Treat an unknown instruction as a failure
    strict: bool,
    /// Suppress trace rows, keeping program output
    quiet: bool,
}

fn usage(program_name: &str) {
    eprintln!("Usage: {} <program.txt> [--tui] [--strict] [--quiet]", program_name);
    eprintln!();
    eprintln!("  --tui     Step through execution interactively");
    eprintln!("  --strict  Exit with status 2 when an unknown instruction halts the machine");
    eprintln!("  --quiet   Print program output without the execution trace");
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut program = None;
    let mut tui = false;
    let mut strict = false;
    let mut quiet = false;

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--tui" => tui = true,
            "--strict" => strict = true,
            "--quiet" => quiet = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown option '{}'", flag)),
            path if program.is_none() => program = Some(PathBuf::from(path)),
            extra => return Err(format!("Unexpected argument '{}'", extra)),
        }
    }

    let program = program.ok_or_else(|| "No input file provided".to_string())?;
    Ok(Options {
        program,
        tui,
        strict,
        quiet,
    })
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("pm0vm");

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!();
            usage(program_name);
            return ExitCode::from(EXIT_LOAD_FAILURE);
        }
    };

    eprintln!("Parsing {}...", options.program.display());
    let program = match read_program(&options.program) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_LOAD_FAILURE);
        }
    };

    let machine = match Machine::load(&program, &VmConfig::default()) {
        Ok(machine) => machine,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_LOAD_FAILURE);
        }
    };

    eprintln!("Loaded {} instructions", program.len());

    if options.tui {
        match run_tui(machine) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_RUNTIME_FAILURE)
            }
        }
    } else {
        run_console(machine, &options)
    }
}

/// Execute to completion, streaming the trace to stdout
fn run_console(mut machine: Machine, options: &Options) -> ExitCode {
    if !options.quiet {
        println!("{}", trace::header());
        println!("{}", trace::initial_values(&machine.registers()));
        println!();
    }

    let quiet = options.quiet;
    let mut console = LineConsole::stdio();
    let result = machine.run(&mut console, |outcome| {
        if let ExecState::Halted(reason @ HaltReason::InvalidInstruction(_)) = outcome.state {
            println!("{}", reason);
        }
        if !quiet {
            println!("{}", outcome.trace);
        }
    });

    eprintln!("Execution stopped after {} steps", machine.steps());
    match result {
        Ok(HaltReason::Halt) => ExitCode::SUCCESS,
        Ok(HaltReason::InvalidInstruction(_)) if options.strict => {
            ExitCode::from(EXIT_RUNTIME_FAILURE)
        }
        Ok(HaltReason::InvalidInstruction(_)) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            ExitCode::from(EXIT_RUNTIME_FAILURE)
        }
    }
}

fn run_tui(machine: Machine) -> Result<(), Box<dyn std::error::Error>> {
    let debugger = Debugger::new(machine, DEFAULT_SNAPSHOT_LIMIT)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(debugger);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}
