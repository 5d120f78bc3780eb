//! Console collaborators for SYS input and output
//!
//! The engine talks to the outside world only through the [`Console`] trait:
//! - [`LineConsole`]: prompts on a writer and reads whole lines from a reader
//!   (stdin/stdout in the binary)
//! - [`BufferedConsole`]: queued input values and a captured [`MockTerminal`],
//!   used by tests and the TUI
//!
//! A console must not touch machine state. When it cannot supply a value yet
//! it returns [`VmError::InputRequired`] and the engine leaves the step undone.

use crate::interpreter::errors::VmError;
use crate::parser::program::Word;
use crate::snapshot::MockTerminal;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Source of SYS input values and sink for SYS output values
pub trait Console {
    /// Obtain one integer for SYS input
    fn read_int(&mut self) -> Result<Word, VmError>;

    /// Report a value written by SYS output
    fn write_int(&mut self, value: Word);
}

/// Line-oriented console over any reader/writer pair
pub struct LineConsole<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LineConsole<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        LineConsole { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl LineConsole<io::StdinLock<'static>, io::Stdout> {
    /// Console bound to the process's stdin and stdout
    pub fn stdio() -> Self {
        LineConsole::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console for LineConsole<R, W> {
    fn read_int(&mut self) -> Result<Word, VmError> {
        let io_error = |e: io::Error| VmError::InputUnavailable {
            message: e.to_string(),
        };

        write!(self.writer, "Please Enter an Integer: ").map_err(io_error)?;
        self.writer.flush().map_err(io_error)?;

        let mut line = String::new();
        let read = self.reader.read_line(&mut line).map_err(io_error)?;
        if read == 0 {
            return Err(VmError::InputUnavailable {
                message: "end of input".to_string(),
            });
        }

        let trimmed = line.trim();
        trimmed
            .parse::<Word>()
            .map_err(|_| VmError::InputUnavailable {
                message: format!("'{}' is not an integer", trimmed),
            })
    }

    fn write_int(&mut self, value: Word) {
        // Output is best effort; a closed stdout must not abort execution
        let _ = writeln!(self.writer, "Output result is: {}", value);
    }
}

/// Console with pre-queued input and captured output
#[derive(Debug, Clone, Default)]
pub struct BufferedConsole {
    pending: VecDeque<Word>,
    terminal: MockTerminal,
}

impl BufferedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Console that will answer SYS input with `inputs`, in order
    pub fn with_inputs(inputs: impl IntoIterator<Item = Word>) -> Self {
        BufferedConsole {
            pending: inputs.into_iter().collect(),
            terminal: MockTerminal::new(),
        }
    }

    /// Queue one more input value
    pub fn push_input(&mut self, value: Word) {
        self.pending.push_back(value);
    }

    pub fn pending_inputs(&self) -> usize {
        self.pending.len()
    }

    /// Values written by SYS output so far
    pub fn outputs(&self) -> Vec<Word> {
        self.terminal.values()
    }

    pub fn terminal(&self) -> &MockTerminal {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut MockTerminal {
        &mut self.terminal
    }

    /// Replace the captured output (used when rewinding history)
    pub fn set_terminal(&mut self, terminal: MockTerminal) {
        self.terminal = terminal;
    }
}

impl Console for BufferedConsole {
    fn read_int(&mut self) -> Result<Word, VmError> {
        let value = self.pending.pop_front().ok_or(VmError::InputRequired)?;
        self.terminal.echo_input(value);
        Ok(value)
    }

    fn write_int(&mut self, value: Word) {
        self.terminal.print_value(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_line_console_reads_and_writes() {
        let mut console = LineConsole::new(Cursor::new("  42\n-7\n"), Vec::new());

        assert_eq!(console.read_int(), Ok(42));
        assert_eq!(console.read_int(), Ok(-7));
        console.write_int(8);

        let written = String::from_utf8(console.into_writer()).unwrap();
        assert_eq!(
            written,
            "Please Enter an Integer: Please Enter an Integer: Output result is: 8\n"
        );
    }

    #[test]
    fn test_line_console_errors() {
        let mut console = LineConsole::new(Cursor::new("abc\n"), Vec::new());
        assert!(matches!(
            console.read_int(),
            Err(VmError::InputUnavailable { .. })
        ));
        assert!(matches!(
            console.read_int(),
            Err(VmError::InputUnavailable { message }) if message == "end of input"
        ));
    }

    #[test]
    fn test_buffered_console() {
        let mut console = BufferedConsole::with_inputs([3]);

        assert_eq!(console.read_int(), Ok(3));
        assert_eq!(console.read_int(), Err(VmError::InputRequired));
        console.write_int(9);
        console.push_input(1);

        assert_eq!(console.outputs(), vec![9]);
        assert_eq!(console.pending_inputs(), 1);
        assert_eq!(
            console.terminal().get_output(),
            vec!["Please Enter an Integer: 3", "Output result is: 9"]
        );
    }
}
