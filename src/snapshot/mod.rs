// Snapshot management for reverse execution

use crate::interpreter::engine::MachineState;
use crate::interpreter::errors::VmError;
use crate::interpreter::trace::TraceRow;
use crate::parser::program::Word;

/// Mock terminal for capturing program output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockTerminal {
    pub lines: Vec<TerminalLine>,
}

impl MockTerminal {
    pub fn new() -> Self {
        MockTerminal { lines: Vec::new() }
    }

    /// Record a value written by SYS output
    pub fn print_value(&mut self, value: Word) {
        self.lines.push(TerminalLine {
            text: format!("Output result is: {}", value),
            kind: LineKind::Output(value),
        });
    }

    /// Record a value consumed by SYS input
    pub fn echo_input(&mut self, value: Word) {
        self.lines.push(TerminalLine {
            text: format!("Please Enter an Integer: {}", value),
            kind: LineKind::Input(value),
        });
    }

    /// Record a diagnostic (halt reason, fault)
    pub fn report(&mut self, text: String) {
        self.lines.push(TerminalLine {
            text,
            kind: LineKind::Diagnostic,
        });
    }

    /// Get all lines as a vector of strings
    pub fn get_output(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.text.clone()).collect()
    }

    /// Values written by SYS output, in order
    pub fn values(&self) -> Vec<Word> {
        self.lines
            .iter()
            .filter_map(|line| match line.kind {
                LineKind::Output(value) => Some(value),
                _ => None,
            })
            .collect()
    }
}

/// What produced a terminal line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Output(Word),
    Input(Word),
    Diagnostic,
}

/// A line of terminal output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLine {
    pub text: String,
    pub kind: LineKind,
}

/// Snapshot of execution state after one step
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub machine: MachineState,
    pub terminal: MockTerminal,
    /// Row of the instruction that produced this state; `None` before the first step
    pub trace: Option<TraceRow>,
}

impl Snapshot {
    /// Estimate the memory usage of this snapshot in bytes
    pub fn estimated_size(&self) -> usize {
        let word = std::mem::size_of::<Word>();

        // Data region copy plus frame tracker entries
        let machine_size = self.machine.data.len() * word + self.machine.frames.depth() * 8;

        // Terminal: assume 32 bytes per line on average
        let terminal_size = self.terminal.lines.len() * 32;

        // Trace row: roughly 24 bytes per stack cell
        let trace_size = self.trace.as_ref().map_or(0, |row| row.stack.len() * 24);

        std::mem::size_of::<Snapshot>() + machine_size + terminal_size + trace_size
    }
}

/// Manages execution history for reverse execution
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: Vec<Snapshot>,
    max_memory: usize,
    current_memory: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
        }
    }

    /// Add a snapshot to history
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), VmError> {
        let snapshot_size = snapshot.estimated_size();

        if self.current_memory + snapshot_size > self.max_memory {
            return Err(VmError::SnapshotLimitExceeded {
                current: self.current_memory + snapshot_size,
                limit: self.max_memory,
            });
        }

        self.current_memory += snapshot_size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    /// Get a snapshot by index
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    /// Get the number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Get current memory usage
    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    /// Get max memory limit
    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}
