//! Time-travel debugger over a [`Machine`]
//!
//! The debugger executes the machine one instruction at a time and records a
//! [`Snapshot`] after every step. Stepping backward restores an earlier
//! snapshot; stepping forward replays recorded snapshots until the end of
//! history is reached, then executes live.
//!
//! SYS input is served from a [`BufferedConsole`]. When the queue is empty
//! the step reports [`VmError::InputRequired`] and the caller supplies a
//! value with [`Debugger::provide_input`] before trying again.

use crate::console::BufferedConsole;
use crate::interpreter::engine::{ExecState, HaltReason, Machine};
use crate::interpreter::errors::VmError;
use crate::interpreter::trace::TraceRow;
use crate::parser::program::Word;
use crate::snapshot::{MockTerminal, Snapshot, SnapshotManager};

pub struct Debugger {
    machine: Machine,
    console: BufferedConsole,
    snapshot_manager: SnapshotManager,
    /// Index of the snapshot currently shown
    history_position: usize,
    /// Fault that ended live execution, if any
    fault: Option<VmError>,
}

impl Debugger {
    /// Wrap a freshly loaded machine and record its initial state
    pub fn new(machine: Machine, snapshot_memory_limit: usize) -> Result<Self, VmError> {
        let mut debugger = Debugger {
            machine,
            console: BufferedConsole::new(),
            snapshot_manager: SnapshotManager::new(snapshot_memory_limit),
            history_position: 0,
            fault: None,
        };
        debugger.take_snapshot(None)?;
        Ok(debugger)
    }

    fn take_snapshot(&mut self, trace: Option<TraceRow>) -> Result<(), VmError> {
        self.snapshot_manager.push(Snapshot {
            machine: self.machine.checkpoint(),
            terminal: self.console.terminal().clone(),
            trace,
        })
    }

    fn restore_snapshot(&mut self, index: usize) -> Result<(), VmError> {
        let snapshot =
            self.snapshot_manager
                .get(index)
                .ok_or_else(|| VmError::HistoryOperationFailed {
                    message: format!("No snapshot at step {}", index),
                })?;
        self.machine.restore(&snapshot.machine);
        self.console.set_terminal(snapshot.terminal.clone());
        self.history_position = index;
        Ok(())
    }

    /// Move one step forward, executing a new instruction at the end of history
    pub fn step_forward(&mut self) -> Result<(), VmError> {
        if self.history_position + 1 < self.snapshot_manager.len() {
            return self.restore_snapshot(self.history_position + 1);
        }

        if let Some(fault) = &self.fault {
            return Err(VmError::HistoryOperationFailed {
                message: format!("Execution stopped: {}", fault),
            });
        }
        if self.machine.is_halted() {
            return Err(VmError::HistoryOperationFailed {
                message: "Program has halted".to_string(),
            });
        }

        match self.machine.step(&mut self.console) {
            Ok(outcome) => {
                if let ExecState::Halted(reason @ HaltReason::InvalidInstruction(_)) = outcome.state
                {
                    self.console.terminal_mut().report(reason.to_string());
                }
                if let Err(e) = self.take_snapshot(Some(outcome.trace)) {
                    // Keep the machine in sync with the last recorded snapshot
                    self.restore_snapshot(self.history_position)?;
                    self.fault = Some(e.clone());
                    return Err(e);
                }
                self.history_position += 1;
                Ok(())
            }
            Err(VmError::InputRequired) => Err(VmError::InputRequired),
            Err(e) => {
                self.console
                    .terminal_mut()
                    .report(format!("Fault: {}", e));
                self.fault = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Move one step back in history
    pub fn step_backward(&mut self) -> Result<(), VmError> {
        if self.history_position == 0 {
            return Err(VmError::HistoryOperationFailed {
                message: "Already at the beginning".to_string(),
            });
        }
        self.restore_snapshot(self.history_position - 1)
    }

    /// Jump back to the state before the first instruction
    pub fn rewind_to_start(&mut self) -> Result<(), VmError> {
        self.restore_snapshot(0)
    }

    /// Step forward until the program halts, faults or needs input.
    /// Returns the number of steps taken.
    pub fn run_to_end(&mut self) -> Result<usize, VmError> {
        let mut steps = 0;
        while !self.is_finished() {
            self.step_forward()?;
            steps += 1;
        }
        Ok(steps)
    }

    /// Queue a value for the next SYS input
    pub fn provide_input(&mut self, value: Word) {
        self.console.push_input(value);
    }

    /// At the end of history and unable to go further
    pub fn is_finished(&self) -> bool {
        self.is_at_end() && (self.machine.is_halted() || self.fault.is_some())
    }

    pub fn is_at_end(&self) -> bool {
        self.history_position + 1 >= self.snapshot_manager.len()
    }

    /// The next live step is a SYS input with nothing queued
    pub fn needs_input(&self) -> bool {
        self.is_at_end()
            && self.fault.is_none()
            && !self.machine.is_halted()
            && self.console.pending_inputs() == 0
            && self.machine.awaits_input()
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn terminal(&self) -> &MockTerminal {
        self.console.terminal()
    }

    /// Trace row of the instruction that produced the current state
    pub fn current_trace(&self) -> Option<&TraceRow> {
        self.snapshot_manager
            .get(self.history_position)
            .and_then(|snapshot| snapshot.trace.as_ref())
    }

    pub fn halt_reason(&self) -> Option<HaltReason> {
        match self.machine.state() {
            ExecState::Halted(reason) => Some(reason),
            ExecState::Running => None,
        }
    }

    pub fn fault(&self) -> Option<&VmError> {
        self.fault.as_ref()
    }

    pub fn history_position(&self) -> usize {
        self.history_position
    }

    pub fn total_snapshots(&self) -> usize {
        self.snapshot_manager.len()
    }

    pub fn snapshot_memory(&self) -> (usize, usize) {
        (
            self.snapshot_manager.memory_usage(),
            self.snapshot_manager.memory_limit(),
        )
    }
}
