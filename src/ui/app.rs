//! Main TUI application state and logic

use crate::interpreter::debugger::Debugger;
use crate::interpreter::engine::HaltReason;
use crate::interpreter::errors::VmError;
use crate::memory::Addr;
use crate::parser::program::{RawInstruction, Word};
use crate::ui::panes::{
    render_code_pane, render_stack_pane, render_status_bar, render_terminal_pane,
    CodeRenderData, CodeScrollState, StackRenderData, StackScrollState, StatusRenderData,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

const PLAY_INTERVAL: Duration = Duration::from_millis(500);

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Code,
    Stack,
    Output,
}

impl FocusedPane {
    /// Move focus to the next pane (code -> output -> stack)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Code => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Stack,
            FocusedPane::Stack => FocusedPane::Code,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Code => FocusedPane::Stack,
            FocusedPane::Output => FocusedPane::Code,
            FocusedPane::Stack => FocusedPane::Output,
        }
    }
}

/// The main application state
pub struct App {
    pub debugger: Debugger,

    /// Listing of the loaded code, fixed for the whole session
    instructions: Vec<(Addr, RawInstruction)>,

    pub focused_pane: FocusedPane,

    code_scroll: CodeScrollState,
    stack_scroll: StackScrollState,
    terminal_scroll: usize,

    pub should_quit: bool,
    pub status_message: String,

    pub is_playing: bool,
    last_play_time: Instant,
    /// Last time space was pressed (for debouncing)
    last_space_press: Instant,

    /// Digits typed while the program waits on SYS input
    pub input_buffer: Option<String>,
}

impl App {
    pub fn new(debugger: Debugger) -> Self {
        let instructions = debugger.machine().memory().instructions().collect();
        let now = Instant::now();
        App {
            debugger,
            instructions,
            focused_pane: FocusedPane::Code,
            code_scroll: CodeScrollState::new(),
            stack_scroll: StackScrollState::new(),
            terminal_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_playing: false,
            last_play_time: now,
            last_space_press: now.checked_sub(Duration::from_secs(1)).unwrap_or(now),
            input_buffer: None,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= PLAY_INTERVAL {
                if !self.step_forward() {
                    self.is_playing = false;
                }
                self.last_play_time = Instant::now();
            }

            // Poll with a timeout so auto-play keeps ticking
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn is_error(&self) -> bool {
        self.debugger.is_at_end()
            && (self.debugger.fault().is_some()
                || matches!(
                    self.debugger.halt_reason(),
                    Some(HaltReason::InvalidInstruction(_))
                ))
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        // Left column: Code (top) | Output (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        let is_error = self.is_error();
        let machine = self.debugger.machine();
        let registers = machine.registers();
        let last_executed = self.debugger.current_trace().map(|row| row.at);

        // An undecodable instruction has already moved PC past itself
        let highlighted = match self.debugger.halt_reason() {
            Some(HaltReason::InvalidInstruction(_)) => last_executed.unwrap_or(registers.pc),
            _ => registers.pc,
        };

        render_code_pane(
            frame,
            left_rows[0],
            CodeRenderData {
                instructions: &self.instructions,
                pc: highlighted,
                last_executed,
                is_error,
                is_input: self.input_buffer.is_some(),
                is_focused: self.focused_pane == FocusedPane::Code,
            },
            &mut self.code_scroll,
        );

        render_terminal_pane(
            frame,
            left_rows[1],
            self.debugger.terminal(),
            self.input_buffer.as_deref(),
            self.focused_pane == FocusedPane::Output,
            &mut self.terminal_scroll,
        );

        render_stack_pane(
            frame,
            columns[1],
            StackRenderData {
                memory: machine.memory(),
                frames: machine.frames(),
                registers,
                is_focused: self.focused_pane == FocusedPane::Stack,
            },
            &mut self.stack_scroll,
        );

        let total_steps = self
            .debugger
            .is_finished()
            .then(|| self.debugger.total_snapshots().saturating_sub(1));

        render_status_bar(
            frame,
            main_chunks[1],
            StatusRenderData {
                message: &self.status_message,
                current_step: self.debugger.history_position(),
                total_steps,
                is_error,
                is_playing: self.is_playing,
                is_input: self.input_buffer.is_some(),
                snapshot_memory: self.debugger.snapshot_memory(),
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        if self.input_buffer.is_some() {
            self.handle_input_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c as usize - '0' as usize;
                let mut stepped = 0;
                while stepped < n && self.step_forward() {
                    stepped += 1;
                }
                if self.input_buffer.is_none() && !self.is_error() {
                    self.status_message = format!("Stepped forward {} step(s)", stepped);
                }
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.step_forward();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Code => {
                    // Scrolling up moves the PC line down visually
                    if let Some(row) = self.code_scroll.target_line_row {
                        self.code_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Stack => {
                    self.stack_scroll.offset = self.stack_scroll.offset.saturating_sub(1);
                }
                FocusedPane::Output => {
                    self.terminal_scroll = self.terminal_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Code => {
                    if let Some(row) = self.code_scroll.target_line_row {
                        self.code_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Stack => {
                    self.stack_scroll.offset = self.stack_scroll.offset.saturating_add(1);
                }
                FocusedPane::Output => {
                    self.terminal_scroll = self.terminal_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // 200ms debounce against key repeat
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(PLAY_INTERVAL)
                            .unwrap_or_else(Instant::now);
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.run_to_end();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                match self.debugger.rewind_to_start() {
                    Ok(()) => self.status_message = "Jumped to start".to_string(),
                    Err(e) => self.status_message = e.to_string(),
                }
                self.terminal_scroll = usize::MAX;
            }
            _ => {}
        }
    }

    /// Keys while collecting a value for SYS input
    fn handle_input_key(&mut self, key: KeyEvent) {
        let Some(buffer) = self.input_buffer.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Char(c @ '0'..='9') => buffer.push(c),
            KeyCode::Char('-') if buffer.is_empty() => buffer.push('-'),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Esc => {
                self.input_buffer = None;
                self.status_message = "Input cancelled".to_string();
            }
            KeyCode::Enter => match buffer.parse::<Word>() {
                Ok(value) => {
                    self.input_buffer = None;
                    self.debugger.provide_input(value);
                    self.step_forward();
                }
                Err(_) => {
                    self.status_message = format!("Not a valid integer: '{}'", buffer);
                }
            },
            _ => {}
        }
    }

    /// Step forward once, returning whether a step was taken
    fn step_forward(&mut self) -> bool {
        match self.debugger.step_forward() {
            Ok(()) => {
                self.terminal_scroll = usize::MAX;
                self.status_message = self.finished_message().unwrap_or_else(|| {
                    if self.is_playing {
                        "Playing...".to_string()
                    } else {
                        "Stepped forward".to_string()
                    }
                });
                true
            }
            Err(VmError::InputRequired) => {
                self.is_playing = false;
                self.input_buffer = Some(String::new());
                self.terminal_scroll = usize::MAX;
                self.status_message = "Waiting for input".to_string();
                false
            }
            Err(VmError::HistoryOperationFailed { message }) => {
                self.status_message = format!("Cannot step forward: {}", message);
                false
            }
            Err(e) => {
                self.terminal_scroll = usize::MAX;
                self.status_message = format!("Fault: {}", e);
                false
            }
        }
    }

    fn step_backward(&mut self) {
        match self.debugger.step_backward() {
            Ok(()) => {
                self.status_message = "Stepped backward".to_string();
                self.terminal_scroll = usize::MAX;
            }
            Err(VmError::HistoryOperationFailed { message }) => {
                self.status_message = format!("Cannot step backward: {}", message);
            }
            Err(e) => {
                self.status_message = e.to_string();
            }
        }
    }

    /// Step until the program halts, faults or asks for input
    fn run_to_end(&mut self) {
        let mut stepped = 0;
        while !self.debugger.is_finished() && self.step_forward() {
            stepped += 1;
        }
        if self.input_buffer.is_none() && !self.is_error() {
            self.status_message = self
                .finished_message()
                .unwrap_or_else(|| format!("Ran {} step(s)", stepped));
        }
    }

    fn finished_message(&self) -> Option<String> {
        if !self.debugger.is_finished() {
            return None;
        }
        if let Some(fault) = self.debugger.fault() {
            return Some(format!("Fault: {}", fault));
        }
        self.debugger.halt_reason().map(|reason| reason.to_string())
    }
}
