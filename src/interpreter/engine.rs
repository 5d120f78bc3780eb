// Execution engine for the PM/0 machine

use crate::console::Console;
use crate::interpreter::config::VmConfig;
use crate::interpreter::errors::{LoadError, VmError};
use crate::interpreter::isa::{BinaryOp, DecodeError, Instruction, Operation, SysCall};
use crate::interpreter::trace::TraceRow;
use crate::memory::frames::FrameTracker;
use crate::memory::{Addr, AddressSpace};
use crate::parser::program::{Program, Word, INSTRUCTION_WIDTH};
use std::fmt;

/// Machine registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Address of the next instruction
    pub pc: Addr,
    /// Base of the current activation record
    pub bp: Addr,
    /// Top-of-stack cell; the stack grows toward lower addresses
    pub sp: Addr,
}

/// Why the machine stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// SYS 0 3
    Halt,
    /// The fetched triple did not decode
    InvalidInstruction(DecodeError),
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::Halt => write!(f, "Program halted"),
            HaltReason::InvalidInstruction(err) => write!(f, "Error: {}", err),
        }
    }
}

/// Execution state returned by every step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    Running,
    Halted(HaltReason),
}

/// Result of one fetch/decode/execute cycle
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub state: ExecState,
    pub trace: TraceRow,
}

/// Everything needed to put a machine back to an earlier point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineState {
    pub registers: Registers,
    /// Cells above the program region
    pub data: Vec<Word>,
    pub frames: FrameTracker,
    pub state: ExecState,
    pub steps: usize,
}

/// The PM/0 machine: address space, registers and frame tracker
#[derive(Debug, Clone)]
pub struct Machine {
    memory: AddressSpace,
    registers: Registers,
    frames: FrameTracker,
    state: ExecState,
    /// Number of instructions executed so far; an undecodable one does not count
    steps: usize,
}

impl Machine {
    /// Load a program and set the registers to their initial values
    pub fn load(program: &Program, config: &VmConfig) -> Result<Self, LoadError> {
        let memory = AddressSpace::load(program, config)?;
        let bp = Addr::new(config.capacity - 1);

        Ok(Machine {
            memory,
            registers: Registers {
                pc: Addr::new(config.load_offset),
                bp,
                sp: Addr::new(config.capacity),
            },
            frames: FrameTracker::new(),
            state: ExecState::Running,
            steps: 0,
        })
    }

    pub fn registers(&self) -> Registers {
        self.registers
    }

    pub fn memory(&self) -> &AddressSpace {
        &self.memory
    }

    pub fn frames(&self) -> &FrameTracker {
        &self.frames
    }

    pub fn state(&self) -> ExecState {
        self.state
    }

    pub fn is_halted(&self) -> bool {
        matches!(self.state, ExecState::Halted(_))
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Value at the top of the stack
    pub fn top(&self) -> Result<Word, VmError> {
        self.memory.read(self.registers.sp)
    }

    /// Whether the next instruction is a SYS input request
    pub fn awaits_input(&self) -> bool {
        self.memory
            .fetch(self.registers.pc)
            .ok()
            .and_then(|raw| Instruction::decode(raw).ok())
            == Some(Instruction::Sys(SysCall::Read))
    }

    /// Find the base of the activation record `levels` static links up from `start`
    pub fn base(&self, start: Addr, levels: usize) -> Result<Addr, VmError> {
        let mut frame = start;
        for _ in 0..levels {
            let link = self.memory.read(frame)?;
            frame = self.memory.addr_from_word(link)?;
        }
        Ok(frame)
    }

    /// Execute one instruction
    ///
    /// On `Err` no register has changed. `InputRequired` can be retried once
    /// the console has a value; any other error ends the run.
    pub fn step<C: Console + ?Sized>(&mut self, console: &mut C) -> Result<StepOutcome, VmError> {
        if self.is_halted() {
            return Err(VmError::AlreadyHalted);
        }

        let at = self.registers.pc;
        let raw = self.memory.fetch(at)?;
        let decoded = Instruction::decode(raw);

        let mut next = self.registers;
        next.pc = self.memory.offset(at, INSTRUCTION_WIDTH as i64)?;

        // The push target is checked before input is consumed so the step stays atomic
        let input = match decoded {
            Ok(Instruction::Sys(SysCall::Read)) => {
                let slot = self.memory.offset(self.registers.sp, -1)?;
                self.memory.check_writable(slot)?;
                Some(console.read_int()?)
            }
            _ => None,
        };

        let (state, mnemonic) = match decoded {
            Ok(instruction) => (
                self.execute(instruction, &mut next, input, console)?,
                instruction.mnemonic(),
            ),
            Err(err) => (ExecState::Halted(HaltReason::InvalidInstruction(err)), "???"),
        };

        let row = self.steps + 1;
        self.registers = next;
        self.state = state;
        if decoded.is_ok() {
            self.steps += 1;
        }

        let trace = TraceRow::capture(
            row,
            at,
            raw,
            mnemonic,
            self.registers,
            &self.memory,
            &self.frames,
        );
        Ok(StepOutcome { state, trace })
    }

    /// Step until the machine halts, handing every outcome to `observer`
    pub fn run<C, F>(&mut self, console: &mut C, mut observer: F) -> Result<HaltReason, VmError>
    where
        C: Console + ?Sized,
        F: FnMut(&StepOutcome),
    {
        loop {
            let outcome = self.step(console)?;
            observer(&outcome);
            if let ExecState::Halted(reason) = outcome.state {
                return Ok(reason);
            }
        }
    }

    /// Semantic action of one decoded instruction
    ///
    /// Every arm performs its fallible reads and address checks before the
    /// first write, so a fault leaves memory unchanged.
    fn execute<C: Console + ?Sized>(
        &mut self,
        instruction: Instruction,
        regs: &mut Registers,
        input: Option<Word>,
        console: &mut C,
    ) -> Result<ExecState, VmError> {
        match instruction {
            Instruction::Lit(value) => {
                regs.sp = self.push(regs.sp, value)?;
            }

            Instruction::Opr(Operation::Rtn) => {
                let sp = self.memory.offset(regs.bp, 1)?;
                let dynamic_link = self.memory.read(self.memory.offset(regs.bp, -1)?)?;
                let return_address = self.memory.read(self.memory.offset(regs.bp, -2)?)?;
                let bp = self.memory.addr_from_word(dynamic_link)?;
                let pc = self.memory.addr_from_word(return_address)?;

                regs.sp = sp;
                regs.bp = bp;
                regs.pc = pc;
                self.frames.pop();
            }

            Instruction::Opr(Operation::Binary(op)) => {
                let right = self.memory.read(regs.sp)?;
                let left_addr = self.memory.offset(regs.sp, 1)?;
                let left = self.memory.read(left_addr)?;
                let result = apply(op, left, right)?;

                self.memory.write(left_addr, result)?;
                regs.sp = left_addr;
            }

            Instruction::Lod { level, offset } => {
                let base = self.base(regs.bp, level)?;
                let source = self.memory.offset(base, -i64::from(offset))?;
                let value = self.memory.read(source)?;
                regs.sp = self.push(regs.sp, value)?;
            }

            Instruction::Sto { level, offset } => {
                let base = self.base(regs.bp, level)?;
                let target = self.memory.offset(base, -i64::from(offset))?;
                let value = self.memory.read(regs.sp)?;
                let sp = self.memory.offset(regs.sp, 1)?;

                self.memory.write(target, value)?;
                regs.sp = sp;
            }

            Instruction::Cal { level, target } => {
                let static_link = self.base(regs.bp, level)?;
                let frame = self.memory.offset(regs.sp, -1)?;
                let dynamic_slot = self.memory.offset(regs.sp, -2)?;
                let return_slot = self.memory.offset(regs.sp, -3)?;
                let pc = self.memory.addr_from_word(target)?;

                // Lowest cell first: if it is writable, the two above it are too
                self.memory.write(return_slot, regs.pc.to_word())?;
                self.memory.write(dynamic_slot, regs.bp.to_word())?;
                self.memory.write(frame, static_link.to_word())?;

                regs.bp = frame;
                regs.pc = pc;
                self.frames.push(frame);
            }

            Instruction::Inc(cells) => {
                regs.sp = self.memory.offset(regs.sp, -i64::from(cells))?;
            }

            Instruction::Jmp(target) => {
                regs.pc = self.memory.addr_from_word(target)?;
            }

            Instruction::Jpc(target) => {
                let condition = self.memory.read(regs.sp)?;
                let sp = self.memory.offset(regs.sp, 1)?;
                if condition == 0 {
                    regs.pc = self.memory.addr_from_word(target)?;
                }
                regs.sp = sp;
            }

            Instruction::Sys(SysCall::Write) => {
                let value = self.memory.read(regs.sp)?;
                let sp = self.memory.offset(regs.sp, 1)?;
                console.write_int(value);
                regs.sp = sp;
            }

            Instruction::Sys(SysCall::Read) => {
                let value = input.ok_or(VmError::InputRequired)?;
                regs.sp = self.push(regs.sp, value)?;
            }

            Instruction::Sys(SysCall::Halt) => {
                return Ok(ExecState::Halted(HaltReason::Halt));
            }
        }

        Ok(ExecState::Running)
    }

    /// Write `value` one cell below `sp` and return the new stack pointer
    fn push(&mut self, sp: Addr, value: Word) -> Result<Addr, VmError> {
        let sp = self.memory.offset(sp, -1)?;
        self.memory.write(sp, value)?;
        Ok(sp)
    }

    /// Capture registers, data cells and frames
    pub fn checkpoint(&self) -> MachineState {
        MachineState {
            registers: self.registers,
            data: self.memory.data_region().to_vec(),
            frames: self.frames.clone(),
            state: self.state,
            steps: self.steps,
        }
    }

    /// Return to a state captured by [`Machine::checkpoint`]
    pub fn restore(&mut self, saved: &MachineState) {
        self.registers = saved.registers;
        self.memory.restore_data_region(&saved.data);
        self.frames = saved.frames.clone();
        self.state = saved.state;
        self.steps = saved.steps;
    }
}

/// Arithmetic and relational operators. Relations yield 1 or 0.
fn apply(op: BinaryOp, left: Word, right: Word) -> Result<Word, VmError> {
    let overflow = |operation: &'static str| VmError::ArithmeticOverflow {
        operation,
        left,
        right,
    };

    match op {
        BinaryOp::Add => left.checked_add(right).ok_or_else(|| overflow("ADD")),
        BinaryOp::Sub => left.checked_sub(right).ok_or_else(|| overflow("SUB")),
        BinaryOp::Mul => left.checked_mul(right).ok_or_else(|| overflow("MUL")),
        BinaryOp::Div => {
            if right == 0 {
                return Err(VmError::DivisionByZero);
            }
            left.checked_div(right).ok_or_else(|| overflow("DIV"))
        }
        BinaryOp::Eql => Ok(Word::from(left == right)),
        BinaryOp::Neq => Ok(Word::from(left != right)),
        BinaryOp::Lss => Ok(Word::from(left < right)),
        BinaryOp::Leq => Ok(Word::from(left <= right)),
        BinaryOp::Gtr => Ok(Word::from(left > right)),
        BinaryOp::Geq => Ok(Word::from(left >= right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::BufferedConsole;

    fn machine(triples: &[(Word, Word, Word)]) -> Machine {
        Machine::load(&Program::from_triples(triples), &VmConfig::default()).unwrap()
    }

    #[test]
    fn test_initial_registers() {
        let m = machine(&[(9, 0, 3)]);
        let regs = m.registers();

        assert_eq!(regs.pc, Addr::new(10));
        assert_eq!(regs.bp, Addr::new(499));
        assert_eq!(regs.sp, Addr::new(500));
        assert_eq!(m.state(), ExecState::Running);
    }

    #[test]
    fn test_base_zero_is_identity() {
        let m = machine(&[(9, 0, 3)]);
        for bp in [0, 13, 250, 499] {
            assert_eq!(m.base(Addr::new(bp), 0), Ok(Addr::new(bp)));
        }
    }

    #[test]
    fn test_lit_add_leaves_one_cell() {
        let mut m = machine(&[(1, 0, 3), (1, 0, 4), (2, 0, 1), (9, 0, 3)]);
        let mut console = BufferedConsole::new();
        let before = m.registers().sp;

        for _ in 0..3 {
            m.step(&mut console).unwrap();
        }

        assert_eq!(m.registers().sp.index(), before.index() - 1);
        assert_eq!(m.top(), Ok(7));
    }

    #[test]
    fn test_relational_ops() {
        assert_eq!(apply(BinaryOp::Lss, 2, 3), Ok(1));
        assert_eq!(apply(BinaryOp::Geq, 2, 3), Ok(0));
        assert_eq!(apply(BinaryOp::Neq, 5, 5), Ok(0));
        assert_eq!(apply(BinaryOp::Div, -7, 2), Ok(-3));
        assert_eq!(apply(BinaryOp::Div, 1, 0), Err(VmError::DivisionByZero));
        assert!(matches!(
            apply(BinaryOp::Mul, Word::MAX, 2),
            Err(VmError::ArithmeticOverflow {
                operation: "MUL",
                ..
            })
        ));
    }

    #[test]
    fn test_jpc_pops_either_way() {
        let mut taken = machine(&[(1, 0, 0), (8, 0, 19), (1, 0, 1), (9, 0, 3)]);
        let mut console = BufferedConsole::new();
        taken.step(&mut console).unwrap();
        let sp = taken.registers().sp;
        taken.step(&mut console).unwrap();
        assert_eq!(taken.registers().sp.index(), sp.index() + 1);
        assert_eq!(taken.registers().pc, Addr::new(19));

        let mut fallthrough = machine(&[(1, 0, 5), (8, 0, 19), (1, 0, 1), (9, 0, 3)]);
        fallthrough.step(&mut console).unwrap();
        let sp = fallthrough.registers().sp;
        fallthrough.step(&mut console).unwrap();
        assert_eq!(fallthrough.registers().sp.index(), sp.index() + 1);
        assert_eq!(fallthrough.registers().pc, Addr::new(16));
        assert_eq!(fallthrough.registers().sp, Addr::new(500));
    }

    #[test]
    fn test_fault_leaves_registers_untouched() {
        let mut m = machine(&[(1, 0, 1), (1, 0, 0), (2, 0, 4)]);
        let mut console = BufferedConsole::new();
        m.step(&mut console).unwrap();
        m.step(&mut console).unwrap();
        let before = m.registers();

        assert_eq!(m.step(&mut console).unwrap_err(), VmError::DivisionByZero);
        assert_eq!(m.registers(), before);
        assert_eq!(m.steps(), 2);
    }

    #[test]
    fn test_input_required_is_retryable() {
        let mut m = machine(&[(9, 0, 2), (9, 0, 3)]);
        let mut console = BufferedConsole::new();

        assert!(m.awaits_input());
        assert_eq!(m.step(&mut console).unwrap_err(), VmError::InputRequired);
        assert_eq!(m.registers().pc, Addr::new(10));

        console.push_input(12);
        let outcome = m.step(&mut console).unwrap();
        assert_eq!(outcome.trace.stack_values(), vec![12]);
        assert!(!m.awaits_input());
    }

    #[test]
    fn test_input_kept_when_push_would_fault() {
        // The stack has grown down to the end of the code, so the push has nowhere to go
        let mut m = machine(&[(6, 0, 484), (9, 0, 2)]);
        let mut console = BufferedConsole::with_inputs([5]);
        m.step(&mut console).unwrap();
        let before = m.registers();

        assert_eq!(
            m.step(&mut console).unwrap_err(),
            VmError::CodeRegionWrite {
                address: 15,
                code_end: 16
            }
        );
        assert_eq!(console.pending_inputs(), 1);
        assert_eq!(m.registers(), before);
    }

    #[test]
    fn test_undecodable_instruction_is_not_counted() {
        let mut m = machine(&[(99, 0, 0)]);
        let mut console = BufferedConsole::new();

        let outcome = m.step(&mut console).unwrap();
        assert!(matches!(
            outcome.state,
            ExecState::Halted(HaltReason::InvalidInstruction(_))
        ));
        assert_eq!(outcome.trace.step, 1);
        assert_eq!(m.steps(), 0);
    }

    #[test]
    fn test_step_after_halt() {
        let mut m = machine(&[(9, 0, 3)]);
        let mut console = BufferedConsole::new();

        let outcome = m.step(&mut console).unwrap();
        assert_eq!(outcome.state, ExecState::Halted(HaltReason::Halt));
        assert_eq!(m.step(&mut console).unwrap_err(), VmError::AlreadyHalted);
    }

    #[test]
    fn test_checkpoint_restore() {
        let mut m = machine(&[(1, 0, 4), (1, 0, 6), (9, 0, 3)]);
        let mut console = BufferedConsole::new();
        m.step(&mut console).unwrap();
        let saved = m.checkpoint();

        m.step(&mut console).unwrap();
        m.step(&mut console).unwrap();
        assert!(m.is_halted());

        m.restore(&saved);
        assert_eq!(m.checkpoint(), saved);
        assert_eq!(m.top(), Ok(4));
        assert!(!m.is_halted());
    }
}
