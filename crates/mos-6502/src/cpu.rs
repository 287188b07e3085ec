//! 6502 CPU step engine.
//!
//! One `step()` executes one instruction: breakpoint check, opcode fetch,
//! table lookup, family dispatch. Interrupts are serviced separately via
//! `handle_interrupts`, so a host controls the cadence (typically once
//! per step).

use std::collections::HashSet;

use emu_core::{AddressBus, Observable, Value};

use crate::flags::{B, I};
use crate::instruction::{
    AddressingMode, Instruction, Operation, Register, StackSlot, opcode_table,
};
use crate::interrupt::{IRQ, InterruptLine, NMI, RESET};
use crate::watch::{Watcher, WatcherId, WatcherRegistry};
use crate::{Registers, Status};

/// NMI vector address.
pub const NMI_VECTOR: u16 = 0xFFFA;
/// Reset vector address.
pub const RESET_VECTOR: u16 = 0xFFFC;
/// IRQ/BRK vector address.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// The MOS 6502 CPU.
///
/// Holds register state, the pending-interrupt latches, the opcode
/// dispatch table (built once at construction), breakpoints, and the
/// watcher registry. All memory access goes through the [`AddressBus`]
/// passed to each operation, so the bus can be shared with peripherals.
pub struct Mos6502 {
    /// CPU registers.
    pub regs: Registers,
    pub(crate) table: Box<[Instruction; 256]>,
    pending: InterruptLine,
    breakpoints: HashSet<u16>,
    watchers: WatcherRegistry,
}

impl Default for Mos6502 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mos6502 {
    /// Create a new 6502 in power-on state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            table: opcode_table(),
            pending: InterruptLine::new(),
            breakpoints: HashSet::new(),
            watchers: WatcherRegistry::new(),
        }
    }

    /// Handle to the pending-interrupt latches, for wiring peripheral
    /// callbacks. Clones share the same latches.
    #[must_use]
    pub fn interrupt_line(&self) -> InterruptLine {
        self.pending.clone()
    }

    /// Latch a maskable interrupt request.
    pub fn trigger_irq(&self) {
        self.pending.raise_irq();
    }

    /// Latch a non-maskable interrupt.
    pub fn trigger_nmi(&self) {
        self.pending.raise_nmi();
    }

    /// Latch a reset request.
    pub fn trigger_reset(&self) {
        self.pending.raise_reset();
    }

    /// Register a breakpoint address.
    pub fn add_breakpoint(&mut self, addr: u16) {
        self.breakpoints.insert(addr);
    }

    /// Remove a breakpoint. Returns false if it was not set.
    pub fn remove_breakpoint(&mut self, addr: u16) -> bool {
        self.breakpoints.remove(&addr)
    }

    /// Register a watcher; the returned id deregisters it.
    pub fn watch(&mut self, watcher: Box<dyn Watcher>) -> WatcherId {
        self.watchers.add(watcher)
    }

    /// Deregister a watcher by id. Returns false if unknown.
    pub fn unwatch(&mut self, id: WatcherId) -> bool {
        self.watchers.remove(id)
    }

    /// Decode an opcode byte against the dispatch table.
    #[must_use]
    pub fn decode(&self, opcode: u8) -> Instruction {
        self.table[opcode as usize]
    }

    /// Execute one instruction. Returns the cycles consumed.
    pub fn step<B: AddressBus>(&mut self, bus: &mut B) -> u32 {
        if self.breakpoints.contains(&self.regs.pc) {
            self.watchers.notify_breakpoint(&mut self.regs);
        }

        // Re-read PC: a watcher may have moved it.
        let pc = self.regs.pc;
        let opcode = bus.read(pc);
        self.regs.pc = pc.wrapping_add(1);

        let instr = self.table[opcode as usize];
        self.execute(bus, instr)
    }

    /// Service pending interrupts in priority order reset > NMI > IRQ.
    ///
    /// At most one interrupt is serviced per call. IRQ is suppressed (but
    /// stays latched) while the interrupt-disable flag is set.
    pub fn handle_interrupts<B: AddressBus>(&mut self, bus: &mut B) {
        if self.pending.take(RESET) {
            self.regs.a = 0;
            self.regs.x = 0;
            self.regs.y = 0;
            self.regs.s = 0xFF;
            self.regs.p = Status::new();
            self.regs.pc = self.read_word(bus, RESET_VECTOR);
            return;
        }

        if self.pending.take(NMI) {
            self.push_word(bus, self.regs.pc);
            let status = self.regs.p.to_byte_irq();
            self.push(bus, status);
            self.regs.pc = self.read_word(bus, NMI_VECTOR);
            self.watchers.notify_nmi(&mut self.regs);
            return;
        }

        if self.pending.is_raised(IRQ) && !self.regs.p.is_set(I) {
            self.pending.take(IRQ);
            self.push_word(bus, self.regs.pc);
            let status = self.regs.p.to_byte_irq();
            self.push(bus, status);
            self.regs.p.set(I);
            self.regs.pc = self.read_word(bus, IRQ_VECTOR);
        }
    }

    fn execute<B: AddressBus>(&mut self, bus: &mut B, instr: Instruction) -> u32 {
        let base = u32::from(instr.cycles);
        match instr.operation {
            Operation::Load(reg) => {
                let (value, crossed) = self.read_operand(bus, instr.mode);
                self.set_reg(reg, value);
                self.regs.p.update_nz(value);
                base + u32::from(crossed)
            }
            Operation::Store(reg) => {
                let (addr, _) = self.operand_address(bus, instr.mode);
                bus.write(addr, self.reg(reg));
                base
            }
            Operation::Transfer { from, to } => {
                let value = self.reg(from);
                self.set_reg(to, value);
                if to != Register::S {
                    self.regs.p.update_nz(value);
                }
                base
            }
            Operation::Binary(op) => {
                let (value, crossed) = self.read_operand(bus, instr.mode);
                self.binary(op, value);
                base + u32::from(crossed)
            }
            Operation::Compare(reg) => {
                let (value, crossed) = self.read_operand(bus, instr.mode);
                self.compare(self.reg(reg), value);
                base + u32::from(crossed)
            }
            Operation::Unary(op) => {
                if instr.mode == AddressingMode::Accumulator {
                    let result = self.unary(op, self.regs.a);
                    self.regs.a = result;
                } else {
                    let (addr, _) = self.operand_address(bus, instr.mode);
                    let value = bus.read(addr);
                    let result = self.unary(op, value);
                    bus.write(addr, result);
                }
                base
            }
            Operation::StepRegister { reg, delta } => {
                let value = self.reg(reg).wrapping_add(delta as u8);
                self.set_reg(reg, value);
                self.regs.p.update_nz(value);
                base
            }
            Operation::Branch { flag, taken_if_set } => {
                let take = self.regs.p.is_set(flag) == taken_if_set;
                base + self.branch(bus, take)
            }
            Operation::Push(slot) => {
                let value = match slot {
                    StackSlot::Accumulator => self.regs.a,
                    StackSlot::Status => self.regs.p.to_byte_brk(),
                };
                self.push(bus, value);
                base
            }
            Operation::Pull(slot) => {
                let value = self.pull(bus);
                match slot {
                    StackSlot::Accumulator => {
                        self.regs.a = value;
                        self.regs.p.update_nz(value);
                    }
                    StackSlot::Status => self.regs.p = Status::from_pulled(value),
                }
                base
            }
            Operation::Jump => {
                let (addr, _) = self.operand_address(bus, instr.mode);
                self.regs.pc = addr;
                base
            }
            Operation::JumpSub => {
                let target = self.fetch_word(bus);
                // Return address is the last operand byte; RTS adds one.
                self.push_word(bus, self.regs.pc.wrapping_sub(1));
                self.regs.pc = target;
                base
            }
            Operation::ReturnSub => {
                self.regs.pc = self.pull_word(bus).wrapping_add(1);
                base
            }
            Operation::ReturnInt => {
                let status = self.pull(bus);
                self.regs.p = Status::from_pulled(status);
                self.regs.pc = self.pull_word(bus);
                base
            }
            Operation::Break => {
                // Same push/vector sequence as IRQ, but unconditional and
                // with the break bit set in the pushed status.
                self.push_word(bus, self.regs.pc.wrapping_add(1));
                let status = self.regs.p.to_byte_brk();
                self.push(bus, status);
                self.regs.p.set(I);
                self.regs.pc = self.read_word(bus, IRQ_VECTOR);
                base
            }
            Operation::SetFlag { flag, value } => {
                self.regs.p.set_if(flag, value);
                base
            }
            Operation::Nop => base,
            Operation::Invalid => {
                self.watchers.notify_invalid_opcode(&mut self.regs);
                base
            }
        }
    }

    /// Fetch the branch offset and take the branch if `take`. Returns
    /// extra cycles: one if taken, one more if the target crosses a page.
    fn branch<B: AddressBus>(&mut self, bus: &mut B, take: bool) -> u32 {
        let offset = self.fetch(bus) as i8;
        if !take {
            return 0;
        }
        let target = self.regs.pc.wrapping_add(offset as u16);
        let crossed = self.regs.pc & 0xFF00 != target & 0xFF00;
        self.regs.pc = target;
        1 + u32::from(crossed)
    }

    fn reg(&self, reg: Register) -> u8 {
        match reg {
            Register::A => self.regs.a,
            Register::X => self.regs.x,
            Register::Y => self.regs.y,
            Register::S => self.regs.s,
        }
    }

    fn set_reg(&mut self, reg: Register, value: u8) {
        match reg {
            Register::A => self.regs.a = value,
            Register::X => self.regs.x = value,
            Register::Y => self.regs.y = value,
            Register::S => self.regs.s = value,
        }
    }
}

impl Observable for Mos6502 {
    fn query(&self, path: &str) -> Option<Value> {
        let value = match path {
            "a" => Value::U8(self.regs.a),
            "x" => Value::U8(self.regs.x),
            "y" => Value::U8(self.regs.y),
            "s" => Value::U8(self.regs.s),
            "pc" => Value::U16(self.regs.pc),
            "p" => Value::String(self.regs.p.to_string()),
            "flags.c" => Value::Bool(self.regs.p.is_set(crate::flags::C)),
            "flags.z" => Value::Bool(self.regs.p.is_set(crate::flags::Z)),
            "flags.i" => Value::Bool(self.regs.p.is_set(I)),
            "flags.d" => Value::Bool(self.regs.p.is_set(crate::flags::D)),
            "flags.b" => Value::Bool(self.regs.p.is_set(B)),
            "flags.v" => Value::Bool(self.regs.p.is_set(crate::flags::V)),
            "flags.n" => Value::Bool(self.regs.p.is_set(crate::flags::N)),
            "pending" => Value::U8(self.pending.pending()),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "a", "x", "y", "s", "pc", "p", "flags.c", "flags.z", "flags.i", "flags.d", "flags.b",
            "flags.v", "flags.n", "pending",
        ]
    }
}
