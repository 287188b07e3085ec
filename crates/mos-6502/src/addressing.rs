//! Addressing-mode operand resolution.
//!
//! Each mode computes an effective operand location from the bytes after
//! the opcode and/or an index register. `operand_address` reports whether
//! indexing crossed a page boundary so the step engine can charge the
//! read-penalty cycle.

use crate::Mos6502;
use crate::instruction::AddressingMode;
use emu_core::AddressBus;

impl Mos6502 {
    /// Fetch the next byte at PC and increment PC.
    pub(crate) fn fetch(&mut self, bus: &mut impl AddressBus) -> u8 {
        let value = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    /// Fetch a 16-bit word (little-endian) at PC.
    pub(crate) fn fetch_word(&mut self, bus: &mut impl AddressBus) -> u16 {
        let low = self.fetch(bus);
        let high = self.fetch(bus);
        u16::from_le_bytes([low, high])
    }

    /// Read a 16-bit word from memory (little-endian).
    pub(crate) fn read_word(&mut self, bus: &mut impl AddressBus, addr: u16) -> u16 {
        let low = bus.read(addr);
        let high = bus.read(addr.wrapping_add(1));
        u16::from_le_bytes([low, high])
    }

    /// Read a 16-bit word with the NMOS page-boundary quirk (indirect
    /// JMP): if `addr` is `$xxFF`, the high byte comes from `$xx00`.
    pub(crate) fn read_word_page_bug(&mut self, bus: &mut impl AddressBus, addr: u16) -> u16 {
        let low = bus.read(addr);
        let high_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
        let high = bus.read(high_addr);
        u16::from_le_bytes([low, high])
    }

    /// Read a 16-bit pointer from zero page, wrapping within page zero.
    fn read_zp_word(&mut self, bus: &mut impl AddressBus, ptr: u8) -> u16 {
        let low = bus.read(u16::from(ptr));
        let high = bus.read(u16::from(ptr.wrapping_add(1)));
        u16::from_le_bytes([low, high])
    }

    /// Push a byte onto the stack.
    pub(crate) fn push(&mut self, bus: &mut impl AddressBus, value: u8) {
        let addr = self.regs.push();
        bus.write(addr, value);
    }

    /// Pull a byte from the stack.
    pub(crate) fn pull(&mut self, bus: &mut impl AddressBus) -> u8 {
        let addr = self.regs.pop();
        bus.read(addr)
    }

    /// Push a 16-bit word onto the stack (high byte first).
    pub(crate) fn push_word(&mut self, bus: &mut impl AddressBus, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, value as u8);
    }

    /// Pull a 16-bit word from the stack (low byte first).
    pub(crate) fn pull_word(&mut self, bus: &mut impl AddressBus) -> u16 {
        let low = self.pull(bus);
        let high = self.pull(bus);
        u16::from_le_bytes([low, high])
    }

    /// Resolve the effective operand address for a memory-operand mode.
    ///
    /// Returns the address and whether indexing crossed a page boundary.
    /// Immediate/Accumulator/Implied/Relative have no address and are
    /// handled by the dispatch paths directly.
    pub(crate) fn operand_address(
        &mut self,
        bus: &mut impl AddressBus,
        mode: AddressingMode,
    ) -> (u16, bool) {
        match mode {
            AddressingMode::ZeroPage => (u16::from(self.fetch(bus)), false),
            AddressingMode::ZeroPageX => {
                let base = self.fetch(bus);
                (u16::from(base.wrapping_add(self.regs.x)), false)
            }
            AddressingMode::ZeroPageY => {
                let base = self.fetch(bus);
                (u16::from(base.wrapping_add(self.regs.y)), false)
            }
            AddressingMode::Absolute => (self.fetch_word(bus), false),
            AddressingMode::AbsoluteX => {
                let base = self.fetch_word(bus);
                let addr = base.wrapping_add(u16::from(self.regs.x));
                (addr, page_crossed(base, addr))
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_word(bus);
                let addr = base.wrapping_add(u16::from(self.regs.y));
                (addr, page_crossed(base, addr))
            }
            AddressingMode::Indirect => {
                let ptr = self.fetch_word(bus);
                (self.read_word_page_bug(bus, ptr), false)
            }
            AddressingMode::IndexedIndirect => {
                let ptr = self.fetch(bus).wrapping_add(self.regs.x);
                (self.read_zp_word(bus, ptr), false)
            }
            AddressingMode::IndirectIndexed => {
                let ptr = self.fetch(bus);
                let base = self.read_zp_word(bus, ptr);
                let addr = base.wrapping_add(u16::from(self.regs.y));
                (addr, page_crossed(base, addr))
            }
            AddressingMode::Implied
            | AddressingMode::Accumulator
            | AddressingMode::Immediate
            | AddressingMode::Relative => {
                unreachable!("{mode:?} has no operand address")
            }
        }
    }

    /// Read the operand value for a value-consuming operation.
    pub(crate) fn read_operand(
        &mut self,
        bus: &mut impl AddressBus,
        mode: AddressingMode,
    ) -> (u8, bool) {
        if mode == AddressingMode::Immediate {
            return (self.fetch(bus), false);
        }
        let (addr, crossed) = self.operand_address(bus, mode);
        (bus.read(addr), crossed)
    }
}

const fn page_crossed(base: u16, addr: u16) -> bool {
    base & 0xFF00 != addr & 0xFF00
}
