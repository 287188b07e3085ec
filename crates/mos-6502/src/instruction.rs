//! Opcode dispatch table.
//!
//! Each of the 256 opcode bytes maps to exactly one [`Instruction`]: an
//! addressing mode crossed with an operation family. The table is built
//! once at CPU construction; there is no per-opcode type and no global
//! state. Unassigned opcodes get the invalid-opcode operation,
//! parameterized by their opcode byte (the table entry is the per-value
//! cache).
//!
//! The 151 documented NMOS opcodes are assigned; the remaining 105 are
//! invalid and execute as one-byte no-ops that notify watchers.

use crate::flags::{C, D, I, N, V, Z};

/// How an instruction locates its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// No operand (e.g. CLC, RTS).
    Implied,
    /// Operates on the accumulator (e.g. ASL A).
    Accumulator,
    /// `#$nn`: the operand byte itself.
    Immediate,
    /// `$nn`: 8-bit address in page zero.
    ZeroPage,
    /// `$nn,X`: zero-page address + X, wrapping within page zero.
    ZeroPageX,
    /// `$nn,Y`: zero-page address + Y, wrapping within page zero.
    ZeroPageY,
    /// `$nnnn`: little-endian 16-bit address.
    Absolute,
    /// `$nnnn,X`.
    AbsoluteX,
    /// `$nnnn,Y`.
    AbsoluteY,
    /// `($nnnn)`: JMP only, with the NMOS page-boundary quirk.
    Indirect,
    /// `($nn,X)`: pointer in zero page indexed by X.
    IndexedIndirect,
    /// `($nn),Y`: zero-page pointer, then indexed by Y.
    IndirectIndexed,
    /// Branch offset, -128 to +127 relative to the next instruction.
    Relative,
}

impl AddressingMode {
    /// Bytes consumed after the opcode. Dispatch and disassembly must
    /// agree on this.
    #[must_use]
    pub const fn operand_bytes(self) -> u16 {
        match self {
            Self::Implied | Self::Accumulator => 0,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::IndexedIndirect
            | Self::IndirectIndexed
            | Self::Relative => 1,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
        }
    }
}

/// CPU register named by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    A,
    X,
    Y,
    S,
}

/// Binary ALU operations combining the accumulator with a memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Adc,
    Sbc,
    And,
    Ora,
    Eor,
    Bit,
}

/// Unary ALU operations applied in place to a register or memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Asl,
    Lsr,
    Rol,
    Ror,
    Inc,
    Dec,
}

/// What PHA/PHP/PLA/PLP move between the stack and the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackSlot {
    Accumulator,
    Status,
}

/// Operation family. Crossed with [`AddressingMode`], this covers the
/// whole behavioral matrix without per-opcode types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Move a memory operand into a register, updating N/Z.
    Load(Register),
    /// Move a register into a memory operand. No flags.
    Store(Register),
    /// Register-to-register move. Updates N/Z except when targeting S.
    Transfer { from: Register, to: Register },
    /// Accumulator-and-operand ALU operation.
    Binary(BinaryOp),
    /// CMP/CPX/CPY against the named register.
    Compare(Register),
    /// Shift/rotate/increment/decrement of the operand in place.
    Unary(UnaryOp),
    /// INX/INY/DEX/DEY.
    StepRegister { reg: Register, delta: i8 },
    /// Conditional relative branch on one status flag.
    Branch { flag: u8, taken_if_set: bool },
    /// Push a register or the status byte.
    Push(StackSlot),
    /// Pull a register or the status byte.
    Pull(StackSlot),
    /// JMP (absolute or indirect per the addressing mode).
    Jump,
    /// JSR.
    JumpSub,
    /// RTS.
    ReturnSub,
    /// RTI.
    ReturnInt,
    /// BRK: IRQ push/vector sequence regardless of the I flag.
    Break,
    /// CLC/SEC/CLI/SEI/CLV/CLD/SED.
    SetFlag { flag: u8, value: bool },
    /// NOP.
    Nop,
    /// Unassigned opcode: notify watchers, advance past the byte.
    Invalid,
}

/// One decoded opcode: immutable metadata plus the operation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The opcode byte this entry decodes.
    pub opcode: u8,
    /// Three-letter mnemonic, `???` for unassigned opcodes.
    pub mnemonic: &'static str,
    /// Operand addressing strategy.
    pub mode: AddressingMode,
    /// Operation family.
    pub operation: Operation,
    /// Base cycle cost. Page-cross and taken-branch penalties are added
    /// by the step engine.
    pub cycles: u8,
}

impl Instruction {
    /// Encoded length in bytes, opcode included.
    #[must_use]
    pub const fn length(self) -> u16 {
        1 + self.mode.operand_bytes()
    }

    const fn invalid(opcode: u8) -> Self {
        Self {
            opcode,
            mnemonic: "???",
            mode: AddressingMode::Implied,
            operation: Operation::Invalid,
            cycles: 2,
        }
    }
}

fn assign(
    table: &mut [Instruction; 256],
    opcode: u8,
    mnemonic: &'static str,
    mode: AddressingMode,
    operation: Operation,
    cycles: u8,
) {
    table[opcode as usize] = Instruction {
        opcode,
        mnemonic,
        mode,
        operation,
        cycles,
    };
}

/// Build the 256-entry dispatch table.
#[must_use]
pub fn opcode_table() -> Box<[Instruction; 256]> {
    use AddressingMode as M;
    use BinaryOp as Bin;
    use Operation as Op;
    use Register::{A, S, X, Y};
    use StackSlot as Slot;
    use UnaryOp as Un;

    let mut table = Box::new([Instruction::invalid(0); 256]);
    for (opcode, entry) in table.iter_mut().enumerate() {
        entry.opcode = opcode as u8;
    }
    let t = &mut *table;

    // Load
    assign(t, 0xA9, "LDA", M::Immediate, Op::Load(A), 2);
    assign(t, 0xA5, "LDA", M::ZeroPage, Op::Load(A), 3);
    assign(t, 0xB5, "LDA", M::ZeroPageX, Op::Load(A), 4);
    assign(t, 0xAD, "LDA", M::Absolute, Op::Load(A), 4);
    assign(t, 0xBD, "LDA", M::AbsoluteX, Op::Load(A), 4);
    assign(t, 0xB9, "LDA", M::AbsoluteY, Op::Load(A), 4);
    assign(t, 0xA1, "LDA", M::IndexedIndirect, Op::Load(A), 6);
    assign(t, 0xB1, "LDA", M::IndirectIndexed, Op::Load(A), 5);
    assign(t, 0xA2, "LDX", M::Immediate, Op::Load(X), 2);
    assign(t, 0xA6, "LDX", M::ZeroPage, Op::Load(X), 3);
    assign(t, 0xB6, "LDX", M::ZeroPageY, Op::Load(X), 4);
    assign(t, 0xAE, "LDX", M::Absolute, Op::Load(X), 4);
    assign(t, 0xBE, "LDX", M::AbsoluteY, Op::Load(X), 4);
    assign(t, 0xA0, "LDY", M::Immediate, Op::Load(Y), 2);
    assign(t, 0xA4, "LDY", M::ZeroPage, Op::Load(Y), 3);
    assign(t, 0xB4, "LDY", M::ZeroPageX, Op::Load(Y), 4);
    assign(t, 0xAC, "LDY", M::Absolute, Op::Load(Y), 4);
    assign(t, 0xBC, "LDY", M::AbsoluteX, Op::Load(Y), 4);

    // Store
    assign(t, 0x85, "STA", M::ZeroPage, Op::Store(A), 3);
    assign(t, 0x95, "STA", M::ZeroPageX, Op::Store(A), 4);
    assign(t, 0x8D, "STA", M::Absolute, Op::Store(A), 4);
    assign(t, 0x9D, "STA", M::AbsoluteX, Op::Store(A), 5);
    assign(t, 0x99, "STA", M::AbsoluteY, Op::Store(A), 5);
    assign(t, 0x81, "STA", M::IndexedIndirect, Op::Store(A), 6);
    assign(t, 0x91, "STA", M::IndirectIndexed, Op::Store(A), 6);
    assign(t, 0x86, "STX", M::ZeroPage, Op::Store(X), 3);
    assign(t, 0x96, "STX", M::ZeroPageY, Op::Store(X), 4);
    assign(t, 0x8E, "STX", M::Absolute, Op::Store(X), 4);
    assign(t, 0x84, "STY", M::ZeroPage, Op::Store(Y), 3);
    assign(t, 0x94, "STY", M::ZeroPageX, Op::Store(Y), 4);
    assign(t, 0x8C, "STY", M::Absolute, Op::Store(Y), 4);

    // Register transfers
    assign(t, 0xAA, "TAX", M::Implied, Op::Transfer { from: A, to: X }, 2);
    assign(t, 0xA8, "TAY", M::Implied, Op::Transfer { from: A, to: Y }, 2);
    assign(t, 0x8A, "TXA", M::Implied, Op::Transfer { from: X, to: A }, 2);
    assign(t, 0x98, "TYA", M::Implied, Op::Transfer { from: Y, to: A }, 2);
    assign(t, 0xBA, "TSX", M::Implied, Op::Transfer { from: S, to: X }, 2);
    assign(t, 0x9A, "TXS", M::Implied, Op::Transfer { from: X, to: S }, 2);

    // Binary ALU
    assign(t, 0x69, "ADC", M::Immediate, Op::Binary(Bin::Adc), 2);
    assign(t, 0x65, "ADC", M::ZeroPage, Op::Binary(Bin::Adc), 3);
    assign(t, 0x75, "ADC", M::ZeroPageX, Op::Binary(Bin::Adc), 4);
    assign(t, 0x6D, "ADC", M::Absolute, Op::Binary(Bin::Adc), 4);
    assign(t, 0x7D, "ADC", M::AbsoluteX, Op::Binary(Bin::Adc), 4);
    assign(t, 0x79, "ADC", M::AbsoluteY, Op::Binary(Bin::Adc), 4);
    assign(t, 0x61, "ADC", M::IndexedIndirect, Op::Binary(Bin::Adc), 6);
    assign(t, 0x71, "ADC", M::IndirectIndexed, Op::Binary(Bin::Adc), 5);
    assign(t, 0xE9, "SBC", M::Immediate, Op::Binary(Bin::Sbc), 2);
    assign(t, 0xE5, "SBC", M::ZeroPage, Op::Binary(Bin::Sbc), 3);
    assign(t, 0xF5, "SBC", M::ZeroPageX, Op::Binary(Bin::Sbc), 4);
    assign(t, 0xED, "SBC", M::Absolute, Op::Binary(Bin::Sbc), 4);
    assign(t, 0xFD, "SBC", M::AbsoluteX, Op::Binary(Bin::Sbc), 4);
    assign(t, 0xF9, "SBC", M::AbsoluteY, Op::Binary(Bin::Sbc), 4);
    assign(t, 0xE1, "SBC", M::IndexedIndirect, Op::Binary(Bin::Sbc), 6);
    assign(t, 0xF1, "SBC", M::IndirectIndexed, Op::Binary(Bin::Sbc), 5);
    assign(t, 0x29, "AND", M::Immediate, Op::Binary(Bin::And), 2);
    assign(t, 0x25, "AND", M::ZeroPage, Op::Binary(Bin::And), 3);
    assign(t, 0x35, "AND", M::ZeroPageX, Op::Binary(Bin::And), 4);
    assign(t, 0x2D, "AND", M::Absolute, Op::Binary(Bin::And), 4);
    assign(t, 0x3D, "AND", M::AbsoluteX, Op::Binary(Bin::And), 4);
    assign(t, 0x39, "AND", M::AbsoluteY, Op::Binary(Bin::And), 4);
    assign(t, 0x21, "AND", M::IndexedIndirect, Op::Binary(Bin::And), 6);
    assign(t, 0x31, "AND", M::IndirectIndexed, Op::Binary(Bin::And), 5);
    assign(t, 0x09, "ORA", M::Immediate, Op::Binary(Bin::Ora), 2);
    assign(t, 0x05, "ORA", M::ZeroPage, Op::Binary(Bin::Ora), 3);
    assign(t, 0x15, "ORA", M::ZeroPageX, Op::Binary(Bin::Ora), 4);
    assign(t, 0x0D, "ORA", M::Absolute, Op::Binary(Bin::Ora), 4);
    assign(t, 0x1D, "ORA", M::AbsoluteX, Op::Binary(Bin::Ora), 4);
    assign(t, 0x19, "ORA", M::AbsoluteY, Op::Binary(Bin::Ora), 4);
    assign(t, 0x01, "ORA", M::IndexedIndirect, Op::Binary(Bin::Ora), 6);
    assign(t, 0x11, "ORA", M::IndirectIndexed, Op::Binary(Bin::Ora), 5);
    assign(t, 0x49, "EOR", M::Immediate, Op::Binary(Bin::Eor), 2);
    assign(t, 0x45, "EOR", M::ZeroPage, Op::Binary(Bin::Eor), 3);
    assign(t, 0x55, "EOR", M::ZeroPageX, Op::Binary(Bin::Eor), 4);
    assign(t, 0x4D, "EOR", M::Absolute, Op::Binary(Bin::Eor), 4);
    assign(t, 0x5D, "EOR", M::AbsoluteX, Op::Binary(Bin::Eor), 4);
    assign(t, 0x59, "EOR", M::AbsoluteY, Op::Binary(Bin::Eor), 4);
    assign(t, 0x41, "EOR", M::IndexedIndirect, Op::Binary(Bin::Eor), 6);
    assign(t, 0x51, "EOR", M::IndirectIndexed, Op::Binary(Bin::Eor), 5);
    assign(t, 0x24, "BIT", M::ZeroPage, Op::Binary(Bin::Bit), 3);
    assign(t, 0x2C, "BIT", M::Absolute, Op::Binary(Bin::Bit), 4);

    // Compare
    assign(t, 0xC9, "CMP", M::Immediate, Op::Compare(A), 2);
    assign(t, 0xC5, "CMP", M::ZeroPage, Op::Compare(A), 3);
    assign(t, 0xD5, "CMP", M::ZeroPageX, Op::Compare(A), 4);
    assign(t, 0xCD, "CMP", M::Absolute, Op::Compare(A), 4);
    assign(t, 0xDD, "CMP", M::AbsoluteX, Op::Compare(A), 4);
    assign(t, 0xD9, "CMP", M::AbsoluteY, Op::Compare(A), 4);
    assign(t, 0xC1, "CMP", M::IndexedIndirect, Op::Compare(A), 6);
    assign(t, 0xD1, "CMP", M::IndirectIndexed, Op::Compare(A), 5);
    assign(t, 0xE0, "CPX", M::Immediate, Op::Compare(X), 2);
    assign(t, 0xE4, "CPX", M::ZeroPage, Op::Compare(X), 3);
    assign(t, 0xEC, "CPX", M::Absolute, Op::Compare(X), 4);
    assign(t, 0xC0, "CPY", M::Immediate, Op::Compare(Y), 2);
    assign(t, 0xC4, "CPY", M::ZeroPage, Op::Compare(Y), 3);
    assign(t, 0xCC, "CPY", M::Absolute, Op::Compare(Y), 4);

    // Unary ALU: shifts and rotates
    assign(t, 0x0A, "ASL", M::Accumulator, Op::Unary(Un::Asl), 2);
    assign(t, 0x06, "ASL", M::ZeroPage, Op::Unary(Un::Asl), 5);
    assign(t, 0x16, "ASL", M::ZeroPageX, Op::Unary(Un::Asl), 6);
    assign(t, 0x0E, "ASL", M::Absolute, Op::Unary(Un::Asl), 6);
    assign(t, 0x1E, "ASL", M::AbsoluteX, Op::Unary(Un::Asl), 7);
    assign(t, 0x4A, "LSR", M::Accumulator, Op::Unary(Un::Lsr), 2);
    assign(t, 0x46, "LSR", M::ZeroPage, Op::Unary(Un::Lsr), 5);
    assign(t, 0x56, "LSR", M::ZeroPageX, Op::Unary(Un::Lsr), 6);
    assign(t, 0x4E, "LSR", M::Absolute, Op::Unary(Un::Lsr), 6);
    assign(t, 0x5E, "LSR", M::AbsoluteX, Op::Unary(Un::Lsr), 7);
    assign(t, 0x2A, "ROL", M::Accumulator, Op::Unary(Un::Rol), 2);
    assign(t, 0x26, "ROL", M::ZeroPage, Op::Unary(Un::Rol), 5);
    assign(t, 0x36, "ROL", M::ZeroPageX, Op::Unary(Un::Rol), 6);
    assign(t, 0x2E, "ROL", M::Absolute, Op::Unary(Un::Rol), 6);
    assign(t, 0x3E, "ROL", M::AbsoluteX, Op::Unary(Un::Rol), 7);
    assign(t, 0x6A, "ROR", M::Accumulator, Op::Unary(Un::Ror), 2);
    assign(t, 0x66, "ROR", M::ZeroPage, Op::Unary(Un::Ror), 5);
    assign(t, 0x76, "ROR", M::ZeroPageX, Op::Unary(Un::Ror), 6);
    assign(t, 0x6E, "ROR", M::Absolute, Op::Unary(Un::Ror), 6);
    assign(t, 0x7E, "ROR", M::AbsoluteX, Op::Unary(Un::Ror), 7);

    // Unary ALU: memory increment/decrement
    assign(t, 0xE6, "INC", M::ZeroPage, Op::Unary(Un::Inc), 5);
    assign(t, 0xF6, "INC", M::ZeroPageX, Op::Unary(Un::Inc), 6);
    assign(t, 0xEE, "INC", M::Absolute, Op::Unary(Un::Inc), 6);
    assign(t, 0xFE, "INC", M::AbsoluteX, Op::Unary(Un::Inc), 7);
    assign(t, 0xC6, "DEC", M::ZeroPage, Op::Unary(Un::Dec), 5);
    assign(t, 0xD6, "DEC", M::ZeroPageX, Op::Unary(Un::Dec), 6);
    assign(t, 0xCE, "DEC", M::Absolute, Op::Unary(Un::Dec), 6);
    assign(t, 0xDE, "DEC", M::AbsoluteX, Op::Unary(Un::Dec), 7);

    // Register increment/decrement
    assign(t, 0xE8, "INX", M::Implied, Op::StepRegister { reg: X, delta: 1 }, 2);
    assign(t, 0xC8, "INY", M::Implied, Op::StepRegister { reg: Y, delta: 1 }, 2);
    assign(t, 0xCA, "DEX", M::Implied, Op::StepRegister { reg: X, delta: -1 }, 2);
    assign(t, 0x88, "DEY", M::Implied, Op::StepRegister { reg: Y, delta: -1 }, 2);

    // Branches
    assign(t, 0x10, "BPL", M::Relative, Op::Branch { flag: N, taken_if_set: false }, 2);
    assign(t, 0x30, "BMI", M::Relative, Op::Branch { flag: N, taken_if_set: true }, 2);
    assign(t, 0x50, "BVC", M::Relative, Op::Branch { flag: V, taken_if_set: false }, 2);
    assign(t, 0x70, "BVS", M::Relative, Op::Branch { flag: V, taken_if_set: true }, 2);
    assign(t, 0x90, "BCC", M::Relative, Op::Branch { flag: C, taken_if_set: false }, 2);
    assign(t, 0xB0, "BCS", M::Relative, Op::Branch { flag: C, taken_if_set: true }, 2);
    assign(t, 0xD0, "BNE", M::Relative, Op::Branch { flag: Z, taken_if_set: false }, 2);
    assign(t, 0xF0, "BEQ", M::Relative, Op::Branch { flag: Z, taken_if_set: true }, 2);

    // Stack
    assign(t, 0x48, "PHA", M::Implied, Op::Push(Slot::Accumulator), 3);
    assign(t, 0x08, "PHP", M::Implied, Op::Push(Slot::Status), 3);
    assign(t, 0x68, "PLA", M::Implied, Op::Pull(Slot::Accumulator), 4);
    assign(t, 0x28, "PLP", M::Implied, Op::Pull(Slot::Status), 4);

    // Control transfer
    assign(t, 0x4C, "JMP", M::Absolute, Op::Jump, 3);
    assign(t, 0x6C, "JMP", M::Indirect, Op::Jump, 5);
    assign(t, 0x20, "JSR", M::Absolute, Op::JumpSub, 6);
    assign(t, 0x60, "RTS", M::Implied, Op::ReturnSub, 6);
    assign(t, 0x40, "RTI", M::Implied, Op::ReturnInt, 6);
    assign(t, 0x00, "BRK", M::Implied, Op::Break, 7);

    // Flag set/clear
    assign(t, 0x18, "CLC", M::Implied, Op::SetFlag { flag: C, value: false }, 2);
    assign(t, 0x38, "SEC", M::Implied, Op::SetFlag { flag: C, value: true }, 2);
    assign(t, 0x58, "CLI", M::Implied, Op::SetFlag { flag: I, value: false }, 2);
    assign(t, 0x78, "SEI", M::Implied, Op::SetFlag { flag: I, value: true }, 2);
    assign(t, 0xB8, "CLV", M::Implied, Op::SetFlag { flag: V, value: false }, 2);
    assign(t, 0xD8, "CLD", M::Implied, Op::SetFlag { flag: D, value: false }, 2);
    assign(t, 0xF8, "SED", M::Implied, Op::SetFlag { flag: D, value: true }, 2);

    assign(t, 0xEA, "NOP", M::Implied, Op::Nop, 2);

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_assigns_all_documented_opcodes() {
        let table = opcode_table();
        let documented = table.iter().filter(|i| i.mnemonic != "???").count();
        assert_eq!(documented, 151);
    }

    #[test]
    fn every_entry_decodes_its_own_opcode() {
        let table = opcode_table();
        for (i, entry) in table.iter().enumerate() {
            assert_eq!(usize::from(entry.opcode), i);
            assert!((1..=3).contains(&entry.length()));
        }
    }

    #[test]
    fn invalid_entries_are_one_byte() {
        let table = opcode_table();
        let jam = table[0x02];
        assert_eq!(jam.operation, Operation::Invalid);
        assert_eq!(jam.length(), 1);
        assert_eq!(jam.mnemonic, "???");
    }

    #[test]
    fn spot_check_known_encodings() {
        let table = opcode_table();
        assert_eq!(table[0xA9].mnemonic, "LDA");
        assert_eq!(table[0xA9].mode, AddressingMode::Immediate);
        assert_eq!(table[0xA9].length(), 2);
        assert_eq!(table[0x6C].mode, AddressingMode::Indirect);
        assert_eq!(table[0x6C].length(), 3);
        assert_eq!(table[0x00].operation, Operation::Break);
        assert_eq!(table[0x91].cycles, 6);
    }
}
