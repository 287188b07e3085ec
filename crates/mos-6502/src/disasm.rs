//! Disassembly preview.
//!
//! Formats the instruction at PC as address + raw bytes + mnemonic +
//! operand without committing the fetch: PC is restored unconditionally,
//! so the preview is control-flow-free. An optional symbol resolver maps
//! 16-bit operand addresses to labels; `None` is simply "no label".

use emu_core::AddressBus;

use crate::Mos6502;
use crate::instruction::AddressingMode;

impl Mos6502 {
    /// Disassemble the instruction at PC, e.g. `$C000  A9 59     LDA #$59`.
    pub fn disassemble<B: AddressBus>(&mut self, bus: &mut B) -> String {
        self.disassemble_with_symbols(bus, |_| None)
    }

    /// Disassemble the instruction at PC, labelling 16-bit operand
    /// addresses through `resolve`.
    pub fn disassemble_with_symbols<B: AddressBus>(
        &mut self,
        bus: &mut B,
        resolve: impl Fn(u16) -> Option<String>,
    ) -> String {
        let saved = self.regs.pc;
        let text = self.render(bus, &resolve);
        // Preview only: the fetch never commits.
        self.regs.pc = saved;
        text
    }

    fn render<B: AddressBus>(
        &mut self,
        bus: &mut B,
        resolve: &dyn Fn(u16) -> Option<String>,
    ) -> String {
        let start = self.regs.pc;
        let opcode = self.fetch(bus);
        let instr = self.table[opcode as usize];

        let mut bytes = vec![opcode];
        for _ in 0..instr.mode.operand_bytes() {
            bytes.push(self.fetch(bus));
        }

        let operand = format_operand(instr.mode, &bytes, self.regs.pc, resolve);
        let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02X}")).collect();
        let hex = hex.join(" ");

        format!("${start:04X}  {hex:<8}  {}{operand}", instr.mnemonic)
    }
}

/// Format the operand field. `next_pc` is the address of the following
/// instruction (branch offsets are relative to it).
fn format_operand(
    mode: AddressingMode,
    bytes: &[u8],
    next_pc: u16,
    resolve: &dyn Fn(u16) -> Option<String>,
) -> String {
    let byte = || bytes[1];
    let word = || u16::from_le_bytes([bytes[1], bytes[2]]);
    let label = |addr: u16| resolve(addr).unwrap_or_else(|| format!("${addr:04X}"));

    match mode {
        AddressingMode::Implied => String::new(),
        AddressingMode::Accumulator => " A".to_string(),
        AddressingMode::Immediate => format!(" #${:02X}", byte()),
        AddressingMode::ZeroPage => format!(" ${:02X}", byte()),
        AddressingMode::ZeroPageX => format!(" ${:02X},X", byte()),
        AddressingMode::ZeroPageY => format!(" ${:02X},Y", byte()),
        AddressingMode::Absolute => format!(" {}", label(word())),
        AddressingMode::AbsoluteX => format!(" {},X", label(word())),
        AddressingMode::AbsoluteY => format!(" {},Y", label(word())),
        AddressingMode::Indirect => format!(" (${:04X})", word()),
        AddressingMode::IndexedIndirect => format!(" (${:02X},X)", byte()),
        AddressingMode::IndirectIndexed => format!(" (${:02X}),Y", byte()),
        AddressingMode::Relative => {
            let target = next_pc.wrapping_add(byte() as i8 as u16);
            format!(" {}", label(target))
        }
    }
}
