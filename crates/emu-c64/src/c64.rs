//! Top-level C64 system.
//!
//! Owns the CPU and the banked bus, and wires the CIA interrupt
//! callbacks to the CPU's pending-interrupt latches: CIA1 drives IRQ,
//! CIA2 drives NMI. Each `step()` runs one instruction, feeds the cycle
//! count to both CIAs, then services any pending interrupt.

use mos_6502::Mos6502;
use mos_cia_6526::Cia;

use crate::config::C64Config;
use crate::io::IoBlock;
use crate::memory::CpuAddressBus;

/// C64 system.
pub struct C64 {
    cpu: Mos6502,
    bus: CpuAddressBus<IoBlock>,
}

impl C64 {
    /// Create a new C64 from the given configuration.
    ///
    /// The CPU comes up through the reset path, so PC holds the Kernal
    /// reset vector from `$FFFC`.
    ///
    /// # Panics
    ///
    /// Panics if the ROM images have the wrong sizes.
    #[must_use]
    pub fn new(config: &C64Config) -> Self {
        let frequency = config.model.cpu_frequency();
        let mut io = IoBlock::new(Cia::new(frequency), Cia::new(frequency));

        let cpu = Mos6502::new();
        let irq_line = cpu.interrupt_line();
        let nmi_line = cpu.interrupt_line();
        io.cia1_mut()
            .set_interrupt_handler(move || irq_line.raise_irq());
        io.cia2_mut()
            .set_interrupt_handler(move || nmi_line.raise_nmi());

        // CIA2 port A: bits 0-1 drive the VIC bank, default bank 0
        io.cia2_mut().write(0x02, 0x03); // DDR A: bits 0-1 output
        io.cia2_mut().write(0x00, 0x03); // %11 inverted → bank 0

        let bus = CpuAddressBus::new(&config.basic_rom, &config.char_rom, &config.kernal_rom, io);

        let mut c64 = Self { cpu, bus };
        c64.cpu.trigger_reset();
        c64.cpu.handle_interrupts(&mut c64.bus);
        c64
    }

    /// Execute one instruction, advance the CIAs by its cycle count, and
    /// service pending interrupts. Returns the cycles consumed.
    pub fn step(&mut self) -> u32 {
        let cycles = self.cpu.step(&mut self.bus);
        self.bus.io_mut().update(cycles);
        self.cpu.handle_interrupts(&mut self.bus);
        cycles
    }

    /// Run until at least `budget` cycles have elapsed. Returns the
    /// cycles actually consumed (instruction granularity can overshoot).
    pub fn run_for(&mut self, budget: u64) -> u64 {
        let mut elapsed = 0;
        while elapsed < budget {
            elapsed += u64::from(self.step());
        }
        elapsed
    }

    /// The CPU, for register inspection.
    pub fn cpu(&self) -> &Mos6502 {
        &self.cpu
    }

    /// Mutable CPU access (breakpoints, watchers, interrupt lines).
    pub fn cpu_mut(&mut self) -> &mut Mos6502 {
        &mut self.cpu
    }

    /// The banked bus.
    pub fn bus(&self) -> &CpuAddressBus<IoBlock> {
        &self.bus
    }

    /// Mutable bus access.
    pub fn bus_mut(&mut self) -> &mut CpuAddressBus<IoBlock> {
        &mut self.bus
    }

    /// VIC bank (0-3) selected by CIA2 port A bits 0-1, inverted.
    #[must_use]
    pub fn vic_bank(&self) -> u8 {
        !self.bus.io().cia2().port_a_output() & 0x03
    }

    /// Disassembly preview of the instruction at PC.
    pub fn disassemble(&mut self) -> String {
        self.cpu.disassemble(&mut self.bus)
    }
}
