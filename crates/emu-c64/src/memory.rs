//! C64 banked memory map.
//!
//! 64K RAM with overlaid ROMs and I/O, controlled by the 6510's internal
//! I/O port at $00 (DDR) and $01 (data register).
//!
//! # Banking
//!
//! Port $01 bits 0-2 control which ROMs and I/O are visible:
//!
//! | HIRAM(2) | LORAM(1) | CHAREN(0) | $A000-$BFFF | $D000-$DFFF | $E000-$FFFF |
//! |----------|----------|-----------|-------------|-------------|-------------|
//! | 1        | 1        | 1         | BASIC       | I/O         | Kernal      |
//! | 1        | 1        | 0         | BASIC       | Char ROM    | Kernal      |
//! | 1        | 0        | x         | RAM         | I/O         | Kernal      |
//! | 0        | 1        | x         | RAM         | I/O         | RAM         |
//! | 0        | 0        | x         | RAM         | RAM         | RAM         |
//!
//! RAM and the ROMs live in an [`AddressSpace`] arena; each ROM's write
//! target is an offset view of the same RAM, so a write through a mapped
//! ROM lands in the RAM underneath while reads keep seeing ROM content.

use emu_core::{AddressBus, AddressSpace, BusId};

/// Pull-up value for undriven port bits: LORAM/HIRAM/CHAREN plus the
/// cassette lines float high.
const PORT_PULLUPS: u8 = 0x37;

const LORAM: u8 = 0x01;
const HIRAM: u8 = 0x02;
const CHAREN: u8 = 0x04;

/// Bank-switch overlay over the full 16-bit address space.
///
/// Holds the five children (RAM, BASIC ROM, character ROM, the I/O
/// block, and Kernal ROM) and the 6510 port latches that decide which
/// of them responds to a given address. The I/O child is a type
/// parameter so the machine keeps typed access to its chips.
pub struct CpuAddressBus<Io> {
    space: AddressSpace,
    ram: BusId,
    basic: BusId,
    chargen: BusId,
    kernal: BusId,
    io: Io,
    /// 6510 port: data direction register ($00).
    port_ddr: u8,
    /// 6510 port: data register ($01).
    port_data: u8,
}

impl<Io: AddressBus> CpuAddressBus<Io> {
    /// Build the memory map from ROM images.
    ///
    /// # Panics
    ///
    /// Panics if ROM sizes are incorrect.
    #[must_use]
    pub fn new(basic_rom: &[u8], char_rom: &[u8], kernal_rom: &[u8], io: Io) -> Self {
        assert!(basic_rom.len() == 8192, "BASIC ROM must be 8192 bytes");
        assert!(char_rom.len() == 4096, "Character ROM must be 4096 bytes");
        assert!(kernal_rom.len() == 8192, "Kernal ROM must be 8192 bytes");

        let mut space = AddressSpace::new();
        let ram = space.memory(0x10000);
        // Writes through a mapped ROM land in the RAM underneath it.
        let basic_under = space.offset(ram, 0xA000);
        let basic = space.rom(basic_rom, basic_under);
        let chargen_under = space.offset(ram, 0xD000);
        let chargen = space.rom(char_rom, chargen_under);
        let kernal_under = space.offset(ram, 0xE000);
        let kernal = space.rom(kernal_rom, kernal_under);

        Self {
            space,
            ram,
            basic,
            chargen,
            kernal,
            io,
            port_ddr: 0x2F,  // Default: bits 0-3,5 output
            port_data: 0x37, // Default: all ROMs + I/O visible
        }
    }

    /// Effective port value: driven bits from the data register,
    /// undriven bits from the pull-ups.
    fn effective_port(&self) -> u8 {
        (self.port_data & self.port_ddr) | (PORT_PULLUPS & !self.port_ddr)
    }

    /// LORAM bit: BASIC ROM visible when set (with HIRAM).
    fn loram(&self) -> bool {
        self.effective_port() & LORAM != 0
    }

    /// HIRAM bit: Kernal ROM visible when set.
    fn hiram(&self) -> bool {
        self.effective_port() & HIRAM != 0
    }

    /// CHAREN bit: I/O visible when set, Char ROM when clear.
    fn charen(&self) -> bool {
        self.effective_port() & CHAREN != 0
    }

    fn basic_mapped(&self) -> bool {
        self.loram() && self.hiram()
    }

    fn kernal_mapped(&self) -> bool {
        self.hiram()
    }

    /// Is the I/O block visible at $D000-$DFFF?
    fn io_mapped(&self) -> bool {
        self.charen() && (self.loram() || self.hiram())
    }

    /// Is char ROM visible at $D000-$DFFF?
    fn chargen_mapped(&self) -> bool {
        !self.charen() && self.loram() && self.hiram()
    }

    /// The I/O block child.
    pub fn io(&self) -> &Io {
        &self.io
    }

    /// Mutable access to the I/O block child.
    pub fn io_mut(&mut self) -> &mut Io {
        &mut self.io
    }

    /// Direct RAM read, bypassing the overlay (for debugging and
    /// program loading).
    pub fn ram_read(&mut self, addr: u16) -> u8 {
        self.space.read(self.ram, addr)
    }

    /// Direct RAM write, bypassing the overlay.
    pub fn ram_write(&mut self, addr: u16, value: u8) {
        self.space.write(self.ram, addr, value);
    }
}

impl<Io: AddressBus> AddressBus for CpuAddressBus<Io> {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000 => self.port_ddr,
            0x0001 => self.effective_port(),
            0xA000..=0xBFFF if self.basic_mapped() => self.space.read(self.basic, addr - 0xA000),
            0xD000..=0xDFFF if self.io_mapped() => self.io.read(addr - 0xD000),
            0xD000..=0xDFFF if self.chargen_mapped() => {
                self.space.read(self.chargen, addr - 0xD000)
            }
            0xE000..=0xFFFF if self.kernal_mapped() => self.space.read(self.kernal, addr - 0xE000),
            _ => self.space.read(self.ram, addr),
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            // Port writes update the banking latches and land in RAM too
            0x0000 => {
                self.port_ddr = value;
                self.space.write(self.ram, addr, value);
            }
            0x0001 => {
                self.port_data = value;
                self.space.write(self.ram, addr, value);
            }
            0xD000..=0xDFFF if self.io_mapped() => self.io.write(addr - 0xD000, value),
            0xD000..=0xDFFF if self.chargen_mapped() => {
                // The ROM node forwards this into the RAM underneath
                self.space.write(self.chargen, addr - 0xD000, value);
            }
            _ => self.space.write(self.ram, addr, value),
        }
    }

    fn size(&self) -> u32 {
        0x10000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    // A SimpleBus stands in for the I/O block; offset $C00 maps where
    // CIA1 would sit.
    fn make_bus() -> CpuAddressBus<SimpleBus> {
        let basic = vec![0xBB; 8192];
        let chargen = vec![0xCC; 4096];
        let kernal = vec![0xEE; 8192];
        CpuAddressBus::new(&basic, &chargen, &kernal, SimpleBus::new())
    }

    #[test]
    fn default_banking_sees_roms() {
        let mut bus = make_bus();
        // Default $01 = $37: HIRAM=1, LORAM=1, CHAREN=1
        assert_eq!(bus.read(0xA000), 0xBB); // BASIC ROM
        assert_eq!(bus.read(0xE000), 0xEE); // Kernal ROM
    }

    #[test]
    fn writes_go_to_ram_under_rom() {
        let mut bus = make_bus();
        bus.write(0xA000, 0x42);
        // Read still sees BASIC ROM
        assert_eq!(bus.read(0xA000), 0xBB);
        // But RAM has the written value
        assert_eq!(bus.ram_read(0xA000), 0x42);
    }

    #[test]
    fn all_ram_banking() {
        let mut bus = make_bus();
        bus.write(0x0000, 0xFF); // DDR: all output
        bus.write(0x0001, 0x00); // all RAM
        bus.ram_write(0xA000, 0x42);
        bus.ram_write(0xD000, 0x43);
        bus.ram_write(0xE000, 0x44);
        assert_eq!(bus.read(0xA000), 0x42);
        assert_eq!(bus.read(0xD000), 0x43);
        assert_eq!(bus.read(0xE000), 0x44);
    }

    #[test]
    fn char_rom_visible_when_charen_clear() {
        let mut bus = make_bus();
        bus.write(0x0001, 0x36); // HIRAM=1, LORAM=1, CHAREN=0
        assert_eq!(bus.read(0xD000), 0xCC);
    }

    #[test]
    fn char_rom_writes_fall_through_to_ram() {
        let mut bus = make_bus();
        bus.write(0x0001, 0x36);
        bus.write(0xD123, 0x55);
        assert_eq!(bus.read(0xD123), 0xCC, "reads still see char ROM");
        assert_eq!(bus.ram_read(0xD123), 0x55);
    }

    #[test]
    fn io_block_receives_local_offsets() {
        let mut bus = make_bus();
        bus.write(0xDC05, 0x99); // CIA1 area → I/O offset $C05
        assert_eq!(bus.io().peek(0x0C05), 0x99);
        assert_eq!(bus.read(0xDC05), 0x99);
    }

    #[test]
    fn undriven_port_bits_float_high() {
        let mut bus = make_bus();
        bus.write(0x0000, 0x00); // DDR: all input
        bus.write(0x0001, 0x00); // data register all zero, but undriven
        assert_eq!(bus.read(0x0001) & 0x07, 0x07, "pull-ups win");
        assert_eq!(bus.read(0xA000), 0xBB, "ROMs stay mapped");
    }

    #[test]
    fn kernal_unmapped_when_hiram_clear() {
        let mut bus = make_bus();
        bus.write(0x0000, 0xFF);
        bus.write(0x0001, 0x35); // HIRAM=0, LORAM=1, CHAREN=1
        bus.ram_write(0xE000, 0x77);
        bus.ram_write(0xA000, 0x66);
        assert_eq!(bus.read(0xE000), 0x77, "RAM visible at $E000");
        assert_eq!(bus.read(0xA000), 0x66, "BASIC needs HIRAM too");
        assert_eq!(bus.read(0xD000), 0x00, "I/O still mapped (zero-filled stub)");
    }
}
