//! I/O block at $D000-$DFFF.
//!
//! Routes the CIA pages to the two chips; everything else in the range
//! (VIC-II, SID, colour RAM, expansion) is outside this core and reads
//! as open bus.

use emu_core::AddressBus;
use mos_cia_6526::Cia;

/// The 4K I/O device block.
pub struct IoBlock {
    cia1: Cia,
    cia2: Cia,
}

impl IoBlock {
    #[must_use]
    pub fn new(cia1: Cia, cia2: Cia) -> Self {
        Self { cia1, cia2 }
    }

    /// Advance both CIAs by `cycles` CPU cycles.
    pub fn update(&mut self, cycles: u32) {
        self.cia1.update(cycles);
        self.cia2.update(cycles);
    }

    pub fn cia1(&self) -> &Cia {
        &self.cia1
    }

    pub fn cia1_mut(&mut self) -> &mut Cia {
        &mut self.cia1
    }

    pub fn cia2(&self) -> &Cia {
        &self.cia2
    }

    pub fn cia2_mut(&mut self) -> &mut Cia {
        &mut self.cia2
    }
}

impl AddressBus for IoBlock {
    fn read(&mut self, offset: u16) -> u8 {
        match offset & 0x0FFF {
            // CIA registers mirror through their page
            0x0C00..=0x0CFF => self.cia1.read((offset & 0x0F) as u8),
            0x0D00..=0x0DFF => self.cia2.read((offset & 0x0F) as u8),
            _ => 0xFF, // open bus
        }
    }

    fn write(&mut self, offset: u16, value: u8) {
        match offset & 0x0FFF {
            0x0C00..=0x0CFF => self.cia1.write((offset & 0x0F) as u8, value),
            0x0D00..=0x0DFF => self.cia2.write((offset & 0x0F) as u8, value),
            _ => {} // ignored
        }
    }

    fn size(&self) -> u32 {
        0x1000
    }
}
