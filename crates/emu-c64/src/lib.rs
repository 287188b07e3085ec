//! Commodore 64 processing core.
//!
//! The 6510 CPU, the banked 64K memory map, and the two CIA chips, wired
//! together the way the board wires them: CIA1 interrupts on IRQ, CIA2
//! on NMI, the 6510 port at $00/$01 switching ROM and I/O banks. Video,
//! audio and input devices are outside this core; their register ranges
//! read as open bus.

mod c64;
mod config;
mod io;
mod memory;

pub use c64::C64;
pub use config::{C64Config, C64Model};
pub use io::IoBlock;
pub use memory::CpuAddressBus;
