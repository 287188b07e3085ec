//! CIA 6526 Complex Interface Adapter.
//!
//! Two identical CIAs in the C64:
//! - CIA1 ($DC00-$DC0F): keyboard scanning, joystick, Timer A/B → IRQ
//! - CIA2 ($DD00-$DD0F): VIC-II bank, serial bus, Timer A/B → NMI
//!
//! # Registers (per CIA)
//!
//! | Reg | Read               | Write               |
//! |-----|--------------------|---------------------|
//! | $x0 | Port A data        | Port A data         |
//! | $x1 | Port B data        | Port B data         |
//! | $x2 | Port A DDR         | Port A DDR          |
//! | $x3 | Port B DDR         | Port B DDR          |
//! | $x4 | Timer A low (cnt)  | Timer A low (latch) |
//! | $x5 | Timer A high (cnt) | Timer A high (latch)|
//! | $x6 | Timer B low (cnt)  | Timer B low (latch) |
//! | $x7 | Timer B high (cnt) | Timer B high (latch)|
//! | $x8 | TOD 10ths (release)| TOD 10ths (commit)  |
//! | $x9 | TOD seconds        | TOD seconds         |
//! | $xA | TOD minutes        | TOD minutes         |
//! | $xB | TOD hours (latch)  | TOD hours           |
//! | $xC | Serial shift reg   | Serial shift reg    |
//! | $xD | ICR (read/clear)   | ICR (set/clear mask)|
//! | $xE | Control reg A      | Control reg A       |
//! | $xF | Control reg B      | Control reg B       |

mod cia;
mod timer;
mod tod;

pub use cia::{Cia, INT_ALARM, INT_TIMER_A, INT_TIMER_B};
