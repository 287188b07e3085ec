//! Pending-interrupt latches and the shared line handle.
//!
//! Peripherals raise interrupts through a cloned [`InterruptLine`]; the
//! CPU owns the same latch and services it from `handle_interrupts`.
//! Everything here is single-threaded by design: callbacks set latches
//! on shared state and must not be invoked from more than one logical
//! thread.

use std::cell::Cell;
use std::rc::Rc;

/// Reset pending bit.
pub(crate) const RESET: u8 = 0b0000_0001;
/// Non-maskable interrupt pending bit.
pub(crate) const NMI: u8 = 0b0000_0010;
/// Maskable interrupt request pending bit.
pub(crate) const IRQ: u8 = 0b0000_0100;

/// Handle to the CPU's pending-interrupt latches.
///
/// Cloning is cheap and every clone refers to the same latches, so a
/// peripheral callback can capture one and raise lines without holding a
/// reference to the CPU itself.
#[derive(Clone, Default)]
pub struct InterruptLine {
    pending: Rc<Cell<u8>>,
}

impl InterruptLine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch a reset request.
    pub fn raise_reset(&self) {
        self.raise(RESET);
    }

    /// Latch a non-maskable interrupt.
    pub fn raise_nmi(&self) {
        self.raise(NMI);
    }

    /// Latch a maskable interrupt request.
    pub fn raise_irq(&self) {
        self.raise(IRQ);
    }

    fn raise(&self, bit: u8) {
        self.pending.set(self.pending.get() | bit);
    }

    /// Current pending bitmask (reset/NMI/IRQ), for observation.
    #[must_use]
    pub fn pending(&self) -> u8 {
        self.pending.get()
    }

    /// True if `bit` is latched; clears it when set.
    pub(crate) fn take(&self, bit: u8) -> bool {
        let value = self.pending.get();
        if value & bit == 0 {
            return false;
        }
        self.pending.set(value & !bit);
        true
    }

    /// True if `bit` is latched, without clearing.
    pub(crate) fn is_raised(&self, bit: u8) -> bool {
        self.pending.get() & bit != 0
    }
}
