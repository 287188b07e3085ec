//! Core traits and types for memory-mapped emulation.
//!
//! Every component that responds to a numeric offset (RAM, ROM, a
//! peripheral register block) is an [`AddressBus`]. Larger memory maps
//! are composed in an [`AddressSpace`] arena, where sharing a backing
//! store between two views is explicit index aliasing, not pointer
//! aliasing.

mod bus;
mod observable;
mod space;

pub use bus::{AddressBus, SimpleBus};
pub use observable::{Observable, Value};
pub use space::{AddressSpace, BusId};
