//! Execution watchers and breakpoints.
//!
//! A watcher is notified synchronously during `step()` when the PC hits a
//! registered breakpoint, when an invalid opcode is dispatched, and when
//! an NMI is serviced. Watchers get full register access and may mutate
//! state (the step engine re-reads PC after notification), but they are
//! not part of the instruction control flow.

use crate::Registers;

/// Callbacks fired synchronously by the step engine.
///
/// All methods default to no-ops so a watcher only overrides what it
/// cares about.
pub trait Watcher {
    /// PC matched a registered breakpoint, before the opcode fetch.
    fn on_breakpoint(&mut self, _regs: &mut Registers) {}

    /// An unassigned opcode was dispatched. PC already points past it.
    fn on_invalid_opcode(&mut self, _regs: &mut Registers) {}

    /// A non-maskable interrupt was serviced; PC holds the vector target.
    fn on_nmi(&mut self, _regs: &mut Registers) {}
}

/// Handle returned by watcher registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherId(u32);

/// Id-keyed subscriber list.
pub(crate) struct WatcherRegistry {
    entries: Vec<(WatcherId, Box<dyn Watcher>)>,
    next_id: u32,
}

impl WatcherRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub(crate) fn add(&mut self, watcher: Box<dyn Watcher>) -> WatcherId {
        let id = WatcherId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, watcher));
        id
    }

    /// Remove the watcher with the given id. Returns false if unknown.
    pub(crate) fn remove(&mut self, id: WatcherId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn notify_breakpoint(&mut self, regs: &mut Registers) {
        for (_, watcher) in &mut self.entries {
            watcher.on_breakpoint(regs);
        }
    }

    pub(crate) fn notify_invalid_opcode(&mut self, regs: &mut Registers) {
        for (_, watcher) in &mut self.entries {
            watcher.on_invalid_opcode(regs);
        }
    }

    pub(crate) fn notify_nmi(&mut self, regs: &mut Registers) {
        for (_, watcher) in &mut self.entries {
            watcher.on_nmi(regs);
        }
    }
}
