//! Latest-wins mailbox between the receive loop and the tick loop.
//!
//! The slot is lossy: a new command replaces any unread one, so a
//! burst of commands arriving between two ticks collapses to the last of
//! them. Staleness is bounded by one tick and nothing is ever queued.

use parking_lot::Mutex;
use robot_runtime::Command;

#[derive(Debug, Default)]
pub struct LatestCommandSlot {
    pending: Mutex<Option<Command>>,
}

impl LatestCommandSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the pending command, returning the one that was discarded.
    pub fn publish(&self, command: Command) -> Option<Command> {
        self.pending.lock().replace(command)
    }

    /// Move the pending command out, leaving the slot empty.
    pub fn take(&self) -> Option<Command> {
        self.pending.lock().take()
    }

    pub fn peek(&self) -> Option<Command> {
        *self.pending.lock()
    }
}
