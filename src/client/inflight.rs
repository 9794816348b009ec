use std::sync::Mutex;

/// Single-slot record of the command currently in flight.
///
/// `begin` overwrites unconditionally; `end` clears only if the slot still
/// holds the caller's label, so a slow command finishing late cannot erase
/// the label of a newer one. Concurrent commands share the slot and the
/// tracker shows only the most recently started, not-yet-superseded one.
#[derive(Debug, Default)]
pub struct InFlightTracker {
    slot: Mutex<String>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, label: &str) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.clear();
        slot.push_str(label);
    }

    /// Compare-and-clear. Returns whether the slot was cleared.
    pub fn end(&self, label: &str) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if *slot == label {
            slot.clear();
            true
        } else {
            false
        }
    }

    /// Label of the current command, empty when idle.
    pub fn current(&self) -> String {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_idle(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }
}

/// Ends its label on drop, so a unit of work that errors or panics still
/// releases the slot.
pub(crate) struct InFlightGuard<'a> {
    tracker: &'a InFlightTracker,
    label: &'a str,
}

impl<'a> InFlightGuard<'a> {
    pub(crate) fn begin(tracker: &'a InFlightTracker, label: &'a str) -> Self {
        tracker.begin(label);
        Self { tracker, label }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.tracker.end(self.label);
    }
}
