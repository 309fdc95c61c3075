//! Activity tracking for controller slot indicators
//!
//! Holds one decaying activity record per controller slot. An input event
//! lights the slot for a fixed time-to-live; every update tick counts the
//! remaining time down and clears the slot once it reaches zero.

use tracing::trace;

/// Maximum number of controller slots tracked
pub const MAX_PLAYERS: usize = 8;

/// How long a slot stays lit after its last input (milliseconds)
pub const PAD_TIMEOUT_MS: u32 = 150;

/// Classification of a slot's most recent input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivityKind {
    #[default]
    None,
    /// Ordinary button/hat input
    Active,
    /// Input mapped to the reserved hotkey
    Hotkey,
}

/// Activity record for a single controller slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerSlot {
    pub kind: ActivityKind,
    pub remaining_ms: u32,
}

impl ControllerSlot {
    /// Check if the slot currently shows activity
    pub fn is_active(&self) -> bool {
        self.kind != ActivityKind::None
    }

    fn clear(&mut self) {
        self.kind = ActivityKind::None;
        self.remaining_ms = 0;
    }
}

/// Activity tracker for all controller slots
///
/// Last write wins: a new event on a lit slot overwrites its kind and
/// restarts its timeout.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    slots: [ControllerSlot; MAX_PLAYERS],

    /// Time-to-live applied on every input event
    timeout_ms: u32,
}

impl ActivityTracker {
    /// Create a tracker with every slot idle
    ///
    /// # Arguments
    /// * `timeout_ms` - How long a slot stays lit after an input event
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            slots: [ControllerSlot::default(); MAX_PLAYERS],
            // A zero timeout would leave a lit slot with nothing to decay
            timeout_ms: timeout_ms.max(1),
        }
    }

    /// Record an input on `slot`
    ///
    /// Out-of-range slots are ignored.
    pub fn record(&mut self, slot: usize, is_hotkey: bool) {
        let timeout_ms = self.timeout_ms;
        let Some(pad) = self.slots.get_mut(slot) else {
            trace!("Ignoring activity for out-of-range slot {}", slot);
            return;
        };

        pad.kind = if is_hotkey {
            ActivityKind::Hotkey
        } else {
            ActivityKind::Active
        };
        pad.remaining_ms = timeout_ms;

        trace!("Activity: slot {} {:?}", slot, pad.kind);
    }

    /// Decay every lit slot by `delta_ms`
    pub fn tick(&mut self, delta_ms: u32) {
        for pad in self.slots.iter_mut().filter(|pad| pad.remaining_ms > 0) {
            pad.remaining_ms = pad.remaining_ms.saturating_sub(delta_ms);
            if pad.remaining_ms == 0 {
                pad.clear();
            }
        }
    }

    /// Get the record for `slot`, if in range
    pub fn slot(&self, slot: usize) -> Option<&ControllerSlot> {
        self.slots.get(slot)
    }

    /// Current activity kind for `slot` (`None` when out of range)
    pub fn kind(&self, slot: usize) -> ActivityKind {
        self.slot(slot).map(|pad| pad.kind).unwrap_or_default()
    }

    /// Get all slots (immutable)
    pub fn slots(&self) -> &[ControllerSlot] {
        &self.slots
    }

    /// Return every slot to idle
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(ControllerSlot::clear);
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new(PAD_TIMEOUT_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_activity_tracking() {
        let mut tracker = ActivityTracker::default();

        tracker.record(2, false);
        assert_eq!(tracker.kind(2), ActivityKind::Active);
        assert_eq!(tracker.slot(2).unwrap().remaining_ms, PAD_TIMEOUT_MS);

        // Other slots untouched
        assert_eq!(tracker.kind(1), ActivityKind::None);

        tracker.tick(100);
        assert_eq!(tracker.kind(2), ActivityKind::Active);

        tracker.tick(49);
        assert_eq!(tracker.kind(2), ActivityKind::Active);

        tracker.tick(1);
        assert_eq!(tracker.kind(2), ActivityKind::None);
        assert_eq!(tracker.slot(2).unwrap().remaining_ms, 0);
    }

    #[test]
    fn test_hotkey_overwrites_active() {
        let mut tracker = ActivityTracker::default();

        tracker.record(0, false);
        tracker.tick(100);
        tracker.record(0, true);

        let pad = tracker.slot(0).unwrap();
        assert_eq!(pad.kind, ActivityKind::Hotkey);
        assert_eq!(pad.remaining_ms, PAD_TIMEOUT_MS);
    }

    #[test]
    fn test_large_delta_saturates() {
        let mut tracker = ActivityTracker::default();
        tracker.record(3, true);
        tracker.tick(10_000);

        let pad = tracker.slot(3).unwrap();
        assert_eq!(pad.kind, ActivityKind::None);
        assert_eq!(pad.remaining_ms, 0);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut tracker = ActivityTracker::default();
        tracker.record(MAX_PLAYERS, false);
        tracker.record(usize::MAX, true);

        assert!(tracker.slots().iter().all(|pad| !pad.is_active()));
        assert_eq!(tracker.kind(MAX_PLAYERS), ActivityKind::None);
    }

    #[test]
    fn test_reset() {
        let mut tracker = ActivityTracker::default();
        tracker.record(0, false);
        tracker.record(7, true);
        tracker.reset();

        assert!(tracker.slots().iter().all(|pad| *pad == ControllerSlot::default()));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Record { slot: usize, hotkey: bool },
        Tick(u32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..MAX_PLAYERS + 2, any::<bool>()).prop_map(|(slot, hotkey)| Op::Record { slot, hotkey }),
            (0u32..400).prop_map(Op::Tick),
        ]
    }

    proptest! {
        #[test]
        fn prop_idle_iff_timeout_elapsed(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut tracker = ActivityTracker::default();
            for op in ops {
                match op {
                    Op::Record { slot, hotkey } => tracker.record(slot, hotkey),
                    Op::Tick(delta) => tracker.tick(delta),
                }
                for pad in tracker.slots() {
                    prop_assert_eq!(pad.remaining_ms == 0, pad.kind == ActivityKind::None);
                    prop_assert!(pad.remaining_ms <= PAD_TIMEOUT_MS);
                }
            }
        }

        #[test]
        fn prop_decay_boundary(ticks in prop::collection::vec(1u32..60, 1..16), hotkey in any::<bool>()) {
            let mut tracker = ActivityTracker::default();
            tracker.record(1, hotkey);

            let mut elapsed = 0u32;
            for delta in ticks {
                tracker.tick(delta);
                elapsed += delta;
                if elapsed < PAD_TIMEOUT_MS {
                    prop_assert!(tracker.slot(1).unwrap().is_active());
                } else {
                    prop_assert_eq!(tracker.kind(1), ActivityKind::None);
                }
            }
        }
    }
}
