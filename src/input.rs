//! Input events and player-to-device mapping consumed by the widget
//!
//! Device enumeration lives outside this crate; the widget only sees a
//! stream of already-classified events and a per-frame mapping snapshot.

use std::collections::BTreeMap;

use crate::activity::MAX_PLAYERS;

/// Type of an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Button,
    Hat,
    /// Axes and anything else; never lights a slot
    Other,
}

/// A single input event from a mapped device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    /// Device index, `-1` when the source device is unknown
    pub device_index: i32,
    pub kind: InputKind,
    /// Whether the input is bound to the reserved hotkey
    pub is_hotkey: bool,
}

impl InputEvent {
    pub fn button(device_index: i32, is_hotkey: bool) -> Self {
        Self {
            device_index,
            kind: InputKind::Button,
            is_hotkey,
        }
    }

    pub fn hat(device_index: i32) -> Self {
        Self {
            device_index,
            kind: InputKind::Hat,
            is_hotkey: false,
        }
    }

    /// Activity slot this event lights, if any
    ///
    /// Only button and hat events from a known device count.
    pub fn activity_slot(&self) -> Option<usize> {
        match self.kind {
            InputKind::Button | InputKind::Hat => usize::try_from(self.device_index).ok(),
            InputKind::Other => None,
        }
    }
}

/// Snapshot of which device each player slot is currently driven by
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerMapping {
    players: BTreeMap<usize, i32>,
}

impl PlayerMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `player` to `device_index`, replacing any previous mapping
    pub fn assign(&mut self, player: usize, device_index: i32) {
        self.players.insert(player, device_index);
    }

    pub fn unassign(&mut self, player: usize) {
        self.players.remove(&player);
    }

    pub fn device_for(&self, player: usize) -> Option<i32> {
        self.players.get(&player).copied()
    }

    /// Activity slots to display, in player order
    ///
    /// Players beyond `MAX_PLAYERS` and devices outside `0..MAX_PLAYERS`
    /// are skipped.
    pub fn active_slots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..MAX_PLAYERS).filter_map(|player| {
            let device = self.device_for(player)?;
            usize::try_from(device).ok().filter(|idx| *idx < MAX_PLAYERS)
        })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl FromIterator<(usize, i32)> for PlayerMapping {
    fn from_iter<T: IntoIterator<Item = (usize, i32)>>(iter: T) -> Self {
        Self {
            players: iter.into_iter().collect(),
        }
    }
}
