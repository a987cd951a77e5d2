//! Input state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` returns true every tick the key
//!   is physically down. Movement and jump read this.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the
//!   tick the transition happened, cleared by `end_frame()`. Restart and level
//!   selection read this so holding the key does not reload the level every tick.
//!
//! The simulation never sees `InputState` directly: the host takes an
//! `InputSnapshot` once per tick and passes it down inside the
//! `SimulationContext`.

use std::collections::HashSet;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Left,
    Right,
    Jump,
    Restart,
    Level1,
    Level2,
    Level3,
}

impl Key {
    pub const ALL: &'static [Key] = &[
        Key::Left,
        Key::Right,
        Key::Jump,
        Key::Restart,
        Key::Level1,
        Key::Level2,
        Key::Level3,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Level number selected by this key, if it is a level-select key.
    pub fn level_number(self) -> Option<usize> {
        match self {
            Key::Level1 => Some(1),
            Key::Level2 => Some(2),
            Key::Level3 => Some(3),
            _ => None,
        }
    }
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    /// Replace the held set wholesale, generating press/release edges for the
    /// difference. Replays and headless hosts describe input this way.
    pub fn set_held(&mut self, keys: &[Key]) {
        for &key in Key::ALL {
            if keys.contains(&key) {
                self.key_down(key);
            } else {
                self.key_up(key);
            }
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn snapshot(&self) -> InputSnapshot {
        let mut snapshot = InputSnapshot::default();
        for key in &self.held {
            snapshot.held |= key.bit();
        }
        for key in &self.just_pressed {
            snapshot.pressed |= key.bit();
        }
        snapshot
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable per-tick view of the input, cheap to copy into every update call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    held: u8,
    pressed: u8,
}

impl InputSnapshot {
    /// Snapshot where every key in `keys` is held and was pressed this tick.
    pub fn pressing(keys: &[Key]) -> Self {
        let mut snapshot = Self::default();
        for key in keys {
            snapshot.held |= key.bit();
            snapshot.pressed |= key.bit();
        }
        snapshot
    }

    /// Snapshot where every key in `keys` is held but none changed this tick.
    pub fn holding(keys: &[Key]) -> Self {
        let mut snapshot = Self::default();
        for key in keys {
            snapshot.held |= key.bit();
        }
        snapshot
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held & key.bit() != 0
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.pressed & key.bit() != 0
    }

    /// Horizontal intent: -1 for left, 1 for right. Right wins when both are held.
    pub fn move_x(&self) -> i8 {
        if self.is_held(Key::Right) {
            1
        } else if self.is_held(Key::Left) {
            -1
        } else {
            0
        }
    }

    /// First level-select key pressed this tick.
    pub fn level_selected(&self) -> Option<usize> {
        Key::ALL
            .iter()
            .filter(|key| self.is_just_pressed(**key))
            .find_map(|key| key.level_number())
    }
}
