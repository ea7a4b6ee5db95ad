use std::collections::HashSet;
use std::str::FromStr;

/// The keys the orbit viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
}

impl Key {
    pub const ALL: [Key; 5] = [Key::Left, Key::Right, Key::Up, Key::Down, Key::Escape];
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Key::Left),
            "right" => Ok(Key::Right),
            "up" => Ok(Key::Up),
            "down" => Ok(Key::Down),
            "escape" | "esc" => Ok(Key::Escape),
            other => Err(format!("unknown key: {other}")),
        }
    }
}

/// Query surface for "is this key held right now".
pub trait KeyboardState {
    fn is_key_down(&self, key: Key) -> bool;
}

/// Set of currently held keys, fed by platform key events.
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    keys: HashSet<Key>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press or release.
    pub fn set(&mut self, key: Key, pressed: bool) {
        if pressed {
            if self.keys.insert(key) {
                tracing::trace!(?key, "key down");
            }
        } else if self.keys.remove(&key) {
            tracing::trace!(?key, "key up");
        }
    }

    pub fn press(&mut self, key: Key) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: Key) {
        self.set(key, false);
    }

    /// Drop every held key (e.g. on focus loss, to avoid stuck keys).
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyboardState for HeldKeys {
    fn is_key_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }
}

impl FromIterator<Key> for HeldKeys {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
