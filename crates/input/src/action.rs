use crate::key::{Key, KeyboardState};

/// A high-level action produced by a held key.
///
/// The camera controller consumes actions, never raw keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Rotate around the vertical axis; the sign gives the direction.
    Yaw(f32),
    /// Tilt toward or away from the poles; the sign gives the direction.
    Pitch(f32),
    /// Ask the host to close the application.
    Close,
}

/// Fixed key table. Left/Right turn yaw, Up/Down turn pitch.
pub const BINDINGS: [(Key, Action); 5] = [
    (Key::Left, Action::Yaw(-1.0)),
    (Key::Right, Action::Yaw(1.0)),
    (Key::Up, Action::Pitch(-1.0)),
    (Key::Down, Action::Pitch(1.0)),
    (Key::Escape, Action::Close),
];

/// Net orbit input for one frame, in step units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitInput {
    pub yaw: f32,
    pub pitch: f32,
    pub close: bool,
}

/// Poll every binding and fold the held ones into a single frame input.
///
/// Opposite keys held together cancel out.
pub fn poll_actions<K: KeyboardState + ?Sized>(keys: &K) -> OrbitInput {
    let mut input = OrbitInput::default();
    for (key, action) in BINDINGS {
        if !keys.is_key_down(key) {
            continue;
        }
        match action {
            Action::Yaw(dir) => input.yaw += dir,
            Action::Pitch(dir) => input.pitch += dir,
            Action::Close => input.close = true,
        }
    }
    input
}
