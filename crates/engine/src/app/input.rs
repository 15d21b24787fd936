use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    W,
    A,
    S,
    D,
    Escape,
}

const KEY_COUNT: usize = 9;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct KeyStates {
    down: [bool; KEY_COUNT],
}

impl KeyStates {
    pub(crate) fn set(&mut self, key: Key, is_down: bool) {
        self.down[key.index()] = is_down;
    }

    pub(crate) fn is_down(&self, key: Key) -> bool {
        self.down[key.index()]
    }
}

impl Key {
    const fn index(self) -> usize {
        match self {
            Key::ArrowUp => 0,
            Key::ArrowDown => 1,
            Key::ArrowLeft => 2,
            Key::ArrowRight => 3,
            Key::W => 4,
            Key::A => 5,
            Key::S => 6,
            Key::D => 7,
            Key::Escape => 8,
        }
    }

    pub(crate) fn from_key_code(code: KeyCode) -> Option<Key> {
        match code {
            KeyCode::ArrowUp => Some(Key::ArrowUp),
            KeyCode::ArrowDown => Some(Key::ArrowDown),
            KeyCode::ArrowLeft => Some(Key::ArrowLeft),
            KeyCode::ArrowRight => Some(Key::ArrowRight),
            KeyCode::KeyW => Some(Key::W),
            KeyCode::KeyA => Some(Key::A),
            KeyCode::KeyS => Some(Key::S),
            KeyCode::KeyD => Some(Key::D),
            KeyCode::Escape => Some(Key::Escape),
            _ => None,
        }
    }
}

/// Four keys bound to the four directions, e.g. the arrow cluster or WASD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionKeys {
    pub up: Key,
    pub down: Key,
    pub left: Key,
    pub right: Key,
}

impl DirectionKeys {
    pub const fn cursors() -> Self {
        Self {
            up: Key::ArrowUp,
            down: Key::ArrowDown,
            left: Key::ArrowLeft,
            right: Key::ArrowRight,
        }
    }

    pub const fn wasd() -> Self {
        Self {
            up: Key::W,
            down: Key::S,
            left: Key::A,
            right: Key::D,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_indices_are_unique() {
        let keys = [
            Key::ArrowUp,
            Key::ArrowDown,
            Key::ArrowLeft,
            Key::ArrowRight,
            Key::W,
            Key::A,
            Key::S,
            Key::D,
            Key::Escape,
        ];
        let mut seen = [false; KEY_COUNT];
        for key in keys {
            assert!(!seen[key.index()], "duplicate index for {key:?}");
            seen[key.index()] = true;
        }
    }

    #[test]
    fn unbound_key_codes_are_ignored() {
        assert_eq!(Key::from_key_code(KeyCode::KeyQ), None);
        assert_eq!(Key::from_key_code(KeyCode::KeyD), Some(Key::D));
    }
}
