//! Remote-control key events.

use serde::{Deserialize, Serialize};

/// A key on the TV remote, mapped onto the keyboard key the web application
/// listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    /// D-pad up
    Up,
    /// D-pad down
    Down,
    /// D-pad left
    Left,
    /// D-pad right
    Right,
    /// OK / confirm
    Enter,
    /// Back
    Escape,
    /// Back on remotes that send Backspace
    Backspace,
}

impl Key {
    /// `KeyboardEvent.key` value
    #[must_use]
    pub const fn dom_key(self) -> &'static str {
        match self {
            Self::Up => "ArrowUp",
            Self::Down => "ArrowDown",
            Self::Left => "ArrowLeft",
            Self::Right => "ArrowRight",
            Self::Enter => "Enter",
            Self::Escape => "Escape",
            Self::Backspace => "Backspace",
        }
    }

    /// `KeyboardEvent.code` value
    #[must_use]
    pub const fn dom_code(self) -> &'static str {
        self.dom_key()
    }

    /// Legacy `keyCode` / `which`
    #[must_use]
    pub const fn key_code(self) -> u32 {
        match self {
            Self::Up => 38,
            Self::Down => 40,
            Self::Left => 37,
            Self::Right => 39,
            Self::Enter => 13,
            Self::Escape => 27,
            Self::Backspace => 8,
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dom_key())
    }
}

/// D-pad direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Up
    Up,
    /// Down
    Down,
    /// Left
    Left,
    /// Right
    Right,
}

impl Direction {
    /// Key that produces this move
    #[must_use]
    pub const fn key(self) -> Key {
        match self {
            Self::Up => Key::Up,
            Self::Down => Key::Down,
            Self::Left => Key::Left,
            Self::Right => Key::Right,
        }
    }
}

/// Raw DOM key event phase, for synthetic dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyEventKind {
    /// `keydown`
    KeyDown,
    /// `keyup`
    KeyUp,
}

impl KeyEventKind {
    /// DOM event type name
    #[must_use]
    pub const fn event_type(self) -> &'static str {
        match self {
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::Enter.key_code(), 13);
        assert_eq!(Key::Up.key_code(), 38);
        assert_eq!(Key::Backspace.dom_key(), "Backspace");
        assert_eq!(Key::Left.to_string(), "ArrowLeft");
    }

    #[test]
    fn test_direction_keys() {
        let keys: Vec<Key> = [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
        .into_iter()
        .map(Direction::key)
        .collect();
        assert_eq!(keys, [Key::Up, Key::Down, Key::Left, Key::Right]);
    }

    #[test]
    fn test_event_type_names() {
        assert_eq!(KeyEventKind::KeyDown.event_type(), "keydown");
        assert_eq!(KeyEventKind::KeyUp.event_type(), "keyup");
    }
}
