use serde::{Deserialize, Serialize};

/// A key press as delivered by the host.
///
/// `Chord` carries a modifier combination such as `mod+b` in the notation
/// the hotkey table uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Char(char),
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Chord(String),
}
