use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Mark;

/// Chord string to mark, e.g. `mod+b` to bold.
///
/// Chords are compared case-insensitively. Matching a chord against a
/// physical key event is the host's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hotkeys(BTreeMap<String, Mark>);

impl Default for Hotkeys {
    fn default() -> Self {
        Self::empty()
            .bind("mod+b", Mark::Bold)
            .bind("mod+i", Mark::Italic)
            .bind("mod+shift+c", Mark::Code)
    }
}

impl Hotkeys {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn bind(mut self, chord: &str, mark: Mark) -> Self {
        self.0.insert(chord.trim().to_lowercase(), mark);
        self
    }

    pub fn mark_for(&self, chord: &str) -> Option<Mark> {
        self.0.get(&chord.trim().to_lowercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Mark)> {
        self.0.iter().map(|(chord, mark)| (chord.as_str(), *mark))
    }
}
