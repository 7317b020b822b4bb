//! # Mention Autocomplete
//!
//! A reactive state machine driven by published document values. After
//! every change the engine looks for an `@word` right before a collapsed
//! cursor; while one is found it offers candidates from a
//! [`CandidateSource`] and handles the overlay keys.
//!
//! ## Trigger and visibility
//!
//! The trigger is purely syntactic. When the lookup returns nothing the
//! overlay hides but the target stays set, so typing on can bring the
//! overlay back without a fresh `@`.
//!
//! ## Staleness
//!
//! State remembers the document version it was computed for. A host must
//! [`sync`](MentionEngine::sync) before routing keys; state from an older
//! version is recomputed, never acted on.
//!
//! ## Commit
//!
//! Committing produces editor commands rather than mutating anything: select
//! the target, insert a `mention` void carrying the username, step past it.

mod candidates;
mod trigger;

pub use candidates::{CandidateSource, StaticCandidates, USERNAMES};
pub use trigger::{Trigger, detect_trigger};

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::editing::{Cmd, Key};
use crate::models::{Element, Range, Schema, Value};
use crate::query::Unit;

/// Most candidates offered at once.
pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MentionState {
    pub target: Option<Range>,
    pub query: String,
    pub candidates: Vec<String>,
    pub active_index: usize,
}

/// What a host needs to draw the candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Overlay<'a> {
    pub target: &'a Range,
    pub candidates: &'a [String],
    pub active_index: usize,
}

impl Overlay<'_> {
    pub fn active(&self) -> Option<&str> {
        self.candidates.get(self.active_index).map(String::as_str)
    }
}

/// How the engine dealt with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not an overlay key, or no overlay open: the editor should see it.
    Ignored,
    Navigated,
    Cancelled,
    /// Run these commands as one edit.
    Commit(Vec<Cmd>),
}

pub struct MentionEngine {
    source: Box<dyn CandidateSource>,
    limit: usize,
    state: MentionState,
    evaluated: Option<u64>,
}

impl fmt::Debug for MentionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MentionEngine")
            .field("limit", &self.limit)
            .field("state", &self.state)
            .field("evaluated", &self.evaluated)
            .finish_non_exhaustive()
    }
}

impl Default for MentionEngine {
    fn default() -> Self {
        Self::new(StaticCandidates::default())
    }
}

impl MentionEngine {
    pub fn new(source: impl CandidateSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            limit: DEFAULT_LIMIT,
            state: MentionState::default(),
            evaluated: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn state(&self) -> &MentionState {
        &self.state
    }

    /// Recomputes the state for `value`, published as `version`.
    pub fn evaluate(&mut self, value: &Value, schema: &Schema, version: u64) {
        self.evaluated = Some(version);
        let Some(trigger) = detect_trigger(value, schema) else {
            self.clear();
            return;
        };
        let mut candidates = self.source.lookup(&trigger.query);
        candidates.truncate(self.limit);
        debug!(
            "mention query {:?}: {} candidates",
            trigger.query,
            candidates.len()
        );
        self.state = MentionState {
            target: Some(trigger.target),
            query: trigger.query,
            candidates,
            active_index: 0,
        };
    }

    /// Re-evaluates unless the state already belongs to `version`.
    pub fn sync(&mut self, value: &Value, schema: &Schema, version: u64) {
        if self.evaluated != Some(version) {
            self.evaluate(value, schema, version);
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.target.is_some() && !self.state.candidates.is_empty()
    }

    pub fn overlay(&self) -> Option<Overlay<'_>> {
        if !self.is_open() {
            return None;
        }
        Some(Overlay {
            target: self.state.target.as_ref()?,
            candidates: &self.state.candidates,
            active_index: self.state.active_index,
        })
    }

    pub fn handle_key(&mut self, key: &Key) -> KeyOutcome {
        if !self.is_open() {
            return KeyOutcome::Ignored;
        }
        let len = self.state.candidates.len();
        match key {
            Key::ArrowDown => {
                self.state.active_index = (self.state.active_index + 1) % len;
                KeyOutcome::Navigated
            }
            Key::ArrowUp => {
                self.state.active_index = (self.state.active_index + len - 1) % len;
                KeyOutcome::Navigated
            }
            Key::Tab | Key::Enter => match self.commit(self.state.active_index) {
                Some(cmds) => KeyOutcome::Commit(cmds),
                None => KeyOutcome::Ignored,
            },
            Key::Escape => {
                self.clear();
                KeyOutcome::Cancelled
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// Commands that replace the target with candidate `index`, clearing the
    /// state. `None` when nothing is open or the index is out of range.
    pub fn commit(&mut self, index: usize) -> Option<Vec<Cmd>> {
        if !self.is_open() {
            return None;
        }
        let username = self.state.candidates.get(index)?.clone();
        let target = self.state.target.clone()?;
        self.clear();
        Some(commit_commands(target, &username))
    }

    pub fn clear(&mut self) {
        self.state = MentionState::default();
    }
}

/// Select `target`, insert a mention of `username` in its place and step
/// the cursor past it.
pub fn commit_commands(target: Range, username: &str) -> Vec<Cmd> {
    vec![
        Cmd::select(target),
        Cmd::insert(Element::mention(username)),
        Cmd::step(1, Unit::Offset, false),
    ]
}
