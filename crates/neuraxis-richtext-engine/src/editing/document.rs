use std::fmt;

use log::{debug, warn};

use crate::editing::{Change, Cmd, Editor, Key, Patch, TransformError};
use crate::formatting::{self, Hotkeys};
use crate::mentions::{KeyOutcome, MentionEngine, Overlay};
use crate::models::{ElementType, Mark, Schema, Value};
use crate::query::Unit;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("No mention candidate at index {0}")]
    NoCandidate(usize),
}

type Listener = Box<dyn FnMut(&Value, u64)>;

/// The single owner of a live document value.
///
/// `Document` holds the current [`Value`] and replaces it wholesale on every
/// successful edit:
///
/// 1. Run the command batch through the [`Editor`] on a working copy
/// 2. Bump the version
/// 3. Re-evaluate mention autocomplete against the new value
/// 4. Hand the new value to every `on_change` listener
///
/// A failed edit is logged and the previous value kept, so readers never see
/// a half-applied command.
///
/// ```rust
/// use neuraxis_richtext_engine::editing::{Document, Key};
/// use neuraxis_richtext_engine::models::{Element, Point, Range, Schema, Value};
///
/// let value = Value::new(vec![Element::paragraph("hi ").into()])
///     .with_selection(Range::collapsed(Point::new([0, 0], 3)));
/// let mut doc = Document::new(value, Schema::default()).unwrap();
///
/// for c in "@ma".chars() {
///     doc.handle_key(&Key::Char(c)).unwrap();
/// }
/// assert_eq!(doc.overlay().unwrap().active(), Some("margie"));
/// ```
pub struct Document {
    value: Value,
    version: u64,
    editor: Editor,
    mentions: MentionEngine,
    hotkeys: Hotkeys,
    listeners: Vec<Listener>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("version", &self.version)
            .field("value", &self.value)
            .field("mentions", &self.mentions)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Adopt `value` in canonical form as version 0.
    pub fn new(value: Value, schema: Schema) -> Result<Self, EditorError> {
        let editor = Editor::new(schema);
        let value = editor.normalize(&value)?.value;
        let mut mentions = MentionEngine::default();
        mentions.evaluate(&value, editor.schema(), 0);
        Ok(Self {
            value,
            version: 0,
            editor,
            mentions,
            hotkeys: Hotkeys::default(),
            listeners: Vec::new(),
        })
    }

    pub fn with_mentions(mut self, mentions: MentionEngine) -> Self {
        self.mentions = mentions;
        self.mentions
            .evaluate(&self.value, self.editor.schema(), self.version);
        self
    }

    pub fn with_hotkeys(mut self, hotkeys: Hotkeys) -> Self {
        self.hotkeys = hotkeys;
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn mentions(&self) -> &MentionEngine {
        &self.mentions
    }

    pub fn hotkeys(&self) -> &Hotkeys {
        &self.hotkeys
    }

    /// Candidate list to draw, if any.
    pub fn overlay(&self) -> Option<Overlay<'_>> {
        self.mentions.overlay()
    }

    /// Called with the new value and version after every published change.
    pub fn on_change(&mut self, listener: impl FnMut(&Value, u64) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch, EditorError> {
        self.apply_all([cmd])
    }

    /// Runs the batch as one edit: one version, one notification.
    pub fn apply_all(&mut self, cmds: impl IntoIterator<Item = Cmd>) -> Result<Patch, EditorError> {
        match self.editor.apply_all(&self.value, cmds) {
            Ok(change) => Ok(self.publish(change)),
            Err(err) => {
                warn!("keeping version {} after failed edit: {err}", self.version);
                Err(err.into())
            }
        }
    }

    /// Adopt a value pushed from an outside store.
    pub fn replace_value(&mut self, value: Value) -> Result<Patch, EditorError> {
        let change = self.editor.normalize(&value)?;
        Ok(self.publish(change))
    }

    pub fn toggle_mark(&mut self, mark: Mark) -> Result<Patch, EditorError> {
        let cmds = formatting::toggle_mark_commands(&self.value, self.editor.schema(), mark);
        self.apply_all(cmds)
    }

    pub fn toggle_block(&mut self, format: ElementType) -> Result<Patch, EditorError> {
        let cmds = formatting::toggle_block_commands(&self.value, self.editor.schema(), format);
        self.apply_all(cmds)
    }

    pub fn is_mark_active(&self, mark: Mark) -> bool {
        formatting::is_mark_active(&self.value, self.editor.schema(), mark)
    }

    pub fn is_block_active(&self, format: ElementType) -> bool {
        formatting::is_block_active(&self.value, self.editor.schema(), format)
    }

    /// Route one key press. `Ok(None)` means the key was not an edit; an edit
    /// that changed nothing comes back as an empty patch.
    pub fn handle_key(&mut self, key: &Key) -> Result<Option<Patch>, EditorError> {
        if let Key::Chord(chord) = key {
            return match self.hotkeys.mark_for(chord) {
                Some(mark) => self.toggle_mark(mark).map(Some),
                None => {
                    debug!("unbound chord {chord}");
                    Ok(None)
                }
            };
        }

        self.mentions
            .sync(&self.value, self.editor.schema(), self.version);
        match self.mentions.handle_key(key) {
            KeyOutcome::Navigated | KeyOutcome::Cancelled => return Ok(None),
            KeyOutcome::Commit(cmds) => return self.apply_all(cmds).map(Some),
            KeyOutcome::Ignored => {}
        }

        let cmd = match key {
            Key::Char(c) => Cmd::insert_text(c.to_string()),
            Key::Backspace => Cmd::Delete {
                unit: Unit::Character,
                reverse: true,
            },
            Key::Delete => Cmd::Delete {
                unit: Unit::Character,
                reverse: false,
            },
            Key::Enter => Cmd::InsertBreak,
            Key::ArrowLeft => Cmd::step(1, Unit::Character, true),
            Key::ArrowRight => Cmd::step(1, Unit::Character, false),
            Key::ArrowUp | Key::ArrowDown | Key::Tab | Key::Escape | Key::Chord(_) => {
                return Ok(None);
            }
        };
        self.apply(cmd).map(Some)
    }

    /// Commit the candidate at `index`, as a pointer click on the overlay would.
    pub fn commit_candidate(&mut self, index: usize) -> Result<Patch, EditorError> {
        self.mentions
            .sync(&self.value, self.editor.schema(), self.version);
        let cmds = self
            .mentions
            .commit(index)
            .ok_or(EditorError::NoCandidate(index))?;
        self.apply_all(cmds)
    }

    /// An edit without operations keeps the current version and notifies
    /// nobody.
    fn publish(&mut self, change: Change) -> Patch {
        if change.is_noop() {
            debug!("nothing changed, staying at version {}", self.version);
            return Patch::new(&change, self.version);
        }
        self.version += 1;
        let patch = Patch::new(&change, self.version);
        self.value = change.value;
        self.mentions
            .evaluate(&self.value, self.editor.schema(), self.version);
        debug!(
            "published version {} ({} operations)",
            self.version,
            patch.operations.len()
        );
        for listener in &mut self.listeners {
            listener(&self.value, self.version);
        }
        patch
    }
}
