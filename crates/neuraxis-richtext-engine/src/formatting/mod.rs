//! Toolbar-level formatting: which block types and marks are active at the
//! selection, and the command sequences that toggle them.
//!
//! Queries read a `&Value` snapshot. Toggles compile to [`Cmd`]s so a host
//! can run them through its own [`Editor`] or batch them with other edits.

mod hotkeys;

pub use hotkeys::Hotkeys;

use crate::editing::{Change, Cmd, Editor, NodeOptions, Properties, TransformError};
use crate::models::{Element, ElementType, Location, Mark, Mode, NodeMatch, Schema, Value};
use crate::query::{current_marks, unhang};

/// True when an element of type `format` holds any part of the selection,
/// ignoring a block the selection merely touches at its start.
pub fn is_block_active(value: &Value, schema: &Schema, format: ElementType) -> bool {
    let Some(selection) = &value.selection else {
        return false;
    };
    let at = Location::Range(unhang(value, schema, selection));
    !value
        .matches(&at, &NodeMatch::Type(format), Mode::All, schema)
        .is_empty()
}

/// True when the next typed character would carry `mark`.
pub fn is_mark_active(value: &Value, schema: &Schema, mark: Mark) -> bool {
    current_marks(value, schema).is_some_and(|marks| marks.contains(&mark))
}

/// Lists are unwrapped first whatever the target, so no stale list wrapper
/// survives a retype.
pub fn toggle_block_commands(value: &Value, schema: &Schema, format: ElementType) -> Vec<Cmd> {
    let active = is_block_active(value, schema, format);
    let is_list = format.is_list();
    let kind = match (active, is_list) {
        (true, _) => ElementType::Paragraph,
        (false, true) => ElementType::ListItem,
        (false, false) => format,
    };

    let mut cmds = vec![
        Cmd::UnwrapNodes {
            options: NodeOptions::matching(NodeMatch::lists()).split(),
        },
        Cmd::SetNodes {
            properties: Properties::kind(kind),
            options: NodeOptions::default(),
        },
    ];
    if !active && is_list {
        cmds.push(Cmd::WrapNodes {
            wrapper: Element::new(format, Vec::new()),
            options: NodeOptions::default(),
        });
    }
    cmds
}

pub fn toggle_mark_commands(value: &Value, schema: &Schema, mark: Mark) -> Vec<Cmd> {
    if is_mark_active(value, schema, mark) {
        vec![Cmd::RemoveMark { mark }]
    } else {
        vec![Cmd::AddMark { mark }]
    }
}

pub fn toggle_block(
    editor: &Editor,
    value: &Value,
    format: ElementType,
) -> Result<Change, TransformError> {
    editor.apply_all(value, toggle_block_commands(value, editor.schema(), format))
}

pub fn toggle_mark(editor: &Editor, value: &Value, mark: Mark) -> Result<Change, TransformError> {
    editor.apply_all(value, toggle_mark_commands(value, editor.schema(), mark))
}
