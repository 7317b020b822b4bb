//! High-level transforms, each compiled into primitive operations on a
//! [`Transaction`].
//!
//! Every transform resolves its location first (an explicit `at`, else the
//! selection), tracks the paths and points it still needs as refs, and then
//! emits operations one at a time so the refs stay correct between them.

mod marks;
mod nodes;
mod selection;
mod text;

use super::{Cmd, Transaction, TransformError};
use crate::models::{Location, NodeMatch};

impl Transaction<'_> {
    /// Compiles one command into operations on the working copy.
    pub(crate) fn run(&mut self, cmd: Cmd) -> Result<(), TransformError> {
        match cmd {
            Cmd::InsertNodes { nodes, at, select } => self.insert_nodes(nodes, at, select),
            Cmd::RemoveNodes { options } => self.remove_nodes(options),
            Cmd::SetNodes {
                properties,
                options,
            } => self.set_nodes(&properties, options),
            Cmd::WrapNodes { wrapper, options } => self.wrap_nodes(wrapper, options),
            Cmd::UnwrapNodes { options } => self.unwrap_nodes(options),
            Cmd::LiftNodes { options } => self.lift_nodes(options),
            Cmd::MoveNodes { to, options } => self.move_nodes(options, to),
            Cmd::SplitNodes { options, always } => self.split_nodes_at(options, always),
            Cmd::Select { target } => self.select(target),
            Cmd::Deselect => self.set_selection(None),
            Cmd::Collapse { edge } => self.collapse(edge),
            Cmd::Move {
                distance,
                unit,
                reverse,
                edge,
            } => self.move_selection(distance, unit, reverse, edge),
            Cmd::AddMark { mark } => self.set_mark(mark, true),
            Cmd::RemoveMark { mark } => self.set_mark(mark, false),
            Cmd::InsertText { text, at } => self.insert_text(&text, at),
            Cmd::Delete { unit, reverse } => self.delete(unit, reverse),
            Cmd::DeleteFragment => self.delete_selection(),
            Cmd::InsertBreak => self.insert_break(),
        }
    }

    /// An explicit location, else the selection. An explicit path must
    /// resolve.
    fn resolve_at(&self, at: Option<Location>) -> Result<Option<Location>, TransformError> {
        if let Some(Location::Path(path)) = &at
            && !self.value.has(path)
        {
            return Err(TransformError::InvalidPath(path.clone()));
        }
        Ok(at.or_else(|| self.value.selection.clone().map(Location::Range)))
    }
}

/// The node at a path location, else every block it spans.
fn default_match(at: &Location) -> NodeMatch {
    match at {
        Location::Path(path) => NodeMatch::Path(path.clone()),
        _ => NodeMatch::Block,
    }
}
