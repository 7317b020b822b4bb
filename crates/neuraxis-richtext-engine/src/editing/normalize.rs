//! Brings a value back to canonical form after a command.
//!
//! One fix is found and applied at a time, through the same operations as
//! any other edit, until a full pass finds nothing. Canonical form means:
//!
//! - a void holds exactly one child, an empty text;
//! - a non-void element is never empty (the root may be), and an empty
//!   list gets an empty list item rather than a text;
//! - a container (the root, a list, or an element holding blocks) holds
//!   only blocks, so stray inline content joins the block before it or gets
//!   a block of its own, a list item inside a list and a paragraph
//!   elsewhere;
//! - inline content starts and ends with a text, every inline element sits
//!   between two texts, and adjacent texts never share the same marks;
//! - the selection points at existing texts on char boundaries.

use log::debug;

use super::{Operation, Transaction, TransformError};
use crate::models::{Element, ElementType, Node, NodeRef, Path, Schema, Text};
use crate::query::clamp_range;

/// Upper bound on fixes per node before normalization is declared stuck.
const FIXES_PER_NODE: usize = 42;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Fix {
    InsertEmptyText(Path),
    Remove(Path),
    ClearText(Path),
    MergeWithPrevious(Path),
    InsertBlock { at: Path, kind: ElementType },
    MoveInto { from: Path, to: Path },
}

fn find_fix(node: NodeRef<'_>, path: &Path, schema: &Schema) -> Option<Fix> {
    let children = node.children();
    let is_list = node.as_element().is_some_and(|e| e.kind.is_list());
    let block_kind = if is_list {
        ElementType::ListItem
    } else {
        ElementType::Paragraph
    };
    if let Some(element) = node.as_element() {
        if schema.is_void(element) {
            return match children {
                [] => Some(Fix::InsertEmptyText(path.child(0))),
                [Node::Text(text)] if text.is_empty() => None,
                [Node::Text(_)] => Some(Fix::ClearText(path.child(0))),
                [Node::Element(_), ..] => Some(Fix::Remove(path.child(0))),
                [_, ..] => Some(Fix::Remove(path.child(children.len() - 1))),
            };
        }
        if children.is_empty() && is_list {
            return Some(Fix::InsertBlock {
                at: path.child(0),
                kind: block_kind,
            });
        }
        if children.is_empty() {
            return Some(Fix::InsertEmptyText(path.child(0)));
        }
    }

    if node.is_root() || is_list || node.has_block_children(schema) {
        for (index, child) in children.iter().enumerate() {
            match child {
                Node::Element(element) if schema.is_block(element) => continue,
                Node::Text(text) if text.is_empty() => return Some(Fix::Remove(path.child(index))),
                _ => {}
            }
            let previous = index.checked_sub(1).map(|i| (i, &children[i]));
            return Some(match previous {
                Some((i, sibling)) if NodeRef::from(sibling).is_leaf_block(schema) => Fix::MoveInto {
                    from: path.child(index),
                    to: path.child(i).child(sibling.children().len()),
                },
                _ => Fix::InsertBlock {
                    at: path.child(index),
                    kind: block_kind,
                },
            });
        }
        return None;
    }

    for (index, child) in children.iter().enumerate() {
        let previous = index.checked_sub(1).map(|i| &children[i]);
        match (previous, child) {
            (_, Node::Element(element)) if schema.is_inline(element) => {
                if !previous.is_some_and(Node::is_text) {
                    return Some(Fix::InsertEmptyText(path.child(index)));
                }
                if index + 1 == children.len() {
                    return Some(Fix::InsertEmptyText(path.child(index + 1)));
                }
            }
            (Some(Node::Text(before)), Node::Text(text)) => {
                if before.marks == text.marks {
                    return Some(Fix::MergeWithPrevious(path.child(index)));
                }
                if before.is_empty() {
                    return Some(Fix::Remove(path.child(index - 1)));
                }
                if text.is_empty() {
                    return Some(Fix::Remove(path.child(index)));
                }
            }
            _ => {}
        }
    }
    None
}

impl Transaction<'_> {
    fn next_fix(&self) -> Option<(Path, Fix)> {
        let schema = self.schema();
        self.value
            .nodes()
            .filter(|(node, _)| !node.is_text())
            .find_map(|(node, path)| find_fix(node, &path, schema).map(|fix| (path, fix)))
    }

    fn apply_fix(&mut self, fix: Fix) -> Result<(), TransformError> {
        match fix {
            Fix::InsertEmptyText(path) => self.insert_node(path, Text::default().into()),
            Fix::Remove(path) => self.remove_node(&path),
            Fix::ClearText(path) => {
                let text = self
                    .value
                    .text(&path)
                    .map(|t| t.text.clone())
                    .unwrap_or_default();
                self.apply(Operation::RemoveText {
                    path,
                    offset: 0,
                    text,
                })
            }
            Fix::MergeWithPrevious(path) => self.merge_node(&path),
            Fix::InsertBlock { at, kind } => self.insert_node(at, Element::new(kind, Vec::new()).into()),
            Fix::MoveInto { from, to } => self.move_node(&from, &to),
        }
    }

    /// Applies fixes until the value is canonical, then repairs the
    /// selection. Fails with `NormalizationLoop` if the fixes do not settle.
    pub(crate) fn normalize(&mut self) -> Result<(), TransformError> {
        let budget = (self.value.nodes().count() + 1) * FIXES_PER_NODE;
        for _ in 0..budget {
            let Some((at, fix)) = self.next_fix() else {
                return self.normalize_selection();
            };
            debug!("normalize {at}: {fix:?}");
            self.apply_fix(fix)?;
        }
        Err(TransformError::NormalizationLoop(budget))
    }

    fn normalize_selection(&mut self) -> Result<(), TransformError> {
        let Some(selection) = self.value.selection.clone() else {
            return Ok(());
        };
        if self.value.is_valid_point(&selection.anchor) && self.value.is_valid_point(&selection.focus)
        {
            return Ok(());
        }
        let repaired = clamp_range(&self.value, &selection);
        debug!("selection {selection:?} repaired to {repaired:?}");
        self.apply(Operation::SetSelection {
            selection: Some(selection),
            new_selection: repaired,
        })
    }
}
