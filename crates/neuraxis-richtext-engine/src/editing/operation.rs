//! Primitive operations: the only way a tree changes.
//!
//! Every high-level transform compiles down to a sequence of these. Each one
//! knows how to apply itself to a [`Value`] and how to carry a path or point
//! recorded before it over to the tree after it.

use serde::{Deserialize, Serialize};

use super::TransformError;
use crate::models::{Affinity, Marks, Node, NodeProps, Path, Point, Range, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    InsertNode {
        path: Path,
        node: Node,
    },
    RemoveNode {
        path: Path,
        node: Node,
    },
    InsertText {
        path: Path,
        offset: usize,
        text: String,
    },
    RemoveText {
        path: Path,
        offset: usize,
        text: String,
    },
    /// Splits the node at `path` at `position` (a byte offset for text, a
    /// child index for elements). The right half gets `properties`.
    SplitNode {
        path: Path,
        position: usize,
        properties: NodeProps,
    },
    /// Merges the node at `path` into its previous sibling, whose length
    /// before the merge was `position`.
    MergeNode {
        path: Path,
        position: usize,
        properties: NodeProps,
    },
    /// Moves a subtree. `new_path` addresses the destination in the tree as
    /// it is once the node has been taken out.
    MoveNode {
        path: Path,
        new_path: Path,
    },
    SetNode {
        path: Path,
        properties: NodeProps,
        new_properties: NodeProps,
    },
    SetSelection {
        selection: Option<Range>,
        new_selection: Option<Range>,
    },
    SetMarks {
        marks: Option<Marks>,
        new_marks: Option<Marks>,
    },
}

fn char_boundary(text: &str, offset: usize, path: &Path) -> Result<(), TransformError> {
    if text.is_char_boundary(offset) {
        Ok(())
    } else {
        Err(TransformError::InvalidOffset {
            path: path.clone(),
            offset,
        })
    }
}

fn split_parent(path: &Path) -> Result<(Path, usize), TransformError> {
    match (path.parent(), path.index()) {
        (Some(parent), Some(index)) => Ok((parent, index)),
        _ => Err(TransformError::InvalidPath(path.clone())),
    }
}

fn siblings_mut<'v>(
    value: &'v mut Value,
    path: &Path,
) -> Result<(&'v mut Vec<Node>, usize), TransformError> {
    let (parent, index) = split_parent(path)?;
    let children = value
        .children_at_mut(&parent)
        .ok_or_else(|| TransformError::InvalidPath(path.clone()))?;
    Ok((children, index))
}

fn text_mut<'v>(value: &'v mut Value, path: &Path) -> Result<&'v mut String, TransformError> {
    let node = value
        .get_mut(path)
        .ok_or_else(|| TransformError::InvalidPath(path.clone()))?;
    node.as_text_mut()
        .map(|t| &mut t.text)
        .ok_or_else(|| TransformError::NotText(path.clone()))
}

impl Operation {
    /// Applies the operation to `value` in place.
    pub fn apply(&self, value: &mut Value) -> Result<(), TransformError> {
        match self {
            Operation::InsertNode { path, node } => {
                let (children, index) = siblings_mut(value, path)?;
                if index > children.len() {
                    return Err(TransformError::InvalidPath(path.clone()));
                }
                children.insert(index, node.clone());
            }
            Operation::RemoveNode { path, .. } => {
                let (children, index) = siblings_mut(value, path)?;
                if index >= children.len() {
                    return Err(TransformError::InvalidPath(path.clone()));
                }
                children.remove(index);
            }
            Operation::InsertText { path, offset, text } => {
                let target = text_mut(value, path)?;
                char_boundary(target, *offset, path)?;
                target.insert_str(*offset, text);
            }
            Operation::RemoveText { path, offset, text } => {
                let target = text_mut(value, path)?;
                let end = offset + text.len();
                char_boundary(target, *offset, path)?;
                char_boundary(target, end, path)?;
                target.replace_range(*offset..end, "");
            }
            Operation::SplitNode {
                path,
                position,
                properties,
            } => {
                let (children, index) = siblings_mut(value, path)?;
                let node = children
                    .get_mut(index)
                    .ok_or_else(|| TransformError::InvalidPath(path.clone()))?;
                let mut right = Node::empty_with_props(properties);
                match (node, &mut right) {
                    (Node::Text(left), Node::Text(right)) => {
                        char_boundary(&left.text, *position, path)?;
                        right.text = left.text.split_off(*position);
                    }
                    (Node::Element(left), Node::Element(right)) => {
                        if *position > left.children.len() {
                            return Err(TransformError::InvalidPath(path.child(*position)));
                        }
                        right.children = left.children.split_off(*position);
                    }
                    (Node::Text(_), _) => return Err(TransformError::NotElement(path.clone())),
                    (Node::Element(_), _) => return Err(TransformError::NotText(path.clone())),
                }
                children.insert(index + 1, right);
            }
            Operation::MergeNode { path, .. } => {
                let (children, index) = siblings_mut(value, path)?;
                if index == 0 || index >= children.len() {
                    return Err(TransformError::InvalidPath(path.clone()));
                }
                let node = children.remove(index);
                let mismatch = match (&mut children[index - 1], node) {
                    (Node::Text(prev), Node::Text(next)) => {
                        prev.text.push_str(&next.text);
                        None
                    }
                    (Node::Element(prev), Node::Element(next)) => {
                        prev.children.extend(next.children);
                        None
                    }
                    (prev, node) => Some((prev.is_text(), node)),
                };
                if let Some((prev_is_text, node)) = mismatch {
                    children.insert(index, node);
                    return Err(if prev_is_text {
                        TransformError::NotText(path.clone())
                    } else {
                        TransformError::NotElement(path.clone())
                    });
                }
            }
            Operation::MoveNode { path, new_path } => {
                let (new_parent, new_index) = split_parent(new_path)?;
                let (children, index) = siblings_mut(value, path)?;
                if index >= children.len() {
                    return Err(TransformError::InvalidPath(path.clone()));
                }
                let node = children.remove(index);
                let fits = value
                    .children_at(&new_parent)
                    .is_some_and(|target| new_index <= target.len());
                if !fits {
                    if let Ok((children, index)) = siblings_mut(value, path) {
                        children.insert(index, node);
                    }
                    return Err(TransformError::InvalidPath(new_path.clone()));
                }
                let (target, _) = siblings_mut(value, new_path)?;
                target.insert(new_index, node);
            }
            Operation::SetNode {
                path,
                new_properties,
                ..
            } => {
                let node = value
                    .get_mut(path)
                    .ok_or_else(|| TransformError::InvalidPath(path.clone()))?;
                node.set_props(new_properties);
            }
            Operation::SetSelection { new_selection, .. } => {
                value.selection = new_selection.clone();
            }
            Operation::SetMarks { new_marks, .. } => {
                value.marks = new_marks.clone();
            }
        }
        Ok(())
    }

    /// The path the operation targets, if it is structural.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Operation::InsertNode { path, .. }
            | Operation::RemoveNode { path, .. }
            | Operation::InsertText { path, .. }
            | Operation::RemoveText { path, .. }
            | Operation::SplitNode { path, .. }
            | Operation::MergeNode { path, .. }
            | Operation::MoveNode { path, .. }
            | Operation::SetNode { path, .. } => Some(path),
            Operation::SetSelection { .. } | Operation::SetMarks { .. } => None,
        }
    }

    /// Where a path recorded before this operation points afterwards.
    /// `None` when the node it addressed was removed.
    pub fn transform_path(&self, path: &Path, affinity: Affinity) -> Option<Path> {
        match self {
            Operation::InsertNode { path: op, .. } => Some(after_insert(op, path)),
            Operation::RemoveNode { path: op, .. } => after_remove(op, path),
            Operation::SplitNode {
                path: op, position, ..
            } => Some(after_split(op, *position, path, affinity)),
            Operation::MergeNode {
                path: op, position, ..
            } => Some(after_merge(op, *position, path)),
            Operation::MoveNode { path: op, new_path } => {
                if op == path {
                    Some(new_path.clone())
                } else if op.is_ancestor_of(path) {
                    Some(new_path.extend(&path[op.len()..]))
                } else {
                    after_remove(op, path).map(|p| after_insert(new_path, &p))
                }
            }
            _ => Some(path.clone()),
        }
    }

    /// Where a point recorded before this operation sits afterwards.
    pub fn transform_point(&self, point: &Point, affinity: Affinity) -> Option<Point> {
        match self {
            Operation::InsertText { path, offset, text } if *path == point.path => {
                let shift = *offset < point.offset
                    || (*offset == point.offset && affinity == Affinity::Forward);
                Some(Point::new(
                    point.path.clone(),
                    if shift { point.offset + text.len() } else { point.offset },
                ))
            }
            Operation::RemoveText { path, offset, text } if *path == point.path => {
                let removed = point.offset.saturating_sub(*offset).min(text.len());
                Some(Point::new(point.path.clone(), point.offset - removed))
            }
            Operation::MergeNode { path, position, .. } if *path == point.path => Some(Point::new(
                self.transform_path(&point.path, affinity)?,
                point.offset + position,
            )),
            Operation::SplitNode { path, position, .. } if *path == point.path => {
                let moves = *position < point.offset
                    || (*position == point.offset && affinity == Affinity::Forward);
                if moves {
                    Some(Point::new(point.path.next()?, point.offset - position))
                } else {
                    Some(point.clone())
                }
            }
            _ => Some(Point::new(
                self.transform_path(&point.path, affinity)?,
                point.offset,
            )),
        }
    }
}

/// Depth at which `op` changes indices of paths under the same parent.
fn same_level(op: &Path, path: &Path) -> Option<usize> {
    let depth = op.len().checked_sub(1)?;
    (path.len() > depth && path[..depth] == op[..depth]).then_some(depth)
}

fn bump(path: &Path, depth: usize, delta: isize) -> Path {
    let mut indices = path.indices().to_vec();
    indices[depth] = indices[depth].saturating_add_signed(delta);
    Path::new(indices)
}

fn after_insert(op: &Path, path: &Path) -> Path {
    match same_level(op, path) {
        Some(depth) if op[depth] <= path[depth] => bump(path, depth, 1),
        _ => path.clone(),
    }
}

fn after_remove(op: &Path, path: &Path) -> Option<Path> {
    if op == path || op.is_ancestor_of(path) {
        return None;
    }
    if op.ends_before(path) {
        return Some(bump(path, op.len() - 1, -1));
    }
    Some(path.clone())
}

fn after_split(op: &Path, position: usize, path: &Path, affinity: Affinity) -> Path {
    let depth = op.len().saturating_sub(1);
    if op == path {
        if affinity == Affinity::Forward {
            return bump(path, depth, 1);
        }
        return path.clone();
    }
    if op.ends_before(path) {
        return bump(path, depth, 1);
    }
    if op.is_ancestor_of(path) && path[op.len()] >= position {
        let moved = bump(path, depth, 1);
        return bump(&moved, op.len(), -(position as isize));
    }
    path.clone()
}

fn after_merge(op: &Path, position: usize, path: &Path) -> Path {
    let depth = op.len().saturating_sub(1);
    if op == path || op.ends_before(path) {
        return bump(path, depth, -1);
    }
    if op.is_ancestor_of(path) {
        let moved = bump(path, depth, -1);
        return bump(&moved, op.len(), position as isize);
    }
    path.clone()
}
