use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Positional address of a node: child indices from the root.
///
/// A path is not an identity. It goes stale after any structural edit above
/// it and has to be re-derived through the operations of that edit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(indices: impl Into<Vec<usize>>) -> Self {
        Self(indices.into())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Path(indices)
    }

    pub fn parent(&self) -> Option<Path> {
        let (_, rest) = self.0.split_last()?;
        Some(Path(rest.to_vec()))
    }

    /// Index of the node within its parent.
    pub fn index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn next(&self) -> Option<Path> {
        let last = self.index()?;
        Some(self.with_index(last + 1))
    }

    pub fn previous(&self) -> Option<Path> {
        let last = self.index()?;
        if last == 0 {
            return None;
        }
        Some(self.with_index(last - 1))
    }

    /// Same parent, different index. Root is returned unchanged.
    pub fn with_index(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        if let Some(last) = indices.last_mut() {
            *last = index;
        }
        Path(indices)
    }

    /// Truncated to the first `depth` indices.
    pub fn prefix(&self, depth: usize) -> Path {
        Path(self.0[..depth.min(self.0.len())].to_vec())
    }

    pub fn extend(&self, tail: &[usize]) -> Path {
        let mut indices = self.0.clone();
        indices.extend_from_slice(tail);
        Path(indices)
    }

    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    pub fn is_descendant_of(&self, other: &Path) -> bool {
        other.is_ancestor_of(self)
    }

    pub fn is_sibling_of(&self, other: &Path) -> bool {
        !self.is_root()
            && self.0.len() == other.0.len()
            && self.0[..self.0.len() - 1] == other.0[..other.0.len() - 1]
            && self != other
    }

    /// True when `self` sits at an earlier index than `other` under the same
    /// parent prefix, at `self`'s depth. `other` may be deeper.
    pub fn ends_before(&self, other: &Path) -> bool {
        let Some((&last, parent)) = self.0.split_last() else {
            return false;
        };
        other.0.len() > parent.len() && other.0[..parent.len()] == *parent && last < other.0[parent.len()]
    }

    /// Longest shared prefix.
    pub fn common(&self, other: &Path) -> Path {
        let shared = self
            .0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count();
        self.prefix(shared)
    }

    /// Document-order comparison in which an ancestor compares equal to its
    /// descendants.
    pub fn compare(&self, other: &Path) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }

    pub fn is_before(&self, other: &Path) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn is_after(&self, other: &Path) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// Every proper ancestor from the root down, excluding `self`.
    pub fn ancestors(&self) -> impl Iterator<Item = Path> + '_ {
        (0..self.0.len()).map(|depth| self.prefix(depth))
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl Deref for Path {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Path(indices)
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(indices: [usize; N]) -> Self {
        Path(indices.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        write!(f, "[{}]", parts.join(","))
    }
}
