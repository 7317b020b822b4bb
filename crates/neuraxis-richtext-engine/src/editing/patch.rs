use crate::models::{Path, Range};

use super::{Change, Operation};

/// What one published edit did, for a host that re-renders incrementally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub operations: Vec<Operation>,
    /// Top-level blocks touched, in the coordinates each operation saw.
    pub changed: Vec<Path>,
    pub new_selection: Option<Range>,
    pub version: u64,
}

impl Patch {
    pub(crate) fn new(change: &Change, version: u64) -> Self {
        let mut changed: Vec<Path> = Vec::new();
        for path in change.operations.iter().filter_map(Operation::path) {
            let block = path.prefix(path.len().min(1));
            if !block.is_root() && !changed.contains(&block) {
                changed.push(block);
            }
        }
        Self {
            operations: change.operations.clone(),
            changed,
            new_selection: change.value.selection.clone(),
            version,
        }
    }

    /// True when the edit changed nothing and no version was published.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
