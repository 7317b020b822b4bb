use crate::editing::{Operation, Transaction, TransformError};
use crate::models::{Mark, NodeMatch, NodeProps, Path};
use crate::query::marks_at;

impl Transaction<'_> {
    /// Adds or removes `mark`.
    ///
    /// Over an expanded selection every covered text leaf changes, split at
    /// the selection edges. At a collapsed cursor only the pending marks
    /// change; they are dropped when they end up equal to the leaf's own.
    pub(crate) fn set_mark(&mut self, mark: Mark, on: bool) -> Result<(), TransformError> {
        let Some(selection) = self.value.selection.clone() else {
            return Ok(());
        };

        if selection.is_collapsed() {
            let leaf = marks_at(&self.value, self.schema(), &selection.anchor);
            let mut pending = self.value.marks.clone().unwrap_or_else(|| leaf.clone());
            if on {
                pending.insert(mark);
            } else {
                pending.remove(&mark);
            }
            let new_marks = (pending != leaf).then_some(pending);
            if new_marks == self.value.marks {
                return Ok(());
            }
            return self.apply(Operation::SetMarks {
                marks: self.value.marks.clone(),
                new_marks,
            });
        }

        let r = self.range_ref(selection.clone(), true);
        self.split_inside(&selection.end(), &NodeMatch::Text)?;
        if let Some(current) = self.range(r) {
            self.split_inside(&current.start(), &NodeMatch::Text)?;
        }
        let Some(range) = self.unref_range(r) else {
            return Ok(());
        };

        let (start, end) = range.edges();
        let schema = self.schema();
        let targets: Vec<Path> = self
            .value
            .nodes_between(&start.path, &end.path)
            .filter_map(|(node, path)| {
                let text = node.as_text()?;
                if start.path != end.path {
                    if path == end.path && end.offset == 0 {
                        return None;
                    }
                    if path == start.path && start.offset == text.len() && !text.is_empty() {
                        return None;
                    }
                }
                let markable = match self.value.parent(&path).and_then(|p| p.as_element()) {
                    Some(parent) if schema.is_void(parent) => schema.is_markable_void(parent),
                    _ => true,
                };
                markable.then_some(path)
            })
            .collect();

        for path in targets {
            let Some(text) = self.value.text(&path) else {
                continue;
            };
            let mut marks = text.marks.clone();
            if on {
                marks.insert(mark);
            } else {
                marks.remove(&mark);
            }
            self.set_node(&path, NodeProps::Text { marks })?;
        }
        self.set_selection(Some(range))
    }
}
