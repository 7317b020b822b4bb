//! A private working copy that operations are applied to.
//!
//! The caller's value is cloned in, every operation is applied to the clone
//! and recorded, and the selection plus every live ref is carried through
//! each one. Nothing is published unless the whole command sequence and the
//! normalization after it succeed.

use log::trace;

use super::{Operation, TransformError};
use crate::models::{Affinity, Path, Point, Range, Schema, Value};

#[derive(Debug, Clone)]
enum Tracked {
    Path {
        current: Option<Path>,
        affinity: Affinity,
    },
    Point {
        current: Option<Point>,
        affinity: Affinity,
    },
}

/// Handle to a path carried through later operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PathRef(usize);

/// Handle to a point carried through later operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PointRef(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RangeRef {
    anchor: PointRef,
    focus: PointRef,
}

pub(crate) struct Transaction<'s> {
    pub(crate) value: Value,
    schema: &'s Schema,
    operations: Vec<Operation>,
    refs: Vec<Option<Tracked>>,
}

impl<'s> Transaction<'s> {
    pub(crate) fn new(value: Value, schema: &'s Schema) -> Self {
        Self {
            value,
            schema,
            operations: Vec::new(),
            refs: Vec::new(),
        }
    }

    pub(crate) fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub(crate) fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub(crate) fn finish(self) -> (Value, Vec<Operation>) {
        (self.value, self.operations)
    }

    /// Applies one primitive operation to the working copy and carries the
    /// selection and all live refs through it.
    pub(crate) fn apply(&mut self, op: Operation) -> Result<(), TransformError> {
        trace!("apply {op:?}");
        let selection = self.value.selection.clone();
        op.apply(&mut self.value)?;

        if !matches!(op, Operation::SetSelection { .. } | Operation::SetMarks { .. })
            && let Some(selection) = selection
        {
            self.value.selection = self.carry_selection(&op, &selection);
        }

        for slot in self.refs.iter_mut().flatten() {
            match slot {
                Tracked::Path { current, affinity } => {
                    *current = current
                        .as_ref()
                        .and_then(|path| op.transform_path(path, *affinity));
                }
                Tracked::Point { current, affinity } => {
                    *current = current
                        .as_ref()
                        .and_then(|point| op.transform_point(point, *affinity));
                }
            }
        }

        self.operations.push(op);
        Ok(())
    }

    fn carry_selection(&self, op: &Operation, selection: &Range) -> Option<Range> {
        let anchor = self.carry_selection_point(op, &selection.anchor)?;
        let focus = self.carry_selection_point(op, &selection.focus)?;
        Some(Range::new(anchor, focus))
    }

    /// A selection point whose text was removed lands on the nearest
    /// surviving text, preferring the one in the closer branch.
    fn carry_selection_point(&self, op: &Operation, point: &Point) -> Option<Point> {
        if let Some(point) = op.transform_point(point, Affinity::Forward) {
            return Some(point);
        }
        let Operation::RemoveNode { path: removed, .. } = op else {
            return None;
        };

        let mut prev: Option<(Path, usize)> = None;
        let mut next: Option<Path> = None;
        for (path, text) in self.value.texts() {
            if path.is_before(removed) {
                prev = Some((path, text.len()));
            } else {
                next = Some(path);
                break;
            }
        }

        let prefer_next = match (&prev, &next) {
            (Some((prev, _)), Some(next)) => {
                if next == removed {
                    next.previous().is_none()
                } else {
                    prev.common(removed).len() < next.common(removed).len()
                }
            }
            _ => false,
        };

        match (prev, next) {
            (Some((path, len)), _) if !prefer_next => Some(Point::new(path, len)),
            (_, Some(path)) => Some(Point::new(path, 0)),
            _ => None,
        }
    }

    fn track(&mut self, tracked: Tracked) -> usize {
        self.refs.push(Some(tracked));
        self.refs.len() - 1
    }

    fn release(&mut self, slot: usize) -> Option<Tracked> {
        self.refs.get_mut(slot).and_then(Option::take)
    }

    pub(crate) fn path_ref(&mut self, path: Path, affinity: Affinity) -> PathRef {
        PathRef(self.track(Tracked::Path {
            current: Some(path),
            affinity,
        }))
    }

    pub(crate) fn path(&self, r: PathRef) -> Option<Path> {
        match self.refs.get(r.0)? {
            Some(Tracked::Path { current, .. }) => current.clone(),
            _ => None,
        }
    }

    pub(crate) fn unref_path(&mut self, r: PathRef) -> Option<Path> {
        match self.release(r.0)? {
            Tracked::Path { current, .. } => current,
            Tracked::Point { .. } => None,
        }
    }

    pub(crate) fn point_ref(&mut self, point: Point, affinity: Affinity) -> PointRef {
        PointRef(self.track(Tracked::Point {
            current: Some(point),
            affinity,
        }))
    }

    pub(crate) fn point(&self, r: PointRef) -> Option<Point> {
        match self.refs.get(r.0)? {
            Some(Tracked::Point { current, .. }) => current.clone(),
            _ => None,
        }
    }

    pub(crate) fn unref_point(&mut self, r: PointRef) -> Option<Point> {
        match self.release(r.0)? {
            Tracked::Point { current, .. } => current,
            Tracked::Path { .. } => None,
        }
    }

    /// Tracks both ends of a range. An inward ref keeps its ends from
    /// growing over content inserted or split right at them.
    pub(crate) fn range_ref(&mut self, range: Range, inward: bool) -> RangeRef {
        let backward = range.is_backward();
        let (anchor_affinity, focus_affinity) = match (inward, backward) {
            (false, _) => (Affinity::Forward, Affinity::Forward),
            (true, false) => (Affinity::Forward, Affinity::Backward),
            (true, true) => (Affinity::Backward, Affinity::Forward),
        };
        RangeRef {
            anchor: self.point_ref(range.anchor, anchor_affinity),
            focus: self.point_ref(range.focus, focus_affinity),
        }
    }

    pub(crate) fn range(&self, r: RangeRef) -> Option<Range> {
        Some(Range::new(self.point(r.anchor)?, self.point(r.focus)?))
    }

    pub(crate) fn unref_range(&mut self, r: RangeRef) -> Option<Range> {
        let anchor = self.unref_point(r.anchor);
        let focus = self.unref_point(r.focus);
        Some(Range::new(anchor?, focus?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Element, Node};
    use pretty_assertions::assert_eq;

    fn three_paragraphs() -> Value {
        Value::new(vec![
            Element::paragraph("one").into(),
            Element::paragraph("two").into(),
            Element::paragraph("three").into(),
        ])
    }

    #[test]
    fn refs_follow_structural_edits() {
        let schema = Schema::default();
        let mut tx = Transaction::new(three_paragraphs(), &schema);
        let last = tx.path_ref(Path::from([2]), Affinity::Forward);
        let caret = tx.point_ref(Point::new([1, 0], 2), Affinity::Forward);

        tx.apply(Operation::InsertNode {
            path: Path::from([0]),
            node: Element::paragraph("zero").into(),
        })
        .unwrap();
        assert_eq!(tx.path(last), Some(Path::from([3])));
        assert_eq!(tx.point(caret), Some(Point::new([2, 0], 2)));

        tx.apply(Operation::RemoveNode {
            path: Path::from([2]),
            node: Element::paragraph("two").into(),
        })
        .unwrap();
        assert_eq!(tx.unref_point(caret), None);
        assert_eq!(tx.unref_path(last), Some(Path::from([2])));
        assert_eq!(tx.path(last), None);
        assert_eq!(tx.operations().len(), 2);
    }

    #[test]
    fn removed_selection_lands_in_closer_branch() {
        let schema = Schema::default();
        let value = three_paragraphs().with_selection(Range::collapsed(Point::new([1, 0], 1)));
        let mut tx = Transaction::new(value, &schema);
        tx.apply(Operation::RemoveNode {
            path: Path::from([1]),
            node: Element::paragraph("two").into(),
        })
        .unwrap();
        assert_eq!(
            tx.value.selection,
            Some(Range::collapsed(Point::new([1, 0], 0)))
        );

        tx.apply(Operation::RemoveNode {
            path: Path::from([1]),
            node: Element::paragraph("three").into(),
        })
        .unwrap();
        assert_eq!(
            tx.value.selection,
            Some(Range::collapsed(Point::new([0, 0], 3)))
        );
    }

    #[test]
    fn removed_first_text_prefers_next() {
        let schema = Schema::default();
        let value = Value::new(vec![Element::new(
            crate::models::ElementType::Paragraph,
            vec![Node::text("a"), Node::text("b")],
        )
        .into()])
        .with_selection(Range::collapsed(Point::new([0, 0], 1)));
        let mut tx = Transaction::new(value, &schema);
        tx.apply(Operation::RemoveNode {
            path: Path::from([0, 0]),
            node: Node::text("a"),
        })
        .unwrap();
        assert_eq!(
            tx.value.selection,
            Some(Range::collapsed(Point::new([0, 0], 0)))
        );
    }

    #[test]
    fn inward_range_does_not_grow() {
        let schema = Schema::default();
        let mut tx = Transaction::new(three_paragraphs(), &schema);
        let range = tx.range_ref(
            Range::new(Point::new([0, 0], 1), Point::new([0, 0], 2)),
            true,
        );
        tx.apply(Operation::InsertText {
            path: Path::from([0, 0]),
            offset: 2,
            text: "xx".into(),
        })
        .unwrap();
        tx.apply(Operation::InsertText {
            path: Path::from([0, 0]),
            offset: 1,
            text: "yy".into(),
        })
        .unwrap();
        assert_eq!(
            tx.unref_range(range),
            Some(Range::new(Point::new([0, 0], 3), Point::new([0, 0], 4)))
        );
    }
}
