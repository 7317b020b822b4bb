use crate::editing::{Operation, Transaction, TransformError};
use crate::models::{Edge, Location, Point, Range};
use crate::query::{Unit, clamp_range, point_by};

impl Transaction<'_> {
    /// Replaces the selection. Any change drops pending cursor marks.
    pub(crate) fn set_selection(&mut self, selection: Option<Range>) -> Result<(), TransformError> {
        let current = self.value.selection.clone();
        if current == selection {
            return Ok(());
        }
        if let Some(marks) = self.value.marks.clone() {
            self.apply(Operation::SetMarks {
                marks: Some(marks),
                new_marks: None,
            })?;
        }
        self.apply(Operation::SetSelection {
            selection: current,
            new_selection: selection,
        })
    }

    /// Selects a location, clamped to valid points. A path selects its
    /// whole content and must resolve.
    pub(crate) fn select(&mut self, target: Location) -> Result<(), TransformError> {
        let range = match target {
            Location::Path(path) => self
                .value
                .range_of(&path)
                .ok_or(TransformError::InvalidPath(path))?,
            Location::Point(point) => Range::collapsed(point),
            Location::Range(range) => range,
        };
        let range = clamp_range(&self.value, &range);
        self.set_selection(range)
    }

    pub(crate) fn collapse(&mut self, edge: Edge) -> Result<(), TransformError> {
        match self.value.selection.clone() {
            Some(selection) => self.set_selection(Some(Range::collapsed(selection.point(edge)))),
            None => Ok(()),
        }
    }

    /// Steps the anchor, the focus, or both. An end that would leave the
    /// document stays where it is.
    pub(crate) fn move_selection(
        &mut self,
        distance: usize,
        unit: Unit,
        reverse: bool,
        edge: Option<Edge>,
    ) -> Result<(), TransformError> {
        let Some(selection) = self.value.selection.clone() else {
            return Ok(());
        };
        let backward = selection.is_backward();
        let edge = match edge {
            Some(Edge::Start) if backward => Some(Edge::Focus),
            Some(Edge::Start) => Some(Edge::Anchor),
            Some(Edge::End) if backward => Some(Edge::Anchor),
            Some(Edge::End) => Some(Edge::Focus),
            other => other,
        };

        let schema = self.schema();
        let step = |point: &Point| point_by(&self.value, schema, point, distance, unit, reverse);
        let mut moved = selection.clone();
        if edge != Some(Edge::Focus)
            && let Some(anchor) = step(&selection.anchor)
        {
            moved.anchor = anchor;
        }
        if edge != Some(Edge::Anchor)
            && let Some(focus) = step(&selection.focus)
        {
            moved.focus = focus;
        }
        self.set_selection(Some(moved))
    }
}

#[cfg(test)]
mod tests {
    use crate::editing::{Cmd, Transaction};
    use crate::models::{Edge, Element, Mark, Marks, Path, Point, Range, Schema, Value};
    use crate::query::Unit;
    use pretty_assertions::assert_eq;

    fn value() -> Value {
        Value::new(vec![
            Element::paragraph("hello").into(),
            Element::paragraph("world").into(),
        ])
        .with_selection(Range::collapsed(Point::new([0, 0], 5)))
    }

    #[test]
    fn moving_clears_pending_marks() {
        let schema = Schema::default();
        let mut value = value();
        value.marks = Some(Marks::from([Mark::Bold]));
        let mut tx = Transaction::new(value, &schema);
        tx.run(Cmd::step(1, Unit::Offset, false)).unwrap();
        assert_eq!(tx.value.marks, None);
        assert_eq!(
            tx.value.selection,
            Some(Range::collapsed(Point::new([1, 0], 0)))
        );
    }

    #[test]
    fn moving_past_the_end_keeps_the_point() {
        let schema = Schema::default();
        let value = value().with_selection(Range::collapsed(Point::new([1, 0], 5)));
        let mut tx = Transaction::new(value, &schema);
        tx.run(Cmd::step(1, Unit::Word, false)).unwrap();
        assert!(tx.operations().is_empty());
    }

    #[test]
    fn extending_the_focus_keeps_the_anchor() {
        let schema = Schema::default();
        let mut tx = Transaction::new(value(), &schema);
        tx.run(Cmd::Move {
            distance: 2,
            unit: Unit::Offset,
            reverse: true,
            edge: Some(Edge::Focus),
        })
        .unwrap();
        assert_eq!(
            tx.value.selection,
            Some(Range::new(Point::new([0, 0], 5), Point::new([0, 0], 3)))
        );
    }

    #[test]
    fn selecting_a_path_covers_its_content() {
        let schema = Schema::default();
        let mut tx = Transaction::new(value(), &schema);
        tx.run(Cmd::select(Path::from([1]))).unwrap();
        assert_eq!(
            tx.value.selection,
            Some(Range::new(Point::new([1, 0], 0), Point::new([1, 0], 5)))
        );
        tx.run(Cmd::Collapse { edge: Edge::Start }).unwrap();
        assert_eq!(
            tx.value.selection,
            Some(Range::collapsed(Point::new([1, 0], 0)))
        );
    }

    #[test]
    fn selecting_an_out_of_range_point_clamps() {
        let schema = Schema::default();
        let mut tx = Transaction::new(value(), &schema);
        tx.run(Cmd::select(Point::new([1, 0], 99))).unwrap();
        assert_eq!(
            tx.value.selection,
            Some(Range::collapsed(Point::new([1, 0], 5)))
        );
    }
}
