use crate::editing::{Operation, Transaction, TransformError};
use crate::models::{Affinity, Location, Path, Point, Range, Text};
use crate::query::{Unit, point_after, point_before};

impl Transaction<'_> {
    fn remove_text(&mut self, path: &Path, from: usize, to: usize) -> Result<(), TransformError> {
        if from >= to {
            return Ok(());
        }
        let text = self
            .value
            .text(path)
            .and_then(|t| t.text.get(from..to))
            .ok_or_else(|| TransformError::InvalidOffset {
                path: path.clone(),
                offset: to,
            })?
            .to_string();
        self.apply(Operation::RemoveText {
            path: path.clone(),
            offset: from,
            text,
        })
    }

    /// Types `text` at the cursor. Pending marks go onto a new leaf and are
    /// consumed. Text is never typed into a void.
    pub(crate) fn insert_text(
        &mut self,
        text: &str,
        at: Option<Location>,
    ) -> Result<(), TransformError> {
        if text.is_empty() {
            return Ok(());
        }
        let from_selection = at.is_none();
        let Some(at) = self.resolve_at(at)? else {
            return Ok(());
        };
        let range = match at {
            Location::Path(path) => self
                .value
                .range_of(&path)
                .ok_or(TransformError::InvalidPath(path))?,
            Location::Point(point) => Range::collapsed(point),
            Location::Range(range) => range,
        };
        let point = if range.is_expanded() {
            let point = self.delete_fragment(&range)?;
            if from_selection {
                self.set_selection(Some(Range::collapsed(point.clone())))?;
            }
            point
        } else {
            range.anchor
        };

        if self.value.void_above(&point.path, self.schema()).is_some() {
            return Ok(());
        }
        if from_selection && let Some(marks) = self.value.marks.clone() {
            let leaf = Text::with_marks(text, marks);
            return self.insert_nodes(vec![leaf.into()], Some(Location::Point(point)), Some(true));
        }
        self.apply(Operation::InsertText {
            path: point.path,
            offset: point.offset,
            text: text.to_string(),
        })
    }

    /// Removes the content of `range` and joins the leaf blocks at its
    /// edges. Returns where the start edge ends up.
    pub(crate) fn delete_fragment(&mut self, range: &Range) -> Result<Point, TransformError> {
        let (mut start, mut end) = range.edges();
        if range.is_collapsed() {
            return Ok(start);
        }
        let schema = self.schema();

        if let Some(void) = self.value.void_above(&start.path, schema) {
            start = match self.value.previous_text(&void) {
                Some(previous) => self.value.end(&previous),
                None => self.value.start(&void),
            }
            .ok_or(TransformError::InvalidPath(void))?;
        }
        if let Some(void) = self.value.void_above(&end.path, schema) {
            end = match self.value.next_text(&void) {
                Some(next) => self.value.start(&next),
                None => self.value.end(&void),
            }
            .ok_or(TransformError::InvalidPath(void))?;
        }

        if start.path == end.path {
            self.remove_text(&start.path, start.offset, end.offset)?;
            return Ok(start);
        }

        let start_block = self.value.leaf_block_of(&start.path, schema);
        let end_block = self.value.leaf_block_of(&end.path, schema);
        let start_ref = self.point_ref(start.clone(), Affinity::Backward);
        let end_ref = self.point_ref(end.clone(), Affinity::Forward);
        let start_block_ref = start_block.map(|block| self.path_ref(block, Affinity::Backward));
        let end_block_ref = end_block.map(|block| self.path_ref(block, Affinity::Forward));

        let mut doomed: Vec<Path> = Vec::new();
        for (node, path) in self.value.nodes_between(&start.path, &end.path) {
            if doomed.last().is_some_and(|last| last.is_ancestor_of(&path)) {
                continue;
            }
            let on_edge = |edge: &Path| path == *edge || path.is_ancestor_of(edge);
            if node.is_void(schema) || !(on_edge(&start.path) || on_edge(&end.path)) {
                doomed.push(path);
            }
        }
        let doomed: Vec<_> = doomed
            .into_iter()
            .map(|path| self.path_ref(path, Affinity::Forward))
            .collect();

        let start_len = self.value.text(&start.path).map_or(0, Text::len);
        self.remove_text(&start.path, start.offset, start_len)?;
        for r in doomed {
            if let Some(path) = self.unref_path(r) {
                self.remove_node(&path)?;
            }
        }
        if let Some(end) = self.unref_point(end_ref) {
            self.remove_text(&end.path, 0, end.offset)?;
        }

        let start_block = start_block_ref.and_then(|r| self.unref_path(r));
        let end_block = end_block_ref.and_then(|r| self.unref_path(r));
        if let (Some(target), Some(source)) = (start_block, end_block)
            && target != source
        {
            self.join_blocks(&target, &source)?;
        }

        Ok(self.unref_point(start_ref).unwrap_or(start))
    }

    /// Moves the content of `source` onto the end of `target`, then removes
    /// `source` together with any ancestors it leaves empty.
    fn join_blocks(&mut self, target: &Path, source: &Path) -> Result<(), TransformError> {
        let count = self.value.children_at(source).map_or(0, <[_]>::len);
        for _ in 0..count {
            let len = self.value.children_at(target).map_or(0, <[_]>::len);
            self.move_node(&source.child(0), &target.child(len))?;
        }

        let mut doomed = source.clone();
        while let Some(parent) = doomed.parent()
            && !parent.is_root()
            && !parent.is_ancestor_of(target)
            && self.value.children_at(&parent).map_or(0, <[_]>::len) == 1
        {
            doomed = parent;
        }
        self.remove_node(&doomed)
    }

    pub(super) fn delete_selection(&mut self) -> Result<(), TransformError> {
        match self.value.selection.clone() {
            Some(selection) if selection.is_expanded() => {
                let point = self.delete_fragment(&selection)?;
                self.set_selection(Some(Range::collapsed(point)))
            }
            _ => Ok(()),
        }
    }

    /// Deletes the selection, or one `unit` next to a collapsed cursor. A
    /// cursor inside a void deletes the void.
    pub(crate) fn delete(&mut self, unit: Unit, reverse: bool) -> Result<(), TransformError> {
        let Some(selection) = self.value.selection.clone() else {
            return Ok(());
        };
        if selection.is_expanded() {
            return self.delete_selection();
        }

        let point = selection.anchor;
        if let Some(void) = self.value.void_above(&point.path, self.schema()) {
            return self.remove_node(&void);
        }
        let target = if reverse {
            point_before(&self.value, self.schema(), &point, unit)
        } else {
            point_after(&self.value, self.schema(), &point, unit)
        };
        let Some(target) = target else {
            return Ok(());
        };
        let point = self.delete_fragment(&Range::new(point, target))?;
        self.set_selection(Some(Range::collapsed(point)))
    }

    /// Splits the current leaf block at the cursor. The cursor lands at the
    /// start of the new block.
    pub(crate) fn insert_break(&mut self) -> Result<(), TransformError> {
        let Some(selection) = self.value.selection.clone() else {
            return Ok(());
        };
        let point = if selection.is_expanded() {
            let point = self.delete_fragment(&selection)?;
            self.set_selection(Some(Range::collapsed(point.clone())))?;
            point
        } else {
            selection.anchor
        };
        let Some(block) = self.value.leaf_block_of(&point.path, self.schema()) else {
            return Ok(());
        };
        self.split_nodes(&point, &block, true)
    }
}

#[cfg(test)]
mod tests {
    use crate::editing::{Cmd, Transaction};
    use crate::models::{
        Element, ElementType, Mark, Marks, Node, Point, Range, Schema, Text, Value,
    };
    use crate::query::Unit;
    use pretty_assertions::assert_eq;

    fn run(value: Value, cmds: Vec<Cmd>) -> Value {
        let schema = Schema::default();
        let mut tx = Transaction::new(value, &schema);
        for cmd in cmds {
            tx.run(cmd).unwrap();
        }
        tx.finish().0
    }

    fn caret(path: impl Into<crate::models::Path>, offset: usize) -> Range {
        Range::collapsed(Point::new(path, offset))
    }

    #[test]
    fn typing_shifts_the_cursor() {
        let value = Value::new(vec![Element::paragraph("ac").into()]).with_selection(caret([0, 0], 1));
        let value = run(value, vec![Cmd::insert_text("b")]);
        assert_eq!(value.children[0].string(), "abc");
        assert_eq!(value.selection, Some(caret([0, 0], 2)));
    }

    #[test]
    fn pending_marks_go_on_a_new_leaf() {
        let mut value = Value::new(vec![Element::paragraph("ab").into()]).with_selection(caret([0, 0], 1));
        value.marks = Some(Marks::from([Mark::Bold]));
        let value = run(value, vec![Cmd::insert_text("X")]);
        assert_eq!(
            value.children[0].children(),
            &[
                Node::text("a"),
                Text::with_marks("X", [Mark::Bold]).into(),
                Node::text("b"),
            ]
        );
        assert_eq!(value.marks, None);
        assert_eq!(value.selection, Some(caret([0, 1], 1)));
    }

    #[test]
    fn backspace_at_block_start_joins_blocks() {
        let value = Value::new(vec![
            Element::paragraph("one").into(),
            Element::paragraph("two").into(),
        ])
        .with_selection(caret([1, 0], 0));
        let value = run(
            value,
            vec![Cmd::Delete {
                unit: Unit::Character,
                reverse: true,
            }],
        );
        assert_eq!(value.children.len(), 1);
        assert_eq!(value.children[0].string(), "onetwo");
        assert_eq!(value.selection, Some(caret([0, 0], 3)));
    }

    #[test]
    fn deleting_across_blocks_keeps_the_start_block() {
        let value = Value::new(vec![
            Element::new(ElementType::HeadingOne, vec![Node::text("title")]).into(),
            Element::paragraph("middle").into(),
            Element::paragraph("tail end").into(),
        ])
        .with_selection(Range::new(Point::new([0, 0], 2), Point::new([2, 0], 4)));
        let value = run(value, vec![Cmd::DeleteFragment]);
        assert_eq!(value.children.len(), 1);
        assert_eq!(
            value.children[0].as_element().map(|e| e.kind),
            Some(ElementType::HeadingOne)
        );
        assert_eq!(value.children[0].string(), "ti end");
        assert_eq!(value.selection, Some(caret([0, 0], 2)));
    }

    #[test]
    fn backspace_after_a_mention_removes_it() {
        let value = Value::new(vec![
            Element::new(
                ElementType::Paragraph,
                vec![Node::text("hi "), Element::mention("mark").into(), Node::text("")],
            )
            .into(),
        ])
        .with_selection(caret([0, 2], 0));
        let value = run(
            value,
            vec![Cmd::Delete {
                unit: Unit::Character,
                reverse: true,
            }],
        );
        assert_eq!(
            value.children[0].children(),
            &[Node::text("hi "), Node::text("")]
        );
        assert_eq!(value.selection, Some(caret([0, 0], 3)));
    }

    #[test]
    fn enter_splits_the_block() {
        let value = Value::new(vec![Element::paragraph("split").into()]).with_selection(caret([0, 0], 2));
        let value = run(value, vec![Cmd::InsertBreak]);
        let texts: Vec<String> = value.children.iter().map(Node::string).collect();
        assert_eq!(texts, vec!["sp", "lit"]);
        assert_eq!(value.selection, Some(caret([1, 0], 0)));
    }

    #[test]
    fn enter_at_the_end_opens_an_empty_block() {
        let value = Value::new(vec![Element::paragraph("end").into()]).with_selection(caret([0, 0], 3));
        let value = run(value, vec![Cmd::InsertBreak]);
        assert_eq!(value.children[1], Element::paragraph("").into());
        assert_eq!(value.selection, Some(caret([1, 0], 0)));
    }
}
