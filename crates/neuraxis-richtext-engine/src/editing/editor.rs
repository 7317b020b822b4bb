use log::{debug, warn};

use super::{Cmd, Operation, Transaction, TransformError};
use crate::models::{Schema, Value};

/// Result of a successful edit: the new value and the operations that
/// produced it, normalization included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub value: Value,
    pub operations: Vec<Operation>,
}

impl Change {
    pub fn is_noop(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Stateless transform engine for one schema.
///
/// Every call takes a snapshot and returns a new one. The input is never
/// touched; when any command in a batch fails, nothing is returned but the
/// error.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    schema: Schema,
}

impl Editor {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn apply(&self, value: &Value, cmd: Cmd) -> Result<Change, TransformError> {
        self.apply_all(value, [cmd])
    }

    /// Runs commands in order on one working copy, normalizing after each.
    pub fn apply_all(
        &self,
        value: &Value,
        cmds: impl IntoIterator<Item = Cmd>,
    ) -> Result<Change, TransformError> {
        let mut tx = Transaction::new(value.clone(), &self.schema);
        for cmd in cmds {
            debug!("run {cmd:?}");
            if let Err(err) = tx.run(cmd).and_then(|()| tx.normalize()) {
                warn!("edit rejected after {} operations: {err}", tx.operations().len());
                return Err(err);
            }
        }
        let (value, operations) = tx.finish();
        Ok(Change { value, operations })
    }

    /// Canonical form of `value`.
    pub fn normalize(&self, value: &Value) -> Result<Change, TransformError> {
        let mut tx = Transaction::new(value.clone(), &self.schema);
        tx.normalize()?;
        let (value, operations) = tx.finish();
        Ok(Change { value, operations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Element, ElementType, Node, Path, Point, Range};
    use crate::query::Unit;
    use pretty_assertions::assert_eq;

    #[test]
    fn failed_batch_leaves_input_alone() {
        let editor = Editor::default();
        let value = Value::new(vec![Element::paragraph("keep").into()])
            .with_selection(Range::collapsed(Point::new([0, 0], 4)));
        let before = value.clone();
        let err = editor
            .apply_all(
                &value,
                [
                    Cmd::insert_text("!"),
                    Cmd::RemoveNodes {
                        options: crate::editing::NodeOptions::default().at(Path::from([3])),
                    },
                ],
            )
            .unwrap_err();
        assert_eq!(err, TransformError::InvalidPath(Path::from([3])));
        assert_eq!(value, before);
    }

    #[test]
    fn each_command_sees_normalized_input() {
        let editor = Editor::default();
        let value = Value::new(vec![Element::paragraph("ab").into()])
            .with_selection(Range::collapsed(Point::new([0, 0], 1)));
        let change = editor
            .apply_all(
                &value,
                [
                    Cmd::insert(Element::mention("erinn")),
                    Cmd::step(1, Unit::Offset, false),
                    Cmd::insert_text("!"),
                ],
            )
            .unwrap();
        assert_eq!(
            change.value.children[0],
            Element::new(
                ElementType::Paragraph,
                vec![Node::text("a"), Element::mention("erinn").into(), Node::text("!b")],
            )
            .into()
        );
        assert_eq!(
            change.value.selection,
            Some(Range::collapsed(Point::new([0, 2], 1)))
        );
    }

    #[test]
    fn normalizing_canonical_value_is_a_noop() {
        let editor = Editor::default();
        let value = Value::new(vec![Element::paragraph("fine").into()]);
        assert!(editor.normalize(&value).unwrap().is_noop());
    }
}
