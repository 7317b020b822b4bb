use crate::models::{Node, NodeRef, Path, Schema, Value};

/// Validates that `value` is in canonical form.
///
/// Asserts that:
/// - Every void holds exactly one empty text
/// - Every non-root element has at least one child
/// - Containers hold only blocks
/// - Inline content starts and ends with a text and has a text on both
///   sides of every inline element
/// - No two adjacent texts carry the same marks
/// - Both selection points name a text and a char boundary inside it
///
/// # Panics
/// Panics with a descriptive message if any invariant is violated.
pub fn check(value: &Value, schema: &Schema) {
    for (node, path) in value.nodes() {
        if node.is_text() {
            continue;
        }
        let children = node.children();

        if node.is_void(schema) {
            assert!(
                matches!(children, [Node::Text(text)] if text.is_empty()),
                "void at {path} must hold a single empty text, has {children:?}"
            );
            continue;
        }

        if !node.is_root() {
            assert!(!children.is_empty(), "empty element at {path}");
        }

        let is_list = node.as_element().is_some_and(|e| e.kind.is_list());
        if node.is_root() || is_list || node.has_block_children(schema) {
            check_container(children, &path, schema);
        } else {
            check_inline_run(children, &path, schema);
        }
    }

    if let Some(selection) = &value.selection {
        for point in [&selection.anchor, &selection.focus] {
            assert!(
                value.is_valid_point(point),
                "selection point {}@{} is not on a text char boundary",
                point.path,
                point.offset
            );
        }
    }
}

fn check_container(children: &[Node], path: &Path, schema: &Schema) {
    for (index, child) in children.iter().enumerate() {
        assert!(
            NodeRef::from(child).is_block(schema),
            "non-block child in container at {}",
            path.child(index)
        );
    }
}

fn check_inline_run(children: &[Node], path: &Path, schema: &Schema) {
    assert!(
        matches!(children.first(), Some(Node::Text(_))),
        "inline content at {path} must start with a text"
    );
    assert!(
        matches!(children.last(), Some(Node::Text(_))),
        "inline content at {path} must end with a text"
    );
    for (index, pair) in children.windows(2).enumerate() {
        match pair {
            [Node::Text(left), Node::Text(right)] => assert!(
                left.marks != right.marks,
                "mergeable texts at {} and {}",
                path.child(index),
                path.child(index + 1)
            ),
            [Node::Element(left), Node::Element(right)] => assert!(
                !schema.is_inline(left) || !schema.is_inline(right),
                "adjacent inlines at {} without a text between",
                path.child(index)
            ),
            _ => {}
        }
    }
    for (index, child) in children.iter().enumerate() {
        assert!(
            !NodeRef::from(child).is_block(schema),
            "block child in inline content at {}",
            path.child(index)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Element, ElementType, Mark, Point, Range, Text};

    fn schema() -> Schema {
        Schema::default()
    }

    #[test]
    fn canonical_value_passes() {
        let value = Value::new(vec![
            Element::new(
                ElementType::Paragraph,
                vec![
                    Node::text("a"),
                    Element::mention("ben").into(),
                    Text::with_marks("b", [Mark::Italic]).into(),
                ],
            )
            .into(),
        ])
        .with_selection(Range::collapsed(Point::new([0, 1, 0], 0)));
        check(&value, &schema());
    }

    #[test]
    #[should_panic(expected = "mergeable texts")]
    fn same_marked_neighbours_fail() {
        let value = Value::new(vec![
            Element::new(ElementType::Paragraph, vec![Node::text("a"), Node::text("b")]).into(),
        ]);
        check(&value, &schema());
    }

    #[test]
    #[should_panic(expected = "must end with a text")]
    fn trailing_mention_fails() {
        let value = Value::new(vec![
            Element::new(
                ElementType::Paragraph,
                vec![Node::text("a"), Element::mention("ben").into()],
            )
            .into(),
        ]);
        check(&value, &schema());
    }

    #[test]
    #[should_panic(expected = "non-block child in container")]
    fn text_directly_in_a_list_fails() {
        let value = Value::new(vec![
            Element::new(ElementType::BulletedList, vec![Node::text("")]).into(),
        ]);
        check(&value, &schema());
    }

    #[test]
    #[should_panic(expected = "not on a text char boundary")]
    fn selection_on_an_element_fails() {
        let value = Value::new(vec![Element::paragraph("a").into()])
            .with_selection(Range::collapsed(Point::new([0], 0)));
        check(&value, &schema());
    }
}
