use std::fmt::Write;

use crate::models::{Node, Point, Value};

/// One line per node, indented by depth:
///
/// ```text
/// paragraph
///   "hi "
///   mention username=mark
///     ""
///   "!" +bold
/// selection [0,2]@1
/// marks +code
/// ```
pub fn outline(value: &Value) -> String {
    let mut out = String::new();
    for node in &value.children {
        write_node(&mut out, node, 0);
    }
    if let Some(selection) = &value.selection {
        if selection.is_collapsed() {
            let _ = writeln!(out, "selection {}", point(&selection.anchor));
        } else {
            let _ = writeln!(
                out,
                "selection {} -> {}",
                point(&selection.anchor),
                point(&selection.focus)
            );
        }
    }
    if let Some(marks) = &value.marks {
        out.push_str("marks");
        if marks.is_empty() {
            out.push_str(" (none)");
        }
        for mark in marks {
            let _ = write!(out, " +{mark}");
        }
        out.push('\n');
    }
    out
}

fn point(point: &Point) -> String {
    format!("{}@{}", point.path, point.offset)
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        Node::Text(text) => {
            let _ = write!(out, "{indent}{:?}", text.text);
            for mark in &text.marks {
                let _ = write!(out, " +{mark}");
            }
            out.push('\n');
        }
        Node::Element(element) => {
            let _ = write!(out, "{indent}{}", element.kind);
            for (key, value) in &element.attributes {
                let _ = write!(out, " {key}={value}");
            }
            out.push('\n');
            for child in &element.children {
                write_node(out, child, depth + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Element, ElementType, Mark, Range, Text};

    #[test]
    fn nested_list_with_mention() {
        let value = Value::new(vec![
            Element::new(
                ElementType::BulletedList,
                vec![
                    Element::new(
                        ElementType::ListItem,
                        vec![
                            Node::text("ping "),
                            Element::mention("travis").into(),
                            Text::with_marks(" now", [Mark::Bold, Mark::Italic]).into(),
                        ],
                    )
                    .into(),
                ],
            )
            .into(),
        ])
        .with_selection(Range::new(Point::new([0, 0, 0], 1), Point::new([0, 0, 2], 4)));

        insta::assert_snapshot!(outline(&value), @r#"
        bulleted-list
          list-item
            "ping "
            mention username=travis
              ""
            " now" +bold +italic
        selection [0,0,0]@1 -> [0,0,2]@4
        "#);
    }
}
