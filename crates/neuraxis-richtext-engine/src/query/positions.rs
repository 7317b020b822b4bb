//! Stepping a point backwards and forwards through the document.
//!
//! Each leaf block is flattened into a string in which every text leaf
//! contributes its own text and every void inline contributes a single
//! [`PLACEHOLDER`] character, so one step crosses a whole void.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::models::{Node, Path, Point, Schema, Value};

/// Stand-in character for a void inline in a flattened block.
pub const PLACEHOLDER: char = '\u{FFFC}';

/// Granularity of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// One `char`.
    #[default]
    Offset,
    /// One extended grapheme cluster.
    Character,
    /// Separators, then one run of alphanumeric characters.
    Word,
}

#[derive(Debug, Clone)]
struct Segment {
    /// Text leaf, or the void element itself.
    path: Path,
    start: usize,
    end: usize,
    void: bool,
}

/// A leaf block flattened into a single string.
#[derive(Debug, Clone)]
pub(crate) struct BlockText {
    pub(crate) text: String,
    segments: Vec<Segment>,
}

impl BlockText {
    pub(crate) fn build(value: &Value, block: &Path, schema: &Schema) -> Option<Self> {
        let children = value.children_at(block)?;
        let mut flat = BlockText {
            text: String::new(),
            segments: Vec::new(),
        };
        flat.collect(children, block, schema);
        Some(flat)
    }

    fn collect(&mut self, nodes: &[Node], parent: &Path, schema: &Schema) {
        for (index, node) in nodes.iter().enumerate() {
            let path = parent.child(index);
            let start = self.text.len();
            match node {
                Node::Text(text) => {
                    self.text.push_str(&text.text);
                    self.segments.push(Segment {
                        path,
                        start,
                        end: self.text.len(),
                        void: false,
                    });
                }
                Node::Element(element) if schema.is_void(element) => {
                    self.text.push(PLACEHOLDER);
                    self.segments.push(Segment {
                        path,
                        start,
                        end: self.text.len(),
                        void: true,
                    });
                }
                Node::Element(element) => self.collect(&element.children, &path, schema),
            }
        }
    }

    /// Flattened offset of `point`. A point inside a void stands on it: a
    /// step in either direction lands on the far side.
    pub(crate) fn offset_of(&self, point: &Point, forward: bool) -> Option<usize> {
        self.segments.iter().find_map(|segment| {
            if segment.void && segment.path.is_ancestor_of(&point.path) {
                Some(if forward { segment.start } else { segment.end })
            } else if !segment.void && segment.path == point.path {
                Some(segment.start + point.offset.min(segment.end - segment.start))
            } else {
                None
            }
        })
    }

    /// Point at a flattened offset, preferring the earliest text leaf that
    /// touches it.
    pub(crate) fn point_at(&self, offset: usize) -> Option<Point> {
        let text = self
            .segments
            .iter()
            .find(|s| !s.void && s.start <= offset && offset <= s.end);
        if let Some(segment) = text {
            return Some(Point::new(segment.path.clone(), offset - segment.start));
        }
        self.segments
            .iter()
            .find(|s| s.void && s.start <= offset && offset < s.end)
            .map(|segment| Point::new(segment.path.child(0), 0))
    }

    fn len(&self) -> usize {
        self.text.len()
    }
}

fn is_word_grapheme(grapheme: &str) -> bool {
    grapheme.chars().all(char::is_alphanumeric)
}

/// Byte length of one step of `unit` at the end of `text` (backwards) or the
/// start of it (forwards).
fn step_len(text: &str, unit: Unit, forward: bool) -> usize {
    match (unit, forward) {
        (Unit::Offset, false) => text.chars().next_back().map_or(0, char::len_utf8),
        (Unit::Offset, true) => text.chars().next().map_or(0, char::len_utf8),
        (Unit::Character, false) => text.graphemes(true).next_back().map_or(0, str::len),
        (Unit::Character, true) => text.graphemes(true).next().map_or(0, str::len),
        (Unit::Word, _) => {
            let mut distance = 0;
            let mut started = false;
            let graphemes: Box<dyn Iterator<Item = &str>> = if forward {
                Box::new(text.graphemes(true))
            } else {
                Box::new(text.graphemes(true).rev())
            };
            for grapheme in graphemes {
                if is_word_grapheme(grapheme) {
                    started = true;
                } else if started {
                    break;
                }
                distance += grapheme.len();
            }
            distance
        }
    }
}

fn leaf_blocks(value: &Value, schema: &Schema) -> Vec<Path> {
    value
        .nodes()
        .filter(|(node, _)| node.is_leaf_block(schema))
        .map(|(_, path)| path)
        .collect()
}

fn step(value: &Value, schema: &Schema, point: &Point, unit: Unit, forward: bool) -> Option<Point> {
    let block = value.leaf_block_of(&point.path, schema)?;
    let flat = BlockText::build(value, &block, schema)?;
    let offset = flat.offset_of(point, forward)?;
    if !flat.text.is_char_boundary(offset) {
        return None;
    }

    let at_edge = if forward { offset >= flat.len() } else { offset == 0 };
    if at_edge {
        let blocks = leaf_blocks(value, schema);
        let position = blocks.iter().position(|b| *b == block)?;
        let neighbour = if forward {
            blocks.get(position + 1)?
        } else {
            blocks.get(position.checked_sub(1)?)?
        };
        let flat = BlockText::build(value, neighbour, schema)?;
        return flat.point_at(if forward { 0 } else { flat.len() });
    }

    let target = if forward {
        offset + step_len(&flat.text[offset..], unit, true)
    } else {
        offset - step_len(&flat.text[..offset], unit, false)
    };
    flat.point_at(target)
}

/// The nearest point strictly before `point` by one `unit`, or `None` at the
/// start of the document.
pub fn point_before(value: &Value, schema: &Schema, point: &Point, unit: Unit) -> Option<Point> {
    step(value, schema, point, unit, false)
}

/// The nearest point strictly after `point` by one `unit`, or `None` at the
/// end of the document.
pub fn point_after(value: &Value, schema: &Schema, point: &Point, unit: Unit) -> Option<Point> {
    step(value, schema, point, unit, true)
}

/// Repeats a step `distance` times. `None` when a document edge comes first.
pub fn point_by(
    value: &Value,
    schema: &Schema,
    point: &Point,
    distance: usize,
    unit: Unit,
    reverse: bool,
) -> Option<Point> {
    let mut current = point.clone();
    for _ in 0..distance {
        current = step(value, schema, &current, unit, !reverse)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Element, ElementType};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn doc(first: &str) -> Value {
        Value::new(vec![
            Element::paragraph(first).into(),
            Element::new(
                ElementType::Paragraph,
                vec![
                    Node::text("hi "),
                    Element::mention("margie").into(),
                    Node::text(" there"),
                ],
            )
            .into(),
        ])
    }

    #[rstest]
    #[case("hello @mar", 10, Unit::Word, 7)]
    #[case("hello @mar", 7, Unit::Offset, 6)]
    #[case("hello world  ", 13, Unit::Word, 6)]
    #[case("héllo", 3, Unit::Offset, 1)]
    #[case("e\u{301}x", 3, Unit::Character, 0)]
    fn steps_back_within_a_block(
        #[case] text: &str,
        #[case] from: usize,
        #[case] unit: Unit,
        #[case] expected: usize,
    ) {
        let value = doc(text);
        let schema = Schema::default();
        let before = point_before(&value, &schema, &Point::new([0, 0], from), unit);
        assert_eq!(before, Some(Point::new([0, 0], expected)));
    }

    #[test]
    fn word_forward_skips_leading_separators() {
        let value = doc("say  hello world");
        let schema = Schema::default();
        let after = point_after(&value, &schema, &Point::new([0, 0], 3), Unit::Word);
        assert_eq!(after, Some(Point::new([0, 0], 10)));
    }

    #[test]
    fn one_step_crosses_a_void() {
        let value = doc("x");
        let schema = Schema::default();
        let after_void = Point::new([1, 2], 0);
        assert_eq!(
            point_before(&value, &schema, &after_void, Unit::Offset),
            Some(Point::new([1, 0], 3))
        );
        assert_eq!(
            point_after(&value, &schema, &Point::new([1, 0], 3), Unit::Character),
            Some(Point::new([1, 2], 0))
        );
    }

    #[test]
    fn stepping_out_of_a_void_lands_past_it() {
        let value = doc("x");
        let schema = Schema::default();
        let inside = Point::new([1, 1, 0], 0);
        assert_eq!(
            point_after(&value, &schema, &inside, Unit::Offset),
            Some(Point::new([1, 2], 0))
        );
        assert_eq!(
            point_before(&value, &schema, &inside, Unit::Offset),
            Some(Point::new([1, 0], 3))
        );
    }

    #[test]
    fn block_edges_step_to_adjacent_block() {
        let value = doc("first");
        let schema = Schema::default();
        assert_eq!(
            point_before(&value, &schema, &Point::new([1, 0], 0), Unit::Offset),
            Some(Point::new([0, 0], 5))
        );
        assert_eq!(
            point_after(&value, &schema, &Point::new([0, 0], 5), Unit::Word),
            Some(Point::new([1, 0], 0))
        );
    }

    #[test]
    fn document_edges_have_no_neighbour() {
        let value = doc("first");
        let schema = Schema::default();
        assert_eq!(point_before(&value, &schema, &Point::new([0, 0], 0), Unit::Offset), None);
        assert_eq!(point_after(&value, &schema, &Point::new([1, 2], 6), Unit::Offset), None);
    }

    #[test]
    fn repeated_steps_stop_at_the_edge() {
        let value = doc("abc");
        let schema = Schema::default();
        let start = Point::new([0, 0], 3);
        assert_eq!(
            point_by(&value, &schema, &start, 2, Unit::Offset, true),
            Some(Point::new([0, 0], 1))
        );
        assert_eq!(point_by(&value, &schema, &start, 4, Unit::Offset, true), None);
    }
}
