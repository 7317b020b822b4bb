use crate::models::{Path, Point, Range, Schema, Value};

/// Nearest valid point to `point`: offsets are clamped to the leaf and
/// floored to a char boundary; a point on an element moves to its start; a
/// point that no longer resolves moves to the end of the preceding text, or
/// the start of the document. `None` only for a document without text.
pub fn clamp_point(value: &Value, point: &Point) -> Option<Point> {
    if let Some(text) = value.text(&point.path) {
        let mut offset = point.offset.min(text.len());
        while !text.text.is_char_boundary(offset) {
            offset -= 1;
        }
        return Some(Point::new(point.path.clone(), offset));
    }
    if value.has(&point.path)
        && let Some(start) = value.start(&point.path)
    {
        return Some(start);
    }
    match value.previous_text(&point.path) {
        Some(previous) => value.end(&previous),
        None => value.start(&Path::root()),
    }
}

/// Both ends clamped, direction preserved.
pub fn clamp_range(value: &Value, range: &Range) -> Option<Range> {
    Some(Range::new(
        clamp_point(value, &range.anchor)?,
        clamp_point(value, &range.focus)?,
    ))
}

/// The range from `a` to `b`, each end clamped to a valid point.
pub fn range_between(value: &Value, a: &Point, b: &Point) -> Option<Range> {
    Some(Range::new(clamp_point(value, a)?, clamp_point(value, b)?))
}

/// Text content inside `range`, concatenated across leaves and blocks.
pub fn text_of(value: &Value, range: &Range) -> String {
    let (start, end) = range.edges();
    let mut out = String::new();
    for (node, path) in value.nodes_between(&start.path, &end.path) {
        let Some(text) = node.as_text() else {
            continue;
        };
        let len = text.len();
        let from = if path == start.path { start.offset.min(len) } else { 0 };
        let to = if path == end.path { end.offset.min(len) } else { len };
        if let Some(slice) = text.text.get(from..to) {
            out.push_str(slice);
        }
    }
    out
}

/// Pulls the end of an expanded range back out of a block it only touches.
///
/// When the end sits at offset 0 of the first text of a later leaf block,
/// the block was not really selected; the end moves to the end of the last
/// text before it. The result is forward.
pub fn unhang(value: &Value, schema: &Schema, range: &Range) -> Range {
    let (start, end) = range.edges();
    if range.is_collapsed() || end.offset != 0 {
        return range.clone();
    }
    let Some(block) = value.leaf_block_of(&end.path, schema) else {
        return range.clone();
    };
    if value.first_text(&block).as_ref() != Some(&end.path)
        || value.leaf_block_of(&start.path, schema).as_ref() == Some(&block)
    {
        return range.clone();
    }
    let Some(previous) = value.previous_text(&end.path) else {
        return range.clone();
    };
    if previous.is_before(&start.path) {
        return range.clone();
    }
    let len = value.text(&previous).map_or(0, |t| t.len());
    Range::new(start, Point::new(previous, len))
}
