use crate::models::{Marks, Point, Schema, Value};

/// Marks carried by the leaf a cursor at `point` would type into.
///
/// At offset 0 the cursor continues the previous text in the same block,
/// unless it sits inside a markable void.
pub fn marks_at(value: &Value, schema: &Schema, point: &Point) -> Marks {
    let Some(text) = value.text(&point.path) else {
        return Marks::new();
    };
    let in_markable_void = value
        .void_above(&point.path, schema)
        .and_then(|void| value.element(&void))
        .is_some_and(|element| schema.is_markable_void(element));
    if point.offset == 0
        && !in_markable_void
        && let Some(block) = value.leaf_block_of(&point.path, schema)
        && let Some(previous) = value.previous_text(&point.path)
        && block.is_ancestor_of(&previous)
        && let Some(previous) = value.text(&previous)
    {
        return previous.marks.clone();
    }
    text.marks.clone()
}

/// Marks the next typed character would get: pending marks first, then the
/// leaf at the cursor. For an expanded selection, the leaf at the focus,
/// taken from the side inside the selection. `None` without a selection.
pub fn current_marks(value: &Value, schema: &Schema) -> Option<Marks> {
    if let Some(marks) = &value.marks {
        return Some(marks.clone());
    }
    let selection = value.selection.as_ref()?;
    if selection.is_collapsed() {
        return Some(marks_at(value, schema, &selection.anchor));
    }

    let focus = &selection.focus;
    let text = value.text(&focus.path)?;
    let inward = if selection.is_backward() {
        (focus.offset == text.len())
            .then(|| value.next_text(&focus.path))
            .flatten()
    } else {
        (focus.offset == 0)
            .then(|| value.previous_text(&focus.path))
            .flatten()
    };
    match inward.and_then(|path| value.text(&path)) {
        Some(neighbour) => Some(neighbour.marks.clone()),
        None => Some(text.marks.clone()),
    }
}
