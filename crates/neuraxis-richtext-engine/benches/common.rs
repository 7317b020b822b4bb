// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use neuraxis_richtext_engine::models::{
    Element, ElementType, Mark, Node, Point, Range, Text, Value,
};

/// `blocks` paragraphs of mixed text and mentions, cursor at the very end.
#[allow(dead_code)]
pub fn generate_document(blocks: usize) -> Value {
    let children: Vec<Node> = (0..blocks)
        .map(|i| {
            Element::new(
                ElementType::Paragraph,
                vec![
                    Node::text(format!("Paragraph {i} says hello to ")),
                    Element::mention("margie").into(),
                    Text::with_marks(" and some bold words", [Mark::Bold]).into(),
                    Element::mention("travis").into(),
                    Node::text("."),
                ],
            )
            .into()
        })
        .collect();
    let last = blocks.saturating_sub(1);
    Value::new(children).with_selection(Range::collapsed(Point::new([last, 4], 1)))
}

/// Same shape as [`generate_document`], as items of one bulleted list.
#[allow(dead_code)]
pub fn generate_list(items: usize) -> Value {
    let children = generate_document(items)
        .children
        .into_iter()
        .map(|node| match node {
            Node::Element(mut element) => {
                element.kind = ElementType::ListItem;
                element.into()
            }
            other => other,
        })
        .collect();
    let last = items.saturating_sub(1);
    Value::new(vec![Element::new(ElementType::BulletedList, children).into()])
        .with_selection(Range::collapsed(Point::new([0, last, 4], 1)))
}
