mod common;

use common::fixture;
use neuraxis_richtext_engine::editing::{Cmd, Editor};
use neuraxis_richtext_engine::formatting::{is_block_active, toggle_block, toggle_mark};
use neuraxis_richtext_engine::models::{
    Element, ElementType, Mark, Node, NodeRef, Path, Point, Range, Text, Value,
};
use neuraxis_richtext_engine::snapshot;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("welcome")]
#[case("messy")]
fn normalization_is_idempotent(#[case] name: &str) {
    let editor = Editor::default();
    let once = editor.normalize(&fixture(name)).unwrap();
    snapshot::invariants(&once.value, editor.schema());

    let twice = editor.normalize(&once.value).unwrap();
    assert!(twice.is_noop(), "second pass changed {name}: {:?}", twice.operations);
    assert_eq!(twice.value, once.value);
}

#[test]
fn messy_voids_end_up_with_one_empty_text() {
    let editor = Editor::default();
    let value = editor.normalize(&fixture("messy")).unwrap().value;

    let mentions: Vec<_> = value
        .nodes()
        .filter(|(node, _)| node.is_void(editor.schema()))
        .map(|(node, _)| node.children().to_vec())
        .collect();
    assert_eq!(mentions, vec![vec![Node::text("")]]);
}

#[test]
fn messy_texts_with_equal_marks_are_merged() {
    let editor = Editor::default();
    let value = editor.normalize(&fixture("messy")).unwrap().value;

    assert_eq!(value.string(&Path::new([0])), "ab");
    assert_eq!(
        value.children[2].children()[0].children(),
        &[Text::with_marks("xyz", [Mark::Bold]).into()]
    );
}

#[test]
fn every_command_leaves_canonical_form() {
    let editor = Editor::default();
    let mut value = fixture("welcome");
    let script = [
        Cmd::insert_text(" Thanks"),
        Cmd::InsertBreak,
        Cmd::AddMark { mark: Mark::Code },
        Cmd::insert_text("code"),
        Cmd::Select {
            target: Range::new(Point::new([0, 0], 0), Point::new([1, 0], 2)).into(),
        },
        Cmd::DeleteFragment,
        Cmd::insert(Element::mention("erinn")),
    ];
    for cmd in script {
        value = editor.apply(&value, cmd).unwrap().value;
        snapshot::invariants(&value, editor.schema());
    }
    assert_eq!(value.children.len(), 1);
}

#[test]
fn mark_toggle_across_a_mention_is_an_identity() {
    let editor = Editor::default();
    let value = fixture("welcome")
        .with_selection(Range::new(Point::new([0, 0], 5), Point::new([0, 2], 2)));

    let on = toggle_mark(&editor, &value, Mark::Bold).unwrap().value;
    snapshot::invariants(&on, editor.schema());
    let bold_texts = on
        .texts()
        .filter(|(_, text)| text.marks.contains(&Mark::Bold))
        .count();
    assert_eq!(bold_texts, 3);

    let off = toggle_mark(&editor, &on, Mark::Bold).unwrap().value;
    assert_eq!(off.children, value.children);
    assert_eq!(off.selection, value.selection);
}

#[rstest]
#[case(ElementType::HeadingOne)]
#[case(ElementType::HeadingTwo)]
#[case(ElementType::BulletedList)]
#[case(ElementType::NumberedList)]
fn block_toggle_twice_restores(#[case] format: ElementType) {
    let editor = Editor::default();
    let value = fixture("welcome");

    let on = toggle_block(&editor, &value, format).unwrap().value;
    snapshot::invariants(&on, editor.schema());
    assert!(is_block_active(&on, editor.schema(), format));

    let off = toggle_block(&editor, &on, format).unwrap().value;
    assert_eq!(off.children, value.children);
}

#[test]
fn commands_replay_from_json() {
    let script = r#"[
        {"cmd": "select", "target": {"path": [0, 0]}},
        {"cmd": "collapse", "edge": "start"},
        {"cmd": "insert_text", "text": "Note: "},
        {"cmd": "set_nodes", "properties": {"type": "heading-two"}}
    ]"#;
    let cmds: Vec<Cmd> = serde_json::from_str(script).unwrap();

    let editor = Editor::default();
    let value = editor.apply_all(&fixture("welcome"), cmds).unwrap().value;

    let heading = value.node(&Path::new([0])).and_then(NodeRef::as_element).unwrap();
    assert_eq!(heading.kind, ElementType::HeadingTwo);
    assert!(value.string(&Path::new([0])).starts_with("Note: This rich"));
}

#[test]
fn rejected_command_changes_nothing() {
    let editor = Editor::default();
    let value: Value = fixture("welcome");
    let result = editor.apply_all(
        &value,
        [
            Cmd::insert_text("lost"),
            Cmd::MoveNodes {
                to: Path::new([0, 1]),
                options: neuraxis_richtext_engine::editing::NodeOptions::default()
                    .at(Path::new([0])),
            },
        ],
    );
    assert!(result.is_err());
    assert_eq!(value, fixture("welcome"));
}
