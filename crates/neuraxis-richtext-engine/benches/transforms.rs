use criterion::{Criterion, criterion_group, criterion_main};
use neuraxis_richtext_engine::editing::{Cmd, Document, Editor, Key};
use neuraxis_richtext_engine::formatting::{toggle_block, toggle_mark};
use neuraxis_richtext_engine::models::{ElementType, Mark, Point, Range, Schema};
mod common;

fn bench_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("typing");
    group.sample_size(10);

    let editor = Editor::default();
    let value = common::generate_document(200);

    group.bench_function("insert_text", |b| {
        b.iter(|| {
            let change = editor.apply(
                std::hint::black_box(&value),
                Cmd::insert_text(std::hint::black_box("x")),
            );
            std::hint::black_box(change)
        });
    });

    group.bench_function("insert_break", |b| {
        b.iter(|| std::hint::black_box(editor.apply(&value, Cmd::InsertBreak)));
    });

    group.bench_function("document_mention_roundtrip", |b| {
        b.iter(|| {
            let mut doc = Document::new(value.clone(), Schema::default()).unwrap();
            for c in " @ma".chars() {
                doc.handle_key(&Key::Char(c)).unwrap();
            }
            doc.handle_key(&Key::Enter).unwrap();
            std::hint::black_box(doc.version())
        });
    });

    group.finish();
}

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    group.sample_size(10);

    let editor = Editor::default();
    let doc = common::generate_document(200);
    let everything = doc.clone().with_selection(Range::new(
        Point::new([0, 0], 0),
        Point::new([199, 4], 1),
    ));

    group.bench_function("toggle_mark_whole_document", |b| {
        b.iter(|| std::hint::black_box(toggle_mark(&editor, &everything, Mark::Italic)));
    });

    group.bench_function("toggle_list_whole_document", |b| {
        b.iter(|| {
            std::hint::black_box(toggle_block(&editor, &everything, ElementType::NumberedList))
        });
    });

    let list = common::generate_list(200);
    group.bench_function("unwrap_list_item", |b| {
        b.iter(|| std::hint::black_box(toggle_block(&editor, &list, ElementType::BulletedList)));
    });

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    group.sample_size(10);

    let editor = Editor::default();
    let value = common::generate_document(500);

    group.bench_function("canonical_document", |b| {
        b.iter(|| std::hint::black_box(editor.normalize(&value)));
    });

    group.finish();
}

criterion_group!(benches, bench_typing, bench_formatting, bench_normalize);
criterion_main!(benches);
