use std::collections::BTreeMap;

use zettel_common::test_utils::{init_test_logging, note_fixtures};
use zettel_common::NoteId;
use zettel_graphs::{GraphRenderer, NoteForest, NoteGraph, PngGraphRenderer, RenderStyle};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

fn sample_graph() -> NoteGraph {
    let titles: BTreeMap<NoteId, String> = note_fixtures::sample_notes()
        .into_iter()
        .enumerate()
        .map(|(i, (title, _, _))| (NoteId(i as i64 + 1), title.to_string()))
        .collect();
    NoteGraph::new(titles, [(NoteId(1), NoteId(2)), (NoteId(2), NoteId(4))])
}

fn plain_renderer(width: u32, height: u32) -> PngGraphRenderer {
    PngGraphRenderer::new(RenderStyle {
        width,
        height,
        ..RenderStyle::default().without_labels()
    })
}

#[test]
fn renders_png_without_text() {
    init_test_logging();
    let png = plain_renderer(600, 400).render(&sample_graph()).unwrap();
    assert!(png.starts_with(PNG_SIGNATURE));
}

#[test]
fn rendering_is_deterministic() {
    let renderer = plain_renderer(500, 400);
    let graph = sample_graph();
    assert_eq!(renderer.render(&graph).unwrap(), renderer.render(&graph).unwrap());
}

#[test]
fn renders_graph_with_only_isolated_notes() {
    let titles: BTreeMap<NoteId, String> =
        (1..=7).map(|i| (NoteId(i), format!("Loose note {i}"))).collect();
    let png = plain_renderer(400, 300)
        .render(&NoteGraph::new(titles, []))
        .unwrap();
    assert!(png.starts_with(PNG_SIGNATURE));
}

#[test]
fn tree_of_sample_notes() {
    let text = NoteForest::build(&sample_graph()).render();
    assert_eq!(
        text,
        "📄 Zettelkasten\n└── Atomic notes\n    └── Rust ownership\n\n📄 Связи"
    );
}
