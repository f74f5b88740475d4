use score_tree::api::{ScoreEngine, ScoreEngineConfig};
use score_tree::core::{BarSegment, Barline, ModelPoint, ModelRect, ModelSize, NodeKind, SectionId};
use score_tree::interaction::{MarkChannel, MarkContext};
use score_tree::render::{CanvasLayerKind, Color, NullRenderer};

fn bar(center_x: i32) -> NodeKind {
    NodeKind::Barline(
        Barline::new([BarSegment::new(
            SectionId::new(center_x as u32),
            ModelRect::new(center_x - 2, 0, 4, 80),
        )])
        .expect("barline"),
    )
}

fn engine_with_staff(centers: &[i32]) -> ScoreEngine<NullRenderer> {
    let config = ScoreEngineConfig::new(ModelSize::new(1000, 600));
    let mut engine = ScoreEngine::new(NullRenderer::default(), config).expect("engine init");
    let root = engine.root();
    let tree = engine.tree_mut();
    let page = tree.add_child(root, NodeKind::page(1)).expect("page");
    let system = tree.add_child(page, NodeKind::system(1)).expect("system");
    let staff = tree
        .add_child(system, NodeKind::staff(ModelPoint::new(50, 100), 900, 20, 0))
        .expect("staff");
    for &center in centers {
        let measure = tree.add_child(staff, NodeKind::measure(false)).expect("measure");
        tree.add_child(measure, bar(center)).expect("barline");
    }
    engine
}

#[test]
fn engine_smoke_flow() {
    let mut engine = engine_with_staff(&[100, 220, 340]);
    assert!(engine.is_recompute_pending());

    let summary = engine.recompute().expect("recompute");
    assert!(!engine.is_recompute_pending());
    // score, page, system, staff, 3 x (measure, clef list, barline)
    assert_eq!(summary.visited, 13);

    let staff = engine.tree().staves()[0];
    let measures = engine.tree().measures(staff).expect("measures");
    let edges: Vec<i32> = measures
        .iter()
        .map(|m| engine.tree().left_x(*m).expect("left x"))
        .collect();
    assert_eq!(edges, vec![0, 100, 220]);

    engine.render().expect("render");
    let renderer = engine.renderer();
    assert_eq!(renderer.frames_rendered, 1);
    assert_eq!(renderer.last_line_count, 5);
    assert_eq!(renderer.last_rect_count, 3);
    assert_eq!(renderer.last_text_count, 3);
}

#[test]
fn layered_frame_keeps_labels_under_geometry() {
    let mut engine = engine_with_staff(&[100, 220]);
    engine.recompute().expect("recompute");
    engine.zoom_mut().set_ratio(0.5).expect("ratio");

    let frame = engine.build_layered_frame().expect("frame");
    assert_eq!(frame.viewport.width, 500);
    assert_eq!(frame.viewport.height, 300);

    let background = frame.layer(CanvasLayerKind::Background).expect("background");
    assert_eq!(background.texts.len(), 2);
    assert!(background.lines.is_empty());
    let foreground = frame.layer(CanvasLayerKind::Foreground).expect("foreground");
    assert_eq!(foreground.rects.len(), 2);

    let flat = frame.flatten();
    assert_eq!(flat.texts[0].text, "1");
    assert_eq!(flat.texts[1].text, "2");
}

#[test]
fn mark_pass_reports_barline_sections() {
    let mut engine = engine_with_staff(&[100, 220]);
    engine.recompute().expect("recompute");

    let mut context = MarkContext::new();
    let blue = Color::rgb(0.0, 0.0, 1.0);
    engine
        .mark(&mut context, MarkChannel::new(2), blue)
        .expect("mark");

    let sections: Vec<SectionId> = context.sections(MarkChannel::new(2)).collect();
    assert_eq!(sections, vec![SectionId::new(100), SectionId::new(220)]);
}

#[test]
fn renderer_is_returned_to_the_host() {
    let mut engine = engine_with_staff(&[100]);
    engine.recompute().expect("recompute");
    engine.render().expect("render");
    engine.render().expect("render again");
    assert_eq!(engine.into_renderer().frames_rendered, 2);
}
