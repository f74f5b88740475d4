use criterion::{Criterion, criterion_group, criterion_main};
use score_tree::api::{ScoreEngine, ScoreEngineConfig};
use score_tree::core::{
    BarSegment, Barline, ModelPoint, ModelRect, ModelSize, NodeKind, ScoreTree, SectionId,
};
use score_tree::render::NullRenderer;
use score_tree::zoom::ZoomFactor;
use std::hint::black_box;

fn populate(tree: &mut ScoreTree, staves: usize, measures: usize) {
    let page = tree.add_child(tree.root(), NodeKind::page(1)).expect("page");
    let system = tree.add_child(page, NodeKind::system(1)).expect("system");
    for link in 0..staves {
        let staff = tree
            .add_child(
                system,
                NodeKind::staff(ModelPoint::new(40, 100 + 120 * link as i32), 20_000, 20, link),
            )
            .expect("staff");
        for index in 0..measures {
            let center = 60 * (index as i32 + 1);
            let measure = tree.add_child(staff, NodeKind::measure(false)).expect("measure");
            let barline = Barline::new([BarSegment::new(
                SectionId::new(center as u32),
                ModelRect::new(center - 2, 0, 4, 80),
            )])
            .expect("barline");
            tree.add_child(measure, NodeKind::Barline(barline))
                .expect("barline");
        }
    }
}

fn bench_left_edge_chain_1k(c: &mut Criterion) {
    let mut tree = ScoreTree::new(ModelSize::new(70_000, 2_000));
    populate(&mut tree, 1, 1_000);
    let staff = tree.staves()[0];
    let measures = tree.measures(staff).expect("measures");

    c.bench_function("left_edge_chain_1k", |b| {
        b.iter(|| {
            for measure in &measures {
                tree.reset_measure(*measure).expect("reset");
            }
            for measure in &measures {
                black_box(tree.left_x(*measure).expect("left x"));
            }
        })
    });
}

fn bench_recompute_8x250(c: &mut Criterion) {
    let mut tree = ScoreTree::new(ModelSize::new(20_000, 2_000));
    populate(&mut tree, 8, 250);

    c.bench_function("recompute_8x250", |b| {
        b.iter(|| black_box(tree.recompute().expect("recompute")))
    });
}

fn bench_zoom_scaling(c: &mut Criterion) {
    let factor = ZoomFactor::new(1.37).expect("factor");

    c.bench_function("zoom_scaled_rect_10k", |b| {
        b.iter(|| {
            for i in 0..10_000 {
                black_box(factor.scaled_rect(ModelRect::new(i, i / 2, 12, 80)));
            }
        })
    });
}

fn bench_frame_build(c: &mut Criterion) {
    let config = ScoreEngineConfig::new(ModelSize::new(20_000, 2_000)).with_initial_ratio(0.75);
    let mut engine = ScoreEngine::new(NullRenderer::default(), config).expect("engine");
    populate(engine.tree_mut(), 8, 250);
    engine.recompute().expect("recompute");

    c.bench_function("layered_frame_8x250", |b| {
        b.iter(|| black_box(engine.build_layered_frame().expect("frame")))
    });
}

criterion_group!(
    benches,
    bench_left_edge_chain_1k,
    bench_recompute_8x250,
    bench_zoom_scaling,
    bench_frame_build
);
criterion_main!(benches);
