use chart_scene::axis::{Axis, AxisOrientation, AxisRenderer};
use chart_scene::core::SettingKey;
use chart_scene::scene::{Layout, Root};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_position_to_coordinate(c: &mut Criterion) {
    let mut axis = Axis::new_value(0.0, 10_000.0).expect("valid axis");
    axis.zoom_to_window(0.2, 0.7);
    let renderer = AxisRenderer::new(AxisOrientation::Horizontal, 1920.0);

    c.bench_function("position_to_coordinate_round_trip", |b| {
        b.iter(|| {
            let coordinate =
                renderer.position_to_coordinate(black_box(&axis), black_box(0.456_789));
            let _ = renderer.coordinate_to_position(black_box(&axis), coordinate);
        })
    });
}

fn bench_window_clamp_sequence(c: &mut Criterion) {
    let mut axis = Axis::new_value(0.0, 1_000.0).expect("valid axis");

    c.bench_function("window_clamp_1k_transitions", |b| {
        b.iter(|| {
            for step in 0..1_000 {
                let t = step as f64 / 1_000.0;
                axis.set_window(black_box(t - 0.3), black_box(t + 0.3));
            }
        })
    });
}

fn bench_frame_settle_100_nodes(c: &mut Criterion) {
    let mut root = Root::new();
    let column = root.new_container(Layout::Vertical);
    root.set(column, SettingKey::Height, 1_000.0);
    root.push_child(root.container(), column);
    let nodes: Vec<_> = (0..100)
        .map(|_| {
            let node = root.new_graphics();
            root.set(node, SettingKey::Height, 8.0);
            root.push_child(column, node);
            node
        })
        .collect();
    root.run_frame(0.0);

    c.bench_function("frame_settle_100_nodes", |b| {
        let mut now = 0.0;
        b.iter(|| {
            for (index, node) in nodes.iter().enumerate() {
                root.set(*node, SettingKey::Width, black_box(index as f64 + now));
            }
            now += 1.0;
            root.run_frame(now);
        })
    });
}

criterion_group!(
    benches,
    bench_position_to_coordinate,
    bench_window_clamp_sequence,
    bench_frame_settle_100_nodes
);
criterion_main!(benches);
