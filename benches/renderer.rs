use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use structural_draw::config::Config;
use structural_draw::extract::extract_drawing;
use structural_draw::layout::compute_layout;
use structural_draw::render::render_svg;

/// A response shaped like the engine's: prose, a script, then the drawing block.
fn engine_response(stirrups: usize) -> String {
    let length = 600.0;
    let mut bars = vec![
        r#"{"type": "longitudinal", "points": [{"x": 2, "y": 12}, {"x": 2, "y": 45}, {"x": 598, "y": 45}, {"x": 598, "y": 12}], "label": "3ø16"}"#.to_string(),
        r#"{"type": "longitudinal", "points": [{"x": 2, "y": 15}, {"x": 2, "y": 5}, {"x": 598, "y": 5}, {"x": 598, "y": 15}], "label": "2ø12"}"#.to_string(),
    ];
    for idx in 0..stirrups {
        let x = 5.0 + idx as f32 * (length - 10.0) / stirrups.max(1) as f32;
        bars.push(format!(
            r##"{{"id": "E{idx}", "type": "stirrup", "points": [{{"x": {x}, "y": 3}}, {{"x": {x}, "y": 47}}], "color": "#22d3ee"}}"##
        ));
    }
    let mut out = String::from("Design summary for V1.\n```python\n");
    for line in 0..80 {
        out.push_str(&format!("as_{line} = {line} * 0.5\n"));
    }
    out.push_str("```\n[DRAWING_DATA] ");
    out.push_str(&format!(
        "{{\"length\": {length}, \"height\": 50, \"width\": 20, \"bars\": [{}]}}",
        bars.join(",")
    ));
    out
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    for stirrups in [0usize, 20, 200] {
        let raw = engine_response(stirrups);
        group.bench_with_input(BenchmarkId::from_parameter(stirrups), &raw, |b, raw| {
            b.iter(|| extract_drawing(black_box(raw)))
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let config = Config::default();
    let mut group = c.benchmark_group("render");
    for stirrups in [0usize, 20, 200] {
        let description = extract_drawing(&engine_response(stirrups)).expect("bench response parses");
        group.bench_with_input(
            BenchmarkId::from_parameter(stirrups),
            &description,
            |b, description| {
                b.iter(|| {
                    let layout = compute_layout(black_box(description), &config.theme, &config.layout);
                    render_svg(&layout, &config.theme, &config.layout)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_extract, bench_render);
criterion_main!(benches);
