use std::ffi::c_void;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use litepaint::bridge::blocks::Pt2PxBlock;
use litepaint::bridge::{dispatch, Callback};
use litepaint::rendering::raster::RasterSurface;
use litepaint::{EngineKind, RenderConfig, RenderSession, Viewport};

// Run with:
//    cargo bench --bench dispatch_bench

fn small_config() -> RenderConfig {
    RenderConfig {
        viewport: Viewport { width: 256, height: 256 },
        ..Default::default()
    }
}

/// Bench: name lookup plus block decode for the cheapest request
fn bench_dispatch_pt2px(c: &mut Criterion) {
    let mut surface = RasterSurface::new(&small_config()).expect("surface");
    let name = Callback::Pt2Px.c_name();

    c.bench_function("dispatch_pt2px", |b| {
        b.iter(|| {
            let mut block = Pt2PxBlock { pt: black_box(12) };
            unsafe {
                dispatch(&mut surface, name.as_ptr(), (&mut block as *mut Pt2PxBlock).cast::<c_void>()).unwrap();
            }
            block.pt
        })
    });
}

/// Bench: replay of a box-heavy trace through the host callback
fn bench_trace_replay(c: &mut Criterion) {
    let mut ops = Vec::new();
    for i in 0..64 {
        let (x, y) = ((i % 8) * 32, (i / 8) * 32);
        ops.push(format!(
            r#"{{"op": "drawBackground", "x": {x}, "y": {y}, "w": 28, "h": 28, "color": 3435973887}}"#
        ));
        ops.push(format!(
            r#"{{"op": "drawMarker", "x": {}, "y": {}, "w": 8, "h": 8, "mt": 2, "color": 255}}"#,
            x + 10,
            y + 10
        ));
    }
    let trace = format!("[{}]", ops.join(","));
    let mut session = RenderSession::open(EngineKind::Trace, small_config()).expect("session");

    c.bench_function("trace_replay_128_ops", |b| {
        b.iter(|| session.render(black_box(trace.as_bytes())).unwrap())
    });
}

criterion_group!(benches, bench_dispatch_pt2px, bench_trace_replay);
criterion_main!(benches);
