mod common;

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use rast_core::geometry::Rect;
use rast_core::{Candidate, TextLineFinder, TextLineParams};

use common::{BenchTier, XorShift64, bench_config, configure_group};

const PAGE_BBOX: Rect = (0.0, 0.0, 612.0, 792.0);

/// Two columns of slightly skewed text rows with jittered glyph sizes.
fn generate_page(seed: u64, rows: usize) -> Vec<Candidate> {
    let mut rng = XorShift64::new(seed);
    let skew = rng.gen_f64(-0.01, 0.01);
    let mut out = Vec::with_capacity(rows * 2 * 30);
    for col in 0..2 {
        let left = 36.0 + col as f64 * 290.0;
        for row in 0..rows {
            let base = PAGE_BBOX.3 - 48.0 - row as f64 * 14.0;
            let mut x = left + rng.gen_f64(0.0, 4.0);
            while x < left + 240.0 {
                let w = rng.gen_f64(3.0, 7.0);
                let y = base + skew * x + rng.gen_f64(-0.4, 0.4);
                let h = rng.gen_f64(6.5, 8.5);
                out.push(Candidate::new((x, y, x + w, y + h)));
                x += w + if rng.one_in(6) { 5.0 } else { 1.2 };
            }
        }
    }
    out
}

fn bench_extract(c: &mut Criterion) {
    let cfg = bench_config();
    let sizes: &[usize] = if cfg.tier == BenchTier::Quick {
        &[10, 40]
    } else {
        &[10, 40, 50]
    };

    let mut group = c.benchmark_group("textline_extract");
    configure_group(&mut group, &cfg);

    for &rows in sizes {
        let page = generate_page(cfg.seed ^ rows as u64, rows);
        let finder = TextLineFinder::new(TextLineParams {
            xheight: Some(7.0),
            ..TextLineParams::default()
        });
        group.throughput(Throughput::Elements(page.len() as u64));
        group.bench_with_input(BenchmarkId::new("page", rows), &page, |b, page| {
            b.iter(|| {
                let lines = finder.extract(page).unwrap();
                black_box(lines.len());
            })
        });

        let columns = [(0.0, 0.0, 306.0, 792.0), (306.0, 0.0, 612.0, 792.0)];
        group.bench_with_input(BenchmarkId::new("columns", rows), &page, |b, page| {
            b.iter(|| {
                let lines = finder.extract_columns(page, &columns).unwrap();
                black_box(lines.len());
            })
        });
    }

    group.finish();
}

criterion_group!(textline_benches, bench_extract);
criterion_main!(textline_benches);
