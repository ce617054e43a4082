// Blitter Benchmarks
// Performance benchmarks for indexed to true-color conversion

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use palette_display::palette::{Palette, SystemPalette};
use palette_display::surface::{
    blit, IndexedBuffer, Rect, TrueColorSurface, BUFFER_HEIGHT, BUFFER_WIDTH, SCREEN_HEIGHT,
    SCREEN_WIDTH, SCREEN_X, SCREEN_Y,
};
use std::hint::black_box;

/// Helper function to create a back buffer filled with a test pattern
fn create_back_buffer() -> IndexedBuffer {
    let mut buffer = IndexedBuffer::new(BUFFER_WIDTH, BUFFER_HEIGHT).unwrap();
    buffer.test_pattern(0);
    buffer
}

fn create_palette() -> Palette {
    let mut palette = Palette::new();
    palette.install(&SystemPalette::grayscale());
    palette
}

/// Benchmark converting the full visible screen
/// This runs once per presented frame
fn bench_blit_screen(c: &mut Criterion) {
    let mut group = c.benchmark_group("blit");
    group.throughput(Throughput::Elements((SCREEN_WIDTH * SCREEN_HEIGHT) as u64));

    let src = create_back_buffer();
    let palette = create_palette();
    let mut dst = TrueColorSurface::new(SCREEN_WIDTH, SCREEN_HEIGHT).unwrap();
    let screen = Rect::from_origin_size(SCREEN_X, SCREEN_Y, SCREEN_WIDTH, SCREEN_HEIGHT);

    group.bench_function("full_screen", |b| {
        b.iter(|| {
            blit(&src, &palette, black_box(screen), &mut dst, 0, 0).unwrap();
            black_box(dst.as_bytes());
        });
    });

    group.finish();
}

/// Benchmark square blits of increasing size
fn bench_blit_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("blit_sizes");

    let src = create_back_buffer();
    let palette = create_palette();
    let mut dst = TrueColorSurface::new(SCREEN_WIDTH, SCREEN_HEIGHT).unwrap();

    for size in [16usize, 64, 256] {
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let rect = Rect::from_origin_size(SCREEN_X, SCREEN_Y, size, size);
            b.iter(|| {
                blit(&src, &palette, black_box(rect), &mut dst, 0, 0).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_blit_screen, bench_blit_sizes);
criterion_main!(benches);
