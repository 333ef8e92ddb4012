use core_text::{GapBuffer, display_width, find_wrap_point};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn ascii_paragraph() -> String {
    "the quick brown fox jumps over the lazy dog ".repeat(40)
}

fn mixed_paragraph() -> String {
    "na\u{00ef}ve caf\u{00e9} \u{6f22}\u{5b57} text \u{1f600} emoji run ".repeat(30)
}

fn bench_wrap(c: &mut Criterion) {
    let ascii = GapBuffer::from_str(&ascii_paragraph());
    let mixed = GapBuffer::from_str(&mixed_paragraph());

    c.bench_function("wrap_ascii_80", |b| {
        b.iter(|| {
            let mut pos = 0;
            while pos < ascii.len() {
                let (split, _) = find_wrap_point(&ascii, pos, ascii.len(), black_box(80));
                if split <= pos {
                    break;
                }
                pos = split;
                while pos < ascii.len() && ascii.at(pos) == b' ' {
                    pos += 1;
                }
            }
            black_box(pos)
        })
    });

    c.bench_function("wrap_mixed_60", |b| {
        b.iter(|| {
            let mut pos = 0;
            while pos < mixed.len() {
                let (split, _) = find_wrap_point(&mixed, pos, mixed.len(), black_box(60));
                if split <= pos {
                    break;
                }
                pos = split;
                while pos < mixed.len() && mixed.at(pos) == b' ' {
                    pos += 1;
                }
            }
            black_box(pos)
        })
    });

    c.bench_function("display_width_mixed", |b| {
        b.iter(|| black_box(display_width(&mixed, 0, mixed.len())))
    });
}

criterion_group!(benches, bench_wrap);
criterion_main!(benches);
