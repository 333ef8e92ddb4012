//! Whole-document parsing scenarios plus the incremental-reparse
//! equivalence property: after any edit, patching the cache must agree
//! byte-for-byte with rebuilding it from scratch.

use core_markdown::{Block, BlockCache, BlockKind, ListKind};
use core_text::GapBuffer;
use proptest::prelude::*;

const SAMPLE: &str = "\
# Release notes {#rel}

Dawn now renders **bold**, *italic*, and ==marked== runs, with footnotes[^a]
and inline math $e^x$ along the way.

## Checklist

- [x] wrap engine
- [ ] image sizing
- plain item
3. ordered item

> He said that --- all things considered --- it held up.
> Second quoted line.

```rust
fn main() { println!(\"hi\"); }
```

| col | align |
|:----|------:|
| a   |     1 |

![banner](assets/banner.png){ width=80% }

$$
\\int_0^1 x\\,dx
$$

[^a]: the footnote text

---

Closing paragraph with a link to <https://example.org/dawn>.
";

fn parse(content: &str) -> (GapBuffer, BlockCache) {
    let buf = GapBuffer::from_str(content);
    let cache = BlockCache::from_buffer(&buf);
    (buf, cache)
}

#[test]
fn sample_document_block_stream() {
    let (_, cache) = parse(SAMPLE);
    let kinds: Vec<&BlockKind> = cache.blocks().iter().map(|b| &b.kind).collect();
    let mut it = kinds.iter();
    assert!(matches!(it.next().unwrap(), BlockKind::Header { level: 1, .. }));
    assert!(matches!(it.next().unwrap(), BlockKind::Paragraph));
    assert!(matches!(it.next().unwrap(), BlockKind::Header { level: 2, .. }));
    assert!(matches!(
        it.next().unwrap(),
        BlockKind::ListItem { kind: ListKind::TaskChecked, .. }
    ));
    assert!(matches!(
        it.next().unwrap(),
        BlockKind::ListItem { kind: ListKind::TaskUnchecked, .. }
    ));
    assert!(matches!(
        it.next().unwrap(),
        BlockKind::ListItem { kind: ListKind::Unordered, .. }
    ));
    assert!(matches!(
        it.next().unwrap(),
        BlockKind::ListItem { kind: ListKind::Ordered, .. }
    ));
    assert!(matches!(it.next().unwrap(), BlockKind::Blockquote { level: 1 }));
    assert!(matches!(it.next().unwrap(), BlockKind::Code { .. }));
    assert!(matches!(it.next().unwrap(), BlockKind::Table(t) if t.col_count == 2));
    assert!(matches!(it.next().unwrap(), BlockKind::Image(a) if a.width == -80));
    assert!(matches!(it.next().unwrap(), BlockKind::Math { .. }));
    assert!(matches!(it.next().unwrap(), BlockKind::FootnoteDef { .. }));
    assert!(matches!(it.next().unwrap(), BlockKind::Rule));
    assert!(matches!(it.next().unwrap(), BlockKind::Paragraph));
    assert!(it.next().is_none());
}

#[test]
fn spans_cover_non_blank_regions_exactly_once() {
    let (buf, cache) = parse(SAMPLE);
    let blocks: &[Block] = cache.blocks();
    for pair in blocks.windows(2) {
        assert!(pair[0].span.end() <= pair[1].span.start, "overlap: {pair:?}");
    }
    // Every non-blank line belongs to exactly one block.
    let mut pos = 0;
    while pos < buf.len() {
        let le = buf.line_end(pos);
        let blank = (pos..le).all(|i| matches!(buf.at(i), b' ' | b'\t'));
        if !blank {
            let covered = blocks
                .iter()
                .filter(|b| b.span.contains(pos))
                .count();
            assert_eq!(covered, 1, "line at {pos} covered {covered} times");
        }
        pos = if le < buf.len() { le + 1 } else { le };
    }
}

#[test]
fn typed_payloads_resolve_against_source() {
    let (buf, cache) = parse(SAMPLE);
    for b in cache.blocks() {
        match &b.kind {
            BlockKind::Code { lang, content } => {
                assert_eq!(buf.slice_string(lang.start, lang.end()), "rust");
                assert!(buf.slice_string(content.start, content.end()).contains("println!"));
            }
            BlockKind::FootnoteDef { id, content } => {
                assert_eq!(buf.slice_string(id.start, id.end()), "a");
                assert_eq!(
                    buf.slice_string(content.start, content.end()),
                    "the footnote text"
                );
            }
            BlockKind::Image(attrs) => {
                assert_eq!(
                    buf.slice_string(attrs.path.start, attrs.path.end()),
                    "assets/banner.png"
                );
                assert_eq!(attrs.height, 0);
            }
            _ => {}
        }
    }
}

/// Small grammar-flavored line pool so random documents exercise real
/// block shapes, not just alphabet soup.
fn doc_strategy() -> impl Strategy<Value = String> {
    let line = prop_oneof![
        Just("# Head".to_string()),
        Just("plain text line".to_string()),
        Just("- item".to_string()),
        Just("- [x] task".to_string()),
        Just("> quote".to_string()),
        Just("---".to_string()),
        Just("| a | b |".to_string()),
        Just("|---|---|".to_string()),
        Just("![i](p.png)".to_string()),
        Just("[^f]: note".to_string()),
        Just("word".to_string()),
        Just("".to_string()),
    ];
    proptest::collection::vec(line, 0..14).prop_map(|lines| {
        let mut s = lines.join("\n");
        s.push('\n');
        s
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn incremental_matches_full_after_insert(
        doc in doc_strategy(),
        at_frac in 0.0f64..1.0,
        ins in prop_oneof![
            Just("x".to_string()),
            Just("\n".to_string()),
            Just("\n\n".to_string()),
            Just("# ".to_string()),
            Just("| c ".to_string()),
            Just("```\n".to_string()),
            Just("$$".to_string()),
        ],
    ) {
        let mut buf = GapBuffer::from_str(&doc);
        let mut cache = BlockCache::from_buffer(&buf);
        let at = ((buf.len() as f64) * at_frac) as usize;
        buf.insert_str(at, &ins).unwrap();
        cache.apply_edit(&buf, at, 0, ins.len());
        let full = BlockCache::from_buffer(&buf);
        prop_assert_eq!(cache.blocks(), full.blocks());
    }

    #[test]
    fn incremental_matches_full_after_delete(
        doc in doc_strategy(),
        a_frac in 0.0f64..1.0,
        del in 1usize..6,
    ) {
        let mut buf = GapBuffer::from_str(&doc);
        let mut cache = BlockCache::from_buffer(&buf);
        let a = ((buf.len() as f64) * a_frac) as usize;
        let b = (a + del).min(buf.len());
        let a = a.min(b);
        buf.delete(a, b);
        cache.apply_edit(&buf, a, b - a, 0);
        let full = BlockCache::from_buffer(&buf);
        prop_assert_eq!(cache.blocks(), full.blocks());
    }
}
