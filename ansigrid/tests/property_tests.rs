//! Universal properties of the engine: chunk invariance, span merging,
//! flag encoding, pagination prefix stability, reset idempotence, palette
//! stability.

use ansigrid::extract::{self, Document};
use ansigrid::{Emulator, RenderOptions};
use ansigrid_core::{AttrFlags, Rgb};
use serde_json::Value;

const STYLED_INPUT: &[u8] =
    b"\x1b[1;32mok\x1b[0m plain \x1b[38;5;208morange\x1b[0m\n\
      \x1b[7minverse\x1b[27m tail\r\n\
      \x1b[4munder\x1b[24m \x1b[9mstrike\x1b[29m \x1b[2mfaint\x1b[0m\n\
      wide: \xe4\xb8\x96\xe7\x95\x8c\n\
      \x1b[38;2;1;2;3mrgb\x1b[0m\x1b[K end";

fn document_json(emulator: &Emulator) -> String {
    serde_json::to_string(&extract::document(emulator, 0, 0)).unwrap()
}

fn fed(input: &[u8]) -> Emulator {
    let mut emulator = Emulator::new(40, 12);
    emulator.feed(input).unwrap();
    emulator
}

#[test]
fn chunk_invariance_over_partitions() {
    let whole = document_json(&fed(STYLED_INPUT));

    // every split point, including ones inside escape sequences and inside
    // the UTF-8 encoding of the wide characters
    for split in 1..STYLED_INPUT.len() {
        let mut emulator = Emulator::new(40, 12);
        emulator.feed(&STYLED_INPUT[..split]).unwrap();
        emulator.feed(&STYLED_INPUT[split..]).unwrap();
        assert_eq!(document_json(&emulator), whole, "split at byte {split}");
    }

    // byte-at-a-time
    let mut emulator = Emulator::new(40, 12);
    for &byte in STYLED_INPUT {
        emulator.feed(&[byte]).unwrap();
    }
    assert_eq!(document_json(&emulator), whole);
}

#[test]
fn no_redundant_style_boundaries() {
    let document = extract::document(&fed(STYLED_INPUT), 0, 0);
    for line in &document.lines {
        for pair in line.windows(2) {
            let same = pair[0].fg == pair[1].fg
                && pair[0].bg == pair[1].bg
                && pair[0].flags == pair[1].flags;
            assert!(!same, "adjacent spans with identical style: {pair:?}");
        }
    }
}

#[test]
fn span_widths_bounded_by_cols() {
    let document = extract::document(&fed(STYLED_INPUT), 0, 0);
    for line in &document.lines {
        let total: u32 = line.iter().map(|span| span.width).sum();
        assert!(total <= document.cols);
    }
}

#[test]
fn flags_use_only_defined_bits() {
    let document = extract::document(&fed(STYLED_INPUT), 0, 0);
    for span in document.lines.iter().flatten() {
        assert_eq!(span.flags & !AttrFlags::ALL, 0);
    }
}

#[test]
fn limit_preserves_prefix() {
    let mut input = Vec::new();
    for i in 0..200 {
        input.extend_from_slice(format!("prefix line {i}\n").as_bytes());
    }

    let full: Value = serde_json::from_str(
        &ansigrid::to_json(&input, &RenderOptions::json()).unwrap(),
    )
    .unwrap();
    for n in [1usize, 5, 17, 40] {
        let limited: Value = serde_json::from_str(
            &ansigrid::to_json(
                &input,
                &RenderOptions {
                    limit: n,
                    ..RenderOptions::json()
                },
            )
            .unwrap(),
        )
        .unwrap();
        let full_lines = full["lines"].as_array().unwrap();
        let limited_lines = limited["lines"].as_array().unwrap();
        assert_eq!(limited_lines.len(), n.min(full_lines.len()));
        assert_eq!(&full_lines[..limited_lines.len()], &limited_lines[..]);
    }
}

#[test]
fn reset_is_idempotent() {
    let mut once = Emulator::new(30, 8);
    once.feed(STYLED_INPUT).unwrap();
    once.reset();
    let after_once = document_json(&once);

    let mut twice = Emulator::new(30, 8);
    twice.feed(STYLED_INPUT).unwrap();
    twice.reset();
    twice.reset();
    assert_eq!(document_json(&twice), after_once);

    let fresh = Emulator::new(30, 8);
    assert_eq!(document_json(&fresh), after_once);
}

#[test]
fn is_ready_tracks_sequence_boundaries() {
    let mut emulator = Emulator::new(30, 8);
    emulator.feed(b"complete text").unwrap();
    assert!(emulator.is_ready());

    emulator.feed(b"\x1b[38;5").unwrap();
    assert!(!emulator.is_ready());
    emulator.feed(b";208m").unwrap();
    assert!(emulator.is_ready());

    emulator.feed(b"\x1b]0;partial title").unwrap();
    assert!(!emulator.is_ready());
    emulator.feed(b"\x07").unwrap();
    assert!(emulator.is_ready());
}

#[test]
fn palette_edits_show_on_reextraction() {
    let mut emulator = Emulator::new(30, 8);
    emulator.feed(b"\x1b[31mred\x1b[0m").unwrap();

    let before = extract::document(&emulator, 0, 0);
    assert_eq!(before.lines[0][0].fg.as_deref(), Some("#cd0000"));

    emulator.set_palette_entry(1, Rgb::new(0x11, 0x22, 0x33));
    let after = extract::document(&emulator, 0, 0);
    assert_eq!(after.lines[0][0].fg.as_deref(), Some("#112233"));
}

#[test]
fn failed_feed_leaves_consistent_state() {
    let mut emulator = Emulator::new(30, 8);
    emulator.feed(b"kept ").unwrap();

    let mut bad = b"\x1b]2;".to_vec();
    bad.push(0xC3); // lone continuation start inside an OSC title
    bad.push(0x07);
    assert!(emulator.feed(&bad).is_err());

    // parser is not poisoned and prior content survives
    assert!(emulator.is_ready());
    emulator.feed(b"more").unwrap();
    let document: Document = extract::document(&emulator, 0, 0);
    assert_eq!(document.lines[0][0].text, "kept more");
}

#[test]
fn cursor_line_adjustment_formula() {
    let mut emulator = Emulator::new(20, 4);
    for i in 0..10 {
        emulator.feed(format!("l{i}\n").as_bytes()).unwrap();
    }
    let document = extract::document(&emulator, 0, 0);
    let total = document.total_lines as usize;
    let rows = document.rows as usize;
    let absolute = (total - rows) + document.cursor[1] as usize;
    // the cursor sits on the row after the last written line
    assert_eq!(absolute, 10);
}
