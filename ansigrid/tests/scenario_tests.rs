//! End-to-end scenarios driven through the public API: stateless entry
//! points, the emulator, and the persistent-instance registry.

use ansigrid::{registry, to_json, to_text, Emulator, RenderOptions};
use serde_json::Value;

fn options(cols: usize, rows: usize) -> RenderOptions {
    RenderOptions {
        cols,
        rows,
        offset: 0,
        limit: 0,
    }
}

fn parse(json: &str) -> Value {
    serde_json::from_str(json).unwrap()
}

#[test]
fn green_hello_world() {
    let json = to_json(b"\x1b[32mHello\x1b[0m World", &options(80, 24)).unwrap();
    let value = parse(&json);

    let line = &value["lines"][0];
    assert_eq!(line[0], serde_json::json!(["Hello", "#00cd00", Value::Null, 0, 5]));
    assert_eq!(
        line[1],
        serde_json::json!([" World", Value::Null, Value::Null, 0, 6])
    );
    assert_eq!(value["cursor"], serde_json::json!([11, 0]));
    assert!(value["totalLines"].as_u64().unwrap() >= 1);
}

#[test]
fn combined_attribute_flags() {
    let json = to_json(b"\x1b[1;3;4mstyles\x1b[0m", &options(80, 24)).unwrap();
    let value = parse(&json);
    assert_eq!(
        value["lines"][0][0],
        serde_json::json!(["styles", Value::Null, Value::Null, 7, 6])
    );
}

#[test]
fn truecolor_foreground() {
    let json = to_json(b"\x1b[38;2;255;0;128mrgb\x1b[0m", &options(80, 24)).unwrap();
    let value = parse(&json);
    assert_eq!(value["lines"][0][0][1], "#ff0080");
}

#[test]
fn partitioned_feed_keeps_parser_state() {
    registry::create(100, 80, 24);
    registry::feed(100, b"\x1b[3").unwrap();
    assert!(!registry::is_ready(100).unwrap());
    registry::feed(100, b"1mRed\x1b[0m").unwrap();
    assert!(registry::is_ready(100).unwrap());

    let value = parse(&registry::json(100, 0, 0).unwrap());
    assert_eq!(value["lines"][0][0][0], "Red");
    assert_eq!(value["lines"][0][0][1], "#cd0000");
    registry::destroy(100);
}

#[test]
fn limit_previews_first_lines() {
    let mut input = Vec::new();
    for i in 1..=1000 {
        input.extend_from_slice(format!("Line {i}\n").as_bytes());
    }
    let json = to_json(
        &input,
        &RenderOptions {
            limit: 10,
            ..options(80, 24)
        },
    )
    .unwrap();
    let value = parse(&json);
    let lines = value["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 10);
    assert_eq!(lines[9][0][0], "Line 10");
}

#[test]
fn bare_linefeed_resets_column() {
    let mut emulator = Emulator::new(80, 24);
    emulator.feed(b"line1\nline2\nline3").unwrap();
    assert_eq!(emulator.cursor(), [5, 2]);

    let text = to_text(b"line1\nline2\nline3", &options(80, 24)).unwrap();
    assert_eq!(text, "line1\nline2\nline3");
}

#[test]
fn cursor_position_then_write() {
    let mut emulator = Emulator::new(80, 24);
    emulator.feed(b"\x1b[6;6H").unwrap();
    assert_eq!(emulator.cursor(), [5, 5]);
    emulator.feed(b"X").unwrap();
    assert_eq!(emulator.cursor(), [6, 5]);
    assert_eq!(emulator.screen().cell(5, 5).unwrap().c, 'X');
}

#[test]
fn reset_discards_old_content() {
    let mut emulator = Emulator::new(80, 24);
    emulator.feed(b"Old Content").unwrap();
    emulator.reset();
    emulator.feed(b"New Content").unwrap();

    let document = ansigrid::extract::document(&emulator, 0, 0);
    assert_eq!(document.lines[0][0].text, "New Content");
    assert_eq!(emulator.cursor(), [11, 0]);
    let flat: Vec<&str> = document
        .lines
        .iter()
        .flatten()
        .map(|span| span.text.as_str())
        .collect();
    assert_eq!(flat, vec!["New Content"]);
}

#[test]
fn scrollback_is_retained_unbounded() {
    registry::create(101, 80, 24);
    for i in 0..500 {
        registry::feed(101, format!("entry {i}\n").as_bytes()).unwrap();
    }
    let value = parse(&registry::json(101, 0, 0).unwrap());
    // 500 lines scrolled well past a 24-row screen, nothing lost
    assert!(value["totalLines"].as_u64().unwrap() >= 500);
    assert_eq!(value["lines"][0][0][0], "entry 0");
    assert_eq!(value["lines"][499][0][0], "entry 499");
    registry::destroy(101);
}

#[test]
fn cli_style_offset_pagination() {
    let mut input = Vec::new();
    for i in 0..50 {
        input.extend_from_slice(format!("row {i}\n").as_bytes());
    }
    let json = to_json(
        &input,
        &RenderOptions {
            offset: 5,
            limit: 3,
            ..options(80, 24)
        },
    )
    .unwrap();
    let value = parse(&json);
    assert_eq!(value["offset"], 5);
    let lines = value["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0][0][0], "row 5");
    assert_eq!(lines[2][0][0], "row 7");
}
