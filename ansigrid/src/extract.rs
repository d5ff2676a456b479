//! Extraction: walk the screen and emit JSON, plain text, or HTML.
//!
//! All three projections share the same row walk: trim the columns that
//! were never written, then merge runs of equally-styled cells into spans.
//! The JSON shape is an external contract; each span serializes as the
//! fixed 5-tuple `[text, fg, bg, flags, width]`.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use ansigrid_core::{Palette, Rgb, Row};

use crate::emulator::Emulator;

/// The structured projection of a terminal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub cols: u32,
    pub rows: u32,
    /// Screen-relative cursor; the absolute line is
    /// `(totalLines - rows) + cursor[1] - offset`.
    pub cursor: [u32; 2],
    pub cursor_visible: bool,
    pub offset: u32,
    pub total_lines: u32,
    pub lines: Vec<Vec<Span>>,
}

/// A maximal run of adjacent cells sharing one resolved style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    /// Resolved `#rrggbb`, or `None` for the default foreground.
    pub fg: Option<String>,
    /// Resolved `#rrggbb`, or `None` for the default background.
    pub bg: Option<String>,
    pub flags: u8,
    /// Display columns covered (wide characters count two).
    pub width: u32,
}

impl Serialize for Span {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(5))?;
        seq.serialize_element(&self.text)?;
        seq.serialize_element(&self.fg)?;
        seq.serialize_element(&self.bg)?;
        seq.serialize_element(&self.flags)?;
        seq.serialize_element(&self.width)?;
        seq.end()
    }
}

fn window(limit: usize) -> usize {
    if limit == 0 {
        usize::MAX
    } else {
        limit
    }
}

/// Build the structured document for a window of rows.
pub fn document(emulator: &Emulator, offset: usize, limit: usize) -> Document {
    let screen = emulator.screen();
    let default_bg = emulator.default_bg().map(Rgb::hex);
    let lines = screen
        .rows_iter()
        .skip(offset)
        .take(window(limit))
        .map(|row| row_spans(row, emulator.palette(), default_bg.as_deref()))
        .collect();
    let (x, y, visible) = screen.cursor();
    Document {
        cols: screen.cols() as u32,
        rows: screen.rows() as u32,
        cursor: [x as u32, y as u32],
        cursor_visible: visible,
        offset: offset as u32,
        total_lines: screen.row_count() as u32,
        lines,
    }
}

/// Plain text: escape sequences fully interpreted, rows joined by LF,
/// trailing blank rows dropped.
pub fn text(emulator: &Emulator, offset: usize, limit: usize) -> String {
    let screen = emulator.screen();
    let mut lines: Vec<String> = screen
        .rows_iter()
        .skip(offset)
        .take(window(limit))
        .map(row_text)
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// HTML: one inline-styled element per span, rows joined by LF.
pub fn html(emulator: &Emulator, offset: usize, limit: usize) -> String {
    let screen = emulator.screen();
    let default_bg = emulator.default_bg().map(Rgb::hex);
    let mut lines: Vec<String> = screen
        .rows_iter()
        .skip(offset)
        .take(window(limit))
        .map(|row| {
            row_spans(row, emulator.palette(), default_bg.as_deref())
                .iter()
                .map(span_html)
                .collect::<String>()
        })
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn resolve(color: ansigrid_core::Color, palette: &Palette) -> Option<String> {
    color.resolve(palette).map(Rgb::hex)
}

/// Merge one row into spans. Trailing never-written columns are dropped
/// first; interior never-written cells (tab gaps) become spaces so column
/// alignment survives. Spacer cells fold into their wide neighbor.
fn row_spans(row: &Row, palette: &Palette, default_bg: Option<&str>) -> Vec<Span> {
    let end = row.content_cols();
    let mut spans: Vec<Span> = Vec::new();
    for cell in &row.cells()[..end] {
        if cell.is_spacer() {
            continue;
        }
        let fg = resolve(cell.style.fg, palette);
        let mut bg = resolve(cell.style.bg, palette);
        if bg.as_deref() == default_bg && default_bg.is_some() {
            bg = None;
        }
        let flags = cell.style.attrs.bits();
        let c = if cell.is_unset() { ' ' } else { cell.c };
        let width = cell.display_width() as u32;
        match spans.last_mut() {
            Some(last) if last.fg == fg && last.bg == bg && last.flags == flags => {
                last.text.push(c);
                last.width += width;
            }
            _ => spans.push(Span {
                text: c.to_string(),
                fg,
                bg,
                flags,
                width,
            }),
        }
    }
    spans
}

fn row_text(row: &Row) -> String {
    let end = row.content_cols();
    row.cells()[..end]
        .iter()
        .filter(|cell| !cell.is_spacer())
        .map(|cell| if cell.is_unset() { ' ' } else { cell.c })
        .collect()
}

fn span_html(span: &Span) -> String {
    use ansigrid_core::AttrFlags;

    let mut fg = span.fg.clone();
    let mut bg = span.bg.clone();
    if span.flags & AttrFlags::INVERSE != 0 {
        let old_fg = fg.take();
        fg = Some(bg.take().unwrap_or_else(|| "#000000".to_string()));
        bg = Some(old_fg.unwrap_or_else(|| "#ffffff".to_string()));
    }

    let mut style = String::new();
    if let Some(fg) = &fg {
        style.push_str(&format!("color:{fg};"));
    }
    if let Some(bg) = &bg {
        style.push_str(&format!("background-color:{bg};"));
    }
    if span.flags & AttrFlags::BOLD != 0 {
        style.push_str("font-weight:bold;");
    }
    if span.flags & AttrFlags::ITALIC != 0 {
        style.push_str("font-style:italic;");
    }
    let underline = span.flags & AttrFlags::UNDERLINE != 0;
    let strike = span.flags & AttrFlags::STRIKETHROUGH != 0;
    match (underline, strike) {
        (true, true) => style.push_str("text-decoration:underline line-through;"),
        (true, false) => style.push_str("text-decoration:underline;"),
        (false, true) => style.push_str("text-decoration:line-through;"),
        (false, false) => {}
    }
    if span.flags & AttrFlags::FAINT != 0 {
        style.push_str("opacity:0.6;");
    }

    let text = html_escape(&span.text);
    if style.is_empty() {
        format!("<span>{text}</span>")
    } else {
        format!("<span style=\"{style}\">{text}</span>")
    }
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::Emulator;

    fn fed(input: &[u8]) -> Emulator {
        let mut emu = Emulator::new(40, 10);
        emu.feed(input).unwrap();
        emu
    }

    #[test]
    fn merges_equal_styles() {
        let emu = fed(b"\x1b[32mab\x1b[32mcd\x1b[0m!");
        let doc = document(&emu, 0, 0);
        let line = &doc.lines[0];
        assert_eq!(line.len(), 2);
        assert_eq!(line[0].text, "abcd");
        assert_eq!(line[0].fg.as_deref(), Some("#00cd00"));
        assert_eq!(line[1].text, "!");
        assert_eq!(line[1].fg, None);
    }

    #[test]
    fn no_adjacent_spans_share_style() {
        let emu = fed(b"\x1b[31ma\x1b[32mb\x1b[31mc");
        let doc = document(&emu, 0, 0);
        let line = &doc.lines[0];
        assert_eq!(line.len(), 3);
        for pair in line.windows(2) {
            assert!(
                (pair[0].fg != pair[1].fg)
                    || (pair[0].bg != pair[1].bg)
                    || (pair[0].flags != pair[1].flags)
            );
        }
    }

    #[test]
    fn tab_gap_renders_as_spaces() {
        let emu = fed(b"a\tb");
        let doc = document(&emu, 0, 0);
        assert_eq!(doc.lines[0][0].text, "a       b");
        assert_eq!(text(&emu, 0, 0), "a       b");
    }

    #[test]
    fn trailing_unset_cells_trimmed() {
        let emu = fed(b"hi");
        let doc = document(&emu, 0, 0);
        assert_eq!(doc.lines[0][0].text, "hi");
        assert_eq!(doc.lines[0][0].width, 2);
        // later rows are empty arrays, not padded spans
        assert!(doc.lines[1].is_empty());
    }

    #[test]
    fn wide_char_span_width() {
        let emu = fed("世x".as_bytes());
        let doc = document(&emu, 0, 0);
        assert_eq!(doc.lines[0][0].text, "世x");
        assert_eq!(doc.lines[0][0].width, 3);
    }

    #[test]
    fn background_equal_to_default_is_null() {
        let mut emu = Emulator::new(40, 10);
        // palette 4 is (0,0,238); make it the default background
        emu.feed(b"\x1b]11;rgb:00/00/ee\x07\x1b[44mx\x1b[0m").unwrap();
        let doc = document(&emu, 0, 0);
        assert_eq!(doc.lines[0][0].bg, None);

        // without the matching default, the background is concrete
        let emu2 = fed(b"\x1b[44mx\x1b[0m");
        let doc2 = document(&emu2, 0, 0);
        assert_eq!(doc2.lines[0][0].bg.as_deref(), Some("#0000ee"));
    }

    #[test]
    fn json_shape_is_exact() {
        let emu = fed(b"\x1b[1mB");
        let doc = document(&emu, 0, 0);
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&doc).unwrap()).unwrap();
        assert_eq!(value["cols"], 40);
        assert_eq!(value["rows"], 10);
        assert_eq!(value["cursor"], serde_json::json!([1, 0]));
        assert_eq!(value["cursorVisible"], true);
        assert_eq!(value["offset"], 0);
        assert_eq!(value["totalLines"], 10);
        assert_eq!(
            value["lines"][0][0],
            serde_json::json!(["B", serde_json::Value::Null, serde_json::Value::Null, 1, 1])
        );
    }

    #[test]
    fn text_drops_trailing_blank_rows() {
        let emu = fed(b"one\ntwo");
        assert_eq!(text(&emu, 0, 0), "one\ntwo");
    }

    #[test]
    fn text_keeps_interior_blank_rows() {
        let emu = fed(b"one\n\nthree");
        assert_eq!(text(&emu, 0, 0), "one\n\nthree");
    }

    #[test]
    fn html_escapes_and_styles() {
        let emu = fed(b"\x1b[1;31m<b>\x1b[0m");
        let out = html(&emu, 0, 0);
        assert!(out.contains("&lt;b&gt;"));
        assert!(out.contains("font-weight:bold"));
        assert!(out.contains("color:#cd0000"));
    }

    #[test]
    fn html_inverse_swaps_colors() {
        let emu = fed(b"\x1b[7mX\x1b[0m");
        let out = html(&emu, 0, 0);
        assert!(out.contains("color:#000000"));
        assert!(out.contains("background-color:#ffffff"));
    }

    #[test]
    fn pagination_window() {
        let mut emu = Emulator::new(20, 4);
        for i in 0..10 {
            emu.feed(format!("line {i}\n").as_bytes()).unwrap();
        }
        let doc = document(&emu, 2, 3);
        assert_eq!(doc.offset, 2);
        assert_eq!(doc.lines.len(), 3);
        assert_eq!(doc.lines[0][0].text, "line 2");
        assert_eq!(doc.total_lines, 11); // 7 scrolled-off rows + 4 active
    }
}
