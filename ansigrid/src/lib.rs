//! Ansigrid: ANSI/VT escape streams to structured, styled, grid-addressable
//! data.
//!
//! The engine interprets a raw PTY byte stream through a full VT emulation
//! (not a regex strip) and projects the resulting screen three ways:
//!
//! - [`to_json`]: a structured document of styled spans per line
//! - [`to_text`]: the plain-text projection
//! - [`to_html`]: inline-styled HTML
//!
//! For streaming PTY output, the [`registry`] keeps long-lived
//! [`Emulator`] instances whose parser state survives across feeds:
//!
//! ```
//! use ansigrid::{registry, RenderOptions};
//!
//! registry::create(7, 80, 24);
//! registry::feed(7, b"\x1b[32mready\x1b[0m\n").unwrap();
//! let json = registry::json(7, 0, 0).unwrap();
//! assert!(json.contains("ready"));
//! registry::destroy(7);
//!
//! let text = ansigrid::to_text(b"plain \x1b[1mbold\x1b[0m", &RenderOptions::text()).unwrap();
//! assert_eq!(text, "plain bold");
//! ```

pub mod emulator;
pub mod error;
pub mod extract;
pub mod registry;

pub use emulator::Emulator;
pub use error::Error;
pub use extract::{Document, Span};

/// Feed chunk size used when a row limit allows stopping early.
const FEED_CHUNK: usize = 4096;
/// Extra rows fed beyond `offset + limit` so a late sequence that still
/// edits visible rows is not cut off.
const LIMIT_SLACK: usize = 16;

/// Grid dimensions and pagination for the stateless entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub cols: usize,
    pub rows: usize,
    /// Rows to skip before emission.
    pub offset: usize,
    /// Maximum rows to emit; 0 means no limit.
    pub limit: usize,
}

impl RenderOptions {
    /// Defaults for structured JSON extraction.
    pub fn json() -> Self {
        RenderOptions {
            cols: 120,
            rows: 40,
            offset: 0,
            limit: 0,
        }
    }

    /// Defaults for text and HTML extraction: wide rows minimize false
    /// wraps in logs.
    pub fn text() -> Self {
        RenderOptions {
            cols: 500,
            rows: 256,
            offset: 0,
            limit: 0,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions::json()
    }
}

/// Build a transient emulator and feed the input. With a row limit the
/// input is fed in chunks and feeding stops at the first safe boundary
/// (parser in ground state) once enough rows exist.
fn run(input: &[u8], options: &RenderOptions) -> Result<Emulator, Error> {
    if options.cols == 0 || options.rows == 0 {
        return Err(Error::InvalidInput(
            "grid dimensions must be nonzero".to_string(),
        ));
    }
    let mut emulator = Emulator::new(options.cols, options.rows);
    if options.limit > 0 {
        let target = options.offset + options.limit + LIMIT_SLACK;
        for chunk in input.chunks(FEED_CHUNK) {
            emulator.feed(chunk)?;
            if emulator.is_ready() && emulator.screen().has_at_least(target) {
                break;
            }
        }
    } else {
        emulator.feed(input)?;
    }
    Ok(emulator)
}

/// Interpret the whole input and return the structured JSON document.
pub fn to_json(input: &[u8], options: &RenderOptions) -> Result<String, Error> {
    let emulator = run(input, options)?;
    let document = extract::document(&emulator, options.offset, options.limit);
    Ok(serde_json::to_string(&document)?)
}

/// Interpret the whole input and return the plain-text projection.
pub fn to_text(input: &[u8], options: &RenderOptions) -> Result<String, Error> {
    let emulator = run(input, options)?;
    Ok(extract::text(&emulator, options.offset, options.limit))
}

/// Interpret the whole input and return the styled HTML projection.
pub fn to_html(input: &[u8], options: &RenderOptions) -> Result<String, Error> {
    let emulator = run(input, options)?;
    Ok(extract::html(&emulator, options.offset, options.limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stateless_json_round_trip() {
        let json = to_json(b"\x1b[32mHello\x1b[0m World", &RenderOptions::json()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["cols"], 120);
        assert_eq!(value["lines"][0][0][0], "Hello");
        assert_eq!(value["lines"][0][0][1], "#00cd00");
    }

    #[test]
    fn stateless_text_strips_sequences() {
        let text = to_text(b"a\x1b[31mb\x1b[0mc\r\nnext", &RenderOptions::text()).unwrap();
        assert_eq!(text, "abc\nnext");
    }

    #[test]
    fn zero_dimensions_rejected() {
        let err = to_json(b"x", &RenderOptions {
            cols: 0,
            rows: 10,
            offset: 0,
            limit: 0,
        });
        assert!(matches!(err, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn limit_caps_lines() {
        let mut input = Vec::new();
        for i in 1..=100 {
            input.extend_from_slice(format!("Line {i}\n").as_bytes());
        }
        let options = RenderOptions {
            limit: 10,
            ..RenderOptions::json()
        };
        let json = to_json(&input, &options).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["lines"].as_array().unwrap().len(), 10);
        assert_eq!(value["lines"][9][0][0], "Line 10");
    }
}
