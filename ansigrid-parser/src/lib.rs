//! Streaming parser for ANSI/VT escape sequences.
//!
//! A classical DEC-derived state machine: bytes go in one at a time,
//! semantic [`Action`]s come out through a callback. The machine never
//! fails on malformed input; unknown sequences are consumed silently and
//! broken UTF-8 prints U+FFFD. All state, including a partially received
//! sequence or an incomplete UTF-8 scalar, survives across [`Parser::feed`]
//! boundaries, which makes the parser safe to drive from arbitrarily
//! chunked PTY reads.

pub mod action;
pub mod params;
pub mod parser;

pub use action::{c0, c1, Action, CsiAction, EscAction, OscAction};
pub use params::Params;
pub use parser::Parser;
