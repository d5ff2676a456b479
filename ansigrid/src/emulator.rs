//! The emulator owns one screen, one parser, the palette and the default
//! background, and translates parser actions into screen mutations.
//!
//! Parser state persists across [`Emulator::feed`] calls, so input may be
//! chunked anywhere, including inside an escape sequence.

use log::{debug, trace};

use ansigrid_core::{
    default_palette, Charset, CharsetState, Color, Palette, Rgb, Screen,
};
use ansigrid_parser::{c0, Action, CsiAction, EscAction, OscAction, Params, Parser};

use crate::error::Error;

pub struct Emulator {
    screen: Screen,
    parser: Parser,
    palette: Palette,
    default_bg: Option<Rgb>,
    charsets: CharsetState,
    scratch: Vec<Action>,
}

impl Emulator {
    pub fn new(cols: usize, rows: usize) -> Self {
        Emulator {
            screen: Screen::new(cols, rows),
            parser: Parser::new(),
            palette: default_palette(),
            default_bg: None,
            charsets: CharsetState::default(),
            scratch: Vec::new(),
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Repaint a palette slot. Cells referencing the index pick up the new
    /// value on the next extraction.
    pub fn set_palette_entry(&mut self, index: u8, rgb: Rgb) {
        self.palette[index as usize] = rgb;
    }

    pub fn default_bg(&self) -> Option<Rgb> {
        self.default_bg
    }

    pub fn set_default_bg(&mut self, bg: Option<Rgb>) {
        self.default_bg = bg;
    }

    pub fn set_max_scrollback(&mut self, max_rows: usize) {
        self.screen.set_max_scrollback(max_rows);
    }

    /// Cursor as `[x, y]`, screen-relative. The x value may equal `cols`
    /// while a wrap is pending.
    pub fn cursor(&self) -> [u32; 2] {
        let (col, row, _) = self.screen.cursor();
        [col as u32, row as u32]
    }

    /// True when the parser sits in ground state, i.e. reading the screen
    /// now cannot observe a half-applied sequence.
    pub fn is_ready(&self) -> bool {
        self.parser.is_ready()
    }

    /// Consume a chunk of the byte stream. On error the bytes before the
    /// failing sequence have been applied and later feeds may continue.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let mut pending = std::mem::take(&mut self.scratch);
        let mut failure = None;
        'bytes: for &byte in bytes {
            self.parser.advance(byte, &mut |action| pending.push(action));
            for action in pending.drain(..) {
                if let Err(err) = self.apply(action) {
                    failure = Some(err);
                    break 'bytes;
                }
            }
        }
        pending.clear();
        self.scratch = pending;
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.screen.resize(cols, rows);
    }

    /// Hard reset: screen, scrollback, modes, palette, charsets, parser.
    pub fn reset(&mut self) {
        self.screen.reset();
        self.parser.reset();
        self.palette = default_palette();
        self.default_bg = None;
        self.charsets.reset();
    }

    fn apply(&mut self, action: Action) -> Result<(), Error> {
        match action {
            Action::Print(c) => {
                let c = self.charsets.translate(c);
                self.screen.put_char(c);
                Ok(())
            }
            Action::Execute(byte) => {
                self.execute(byte);
                Ok(())
            }
            Action::Csi(csi) => {
                self.csi_dispatch(&csi);
                Ok(())
            }
            Action::Esc(esc) => {
                self.esc_dispatch(&esc);
                Ok(())
            }
            Action::Osc(osc) => self.osc_dispatch(osc),
        }
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            c0::BEL => trace!("bell"),
            c0::BS => self.screen.backspace(),
            c0::HT => self.screen.tab(),
            c0::LF | c0::VT | c0::FF => self.screen.linefeed(),
            c0::CR => self.screen.carriage_return(),
            c0::SO => self.charsets.select(1),
            c0::SI => self.charsets.select(0),
            _ => trace!("unhandled C0 control 0x{byte:02x}"),
        }
    }

    fn csi_dispatch(&mut self, csi: &CsiAction) {
        match csi.private_marker {
            Some(b'?') => {
                self.dec_private(csi);
                return;
            }
            Some(marker) => {
                debug!(
                    "ignored CSI with private marker {:?} final {:?}",
                    marker as char, csi.final_byte as char
                );
                return;
            }
            None => {}
        }
        if !csi.intermediates.is_empty() {
            if csi.intermediates == [b'!'] && csi.final_byte == b'p' {
                // DECSTR
                self.screen.reset();
                self.charsets.reset();
            } else {
                debug!(
                    "ignored CSI intermediates {:?} final {:?}",
                    csi.intermediates, csi.final_byte as char
                );
            }
            return;
        }

        let screen = &mut self.screen;
        match csi.final_byte {
            b'A' => screen.move_cursor_up(csi.arg(0)),
            b'B' | b'e' => screen.move_cursor_down(csi.arg(0)),
            b'C' | b'a' => screen.move_cursor_forward(csi.arg(0)),
            b'D' => screen.move_cursor_backward(csi.arg(0)),
            b'E' => {
                screen.move_cursor_down(csi.arg(0));
                screen.carriage_return();
            }
            b'F' => {
                screen.move_cursor_up(csi.arg(0));
                screen.carriage_return();
            }
            b'G' | b'`' => screen.move_cursor_to_col(csi.arg(0) - 1),
            b'H' | b'f' => screen.move_cursor_to(csi.arg(0) - 1, csi.arg(1) - 1),
            b'd' => screen.move_cursor_to_row(csi.arg(0) - 1),
            b'J' => screen.erase_in_display(csi.params.get_or(0, 0)),
            b'K' => screen.erase_in_line(csi.params.get_or(0, 0)),
            b'S' => screen.scroll_up(csi.arg(0)),
            b'T' => screen.scroll_down(csi.arg(0)),
            b'r' => {
                let top = csi.arg(0);
                let bottom = csi.params.get_nonzero_or(1, screen.rows() as u16) as usize;
                screen.set_scroll_region(top - 1, bottom.saturating_sub(1));
            }
            b'@' => screen.insert_chars(csi.arg(0)),
            b'P' => screen.delete_chars(csi.arg(0)),
            b'L' => screen.insert_lines(csi.arg(0)),
            b'M' => screen.delete_lines(csi.arg(0)),
            b'X' => screen.erase_chars(csi.arg(0)),
            b'g' => screen.clear_tab_stop(csi.params.get_or(0, 0)),
            b's' => screen.save_cursor(),
            b'u' => screen.restore_cursor(),
            b'm' => self.sgr(&csi.params),
            b'h' => self.ansi_mode(&csi.params, true),
            b'l' => self.ansi_mode(&csi.params, false),
            b'n' => trace!("DSR ignored: {:?}", csi.params),
            _ => debug!(
                "unhandled CSI {:?} final {:?}",
                csi.params, csi.final_byte as char
            ),
        }
    }

    fn ansi_mode(&mut self, params: &Params, set: bool) {
        for param in params.iter() {
            match param {
                4 => self.screen.modes.insert_mode = set,
                20 => self.screen.modes.linefeed_mode = set,
                _ => debug!("unhandled ANSI mode {param} (set={set})"),
            }
        }
    }

    fn dec_private(&mut self, csi: &CsiAction) {
        let set = match csi.final_byte {
            b'h' => true,
            b'l' => false,
            _ => {
                debug!("ignored private CSI final {:?}", csi.final_byte as char);
                return;
            }
        };
        for param in csi.params.iter() {
            match param {
                6 => {
                    self.screen.modes.origin_mode = set;
                    self.screen.move_cursor_to(0, 0);
                }
                7 => self.screen.modes.autowrap = set,
                25 => self.screen.modes.cursor_visible = set,
                47 | 1047 => {
                    if set {
                        self.screen.enter_alternate();
                    } else {
                        self.screen.exit_alternate();
                    }
                }
                1048 => {
                    if set {
                        self.screen.save_cursor();
                    } else {
                        self.screen.restore_cursor();
                    }
                }
                1049 => {
                    if set {
                        self.screen.save_cursor();
                        self.screen.enter_alternate();
                        self.screen.erase_in_display(2);
                    } else {
                        self.screen.exit_alternate();
                        self.screen.restore_cursor();
                    }
                }
                _ => debug!("unhandled private mode {param} (set={set})"),
            }
        }
    }

    fn sgr(&mut self, params: &Params) {
        let brush = &mut self.screen.brush;
        if params.is_empty() {
            brush.reset();
            return;
        }

        use ansigrid_core::AttrFlags as A;
        let mut i = 0;
        while i < params.len() {
            let param = params.get_or(i, 0);
            match param {
                0 => brush.reset(),
                1 => brush.attrs.set(A::BOLD, true),
                2 => brush.attrs.set(A::FAINT, true),
                3 => brush.attrs.set(A::ITALIC, true),
                4 => brush.attrs.set(A::UNDERLINE, true),
                7 => brush.attrs.set(A::INVERSE, true),
                9 => brush.attrs.set(A::STRIKETHROUGH, true),
                21 => brush.attrs.set(A::BOLD, false),
                22 => {
                    brush.attrs.set(A::BOLD, false);
                    brush.attrs.set(A::FAINT, false);
                }
                23 => brush.attrs.set(A::ITALIC, false),
                24 => brush.attrs.set(A::UNDERLINE, false),
                27 => brush.attrs.set(A::INVERSE, false),
                29 => brush.attrs.set(A::STRIKETHROUGH, false),
                30..=37 => brush.fg = Color::Indexed((param - 30) as u8),
                39 => brush.fg = Color::Default,
                40..=47 => brush.bg = Color::Indexed((param - 40) as u8),
                49 => brush.bg = Color::Default,
                90..=97 => brush.fg = Color::Indexed((param - 90 + 8) as u8),
                100..=107 => brush.bg = Color::Indexed((param - 100 + 8) as u8),
                38 => {
                    let (color, consumed) = extended_color(params, i);
                    if let Some(color) = color {
                        brush.fg = color;
                    }
                    i += consumed;
                }
                48 => {
                    let (color, consumed) = extended_color(params, i);
                    if let Some(color) = color {
                        brush.bg = color;
                    }
                    i += consumed;
                }
                // blink and conceal are outside the modeled attribute set
                5 | 6 | 8 | 25 | 28 => {}
                _ => trace!("unhandled SGR parameter {param}"),
            }
            i += 1;
        }
    }

    fn esc_dispatch(&mut self, esc: &EscAction) {
        match (esc.intermediates.as_slice(), esc.final_byte) {
            ([], b'7') => self.screen.save_cursor(),
            ([], b'8') => self.screen.restore_cursor(),
            ([], b'D') => self.screen.index_down(),
            ([], b'E') => {
                self.screen.index_down();
                self.screen.carriage_return();
            }
            ([], b'M') => self.screen.reverse_index(),
            ([], b'H') => self.screen.set_tab_stop(),
            ([], b'c') => self.reset(),
            ([], b'=') | ([], b'>') => trace!("keypad mode ignored"),
            ([], b'N') | ([], b'O') => trace!("single shift ignored"),
            ([b'('], f) => self.charsets.designate(0, Charset::from_designator(f)),
            ([b')'], f) => self.charsets.designate(1, Charset::from_designator(f)),
            ([b'*'], f) => self.charsets.designate(2, Charset::from_designator(f)),
            ([b'+'], f) => self.charsets.designate(3, Charset::from_designator(f)),
            _ => debug!(
                "unhandled ESC intermediates {:?} final {:?}",
                esc.intermediates, esc.final_byte as char
            ),
        }
    }

    fn osc_dispatch(&mut self, osc: OscAction) -> Result<(), Error> {
        match osc.command {
            0 | 2 => {
                let title = text_payload(&osc.data)?;
                self.screen.title = title.to_string();
            }
            1 => {
                // icon name; validated but not retained
                text_payload(&osc.data)?;
            }
            4 => {
                let text = text_payload(&osc.data)?;
                let mut parts = text.split(';');
                while let (Some(index), Some(spec)) = (parts.next(), parts.next()) {
                    let entry = index.parse::<usize>().ok().filter(|&i| i < 256);
                    if let (Some(entry), Some(rgb)) = (entry, parse_color_spec(spec)) {
                        self.palette[entry] = rgb;
                    }
                }
            }
            10 => {
                // default foreground; parsed away, not modeled
                text_payload(&osc.data)?;
            }
            11 => {
                let text = text_payload(&osc.data)?;
                if text != "?" {
                    if let Some(rgb) = parse_color_spec(text) {
                        self.default_bg = Some(rgb);
                    }
                }
            }
            104 => {
                let text = text_payload(&osc.data)?;
                if text.is_empty() {
                    self.palette = default_palette();
                } else {
                    for index in text.split(';').filter_map(|s| s.parse::<usize>().ok()) {
                        if index < 256 {
                            self.palette[index] = default_palette()[index];
                        }
                    }
                }
            }
            other => trace!("ignored OSC {other}"),
        }
        Ok(())
    }
}

fn text_payload(data: &[u8]) -> Result<&str, Error> {
    std::str::from_utf8(data).map_err(|_| Error::InvalidUtf8)
}

/// SGR 38/48 extended color, in either the semicolon form (`38;5;n`,
/// `38;2;r;g;b`) or the colon sub-parameter form (`38:5:n`, `38:2:r:g:b`,
/// `38:2:cs:r:g:b`). Returns the color and how many extra top-level
/// parameters were consumed.
fn extended_color(params: &Params, i: usize) -> (Option<Color>, usize) {
    fn clamp(v: u16) -> u8 {
        v.min(255) as u8
    }

    let subs = params.subs(i);
    if !subs.is_empty() {
        let color = match subs {
            [5, n, ..] => Some(Color::Indexed(clamp(*n))),
            [2, r, g, b] => Some(Color::Rgb(Rgb::new(clamp(*r), clamp(*g), clamp(*b)))),
            [2, _cs, r, g, b, ..] => Some(Color::Rgb(Rgb::new(clamp(*r), clamp(*g), clamp(*b)))),
            _ => None,
        };
        return (color, 0);
    }

    match params.get(i + 1) {
        Some(5) => (
            params.get(i + 2).map(|n| Color::Indexed(clamp(n))),
            2,
        ),
        Some(2) => match (params.get(i + 2), params.get(i + 3), params.get(i + 4)) {
            (Some(r), Some(g), Some(b)) => (
                Some(Color::Rgb(Rgb::new(clamp(r), clamp(g), clamp(b)))),
                4,
            ),
            _ => (None, params.len().saturating_sub(i + 1)),
        },
        _ => (None, 1),
    }
}

/// XParseColor-style specs: `rgb:RR/GG/BB` with 1-4 hex digits per
/// component, or `#rrggbb` (3, 6 or 12 hex digits total).
fn parse_color_spec(spec: &str) -> Option<Rgb> {
    fn scale(value: u32, digits: usize) -> u8 {
        match digits {
            1 => (value * 17) as u8,
            2 => value as u8,
            3 => (value >> 4) as u8,
            4 => (value >> 8) as u8,
            _ => 0,
        }
    }

    if let Some(rest) = spec.strip_prefix("rgb:") {
        let mut components = rest.split('/');
        let mut out = [0u8; 3];
        for slot in &mut out {
            let part = components.next()?;
            if part.is_empty() || part.len() > 4 {
                return None;
            }
            let value = u32::from_str_radix(part, 16).ok()?;
            *slot = scale(value, part.len());
        }
        if components.next().is_some() {
            return None;
        }
        return Some(Rgb::new(out[0], out[1], out[2]));
    }

    if let Some(hex) = spec.strip_prefix('#') {
        let len = hex.len();
        if !matches!(len, 3 | 6 | 12) {
            return None;
        }
        let per = len / 3;
        let mut out = [0u8; 3];
        for (slot, chunk) in out.iter_mut().zip(0..3) {
            let part = &hex[chunk * per..(chunk + 1) * per];
            let value = u32::from_str_radix(part, 16).ok()?;
            *slot = scale(value, per);
        }
        return Some(Rgb::new(out[0], out[1], out[2]));
    }

    None
}
