//! The escape-sequence state machine.
//!
//! States follow the classical DEC/ECMA-48 diagram. Dispatch is byte-at-a-
//! time so that a sequence split across reads resumes exactly where it
//! stopped; [`Parser::is_ready`] reports whether the machine is back in
//! ground state and the screen safe to read.

use crate::action::{c0, c1, Action, CsiAction, EscAction, OscAction};
use crate::params::Params;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    EscapeIntermediate,
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    CsiIgnore,
    OscString,
    DcsEntry,
    DcsBody,
    SosString,
}

const MAX_INTERMEDIATES: usize = 4;
const MAX_OSC_DATA: usize = 64 * 1024;

pub struct Parser {
    state: State,
    params: Params,
    intermediates: Vec<u8>,
    private_marker: Option<u8>,

    // digit accumulator for the parameter being read
    accum: u16,
    slot_open: bool,
    in_sub: bool,

    osc_command: u16,
    osc_command_done: bool,
    osc_data: Vec<u8>,
    // an ESC seen inside a string state, possibly the first half of ST
    string_esc: bool,

    utf8_buf: [u8; 4],
    utf8_len: usize,
    utf8_need: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            state: State::Ground,
            params: Params::new(),
            intermediates: Vec::with_capacity(MAX_INTERMEDIATES),
            private_marker: None,
            accum: 0,
            slot_open: false,
            in_sub: false,
            osc_command: 0,
            osc_command_done: false,
            osc_data: Vec::new(),
            string_esc: false,
            utf8_buf: [0; 4],
            utf8_len: 0,
            utf8_need: 0,
        }
    }

    /// True when no escape sequence or UTF-8 scalar is in progress.
    pub fn is_ready(&self) -> bool {
        self.state == State::Ground && self.utf8_need == 0
    }

    /// Back to ground, dropping any partial sequence.
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.clear_seq();
        self.osc_data.clear();
        self.osc_command = 0;
        self.osc_command_done = false;
        self.string_esc = false;
        self.utf8_len = 0;
        self.utf8_need = 0;
    }

    /// Feed a whole buffer; the callback receives each completed action.
    pub fn parse<F>(&mut self, input: &[u8], mut callback: F)
    where
        F: FnMut(Action),
    {
        for &byte in input {
            self.advance(byte, &mut callback);
        }
    }

    /// Feed a single byte.
    pub fn advance<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        if self.utf8_need > 0 {
            if byte & 0xC0 == 0x80 {
                self.utf8_buf[self.utf8_len] = byte;
                self.utf8_len += 1;
                self.utf8_need -= 1;
                if self.utf8_need == 0 {
                    match std::str::from_utf8(&self.utf8_buf[..self.utf8_len]) {
                        Ok(s) => {
                            for c in s.chars() {
                                callback(Action::Print(c));
                            }
                        }
                        Err(_) => callback(Action::Print('\u{FFFD}')),
                    }
                    self.utf8_len = 0;
                }
                return;
            }
            // broken scalar: replace it and reprocess the current byte
            callback(Action::Print('\u{FFFD}'));
            self.utf8_len = 0;
            self.utf8_need = 0;
        }

        if self.state == State::Ground && byte >= 0x80 {
            match byte {
                0x80..=0x9F => self.c1_control(byte, callback),
                0xA0..=0xC1 | 0xF5..=0xFF => callback(Action::Print('\u{FFFD}')),
                0xC2..=0xDF => self.start_utf8(byte, 1),
                0xE0..=0xEF => self.start_utf8(byte, 2),
                0xF0..=0xF4 => self.start_utf8(byte, 3),
                _ => unreachable!("byte >= 0x80 guaranteed by caller"),
            }
            return;
        }

        match self.state {
            State::Ground => self.ground(byte, callback),
            State::Escape => self.escape(byte, callback),
            State::EscapeIntermediate => self.escape_intermediate(byte, callback),
            State::CsiEntry | State::CsiParam => self.csi_param(byte, callback),
            State::CsiIntermediate => self.csi_intermediate(byte, callback),
            State::CsiIgnore => self.csi_ignore(byte, callback),
            State::OscString => self.osc_string(byte, callback),
            State::DcsEntry => self.dcs_entry(byte),
            State::DcsBody => self.dcs_body(byte),
            State::SosString => self.sos_string(byte),
        }
    }

    fn start_utf8(&mut self, lead: u8, continuations: usize) {
        self.utf8_buf[0] = lead;
        self.utf8_len = 1;
        self.utf8_need = continuations;
    }

    fn c1_control<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match byte {
            c1::CSI => self.enter_csi(),
            c1::OSC => self.enter_osc(),
            c1::DCS => self.enter_dcs(),
            c1::SOS | c1::PM | c1::APC => self.enter_sos(),
            c1::ST => self.state = State::Ground,
            c1::IND => callback(esc_action(b'D')),
            c1::NEL => callback(esc_action(b'E')),
            c1::HTS => callback(esc_action(b'H')),
            c1::RI => callback(esc_action(b'M')),
            _ => {}
        }
    }

    fn ground<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match byte {
            c0::ESC => {
                self.clear_seq();
                self.state = State::Escape;
            }
            0x00..=0x1A | 0x1C..=0x1F => callback(Action::Execute(byte)),
            c0::DEL => {}
            _ => callback(Action::Print(byte as char)),
        }
    }

    fn escape<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match byte {
            b'[' => self.enter_csi(),
            b']' => self.enter_osc(),
            b'P' => self.enter_dcs(),
            b'X' | b'^' | b'_' => self.enter_sos(),
            c0::ESC => self.clear_seq(),
            c0::CAN | c0::SUB => self.state = State::Ground,
            0x20..=0x2F => {
                self.collect(byte);
                self.state = State::EscapeIntermediate;
            }
            0x30..=0x7E => {
                callback(Action::Esc(EscAction {
                    intermediates: std::mem::take(&mut self.intermediates),
                    final_byte: byte,
                }));
                self.state = State::Ground;
            }
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => callback(Action::Execute(byte)),
            c0::DEL => {}
            _ => self.state = State::Ground,
        }
    }

    fn escape_intermediate<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match byte {
            0x20..=0x2F => self.collect(byte),
            0x30..=0x7E => {
                callback(Action::Esc(EscAction {
                    intermediates: std::mem::take(&mut self.intermediates),
                    final_byte: byte,
                }));
                self.state = State::Ground;
            }
            c0::ESC => {
                self.clear_seq();
                self.state = State::Escape;
            }
            c0::CAN | c0::SUB => self.state = State::Ground,
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => callback(Action::Execute(byte)),
            c0::DEL => {}
            _ => self.state = State::Ground,
        }
    }

    /// CsiEntry and CsiParam share one handler; the entry state only exists
    /// to reject a private marker appearing after the first parameter.
    fn csi_param<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match byte {
            b'0'..=b'9' => {
                self.accum = self
                    .accum
                    .saturating_mul(10)
                    .saturating_add((byte - b'0') as u16);
                self.slot_open = true;
                self.state = State::CsiParam;
            }
            b';' => {
                self.commit_param();
                self.in_sub = false;
                self.slot_open = true;
                self.state = State::CsiParam;
            }
            b':' => {
                self.commit_param();
                self.in_sub = true;
                self.slot_open = true;
                self.state = State::CsiParam;
            }
            b'<' | b'=' | b'>' | b'?' => {
                if self.state == State::CsiEntry {
                    self.private_marker = Some(byte);
                    self.state = State::CsiParam;
                } else {
                    self.state = State::CsiIgnore;
                }
            }
            0x20..=0x2F => {
                self.collect(byte);
                self.state = State::CsiIntermediate;
            }
            0x40..=0x7E => self.csi_dispatch(byte, callback),
            c0::ESC => {
                self.clear_seq();
                self.state = State::Escape;
            }
            c0::CAN | c0::SUB => self.state = State::Ground,
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => callback(Action::Execute(byte)),
            c0::DEL => {}
            _ => self.state = State::CsiIgnore,
        }
    }

    fn csi_intermediate<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match byte {
            0x20..=0x2F => self.collect(byte),
            0x40..=0x7E => self.csi_dispatch(byte, callback),
            c0::ESC => {
                self.clear_seq();
                self.state = State::Escape;
            }
            c0::CAN | c0::SUB => self.state = State::Ground,
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => callback(Action::Execute(byte)),
            c0::DEL => {}
            _ => self.state = State::CsiIgnore,
        }
    }

    fn csi_ignore<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match byte {
            0x40..=0x7E => self.state = State::Ground,
            c0::ESC => {
                self.clear_seq();
                self.state = State::Escape;
            }
            c0::CAN | c0::SUB => self.state = State::Ground,
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => callback(Action::Execute(byte)),
            _ => {}
        }
    }

    fn osc_string<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        if self.string_esc {
            self.string_esc = false;
            if byte == b'\\' {
                self.osc_dispatch(callback);
                self.state = State::Ground;
            } else {
                // an ESC that was not ST: the string is abandoned and the
                // byte reprocessed as an escape sequence
                self.clear_seq();
                self.state = State::Escape;
                self.advance(byte, callback);
            }
            return;
        }
        match byte {
            c0::BEL => {
                self.osc_dispatch(callback);
                self.state = State::Ground;
            }
            c1::ST => {
                self.osc_dispatch(callback);
                self.state = State::Ground;
            }
            c0::ESC => self.string_esc = true,
            c0::CAN | c0::SUB => self.state = State::Ground,
            0x20..=0xFF => {
                if !self.osc_command_done && byte.is_ascii_digit() {
                    self.osc_command = self
                        .osc_command
                        .saturating_mul(10)
                        .saturating_add((byte - b'0') as u16);
                } else if !self.osc_command_done && byte == b';' {
                    self.osc_command_done = true;
                } else {
                    self.osc_command_done = true;
                    if self.osc_data.len() < MAX_OSC_DATA {
                        self.osc_data.push(byte);
                    }
                }
            }
            _ => {}
        }
    }

    fn dcs_entry(&mut self, byte: u8) {
        match byte {
            0x40..=0x7E => self.state = State::DcsBody,
            c0::ESC => {
                self.clear_seq();
                self.state = State::Escape;
            }
            c0::CAN | c0::SUB => self.state = State::Ground,
            // params and intermediates of the ignored DCS
            _ => {}
        }
    }

    fn dcs_body(&mut self, byte: u8) {
        if self.string_esc {
            self.string_esc = false;
            if byte == b'\\' {
                self.state = State::Ground;
            }
            return;
        }
        match byte {
            c0::ESC => self.string_esc = true,
            c1::ST => self.state = State::Ground,
            c0::CAN | c0::SUB => self.state = State::Ground,
            _ => {}
        }
    }

    fn sos_string(&mut self, byte: u8) {
        if self.string_esc {
            self.string_esc = false;
            if byte == b'\\' {
                self.state = State::Ground;
            }
            return;
        }
        match byte {
            c0::ESC => self.string_esc = true,
            c1::ST => self.state = State::Ground,
            c0::CAN | c0::SUB => self.state = State::Ground,
            _ => {}
        }
    }

    fn enter_csi(&mut self) {
        self.clear_seq();
        self.state = State::CsiEntry;
    }

    fn enter_osc(&mut self) {
        self.clear_seq();
        self.osc_command = 0;
        self.osc_command_done = false;
        self.osc_data.clear();
        self.string_esc = false;
        self.state = State::OscString;
    }

    fn enter_dcs(&mut self) {
        self.clear_seq();
        self.string_esc = false;
        self.state = State::DcsEntry;
    }

    fn enter_sos(&mut self) {
        self.string_esc = false;
        self.state = State::SosString;
    }

    fn clear_seq(&mut self) {
        self.params.clear();
        self.intermediates.clear();
        self.private_marker = None;
        self.accum = 0;
        self.slot_open = false;
        self.in_sub = false;
    }

    fn collect(&mut self, byte: u8) {
        if self.intermediates.len() < MAX_INTERMEDIATES {
            self.intermediates.push(byte);
        }
    }

    fn commit_param(&mut self) {
        if self.in_sub {
            self.params.push_sub(self.accum);
        } else {
            self.params.push(self.accum);
        }
        self.accum = 0;
    }

    fn csi_dispatch<F>(&mut self, final_byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        if self.slot_open {
            self.commit_param();
        }
        callback(Action::Csi(CsiAction {
            params: self.params.clone(),
            intermediates: std::mem::take(&mut self.intermediates),
            final_byte,
            private_marker: self.private_marker,
        }));
        self.state = State::Ground;
    }

    fn osc_dispatch<F>(&mut self, callback: &mut F)
    where
        F: FnMut(Action),
    {
        callback(Action::Osc(OscAction {
            command: self.osc_command,
            data: std::mem::take(&mut self.osc_data),
        }));
    }
}

fn esc_action(final_byte: u8) -> Action {
    Action::Esc(EscAction {
        intermediates: Vec::new(),
        final_byte,
    })
}
