//! Minimal stream decoder
//!
//! Turns raw server bytes into output events: styled text runs, line
//! breaks, and terminal effects. Handles ANSI SGR attributes (16-color,
//! 256-color, truecolor) and skips telnet command sequences so plain MUD
//! servers are usable out of the box.
//!
//! This is a deliberately small stand-in for a full MUD transformer: no
//! option negotiation, no compression, no rich markup. It sits behind the
//! same event-stream seam a full decoder would, so swapping one in does
//! not touch the rest of the client.

use crate::output::color::{xterm_color, ColorValue, RgbColor};
use crate::output::fragment::{EffectFragment, OutputEvent, StyleFlags, TextFragment};

// Telnet protocol bytes
const IAC: u8 = 0xFF;
const SE: u8 = 0xF0;
const SB: u8 = 0xFA;
const WILL: u8 = 0xFB;
const DONT: u8 = 0xFE;

/// Decoder state machine
pub struct AnsiDecoder {
    state: DecodeState,
    params: Vec<u16>,
    current_param: Option<u16>,
    intermediates: Vec<u8>,
    /// Text bytes of the run being accumulated.
    run: Vec<u8>,
    foreground: ColorValue,
    background: ColorValue,
    flags: StyleFlags,
}

#[derive(Clone, Copy, Default, PartialEq)]
enum DecodeState {
    #[default]
    Ground,
    Escape,
    CsiEntry,
    CsiParam,
    OscString,
    EscapeInOsc,
    TelnetCommand,
    TelnetOption,
    TelnetSubnegotiation,
    TelnetSubnegotiationIac,
}

impl Default for AnsiDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnsiDecoder {
    pub fn new() -> Self {
        Self {
            state: DecodeState::Ground,
            params: Vec::with_capacity(16),
            intermediates: Vec::with_capacity(4),
            current_param: None,
            run: Vec::new(),
            foreground: ColorValue::DEFAULT_FOREGROUND,
            background: ColorValue::DEFAULT_BACKGROUND,
            flags: StyleFlags::empty(),
        }
    }

    /// Feed a chunk of raw bytes, appending decoded events.
    ///
    /// Pending text is flushed at the end of every chunk so that prompts
    /// without a trailing newline become visible immediately; an
    /// incomplete UTF-8 sequence at the chunk boundary is held back for
    /// the next chunk.
    pub fn feed(&mut self, bytes: &[u8], events: &mut Vec<OutputEvent>) {
        for &byte in bytes {
            self.advance(byte, events);
        }
        let tail_len = incomplete_utf8_suffix(&self.run);
        let tail = self.run.split_off(self.run.len() - tail_len);
        self.flush_run(events);
        self.run = tail;
    }

    fn advance(&mut self, byte: u8, events: &mut Vec<OutputEvent>) {
        match self.state {
            DecodeState::Ground => self.ground(byte, events),
            DecodeState::Escape => self.escape(byte, events),
            DecodeState::CsiEntry => self.csi_entry(byte, events),
            DecodeState::CsiParam => self.csi_param(byte, events),
            DecodeState::OscString => self.osc_string(byte),
            DecodeState::EscapeInOsc => self.escape_in_osc(byte, events),
            DecodeState::TelnetCommand => self.telnet_command(byte),
            DecodeState::TelnetOption => {
                tracing::trace!("telnet option {} ignored", byte);
                self.state = DecodeState::Ground;
            }
            DecodeState::TelnetSubnegotiation => {
                if byte == IAC {
                    self.state = DecodeState::TelnetSubnegotiationIac;
                }
            }
            DecodeState::TelnetSubnegotiationIac => {
                self.state = if byte == SE {
                    DecodeState::Ground
                } else {
                    DecodeState::TelnetSubnegotiation
                };
            }
        }
    }

    fn ground(&mut self, byte: u8, events: &mut Vec<OutputEvent>) {
        match byte {
            IAC => self.state = DecodeState::TelnetCommand,
            0x1B => self.enter_escape(),
            0x07 => {
                self.flush_run(events);
                events.push(OutputEvent::Effect(EffectFragment::Beep));
            }
            0x08 => {
                self.flush_run(events);
                events.push(OutputEvent::Effect(EffectFragment::Backspace));
            }
            0x0A => {
                self.flush_run(events);
                events.push(OutputEvent::LineBreak);
            }
            0x0D => {
                self.flush_run(events);
                events.push(OutputEvent::Effect(EffectFragment::CarriageReturn));
            }
            // Tab flattened to a space: column tracking stays exact
            0x09 => self.run.push(b' '),
            0x00..=0x1F | 0x7F => {}
            _ => self.run.push(byte),
        }
    }

    fn enter_escape(&mut self) {
        self.state = DecodeState::Escape;
        self.params.clear();
        self.intermediates.clear();
        self.current_param = None;
    }

    fn escape(&mut self, byte: u8, events: &mut Vec<OutputEvent>) {
        match byte {
            b'[' => {
                self.state = DecodeState::CsiEntry;
                self.params.clear();
                self.intermediates.clear();
                self.current_param = None;
            }
            b']' => self.state = DecodeState::OscString,
            b'c' => {
                // RIS - full reset
                self.flush_run(events);
                self.reset_style();
                self.state = DecodeState::Ground;
            }
            _ => {
                self.state = DecodeState::Ground;
            }
        }
    }

    fn csi_entry(&mut self, byte: u8, events: &mut Vec<OutputEvent>) {
        match byte {
            b'0'..=b'9' => {
                self.current_param = Some((byte - b'0') as u16);
                self.state = DecodeState::CsiParam;
            }
            b';' => {
                self.params.push(0);
                self.state = DecodeState::CsiParam;
            }
            b'?' | b'>' | b'!' | b'=' | 0x20..=0x2F => {
                self.intermediates.push(byte);
            }
            0x40..=0x7E => self.execute_csi(byte, events),
            _ => self.state = DecodeState::Ground,
        }
    }

    fn csi_param(&mut self, byte: u8, events: &mut Vec<OutputEvent>) {
        match byte {
            b'0'..=b'9' => {
                let digit = (byte - b'0') as u16;
                self.current_param = Some(
                    self.current_param
                        .unwrap_or(0)
                        .saturating_mul(10)
                        .saturating_add(digit),
                );
            }
            b';' | b':' => {
                self.params.push(self.current_param.take().unwrap_or(0));
            }
            0x20..=0x2F => self.intermediates.push(byte),
            0x40..=0x7E => {
                if let Some(param) = self.current_param.take() {
                    self.params.push(param);
                }
                self.execute_csi(byte, events);
            }
            _ => self.state = DecodeState::Ground,
        }
    }

    fn osc_string(&mut self, byte: u8) {
        match byte {
            0x07 | 0x9C => self.state = DecodeState::Ground,
            0x1B => self.state = DecodeState::EscapeInOsc,
            _ => {}
        }
    }

    fn escape_in_osc(&mut self, byte: u8, events: &mut Vec<OutputEvent>) {
        // ST (ESC \) terminates; anything else starts a new escape sequence
        // and this byte belongs to it
        if byte == b'\\' {
            self.state = DecodeState::Ground;
        } else {
            self.enter_escape();
            self.escape(byte, events);
        }
    }

    fn telnet_command(&mut self, byte: u8) {
        match byte {
            // Escaped 0xFF is literal data
            IAC => {
                self.run.push(IAC);
                self.state = DecodeState::Ground;
            }
            SB => self.state = DecodeState::TelnetSubnegotiation,
            WILL..=DONT => self.state = DecodeState::TelnetOption,
            _ => {
                tracing::trace!("telnet command {} ignored", byte);
                self.state = DecodeState::Ground;
            }
        }
    }

    fn execute_csi(&mut self, final_byte: u8, events: &mut Vec<OutputEvent>) {
        if final_byte == b'm' && self.intermediates.is_empty() {
            // Attribute changes end the current run
            self.flush_run(events);
            self.execute_sgr();
        } else {
            tracing::debug!(
                "dropping CSI: intermediates={:?}, params={:?}, final={:?}",
                self.intermediates,
                self.params,
                final_byte as char
            );
        }
        self.state = DecodeState::Ground;
    }

    fn execute_sgr(&mut self) {
        if self.params.is_empty() {
            self.reset_style();
            return;
        }

        // Take the buffer so the walk below can borrow it while updating
        // the style fields
        let mut params = std::mem::take(&mut self.params);
        let mut iter = params.iter();

        while let Some(&param) = iter.next() {
            match param {
                0 => self.reset_style(),
                1 => self.flags |= StyleFlags::BOLD,
                2 => self.flags |= StyleFlags::FAINT,
                3 => self.flags |= StyleFlags::ITALIC,
                4 => self.flags |= StyleFlags::UNDERLINE,
                5 => self.flags |= StyleFlags::BLINK,
                7 => self.flags |= StyleFlags::INVERSE,
                9 => self.flags |= StyleFlags::STRIKEOUT,

                22 => self.flags -= StyleFlags::BOLD | StyleFlags::FAINT,
                23 => self.flags -= StyleFlags::ITALIC,
                24 => self.flags -= StyleFlags::UNDERLINE,
                25 => self.flags -= StyleFlags::BLINK,
                27 => self.flags -= StyleFlags::INVERSE,
                29 => self.flags -= StyleFlags::STRIKEOUT,

                30..=37 => self.foreground = ColorValue::Ansi((param - 30) as u8),
                38 => {
                    if let Some(color) = extended_color(&mut iter) {
                        self.foreground = color;
                    }
                }
                39 => self.foreground = ColorValue::DEFAULT_FOREGROUND,

                40..=47 => self.background = ColorValue::Ansi((param - 40) as u8),
                48 => {
                    if let Some(color) = extended_color(&mut iter) {
                        self.background = color;
                    }
                }
                49 => self.background = ColorValue::DEFAULT_BACKGROUND,

                90..=97 => self.foreground = ColorValue::Ansi((param - 90 + 8) as u8),
                100..=107 => self.background = ColorValue::Ansi((param - 100 + 8) as u8),

                _ => {}
            }
        }

        params.clear();
        self.params = params;
    }

    fn reset_style(&mut self) {
        self.flags = StyleFlags::empty();
        self.foreground = ColorValue::DEFAULT_FOREGROUND;
        self.background = ColorValue::DEFAULT_BACKGROUND;
    }

    fn flush_run(&mut self, events: &mut Vec<OutputEvent>) {
        if self.run.is_empty() {
            return;
        }
        let fragment = TextFragment {
            text: std::mem::take(&mut self.run),
            foreground: self.foreground,
            background: self.background,
            flags: self.flags,
            link: None,
        };
        events.push(OutputEvent::Text(fragment));
    }
}

/// Parse the tail of an SGR 38/48 sequence: `5;n` or `2;r;g;b`.
fn extended_color<'a>(iter: &mut impl Iterator<Item = &'a u16>) -> Option<ColorValue> {
    match iter.next() {
        Some(5) => {
            let index = *iter.next()? as u8;
            if index < 16 {
                Some(ColorValue::Ansi(index))
            } else {
                // The palette contract covers 0-15 only; everything above
                // becomes a literal color here
                Some(ColorValue::Hex(xterm_color(index)))
            }
        }
        Some(2) => {
            let r = *iter.next()? as u8;
            let g = *iter.next()? as u8;
            let b = *iter.next()? as u8;
            Some(ColorValue::Hex(RgbColor::new(r, g, b)))
        }
        _ => None,
    }
}

/// Length of an incomplete UTF-8 sequence at the end of `bytes`, if any.
fn incomplete_utf8_suffix(bytes: &[u8]) -> usize {
    let len = bytes.len();
    let start = len.saturating_sub(3);
    for i in (start..len).rev() {
        let byte = bytes[i];
        if byte < 0x80 {
            return 0;
        }
        if byte >= 0xC0 {
            let need = if byte >= 0xF0 {
                4
            } else if byte >= 0xE0 {
                3
            } else {
                2
            };
            return if i + need > len { len - i } else { 0 };
        }
        // Continuation byte: keep scanning back for the lead
    }
    0
}
