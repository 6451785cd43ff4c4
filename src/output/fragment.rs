//! Output stream data model
//!
//! The backend decoder emits a flat stream of events: styled text runs,
//! line breaks, terminal effects, and structural markers. Events carry no
//! identity beyond their position in the stream and are consumed exactly
//! once.

use bitflags::bitflags;

use super::color::ColorValue;
use super::link::Link;

bitflags! {
    /// Boolean style attributes of a text fragment.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StyleFlags: u8 {
        const BOLD = 1 << 0;
        const FAINT = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK = 1 << 4;
        const INVERSE = 1 << 5;
        const STRIKEOUT = 1 << 6;
    }
}

/// One styled run of text as emitted by the backend.
///
/// The text is raw bytes: the stream is expected to be UTF-8, but
/// validation is deferred to rendering so a bad run degrades to a
/// replacement glyph instead of poisoning the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: Vec<u8>,
    pub foreground: ColorValue,
    pub background: ColorValue,
    pub flags: StyleFlags,
    pub link: Option<Link>,
}

impl TextFragment {
    pub fn new(text: impl Into<Vec<u8>>) -> Self {
        Self {
            text: text.into(),
            foreground: ColorValue::DEFAULT_FOREGROUND,
            background: ColorValue::DEFAULT_BACKGROUND,
            flags: StyleFlags::empty(),
            link: None,
        }
    }

    pub fn with_colors(mut self, foreground: ColorValue, background: ColorValue) -> Self {
        self.foreground = foreground;
        self.background = background;
        self
    }

    pub fn with_flags(mut self, flags: StyleFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.link = Some(link);
        self
    }
}

/// Non-text terminal effects.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectFragment {
    Backspace,
    Beep,
    CarriageReturn,
    EraseCharacter,
    EraseLine,
}

/// One event in the decoded output stream.
///
/// Only `Text`, `LineBreak` and `Effect(Beep)` carry behavior today; the
/// structural markers exist so a richer backend can slot in behind the
/// same seam.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    Text(TextFragment),
    LineBreak,
    Effect(EffectFragment),
    Hr,
    Image(String),
    PageBreak,
}
