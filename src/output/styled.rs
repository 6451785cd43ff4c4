//! Fragment rendering
//!
//! Converts one immutable text fragment into one immutable styled run:
//! resolves colors against the palette (honoring inversion and baseline
//! suppression), folds the style flags, and turns link metadata into an
//! encoded payload with a tooltip.

use super::color::{resolve, ColorRole, Palette, RgbColor};
use super::fragment::{StyleFlags, TextFragment};
use super::link::{encode_action, EMBED_TEXT};

/// An activatable link attached to a rendered run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLink {
    /// Opaque payload handed back on activation.
    pub payload: String,
    /// Plain-text flyover hint.
    pub tooltip: String,
}

/// One rendered, immutable run of styled text.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRun {
    pub text: String,
    /// `None` leaves the terminal's default foreground in place.
    pub foreground: Option<RgbColor>,
    /// `None` leaves the terminal's default background in place.
    pub background: Option<RgbColor>,
    /// Remaining decorations; inversion has already been folded into the
    /// colors by the time a run exists.
    pub flags: StyleFlags,
    pub link: Option<RunLink>,
}

impl StyledRun {
    /// Plain run with explicit colors, used for locally generated text such
    /// as the input echo.
    pub fn plain(
        text: impl Into<String>,
        foreground: Option<RgbColor>,
        background: Option<RgbColor>,
    ) -> Self {
        Self {
            text: text.into(),
            foreground,
            background,
            flags: StyleFlags::empty(),
            link: None,
        }
    }
}

/// Render one fragment against a palette.
///
/// Inverse swaps the fragment's color values before role resolution, so the
/// baseline rules apply to the swapped assignment. A link forces underline
/// and substitutes the run's own text for [`EMBED_TEXT`] in the action
/// template before encoding. Text that is not valid UTF-8 renders as a
/// single replacement glyph; this is the only recoverable decode failure in
/// the pipeline.
pub fn render_fragment(fragment: TextFragment, palette: &Palette) -> StyledRun {
    let text = match String::from_utf8(fragment.text) {
        Ok(text) => text,
        Err(error) => {
            tracing::warn!("dropping non-UTF-8 fragment text: {}", error);
            String::from(char::REPLACEMENT_CHARACTER)
        }
    };

    let (fg_value, bg_value) = if fragment.flags.contains(StyleFlags::INVERSE) {
        (fragment.background, fragment.foreground)
    } else {
        (fragment.foreground, fragment.background)
    };

    let mut flags = fragment.flags - StyleFlags::INVERSE;
    let link = fragment.link.map(|link| {
        let action = link.action.replace(EMBED_TEXT, &text);
        RunLink {
            payload: encode_action(link.sendto, &action),
            tooltip: link.hint.unwrap_or_else(|| action.clone()),
        }
    });
    if link.is_some() {
        flags |= StyleFlags::UNDERLINE;
    }

    StyledRun {
        foreground: resolve(ColorRole::Foreground, fg_value, palette),
        background: resolve(ColorRole::Background, bg_value, palette),
        flags,
        link,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::color::ColorValue;
    use crate::output::link::{Link, SendTo};

    fn palette() -> Palette {
        Palette::default()
    }

    #[test]
    fn test_baseline_colors_are_omitted() {
        let run = render_fragment(TextFragment::new("hello"), &palette());
        assert_eq!(run.text, "hello");
        assert_eq!(run.foreground, None);
        assert_eq!(run.background, None);
        assert!(run.flags.is_empty());
    }

    #[test]
    fn test_inverse_swaps_before_resolution() {
        let inverse = render_fragment(
            TextFragment::new("x")
                .with_colors(ColorValue::Ansi(2), ColorValue::Ansi(0))
                .with_flags(StyleFlags::INVERSE),
            &palette(),
        );
        let swapped = render_fragment(
            TextFragment::new("x").with_colors(ColorValue::Ansi(0), ColorValue::Ansi(2)),
            &palette(),
        );
        assert_eq!(inverse.foreground, swapped.foreground);
        assert_eq!(inverse.background, swapped.background);
        // Inversion is consumed, not carried
        assert!(!inverse.flags.contains(StyleFlags::INVERSE));
    }

    #[test]
    fn test_link_forces_underline_and_substitutes() {
        let run = render_fragment(
            TextFragment::new("troll").with_link(Link::new(
                "kill &text;",
                None,
                SendTo::World,
            )),
            &palette(),
        );
        assert!(run.flags.contains(StyleFlags::UNDERLINE));
        let link = run.link.expect("link attached");
        assert_eq!(link.payload, "mudterm://send?text=kill+troll");
        assert_eq!(link.tooltip, "kill troll");
    }

    #[test]
    fn test_link_hint_becomes_tooltip() {
        let run = render_fragment(
            TextFragment::new("north").with_link(Link::new(
                "north",
                Some("Walk north"),
                SendTo::World,
            )),
            &palette(),
        );
        assert_eq!(run.link.expect("link attached").tooltip, "Walk north");
    }

    #[test]
    fn test_invalid_utf8_renders_replacement_glyph() {
        let run = render_fragment(TextFragment::new(vec![0xC3, 0x28, 0xFF]), &palette());
        assert_eq!(run.text, "\u{FFFD}");
    }

    #[test]
    fn test_decorations_are_independent() {
        let run = render_fragment(
            TextFragment::new("x").with_flags(StyleFlags::UNDERLINE | StyleFlags::STRIKEOUT),
            &palette(),
        );
        assert!(run.flags.contains(StyleFlags::UNDERLINE));
        assert!(run.flags.contains(StyleFlags::STRIKEOUT));
    }
}
