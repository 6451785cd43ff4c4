//! Document assembly
//!
//! Consumes the decoded event stream in order and grows a styled document:
//! a sequence of sealed lines plus exactly one open line at the end.
//!
//! Line breaks are deferred: the server often ends a burst with a break
//! that belongs to a prompt about to be continued, and committing it
//! eagerly would litter the document with blank lines. A break is
//! materialized only once a later event proves the stream moved on, and
//! each break event yields at most one separator.

use super::color::Palette;
use super::fragment::{EffectFragment, OutputEvent};
use super::styled::{render_fragment, StyledRun};

/// One visual line of styled runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub runs: Vec<StyledRun>,
}

impl Line {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Concatenated text of the line.
    #[allow(dead_code)]
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Outcome of applying one event to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Visible content changed.
    Changed,
    /// Nothing visible changed (a deferred break, a dropped effect).
    Unchanged,
    /// Attention signal; the caller owns the terminal bell.
    Bell,
}

/// The growing styled document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Sealed lines followed by the open line (always non-empty).
    lines: Vec<Line>,
    /// A line break seen but not yet proven necessary.
    deferred_break: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            lines: vec![Line::default()],
            deferred_break: false,
        }
    }

    /// All lines, the open line last.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    #[cfg(test)]
    pub(crate) fn deferred_break(&self) -> bool {
        self.deferred_break
    }

    /// Apply one output event in stream order.
    pub fn apply(&mut self, event: OutputEvent, palette: &Palette) -> Applied {
        match event {
            OutputEvent::Text(fragment) => {
                self.commit_deferred_break();
                let run = render_fragment(fragment, palette);
                self.open_line_mut().runs.push(run);
                Applied::Changed
            }
            OutputEvent::LineBreak => {
                // An already-deferred break is now proven by this one and
                // flushes as a separator; the newest break takes its place.
                let materialized = self.deferred_break;
                if materialized {
                    self.start_line();
                }
                self.deferred_break = true;
                if materialized {
                    Applied::Changed
                } else {
                    Applied::Unchanged
                }
            }
            OutputEvent::Effect(EffectFragment::Beep) => Applied::Bell,
            OutputEvent::Effect(effect) => {
                tracing::trace!(?effect, "effect dropped from document");
                Applied::Unchanged
            }
            OutputEvent::Hr | OutputEvent::Image(_) | OutputEvent::PageBreak => {
                tracing::trace!("structural marker dropped from document");
                Applied::Unchanged
            }
        }
    }

    /// Append a locally generated echo of submitted input.
    ///
    /// The echo always starts a fresh visual line: any pending break is
    /// cleared, and a non-empty open line is sealed. An empty open line is
    /// reused rather than sealed as a spurious blank.
    pub fn echo(&mut self, run: StyledRun) {
        self.deferred_break = false;
        if !self.open_line().is_empty() {
            self.start_line();
        }
        self.open_line_mut().runs.push(run);
    }

    fn commit_deferred_break(&mut self) {
        if self.deferred_break {
            self.deferred_break = false;
            self.start_line();
        }
    }

    fn start_line(&mut self) {
        self.lines.push(Line::default());
    }

    fn open_line(&self) -> &Line {
        self.lines.last().expect("document always has an open line")
    }

    fn open_line_mut(&mut self) -> &mut Line {
        self.lines
            .last_mut()
            .expect("document always has an open line")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fragment::TextFragment;

    fn text(s: &str) -> OutputEvent {
        OutputEvent::Text(TextFragment::new(s))
    }

    fn line_texts(document: &Document) -> Vec<String> {
        document.lines().iter().map(Line::text).collect()
    }

    fn apply_all(document: &mut Document, events: Vec<OutputEvent>) {
        let palette = Palette::default();
        for event in events {
            document.apply(event, &palette);
        }
    }

    #[test]
    fn test_break_materializes_on_following_text() {
        let mut document = Document::new();
        apply_all(
            &mut document,
            vec![text("a"), OutputEvent::LineBreak, text("b")],
        );
        assert_eq!(line_texts(&document), ["a", "b"]);
    }

    #[test]
    fn test_trailing_break_stays_deferred() {
        let mut document = Document::new();
        apply_all(&mut document, vec![text("a"), OutputEvent::LineBreak]);
        assert_eq!(line_texts(&document), ["a"]);
        assert!(document.deferred_break());
    }

    #[test]
    fn test_double_break_yields_one_blank_line() {
        let mut document = Document::new();
        apply_all(
            &mut document,
            vec![
                text("a"),
                OutputEvent::LineBreak,
                OutputEvent::LineBreak,
                text("b"),
            ],
        );
        assert_eq!(line_texts(&document), ["a", "", "b"]);
    }

    #[test]
    fn test_split_runs_share_a_line() {
        let mut document = Document::new();
        apply_all(&mut document, vec![text("foo"), text("bar")]);
        assert_eq!(line_texts(&document), ["foobar"]);
        assert_eq!(document.lines()[0].runs.len(), 2);
    }

    #[test]
    fn test_beep_signals_without_document_change() {
        let mut document = Document::new();
        let palette = Palette::default();
        document.apply(text("a"), &palette);
        let applied = document.apply(OutputEvent::Effect(EffectFragment::Beep), &palette);
        assert_eq!(applied, Applied::Bell);
        assert_eq!(line_texts(&document), ["a"]);
    }

    #[test]
    fn test_other_effects_and_markers_are_dropped() {
        let mut document = Document::new();
        apply_all(
            &mut document,
            vec![
                text("a"),
                OutputEvent::Effect(EffectFragment::CarriageReturn),
                OutputEvent::Hr,
                OutputEvent::PageBreak,
                OutputEvent::Image("map.png".into()),
                text("b"),
            ],
        );
        assert_eq!(line_texts(&document), ["ab"]);
    }

    #[test]
    fn test_echo_starts_fresh_line_and_clears_deferred() {
        let mut document = Document::new();
        apply_all(&mut document, vec![text("Prompt> "), OutputEvent::LineBreak]);
        document.echo(StyledRun::plain("look", None, None));
        assert_eq!(line_texts(&document), ["Prompt> ", "look"]);
        assert!(!document.deferred_break());
        // The pending break merged into the seal: no extra blank line
    }

    #[test]
    fn test_echo_on_empty_open_line_does_not_fabricate_blank() {
        let mut document = Document::new();
        document.echo(StyledRun::plain("look", None, None));
        assert_eq!(line_texts(&document), ["look"]);
    }

    #[test]
    fn test_events_apply_in_stream_order() {
        let mut document = Document::new();
        let events: Vec<OutputEvent> = (0..32)
            .flat_map(|i| vec![text(&format!("line {i}")), OutputEvent::LineBreak])
            .collect();
        apply_all(&mut document, events);
        let expected: Vec<String> = (0..32).map(|i| format!("line {i}")).collect();
        assert_eq!(line_texts(&document), expected);
    }
}
