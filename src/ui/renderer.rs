//! Terminal renderer using crossterm
//!
//! Paints the styled document, a status line, and the input line. Keeps a
//! hit map of link regions from the last frame so mouse clicks can be
//! resolved back to link payloads.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor,
        SetForegroundColor,
    },
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::output::{Document, StyleFlags, StyledRun};
use crate::ui::input::InputLine;

const PROMPT: &str = "> ";

/// A clickable region from the last rendered frame
struct LinkRegion {
    row: u16,
    start: u16,
    end: u16,
    payload: String,
    tooltip: String,
}

/// Terminal renderer
pub struct Renderer {
    /// Whether the terminal has been initialized
    initialized: bool,
    /// Lines scrolled up from the live tail
    scroll_offset: usize,
    /// Link hit map, rebuilt each frame
    links: Vec<LinkRegion>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            initialized: false,
            scroll_offset: 0,
            links: Vec::new(),
        }
    }

    /// Current terminal size
    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Initialize the terminal for rendering
    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            crossterm::event::EnableMouseCapture,
            DisableLineWrap,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        stdout.flush()?;
        self.initialized = true;
        Ok(())
    }

    /// Cleanup the terminal
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;

        let mut stdout = io::stdout();
        let _ = execute!(stdout, ResetColor, SetAttribute(Attribute::Reset));
        let _ = execute!(stdout, Show);
        let _ = execute!(stdout, EnableLineWrap);
        let _ = execute!(stdout, crossterm::event::DisableMouseCapture);
        let _ = execute!(stdout, LeaveAlternateScreen);
        let _ = stdout.flush();

        terminal::disable_raw_mode()?;
        println!();
        Ok(())
    }

    /// Scroll the view up (towards older lines)
    pub fn scroll_up(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(n);
    }

    /// Scroll the view down (towards the live tail)
    pub fn scroll_down(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn is_scrolled(&self) -> bool {
        self.scroll_offset > 0
    }

    /// Find the link payload under a screen position, if any
    pub fn link_at(&self, column: u16, row: u16) -> Option<&str> {
        self.region_at(column, row).map(|region| region.payload.as_str())
    }

    /// Find the link tooltip under a screen position, if any
    pub fn tooltip_at(&self, column: u16, row: u16) -> Option<&str> {
        self.region_at(column, row).map(|region| region.tooltip.as_str())
    }

    fn region_at(&self, column: u16, row: u16) -> Option<&LinkRegion> {
        self.links
            .iter()
            .find(|region| region.row == row && column >= region.start && column < region.end)
    }

    /// Render a full frame: document view, status line, input line.
    pub fn render(
        &mut self,
        document: &Document,
        input: &InputLine,
        status: &str,
    ) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        if cols < 4 || rows < 3 {
            return Ok(());
        }
        let view_rows = (rows - 2) as usize;

        self.links.clear();
        let mut stdout = io::stdout();
        queue!(stdout, Hide)?;

        // Clamp the scroll offset so the view never runs off the top
        let total = document.len();
        let max_offset = total.saturating_sub(view_rows);
        self.scroll_offset = self.scroll_offset.min(max_offset);
        let end = total - self.scroll_offset;
        let start = end.saturating_sub(view_rows);

        for (row, line) in document.lines()[start..end].iter().enumerate() {
            queue!(stdout, MoveTo(0, row as u16), Clear(ClearType::CurrentLine))?;
            let mut column = 0usize;
            for run in &line.runs {
                if column >= cols as usize {
                    break;
                }
                column = self.draw_run(&mut stdout, run, row as u16, column, cols as usize)?;
            }
        }
        // Blank out rows below a short document
        for row in (end - start)..view_rows {
            queue!(stdout, MoveTo(0, row as u16), Clear(ClearType::CurrentLine))?;
        }

        self.draw_status(&mut stdout, status, rows - 2, cols)?;
        self.draw_input(&mut stdout, input, rows - 1, cols)?;
        stdout.flush()?;
        Ok(())
    }

    /// Draw one styled run; returns the column after it.
    fn draw_run(
        &mut self,
        stdout: &mut impl Write,
        run: &StyledRun,
        row: u16,
        column: usize,
        max_cols: usize,
    ) -> io::Result<usize> {
        let (text, width) = fit_columns(&run.text, max_cols - column);
        if text.is_empty() {
            return Ok(column);
        }

        if let Some(color) = run.foreground {
            queue!(stdout, SetForegroundColor(color.to_crossterm()))?;
        }
        if let Some(color) = run.background {
            queue!(stdout, SetBackgroundColor(color.to_crossterm()))?;
        }
        for (flag, attribute) in [
            (StyleFlags::BOLD, Attribute::Bold),
            (StyleFlags::FAINT, Attribute::Dim),
            (StyleFlags::ITALIC, Attribute::Italic),
            (StyleFlags::UNDERLINE, Attribute::Underlined),
            (StyleFlags::BLINK, Attribute::SlowBlink),
            (StyleFlags::STRIKEOUT, Attribute::CrossedOut),
        ] {
            if run.flags.contains(flag) {
                queue!(stdout, SetAttribute(attribute))?;
            }
        }

        queue!(stdout, Print(text), ResetColor, SetAttribute(Attribute::Reset))?;

        if let Some(link) = &run.link {
            self.links.push(LinkRegion {
                row,
                start: column as u16,
                end: (column + width) as u16,
                payload: link.payload.clone(),
                tooltip: link.tooltip.clone(),
            });
        }
        Ok(column + width)
    }

    fn draw_status(
        &self,
        stdout: &mut impl Write,
        status: &str,
        row: u16,
        cols: u16,
    ) -> io::Result<()> {
        let (text, width) = fit_columns(status, cols as usize);
        let padding = " ".repeat(cols as usize - width);
        queue!(
            stdout,
            MoveTo(0, row),
            SetBackgroundColor(Color::Rgb { r: 40, g: 40, b: 40 }),
            SetForegroundColor(Color::Rgb { r: 180, g: 180, b: 180 }),
            Print(text),
            Print(padding),
            ResetColor
        )?;
        Ok(())
    }

    fn draw_input(
        &self,
        stdout: &mut impl Write,
        input: &InputLine,
        row: u16,
        cols: u16,
    ) -> io::Result<()> {
        let available = (cols as usize).saturating_sub(PROMPT.width() + 1);

        // Keep the cursor in view when the line is longer than the screen
        let cursor_columns = input.cursor_columns();
        let skip = cursor_columns.saturating_sub(available);
        let visible: String = skip_columns(input.text(), skip);
        let (text, _) = fit_columns(&visible, available);

        queue!(
            stdout,
            MoveTo(0, row),
            Clear(ClearType::CurrentLine),
            Print(PROMPT),
            Print(text),
            MoveTo((PROMPT.width() + cursor_columns - skip) as u16, row),
            Show
        )?;
        Ok(())
    }
}

/// Longest prefix of `text` that fits in `available` columns, with its width.
fn fit_columns(text: &str, available: usize) -> (&str, usize) {
    let mut width = 0;
    for (offset, ch) in text.char_indices() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > available {
            return (&text[..offset], width);
        }
        width += ch_width;
    }
    (text, width)
}

/// Drop the first `columns` display columns from `text`.
fn skip_columns(text: &str, columns: usize) -> String {
    if columns == 0 {
        return text.to_owned();
    }
    let mut width = 0;
    for (offset, ch) in text.char_indices() {
        if width >= columns {
            return text[offset..].to_owned();
        }
        width += ch.width().unwrap_or(0);
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_columns() {
        assert_eq!(fit_columns("hello", 10), ("hello", 5));
        assert_eq!(fit_columns("hello", 3), ("hel", 3));
        assert_eq!(fit_columns("", 3), ("", 0));
        // Wide characters never straddle the boundary
        assert_eq!(fit_columns("日本語", 5), ("日本", 4));
    }

    #[test]
    fn test_skip_columns() {
        assert_eq!(skip_columns("hello", 0), "hello");
        assert_eq!(skip_columns("hello", 2), "llo");
        assert_eq!(skip_columns("hi", 5), "");
    }
}
