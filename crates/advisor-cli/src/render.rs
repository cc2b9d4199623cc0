//! Terminal answer sink

use advisor_finance::{AdvisorError, AnswerSink};
use console::{Term, measure_text_width};
use termimad::MadSkin;

const HEADER: &str = "### Answer";

/// Renders the answer as formatted markdown below an `Answer` header,
/// redrawing in place
///
/// On a terminal each render clears the previous one. When stdout is not a
/// terminal nothing can be cleared, so only the final answer is printed,
/// without styling.
pub struct TerminalSink {
    term: Term,
    skin: MadSkin,
    rows: usize,
    latest: String,
    header_shown: bool,
}

impl TerminalSink {
    /// Sink writing to stdout
    pub fn new() -> Self {
        let term = Term::stdout();
        let skin = if term.is_term() {
            MadSkin::default()
        } else {
            MadSkin::no_style()
        };
        Self {
            term,
            skin,
            rows: 0,
            latest: String::new(),
            header_shown: false,
        }
    }

    fn width(&self) -> usize {
        let (_, columns) = self.term.size();
        usize::from(columns).max(1)
    }

    fn show_header(&mut self) -> std::io::Result<()> {
        if !self.header_shown {
            let header = render_markdown(&self.skin, HEADER, self.width());
            self.term.write_line(&header)?;
            self.header_shown = true;
        }
        Ok(())
    }

    fn redraw(&mut self, markdown: &str) -> std::io::Result<()> {
        self.show_header()?;
        let width = self.width();
        let rendered = render_markdown(&self.skin, markdown, width);
        if self.rows > 0 {
            self.term.clear_last_lines(self.rows)?;
        }
        self.term.write_line(&rendered)?;
        self.rows = screen_rows(&rendered, width);
        Ok(())
    }

    /// Print the final answer when redrawing was not possible
    pub fn finish(&mut self) -> std::io::Result<()> {
        if !self.term.is_term() && !self.latest.is_empty() {
            self.show_header()?;
            let rendered = render_markdown(&self.skin, &self.latest, self.width());
            self.term.write_line(&rendered)?;
        }
        Ok(())
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Format markdown for the terminal, wrapped to `width` columns
fn render_markdown(skin: &MadSkin, markdown: &str, width: usize) -> String {
    skin.text(markdown, Some(width.max(1)))
        .to_string()
        .trim_end_matches('\n')
        .to_string()
}

/// Screen rows `write_line(text)` occupies at `width` columns
fn screen_rows(text: &str, width: usize) -> usize {
    let width = width.max(1);
    text.split('\n')
        .map(|line| measure_text_width(line).div_ceil(width).max(1))
        .sum()
}

impl AnswerSink for TerminalSink {
    fn render(&mut self, markdown: &str) -> advisor_finance::Result<()> {
        self.latest = markdown.to_string();
        if !self.term.is_term() {
            return Ok(());
        }

        self.redraw(markdown)
            .map_err(|e| AdvisorError::DisplayError(e.to_string()))
    }
}
