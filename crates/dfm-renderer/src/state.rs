//! Event-processing state for the HTML renderer.

use pulldown_cmark::Alignment;

/// State for tracking code block rendering.
#[derive(Debug, Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    language: Option<String>,
    buffer: String,
}

impl CodeBlockState {
    /// Start a new code block with optional language.
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    /// End the current code block and return (language, content).
    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// State for tracking table rendering.
#[derive(Debug, Default)]
pub(crate) struct TableState {
    in_head: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub(crate) fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Get the alignment style for the current cell.
    pub(crate) fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// State for capturing image alt text.
///
/// Images nest (`![a ![b](b.png)](a.png)` is legal), so only the outermost
/// image collects alt text.
#[derive(Debug, Default)]
pub(crate) struct ImageState {
    depth: usize,
    alt_text: String,
}

impl ImageState {
    pub(crate) fn start(&mut self) {
        if self.depth == 0 {
            self.alt_text.clear();
        }
        self.depth += 1;
    }

    /// End image capture. Returns the alt text once the outermost image closes.
    pub(crate) fn end(&mut self) -> Option<String> {
        self.depth = self.depth.saturating_sub(1);
        (self.depth == 0).then(|| std::mem::take(&mut self.alt_text))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// State for the heading being rendered.
///
/// Heading markup is buffered until the end tag so the `id` attribute can be
/// derived from the heading's plain text.
#[derive(Debug, Default)]
pub(crate) struct HeadingState {
    current_level: Option<u8>,
    text: String,
    html: String,
}

impl HeadingState {
    pub(crate) fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub(crate) fn start_heading(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Complete heading. Returns (level, text, html) or None if not in a heading.
    pub(crate) fn complete_heading(&mut self) -> Option<(u8, String, String)> {
        let level = self.current_level.take()?;
        Some((
            level,
            std::mem::take(&mut self.text),
            std::mem::take(&mut self.html),
        ))
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_code_block_state() {
        let mut code = CodeBlockState::default();
        code.start(Some("yaml".to_owned()));
        code.push_str("key: value\n");

        assert!(code.is_active());
        assert_eq!(code.end(), (Some("yaml".to_owned()), "key: value\n".to_owned()));
        assert!(!code.is_active());
    }

    #[test]
    fn test_table_alignment() {
        let mut table = TableState::default();
        table.start(vec![Alignment::None, Alignment::Right]);
        table.start_row();

        assert_eq!(table.current_alignment_style(), "");
        table.next_cell();
        assert_eq!(
            table.current_alignment_style(),
            r#" style="text-align:right""#
        );
    }

    #[test]
    fn test_nested_image_alt_text() {
        let mut image = ImageState::default();
        image.start();
        image.push_str("outer ");
        image.start();
        image.push_str("inner");

        assert_eq!(image.end(), None);
        assert!(image.is_active());
        assert_eq!(image.end(), Some("outer inner".to_owned()));
        assert!(!image.is_active());
    }

    #[test]
    fn test_heading_state() {
        let mut heading = HeadingState::default();
        heading.start_heading(2);
        heading.push_text("Hello");
        heading.push_html("<em>Hello</em>");

        assert_eq!(
            heading.complete_heading(),
            Some((2, "Hello".to_owned(), "<em>Hello</em>".to_owned()))
        );
        assert!(heading.complete_heading().is_none());
    }
}
