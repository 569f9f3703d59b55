use fluxdoc_domain::Finding;

use super::text::{header, key_value, sub_header};

/// Line-oriented text accumulator for operator reports.
#[derive(Debug, Default, Clone)]
pub struct TextReport {
    buffer: String,
}

impl TextReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.buffer.push_str(text.as_ref());
        self.buffer.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// Title header followed by an empty line.
    pub fn header(&mut self, title: &str) -> &mut Self {
        self.line(header(title)).blank()
    }

    /// Sub-section header preceded by an empty line.
    pub fn section(&mut self, title: &str) -> &mut Self {
        self.blank().line(sub_header(title))
    }

    pub fn key_value(&mut self, key: &str, value: &str) -> &mut Self {
        self.line(key_value(key, value))
    }

    pub fn finding(&mut self, indent: &str, finding: &Finding) -> &mut Self {
        self.line(format!("{indent}{finding}"))
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}
