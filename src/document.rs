use tower_lsp::lsp_types::*;

use crate::fragment::Report;
use crate::parser::Dialect;
use crate::syntax::Span;

/// An open editor buffer and the result of its last lint.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,
    pub text: String,
    pub version: i32,
    pub dialect: Dialect,
    pub reports: Vec<Report>,
    line_starts: Vec<usize>,
}

impl Document {
    pub fn new(uri: Url, text: String, version: i32, dialect: Dialect) -> Self {
        let line_starts = line_starts(&text);
        Self {
            uri,
            text,
            version,
            dialect,
            reports: Vec::new(),
            line_starts,
        }
    }

    /// Byte offset to an LSP position (UTF-16 columns).
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let character: usize = self.text[line_start..offset]
            .chars()
            .map(char::len_utf16)
            .sum();
        Position::new(line as u32, character as u32)
    }

    /// LSP position back to a byte offset, clamped to the line end.
    pub fn position_to_offset(&self, position: Position) -> usize {
        let Some(&line_start) = self.line_starts.get(position.line as usize) else {
            return self.text.len();
        };
        let line_end = self
            .line_starts
            .get(position.line as usize + 1)
            .copied()
            .unwrap_or(self.text.len());

        let mut units = 0u32;
        for (i, c) in self.text[line_start..line_end].char_indices() {
            if units >= position.character || c == '\n' {
                return line_start + i;
            }
            units += c.len_utf16() as u32;
        }
        line_end
    }

    pub fn span_to_range(&self, span: Span) -> Range {
        Range::new(
            self.offset_to_position(span.start),
            self.offset_to_position(span.end),
        )
    }

    pub fn range_to_span(&self, range: Range) -> Span {
        Span::new(
            self.position_to_offset(range.start),
            self.position_to_offset(range.end),
        )
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}
