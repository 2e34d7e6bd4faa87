//! Line index.
//!
//! Maps character offsets to line/column positions and back, backed by a
//! Rope so lookups stay O(log N) on large documents. Folding and indentation
//! are line oriented while the scanner works in character offsets; this is
//! the bridge between the two.

use ropey::Rope;

/// Rope-backed line/offset conversion for a document.
///
/// The index holds its own copy of the text. Callers that edit through a
/// [`PieceTable`](crate::storage::PieceTable) mirror each edit here with
/// [`insert`](Self::insert) and [`delete`](Self::delete); both structures
/// then agree on every offset.
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build an index from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Total line count. An empty document has one line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Total character count.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Line containing the character at `offset`. Offsets at or past the end
    /// resolve to the last line.
    pub fn offset_to_line(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    /// Character offset of the first character of `line`. Lines past the end
    /// resolve to the document end.
    pub fn line_to_offset(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        self.rope.line_to_char(line)
    }

    /// Split a character offset into `(line, column)`, both zero based and
    /// in characters.
    pub fn offset_to_position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        (line, offset - self.rope.line_to_char(line))
    }

    /// Character offset for a `(line, column)` position. Columns past the
    /// line end clamp to the end of the line.
    pub fn position_to_offset(&self, line: usize, column: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        let start = self.rope.line_to_char(line);
        let end = if line + 1 < self.rope.len_lines() {
            self.rope.line_to_char(line + 1) - 1
        } else {
            self.rope.len_chars()
        };
        start + column.min(end - start)
    }

    /// Text of `line` without its trailing newline, or `None` past the end.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(line).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        if text.ends_with('\r') {
            text.pop();
        }
        Some(text)
    }

    /// Mirror an insertion made in the document storage.
    pub fn insert(&mut self, offset: usize, text: &str) {
        let offset = offset.min(self.rope.len_chars());
        self.rope.insert(offset, text);
    }

    /// Mirror a deletion made in the document storage.
    pub fn delete(&mut self, offset: usize, count: usize) {
        let start = offset.min(self.rope.len_chars());
        let end = (offset + count).min(self.rope.len_chars());
        if start < end {
            self.rope.remove(start..end);
        }
    }

    /// The whole indexed text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}
