//! Document storage.
//!
//! The scanner never holds document text itself; it reads it through the
//! [`TextStorage`] trait one window at a time. Any character-addressable text
//! container can back a scan. Two implementations ship here: a piece table
//! for mutable editor buffers, and a trivial one for `str` so scans can run
//! over plain strings in tests and one-shot tools.

use std::fmt;

/// Error raised when a caller asks for text outside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The requested range `[offset, offset + count)` does not fit in a
    /// document of `len` characters.
    OutOfRange {
        /// Requested start offset (characters).
        offset: usize,
        /// Requested character count.
        count: usize,
        /// Document length in characters.
        len: usize,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::OutOfRange { offset, count, len } => write!(
                f,
                "text range [{}, {}) is outside document of length {}",
                offset,
                offset + count,
                len
            ),
        }
    }
}

impl std::error::Error for StorageError {}

/// Character-addressable read access to document text.
///
/// Offsets and counts are in characters, not bytes. Implementations must
/// report the same `len()` for the whole duration of a scan; mutating the
/// document mid-scan and continuing without a reset gives unspecified (but
/// memory-safe) token output.
pub trait TextStorage {
    /// Total document length in characters.
    fn len(&self) -> usize;

    /// Whether the document is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out `count` characters starting at character `offset`.
    fn get_text(&self, offset: usize, count: usize) -> Result<String, StorageError>;
}

impl TextStorage for str {
    fn len(&self) -> usize {
        self.chars().count()
    }

    fn get_text(&self, offset: usize, count: usize) -> Result<String, StorageError> {
        let len = TextStorage::len(self);
        if offset + count > len {
            return Err(StorageError::OutOfRange { offset, count, len });
        }
        Ok(self.chars().skip(offset).take(count).collect())
    }
}

impl TextStorage for String {
    fn len(&self) -> usize {
        TextStorage::len(self.as_str())
    }

    fn get_text(&self, offset: usize, count: usize) -> Result<String, StorageError> {
        self.as_str().get_text(offset, count)
    }
}

/// Which backing buffer a [`Span`] points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Buffer {
    /// The immutable text the table was created from.
    Original,
    /// The append-only buffer that collects inserted text.
    Added,
}

/// A contiguous run of text inside one of the two buffers.
#[derive(Debug, Clone)]
struct Span {
    buffer: Buffer,
    /// Byte offset of the run inside its buffer.
    start: usize,
    bytes: usize,
    chars: usize,
}

/// Piece-table document buffer.
///
/// Edits never move existing text; they only re-thread the span list, so
/// insertion and deletion cost is proportional to the span count rather than
/// the document size.
pub struct PieceTable {
    original: String,
    added: String,
    spans: Vec<Span>,
}

impl PieceTable {
    /// Create a table over existing text.
    pub fn new(text: &str) -> Self {
        let mut spans = Vec::new();
        if !text.is_empty() {
            spans.push(Span {
                buffer: Buffer::Original,
                start: 0,
                bytes: text.len(),
                chars: text.chars().count(),
            });
        }
        Self {
            original: text.to_string(),
            added: String::new(),
            spans,
        }
    }

    /// Create an empty table.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// Insert `text` at character `offset`. Offsets past the end append.
    pub fn insert(&mut self, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let new_span = Span {
            buffer: Buffer::Added,
            start: self.added.len(),
            bytes: text.len(),
            chars: text.chars().count(),
        };
        self.added.push_str(text);

        match self.locate(offset) {
            Some((idx, 0)) => self.spans.insert(idx, new_span),
            Some((idx, within)) if within == self.spans[idx].chars => {
                self.spans.insert(idx + 1, new_span);
            }
            Some((idx, within)) => {
                let (left, right) = self.split(&self.spans[idx], within);
                self.spans.splice(idx..=idx, [left, new_span, right]);
            }
            None => self.spans.push(new_span),
        }
        self.coalesce();
    }

    /// Delete `count` characters starting at character `offset`. The range is
    /// clamped to the document end.
    pub fn delete(&mut self, offset: usize, count: usize) {
        let len = self.len();
        if count == 0 || offset >= len {
            return;
        }
        let end = (offset + count).min(len);

        let mut replacement = Vec::new();
        let mut first = None;
        let mut last = 0;
        let mut at = 0;
        for (idx, span) in self.spans.iter().enumerate() {
            let span_end = at + span.chars;
            if span_end > offset && at < end {
                if first.is_none() {
                    first = Some(idx);
                    if at < offset {
                        let (left, _) = self.split(span, offset - at);
                        replacement.push(left);
                    }
                }
                last = idx;
                if span_end > end {
                    let (_, right) = self.split(span, end - at);
                    replacement.push(right);
                }
            }
            at = span_end;
        }
        if let Some(first) = first {
            self.spans.splice(first..=last, replacement);
        }
        self.coalesce();
    }

    /// The whole document as one string.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| self.span_text(s)).collect()
    }

    fn span_text<'a>(&'a self, span: &Span) -> &'a str {
        let buf = match span.buffer {
            Buffer::Original => &self.original,
            Buffer::Added => &self.added,
        };
        &buf[span.start..span.start + span.bytes]
    }

    /// Find the span containing character `offset`, with the character offset
    /// inside that span. `None` means the table is empty. Offsets past the end
    /// resolve to the end of the last span.
    fn locate(&self, offset: usize) -> Option<(usize, usize)> {
        let mut at = 0;
        for (idx, span) in self.spans.iter().enumerate() {
            if offset <= at + span.chars {
                return Some((idx, offset - at));
            }
            at += span.chars;
        }
        self.spans
            .last()
            .map(|last| (self.spans.len() - 1, last.chars))
    }

    fn split(&self, span: &Span, chars: usize) -> (Span, Span) {
        let text = self.span_text(span);
        let byte = text
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(span.bytes);
        (
            Span {
                buffer: span.buffer,
                start: span.start,
                bytes: byte,
                chars,
            },
            Span {
                buffer: span.buffer,
                start: span.start + byte,
                bytes: span.bytes - byte,
                chars: span.chars - chars,
            },
        )
    }

    /// Merge spans that are contiguous in the added buffer. Repeated typing
    /// at one position would otherwise grow the span list without bound.
    fn coalesce(&mut self) {
        let mut i = 0;
        while i + 1 < self.spans.len() {
            let (a, b) = (&self.spans[i], &self.spans[i + 1]);
            if a.buffer == Buffer::Added
                && b.buffer == Buffer::Added
                && a.start + a.bytes == b.start
            {
                let (bytes, chars) = (b.bytes, b.chars);
                self.spans[i].bytes += bytes;
                self.spans[i].chars += chars;
                self.spans.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }
}

impl TextStorage for PieceTable {
    fn len(&self) -> usize {
        self.spans.iter().map(|s| s.chars).sum()
    }

    fn get_text(&self, offset: usize, count: usize) -> Result<String, StorageError> {
        let len = self.len();
        if offset + count > len {
            return Err(StorageError::OutOfRange { offset, count, len });
        }
        let mut out = String::with_capacity(count);
        let end = offset + count;
        let mut at = 0;
        for span in &self.spans {
            let span_end = at + span.chars;
            if span_end > offset && at < end {
                let text = self.span_text(span);
                let skip = offset.saturating_sub(at);
                let take = end.min(span_end) - at.max(offset);
                out.extend(text.chars().skip(skip).take(take));
            }
            if span_end >= end {
                break;
            }
            at = span_end;
        }
        Ok(out)
    }
}
