//! Element folding.
//!
//! Fold ranges are a derived view: [`compute_fold_spans`] walks the document
//! with [`XmlScanner::get_next_tag`] and pairs start and end tags by depth.
//! The document text is never spliced or rewritten; collapsing only changes
//! the line visibility mapping, and spans are recomputed from the text after
//! each edit.

use crate::line_index::LineIndex;
use crate::scanner::{ScanEvent, XmlScanner};
use crate::storage::TextStorage;

/// A foldable element extent. Lines are zero based with the end inclusive;
/// offsets run from the start tag's `<` to just past the end tag's `>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldSpan {
    /// Offset of the start tag's `<`.
    pub start_offset: usize,
    /// Offset just past the end tag's `>`.
    pub end_offset: usize,
    /// Line of the element's start tag.
    pub start_line: usize,
    /// Line of the element's end tag.
    pub end_line: usize,
}

/// Compute foldable element spans for the whole document.
///
/// Start and end tags are paired by a depth counter, so the result is stable
/// even over malformed documents: self-closing tags never open a span,
/// unmatched end tags are dropped, and elements whose tags share a line are
/// not worth folding and are omitted.
pub fn compute_fold_spans(
    storage: &(impl TextStorage + ?Sized),
    lines: &LineIndex,
) -> Vec<FoldSpan> {
    let mut scanner = XmlScanner::new();
    let mut open: Vec<usize> = Vec::new();
    let mut spans = Vec::new();

    loop {
        match scanner.get_next_tag(storage) {
            ScanEvent::EndDocument => break,
            ScanEvent::StartElement => open.push(scanner.tag_start_offset()),
            ScanEvent::EndElement => {
                // A self-closing tag's `/>` spans two characters, an end
                // tag's `>` one; only the latter closes an open element.
                if scanner.end_offset() - scanner.start_offset() == 2 {
                    continue;
                }
                if let Some(start) = open.pop() {
                    let start_line = lines.offset_to_line(start);
                    let end_line = lines.offset_to_line(scanner.tag_start_offset());
                    if end_line > start_line {
                        spans.push(FoldSpan {
                            start_offset: start,
                            end_offset: scanner.end_offset(),
                            start_line,
                            end_line,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    spans.sort_by_key(|s| (s.start_line, s.end_line));
    spans.dedup();
    spans
}

/// Collapse state over a set of derived [`FoldSpan`]s.
///
/// Collapsing a span hides the lines after its start tag line through its
/// end tag line. The state survives recomputation: a span collapsed by the
/// user stays collapsed as long as a span still starts on that line.
#[derive(Default)]
pub struct FoldingState {
    spans: Vec<FoldSpan>,
    /// Start lines of collapsed spans.
    collapsed: Vec<usize>,
}

impl FoldingState {
    /// Create state with no spans.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the derived spans, keeping collapse marks on lines where a
    /// span still starts.
    pub fn update(&mut self, mut spans: Vec<FoldSpan>) {
        spans.sort_by_key(|s| (s.start_line, s.end_line));
        spans.dedup();
        spans.retain(|s| s.end_line > s.start_line);
        self.collapsed
            .retain(|&line| spans.iter().any(|s| s.start_line == line));
        self.spans = spans;
    }

    /// The current spans, sorted by start line.
    pub fn spans(&self) -> &[FoldSpan] {
        &self.spans
    }

    /// The innermost span starting on `line`.
    pub fn span_starting_at(&self, line: usize) -> Option<FoldSpan> {
        self.spans
            .iter()
            .filter(|s| s.start_line == line)
            .min_by_key(|s| s.end_line)
            .copied()
    }

    /// Whether the span starting on `line` is collapsed.
    pub fn is_collapsed(&self, line: usize) -> bool {
        self.collapsed.contains(&line)
    }

    /// Collapse the span starting on `line`. Returns false when no span
    /// starts there.
    pub fn collapse(&mut self, line: usize) -> bool {
        if self.span_starting_at(line).is_none() {
            return false;
        }
        if !self.collapsed.contains(&line) {
            self.collapsed.push(line);
            self.collapsed.sort_unstable();
        }
        true
    }

    /// Expand the span starting on `line`. Returns false when it was not
    /// collapsed.
    pub fn expand(&mut self, line: usize) -> bool {
        let before = self.collapsed.len();
        self.collapsed.retain(|&l| l != line);
        self.collapsed.len() != before
    }

    /// Toggle the span starting on `line`.
    pub fn toggle(&mut self, line: usize) -> bool {
        if self.is_collapsed(line) {
            self.expand(line)
        } else {
            self.collapse(line)
        }
    }

    /// Whether `line` is hidden by some collapsed span.
    pub fn is_line_hidden(&self, line: usize) -> bool {
        self.hidden_ranges()
            .iter()
            .any(|&(a, b)| line >= a && line <= b)
    }

    /// Visual line for a logical line, or `None` when the line is hidden.
    pub fn logical_to_visual(&self, line: usize) -> Option<usize> {
        let mut hidden = 0;
        for (a, b) in self.hidden_ranges() {
            if line >= a && line <= b {
                return None;
            }
            if b < line {
                hidden += b - a + 1;
            }
        }
        Some(line - hidden)
    }

    /// Logical line shown on a visual line.
    pub fn visual_to_logical(&self, visual: usize) -> usize {
        let mut logical = visual;
        for (a, b) in self.hidden_ranges() {
            if a <= logical {
                logical += b - a + 1;
            } else {
                break;
            }
        }
        logical
    }

    /// Number of visible lines in a document of `line_count` lines.
    pub fn visible_line_count(&self, line_count: usize) -> usize {
        let hidden: usize = self
            .hidden_ranges()
            .iter()
            .map(|&(a, b)| b.min(line_count.saturating_sub(1)).saturating_sub(a) + 1)
            .sum();
        line_count.saturating_sub(hidden)
    }

    /// Hidden line ranges (inclusive), merged so nested collapsed spans are
    /// not counted twice.
    fn hidden_ranges(&self) -> Vec<(usize, usize)> {
        let mut ranges: Vec<(usize, usize)> = self
            .spans
            .iter()
            .filter(|s| self.collapsed.contains(&s.start_line))
            .map(|s| (s.start_line + 1, s.end_line))
            .collect();
        ranges.sort_unstable();
        let mut merged: Vec<(usize, usize)> = Vec::new();
        for (a, b) in ranges {
            match merged.last_mut() {
                Some((_, last)) if a <= *last + 1 => *last = (*last).max(b),
                _ => merged.push((a, b)),
            }
        }
        merged
    }
}
