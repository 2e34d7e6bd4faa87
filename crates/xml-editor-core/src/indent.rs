//! Auto-indentation.
//!
//! Computes the indentation to insert after a newline: the current line's
//! leading whitespace, deepened by one unit when the line leaves an element
//! open. The decision comes from real scan events rather than bracket
//! counting, so attribute values containing `>` or `<` do not confuse it.

use crate::line_index::LineIndex;
use crate::scanner::{ScanEvent, XmlScanner};
use crate::storage::TextStorage;

/// Indentation for a new line created by pressing enter at `offset`.
///
/// Returns the text to insert after the newline. Only the part of the line
/// before `offset` is considered, so splitting a line mid-way indents by
/// what is above the split.
pub fn indent_for_newline(
    lines: &LineIndex,
    storage: &(impl TextStorage + ?Sized),
    offset: usize,
    unit: &str,
) -> String {
    let offset = offset.min(storage.len());
    let line = lines.offset_to_line(offset);
    let line_start = lines.line_to_offset(line);
    let column = offset - line_start;

    let mut indent: String = lines
        .line_text(line)
        .unwrap_or_default()
        .chars()
        .take(column)
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect();

    if opens_element(storage, line_start, offset) {
        indent.push_str(unit);
    }
    indent
}

/// Whether `[start, end)` opens more elements than it closes.
fn opens_element(storage: &(impl TextStorage + ?Sized), start: usize, end: usize) -> bool {
    let mut scanner = XmlScanner::new();
    if scanner.set_range(storage, start, end).is_err() {
        return false;
    }
    let mut depth = 0i32;
    loop {
        match scanner.get_next_tag(storage) {
            ScanEvent::StartElement => depth += 1,
            ScanEvent::EndElement => {
                // Self-closing tags report end element only; their `/>` is
                // two characters wide and nets out to zero.
                if scanner.end_offset() - scanner.start_offset() == 1 {
                    depth -= 1;
                }
            }
            ScanEvent::EndDocument => break,
            _ => {}
        }
    }
    depth > 0
}
