#![warn(missing_docs)]
//! XML Editor Core - Headless XML Editing Kernel
//!
//! # Overview
//!
//! `xml-editor-core` is the document side of an XML editor: storage, an
//! incremental lexical scanner, line indexing, element folding, token
//! styling, and auto-indentation. It renders nothing itself; view crates
//! drive the scanner over whatever slice of the document is on screen.
//!
//! # Core Features
//!
//! - **Incremental scanning**: one token per [`XmlScanner::scan`] call,
//!   restartable at any tag boundary via [`XmlScanner::set_range`]
//! - **Error tolerance**: malformed XML flags tokens instead of failing,
//!   and the scan resynchronizes on the next `<`
//! - **Efficient text storage**: Piece Table edits behind the
//!   [`TextStorage`] trait the scanner reads through
//! - **Line index**: Rope based offset/position conversion
//! - **Element folding**: fold spans derived from scan events, collapse
//!   state as a pure line-visibility mapping
//! - **Styling**: per-view [`StyleConfiguration`] plus interval layers for
//!   highlight producers
//!
//! # Quick Start
//!
//! ```rust
//! use xml_editor_core::{ScanEvent, TokenKind, XmlScanner};
//!
//! let doc = "<greeting lang='en'>hello</greeting>";
//! let mut scanner = XmlScanner::new();
//!
//! assert_eq!(scanner.scan(doc), Some(TokenKind::Special)); // `<`
//! assert_eq!(scanner.scan(doc), Some(TokenKind::ElementName));
//! assert_eq!(scanner.event(), ScanEvent::StartElement);
//! assert_eq!(
//!     (scanner.start_offset(), scanner.end_offset()),
//!     (1, 9),
//! );
//! ```
//!
//! # Module Description
//!
//! - [`storage`] - Piece Table storage and the [`TextStorage`] read trait
//! - [`scanner`] - the incremental XML tokenizer
//! - [`line_index`] - Rope based line index
//! - [`intervals`] - style interval layers for highlight output
//! - [`styles`] - token style configuration
//! - [`folding`] - derived element fold spans and collapse state
//! - [`indent`] - scan-driven auto-indentation

pub mod folding;
pub mod indent;
pub mod intervals;
pub mod line_index;
pub mod scanner;
pub mod storage;
pub mod styles;

pub use folding::{FoldSpan, FoldingState, compute_fold_spans};
pub use indent::indent_for_newline;
pub use intervals::{Interval, IntervalTree, StyleId, StyleLayerId};
pub use line_index::LineIndex;
pub use scanner::{ScanError, ScanEvent, TokenKind, XmlScanner, tag_end_before};
pub use storage::{PieceTable, StorageError, TextStorage};
pub use styles::{FontStyle, Rgb, StyleConfiguration, TextStyle};
