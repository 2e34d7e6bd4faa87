//! `xml-editor-highlight` - Scanner-driven highlighting for `xml-editor-core`.
//!
//! Turns scan tokens into style intervals: one [`StyleLayerId::SYNTAX`]
//! interval per token and one [`StyleLayerId::ERRORS`] interval per flagged
//! token. The error layer sits on top of the syntax layer, so a view can
//! draw squiggles without losing token colors underneath.

use xml_editor_core::intervals::{Interval, StyleId, StyleLayerId};
use xml_editor_core::scanner::tag_end_before;
use xml_editor_core::{TextStorage, TokenKind, XmlScanner};

/// Style id for tag punctuation.
pub const XML_STYLE_SPECIAL: StyleId = 0x0100_0001;
/// Style id for whitespace inside tags.
pub const XML_STYLE_WHITESPACE: StyleId = 0x0100_0002;
/// Style id for element name prefixes.
pub const XML_STYLE_ELEMENT_PREFIX: StyleId = 0x0100_0003;
/// Style id for element names.
pub const XML_STYLE_ELEMENT_NAME: StyleId = 0x0100_0004;
/// Style id for attribute name prefixes.
pub const XML_STYLE_ATTRIBUTE_PREFIX: StyleId = 0x0100_0005;
/// Style id for attribute names.
pub const XML_STYLE_ATTRIBUTE_NAME: StyleId = 0x0100_0006;
/// Style id for attribute values.
pub const XML_STYLE_ATTRIBUTE_VALUE: StyleId = 0x0100_0007;
/// Style id for the `xmlns` keyword.
pub const XML_STYLE_NAMESPACE_NAME: StyleId = 0x0100_0008;
/// Style id for namespace prefixes being declared.
pub const XML_STYLE_NAMESPACE_PREFIX: StyleId = 0x0100_0009;
/// Style id for namespace URIs.
pub const XML_STYLE_NAMESPACE_VALUE: StyleId = 0x0100_000A;
/// Style id for element content.
pub const XML_STYLE_ELEMENT_VALUE: StyleId = 0x0100_000B;
/// Style id for entity and character references.
pub const XML_STYLE_ENTITY_REFERENCE: StyleId = 0x0100_000C;
/// Style id for comments.
pub const XML_STYLE_COMMENT: StyleId = 0x0100_000D;
/// Style id for processing instructions.
pub const XML_STYLE_INSTRUCTION: StyleId = 0x0100_000E;
/// Style id for tokens flagged as lexical errors, in the error layer.
pub const XML_STYLE_ERROR: StyleId = 0x0100_00FF;

/// The syntax style id for a token kind.
pub fn style_id_for(kind: TokenKind) -> StyleId {
    match kind {
        TokenKind::Special => XML_STYLE_SPECIAL,
        TokenKind::Whitespace => XML_STYLE_WHITESPACE,
        TokenKind::ElementPrefix => XML_STYLE_ELEMENT_PREFIX,
        TokenKind::ElementName => XML_STYLE_ELEMENT_NAME,
        TokenKind::AttributePrefix => XML_STYLE_ATTRIBUTE_PREFIX,
        TokenKind::AttributeName => XML_STYLE_ATTRIBUTE_NAME,
        TokenKind::AttributeValue => XML_STYLE_ATTRIBUTE_VALUE,
        TokenKind::NamespaceName => XML_STYLE_NAMESPACE_NAME,
        TokenKind::NamespacePrefix => XML_STYLE_NAMESPACE_PREFIX,
        TokenKind::NamespaceValue => XML_STYLE_NAMESPACE_VALUE,
        TokenKind::ElementValue => XML_STYLE_ELEMENT_VALUE,
        TokenKind::EntityReference => XML_STYLE_ENTITY_REFERENCE,
        TokenKind::Comment => XML_STYLE_COMMENT,
        TokenKind::ProcessingInstruction => XML_STYLE_INSTRUCTION,
    }
}

/// Intervals produced by one highlight pass, already split by layer.
#[derive(Debug, Default)]
pub struct HighlightOutput {
    /// One interval per token, for [`StyleLayerId::SYNTAX`].
    pub syntax: Vec<Interval>,
    /// One interval per flagged token, for [`StyleLayerId::ERRORS`].
    pub errors: Vec<Interval>,
}

impl HighlightOutput {
    /// The layer each field belongs to, for callers wiring intervals into
    /// layered storage.
    pub const LAYERS: (StyleLayerId, StyleLayerId) = (StyleLayerId::SYNTAX, StyleLayerId::ERRORS);
}

/// Lexical highlighter for XML documents.
#[derive(Debug, Clone, Default)]
pub struct XmlHighlighter {
    /// Skip whitespace tokens; most views give whitespace no style of its
    /// own and the intervals are pure overhead.
    skip_whitespace: bool,
}

impl XmlHighlighter {
    /// Highlighter that emits an interval for every token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop whitespace tokens from the syntax layer.
    pub fn without_whitespace(mut self) -> Self {
        self.skip_whitespace = true;
        self
    }

    /// Highlight the whole document.
    pub fn highlight(&self, storage: &(impl TextStorage + ?Sized)) -> HighlightOutput {
        self.highlight_range(storage, 0, storage.len())
    }

    /// Highlight the part of the document overlapping `[start, end)`.
    ///
    /// The scan starts at the last tag end before `start`, so tokens
    /// spanning the range border come out whole; intervals ending at or
    /// before `start` are discarded.
    pub fn highlight_range(
        &self,
        storage: &(impl TextStorage + ?Sized),
        start: usize,
        end: usize,
    ) -> HighlightOutput {
        let mut out = HighlightOutput::default();
        let end = end.min(storage.len());
        if start >= end {
            return out;
        }
        let restart = tag_end_before(storage, start);

        let mut scanner = XmlScanner::new();
        if scanner.set_range(storage, restart, end).is_err() {
            return out;
        }
        while let Some(kind) = scanner.scan(storage) {
            let (token_start, token_end) = (scanner.start_offset(), scanner.end_offset());
            if token_end <= start {
                continue;
            }
            if scanner.is_error() {
                out.errors
                    .push(Interval::new(token_start, token_end, XML_STYLE_ERROR));
            }
            if self.skip_whitespace && kind == TokenKind::Whitespace {
                continue;
            }
            out.syntax
                .push(Interval::new(token_start, token_end, style_id_for(kind)));
        }
        out
    }
}
