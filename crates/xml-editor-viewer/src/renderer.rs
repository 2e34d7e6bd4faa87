//! Node rendering.
//!
//! Rendering is split per node kind behind [`NodeRenderer`]: `measure`
//! reports the display width a node will take, `paint` emits styled spans.
//! Views lay tags out with `measure` (folding placeholders, wrap decisions)
//! and only `paint` the nodes that end up visible.

use unicode_width::UnicodeWidthStr;
use xml_editor_core::TokenKind;
use xml_editor_core::styles::{StyleConfiguration, TextStyle};

use crate::node::{Attribute, RenderNode};

/// A run of text drawn in one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    /// The text to draw.
    pub text: String,
    /// Token class the run belongs to, for style lookup.
    pub kind: TokenKind,
}

impl StyledSpan {
    fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// Resolve this span's style against a configuration.
    pub fn style(&self, config: &StyleConfiguration) -> TextStyle {
        config.style_for(self.kind)
    }
}

/// Per-node-kind rendering.
pub trait NodeRenderer {
    /// Display width of the node in terminal columns.
    fn measure(&self, node: &RenderNode) -> usize;

    /// Append the node's styled spans to `out`.
    fn paint(&self, node: &RenderNode, out: &mut Vec<StyledSpan>);
}

/// Renders nodes back to canonical XML text spans.
///
/// Attribute values are emitted double quoted regardless of the quotes used
/// in the source, matching how the tags are shown in condensed tag views.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    /// Create a text renderer.
    pub fn new() -> Self {
        Self
    }

    fn paint_attribute(attr: &Attribute, out: &mut Vec<StyledSpan>) {
        let (prefix_kind, name_kind, value_kind) = if attr.namespace {
            (
                TokenKind::NamespaceName,
                TokenKind::NamespacePrefix,
                TokenKind::NamespaceValue,
            )
        } else {
            (
                TokenKind::AttributePrefix,
                TokenKind::AttributeName,
                TokenKind::AttributeValue,
            )
        };
        out.push(StyledSpan::new(" ", TokenKind::Whitespace));
        match &attr.prefix {
            Some(prefix) => {
                out.push(StyledSpan::new(prefix.clone(), prefix_kind));
                out.push(StyledSpan::new(":", TokenKind::Special));
                out.push(StyledSpan::new(attr.name.clone(), name_kind));
            }
            // An unprefixed namespace declaration is the bare `xmlns`
            // keyword.
            None if attr.namespace => {
                out.push(StyledSpan::new(attr.name.clone(), prefix_kind));
            }
            None => {
                out.push(StyledSpan::new(attr.name.clone(), name_kind));
            }
        }
        out.push(StyledSpan::new("=", TokenKind::Special));
        out.push(StyledSpan::new(format!("\"{}\"", attr.value), value_kind));
    }

    fn paint_name(
        prefix: &Option<String>,
        name: &str,
        out: &mut Vec<StyledSpan>,
    ) {
        if let Some(prefix) = prefix {
            out.push(StyledSpan::new(prefix.clone(), TokenKind::ElementPrefix));
            out.push(StyledSpan::new(":", TokenKind::Special));
        }
        out.push(StyledSpan::new(name.to_string(), TokenKind::ElementName));
    }
}

impl NodeRenderer for TextRenderer {
    fn measure(&self, node: &RenderNode) -> usize {
        let mut spans = Vec::new();
        self.paint(node, &mut spans);
        spans.iter().map(|s| s.text.width()).sum()
    }

    fn paint(&self, node: &RenderNode, out: &mut Vec<StyledSpan>) {
        match node {
            RenderNode::Element {
                prefix,
                name,
                attributes,
                self_closing,
            } => {
                out.push(StyledSpan::new("<", TokenKind::Special));
                Self::paint_name(prefix, name, out);
                for attr in attributes {
                    Self::paint_attribute(attr, out);
                }
                let close = if *self_closing { "/>" } else { ">" };
                out.push(StyledSpan::new(close, TokenKind::Special));
            }
            RenderNode::Comment(body) => {
                out.push(StyledSpan::new("<!--", TokenKind::Comment));
                if !body.is_empty() {
                    out.push(StyledSpan::new(body.clone(), TokenKind::Comment));
                }
                out.push(StyledSpan::new("-->", TokenKind::Comment));
            }
            RenderNode::EndTag { prefix, name } => {
                out.push(StyledSpan::new("</", TokenKind::Special));
                Self::paint_name(prefix, name, out);
                out.push(StyledSpan::new(">", TokenKind::Special));
            }
        }
    }
}

/// Concatenate painted spans into plain text, mostly for tests and string
/// sinks.
pub fn spans_to_string(spans: &[StyledSpan]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}
