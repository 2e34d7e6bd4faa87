//! Token styling.
//!
//! [`StyleConfiguration`] maps each [`TokenKind`] to a concrete text style.
//! It is a plain value owned by whoever renders the document; two views of
//! the same document can use different configurations, and nothing here is
//! global or shared.

use std::collections::HashMap;

use crate::scanner::TokenKind;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Black.
    pub const BLACK: Rgb = Rgb(0, 0, 0);
}

/// Font rendering style for a token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    /// Regular weight, upright.
    #[default]
    Plain,
    /// Bold weight.
    Bold,
    /// Italic slant.
    Italic,
}

/// How one token class is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    /// Foreground color.
    pub color: Rgb,
    /// Font style.
    pub font: FontStyle,
}

impl TextStyle {
    /// A plain style in the given color.
    pub const fn plain(color: Rgb) -> Self {
        Self {
            color,
            font: FontStyle::Plain,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::plain(Rgb::BLACK)
    }
}

/// Per-view style table for XML tokens.
#[derive(Clone)]
pub struct StyleConfiguration {
    styles: HashMap<TokenKind, TextStyle>,
    error: TextStyle,
}

impl StyleConfiguration {
    /// Style table with every token class drawn plain black and errors red.
    pub fn plain() -> Self {
        Self {
            styles: HashMap::new(),
            error: TextStyle::plain(Rgb(255, 0, 0)),
        }
    }

    /// Style for a token class. Unconfigured classes fall back to plain
    /// black.
    pub fn style_for(&self, kind: TokenKind) -> TextStyle {
        self.styles.get(&kind).copied().unwrap_or_default()
    }

    /// Style used for tokens flagged as lexical errors.
    pub fn error_style(&self) -> TextStyle {
        self.error
    }

    /// Set the style for a token class.
    pub fn set_style(&mut self, kind: TokenKind, style: TextStyle) {
        self.styles.insert(kind, style);
    }

    /// Set the style used for error tokens.
    pub fn set_error_style(&mut self, style: TextStyle) {
        self.error = style;
    }
}

impl Default for StyleConfiguration {
    /// The stock palette: muted punctuation and comments, dark blue element
    /// names, brown attributes, black content.
    fn default() -> Self {
        let mut config = Self::plain();
        let entries = [
            (TokenKind::Special, TextStyle::plain(Rgb(102, 102, 102))),
            (TokenKind::Comment, TextStyle::plain(Rgb(153, 153, 153))),
            (TokenKind::ElementPrefix, TextStyle::plain(Rgb(0, 102, 102))),
            (TokenKind::ElementName, TextStyle::plain(Rgb(0, 51, 102))),
            (
                TokenKind::AttributePrefix,
                TextStyle::plain(Rgb(153, 51, 51)),
            ),
            (TokenKind::AttributeName, TextStyle::plain(Rgb(153, 51, 51))),
            (TokenKind::AttributeValue, TextStyle::plain(Rgb(102, 0, 0))),
            (
                TokenKind::NamespaceName,
                TextStyle::plain(Rgb(102, 102, 102)),
            ),
            (
                TokenKind::NamespacePrefix,
                TextStyle::plain(Rgb(102, 102, 102)),
            ),
            (TokenKind::NamespaceValue, TextStyle::plain(Rgb(0, 51, 51))),
            (TokenKind::ElementValue, TextStyle::plain(Rgb::BLACK)),
            (TokenKind::EntityReference, TextStyle::plain(Rgb(102, 0, 0))),
            (
                TokenKind::ProcessingInstruction,
                TextStyle::plain(Rgb(153, 153, 153)),
            ),
        ];
        for (kind, style) in entries {
            config.set_style(kind, style);
        }
        config
    }
}
