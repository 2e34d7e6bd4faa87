//! Tag-level render nodes.
//!
//! [`read_node`] drives the scanner and assembles its tokens into the next
//! [`RenderNode`]: a start tag with its attributes, a comment, or an end
//! tag. Content between tags is not a node; views draw it straight from the
//! document text. Malformed markup still produces nodes, carrying whatever
//! the scanner could make of it.

use xml_editor_core::storage::StorageError;
use xml_editor_core::{TextStorage, TokenKind, XmlScanner};

/// One attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Namespace prefix, `xmlns` for prefixed namespace declarations.
    pub prefix: Option<String>,
    /// Local name.
    pub name: String,
    /// Value with the quotes stripped; entity references stay unexpanded.
    pub value: String,
    /// Whether this is a namespace declaration.
    pub namespace: bool,
}

/// A renderable piece of markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode {
    /// A start tag, possibly self-closing.
    Element {
        /// Namespace prefix of the element name.
        prefix: Option<String>,
        /// Local element name.
        name: String,
        /// Attributes in document order.
        attributes: Vec<Attribute>,
        /// Whether the tag ended with `/>`.
        self_closing: bool,
    },
    /// A comment with its body text.
    Comment(String),
    /// An end tag.
    EndTag {
        /// Namespace prefix of the element name.
        prefix: Option<String>,
        /// Local element name.
        name: String,
    },
}

#[derive(Default)]
struct AttrBuilder {
    prefix: Option<String>,
    name: String,
    value: String,
    namespace: bool,
}

impl AttrBuilder {
    fn finish(self) -> Attribute {
        Attribute {
            prefix: self.prefix,
            name: self.name,
            value: strip_quotes(&self.value),
            namespace: self.namespace,
        }
    }
}

fn strip_quotes(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(q @ ('"' | '\'')) => {
            let rest: String = chars.collect();
            rest.strip_suffix(q).map(str::to_string).unwrap_or(rest)
        }
        _ => raw.to_string(),
    }
}

struct TagBuilder {
    closing: bool,
    prefix: Option<String>,
    name: String,
    attributes: Vec<Attribute>,
    current: Option<AttrBuilder>,
}

impl TagBuilder {
    fn new(closing: bool) -> Self {
        Self {
            closing,
            prefix: None,
            name: String::new(),
            attributes: Vec::new(),
            current: None,
        }
    }

    fn take_attr(&mut self) {
        if let Some(attr) = self.current.take() {
            self.attributes.push(attr.finish());
        }
    }

    fn finish(mut self, self_closing: bool) -> RenderNode {
        self.take_attr();
        if self.closing {
            RenderNode::EndTag {
                prefix: self.prefix,
                name: self.name,
            }
        } else {
            RenderNode::Element {
                prefix: self.prefix,
                name: self.name,
                attributes: self.attributes,
                self_closing,
            }
        }
    }
}

/// Read the next tag or comment node. Content tokens before it are skipped.
/// Returns `None` once the scan range is exhausted.
pub fn read_node(
    scanner: &mut XmlScanner,
    storage: &(impl TextStorage + ?Sized),
) -> Result<Option<RenderNode>, StorageError> {
    let mut tag: Option<TagBuilder> = None;
    let mut comment: Option<String> = None;

    loop {
        let Some(kind) = scanner.scan(storage) else {
            return Ok(match (tag, comment) {
                // The range ended mid-node; return what was collected.
                (Some(tag), _) => Some(tag.finish(false)),
                (None, Some(body)) => Some(RenderNode::Comment(body)),
                (None, None) => None,
            });
        };
        let text = storage.get_text(
            scanner.start_offset(),
            scanner.end_offset() - scanner.start_offset(),
        )?;

        if let Some(body) = comment.as_mut() {
            if kind == TokenKind::Comment && text != "-->" {
                body.push_str(&text);
                continue;
            }
            return Ok(Some(RenderNode::Comment(comment.unwrap_or_default())));
        }

        match kind {
            TokenKind::Comment => {
                // `<!--`; body and close marker follow as separate tokens.
                comment = Some(String::new());
            }
            TokenKind::Special => match text.as_str() {
                "<" | "</" => {
                    if let Some(tag) = tag {
                        // Resync opener ends the malformed tag we were in.
                        return Ok(Some(tag.finish(false)));
                    }
                    tag = Some(TagBuilder::new(text == "</"));
                }
                ">" => {
                    if let Some(tag) = tag {
                        return Ok(Some(tag.finish(false)));
                    }
                }
                "/>" => {
                    if let Some(tag) = tag {
                        return Ok(Some(tag.finish(true)));
                    }
                }
                _ => {}
            },
            TokenKind::ElementPrefix => {
                if let Some(tag) = tag.as_mut() {
                    tag.prefix = Some(text);
                }
            }
            TokenKind::ElementName => {
                if let Some(tag) = tag.as_mut() {
                    tag.name = text;
                }
            }
            TokenKind::AttributePrefix => {
                if let Some(tag) = tag.as_mut() {
                    tag.take_attr();
                    tag.current = Some(AttrBuilder {
                        prefix: Some(text),
                        ..AttrBuilder::default()
                    });
                }
            }
            TokenKind::AttributeName => {
                if let Some(tag) = tag.as_mut() {
                    match tag.current.as_mut() {
                        // Local name after a prefix.
                        Some(attr) if attr.name.is_empty() => attr.name = text,
                        _ => {
                            tag.take_attr();
                            tag.current = Some(AttrBuilder {
                                name: text,
                                ..AttrBuilder::default()
                            });
                        }
                    }
                }
            }
            TokenKind::NamespaceName => {
                if let Some(tag) = tag.as_mut() {
                    tag.take_attr();
                    tag.current = Some(AttrBuilder {
                        name: text,
                        namespace: true,
                        ..AttrBuilder::default()
                    });
                }
            }
            TokenKind::NamespacePrefix => {
                if let Some(tag) = tag.as_mut() {
                    if let Some(attr) = tag.current.as_mut() {
                        // `xmlns:pre`: the keyword becomes the prefix and
                        // the declared prefix is the local name.
                        attr.prefix = Some(std::mem::take(&mut attr.name));
                        attr.name = text;
                    }
                }
            }
            TokenKind::AttributeValue
            | TokenKind::NamespaceValue
            | TokenKind::EntityReference => {
                if let Some(tag) = tag.as_mut() {
                    if let Some(attr) = tag.current.as_mut() {
                        attr.value.push_str(&text);
                    }
                }
            }
            TokenKind::Whitespace
            | TokenKind::ElementValue
            | TokenKind::ProcessingInstruction => {}
        }
    }
}
