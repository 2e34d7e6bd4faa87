#![warn(missing_docs)]
//! XML Editor Viewer - Tag-Level Document Views
//!
//! # Overview
//!
//! `xml-editor-viewer` sits on top of `xml-editor-core` and turns token
//! streams into whole-tag render nodes: a start tag with its attributes
//! assembled, a comment with its body, an end tag. Condensed views that
//! draw one box per tag (tree outlines, breadcrumbs, fold placeholders)
//! consume nodes instead of raw tokens.
//!
//! # Quick Start
//!
//! ```rust
//! use xml_editor_core::XmlScanner;
//! use xml_editor_viewer::{NodeRenderer, TextRenderer, read_node};
//!
//! let doc = "<book title='Il pendolo di Foucault'/>";
//! let mut scanner = XmlScanner::new();
//! let node = read_node(&mut scanner, doc).unwrap().unwrap();
//!
//! let renderer = TextRenderer::new();
//! let mut spans = Vec::new();
//! renderer.paint(&node, &mut spans);
//! assert_eq!(renderer.measure(&node), doc.len());
//! ```
//!
//! # Module Description
//!
//! - [`node`] - token stream to [`RenderNode`] assembly
//! - [`renderer`] - the [`NodeRenderer`] trait and a plain text renderer

pub mod node;
pub mod renderer;

pub use node::{Attribute, RenderNode, read_node};
pub use renderer::{NodeRenderer, StyledSpan, TextRenderer, spans_to_string};
