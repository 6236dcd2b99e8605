//! Read-only CommonMark document tree.
//!
//! This crate provides the tree consumed by `cmark-html`:
//!
//! - [`Document`]: arena holding every node of a parsed document
//! - [`NodeRef`]: copyable view used to walk the tree (parent, siblings, children)
//! - [`NodeValue`] / [`NodeType`]: the closed set of node variants and their dispatch tags
//! - [`Parser`]: builds a [`Document`] from markdown via `pulldown-cmark`
//!
//! Trees can also be assembled by hand with [`Document::append`], which is how
//! producers other than `pulldown-cmark` plug in.
//!
//! # Example
//!
//! ```
//! use cmark_ast::{Document, NodeType, NodeValue};
//!
//! let mut doc = Document::new();
//! let heading = doc.append(Document::ROOT, NodeValue::Heading { level: 2 });
//! doc.append(heading, NodeValue::Text("My title".to_owned()));
//!
//! let first = doc.root().first_child().unwrap();
//! assert_eq!(first.node_type(), NodeType::Heading);
//! assert_eq!(first.children().count(), 1);
//! ```

mod document;
mod node;
mod parser;

pub use document::{Children, Descendants, Document, NodeId, NodeRef};
pub use node::{Alignment, NodeType, NodeValue};
pub use parser::{Parser, ParserBuilder, ParserExtension, build_document};
pub use pulldown_cmark::Options;
