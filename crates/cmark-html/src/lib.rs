//! Extensible HTML renderer for CommonMark document trees.
//!
//! The renderer walks a [`cmark_ast::Document`] depth-first and dispatches each
//! node to the [`HtmlNodeRenderer`] registered for its type. Two extension
//! points customize the output without touching the built-in rendering:
//!
//! - **Node renderers** replace or add rendering for node types. Renderers
//!   registered first take precedence; the built-in renderer comes last.
//! - **Attribute providers** adjust the attributes of every emitted tag, in
//!   registration order.
//!
//! Both are registered as factories: every render call creates fresh
//! instances, so an [`HtmlRenderer`] can be shared between threads while
//! renderers and providers keep per-document state.
//!
//! Link and image destinations can be sanitized (dropping unsafe protocols)
//! and percent-encoded, see [`UrlSanitizer`] and [`percent_encode_url`].
//!
//! # Example
//!
//! ```
//! use cmark_ast::{NodeRef, NodeValue, Parser};
//! use cmark_html::{Attributes, HtmlRenderer};
//!
//! let renderer = HtmlRenderer::builder()
//!     .with_attribute_provider(|_| {
//!         |node: NodeRef<'_>, _tag: &str, attributes: &mut Attributes| {
//!             if let NodeValue::Image { .. } = node.value() {
//!                 attributes.insert("class", "border");
//!             }
//!         }
//!     })
//!     .build();
//!
//! let doc = Parser::default().parse("![text](/url.png)");
//! assert_eq!(
//!     renderer.render_document(&doc).unwrap(),
//!     "<p><img src=\"/url.png\" alt=\"text\" class=\"border\" /></p>\n"
//! );
//! ```

mod attributes;
mod builtin;
mod config;
mod context;
mod error;
pub mod ext;
mod registry;
mod renderer;
mod url;
mod writer;

pub use attributes::{AttributeProvider, AttributeProviderFactory, Attributes};
pub use builtin::CoreHtmlNodeRenderer;
pub use config::{MarkdownRenderer, extensions_from_config};
pub use context::{FactoryContext, RenderContext};
pub use error::RenderError;
pub use registry::{HtmlNodeRenderer, HtmlNodeRendererFactory};
pub use renderer::{HtmlOptions, HtmlRenderer, HtmlRendererBuilder, HtmlRendererExtension};
pub use url::{
    DEFAULT_ALLOWED_PROTOCOLS, DefaultUrlSanitizer, UrlKind, UrlProcessor, UrlSanitizer,
    percent_encode_url,
};
pub use writer::{HtmlWriter, escape_html};
