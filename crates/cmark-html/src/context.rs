//! Per-render state shared by node renderers.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use cmark_ast::NodeRef;

use crate::attributes::{AttributePipeline, Attributes};
use crate::builtin::CoreHtmlNodeRenderer;
use crate::error::RenderError;
use crate::registry::NodeRendererMap;
use crate::renderer::{HtmlOptions, HtmlRenderer};
use crate::url::{UrlKind, UrlProcessor, UrlSanitizer};
use crate::writer::HtmlWriter;

/// Read-only view of a render call's configuration, handed to factories.
///
/// Factories run while the [`RenderContext`] is being set up, before any
/// writer or dispatch table exists, so they see only what is fixed for the
/// call: the options and the active URL sanitizer.
#[derive(Clone, Copy)]
pub struct FactoryContext<'a> {
    options: &'a HtmlOptions,
    url_sanitizer: Option<&'a dyn UrlSanitizer>,
}

impl<'a> FactoryContext<'a> {
    #[must_use]
    pub fn options(&self) -> &'a HtmlOptions {
        self.options
    }

    /// The sanitizer applied to link and image URLs, or `None` when URL
    /// sanitizing is disabled.
    #[must_use]
    pub fn url_sanitizer(&self) -> Option<&'a dyn UrlSanitizer> {
        self.url_sanitizer
    }
}

/// Context of a single render call.
///
/// Created by [`HtmlRenderer`] for each call and dropped when the call
/// returns. It owns the writer, a fresh instance of every configured
/// renderer and attribute provider, and the dispatch table.
pub struct RenderContext<'a> {
    options: &'a HtmlOptions,
    urls: UrlProcessor<'a>,
    writer: HtmlWriter<'a>,
    attributes: AttributePipeline,
    renderers: NodeRendererMap,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(renderer: &'a HtmlRenderer, out: &'a mut dyn fmt::Write) -> Self {
        let options = &renderer.options;
        let sanitizer = options
            .sanitize_urls
            .then_some(&*renderer.url_sanitizer);
        let setup = FactoryContext {
            options,
            url_sanitizer: sanitizer,
        };

        let providers = renderer
            .attribute_provider_factories
            .iter()
            .map(|factory| factory.create(&setup))
            .collect();

        let mut renderers = NodeRendererMap::default();
        for factory in &renderer.node_renderer_factories {
            renderers.add(Rc::from(factory.create(&setup)));
        }
        renderers.add(Rc::new(CoreHtmlNodeRenderer));

        Self {
            options,
            urls: UrlProcessor::new(sanitizer, options.percent_encode_urls),
            writer: HtmlWriter::new(out),
            attributes: AttributePipeline::new(providers),
            renderers,
        }
    }

    /// Render `root` with the root lifecycle hooks around it.
    pub(crate) fn render_root(&mut self, root: NodeRef<'_>) -> Result<(), RenderError> {
        tracing::debug!(
            renderers = self.renderers.len(),
            attribute_providers = self.attributes.len(),
            node_type = %root.node_type(),
            "Rendering HTML"
        );

        let renderers = self.renderers.renderers();
        for renderer in &renderers {
            renderer.before_root(root, self)?;
        }
        self.render(root)?;
        for renderer in &renderers {
            renderer.after_root(root, self)?;
        }
        Ok(())
    }

    /// Dispatch `node` to the renderer bound to its type.
    pub fn render(&mut self, node: NodeRef<'_>) -> Result<(), RenderError> {
        let node_type = node.node_type();
        let renderer = self
            .renderers
            .get(node_type)
            .ok_or(RenderError::UnhandledNode { node_type })?;
        renderer.render(node, self)
    }

    /// Render each child of `node` in order.
    pub fn render_children(&mut self, node: NodeRef<'_>) -> Result<(), RenderError> {
        for child in node.children() {
            self.render(child)?;
        }
        Ok(())
    }

    pub fn writer(&mut self) -> &mut HtmlWriter<'a> {
        &mut self.writer
    }

    #[must_use]
    pub fn options(&self) -> &'a HtmlOptions {
        self.options
    }

    /// Text emitted for a soft line break.
    #[must_use]
    pub fn softbreak(&self) -> &'a str {
        let options = self.options;
        &options.softbreak
    }

    #[must_use]
    pub fn escape_html(&self) -> bool {
        self.options.escape_html
    }

    #[must_use]
    pub fn sanitize_urls(&self) -> bool {
        self.urls.sanitizes()
    }

    #[must_use]
    pub fn percent_encode_urls(&self) -> bool {
        self.options.percent_encode_urls
    }

    #[must_use]
    pub fn omit_single_paragraph_p(&self) -> bool {
        self.options.omit_single_paragraph_p
    }

    /// Run the attribute providers for a tag of `node`.
    ///
    /// `base` holds the attributes the renderer itself wants on the tag; the
    /// returned set is what should be written.
    pub fn extend_attributes(
        &mut self,
        node: NodeRef<'_>,
        tag_name: &str,
        base: &Attributes,
    ) -> Attributes {
        self.attributes.extend(node, tag_name, base)
    }

    /// Percent-encode `url` if encoding is enabled.
    #[must_use]
    pub fn encode_url<'u>(&self, url: &'u str) -> Cow<'u, str> {
        self.urls.encode(Cow::Borrowed(url))
    }

    /// Sanitize (if enabled) and encode (if enabled) a link destination.
    #[must_use]
    pub fn link_url<'u>(&self, url: &'u str) -> Cow<'u, str> {
        self.urls.process(UrlKind::Link, url)
    }

    /// Sanitize (if enabled) and encode (if enabled) an image source.
    #[must_use]
    pub fn image_url<'u>(&self, url: &'u str) -> Cow<'u, str> {
        self.urls.process(UrlKind::Image, url)
    }

    /// Write an opening tag for `node` after running the attribute providers.
    pub fn tag(
        &mut self,
        node: NodeRef<'_>,
        tag_name: &str,
        base: &Attributes,
    ) -> Result<(), RenderError> {
        let attributes = self.extend_attributes(node, tag_name, base);
        self.writer.tag(tag_name, &attributes)?;
        Ok(())
    }

    /// Write a void element for `node` after running the attribute providers.
    pub fn void_tag(
        &mut self,
        node: NodeRef<'_>,
        tag_name: &str,
        base: &Attributes,
    ) -> Result<(), RenderError> {
        let attributes = self.extend_attributes(node, tag_name, base);
        self.writer.void_tag(tag_name, &attributes)?;
        Ok(())
    }
}
