//! Renderer façade and its builder.

use std::fmt;
use std::sync::Arc;

use cmark_ast::{Document, NodeRef};

use crate::attributes::{AttributeProvider, AttributeProviderFactory, FnAttributeProviderFactory};
use crate::context::{FactoryContext, RenderContext};
use crate::error::RenderError;
use crate::registry::{FnNodeRendererFactory, HtmlNodeRenderer, HtmlNodeRendererFactory};
use crate::url::{DefaultUrlSanitizer, UrlSanitizer};

/// Rendering flags, fixed when the renderer is built.
///
/// Factories see these through [`FactoryContext::options`] when they create
/// their per-render instances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Text emitted for a soft line break. `"\n"` by default; `"<br />"` makes
    /// soft breaks hard, `" "` joins lines.
    pub softbreak: String,
    /// Escape raw HTML (blocks and inline) instead of passing it through.
    pub escape_html: bool,
    /// Run link and image destinations through the URL sanitizer and add
    /// `rel="nofollow"` to links.
    pub sanitize_urls: bool,
    /// Percent-encode link and image destinations.
    pub percent_encode_urls: bool,
    /// Drop the `<p>` around a document consisting of one paragraph.
    pub omit_single_paragraph_p: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            softbreak: "\n".to_owned(),
            escape_html: false,
            sanitize_urls: false,
            percent_encode_urls: false,
            omit_single_paragraph_p: false,
        }
    }
}

/// Renders document trees to HTML.
///
/// Immutable once built and cheap to clone. Safe to share between threads:
/// each render call creates its own [`RenderContext`] with fresh renderer and
/// provider instances.
///
/// # Example
///
/// ```
/// use cmark_ast::Parser;
/// use cmark_html::HtmlRenderer;
///
/// let doc = Parser::default().parse("This is *Sparta*");
/// let renderer = HtmlRenderer::builder().with_escape_html(true).build();
/// assert_eq!(
///     renderer.render_document(&doc).unwrap(),
///     "<p>This is <em>Sparta</em></p>\n"
/// );
/// ```
#[derive(Clone)]
pub struct HtmlRenderer {
    pub(crate) options: HtmlOptions,
    pub(crate) url_sanitizer: Arc<dyn UrlSanitizer>,
    pub(crate) node_renderer_factories: Vec<Arc<dyn HtmlNodeRendererFactory>>,
    pub(crate) attribute_provider_factories: Vec<Arc<dyn AttributeProviderFactory>>,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for HtmlRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlRenderer")
            .field("options", &self.options)
            .field("node_renderer_factories", &self.node_renderer_factories.len())
            .field(
                "attribute_provider_factories",
                &self.attribute_provider_factories.len(),
            )
            .finish_non_exhaustive()
    }
}

impl HtmlRenderer {
    /// Create a new renderer builder.
    #[must_use]
    pub fn builder() -> HtmlRendererBuilder {
        HtmlRendererBuilder::new()
    }

    /// Rendering flags.
    #[must_use]
    pub fn options(&self) -> &HtmlOptions {
        &self.options
    }

    /// Render `node` and everything below it.
    ///
    /// On error no partial output is returned.
    pub fn render(&self, node: NodeRef<'_>) -> Result<String, RenderError> {
        let mut out = String::new();
        self.render_to(node, &mut out)?;
        Ok(out)
    }

    /// Render `node` into `out`.
    ///
    /// On error `out` may hold partial output.
    pub fn render_to(&self, node: NodeRef<'_>, out: &mut dyn fmt::Write) -> Result<(), RenderError> {
        RenderContext::new(self, out).render_root(node)
    }

    /// Render a whole document.
    pub fn render_document(&self, document: &Document) -> Result<String, RenderError> {
        self.render(document.root())
    }
}

/// Extension hook for the rendering side of an extension.
///
/// An extension registers its renderer and attribute provider factories on
/// the builder.
pub trait HtmlRendererExtension {
    fn extend(&self, builder: &mut HtmlRendererBuilder);
}

/// Builder for [`HtmlRenderer`].
///
/// Renderer and attribute provider factories are kept in registration order.
/// For node renderers, earlier registrations take precedence over later ones
/// and over the built-in renderers. Attribute providers all run, in
/// registration order.
pub struct HtmlRendererBuilder {
    options: HtmlOptions,
    url_sanitizer: Arc<dyn UrlSanitizer>,
    node_renderer_factories: Vec<Arc<dyn HtmlNodeRendererFactory>>,
    attribute_provider_factories: Vec<Arc<dyn AttributeProviderFactory>>,
}

impl Default for HtmlRendererBuilder {
    fn default() -> Self {
        Self {
            options: HtmlOptions::default(),
            url_sanitizer: Arc::new(DefaultUrlSanitizer::new()),
            node_renderer_factories: Vec::new(),
            attribute_provider_factories: Vec::new(),
        }
    }
}

impl HtmlRendererBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all flags at once.
    #[must_use]
    pub fn with_options(mut self, options: HtmlOptions) -> Self {
        self.options = options;
        self
    }

    /// Text emitted for soft line breaks.
    #[must_use]
    pub fn with_softbreak(mut self, softbreak: impl Into<String>) -> Self {
        self.options.softbreak = softbreak.into();
        self
    }

    /// Escape raw HTML instead of passing it through.
    #[must_use]
    pub fn with_escape_html(mut self, escape_html: bool) -> Self {
        self.options.escape_html = escape_html;
        self
    }

    /// Sanitize link and image destinations.
    #[must_use]
    pub fn with_sanitize_urls(mut self, sanitize_urls: bool) -> Self {
        self.options.sanitize_urls = sanitize_urls;
        self
    }

    /// Replace the sanitizer used when URL sanitization is enabled.
    #[must_use]
    pub fn with_url_sanitizer(mut self, sanitizer: impl UrlSanitizer + 'static) -> Self {
        self.url_sanitizer = Arc::new(sanitizer);
        self
    }

    /// Percent-encode link and image destinations.
    #[must_use]
    pub fn with_percent_encode_urls(mut self, percent_encode_urls: bool) -> Self {
        self.options.percent_encode_urls = percent_encode_urls;
        self
    }

    /// Drop the `<p>` around a document consisting of one paragraph.
    #[must_use]
    pub fn with_omit_single_paragraph_p(mut self, omit: bool) -> Self {
        self.options.omit_single_paragraph_p = omit;
        self
    }

    /// Register a node renderer created by `create` for each render call.
    #[must_use]
    pub fn with_node_renderer<F, R>(mut self, create: F) -> Self
    where
        F: Fn(&FactoryContext<'_>) -> R + Send + Sync + 'static,
        R: HtmlNodeRenderer + 'static,
    {
        self.add_node_renderer(create);
        self
    }

    #[must_use]
    pub fn with_node_renderer_factory(
        mut self,
        factory: impl HtmlNodeRendererFactory + 'static,
    ) -> Self {
        self.add_node_renderer_factory(factory);
        self
    }

    /// Register an attribute provider created by `create` for each render call.
    #[must_use]
    pub fn with_attribute_provider<F, P>(mut self, create: F) -> Self
    where
        F: Fn(&FactoryContext<'_>) -> P + Send + Sync + 'static,
        P: AttributeProvider + 'static,
    {
        self.add_attribute_provider(create);
        self
    }

    #[must_use]
    pub fn with_attribute_provider_factory(
        mut self,
        factory: impl AttributeProviderFactory + 'static,
    ) -> Self {
        self.add_attribute_provider_factory(factory);
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: &dyn HtmlRendererExtension) -> Self {
        extension.extend(&mut self);
        self
    }

    /// Apply several extensions in order.
    #[must_use]
    pub fn with_extensions<'e, I>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = &'e dyn HtmlRendererExtension>,
    {
        for extension in extensions {
            extension.extend(&mut self);
        }
        self
    }

    pub fn add_node_renderer<F, R>(&mut self, create: F) -> &mut Self
    where
        F: Fn(&FactoryContext<'_>) -> R + Send + Sync + 'static,
        R: HtmlNodeRenderer + 'static,
    {
        self.add_node_renderer_factory(FnNodeRendererFactory(create))
    }

    pub fn add_node_renderer_factory(
        &mut self,
        factory: impl HtmlNodeRendererFactory + 'static,
    ) -> &mut Self {
        self.node_renderer_factories.push(Arc::new(factory));
        self
    }

    pub fn add_attribute_provider<F, P>(&mut self, create: F) -> &mut Self
    where
        F: Fn(&FactoryContext<'_>) -> P + Send + Sync + 'static,
        P: AttributeProvider + 'static,
    {
        self.add_attribute_provider_factory(FnAttributeProviderFactory(create))
    }

    pub fn add_attribute_provider_factory(
        &mut self,
        factory: impl AttributeProviderFactory + 'static,
    ) -> &mut Self {
        self.attribute_provider_factories.push(Arc::new(factory));
        self
    }

    /// Build the renderer.
    #[must_use]
    pub fn build(self) -> HtmlRenderer {
        HtmlRenderer {
            options: self.options,
            url_sanitizer: self.url_sanitizer,
            node_renderer_factories: self.node_renderer_factories,
            attribute_provider_factories: self.attribute_provider_factories,
        }
    }
}
