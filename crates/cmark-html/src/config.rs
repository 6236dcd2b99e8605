//! Building renderers from a `cmark.toml` configuration.

use cmark_ast::{Document, Parser, ParserBuilder};
use cmark_config::{Config, ConfigError};

use crate::error::RenderError;
use crate::ext::{self, EXTENSION_NAMES, Extension, HeadingAnchorExtension};
use crate::renderer::{HtmlOptions, HtmlRenderer, HtmlRendererBuilder};
use crate::url::DefaultUrlSanitizer;

/// Resolve the extensions enabled in `config`, in configured order.
///
/// # Errors
///
/// Returns `ConfigError::Validation` for unknown extension names.
pub fn extensions_from_config(config: &Config) -> Result<Vec<Box<dyn Extension>>, ConfigError> {
    config
        .extensions
        .enabled
        .iter()
        .map(|name| {
            if name == HeadingAnchorExtension::NAME {
                let anchors = &config.heading_anchor;
                return Ok(Box::new(
                    HeadingAnchorExtension::new()
                        .with_id_prefix(anchors.id_prefix.as_str())
                        .with_id_suffix(anchors.id_suffix.as_str())
                        .with_default_id(anchors.default_id.as_str()),
                ) as Box<dyn Extension>);
            }
            ext::by_name(name).ok_or_else(|| {
                ConfigError::Validation(format!(
                    "Unknown extension `{name}` in extensions.enabled (expected one of: {})",
                    EXTENSION_NAMES.join(", ")
                ))
            })
        })
        .collect()
}

fn builder_from_config(
    config: &Config,
    extensions: &[Box<dyn Extension>],
) -> HtmlRendererBuilder {
    let html = &config.html;
    let mut builder = HtmlRenderer::builder()
        .with_options(HtmlOptions {
            softbreak: html.softbreak.clone(),
            escape_html: html.escape_html,
            sanitize_urls: html.sanitize_urls,
            percent_encode_urls: html.percent_encode_urls,
            omit_single_paragraph_p: html.omit_single_paragraph_p,
        })
        .with_url_sanitizer(DefaultUrlSanitizer::with_protocols(&html.allowed_protocols));
    for extension in extensions {
        extension.extend(&mut builder);
    }
    builder
}

impl HtmlRenderer {
    /// Build a renderer from configuration.
    ///
    /// Only the rendering side of enabled extensions is applied; use
    /// [`MarkdownRenderer::from_config`] to configure the parser as well.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for invalid values or unknown
    /// extension names.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let extensions = extensions_from_config(config)?;
        Ok(builder_from_config(config, &extensions).build())
    }
}

/// Parser and renderer configured together.
///
/// # Example
///
/// ```
/// use cmark_config::Config;
/// use cmark_html::MarkdownRenderer;
///
/// let config: Config = toml::from_str("[extensions]\nenabled = [\"strikethrough\"]").unwrap();
/// let renderer = MarkdownRenderer::from_config(&config).unwrap();
/// assert_eq!(renderer.render_markdown("~~old~~").unwrap(), "<p><del>old</del></p>\n");
/// ```
#[derive(Clone, Debug)]
pub struct MarkdownRenderer {
    parser: Parser,
    renderer: HtmlRenderer,
}

impl MarkdownRenderer {
    #[must_use]
    pub fn new(parser: Parser, renderer: HtmlRenderer) -> Self {
        Self { parser, renderer }
    }

    /// Build both halves from configuration, applying every enabled extension
    /// to the parser and the renderer.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for invalid values or unknown
    /// extension names.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let extensions = extensions_from_config(config)?;

        let mut parser = ParserBuilder::new();
        for extension in &extensions {
            extension.extend_parser(&mut parser);
        }
        let renderer = builder_from_config(config, &extensions).build();

        tracing::debug!(
            extensions = extensions.len(),
            config_path = ?config.config_path,
            "Configured markdown renderer"
        );
        Ok(Self::new(parser.build(), renderer))
    }

    #[must_use]
    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    #[must_use]
    pub fn renderer(&self) -> &HtmlRenderer {
        &self.renderer
    }

    /// Parse `markdown` into a document tree.
    #[must_use]
    pub fn parse(&self, markdown: &str) -> Document {
        self.parser.parse(markdown)
    }

    /// Parse and render `markdown`.
    pub fn render_markdown(&self, markdown: &str) -> Result<String, RenderError> {
        self.renderer.render_document(&self.parse(markdown))
    }
}
