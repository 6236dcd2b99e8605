use std::collections::HashMap;

use cmark_ast::{NodeRef, NodeValue, ParserBuilder, ParserExtension};

use crate::attributes::{AttributeProvider, Attributes};
use crate::ext::Extension;
use crate::renderer::{HtmlRendererBuilder, HtmlRendererExtension};

/// Adds an `id` derived from the heading text to every heading.
///
/// Ids are lower-cased, spaces become `-`, and everything except letters,
/// digits, `-` and `_` is dropped. Repeated ids within a document get a
/// `-1`, `-2`, ... suffix. Headings without usable text use the default id.
#[derive(Clone, Debug)]
pub struct HeadingAnchorExtension {
    id_prefix: String,
    id_suffix: String,
    default_id: String,
}

impl Default for HeadingAnchorExtension {
    fn default() -> Self {
        Self {
            id_prefix: String::new(),
            id_suffix: String::new(),
            default_id: "id".to_owned(),
        }
    }
}

impl HeadingAnchorExtension {
    pub const NAME: &'static str = "heading_anchor";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text prepended to every generated id.
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Text appended to every generated id.
    #[must_use]
    pub fn with_id_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.id_suffix = suffix.into();
        self
    }

    /// Id used for headings whose text yields an empty slug.
    #[must_use]
    pub fn with_default_id(mut self, default_id: impl Into<String>) -> Self {
        self.default_id = default_id.into();
        self
    }
}

impl ParserExtension for HeadingAnchorExtension {
    fn extend_parser(&self, _builder: &mut ParserBuilder) {}
}

impl HtmlRendererExtension for HeadingAnchorExtension {
    fn extend(&self, builder: &mut HtmlRendererBuilder) {
        let settings = self.clone();
        builder.add_attribute_provider(move |_| HeadingAnchorProvider {
            settings: settings.clone(),
            counts: HashMap::new(),
        });
    }
}

impl Extension for HeadingAnchorExtension {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

struct HeadingAnchorProvider {
    settings: HeadingAnchorExtension,
    /// Occurrences of each slug so far in this render.
    counts: HashMap<String, usize>,
}

impl HeadingAnchorProvider {
    fn unique_id(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base.clone_from(&self.settings.default_id);
        }
        let count = self.counts.entry(base.clone()).or_default();
        let id = match *count {
            0 => base,
            n => format!("{base}-{n}"),
        };
        *count += 1;
        format!("{}{id}{}", self.settings.id_prefix, self.settings.id_suffix)
    }
}

impl AttributeProvider for HeadingAnchorProvider {
    fn set_attributes(&mut self, node: NodeRef<'_>, tag_name: &str, attributes: &mut Attributes) {
        if !matches!(node.value(), NodeValue::Heading { .. }) || !is_heading_tag(tag_name) {
            return;
        }
        let id = self.unique_id(&heading_text(node));
        attributes.insert("id", id);
    }
}

fn is_heading_tag(tag_name: &str) -> bool {
    matches!(tag_name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Text and inline code of the heading, concatenated.
fn heading_text(heading: NodeRef<'_>) -> String {
    let mut text = String::new();
    for node in heading.descendants() {
        match node.value() {
            NodeValue::Text(literal) | NodeValue::Code(literal) => text.push_str(literal),
            _ => {}
        }
    }
    text
}

/// Convert heading text to an id.
///
/// Lower-cases, turns spaces into dashes and removes every character that is
/// not alphanumeric, `-` or `_`.
fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmark_ast::Parser;
    use pretty_assertions::assert_eq;

    use crate::HtmlRenderer;

    fn render(markdown: &str, extension: &HeadingAnchorExtension) -> String {
        let doc = Parser::default().parse(markdown);
        HtmlRenderer::builder()
            .with_extension(extension)
            .build()
            .render_document(&doc)
            .unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("snake_case and-kebab"), "snake_case-and-kebab");
        assert_eq!(slugify("\u{c4}rger \u{fc}ber"), "\u{e4}rger-\u{fc}ber");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_heading_gets_id() {
        assert_eq!(
            render("# Hello *World*", &HeadingAnchorExtension::new()),
            "<h1 id=\"hello-world\">Hello <em>World</em></h1>\n"
        );
    }

    #[test]
    fn test_inline_code_counts_as_text() {
        assert_eq!(
            render("## Use `cargo`", &HeadingAnchorExtension::new()),
            "<h2 id=\"use-cargo\">Use <code>cargo</code></h2>\n"
        );
    }

    #[test]
    fn test_duplicates_are_numbered() {
        let html = render("# A\n# A\n# A", &HeadingAnchorExtension::new());
        assert_eq!(
            html,
            "<h1 id=\"a\">A</h1>\n<h1 id=\"a-1\">A</h1>\n<h1 id=\"a-2\">A</h1>\n"
        );
    }

    #[test]
    fn test_prefix_suffix_and_default() {
        let extension = HeadingAnchorExtension::new()
            .with_id_prefix("h-")
            .with_id_suffix("-x")
            .with_default_id("section");
        assert_eq!(
            render("# Intro\n# ???", &extension),
            "<h1 id=\"h-intro-x\">Intro</h1>\n<h1 id=\"h-section-x\">???</h1>\n"
        );
    }

    #[test]
    fn test_other_tags_untouched() {
        assert_eq!(
            render("para", &HeadingAnchorExtension::new()),
            "<p>para</p>\n"
        );
    }

    #[test]
    fn test_counts_reset_between_renders() {
        let doc = Parser::default().parse("# Same");
        let renderer = HtmlRenderer::builder()
            .with_extension(&HeadingAnchorExtension::new())
            .build();
        let first = renderer.render_document(&doc).unwrap();
        let second = renderer.render_document(&doc).unwrap();
        assert_eq!(first, "<h1 id=\"same\">Same</h1>\n");
        assert_eq!(second, first);
    }
}
