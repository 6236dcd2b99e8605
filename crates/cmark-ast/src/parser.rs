//! Tree construction from `pulldown-cmark` events.
//!
//! `pulldown-cmark` produces a flat event stream; this module folds it into a
//! [`Document`]. A few shapes are normalized on the way:
//!
//! - Adjacent text events are merged into one [`NodeValue::Text`].
//! - Inline content directly inside a list item (tight lists) is wrapped in an
//!   implicit paragraph, and the list records whether it is tight.
//! - Table header cells are grouped under a row, body rows under a
//!   [`NodeValue::TableBody`].
//! - Code and HTML block contents are accumulated into the block's literal.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Tag};

use crate::document::{Document, NodeId};
use crate::node::NodeValue;

/// Extension hook for the parser side of an extension.
///
/// Extensions that introduce new node kinds use this to switch on the
/// corresponding `pulldown-cmark` options.
pub trait ParserExtension {
    /// Adjust the parser configuration.
    fn extend_parser(&self, builder: &mut ParserBuilder);
}

/// Builder for [`Parser`].
#[derive(Clone, Debug)]
pub struct ParserBuilder {
    options: Options,
}

impl Default for ParserBuilder {
    fn default() -> Self {
        Self {
            options: Options::empty(),
        }
    }
}

impl ParserBuilder {
    /// Create a builder with CommonMark-only options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `pulldown-cmark` options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.enable(options);
        self
    }

    /// Apply a parser extension.
    #[must_use]
    pub fn with_extension(mut self, extension: &dyn ParserExtension) -> Self {
        extension.extend_parser(&mut self);
        self
    }

    /// Apply several parser extensions in order.
    #[must_use]
    pub fn with_extensions<'e, I>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = &'e dyn ParserExtension>,
    {
        for extension in extensions {
            extension.extend_parser(&mut self);
        }
        self
    }

    /// Enable options in place. Intended for [`ParserExtension`] implementations.
    pub fn enable(&mut self, options: Options) -> &mut Self {
        self.options.insert(options);
        self
    }

    /// Build the parser.
    #[must_use]
    pub fn build(&self) -> Parser {
        Parser {
            options: self.options,
        }
    }
}

/// Markdown parser producing a [`Document`].
///
/// # Example
///
/// ```
/// use cmark_ast::{NodeType, Parser};
///
/// let doc = Parser::builder().build().parse("Hello *world*");
/// let paragraph = doc.root().first_child().unwrap();
/// assert_eq!(paragraph.node_type(), NodeType::Paragraph);
/// ```
#[derive(Clone, Debug)]
pub struct Parser {
    options: Options,
}

impl Default for Parser {
    fn default() -> Self {
        ParserBuilder::new().build()
    }
}

impl Parser {
    /// Create a new parser builder.
    #[must_use]
    pub fn builder() -> ParserBuilder {
        ParserBuilder::new()
    }

    /// Options the parser was built with.
    #[must_use]
    pub fn options(&self) -> Options {
        self.options
    }

    /// Parse markdown text into a document tree.
    #[must_use]
    pub fn parse(&self, markdown: &str) -> Document {
        build_document(pulldown_cmark::Parser::new_ext(markdown, self.options))
    }
}

/// Fold a `pulldown-cmark` event stream into a document tree.
pub fn build_document<'a, I>(events: I) -> Document
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut builder = TreeBuilder::default();
    for event in events {
        builder.event(event);
    }
    let doc = builder.finish();
    tracing::debug!(nodes = doc.len(), "Built document tree");
    doc
}

/// An open container on the builder stack.
struct Frame {
    id: NodeId,
    /// Synthesized by the builder rather than opened by a start tag.
    implicit: bool,
}

#[derive(Default)]
struct TreeBuilder {
    doc: Document,
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(text),
            Event::Code(code) => self.leaf(NodeValue::Code(code.into_string())),
            Event::Html(html) => self.html(html),
            Event::InlineHtml(html) => self.leaf(NodeValue::HtmlInline(html.into_string())),
            Event::SoftBreak => self.leaf(NodeValue::SoftLineBreak),
            Event::HardBreak => self.leaf(NodeValue::HardLineBreak),
            Event::Rule => self.leaf(NodeValue::ThematicBreak),
            Event::TaskListMarker(checked) => self.leaf(NodeValue::TaskListMarker { checked }),
            Event::FootnoteReference(label) => self.leaf(NodeValue::FootnoteReference {
                label: label.into_string(),
            }),
            Event::InlineMath(math) => self.leaf(NodeValue::Custom {
                name: "inline_math",
                literal: math.into_string(),
            }),
            Event::DisplayMath(math) => self.leaf(NodeValue::Custom {
                name: "display_math",
                literal: math.into_string(),
            }),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let value = match tag {
            Tag::Paragraph => NodeValue::Paragraph,
            Tag::Heading { level, .. } => NodeValue::Heading {
                level: heading_level_to_num(level),
            },
            Tag::BlockQuote(_) => NodeValue::BlockQuote,
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => NodeValue::FencedCodeBlock {
                info: info.into_string(),
                literal: String::new(),
            },
            Tag::CodeBlock(CodeBlockKind::Indented) => NodeValue::IndentedCodeBlock {
                literal: String::new(),
            },
            Tag::HtmlBlock => NodeValue::HtmlBlock {
                literal: String::new(),
            },
            Tag::List(Some(start)) => NodeValue::OrderedList { start, tight: true },
            Tag::List(None) => NodeValue::BulletList { tight: true },
            Tag::Item => NodeValue::ListItem,
            Tag::FootnoteDefinition(label) => NodeValue::FootnoteDefinition {
                label: label.into_string(),
            },
            Tag::Table(alignments) => NodeValue::Table {
                alignments: alignments.into_iter().map(Into::into).collect(),
            },
            Tag::TableHead => NodeValue::TableHead,
            Tag::TableRow => NodeValue::TableRow,
            Tag::TableCell => self.table_cell(),
            Tag::Emphasis => NodeValue::Emphasis,
            Tag::Strong => NodeValue::StrongEmphasis,
            Tag::Strikethrough => NodeValue::Strikethrough,
            Tag::Link {
                link_type: LinkType::Email,
                dest_url,
                title,
                ..
            } => NodeValue::Link {
                destination: format!("mailto:{dest_url}"),
                title: title.into_string(),
            },
            Tag::Link {
                dest_url, title, ..
            } => NodeValue::Link {
                destination: dest_url.into_string(),
                title: title.into_string(),
            },
            Tag::Image {
                dest_url, title, ..
            } => NodeValue::Image {
                destination: dest_url.into_string(),
                title: title.into_string(),
            },
            Tag::DefinitionList => custom("definition_list"),
            Tag::DefinitionListTitle => custom("definition_list_title"),
            Tag::DefinitionListDefinition => custom("definition_list_definition"),
            Tag::Superscript => custom("superscript"),
            Tag::Subscript => custom("subscript"),
            Tag::MetadataBlock(_) => custom("metadata_block"),
        };

        let is_head = matches!(value, NodeValue::TableHead);
        self.open(value);
        if is_head {
            // Header cells arrive without a row of their own.
            self.push_implicit(NodeValue::TableRow);
        }
    }

    /// Close the innermost explicitly opened container, along with any
    /// implicit containers nested inside it.
    fn end(&mut self) {
        while self.stack.last().is_some_and(|frame| frame.implicit) {
            self.stack.pop();
        }
        self.stack.pop();
    }

    fn text(&mut self, text: CowStr<'_>) {
        let current = self.current();
        match self.doc.value_mut(current) {
            NodeValue::FencedCodeBlock { literal, .. }
            | NodeValue::IndentedCodeBlock { literal }
            | NodeValue::HtmlBlock { literal } => {
                literal.push_str(&text);
                return;
            }
            _ => {}
        }

        let last = self
            .doc
            .get(current)
            .and_then(|node| node.last_child())
            .map(|node| node.id());
        if let Some(last) = last
            && let NodeValue::Text(existing) = self.doc.value_mut(last)
        {
            existing.push_str(&text);
            return;
        }
        self.leaf(NodeValue::Text(text.into_string()));
    }

    fn html(&mut self, html: CowStr<'_>) {
        let current = self.current();
        if let NodeValue::HtmlBlock { literal } = self.doc.value_mut(current) {
            literal.push_str(&html);
        } else {
            self.leaf(NodeValue::HtmlBlock {
                literal: html.into_string(),
            });
        }
    }

    fn leaf(&mut self, value: NodeValue) {
        let parent = self.prepare(&value);
        self.doc.append(parent, value);
    }

    fn open(&mut self, value: NodeValue) {
        let parent = self.prepare(&value);
        let id = self.doc.append(parent, value);
        self.stack.push(Frame {
            id,
            implicit: false,
        });
    }

    /// Fix up the stack for a new node and return the parent to attach it to.
    fn prepare(&mut self, value: &NodeValue) -> NodeId {
        let block = value.is_block();
        if block
            && self.stack.last().is_some_and(|frame| frame.implicit)
            && self.current_is_paragraph()
        {
            self.stack.pop();
        }

        let current = self.current();
        let in_item = matches!(self.value_of(current), Some(NodeValue::ListItem));
        let in_table = matches!(self.value_of(current), Some(NodeValue::Table { .. }));

        if in_item {
            if !block {
                return self.push_implicit(NodeValue::Paragraph);
            }
            if matches!(value, NodeValue::Paragraph) {
                self.mark_loose(current);
            }
        }

        if in_table && matches!(value, NodeValue::TableRow) {
            return self.push_implicit(NodeValue::TableBody);
        }

        current
    }

    /// Open a container the event stream does not mark explicitly.
    fn push_implicit(&mut self, value: NodeValue) -> NodeId {
        let id = self.doc.append(self.current(), value);
        self.stack.push(Frame { id, implicit: true });
        id
    }

    /// Cell kind depends on whether we are in the header row.
    fn table_cell(&self) -> NodeValue {
        let header = self
            .stack
            .iter()
            .rev()
            .any(|frame| matches!(self.value_of(frame.id), Some(NodeValue::TableHead)));
        let table = self
            .stack
            .iter()
            .rev()
            .find(|frame| matches!(self.value_of(frame.id), Some(NodeValue::Table { .. })));
        let column = self
            .doc
            .get(self.current())
            .map_or(0, |row| row.children().count());
        let alignment = table
            .and_then(|frame| match self.value_of(frame.id) {
                Some(NodeValue::Table { alignments }) => alignments.get(column).copied(),
                _ => None,
            })
            .unwrap_or_default();
        NodeValue::TableCell { header, alignment }
    }

    fn mark_loose(&mut self, item: NodeId) {
        let Some(list) = self.doc.get(item).and_then(|node| node.parent()).map(|node| node.id()) else {
            return;
        };
        match self.doc.value_mut(list) {
            NodeValue::BulletList { tight } | NodeValue::OrderedList { tight, .. } => *tight = false,
            _ => {}
        }
    }

    fn current(&self) -> NodeId {
        self.stack.last().map_or(Document::ROOT, |frame| frame.id)
    }

    fn current_is_paragraph(&self) -> bool {
        matches!(self.value_of(self.current()), Some(NodeValue::Paragraph))
    }

    fn value_of(&self, id: NodeId) -> Option<&NodeValue> {
        self.doc.get(id).map(|node| node.value())
    }

    fn finish(self) -> Document {
        self.doc
    }
}

fn custom(name: &'static str) -> NodeValue {
    tracing::trace!(name, "Unmodelled tag kept as custom node");
    NodeValue::Custom {
        name,
        literal: String::new(),
    }
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeRef;
    use crate::node::{Alignment, NodeType};
    use pretty_assertions::assert_eq;

    fn parse(markdown: &str) -> Document {
        Parser::builder().build().parse(markdown)
    }

    fn parse_gfm(markdown: &str) -> Document {
        Parser::builder()
            .with_options(
                Options::ENABLE_TABLES
                    | Options::ENABLE_STRIKETHROUGH
                    | Options::ENABLE_TASKLISTS
                    | Options::ENABLE_FOOTNOTES,
            )
            .build()
            .parse(markdown)
    }

    /// Render the tree shape as an s-expression for compact assertions.
    fn shape(node: NodeRef<'_>) -> String {
        let children: Vec<String> = node.children().map(shape).collect();
        if children.is_empty() {
            node.node_type().to_string()
        } else {
            format!("({} {})", node.node_type(), children.join(" "))
        }
    }

    #[test]
    fn test_paragraph_with_emphasis() {
        let doc = parse("This is *Markdown*");
        assert_eq!(shape(doc.root()), "(document (paragraph text (emphasis text)))");

        let paragraph = doc.root().first_child().unwrap();
        let text = paragraph.first_child().unwrap();
        assert_eq!(text.value(), &NodeValue::Text("This is ".to_owned()));
    }

    #[test]
    fn test_adjacent_text_is_merged() {
        let doc = parse("a &amp; b");
        let paragraph = doc.root().first_child().unwrap();
        assert_eq!(paragraph.children().count(), 1);
        assert_eq!(
            paragraph.first_child().unwrap().value(),
            &NodeValue::Text("a & b".to_owned())
        );
    }

    #[test]
    fn test_heading_level() {
        let doc = parse("### Title");
        assert_eq!(
            doc.root().first_child().unwrap().value(),
            &NodeValue::Heading { level: 3 }
        );
    }

    #[test]
    fn test_tight_list_wraps_inline_content() {
        let doc = parse("- one\n- two");
        assert_eq!(
            shape(doc.root()),
            "(document (bullet_list (list_item (paragraph text)) (list_item (paragraph text))))"
        );
        assert_eq!(
            doc.root().first_child().unwrap().value(),
            &NodeValue::BulletList { tight: true }
        );
    }

    #[test]
    fn test_loose_list() {
        let doc = parse("1. one\n\n2. two");
        assert_eq!(
            doc.root().first_child().unwrap().value(),
            &NodeValue::OrderedList {
                start: 1,
                tight: false
            }
        );
        assert_eq!(
            shape(doc.root()),
            "(document (ordered_list (list_item (paragraph text)) (list_item (paragraph text))))"
        );
    }

    #[test]
    fn test_tight_list_with_nested_list() {
        let doc = parse("- a\n  - b");
        assert_eq!(
            shape(doc.root()),
            "(document (bullet_list (list_item (paragraph text) (bullet_list (list_item (paragraph text))))))"
        );
    }

    #[test]
    fn test_fenced_code_block_literal() {
        let doc = parse("```rust extra\nfn main() {}\n```");
        assert_eq!(
            doc.root().first_child().unwrap().value(),
            &NodeValue::FencedCodeBlock {
                info: "rust extra".to_owned(),
                literal: "fn main() {}\n".to_owned(),
            }
        );
    }

    #[test]
    fn test_indented_code_block_literal() {
        let doc = parse("Example:\n\n    code");
        assert_eq!(shape(doc.root()), "(document (paragraph text) indented_code_block)");
        assert_eq!(
            doc.root().last_child().unwrap().value(),
            &NodeValue::IndentedCodeBlock {
                literal: "code\n".to_owned()
            }
        );
    }

    #[test]
    fn test_html_block_literal() {
        let doc = parse("<div>\nhello\n</div>\n");
        assert_eq!(
            doc.root().first_child().unwrap().value(),
            &NodeValue::HtmlBlock {
                literal: "<div>\nhello\n</div>\n".to_owned()
            }
        );
    }

    #[test]
    fn test_image_alt_text_children() {
        let doc = parse("![text](/url.png \"Title\")");
        let image = doc.root().first_child().unwrap().first_child().unwrap();
        assert_eq!(
            image.value(),
            &NodeValue::Image {
                destination: "/url.png".to_owned(),
                title: "Title".to_owned(),
            }
        );
        assert_eq!(shape(image), "(image text)");
    }

    #[test]
    fn test_table_structure() {
        let doc = parse_gfm("| a | b |\n|:--|--:|\n| 1 | 2 |\n| 3 | 4 |");
        assert_eq!(
            shape(doc.root()),
            "(document (table (table_head (table_row (table_cell text) (table_cell text))) \
             (table_body (table_row (table_cell text) (table_cell text)) \
             (table_row (table_cell text) (table_cell text)))))"
        );

        let cells: Vec<NodeValue> = doc
            .root()
            .descendants()
            .filter(|node| node.node_type() == NodeType::TableCell)
            .map(|node| node.value().clone())
            .take(2)
            .collect();
        assert_eq!(
            cells,
            vec![
                NodeValue::TableCell {
                    header: true,
                    alignment: Alignment::Left
                },
                NodeValue::TableCell {
                    header: true,
                    alignment: Alignment::Right
                },
            ]
        );
    }

    #[test]
    fn test_task_list_marker_inside_implicit_paragraph() {
        let doc = parse_gfm("- [x] done");
        assert_eq!(
            shape(doc.root()),
            "(document (bullet_list (list_item (paragraph task_list_marker text))))"
        );
    }

    #[test]
    fn test_footnotes() {
        let doc = parse_gfm("Hi[^1]\n\n[^1]: Note");
        assert_eq!(
            shape(doc.root()),
            "(document (paragraph text footnote_reference) (footnote_definition (paragraph text)))"
        );
    }

    #[test]
    fn test_unmodelled_tag_becomes_custom_node() {
        let doc = Parser::builder()
            .with_options(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS)
            .build()
            .parse("---\ntitle: x\n---\n");
        assert_eq!(shape(doc.root()), "(document (metadata_block text))");
    }

    #[test]
    fn test_strikethrough_requires_option() {
        assert_eq!(shape(parse_gfm("~~x~~").root()), "(document (paragraph (strikethrough text)))");
        assert_eq!(shape(parse("~~x~~").root()), "(document (paragraph text))");
    }

    struct Tables;

    impl ParserExtension for Tables {
        fn extend_parser(&self, builder: &mut ParserBuilder) {
            builder.enable(Options::ENABLE_TABLES);
        }
    }

    #[test]
    fn test_parser_extension_enables_options() {
        let parser = Parser::builder().with_extension(&Tables).build();
        assert!(parser.options().contains(Options::ENABLE_TABLES));
        assert!(!parser.options().contains(Options::ENABLE_FOOTNOTES));
    }
}
