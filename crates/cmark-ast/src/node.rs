//! Node variants of the document tree.
//!
//! The set of variants is closed: core CommonMark nodes, the GFM-style nodes
//! produced when the corresponding parser extensions are enabled, and a
//! [`NodeValue::Custom`] escape hatch for nodes introduced by third-party
//! producers.

use std::fmt;

/// Column alignment of a table cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// No explicit alignment.
    #[default]
    None,
    /// `:---`
    Left,
    /// `:---:`
    Center,
    /// `---:`
    Right,
}

impl Alignment {
    /// Value of the HTML `align` attribute, if any.
    #[must_use]
    pub fn as_html(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Left => Some("left"),
            Self::Center => Some("center"),
            Self::Right => Some("right"),
        }
    }
}

impl From<pulldown_cmark::Alignment> for Alignment {
    fn from(alignment: pulldown_cmark::Alignment) -> Self {
        match alignment {
            pulldown_cmark::Alignment::None => Self::None,
            pulldown_cmark::Alignment::Left => Self::Left,
            pulldown_cmark::Alignment::Center => Self::Center,
            pulldown_cmark::Alignment::Right => Self::Right,
        }
    }
}

/// Payload of a tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeValue {
    /// Root of every tree.
    Document,
    BlockQuote,
    /// Unordered list. `tight` lists render their paragraphs without `<p>`.
    BulletList { tight: bool },
    /// Ordered list starting at `start`.
    OrderedList { start: u64, tight: bool },
    ListItem,
    Paragraph,
    /// ATX or setext heading, `level` in `1..=6`.
    Heading { level: u8 },
    /// Fenced code block with its full info string.
    FencedCodeBlock { info: String, literal: String },
    IndentedCodeBlock { literal: String },
    /// Raw HTML block.
    HtmlBlock { literal: String },
    ThematicBreak,
    Text(String),
    /// Inline code span.
    Code(String),
    Emphasis,
    StrongEmphasis,
    Link { destination: String, title: String },
    /// Image; the alt text lives in the children.
    Image { destination: String, title: String },
    /// Raw inline HTML (a single tag, comment, etc.).
    HtmlInline(String),
    SoftLineBreak,
    HardLineBreak,
    Strikethrough,
    Table { alignments: Vec<Alignment> },
    TableHead,
    TableBody,
    TableRow,
    TableCell { header: bool, alignment: Alignment },
    /// `[ ]` / `[x]` at the start of a list item.
    TaskListMarker { checked: bool },
    FootnoteReference { label: String },
    FootnoteDefinition { label: String },
    /// Node defined outside of this crate. `name` identifies its renderer.
    Custom { name: &'static str, literal: String },
}

impl NodeValue {
    /// Dispatch tag of this value.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Document => NodeType::Document,
            Self::BlockQuote => NodeType::BlockQuote,
            Self::BulletList { .. } => NodeType::BulletList,
            Self::OrderedList { .. } => NodeType::OrderedList,
            Self::ListItem => NodeType::ListItem,
            Self::Paragraph => NodeType::Paragraph,
            Self::Heading { .. } => NodeType::Heading,
            Self::FencedCodeBlock { .. } => NodeType::FencedCodeBlock,
            Self::IndentedCodeBlock { .. } => NodeType::IndentedCodeBlock,
            Self::HtmlBlock { .. } => NodeType::HtmlBlock,
            Self::ThematicBreak => NodeType::ThematicBreak,
            Self::Text(_) => NodeType::Text,
            Self::Code(_) => NodeType::Code,
            Self::Emphasis => NodeType::Emphasis,
            Self::StrongEmphasis => NodeType::StrongEmphasis,
            Self::Link { .. } => NodeType::Link,
            Self::Image { .. } => NodeType::Image,
            Self::HtmlInline(_) => NodeType::HtmlInline,
            Self::SoftLineBreak => NodeType::SoftLineBreak,
            Self::HardLineBreak => NodeType::HardLineBreak,
            Self::Strikethrough => NodeType::Strikethrough,
            Self::Table { .. } => NodeType::Table,
            Self::TableHead => NodeType::TableHead,
            Self::TableBody => NodeType::TableBody,
            Self::TableRow => NodeType::TableRow,
            Self::TableCell { .. } => NodeType::TableCell,
            Self::TaskListMarker { .. } => NodeType::TaskListMarker,
            Self::FootnoteReference { .. } => NodeType::FootnoteReference,
            Self::FootnoteDefinition { .. } => NodeType::FootnoteDefinition,
            Self::Custom { name, .. } => NodeType::Custom(name),
        }
    }

    /// Whether the node is a container block (as opposed to inline content).
    ///
    /// Inline content directly inside a list item is wrapped in an implicit
    /// paragraph by the parser adapter; this decides where such a paragraph ends.
    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Self::Document
                | Self::BlockQuote
                | Self::BulletList { .. }
                | Self::OrderedList { .. }
                | Self::ListItem
                | Self::Paragraph
                | Self::Heading { .. }
                | Self::FencedCodeBlock { .. }
                | Self::IndentedCodeBlock { .. }
                | Self::HtmlBlock { .. }
                | Self::ThematicBreak
                | Self::Table { .. }
                | Self::TableHead
                | Self::TableBody
                | Self::TableRow
                | Self::TableCell { .. }
                | Self::FootnoteDefinition { .. }
        )
    }
}

/// Dispatch key identifying a node variant.
///
/// Renderers declare the node types they handle; the registry binds each type
/// to exactly one renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Document,
    BlockQuote,
    BulletList,
    OrderedList,
    ListItem,
    Paragraph,
    Heading,
    FencedCodeBlock,
    IndentedCodeBlock,
    HtmlBlock,
    ThematicBreak,
    Text,
    Code,
    Emphasis,
    StrongEmphasis,
    Link,
    Image,
    HtmlInline,
    SoftLineBreak,
    HardLineBreak,
    Strikethrough,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableCell,
    TaskListMarker,
    FootnoteReference,
    FootnoteDefinition,
    Custom(&'static str),
}

impl NodeType {
    /// Snake-case name used in error messages and logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::BlockQuote => "block_quote",
            Self::BulletList => "bullet_list",
            Self::OrderedList => "ordered_list",
            Self::ListItem => "list_item",
            Self::Paragraph => "paragraph",
            Self::Heading => "heading",
            Self::FencedCodeBlock => "fenced_code_block",
            Self::IndentedCodeBlock => "indented_code_block",
            Self::HtmlBlock => "html_block",
            Self::ThematicBreak => "thematic_break",
            Self::Text => "text",
            Self::Code => "code",
            Self::Emphasis => "emphasis",
            Self::StrongEmphasis => "strong_emphasis",
            Self::Link => "link",
            Self::Image => "image",
            Self::HtmlInline => "html_inline",
            Self::SoftLineBreak => "soft_line_break",
            Self::HardLineBreak => "hard_line_break",
            Self::Strikethrough => "strikethrough",
            Self::Table => "table",
            Self::TableHead => "table_head",
            Self::TableBody => "table_body",
            Self::TableRow => "table_row",
            Self::TableCell => "table_cell",
            Self::TaskListMarker => "task_list_marker",
            Self::FootnoteReference => "footnote_reference",
            Self::FootnoteDefinition => "footnote_definition",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_ignores_payload() {
        let a = NodeValue::Heading { level: 1 };
        let b = NodeValue::Heading { level: 4 };
        assert_eq!(a.node_type(), b.node_type());
    }

    #[test]
    fn test_custom_node_type_uses_name() {
        let value = NodeValue::Custom {
            name: "youtube",
            literal: String::new(),
        };
        assert_eq!(value.node_type(), NodeType::Custom("youtube"));
        assert_eq!(value.node_type().to_string(), "youtube");
    }

    #[test]
    fn test_is_block() {
        assert!(NodeValue::Paragraph.is_block());
        assert!(NodeValue::BulletList { tight: true }.is_block());
        assert!(!NodeValue::Emphasis.is_block());
        assert!(!NodeValue::Text("a".to_owned()).is_block());
        assert!(!NodeValue::TaskListMarker { checked: false }.is_block());
    }

    #[test]
    fn test_alignment_as_html() {
        assert_eq!(Alignment::None.as_html(), None);
        assert_eq!(Alignment::Left.as_html(), Some("left"));
        assert_eq!(Alignment::Center.as_html(), Some("center"));
        assert_eq!(Alignment::Right.as_html(), Some("right"));
    }
}
