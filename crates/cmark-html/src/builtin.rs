//! Built-in renderer for the core CommonMark node types.

use cmark_ast::{NodeRef, NodeType, NodeValue};

use crate::attributes::Attributes;
use crate::context::RenderContext;
use crate::error::RenderError;
use crate::registry::HtmlNodeRenderer;

const CORE_NODE_TYPES: [NodeType; 20] = [
    NodeType::Document,
    NodeType::BlockQuote,
    NodeType::BulletList,
    NodeType::OrderedList,
    NodeType::ListItem,
    NodeType::Paragraph,
    NodeType::Heading,
    NodeType::FencedCodeBlock,
    NodeType::IndentedCodeBlock,
    NodeType::HtmlBlock,
    NodeType::ThematicBreak,
    NodeType::Text,
    NodeType::Code,
    NodeType::Emphasis,
    NodeType::StrongEmphasis,
    NodeType::Link,
    NodeType::Image,
    NodeType::HtmlInline,
    NodeType::SoftLineBreak,
    NodeType::HardLineBreak,
];

/// Renders core nodes the way the CommonMark reference renderer does.
///
/// Always registered last, so any user renderer claiming a core node type
/// replaces the corresponding method here.
pub struct CoreHtmlNodeRenderer;

impl HtmlNodeRenderer for CoreHtmlNodeRenderer {
    fn node_types(&self) -> Vec<NodeType> {
        CORE_NODE_TYPES.to_vec()
    }

    fn render(&self, node: NodeRef<'_>, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        match node.value() {
            NodeValue::Document => ctx.render_children(node),
            NodeValue::BlockQuote => {
                ctx.writer().line()?;
                ctx.tag(node, "blockquote", &Attributes::new())?;
                ctx.writer().line()?;
                ctx.render_children(node)?;
                ctx.writer().line()?;
                ctx.writer().close_tag("blockquote")?;
                ctx.writer().line()?;
                Ok(())
            }
            NodeValue::BulletList { .. } => render_list(node, ctx, "ul", &Attributes::new()),
            NodeValue::OrderedList { start, .. } => {
                let mut attributes = Attributes::new();
                if *start != 1 {
                    attributes.insert("start", start.to_string());
                }
                render_list(node, ctx, "ol", &attributes)
            }
            NodeValue::ListItem => {
                ctx.tag(node, "li", &Attributes::new())?;
                ctx.render_children(node)?;
                ctx.writer().close_tag("li")?;
                ctx.writer().line()?;
                Ok(())
            }
            NodeValue::Paragraph => render_paragraph(node, ctx),
            NodeValue::Heading { level } => {
                let tag = format!("h{level}");
                ctx.writer().line()?;
                ctx.tag(node, &tag, &Attributes::new())?;
                ctx.render_children(node)?;
                ctx.writer().close_tag(&tag)?;
                ctx.writer().line()?;
                Ok(())
            }
            NodeValue::FencedCodeBlock { info, literal } => {
                let mut attributes = Attributes::new();
                if let Some(language) = info.split(' ').next().filter(|l| !l.is_empty()) {
                    attributes.insert("class", format!("language-{language}"));
                }
                render_code_block(node, ctx, literal, &attributes)
            }
            NodeValue::IndentedCodeBlock { literal } => {
                render_code_block(node, ctx, literal, &Attributes::new())
            }
            NodeValue::HtmlBlock { literal } => {
                ctx.writer().line()?;
                if ctx.escape_html() {
                    ctx.tag(node, "p", &Attributes::new())?;
                    ctx.writer().text(literal)?;
                    ctx.writer().close_tag("p")?;
                } else {
                    ctx.writer().raw(literal)?;
                }
                ctx.writer().line()?;
                Ok(())
            }
            NodeValue::ThematicBreak => {
                ctx.writer().line()?;
                ctx.void_tag(node, "hr", &Attributes::new())?;
                ctx.writer().line()?;
                Ok(())
            }
            NodeValue::Text(literal) => {
                ctx.writer().text(literal)?;
                Ok(())
            }
            NodeValue::Code(literal) => {
                ctx.tag(node, "code", &Attributes::new())?;
                ctx.writer().text(literal)?;
                ctx.writer().close_tag("code")?;
                Ok(())
            }
            NodeValue::Emphasis => render_inline(node, ctx, "em"),
            NodeValue::StrongEmphasis => render_inline(node, ctx, "strong"),
            NodeValue::Link { destination, title } => {
                let mut attributes = Attributes::new();
                if ctx.sanitize_urls() {
                    attributes.insert("rel", "nofollow");
                }
                attributes.insert("href", ctx.link_url(destination));
                if !title.is_empty() {
                    attributes.insert("title", title.as_str());
                }
                ctx.tag(node, "a", &attributes)?;
                ctx.render_children(node)?;
                ctx.writer().close_tag("a")?;
                Ok(())
            }
            NodeValue::Image { destination, title } => {
                let mut attributes = Attributes::new();
                attributes.insert("src", ctx.image_url(destination));
                attributes.insert("alt", alt_text(node));
                if !title.is_empty() {
                    attributes.insert("title", title.as_str());
                }
                ctx.void_tag(node, "img", &attributes)
            }
            NodeValue::HtmlInline(literal) => {
                if ctx.escape_html() {
                    ctx.writer().text(literal)?;
                } else {
                    ctx.writer().raw(literal)?;
                }
                Ok(())
            }
            NodeValue::SoftLineBreak => {
                let softbreak = ctx.softbreak();
                ctx.writer().raw(softbreak)?;
                Ok(())
            }
            NodeValue::HardLineBreak => {
                ctx.void_tag(node, "br", &Attributes::new())?;
                ctx.writer().line()?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn render_list(
    node: NodeRef<'_>,
    ctx: &mut RenderContext<'_>,
    tag: &str,
    attributes: &Attributes,
) -> Result<(), RenderError> {
    ctx.writer().line()?;
    ctx.tag(node, tag, attributes)?;
    ctx.writer().line()?;
    ctx.render_children(node)?;
    ctx.writer().line()?;
    ctx.writer().close_tag(tag)?;
    ctx.writer().line()?;
    Ok(())
}

fn render_paragraph(node: NodeRef<'_>, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
    let omit_p = in_tight_list(node) || (ctx.omit_single_paragraph_p() && is_only_top_level_block(node));
    if !omit_p {
        ctx.writer().line()?;
        ctx.tag(node, "p", &Attributes::new())?;
    }
    ctx.render_children(node)?;
    if !omit_p {
        ctx.writer().close_tag("p")?;
        ctx.writer().line()?;
    }
    Ok(())
}

fn render_code_block(
    node: NodeRef<'_>,
    ctx: &mut RenderContext<'_>,
    literal: &str,
    code_attributes: &Attributes,
) -> Result<(), RenderError> {
    ctx.writer().line()?;
    ctx.tag(node, "pre", &Attributes::new())?;
    ctx.tag(node, "code", code_attributes)?;
    ctx.writer().text(literal)?;
    ctx.writer().close_tag("code")?;
    ctx.writer().close_tag("pre")?;
    ctx.writer().line()?;
    Ok(())
}

fn render_inline(node: NodeRef<'_>, ctx: &mut RenderContext<'_>, tag: &str) -> Result<(), RenderError> {
    ctx.tag(node, tag, &Attributes::new())?;
    ctx.render_children(node)?;
    ctx.writer().close_tag(tag)?;
    Ok(())
}

/// Paragraph whose list item belongs to a tight list.
fn in_tight_list(paragraph: NodeRef<'_>) -> bool {
    paragraph
        .parent()
        .and_then(NodeRef::parent)
        .is_some_and(|list| match list.value() {
            NodeValue::BulletList { tight } | NodeValue::OrderedList { tight, .. } => *tight,
            _ => false,
        })
}

fn is_only_top_level_block(paragraph: NodeRef<'_>) -> bool {
    paragraph
        .parent()
        .is_some_and(|parent| matches!(parent.value(), NodeValue::Document))
        && paragraph.previous_sibling().is_none()
        && paragraph.next_sibling().is_none()
}

/// Plain-text alt of an image: descendant text, with line breaks as `\n`.
fn alt_text(image: NodeRef<'_>) -> String {
    let mut alt = String::new();
    for node in image.descendants() {
        match node.value() {
            NodeValue::Text(literal) => alt.push_str(literal),
            NodeValue::SoftLineBreak | NodeValue::HardLineBreak => alt.push('\n'),
            _ => {}
        }
    }
    alt
}
