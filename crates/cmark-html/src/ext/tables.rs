use cmark_ast::{NodeRef, NodeType, NodeValue, Options, ParserBuilder, ParserExtension};

use crate::attributes::Attributes;
use crate::context::RenderContext;
use crate::error::RenderError;
use crate::ext::Extension;
use crate::registry::HtmlNodeRenderer;
use crate::renderer::{HtmlRendererBuilder, HtmlRendererExtension};

/// GFM pipe tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct TablesExtension;

impl TablesExtension {
    pub const NAME: &'static str = "tables";
}

impl ParserExtension for TablesExtension {
    fn extend_parser(&self, builder: &mut ParserBuilder) {
        builder.enable(Options::ENABLE_TABLES);
    }
}

impl HtmlRendererExtension for TablesExtension {
    fn extend(&self, builder: &mut HtmlRendererBuilder) {
        builder.add_node_renderer(|_| TableRenderer);
    }
}

impl Extension for TablesExtension {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

struct TableRenderer;

impl HtmlNodeRenderer for TableRenderer {
    fn node_types(&self) -> Vec<NodeType> {
        vec![
            NodeType::Table,
            NodeType::TableHead,
            NodeType::TableBody,
            NodeType::TableRow,
            NodeType::TableCell,
        ]
    }

    fn render(&self, node: NodeRef<'_>, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        let mut attributes = Attributes::new();
        let tag = match node.value() {
            NodeValue::Table { .. } => "table",
            NodeValue::TableHead => "thead",
            NodeValue::TableBody => "tbody",
            NodeValue::TableRow => "tr",
            NodeValue::TableCell { header, alignment } => {
                if let Some(align) = alignment.as_html() {
                    attributes.insert("align", align);
                }
                if *header { "th" } else { "td" }
            }
            _ => return Ok(()),
        };

        ctx.writer().line()?;
        ctx.tag(node, tag, &attributes)?;
        ctx.render_children(node)?;
        ctx.writer().close_tag(tag)?;
        ctx.writer().line()?;
        Ok(())
    }
}
