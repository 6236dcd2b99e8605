use cmark_ast::{NodeRef, NodeType, Options, ParserBuilder, ParserExtension};

use crate::attributes::Attributes;
use crate::context::RenderContext;
use crate::error::RenderError;
use crate::ext::Extension;
use crate::registry::HtmlNodeRenderer;
use crate::renderer::{HtmlRendererBuilder, HtmlRendererExtension};

/// `~~text~~` rendered as `<del>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrikethroughExtension;

impl StrikethroughExtension {
    pub const NAME: &'static str = "strikethrough";
}

impl ParserExtension for StrikethroughExtension {
    fn extend_parser(&self, builder: &mut ParserBuilder) {
        builder.enable(Options::ENABLE_STRIKETHROUGH);
    }
}

impl HtmlRendererExtension for StrikethroughExtension {
    fn extend(&self, builder: &mut HtmlRendererBuilder) {
        builder.add_node_renderer(|_| StrikethroughRenderer);
    }
}

impl Extension for StrikethroughExtension {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

struct StrikethroughRenderer;

impl HtmlNodeRenderer for StrikethroughRenderer {
    fn node_types(&self) -> Vec<NodeType> {
        vec![NodeType::Strikethrough]
    }

    fn render(&self, node: NodeRef<'_>, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        ctx.tag(node, "del", &Attributes::new())?;
        ctx.render_children(node)?;
        ctx.writer().close_tag("del")?;
        Ok(())
    }
}
