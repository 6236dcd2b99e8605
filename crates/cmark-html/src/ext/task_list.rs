use cmark_ast::{NodeRef, NodeType, NodeValue, Options, ParserBuilder, ParserExtension};

use crate::attributes::Attributes;
use crate::context::RenderContext;
use crate::error::RenderError;
use crate::ext::Extension;
use crate::registry::HtmlNodeRenderer;
use crate::renderer::{HtmlRendererBuilder, HtmlRendererExtension};

/// `- [ ]` / `- [x]` list items rendered with a disabled checkbox.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskListItemsExtension;

impl TaskListItemsExtension {
    pub const NAME: &'static str = "task_list_items";
}

impl ParserExtension for TaskListItemsExtension {
    fn extend_parser(&self, builder: &mut ParserBuilder) {
        builder.enable(Options::ENABLE_TASKLISTS);
    }
}

impl HtmlRendererExtension for TaskListItemsExtension {
    fn extend(&self, builder: &mut HtmlRendererBuilder) {
        builder.add_node_renderer(|_| TaskListMarkerRenderer);
    }
}

impl Extension for TaskListItemsExtension {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

struct TaskListMarkerRenderer;

impl HtmlNodeRenderer for TaskListMarkerRenderer {
    fn node_types(&self) -> Vec<NodeType> {
        vec![NodeType::TaskListMarker]
    }

    fn render(&self, node: NodeRef<'_>, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        let NodeValue::TaskListMarker { checked } = node.value() else {
            return Ok(());
        };
        let mut attributes = Attributes::new().with("type", "checkbox").with("disabled", "");
        if *checked {
            attributes.insert("checked", "");
        }
        ctx.void_tag(node, "input", &attributes)?;
        ctx.writer().raw(" ")?;
        Ok(())
    }
}
