//! Node renderers and their dispatch table.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::rc::Rc;

use cmark_ast::{NodeRef, NodeType};

use crate::context::{FactoryContext, RenderContext};
use crate::error::RenderError;

/// Renders one or more node types.
///
/// Renderers are responsible for recursing into the children they want
/// rendered, normally through [`RenderContext::render_children`]. Methods take
/// `&self` because a renderer is re-entered while it renders nested nodes;
/// per-render state belongs in a `Cell`/`RefCell`.
pub trait HtmlNodeRenderer {
    /// Node types this renderer handles.
    fn node_types(&self) -> Vec<NodeType>;

    /// Render `node`.
    fn render(&self, node: NodeRef<'_>, ctx: &mut RenderContext<'_>) -> Result<(), RenderError>;

    /// Called on every renderer before the root node is dispatched.
    fn before_root(&self, _root: NodeRef<'_>, _ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        Ok(())
    }

    /// Called on every renderer after the root node has been rendered.
    fn after_root(&self, _root: NodeRef<'_>, _ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Blueprint producing a fresh [`HtmlNodeRenderer`] for each render call.
///
/// Called while the [`RenderContext`] is being set up, so it receives the
/// read-only [`FactoryContext`] of that call rather than the context itself.
pub trait HtmlNodeRendererFactory: Send + Sync {
    fn create(&self, context: &FactoryContext<'_>) -> Box<dyn HtmlNodeRenderer>;
}

/// Adapts a closure returning a renderer into an [`HtmlNodeRendererFactory`].
pub(crate) struct FnNodeRendererFactory<F>(pub(crate) F);

impl<F, R> HtmlNodeRendererFactory for FnNodeRendererFactory<F>
where
    F: Fn(&FactoryContext<'_>) -> R + Send + Sync,
    R: HtmlNodeRenderer + 'static,
{
    fn create(&self, context: &FactoryContext<'_>) -> Box<dyn HtmlNodeRenderer> {
        Box::new((self.0)(context))
    }
}

/// Node type to renderer bindings of one render call.
///
/// The first renderer added for a node type keeps it; later additions for the
/// same type are ignored. Adding user renderers before the built-in ones is
/// what lets them override core behavior.
#[derive(Default)]
pub(crate) struct NodeRendererMap {
    by_type: HashMap<NodeType, Rc<dyn HtmlNodeRenderer>>,
    renderers: Vec<Rc<dyn HtmlNodeRenderer>>,
}

impl NodeRendererMap {
    pub(crate) fn add(&mut self, renderer: Rc<dyn HtmlNodeRenderer>) {
        for node_type in renderer.node_types() {
            match self.by_type.entry(node_type) {
                Entry::Occupied(_) => {
                    tracing::trace!(%node_type, "Node type already bound, keeping earlier renderer");
                }
                Entry::Vacant(entry) => {
                    entry.insert(Rc::clone(&renderer));
                }
            }
        }
        self.renderers.push(renderer);
    }

    pub(crate) fn get(&self, node_type: NodeType) -> Option<Rc<dyn HtmlNodeRenderer>> {
        self.by_type.get(&node_type).map(Rc::clone)
    }

    /// All renderers in registration order, including fully shadowed ones.
    pub(crate) fn renderers(&self) -> Vec<Rc<dyn HtmlNodeRenderer>> {
        self.renderers.iter().map(Rc::clone).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.renderers.len()
    }
}
