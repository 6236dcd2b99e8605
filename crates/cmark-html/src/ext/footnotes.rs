use std::cell::RefCell;
use std::collections::HashMap;

use cmark_ast::{NodeRef, NodeType, NodeValue, Options, ParserBuilder, ParserExtension};

use crate::attributes::Attributes;
use crate::context::RenderContext;
use crate::error::RenderError;
use crate::ext::Extension;
use crate::registry::HtmlNodeRenderer;
use crate::renderer::{HtmlRendererBuilder, HtmlRendererExtension};

/// Footnote references and definitions.
///
/// References are numbered in order of first use. Definitions are removed
/// from the flow and emitted at the end of the document in a
/// `<section class="footnotes">`, each with links back to its references.
/// Definitions that are never referenced from the document, or only from
/// other dropped definitions, are dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct FootnotesExtension;

impl FootnotesExtension {
    pub const NAME: &'static str = "footnotes";
}

impl ParserExtension for FootnotesExtension {
    fn extend_parser(&self, builder: &mut ParserBuilder) {
        builder.enable(Options::ENABLE_FOOTNOTES);
    }
}

impl HtmlRendererExtension for FootnotesExtension {
    fn extend(&self, builder: &mut HtmlRendererBuilder) {
        builder.add_node_renderer(|_| FootnoteRenderer::default());
    }
}

impl Extension for FootnotesExtension {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

#[derive(Default)]
struct FootnoteRenderer {
    state: RefCell<FootnoteState>,
}

/// Numbering collected before rendering plus occurrence counters.
#[derive(Default)]
struct FootnoteState {
    /// Label to footnote number.
    numbers: HashMap<String, usize>,
    /// Labels in numbering order.
    order: Vec<String>,
    /// Total references per label.
    references: HashMap<String, usize>,
    /// References rendered so far per label.
    rendered: HashMap<String, usize>,
}

impl FootnoteState {
    /// Number the references reachable from the document flow.
    ///
    /// The flow outside definitions is scanned first, then each numbered
    /// definition in order, so a reference counts only if its enclosing
    /// definition is itself emitted.
    fn collect(root: NodeRef<'_>) -> Self {
        let mut definitions: HashMap<&str, NodeRef<'_>> = HashMap::new();
        for node in root.descendants() {
            if let NodeValue::FootnoteDefinition { label } = node.value() {
                definitions.entry(label.as_str()).or_insert(node);
            }
        }

        let mut state = Self::default();
        state.scan(root, &definitions);
        let mut next = 0;
        while next < state.order.len() {
            if let Some(definition) = definitions.get(state.order[next].as_str()).copied() {
                state.scan(definition, &definitions);
            }
            next += 1;
        }
        state
    }

    fn scan(&mut self, node: NodeRef<'_>, definitions: &HashMap<&str, NodeRef<'_>>) {
        for child in node.children() {
            match child.value() {
                NodeValue::FootnoteDefinition { .. } => {}
                NodeValue::FootnoteReference { label } => {
                    if !definitions.contains_key(label.as_str()) {
                        continue;
                    }
                    if !self.numbers.contains_key(label) {
                        self.numbers.insert(label.clone(), self.order.len() + 1);
                        self.order.push(label.clone());
                    }
                    *self.references.entry(label.clone()).or_default() += 1;
                }
                _ => self.scan(child, definitions),
            }
        }
    }

    /// Number of the footnote and occurrence index (1-based) of this reference.
    fn next_reference(&mut self, label: &str) -> Option<(usize, usize)> {
        let number = *self.numbers.get(label)?;
        let occurrence = self.rendered.entry(label.to_owned()).or_default();
        *occurrence += 1;
        Some((number, *occurrence))
    }
}

fn reference_id(label: &str, occurrence: usize) -> String {
    if occurrence == 1 {
        format!("fnref-{label}")
    } else {
        format!("fnref-{label}-{occurrence}")
    }
}

impl FootnoteRenderer {
    fn render_reference(
        &self,
        node: NodeRef<'_>,
        label: &str,
        ctx: &mut RenderContext<'_>,
    ) -> Result<(), RenderError> {
        let next = self.state.borrow_mut().next_reference(label);
        let Some((number, occurrence)) = next else {
            tracing::warn!(label, "Footnote reference without definition");
            ctx.writer().text(&format!("[^{label}]"))?;
            return Ok(());
        };

        ctx.tag(node, "sup", &Attributes::new().with("class", "footnote-ref"))?;
        let link = Attributes::new()
            .with("href", format!("#fn-{label}"))
            .with("id", reference_id(label, occurrence));
        ctx.tag(node, "a", &link)?;
        ctx.writer().text(&number.to_string())?;
        ctx.writer().close_tag("a")?;
        ctx.writer().close_tag("sup")?;
        Ok(())
    }
}

fn render_definition(
    definition: NodeRef<'_>,
    label: &str,
    references: usize,
    ctx: &mut RenderContext<'_>,
) -> Result<(), RenderError> {
    ctx.tag(definition, "li", &Attributes::new().with("id", format!("fn-{label}")))?;
    ctx.writer().line()?;

    let last = definition.last_child();
    for child in definition.children() {
        let is_last_paragraph = Some(child) == last && matches!(child.value(), NodeValue::Paragraph);
        if !is_last_paragraph {
            ctx.render(child)?;
            continue;
        }
        // Back references go inside the closing paragraph.
        ctx.writer().line()?;
        ctx.tag(child, "p", &Attributes::new())?;
        ctx.render_children(child)?;
        render_backrefs(definition, label, references, ctx)?;
        ctx.writer().close_tag("p")?;
        ctx.writer().line()?;
    }
    if !last.is_some_and(|node| matches!(node.value(), NodeValue::Paragraph)) {
        render_backrefs(definition, label, references, ctx)?;
        ctx.writer().line()?;
    }

    ctx.writer().close_tag("li")?;
    ctx.writer().line()?;
    Ok(())
}

fn render_backrefs(
    definition: NodeRef<'_>,
    label: &str,
    references: usize,
    ctx: &mut RenderContext<'_>,
) -> Result<(), RenderError> {
    for occurrence in 1..=references {
        ctx.writer().raw(" ")?;
        let backref = Attributes::new()
            .with("href", format!("#{}", reference_id(label, occurrence)))
            .with("class", "footnote-backref");
        ctx.tag(definition, "a", &backref)?;
        ctx.writer().raw("\u{21a9}")?;
        ctx.writer().close_tag("a")?;
    }
    Ok(())
}

impl HtmlNodeRenderer for FootnoteRenderer {
    fn node_types(&self) -> Vec<NodeType> {
        vec![NodeType::FootnoteReference, NodeType::FootnoteDefinition]
    }

    fn before_root(&self, root: NodeRef<'_>, _ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        let state = FootnoteState::collect(root);
        tracing::debug!(footnotes = state.order.len(), "Collected footnotes");
        *self.state.borrow_mut() = state;
        Ok(())
    }

    fn render(&self, node: NodeRef<'_>, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        match node.value() {
            NodeValue::FootnoteReference { label } => self.render_reference(node, label, ctx),
            // Emitted in after_root.
            _ => Ok(()),
        }
    }

    fn after_root(&self, root: NodeRef<'_>, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        let entries: Vec<(String, usize)> = {
            let state = self.state.borrow();
            state
                .order
                .iter()
                .map(|label| (label.clone(), state.references.get(label).copied().unwrap_or(0)))
                .collect()
        };
        if entries.is_empty() {
            return Ok(());
        }

        let mut definitions: HashMap<&str, NodeRef<'_>> = HashMap::new();
        for node in root.descendants() {
            if let NodeValue::FootnoteDefinition { label } = node.value() {
                definitions.entry(label.as_str()).or_insert(node);
            }
        }

        ctx.writer().line()?;
        ctx.tag(root, "section", &Attributes::new().with("class", "footnotes"))?;
        ctx.writer().line()?;
        ctx.tag(root, "ol", &Attributes::new())?;
        ctx.writer().line()?;
        for (label, references) in &entries {
            if let Some(definition) = definitions.get(label.as_str()) {
                render_definition(*definition, label, *references, ctx)?;
            }
        }
        ctx.writer().close_tag("ol")?;
        ctx.writer().line()?;
        ctx.writer().close_tag("section")?;
        ctx.writer().line()?;
        Ok(())
    }
}
