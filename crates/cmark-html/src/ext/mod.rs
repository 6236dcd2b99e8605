//! Bundled extensions.
//!
//! Each extension configures both sides of the pipeline: the parser options
//! that make `pulldown-cmark` emit the extension's nodes, and the renderers or
//! attribute providers that turn those nodes into HTML.

mod footnotes;
mod heading_anchor;
mod strikethrough;
mod tables;
mod task_list;

use cmark_ast::ParserExtension;

use crate::renderer::HtmlRendererExtension;

pub use footnotes::FootnotesExtension;
pub use heading_anchor::HeadingAnchorExtension;
pub use strikethrough::StrikethroughExtension;
pub use tables::TablesExtension;
pub use task_list::TaskListItemsExtension;

/// Extension usable on both the parser and the renderer.
pub trait Extension: HtmlRendererExtension + ParserExtension {
    /// Name used to enable the extension from configuration.
    fn name(&self) -> &'static str;
}

/// Names accepted by [`by_name`].
pub const EXTENSION_NAMES: [&str; 5] = [
    StrikethroughExtension::NAME,
    TablesExtension::NAME,
    TaskListItemsExtension::NAME,
    FootnotesExtension::NAME,
    HeadingAnchorExtension::NAME,
];

/// Look up a bundled extension with default settings.
#[must_use]
pub fn by_name(name: &str) -> Option<Box<dyn Extension>> {
    let extension: Box<dyn Extension> = match name {
        StrikethroughExtension::NAME => Box::new(StrikethroughExtension),
        TablesExtension::NAME => Box::new(TablesExtension),
        TaskListItemsExtension::NAME => Box::new(TaskListItemsExtension),
        FootnotesExtension::NAME => Box::new(FootnotesExtension),
        HeadingAnchorExtension::NAME => Box::new(HeadingAnchorExtension::new()),
        _ => return None,
    };
    Some(extension)
}
