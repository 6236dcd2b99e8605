//! HTML attributes and the attribute provider chain.
//!
//! Every tag the renderers emit passes its attributes through the configured
//! [`AttributeProvider`]s before it is written. Providers run in registration
//! order on a shared working set, so a later provider sees (and may override)
//! whatever earlier providers did.

use indexmap::IndexMap;
use indexmap::map::Iter;

use cmark_ast::NodeRef;

use crate::context::FactoryContext;

/// Insertion-ordered attribute set.
///
/// Inserting an existing key replaces its value but keeps its position, so the
/// rendered attribute order is stable no matter how many providers touch a key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes(IndexMap<String, String>);

impl Attributes {
    /// Create an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite an attribute, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Remove an attribute, preserving the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> Iter<'_, String, String> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

/// Adds, changes or removes attributes of rendered tags.
///
/// A provider is created fresh for every render call (see
/// [`AttributeProviderFactory`]), so it may keep per-document state such as
/// counters without leaking it into the next render.
///
/// # Example
///
/// ```
/// use cmark_ast::{NodeRef, NodeValue};
/// use cmark_html::{AttributeProvider, Attributes};
///
/// struct ImageBorder;
///
/// impl AttributeProvider for ImageBorder {
///     fn set_attributes(&mut self, node: NodeRef<'_>, _tag_name: &str, attributes: &mut Attributes) {
///         if let NodeValue::Image { .. } = node.value() {
///             attributes.insert("class", "border");
///         }
///     }
/// }
/// ```
pub trait AttributeProvider {
    /// Adjust `attributes` for the tag `tag_name` emitted for `node`.
    ///
    /// A single node may produce several tags (`pre` and `code` for a code
    /// block); `tag_name` tells them apart.
    fn set_attributes(&mut self, node: NodeRef<'_>, tag_name: &str, attributes: &mut Attributes);
}

impl<F> AttributeProvider for F
where
    F: FnMut(NodeRef<'_>, &str, &mut Attributes),
{
    fn set_attributes(&mut self, node: NodeRef<'_>, tag_name: &str, attributes: &mut Attributes) {
        self(node, tag_name, attributes);
    }
}

/// Blueprint producing a fresh [`AttributeProvider`] for each render call.
pub trait AttributeProviderFactory: Send + Sync {
    fn create(&self, context: &FactoryContext<'_>) -> Box<dyn AttributeProvider>;
}

/// Adapts a closure returning a provider into an [`AttributeProviderFactory`].
pub(crate) struct FnAttributeProviderFactory<F>(pub(crate) F);

impl<F, P> AttributeProviderFactory for FnAttributeProviderFactory<F>
where
    F: Fn(&FactoryContext<'_>) -> P + Send + Sync,
    P: AttributeProvider + 'static,
{
    fn create(&self, context: &FactoryContext<'_>) -> Box<dyn AttributeProvider> {
        Box::new((self.0)(context))
    }
}

/// The per-render chain of attribute providers.
pub(crate) struct AttributePipeline {
    providers: Vec<Box<dyn AttributeProvider>>,
}

impl AttributePipeline {
    pub(crate) fn new(providers: Vec<Box<dyn AttributeProvider>>) -> Self {
        Self { providers }
    }

    pub(crate) fn len(&self) -> usize {
        self.providers.len()
    }

    /// Run every provider over a copy of `base` and return the result.
    pub(crate) fn extend(&mut self, node: NodeRef<'_>, tag_name: &str, base: &Attributes) -> Attributes {
        let mut attributes = base.clone();
        for provider in &mut self.providers {
            provider.set_attributes(node, tag_name, &mut attributes);
        }
        attributes
    }
}
