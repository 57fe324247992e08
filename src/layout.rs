//! # Layout tree formatting
//!
//! A page's content is a recursive `{row|col|components}` tree. Formatting
//! preserves the row/col structure and rewrites every component leaf through
//! a visitor, producing a [`ContentNode`] tree parameterized over the leaf
//! type. The same walk underlies both uses in the build: binding data and
//! detecting chunking at section-expansion time, and instantiating live
//! components when a page's content is realized.

use crate::model::{ComponentSpec, LayoutNode};

/// A formatted content tree with leaves of type `T`.
#[derive(Debug, Clone)]
pub enum ContentNode<T> {
    Row(Vec<ContentNode<T>>),
    Col(Vec<ContentNode<T>>),
    Items(Vec<T>),
}

/// Rewrite one layout node, applying `visit` to every component descriptor.
pub fn format<T, E>(
    node: &LayoutNode,
    visit: &mut impl FnMut(&ComponentSpec) -> Result<T, E>,
) -> Result<ContentNode<T>, E> {
    match node {
        LayoutNode::Row(children) => Ok(ContentNode::Row(format_all(children, visit)?)),
        LayoutNode::Col(children) => Ok(ContentNode::Col(format_all(children, visit)?)),
        LayoutNode::Components(specs) => {
            Ok(ContentNode::Items(specs.iter().map(visit).collect::<Result<_, _>>()?))
        }
    }
}

/// Rewrite a list of sibling layout nodes.
pub fn format_all<T, E>(
    nodes: &[LayoutNode],
    visit: &mut impl FnMut(&ComponentSpec) -> Result<T, E>,
) -> Result<Vec<ContentNode<T>>, E> {
    nodes.iter().map(|node| format(node, visit)).collect()
}

impl<T> ContentNode<T> {
    /// Rewrite the leaves, keeping the row/col structure.
    pub fn map<U>(&self, f: &mut impl FnMut(&T) -> U) -> ContentNode<U> {
        match self {
            ContentNode::Row(children) => {
                ContentNode::Row(children.iter().map(|c| c.map(f)).collect())
            }
            ContentNode::Col(children) => {
                ContentNode::Col(children.iter().map(|c| c.map(f)).collect())
            }
            ContentNode::Items(items) => ContentNode::Items(items.iter().map(|i| f(i)).collect()),
        }
    }

    /// All leaves, in document order.
    pub fn items(&self) -> Vec<&T> {
        let mut collected = Vec::new();
        self.collect_items(&mut collected);
        collected
    }

    fn collect_items<'a>(&'a self, into: &mut Vec<&'a T>) {
        match self {
            ContentNode::Row(children) | ContentNode::Col(children) => {
                for child in children {
                    child.collect_items(into);
                }
            }
            ContentNode::Items(items) => into.extend(items.iter()),
        }
    }
}
