//! Owned XHTML markup tree.
//!
//! [`MarkupDocument`] is what the builder produces and the writer serializes.
//! Every [`Element`] owns its children directly; there are no parent links.
//!
//! - [`parse`](MarkupDocument::parse): well-formed markup text → tree (used for templates)
//! - [`serialize`](MarkupDocument::serialize): tree → normalized XML text

mod parse;
mod serialize;
mod validate;

pub use serialize::{SerializeOptions, normalize_declaration};

use crate::document::ContentNode;

/// XHTML namespace URI.
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// A node in the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    fn is_element_named(&self, name: &str) -> bool {
        matches!(self, Node::Element(el) if el.local_name() == name)
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl From<&ContentNode> for Node {
    fn from(node: &ContentNode) -> Self {
        match node {
            ContentNode::Element {
                name,
                attributes,
                children,
            } => Node::Element(Element {
                name: name.clone(),
                attributes: attributes.clone(),
                children: children.iter().map(Node::from).collect(),
            }),
            ContentNode::Text { text } => Node::Text(text.clone()),
            ContentNode::Comment { text } => Node::Comment(text.clone()),
        }
    }
}

/// An element with ordered attributes and owned children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written (may carry a prefix).
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Name without namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Depth-first search for the first element with the given local name,
    /// starting with `self`.
    pub fn find_first(&self, name: &str) -> Option<&Element> {
        if self.local_name() == name {
            return Some(self);
        }
        self.child_elements().find_map(|el| el.find_first(name))
    }

    pub fn find_first_mut(&mut self, name: &str) -> Option<&mut Element> {
        if self.local_name() == name {
            return Some(self);
        }
        for child in &mut self.children {
            if let Node::Element(el) = child
                && let Some(found) = el.find_first_mut(name)
            {
                return Some(found);
            }
        }
        None
    }

    /// Depth-first search for the first element whose `id` attribute matches.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.attribute("id") == Some(id) {
            return Some(self);
        }
        self.child_elements().find_map(|el| el.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.attribute("id") == Some(id) {
            return Some(self);
        }
        for child in &mut self.children {
            if let Node::Element(el) = child
                && let Some(found) = el.find_by_id_mut(id)
            {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Count elements with the given local name in this subtree, `self` included.
    pub fn count_elements(&self, name: &str) -> usize {
        let own = usize::from(self.local_name() == name);
        own + self
            .child_elements()
            .map(|el| el.count_elements(name))
            .sum::<usize>()
    }

    /// Remove every direct child element with the given local name.
    ///
    /// Returns the index of the first removed child, if any.
    pub fn remove_children_named(&mut self, name: &str) -> Option<usize> {
        let first = self.children.iter().position(|n| n.is_element_named(name));
        self.children.retain(|n| !n.is_element_named(name));
        first
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(inner) => collect_text(inner, out),
            Node::Comment(_) | Node::ProcessingInstruction(_) => {}
        }
    }
}

pub(crate) fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// A complete XHTML document ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupDocument {
    /// DOCTYPE content (the part after `<!DOCTYPE `), if any.
    pub doctype: Option<String>,
    pub root: Element,
}

impl MarkupDocument {
    pub fn new(root: Element) -> Self {
        Self {
            doctype: None,
            root,
        }
    }

    /// Text of the `head/title` element, if present.
    pub fn title(&self) -> Option<String> {
        self.root
            .find_first("head")
            .and_then(|head| head.find_first("title"))
            .map(Element::text_content)
    }

    pub fn count_elements(&self, name: &str) -> usize {
        self.root.count_elements(name)
    }
}
