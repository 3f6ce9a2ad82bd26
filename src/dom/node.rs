//! Node storage for the element tree

use std::collections::HashMap;

use crate::dom::style::StyleMap;

/// Handle to an element in a [`Document`](crate::dom::Document)
///
/// Ids are arena indices and are never reused within a document, so a stale
/// handle can never alias a newer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Data for a single element node
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    /// Lowercased tag name
    pub tag: String,
    /// Class names in insertion order, no duplicates
    pub classes: Vec<String>,
    /// Attribute map; the `id` attribute lives here too
    pub attributes: HashMap<String, String>,
    /// Inline styles
    pub styles: StyleMap,
    /// Text content of this node (children excluded)
    pub text: String,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
}

impl NodeData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            attributes: HashMap::new(),
            styles: StyleMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id_attr(&self) -> Option<&str> {
        self.attributes.get("id").map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }
}
