//! Document: the shared handle to one element tree

use std::sync::{Arc, Mutex};

use crate::dom::node::{ElementId, NodeData};
use crate::dom::selector::Selector;

/// Cheap-clone handle to an element tree
///
/// Every operation locks the tree briefly and releases it before returning;
/// no lock is ever held across a user callback, so event handlers and fade
/// completions may freely mutate the document they were triggered from.
#[derive(Clone)]
pub struct Document {
    tree: Arc<Mutex<DomTree>>,
}

struct DomTree {
    nodes: Vec<NodeData>,
    body: ElementId,
    focused: Option<ElementId>,
}

impl DomTree {
    fn node(&self, el: ElementId) -> &NodeData {
        &self.nodes[el.0]
    }

    fn node_mut(&mut self, el: ElementId) -> &mut NodeData {
        &mut self.nodes[el.0]
    }

    fn detach(&mut self, el: ElementId) {
        if let Some(parent) = self.node(el).parent {
            self.node_mut(parent).children.retain(|&c| c != el);
        }
        self.node_mut(el).parent = None;
    }

    fn is_ancestor(&self, ancestor: ElementId, el: ElementId) -> bool {
        let mut cursor = Some(el);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node(current).parent;
        }
        false
    }

    /// Depth-first walk of the subtree below `root`, root excluded
    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.node(root).children.iter().rev().copied().collect();
        while let Some(el) = stack.pop() {
            out.push(el);
            stack.extend(self.node(el).children.iter().rev().copied());
        }
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document seeded with a `body` root
    pub fn new() -> Self {
        let body = NodeData::new("body");
        Self {
            tree: Arc::new(Mutex::new(DomTree {
                nodes: vec![body],
                body: ElementId(0),
                focused: None,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DomTree> {
        // Lock poisoning only happens after a panic mid-mutation; recover
        // with whatever state is there rather than cascading the panic.
        self.tree.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn body(&self) -> ElementId {
        self.lock().body
    }

    /// Create a detached element
    pub fn create_element(&self, tag: &str) -> ElementId {
        let mut tree = self.lock();
        let id = ElementId(tree.nodes.len());
        tree.nodes.push(NodeData::new(tag));
        id
    }

    pub fn append_child(&self, parent: ElementId, child: ElementId) {
        let mut tree = self.lock();
        if tree.is_ancestor(child, parent) {
            return; // would create a cycle
        }
        tree.detach(child);
        tree.node_mut(parent).children.push(child);
        tree.node_mut(child).parent = Some(parent);
    }

    /// Insert `new` as the next sibling of `reference`
    pub fn insert_after(&self, new: ElementId, reference: ElementId) {
        let mut tree = self.lock();
        let Some(parent) = tree.node(reference).parent else {
            return;
        };
        if tree.is_ancestor(new, parent) {
            return;
        }
        tree.detach(new);
        let index = tree
            .node(parent)
            .children
            .iter()
            .position(|&c| c == reference)
            .map(|i| i + 1)
            .unwrap_or(tree.node(parent).children.len());
        tree.node_mut(parent).children.insert(index, new);
        tree.node_mut(new).parent = Some(parent);
    }

    /// Detach an element (and its subtree) from the document
    ///
    /// The id stays valid; the subtree is simply no longer reachable from
    /// `body`, so attached-only queries skip it.
    pub fn remove(&self, el: ElementId) {
        self.lock().detach(el);
    }

    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.lock().node(el).parent
    }

    pub fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.lock().node(el).children.clone()
    }

    pub fn contains(&self, ancestor: ElementId, el: ElementId) -> bool {
        self.lock().is_ancestor(ancestor, el)
    }

    /// True when the element is reachable from `body`
    pub fn is_attached(&self, el: ElementId) -> bool {
        let tree = self.lock();
        tree.is_ancestor(tree.body, el)
    }

    /// Ancestor chain from the element itself up to the root
    pub fn ancestor_path(&self, el: ElementId) -> Vec<ElementId> {
        let tree = self.lock();
        let mut path = Vec::new();
        let mut cursor = Some(el);
        while let Some(current) = cursor {
            path.push(current);
            cursor = tree.node(current).parent;
        }
        path
    }

    pub fn tag_name(&self, el: ElementId) -> String {
        self.lock().node(el).tag.clone()
    }

    pub fn set_text(&self, el: ElementId, text: &str) {
        self.lock().node_mut(el).text = text.to_string();
    }

    pub fn text(&self, el: ElementId) -> String {
        self.lock().node(el).text.clone()
    }

    // Attributes

    pub fn set_attribute(&self, el: ElementId, name: &str, value: &str) {
        self.lock()
            .node_mut(el)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn get_attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.lock().node(el).attributes.get(name).cloned()
    }

    pub fn has_attribute(&self, el: ElementId, name: &str) -> bool {
        self.lock().node(el).attributes.contains_key(name)
    }

    pub fn remove_attribute(&self, el: ElementId, name: &str) {
        self.lock().node_mut(el).attributes.remove(name);
    }

    // Classes

    pub fn add_class(&self, el: ElementId, class: &str) {
        self.lock().node_mut(el).add_class(class);
    }

    pub fn remove_class(&self, el: ElementId, class: &str) {
        self.lock().node_mut(el).remove_class(class);
    }

    pub fn toggle_class(&self, el: ElementId, class: &str, force: Option<bool>) {
        let mut tree = self.lock();
        let node = tree.node_mut(el);
        let on = force.unwrap_or(!node.has_class(class));
        if on {
            node.add_class(class);
        } else {
            node.remove_class(class);
        }
    }

    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.lock().node(el).has_class(class)
    }

    pub fn class_list(&self, el: ElementId) -> Vec<String> {
        self.lock().node(el).classes.clone()
    }

    // Inline styles

    pub fn set_style(&self, el: ElementId, property: &str, value: &str) {
        self.lock().node_mut(el).styles.set(property, value);
    }

    pub fn style(&self, el: ElementId, property: &str) -> Option<String> {
        self.lock().node(el).styles.get(property).map(str::to_string)
    }

    pub fn remove_style(&self, el: ElementId, property: &str) {
        self.lock().node_mut(el).styles.remove(property);
    }

    pub fn opacity(&self, el: ElementId) -> f32 {
        self.lock().node(el).styles.opacity()
    }

    /// Visible means attached and free of `display: none` on self or any
    /// ancestor
    pub fn is_visible(&self, el: ElementId) -> bool {
        let tree = self.lock();
        if !tree.is_ancestor(tree.body, el) {
            return false;
        }
        let mut cursor = Some(el);
        while let Some(current) = cursor {
            if tree.node(current).styles.display() == Some("none") {
                return false;
            }
            cursor = tree.node(current).parent;
        }
        true
    }

    // Focus

    pub fn focus(&self, el: ElementId) {
        self.lock().focused = Some(el);
    }

    pub fn blur(&self, el: ElementId) {
        let mut tree = self.lock();
        if tree.focused == Some(el) {
            tree.focused = None;
        }
    }

    pub fn active_element(&self) -> Option<ElementId> {
        self.lock().focused
    }

    // Queries (attached subtree only)

    pub fn get_element_by_id(&self, id: &str) -> Option<ElementId> {
        let tree = self.lock();
        let body = tree.body;
        if tree.node(body).id_attr() == Some(id) {
            return Some(body);
        }
        tree.descendants(body)
            .into_iter()
            .find(|&el| tree.node(el).id_attr() == Some(id))
    }

    /// First descendant of `root` matching the selector, document order
    pub fn query_selector(&self, root: ElementId, selector: &str) -> Option<ElementId> {
        let selector = Selector::parse(selector);
        let tree = self.lock();
        tree.descendants(root)
            .into_iter()
            .find(|&el| selector.matches_node(tree.node(el)))
    }

    pub fn query_selector_all(&self, root: ElementId, selector: &str) -> Vec<ElementId> {
        let selector = Selector::parse(selector);
        let tree = self.lock();
        tree.descendants(root)
            .into_iter()
            .filter(|&el| selector.matches_node(tree.node(el)))
            .collect()
    }

    pub fn matches(&self, el: ElementId, selector: &str) -> bool {
        let selector = Selector::parse(selector);
        self.matches_parsed(el, &selector)
    }

    pub(crate) fn matches_parsed(&self, el: ElementId, selector: &Selector) -> bool {
        selector.matches_node(self.lock().node(el))
    }

    /// Nearest ancestor (self included) matching the selector, stopping at
    /// `boundary` inclusively when one is given
    pub fn closest(
        &self,
        el: ElementId,
        selector: &str,
        boundary: Option<ElementId>,
    ) -> Option<ElementId> {
        let selector = Selector::parse(selector);
        self.closest_parsed(el, &selector, boundary)
    }

    pub(crate) fn closest_parsed(
        &self,
        el: ElementId,
        selector: &Selector,
        boundary: Option<ElementId>,
    ) -> Option<ElementId> {
        let tree = self.lock();
        let mut cursor = Some(el);
        while let Some(current) = cursor {
            if selector.matches_node(tree.node(current)) {
                return Some(current);
            }
            if boundary == Some(current) {
                return None;
            }
            cursor = tree.node(current).parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, ElementId, ElementId, ElementId) {
        let doc = Document::new();
        let card = doc.create_element("div");
        doc.add_class(card, "cl-card");
        doc.append_child(doc.body(), card);

        let body_section = doc.create_element("div");
        doc.add_class(body_section, "cl-card-body");
        doc.append_child(card, body_section);

        let link = doc.create_element("a");
        doc.set_attribute(link, "data-cl-toggle", "collapse");
        doc.append_child(body_section, link);

        (doc, card, body_section, link)
    }

    #[test]
    fn query_selector_finds_first_match_in_document_order() {
        let (doc, card, body_section, link) = sample();

        assert_eq!(doc.query_selector(doc.body(), ".cl-card"), Some(card));
        assert_eq!(doc.query_selector(card, ".cl-card-body"), Some(body_section));
        assert_eq!(
            doc.query_selector(doc.body(), "[data-cl-toggle=\"collapse\"]"),
            Some(link)
        );
        assert_eq!(doc.query_selector(doc.body(), ".cl-modal"), None);
    }

    #[test]
    fn closest_walks_up_and_respects_boundary() {
        let (doc, card, body_section, link) = sample();

        assert_eq!(doc.closest(link, ".cl-card", None), Some(card));
        assert_eq!(doc.closest(link, "a", None), Some(link));
        assert_eq!(doc.closest(link, ".cl-card", Some(body_section)), None);
    }

    #[test]
    fn removed_subtrees_are_skipped_by_queries() {
        let (doc, card, _, link) = sample();

        doc.remove(card);
        assert!(!doc.is_attached(link));
        assert_eq!(doc.query_selector(doc.body(), ".cl-card"), None);
        // Handles stay valid after detach
        assert_eq!(doc.tag_name(link), "a");
    }

    #[test]
    fn get_element_by_id_searches_attached_tree() {
        let (doc, card, _, _) = sample();
        doc.set_attribute(card, "id", "profile");

        assert_eq!(doc.get_element_by_id("profile"), Some(card));
        doc.remove(card);
        assert_eq!(doc.get_element_by_id("profile"), None);
    }

    #[test]
    fn visibility_follows_display_through_ancestors() {
        let (doc, card, body_section, link) = sample();

        assert!(doc.is_visible(link));
        doc.set_style(card, "display", "none");
        assert!(!doc.is_visible(link));
        assert!(!doc.is_visible(body_section));
        doc.remove_style(card, "display");
        assert!(doc.is_visible(link));
    }

    #[test]
    fn toggle_class_honors_force() {
        let (doc, card, _, _) = sample();
        doc.toggle_class(card, "cl-show", None);
        assert!(doc.has_class(card, "cl-show"));
        doc.toggle_class(card, "cl-show", Some(true));
        assert!(doc.has_class(card, "cl-show"));
        doc.toggle_class(card, "cl-show", None);
        assert!(!doc.has_class(card, "cl-show"));
    }
}
