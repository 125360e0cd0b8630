//! In-memory [`Document`] implementation.
//!
//! A small arena-backed element tree with just enough behaviour for the
//! widget runtime: ids, classes, attributes, inline styles, text, scroll
//! geometry and a log of listeners and window events. Cloning shares the
//! tree, so a caller can hand one clone to a controller and inspect the page
//! through another.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{Document, PageListener, split_classes};
use crate::scroll::ScrollMetrics;

/// Handle to an element in a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    scroll: ScrollMetrics,
}

#[derive(Debug)]
struct Page {
    nodes: Vec<Node>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    viewport_width: f64,
    window_events: Vec<String>,
    listeners: Vec<PageListener>,
}

impl Page {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node {
            tag: tag.to_string(),
            ..Default::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    fn is_attached(&self, mut id: NodeId) -> bool {
        loop {
            if id == self.root {
                return true;
            }
            match self.node(id).parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn attached(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|id| self.is_attached(*id))
    }
}

/// Shared in-memory page.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    page: Rc<RefCell<Page>>,
}

impl MemoryDocument {
    /// Create an empty `<html><head/><body/></html>` page.
    pub fn new(viewport_width: f64) -> Self {
        let mut page = Page {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            viewport_width,
            window_events: Vec::new(),
            listeners: Vec::new(),
        };
        let root = page.push("html");
        let head = page.push("head");
        let body = page.push("body");
        page.node_mut(head).parent = Some(root);
        page.node_mut(body).parent = Some(root);
        page.node_mut(root).children = vec![head, body];
        page.root = root;
        page.head = head;
        page.body = body;
        Self {
            page: Rc::new(RefCell::new(page)),
        }
    }

    pub fn set_viewport_width(&self, width: f64) {
        self.page.borrow_mut().viewport_width = width;
    }

    /// Set the scroll geometry reported for `element`.
    pub fn set_scroll_metrics(&self, element: NodeId, metrics: ScrollMetrics) {
        self.page.borrow_mut().node_mut(element).scroll = metrics;
    }

    /// Number of attached elements with the given id.
    pub fn count_by_id(&self, id: &str) -> usize {
        let page = self.page.borrow();
        page.attached()
            .filter(|n| page.node(*n).id.as_deref() == Some(id))
            .count()
    }

    /// Number of attached elements carrying `class`.
    pub fn count_by_class(&self, class: &str) -> usize {
        let page = self.page.borrow();
        page.attached()
            .filter(|n| page.node(*n).classes.iter().any(|c| c == class))
            .count()
    }

    pub fn tag(&self, element: NodeId) -> String {
        self.page.borrow().node(element).tag.clone()
    }

    pub fn attribute(&self, element: NodeId, name: &str) -> Option<String> {
        self.page.borrow().node(element).attributes.get(name).cloned()
    }

    pub fn style(&self, element: NodeId, property: &str) -> Option<String> {
        self.page.borrow().node(element).styles.get(property).cloned()
    }

    pub fn text(&self, element: NodeId) -> String {
        self.page.borrow().node(element).text.clone()
    }

    pub fn classes(&self, element: NodeId) -> Vec<String> {
        self.page.borrow().node(element).classes.clone()
    }

    pub fn children(&self, element: NodeId) -> Vec<NodeId> {
        self.page.borrow().node(element).children.clone()
    }

    pub fn parent(&self, element: NodeId) -> Option<NodeId> {
        self.page.borrow().node(element).parent
    }

    /// Window events dispatched so far, oldest first.
    pub fn window_events(&self) -> Vec<String> {
        self.page.borrow().window_events.clone()
    }

    /// Listeners registered so far, in registration order.
    pub fn listeners(&self) -> Vec<PageListener> {
        self.page.borrow().listeners.clone()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new(1280.0)
    }
}

impl Document for MemoryDocument {
    type Element = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let page = self.page.borrow();
        page.attached()
            .find(|n| page.node(*n).id.as_deref() == Some(id))
    }

    fn first_by_class(&self, class: &str) -> Option<NodeId> {
        let page = self.page.borrow();
        page.attached()
            .find(|n| page.node(*n).classes.iter().any(|c| c == class))
    }

    fn create_element(&self, tag: &str) -> Option<NodeId> {
        Some(self.page.borrow_mut().push(tag))
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.page.borrow().body)
    }

    fn head(&self) -> Option<NodeId> {
        Some(self.page.borrow().head)
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        let mut page = self.page.borrow_mut();
        if let Some(old) = page.node(*child).parent {
            page.node_mut(old).children.retain(|c| c != child);
        }
        page.node_mut(*child).parent = Some(*parent);
        page.node_mut(*parent).children.push(*child);
    }

    fn set_id(&self, element: &NodeId, id: &str) {
        self.page.borrow_mut().node_mut(*element).id = Some(id.to_string());
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) {
        let mut page = self.page.borrow_mut();
        let node = page.node_mut(*element);
        // A whole-style assignment replaces the inline declarations.
        if name == "style" {
            node.styles.clear();
            for decl in value.split(';') {
                if let Some((prop, val)) = decl.split_once(':') {
                    node.styles
                        .insert(prop.trim().to_string(), val.trim().to_string());
                }
            }
        }
        node.attributes.insert(name.to_string(), value.to_string());
    }

    fn set_style(&self, element: &NodeId, property: &str, value: &str) {
        let mut page = self.page.borrow_mut();
        let styles = &mut page.node_mut(*element).styles;
        if value.is_empty() {
            styles.remove(property);
        } else {
            styles.insert(property.to_string(), value.to_string());
        }
    }

    fn set_text(&self, element: &NodeId, text: &str) {
        self.page.borrow_mut().node_mut(*element).text = text.to_string();
    }

    fn add_class(&self, element: &NodeId, classes: &str) {
        let mut page = self.page.borrow_mut();
        let node = page.node_mut(*element);
        for class in split_classes(classes) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&self, element: &NodeId, class: &str) {
        self.page
            .borrow_mut()
            .node_mut(*element)
            .classes
            .retain(|c| c != class);
    }

    fn toggle_class(&self, element: &NodeId, class: &str) {
        if self.has_class(element, class) {
            self.remove_class(element, class);
        } else {
            self.add_class(element, class);
        }
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.page
            .borrow()
            .node(*element)
            .classes
            .iter()
            .any(|c| c == class)
    }

    fn scroll_metrics(&self, element: &NodeId) -> ScrollMetrics {
        self.page.borrow().node(*element).scroll
    }

    fn viewport_width(&self) -> f64 {
        self.page.borrow().viewport_width
    }

    fn dispatch_window_event(&self, name: &str) {
        self.page.borrow_mut().window_events.push(name.to_string());
    }

    fn listen(&self, listener: PageListener) {
        self.page.borrow_mut().listeners.push(listener);
    }
}
