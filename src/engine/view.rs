//! Declarative view trees and the reconciler.
//!
//! Render functions return a [`View`]; [`reconcile`] patches a root node's
//! children to match it. Matching is positional: a child is kept when it has
//! the same kind (and tag), otherwise it is replaced.
//!
//! Attributes and listeners set through a view are remembered per node, so
//! a later render that drops them removes exactly those and leaves anything
//! else (classes toggled by hooks, for instance) alone.
//!
//! # Example
//!
//! ```ignore
//! use cosmos_elements::engine::view::{el, View};
//!
//! let view: View = el("button")
//!     .class("cosmos-address")
//!     .attr("title", full)
//!     .on("click", move |_| copy())
//!     .child(trimmed)
//!     .into();
//! reconcile(root, &view);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::{trace, warn};

use super::cell::PropValue;
use super::component::set_prop;
use crate::dom::{self, Event, EventHandler, ListenerId, NodeId, NodeType};

// =============================================================================
// View Tree
// =============================================================================

/// Output of a render function.
#[derive(Clone, Default)]
pub enum View {
    #[default]
    Empty,
    Text(String),
    Element(ElementView),
    Fragment(Vec<View>),
}

/// An element in a view tree. Built with [`el`].
#[derive(Clone)]
pub struct ElementView {
    tag: String,
    attrs: Vec<(String, String)>,
    classes: Vec<String>,
    props: Vec<(String, PropValue)>,
    listeners: Vec<(String, EventHandler)>,
    children: Vec<View>,
}

pub fn el(tag: &str) -> ElementView {
    ElementView {
        tag: tag.to_ascii_lowercase(),
        attrs: Vec::new(),
        classes: Vec::new(),
        props: Vec::new(),
        listeners: Vec::new(),
        children: Vec::new(),
    }
}

pub fn text(content: impl Into<String>) -> View {
    View::Text(content.into())
}

pub fn fragment(children: impl IntoIterator<Item = View>) -> View {
    View::Fragment(children.into_iter().collect())
}

impl ElementView {
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Set the attribute only when `value` is `Some`.
    pub fn attr_opt(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add `class` when `on` holds.
    pub fn class_if(self, class: impl Into<String>, on: bool) -> Self {
        if on { self.class(class) } else { self }
    }

    /// Property assignment, forwarded to components as a JS property.
    pub fn prop(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.props.push((name.to_string(), value.into()));
        self
    }

    pub fn on(mut self, event_type: &str, handler: impl Fn(&Event) + 'static) -> Self {
        self.listeners.push((event_type.to_string(), std::rc::Rc::new(handler)));
        self
    }

    pub fn child(mut self, child: impl Into<View>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = View>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    fn resolved_attrs(&self) -> Vec<(String, String)> {
        let mut attrs = self.attrs.clone();
        if !self.classes.is_empty() {
            let mut classes: Vec<String> = Vec::new();
            if let Some((_, existing)) = attrs.iter().find(|(n, _)| n == "class") {
                classes.extend(existing.split_whitespace().map(str::to_string));
            }
            classes.extend(self.classes.iter().cloned());
            attrs.retain(|(n, _)| n != "class");
            attrs.push(("class".to_string(), classes.join(" ")));
        }
        attrs
    }
}

impl From<ElementView> for View {
    fn from(element: ElementView) -> Self {
        View::Element(element)
    }
}

impl From<&str> for View {
    fn from(s: &str) -> Self {
        View::Text(s.to_string())
    }
}

impl From<String> for View {
    fn from(s: String) -> Self {
        View::Text(s)
    }
}

impl From<Vec<View>> for View {
    fn from(children: Vec<View>) -> Self {
        View::Fragment(children)
    }
}

impl<T: Into<View>> From<Option<T>> for View {
    fn from(view: Option<T>) -> Self {
        view.map(Into::into).unwrap_or(View::Empty)
    }
}

// =============================================================================
// Reconciler
// =============================================================================

#[derive(Default)]
struct Managed {
    attrs: Vec<String>,
    classes: Vec<String>,
    listeners: Vec<ListenerId>,
}

thread_local! {
    /// What each view-created node got from its view, for the next patch.
    static MANAGED: RefCell<HashMap<NodeId, Managed>> = RefCell::new(HashMap::new());
}

enum Leaf<'a> {
    Text(&'a str),
    Element(&'a ElementView),
}

fn flatten<'a>(view: &'a View, out: &mut Vec<Leaf<'a>>) {
    match view {
        View::Empty => {}
        View::Text(s) => out.push(Leaf::Text(s)),
        View::Element(e) => out.push(Leaf::Element(e)),
        View::Fragment(items) => {
            for item in items {
                flatten(item, out);
            }
        }
    }
}

/// Make the children of `root` match `view`.
pub fn reconcile(root: NodeId, view: &View) {
    let Some(doc) = dom::owner_document(root) else {
        return;
    };
    let mut leaves = Vec::new();
    flatten(view, &mut leaves);

    let existing = dom::children(root);
    for (index, leaf) in leaves.iter().enumerate() {
        let current = existing.get(index).copied();
        match current {
            Some(node) if compatible(node, leaf) => patch(node, leaf),
            _ => {
                let node = create(doc, leaf);
                if let Err(err) = dom::insert_before(root, node, current) {
                    warn!(?root, error = %err, "failed to insert rendered node");
                    continue;
                }
                if let Some(old) = current {
                    discard(old);
                }
            }
        }
    }
    for stale in existing.into_iter().skip(leaves.len()) {
        discard(stale);
    }
}

fn compatible(node: NodeId, leaf: &Leaf<'_>) -> bool {
    match leaf {
        Leaf::Text(_) => dom::node_type(node) == Some(NodeType::Text),
        Leaf::Element(e) => dom::tag_name(node).as_deref() == Some(e.tag.as_str()),
    }
}

fn create(doc: NodeId, leaf: &Leaf<'_>) -> NodeId {
    match leaf {
        Leaf::Text(s) => dom::create_text_in(doc, s),
        Leaf::Element(e) => {
            let node = dom::create_element_in(doc, &e.tag);
            trace!(?node, tag = %e.tag, "rendered element created");
            patch(node, leaf);
            node
        }
    }
}

fn patch(node: NodeId, leaf: &Leaf<'_>) {
    let element = match leaf {
        Leaf::Text(s) => {
            if dom::text(node).as_deref() != Some(*s) {
                dom::set_text(node, s);
            }
            return;
        }
        Leaf::Element(e) => *e,
    };

    let previous = MANAGED.with(|m| m.borrow_mut().remove(&node)).unwrap_or_default();
    let attrs = element.resolved_attrs();
    let classes: Vec<String> = attrs
        .iter()
        .find(|(n, _)| n == "class")
        .map(|(_, v)| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    // Only the classes this view added are ours to remove.
    for class in &previous.classes {
        if !classes.contains(class) {
            dom::remove_class(node, class);
        }
    }
    for name in &previous.attrs {
        if name != "class" && !attrs.iter().any(|(n, _)| n == name) {
            dom::remove_attribute(node, name);
        }
    }
    for class in &classes {
        dom::add_class(node, class);
    }
    for (name, value) in &attrs {
        if name == "class" {
            continue;
        }
        if dom::get_attribute(node, name).as_deref() != Some(value.as_str()) {
            dom::set_attribute(node, name, value);
        }
    }

    for id in previous.listeners {
        dom::remove_event_listener(node, id);
    }
    let listeners = element
        .listeners
        .iter()
        .map(|(event_type, handler)| dom::add_event_handler(node, event_type, handler.clone()))
        .collect();

    for (name, value) in &element.props {
        set_prop(node, name, value.clone());
    }

    let managed = Managed {
        attrs: attrs.iter().map(|(n, _)| n.clone()).collect(),
        classes,
        listeners,
    };
    MANAGED.with(|m| m.borrow_mut().insert(node, managed));

    reconcile(node, &View::Fragment(element.children.clone()));
}

fn discard(node: NodeId) {
    let doomed = dom::shadow_including_descendants(node);
    MANAGED.with(|m| {
        let mut m = m.borrow_mut();
        for id in &doomed {
            m.remove(id);
        }
    });
    dom::release(node);
}

// =============================================================================
// Tests
// =============================================================================
