//! Node arena.
//!
//! Every node lives in a thread-local arena and is addressed by a [`NodeId`].
//! Ids are never reused until [`reset_dom`] is called, so a stale id simply
//! stops resolving after its node is released.
//!
//! Structural operations run custom element reactions the way a browser
//! does: removing a connected subtree calls `on_unmount`, inserting into a
//! connected parent calls `on_mount`, and moving a node between documents
//! calls `on_adopt`. Reactions walk the shadow-including tree in order.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use tracing::trace;

use super::events::Listener;
use super::registry;
use crate::engine::cell::PropValue;
use crate::engine::lifecycle::Lifecycle;
use crate::error::DomError;
use crate::types::ShadowMode;

// =============================================================================
// Node Ids
// =============================================================================

/// Handle to a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Public node classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Document,
    Element,
    Text,
    ShadowRoot,
}

// =============================================================================
// Node Storage
// =============================================================================

enum NodeKind {
    Document,
    Element { tag: String },
    Text { data: String },
    ShadowRoot { mode: ShadowMode },
}

pub(crate) struct NodeData {
    kind: NodeKind,
    owner: Option<NodeId>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<(String, String)>,
    shadow_root: Option<NodeId>,
    host: Option<NodeId>,
    pub(crate) listeners: Vec<Listener>,
    properties: BTreeMap<String, PropValue>,
    lifecycle: Option<Rc<dyn Lifecycle>>,
}

impl NodeData {
    fn new(kind: NodeKind, owner: Option<NodeId>) -> Self {
        Self {
            kind,
            owner,
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            shadow_root: None,
            host: None,
            listeners: Vec::new(),
            properties: BTreeMap::new(),
            lifecycle: None,
        }
    }

    fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Document => NodeType::Document,
            NodeKind::Element { .. } => NodeType::Element,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::ShadowRoot { .. } => NodeType::ShadowRoot,
        }
    }

    fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }

    pub(crate) fn parent_id(&self) -> Option<NodeId> {
        self.parent
    }

    /// Host element when this node is a shadow root.
    pub(crate) fn host_of_root(&self) -> Option<NodeId> {
        self.host
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Node slots, indexed by [`NodeId`].
///
/// [`reset_dom`] and [`release`] drop nodes while the thread is alive, which
/// lets mounted components stop their effects. When the thread itself exits
/// the signals runtime may already be gone, so the arena's own destructor
/// leaks lifecycles instead of tearing them down.
struct Arena(Vec<Option<NodeData>>);

impl Deref for Arena {
    type Target = Vec<Option<NodeData>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Arena {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        for node in self.0.drain(..).flatten() {
            if let Some(lifecycle) = node.lifecycle {
                std::mem::forget(lifecycle);
            }
        }
    }
}

thread_local! {
    static NODES: RefCell<Arena> = const { RefCell::new(Arena(Vec::new())) };

    /// Lazily created default document.
    static DEFAULT_DOCUMENT: Cell<Option<NodeId>> = const { Cell::new(None) };
}

fn alloc(data: NodeData) -> NodeId {
    NODES.with(|nodes| {
        let mut nodes = nodes.borrow_mut();
        nodes.push(Some(data));
        NodeId(nodes.len() - 1)
    })
}

pub(crate) fn node_ref<R>(id: NodeId, f: impl FnOnce(&NodeData) -> R) -> Option<R> {
    NODES.with(|nodes| nodes.borrow().get(id.0).and_then(Option::as_ref).map(f))
}

pub(crate) fn node_mut<R>(id: NodeId, f: impl FnOnce(&mut NodeData) -> R) -> Option<R> {
    NODES.with(|nodes| nodes.borrow_mut().get_mut(id.0).and_then(Option::as_mut).map(f))
}

/// Every live element with the given tag, in allocation order.
pub(crate) fn elements_with_tag(tag: &str) -> Vec<NodeId> {
    NODES.with(|nodes| {
        nodes
            .borrow()
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().filter(|d| d.tag() == Some(tag)).map(|_| NodeId(i)))
            .collect()
    })
}

pub(crate) fn set_lifecycle(id: NodeId, lifecycle: Rc<dyn Lifecycle>) {
    node_mut(id, |d| d.lifecycle = Some(lifecycle));
}

/// Drop every node and registered custom element. Intended for tests.
pub fn reset_dom() {
    let old = NODES.with(|nodes| std::mem::take(&mut nodes.borrow_mut().0));
    DEFAULT_DOCUMENT.with(|d| d.set(None));
    registry::reset_registry();
    drop(old);
}

// =============================================================================
// Documents
// =============================================================================

/// The default document, created on first use.
pub fn document() -> NodeId {
    if let Some(doc) = DEFAULT_DOCUMENT.with(Cell::get) {
        if exists(doc) {
            return doc;
        }
    }
    let doc = create_document();
    DEFAULT_DOCUMENT.with(|d| d.set(Some(doc)));
    doc
}

/// A new empty document with `html`, `head` and `body`.
pub fn create_document() -> NodeId {
    let doc = alloc(NodeData::new(NodeKind::Document, None));
    let html = raw_element(doc, "html");
    let head = raw_element(doc, "head");
    let body = raw_element(doc, "body");
    link(doc, html);
    link(html, head);
    link(html, body);
    doc
}

fn raw_element(doc: NodeId, tag: &str) -> NodeId {
    alloc(NodeData::new(NodeKind::Element { tag: tag.to_string() }, Some(doc)))
}

fn link(parent: NodeId, child: NodeId) {
    node_mut(parent, |d| d.children.push(child));
    node_mut(child, |d| d.parent = Some(parent));
}

fn document_element_child(doc: NodeId, tag: &str) -> Option<NodeId> {
    let html = children(doc).into_iter().find(|c| tag_name(*c).as_deref() == Some("html"))?;
    children(html).into_iter().find(|c| tag_name(*c).as_deref() == Some(tag))
}

pub fn head(doc: NodeId) -> Option<NodeId> {
    document_element_child(doc, "head")
}

pub fn body(doc: NodeId) -> Option<NodeId> {
    document_element_child(doc, "body")
}

/// Document a node belongs to. A document is its own owner.
pub fn owner_document(id: NodeId) -> Option<NodeId> {
    node_ref(id, |d| match d.kind {
        NodeKind::Document => Some(id),
        _ => d.owner,
    })
    .flatten()
}

// =============================================================================
// Node Creation
// =============================================================================

/// Create an element in the default document.
pub fn create_element(tag: &str) -> NodeId {
    create_element_in(document(), tag)
}

/// Create an element owned by `doc`. Defined custom elements are upgraded
/// immediately.
pub fn create_element_in(doc: NodeId, tag: &str) -> NodeId {
    let tag = tag.to_ascii_lowercase();
    let id = raw_element(doc, &tag);
    trace!(?id, tag = %tag, "element created");
    if let Some(ctor) = registry::lookup(&tag) {
        registry::upgrade(id, &ctor);
    }
    id
}

pub fn create_text(data: &str) -> NodeId {
    create_text_in(document(), data)
}

pub fn create_text_in(doc: NodeId, data: &str) -> NodeId {
    alloc(NodeData::new(NodeKind::Text { data: data.to_string() }, Some(doc)))
}

// =============================================================================
// Node Queries
// =============================================================================

pub fn exists(id: NodeId) -> bool {
    node_ref(id, |_| ()).is_some()
}

pub fn node_type(id: NodeId) -> Option<NodeType> {
    node_ref(id, NodeData::node_type)
}

/// Lowercase tag name of an element.
pub fn tag_name(id: NodeId) -> Option<String> {
    node_ref(id, |d| d.tag().map(str::to_string)).flatten()
}

pub fn parent(id: NodeId) -> Option<NodeId> {
    node_ref(id, |d| d.parent).flatten()
}

pub fn children(id: NodeId) -> Vec<NodeId> {
    node_ref(id, |d| d.children.clone()).unwrap_or_default()
}

pub fn next_sibling(id: NodeId) -> Option<NodeId> {
    let parent = parent(id)?;
    node_ref(parent, |d| {
        let pos = d.children.iter().position(|c| *c == id)?;
        d.children.get(pos + 1).copied()
    })
    .flatten()
}

/// Lifecycle bound to an upgraded custom element.
pub fn lifecycle(id: NodeId) -> Option<Rc<dyn Lifecycle>> {
    node_ref(id, |d| d.lifecycle.clone()).flatten()
}

/// Whether the node is in a document, crossing shadow roots to their hosts.
pub fn is_connected(id: NodeId) -> bool {
    let mut current = id;
    loop {
        let Some((is_document, next)) = node_ref(current, |d| {
            (matches!(d.kind, NodeKind::Document), d.parent.or(d.host))
        }) else {
            return false;
        };
        if is_document {
            return true;
        }
        match next {
            Some(next) => current = next,
            None => return false,
        }
    }
}

/// Light-tree inclusive containment.
pub fn contains(ancestor: NodeId, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        current = parent(id);
    }
    false
}

fn shadow_including_contains(ancestor: NodeId, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        current = node_ref(id, |d| d.parent.or(d.host)).flatten();
    }
    false
}

/// `root` and everything below it, including shadow trees, in tree order.
pub fn shadow_including_descendants(root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let Some((shadow, kids)) = node_ref(id, |d| (d.shadow_root, d.children.clone())) else {
            continue;
        };
        out.push(id);
        stack.extend(kids.iter().rev());
        if let Some(shadow) = shadow {
            stack.push(shadow);
        }
    }
    out
}

/// Light-tree descendants of `root`, excluding `root`, in tree order.
pub fn descendants(root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = children(root).into_iter().rev().collect();
    while let Some(id) = stack.pop() {
        out.push(id);
        stack.extend(children(id).into_iter().rev());
    }
    out
}

/// Light-tree elements below `root` with the given tag.
pub fn find_by_tag(root: NodeId, tag: &str) -> Vec<NodeId> {
    descendants(root)
        .into_iter()
        .filter(|id| tag_name(*id).as_deref() == Some(tag))
        .collect()
}

/// Like [`find_by_tag`] but also searches shadow trees.
pub fn find_by_tag_deep(root: NodeId, tag: &str) -> Vec<NodeId> {
    shadow_including_descendants(root)
        .into_iter()
        .filter(|id| *id != root && tag_name(*id).as_deref() == Some(tag))
        .collect()
}

/// First light-tree element below `root` whose `id` attribute matches.
pub fn get_element_by_id(root: NodeId, element_id: &str) -> Option<NodeId> {
    descendants(root)
        .into_iter()
        .find(|id| get_attribute(*id, "id").as_deref() == Some(element_id))
}

// =============================================================================
// Text
// =============================================================================

/// Data of a text node.
pub fn text(id: NodeId) -> Option<String> {
    node_ref(id, |d| match &d.kind {
        NodeKind::Text { data } => Some(data.clone()),
        _ => None,
    })
    .flatten()
}

/// Replace the data of a text node. No effect on other nodes.
pub fn set_text(id: NodeId, data: &str) {
    node_mut(id, |d| {
        if let NodeKind::Text { data: current } = &mut d.kind {
            *current = data.to_string();
        }
    });
}

/// Concatenated light-tree text.
pub fn text_content(id: NodeId) -> String {
    if let Some(data) = text(id) {
        return data;
    }
    descendants(id).into_iter().filter_map(text).collect()
}

/// Replace all children of an element with a single text node.
pub fn set_text_content(id: NodeId, data: &str) -> Result<(), DomError> {
    if text(id).is_some() {
        set_text(id, data);
        return Ok(());
    }
    for child in children(id) {
        release(child);
    }
    if !data.is_empty() {
        let doc = owner_document(id).ok_or(DomError::UnknownNode(id))?;
        let text = create_text_in(doc, data);
        append_child(id, text)?;
    }
    Ok(())
}

/// Text as rendered: shadow trees replace their host's children and slots
/// show the host children assigned to them.
pub fn composed_text(id: NodeId) -> String {
    let mut out = String::new();
    push_composed_text(id, &mut out);
    out
}

fn push_composed_text(id: NodeId, out: &mut String) {
    if let Some(data) = text(id) {
        out.push_str(&data);
        return;
    }
    if let Some(shadow) = node_ref(id, |d| d.shadow_root).flatten() {
        for child in children(shadow) {
            push_composed_text(child, out);
        }
        return;
    }
    if tag_name(id).as_deref() == Some("slot") {
        if let Some(host) = containing_host(id) {
            let assigned = assigned_nodes(host, get_attribute(id, "name").as_deref());
            if !assigned.is_empty() {
                for node in assigned {
                    push_composed_text(node, out);
                }
                return;
            }
        }
    }
    for child in children(id) {
        push_composed_text(child, out);
    }
}

fn containing_host(id: NodeId) -> Option<NodeId> {
    let mut current = id;
    loop {
        let (parent, host) = node_ref(current, |d| (d.parent, d.host))?;
        if host.is_some() {
            return host;
        }
        current = parent?;
    }
}

/// Light children of `host` that go into the slot named `slot` (`None` is
/// the default slot).
pub fn assigned_nodes(host: NodeId, slot: Option<&str>) -> Vec<NodeId> {
    children(host)
        .into_iter()
        .filter(|child| {
            let child_slot = get_attribute(*child, "slot");
            match slot {
                Some(name) => child_slot.as_deref() == Some(name),
                None => child_slot.is_none(),
            }
        })
        .collect()
}

// =============================================================================
// Tree Mutation
// =============================================================================

/// Insert `child` into `parent` before `reference` (or at the end).
///
/// The child is first removed from its current parent and adopted into the
/// parent's document if needed.
pub fn insert_before(parent: NodeId, child: NodeId, reference: Option<NodeId>) -> Result<(), DomError> {
    let parent_type = node_type(parent).ok_or(DomError::UnknownNode(parent))?;
    let child_type = node_type(child).ok_or(DomError::UnknownNode(child))?;

    if parent_type == NodeType::Text
        || matches!(child_type, NodeType::Document | NodeType::ShadowRoot)
        || shadow_including_contains(child, parent)
    {
        return Err(DomError::HierarchyRequest { parent, child });
    }
    if let Some(r) = reference {
        if self::parent(r) != Some(parent) {
            return Err(DomError::NotAChild(r));
        }
    }
    let reference = if reference == Some(child) {
        next_sibling(child)
    } else {
        reference
    };

    remove(child);

    if let (Some(old_doc), Some(new_doc)) = (owner_document(child), owner_document(parent)) {
        if old_doc != new_doc {
            adopt_subtree(child, old_doc, new_doc);
        }
    }

    node_mut(parent, |d| {
        let index = reference
            .and_then(|r| d.children.iter().position(|c| *c == r))
            .unwrap_or(d.children.len());
        d.children.insert(index, child);
    });
    node_mut(child, |d| d.parent = Some(parent));

    if is_connected(parent) {
        run_connected_reactions(child);
    }
    Ok(())
}

pub fn append_child(parent: NodeId, child: NodeId) -> Result<(), DomError> {
    insert_before(parent, child, None)
}

/// Detach a node from its parent. No effect on detached nodes.
pub fn remove(id: NodeId) {
    let Some(parent) = parent(id) else {
        return;
    };
    let was_connected = is_connected(id);
    node_mut(parent, |d| d.children.retain(|c| *c != id));
    node_mut(id, |d| d.parent = None);
    if was_connected {
        run_disconnected_reactions(id);
    }
}

/// Remove a node and free it and its shadow-including subtree.
pub fn release(id: NodeId) {
    remove(id);
    let doomed = shadow_including_descendants(id);
    let freed: Vec<NodeData> = NODES.with(|nodes| {
        let mut nodes = nodes.borrow_mut();
        doomed
            .iter()
            .filter_map(|n| nodes.get_mut(n.0).and_then(Option::take))
            .collect()
    });
    trace!(?id, count = freed.len(), "nodes released");
    drop(freed);
}

/// Move `node` into `doc`, detaching it first.
pub fn adopt_node(doc: NodeId, node: NodeId) -> Result<(), DomError> {
    match node_type(node) {
        None => return Err(DomError::UnknownNode(node)),
        Some(NodeType::Document | NodeType::ShadowRoot) => {
            return Err(DomError::HierarchyRequest { parent: doc, child: node });
        }
        Some(_) => {}
    }
    if node_type(doc) != Some(NodeType::Document) {
        return Err(DomError::HierarchyRequest { parent: doc, child: node });
    }
    remove(node);
    if let Some(old_doc) = owner_document(node) {
        if old_doc != doc {
            adopt_subtree(node, old_doc, doc);
        }
    }
    Ok(())
}

fn adopt_subtree(root: NodeId, old_doc: NodeId, new_doc: NodeId) {
    let nodes = shadow_including_descendants(root);
    for id in &nodes {
        node_mut(*id, |d| d.owner = Some(new_doc));
    }
    for (_, lifecycle) in lifecycles_of(&nodes) {
        lifecycle.on_adopt(old_doc, new_doc);
    }
}

fn lifecycles_of(nodes: &[NodeId]) -> Vec<(NodeId, Rc<dyn Lifecycle>)> {
    nodes
        .iter()
        .filter_map(|id| lifecycle(*id).map(|lc| (*id, lc)))
        .collect()
}

fn run_connected_reactions(root: NodeId) {
    for (id, lifecycle) in lifecycles_of(&shadow_including_descendants(root)) {
        if is_connected(id) {
            lifecycle.on_mount();
        }
    }
}

fn run_disconnected_reactions(root: NodeId) {
    for (id, lifecycle) in lifecycles_of(&shadow_including_descendants(root)) {
        if !is_connected(id) {
            lifecycle.on_unmount();
        }
    }
}

// =============================================================================
// Attributes
// =============================================================================

pub fn get_attribute(id: NodeId, name: &str) -> Option<String> {
    let name = name.to_ascii_lowercase();
    node_ref(id, |d| d.attr(&name).map(str::to_string)).flatten()
}

pub fn has_attribute(id: NodeId, name: &str) -> bool {
    get_attribute(id, name).is_some()
}

/// Attribute names in insertion order.
pub fn attribute_names(id: NodeId) -> Vec<String> {
    node_ref(id, |d| d.attributes.iter().map(|(n, _)| n.clone()).collect()).unwrap_or_default()
}

/// Set an attribute on an element. Names are lowercased; non-elements are
/// ignored.
pub fn set_attribute(id: NodeId, name: &str, value: &str) {
    let name = name.to_ascii_lowercase();
    let old = node_mut(id, |d| {
        d.tag()?;
        let old = match d.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => Some(std::mem::replace(&mut entry.1, value.to_string())),
            None => {
                d.attributes.push((name.clone(), value.to_string()));
                None
            }
        };
        Some(old)
    })
    .flatten();
    if let Some(old) = old {
        notify_attribute_change(id, &name, old.as_deref(), Some(value));
    }
}

pub fn remove_attribute(id: NodeId, name: &str) {
    let name = name.to_ascii_lowercase();
    let old = node_mut(id, |d| {
        let pos = d.attributes.iter().position(|(n, _)| *n == name)?;
        Some(d.attributes.remove(pos).1)
    })
    .flatten();
    if let Some(old) = old {
        notify_attribute_change(id, &name, Some(&old), None);
    }
}

fn notify_attribute_change(id: NodeId, name: &str, old: Option<&str>, new: Option<&str>) {
    let Some(lifecycle) = lifecycle(id) else {
        return;
    };
    if lifecycle.observed_attributes().iter().any(|a| a == name) {
        lifecycle.on_attribute_change(name, old, new);
    }
}

// =============================================================================
// Properties
// =============================================================================

/// Store a script property on a node. Components read these when they
/// parse their attributes; see `engine::set_prop`.
pub fn set_property(id: NodeId, name: &str, value: PropValue) {
    node_mut(id, |d| d.properties.insert(name.to_string(), value));
}

pub fn property(id: NodeId, name: &str) -> Option<PropValue> {
    node_ref(id, |d| d.properties.get(name).cloned()).flatten()
}

pub fn property_names(id: NodeId) -> Vec<String> {
    node_ref(id, |d| d.properties.keys().cloned().collect()).unwrap_or_default()
}

// =============================================================================
// Class List
// =============================================================================

pub fn class_list(id: NodeId) -> Vec<String> {
    get_attribute(id, "class")
        .map(|c| c.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

pub fn has_class(id: NodeId, class: &str) -> bool {
    class_list(id).iter().any(|c| c == class)
}

pub fn add_class(id: NodeId, class: &str) {
    let mut classes = class_list(id);
    if !classes.iter().any(|c| c == class) {
        classes.push(class.to_string());
        set_attribute(id, "class", &classes.join(" "));
    }
}

pub fn remove_class(id: NodeId, class: &str) {
    let classes = class_list(id);
    if classes.iter().any(|c| c == class) {
        let kept: Vec<_> = classes.into_iter().filter(|c| c != class).collect();
        set_attribute(id, "class", &kept.join(" "));
    }
}

pub fn toggle_class(id: NodeId, class: &str, on: bool) {
    if on {
        add_class(id, class);
    } else {
        remove_class(id, class);
    }
}

// =============================================================================
// Shadow DOM
// =============================================================================

/// Attach a shadow root. `ShadowMode::None` attaches an open root.
pub fn attach_shadow(host: NodeId, mode: ShadowMode) -> Result<NodeId, DomError> {
    let (is_element, existing, owner) = node_ref(host, |d| (d.tag().is_some(), d.shadow_root, d.owner))
        .ok_or(DomError::UnknownNode(host))?;
    if !is_element {
        return Err(DomError::NotAnElement(host));
    }
    if existing.is_some() {
        return Err(DomError::ShadowRootExists(host));
    }
    let mode = if mode == ShadowMode::Closed {
        ShadowMode::Closed
    } else {
        ShadowMode::Open
    };
    let mut data = NodeData::new(NodeKind::ShadowRoot { mode }, owner);
    data.host = Some(host);
    let root = alloc(data);
    node_mut(host, |d| d.shadow_root = Some(root));
    Ok(root)
}

/// Open shadow root of `host`. Closed roots are hidden.
pub fn shadow_root(host: NodeId) -> Option<NodeId> {
    let root = shadow_root_any(host)?;
    let open = node_ref(root, |d| matches!(d.kind, NodeKind::ShadowRoot { mode: ShadowMode::Open }))?;
    open.then_some(root)
}

/// Shadow root of `host` regardless of mode.
pub(crate) fn shadow_root_any(host: NodeId) -> Option<NodeId> {
    node_ref(host, |d| d.shadow_root).flatten()
}

/// Host element of a shadow root.
pub fn host(shadow: NodeId) -> Option<NodeId> {
    node_ref(shadow, |d| d.host).flatten()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() {
        reset_dom();
    }

    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
        observed: Vec<String>,
    }

    impl Lifecycle for Recorder {
        fn observed_attributes(&self) -> &[String] {
            &self.observed
        }
        fn on_mount(&self) {
            self.log.borrow_mut().push("mount".into());
        }
        fn on_unmount(&self) {
            self.log.borrow_mut().push("unmount".into());
        }
        fn on_attribute_change(&self, name: &str, old: Option<&str>, new: Option<&str>) {
            self.log.borrow_mut().push(format!("attr {name} {old:?} {new:?}"));
        }
        fn on_adopt(&self, _old: NodeId, _new: NodeId) {
            self.log.borrow_mut().push("adopt".into());
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    fn recorded(id: NodeId) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        set_lifecycle(
            id,
            Rc::new(Recorder {
                log: log.clone(),
                observed: vec!["value".into()],
            }),
        );
        log
    }

    #[test]
    fn test_document_structure() {
        setup();
        let doc = document();
        assert_eq!(document(), doc);
        let head = head(doc).unwrap();
        let body = body(doc).unwrap();
        assert_eq!(tag_name(head).as_deref(), Some("head"));
        assert!(is_connected(body));
    }

    #[test]
    fn test_append_and_remove() {
        setup();
        let body = body(document()).unwrap();
        let div = create_element("DIV");
        assert_eq!(tag_name(div).as_deref(), Some("div"));
        assert!(!is_connected(div));

        append_child(body, div).unwrap();
        assert!(is_connected(div));
        assert_eq!(parent(div), Some(body));

        remove(div);
        assert!(!is_connected(div));
        assert!(children(body).is_empty());
    }

    #[test]
    fn test_insert_before_orders_children() {
        setup();
        let root = create_element("div");
        let a = create_text("a");
        let b = create_text("b");
        let c = create_text("c");
        append_child(root, a).unwrap();
        append_child(root, c).unwrap();
        insert_before(root, b, Some(c)).unwrap();
        assert_eq!(text_content(root), "abc");

        // moving an existing child
        insert_before(root, c, Some(a)).unwrap();
        assert_eq!(text_content(root), "cab");
    }

    #[test]
    fn test_hierarchy_errors() {
        setup();
        let a = create_element("div");
        let b = create_element("div");
        append_child(a, b).unwrap();
        assert_eq!(
            append_child(b, a),
            Err(DomError::HierarchyRequest { parent: b, child: a })
        );
        let stray = create_element("span");
        assert_eq!(insert_before(a, stray, Some(a)), Err(DomError::NotAChild(a)));
    }

    #[test]
    fn test_lifecycle_reactions_on_connect_and_disconnect() {
        setup();
        let body = body(document()).unwrap();
        let wrapper = create_element("div");
        let el = create_element("x-el");
        let log = recorded(el);

        append_child(wrapper, el).unwrap();
        assert!(log.borrow().is_empty());

        append_child(body, wrapper).unwrap();
        assert_eq!(*log.borrow(), vec!["mount"]);

        remove(wrapper);
        assert_eq!(*log.borrow(), vec!["mount", "unmount"]);
    }

    #[test]
    fn test_observed_attributes_only() {
        setup();
        let el = create_element("x-el");
        let log = recorded(el);
        set_attribute(el, "value", "1");
        set_attribute(el, "other", "2");
        set_attribute(el, "value", "3");
        remove_attribute(el, "value");
        assert_eq!(
            *log.borrow(),
            vec![
                "attr value None Some(\"1\")",
                "attr value Some(\"1\") Some(\"3\")",
                "attr value Some(\"3\") None",
            ]
        );
    }

    #[test]
    fn test_adoption_across_documents() {
        setup();
        let first = document();
        let second = create_document();
        let el = create_element_in(first, "x-el");
        let log = recorded(el);
        append_child(body(first).unwrap(), el).unwrap();

        append_child(body(second).unwrap(), el).unwrap();
        assert_eq!(owner_document(el), Some(second));
        assert_eq!(*log.borrow(), vec!["mount", "unmount", "adopt", "mount"]);
    }

    #[test]
    fn test_shadow_root_connection_and_modes() {
        setup();
        let body = body(document()).unwrap();
        let host = create_element("div");
        let root = attach_shadow(host, ShadowMode::Closed).unwrap();
        assert_eq!(attach_shadow(host, ShadowMode::Open), Err(DomError::ShadowRootExists(host)));
        assert_eq!(shadow_root(host), None);
        assert_eq!(shadow_root_any(host), Some(root));
        assert_eq!(self::host(root), Some(host));

        let inner = create_element("span");
        append_child(root, inner).unwrap();
        assert!(!is_connected(inner));
        append_child(body, host).unwrap();
        assert!(is_connected(inner));
    }

    #[test]
    fn test_composed_text_with_slots() {
        setup();
        let host = create_element("div");
        let root = attach_shadow(host, ShadowMode::Open).unwrap();
        let before = create_text("[");
        let slot = create_element("slot");
        let after = create_text("]");
        for n in [before, slot, after] {
            append_child(root, n).unwrap();
        }
        let fallback = create_text("empty");
        append_child(slot, fallback).unwrap();
        assert_eq!(composed_text(host), "[empty]");

        let light = create_text("content");
        append_child(host, light).unwrap();
        assert_eq!(composed_text(host), "[content]");
    }

    #[test]
    fn test_class_list() {
        setup();
        let el = create_element("div");
        add_class(el, "a");
        add_class(el, "b");
        add_class(el, "a");
        assert_eq!(get_attribute(el, "class").as_deref(), Some("a b"));
        remove_class(el, "a");
        assert!(!has_class(el, "a"));
        toggle_class(el, "c", true);
        assert_eq!(class_list(el), vec!["b", "c"]);
    }

    #[test]
    fn test_release_frees_subtree() {
        setup();
        let parent = create_element("div");
        let child = create_element("span");
        append_child(parent, child).unwrap();
        release(parent);
        assert!(!exists(parent));
        assert!(!exists(child));
    }

    #[test]
    fn test_get_element_by_id() {
        setup();
        let body = body(document()).unwrap();
        let el = create_element("div");
        set_attribute(el, "id", "target");
        append_child(body, el).unwrap();
        assert_eq!(get_element_by_id(document(), "target"), Some(el));
        assert_eq!(get_element_by_id(document(), "missing"), None);
    }
}
