//! DOM events.
//!
//! Listeners are stored per node. [`dispatch_event`] computes the event path
//! once (stopping at the shadow root unless the event is `COMPOSED`), then
//! invokes listeners from the target outward. Non-bubbling events are still
//! delivered to shadow hosts along a composed path, since the host is the
//! retargeted target there.
//!
//! # Example
//!
//! ```ignore
//! use cosmos_elements::dom::{self, Event};
//! use cosmos_elements::types::EventFlags;
//!
//! let id = dom::add_event_listener(button, "click", |e| println!("{:?}", e.target()));
//! dom::dispatch_event(button, Event::new("click", EventFlags::BUBBLES));
//! dom::remove_event_listener(button, id);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::tree::{NodeId, node_mut, node_ref};
use crate::types::EventFlags;
use crate::value::Value;

// =============================================================================
// Event
// =============================================================================

/// An event in flight. Handlers receive it by shared reference; the
/// propagation flags use interior mutability.
pub struct Event {
    event_type: String,
    detail: Value,
    flags: EventFlags,
    target: Cell<Option<NodeId>>,
    current_target: Cell<Option<NodeId>>,
    path: RefCell<Vec<NodeId>>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    pub fn new(event_type: impl Into<String>, flags: EventFlags) -> Self {
        Self::custom(event_type, Value::Undefined, flags)
    }

    /// Event carrying a payload.
    pub fn custom(event_type: impl Into<String>, detail: Value, flags: EventFlags) -> Self {
        Self {
            event_type: event_type.into(),
            detail,
            flags,
            target: Cell::new(None),
            current_target: Cell::new(None),
            path: RefCell::new(Vec::new()),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn detail(&self) -> &Value {
        &self.detail
    }

    pub fn flags(&self) -> EventFlags {
        self.flags
    }

    /// Target as seen from the current listener.
    pub fn target(&self) -> Option<NodeId> {
        self.target.get()
    }

    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target.get()
    }

    /// Nodes the event travels through, target first.
    pub fn composed_path(&self) -> Vec<NodeId> {
        self.path.borrow().clone()
    }

    /// Only honored for `CANCELABLE` events.
    pub fn prevent_default(&self) {
        if self.flags.contains(EventFlags::CANCELABLE) {
            self.default_prevented.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Finish the current node, then stop.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("type", &self.event_type)
            .field("detail", &self.detail)
            .field("flags", &self.flags)
            .field("target", &self.target.get())
            .finish()
    }
}

// =============================================================================
// Listeners
// =============================================================================

pub type EventHandler = Rc<dyn Fn(&Event)>;

/// Handle returned by [`add_event_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub(crate) struct Listener {
    id: ListenerId,
    event_type: String,
    handler: EventHandler,
}

thread_local! {
    static NEXT_LISTENER_ID: Cell<u64> = const { Cell::new(1) };
}

pub fn add_event_listener(node: NodeId, event_type: &str, handler: impl Fn(&Event) + 'static) -> ListenerId {
    add_event_handler(node, event_type, Rc::new(handler))
}

/// Register an already shared handler.
pub fn add_event_handler(node: NodeId, event_type: &str, handler: EventHandler) -> ListenerId {
    let id = NEXT_LISTENER_ID.with(|n| {
        let id = n.get();
        n.set(id + 1);
        ListenerId(id)
    });
    node_mut(node, |d| {
        d.listeners.push(Listener {
            id,
            event_type: event_type.to_string(),
            handler,
        })
    });
    id
}

/// Returns whether the listener was registered on `node`.
pub fn remove_event_listener(node: NodeId, id: ListenerId) -> bool {
    node_mut(node, |d| {
        let before = d.listeners.len();
        d.listeners.retain(|l| l.id != id);
        d.listeners.len() != before
    })
    .unwrap_or(false)
}

/// Number of listeners on `node`, for all event types.
pub fn listener_count(node: NodeId) -> usize {
    node_ref(node, |d| d.listeners.len()).unwrap_or(0)
}

/// Number of listeners on `node` for one event type.
pub fn listener_count_for(node: NodeId, event_type: &str) -> usize {
    node_ref(node, |d| d.listeners.iter().filter(|l| l.event_type == event_type).count()).unwrap_or(0)
}

fn is_registered(node: NodeId, id: ListenerId) -> bool {
    node_ref(node, |d| d.listeners.iter().any(|l| l.id == id)).unwrap_or(false)
}

// =============================================================================
// Dispatch
// =============================================================================

/// Path entries paired with the target as seen from each node.
fn event_path(target: NodeId, composed: bool) -> Vec<(NodeId, NodeId)> {
    let mut path = Vec::new();
    let mut seen = target;
    let mut current = Some(target);
    while let Some(id) = current {
        path.push((id, seen));
        let Some((parent, host)) = node_ref(id, |d| (d.parent_id(), d.host_of_root())) else {
            break;
        };
        current = match (parent, host) {
            (Some(parent), _) => Some(parent),
            (None, Some(host)) if composed => {
                seen = host;
                Some(host)
            }
            _ => None,
        };
    }
    path
}

/// Dispatch `event` at `target` and return it once propagation is done.
pub fn dispatch_event(target: NodeId, event: Event) -> Event {
    let path = event_path(target, event.flags.contains(EventFlags::COMPOSED));
    *event.path.borrow_mut() = path.iter().map(|(node, _)| *node).collect();
    let bubbles = event.flags.contains(EventFlags::BUBBLES);

    for (node, seen) in path {
        if node != seen && !bubbles {
            continue;
        }
        event.target.set(Some(seen));
        event.current_target.set(Some(node));

        let snapshot: Vec<(ListenerId, EventHandler)> = node_ref(node, |d| {
            d.listeners
                .iter()
                .filter(|l| l.event_type == event.event_type)
                .map(|l| (l.id, l.handler.clone()))
                .collect()
        })
        .unwrap_or_default();

        for (id, handler) in snapshot {
            if is_registered(node, id) {
                handler(&event);
            }
        }
        if event.propagation_stopped.get() {
            break;
        }
    }

    event.current_target.set(None);
    event.target.set(Some(target));
    event
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{append_child, attach_shadow, create_element, reset_dom};
    use crate::types::ShadowMode;

    fn setup() {
        reset_dom();
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Rc<dyn Fn(&Event)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        let make = move |label: &str| {
            let l = l.clone();
            let label = label.to_string();
            Rc::new(move |e: &Event| {
                l.borrow_mut().push(format!("{label}:{:?}", e.target().map(|t| t.index())));
            }) as Rc<dyn Fn(&Event)>
        };
        (log, make)
    }

    #[test]
    fn test_bubbling_and_non_bubbling() {
        setup();
        let parent = create_element("div");
        let child = create_element("span");
        append_child(parent, child).unwrap();
        let (log, make) = recorder();
        add_event_handler(parent, "ping", make("parent"));
        add_event_handler(child, "ping", make("child"));

        dispatch_event(child, Event::new("ping", EventFlags::empty()));
        assert_eq!(log.borrow().len(), 1);

        dispatch_event(child, Event::new("ping", EventFlags::BUBBLES));
        assert_eq!(log.borrow().len(), 3);
        assert!(log.borrow()[2].starts_with("parent"));
    }

    #[test]
    fn test_shadow_boundary_and_retargeting() {
        setup();
        let outer = create_element("div");
        let host = create_element("x-host");
        append_child(outer, host).unwrap();
        let root = attach_shadow(host, ShadowMode::Open).unwrap();
        let inner = create_element("button");
        append_child(root, inner).unwrap();

        let (log, make) = recorder();
        add_event_handler(outer, "ping", make("outer"));
        add_event_handler(host, "ping", make("host"));

        dispatch_event(inner, Event::new("ping", EventFlags::BUBBLES));
        assert!(log.borrow().is_empty());

        let event = dispatch_event(inner, Event::new("ping", EventFlags::BUBBLES | EventFlags::COMPOSED));
        let host_index = host.index();
        assert_eq!(
            *log.borrow(),
            vec![format!("host:Some({host_index})"), format!("outer:Some({host_index})")]
        );
        assert_eq!(event.composed_path(), vec![inner, root, host, outer]);
    }

    #[test]
    fn test_composed_non_bubbling_reaches_host_only() {
        setup();
        let outer = create_element("div");
        let host = create_element("x-host");
        append_child(outer, host).unwrap();
        let root = attach_shadow(host, ShadowMode::Open).unwrap();
        let inner = create_element("button");
        append_child(root, inner).unwrap();

        let (log, make) = recorder();
        add_event_handler(outer, "ping", make("outer"));
        add_event_handler(host, "ping", make("host"));
        dispatch_event(inner, Event::new("ping", EventFlags::COMPOSED));
        assert_eq!(log.borrow().len(), 1);
        assert!(log.borrow()[0].starts_with("host"));
    }

    #[test]
    fn test_stop_propagation_and_prevent_default() {
        setup();
        let parent = create_element("div");
        let child = create_element("span");
        append_child(parent, child).unwrap();
        let reached = Rc::new(Cell::new(false));
        let r = reached.clone();
        add_event_listener(parent, "go", move |_| r.set(true));
        add_event_listener(child, "go", |e| {
            e.prevent_default();
            e.stop_propagation();
        });

        let event = dispatch_event(child, Event::new("go", EventFlags::BUBBLES | EventFlags::CANCELABLE));
        assert!(!reached.get());
        assert!(event.default_prevented());

        let event = dispatch_event(child, Event::new("go", EventFlags::BUBBLES));
        assert!(!event.default_prevented());
    }

    #[test]
    fn test_listener_removed_during_dispatch_is_skipped() {
        setup();
        let node = create_element("div");
        let calls = Rc::new(Cell::new(0));
        let second: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
        let s = second.clone();
        add_event_listener(node, "x", move |_| {
            if let Some(id) = s.get() {
                remove_event_listener(node, id);
            }
        });
        let c = calls.clone();
        second.set(Some(add_event_listener(node, "x", move |_| c.set(c.get() + 1))));

        dispatch_event(node, Event::new("x", EventFlags::empty()));
        assert_eq!(calls.get(), 0);
        assert_eq!(listener_count(node), 1);
    }
}
