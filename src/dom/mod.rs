//! Host platform.
//!
//! A small in-process document model standing in for the browser: a node
//! arena with documents, elements, text and shadow roots; DOM events with
//! bubbling, composed paths and retargeting; and a custom element registry
//! that drives [`Lifecycle`](crate::engine::lifecycle::Lifecycle) callbacks.
//!
//! All state is thread-local. Tests call [`reset_dom`] to start clean.

mod events;
mod registry;
mod tree;

pub use events::{
    Event, EventHandler, ListenerId, add_event_handler, add_event_listener, dispatch_event, listener_count,
    listener_count_for, remove_event_listener,
};
pub use registry::{Constructor, define, defined_names, is_defined, is_valid_custom_element_name};
pub use tree::{
    NodeId, NodeType, add_class, adopt_node, append_child, assigned_nodes, attach_shadow, attribute_names, body,
    children, class_list, composed_text, contains, create_document, create_element, create_element_in, create_text,
    create_text_in, descendants, document, exists, find_by_tag, find_by_tag_deep, get_attribute, get_element_by_id,
    has_attribute, has_class, head, host, insert_before, is_connected, lifecycle, next_sibling, node_type,
    owner_document, parent, property, property_names, release, remove, remove_attribute, remove_class, reset_dom,
    set_attribute, set_property, set_text, set_text_content, shadow_including_descendants, shadow_root, tag_name,
    text, text_content, toggle_class,
};

pub(crate) use tree::shadow_root_any;
