//! Component lifecycle interface.
//!
//! The host platform drives custom elements through this trait: it calls
//! `on_mount` when an upgraded element becomes connected, `on_unmount` when
//! it is disconnected, `on_attribute_change` for observed attributes and
//! `on_adopt` when the element moves to another document.
//!
//! Callbacks are invoked with no host borrows held, so implementations may
//! freely mutate the tree.

use std::any::Any;

use crate::dom::NodeId;

pub trait Lifecycle: Any {
    /// Attribute names whose changes are reported.
    fn observed_attributes(&self) -> &[String] {
        &[]
    }

    fn on_mount(&self) {}

    fn on_attribute_change(&self, _name: &str, _old: Option<&str>, _new: Option<&str>) {}

    fn on_adopt(&self, _old_document: NodeId, _new_document: NodeId) {}

    fn on_unmount(&self) {}

    /// Downcast support for looking up the concrete implementation of a node.
    fn as_any(&self) -> &dyn Any;
}
