//! Overlay containers.
//!
//! Toasts, tooltips and modals each live in one shared container element
//! appended to the document body. The container is found by element id and
//! created on first use, so asking twice never yields two containers.
//!
//! # Example
//!
//! ```ignore
//! use cosmos_elements::state::containers::{get_or_create_container, TOAST_CONTAINER_ID};
//!
//! let a = get_or_create_container(TOAST_CONTAINER_ID)?;
//! let b = get_or_create_container(TOAST_CONTAINER_ID)?;
//! assert_eq!(a, b);
//! ```

use tracing::debug;

use crate::dom::{self, NodeId};
use crate::error::DomError;

pub const TOAST_CONTAINER_ID: &str = "cosmos-toast-container";
pub const TOOLTIP_CONTAINER_ID: &str = "tooltip-container";
pub const MODAL_CONTAINER_ID: &str = "modal-container";

/// Return the container with `id` in the default document, creating it at
/// the end of `<body>` if missing.
pub fn get_or_create_container(id: &str) -> Result<NodeId, DomError> {
    get_or_create_container_in(dom::document(), id)
}

pub fn get_or_create_container_in(doc: NodeId, id: &str) -> Result<NodeId, DomError> {
    if let Some(existing) = dom::get_element_by_id(doc, id) {
        return Ok(existing);
    }
    let body = dom::body(doc).ok_or(DomError::UnknownNode(doc))?;
    let container = dom::create_element_in(doc, "div");
    dom::set_attribute(container, "id", id);
    dom::append_child(body, container)?;
    debug!(id, "overlay container created");
    Ok(container)
}

/// Container lookup without creating one.
pub fn container(id: &str) -> Option<NodeId> {
    dom::get_element_by_id(dom::document(), id)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        dom::reset_dom();
    }

    #[test]
    fn test_container_is_singleton() {
        setup();
        assert!(container(TOAST_CONTAINER_ID).is_none());

        let a = get_or_create_container(TOAST_CONTAINER_ID).unwrap();
        let b = get_or_create_container(TOAST_CONTAINER_ID).unwrap();
        assert_eq!(a, b);

        let body = dom::body(dom::document()).unwrap();
        let count = dom::children(body)
            .into_iter()
            .filter(|c| dom::get_attribute(*c, "id").as_deref() == Some(TOAST_CONTAINER_ID))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_containers_are_keyed_by_id() {
        setup();
        let toast = get_or_create_container(TOAST_CONTAINER_ID).unwrap();
        let modal = get_or_create_container(MODAL_CONTAINER_ID).unwrap();
        assert_ne!(toast, modal);
        assert_eq!(container(MODAL_CONTAINER_ID), Some(modal));
    }
}
