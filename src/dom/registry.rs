//! Custom element registry.
//!
//! Append-only for the life of the thread (until [`reset_registry`]): a tag
//! can be defined once and never undefined. Defining a tag upgrades every
//! existing element with that tag.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use super::tree::{NodeId, elements_with_tag, get_attribute, is_connected, lifecycle, set_lifecycle};
use crate::engine::lifecycle::Lifecycle;
use crate::error::DefineError;

/// Builds the lifecycle for a freshly created (or upgraded) element.
pub type Constructor = Rc<dyn Fn(NodeId) -> Rc<dyn Lifecycle>>;

thread_local! {
    static DEFINITIONS: RefCell<BTreeMap<String, Constructor>> = const { RefCell::new(BTreeMap::new()) };
}

const RESERVED_NAMES: [&str; 8] = [
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// Valid custom element name: starts with a lowercase ASCII letter, contains
/// a hyphen, has no uppercase ASCII and is not reserved.
pub fn is_valid_custom_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_lowercase()
        && name.contains('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_') || !c.is_ascii())
        && !RESERVED_NAMES.contains(&name)
}

/// Register a custom element and upgrade existing elements with its tag.
pub fn define(name: &str, constructor: Constructor) -> Result<(), DefineError> {
    if !is_valid_custom_element_name(name) {
        return Err(DefineError::InvalidName(name.to_string()));
    }
    if is_defined(name) {
        return Err(DefineError::AlreadyDefined(name.to_string()));
    }
    DEFINITIONS.with(|defs| defs.borrow_mut().insert(name.to_string(), constructor.clone()));
    debug!(name, "custom element defined");

    for id in elements_with_tag(name) {
        if lifecycle(id).is_none() {
            upgrade(id, &constructor);
        }
    }
    Ok(())
}

pub fn is_defined(name: &str) -> bool {
    DEFINITIONS.with(|defs| defs.borrow().contains_key(name))
}

/// Defined tag names in sorted order.
pub fn defined_names() -> Vec<String> {
    DEFINITIONS.with(|defs| defs.borrow().keys().cloned().collect())
}

pub(crate) fn lookup(name: &str) -> Option<Constructor> {
    DEFINITIONS.with(|defs| defs.borrow().get(name).cloned())
}

/// Construct the lifecycle, then replay existing observed attributes and
/// the connection, as a browser upgrade does.
pub(crate) fn upgrade(id: NodeId, constructor: &Constructor) {
    let instance = constructor(id);
    set_lifecycle(id, instance.clone());

    let observed: Vec<String> = instance.observed_attributes().to_vec();
    for name in observed {
        if let Some(value) = get_attribute(id, &name) {
            instance.on_attribute_change(&name, None, Some(&value));
        }
    }
    if is_connected(id) {
        instance.on_mount();
    }
}

pub(crate) fn reset_registry() {
    let old = DEFINITIONS.with(|defs| std::mem::take(&mut *defs.borrow_mut()));
    drop(old);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{append_child, body, create_element, document, reset_dom, set_attribute};
    use std::cell::RefCell;

    struct Probe {
        log: Rc<RefCell<Vec<String>>>,
        observed: Vec<String>,
    }

    impl Lifecycle for Probe {
        fn observed_attributes(&self) -> &[String] {
            &self.observed
        }
        fn on_mount(&self) {
            self.log.borrow_mut().push("mount".into());
        }
        fn on_attribute_change(&self, name: &str, _old: Option<&str>, new: Option<&str>) {
            self.log.borrow_mut().push(format!("{name}={}", new.unwrap_or("")));
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    fn probe_ctor(log: Rc<RefCell<Vec<String>>>) -> Constructor {
        Rc::new(move |_| {
            Rc::new(Probe {
                log: log.clone(),
                observed: vec!["value".into()],
            }) as Rc<dyn Lifecycle>
        })
    }

    #[test]
    fn test_name_validation() {
        assert!(is_valid_custom_element_name("cosmos-address"));
        assert!(is_valid_custom_element_name("x-1.2_b"));
        assert!(!is_valid_custom_element_name("address"));
        assert!(!is_valid_custom_element_name("Cosmos-address"));
        assert!(!is_valid_custom_element_name("1-a"));
        assert!(!is_valid_custom_element_name("font-face"));
        assert!(!is_valid_custom_element_name(""));
    }

    #[test]
    fn test_define_twice_fails() {
        reset_dom();
        let log = Rc::new(RefCell::new(Vec::new()));
        define("x-probe", probe_ctor(log.clone())).unwrap();
        assert_eq!(
            define("x-probe", probe_ctor(log)),
            Err(DefineError::AlreadyDefined("x-probe".into()))
        );
        assert_eq!(defined_names(), vec!["x-probe"]);
    }

    #[test]
    fn test_define_upgrades_existing_elements() {
        reset_dom();
        let log = Rc::new(RefCell::new(Vec::new()));
        let el = create_element("x-probe");
        set_attribute(el, "value", "7");
        append_child(body(document()).unwrap(), el).unwrap();
        assert!(log.borrow().is_empty());

        define("x-probe", probe_ctor(log.clone())).unwrap();
        assert_eq!(*log.borrow(), vec!["value=7", "mount"]);

        // elements created after definition are upgraded on creation
        let later = create_element("x-probe");
        assert!(lifecycle(later).is_some());
    }
}
