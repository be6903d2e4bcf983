//! The component library.
//!
//! Each module exposes a `TAG` and a `definition()`. Applications usually
//! register everything at once through [`ComponentSet`]:
//!
//! ```ignore
//! use cosmos_elements::components::ComponentSet;
//!
//! ComponentSet::defaults()
//!     .without(&["gas-estimate"])
//!     .with(my_component())
//!     .register()?;
//! ```

pub mod address;
pub mod balance;
pub mod connect_boundary;
pub mod gas_estimate;
pub mod loading_wrapper;
pub mod modal_base;
pub mod modal_error;
pub mod modal_wallet;
pub mod modals;
pub mod spinner;
pub mod toast;
pub mod tooltip;
pub mod user_address;

use tracing::debug;

use crate::engine::{ComponentDefinition, TAG_PREFIX};
use crate::error::DefineError;

/// A list of component definitions to register together.
#[derive(Clone, Default)]
pub struct ComponentSet {
    components: Vec<ComponentDefinition>,
}

impl ComponentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every component of the library.
    pub fn defaults() -> Self {
        Self {
            components: vec![
                address::definition(),
                balance::definition(),
                connect_boundary::definition(),
                gas_estimate::definition(),
                loading_wrapper::definition(),
                modal_base::definition(),
                modal_error::definition(),
                modal_wallet::definition(),
                spinner::definition(),
                toast::definition(),
                tooltip::definition(),
                user_address::definition(),
            ],
        }
    }

    /// Drop components by tag, with or without the `cosmos-` prefix.
    pub fn without(mut self, names: &[&str]) -> Self {
        let matches = |tag: &str| {
            names
                .iter()
                .any(|name| tag == *name || tag.strip_prefix(TAG_PREFIX) == Some(*name))
        };
        self.components.retain(|c| !matches(c.name()));
        self
    }

    /// Add a component, replacing one with the same tag.
    pub fn with(mut self, definition: ComponentDefinition) -> Self {
        self.components.retain(|c| c.name() != definition.name());
        self.components.push(definition);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(ComponentDefinition::name).collect()
    }

    /// Register every component. Components already registered are skipped;
    /// the first other failure stops registration.
    pub fn register(&self) -> Result<(), DefineError> {
        for component in &self.components {
            if component.is_registered() {
                continue;
            }
            component.register()?;
        }
        debug!(count = self.components.len(), "component set registered");
        Ok(())
    }
}

/// Register the whole library.
pub fn register_defaults() -> Result<(), DefineError> {
    ComponentSet::defaults().register()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use crate::engine::{ComponentOptions, define_component};

    #[test]
    fn test_without_accepts_bare_and_prefixed_names() {
        let set = ComponentSet::defaults().without(&["gas-estimate", "cosmos-spinner"]);
        let names = set.names();
        assert!(!names.contains(&gas_estimate::TAG));
        assert!(!names.contains(&spinner::TAG));
        assert!(names.contains(&address::TAG));
    }

    #[test]
    fn test_register_defaults_twice() {
        dom::reset_dom();
        register_defaults().unwrap();
        register_defaults().unwrap();
        for name in ComponentSet::defaults().names() {
            assert!(dom::is_defined(name), "{name} not defined");
        }
    }

    #[test]
    fn test_with_replaces_and_adds() {
        dom::reset_dom();
        let custom = define_component(ComponentOptions {
            name: "greeting".into(),
            ..Default::default()
        });
        let set = ComponentSet::new().with(custom.clone()).with(custom);
        assert_eq!(set.names(), vec!["cosmos-greeting"]);
        set.register().unwrap();
        assert!(dom::is_defined("cosmos-greeting"));
    }
}
