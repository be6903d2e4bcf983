//! # cosmos-elements
//!
//! Reactive Web Components for Cosmos dApp front-ends.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! Components are custom elements whose declared attributes live in reactive
//! cells. DOM attribute strings and script properties are decoded, validated
//! against a [`schema::Schema`] and written into those cells; the render
//! function runs inside an effect, so any cell it reads re-renders it:
//!
//! ```text
//! attribute / property ──► Schema::safe_parse ──► AttrCell ──► render effect ──► reconcile(shadow root)
//! ```
//!
//! The host platform is the in-process document model in [`dom`]: a node
//! arena with shadow roots, events and a custom element registry that calls
//! the component lifecycle.
//!
//! ## Modules
//!
//! - [`types`] - Shared enums and flags (ShadowMode, Placement, ToastVariant, ...)
//! - [`value`] / [`decimal`] - Dynamic values and fixed-point decimals
//! - [`schema`] - Attribute and event schemas, attribute marshalling
//! - [`dom`] - Document model, events, custom element registry
//! - [`engine`] - `define_component`, instances, cells, views
//! - [`hooks`] - Reusable component behavior (class switches, tooltips)
//! - [`state`] - Containers, timers, clipboard, wallet, error formatters
//! - [`components`] - The component library and [`ComponentSet`]
//!
//! ## Example
//!
//! ```ignore
//! use cosmos_elements::{ComponentSet, dom, engine::set_prop};
//!
//! ComponentSet::defaults().register()?;
//!
//! let address = dom::create_element("cosmos-address");
//! set_prop(address, "value", "neutron1jqz2205er0d8657ugll98c462cyplkcqmjthzv");
//! dom::append_child(dom::body(dom::document()).unwrap(), address)?;
//! ```

pub mod components;
pub mod decimal;
pub mod dom;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod schema;
pub mod state;
pub mod types;
pub mod utils;
pub mod value;

// Re-export commonly used items
pub use types::*;

pub use components::{ComponentSet, register_defaults};

pub use decimal::Decimal;

pub use engine::{
    AttrCell, ComponentDefinition, ComponentInstance, ComponentOptions, PropValue, RenderProps, TAG_PREFIX, View,
    attr_cell, define_component, el, emit, fragment, on_event, remove_component, set_prop,
};

pub use error::{CoerceError, DecimalError, DefineError, DomError, EmitError, SignerError};

pub use schema::{Schema, SchemaError, SchemaMap};

pub use value::Value;

pub use state::{
    // Formatters
    formatters::{ErrorFormatter, Formatted, add_formatters, error_value, format_error},
    // Wallet
    wallet::{NetworkConfig, Signer, SignerHandle, TxEstimate},
};
