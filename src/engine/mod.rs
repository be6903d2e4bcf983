//! Component engine.
//!
//! The engine bridges reactive cells onto custom elements:
//! - Cell: `AttrCell` observable values and `PropValue` property assignments
//! - Lifecycle: the hooks the host platform calls on an element
//! - Component: definitions, per-element instances, typed events
//! - View / Render: declarative output reconciled into the render root
//!
//! # Architecture
//!
//! ```text
//! DOM attribute ──► process_attr ──┐
//!                                  ├──► safe_parse ──► AttrCell ──► render effect ──► reconcile
//! JS property ─────────────────────┘                      ▲
//! live AttrCell (adopted) ────────────────────────────────┘
//! ```
//!
//! The runtime never re-renders explicitly after an attribute change. Writing
//! the cell is enough: the render effect read it, so it re-runs.

pub mod cell;
pub mod component;
pub mod lifecycle;
pub mod render;
pub mod view;

pub use cell::{AttrCell, PropValue};
pub use component::{
    ComponentDefinition, ComponentInstance, ComponentOptions, TAG_PREFIX, attr_cell, define_component, emit,
    instance, on_event, remove_component, set_prop,
};
pub use lifecycle::Lifecycle;
pub use render::{AttrCells, RenderFn, RenderProps, SetupFn};
pub use view::{ElementView, View, el, fragment, reconcile, text};
