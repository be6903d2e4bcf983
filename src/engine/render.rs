//! Render adapter inputs.
//!
//! A render function receives [`RenderProps`]: the host element, the root it
//! renders into (shadow root or the host itself), the live attribute cells
//! and any extra properties. Reading a cell inside the render function
//! subscribes the component's render effect to it, so the next write
//! re-renders without the runtime diffing anything itself.

use std::collections::BTreeMap;
use std::rc::Rc;

use super::cell::{AttrCell, PropValue};
use super::view::View;
use crate::dom::NodeId;
use crate::types::Cleanup;
use crate::value::Value;

/// Declarative render function.
pub type RenderFn = Rc<dyn Fn(&RenderProps) -> View>;

/// Runs once per mount, before the first render. The returned cleanup runs
/// on unmount.
pub type SetupFn = Rc<dyn Fn(&RenderProps) -> Option<Cleanup>>;

/// Live attribute cells by name.
#[derive(Clone, Debug, Default)]
pub struct AttrCells {
    cells: BTreeMap<String, AttrCell>,
}

impl AttrCells {
    pub(crate) fn new(cells: BTreeMap<String, AttrCell>) -> Self {
        Self { cells }
    }

    pub fn get(&self, name: &str) -> Option<&AttrCell> {
        self.cells.get(name)
    }

    /// Tracked read; `Undefined` for unknown names.
    pub fn read(&self, name: &str) -> Value {
        self.cells.get(name).map(AttrCell::read).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrCell)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Everything a render (or setup) function gets.
#[derive(Clone, Debug)]
pub struct RenderProps {
    pub host: NodeId,
    /// Shadow root, or the host for light DOM components.
    pub root: NodeId,
    pub attrs: AttrCells,
    /// Properties assigned to the host that the attribute schema does not
    /// declare. Passed through without validation.
    pub extra_attrs: BTreeMap<String, PropValue>,
}

impl RenderProps {
    /// Tracked read of a declared attribute.
    pub fn read(&self, name: &str) -> Value {
        self.attrs.read(name)
    }

    pub fn cell(&self, name: &str) -> Option<&AttrCell> {
        self.attrs.get(name)
    }

    /// Tracked read of an extra property.
    pub fn extra(&self, name: &str) -> Value {
        self.extra_attrs.get(name).map(PropValue::read).unwrap_or_default()
    }
}
