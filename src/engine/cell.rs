//! Observable attribute cells.
//!
//! An [`AttrCell`] wraps a spark-signals `Signal<Value>`. Reading it inside
//! an effect (a render function, a hook) subscribes that effect; writing a
//! different value re-runs every subscriber synchronously.
//!
//! Cells are shared by cloning. Two clones are the same cell, which is how a
//! parent hands live state to a child component instead of a copy.
//!
//! # Example
//!
//! ```ignore
//! use cosmos_elements::engine::AttrCell;
//!
//! let cell = AttrCell::new("neutron1...".into());
//! let stop = cell.subscribe(|v| println!("now {v:?}"));
//! cell.write("cosmos1...".into());
//! stop();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{Signal, effect, signal};

use crate::decimal::Decimal;
use crate::dom::NodeId;
use crate::types::Cleanup;
use crate::value::{Opaque, Value};

/// Reactive value cell with explicit `read` / `write` / `subscribe`.
#[derive(Clone)]
pub struct AttrCell {
    signal: Signal<Value>,
    latest: Rc<RefCell<Value>>,
}

impl AttrCell {
    pub fn new(initial: Value) -> Self {
        Self {
            latest: Rc::new(RefCell::new(initial.clone())),
            signal: signal(initial),
        }
    }

    /// Current value. Tracked when called inside an effect.
    pub fn read(&self) -> Value {
        self.signal.get()
    }

    /// Current value without subscribing the running effect.
    pub fn peek(&self) -> Value {
        self.latest.borrow().clone()
    }

    /// Store a value; subscribers run if it differs from the current one.
    pub fn write(&self, value: Value) {
        *self.latest.borrow_mut() = value.clone();
        self.signal.set(value);
    }

    /// Run `f` now and after every change. The returned cleanup
    /// unsubscribes.
    pub fn subscribe(&self, f: impl Fn(&Value) + 'static) -> Cleanup {
        let signal = self.signal.clone();
        let stop = effect(move || {
            let value = signal.get();
            f(&value);
        });
        Box::new(stop)
    }

    /// Whether both handles refer to the same cell.
    pub fn ptr_eq(&self, other: &AttrCell) -> bool {
        Rc::ptr_eq(&self.latest, &other.latest)
    }
}

impl std::fmt::Debug for AttrCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AttrCell").field(&*self.latest.borrow()).finish()
    }
}

// =============================================================================
// PropValue
// =============================================================================

/// A property assignment: a plain value or a live cell to adopt.
#[derive(Clone, Debug)]
pub enum PropValue {
    Static(Value),
    Cell(AttrCell),
}

impl PropValue {
    /// Current value, tracked for cells.
    pub fn read(&self) -> Value {
        match self {
            PropValue::Static(v) => v.clone(),
            PropValue::Cell(c) => c.read(),
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, PropValue::Static(v) if v.is_nullish())
    }
}

impl From<AttrCell> for PropValue {
    fn from(cell: AttrCell) -> Self {
        PropValue::Cell(cell)
    }
}

macro_rules! static_prop_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for PropValue {
                fn from(value: $ty) -> Self {
                    PropValue::Static(value.into())
                }
            }
        )*
    };
}

static_prop_from!(Value, &str, String, f64, i32, u32, bool, Decimal, NodeId, Opaque);

// =============================================================================
// Tests
// =============================================================================
