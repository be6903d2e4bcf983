//! `<cosmos-tooltip>` and the tooltip API.
//!
//! The component is only the visual box; [`create`] does the wiring: it puts
//! a content element into a new tooltip, parks the tooltip in the shared
//! tooltip container and shows it while the pointer is over the trigger
//! (following the composed path of document `mousemove` events, so triggers
//! inside shadow trees work too).
//!
//! # Example
//!
//! ```ignore
//! let content = dom::create_element("span");
//! dom::set_text_content(content, "Full address")?;
//! let handle = tooltip::create(trigger, content, TooltipOptions::default())?;
//! // ...
//! handle.destroy();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::dom::{self, Event, ListenerId, NodeId};
use crate::engine::{AttrCell, ComponentDefinition, ComponentOptions, PropValue, define_component, el, fragment};
use crate::engine::{remove_component, set_prop};
use crate::error::DomError;
use crate::schema::{Schema, SchemaMap};
use crate::state::containers::{TOOLTIP_CONTAINER_ID, get_or_create_container_in};
use crate::state::timers;
use crate::types::{Cleanup, Placement};
use crate::utils::unindent;
use crate::value::Value;

pub const TAG: &str = "cosmos-tooltip";

/// Class set on a tooltip while it is shown.
pub const ACTIVE_CLASS: &str = "active";

const STYLES: &str = "
    :host {
      min-width: 24rem;
      padding: calc(var(--cosmos-spacing, 8px));
      border-radius: calc(var(--cosmos-roundness, 4px));
      color: rgb(200, 197, 219);
      background: var(--cosmos-bg-panel-500, rgb(49, 48, 54));
      box-shadow: 0 4px 10px 0 rgba(0, 0, 0, 0.25);
      font-size: var(--cosmos-base-font-size, 12px);
      line-height: 1.2;
      z-index: var(--cosmos-tooltip-z, 999);
    }
";

const GLOBAL_CSS: &str = "
    #tooltip-container {
      position: absolute;
      top: 0;
      left: 0;
      z-index: 1000;
    }

    cosmos-tooltip {
      display: none;
      &.active {
        display: block;
      }
    }
";

fn placement_of(value: &Value) -> Placement {
    value.as_str().and_then(Placement::parse).unwrap_or_default()
}

pub fn definition() -> ComponentDefinition {
    define_component(ComponentOptions {
        name: TAG.into(),
        attrs: SchemaMap::new().with(
            "placement",
            Schema::enumeration(Placement::ALL).optional(),
        ),
        render: Some(Rc::new(|props| {
            let placement = placement_of(&props.read("placement"));
            dom::set_attribute(props.host, "data-placement", placement.as_str());
            fragment([
                el("style").child(unindent(STYLES)).into(),
                el("slot")
                    .attr("name", "content")
                    .child(el("span").child("Tooltip content"))
                    .into(),
            ])
        })),
        css: Some(unindent(GLOBAL_CSS)),
        ..Default::default()
    })
}

// =============================================================================
// Tooltip API
// =============================================================================

#[derive(Clone, Default)]
pub struct TooltipOptions {
    /// Fixed value or live cell holding a placement name. Defaults to
    /// `bottom`.
    pub placement: Option<PropValue>,
}

impl TooltipOptions {
    pub fn placement(placement: Placement) -> Self {
        Self {
            placement: Some(placement.as_str().into()),
        }
    }

    pub fn live_placement(cell: AttrCell) -> Self {
        Self {
            placement: Some(cell.into()),
        }
    }
}

struct TooltipState {
    trigger: NodeId,
    element: NodeId,
    placement: Option<PropValue>,
    visible: Cell<bool>,
    destroyed: Cell<bool>,
    listener: Cell<Option<(NodeId, ListenerId)>>,
    unsubscribe: RefCell<Option<Cleanup>>,
}

impl TooltipState {
    fn placement(&self) -> Placement {
        match &self.placement {
            Some(PropValue::Cell(cell)) => placement_of(&cell.peek()),
            Some(PropValue::Static(value)) => placement_of(value),
            None => Placement::default(),
        }
    }

    fn update(&self) {
        dom::set_attribute(self.element, "data-placement", self.placement().as_str());
    }

    fn show(&self) {
        self.visible.set(true);
        dom::add_class(self.element, ACTIVE_CLASS);
        self.update();
    }

    fn hide(&self) {
        self.visible.set(false);
        dom::remove_class(self.element, ACTIVE_CLASS);
        self.update();
    }

    fn on_move(&self, event: &Event) {
        if event.composed_path().contains(&self.trigger) {
            self.visible.set(true);
            if !dom::has_class(self.element, ACTIVE_CLASS) {
                self.show();
            }
        } else {
            self.hide();
        }
    }
}

/// Live tooltip returned by [`create`].
pub struct TooltipHandle {
    state: Rc<TooltipState>,
}

impl TooltipHandle {
    pub fn element(&self) -> NodeId {
        self.state.element
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible.get()
    }

    pub fn show(&self) {
        self.state.show();
    }

    pub fn hide(&self) {
        self.state.hide();
    }

    /// Re-apply the placement.
    pub fn update(&self) {
        self.state.update();
    }

    /// Stop following the pointer and remove the tooltip.
    ///
    /// Listeners go immediately; the element itself is removed on the next
    /// timer tick so a tooltip can be destroyed from inside its own event
    /// handlers. Repeated calls do nothing.
    pub fn destroy(&self) {
        let state = &self.state;
        if state.destroyed.replace(true) {
            return;
        }
        if let Some((doc, id)) = state.listener.take() {
            dom::remove_event_listener(doc, id);
        }
        let unsubscribe = state.unsubscribe.borrow_mut().take();
        if let Some(unsubscribe) = unsubscribe {
            unsubscribe();
        }
        let element = state.element;
        timers::set_timeout(Duration::from_millis(1), move || {
            remove_component(element);
            dom::release(element);
        });
        debug!(?element, "tooltip destroyed");
    }
}

/// Create a tooltip showing `content` whenever the pointer is over
/// `trigger`.
pub fn create(trigger: NodeId, content: NodeId, options: TooltipOptions) -> Result<TooltipHandle, DomError> {
    let doc = dom::owner_document(trigger).unwrap_or_else(dom::document);
    let element = dom::create_element_in(doc, TAG);
    if let Some(placement) = options.placement.clone() {
        set_prop(element, "placement", placement);
    }

    dom::set_attribute(content, "slot", "content");
    dom::set_attribute(content, "style", "width: fit-content; margin: 0 auto");
    dom::append_child(element, content)?;

    let container = get_or_create_container_in(doc, TOOLTIP_CONTAINER_ID)?;
    dom::append_child(container, element)?;

    let state = Rc::new(TooltipState {
        trigger,
        element,
        placement: options.placement,
        visible: Cell::new(false),
        destroyed: Cell::new(false),
        listener: Cell::new(None),
        unsubscribe: RefCell::new(None),
    });

    if let Some(PropValue::Cell(cell)) = &state.placement {
        let weak = Rc::downgrade(&state);
        let unsubscribe = cell.subscribe(move |_| {
            if let Some(state) = weak.upgrade() {
                state.update();
            }
        });
        *state.unsubscribe.borrow_mut() = Some(unsubscribe);
    }

    let listening = state.clone();
    let id = dom::add_event_listener(doc, "mousemove", move |event| listening.on_move(event));
    state.listener.set(Some((doc, id)));
    state.update();

    Ok(TooltipHandle { state })
}

// =============================================================================
// Tests
// =============================================================================
