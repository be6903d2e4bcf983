//! Component definitions and instances.
//!
//! [`define_component`] turns [`ComponentOptions`] into a
//! [`ComponentDefinition`]; [`ComponentDefinition::register`] binds it to a
//! custom element tag. Every element with that tag then gets a
//! [`ComponentInstance`] that:
//!
//! - keeps one [`AttrCell`] per declared attribute,
//! - decodes and validates attribute strings and script properties into
//!   those cells (a property wins over the attribute unless it is nullish),
//! - adopts a cell passed as a property instead of copying it,
//! - renders inside an effect scope so that cell writes re-render,
//! - exposes typed events through `emit` and `on<Event>` handler slots.
//!
//! # Example
//!
//! ```ignore
//! use cosmos_elements::engine::{ComponentOptions, define_component, view::el};
//! use cosmos_elements::schema::{Schema, SchemaMap};
//!
//! let greeting = define_component(ComponentOptions {
//!     name: "greeting".into(),
//!     attrs: SchemaMap::new().with("name", Schema::string()),
//!     render: Some(Rc::new(|props| {
//!         el("p").child(format!("Hello {}", props.read("name").as_str().unwrap_or("?"))).into()
//!     })),
//!     ..Default::default()
//! });
//! greeting.register()?;
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use spark_signals::{AnyReaction, Signal, effect, effect_scope, on_scope_dispose, signal, with_context};
use tracing::{debug, trace, warn};

use super::cell::{AttrCell, PropValue};
use super::lifecycle::Lifecycle;
use super::render::{AttrCells, RenderFn, RenderProps, SetupFn};
use super::view::{View, reconcile};
use crate::dom::{self, Event, EventHandler, ListenerId, NodeId};
use crate::error::{DefineError, EmitError};
use crate::schema::{Marshaller, Schema, SchemaMap, default_marshaller, process_attr};
use crate::types::{Cleanup, EventFlags, LifecycleState, ShadowMode};
use crate::utils::kebab_to_pascal;
use crate::value::Value;

/// Prefix added to component names that lack it.
pub const TAG_PREFIX: &str = "cosmos-";

// =============================================================================
// Options & Definition
// =============================================================================

/// Everything needed to define a component.
#[derive(Clone, Default)]
pub struct ComponentOptions {
    /// Tag name, with or without the `cosmos-` prefix.
    pub name: String,
    pub attrs: SchemaMap,
    /// Event name to detail schema. Each entry also gets an `on<Pascal>`
    /// handler slot.
    pub events: SchemaMap,
    pub shadow: ShadowMode,
    pub render: Option<RenderFn>,
    pub setup: Option<SetupFn>,
    /// Injected into the document head on registration. Mostly useful with
    /// `ShadowMode::None`.
    pub css: Option<String>,
    /// Decoder for structured attribute strings. Defaults to
    /// [`default_marshaller`].
    pub marshaller: Option<Marshaller>,
}

struct Definition {
    name: String,
    attrs: SchemaMap,
    events: SchemaMap,
    shadow: ShadowMode,
    render: Option<RenderFn>,
    setup: Option<SetupFn>,
    css: Option<String>,
    marshaller: Marshaller,
    observed: Vec<String>,
}

/// Immutable component descriptor. Cheap to clone.
#[derive(Clone)]
pub struct ComponentDefinition {
    inner: Rc<Definition>,
}

/// Build a definition. Registration is a separate, explicit step.
pub fn define_component(options: ComponentOptions) -> ComponentDefinition {
    let name = if options.name.starts_with(TAG_PREFIX) {
        options.name
    } else {
        format!("{TAG_PREFIX}{}", options.name)
    };
    let observed = options.attrs.names().map(str::to_string).collect();
    ComponentDefinition {
        inner: Rc::new(Definition {
            name,
            attrs: options.attrs,
            events: options.events,
            shadow: options.shadow,
            render: options.render,
            setup: options.setup,
            css: options.css,
            marshaller: options.marshaller.unwrap_or_else(default_marshaller),
            observed,
        }),
    }
}

fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| {
            !c.is_whitespace() && !c.is_control() && !c.is_ascii_uppercase() && !matches!(c, '"' | '\'' | '>' | '/' | '=')
        })
}

fn is_stylesheet(node: NodeId) -> bool {
    match dom::tag_name(node).as_deref() {
        Some("style") => true,
        Some("link") => dom::get_attribute(node, "rel").as_deref() == Some("stylesheet"),
        _ => false,
    }
}

impl ComponentDefinition {
    /// Registered tag name, always prefixed.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn attrs(&self) -> &SchemaMap {
        &self.inner.attrs
    }

    pub fn events(&self) -> &SchemaMap {
        &self.inner.events
    }

    pub fn shadow(&self) -> ShadowMode {
        self.inner.shadow
    }

    pub fn marshaller(&self) -> &Marshaller {
        &self.inner.marshaller
    }

    /// `on<Pascal>` handler property names, in declaration order.
    pub fn event_property_names(&self) -> Vec<String> {
        self.inner
            .events
            .names()
            .map(|e| format!("on{}", kebab_to_pascal(e)))
            .collect()
    }

    pub fn is_registered(&self) -> bool {
        dom::is_defined(&self.inner.name)
    }

    /// Define the custom element and inject the component CSS.
    ///
    /// Fails if the tag or an attribute name is invalid, or if the tag is
    /// already taken. Existing elements with the tag are upgraded.
    pub fn register(&self) -> Result<(), DefineError> {
        if let Some(bad) = self.inner.attrs.names().find(|n| !is_valid_attribute_name(n)) {
            return Err(DefineError::InvalidAttributeName {
                component: self.inner.name.clone(),
                attribute: bad.to_string(),
            });
        }

        let definition = self.clone();
        dom::define(
            &self.inner.name,
            Rc::new(move |host| ComponentInstance::create(definition.clone(), host) as Rc<dyn Lifecycle>),
        )?;

        if let Some(css) = &self.inner.css {
            self.inject_css(css);
        }
        debug!(name = %self.inner.name, "component registered");
        Ok(())
    }

    fn inject_css(&self, css: &str) {
        let doc = dom::document();
        let Some(head) = dom::head(doc) else {
            return;
        };
        let style = dom::create_element_in(doc, "style");
        let first = dom::children(head).into_iter().find(|c| is_stylesheet(*c));
        let result = dom::set_text_content(style, css).and_then(|_| dom::insert_before(head, style, first));
        if let Err(err) = result {
            warn!(name = %self.inner.name, error = %err, "failed to inject component css");
        }
    }

    /// Create an element of this component in the default document.
    pub fn create(&self) -> NodeId {
        dom::create_element(&self.inner.name)
    }

    pub fn create_in(&self, doc: NodeId) -> NodeId {
        dom::create_element_in(doc, &self.inner.name)
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.inner.name)
            .field("attrs", &self.inner.attrs)
            .field("events", &self.inner.events)
            .field("shadow", &self.inner.shadow)
            .finish()
    }
}

// =============================================================================
// Instance
// =============================================================================

struct CellSlot {
    cell: AttrCell,
    /// Cell came from a property and belongs to someone else.
    adopted: bool,
}

/// Per-element component state, created when the element is upgraded.
pub struct ComponentInstance {
    this: Weak<ComponentInstance>,
    definition: ComponentDefinition,
    host: NodeId,
    state: Cell<LifecycleState>,
    slots: RefCell<BTreeMap<String, CellSlot>>,
    extra_attrs: RefCell<BTreeMap<String, PropValue>>,
    /// Bumped when cells are swapped or extra attributes change; read only
    /// by the render effect.
    epoch: Signal<u64>,
    epoch_counter: Cell<u64>,
    handlers: RefCell<BTreeMap<String, (EventHandler, ListenerId)>>,
    mounted: RefCell<Option<Cleanup>>,
    root: Cell<Option<NodeId>>,
}

impl ComponentInstance {
    fn create(definition: ComponentDefinition, host: NodeId) -> Rc<Self> {
        let slots = definition
            .attrs()
            .names()
            .map(|name| {
                let slot = CellSlot {
                    cell: AttrCell::new(Value::Undefined),
                    adopted: false,
                };
                (name.to_string(), slot)
            })
            .collect();
        let extra_attrs = dom::property_names(host)
            .into_iter()
            .filter(|name| !definition.attrs().contains(name))
            .filter_map(|name| dom::property(host, &name).map(|v| (name, v)))
            .collect();
        trace!(component = %definition.name(), ?host, "instance created");

        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            definition,
            host,
            state: Cell::new(LifecycleState::Unattached),
            slots: RefCell::new(slots),
            extra_attrs: RefCell::new(extra_attrs),
            epoch: signal(0),
            epoch_counter: Cell::new(0),
            handlers: RefCell::new(BTreeMap::new()),
            mounted: RefCell::new(None),
            root: Cell::new(None),
        })
    }

    pub fn host(&self) -> NodeId {
        self.host
    }

    pub fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    /// Render root, once the component has mounted.
    pub fn root(&self) -> Option<NodeId> {
        self.root.get()
    }

    /// Current backing cell of a declared attribute.
    pub fn cell(&self, name: &str) -> Option<AttrCell> {
        self.slots.borrow().get(name).map(|s| s.cell.clone())
    }

    pub fn extra_attr(&self, name: &str) -> Option<PropValue> {
        self.extra_attrs.borrow().get(name).cloned()
    }

    fn tag(&self) -> &str {
        self.definition.name()
    }

    fn bump_epoch(&self) {
        let next = self.epoch_counter.get() + 1;
        self.epoch_counter.set(next);
        self.epoch.set(next);
    }

    // -------------------------------------------------------------------------
    // Attributes
    // -------------------------------------------------------------------------

    /// Validate `value` and write it to the attribute's cell. Invalid values
    /// are logged and dropped. Undeclared names land in the extra attributes.
    pub fn update_attr(&self, name: &str, value: Value) {
        let Some(schema) = self.definition.attrs().get(name) else {
            self.extra_attrs
                .borrow_mut()
                .insert(name.to_string(), PropValue::Static(value));
            self.bump_epoch();
            return;
        };
        match schema.safe_parse(&value) {
            Ok(parsed) => {
                let cell = self.cell(name);
                if let Some(cell) = cell {
                    cell.write(parsed);
                }
            }
            Err(err) => {
                warn!(component = %self.tag(), attribute = name, error = %err, "invalid attribute value rejected");
            }
        }
    }

    /// Make `cell` the attribute's backing cell if its value validates.
    fn adopt_cell(&self, name: &str, cell: AttrCell) {
        let Some(schema) = self.definition.attrs().get(name) else {
            return;
        };
        if self.cell(name).is_some_and(|current| current.ptr_eq(&cell)) {
            return;
        }
        if let Err(err) = schema.safe_parse(&cell.peek()) {
            warn!(component = %self.tag(), attribute = name, error = %err, "reactive cell rejected");
            return;
        }
        self.slots
            .borrow_mut()
            .insert(name.to_string(), CellSlot { cell, adopted: true });
        self.bump_epoch();
    }

    /// Swap an adopted cell for a private one holding the same value.
    fn detach_adopted(&self, name: &str) {
        let replaced = {
            let mut slots = self.slots.borrow_mut();
            match slots.get_mut(name) {
                Some(slot) if slot.adopted => {
                    *slot = CellSlot {
                        cell: AttrCell::new(slot.cell.peek()),
                        adopted: false,
                    };
                    true
                }
                _ => false,
            }
        };
        if replaced {
            self.bump_epoch();
        }
    }

    fn parse_attr(&self, name: &str, schema: &Schema) {
        match dom::property(self.host, name) {
            Some(PropValue::Cell(cell)) => self.adopt_cell(name, cell),
            Some(PropValue::Static(value)) if !value.is_nullish() => {
                self.detach_adopted(name);
                self.update_attr(name, value);
            }
            _ => {
                self.detach_adopted(name);
                let raw = dom::get_attribute(self.host, name);
                match process_attr(schema, raw.as_deref(), self.definition.marshaller()) {
                    Ok(value) => self.update_attr(name, value),
                    Err(err) => {
                        warn!(component = %self.tag(), attribute = name, error = %err, "attribute could not be decoded");
                    }
                }
            }
        }
    }

    /// Re-read every declared attribute from properties and DOM attributes.
    pub fn parse_attrs(&self) {
        let definition = self.definition.clone();
        for (name, schema) in definition.attrs().iter() {
            self.parse_attr(name, schema);
        }
    }

    fn attribute_changed(&self, name: &str, new: Option<&str>) {
        let Some(schema) = self.definition.attrs().get(name) else {
            return;
        };
        match process_attr(schema, new, self.definition.marshaller()) {
            Ok(value) => self.update_attr(name, value),
            Err(err) => {
                warn!(component = %self.tag(), attribute = name, error = %err, "attribute could not be decoded");
            }
        }
    }

    /// A script property was assigned on the host.
    fn property_changed(&self, name: &str) {
        if let Some(schema) = self.definition.attrs().get(name) {
            if self.state.get() == LifecycleState::Connected {
                let schema = schema.clone();
                self.parse_attr(name, &schema);
            }
            return;
        }
        match dom::property(self.host, name) {
            Some(value) => self.extra_attrs.borrow_mut().insert(name.to_string(), value),
            None => self.extra_attrs.borrow_mut().remove(name),
        };
        self.bump_epoch();
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    fn render_props(&self, root: NodeId) -> RenderProps {
        let cells = self
            .slots
            .borrow()
            .iter()
            .map(|(name, slot)| (name.clone(), slot.cell.clone()))
            .collect();
        RenderProps {
            host: self.host,
            root,
            attrs: AttrCells::new(cells),
            extra_attrs: self.extra_attrs.borrow().clone(),
        }
    }

    fn ensure_root(&self) -> Option<NodeId> {
        if let Some(root) = self.root.get() {
            return Some(root);
        }
        let root = if self.definition.shadow().uses_shadow() {
            match dom::shadow_root_any(self.host) {
                Some(root) => root,
                None => match dom::attach_shadow(self.host, self.definition.shadow()) {
                    Ok(root) => root,
                    Err(err) => {
                        warn!(component = %self.tag(), error = %err, "cannot attach shadow root");
                        return None;
                    }
                },
            }
        } else {
            self.host
        };
        self.root.set(Some(root));
        Some(root)
    }

    fn mount_render(&self, root: NodeId) {
        // Nested components connect while the parent's render effect runs.
        // The child's scope and effects must not belong to that effect, or
        // the parent's next run disposes them and its setup reads are
        // tracked as the parent's dependencies.
        let scope = effect_scope(true);
        let weak = self.this.clone();

        outside_reactions(|| scope.run(move || {
            if let Some(instance) = weak.upgrade() {
                if let Some(setup) = instance.definition.inner.setup.clone() {
                    if let Some(cleanup) = setup(&instance.render_props(root)) {
                        let cleanup = RefCell::new(Some(cleanup));
                        on_scope_dispose(move || {
                            if let Some(cleanup) = cleanup.borrow_mut().take() {
                                cleanup();
                            }
                        });
                    }
                }
            }

            let _render = effect(move || {
                let Some(instance) = weak.upgrade() else {
                    return;
                };
                let _ = instance.epoch.get();
                let props = instance.render_props(root);
                let view = match &instance.definition.inner.render {
                    Some(render) => render(&props),
                    None => View::Empty,
                };
                reconcile(root, &view);
            });
        }));

        *self.mounted.borrow_mut() = Some(Box::new(move || scope.stop()));
    }

    /// Stop rendering, clear the render root and drop typed handlers.
    fn teardown(&self) {
        let stop = self.mounted.borrow_mut().take();
        if let Some(stop) = stop {
            stop();
        }
        if let Some(root) = self.root.get() {
            reconcile(root, &View::Empty);
        }
        let handlers = std::mem::take(&mut *self.handlers.borrow_mut());
        for (_, (_, id)) in handlers {
            dom::remove_event_listener(self.host, id);
        }
    }

    fn connect(&self) {
        if self.state.get() == LifecycleState::Connected {
            return;
        }
        self.parse_attrs();
        let Some(root) = self.ensure_root() else {
            return;
        };
        self.mount_render(root);
        self.state.set(LifecycleState::Connected);
        debug!(component = %self.tag(), host = ?self.host, "connected");
    }

    fn disconnect(&self) {
        if self.state.get() != LifecycleState::Connected {
            return;
        }
        self.teardown();
        self.state.set(LifecycleState::Disconnected);
        debug!(component = %self.tag(), host = ?self.host, "disconnected");
    }

    fn adopted(&self) {
        self.parse_attrs();
        if self.state.get() == LifecycleState::Connected && dom::is_connected(self.host) {
            self.bump_epoch();
        }
        debug!(component = %self.tag(), host = ?self.host, "adopted");
    }

    /// Detach from the tree and tear down. Safe to call repeatedly, and
    /// after a disconnection.
    pub fn remove(&self) {
        dom::remove(self.host);
        self.teardown();
        if self.state.get() != LifecycleState::Removed {
            debug!(component = %self.tag(), host = ?self.host, "removed");
        }
        self.state.set(LifecycleState::Removed);
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    fn undeclared(&self, event: &str) -> EmitError {
        EmitError::UndeclaredEvent {
            component: self.tag().to_string(),
            event: event.to_string(),
        }
    }

    /// Validate `detail` and dispatch the event at the host.
    ///
    /// Undeclared events and invalid details are contract violations and
    /// come back as errors; nothing is dispatched then.
    pub fn emit(&self, event: &str, detail: impl Into<Value>) -> Result<Event, EmitError> {
        self.emit_with(event, detail, EventFlags::empty())
    }

    pub fn emit_with(&self, event: &str, detail: impl Into<Value>, flags: EventFlags) -> Result<Event, EmitError> {
        let schema = self.definition.events().get(event).ok_or_else(|| self.undeclared(event))?;
        let detail = schema
            .safe_parse(&detail.into())
            .map_err(|source| EmitError::InvalidDetail {
                event: event.to_string(),
                source,
            })?;
        trace!(component = %self.tag(), event, "emit");
        Ok(dom::dispatch_event(self.host, Event::custom(event, detail, flags)))
    }

    /// Replace the handler for `event`; `None` just removes it.
    pub fn set_event_handler(&self, event: &str, handler: Option<EventHandler>) -> Result<(), EmitError> {
        if !self.definition.events().contains(event) {
            return Err(self.undeclared(event));
        }
        let previous = self.handlers.borrow_mut().remove(event);
        if let Some((_, id)) = previous {
            dom::remove_event_listener(self.host, id);
        }
        if let Some(handler) = handler {
            let id = dom::add_event_handler(self.host, event, handler.clone());
            self.handlers.borrow_mut().insert(event.to_string(), (handler, id));
        }
        Ok(())
    }

    pub fn event_handler(&self, event: &str) -> Option<EventHandler> {
        self.handlers.borrow().get(event).map(|(h, _)| h.clone())
    }

    /// Assign through the `on<Pascal>` property name, e.g. `onClose`.
    pub fn set_event_property(&self, property: &str, handler: Option<EventHandler>) -> Result<(), EmitError> {
        let event = self
            .definition
            .events()
            .names()
            .find(|e| format!("on{}", kebab_to_pascal(e)) == property)
            .map(str::to_string)
            .ok_or_else(|| self.undeclared(property))?;
        self.set_event_handler(&event, handler)
    }
}

impl Lifecycle for ComponentInstance {
    fn observed_attributes(&self) -> &[String] {
        &self.definition.inner.observed
    }

    fn on_mount(&self) {
        self.connect();
    }

    fn on_attribute_change(&self, name: &str, _old: Option<&str>, new: Option<&str>) {
        self.attribute_changed(name, new);
    }

    fn on_adopt(&self, _old_document: NodeId, _new_document: NodeId) {
        self.adopted();
    }

    fn on_unmount(&self) {
        self.disconnect();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Run `f` with no active reaction or effect, restoring them afterwards.
///
/// Effects created inside get no parent effect, and signal reads are not
/// tracked by whatever effect was running.
fn outside_reactions<R>(f: impl FnOnce() -> R) -> R {
    struct Restore {
        reaction: Option<Weak<dyn AnyReaction>>,
        effect: Option<Weak<dyn AnyReaction>>,
        untracking: bool,
    }

    impl Drop for Restore {
        fn drop(&mut self) {
            with_context(|ctx| {
                ctx.set_active_reaction(self.reaction.take());
                ctx.set_active_effect(self.effect.take());
                ctx.set_untracking(self.untracking);
            });
        }
    }

    let _restore = with_context(|ctx| Restore {
        reaction: ctx.set_active_reaction(None),
        effect: ctx.set_active_effect(None),
        untracking: ctx.set_untracking(false),
    });
    f()
}

// =============================================================================
// Node-level API
// =============================================================================

/// Component instance bound to `host`, if it is an upgraded component.
pub fn instance(host: NodeId) -> Option<Rc<ComponentInstance>> {
    let lifecycle = dom::lifecycle(host)?;
    let instance = lifecycle.as_any().downcast_ref::<ComponentInstance>()?;
    instance.this.upgrade()
}

/// Assign a script property on `host`.
///
/// Works before the element is upgraded too: the value is kept on the node
/// and read when the component connects.
pub fn set_prop(host: NodeId, name: &str, value: impl Into<PropValue>) {
    dom::set_property(host, name, value.into());
    if let Some(instance) = instance(host) {
        instance.property_changed(name);
    }
}

pub fn emit(host: NodeId, event: &str, detail: impl Into<Value>) -> Result<Event, EmitError> {
    instance(host)
        .ok_or(EmitError::NotAComponent(host))?
        .emit(event, detail)
}

/// Backing cell of a declared attribute on `host`.
pub fn attr_cell(host: NodeId, name: &str) -> Option<AttrCell> {
    instance(host)?.cell(name)
}

/// `set_event_handler` on the instance bound to `host`.
pub fn on_event(host: NodeId, event: &str, handler: impl Fn(&Event) + 'static) -> Result<(), EmitError> {
    instance(host)
        .ok_or(EmitError::NotAComponent(host))?
        .set_event_handler(event, Some(Rc::new(handler)))
}

/// Remove a component element; plain nodes are just detached.
pub fn remove_component(host: NodeId) {
    match instance(host) {
        Some(instance) => instance.remove(),
        None => dom::remove(host),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::view::el;
    use crate::schema::Schema;

    fn setup() -> NodeId {
        dom::reset_dom();
        dom::body(dom::document()).unwrap_or_else(dom::document)
    }

    fn echo() -> ComponentDefinition {
        define_component(ComponentOptions {
            name: "echo".into(),
            attrs: SchemaMap::new()
                .with("label", Schema::string())
                .with("count", Schema::number().optional()),
            events: SchemaMap::new().with("ping", Schema::number()).with("close-all", Schema::any()),
            render: Some(Rc::new(|props| {
                let label = props.read("label");
                let count = props.read("count");
                el("span")
                    .child(format!(
                        "{}:{}",
                        label.as_str().unwrap_or("-"),
                        count.as_f64().map(|n| n.to_string()).unwrap_or_default()
                    ))
                    .into()
            })),
            ..Default::default()
        })
    }

    #[test]
    fn test_name_is_prefixed() {
        setup();
        assert_eq!(echo().name(), "cosmos-echo");
        let def = define_component(ComponentOptions {
            name: "cosmos-x".into(),
            ..Default::default()
        });
        assert_eq!(def.name(), "cosmos-x");
    }

    #[test]
    fn test_invalid_attribute_name_rejected() {
        setup();
        let def = define_component(ComponentOptions {
            name: "bad-attrs".into(),
            attrs: SchemaMap::new().with("Value", Schema::string()),
            ..Default::default()
        });
        assert!(matches!(def.register(), Err(DefineError::InvalidAttributeName { .. })));
    }

    #[test]
    fn test_connect_renders_into_shadow_root() {
        let body = setup();
        let def = echo();
        def.register().unwrap();
        let host = def.create();
        dom::set_attribute(host, "label", "hi");
        dom::set_attribute(host, "count", "3");
        dom::append_child(body, host).unwrap();

        let root = dom::shadow_root(host).unwrap();
        assert_eq!(dom::text_content(root), "hi:3");
        assert_eq!(instance(host).unwrap().state(), LifecycleState::Connected);
    }

    #[test]
    fn test_attribute_change_rerenders() {
        let body = setup();
        let def = echo();
        def.register().unwrap();
        let host = def.create();
        dom::set_attribute(host, "label", "a");
        dom::append_child(body, host).unwrap();

        dom::set_attribute(host, "label", "b");
        assert_eq!(dom::composed_text(host), "b:");

        // malformed JSON and schema violations keep the previous value
        dom::set_attribute(host, "count", "two");
        dom::set_attribute(host, "count", "\"2\"");
        assert_eq!(attr_cell(host, "count").unwrap().peek(), Value::Undefined);
        dom::set_attribute(host, "count", "2");
        assert_eq!(dom::composed_text(host), "b:2");
    }

    #[test]
    fn test_property_wins_over_attribute() {
        let body = setup();
        let def = echo();
        def.register().unwrap();
        let host = def.create();
        dom::set_attribute(host, "label", "from-attr");
        set_prop(host, "label", "from-prop");
        dom::append_child(body, host).unwrap();
        assert_eq!(attr_cell(host, "label").unwrap().peek(), Value::from("from-prop"));

        // nullish property falls back to the attribute
        set_prop(host, "label", Value::Null);
        assert_eq!(attr_cell(host, "label").unwrap().peek(), Value::from("from-attr"));
    }

    #[test]
    fn test_adopted_cell_is_shared() {
        let body = setup();
        let def = echo();
        def.register().unwrap();
        let shared = AttrCell::new("live".into());
        let host = def.create();
        set_prop(host, "label", shared.clone());
        dom::append_child(body, host).unwrap();

        assert!(attr_cell(host, "label").unwrap().ptr_eq(&shared));
        shared.write("updated".into());
        assert_eq!(dom::composed_text(host), "updated:");

        // an invalid cell is refused and the previous one stays
        set_prop(host, "label", AttrCell::new(Value::from(5)));
        assert!(attr_cell(host, "label").unwrap().ptr_eq(&shared));
    }

    #[test]
    fn test_extra_attrs_reach_render() {
        let body = setup();
        let def = define_component(ComponentOptions {
            name: "extra".into(),
            shadow: ShadowMode::None,
            render: Some(Rc::new(|props| View::from(props.extra("hint").as_str().map(str::to_string)))),
            ..Default::default()
        });
        def.register().unwrap();
        let host = def.create();
        set_prop(host, "hint", "before");
        dom::append_child(body, host).unwrap();
        assert_eq!(dom::text_content(host), "before");

        set_prop(host, "hint", "after");
        assert_eq!(dom::text_content(host), "after");
    }

    #[test]
    fn test_emit_validates_detail() {
        let body = setup();
        let def = echo();
        def.register().unwrap();
        let host = def.create();
        dom::append_child(body, host).unwrap();

        let received = Rc::new(RefCell::new(Vec::new()));
        let r = received.clone();
        dom::add_event_listener(host, "ping", move |e| r.borrow_mut().push(e.detail().clone()));

        let event = emit(host, "ping", 4).unwrap();
        assert_eq!(event.detail(), &Value::from(4));
        assert!(matches!(emit(host, "ping", "four"), Err(EmitError::InvalidDetail { .. })));
        assert!(matches!(emit(host, "pong", 1), Err(EmitError::UndeclaredEvent { .. })));
        assert_eq!(*received.borrow(), vec![Value::from(4)]);

        let plain = dom::create_element("div");
        assert_eq!(emit(plain, "ping", 1).unwrap_err(), EmitError::NotAComponent(plain));
    }

    #[test]
    fn test_event_property_last_write_wins() {
        let body = setup();
        let def = echo();
        def.register().unwrap();
        assert_eq!(def.event_property_names(), vec!["onPing", "onCloseAll"]);
        let host = def.create();
        dom::append_child(body, host).unwrap();
        let inst = instance(host).unwrap();

        let hits = Rc::new(RefCell::new(Vec::new()));
        let h1 = hits.clone();
        let h2 = hits.clone();
        let first: EventHandler = Rc::new(move |_| h1.borrow_mut().push(1));
        let second: EventHandler = Rc::new(move |_| h2.borrow_mut().push(2));
        inst.set_event_property("onCloseAll", Some(first)).unwrap();
        inst.set_event_property("onCloseAll", Some(second)).unwrap();
        inst.emit("close-all", Value::Undefined).unwrap();
        assert_eq!(*hits.borrow(), vec![2]);
        assert_eq!(dom::listener_count_for(host, "close-all"), 1);

        inst.set_event_property("onCloseAll", None).unwrap();
        assert_eq!(dom::listener_count_for(host, "close-all"), 0);
        assert!(inst.set_event_property("onMissing", None).is_err());
    }

    #[test]
    fn test_disconnect_and_remove_tear_down() {
        let body = setup();
        let def = echo();
        def.register().unwrap();
        let host = def.create();
        dom::append_child(body, host).unwrap();
        on_event(host, "ping", |_| {}).unwrap();
        assert_eq!(dom::listener_count(host), 1);

        dom::remove(host);
        let inst = instance(host).unwrap();
        assert_eq!(inst.state(), LifecycleState::Disconnected);
        assert!(dom::children(inst.root().unwrap()).is_empty());
        assert_eq!(dom::listener_count(host), 0);

        dom::append_child(body, host).unwrap();
        assert_eq!(inst.state(), LifecycleState::Connected);
        inst.remove();
        inst.remove();
        assert_eq!(inst.state(), LifecycleState::Removed);
        assert!(dom::parent(host).is_none());
    }

    #[test]
    fn test_upgrade_after_register_reads_pending_props() {
        let body = setup();
        let def = echo();
        let host = dom::create_element("cosmos-echo");
        set_prop(host, "label", "early");
        dom::append_child(body, host).unwrap();
        assert!(instance(host).is_none());

        def.register().unwrap();
        assert_eq!(dom::composed_text(host), "early:");
    }

    #[test]
    fn test_css_injected_before_first_stylesheet() {
        setup();
        let head = dom::head(dom::document()).unwrap();
        let existing = dom::create_element("link");
        dom::set_attribute(existing, "rel", "stylesheet");
        dom::append_child(head, existing).unwrap();

        let def = define_component(ComponentOptions {
            name: "styled".into(),
            css: Some(".x { color: red; }".into()),
            ..Default::default()
        });
        def.register().unwrap();
        let first = dom::children(head)[0];
        assert_eq!(dom::tag_name(first).as_deref(), Some("style"));
        assert_eq!(dom::text_content(first), ".x { color: red; }");
    }
}
