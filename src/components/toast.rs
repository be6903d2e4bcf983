//! `<cosmos-toast>` and the toast API.
//!
//! A toast shows a title and slotted content, lives for `lifespan` seconds
//! (5 by default) and then removes itself. While the pointer is over it the
//! countdown is paused.
//!
//! All toasts share the `#cosmos-toast-container` element at the end of the
//! body.
//!
//! # Example
//!
//! ```ignore
//! use cosmos_elements::components::toast;
//!
//! toast::success("Transaction sent.", ToastOptions::default())?;
//! toast::errorlink(error_value(&err), Some("Failed to connect wallet."), ToastOptions::default())?;
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use super::modals;
use crate::dom::{self, NodeId};
use crate::engine::{
    ComponentDefinition, ComponentOptions, RenderProps, define_component, el, fragment, remove_component, set_prop,
};
use crate::error::DomError;
use crate::hooks::host_class_switch;
use crate::schema::{Schema, SchemaMap};
use crate::state::containers::{TOAST_CONTAINER_ID, get_or_create_container};
use crate::state::timers;
use crate::types::{Cleanup, ToastVariant};
use crate::utils::unindent;
use crate::value::Value;

pub const TAG: &str = "cosmos-toast";

/// Default lifespan in seconds.
pub const DEFAULT_LIFESPAN: f64 = 5.0;

const STYLES: &str = "
    :host {
      display: flex;
      flex-direction: column;
      align-items: stretch;
      min-width: 260px;
      max-width: 400px;
      border: 1px solid var(--color);
      border-radius: 4px;
      padding: 4px;
      color: rgb(200, 197, 219);
      background: var(--cosmos-toast-bg, rgb(49, 48, 54));
      box-shadow: 0 4px 10px 0 rgba(0, 0, 0, 0.25);
      font-size: var(--cosmos-base-font-size, 12px);
      line-height: 1.2;
    }

    h1, h2, h3, h4, h5, h6 {
      color: var(--color);
      margin: 0;
      margin-bottom: 4px;
    }

    .lifespan {
      position: absolute;
      bottom: 0;
      left: 0;
      right: 0;
      height: 2px;
      background: var(--color);
    }
";

const GLOBAL_CSS: &str = "
    #cosmos-toast-container {
      display: flex;
      flex-direction: column;
      align-items: flex-end;
      justify-content: flex-end;
      gap: calc(var(--cosmos-spacing, 8px) * 2);
      position: fixed;
      bottom: calc(var(--cosmos-spacing, 8px) * 2);
      right: calc(var(--cosmos-spacing, 8px) * 2);
      z-index: var(--cosmos-toast-z, 1000);
    }

    cosmos-toast {
      --color: rgb(42, 178, 255);
      &.success {
        --color: rgb(49, 187, 30);
      }
      &.error {
        --color: rgb(244, 27, 27);
      }
      &.warn {
        --color: #FF9800;
      }
    }
";

fn variant_of(value: &Value) -> ToastVariant {
    value.as_str().and_then(ToastVariant::parse).unwrap_or_default()
}

/// Start the lifespan countdown and the pointer watch.
fn setup(props: &RenderProps) -> Option<Cleanup> {
    let host = props.host;
    let variant = props.cell("variant").cloned();
    let switch = host_class_switch(host, &ToastVariant::ALL, move || {
        let variant = variant.as_ref().map(|c| c.read()).unwrap_or_default();
        Some(variant_of(&variant).as_str().to_string())
    });

    let lifespan = props
        .cell("lifespan")
        .and_then(|c| c.peek().as_f64())
        .filter(|s| s.is_finite() && *s >= 0.0)
        .unwrap_or(DEFAULT_LIFESPAN);
    let timer = timers::set_timeout(Duration::from_secs_f64(lifespan), move || {
        debug!(?host, "toast expired");
        remove_component(host);
        dom::release(host);
    });

    let doc = dom::owner_document(host).unwrap_or_else(dom::document);
    let watch = dom::body(doc).map(|body| {
        let id = dom::add_event_listener(body, "mousemove", move |event| {
            let inside = event.target().is_some_and(|target| dom::contains(host, target));
            if inside {
                timers::pause(timer);
            } else {
                timers::resume(timer);
            }
        });
        (body, id)
    });

    Some(Box::new(move || {
        switch();
        timers::clear_timeout(timer);
        if let Some((body, id)) = watch {
            dom::remove_event_listener(body, id);
        }
    }))
}

pub fn definition() -> ComponentDefinition {
    define_component(ComponentOptions {
        name: TAG.into(),
        attrs: SchemaMap::new()
            .with("variant", Schema::enumeration(ToastVariant::ALL).optional())
            .with("title", Schema::string().optional())
            .with("lifespan", Schema::number().optional()),
        render: Some(Rc::new(|props| {
            let variant = variant_of(&props.read("variant"));
            let title = props
                .read("title")
                .as_str()
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| variant.default_title().to_string());
            fragment([
                el("style").child(unindent(STYLES)).into(),
                el("div").class("title").child(el("h3").child(title)).into(),
                el("div")
                    .class("content")
                    .child(el("slot").attr("name", "content").child("Toast content"))
                    .into(),
                el("div").class("lifespan").into(),
            ])
        })),
        setup: Some(Rc::new(setup)),
        css: Some(unindent(GLOBAL_CSS)),
        ..Default::default()
    })
}

// =============================================================================
// Toast API
// =============================================================================

/// Body of a toast.
#[derive(Debug, Clone, PartialEq)]
pub enum ToastContent {
    Text(String),
    Node(NodeId),
}

impl From<&str> for ToastContent {
    fn from(s: &str) -> Self {
        ToastContent::Text(s.to_string())
    }
}

impl From<String> for ToastContent {
    fn from(s: String) -> Self {
        ToastContent::Text(s)
    }
}

impl From<NodeId> for ToastContent {
    fn from(id: NodeId) -> Self {
        ToastContent::Node(id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToastOptions {
    /// Heading; defaults to the variant name ("Info", "Warning", ...).
    pub title: Option<String>,
    /// Seconds before the toast removes itself.
    pub lifespan: Option<f64>,
}

/// Append a toast to the shared toast container.
pub fn show(content: impl Into<ToastContent>, variant: ToastVariant, options: ToastOptions) -> Result<NodeId, DomError> {
    let toast = dom::create_element(TAG);
    set_prop(toast, "variant", variant.as_str());
    if let Some(title) = options.title {
        set_prop(toast, "title", title);
    }
    if let Some(lifespan) = options.lifespan {
        set_prop(toast, "lifespan", lifespan);
    }

    let child = match content.into() {
        ToastContent::Text(text) => {
            let span = dom::create_element("span");
            dom::set_text_content(span, &text)?;
            span
        }
        ToastContent::Node(node) => node,
    };
    dom::set_attribute(child, "slot", "content");
    dom::append_child(toast, child)?;

    let container = get_or_create_container(TOAST_CONTAINER_ID)?;
    dom::append_child(container, toast)?;
    debug!(variant = variant.as_str(), "toast shown");
    Ok(toast)
}

pub fn info(content: impl Into<ToastContent>, options: ToastOptions) -> Result<NodeId, DomError> {
    show(content, ToastVariant::Info, options)
}

pub fn success(content: impl Into<ToastContent>, options: ToastOptions) -> Result<NodeId, DomError> {
    show(content, ToastVariant::Success, options)
}

pub fn error(content: impl Into<ToastContent>, options: ToastOptions) -> Result<NodeId, DomError> {
    show(content, ToastVariant::Error, options)
}

pub fn warn(content: impl Into<ToastContent>, options: ToastOptions) -> Result<NodeId, DomError> {
    show(content, ToastVariant::Warn, options)
}

thread_local! {
    static LINK_COUNTER: Cell<u64> = const { Cell::new(0) };
}

/// Error toast with a short message and a "See details." link that opens
/// the error modal for `error`.
pub fn errorlink(error: Value, message: Option<&str>, options: ToastOptions) -> Result<NodeId, DomError> {
    let n = LINK_COUNTER.with(|c| {
        c.set(c.get() + 1);
        c.get()
    });
    let id = format!("cosmos-errorlink-{n}");

    let link = dom::create_element("a");
    dom::set_attribute(link, "id", &id);
    dom::set_attribute(link, "href", &format!("#{id}"));
    dom::set_attribute(link, "style", "color: cornflowerblue");
    dom::set_text_content(link, "See details.")?;
    dom::add_event_listener(link, "click", move |event| {
        event.prevent_default();
        if let Err(err) = modals::show_error_modal(error.clone()) {
            tracing::warn!(error = %err, "cannot open error modal");
        }
    });

    let span = dom::create_element("span");
    let text = dom::create_text(&format!("{} ", message.unwrap_or("An error occurred.")));
    dom::append_child(span, text)?;
    dom::append_child(span, link)?;
    self::error(span, options)
}

// =============================================================================
// Tests
// =============================================================================
