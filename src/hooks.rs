//! Reusable pieces of component behavior.
//!
//! Hooks create effects, so call them from a component's `setup` function
//! (which runs once per mount inside the component's effect scope), not from
//! `render` (which re-runs). Each returns a cleanup; inside `setup` the
//! scope stops the effects anyway, but the cleanup is still what tears down
//! any DOM they created.

use spark_signals::effect;
use tracing::warn;

use crate::components::tooltip::{self, TooltipOptions};
use crate::dom::{self, NodeId};
use crate::engine::view::{View, reconcile};
use crate::error::DomError;
use crate::types::{Cleanup, ShadowMode};

/// Keep exactly one class of `all` on `host`: whatever `pick` returns.
///
/// `pick` runs in an effect, so the class follows any signal it reads.
pub fn host_class_switch(host: NodeId, all: &[&str], pick: impl Fn() -> Option<String> + 'static) -> Cleanup {
    let all: Vec<String> = all.iter().map(|c| c.to_string()).collect();
    let stop = effect(move || {
        for class in &all {
            dom::remove_class(host, class);
        }
        if let Some(class) = pick() {
            dom::add_class(host, &class);
        }
    });
    Box::new(stop)
}

/// Render `content` into `root`, or into a shadow root attached to it.
///
/// Re-renders when signals read by `content` change. The cleanup stops
/// rendering and empties the target.
pub fn subrender(root: NodeId, shadow: ShadowMode, content: impl Fn() -> View + 'static) -> Result<Cleanup, DomError> {
    let target = if shadow.uses_shadow() {
        match dom::shadow_root_any(root) {
            Some(existing) => existing,
            None => dom::attach_shadow(root, shadow)?,
        }
    } else {
        root
    };

    let stop = effect(move || reconcile(target, &content()));
    Ok(Box::new(move || {
        stop();
        reconcile(target, &View::Empty);
    }))
}

/// Options for [`use_tooltip`].
#[derive(Clone, Default)]
pub struct UseTooltipOptions {
    pub tooltip: TooltipOptions,
    /// How the content wrapper holds the rendered content.
    pub shadow: ShadowMode,
}

/// Attach a tooltip showing `content` to `trigger`.
///
/// The content is rendered into a fresh `<div>`, which becomes the tooltip's
/// slotted content. The cleanup destroys the tooltip.
pub fn use_tooltip(
    trigger: NodeId,
    content: impl Fn() -> View + 'static,
    options: UseTooltipOptions,
) -> Result<Cleanup, DomError> {
    let doc = dom::owner_document(trigger).unwrap_or_else(dom::document);
    let wrapper = dom::create_element_in(doc, "div");
    let stop_content = subrender(wrapper, options.shadow, content)?;
    let handle = match tooltip::create(trigger, wrapper, options.tooltip) {
        Ok(handle) => handle,
        Err(err) => {
            stop_content();
            dom::release(wrapper);
            return Err(err);
        }
    };

    Ok(Box::new(move || {
        handle.destroy();
        stop_content();
    }))
}

/// Run `hook` and log instead of failing; for use in `setup` functions.
pub(crate) fn or_warn(component: &str, hook: Result<Cleanup, DomError>) -> Option<Cleanup> {
    match hook {
        Ok(cleanup) => Some(cleanup),
        Err(err) => {
            warn!(component, error = %err, "hook failed");
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
