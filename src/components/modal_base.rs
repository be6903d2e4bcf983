//! `<cosmos-modal-base>`: backdrop, frame and close button shared by all
//! modals.
//!
//! Slots: `header` (defaults to an `<h2>` with the `title` attribute),
//! `content` and `footer`. Clicking the backdrop itself or the close button
//! emits `close` and removes the modal.

use std::rc::Rc;

use tracing::warn;

use crate::dom::{Event, NodeId};
use crate::engine::{ComponentDefinition, ComponentOptions, View, define_component, el, emit, fragment, remove_component};
use crate::schema::{Schema, SchemaMap};
use crate::utils::unindent;
use crate::value::Value;

pub const TAG: &str = "cosmos-modal-base";

const STYLES: &str = "
    :host {
      position: fixed;
      inset: 0;
    }

    * {
      margin: 0;
      padding: 0;
      box-sizing: border-box;
    }

    .backdrop {
      position: absolute;
      inset: 0;
      display: flex;
      flex-direction: column;
      align-items: center;
      background: rgba(0, 0, 0, 0.5);
      backdrop-filter: blur(10px);
    }

    .padding {
      flex-grow: 1;
      height: 100px;
    }

    .modal {
      min-width: 360px;
      max-width: 90vw;
      padding: var(--cosmos-spacing, 8px);
      background: var(--cosmos-bg-panel, rgb(49, 48, 54));
      border: 2px solid var(--cosmos-color-line, rgb(67, 66, 73));
      border-radius: calc(var(--cosmos-roundness, 4px) * 2);
    }

    .close {
      width: 24px;
      height: 24px;
      margin-left: auto;
      cursor: pointer;
    }
";

/// Emit `close` on `host` and take it out of the document.
pub fn close(host: NodeId) {
    if let Err(err) = emit(host, "close", Value::Undefined) {
        warn!(error = %err, "modal close not emitted");
    }
    remove_component(host);
}

fn close_icon() -> View {
    el("svg")
        .attr("viewBox", "0 0 24 24")
        .child(el("path").attr("d", "M7 17L16.8995 7.10051").attr("stroke", "currentColor"))
        .child(el("path").attr("d", "M7 7.00001L16.8995 16.8995").attr("stroke", "currentColor"))
        .into()
}

pub fn definition() -> ComponentDefinition {
    define_component(ComponentOptions {
        name: TAG.into(),
        attrs: SchemaMap::new().with("title", Schema::string().optional()),
        events: SchemaMap::new().with("close", Schema::any()),
        render: Some(Rc::new(|props| {
            let host = props.host;
            let title = props.read("title").as_str().map(str::to_string);
            let on_backdrop = move |event: &Event| {
                if event.target() == event.current_target() {
                    close(host);
                }
            };

            fragment([
                el("style").child(unindent(STYLES)).into(),
                el("div")
                    .class("backdrop")
                    .on("click", on_backdrop)
                    .child(el("div").class("upper").class("padding").attr("aria-hidden", "true"))
                    .child(
                        el("div")
                            .class("modal")
                            .attr("part", "modal")
                            .child(
                                el("header")
                                    .child(el("slot").attr("name", "header").child(el("h2").child(title)))
                                    .child(
                                        el("button")
                                            .class("close")
                                            .on("click", move |_| close(host))
                                            .child(close_icon()),
                                    ),
                            )
                            .child(
                                el("div")
                                    .class("content-container")
                                    .child(el("main").class("content").child(el("slot").attr("name", "content"))),
                            )
                            .child(el("footer").child(el("slot").attr("name", "footer"))),
                    )
                    .child(el("div").class("lower").class("padding").attr("aria-hidden", "true"))
                    .into(),
            ])
        })),
        ..Default::default()
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::dom;
    use crate::engine::on_event;
    use crate::types::EventFlags;

    fn setup() -> NodeId {
        dom::reset_dom();
        let _ = definition().register();
        let body = dom::body(dom::document()).unwrap();
        let modal = dom::create_element(TAG);
        dom::set_attribute(modal, "title", "Hello");
        dom::append_child(body, modal).unwrap();
        modal
    }

    fn click(target: NodeId) {
        dom::dispatch_event(target, Event::new("click", EventFlags::BUBBLES | EventFlags::COMPOSED));
    }

    #[test]
    fn test_title_in_header_slot() {
        let modal = setup();
        let root = dom::shadow_root(modal).unwrap();
        assert_eq!(dom::text_content(dom::find_by_tag(root, "h2")[0]), "Hello");
    }

    #[test]
    fn test_close_button_emits_and_removes() {
        let modal = setup();
        let closed = Rc::new(Cell::new(0));
        let c = closed.clone();
        on_event(modal, "close", move |_| c.set(c.get() + 1)).unwrap();

        let root = dom::shadow_root(modal).unwrap();
        let button = dom::find_by_tag(root, "button")[0];
        click(button);
        assert_eq!(closed.get(), 1);
        assert!(dom::parent(modal).is_none());
    }

    #[test]
    fn test_backdrop_only_closes_on_itself() {
        let modal = setup();
        let root = dom::shadow_root(modal).unwrap();
        let inner = dom::find_by_tag(root, "main")[0];
        click(inner);
        assert!(dom::parent(modal).is_some());

        let backdrop = dom::children(root)[1];
        click(backdrop);
        assert!(dom::parent(modal).is_none());
    }
}
