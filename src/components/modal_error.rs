//! `<cosmos-modal-error>`: shows an error through the formatter registry.
//!
//! Text results go into a `<pre>` in the `details` slot. When a formatter
//! returns an element instead, that element is slotted into the host as
//! `details`, replacing the previous one.

use std::rc::Rc;

use spark_signals::effect;

use super::modal_base::{self, close};
use crate::dom::{self, NodeId};
use crate::engine::{ComponentDefinition, ComponentOptions, RenderProps, define_component, el, fragment};
use crate::schema::{Schema, SchemaMap};
use crate::state::formatters::{Formatted, format_error};
use crate::types::Cleanup;

pub const TAG: &str = "cosmos-modal-error";

const STYLES: &str = "
    * {
      margin: 0;
      padding: 0;
      box-sizing: border-box;
    }

    h2 {
      color: rgb(200, 197, 219);
      margin: 0;
      font-weight: normal;
    }
";

fn slotted_details(host: NodeId) -> Vec<NodeId> {
    dom::children(host)
        .into_iter()
        .filter(|c| dom::get_attribute(*c, "slot").as_deref() == Some("details"))
        .collect()
}

/// Slot element results of the formatter into the host.
fn setup(props: &RenderProps) -> Option<Cleanup> {
    let host = props.host;
    let error = props.cell("error").cloned()?;
    let stop = effect(move || {
        let Formatted::Node(node) = format_error(&error.read()) else {
            return;
        };
        if slotted_details(host).contains(&node) {
            return;
        }
        for existing in slotted_details(host) {
            dom::remove(existing);
        }
        dom::set_attribute(node, "slot", "details");
        if let Err(err) = dom::append_child(host, node) {
            tracing::warn!(error = %err, "cannot slot formatted error");
        }
    });
    Some(Box::new(stop))
}

pub fn definition() -> ComponentDefinition {
    define_component(ComponentOptions {
        name: TAG.into(),
        attrs: SchemaMap::new().with("error", Schema::any()),
        events: SchemaMap::new().with("close", Schema::any()),
        render: Some(Rc::new(|props| {
            let host = props.host;
            let text = match format_error(&props.read("error")) {
                Formatted::Text(text) => Some(text),
                Formatted::Node(_) => None,
            };
            fragment([
                el("style").child(crate::utils::unindent(STYLES)).into(),
                el(modal_base::TAG)
                    .on("close", move |_| close(host))
                    .child(
                        el("slot")
                            .attr("name", "title")
                            .attr("slot", "header")
                            .child(el("h2").child("Error")),
                    )
                    .child(
                        el("slot")
                            .attr("name", "details")
                            .attr("slot", "content")
                            .child(el("pre").child(text)),
                    )
                    .into(),
            ])
        })),
        setup: Some(Rc::new(setup)),
        ..Default::default()
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::set_prop;
    use crate::state::formatters::{ErrorFormatter, add_formatters, reset_formatters};
    use crate::value::Value;

    fn setup() -> NodeId {
        dom::reset_dom();
        reset_formatters();
        let _ = modal_base::definition().register();
        let _ = definition().register();
        dom::body(dom::document()).unwrap()
    }

    #[test]
    fn test_text_error_in_pre() {
        let body = setup();
        let modal = dom::create_element(TAG);
        set_prop(modal, "error", "insufficient funds");
        dom::append_child(body, modal).unwrap();

        let root = dom::shadow_root(modal).unwrap();
        let pre = dom::find_by_tag(root, "pre")[0];
        assert_eq!(dom::text_content(pre), "insufficient funds");
    }

    #[test]
    fn test_node_formatter_is_slotted() {
        let body = setup();
        let details = dom::create_element("div");
        let _remove = add_formatters(vec![Rc::new(move |_: &Value| Some(Formatted::Node(details))) as ErrorFormatter]);

        let modal = dom::create_element(TAG);
        set_prop(modal, "error", Value::object([("code", Value::from(11))]));
        dom::append_child(body, modal).unwrap();

        assert_eq!(slotted_details(modal), vec![details]);
        let root = dom::shadow_root(modal).unwrap();
        assert_eq!(dom::text_content(dom::find_by_tag(root, "pre")[0]), "");
    }

    #[test]
    fn test_inner_close_removes_modal() {
        let body = setup();
        let modal = dom::create_element(TAG);
        set_prop(modal, "error", "x");
        dom::append_child(body, modal).unwrap();

        let root = dom::shadow_root(modal).unwrap();
        let base = dom::find_by_tag(root, modal_base::TAG)[0];
        close(base);
        assert!(dom::parent(modal).is_none());
    }
}
