//! `<cosmos-address>`: a trimmed bech32 address.
//!
//! The human-readable prefix stays intact when `bech32prefix` is given; only
//! the data part is trimmed to `trimsize` leading and trailing characters.
//! Hovering shows the full address in a tooltip, clicking copies it.

use std::rc::Rc;

use tracing::warn;

use super::toast::{self, ToastOptions};
use crate::dom::Event;
use crate::engine::{ComponentDefinition, ComponentOptions, RenderProps, View, define_component, el, fragment};
use crate::hooks::{UseTooltipOptions, or_warn, use_tooltip};
use crate::schema::{Schema, SchemaMap};
use crate::state::clipboard;
use crate::types::Cleanup;
use crate::utils::{trim_address, unindent};
use crate::value::Value;

pub const TAG: &str = "cosmos-address";

/// Characters kept on each side of the ellipsis.
pub const DEFAULT_TRIM_SIZE: usize = 6;

const STYLES: &str = "
    :host {
      display: inline-block;
      font-family: monospace;
      text-decoration-line: underline;
      text-decoration-style: dotted;
      cursor: pointer;
    }
";

/// Shorten `address`, keeping its `prefix` + `1` separator when present.
pub fn display_address(address: &str, prefix: Option<&str>, trim_size: usize) -> String {
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => {
            let data = address
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('1'))
                .unwrap_or(address);
            format!("{prefix}1{}", trim_address(data, trim_size))
        }
        None => trim_address(address, trim_size),
    }
}

/// `trimsize` as a grapheme count. Negative values fall back to the default,
/// fractions are dropped and huge values saturate (nothing gets trimmed).
fn trim_size(value: &Value) -> usize {
    value
        .as_f64()
        .filter(|n| *n >= 0.0)
        .map_or(DEFAULT_TRIM_SIZE, |n| n.trunc().min(usize::MAX as f64) as usize)
}

fn setup(props: &RenderProps) -> Option<Cleanup> {
    let value = props.cell("value").cloned()?;
    or_warn(
        TAG,
        use_tooltip(
            props.host,
            move || el("span").child(value.read().as_str().map(str::to_string)).into(),
            UseTooltipOptions::default(),
        ),
    )
}

pub fn definition() -> ComponentDefinition {
    define_component(ComponentOptions {
        name: TAG.into(),
        attrs: SchemaMap::new()
            .with("value", Schema::string())
            .with("bech32prefix", Schema::string().optional())
            .with("trimsize", Schema::number().optional()),
        render: Some(Rc::new(|props| {
            let value = props.read("value").as_str().unwrap_or_default().to_string();
            let prefix = props.read("bech32prefix");
            let trim_size = trim_size(&props.read("trimsize"));
            let shown = display_address(&value, prefix.as_str(), trim_size);

            let copy = move |_: &Event| {
                clipboard::write_text(&value);
                if let Err(err) = toast::info("Address copied to clipboard.", ToastOptions::default()) {
                    warn!(error = %err, "cannot show copy toast");
                }
            };
            fragment([
                el("style").child(unindent(STYLES)).into(),
                View::from(el("span").on("click", copy).child(shown)),
            ])
        })),
        setup: Some(Rc::new(setup)),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{self, Event, NodeId};
    use crate::engine::attr_cell;
    use crate::state::containers::{TOAST_CONTAINER_ID, TOOLTIP_CONTAINER_ID, container};
    use crate::state::timers;
    use crate::types::EventFlags;

    const ADDRESS: &str = "neutron1jqz2205er0d8657ugll98c462cyplkcqmjthzv";

    fn setup() -> NodeId {
        dom::reset_dom();
        timers::reset_timers();
        clipboard::reset_clipboard();
        let _ = definition().register();
        let _ = toast::definition().register();
        let _ = crate::components::tooltip::definition().register();
        dom::body(dom::document()).unwrap()
    }

    fn shown(address: NodeId) -> String {
        let root = dom::shadow_root(address).unwrap();
        dom::text_content(dom::find_by_tag(root, "span")[0])
    }

    #[test]
    fn test_display_address() {
        assert_eq!(display_address(ADDRESS, None, 6), "neutro…mjthzv");
        assert_eq!(display_address(ADDRESS, Some("neutron"), 6), "neutron1jqz220…mjthzv");
        assert_eq!(display_address("cosmos1abc", Some("neutron"), 6), "neutron1cosmos1abc");
    }

    #[test]
    fn test_trimmed_with_full_value_in_cell() {
        let body = setup();
        let address = dom::create_element(TAG);
        dom::set_attribute(address, "value", ADDRESS);
        dom::append_child(body, address).unwrap();

        assert_eq!(shown(address), "neutro…mjthzv");
        assert_eq!(attr_cell(address, "value").unwrap().peek().as_str(), Some(ADDRESS));

        dom::set_attribute(address, "bech32prefix", "neutron");
        assert_eq!(shown(address), "neutron1jqz220…mjthzv");
        dom::set_attribute(address, "trimsize", "3");
        assert_eq!(shown(address), "neutron1jqz…hzv");
    }

    #[test]
    fn test_extreme_trimsize_renders_untrimmed() {
        let body = setup();
        let address = dom::create_element(TAG);
        dom::set_attribute(address, "value", ADDRESS);
        dom::set_attribute(address, "trimsize", "1e300");
        dom::append_child(body, address).unwrap();
        assert_eq!(shown(address), ADDRESS);

        dom::set_attribute(address, "trimsize", "2.9");
        assert_eq!(shown(address), "ne…zv");
        dom::set_attribute(address, "trimsize", "-4");
        assert_eq!(shown(address), "neutro…mjthzv");
    }

    #[test]
    fn test_tooltip_shows_full_address() {
        let body = setup();
        let address = dom::create_element(TAG);
        dom::set_attribute(address, "value", ADDRESS);
        dom::append_child(body, address).unwrap();

        let tooltips = dom::children(container(TOOLTIP_CONTAINER_ID).unwrap());
        assert_eq!(tooltips.len(), 1);
        let wrapper = dom::children(tooltips[0])[0];
        let content = dom::shadow_root(wrapper).unwrap();
        assert_eq!(dom::text_content(content), ADDRESS);
    }

    #[test]
    fn test_click_copies_and_toasts() {
        let body = setup();
        let address = dom::create_element(TAG);
        dom::set_attribute(address, "value", ADDRESS);
        dom::append_child(body, address).unwrap();

        let root = dom::shadow_root(address).unwrap();
        let span = dom::find_by_tag(root, "span")[0];
        dom::dispatch_event(span, Event::new("click", EventFlags::BUBBLES | EventFlags::COMPOSED));
        assert_eq!(clipboard::read_text().as_deref(), Some(ADDRESS));
        assert_eq!(dom::children(container(TOAST_CONTAINER_ID).unwrap()).len(), 1);
    }

    #[test]
    fn test_disconnect_releases_document_listeners() {
        let body = setup();
        let doc = dom::document();
        let before = dom::listener_count(doc);
        let address = dom::create_element(TAG);
        dom::set_attribute(address, "value", ADDRESS);
        dom::append_child(body, address).unwrap();
        assert_eq!(dom::listener_count(doc), before + 1);

        dom::remove(address);
        assert_eq!(dom::listener_count(doc), before);
    }
}
