//! `<cosmos-user-address>`: the connected account as a `<cosmos-address>`.
//!
//! Without a connected wallet the `not-connected` slot is shown.

use std::rc::Rc;

use super::address;
use crate::engine::{ComponentDefinition, ComponentOptions, define_component, el, fragment};
use crate::state::wallet;
use crate::utils::unindent;

pub const TAG: &str = "cosmos-user-address";

const STYLES: &str = "
    span {
      display: inline-block;
      font-family: monospace;
      font-style: italic;
    }
";

pub fn definition() -> ComponentDefinition {
    define_component(ComponentOptions {
        name: TAG.into(),
        render: Some(Rc::new(|_| match wallet::current_address() {
            Some(addr) => {
                let mut view = el(address::TAG).prop("value", addr);
                if let Some(prefix) = wallet::current_network().and_then(|n| n.bech32_prefix) {
                    view = view.prop("bech32prefix", prefix);
                }
                view.into()
            }
            None => fragment([
                el("style").child(unindent(STYLES)).into(),
                el("slot")
                    .attr("name", "not-connected")
                    .child(el("span").child("No wallet connected"))
                    .into(),
            ]),
        })),
        ..Default::default()
    })
}
