//! `<cosmos-gas-estimate>`: the estimated fee of a pending transaction.
//!
//! Shows a small spinner until the first estimate arrives, then the first
//! fee coin as a `<cosmos-balance>` (with `+N` when the fee has more
//! coins). A failed estimate shows a link to the error modal and sets the
//! `invalid` class on the host.

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::effect;
use tracing::warn;

use super::{balance, modals, spinner};
use crate::decimal::Decimal;
use crate::dom::{self, Event};
use crate::engine::{ComponentDefinition, ComponentOptions, RenderProps, View, define_component, el, fragment};
use crate::schema::{Schema, SchemaMap};
use crate::state::wallet::{Coin, NetworkConfig, TxEstimate};
use crate::types::Cleanup;
use crate::utils::unindent;

pub const TAG: &str = "cosmos-gas-estimate";

/// Decimals assumed for coins without asset metadata.
const FALLBACK_DECIMALS: u32 = 6;

const STYLES: &str = "
    :host {
      font-family: var(--cosmos-font, -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif);
    }
";

fn tx_schema() -> Schema {
    Schema::custom("TxEstimate", |value| {
        TxEstimate::from_value(value)
            .map(|tx| tx.to_value())
            .ok_or_else(|| "expected a transaction estimate".to_string())
    })
}

/// Amount and display denom of `coin` on `network`.
pub fn coin_display(coin: &Coin, network: Option<&NetworkConfig>) -> (Option<Decimal>, String) {
    let asset = network.and_then(|n| n.find_asset(&coin.denom));
    let display = asset.and_then(|a| a.display.as_ref());
    let decimals = display
        .and_then(|d| d.decimals)
        .or_else(|| asset.and_then(|a| a.decimals))
        .unwrap_or(FALLBACK_DECIMALS);
    let amount = coin
        .amount
        .parse::<i128>()
        .ok()
        .map(|units| Decimal::new(units, decimals));
    let denom = display
        .and_then(|d| d.symbol.clone())
        .or_else(|| asset.map(|a| a.denom.clone()))
        .unwrap_or_else(|| coin.denom.clone());
    (amount, denom)
}

fn setup(props: &RenderProps) -> Option<Cleanup> {
    let host = props.host;
    let tx = props.cell("tx").cloned()?;

    let invalid_tx = tx.clone();
    let invalid = effect(move || {
        let failed = TxEstimate::from_value(&invalid_tx.read()).is_some_and(|tx| tx.estimate().error.is_some());
        dom::toggle_class(host, "invalid", failed);
    });

    // Restart observation whenever a different transaction is assigned.
    let running: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));
    let current = running.clone();
    let observe = effect(move || {
        let previous = current.borrow_mut().take();
        if let Some(stop) = previous {
            stop();
        }
        let started = TxEstimate::from_value(&tx.read()).and_then(|tx| tx.start());
        *current.borrow_mut() = started;
    });

    Some(Box::new(move || {
        invalid();
        observe();
        let stop = running.borrow_mut().take();
        if let Some(stop) = stop {
            stop();
        }
    }))
}

fn render(props: &RenderProps) -> View {
    let Some(tx) = TxEstimate::from_value(&props.read("tx")) else {
        return View::Empty;
    };
    let estimate = tx.estimate();

    if let Some(error) = estimate.error {
        let open = move |event: &Event| {
            event.prevent_default();
            if let Err(err) = modals::show_error_modal(error.clone()) {
                warn!(error = %err, "cannot open error modal");
            }
        };
        return fragment([
            el("style").child(unindent(STYLES)).into(),
            el("a").attr("href", "#").on("click", open).child("Estimation error").into(),
        ]);
    }

    let coins = estimate.gas.unwrap_or_default();
    let Some(first) = coins.first() else {
        return el(spinner::TAG).attr("size", "xxs").into();
    };

    let network = tx.network();
    let (amount, denom) = coin_display(first, network.as_ref());
    let mut coin = el(balance::TAG).prop("denom", denom);
    if let Some(amount) = amount {
        coin = coin.prop("value", amount);
    }
    let mut span = el("span").child(coin);
    if coins.len() > 1 {
        span = span.child(" +").child(el("span").child((coins.len() - 1).to_string()));
    }
    fragment([el("style").child(unindent(STYLES)).into(), span.into()])
}

pub fn definition() -> ComponentDefinition {
    define_component(ComponentOptions {
        name: TAG.into(),
        attrs: SchemaMap::new().with("tx", tx_schema()),
        render: Some(Rc::new(render)),
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
    use std::cell::Cell;

    use crate::components::{modal_base, modal_error};
    use crate::dom::NodeId;
    use crate::engine::{attr_cell, set_prop};
    use crate::state::containers::{MODAL_CONTAINER_ID, container};
    use crate::state::wallet::{Asset, AssetDisplay, Estimate, reset_wallet};
    use crate::types::EventFlags;
    use crate::value::Value;

    fn neutron() -> NetworkConfig {
        NetworkConfig {
            ecosystem: "cosmos".into(),
            name: "neutron".into(),
            chain_id: "neutron-1".into(),
            bech32_prefix: Some("neutron".into()),
            assets: vec![Asset {
                denom: "untrn".into(),
                decimals: Some(6),
                display: Some(AssetDisplay {
                    symbol: Some("NTRN".into()),
                    decimals: None,
                }),
            }],
        }
    }

    fn setup() -> NodeId {
        dom::reset_dom();
        reset_wallet();
        for definition in [
            definition(),
            balance::definition(),
            spinner::definition(),
            modal_base::definition(),
            modal_error::definition(),
        ] {
            let _ = definition.register();
        }
        dom::body(dom::document()).unwrap()
    }

    fn mount(body: NodeId, tx: &TxEstimate) -> NodeId {
        let gas = dom::create_element(TAG);
        set_prop(gas, "tx", tx.to_value());
        dom::append_child(body, gas).unwrap();
        gas
    }

    #[test]
    fn test_coin_display_fallbacks() {
        let network = neutron();
        let (amount, denom) = coin_display(&Coin::new("untrn", "1500000"), Some(&network));
        assert_eq!(amount, Some(Decimal::new(1_500_000, 6)));
        assert_eq!(denom, "NTRN");

        let (amount, denom) = coin_display(&Coin::new("uatom", "42"), Some(&network));
        assert_eq!(amount, Some(Decimal::new(42, 6)));
        assert_eq!(denom, "uatom");
    }

    #[test]
    fn test_spinner_then_balance() {
        let body = setup();
        let tx = TxEstimate::new(Some(neutron()));
        let gas = mount(body, &tx);
        let root = dom::shadow_root(gas).unwrap();
        let spinners = dom::find_by_tag(root, spinner::TAG);
        assert_eq!(spinners.len(), 1);
        assert_eq!(dom::get_attribute(spinners[0], "size").as_deref(), Some("xxs"));

        tx.set_estimate(Estimate {
            gas: Some(vec![Coin::new("untrn", "1500000"), Coin::new("uatom", "1")]),
            error: None,
        });
        let balance = dom::find_by_tag_deep(root, balance::TAG)[0];
        assert_eq!(attr_cell(balance, "denom").unwrap().peek().as_str(), Some("NTRN"));
        assert!(dom::text_content(root).ends_with(" +1"));
    }

    #[test]
    fn test_error_link_and_invalid_class() {
        let body = setup();
        let tx = TxEstimate::new(Some(neutron()));
        let gas = mount(body, &tx);
        assert!(!dom::has_class(gas, "invalid"));

        tx.set_estimate(Estimate {
            gas: None,
            error: Some(Value::from("out of gas")),
        });
        assert!(dom::has_class(gas, "invalid"));

        let root = dom::shadow_root(gas).unwrap();
        let link = dom::find_by_tag(root, "a")[0];
        let event = dom::dispatch_event(link, Event::new("click", EventFlags::BUBBLES | EventFlags::CANCELABLE));
        assert!(event.default_prevented());
        assert_eq!(dom::children(container(MODAL_CONTAINER_ID).unwrap()).len(), 1);
    }

    #[test]
    fn test_start_hook_runs_while_mounted() {
        let body = setup();
        let running = Rc::new(Cell::new(0));
        let r = running.clone();
        let tx = TxEstimate::new(None).with_start(move |_| {
            r.set(r.get() + 1);
            let r = r.clone();
            Some(Box::new(move || r.set(r.get() - 1)))
        });
        let gas = mount(body, &tx);
        assert_eq!(running.get(), 1);

        dom::remove(gas);
        assert_eq!(running.get(), 0);
    }
}
