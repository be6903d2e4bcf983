//! `<cosmos-modal-wallet>`: lets the user pick one of the registered signers.
//!
//! Clicking an available signer connects it to the `networks` attribute.
//! Success emits `connect` with the signer and closes the modal; failure
//! emits `reject` and shows an error toast linking to the details.

use std::rc::Rc;

use tracing::{debug, warn};

use super::modal_base::{self, close};
use super::toast::{self, ToastOptions};
use crate::dom::NodeId;
use crate::engine::{
    AttrCell, ComponentDefinition, ComponentOptions, View, define_component, el, emit, fragment,
};
use crate::schema::{Schema, SchemaMap};
use crate::state::formatters::error_value;
use crate::state::wallet::{self, NetworkConfig, SignerHandle, network_config_schema, signer_schema};
use crate::utils::unindent;
use crate::value::Value;

pub const TAG: &str = "cosmos-modal-wallet";

/// Signers handled by a dedicated flow, never listed here.
const HIDDEN_SIGNERS: &[&str] = &["walletconnect"];

const STYLES: &str = "
    h1 {
      font-size: 1.5rem;
      font-weight: normal;
      text-align: center;
    }

    .signers {
      display: flex;
      flex-direction: column;
      gap: var(--cosmos-spacing, 8px);
    }

    .signer {
      display: flex;
      align-items: center;
      gap: var(--cosmos-spacing, 8px);
      padding: var(--cosmos-spacing, 8px);
      cursor: pointer;
      &:disabled {
        cursor: not-allowed;
        opacity: 0.5;
      }
    }

    .logo {
      width: 32px;
      height: 32px;
    }
";

fn networks_of(cell: Option<&AttrCell>) -> Vec<NetworkConfig> {
    cell.map(|c| c.peek())
        .as_ref()
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(NetworkConfig::from_value).collect())
        .unwrap_or_default()
}

fn connect(host: NodeId, signer: &SignerHandle, networks: &[NetworkConfig]) {
    match wallet::connect_signer(signer, networks) {
        Ok(()) => {
            wallet::remember_signer(signer);
            if let Err(err) = emit(host, "connect", Value::object([("signer", signer.to_value())])) {
                warn!(error = %err, "connect not emitted");
            }
            close(host);
        }
        Err(err) => {
            debug!(signer = signer.id(), error = %err, "wallet connection failed");
            let error = error_value(&err);
            if let Err(err) = emit(host, "reject", Value::object([("error", error.clone())])) {
                warn!(error = %err, "reject not emitted");
            }
            if let Err(err) = toast::errorlink(error, Some("Failed to connect wallet."), ToastOptions::default()) {
                warn!(error = %err, "cannot show connection error");
            }
        }
    }
}

fn signer_button(host: NodeId, signer: SignerHandle, networks: Option<AttrCell>) -> View {
    let available = signer.signer().is_available();
    let name = signer.signer().display_name().to_string();
    let logo = signer.signer().logo_url().map(str::to_string);
    let mut button = el("button")
        .class("signer")
        .attr("data-signer", signer.id())
        .on("click", move |_| {
            if signer.signer().is_available() {
                connect(host, &signer, &networks_of(networks.as_ref()));
            }
        });
    if !available {
        button = button.attr("disabled", "");
    }
    if let Some(logo) = logo {
        button = button.child(el("img").class("logo").attr("src", logo).attr("alt", name.clone()));
    }
    button.child(el("div").class("name").child(name)).into()
}

pub fn definition() -> ComponentDefinition {
    define_component(ComponentOptions {
        name: TAG.into(),
        attrs: SchemaMap::new().with("networks", Schema::array(network_config_schema())),
        events: SchemaMap::new()
            .with("connect", Schema::object([("signer", signer_schema())]))
            .with("reject", Schema::object([("error", Schema::any())]))
            .with("close", Schema::any()),
        render: Some(Rc::new(|props| {
            let host = props.host;
            let networks = props.cell("networks").cloned();
            let listed: Vec<SignerHandle> = wallet::signers()
                .into_iter()
                .filter(|s| !HIDDEN_SIGNERS.contains(&s.id()))
                .collect();

            let body: View = if listed.is_empty() {
                el("p")
                    .child("The developer has not enabled any wallets for this dapp.")
                    .into()
            } else {
                el("div")
                    .class("signers")
                    .children(listed.into_iter().map(|s| signer_button(host, s, networks.clone())))
                    .into()
            };

            fragment([
                el("style").child(unindent(STYLES)).into(),
                el(modal_base::TAG)
                    .on("close", move |_| close(host))
                    .child(
                        el("div")
                            .attr("slot", "header")
                            .child(el("h1").child("Connect your wallet")),
                    )
                    .child(el("div").attr("slot", "content").child(body))
                    .into(),
            ])
        })),
        ..Default::default()
    })
}

// =============================================================================
// Tests
// =============================================================================
