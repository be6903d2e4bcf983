//! Opening modals from code.
//!
//! Every modal is appended to the shared `#modal-container`; it removes
//! itself when closed.

use tracing::debug;

use super::{modal_error, modal_wallet};
use crate::dom::{self, NodeId};
use crate::engine::set_prop;
use crate::error::DomError;
use crate::state::containers::{MODAL_CONTAINER_ID, get_or_create_container};
use crate::state::wallet::NetworkConfig;
use crate::value::Value;

fn open(tag: &str, props: Vec<(&str, Value)>) -> Result<NodeId, DomError> {
    let modal = dom::create_element(tag);
    for (name, value) in props {
        set_prop(modal, name, value);
    }
    let container = get_or_create_container(MODAL_CONTAINER_ID)?;
    dom::append_child(container, modal)?;
    debug!(tag, "modal opened");
    Ok(modal)
}

/// Show `error` in a `<cosmos-modal-error>`.
pub fn show_error_modal(error: impl Into<Value>) -> Result<NodeId, DomError> {
    open(modal_error::TAG, vec![("error", error.into())])
}

/// Let the user pick a signer for `networks`.
pub fn show_wallet_modal(networks: &[NetworkConfig]) -> Result<NodeId, DomError> {
    let networks = Value::Array(networks.iter().map(NetworkConfig::to_value).collect());
    open(modal_wallet::TAG, vec![("networks", networks)])
}
