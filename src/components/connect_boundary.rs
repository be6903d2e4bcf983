//! `<cosmos-connect-boundary>`: gates its content on a connected wallet.
//!
//! Without a signer the `connect` slot is shown. With a signer but
//! `is-logged-in` explicitly false, the `login` slot is shown. Otherwise the
//! `content` slot. The host carries a `connected` or `disconnected` class and
//! emits `connected` (detail: the signer) whenever a signer becomes current.

use std::rc::Rc;

use spark_signals::effect;
use tracing::warn;

use crate::engine::{ComponentDefinition, ComponentOptions, RenderProps, define_component, el, emit};
use crate::hooks::host_class_switch;
use crate::schema::{Schema, SchemaMap};
use crate::state::wallet::{self, signer_schema};
use crate::types::Cleanup;

pub const TAG: &str = "cosmos-connect-boundary";

fn setup(props: &RenderProps) -> Option<Cleanup> {
    let host = props.host;
    let switch = host_class_switch(host, &["connected", "disconnected"], || {
        Some(if wallet::current_signer().is_some() { "connected" } else { "disconnected" }.to_string())
    });
    let announce = effect(move || {
        if let Some(signer) = wallet::current_signer() {
            if let Err(err) = emit(host, "connected", signer.to_value()) {
                warn!(error = %err, "connected not emitted");
            }
        }
    });
    Some(Box::new(move || {
        switch();
        announce();
    }))
}

pub fn definition() -> ComponentDefinition {
    define_component(ComponentOptions {
        name: TAG.into(),
        attrs: SchemaMap::new().with("is-logged-in", Schema::boolean().optional()),
        events: SchemaMap::new().with("connected", signer_schema()),
        render: Some(Rc::new(|props| {
            let slot = match wallet::current_signer() {
                None => "connect",
                Some(_) if props.read("is-logged-in").as_bool() == Some(false) => "login",
                Some(_) => "content",
            };
            el("slot").attr("name", slot).into()
        })),
        setup: Some(Rc::new(setup)),
        ..Default::default()
    })
}

// =============================================================================
// Tests
// =============================================================================
