//! Wallet State - Signers, networks and transaction estimates
//!
//! The components consume wallet functionality without implementing it.
//! This module holds the seams an application plugs into:
//!
//! - **Signers** - implementations of [`Signer`], registered once at startup
//! - **Current signer / network** - reactive slots read by components
//! - **Persistence** - remembering the last signer through [`SignerStorage`]
//! - **Transaction estimates** - [`TxEstimate`], the live gas estimate of a
//!   pending transaction
//!
//! # Example
//!
//! ```ignore
//! use cosmos_elements::state::wallet;
//!
//! wallet::register_signer(MyKeplr::new());
//! if !wallet::reconnect_signer(&networks) {
//!     modals::show_wallet_modal(&networks)?;
//! }
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use spark_signals::{Signal, signal};
use tracing::{debug, warn};

use crate::error::SignerError;
use crate::schema::Schema;
use crate::types::Cleanup;
use crate::value::{Opaque, Value};

/// Storage key holding the remembered signer id.
pub const SIGNER_STORAGE_KEY: &str = "signer";

// =============================================================================
// Networks
// =============================================================================

/// Display metadata of an asset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDisplay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub denom: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<AssetDisplay>,
}

/// Network configuration as the application provides it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub ecosystem: String,
    pub name: String,
    pub chain_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bech32_prefix: Option<String>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl NetworkConfig {
    /// Asset metadata for `denom`. Only cosmos networks carry an asset list.
    pub fn find_asset(&self, denom: &str) -> Option<&Asset> {
        match self.ecosystem.as_str() {
            "cosmos" => self.assets.iter().find(|a| a.denom == denom),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).map(Value::from).unwrap_or_default()
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.to_json()).ok()
    }
}

/// Validates one network config object, normalizing its shape.
pub fn network_config_schema() -> Schema {
    Schema::custom("NetworkConfig", |value| {
        NetworkConfig::from_value(value)
            .map(|config| config.to_value())
            .ok_or_else(|| "expected a network config with ecosystem, name and chainId".to_string())
    })
}

// =============================================================================
// Signers
// =============================================================================

/// A wallet connection. Implemented outside this crate.
pub trait Signer {
    /// Stable identifier, used for persistence (e.g. `keplr`).
    fn id(&self) -> &str;

    fn display_name(&self) -> &str;

    fn logo_url(&self) -> Option<&str> {
        None
    }

    /// Whether the wallet can be used right now. May read signals.
    fn is_available(&self) -> bool {
        true
    }

    fn connect(&self, networks: &[NetworkConfig]) -> Result<(), SignerError>;

    /// Account address on `network`, once connected.
    fn address(&self, network: &NetworkConfig) -> Option<String>;
}

/// Shared signer reference, compared by identity.
#[derive(Clone)]
pub struct SignerHandle(Rc<dyn Signer>);

impl SignerHandle {
    pub fn new(signer: impl Signer + 'static) -> Self {
        Self(Rc::new(signer))
    }

    pub fn signer(&self) -> &dyn Signer {
        self.0.as_ref()
    }

    pub fn id(&self) -> &str {
        self.0.id()
    }

    pub fn to_value(&self) -> Value {
        Value::Opaque(Opaque::new(self.clone()))
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        value.downcast_ref::<SignerHandle>().cloned()
    }
}

impl PartialEq for SignerHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SignerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SignerHandle").field(&self.0.id()).finish()
    }
}

/// Accepts a [`SignerHandle`] wrapped in a value.
pub fn signer_schema() -> Schema {
    Schema::custom("Signer", |value| {
        SignerHandle::from_value(value)
            .map(|handle| handle.to_value())
            .ok_or_else(|| "expected a signer".to_string())
    })
}

thread_local! {
    static SIGNERS: RefCell<Vec<SignerHandle>> = const { RefCell::new(Vec::new()) };
    static CURRENT_SIGNER: Signal<Option<SignerHandle>> = signal(None);
    static CURRENT_NETWORK: Signal<Option<NetworkConfig>> = signal(None);
}

/// Add a signer to the registry shown by the wallet modal.
pub fn register_signer(signer: impl Signer + 'static) -> SignerHandle {
    let handle = SignerHandle::new(signer);
    SIGNERS.with(|s| s.borrow_mut().push(handle.clone()));
    debug!(signer = handle.id(), "signer registered");
    handle
}

pub fn signers() -> Vec<SignerHandle> {
    SIGNERS.with(|s| s.borrow().clone())
}

pub fn find_signer(id: &str) -> Option<SignerHandle> {
    SIGNERS.with(|s| s.borrow().iter().find(|h| h.id() == id).cloned())
}

/// Connected signer. Tracked inside effects.
pub fn current_signer() -> Option<SignerHandle> {
    CURRENT_SIGNER.with(|s| s.get())
}

pub fn set_current_signer(signer: Option<SignerHandle>) {
    CURRENT_SIGNER.with(|s| s.set(signer));
}

/// Active network. Tracked inside effects.
pub fn current_network() -> Option<NetworkConfig> {
    CURRENT_NETWORK.with(|s| s.get())
}

pub fn set_current_network(network: Option<NetworkConfig>) {
    CURRENT_NETWORK.with(|s| s.set(network));
}

/// Address of the current signer on the current network.
pub fn current_address() -> Option<String> {
    let signer = current_signer()?;
    let network = current_network()?;
    signer.signer().address(&network)
}

/// Connect `signer` and make it current.
pub fn connect_signer(signer: &SignerHandle, networks: &[NetworkConfig]) -> Result<(), SignerError> {
    signer.signer().connect(networks)?;
    set_current_signer(Some(signer.clone()));
    debug!(signer = signer.id(), "signer connected");
    Ok(())
}

// =============================================================================
// Persistence
// =============================================================================

/// Key-value storage surviving a page reload.
pub trait SignerStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<Vec<(String, String)>>,
}

impl SignerStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.borrow_mut();
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().retain(|(k, _)| k != key);
    }
}

thread_local! {
    static STORAGE: RefCell<Option<Rc<dyn SignerStorage>>> =
        RefCell::new(Some(Rc::new(MemoryStorage::default())));
}

/// Replace the storage backend. `None` disables persistence.
pub fn set_storage(storage: Option<Rc<dyn SignerStorage>>) {
    STORAGE.with(|s| *s.borrow_mut() = storage);
}

fn storage() -> Option<Rc<dyn SignerStorage>> {
    STORAGE.with(|s| s.borrow().clone())
}

pub fn remember_signer(signer: &SignerHandle) {
    if let Some(storage) = storage() {
        storage.set(SIGNER_STORAGE_KEY, signer.id());
    }
}

pub fn forget_signer() {
    if let Some(storage) = storage() {
        storage.remove(SIGNER_STORAGE_KEY);
    }
}

pub fn is_signer_remembered() -> bool {
    storage()
        .and_then(|s| s.get(SIGNER_STORAGE_KEY))
        .is_some_and(|id| !id.is_empty())
}

/// Reconnect the remembered signer.
///
/// Returns false when nothing is remembered, the signer is no longer
/// registered, or it refused the connection.
pub fn reconnect_signer(networks: &[NetworkConfig]) -> bool {
    let Some(id) = storage().and_then(|s| s.get(SIGNER_STORAGE_KEY)) else {
        return false;
    };
    let Some(signer) = find_signer(&id) else {
        return false;
    };
    match connect_signer(&signer, networks) {
        Ok(()) => true,
        Err(err) => {
            warn!(signer = %id, error = %err, "reconnect failed");
            false
        }
    }
}

// =============================================================================
// Transaction estimates
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    /// Integer amount in base units.
    pub amount: String,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

/// Latest gas estimate. Both empty means the estimate is still pending.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Estimate {
    pub gas: Option<Vec<Coin>>,
    pub error: Option<Value>,
}

type StartFn = Rc<dyn Fn(&TxEstimate) -> Option<Cleanup>>;

/// A pending transaction whose fee is being estimated.
///
/// Clones share the same signals, so the application keeps one handle and
/// passes another to the gas estimate component.
#[derive(Clone)]
pub struct TxEstimate {
    network: Signal<Option<NetworkConfig>>,
    estimate: Signal<Estimate>,
    start: Option<StartFn>,
}

impl TxEstimate {
    pub fn new(network: Option<NetworkConfig>) -> Self {
        Self {
            network: signal(network),
            estimate: signal(Estimate::default()),
            start: None,
        }
    }

    /// Hook run when a component starts observing the transaction, e.g. to
    /// kick off periodic re-estimation. Its cleanup runs when observation stops.
    pub fn with_start(mut self, start: impl Fn(&TxEstimate) -> Option<Cleanup> + 'static) -> Self {
        self.start = Some(Rc::new(start));
        self
    }

    /// Transaction network, falling back to the current network.
    pub fn network(&self) -> Option<NetworkConfig> {
        self.network.get().or_else(current_network)
    }

    pub fn set_network(&self, network: Option<NetworkConfig>) {
        self.network.set(network);
    }

    pub fn estimate(&self) -> Estimate {
        self.estimate.get()
    }

    pub fn set_estimate(&self, estimate: Estimate) {
        self.estimate.set(estimate);
    }

    pub fn start(&self) -> Option<Cleanup> {
        self.start.as_ref().and_then(|start| start(self))
    }

    pub fn to_value(&self) -> Value {
        Value::Opaque(Opaque::new(self.clone()))
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        value.downcast_ref::<TxEstimate>().cloned()
    }
}

impl fmt::Debug for TxEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxEstimate").finish_non_exhaustive()
    }
}

/// Clear signers, signals and storage (for testing).
pub fn reset_wallet() {
    SIGNERS.with(|s| s.borrow_mut().clear());
    set_current_signer(None);
    set_current_network(None);
    set_storage(Some(Rc::new(MemoryStorage::default())));
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeSigner {
        id: &'static str,
        accept: bool,
        connected: Cell<bool>,
    }

    impl Signer for FakeSigner {
        fn id(&self) -> &str {
            self.id
        }

        fn display_name(&self) -> &str {
            "Fake"
        }

        fn connect(&self, _networks: &[NetworkConfig]) -> Result<(), SignerError> {
            if self.accept {
                self.connected.set(true);
                Ok(())
            } else {
                Err(SignerError::Rejected("user declined".into()))
            }
        }

        fn address(&self, network: &NetworkConfig) -> Option<String> {
            self.connected
                .get()
                .then(|| format!("{}1qqqq", network.bech32_prefix.as_deref().unwrap_or("cosmos")))
        }
    }

    fn fake(id: &'static str, accept: bool) -> FakeSigner {
        FakeSigner {
            id,
            accept,
            connected: Cell::new(false),
        }
    }

    fn neutron() -> NetworkConfig {
        NetworkConfig {
            ecosystem: "cosmos".into(),
            name: "neutrontestnet".into(),
            chain_id: "pion-1".into(),
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

    fn setup() {
        reset_wallet();
    }

    #[test]
    fn test_network_config_roundtrips_through_value() {
        setup();
        let value = neutron().to_value();
        assert_eq!(value.field("chainId"), Value::from("pion-1"));
        assert_eq!(NetworkConfig::from_value(&value), Some(neutron()));
        assert!(network_config_schema().safe_parse(&value).is_ok());
        assert!(network_config_schema().safe_parse(&Value::from("pion-1")).is_err());
    }

    #[test]
    fn test_find_asset_only_on_cosmos() {
        let mut network = neutron();
        assert_eq!(network.find_asset("untrn").and_then(|a| a.decimals), Some(6));
        assert!(network.find_asset("uatom").is_none());
        network.ecosystem = "evm".into();
        assert!(network.find_asset("untrn").is_none());
    }

    #[test]
    fn test_remember_and_reconnect() {
        setup();
        assert!(!is_signer_remembered());
        assert!(!reconnect_signer(&[neutron()]));

        let handle = register_signer(fake("fake", true));
        remember_signer(&handle);
        assert!(is_signer_remembered());

        set_current_network(Some(neutron()));
        assert!(reconnect_signer(&[neutron()]));
        assert_eq!(current_signer(), Some(handle));
        assert_eq!(current_address().as_deref(), Some("neutron1qqqq"));

        forget_signer();
        assert!(!is_signer_remembered());
    }

    #[test]
    fn test_reconnect_rejected_or_unknown() {
        setup();
        let handle = register_signer(fake("grumpy", false));
        remember_signer(&handle);
        assert!(!reconnect_signer(&[]));
        assert!(current_signer().is_none());

        set_storage(Some(Rc::new(MemoryStorage::default())));
        let storage = storage().unwrap();
        storage.set(SIGNER_STORAGE_KEY, "gone");
        assert!(!reconnect_signer(&[]));
    }

    #[test]
    fn test_no_storage_disables_persistence() {
        setup();
        set_storage(None);
        let handle = register_signer(fake("fake", true));
        remember_signer(&handle);
        assert!(!is_signer_remembered());
    }

    #[test]
    fn test_tx_estimate_shares_state() {
        setup();
        let started = Rc::new(Cell::new(0));
        let s = started.clone();
        let tx = TxEstimate::new(None).with_start(move |_| {
            s.set(s.get() + 1);
            None
        });
        let value = tx.to_value();
        let copy = TxEstimate::from_value(&value).unwrap();

        tx.set_estimate(Estimate {
            gas: Some(vec![Coin::new("untrn", "1500")]),
            error: None,
        });
        assert_eq!(copy.estimate().gas.unwrap()[0].amount, "1500");

        set_current_network(Some(neutron()));
        assert_eq!(copy.network().map(|n| n.name), Some("neutrontestnet".to_string()));

        assert!(copy.start().is_none());
        assert_eq!(started.get(), 1);
    }
}
