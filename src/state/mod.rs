//! State Module - Process-wide runtime state
//!
//! The shared state the components lean on:
//!
//! - **Containers** - one overlay container per kind (toasts, tooltips, modals)
//! - **Timers** - virtual clock for lifespans and deferred teardown
//! - **Clipboard** - copy buffer with a pluggable system sink
//! - **Wallet** - signers, current signer/network, persistence, tx estimates
//! - **Formatters** - ordered error formatter list
//!
//! Everything is thread-local; each module has a `reset_*` helper for tests.

pub mod clipboard;
pub mod containers;
pub mod formatters;
pub mod timers;
pub mod wallet;
