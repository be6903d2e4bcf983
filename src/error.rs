//! Error types.
//!
//! Two classes of failure exist:
//!
//! - **Input errors** ([`CoerceError`], [`SchemaError`](crate::schema::SchemaError))
//!   come from attribute strings and property writes. The runtime logs them and
//!   keeps the previous value.
//! - **Contract errors** ([`EmitError`], [`DefineError`]) mean a component or
//!   its caller broke its own declaration. They are returned to the caller.

use thiserror::Error;

use crate::dom::NodeId;
use crate::schema::SchemaError;

/// Registration failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DefineError {
    #[error("`{0}` is not a valid custom element name")]
    InvalidName(String),

    #[error("component `{component}` declares invalid attribute name `{attribute}`")]
    InvalidAttributeName { component: String, attribute: String },

    #[error("custom element `{0}` is already defined")]
    AlreadyDefined(String),
}

/// Typed event contract violations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EmitError {
    #[error("event `{event}` is not declared by `{component}`")]
    UndeclaredEvent { component: String, event: String },

    #[error("invalid event detail for `{event}`: {source}")]
    InvalidDetail {
        event: String,
        #[source]
        source: SchemaError,
    },

    #[error("node {0:?} is not a component instance")]
    NotAComponent(NodeId),
}

/// Attribute string decoding failures.
#[derive(Debug, Error)]
pub enum CoerceError {
    #[error("malformed attribute JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Host tree violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("node {child:?} cannot be inserted into {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("reference node {0:?} is not a child of the parent")]
    NotAChild(NodeId),

    #[error("element {0:?} already has a shadow root")]
    ShadowRootExists(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
}

/// Decimal parsing and arithmetic failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecimalError {
    #[error("`{0}` is not a decimal number")]
    Invalid(String),

    #[error("decimal overflow")]
    Overflow,

    #[error("value is not finite")]
    NotFinite,
}

/// Wallet connection failures reported by a signer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("signer `{0}` is not available")]
    Unavailable(String),

    #[error("connection rejected: {0}")]
    Rejected(String),
}
