//! Error formatting for the error modal and error toasts.
//!
//! Formatters form a process-wide, ordered list. [`format_error`] asks each
//! in turn and takes the first answer; with no answer it falls back to the
//! error message, the string itself, or pretty-printed JSON.
//!
//! ```ignore
//! let remove = add_formatters(vec![Rc::new(|e: &Value| {
//!     e.get("code").map(|c| Formatted::Text(format!("code {c:?}")))
//! })]);
//! // ...
//! remove();
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::dom::NodeId;
use crate::types::Cleanup;
use crate::value::{Opaque, Value};

/// Output of a formatter: plain text, or an element to slot into the modal.
#[derive(Debug, Clone, PartialEq)]
pub enum Formatted {
    Text(String),
    Node(NodeId),
}

impl Formatted {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Formatted::Text(s) => Some(s),
            Formatted::Node(_) => None,
        }
    }
}

pub type ErrorFormatter = Rc<dyn Fn(&Value) -> Option<Formatted>>;

/// A failure carried through [`Value`], e.g. a rejected wallet connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    message: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<ErrorReport> for Value {
    fn from(report: ErrorReport) -> Self {
        Value::Opaque(Opaque::new(report))
    }
}

/// Wrap any displayable error as a [`Value`].
pub fn error_value(error: impl fmt::Display) -> Value {
    ErrorReport::new(error.to_string()).into()
}

thread_local! {
    static FORMATTERS: RefCell<Vec<(u64, ErrorFormatter)>> = const { RefCell::new(Vec::new()) };
    static NEXT_ID: RefCell<u64> = const { RefCell::new(0) };
}

/// Append formatters to the list. The returned cleanup removes exactly
/// these, leaving formatters added by others in place.
pub fn add_formatters(formatters: impl IntoIterator<Item = ErrorFormatter>) -> Cleanup {
    let ids: Vec<u64> = FORMATTERS.with(|list| {
        let mut list = list.borrow_mut();
        formatters
            .into_iter()
            .map(|formatter| {
                let id = NEXT_ID.with(|n| {
                    let mut n = n.borrow_mut();
                    *n += 1;
                    *n
                });
                list.push((id, formatter));
                id
            })
            .collect()
    });

    Box::new(move || {
        FORMATTERS.with(|list| list.borrow_mut().retain(|(id, _)| !ids.contains(id)));
    })
}

pub fn formatter_count() -> usize {
    FORMATTERS.with(|list| list.borrow().len())
}

/// Describe `error` for display.
pub fn format_error(error: &Value) -> Formatted {
    let formatters: Vec<ErrorFormatter> =
        FORMATTERS.with(|list| list.borrow().iter().map(|(_, f)| f.clone()).collect());
    if let Some(formatted) = formatters.iter().find_map(|f| f(error)) {
        return formatted;
    }

    if let Some(s) = error.as_str() {
        return Formatted::Text(s.to_string());
    }
    if let Some(report) = error.downcast_ref::<ErrorReport>() {
        return Formatted::Text(report.message.clone());
    }
    let json = serde_json::to_string_pretty(&error.to_json()).unwrap_or_default();
    Formatted::Text(json)
}

/// Drop every formatter (for testing).
pub fn reset_formatters() {
    FORMATTERS.with(|list| list.borrow_mut().clear());
}

// =============================================================================
// Tests
// =============================================================================
