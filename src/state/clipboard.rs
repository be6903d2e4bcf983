//! Clipboard Module - Text copy support for components
//!
//! The address component copies its full value when clicked. Writes land in
//! an in-process buffer and are forwarded to an optional sink, which is where
//! an embedding application plugs in the real system clipboard.
//!
//! # Example
//!
//! ```ignore
//! use cosmos_elements::state::clipboard;
//!
//! let _remove = clipboard::set_sink(|text| system_clipboard_write(text));
//! clipboard::write_text("neutron1...");
//! assert_eq!(clipboard::read_text().as_deref(), Some("neutron1..."));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::types::Cleanup;

/// Receives every successful clipboard write.
pub type ClipboardSink = Rc<dyn Fn(&str)>;

// =============================================================================
// Internal Buffer
// =============================================================================

#[derive(Default)]
struct ClipboardState {
    buffer: Option<String>,
    sink: Option<(u64, ClipboardSink)>,
    next_sink_id: u64,
}

thread_local! {
    static CLIPBOARD: RefCell<ClipboardState> = RefCell::new(ClipboardState::default());
}

// =============================================================================
// Public API
// =============================================================================

/// Copy text to the clipboard.
///
/// Empty strings are ignored and leave the clipboard untouched. Returns
/// whether anything was written.
pub fn write_text(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    let sink = CLIPBOARD.with(|c| {
        let mut state = c.borrow_mut();
        state.buffer = Some(text.to_string());
        state.sink.as_ref().map(|(_, sink)| sink.clone())
    });
    if let Some(sink) = sink {
        sink(text);
    }
    debug!(len = text.len(), "clipboard written");
    true
}

/// Most recently copied text.
pub fn read_text() -> Option<String> {
    CLIPBOARD.with(|c| c.borrow().buffer.clone())
}

pub fn has_content() -> bool {
    CLIPBOARD.with(|c| c.borrow().buffer.is_some())
}

/// Forward writes to `sink`, replacing any previous one. The returned
/// cleanup removes it again unless another sink took its place.
pub fn set_sink(sink: impl Fn(&str) + 'static) -> Cleanup {
    let id = CLIPBOARD.with(|c| {
        let mut state = c.borrow_mut();
        let id = state.next_sink_id;
        state.next_sink_id += 1;
        state.sink = Some((id, Rc::new(sink)));
        id
    });

    Box::new(move || {
        CLIPBOARD.with(|c| {
            let mut state = c.borrow_mut();
            if state.sink.as_ref().is_some_and(|(current, _)| *current == id) {
                state.sink = None;
            }
        });
    })
}

/// Clear the buffer and drop the sink (for testing).
pub fn reset_clipboard() {
    CLIPBOARD.with(|c| *c.borrow_mut() = ClipboardState::default());
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        reset_clipboard();
    }

    #[test]
    fn test_write_read() {
        setup();

        assert!(read_text().is_none());
        assert!(!has_content());

        assert!(write_text("neutron1abc"));
        assert_eq!(read_text(), Some("neutron1abc".to_string()));
        assert!(has_content());

        // Reading is non-destructive
        assert_eq!(read_text(), Some("neutron1abc".to_string()));
    }

    #[test]
    fn test_empty_write_ignored() {
        setup();

        write_text("Something");
        assert!(!write_text(""));
        assert_eq!(read_text(), Some("Something".to_string()));
    }

    #[test]
    fn test_sink_receives_writes() {
        setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let remove = set_sink(move |text| s.borrow_mut().push(text.to_string()));

        write_text("Hello 世界 🚀");
        assert_eq!(*seen.borrow(), vec!["Hello 世界 🚀".to_string()]);

        remove();
        write_text("after");
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(read_text(), Some("after".to_string()));
    }

    #[test]
    fn test_stale_sink_cleanup_keeps_newer_sink() {
        setup();
        let hits = Rc::new(RefCell::new(0));
        let remove_first = set_sink(|_| {});
        let h = hits.clone();
        let _remove_second = set_sink(move |_| *h.borrow_mut() += 1);

        remove_first();
        write_text("x");
        assert_eq!(*hits.borrow(), 1);
    }
}
