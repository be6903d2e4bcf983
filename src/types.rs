//! Core types for cosmos-elements.
//!
//! Small enums and flags shared by the host platform, the component runtime
//! and the built-in components.

use bitflags::bitflags;

/// Teardown callback returned by mounts, subscriptions and hooks.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Shadow Mode
// =============================================================================

/// Where a component renders its output.
///
/// `Open` and `Closed` attach a shadow root to the host; `None` renders
/// straight into the host's light DOM (beware of CSS scoping).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ShadowMode {
    None,
    #[default]
    Open,
    Closed,
}

impl ShadowMode {
    /// Whether this mode attaches a shadow root.
    pub fn uses_shadow(self) -> bool {
        !matches!(self, ShadowMode::None)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShadowMode::None => "none",
            ShadowMode::Open => "open",
            ShadowMode::Closed => "closed",
        }
    }
}

// =============================================================================
// Lifecycle State
// =============================================================================

/// Lifecycle state of a component instance.
///
/// ```text
/// Unattached → Connected ⇄ Disconnected
///                  └──────────┴──→ Removed
/// ```
///
/// Attribute updates while connected re-render through the reactive
/// subscription and leave the state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Unattached,
    Connected,
    Disconnected,
    Removed,
}

// =============================================================================
// Event Flags
// =============================================================================

bitflags! {
    /// Dispatch flags for DOM events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct EventFlags: u8 {
        /// Event propagates to ancestors after the target.
        const BUBBLES = 1 << 0;
        /// `prevent_default()` is honored.
        const CANCELABLE = 1 << 1;
        /// Event crosses shadow boundaries into the host tree.
        const COMPOSED = 1 << 2;
    }
}

// =============================================================================
// Component Enums
// =============================================================================

/// Tooltip placement relative to its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Placement {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl Placement {
    pub const ALL: [&'static str; 4] = ["top", "bottom", "left", "right"];

    pub fn as_str(self) -> &'static str {
        match self {
            Placement::Top => "top",
            Placement::Bottom => "bottom",
            Placement::Left => "left",
            Placement::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "top" => Some(Placement::Top),
            "bottom" => Some(Placement::Bottom),
            "left" => Some(Placement::Left),
            "right" => Some(Placement::Right),
            _ => None,
        }
    }
}

/// Visual variant of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ToastVariant {
    Success,
    Error,
    Warn,
    #[default]
    Info,
}

impl ToastVariant {
    pub const ALL: [&'static str; 4] = ["success", "error", "warn", "info"];

    pub fn as_str(self) -> &'static str {
        match self {
            ToastVariant::Success => "success",
            ToastVariant::Error => "error",
            ToastVariant::Warn => "warn",
            ToastVariant::Info => "info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(ToastVariant::Success),
            "error" => Some(ToastVariant::Error),
            "warn" => Some(ToastVariant::Warn),
            "info" => Some(ToastVariant::Info),
            _ => None,
        }
    }

    /// Title shown when the toast has none of its own.
    pub fn default_title(self) -> &'static str {
        match self {
            ToastVariant::Success => "Success",
            ToastVariant::Error => "Error",
            ToastVariant::Warn => "Warning",
            ToastVariant::Info => "Info",
        }
    }
}

/// Spinner size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum SpinnerSize {
    Xxs,
    #[default]
    Md,
}

impl SpinnerSize {
    pub const ALL: [&'static str; 2] = ["xxs", "md"];

    pub fn as_str(self) -> &'static str {
        match self {
            SpinnerSize::Xxs => "xxs",
            SpinnerSize::Md => "md",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "xxs" => Some(SpinnerSize::Xxs),
            "md" => Some(SpinnerSize::Md),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_mode_default_is_open() {
        assert_eq!(ShadowMode::default(), ShadowMode::Open);
        assert!(ShadowMode::Closed.uses_shadow());
        assert!(!ShadowMode::None.uses_shadow());
    }

    #[test]
    fn test_variant_titles() {
        assert_eq!(ToastVariant::parse("warn"), Some(ToastVariant::Warn));
        assert_eq!(ToastVariant::Warn.default_title(), "Warning");
        assert_eq!(ToastVariant::parse("warning"), None);
    }

    #[test]
    fn test_event_flags() {
        let flags = EventFlags::BUBBLES | EventFlags::COMPOSED;
        assert!(flags.contains(EventFlags::COMPOSED));
        assert!(!flags.contains(EventFlags::CANCELABLE));
    }
}
