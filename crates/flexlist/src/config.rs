//! Adapter configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// When the "item dragged" notification fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DragNotify {
    /// Fire on every accepted move while the item is being dragged.
    Continuous,
    /// Fire once, with the original and final positions, when the item is dropped.
    #[default]
    OnDrop,
}

/// Construction-time settings for a [`FlexAdapter`](crate::FlexAdapter).
///
/// # Example
///
/// ```
/// use flexlist::{AdapterConfig, DragNotify};
///
/// let config = AdapterConfig::new()
///     .with_drag_notify(DragNotify::Continuous)
///     .with_register_automatically(false);
/// assert!(config.auto_notify);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdapterConfig {
    /// Attach the gesture helper whenever the adapter is attached to a host.
    pub register_automatically: bool,
    /// Timing of the "item dragged" notification.
    pub drag_notify: DragNotify,
    /// Whether collection changes refresh the view automatically.
    pub auto_notify: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            register_automatically: true,
            drag_notify: DragNotify::default(),
            auto_notify: true,
        }
    }
}

impl AdapterConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the gesture helper is attached automatically.
    pub fn with_register_automatically(mut self, register: bool) -> Self {
        self.register_automatically = register;
        self
    }

    /// Sets the drag notification timing.
    pub fn with_drag_notify(mut self, drag_notify: DragNotify) -> Self {
        self.drag_notify = drag_notify;
        self
    }

    /// Sets whether collection changes refresh the view automatically.
    pub fn with_auto_notify(mut self, auto_notify: bool) -> Self {
        self.auto_notify = auto_notify;
        self
    }
}
