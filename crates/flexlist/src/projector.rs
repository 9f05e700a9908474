//! Translation of collection changes into view refresh instructions.
//!
//! [`UpdateProjector`] listens to the adapter's collection. For every change
//! event it first reconciles the selection, then the registry's type caches,
//! and finally emits exactly one [`Refresh`] on [`AdapterSignals::refresh`].
//! The host connects to that signal and forwards each instruction to its
//! list view.

use flexlist_core::logging::{PerfSpan, span_names, targets};
use flexlist_core::Signal;

use crate::error::Result;
use crate::item::FlexItem;
use crate::observable::{ChangeEvent, ListListener};
use crate::registry::TypeRegistry;
use crate::selection::SelectionSet;

/// A minimal instruction for the host view to refresh itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Rebind the item at this position.
    ItemChanged(usize),
    /// `count` items appeared at `start`.
    RangeInserted { start: usize, count: usize },
    /// `count` items disappeared from `start`.
    RangeRemoved { start: usize, count: usize },
    /// The item at this position disappeared.
    ItemRemoved(usize),
    /// The item at `from` moved to `to`.
    ItemMoved { from: usize, to: usize },
    /// Anything may have changed; rebind everything.
    DataSetChanged,
}

/// Signals emitted by an adapter.
///
/// All signals are emitted synchronously on the thread that mutated the
/// adapter.
pub struct AdapterSignals<T: FlexItem> {
    /// Emitted once per collection change.
    pub refresh: Signal<Refresh>,

    /// Emitted when an item is swiped away, before it is removed.
    pub item_swiped: Signal<T>,

    /// Emitted when an item is dragged to a new position.
    /// Args: (item, from, to)
    pub item_dragged: Signal<(T, usize, usize)>,
}

impl<T: FlexItem> Default for AdapterSignals<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FlexItem> AdapterSignals<T> {
    /// Creates a new set of adapter signals.
    pub fn new() -> Self {
        Self {
            refresh: Signal::new(),
            item_swiped: Signal::new(),
            item_dragged: Signal::new(),
        }
    }
}

impl<T: FlexItem> std::fmt::Debug for AdapterSignals<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterSignals")
            .field("refresh", &self.refresh)
            .field("item_swiped", &self.item_swiped)
            .field("item_dragged", &self.item_dragged)
            .finish()
    }
}

/// The adapter's collection listener.
#[derive(Debug)]
pub struct UpdateProjector<T: FlexItem> {
    registry: TypeRegistry<T>,
    selection: SelectionSet<T>,
    signals: AdapterSignals<T>,
}

impl<T: FlexItem> Default for UpdateProjector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FlexItem> UpdateProjector<T> {
    /// Creates a projector with an empty registry and selection.
    pub fn new() -> Self {
        Self {
            registry: TypeRegistry::new(),
            selection: SelectionSet::new(),
            signals: AdapterSignals::new(),
        }
    }

    /// The type registry.
    pub fn registry(&self) -> &TypeRegistry<T> {
        &self.registry
    }

    /// Mutable access to the type registry.
    pub fn registry_mut(&mut self) -> &mut TypeRegistry<T> {
        &mut self.registry
    }

    /// The selection.
    pub fn selection(&self) -> &SelectionSet<T> {
        &self.selection
    }

    /// Mutable access to the selection.
    pub fn selection_mut(&mut self) -> &mut SelectionSet<T> {
        &mut self.selection
    }

    /// The adapter signals.
    pub fn signals(&self) -> &AdapterSignals<T> {
        &self.signals
    }

    /// Emits `refresh` on the refresh signal.
    pub fn emit(&self, refresh: Refresh) {
        tracing::trace!(target: targets::PROJECTOR, ?refresh, "refresh");
        self.signals.refresh.emit(refresh);
    }

    /// Forgets all recorded view factories and records every item again.
    pub fn rescan(&mut self, items: &[T]) -> Result<()> {
        let _span = PerfSpan::new(span_names::RESCAN);
        self.registry.clear_factories();
        for item in items {
            self.registry.record(item)?;
        }
        tracing::debug!(target: targets::PROJECTOR, items = items.len(), "rescanned collection");
        Ok(())
    }
}

impl<T: FlexItem> ListListener<T> for UpdateProjector<T> {
    fn validate(&mut self, incoming: &[T]) -> Result<()> {
        for item in incoming {
            self.registry.resolve(item)?;
        }
        Ok(())
    }

    fn on_changed(&mut self, items: &[T], event: ChangeEvent<'_, T>) -> Result<()> {
        let refresh = match event {
            ChangeEvent::Reset => {
                self.selection.retain_present(items);
                self.rescan(items)?;
                Refresh::DataSetChanged
            }
            ChangeEvent::ItemUpdated { index, old } => {
                if let Some(current) = items.get(index) {
                    if current != old {
                        self.selection.remove(old);
                    }
                    self.registry.record(current)?;
                }
                Refresh::ItemChanged(index)
            }
            ChangeEvent::RangeInserted { start, count } => {
                let end = (start + count).min(items.len());
                for item in items.get(start..end).unwrap_or_default() {
                    self.registry.record(item)?;
                }
                Refresh::RangeInserted { start, count }
            }
            ChangeEvent::RangeRemoved { start, count } => {
                self.selection.retain_present(items);
                self.rescan(items)?;
                Refresh::RangeRemoved { start, count }
            }
            ChangeEvent::ItemRemoved { index, item } => {
                self.selection.remove(item);
                Refresh::ItemRemoved(index)
            }
            ChangeEvent::ItemMoved { from, to } => Refresh::ItemMoved { from, to },
        };
        self.emit(refresh);
        Ok(())
    }
}
