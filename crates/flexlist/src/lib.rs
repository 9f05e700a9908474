//! flexlist - a list adapter for heterogeneous, observable collections.
//!
//! An adapter binds a mutable collection of items of many types to a
//! virtualized list or grid view. Each item type registers a
//! [`RenderPolicy`] (layout, grid span, swipe and drag directions, binder);
//! the adapter dispatches rendering, selection, drag-reorder and
//! swipe-dismiss per item, and turns every collection change into a minimal
//! [`Refresh`] instruction for the host view.
//!
//! # Modules
//!
//! - [`observable`]: the change-reporting collection
//! - [`registry`]: type-to-policy resolution with base-type fallback
//! - [`selection`]: the selected-item set
//! - [`projector`]: change events to refresh instructions
//! - [`adapter`]: the [`FlexAdapter`] facade
//! - [`gesture`]: drag and swipe handling
//! - [`host`]: seams to the host view layer
//!
//! Signals, logging targets and thread checks come from [`flexlist_core`],
//! which is re-exported.

pub mod adapter;
pub mod config;
pub mod error;
pub mod gesture;
pub mod host;
pub mod item;
pub mod observable;
pub mod policy;
pub mod projector;
pub mod registry;
pub mod selection;

pub use flexlist_core;
pub use flexlist_core::{ConnectionGuard, ConnectionId, Signal};

pub use adapter::{AdapterItems, FlexAdapter};
pub use config::{AdapterConfig, DragNotify};
pub use error::{Error, Result};
pub use gesture::{DragState, MovementFlags, TouchHelper};
pub use host::{GestureHelperHost, GestureTarget, SpanSizeLookup, ViewHolder};
pub use item::{FlexItem, Identity, ItemKind, SelfDescribing, TypeKey, ViewFactory};
pub use observable::{ChangeEvent, ListListener, ObservableList, SuspendGuard};
pub use policy::{
    Binder, Directions, LayoutId, PolicyBuilder, RenderPolicy, Resolved, SelectableViewBinder,
    ViewBinder, ViewType,
};
pub use projector::{AdapterSignals, Refresh, UpdateProjector};
pub use registry::{ItemMatcher, Registered, TypeRegistry};
pub use selection::SelectionSet;
