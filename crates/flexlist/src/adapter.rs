//! The list adapter.
//!
//! [`FlexAdapter`] ties an observable collection to a virtualized list view.
//! Items are rendered according to the policy registered for their type,
//! collection changes are turned into minimal [`Refresh`] instructions, and
//! selection, drag-reorder and swipe-dismiss follow each item's policy.
//!
//! # Example
//!
//! ```
//! use flexlist::{FlexAdapter, ItemKind, LayoutId, RenderPolicy, TypeKey};
//!
//! struct Title;
//!
//! #[derive(Clone, PartialEq, Eq, Hash)]
//! struct Row(String);
//!
//! impl ItemKind for Row {
//!     type View = String;
//!
//!     fn type_key(&self) -> TypeKey {
//!         TypeKey::of::<Title>()
//!     }
//! }
//!
//! let mut adapter: FlexAdapter<Row> = FlexAdapter::new();
//! adapter
//!     .register::<Title>(
//!         RenderPolicy::builder(LayoutId::new(1)).bind(|row: &Row, view: &mut String, _| {
//!             view.clone_from(&row.0);
//!         }),
//!     )
//!     .unwrap();
//!
//! adapter.signals().refresh.connect(|refresh| {
//!     // Forward to the host list view.
//!     let _ = refresh;
//! });
//!
//! adapter.items_mut().push(Row("hello".into())).unwrap();
//! let view_type = adapter.item_view_type(0).unwrap();
//! let mut holder = adapter
//!     .create_view_holder(view_type, &mut |_layout| String::new())
//!     .unwrap();
//! adapter.bind_view_holder(&mut holder, 0).unwrap();
//! assert_eq!(holder.view(), "hello");
//! ```

use std::collections::HashSet;
use std::fmt;

use flexlist_core::logging::targets;
use flexlist_core::ThreadAffinity;

use crate::config::{AdapterConfig, DragNotify};
use crate::error::{Error, Result};
use crate::gesture::{DragState, TouchHelper};
use crate::host::{GestureHelperHost, SpanSizeLookup, ViewHolder};
use crate::item::{FlexItem, TypeKey};
use crate::observable::{ChangeEvent, ListListener, ObservableList};
use crate::policy::{Binder, LayoutId, RenderPolicy, Resolved, ViewType};
use crate::projector::{AdapterSignals, Refresh, UpdateProjector};
use crate::registry::{Registered, TypeRegistry};

/// The adapter's item collection.
pub type AdapterItems<T> = ObservableList<T, UpdateProjector<T>>;

/// A list adapter for heterogeneous items.
pub struct FlexAdapter<T: FlexItem> {
    list: AdapterItems<T>,
    config: AdapterConfig,
    pub(crate) drag: DragState,
    affinity: ThreadAffinity,
}

impl<T: FlexItem> Default for FlexAdapter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FlexItem> FlexAdapter<T> {
    /// Creates an adapter with the default configuration.
    pub fn new() -> Self {
        Self::with_config(AdapterConfig::default())
    }

    /// Creates an adapter with `config`.
    pub fn with_config(config: AdapterConfig) -> Self {
        let mut list = ObservableList::new(UpdateProjector::new());
        list.set_listening(config.auto_notify);
        Self {
            list,
            config,
            drag: DragState::Idle,
            affinity: ThreadAffinity::current(),
        }
    }

    /// The adapter configuration.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// The adapter signals.
    pub fn signals(&self) -> &AdapterSignals<T> {
        self.list.listener().signals()
    }

    /// The type registry.
    pub fn registry(&self) -> &TypeRegistry<T> {
        self.list.listener().registry()
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    /// The items, in display order.
    pub fn items(&self) -> &[T] {
        self.list.as_slice()
    }

    /// The observable collection. Every change made through it refreshes the
    /// view while [`auto_notify`](Self::auto_notify) is on.
    pub fn items_mut(&mut self) -> &mut AdapterItems<T> {
        self.affinity.debug_assert_same_thread("items_mut");
        &mut self.list
    }

    /// Number of items.
    pub fn item_count(&self) -> usize {
        self.list.len()
    }

    /// Replaces every item and refreshes the whole view once.
    ///
    /// Fails without touching the collection if any new item has an
    /// unregistered type.
    pub fn reset_items(&mut self, items: impl IntoIterator<Item = T>) -> Result<()> {
        self.affinity.debug_assert_same_thread("reset_items");
        let items: Vec<T> = items.into_iter().collect();
        self.list.listener_mut().validate(&items)?;
        {
            let mut silent = self.list.suspend();
            silent.clear()?;
            silent.extend(items)?;
        }
        self.list.notify(ChangeEvent::Reset)
    }

    /// Moves the item at `from` to `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        self.affinity.debug_assert_same_thread("move_item");
        self.list.move_item(from, to)
    }

    /// Refreshes the view of `item` after it changed in place.
    pub fn notify_item_object_changed(&self, item: &T) -> Result<()> {
        let position = self.list.position_of(item).ok_or(Error::NotInCollection)?;
        self.list.listener().emit(Refresh::ItemChanged(position));
        Ok(())
    }

    /// Whether collection changes refresh the view automatically.
    pub fn auto_notify(&self) -> bool {
        self.list.is_listening()
    }

    /// Turns automatic refresh on or off.
    ///
    /// While off, the collection does not reconcile selection or caches
    /// either; call [`reset_items`](Self::reset_items) or
    /// [`ObservableList::notify`] to catch up.
    pub fn set_auto_notify(&mut self, auto_notify: bool) {
        self.list.set_listening(auto_notify);
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Registers `policy` for items of kind `U`.
    pub fn register<U: ?Sized + 'static>(&mut self, policy: RenderPolicy<T>) -> Result<Registered> {
        self.register_key(TypeKey::of::<U>(), policy, None)
    }

    /// Registers `policy` for items of kind `U` under an explicit view type.
    pub fn register_with_view_type<U: ?Sized + 'static>(
        &mut self,
        policy: RenderPolicy<T>,
        view_type: ViewType,
    ) -> Result<Registered> {
        self.register_key(TypeKey::of::<U>(), policy, Some(view_type))
    }

    /// Registers `policy` for items of kind `key`.
    ///
    /// Replacing an existing registration re-scans the collection.
    pub fn register_key(
        &mut self,
        key: TypeKey,
        policy: RenderPolicy<T>,
        view_type: Option<ViewType>,
    ) -> Result<Registered> {
        self.affinity.debug_assert_same_thread("register_key");
        let outcome = self
            .list
            .listener_mut()
            .registry_mut()
            .register(key, policy, view_type)?;
        self.after_registration(outcome)
    }

    /// Registers `policy` for items accepted by `matches`.
    pub fn register_matching<F>(
        &mut self,
        key: TypeKey,
        matches: F,
        policy: RenderPolicy<T>,
        view_type: Option<ViewType>,
    ) -> Result<Registered>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.affinity.debug_assert_same_thread("register_matching");
        let outcome = self
            .list
            .listener_mut()
            .registry_mut()
            .register_matching(key, matches, policy, view_type)?;
        self.after_registration(outcome)
    }

    fn after_registration(&mut self, outcome: Registered) -> Result<Registered> {
        if outcome == Registered::Replaced {
            let (items, projector) = self.list.parts_mut();
            projector.rescan(items)?;
        }
        Ok(outcome)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Selects `item`.
    ///
    /// Returns `true` if the selection changed. Items whose policy is not
    /// selectable are ignored.
    pub fn select(&mut self, item: &T) -> Result<bool> {
        let position = self.list.position_of(item).ok_or(Error::NotInCollection)?;
        self.select_at(position)
    }

    /// Selects the item at `position`.
    pub fn select_at(&mut self, position: usize) -> Result<bool> {
        self.affinity.debug_assert_same_thread("select_at");
        Error::check_index(position, self.list.len())?;
        let (items, projector) = self.list.parts_mut();
        let item = &items[position];
        if !projector.registry().resolve(item)?.is_selectable() {
            return Ok(false);
        }
        if !projector.selection_mut().insert(item.clone()) {
            return Ok(false);
        }
        tracing::trace!(target: targets::SELECTION, position, "selected");
        projector.emit(Refresh::ItemChanged(position));
        Ok(true)
    }

    /// Deselects `item`. Does nothing if it is not in the collection.
    pub fn deselect(&mut self, item: &T) -> Result<bool> {
        match self.list.position_of(item) {
            Some(position) => self.deselect_at(position),
            None => Ok(false),
        }
    }

    /// Deselects the item at `position`.
    pub fn deselect_at(&mut self, position: usize) -> Result<bool> {
        self.affinity.debug_assert_same_thread("deselect_at");
        Error::check_index(position, self.list.len())?;
        let (items, projector) = self.list.parts_mut();
        let item = &items[position];
        if !projector.registry().resolve(item)?.is_selectable() {
            return Ok(false);
        }
        if !projector.selection_mut().remove(item) {
            return Ok(false);
        }
        tracing::trace!(target: targets::SELECTION, position, "deselected");
        projector.emit(Refresh::ItemChanged(position));
        Ok(true)
    }

    /// Selects every selectable item.
    pub fn select_all(&mut self) -> Result<()> {
        if self.selected_count() >= self.item_count() {
            return Ok(());
        }
        for position in 0..self.item_count() {
            self.select_at(position)?;
        }
        Ok(())
    }

    /// Deselects every item, whatever its current policy says.
    pub fn deselect_all(&mut self) {
        self.affinity.debug_assert_same_thread("deselect_all");
        let (items, projector) = self.list.parts_mut();
        for (position, item) in items.iter().enumerate() {
            if projector.selection().is_empty() {
                break;
            }
            if projector.selection_mut().remove(item) {
                tracing::trace!(target: targets::SELECTION, position, "deselected");
                projector.emit(Refresh::ItemChanged(position));
            }
        }
    }

    /// Returns `true` if `item` is selected.
    pub fn is_selected(&self, item: &T) -> bool {
        self.list.listener().selection().contains(item)
    }

    /// A snapshot of the selected items.
    pub fn selected_items(&self) -> HashSet<T> {
        self.list.listener().selection().items()
    }

    /// Number of selected items.
    pub fn selected_count(&self) -> usize {
        self.list.listener().selection().len()
    }

    // -------------------------------------------------------------------------
    // Host binding
    // -------------------------------------------------------------------------

    /// The view-type tag of the item at `position`.
    pub fn item_view_type(&self, position: usize) -> Result<ViewType> {
        self.registry().view_type_of(self.item_at(position)?)
    }

    /// Creates a view holder for `view_type`, inflating through `inflate`.
    pub fn create_view_holder(
        &self,
        view_type: ViewType,
        inflate: &mut dyn FnMut(LayoutId) -> T::View,
    ) -> Result<ViewHolder<T::View>> {
        let view = self.registry().create_view(view_type, inflate)?;
        Ok(ViewHolder::new(view_type, view))
    }

    /// Binds the item at `position` into `holder`.
    ///
    /// Fails with [`Error::IllegalBindState`] when `holder` was created for a
    /// different view type than the item needs.
    pub fn bind_view_holder(&self, holder: &mut ViewHolder<T::View>, position: usize) -> Result<()> {
        let item = self.item_at(position)?;
        let expected = self.registry().view_type_of(item)?;
        if holder.view_type() != expected {
            return Err(Error::IllegalBindState {
                position,
                expected,
                actual: holder.view_type(),
            });
        }

        let selected = self.is_selected(item);
        match self.registry().resolve(item)? {
            Resolved::SelfDescribed(described) => {
                let selected = selected && described.is_selectable();
                described.bind(holder.view_mut(), selected, position);
            }
            Resolved::Registered(policy) => match policy.binder() {
                Binder::Plain(bind) => bind(item, holder.view_mut(), position),
                Binder::Selectable(bind) => bind(item, holder.view_mut(), selected, position),
            },
        }
        Ok(())
    }

    /// Grid span of the item at `position`.
    pub fn span_size(&self, position: usize) -> Result<u32> {
        Ok(self.registry().resolve(self.item_at(position)?)?.span())
    }

    /// The span lookup to hand to a grid layout.
    pub fn span_lookup(&self) -> &dyn SpanSizeLookup {
        self
    }

    fn item_at(&self, position: usize) -> Result<&T> {
        self.list
            .get(position)
            .ok_or_else(|| Error::index_out_of_range(position, self.list.len()))
    }

    // -------------------------------------------------------------------------
    // Gestures
    // -------------------------------------------------------------------------

    /// Changes when [`AdapterSignals::item_dragged`] fires.
    pub fn set_drag_notify(&mut self, drag_notify: DragNotify) {
        self.config.drag_notify = drag_notify;
    }

    /// Called when the adapter is attached to a scrollable host.
    ///
    /// Attaches the gesture helper if the configuration asks for it. Returns
    /// whether it did.
    pub fn on_attached(&self, host: &mut dyn GestureHelperHost) -> bool {
        if !self.config.register_automatically {
            return false;
        }
        tracing::debug!(target: targets::GESTURE, "attaching gesture helper");
        host.attach_gesture_helper();
        true
    }

    /// The gesture callbacks for this adapter.
    pub fn touch_helper(&mut self) -> TouchHelper<'_, T> {
        self.affinity.debug_assert_same_thread("touch_helper");
        TouchHelper::new(self)
    }

    /// The current drag state.
    pub fn drag_state(&self) -> DragState {
        self.drag
    }
}

impl<T: FlexItem> SpanSizeLookup for FlexAdapter<T> {
    fn span_size(&self, position: usize) -> u32 {
        match FlexAdapter::span_size(self, position) {
            Ok(span) => span,
            Err(err) => {
                tracing::warn!(target: targets::REGISTRY, position, %err, "span lookup failed");
                1
            }
        }
    }
}

impl<T: FlexItem> fmt::Debug for FlexAdapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlexAdapter")
            .field("item_count", &self.item_count())
            .field("selected_count", &self.selected_count())
            .field("registry", self.registry())
            .field("config", &self.config)
            .field("drag", &self.drag)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::item::{ItemKind, SelfDescribing};

    struct Header;
    struct Contact;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Spacer;

    impl SelfDescribing<String> for Spacer {
        fn layout(&self) -> LayoutId {
            LayoutId::new(77)
        }

        fn span(&self) -> u32 {
            3
        }

        fn bind(&self, view: &mut String, _selected: bool, _position: usize) {
            view.push_str("---");
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Row {
        Header(&'static str),
        Contact(&'static str),
        Spacer(Spacer),
    }

    impl ItemKind for Row {
        type View = String;

        fn type_key(&self) -> TypeKey {
            match self {
                Row::Header(_) => TypeKey::of::<Header>(),
                Row::Contact(_) => TypeKey::of::<Contact>(),
                Row::Spacer(_) => TypeKey::of::<Spacer>(),
            }
        }

        fn self_described(&self) -> Option<&dyn SelfDescribing<String>> {
            match self {
                Row::Spacer(spacer) => Some(spacer as &dyn SelfDescribing<String>),
                _ => None,
            }
        }
    }

    fn name(row: &Row) -> &'static str {
        match row {
            Row::Header(name) | Row::Contact(name) => name,
            Row::Spacer(_) => "",
        }
    }

    fn adapter() -> (FlexAdapter<Row>, Arc<Mutex<Vec<Refresh>>>) {
        let mut adapter: FlexAdapter<Row> = FlexAdapter::new();
        adapter
            .register_with_view_type::<Header>(
                RenderPolicy::builder(LayoutId::new(1))
                    .span(2)
                    .bind(|row, view: &mut String, _| *view = name(row).to_uppercase()),
                ViewType::new(1),
            )
            .unwrap();
        adapter
            .register::<Contact>(RenderPolicy::builder(LayoutId::new(2)).bind_selectable(
                |row, view: &mut String, selected, _| {
                    *view = format!("{}{}", name(row), if selected { " *" } else { "" });
                },
            ))
            .unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        adapter.signals().refresh.connect(move |refresh| {
            seen_clone.lock().push(*refresh);
        });
        (adapter, seen)
    }

    #[test]
    fn test_reset_items_refreshes_once() {
        let (mut adapter, seen) = adapter();
        adapter
            .reset_items([Row::Header("a"), Row::Contact("b")])
            .unwrap();
        assert_eq!(adapter.item_count(), 2);
        assert_eq!(*seen.lock(), vec![Refresh::DataSetChanged]);
    }

    #[test]
    fn test_selection_ignores_unselectable_items() {
        let (mut adapter, seen) = adapter();
        adapter
            .reset_items([Row::Header("h"), Row::Contact("c")])
            .unwrap();
        seen.lock().clear();

        assert!(!adapter.select_at(0).unwrap());
        assert!(adapter.select(&Row::Contact("c")).unwrap());
        assert!(!adapter.select(&Row::Contact("c")).unwrap());
        assert_eq!(
            adapter.select(&Row::Contact("zz")),
            Err(Error::NotInCollection)
        );
        assert_eq!(adapter.selected_count(), 1);
        assert_eq!(*seen.lock(), vec![Refresh::ItemChanged(1)]);

        assert!(!adapter.deselect(&Row::Contact("zz")).unwrap());
        assert!(adapter.deselect_at(1).unwrap());
        assert!(adapter.selected_items().is_empty());
    }

    #[test]
    fn test_bind_view_holder() {
        let (mut adapter, _) = adapter();
        adapter
            .reset_items([Row::Header("h"), Row::Contact("c"), Row::Spacer(Spacer)])
            .unwrap();
        adapter.select_at(1).unwrap();

        let mut inflate = |layout: LayoutId| format!("<{}>", layout.get());
        let mut holders = Vec::new();
        for position in 0..adapter.item_count() {
            let view_type = adapter.item_view_type(position).unwrap();
            let mut holder = adapter.create_view_holder(view_type, &mut inflate).unwrap();
            adapter.bind_view_holder(&mut holder, position).unwrap();
            holders.push(holder);
        }

        assert_eq!(holders[0].view(), "H");
        assert_eq!(holders[1].view(), "c *");
        assert_eq!(holders[2].view(), "<77>---");
        assert_eq!(holders[2].view_type(), ViewType::new(77));

        let err = adapter.bind_view_holder(&mut holders[0], 1).unwrap_err();
        assert!(matches!(err, Error::IllegalBindState { position: 1, .. }));
        assert!(adapter.bind_view_holder(&mut holders[0], 3).is_err());
    }

    #[test]
    fn test_spans() {
        let (mut adapter, _) = adapter();
        adapter
            .reset_items([Row::Header("h"), Row::Contact("c"), Row::Spacer(Spacer)])
            .unwrap();
        assert_eq!(adapter.span_size(0).unwrap(), 2);
        assert_eq!(adapter.span_size(1).unwrap(), 1);

        let lookup = adapter.span_lookup();
        assert_eq!(lookup.span_size(2), 3);
        assert_eq!(lookup.span_size(10), 1);
    }

    #[test]
    fn test_notify_item_object_changed() {
        let (mut adapter, seen) = adapter();
        adapter.reset_items([Row::Header("h")]).unwrap();
        seen.lock().clear();
        adapter.notify_item_object_changed(&Row::Header("h")).unwrap();
        assert_eq!(
            adapter.notify_item_object_changed(&Row::Header("x")),
            Err(Error::NotInCollection)
        );
        assert_eq!(*seen.lock(), vec![Refresh::ItemChanged(0)]);
    }

    #[test]
    fn test_auto_notify_toggle() {
        let (mut adapter, seen) = adapter();
        adapter.set_auto_notify(false);
        adapter.items_mut().push(Row::Header("h")).unwrap();
        assert!(seen.lock().is_empty());
        assert!(!adapter.auto_notify());

        adapter.set_auto_notify(true);
        adapter.items_mut().push(Row::Contact("c")).unwrap();
        assert_eq!(
            *seen.lock(),
            vec![Refresh::RangeInserted { start: 1, count: 1 }]
        );
    }

    struct Recycler {
        attached: usize,
    }

    impl GestureHelperHost for Recycler {
        fn attach_gesture_helper(&mut self) {
            self.attached += 1;
        }
    }

    #[test]
    fn test_on_attached_respects_config() {
        let mut host = Recycler { attached: 0 };
        assert!(FlexAdapter::<Row>::new().on_attached(&mut host));
        let manual = FlexAdapter::<Row>::with_config(
            AdapterConfig::new().with_register_automatically(false),
        );
        assert!(!manual.on_attached(&mut host));
        assert_eq!(host.attached, 1);
    }

    #[test]
    fn test_reregistration_keeps_items_resolvable() {
        let (mut adapter, _) = adapter();
        adapter.reset_items([Row::Contact("c")]).unwrap();
        let outcome = adapter
            .register::<Contact>(RenderPolicy::builder(LayoutId::new(9)).span(4).build())
            .unwrap();
        assert_eq!(outcome, Registered::Replaced);
        assert_eq!(adapter.span_size(0).unwrap(), 4);
        // No longer selectable.
        assert!(!adapter.select_at(0).unwrap());
    }

    #[test]
    fn test_deselect_all_after_policy_turns_plain() {
        let (mut adapter, seen) = adapter();
        adapter
            .reset_items([Row::Contact("a"), Row::Header("h"), Row::Contact("b")])
            .unwrap();
        adapter.select_all().unwrap();
        assert_eq!(adapter.selected_count(), 2);

        adapter
            .register::<Contact>(RenderPolicy::builder(LayoutId::new(2)).build())
            .unwrap();
        assert!(!adapter.deselect_at(0).unwrap());
        seen.lock().clear();

        adapter.deselect_all();
        assert_eq!(adapter.selected_count(), 0);
        assert_eq!(
            *seen.lock(),
            vec![Refresh::ItemChanged(0), Refresh::ItemChanged(2)]
        );
    }
}
