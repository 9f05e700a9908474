//! Render policies: how items of a type are laid out, bound and moved.
//!
//! A [`RenderPolicy`] bundles a layout identity, a grid span, the allowed
//! swipe and drag [`Directions`], and a [`Binder`] that copies item data into
//! a host view. Policies are immutable and shared as `Arc`; replacing a
//! type's policy is done by registering a new one.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use flexlist_core::logging::targets;

use crate::item::{FlexItem, ItemKind, SelfDescribing};

/// Opaque layout identity handed to the host when a view must be inflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutId(u32);

impl LayoutId {
    /// Creates a layout identity.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identity.
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Recycling-pool tag used by the host to group views with the same structure.
///
/// Explicit tags are chosen by the caller at registration time. Types
/// registered without one get an implicit tag allocated by the adapter,
/// counting up from [`ViewType::AUTO_BASE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ViewType(u32);

impl ViewType {
    /// First tag handed out for implicitly tagged types.
    pub const AUTO_BASE: u32 = 0x8000_0000;

    /// Creates a view type tag.
    pub const fn new(tag: u32) -> Self {
        Self(tag)
    }

    /// Returns the raw tag.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns `true` if this tag was allocated by an adapter.
    pub const fn is_implicit(self) -> bool {
        self.0 >= Self::AUTO_BASE
    }
}

bitflags::bitflags! {
    /// Directions in which an item may be swiped or dragged.
    ///
    /// The bit values match the conventional touch-helper constants, so
    /// they can be passed to host toolkits unchanged.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct Directions: u32 {
        /// Upward.
        const UP    = 1;
        /// Downward.
        const DOWN  = 1 << 1;
        /// Left.
        const LEFT  = 1 << 2;
        /// Right.
        const RIGHT = 1 << 3;
        /// Toward the layout start (left in LTR, right in RTL).
        const START = 1 << 4;
        /// Toward the layout end.
        const END   = 1 << 5;

        /// Left and right.
        const HORIZONTAL = Self::LEFT.bits() | Self::RIGHT.bits();
        /// Up and down.
        const VERTICAL = Self::UP.bits() | Self::DOWN.bits();
        /// Every direction.
        const ALL = Self::HORIZONTAL.bits()
            | Self::VERTICAL.bits()
            | Self::START.bits()
            | Self::END.bits();
    }
}

/// Binds an item into a view. Args: (item, view, position).
pub type ViewBinder<T> = Arc<dyn Fn(&T, &mut <T as ItemKind>::View, usize) + Send + Sync>;

/// Binds a selectable item into a view. Args: (item, view, selected, position).
pub type SelectableViewBinder<T> =
    Arc<dyn Fn(&T, &mut <T as ItemKind>::View, bool, usize) + Send + Sync>;

/// The binder variant of a registered policy.
///
/// Items whose policy carries a [`Binder::Selectable`] can be selected; all
/// other items are ignored by the selection operations.
pub enum Binder<T: FlexItem> {
    /// A binder that does not care about selection.
    Plain(ViewBinder<T>),
    /// A selection-aware binder.
    Selectable(SelectableViewBinder<T>),
}

impl<T: FlexItem> Clone for Binder<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Plain(f) => Self::Plain(Arc::clone(f)),
            Self::Selectable(f) => Self::Selectable(Arc::clone(f)),
        }
    }
}

impl<T: FlexItem> fmt::Debug for Binder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Binder::Plain"),
            Self::Selectable(_) => f.write_str("Binder::Selectable"),
        }
    }
}

/// Layout, span, movement and binding rules for one registered item type.
pub struct RenderPolicy<T: FlexItem> {
    layout: LayoutId,
    span: u32,
    swipe: Directions,
    drag: Directions,
    binder: Binder<T>,
}

impl<T: FlexItem> RenderPolicy<T> {
    /// Starts building a policy that inflates `layout`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let policy = RenderPolicy::builder(LayoutId::new(7))
    ///     .span(2)
    ///     .swipe(Directions::HORIZONTAL)
    ///     .bind(|item: &Row, view: &mut TextCell, _position| view.text = item.title());
    /// ```
    pub fn builder(layout: LayoutId) -> PolicyBuilder<T> {
        PolicyBuilder {
            layout,
            span: 1,
            swipe: Directions::empty(),
            drag: Directions::empty(),
            _item: PhantomData,
        }
    }

    /// The layout inflated for items of this type.
    pub fn layout(&self) -> LayoutId {
        self.layout
    }

    /// The number of grid columns the item spans (always at least 1).
    pub fn span(&self) -> u32 {
        self.span
    }

    /// Directions in which the item can be swiped away.
    pub fn swipe_directions(&self) -> Directions {
        self.swipe
    }

    /// Directions in which the item can be dragged to reorder.
    pub fn drag_directions(&self) -> Directions {
        self.drag
    }

    /// The binder for items of this type.
    pub fn binder(&self) -> &Binder<T> {
        &self.binder
    }

    /// Returns `true` if items with this policy can be selected.
    pub fn is_selectable(&self) -> bool {
        matches!(self.binder, Binder::Selectable(_))
    }
}

impl<T: FlexItem> fmt::Debug for RenderPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPolicy")
            .field("layout", &self.layout)
            .field("span", &self.span)
            .field("swipe", &self.swipe)
            .field("drag", &self.drag)
            .field("binder", &self.binder)
            .finish()
    }
}

/// Builder for [`RenderPolicy`]. Finished by one of the `bind*`/`build*` methods.
pub struct PolicyBuilder<T> {
    layout: LayoutId,
    span: u32,
    swipe: Directions,
    drag: Directions,
    _item: PhantomData<fn(&T)>,
}

impl<T> fmt::Debug for PolicyBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyBuilder")
            .field("layout", &self.layout)
            .field("span", &self.span)
            .field("swipe", &self.swipe)
            .field("drag", &self.drag)
            .finish()
    }
}

impl<T: FlexItem> PolicyBuilder<T> {
    /// Sets the grid span. A span of zero is clamped to one.
    pub fn span(mut self, span: u32) -> Self {
        if span == 0 {
            tracing::warn!(target: targets::REGISTRY, layout = ?self.layout, "span of 0 clamped to 1");
        }
        self.span = span.max(1);
        self
    }

    /// Sets the swipe directions.
    pub fn swipe(mut self, directions: Directions) -> Self {
        self.swipe = directions;
        self
    }

    /// Sets the drag directions.
    pub fn drag(mut self, directions: Directions) -> Self {
        self.drag = directions;
        self
    }

    /// Finishes the policy with a plain binder.
    pub fn bind<F>(self, binder: F) -> RenderPolicy<T>
    where
        F: Fn(&T, &mut T::View, usize) + Send + Sync + 'static,
    {
        self.finish(Binder::Plain(Arc::new(binder)))
    }

    /// Finishes the policy with a selection-aware binder.
    pub fn bind_selectable<F>(self, binder: F) -> RenderPolicy<T>
    where
        F: Fn(&T, &mut T::View, bool, usize) + Send + Sync + 'static,
    {
        self.finish(Binder::Selectable(Arc::new(binder)))
    }

    /// Finishes the policy with nothing to bind (dividers, spacers).
    pub fn build(self) -> RenderPolicy<T> {
        self.bind(|_, _, _| {})
    }

    /// Finishes a selectable policy with nothing to bind.
    pub fn build_selectable(self) -> RenderPolicy<T> {
        self.bind_selectable(|_, _, _, _| {})
    }

    fn finish(self, binder: Binder<T>) -> RenderPolicy<T> {
        RenderPolicy {
            layout: self.layout,
            span: self.span,
            swipe: self.swipe,
            drag: self.drag,
            binder,
        }
    }
}

/// The outcome of resolving an item's policy.
pub enum Resolved<'a, T: FlexItem> {
    /// The item describes itself.
    SelfDescribed(&'a dyn SelfDescribing<T::View>),
    /// The item's type (or one of its base types) was registered.
    Registered(Arc<RenderPolicy<T>>),
}

impl<T: FlexItem> Resolved<'_, T> {
    /// The layout inflated for the item.
    pub fn layout(&self) -> LayoutId {
        match self {
            Self::SelfDescribed(item) => item.layout(),
            Self::Registered(policy) => policy.layout(),
        }
    }

    /// The grid span of the item (always at least 1).
    pub fn span(&self) -> u32 {
        match self {
            Self::SelfDescribed(item) => item.span().max(1),
            Self::Registered(policy) => policy.span(),
        }
    }

    /// Directions in which the item can be swiped.
    pub fn swipe_directions(&self) -> Directions {
        match self {
            Self::SelfDescribed(item) => item.swipe_directions(),
            Self::Registered(policy) => policy.swipe_directions(),
        }
    }

    /// Directions in which the item can be dragged.
    pub fn drag_directions(&self) -> Directions {
        match self {
            Self::SelfDescribed(item) => item.drag_directions(),
            Self::Registered(policy) => policy.drag_directions(),
        }
    }

    /// Returns `true` if the item can be selected.
    pub fn is_selectable(&self) -> bool {
        match self {
            Self::SelfDescribed(item) => item.is_selectable(),
            Self::Registered(policy) => policy.is_selectable(),
        }
    }
}

impl<T: FlexItem> fmt::Debug for Resolved<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfDescribed(item) => f
                .debug_struct("SelfDescribed")
                .field("layout", &item.layout())
                .field("view_type", &item.view_type())
                .finish(),
            Self::Registered(policy) => f.debug_tuple("Registered").field(policy).finish(),
        }
    }
}
