//! Item typing: how the adapter identifies the type of an item.
//!
//! Applications describe their items by implementing [`ItemKind`]. Any
//! `ItemKind` that is also `Clone + Eq + Hash + Send + Sync + 'static` is a
//! [`FlexItem`] and can be stored in an adapter. Equality and hashing define
//! selection identity; wrap values in [`Identity`] to select by reference
//! instead.
//!
//! # Example
//!
//! ```
//! use flexlist::{ItemKind, TypeKey};
//!
//! struct Header;
//! struct Photo;
//!
//! #[derive(Clone, PartialEq, Eq, Hash)]
//! enum Row {
//!     Header(String),
//!     Photo(u64),
//! }
//!
//! impl ItemKind for Row {
//!     type View = String;
//!
//!     fn type_key(&self) -> TypeKey {
//!         match self {
//!             Row::Header(_) => TypeKey::of::<Header>(),
//!             Row::Photo(_) => TypeKey::of::<Photo>(),
//!         }
//!     }
//! }
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::policy::{Directions, LayoutId, ViewType};

/// Stable identifier of an item type.
///
/// Keys compare by name, so two keys built from the same type (or the same
/// string) are always equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(&'static str);

impl TypeKey {
    /// The key of a Rust type, named after its fully qualified path.
    pub fn of<U: ?Sized + 'static>() -> Self {
        Self(std::any::type_name::<U>())
    }

    /// A key with an explicit name.
    pub const fn named(name: &'static str) -> Self {
        Self(name)
    }

    /// The name of this key.
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Inflates a view for a layout. The argument is the host's inflater.
pub type ViewFactory<V> = Arc<dyn Fn(&mut dyn FnMut(LayoutId) -> V) -> V + Send + Sync>;

/// An item that carries its own render policy.
///
/// Self-describing items are never registered; the adapter asks the item
/// directly every time.
pub trait SelfDescribing<V: 'static>: Send + Sync {
    /// The layout inflated for this item.
    fn layout(&self) -> LayoutId;

    /// The view-type tag. Defaults to the layout's raw id.
    fn view_type(&self) -> ViewType {
        ViewType::new(self.layout().get())
    }

    /// Grid span. Values below 1 are treated as 1.
    fn span(&self) -> u32 {
        1
    }

    /// Swipe directions.
    fn swipe_directions(&self) -> Directions {
        Directions::empty()
    }

    /// Drag directions.
    fn drag_directions(&self) -> Directions {
        Directions::empty()
    }

    /// Whether this item takes part in selection.
    fn is_selectable(&self) -> bool {
        false
    }

    /// Creates views for this item's view type.
    ///
    /// The adapter records the factory of the first item seen for each view
    /// type. The default inflates [`layout`](Self::layout).
    fn view_factory(&self) -> ViewFactory<V> {
        let layout = self.layout();
        Arc::new(move |inflate: &mut dyn FnMut(LayoutId) -> V| inflate(layout))
    }

    /// Copies this item into `view`.
    fn bind(&self, view: &mut V, selected: bool, position: usize);
}

/// Type information for an item.
pub trait ItemKind {
    /// The host's concrete view type.
    type View: 'static;

    /// The key of the item's concrete type.
    fn type_key(&self) -> TypeKey;

    /// Whether the item is of kind `key`: its own type or a base type it
    /// belongs to. Used when no registration exists for the concrete type.
    fn is_kind_of(&self, key: TypeKey) -> bool {
        self.type_key() == key
    }

    /// The item's own policy, if it carries one.
    fn self_described(&self) -> Option<&dyn SelfDescribing<Self::View>> {
        None
    }

    /// Whether items registered under `key` describe themselves.
    ///
    /// Registration of such keys is rejected.
    fn is_self_describing_kind(_key: TypeKey) -> bool
    where
        Self: Sized,
    {
        false
    }
}

/// An item that can be stored in an adapter.
///
/// Implemented for every suitable [`ItemKind`].
pub trait FlexItem: ItemKind + Clone + Eq + Hash + Send + Sync + 'static {}

impl<T> FlexItem for T where T: ItemKind + Clone + Eq + Hash + Send + Sync + 'static {}

/// Reference-identity wrapper.
///
/// Two `Identity` values are equal only when they point at the same
/// allocation, regardless of the wrapped value.
pub struct Identity<U>(Arc<U>);

impl<U> Identity<U> {
    /// Wraps a new value.
    pub fn new(value: U) -> Self {
        Self(Arc::new(value))
    }

    /// Returns the shared allocation.
    pub fn as_arc(&self) -> &Arc<U> {
        &self.0
    }
}

impl<U> From<Arc<U>> for Identity<U> {
    fn from(value: Arc<U>) -> Self {
        Self(value)
    }
}

impl<U> Clone for Identity<U> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<U> PartialEq for Identity<U> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<U> Eq for Identity<U> {}

impl<U> Hash for Identity<U> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl<U> Deref for Identity<U> {
    type Target = U;

    fn deref(&self) -> &U {
        &self.0
    }
}

impl<U: fmt::Debug> fmt::Debug for Identity<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identity")
            .field(&Arc::as_ptr(&self.0))
            .field(&*self.0)
            .finish()
    }
}

impl<U: ItemKind> ItemKind for Identity<U> {
    type View = U::View;

    fn type_key(&self) -> TypeKey {
        self.0.type_key()
    }

    fn is_kind_of(&self, key: TypeKey) -> bool {
        self.0.is_kind_of(key)
    }

    fn self_described(&self) -> Option<&dyn SelfDescribing<Self::View>> {
        self.0.self_described()
    }

    fn is_self_describing_kind(key: TypeKey) -> bool
    where
        Self: Sized,
    {
        U::is_self_describing_kind(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, PartialEq)]
    struct Note(&'static str);

    impl ItemKind for Note {
        type View = String;

        fn type_key(&self) -> TypeKey {
            TypeKey::named("Note")
        }
    }

    fn assert_flex_item<T: FlexItem>() {}

    #[test]
    fn test_type_keys() {
        assert_eq!(TypeKey::of::<Note>(), TypeKey::of::<Note>());
        assert_ne!(TypeKey::of::<Note>(), TypeKey::of::<String>());
        assert!(TypeKey::of::<Note>().name().ends_with("Note"));
        assert_eq!(TypeKey::named("Note").to_string(), "Note");
    }

    #[test]
    fn test_identity_compares_by_pointer() {
        assert_flex_item::<Identity<Note>>();

        let a = Identity::new(Note("same"));
        let b = Identity::new(Note("same"));
        assert_eq!(*a, *b);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());

        let set: HashSet<_> = [a.clone(), b.clone(), a.clone()].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_identity_forwards_kind() {
        let a = Identity::new(Note("x"));
        assert_eq!(a.type_key(), TypeKey::named("Note"));
        assert!(a.is_kind_of(TypeKey::named("Note")));
        assert!(a.self_described().is_none());
    }

    struct Spacer;

    impl SelfDescribing<String> for Spacer {
        fn layout(&self) -> LayoutId {
            LayoutId::new(42)
        }

        fn bind(&self, view: &mut String, _selected: bool, position: usize) {
            *view = format!("spacer {position}");
        }
    }

    #[test]
    fn test_self_describing_defaults() {
        let spacer = Spacer;
        assert_eq!(spacer.view_type(), ViewType::new(42));
        assert_eq!(spacer.span(), 1);
        assert!(!spacer.is_selectable());

        let factory = spacer.view_factory();
        let mut inflated = Vec::new();
        let view = factory(&mut |layout| {
            inflated.push(layout);
            String::from("inflated")
        });
        assert_eq!(view, "inflated");
        assert_eq!(inflated, vec![LayoutId::new(42)]);
    }
}
