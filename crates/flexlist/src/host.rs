//! Seams to the host view layer.
//!
//! The adapter never draws or inflates anything itself. The host provides
//! views through inflater closures, attaches gesture recognition through
//! [`GestureHelperHost`], and reports on-screen positions through
//! [`GestureTarget`].

use crate::policy::ViewType;

/// A view created by the adapter, tagged with the view type it was made for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewHolder<V> {
    view_type: ViewType,
    view: V,
}

impl<V> ViewHolder<V> {
    /// Wraps a view created for `view_type`.
    pub fn new(view_type: ViewType, view: V) -> Self {
        Self { view_type, view }
    }

    /// The view type this holder was created for.
    pub fn view_type(&self) -> ViewType {
        self.view_type
    }

    /// The view.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the view.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Unwraps the view.
    pub fn into_view(self) -> V {
        self.view
    }
}

/// A scrollable host that can have the adapter's gesture helper attached.
pub trait GestureHelperHost {
    /// Starts routing drag and swipe gestures to the adapter's touch helper.
    fn attach_gesture_helper(&mut self);
}

/// Something that knows its current position in the adapter.
///
/// Hosts usually implement this for their view holder handles; a view that
/// is being laid out or removed has no position.
pub trait GestureTarget {
    /// The current adapter position, if any.
    fn position(&self) -> Option<usize>;
}

impl GestureTarget for usize {
    fn position(&self) -> Option<usize> {
        Some(*self)
    }
}

impl GestureTarget for Option<usize> {
    fn position(&self) -> Option<usize> {
        *self
    }
}

impl<G: GestureTarget + ?Sized> GestureTarget for &G {
    fn position(&self) -> Option<usize> {
        (**self).position()
    }
}

/// Grid span lookup for grid layouts.
pub trait SpanSizeLookup {
    /// Number of columns the item at `position` spans.
    ///
    /// Positions that cannot be resolved span one column.
    fn span_size(&self, position: usize) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_targets() {
        assert_eq!(3usize.position(), Some(3));
        assert_eq!(None::<usize>.position(), None);
        assert_eq!((&Some(2usize)).position(), Some(2));
    }

    #[test]
    fn test_view_holder() {
        let mut holder = ViewHolder::new(ViewType::new(4), String::from("row"));
        holder.view_mut().push('!');
        assert_eq!(holder.view_type(), ViewType::new(4));
        assert_eq!(holder.view(), "row!");
        assert_eq!(holder.into_view(), "row!");
    }
}
