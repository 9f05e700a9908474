//! An ordered collection that reports every structural change to a listener.
//!
//! `ObservableList<T, L>` owns its items and exactly one [`ListListener`].
//! Every mutating operation validates its arguments first, mutates, and then
//! delivers one [`ChangeEvent`] describing what happened. Single-item
//! operations produce single-item events, bulk operations produce range
//! events, and whole-structure operations (sorting, filtering, transforming)
//! produce [`ChangeEvent::Reset`].
//!
//! # Example
//!
//! ```
//! use flexlist::observable::{ChangeEvent, ListListener, ObservableList};
//!
//! #[derive(Default)]
//! struct Counter(usize);
//!
//! impl ListListener<i32> for Counter {
//!     fn on_changed(&mut self, _items: &[i32], _event: ChangeEvent<'_, i32>) -> flexlist::Result<()> {
//!         self.0 += 1;
//!         Ok(())
//!     }
//! }
//!
//! let mut list = ObservableList::new(Counter::default());
//! list.extend([1, 2, 3]).unwrap();
//! list.move_item(0, 2).unwrap();
//! assert_eq!(list.as_slice(), &[2, 3, 1]);
//! assert_eq!(list.listener().0, 2);
//! ```

use std::cmp::Ordering;
use std::ops::{Deref, DerefMut, Range};

use flexlist_core::logging::targets;

use crate::error::{Error, Result};

/// A structural change to an [`ObservableList`].
///
/// Indices refer to the collection after the change, except for removals
/// which refer to where the removed items used to be.
#[derive(Debug, PartialEq, Eq)]
pub enum ChangeEvent<'a, T> {
    /// Anything may have changed.
    Reset,
    /// The item at `index` was replaced; `old` is the previous value.
    ItemUpdated { index: usize, old: &'a T },
    /// `count` items were inserted at `start`.
    RangeInserted { start: usize, count: usize },
    /// `count` items were removed from `start`.
    RangeRemoved { start: usize, count: usize },
    /// `item` was removed from `index`.
    ItemRemoved { index: usize, item: &'a T },
    /// The item at `from` now sits at `to`.
    ItemMoved { from: usize, to: usize },
}

impl<T> Clone for ChangeEvent<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ChangeEvent<'_, T> {}

/// Receives the changes of an [`ObservableList`].
pub trait ListListener<T> {
    /// Called with the items about to enter the collection, before anything
    /// is mutated. Returning an error aborts the operation.
    fn validate(&mut self, _incoming: &[T]) -> Result<()> {
        Ok(())
    }

    /// Called after every change while the list is listening.
    fn on_changed(&mut self, items: &[T], event: ChangeEvent<'_, T>) -> Result<()>;
}

impl<T> ListListener<T> for () {
    fn on_changed(&mut self, _items: &[T], _event: ChangeEvent<'_, T>) -> Result<()> {
        Ok(())
    }
}

/// An ordered collection with change notification.
#[derive(Debug)]
pub struct ObservableList<T, L = ()> {
    items: Vec<T>,
    listener: L,
    listening: bool,
}

impl<T> Default for ObservableList<T, ()> {
    fn default() -> Self {
        Self::new(())
    }
}

impl<T, L: ListListener<T>> ObservableList<T, L> {
    /// Creates an empty list reporting to `listener`.
    pub fn new(listener: L) -> Self {
        Self {
            items: Vec::new(),
            listener,
            listening: true,
        }
    }

    /// The listener.
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Mutable access to the listener.
    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Splits the list into its items and its listener.
    pub(crate) fn parts_mut(&mut self) -> (&[T], &mut L) {
        (&self.items, &mut self.listener)
    }

    /// Returns the items as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Returns `true` if changes are delivered to the listener.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Turns event delivery on or off.
    ///
    /// Changes made while delivery is off are not reported later; use
    /// [`batch`](Self::batch) to get a single reset afterwards.
    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    /// Suspends event delivery until the returned guard is dropped.
    ///
    /// The guard dereferences to the list. Dropping it restores the
    /// previous delivery state, so nested guards compose.
    pub fn suspend(&mut self) -> SuspendGuard<'_, T, L> {
        let was_listening = self.listening;
        self.listening = false;
        SuspendGuard {
            list: self,
            was_listening,
        }
    }

    /// Runs `f` with delivery suspended, then delivers one [`ChangeEvent::Reset`].
    ///
    /// The reset is skipped when delivery was already off.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> Result<R> {
        let result = {
            let mut guard = self.suspend();
            f(&mut *guard)
        };
        self.dispatch(ChangeEvent::Reset)?;
        Ok(result)
    }

    /// Delivers `event` to the listener, whether or not the list is listening.
    pub fn notify(&mut self, event: ChangeEvent<'_, T>) -> Result<()> {
        tracing::trace!(target: targets::COLLECTION, event = event_kind(&event), "manual change event");
        self.listener.on_changed(&self.items, event)
    }

    /// Appends an item.
    pub fn push(&mut self, item: T) -> Result<()> {
        self.listener.validate(std::slice::from_ref(&item))?;
        let start = self.items.len();
        self.items.push(item);
        self.dispatch(ChangeEvent::RangeInserted { start, count: 1 })
    }

    /// Inserts an item at `index`, shifting later items up.
    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        Error::check_insert_index(index, self.items.len())?;
        self.listener.validate(std::slice::from_ref(&item))?;
        self.items.insert(index, item);
        self.dispatch(ChangeEvent::RangeInserted {
            start: index,
            count: 1,
        })
    }

    /// Appends every item of `iter`. Returns the number of items added.
    pub fn extend(&mut self, iter: impl IntoIterator<Item = T>) -> Result<usize> {
        let start = self.items.len();
        self.insert_all(start, iter)
    }

    /// Inserts every item of `iter` at `index`. Returns the number of items added.
    pub fn insert_all(&mut self, index: usize, iter: impl IntoIterator<Item = T>) -> Result<usize> {
        Error::check_insert_index(index, self.items.len())?;
        let incoming: Vec<T> = iter.into_iter().collect();
        if incoming.is_empty() {
            return Ok(0);
        }
        self.listener.validate(&incoming)?;
        let count = incoming.len();
        self.items.splice(index..index, incoming);
        self.dispatch(ChangeEvent::RangeInserted {
            start: index,
            count,
        })?;
        Ok(count)
    }

    /// Removes and returns the item at `index`.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        Error::check_index(index, self.items.len())?;
        let item = self.items.remove(index);
        self.dispatch(ChangeEvent::ItemRemoved { index, item: &item })?;
        Ok(item)
    }

    /// Replaces the item at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, item: T) -> Result<T> {
        Error::check_index(index, self.items.len())?;
        self.listener.validate(std::slice::from_ref(&item))?;
        let old = std::mem::replace(&mut self.items[index], item);
        self.dispatch(ChangeEvent::ItemUpdated { index, old: &old })?;
        Ok(old)
    }

    /// Removes the items in `range` and returns them.
    pub fn remove_range(&mut self, range: Range<usize>) -> Result<Vec<T>> {
        let len = self.items.len();
        if range.end > len {
            return Err(Error::index_out_of_range(range.end, len));
        }
        if range.start > range.end {
            return Err(Error::index_out_of_range(range.start, range.end));
        }
        let start = range.start;
        let removed: Vec<T> = self.items.drain(range).collect();
        if !removed.is_empty() {
            self.dispatch(ChangeEvent::RangeRemoved {
                start,
                count: removed.len(),
            })?;
        }
        Ok(removed)
    }

    /// Removes every item. Does nothing on an empty list.
    pub fn clear(&mut self) -> Result<()> {
        let count = self.items.len();
        if count == 0 {
            return Ok(());
        }
        self.items.clear();
        self.dispatch(ChangeEvent::RangeRemoved { start: 0, count })
    }

    /// Keeps only the items for which `keep` returns `true`.
    ///
    /// Returns the number of items removed. A reset is delivered either way.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) -> Result<usize> {
        let before = self.items.len();
        self.items.retain(keep);
        let removed = before - self.items.len();
        self.dispatch(ChangeEvent::Reset)?;
        Ok(removed)
    }

    /// Removes every item for which `matches` returns `true`.
    pub fn remove_matching(&mut self, mut matches: impl FnMut(&T) -> bool) -> Result<usize> {
        self.retain(|item| !matches(item))
    }

    /// Moves the item at `from` to `to`, shifting the items in between by one.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.items.len();
        Error::check_index(from, len)?;
        Error::check_index(to, len)?;
        if from == to {
            return Ok(());
        }
        if from < to {
            self.items[from..=to].rotate_left(1);
        } else {
            self.items[to..=from].rotate_right(1);
        }
        self.dispatch(ChangeEvent::ItemMoved { from, to })
    }

    /// Sorts the items with a comparator.
    pub fn sort_by(&mut self, compare: impl FnMut(&T, &T) -> Ordering) -> Result<()> {
        self.items.sort_by(compare);
        self.dispatch(ChangeEvent::Reset)
    }

    /// Sorts the items by a key.
    pub fn sort_by_key<K: Ord>(&mut self, key: impl FnMut(&T) -> K) -> Result<()> {
        self.items.sort_by_key(key);
        self.dispatch(ChangeEvent::Reset)
    }

    /// Replaces every item with `transform(item)`.
    ///
    /// The new items are validated as a whole before any is stored.
    pub fn replace_all(&mut self, transform: impl FnMut(&T) -> T) -> Result<()> {
        let replaced: Vec<T> = self.items.iter().map(transform).collect();
        self.listener.validate(&replaced)?;
        self.items = replaced;
        self.dispatch(ChangeEvent::Reset)
    }

    fn dispatch(&mut self, event: ChangeEvent<'_, T>) -> Result<()> {
        if !self.listening {
            tracing::trace!(target: targets::COLLECTION, event = event_kind(&event), "change not delivered, suspended");
            return Ok(());
        }
        tracing::trace!(target: targets::COLLECTION, event = event_kind(&event), len = self.items.len(), "change");
        self.listener.on_changed(&self.items, event)
    }
}

impl<T: PartialEq, L: ListListener<T>> ObservableList<T, L> {
    /// Returns the position of the first item equal to `item`.
    pub fn position_of(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|x| x == item)
    }

    /// Removes the first item equal to `item`.
    ///
    /// Returns `false`, and delivers nothing, when no such item exists.
    pub fn remove_item(&mut self, item: &T) -> Result<bool> {
        match self.position_of(item) {
            Some(index) => self.remove(index).map(|_| true),
            None => Ok(false),
        }
    }

    /// Removes every item equal to one in `items`.
    pub fn remove_all(&mut self, items: &[T]) -> Result<usize> {
        self.retain(|x| !items.contains(x))
    }
}

impl<T, L> Deref for ObservableList<T, L> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<'a, T, L> IntoIterator for &'a ObservableList<T, L> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Keeps an [`ObservableList`] from delivering events while alive.
#[derive(Debug)]
pub struct SuspendGuard<'a, T, L: ListListener<T>> {
    list: &'a mut ObservableList<T, L>,
    was_listening: bool,
}

impl<T, L: ListListener<T>> Deref for SuspendGuard<'_, T, L> {
    type Target = ObservableList<T, L>;

    fn deref(&self) -> &Self::Target {
        self.list
    }
}

impl<T, L: ListListener<T>> DerefMut for SuspendGuard<'_, T, L> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.list
    }
}

impl<T, L: ListListener<T>> Drop for SuspendGuard<'_, T, L> {
    fn drop(&mut self) {
        self.list.listening = self.was_listening;
    }
}

fn event_kind<T>(event: &ChangeEvent<'_, T>) -> &'static str {
    match event {
        ChangeEvent::Reset => "reset",
        ChangeEvent::ItemUpdated { .. } => "item_updated",
        ChangeEvent::RangeInserted { .. } => "range_inserted",
        ChangeEvent::RangeRemoved { .. } => "range_removed",
        ChangeEvent::ItemRemoved { .. } => "item_removed",
        ChangeEvent::ItemMoved { .. } => "item_moved",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Seen {
        Reset,
        Updated(usize, i32),
        Inserted(usize, usize),
        Removed(usize, usize),
        ItemRemoved(usize, i32),
        Moved(usize, usize),
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<Seen>,
        reject_negative: bool,
    }

    impl ListListener<i32> for Recorder {
        fn validate(&mut self, incoming: &[i32]) -> Result<()> {
            if self.reject_negative && incoming.iter().any(|x| *x < 0) {
                return Err(Error::NotInCollection);
            }
            Ok(())
        }

        fn on_changed(&mut self, _items: &[i32], event: ChangeEvent<'_, i32>) -> Result<()> {
            self.seen.push(match event {
                ChangeEvent::Reset => Seen::Reset,
                ChangeEvent::ItemUpdated { index, old } => Seen::Updated(index, *old),
                ChangeEvent::RangeInserted { start, count } => Seen::Inserted(start, count),
                ChangeEvent::RangeRemoved { start, count } => Seen::Removed(start, count),
                ChangeEvent::ItemRemoved { index, item } => Seen::ItemRemoved(index, *item),
                ChangeEvent::ItemMoved { from, to } => Seen::Moved(from, to),
            });
            Ok(())
        }
    }

    fn list_of(items: &[i32]) -> ObservableList<i32, Recorder> {
        let mut list = ObservableList::new(Recorder::default());
        list.extend(items.iter().copied()).unwrap();
        list.listener_mut().seen.clear();
        list
    }

    #[test]
    fn test_single_item_events() {
        let mut list = list_of(&[]);
        list.push(1).unwrap();
        list.insert(0, 0).unwrap();
        assert_eq!(list.set(1, 10).unwrap(), 1);
        assert_eq!(list.remove(0).unwrap(), 0);

        assert_eq!(list.as_slice(), &[10]);
        assert_eq!(
            list.listener().seen,
            vec![
                Seen::Inserted(0, 1),
                Seen::Inserted(0, 1),
                Seen::Updated(1, 1),
                Seen::ItemRemoved(0, 0),
            ]
        );
    }

    #[test]
    fn test_bulk_events() {
        let mut list = list_of(&[]);
        assert_eq!(list.extend([1, 2, 3, 4]).unwrap(), 4);
        assert_eq!(list.extend(std::iter::empty()).unwrap(), 0);
        assert_eq!(list.insert_all(1, [7, 8]).unwrap(), 2);
        assert_eq!(list.remove_range(2..4).unwrap(), vec![8, 2]);
        list.clear().unwrap();
        list.clear().unwrap();

        assert_eq!(
            list.listener().seen,
            vec![
                Seen::Inserted(0, 4),
                Seen::Inserted(1, 2),
                Seen::Removed(2, 2),
                Seen::Removed(0, 4),
            ]
        );
    }

    #[test]
    fn test_whole_structure_events() {
        let mut list = list_of(&[3, 1, 2, 1]);
        list.sort_by(|a, b| b.cmp(a)).unwrap();
        assert_eq!(list.as_slice(), &[3, 2, 1, 1]);
        assert_eq!(list.remove_all(&[1]).unwrap(), 2);
        assert_eq!(list.remove_matching(|x| *x > 100).unwrap(), 0);
        list.replace_all(|x| x * 10).unwrap();
        list.sort_by_key(|x| *x).unwrap();

        assert_eq!(list.as_slice(), &[20, 30]);
        assert_eq!(list.listener().seen, vec![Seen::Reset; 5]);
    }

    #[test]
    fn test_bulk_removal_resets_even_when_nothing_matches() {
        let mut list = list_of(&[4, 5]);
        assert_eq!(list.retain(|_| true).unwrap(), 0);
        assert_eq!(list.remove_all(&[9]).unwrap(), 0);
        assert_eq!(list.remove_matching(|_| false).unwrap(), 0);

        assert_eq!(list.as_slice(), &[4, 5]);
        assert_eq!(list.listener().seen, vec![Seen::Reset; 3]);
    }

    #[test]
    fn test_move_rotates_range() {
        let mut list = list_of(&[0, 1, 2, 3, 4]);
        list.move_item(1, 3).unwrap();
        assert_eq!(list.as_slice(), &[0, 2, 3, 1, 4]);
        list.move_item(3, 1).unwrap();
        assert_eq!(list.as_slice(), &[0, 1, 2, 3, 4]);
        list.move_item(2, 2).unwrap();

        assert_eq!(list.listener().seen, vec![Seen::Moved(1, 3), Seen::Moved(3, 1)]);
    }

    #[test]
    fn test_out_of_range_does_not_mutate() {
        let mut list = list_of(&[1, 2]);
        assert_eq!(list.remove(2), Err(Error::IndexOutOfRange { index: 2, len: 2 }));
        assert!(list.insert(3, 9).is_err());
        assert!(list.set(5, 9).is_err());
        assert!(list.move_item(0, 2).is_err());
        assert!(list.remove_range(1..3).is_err());
        assert_eq!(list.as_slice(), &[1, 2]);
        assert!(list.listener().seen.is_empty());
    }

    #[test]
    fn test_validation_rejects_before_insert() {
        let mut list = list_of(&[1]);
        list.listener_mut().reject_negative = true;
        assert!(list.push(-1).is_err());
        assert!(list.extend([2, -3]).is_err());
        assert!(list.replace_all(|x| -x).is_err());
        assert_eq!(list.as_slice(), &[1]);
        assert!(list.listener().seen.is_empty());
    }

    #[test]
    fn test_remove_item() {
        let mut list = list_of(&[5, 6, 5]);
        assert!(list.remove_item(&5).unwrap());
        assert!(!list.remove_item(&9).unwrap());
        assert_eq!(list.as_slice(), &[6, 5]);
        assert_eq!(list.position_of(&5), Some(1));
        assert!(list.contains(&6));
        assert_eq!(list.listener().seen, vec![Seen::ItemRemoved(0, 5)]);
    }

    #[test]
    fn test_suspend_guard_restores_delivery() {
        let mut list = list_of(&[]);
        {
            let mut guard = list.suspend();
            guard.push(1).unwrap();
            {
                let mut inner = guard.suspend();
                inner.push(2).unwrap();
            }
            assert!(!guard.is_listening());
        }
        assert!(list.is_listening());
        assert!(list.listener().seen.is_empty());
        list.push(3).unwrap();
        assert_eq!(list.listener().seen, vec![Seen::Inserted(2, 1)]);
    }

    #[test]
    fn test_batch_delivers_one_reset() {
        let mut list = list_of(&[]);
        let added = list
            .batch(|list| {
                list.push(1).unwrap();
                list.push(2).unwrap();
                list.remove(0).unwrap();
                list.len()
            })
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(list.listener().seen, vec![Seen::Reset]);
    }

    #[test]
    fn test_batch_while_not_listening() {
        let mut list = list_of(&[]);
        list.set_listening(false);
        list.batch(|list| list.push(1)).unwrap().unwrap();
        assert!(list.listener().seen.is_empty());

        list.notify(ChangeEvent::ItemMoved { from: 0, to: 0 }).unwrap();
        assert_eq!(list.listener().seen, vec![Seen::Moved(0, 0)]);
    }

    #[test]
    fn test_unit_listener() {
        let mut list: ObservableList<&str> = ObservableList::default();
        list.extend(["a", "b"]).unwrap();
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
