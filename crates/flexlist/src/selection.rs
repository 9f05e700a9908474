//! Selection set for adapters.
//!
//! [`SelectionSet`] only stores which items are selected. Deciding which items
//! may be selected, and announcing toggles to the view, is the adapter's job.

use std::collections::HashSet;
use std::hash::Hash;

use flexlist_core::logging::targets;

/// The set of selected items.
#[derive(Debug, Clone)]
pub struct SelectionSet<T> {
    selected: HashSet<T>,
}

impl<T> Default for SelectionSet<T> {
    fn default() -> Self {
        Self {
            selected: HashSet::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> SelectionSet<T> {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `item`. Returns `true` if it was not selected before.
    pub fn insert(&mut self, item: T) -> bool {
        self.selected.insert(item)
    }

    /// Removes `item`. Returns `true` if it was selected.
    pub fn remove(&mut self, item: &T) -> bool {
        self.selected.remove(item)
    }

    /// Returns `true` if `item` is selected.
    pub fn contains(&self, item: &T) -> bool {
        self.selected.contains(item)
    }

    /// Number of selected items.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Deselects everything.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// A snapshot of the selected items.
    pub fn items(&self) -> HashSet<T> {
        self.selected.clone()
    }

    /// Iterates over the selected items in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.selected.iter()
    }

    /// Keeps only the selected items still present in `items`.
    pub fn retain_present(&mut self, items: &[T]) {
        if self.selected.is_empty() {
            return;
        }
        let before = self.selected.len();
        if items.is_empty() {
            self.selected.clear();
        } else {
            let present: HashSet<&T> = items.iter().collect();
            self.selected.retain(|item| present.contains(item));
        }
        let dropped = before - self.selected.len();
        if dropped > 0 {
            tracing::trace!(target: targets::SELECTION, dropped, "dropped items no longer present");
        }
    }
}
