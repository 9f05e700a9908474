//! Error types for flexlist.

use crate::policy::ViewType;

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while mutating, resolving or binding items.
///
/// Every variant is raised synchronously by the call that violated the
/// precondition. Index and membership errors are detected before anything is
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No render policy could be resolved for an item's type.
    #[error(
        "Must register type `{type_name}` before adding it to the adapter. \
         Registered types are: {registered:?}"
    )]
    UnregisteredType {
        type_name: &'static str,
        registered: Vec<&'static str>,
    },

    /// A self-describing type was passed to one of the `register` entry points.
    #[error("Cannot register self-describing type `{type_name}`; it carries its own policy")]
    ConflictingRegistration { type_name: &'static str },

    /// No policy or view factory is stored under a view-type tag.
    #[error("No view type {0:?} is known to the adapter")]
    UnknownViewType(ViewType),

    /// An index was outside the collection.
    #[error("Invalid index {index} for list of size {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// An item that must be in the collection was not found.
    #[error("Item is not in the adapter")]
    NotInCollection,

    /// A view holder was bound to an item of a different view type.
    #[error(
        "Cannot bind item at position {position}: holder has view type {actual:?}, \
         item needs {expected:?}"
    )]
    IllegalBindState {
        position: usize,
        expected: ViewType,
        actual: ViewType,
    },
}

impl Error {
    /// Create an index error.
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Returns an error unless `index < len`.
    pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(Self::index_out_of_range(index, len))
        }
    }

    /// Returns an error unless `index <= len` (valid insertion point).
    pub(crate) fn check_insert_index(index: usize, len: usize) -> Result<()> {
        if index <= len {
            Ok(())
        } else {
            Err(Self::index_out_of_range(index, len))
        }
    }
}
