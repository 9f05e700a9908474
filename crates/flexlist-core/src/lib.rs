//! Core systems for flexlist.
//!
//! This crate provides the infrastructure the adapter crate is built on:
//!
//! - **Signal/Slot System**: Type-safe notifications for refresh instructions
//!   and gesture callbacks
//! - **Logging**: `tracing` targets, span names and helper macros
//! - **Thread Checks**: Affinity guards for single-thread UI objects
//!
//! # Signal/Slot Example
//!
//! ```
//! use flexlist_core::Signal;
//!
//! // Create a signal that notifies when a row changes
//! let row_changed = Signal::<usize>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = row_changed.connect(|row| {
//!     println!("Row {} changed", row);
//! });
//!
//! // Emit the signal
//! row_changed.emit(4);
//!
//! // Disconnect when done
//! row_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;
pub mod thread_check;

pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
