//! Drag-to-reorder and swipe-to-dismiss.
//!
//! A [`TouchHelper`] borrows the adapter and is driven by the host's gesture
//! recognizer:
//!
//! - [`movement_flags`](TouchHelper::movement_flags) when a gesture starts,
//! - [`on_move`](TouchHelper::on_move) for every step of a drag,
//! - [`on_swiped`](TouchHelper::on_swiped) when a swipe completes,
//! - [`on_gesture_finished`](TouchHelper::on_gesture_finished) when the item
//!   is released.
//!
//! The drag state survives between helpers, so a new helper may be created
//! for every callback.

use flexlist_core::logging::{span_names, targets};

use crate::adapter::FlexAdapter;
use crate::config::DragNotify;
use crate::error::Result;
use crate::host::GestureTarget;
use crate::item::FlexItem;
use crate::policy::Directions;

/// Progress of a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// An item picked up at `from` currently sits at `to`.
    Dragging { from: usize, to: usize },
}

/// Directions in which a gesture may start on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementFlags {
    /// Allowed drag directions.
    pub drag: Directions,
    /// Allowed swipe directions.
    pub swipe: Directions,
}

/// Gesture callbacks for one adapter.
#[derive(Debug)]
pub struct TouchHelper<'a, T: FlexItem> {
    adapter: &'a mut FlexAdapter<T>,
}

impl<'a, T: FlexItem> TouchHelper<'a, T> {
    pub(crate) fn new(adapter: &'a mut FlexAdapter<T>) -> Self {
        Self { adapter }
    }

    /// The current drag state.
    pub fn state(&self) -> DragState {
        self.adapter.drag
    }

    /// Directions in which `target` may be dragged or swiped.
    ///
    /// Targets without a valid position cannot move.
    pub fn movement_flags(&self, target: impl GestureTarget) -> Result<MovementFlags> {
        let Some(item) = target.position().and_then(|p| self.adapter.items().get(p)) else {
            return Ok(MovementFlags::default());
        };
        let resolved = self.adapter.registry().resolve(item)?;
        Ok(MovementFlags {
            drag: resolved.drag_directions(),
            swipe: resolved.swipe_directions(),
        })
    }

    /// Handles one drag step of `source` onto `target`'s position.
    ///
    /// Returns `false`, leaving the state untouched, when either position is
    /// invalid or either item cannot be dragged.
    pub fn on_move(&mut self, source: impl GestureTarget, target: impl GestureTarget) -> Result<bool> {
        let (Some(from), Some(to)) = (source.position(), target.position()) else {
            return Ok(false);
        };
        let _span = tracing::trace_span!(target: targets::GESTURE, span_names::GESTURE, from, to).entered();
        if !self.is_draggable(from)? || !self.is_draggable(to)? {
            tracing::trace!(target: targets::GESTURE, from, to, "move rejected");
            return Ok(false);
        }

        let state = match self.adapter.drag {
            DragState::Idle => DragState::Dragging { from, to },
            DragState::Dragging { from: origin, .. } => DragState::Dragging { from: origin, to },
        };
        self.adapter.move_item(from, to)?;
        self.adapter.drag = state;
        tracing::debug!(target: targets::GESTURE, ?state, "item moved");

        if self.adapter.config().drag_notify == DragNotify::Continuous {
            let item = self.adapter.items()[to].clone();
            self.adapter.signals().item_dragged.emit((item, from, to));
        }
        Ok(true)
    }

    /// Handles a completed swipe: announces the item, then removes it.
    ///
    /// Returns `false` when `target` has no valid position.
    pub fn on_swiped(&mut self, target: impl GestureTarget) -> Result<bool> {
        let Some(position) = target.position() else {
            return Ok(false);
        };
        let Some(item) = self.adapter.items().get(position).cloned() else {
            return Ok(false);
        };
        tracing::debug!(target: targets::GESTURE, position, "item swiped");
        self.adapter.signals().item_swiped.emit(item);
        self.adapter.items_mut().remove(position)?;
        Ok(true)
    }

    /// Handles the end of a gesture and returns to [`DragState::Idle`].
    ///
    /// In [`DragNotify::OnDrop`] mode a drag that changed the item's position
    /// is announced once, with the original and final positions.
    pub fn on_gesture_finished(&mut self) {
        let state = std::mem::take(&mut self.adapter.drag);
        let DragState::Dragging { from, to } = state else {
            return;
        };
        tracing::debug!(target: targets::GESTURE, from, to, "drag finished");
        if from == to || self.adapter.config().drag_notify != DragNotify::OnDrop {
            return;
        }
        if let Some(item) = self.adapter.items().get(to).cloned() {
            self.adapter.signals().item_dragged.emit((item, from, to));
        }
    }

    fn is_draggable(&self, position: usize) -> Result<bool> {
        match self.adapter.items().get(position) {
            Some(item) => Ok(!self
                .adapter
                .registry()
                .resolve(item)?
                .drag_directions()
                .is_empty()),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::config::AdapterConfig;
    use crate::item::{ItemKind, TypeKey};
    use crate::policy::{LayoutId, RenderPolicy};

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Card {
        Movable(u32),
        Pinned(u32),
    }

    struct Movable;
    struct Pinned;

    impl ItemKind for Card {
        type View = ();

        fn type_key(&self) -> TypeKey {
            match self {
                Card::Movable(_) => TypeKey::of::<Movable>(),
                Card::Pinned(_) => TypeKey::of::<Pinned>(),
            }
        }
    }

    type Dragged = Arc<Mutex<Vec<(Card, usize, usize)>>>;

    fn adapter(notify: DragNotify) -> (FlexAdapter<Card>, Dragged) {
        let mut adapter: FlexAdapter<Card> = FlexAdapter::with_config(AdapterConfig::new().with_drag_notify(notify));
        adapter
            .register::<Movable>(
                RenderPolicy::builder(LayoutId::new(1))
                    .drag(Directions::VERTICAL)
                    .swipe(Directions::HORIZONTAL)
                    .build(),
            )
            .unwrap();
        adapter
            .register::<Pinned>(RenderPolicy::builder(LayoutId::new(2)).build())
            .unwrap();
        adapter
            .items_mut()
            .extend([
                Card::Movable(0),
                Card::Movable(1),
                Card::Movable(2),
                Card::Movable(3),
                Card::Pinned(4),
            ])
            .unwrap();

        let dragged = Arc::new(Mutex::new(Vec::new()));
        let dragged_clone = dragged.clone();
        adapter.signals().item_dragged.connect(move |args| {
            dragged_clone.lock().push(args.clone());
        });
        (adapter, dragged)
    }

    #[test]
    fn test_movement_flags() {
        let (mut adapter, _) = adapter(DragNotify::OnDrop);
        let helper = adapter.touch_helper();
        let flags = helper.movement_flags(0).unwrap();
        assert_eq!(flags.drag, Directions::VERTICAL);
        assert_eq!(flags.swipe, Directions::HORIZONTAL);
        assert_eq!(helper.movement_flags(4).unwrap(), MovementFlags::default());
        assert_eq!(helper.movement_flags(None::<usize>).unwrap(), MovementFlags::default());
        assert_eq!(helper.movement_flags(99).unwrap(), MovementFlags::default());
    }

    #[test]
    fn test_drag_on_drop_fires_once() {
        let (mut adapter, dragged) = adapter(DragNotify::OnDrop);
        let mut helper = adapter.touch_helper();
        assert!(helper.on_move(1, 2).unwrap());
        assert!(helper.on_move(2, 3).unwrap());
        assert_eq!(helper.state(), DragState::Dragging { from: 1, to: 3 });
        assert!(dragged.lock().is_empty());

        helper.on_gesture_finished();
        assert_eq!(helper.state(), DragState::Idle);
        assert_eq!(*dragged.lock(), vec![(Card::Movable(1), 1, 3)]);
        assert_eq!(
            adapter.items(),
            &[
                Card::Movable(0),
                Card::Movable(2),
                Card::Movable(3),
                Card::Movable(1),
                Card::Pinned(4),
            ]
        );
    }

    #[test]
    fn test_drag_continuous_fires_per_move() {
        let (mut adapter, dragged) = adapter(DragNotify::Continuous);
        let mut helper = adapter.touch_helper();
        helper.on_move(1, 2).unwrap();
        helper.on_move(2, 3).unwrap();
        helper.on_gesture_finished();

        assert_eq!(
            *dragged.lock(),
            vec![(Card::Movable(1), 1, 2), (Card::Movable(1), 2, 3)]
        );
    }

    #[test]
    fn test_rejected_moves_keep_state() {
        let (mut adapter, dragged) = adapter(DragNotify::OnDrop);
        let mut helper = adapter.touch_helper();
        assert!(!helper.on_move(3, 4).unwrap());
        assert!(!helper.on_move(None::<usize>, 1).unwrap());
        assert!(!helper.on_move(0, 17).unwrap());
        assert_eq!(helper.state(), DragState::Idle);

        assert!(helper.on_move(0, 1).unwrap());
        assert!(!helper.on_move(1, 4).unwrap());
        assert_eq!(helper.state(), DragState::Dragging { from: 0, to: 1 });

        // Dragging back to the start is a cancellation.
        assert!(helper.on_move(1, 0).unwrap());
        helper.on_gesture_finished();
        assert!(dragged.lock().is_empty());
        assert_eq!(adapter.items()[0], Card::Movable(0));
    }

    #[test]
    fn test_swipe_announces_then_removes() {
        let (mut adapter, _) = adapter(DragNotify::OnDrop);
        let swiped = Arc::new(Mutex::new(Vec::new()));
        let swiped_clone = swiped.clone();
        adapter.signals().item_swiped.connect(move |card| {
            swiped_clone.lock().push(card.clone());
        });

        let mut helper = adapter.touch_helper();
        assert!(helper.on_swiped(2).unwrap());
        assert!(!helper.on_swiped(None::<usize>).unwrap());
        assert!(!helper.on_swiped(10).unwrap());

        assert_eq!(*swiped.lock(), vec![Card::Movable(2)]);
        assert_eq!(adapter.item_count(), 4);
        assert!(!adapter.items().contains(&Card::Movable(2)));
    }
}
