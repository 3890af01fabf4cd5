//! In-scope reorder coordinator.
//!
//! # Responsibility
//! - Move one active item to a new position inside its current scope.
//!
//! # Invariants
//! - The moving item is displaced to `max + 1` before neighbours shift, so
//!   the shift never meets the item's old slot under an immediate unique
//!   constraint.
//! - Targets past the end clamp to the last position.
//! - Negative targets fail before any write.

use super::error::{OrderingError, OrderingResult};
use super::store::PositionStore;
use crate::model::ordered::OrderedItem;
use log::debug;

/// Outcome of a reorder or transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Item already sat at the (clamped) target.
    Unchanged,
    /// Item now sits at `position`.
    Moved { position: i64 },
}

/// Moves items within their current scope.
pub struct ReorderCoordinator<'s, S: PositionStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: PositionStore + ?Sized> ReorderCoordinator<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Moves `item` to `requested` inside `item.scope_id`.
    ///
    /// # Errors
    /// - `InvalidPosition` when `requested < 0`.
    /// - `ItemArchived` when `item` is not active.
    pub fn reorder(&self, item: &OrderedItem, requested: i64) -> OrderingResult<MoveOutcome> {
        if requested < 0 {
            return Err(OrderingError::InvalidPosition(requested));
        }
        if !item.active {
            return Err(OrderingError::ItemArchived(item.id));
        }

        let from = item.position;
        let max = self.store.max_position(item.scope_id)?;
        let to = requested.min(max);
        if from == to {
            debug!(
                "event=ordering_reorder module=ordering status=noop kind={} item={} position={}",
                item.kind.as_str(),
                item.id,
                from
            );
            return Ok(MoveOutcome::Unchanged);
        }

        let temp = max + 1;
        self.store.set_position(item.id, temp)?;
        let shifted = if to < from {
            self.store.shift_range(item.scope_id, to, from - 1, 1)?
        } else {
            self.store.shift_range(item.scope_id, from + 1, to, -1)?
        };
        self.store.set_position(item.id, to)?;

        debug!(
            "event=ordering_reorder module=ordering status=ok kind={} item={} from={} to={} shifted={}",
            item.kind.as_str(),
            item.id,
            from,
            to,
            shifted
        );
        Ok(MoveOutcome::Moved { position: to })
    }
}

#[cfg(test)]
mod tests {
    use super::{MoveOutcome, ReorderCoordinator};
    use crate::model::ordered::OrderedKind;
    use crate::ordering::error::OrderingError;
    use crate::ordering::fake_store::FakeStore;
    use uuid::Uuid;

    #[test]
    fn moving_up_shifts_the_skipped_range_down() {
        let store = FakeStore::new();
        let scope = Uuid::new_v4();
        let ids = store.seed(OrderedKind::Epic, scope, 4);
        let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);

        let outcome = ReorderCoordinator::new(&store)
            .reorder(&store.item(d), 1)
            .unwrap();

        assert_eq!(outcome, MoveOutcome::Moved { position: 1 });
        assert_eq!(store.order(scope), vec![a, d, b, c]);
        assert_eq!(store.positions(scope), vec![0, 1, 2, 3]);
    }

    #[test]
    fn moving_down_shifts_the_skipped_range_up() {
        let store = FakeStore::new();
        let scope = Uuid::new_v4();
        let ids = store.seed(OrderedKind::Epic, scope, 4);
        let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);

        ReorderCoordinator::new(&store)
            .reorder(&store.item(a), 3)
            .unwrap();

        assert_eq!(store.order(scope), vec![b, c, d, a]);
        assert_eq!(store.positions(scope), vec![0, 1, 2, 3]);
    }

    #[test]
    fn target_past_the_end_clamps_to_last_slot() {
        let store = FakeStore::new();
        let scope = Uuid::new_v4();
        let ids = store.seed(OrderedKind::BoardColumn, scope, 3);

        let outcome = ReorderCoordinator::new(&store)
            .reorder(&store.item(ids[0]), 42)
            .unwrap();

        assert_eq!(outcome, MoveOutcome::Moved { position: 2 });
        assert_eq!(store.order(scope), vec![ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn same_position_is_a_noop_without_writes() {
        let store = FakeStore::new();
        let scope = Uuid::new_v4();
        let ids = store.seed(OrderedKind::BoardCard, scope, 3);

        let outcome = ReorderCoordinator::new(&store)
            .reorder(&store.item(ids[1]), 1)
            .unwrap();

        assert_eq!(outcome, MoveOutcome::Unchanged);
        assert_eq!(store.writes(), 0);
        assert_eq!(store.order(scope), ids);
    }

    #[test]
    fn negative_target_is_rejected_before_any_write() {
        let store = FakeStore::new();
        let scope = Uuid::new_v4();
        let ids = store.seed(OrderedKind::Epic, scope, 2);

        let err = ReorderCoordinator::new(&store)
            .reorder(&store.item(ids[1]), -1)
            .unwrap_err();

        assert!(matches!(err, OrderingError::InvalidPosition(-1)));
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn round_trip_restores_every_position() {
        let store = FakeStore::new();
        let scope = Uuid::new_v4();
        let ids = store.seed(OrderedKind::UserStory, scope, 5);
        let coordinator = ReorderCoordinator::new(&store);

        coordinator.reorder(&store.item(ids[1]), 4).unwrap();
        coordinator.reorder(&store.item(ids[1]), 1).unwrap();

        assert_eq!(store.order(scope), ids);
    }
}
