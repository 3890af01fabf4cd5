//! Archive, restore and remove coordinators.
//!
//! # Responsibility
//! - Retire items from the active ordering, softly or for good.
//! - Re-admit archived items at the end of their scope.
//!
//! # Invariants
//! - Archiving and removing close the gap immediately.
//! - Restoring never reuses the stored position; it re-appends against the
//!   current active set, because other items may have taken that slot.

use super::error::{OrderingError, OrderingResult};
use super::store::PositionStore;
use crate::model::ordered::OrderedItem;
use log::debug;

/// Soft-delete lifecycle for kinds that support archiving.
pub struct ArchiveCoordinator<'s, S: PositionStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: PositionStore + ?Sized> ArchiveCoordinator<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Marks `item` archived and closes its gap.
    ///
    /// # Errors
    /// - `ArchiveUnsupported` for kinds without an archived lifecycle.
    /// - `ItemArchived` when `item` is already archived.
    pub fn archive(&self, item: &OrderedItem) -> OrderingResult<()> {
        if !item.kind.supports_archive() {
            return Err(OrderingError::ArchiveUnsupported(item.kind));
        }
        if !item.active {
            return Err(OrderingError::ItemArchived(item.id));
        }

        self.store.set_active(item.id, false)?;
        let closed = self.store.decrement_after(item.scope_id, item.position)?;

        debug!(
            "event=ordering_archive module=ordering status=ok kind={} item={} scope={} position={} closed={}",
            item.kind.as_str(),
            item.id,
            item.scope_id,
            item.position,
            closed
        );
        Ok(())
    }

    /// Re-admits an archived `item` at the end of its scope.
    ///
    /// Returns the new position.
    ///
    /// # Errors
    /// - `ArchiveUnsupported` for kinds without an archived lifecycle.
    /// - `ItemNotArchived` when `item` is active.
    pub fn restore(&self, item: &OrderedItem) -> OrderingResult<i64> {
        if !item.kind.supports_archive() {
            return Err(OrderingError::ArchiveUnsupported(item.kind));
        }
        if item.active {
            return Err(OrderingError::ItemNotArchived(item.id));
        }

        let position = self.store.next_position(item.scope_id)?;
        self.store.set_position(item.id, position)?;
        self.store.set_active(item.id, true)?;

        debug!(
            "event=ordering_restore module=ordering status=ok kind={} item={} scope={} stale_position={} position={}",
            item.kind.as_str(),
            item.id,
            item.scope_id,
            item.position,
            position
        );
        Ok(position)
    }
}

/// Hard delete for every ordered kind.
pub struct RemoveCoordinator<'s, S: PositionStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: PositionStore + ?Sized> RemoveCoordinator<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Deletes `item`; closes its gap when it was active.
    pub fn remove(&self, item: &OrderedItem) -> OrderingResult<()> {
        self.store.delete_item(item.id)?;
        let closed = if item.active {
            self.store.decrement_after(item.scope_id, item.position)?
        } else {
            0
        };

        debug!(
            "event=ordering_remove module=ordering status=ok kind={} item={} scope={} position={} was_active={} closed={}",
            item.kind.as_str(),
            item.id,
            item.scope_id,
            item.position,
            item.active,
            closed
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ArchiveCoordinator, RemoveCoordinator};
    use crate::model::ordered::OrderedKind;
    use crate::ordering::error::OrderingError;
    use crate::ordering::fake_store::FakeStore;
    use crate::ordering::reorder::ReorderCoordinator;
    use uuid::Uuid;

    #[test]
    fn archive_closes_the_gap() {
        let store = FakeStore::new();
        let scope = Uuid::new_v4();
        let ids = store.seed(OrderedKind::Epic, scope, 4);

        ArchiveCoordinator::new(&store)
            .archive(&store.item(ids[2]))
            .unwrap();

        assert_eq!(store.order(scope), vec![ids[0], ids[1], ids[3]]);
        assert_eq!(store.positions(scope), vec![0, 1, 2]);
        assert!(!store.item(ids[2]).active);
    }

    #[test]
    fn restore_appends_even_when_old_slot_was_taken() {
        let store = FakeStore::new();
        let scope = Uuid::new_v4();
        let ids = store.seed(OrderedKind::UserStory, scope, 3);
        let archive = ArchiveCoordinator::new(&store);

        archive.archive(&store.item(ids[0])).unwrap();
        ReorderCoordinator::new(&store)
            .reorder(&store.item(ids[2]), 0)
            .unwrap();
        let position = archive.restore(&store.item(ids[0])).unwrap();

        assert_eq!(position, 2);
        assert_eq!(store.order(scope), vec![ids[2], ids[1], ids[0]]);
        assert_eq!(store.positions(scope), vec![0, 1, 2]);
    }

    #[test]
    fn lifecycle_guards_reject_invalid_transitions() {
        let store = FakeStore::new();
        let scope = Uuid::new_v4();
        let epic = store.seed(OrderedKind::Epic, scope, 1)[0];
        let column = store.seed(OrderedKind::BoardColumn, Uuid::new_v4(), 1)[0];
        let archive = ArchiveCoordinator::new(&store);

        let err = archive.restore(&store.item(epic)).unwrap_err();
        assert!(matches!(err, OrderingError::ItemNotArchived(id) if id == epic));

        archive.archive(&store.item(epic)).unwrap();
        let err = archive.archive(&store.item(epic)).unwrap_err();
        assert!(matches!(err, OrderingError::ItemArchived(id) if id == epic));

        let err = archive.archive(&store.item(column)).unwrap_err();
        assert!(matches!(
            err,
            OrderingError::ArchiveUnsupported(OrderedKind::BoardColumn)
        ));
    }

    #[test]
    fn remove_closes_gap_only_for_active_items() {
        let store = FakeStore::new();
        let scope = Uuid::new_v4();
        let ids = store.seed(OrderedKind::Epic, scope, 3);

        ArchiveCoordinator::new(&store)
            .archive(&store.item(ids[2]))
            .unwrap();
        let remove = RemoveCoordinator::new(&store);
        remove.remove(&store.item(ids[2])).unwrap();
        remove.remove(&store.item(ids[0])).unwrap();

        assert_eq!(store.order(scope), vec![ids[1]]);
        assert_eq!(store.positions(scope), vec![0]);
    }
}
