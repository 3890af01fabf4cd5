//! Ordering use-case service.
//!
//! # Responsibility
//! - Run each ordering operation in its own IMMEDIATE transaction.
//! - Check caller preconditions (item exists, claimed scope matches, target
//!   scope is active) before handing off to one coordinator.
//! - Return fresh item snapshots read inside the committed transaction.
//!
//! # Invariants
//! - An operation either commits in full or rolls back in full; an error,
//!   a panic or an early drop never leaves a partially shifted scope.
//! - The IMMEDIATE write lock serializes every writer, so a transfer is
//!   serialized against concurrent work on both of its scopes.
//! - No position is cached between calls.

use crate::model::ordered::{ItemId, NewOrderedItem, OrderedItem, OrderedKind, ScopeId};
use crate::ordering::{
    AppendCoordinator, ArchiveCoordinator, OrderingError, OrderingResult, RemoveCoordinator,
    ReorderCoordinator, ScopeResolver, SqlitePositionStore, TransferCoordinator,
};
use log::{info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;
use uuid::Uuid;

/// Transactional facade over the ordering coordinators.
pub struct OrderingService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> OrderingService<'conn> {
    /// Creates service over a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Creates a new item at the end of `scope_id`.
    ///
    /// # Errors
    /// - `ScopeNotFound` when the scope is missing or archived.
    /// - `MissingStoryRef` for a sprint item without `story_id`.
    pub fn append(
        &self,
        kind: OrderedKind,
        scope_id: ScopeId,
        new_item: &NewOrderedItem,
    ) -> OrderingResult<OrderedItem> {
        if kind == OrderedKind::SprintItem && new_item.story_id.is_none() {
            return Err(OrderingError::MissingStoryRef(kind));
        }

        self.in_transaction("ordering_append", kind, |store| {
            ensure_scope_active(store, scope_id)?;
            let id = Uuid::new_v4();
            let position = AppendCoordinator::new(store).append(scope_id)?;
            store.insert_item(id, scope_id, new_item, position)?;
            load_item(store, id)
        })
    }

    /// Moves an item to `requested` inside its current scope.
    pub fn reorder(
        &self,
        kind: OrderedKind,
        id: ItemId,
        claimed_scope: ScopeId,
        requested: i64,
    ) -> OrderingResult<OrderedItem> {
        self.in_transaction("ordering_reorder", kind, |store| {
            let item = load_in_scope(store, id, claimed_scope)?;
            ReorderCoordinator::new(store).reorder(&item, requested)?;
            load_item(store, id)
        })
    }

    /// Moves an item from `from_scope` into `to_scope` at `requested`.
    ///
    /// Equal scopes behave like [`OrderingService::reorder`].
    pub fn transfer(
        &self,
        kind: OrderedKind,
        id: ItemId,
        from_scope: ScopeId,
        to_scope: ScopeId,
        requested: i64,
    ) -> OrderingResult<OrderedItem> {
        self.in_transaction("ordering_transfer", kind, |store| {
            let item = load_in_scope(store, id, from_scope)?;
            if to_scope != from_scope {
                ensure_scope_active(store, to_scope)?;
            }
            TransferCoordinator::new(store).transfer(&item, to_scope, requested)?;
            load_item(store, id)
        })
    }

    /// Archives an item and closes its gap.
    pub fn archive(
        &self,
        kind: OrderedKind,
        id: ItemId,
        claimed_scope: ScopeId,
    ) -> OrderingResult<OrderedItem> {
        self.in_transaction("ordering_archive", kind, |store| {
            let item = load_in_scope(store, id, claimed_scope)?;
            ArchiveCoordinator::new(store).archive(&item)?;
            load_item(store, id)
        })
    }

    /// Restores an archived item at the end of its scope.
    ///
    /// # Errors
    /// - `ScopeNotFound` when the scope was archived meanwhile.
    pub fn restore(
        &self,
        kind: OrderedKind,
        id: ItemId,
        claimed_scope: ScopeId,
    ) -> OrderingResult<OrderedItem> {
        self.in_transaction("ordering_restore", kind, |store| {
            let item = load_in_scope(store, id, claimed_scope)?;
            ensure_scope_active(store, item.scope_id)?;
            ArchiveCoordinator::new(store).restore(&item)?;
            load_item(store, id)
        })
    }

    /// Hard-deletes an item and closes its gap.
    pub fn remove(
        &self,
        kind: OrderedKind,
        id: ItemId,
        claimed_scope: ScopeId,
    ) -> OrderingResult<()> {
        self.in_transaction("ordering_remove", kind, |store| {
            let item = load_in_scope(store, id, claimed_scope)?;
            RemoveCoordinator::new(store).remove(&item)
        })
    }

    /// Loads one item, archived or not.
    pub fn get(&self, kind: OrderedKind, id: ItemId) -> OrderingResult<Option<OrderedItem>> {
        SqlitePositionStore::try_new(self.conn, kind)?.resolve(id)
    }

    /// Lists a scope's items by position; archived items follow active ones.
    pub fn list(
        &self,
        kind: OrderedKind,
        scope_id: ScopeId,
        include_archived: bool,
    ) -> OrderingResult<Vec<OrderedItem>> {
        SqlitePositionStore::try_new(self.conn, kind)?.list_scope(scope_id, include_archived)
    }

    fn in_transaction<T, F>(
        &self,
        event: &'static str,
        kind: OrderedKind,
        body: F,
    ) -> OrderingResult<T>
    where
        F: FnOnce(&SqlitePositionStore<'_>) -> OrderingResult<T>,
    {
        let started_at = Instant::now();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let result = SqlitePositionStore::try_new(&tx, kind).and_then(|store| body(&store));

        match result.and_then(|value| tx.commit().map(|()| value).map_err(Into::into)) {
            Ok(value) => {
                info!(
                    "event={} module=ordering status=ok kind={} duration_ms={}",
                    event,
                    kind.as_str(),
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                warn!(
                    "event={} module=ordering status=error kind={} duration_ms={} error_code={} error={}",
                    event,
                    kind.as_str(),
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn load_item(store: &SqlitePositionStore<'_>, id: ItemId) -> OrderingResult<OrderedItem> {
    store.resolve(id)?.ok_or(OrderingError::ItemNotFound {
        kind: store.kind(),
        id,
    })
}

fn load_in_scope(
    store: &SqlitePositionStore<'_>,
    id: ItemId,
    claimed_scope: ScopeId,
) -> OrderingResult<OrderedItem> {
    let item = load_item(store, id)?;
    if item.scope_id != claimed_scope {
        return Err(OrderingError::CrossScopeInconsistency {
            id,
            expected: claimed_scope,
            actual: item.scope_id,
        });
    }
    Ok(item)
}

fn ensure_scope_active(store: &SqlitePositionStore<'_>, scope_id: ScopeId) -> OrderingResult<()> {
    if store.scope_is_active(scope_id)? {
        return Ok(());
    }
    Err(OrderingError::ScopeNotFound {
        kind: store.kind(),
        scope_id,
    })
}
