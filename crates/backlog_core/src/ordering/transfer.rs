//! Cross-scope transfer coordinator.
//!
//! # Responsibility
//! - Move one active item from its scope into another scope of the same kind.
//!
//! # Invariants
//! - The source gap is closed and the destination slot opened in the same
//!   transaction; the item changes parent and position in one write.
//! - Destination targets clamp to `destination max + 1` (append allowed).
//! - Same-scope requests are plain reorders.

use super::error::{OrderingError, OrderingResult};
use super::reorder::{MoveOutcome, ReorderCoordinator};
use super::store::PositionStore;
use crate::model::ordered::{OrderedItem, ScopeId};
use log::debug;

/// Moves items between scopes.
pub struct TransferCoordinator<'s, S: PositionStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: PositionStore + ?Sized> TransferCoordinator<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Moves `item` from its current scope into `to_scope` at `requested`.
    ///
    /// # Errors
    /// - `InvalidPosition` when `requested < 0`.
    /// - `ItemArchived` when `item` is not active.
    pub fn transfer(
        &self,
        item: &OrderedItem,
        to_scope: ScopeId,
        requested: i64,
    ) -> OrderingResult<MoveOutcome> {
        if to_scope == item.scope_id {
            return ReorderCoordinator::new(self.store).reorder(item, requested);
        }
        if requested < 0 {
            return Err(OrderingError::InvalidPosition(requested));
        }
        if !item.active {
            return Err(OrderingError::ItemArchived(item.id));
        }

        let from_scope = item.scope_id;
        let from = item.position;
        let dest_max = self.store.max_position(to_scope)?;
        let to = requested.min(dest_max + 1);

        let temp = self.store.max_position(from_scope)? + 1;
        self.store.set_position(item.id, temp)?;
        // The displaced item stays at `temp`; only its former followers close up.
        let closed = self.store.shift_range(from_scope, from + 1, temp - 1, -1)?;
        let opened = self.store.increment_from(to_scope, to)?;
        self.store.set_scope_and_position(item.id, to_scope, to)?;

        debug!(
            "event=ordering_transfer module=ordering status=ok kind={} item={} from_scope={} from={} to_scope={} to={} closed={} opened={}",
            item.kind.as_str(),
            item.id,
            from_scope,
            from,
            to_scope,
            to,
            closed,
            opened
        );
        Ok(MoveOutcome::Moved { position: to })
    }
}
