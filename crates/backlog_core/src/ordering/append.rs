//! Append coordinator.
//!
//! # Invariants
//! - Appending never shifts existing items.
//! - The returned position is read inside the caller's transaction, so the
//!   insert that consumes it cannot race another append on the same scope.

use super::error::OrderingResult;
use super::store::PositionStore;
use crate::model::ordered::ScopeId;
use log::debug;

/// Assigns positions to newly created items.
pub struct AppendCoordinator<'s, S: PositionStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: PositionStore + ?Sized> AppendCoordinator<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Returns the position for an item about to be inserted into `scope_id`.
    pub fn append(&self, scope_id: ScopeId) -> OrderingResult<i64> {
        let position = self.store.next_position(scope_id)?;
        debug!(
            "event=ordering_append module=ordering status=ok scope={} position={}",
            scope_id, position
        );
        Ok(position)
    }
}
