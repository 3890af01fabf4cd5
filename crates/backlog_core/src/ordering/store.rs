//! Position storage port.
//!
//! # Responsibility
//! - Expose scoped position queries and set-based position updates.
//!
//! # Invariants
//! - Every method sees and affects active rows only, except `set_position`,
//!   `set_active` and `delete_item`, which address one row by id.
//! - Implementations never cache: each query reads the current transaction.
//! - Callers wrap multi-step sequences in one transaction.

use super::error::OrderingResult;
use crate::model::ordered::{ItemId, ScopeId};

/// Scoped position queries and bulk updates for one ordered kind.
pub trait PositionStore {
    /// Highest active position in `scope_id`, or `-1` when empty.
    fn max_position(&self, scope_id: ScopeId) -> OrderingResult<i64>;

    /// Position the next appended item receives: `0` when empty.
    fn next_position(&self, scope_id: ScopeId) -> OrderingResult<i64> {
        Ok(self.max_position(scope_id)? + 1)
    }

    /// Writes one item's position.
    fn set_position(&self, id: ItemId, position: i64) -> OrderingResult<()>;

    /// Adds `delta` to every active position in `lo..=hi` of `scope_id`.
    ///
    /// Returns the number of shifted rows. Implementations must leave no
    /// intermediate duplicate visible once the call returns.
    fn shift_range(
        &self,
        scope_id: ScopeId,
        lo: i64,
        hi: i64,
        delta: i64,
    ) -> OrderingResult<usize>;

    /// Active positions `>= position` get `+1`.
    fn increment_from(&self, scope_id: ScopeId, position: i64) -> OrderingResult<usize> {
        self.shift_range(scope_id, position, i64::MAX, 1)
    }

    /// Active positions `> position` get `-1`.
    fn decrement_after(&self, scope_id: ScopeId, position: i64) -> OrderingResult<usize> {
        self.shift_range(scope_id, position.saturating_add(1), i64::MAX, -1)
    }

    /// Moves one item to another scope and position in a single write.
    fn set_scope_and_position(
        &self,
        id: ItemId,
        scope_id: ScopeId,
        position: i64,
    ) -> OrderingResult<()>;

    /// Flips the archived flag of one item.
    fn set_active(&self, id: ItemId, active: bool) -> OrderingResult<()>;

    /// Hard-deletes one item.
    fn delete_item(&self, id: ItemId) -> OrderingResult<()>;
}
