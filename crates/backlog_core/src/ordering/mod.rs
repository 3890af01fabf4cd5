//! Ordinal position engine shared by every ordered collection.
//!
//! # Responsibility
//! - Keep each scope's active items densely and uniquely ordered (`0..N-1`).
//! - Provide append, reorder, transfer, archive/restore and remove on top of
//!   one storage port, parameterized per entity kind by `OrderedTable`.
//!
//! # Invariants
//! - No two active items of a scope share a position.
//! - Active positions of a scope are exactly `{0, .., count - 1}` after every
//!   completed operation.
//! - Coordinators run inside one caller-owned transaction and never commit;
//!   any error leaves the transaction to roll back.

mod append;
mod archive;
mod error;
mod reorder;
mod scope;
mod sqlite_store;
mod store;
mod transfer;

#[cfg(test)]
mod fake_store;

pub use append::AppendCoordinator;
pub use archive::{ArchiveCoordinator, RemoveCoordinator};
pub use error::{OrderingError, OrderingResult};
pub use reorder::{MoveOutcome, ReorderCoordinator};
pub use scope::{OrderedTable, ScopeResolver};
pub use sqlite_store::SqlitePositionStore;
pub use store::PositionStore;
pub use transfer::TransferCoordinator;
