//! Core ordering engine for the backlog tracker.
//! This crate is the single source of truth for position invariants of
//! epics, user stories, sprint items, board columns and board cards.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_with_config, logging_status, LoggingError,
};
pub use model::ordered::{ItemId, NewOrderedItem, OrderedItem, OrderedKind, ScopeId};
pub use ordering::{
    AppendCoordinator, ArchiveCoordinator, MoveOutcome, OrderedTable, OrderingError,
    OrderingResult, PositionStore, RemoveCoordinator, ReorderCoordinator, ScopeResolver,
    SqlitePositionStore, TransferCoordinator,
};
pub use repo::scope_repo::{
    ProjectId, ProjectScopes, ScopeRepoError, ScopeRepoResult, ScopeRepository,
    SqliteScopeRepository,
};
pub use service::ordering_service::OrderingService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
