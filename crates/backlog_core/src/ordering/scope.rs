//! Per-kind scope resolution.
//!
//! # Responsibility
//! - Map each ordered kind to its table, scope column and active predicate.
//! - Define the resolver contract used to look items and scopes up.
//!
//! # Invariants
//! - Identifiers in `OrderedTable` are compile-time constants, never user
//!   input, so they may be spliced into SQL text.

use super::error::OrderingResult;
use crate::model::ordered::{ItemId, OrderedItem, OrderedKind, ScopeId};

/// Storage layout of one ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedTable {
    pub kind: OrderedKind,
    /// Table holding the ordered rows.
    pub table: &'static str,
    /// Column referencing the owning scope.
    pub scope_column: &'static str,
    /// Soft-delete column, when the kind supports archiving.
    pub archive_column: Option<&'static str>,
    /// Table holding the scope rows.
    pub scope_table: &'static str,
    /// Soft-delete column on the scope table, when scopes can be archived.
    pub scope_archive_column: Option<&'static str>,
}

const EPICS: OrderedTable = OrderedTable {
    kind: OrderedKind::Epic,
    table: "epics",
    scope_column: "backlog_id",
    archive_column: Some("is_archived"),
    scope_table: "backlogs",
    scope_archive_column: None,
};

const USER_STORIES: OrderedTable = OrderedTable {
    kind: OrderedKind::UserStory,
    table: "user_stories",
    scope_column: "epic_id",
    archive_column: Some("is_archived"),
    scope_table: "epics",
    scope_archive_column: Some("is_archived"),
};

const SPRINT_ITEMS: OrderedTable = OrderedTable {
    kind: OrderedKind::SprintItem,
    table: "sprint_items",
    scope_column: "sprint_id",
    archive_column: None,
    scope_table: "sprints",
    scope_archive_column: None,
};

const BOARD_COLUMNS: OrderedTable = OrderedTable {
    kind: OrderedKind::BoardColumn,
    table: "board_columns",
    scope_column: "board_id",
    archive_column: None,
    scope_table: "boards",
    scope_archive_column: None,
};

const BOARD_CARDS: OrderedTable = OrderedTable {
    kind: OrderedKind::BoardCard,
    table: "board_cards",
    scope_column: "column_id",
    archive_column: None,
    scope_table: "board_columns",
    scope_archive_column: None,
};

impl OrderedTable {
    /// Returns the layout for `kind`.
    pub fn for_kind(kind: OrderedKind) -> &'static OrderedTable {
        match kind {
            OrderedKind::Epic => &EPICS,
            OrderedKind::UserStory => &USER_STORIES,
            OrderedKind::SprintItem => &SPRINT_ITEMS,
            OrderedKind::BoardColumn => &BOARD_COLUMNS,
            OrderedKind::BoardCard => &BOARD_CARDS,
        }
    }

    /// SQL predicate selecting rows that take part in the dense ordering.
    pub fn active_predicate(&self) -> &'static str {
        match self.archive_column {
            Some(_) => "is_archived = 0",
            None => "1 = 1",
        }
    }

    /// SQL predicate selecting scope rows that still accept items.
    pub fn scope_active_predicate(&self) -> &'static str {
        match self.scope_archive_column {
            Some(_) => "is_archived = 0",
            None => "1 = 1",
        }
    }

    /// Columns the store reads and writes.
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut columns = vec!["id", self.scope_column, "position", "updated_at"];
        if let Some(column) = self.archive_column {
            columns.push(column);
        }
        columns
    }
}

/// Resolves items to their owning scope and lists scope contents.
pub trait ScopeResolver {
    /// Kind served by this resolver.
    fn kind(&self) -> OrderedKind;
    /// Loads one item, archived or not.
    fn resolve(&self, id: ItemId) -> OrderingResult<Option<OrderedItem>>;
    /// Lists a scope's items ordered by position.
    fn list_scope(
        &self,
        scope_id: ScopeId,
        include_archived: bool,
    ) -> OrderingResult<Vec<OrderedItem>>;
    /// Returns whether the scope exists and can hold active items.
    fn scope_is_active(&self, scope_id: ScopeId) -> OrderingResult<bool>;
}
