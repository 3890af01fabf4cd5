//! Error taxonomy shared by the ordering store, coordinators and service.

use crate::db::DbError;
use crate::model::ordered::{ItemId, OrderedKind, ScopeId};
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by ordering operations.
pub type OrderingResult<T> = Result<T, OrderingError>;

/// Errors from ordering operations.
///
/// Every variant aborts the enclosing transaction. None are retried here.
#[derive(Debug)]
pub enum OrderingError {
    /// Requested target position is negative.
    InvalidPosition(i64),
    /// Item does not exist in the table of `kind`.
    ItemNotFound { kind: OrderedKind, id: ItemId },
    /// Target scope does not exist or is no longer active.
    ScopeNotFound { kind: OrderedKind, scope_id: ScopeId },
    /// Item's stored scope differs from the caller's claim.
    CrossScopeInconsistency {
        id: ItemId,
        expected: ScopeId,
        actual: ScopeId,
    },
    /// Storage uniqueness or foreign-key constraint fired.
    ConstraintViolation(String),
    /// Kind has no archived lifecycle.
    ArchiveUnsupported(OrderedKind),
    /// Operation requires an active item but the item is archived.
    ItemArchived(ItemId),
    /// Restore was requested for an item that is not archived.
    ItemNotArchived(ItemId),
    /// Sprint items must reference a user story.
    MissingStoryRef(OrderedKind),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
}

impl Display for OrderingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPosition(position) => {
                write!(f, "position must not be negative, got {position}")
            }
            Self::ItemNotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
            Self::ScopeNotFound { kind, scope_id } => write!(
                f,
                "{} scope not found for {}: {scope_id}",
                kind.scope_name(),
                kind.as_str()
            ),
            Self::CrossScopeInconsistency {
                id,
                expected,
                actual,
            } => write!(
                f,
                "item {id} belongs to scope {actual}, caller expected {expected}"
            ),
            Self::ConstraintViolation(message) => {
                write!(f, "ordering constraint violated: {message}")
            }
            Self::ArchiveUnsupported(kind) => {
                write!(f, "{} items cannot be archived", kind.as_str())
            }
            Self::ItemArchived(id) => write!(f, "item is archived: {id}"),
            Self::ItemNotArchived(id) => write!(f, "item is not archived: {id}"),
            Self::MissingStoryRef(kind) => {
                write!(f, "{} requires a user story reference", kind.as_str())
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "ordering store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "ordering store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "ordering store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid ordering data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OrderingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl OrderingError {
    /// Stable short code for structured log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPosition(_) => "invalid_position",
            Self::ItemNotFound { .. } => "item_not_found",
            Self::ScopeNotFound { .. } => "scope_not_found",
            Self::CrossScopeInconsistency { .. } => "cross_scope_inconsistency",
            Self::ConstraintViolation(_) => "constraint_violation",
            Self::ArchiveUnsupported(_) => "archive_unsupported",
            Self::ItemArchived(_) => "item_archived",
            Self::ItemNotArchived(_) => "item_not_archived",
            Self::MissingStoryRef(_) => "missing_story_ref",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::MissingRequiredColumn { .. } => "missing_column",
            Self::InvalidData(_) => "invalid_data",
            Self::Db(_) => "db_error",
        }
    }
}

impl From<DbError> for OrderingError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => err.into(),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for OrderingError {
    fn from(value: rusqlite::Error) -> Self {
        if value.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
            return Self::ConstraintViolation(value.to_string());
        }
        Self::Db(DbError::Sqlite(value))
    }
}
