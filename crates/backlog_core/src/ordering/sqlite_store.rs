//! SQLite implementation of the position store and scope resolver.
//!
//! # Responsibility
//! - Translate port calls into bounded set-based SQL over one ordered table.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - Only active rows take part in max/shift queries.
//! - A shift never collides with SQLite's row-by-row unique index checks:
//!   the affected range is first mirrored below zero, then flipped back
//!   onto its shifted positions. Both statements run in the caller's
//!   transaction.
//! - Listing is deterministic: `position ASC, id ASC`.

use super::error::{OrderingError, OrderingResult};
use super::scope::{OrderedTable, ScopeResolver};
use super::store::PositionStore;
use crate::db::migrations::latest_version;
use crate::model::ordered::{ItemId, NewOrderedItem, OrderedItem, OrderedKind, ScopeId};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// SQLite-backed store bound to one ordered kind.
///
/// Accepts a plain connection or a `Transaction` (via deref); callers own
/// transaction boundaries.
pub struct SqlitePositionStore<'conn> {
    conn: &'conn Connection,
    table: &'static OrderedTable,
}

impl<'conn> SqlitePositionStore<'conn> {
    /// Creates a store for `kind` from a migrated connection.
    pub fn try_new(conn: &'conn Connection, kind: OrderedKind) -> OrderingResult<Self> {
        let table = OrderedTable::for_kind(kind);
        ensure_store_connection_ready(conn, table)?;
        Ok(Self { conn, table })
    }

    /// Inserts a new active row at `position`.
    ///
    /// `position` must come from `AppendCoordinator` in the same transaction.
    pub fn insert_item(
        &self,
        id: ItemId,
        scope_id: ScopeId,
        new_item: &NewOrderedItem,
        position: i64,
    ) -> OrderingResult<()> {
        match self.table.kind {
            OrderedKind::SprintItem | OrderedKind::BoardCard => {
                self.conn.execute(
                    &format!(
                        "INSERT INTO {table} (id, {scope}, story_id, title, position)
                         VALUES (?1, ?2, ?3, ?4, ?5);",
                        table = self.table.table,
                        scope = self.table.scope_column,
                    ),
                    params![
                        id.to_string(),
                        scope_id.to_string(),
                        new_item.story_id.map(|value| value.to_string()),
                        new_item.title.as_str(),
                        position,
                    ],
                )?;
            }
            OrderedKind::Epic | OrderedKind::UserStory | OrderedKind::BoardColumn => {
                self.conn.execute(
                    &format!(
                        "INSERT INTO {table} (id, {scope}, title, position)
                         VALUES (?1, ?2, ?3, ?4);",
                        table = self.table.table,
                        scope = self.table.scope_column,
                    ),
                    params![
                        id.to_string(),
                        scope_id.to_string(),
                        new_item.title.as_str(),
                        position,
                    ],
                )?;
            }
        }
        Ok(())
    }

    fn archived_expr(&self) -> &'static str {
        match self.table.archive_column {
            Some(_) => "is_archived",
            None => "0",
        }
    }
}

impl PositionStore for SqlitePositionStore<'_> {
    fn max_position(&self, scope_id: ScopeId) -> OrderingResult<i64> {
        let max = self.conn.query_row(
            &format!(
                "SELECT COALESCE(MAX(position), -1)
                 FROM {table}
                 WHERE {scope} = ?1
                   AND {active};",
                table = self.table.table,
                scope = self.table.scope_column,
                active = self.table.active_predicate(),
            ),
            [scope_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    fn set_position(&self, id: ItemId, position: i64) -> OrderingResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE {table}
                 SET position = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                table = self.table.table,
            ),
            params![id.to_string(), position],
        )?;
        if changed == 0 {
            return Err(OrderingError::ItemNotFound {
                kind: self.table.kind,
                id,
            });
        }
        Ok(())
    }

    fn shift_range(
        &self,
        scope_id: ScopeId,
        lo: i64,
        hi: i64,
        delta: i64,
    ) -> OrderingResult<usize> {
        if lo > hi || delta == 0 {
            return Ok(0);
        }

        let shifted = self.conn.execute(
            &format!(
                "UPDATE {table}
                 SET position = -(position + ?4) - 1,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE {scope} = ?1
                   AND position BETWEEN ?2 AND ?3
                   AND {active};",
                table = self.table.table,
                scope = self.table.scope_column,
                active = self.table.active_predicate(),
            ),
            params![scope_id.to_string(), lo, hi, delta],
        )?;
        if shifted == 0 {
            return Ok(0);
        }

        self.conn.execute(
            &format!(
                "UPDATE {table}
                 SET position = -position - 1,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE {scope} = ?1
                   AND position < 0
                   AND {active};",
                table = self.table.table,
                scope = self.table.scope_column,
                active = self.table.active_predicate(),
            ),
            [scope_id.to_string()],
        )?;
        Ok(shifted)
    }

    fn set_scope_and_position(
        &self,
        id: ItemId,
        scope_id: ScopeId,
        position: i64,
    ) -> OrderingResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE {table}
                 SET {scope} = ?2,
                     position = ?3,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                table = self.table.table,
                scope = self.table.scope_column,
            ),
            params![id.to_string(), scope_id.to_string(), position],
        )?;
        if changed == 0 {
            return Err(OrderingError::ItemNotFound {
                kind: self.table.kind,
                id,
            });
        }
        Ok(())
    }

    fn set_active(&self, id: ItemId, active: bool) -> OrderingResult<()> {
        let Some(column) = self.table.archive_column else {
            return Err(OrderingError::ArchiveUnsupported(self.table.kind));
        };
        let changed = self.conn.execute(
            &format!(
                "UPDATE {table}
                 SET {column} = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                table = self.table.table,
            ),
            params![id.to_string(), if active { 0 } else { 1 }],
        )?;
        if changed == 0 {
            return Err(OrderingError::ItemNotFound {
                kind: self.table.kind,
                id,
            });
        }
        Ok(())
    }

    fn delete_item(&self, id: ItemId) -> OrderingResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {table} WHERE id = ?1;", table = self.table.table),
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(OrderingError::ItemNotFound {
                kind: self.table.kind,
                id,
            });
        }
        Ok(())
    }
}

impl ScopeResolver for SqlitePositionStore<'_> {
    fn kind(&self) -> OrderedKind {
        self.table.kind
    }

    fn resolve(&self, id: ItemId) -> OrderingResult<Option<OrderedItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT
                id,
                {scope} AS scope_id,
                position,
                {archived} AS is_archived
             FROM {table}
             WHERE id = ?1;",
            table = self.table.table,
            scope = self.table.scope_column,
            archived = self.archived_expr(),
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_ordered_row(row, self.table)?));
        }
        Ok(None)
    }

    fn list_scope(
        &self,
        scope_id: ScopeId,
        include_archived: bool,
    ) -> OrderingResult<Vec<OrderedItem>> {
        let visibility = if include_archived {
            "1 = 1"
        } else {
            self.table.active_predicate()
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT
                id,
                {scope} AS scope_id,
                position,
                {archived} AS is_archived
             FROM {table}
             WHERE {scope} = ?1
               AND {visibility}
             ORDER BY {archived_first}position ASC, id ASC;",
            table = self.table.table,
            scope = self.table.scope_column,
            archived = self.archived_expr(),
            archived_first = if self.table.archive_column.is_some() {
                "is_archived ASC, "
            } else {
                ""
            },
        ))?;

        let mut rows = stmt.query([scope_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_ordered_row(row, self.table)?);
        }
        Ok(items)
    }

    fn scope_is_active(&self, scope_id: ScopeId) -> OrderingResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!(
                "SELECT EXISTS(
                    SELECT 1
                    FROM {scope_table}
                    WHERE id = ?1
                      AND {active}
                );",
                scope_table = self.table.scope_table,
                active = self.table.scope_active_predicate(),
            ),
            [scope_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn parse_ordered_row(row: &Row<'_>, table: &OrderedTable) -> OrderingResult<OrderedItem> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, table.table, "id")?;
    let scope_text: String = row.get("scope_id")?;
    let scope_id = parse_uuid(&scope_text, table.table, table.scope_column)?;

    let position: i64 = row.get("position")?;
    if position < 0 {
        return Err(OrderingError::InvalidData(format!(
            "negative position `{position}` in {}.position",
            table.table
        )));
    }

    let active = match row.get::<_, i64>("is_archived")? {
        0 => true,
        1 => false,
        other => {
            return Err(OrderingError::InvalidData(format!(
                "invalid is_archived value `{other}` in {}.is_archived",
                table.table
            )));
        }
    };

    Ok(OrderedItem {
        id,
        kind: table.kind,
        scope_id,
        position,
        active,
    })
}

fn parse_uuid(value: &str, table: &str, column: &str) -> OrderingResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| {
        OrderingError::InvalidData(format!("invalid uuid `{value}` in {table}.{column}"))
    })
}

fn ensure_store_connection_ready(conn: &Connection, table: &OrderedTable) -> OrderingResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(OrderingError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for required in [table.table, table.scope_table] {
        if !table_exists(conn, required)? {
            return Err(OrderingError::MissingRequiredTable(required));
        }
    }

    for column in table.required_columns() {
        if !table_has_column(conn, table.table, column)? {
            return Err(OrderingError::MissingRequiredColumn {
                table: table.table,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> OrderingResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> OrderingResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
