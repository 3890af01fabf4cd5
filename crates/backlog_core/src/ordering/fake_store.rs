//! In-memory position store for coordinator unit tests.
//!
//! Checks the active `(scope, position)` uniqueness after every write, the
//! way an immediate (non-deferred) unique index would.

use super::error::{OrderingError, OrderingResult};
use super::store::PositionStore;
use crate::model::ordered::{ItemId, OrderedItem, OrderedKind, ScopeId};
use std::cell::RefCell;
use std::collections::HashSet;
use uuid::Uuid;

pub(crate) struct FakeStore {
    rows: RefCell<Vec<OrderedItem>>,
    writes: RefCell<usize>,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self {
            rows: RefCell::new(Vec::new()),
            writes: RefCell::new(0),
        }
    }

    /// Appends `count` active items of `kind` to `scope_id`.
    pub(crate) fn seed(&self, kind: OrderedKind, scope_id: ScopeId, count: usize) -> Vec<ItemId> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let id = Uuid::new_v4();
            let position = self.next_position(scope_id).unwrap();
            self.rows.borrow_mut().push(OrderedItem {
                id,
                kind,
                scope_id,
                position,
                active: true,
            });
            ids.push(id);
        }
        ids
    }

    pub(crate) fn item(&self, id: ItemId) -> OrderedItem {
        self.rows
            .borrow()
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .unwrap()
    }

    /// Active ids of `scope_id` in position order.
    pub(crate) fn order(&self, scope_id: ScopeId) -> Vec<ItemId> {
        let mut active: Vec<_> = self
            .rows
            .borrow()
            .iter()
            .filter(|row| row.scope_id == scope_id && row.active)
            .map(|row| (row.position, row.id))
            .collect();
        active.sort();
        active.into_iter().map(|(_, id)| id).collect()
    }

    /// Active positions of `scope_id`, sorted.
    pub(crate) fn positions(&self, scope_id: ScopeId) -> Vec<i64> {
        let mut positions: Vec<_> = self
            .rows
            .borrow()
            .iter()
            .filter(|row| row.scope_id == scope_id && row.active)
            .map(|row| row.position)
            .collect();
        positions.sort_unstable();
        positions
    }

    pub(crate) fn writes(&self) -> usize {
        *self.writes.borrow()
    }

    fn write<F>(&self, id: ItemId, apply: F) -> OrderingResult<()>
    where
        F: FnOnce(&mut OrderedItem),
    {
        {
            let mut rows = self.rows.borrow_mut();
            let row = rows
                .iter_mut()
                .find(|row| row.id == id)
                .ok_or(OrderingError::ItemNotFound {
                    kind: OrderedKind::Epic,
                    id,
                })?;
            apply(row);
        }
        *self.writes.borrow_mut() += 1;
        self.check_unique()
    }

    fn check_unique(&self) -> OrderingResult<()> {
        let mut seen = HashSet::new();
        for row in self.rows.borrow().iter().filter(|row| row.active) {
            if !seen.insert((row.scope_id, row.position)) {
                return Err(OrderingError::ConstraintViolation(format!(
                    "duplicate position {} in scope {}",
                    row.position, row.scope_id
                )));
            }
        }
        Ok(())
    }
}

impl PositionStore for FakeStore {
    fn max_position(&self, scope_id: ScopeId) -> OrderingResult<i64> {
        Ok(self
            .rows
            .borrow()
            .iter()
            .filter(|row| row.scope_id == scope_id && row.active)
            .map(|row| row.position)
            .max()
            .unwrap_or(-1))
    }

    fn set_position(&self, id: ItemId, position: i64) -> OrderingResult<()> {
        self.write(id, |row| row.position = position)
    }

    fn shift_range(
        &self,
        scope_id: ScopeId,
        lo: i64,
        hi: i64,
        delta: i64,
    ) -> OrderingResult<usize> {
        let mut shifted = 0;
        for row in self.rows.borrow_mut().iter_mut() {
            if row.scope_id == scope_id && row.active && (lo..=hi).contains(&row.position) {
                row.position += delta;
                shifted += 1;
            }
        }
        *self.writes.borrow_mut() += shifted;
        self.check_unique()?;
        Ok(shifted)
    }

    fn set_scope_and_position(
        &self,
        id: ItemId,
        scope_id: ScopeId,
        position: i64,
    ) -> OrderingResult<()> {
        self.write(id, |row| {
            row.scope_id = scope_id;
            row.position = position;
        })
    }

    fn set_active(&self, id: ItemId, active: bool) -> OrderingResult<()> {
        self.write(id, |row| row.active = active)
    }

    fn delete_item(&self, id: ItemId) -> OrderingResult<()> {
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(OrderingError::ItemNotFound {
                kind: OrderedKind::Epic,
                id,
            });
        }
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}
