//! Scope aggregate repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create projects (with their backlog), sprints and boards: the parents
//!   that partition ordering spaces but are not ordered themselves.
//!
//! # Invariants
//! - Every project owns exactly one backlog, created in the same transaction.
//! - Names are trimmed and must not be blank.

use crate::db::DbError;
use crate::model::ordered::ScopeId;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable project identifier.
pub type ProjectId = Uuid;

/// Result type used by scope repository operations.
pub type ScopeRepoResult<T> = Result<T, ScopeRepoError>;

/// Errors from scope repository operations.
#[derive(Debug)]
pub enum ScopeRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Name is blank after trim.
    InvalidName,
    /// Parent project does not exist.
    ProjectNotFound(ProjectId),
}

impl Display for ScopeRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidName => write!(f, "name must not be blank"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
        }
    }
}

impl Error for ScopeRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidName => None,
            Self::ProjectNotFound(_) => None,
        }
    }
}

impl From<DbError> for ScopeRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ScopeRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Identifiers created together with a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectScopes {
    pub project_id: ProjectId,
    /// Scope for the project's epics.
    pub backlog_id: ScopeId,
}

/// Repository interface for scope aggregates.
pub trait ScopeRepository {
    /// Creates a project and its backlog.
    fn create_project(&self, name: &str) -> ScopeRepoResult<ProjectScopes>;
    /// Creates a sprint under a project; returns the sprint scope id.
    fn create_sprint(&self, project_id: ProjectId, name: &str) -> ScopeRepoResult<ScopeId>;
    /// Creates a kanban board under a project; returns the board scope id.
    fn create_board(&self, project_id: ProjectId, name: &str) -> ScopeRepoResult<ScopeId>;
}

/// SQLite-backed scope repository.
pub struct SqliteScopeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteScopeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn create_project_child(
        &self,
        table: &'static str,
        project_id: ProjectId,
        name: &str,
    ) -> ScopeRepoResult<ScopeId> {
        let name = normalize_name(name)?;
        ensure_project_exists(self.conn, project_id)?;

        let id = Uuid::new_v4();
        self.conn.execute(
            &format!("INSERT INTO {table} (id, project_id, name) VALUES (?1, ?2, ?3);"),
            params![id.to_string(), project_id.to_string(), name],
        )?;
        Ok(id)
    }
}

impl ScopeRepository for SqliteScopeRepository<'_> {
    fn create_project(&self, name: &str) -> ScopeRepoResult<ProjectScopes> {
        let name = normalize_name(name)?;
        let project_id = Uuid::new_v4();
        let backlog_id = Uuid::new_v4();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO projects (id, name) VALUES (?1, ?2);",
            params![project_id.to_string(), name],
        )?;
        tx.execute(
            "INSERT INTO backlogs (id, project_id) VALUES (?1, ?2);",
            params![backlog_id.to_string(), project_id.to_string()],
        )?;
        tx.commit()?;

        Ok(ProjectScopes {
            project_id,
            backlog_id,
        })
    }

    fn create_sprint(&self, project_id: ProjectId, name: &str) -> ScopeRepoResult<ScopeId> {
        self.create_project_child("sprints", project_id, name)
    }

    fn create_board(&self, project_id: ProjectId, name: &str) -> ScopeRepoResult<ScopeId> {
        self.create_project_child("boards", project_id, name)
    }
}

fn ensure_project_exists(conn: &Connection, project_id: ProjectId) -> ScopeRepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1);",
        [project_id.to_string()],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(ScopeRepoError::ProjectNotFound(project_id))
    }
}

fn normalize_name(value: &str) -> ScopeRepoResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ScopeRepoError::InvalidName);
    }
    Ok(trimmed.to_string())
}
