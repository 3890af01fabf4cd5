//! Domain model for ordered backlog collections.
//!
//! # Responsibility
//! - Define the shape shared by every positioned entity (epic, story,
//!   sprint item, board column, board card).
//! - Describe which lifecycle each entity kind supports.
//!
//! # Invariants
//! - Every ordered entity is identified by a stable `ItemId`.
//! - Among active items of one scope, positions are dense and unique.

pub mod ordered;
