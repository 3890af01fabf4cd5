//! Ordered item model.
//!
//! # Responsibility
//! - Name the five ordered entity kinds and their parent scopes.
//! - Provide the read model returned by ordering operations.
//!
//! # Invariants
//! - `position` is meaningful only while `active` is true; an archived item
//!   keeps a stale value that is recomputed on restore.
//! - Only `Epic` and `UserStory` can be archived.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an ordered entity.
pub type ItemId = Uuid;

/// Identifier of the parent aggregate partitioning an ordering space.
pub type ScopeId = Uuid;

/// Entity kinds that keep a dense position inside a parent scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderedKind {
    /// Epic ordered inside a project backlog.
    Epic,
    /// User story ordered inside an epic.
    UserStory,
    /// Sprint entry ordered inside a sprint.
    SprintItem,
    /// Column ordered on a kanban board.
    BoardColumn,
    /// Card ordered inside a board column.
    BoardCard,
}

impl OrderedKind {
    /// All kinds, in schema dependency order.
    pub const ALL: [OrderedKind; 5] = [
        Self::Epic,
        Self::UserStory,
        Self::SprintItem,
        Self::BoardColumn,
        Self::BoardCard,
    ];

    /// Stable string id used in logs and serialized payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Epic => "epic",
            Self::UserStory => "user_story",
            Self::SprintItem => "sprint_item",
            Self::BoardColumn => "board_column",
            Self::BoardCard => "board_card",
        }
    }

    /// Parent aggregate name, for diagnostics.
    pub fn scope_name(self) -> &'static str {
        match self {
            Self::Epic => "backlog",
            Self::UserStory => "epic",
            Self::SprintItem => "sprint",
            Self::BoardColumn => "board",
            Self::BoardCard => "board_column",
        }
    }

    /// Whether items of this kind have an archived/restored lifecycle.
    pub fn supports_archive(self) -> bool {
        matches!(self, Self::Epic | Self::UserStory)
    }
}

/// Snapshot of one positioned entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    /// Stable entity id.
    pub id: ItemId,
    /// Entity kind, which selects the backing table.
    pub kind: OrderedKind,
    /// Owning parent.
    pub scope_id: ScopeId,
    /// Zero-based position among the scope's active items.
    pub position: i64,
    /// False once archived.
    pub active: bool,
}

/// Input for appending a new ordered entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderedItem {
    /// User-facing label.
    pub title: String,
    /// Linked story. Required for sprint items, optional for cards.
    pub story_id: Option<ItemId>,
}

impl NewOrderedItem {
    /// Creates input without a story link.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            story_id: None,
        }
    }

    /// Creates input linked to a user story.
    pub fn for_story(title: impl Into<String>, story_id: ItemId) -> Self {
        Self {
            title: title.into(),
            story_id: Some(story_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OrderedKind;

    #[test]
    fn only_backlog_entities_support_archive() {
        let archivable: Vec<_> = OrderedKind::ALL
            .into_iter()
            .filter(|kind| kind.supports_archive())
            .collect();
        assert_eq!(archivable, vec![OrderedKind::Epic, OrderedKind::UserStory]);
    }

    #[test]
    fn serde_names_match_log_names() {
        for kind in OrderedKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
