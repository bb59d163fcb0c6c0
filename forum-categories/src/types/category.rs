//! Category record as delivered by the query layer

use super::ids::{CategoryId, UserId};
use serde::{Deserialize, Serialize};

/// Publication state of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishState {
    #[default]
    Unpublished,
    Published,
    Trashed,
}

impl PublishState {
    /// Legacy integer code (1 published, 0 unpublished, -2 trashed)
    pub fn code(self) -> i8 {
        match self {
            Self::Unpublished => 0,
            Self::Published => 1,
            Self::Trashed => -2,
        }
    }

    /// Parse a legacy integer code
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(Self::Unpublished),
            1 => Some(Self::Published),
            -2 => Some(Self::Trashed),
            _ => None,
        }
    }

    pub fn is_published(self) -> bool {
        self == Self::Published
    }
}

/// A forum category.
///
/// Only `id`, `parent_id`, `level` and `ordering` take part in the hierarchy
/// and ordering logic. The remaining fields are passed through to rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Parent category, [`CategoryId::ROOT`] for sections
    #[serde(default)]
    pub parent_id: CategoryId,
    /// Depth in the tree, 0 for sections
    #[serde(default)]
    pub level: u32,
    /// Persisted rank among siblings
    #[serde(default)]
    pub ordering: i64,
    pub name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub published: PublishState,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub review: bool,
    #[serde(default)]
    pub allow_polls: bool,
    #[serde(default)]
    pub allow_anonymous: bool,
    /// Advisory edit lock holder, owned by the checkout subsystem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_out: Option<UserId>,
}

impl Category {
    /// Create a section (top-level category)
    pub fn section(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: CategoryId::ROOT,
            level: 0,
            ordering: 0,
            name: name.into(),
            alias: String::new(),
            published: PublishState::Published,
            locked: false,
            review: false,
            allow_polls: false,
            allow_anonymous: false,
            checked_out: None,
        }
    }

    /// Create a category below `parent` at the given depth
    pub fn child(
        id: impl Into<CategoryId>,
        parent: impl Into<CategoryId>,
        level: u32,
        name: impl Into<String>,
    ) -> Self {
        Self {
            parent_id: parent.into(),
            level,
            ..Self::section(id, name)
        }
    }

    /// Set the persisted ordering
    pub fn with_ordering(mut self, ordering: i64) -> Self {
        self.ordering = ordering;
        self
    }

    /// Set the alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Set the publication state
    pub fn with_published(mut self, published: PublishState) -> Self {
        self.published = published;
        self
    }

    /// Mark as checked out by a user
    pub fn checked_out_by(mut self, user: impl Into<UserId>) -> Self {
        self.checked_out = Some(user.into());
        self
    }

    /// Sections are the top-level categories
    pub fn is_section(&self) -> bool {
        self.parent_id.is_root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_state_codes() {
        for state in [
            PublishState::Unpublished,
            PublishState::Published,
            PublishState::Trashed,
        ] {
            assert_eq!(PublishState::from_code(state.code()), Some(state));
        }
        assert_eq!(PublishState::from_code(5), None);
    }

    #[test]
    fn test_child_builder() {
        let cat = Category::child(4, 2, 2, "Off topic").with_ordering(3);
        assert_eq!(cat.id, CategoryId::new(4));
        assert_eq!(cat.parent_id, CategoryId::new(2));
        assert_eq!(cat.level, 2);
        assert_eq!(cat.ordering, 3);
        assert!(!cat.is_section());
        assert!(Category::section(1, "Main").is_section());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let cat: Category = serde_json::from_str(r#"{"id": 5, "name": "News"}"#).unwrap();
        assert!(cat.parent_id.is_root());
        assert_eq!(cat.level, 0);
        assert_eq!(cat.published, PublishState::Unpublished);
        assert!(cat.checked_out.is_none());
    }
}
