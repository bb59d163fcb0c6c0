//! Sibling-group index built from a flat category list.
//!
//! The index maps each parent id to the ordered ids of its direct children.
//! Group order and child order are the order in which records arrive, which
//! is whatever the query layer sorted by. The index is rebuilt on every
//! request and never persisted: the stored `parent_id` and `ordering` of each
//! record are the source of truth.

use crate::types::{Category, CategoryId};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{trace, warn};

/// `parent id -> ordered child ids`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrderingIndex {
    groups: IndexMap<CategoryId, Vec<CategoryId>>,
    #[serde(skip)]
    members: HashMap<CategoryId, Membership>,
}

/// Where a child id sits in the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Membership {
    parent: CategoryId,
    rank: usize,
}

impl OrderingIndex {
    /// Group `records` by `parent_id`, preserving arrival order.
    ///
    /// A duplicated id keeps its first position; later copies are dropped so
    /// that every id lands in exactly one group. Records claiming the root id
    /// are dropped as well, since the root is only ever a group key.
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Category>,
    {
        let mut index = Self::default();

        for record in records {
            if record.id.is_root() {
                warn!(name = %record.name, "category with the root id in listing, skipping");
                continue;
            }
            if index.members.contains_key(&record.id) {
                warn!(id = %record.id, "duplicate category id in listing, keeping first occurrence");
                continue;
            }

            let group = index.groups.entry(record.parent_id).or_default();
            index.members.insert(
                record.id,
                Membership {
                    parent: record.parent_id,
                    rank: group.len(),
                },
            );
            group.push(record.id);
        }

        trace!(
            groups = index.groups.len(),
            members = index.members.len(),
            "built ordering index"
        );
        index
    }

    /// Children of `parent`, in display order
    pub fn group(&self, parent: CategoryId) -> Option<&[CategoryId]> {
        self.groups.get(&parent).map(Vec::as_slice)
    }

    /// All groups in the order their first member arrived
    pub fn groups(&self) -> impl Iterator<Item = (CategoryId, &[CategoryId])> {
        self.groups.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Number of members in `parent`'s group (0 when absent)
    pub fn group_len(&self, parent: CategoryId) -> usize {
        self.groups.get(&parent).map_or(0, Vec::len)
    }

    /// Key of the group whose child list contains `id`
    pub fn parent_of(&self, id: CategoryId) -> Option<CategoryId> {
        self.members.get(&id).map(|m| m.parent)
    }

    /// 0-based position of `id` within its group
    pub fn rank_of(&self, id: CategoryId) -> Option<usize> {
        self.members.get(&id).map(|m| m.rank)
    }

    /// Whether `id` is a member of any group
    pub fn contains(&self, id: CategoryId) -> bool {
        self.members.contains_key(&id)
    }

    /// Total number of indexed ids
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
