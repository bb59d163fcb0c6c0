//! Storage seam for category records and their group versions.
//!
//! The store owns the only shared mutable state: each record's `parent_id`
//! and `ordering`, plus a version counter per sibling group. Everything else
//! the engine builds is request-scoped.

use crate::error::{CategoryError, RankViolation, Result};
use crate::types::{Category, CategoryId, LogEntry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// `group (parent id) -> version`. Absent groups are at version 0.
pub type GroupVersions = BTreeMap<CategoryId, u64>;

/// Everything loaded from the store for one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub categories: Vec<Category>,
    #[serde(default)]
    pub versions: GroupVersions,
}

impl Snapshot {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories,
            versions: GroupVersions::new(),
        }
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Current version of a group
    pub fn version(&self, group: CategoryId) -> u64 {
        self.versions.get(&group).copied().unwrap_or_default()
    }

    /// Members of `parent`'s group in stored order (ordering, then id)
    pub fn siblings(&self, parent: CategoryId) -> Vec<&Category> {
        let mut members: Vec<_> = self
            .categories
            .iter()
            .filter(|c| c.parent_id == parent)
            .collect();
        members.sort_by_key(|c| (c.ordering, c.id));
        members
    }

    /// Depth-first listing with siblings in stored order, the default view
    /// of the admin table. Records unreachable from the root follow at the
    /// end, grouped by parent.
    pub fn in_tree_order(&self) -> Vec<&Category> {
        let mut children: HashMap<CategoryId, Vec<&Category>> = HashMap::new();
        for category in &self.categories {
            children.entry(category.parent_id).or_default().push(category);
        }
        for members in children.values_mut() {
            members.sort_by_key(|c| (c.ordering, c.id));
        }

        let mut out = Vec::with_capacity(self.categories.len());
        let mut visited = HashSet::with_capacity(self.categories.len());
        let mut stack: Vec<&Category> = children
            .get(&CategoryId::ROOT)
            .map(|roots| roots.iter().rev().copied().collect())
            .unwrap_or_default();

        while let Some(category) = stack.pop() {
            if !visited.insert(category.id) {
                continue;
            }
            out.push(category);
            if let Some(kids) = children.get(&category.id) {
                stack.extend(kids.iter().rev().copied());
            }
        }

        let mut rest: Vec<_> = self
            .categories
            .iter()
            .filter(|c| !visited.contains(&c.id))
            .collect();
        rest.sort_by_key(|c| (c.parent_id, c.ordering, c.id));
        out.extend(rest);
        out
    }

    /// Apply a validated plan in memory.
    ///
    /// Re-checks versions and group membership against this snapshot so a
    /// store can call it while holding its write lock. On error nothing is
    /// modified.
    pub fn apply(&mut self, plan: &RankPlan) -> Result<CommitReceipt> {
        for (group, expected) in &plan.expected_versions {
            let actual = self.version(*group);
            if actual != *expected {
                return Err(CategoryError::VersionConflict {
                    group: *group,
                    expected: *expected,
                    actual,
                });
            }
        }

        let mut planned: BTreeMap<CategoryId, BTreeSet<CategoryId>> = BTreeMap::new();
        for change in &plan.changes {
            planned.entry(change.group).or_default().insert(change.id);
        }
        for (group, ids) in &planned {
            let stored: BTreeSet<_> = self
                .categories
                .iter()
                .filter(|c| c.parent_id == *group)
                .map(|c| c.id)
                .collect();
            if let Some(missing) = stored.difference(ids).next() {
                return Err(CategoryError::invalid_ranks(
                    *group,
                    RankViolation::MissingMember { id: *missing },
                ));
            }
            if let Some(gone) = ids.difference(&stored).next() {
                return Err(CategoryError::CategoryNotFound { id: *gone });
            }
        }

        let ordering: HashMap<_, _> = plan.changes.iter().map(|c| (c.id, c.ordering)).collect();
        let mut updated = 0;
        for category in &mut self.categories {
            if let Some(value) = ordering.get(&category.id) {
                category.ordering = *value;
                updated += 1;
            }
        }

        let mut versions = GroupVersions::new();
        for group in planned.keys() {
            let next = self.version(*group) + 1;
            self.versions.insert(*group, next);
            versions.insert(*group, next);
        }

        Ok(CommitReceipt { updated, versions })
    }
}

/// New ordering for one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankChange {
    pub id: CategoryId,
    pub group: CategoryId,
    pub ordering: i64,
}

/// A validated set of rank changes covering whole sibling groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankPlan {
    pub changes: Vec<RankChange>,
    /// Versions the client saw; checked at commit time
    #[serde(default)]
    pub expected_versions: GroupVersions,
}

impl RankPlan {
    /// Groups touched by this plan
    pub fn groups(&self) -> Vec<CategoryId> {
        let groups: BTreeSet<_> = self.changes.iter().map(|c| c.group).collect();
        groups.into_iter().collect()
    }
}

/// Outcome of a committed plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    /// Rows written
    pub updated: usize,
    /// New versions of the touched groups
    pub versions: GroupVersions,
}

/// Where categories live between requests
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Load every category with the current group versions
    async fn load(&self) -> Result<Snapshot>;

    /// Apply `plan` atomically: every change is written or none is
    async fn commit_ranks(&self, plan: &RankPlan) -> Result<CommitReceipt>;

    /// Record a committed change in the activity log
    async fn append_activity(&self, entry: &LogEntry) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> CategoryId {
        CategoryId::new(n)
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(vec![
            Category::section(1, "Main").with_ordering(0),
            Category::child(3, 1, 1, "Suggestions").with_ordering(1),
            Category::child(2, 1, 1, "Welcome").with_ordering(0),
            Category::child(4, 2, 2, "Introductions").with_ordering(0),
            Category::section(5, "Staff").with_ordering(1),
            Category::child(6, 77, 3, "Orphan"),
        ])
    }

    fn change(n: u64, group: u64, ordering: i64) -> RankChange {
        RankChange {
            id: id(n),
            group: id(group),
            ordering,
        }
    }

    #[test]
    fn test_siblings_sorted_by_ordering() {
        let snap = snapshot();
        let ids: Vec<_> = snap.siblings(id(1)).iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_in_tree_order() {
        let snap = snapshot();
        let ids: Vec<_> = snap.in_tree_order().iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 4, 3, 5, 6]);
    }

    #[test]
    fn test_apply_writes_and_bumps_versions() {
        let mut snap = snapshot();
        let plan = RankPlan {
            changes: vec![change(3, 1, 0), change(2, 1, 1)],
            expected_versions: GroupVersions::new(),
        };

        let receipt = snap.apply(&plan).unwrap();
        assert_eq!(receipt.updated, 2);
        assert_eq!(receipt.versions.get(&id(1)), Some(&1));
        assert_eq!(snap.version(id(1)), 1);
        assert_eq!(snap.version(id(0)), 0);

        let ids: Vec<_> = snap.siblings(id(1)).iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_apply_rejects_stale_version() {
        let mut snap = snapshot();
        snap.versions.insert(id(1), 4);
        let before = snap.clone();

        let mut expected = GroupVersions::new();
        expected.insert(id(1), 3);
        let plan = RankPlan {
            changes: vec![change(3, 1, 0), change(2, 1, 1)],
            expected_versions: expected,
        };

        let err = snap.apply(&plan).unwrap_err();
        assert!(matches!(
            err,
            CategoryError::VersionConflict {
                expected: 3,
                actual: 4,
                ..
            }
        ));
        assert_eq!(snap, before);
    }

    #[test]
    fn test_apply_rejects_partial_group() {
        let mut snap = snapshot();
        let before = snap.clone();
        let plan = RankPlan {
            changes: vec![change(3, 1, 0)],
            expected_versions: GroupVersions::new(),
        };

        let err = snap.apply(&plan).unwrap_err();
        assert!(matches!(
            err,
            CategoryError::InvalidRanks {
                violation: RankViolation::MissingMember { .. },
                ..
            }
        ));
        assert_eq!(snap, before);
    }

    #[test]
    fn test_apply_rejects_moved_member() {
        let mut snap = snapshot();
        let plan = RankPlan {
            changes: vec![change(3, 1, 0), change(2, 1, 1), change(4, 1, 2)],
            expected_versions: GroupVersions::new(),
        };
        assert!(matches!(
            snap.apply(&plan),
            Err(CategoryError::CategoryNotFound { .. })
        ));
    }

    #[test]
    fn test_snapshot_json_roundtrip_keeps_versions() {
        let mut snap = snapshot();
        snap.versions.insert(id(1), 2);
        let json = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn test_plan_groups() {
        let plan = RankPlan {
            changes: vec![change(5, 0, 0), change(2, 1, 0), change(1, 0, 1)],
            expected_versions: GroupVersions::new(),
        };
        assert_eq!(plan.groups(), vec![id(0), id(1)]);
    }
}
