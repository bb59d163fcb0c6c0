//! Drag-and-drop reorder submissions.
//!
//! The client posts, for every visible row, the rank it should take inside
//! its own sibling group. The group of each row is looked up from the stored
//! record, so it is never trusted from the client. A submission is accepted
//! only as a whole: if any touched group fails validation nothing is written.
//!
//! Listing and reorder requests are independent. A page rendered before a
//! concurrent reorder shows stale ranks until it is reloaded. Without group
//! versions two overlapping submissions are last-write-wins; with versions
//! the later one fails with [`CategoryError::VersionConflict`].

use crate::config::EngineConfig;
use crate::error::{CategoryError, RankViolation, Result};
use crate::listing::ListState;
use crate::store::{CategoryStore, GroupVersions, RankChange, RankPlan, Snapshot};
use crate::types::{Category, CategoryId, LogEntry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, warn};

/// One visible row and the rank it should take within its group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub id: CategoryId,
    pub rank: usize,
}

impl RankEntry {
    pub fn new(id: impl Into<CategoryId>, rank: usize) -> Self {
        Self { id: id.into(), rank }
    }
}

/// A reorder submission as posted by the client
///
/// `listing` is required on the wire: a payload that does not say which view
/// it came from cannot be checked against the ordering policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    /// Every visible row, in table order
    pub entries: Vec<RankEntry>,
    /// The listing the client was looking at
    pub listing: ListState,
    /// Group versions echoed from the listing
    #[serde(default)]
    pub expected_versions: GroupVersions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl ReorderRequest {
    pub fn new(entries: Vec<RankEntry>) -> Self {
        Self {
            entries,
            ..Default::default()
        }
    }

    /// Set the listing state the submission came from
    pub fn with_listing(mut self, listing: ListState) -> Self {
        self.listing = listing;
        self
    }

    /// Expect `group` to still be at `version` when committing
    pub fn with_expected_version(mut self, group: impl Into<CategoryId>, version: u64) -> Self {
        self.expected_versions.insert(group.into(), version);
        self
    }

    /// Echo every version the listing reported
    pub fn with_expected_versions(mut self, versions: GroupVersions) -> Self {
        self.expected_versions = versions;
        self
    }

    /// Attribute the change in the activity log
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

/// Result of an accepted submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReorderOutcome {
    /// Rows written
    pub updated: usize,
    /// Groups rewritten
    pub groups: Vec<CategoryId>,
    /// New versions of those groups
    pub versions: GroupVersions,
}

/// Direction of a single-step move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Validates and persists rank submissions against a [`CategoryStore`]
pub struct ReorderProtocol<'a, S: CategoryStore + ?Sized> {
    store: &'a S,
    require_group_versions: bool,
    activity_log: bool,
}

impl<'a, S: CategoryStore + ?Sized> ReorderProtocol<'a, S> {
    pub fn new(store: &'a S, config: &EngineConfig) -> Self {
        Self {
            store,
            require_group_versions: config.require_group_versions,
            activity_log: config.activity_log,
        }
    }

    /// Validate `request` and commit it atomically.
    pub async fn submit(&self, request: &ReorderRequest) -> Result<ReorderOutcome> {
        let start = Instant::now();

        if let Some(reason) = request.listing.ordering_blocker() {
            debug!(%reason, "rejecting reorder from a listing without ordering");
            return Err(CategoryError::OrderingDisabled { reason });
        }

        let snapshot = self.store.load().await?;
        let plan = validate(
            &snapshot,
            &request.entries,
            &request.expected_versions,
            self.require_group_versions,
        )?;

        self.commit(
            "reorder categories",
            &plan,
            serde_json::to_value(request)?,
            request.actor.as_deref(),
            start,
        )
        .await
    }

    /// Swap `id` with its previous sibling in stored order
    pub async fn move_up(&self, id: CategoryId, actor: Option<&str>) -> Result<ReorderOutcome> {
        self.move_by_one(id, MoveDirection::Up, actor).await
    }

    /// Swap `id` with its next sibling in stored order
    pub async fn move_down(&self, id: CategoryId, actor: Option<&str>) -> Result<ReorderOutcome> {
        self.move_by_one(id, MoveDirection::Down, actor).await
    }

    async fn move_by_one(
        &self,
        id: CategoryId,
        direction: MoveDirection,
        actor: Option<&str>,
    ) -> Result<ReorderOutcome> {
        let start = Instant::now();
        let snapshot = self.store.load().await?;
        let category = snapshot
            .get(id)
            .ok_or(CategoryError::CategoryNotFound { id })?;
        let group = category.parent_id;

        let mut order: Vec<CategoryId> = snapshot.siblings(group).iter().map(|c| c.id).collect();
        let position = order
            .iter()
            .position(|member| *member == id)
            .ok_or(CategoryError::CategoryNotFound { id })?;
        let neighbour = match direction {
            MoveDirection::Up => position.checked_sub(1),
            MoveDirection::Down => Some(position + 1).filter(|p| *p < order.len()),
        }
        .ok_or(CategoryError::invalid_ranks(group, RankViolation::AtBoundary { id }))?;
        order.swap(position, neighbour);

        let entries: Vec<RankEntry> = order
            .iter()
            .enumerate()
            .map(|(rank, member)| RankEntry { id: *member, rank })
            .collect();
        let mut expected = GroupVersions::new();
        expected.insert(group, snapshot.version(group));

        let plan = validate(&snapshot, &entries, &expected, false)?;
        let input = serde_json::json!({ "id": id, "direction": direction });
        self.commit("move category", &plan, input, actor, start).await
    }

    async fn commit(
        &self,
        op: &str,
        plan: &RankPlan,
        input: serde_json::Value,
        actor: Option<&str>,
        start: Instant,
    ) -> Result<ReorderOutcome> {
        let groups = plan.groups();
        if plan.changes.is_empty() {
            return Ok(ReorderOutcome {
                updated: 0,
                groups,
                versions: GroupVersions::new(),
            });
        }

        let receipt = self.store.commit_ranks(plan).await?;
        let outcome = ReorderOutcome {
            updated: receipt.updated,
            groups,
            versions: receipt.versions,
        };
        info!(op, updated = outcome.updated, groups = ?outcome.groups, "committed reorder");

        if self.activity_log {
            let entry = LogEntry::new(
                op,
                outcome.groups.clone(),
                input,
                serde_json::to_value(&outcome)?,
                start.elapsed().as_millis() as u64,
            )
            .with_actor(actor);

            // The ranks are already committed; a lost audit line must not undo that
            if let Err(error) = self.store.append_activity(&entry).await {
                warn!(%error, "failed to append reorder to activity log");
            }
        }

        Ok(outcome)
    }
}

/// Check `entries` against the stored groups and turn them into a plan.
///
/// Every touched group must be submitted whole, each member exactly once,
/// with ranks forming a permutation of `0..n`. The first violation found
/// rejects the whole submission.
pub fn validate(
    snapshot: &Snapshot,
    entries: &[RankEntry],
    expected_versions: &GroupVersions,
    require_group_versions: bool,
) -> Result<RankPlan> {
    let by_id: HashMap<CategoryId, &Category> =
        snapshot.categories.iter().map(|c| (c.id, c)).collect();

    let mut seen = HashSet::with_capacity(entries.len());
    let mut touched: BTreeMap<CategoryId, Vec<RankEntry>> = BTreeMap::new();
    for entry in entries {
        let category = by_id
            .get(&entry.id)
            .ok_or(CategoryError::CategoryNotFound { id: entry.id })?;
        if !seen.insert(entry.id) {
            return Err(CategoryError::invalid_ranks(
                category.parent_id,
                RankViolation::DuplicateEntry { id: entry.id },
            ));
        }
        touched.entry(category.parent_id).or_default().push(*entry);
    }

    let mut plan = RankPlan::default();
    for (group, submitted) in &touched {
        if let Some(missing) = snapshot
            .categories
            .iter()
            .filter(|c| c.parent_id == *group)
            .find(|c| !seen.contains(&c.id))
        {
            return Err(CategoryError::invalid_ranks(
                *group,
                RankViolation::MissingMember { id: missing.id },
            ));
        }

        let size = submitted.len();
        let mut taken = vec![false; size];
        for entry in submitted {
            if entry.rank >= size {
                return Err(CategoryError::invalid_ranks(
                    *group,
                    RankViolation::RankOutOfRange {
                        id: entry.id,
                        rank: entry.rank,
                        size,
                    },
                ));
            }
            if std::mem::replace(&mut taken[entry.rank], true) {
                return Err(CategoryError::invalid_ranks(
                    *group,
                    RankViolation::DuplicateRank { rank: entry.rank },
                ));
            }
        }

        match expected_versions.get(group) {
            Some(version) => {
                plan.expected_versions.insert(*group, *version);
            }
            None if require_group_versions => {
                return Err(CategoryError::MissingGroupVersion { group: *group });
            }
            None => {}
        }

        plan.changes.extend(submitted.iter().map(|entry| RankChange {
            id: entry.id,
            group: *group,
            ordering: entry.rank as i64,
        }));
    }

    Ok(plan)
}
