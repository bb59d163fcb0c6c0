//! Row annotations for the category table.
//!
//! The presenter takes rows exactly as the query layer ordered them and
//! attaches everything the renderer and the sortable widget need. It never
//! re-sorts.

use crate::ancestry::{AncestorResolver, Resolution};
use crate::config::EngineConfig;
use crate::listing::ListState;
use crate::ordering::OrderingIndex;
use crate::store::GroupVersions;
use crate::toggle::{row_toggles, IconSet, RowToggle};
use crate::types::{Category, CategoryId, UserId};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Read-only view of the advisory edit locks owned by the checkout subsystem
pub trait EditLocks {
    /// User currently holding `id` checked out, if any
    fn holder(&self, id: CategoryId) -> Option<UserId>;
}

/// Edit locks as reported on the loaded records themselves
#[derive(Debug, Clone, Default)]
pub struct RecordLocks {
    holders: HashMap<CategoryId, UserId>,
}

impl RecordLocks {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Category>) -> Self {
        let holders = records
            .into_iter()
            .filter_map(|c| c.checked_out.map(|user| (c.id, user)))
            .collect();
        Self { holders }
    }
}

impl EditLocks for RecordLocks {
    fn holder(&self, id: CategoryId) -> Option<UserId> {
        self.holders.get(&id).copied()
    }
}

/// Who is looking at the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewer {
    pub id: UserId,
    /// Result of the external ACL check for editing categories
    pub can_edit: bool,
    /// May override other users' checkouts
    pub can_check_in_any: bool,
}

impl Viewer {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            can_edit: true,
            can_check_in_any: false,
        }
    }

    pub fn with_can_edit(mut self, can_edit: bool) -> Self {
        self.can_edit = can_edit;
        self
    }

    pub fn with_check_in_any(mut self, can_check_in_any: bool) -> Self {
        self.can_check_in_any = can_check_in_any;
        self
    }

    /// Whether this viewer may change a row held by `holder`
    pub fn may_change(&self, holder: Option<UserId>) -> bool {
        self.can_edit && (holder.is_none() || holder == Some(self.id) || self.can_check_in_any)
    }
}

/// State of a row's drag handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragHandle {
    /// Draggable
    Active,
    /// The viewer may change the row but the listing disables ordering
    Inactive,
    /// The viewer may not change the row (no permission or checked out)
    Locked,
}

/// Where the "display only this item and its children" button leads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum FocusTarget {
    /// Narrow the listing to this row's subtree
    Subtree(CategoryId),
    /// Go back up to the parent's subtree
    Parent(CategoryId),
}

/// One annotated table row
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRow {
    #[serde(flatten)]
    pub record: Category,
    pub ancestor_chain: Vec<CategoryId>,
    pub resolution: Resolution,
    /// Space-separated parent path for the sortable widget
    pub parents: String,
    pub drag_group_id: CategoryId,
    pub display_rank: usize,
    pub indent_depth: u32,
    pub handle: DragHandle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_out_by: Option<UserId>,
    pub can_move_up: bool,
    pub can_move_down: bool,
    pub focus: FocusTarget,
    pub is_section: bool,
    pub toggles: Vec<RowToggle>,
}

/// What to show when no row matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyState {
    /// Filters hide everything, offer to clear them
    FilterActive,
    /// There are no categories yet, offer to create one
    NoCategories,
}

/// Presenter output for one listing request
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub rows: Vec<CategoryRow>,
    pub ordering_enabled: bool,
    /// Version of every group shown, echoed back on reorder
    pub group_versions: BTreeMap<CategoryId, u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<EmptyState>,
}

/// Builds [`ListingView`]s. Created once by the composition root.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryListPresenter {
    resolver: AncestorResolver,
    icons: IconSet,
}

impl CategoryListPresenter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            resolver: AncestorResolver::new(config.ancestry),
            icons: config.icon_set,
        }
    }

    /// Annotate `records`, which arrive filtered, sorted and paginated.
    pub fn present(
        &self,
        records: &[Category],
        versions: &GroupVersions,
        state: &ListState,
        locks: &dyn EditLocks,
        viewer: &Viewer,
    ) -> ListingView {
        let index = OrderingIndex::build(records);
        let ordering_enabled = state.ordering_enabled();
        let focus_item = state.filters.item;

        let mut seen = HashSet::with_capacity(records.len());
        let mut rows = Vec::with_capacity(records.len());

        for record in records {
            if !seen.insert(record.id) {
                continue;
            }

            let ancestry = self.resolver.resolve(record, &index);
            let holder = locks.holder(record.id);
            let may_change = viewer.may_change(holder);
            let display_rank = index.rank_of(record.id).unwrap_or_default();
            let group_len = index.group_len(record.parent_id);

            let handle = match (may_change, ordering_enabled) {
                (false, _) => DragHandle::Locked,
                (true, false) => DragHandle::Inactive,
                (true, true) => DragHandle::Active,
            };
            let movable = handle == DragHandle::Active;

            let focus = match focus_item {
                Some(item) if item == record.id || record.parent_id.is_root() => {
                    FocusTarget::Parent(record.parent_id)
                }
                _ => FocusTarget::Subtree(record.id),
            };

            rows.push(CategoryRow {
                parents: ancestry.parents_attribute(),
                ancestor_chain: ancestry.chain,
                resolution: ancestry.resolution,
                drag_group_id: record.parent_id,
                display_rank,
                indent_depth: record.level,
                handle,
                checked_out_by: holder,
                can_move_up: movable && display_rank > 0,
                can_move_down: movable && display_rank + 1 < group_len,
                focus,
                is_section: record.is_section(),
                toggles: row_toggles(record, self.icons),
                record: record.clone(),
            });
        }

        let group_versions = index
            .groups()
            .map(|(group, _)| (group, versions.get(&group).copied().unwrap_or_default()))
            .collect();

        let empty_state = rows.is_empty().then(|| {
            if state.filters.is_active() {
                EmptyState::FilterActive
            } else {
                EmptyState::NoCategories
            }
        });

        debug!(
            rows = rows.len(),
            ordering_enabled,
            strategy = ?self.resolver.strategy(),
            "presented category listing"
        );

        ListingView {
            rows,
            ordering_enabled,
            group_versions,
            empty_state,
        }
    }
}
