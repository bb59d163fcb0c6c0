//! Filter, sort and pagination state of the category listing.
//!
//! Applying these is the query layer's job. The engine only needs to know
//! whether the rows it receives are a complete, unfiltered view of their
//! sibling groups, because anything less makes a submitted permutation unsafe.

use crate::error::OrderingDisabledReason;
use crate::types::{CategoryId, PublishState};
use serde::{Deserialize, Serialize};

/// Column the listing is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    Ordering,
    Published,
    Title,
    Access,
    Locked,
    Review,
    AllowPolls,
    Anonymous,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Active filters. `None` / empty means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub search: Option<String>,
    pub title: Option<String>,
    pub published: Option<PublishState>,
    pub access: Option<u32>,
    pub locked: Option<bool>,
    pub review: Option<bool>,
    pub allow_polls: Option<bool>,
    pub anonymous: Option<bool>,
    /// Show only this category and its children
    pub item: Option<CategoryId>,
}

impl Filters {
    /// Whether any filter narrows the listing
    pub fn is_active(&self) -> bool {
        let text_active = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.trim().is_empty());

        text_active(&self.search)
            || text_active(&self.title)
            || self.published.is_some()
            || self.access.is_some()
            || self.locked.is_some()
            || self.review.is_some()
            || self.allow_polls.is_some()
            || self.anonymous.is_some()
            || self.item.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    /// Rows per page, 0 shows everything
    pub limit: usize,
    pub offset: usize,
    /// Rows matching the query before pagination
    pub total: usize,
}

impl Pagination {
    /// Whether the current page holds every matching row.
    ///
    /// With a page limit set, a `total` of 0 means the count is unknown and
    /// the page is treated as partial.
    pub fn shows_all(&self) -> bool {
        self.limit == 0 || (self.offset == 0 && self.total > 0 && self.total <= self.limit)
    }
}

/// Everything the client was looking at when it rendered the table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListState {
    pub filters: Filters,
    pub sort: SortColumn,
    pub direction: SortDirection,
    pub pagination: Pagination,
}

impl ListState {
    /// Why reordering is not allowed, if it is not
    pub fn ordering_blocker(&self) -> Option<OrderingDisabledReason> {
        if self.sort != SortColumn::Ordering || self.direction != SortDirection::Asc {
            Some(OrderingDisabledReason::NotSortedByOrdering)
        } else if self.filters.is_active() {
            Some(OrderingDisabledReason::Filtered)
        } else if !self.pagination.shows_all() {
            Some(OrderingDisabledReason::Paginated)
        } else {
            None
        }
    }

    pub fn ordering_enabled(&self) -> bool {
        self.ordering_blocker().is_none()
    }
}
