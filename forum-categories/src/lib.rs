//! Forum category hierarchy and ordering engine
//!
//! This crate backs the admin category listing of a forum: it annotates each
//! row with its position in the category tree, decides whether drag-and-drop
//! reordering is allowed for the current view, and validates and persists
//! the ranks a client submits after a drag.
//!
//! ## Overview
//!
//! - **Sibling groups** - Categories sharing a parent form one ordered group;
//!   ranks are only ever compared inside a group
//! - **Request-scoped index** - The [`OrderingIndex`] is rebuilt from the rows of
//!   each request and never cached between requests
//! - **Whole-group submissions** - A reorder must rank every member of each
//!   group it touches, and is committed all-or-nothing
//! - **Optional versions** - Per-group counters turn overlapping reorders into
//!   [`CategoryError::VersionConflict`] instead of last-write-wins
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use forum_categories::{
//!     Category, CategoryContext, CategoryListPresenter, CategoryStore, EngineConfig,
//!     ListState, RankEntry, RecordLocks, ReorderProtocol, ReorderRequest, Viewer,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::load(None)?;
//! let ctx = CategoryContext::from_config("/var/lib/forum/categories", &config);
//! ctx.init(vec![
//!     Category::section(1, "General"),
//!     Category::child(2, 1, 1, "Welcome"),
//!     Category::child(3, 1, 1, "Suggestions").with_ordering(1),
//! ])
//! .await?;
//!
//! // Render the listing
//! let snapshot = ctx.load().await?;
//! let records: Vec<Category> = snapshot.in_tree_order().into_iter().cloned().collect();
//! let view = CategoryListPresenter::new(&config).present(
//!     &records,
//!     &snapshot.versions,
//!     &ListState::default(),
//!     &RecordLocks::from_records(&records),
//!     &Viewer::new(42).with_can_edit(true),
//! );
//!
//! // Submit a drag that swaps the two children
//! let request = ReorderRequest::new(vec![
//!     RankEntry::new(1, 0),
//!     RankEntry::new(3, 0),
//!     RankEntry::new(2, 1),
//! ])
//! .with_expected_versions(view.group_versions)
//! .with_actor("admin");
//! ReorderProtocol::new(&ctx, &config).submit(&request).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage Structure
//!
//! ```text
//! store/
//! ├── categories.json      # Category table and group versions (JSON)
//! ├── .lock                # Exclusive commit lock
//! └── activity/
//!     └── current.jsonl    # Committed reorders (JSONL, read newest first)
//! ```

pub mod ancestry;
pub mod config;
mod context;
mod error;
pub mod listing;
pub mod ordering;
pub mod presenter;
pub mod reorder;
pub mod store;
pub mod toggle;
pub mod types;

pub use ancestry::{AncestorResolver, Ancestry, AncestryStrategy, Resolution};
pub use config::EngineConfig;
pub use context::{CategoryContext, CategoryLock};
pub use error::{CategoryError, OrderingDisabledReason, RankViolation, Result};
pub use listing::{Filters, ListState, Pagination, SortColumn, SortDirection};
pub use ordering::OrderingIndex;
pub use presenter::{
    CategoryListPresenter, CategoryRow, DragHandle, EditLocks, EmptyState, FocusTarget,
    ListingView, RecordLocks, Viewer,
};
pub use reorder::{MoveDirection, RankEntry, ReorderOutcome, ReorderProtocol, ReorderRequest};
pub use store::{CategoryStore, CommitReceipt, GroupVersions, RankChange, RankPlan, Snapshot};
pub use toggle::{IconSet, RowToggle, ToggleKind};

// Re-export commonly used types
pub use types::{Category, CategoryId, LogEntry, LogEntryId, PublishState, UserId};
