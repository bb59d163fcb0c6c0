//! Ancestor chains reconstructed from sibling-group membership.
//!
//! Each row only carries its immediate parent. The nested drag-and-drop widget
//! needs the whole path so that dropping a node carries its subtree, so the
//! path is recovered by walking up the [`OrderingIndex`]: at every step the
//! group whose child list contains the current id names the next ancestor.
//!
//! The walk is bounded by the node's `level`, which guarantees termination on
//! cyclic data. Missing links and cycles are reported in the [`Resolution`]
//! but never fail the request.

use crate::ordering::OrderingIndex;
use crate::types::{Category, CategoryId};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::{debug, warn};

/// How the resolver finds the group containing an id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AncestryStrategy {
    /// Scan every group's child list at every step, O(level x groups x size)
    MembershipScan,
    /// Use the child -> group map kept by the index, O(level)
    #[default]
    Indexed,
}

/// How far the walk got
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// The walk ran the full `level` steps
    Complete,
    /// No group contains `missing`; the chain stops there
    Gap { missing: CategoryId },
    /// `repeated` showed up twice, the parent graph loops
    CycleSuspected { repeated: CategoryId },
}

impl Resolution {
    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}

/// Result of resolving one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ancestry {
    /// Immediate parent, `None` for sections
    pub parent: Option<CategoryId>,
    /// Group keys found walking up from the parent
    pub chain: Vec<CategoryId>,
    pub resolution: Resolution,
}

impl Ancestry {
    /// Ancestry of a section: nothing above it
    pub fn root() -> Self {
        Self {
            parent: None,
            chain: Vec::new(),
            resolution: Resolution::Complete,
        }
    }

    /// The `parents` attribute consumed by the sortable widget: the immediate
    /// parent followed by the chain, each id preceded by a space. Empty for
    /// sections.
    pub fn parents_attribute(&self) -> String {
        let Some(parent) = self.parent else {
            return String::new();
        };

        let mut out = String::new();
        for id in std::iter::once(parent).chain(self.chain.iter().copied()) {
            let _ = write!(out, " {id}");
        }
        out
    }
}

/// Resolves ancestor chains against an [`OrderingIndex`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AncestorResolver {
    strategy: AncestryStrategy,
}

impl AncestorResolver {
    pub fn new(strategy: AncestryStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> AncestryStrategy {
        self.strategy
    }

    /// Walk up from `node.parent_id` at most `node.level` times.
    ///
    /// A chain without repeats never holds more ids than the index does, so
    /// the walk is also capped at `index.len() + 1` steps. That bound is only
    /// reached on cyclic data, which keeps a corrupted `level` from running
    /// the walk for billions of steps.
    pub fn resolve(&self, node: &Category, index: &OrderingIndex) -> Ancestry {
        if node.level == 0 {
            return Ancestry::root();
        }

        let steps = (node.level as usize).min(index.len() + 1);
        let mut chain = Vec::with_capacity(steps);
        let mut resolution = Resolution::Complete;
        let mut current = node.parent_id;

        for _ in 0..steps {
            let Some(key) = self.containing_group(current, index) else {
                debug!(id = %node.id, missing = %current, "ancestor chain truncated");
                resolution = Resolution::Gap { missing: current };
                break;
            };

            let repeated = key == node.id || key == node.parent_id || chain.contains(&key);
            if repeated && resolution.is_complete() {
                warn!(id = %node.id, repeated = %key, "category parent graph contains a cycle");
                resolution = Resolution::CycleSuspected { repeated: key };
            }

            chain.push(key);
            current = key;
        }

        Ancestry {
            parent: Some(node.parent_id),
            chain,
            resolution,
        }
    }

    fn containing_group(&self, id: CategoryId, index: &OrderingIndex) -> Option<CategoryId> {
        match self.strategy {
            AncestryStrategy::MembershipScan => index
                .groups()
                .find(|(_, members)| members.contains(&id))
                .map(|(key, _)| key),
            AncestryStrategy::Indexed => index.parent_of(id),
        }
    }
}
