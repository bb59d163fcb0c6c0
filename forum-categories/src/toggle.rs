//! Per-row toggle descriptors for the pass-through flags

use crate::types::Category;
use serde::{Deserialize, Serialize};

/// Icon family used by the admin template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconSet {
    /// Legacy image sprites (`grid_*` classes)
    #[default]
    Default,
    Bootstrap2,
    Bootstrap3,
    FontAwesome,
}

impl IconSet {
    /// Icon class for a toggle whose current state is `on`
    pub fn state_icon(self, on: bool) -> &'static str {
        match (self, on) {
            (Self::Default, true) => "grid_true",
            (Self::Default, false) => "grid_false",
            (Self::Bootstrap2, true) => "icon-publish",
            (Self::Bootstrap2, false) => "icon-unpublish",
            (Self::Bootstrap3, true) => "glyphicon glyphicon-ok",
            (Self::Bootstrap3, false) => "glyphicon glyphicon-remove",
            (Self::FontAwesome, true) => "fa fa-check",
            (Self::FontAwesome, false) => "fa fa-times",
        }
    }
}

/// A flag the renderer shows as a clickable toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleKind {
    Published,
    Locked,
    Review,
    AllowPolls,
    AllowAnonymous,
}

/// One toggle cell: the current value and the task clicking it fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowToggle {
    pub kind: ToggleKind,
    pub active: bool,
    pub task: &'static str,
    pub icon: &'static str,
}

impl RowToggle {
    fn new(kind: ToggleKind, active: bool, icons: IconSet) -> Self {
        let task = match (kind, active) {
            (ToggleKind::Published, true) => "unpublish",
            (ToggleKind::Published, false) => "publish",
            (ToggleKind::Locked, true) => "unlock",
            (ToggleKind::Locked, false) => "lock",
            (ToggleKind::Review, true) => "unreview",
            (ToggleKind::Review, false) => "review",
            (ToggleKind::AllowPolls, true) => "deny_polls",
            (ToggleKind::AllowPolls, false) => "allow_polls",
            (ToggleKind::AllowAnonymous, true) => "deny_anonymous",
            (ToggleKind::AllowAnonymous, false) => "allow_anonymous",
        };

        Self {
            kind,
            active,
            task,
            icon: icons.state_icon(active),
        }
    }
}

/// Toggles shown for `category`. Sections carry no review/poll/anonymous
/// settings.
pub fn row_toggles(category: &Category, icons: IconSet) -> Vec<RowToggle> {
    let mut toggles = vec![
        RowToggle::new(ToggleKind::Published, category.published.is_published(), icons),
        RowToggle::new(ToggleKind::Locked, category.locked, icons),
    ];

    if !category.is_section() {
        toggles.push(RowToggle::new(ToggleKind::Review, category.review, icons));
        toggles.push(RowToggle::new(ToggleKind::AllowPolls, category.allow_polls, icons));
        toggles.push(RowToggle::new(
            ToggleKind::AllowAnonymous,
            category.allow_anonymous,
            icons,
        ));
    }

    toggles
}
