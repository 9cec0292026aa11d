//! The fundamental `View` building block and related functions.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::GridViewsError;

/// Identifies a saved view. Assigned once at creation and never reused.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ViewId(Uuid);

impl ViewId {
    /// A fresh, time-ordered id.
    pub fn new() -> Self {
        ViewId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ViewId {
    fn from(id: Uuid) -> Self {
        ViewId(id)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Rendering layers hand ids around as strings.
impl FromStr for ViewId {
    type Err = GridViewsError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(id)
            .map(ViewId)
            .map_err(|_| GridViewsError::InvalidID { id: id.to_owned() })
    }
}

/// A named, saved snapshot of the grid widget's visual configuration.
///
/// `snapshot` is produced and consumed by the widget only; it is stored and forwarded as-is.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct View<S> {
    pub label: String,
    pub snapshot: S,
}

impl<S> View<S> {
    pub fn new(label: impl Into<String>, snapshot: S) -> Self {
        View {
            label: label.into(),
            snapshot,
        }
    }
}

/// A draft label may be used for a new view if it is non-empty and no existing view already
/// carries exactly the same label (case-sensitive).
pub fn is_label_valid<S>(label: &str, views: &IndexMap<ViewId, View<S>>) -> bool {
    !label.is_empty() && views.values().all(|view| view.label != label)
}
