//! Settings for saved views.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// How much of a view store is mirrored to the blob store after every change.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PersistMode {
    /// Views only live as long as their controller.
    Off,
    /// Views, active view, draft label and menu visibility.
    #[default]
    Full,
    /// Views and active view.
    Minimal,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct GridViewsConfig {
    pub storage_key_prefix: String,
    pub persist_mode: PersistMode,
    pub widget_snapshot_key: String,
}

impl Default for GridViewsConfig {
    fn default() -> Self {
        GridViewsConfig {
            storage_key_prefix: "gridViews".into(),
            persist_mode: PersistMode::Full,
            widget_snapshot_key: "dataGridState".into(),
        }
    }
}

impl GridViewsConfig {
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Parsing grid views config")
    }

    /// Blob store key holding the view state for `grid_id`. Distinct grids never share a key.
    pub fn state_key(&self, grid_id: &str) -> String {
        format!("{}:{grid_id}", self.storage_key_prefix)
    }
}
