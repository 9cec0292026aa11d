//! Keeping the grid's raw configuration across reloads, independent of any saved views.

use anyhow::Context;
use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};

use crate::{GridViewsError, GridViewsResult, storage::BlobStore, widget::GridWidget};

/// Capture what `widget` currently displays and write it under `key`.
pub fn save_widget_snapshot<W>(
    widget: &W,
    store: &dyn BlobStore,
    key: &str,
) -> GridViewsResult<()>
where
    W: GridWidget,
    W::Snapshot: Serialize,
{
    let snapshot = widget.capture_snapshot()?;
    let blob = serde_json::to_string(&snapshot)
        .context("Serialising grid snapshot")
        .map_err(GridViewsError::PersistenceUnavailable)?;
    store
        .set(key, &blob)
        .with_context(|| format!("Writing grid snapshot to {key}"))
        .map_err(GridViewsError::PersistenceUnavailable)
}

/// The snapshot stored under `key`, or the default (empty) configuration if there is none or it
/// cannot be read.
pub fn load_widget_snapshot<S>(store: &dyn BlobStore, key: &str) -> S
where
    S: DeserializeOwned + Default,
{
    match store.get(key) {
        Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
            warn!("Ignoring unreadable grid snapshot under {key}: {e}");
            S::default()
        }),
        Ok(None) => {
            debug!("No grid snapshot under {key}");
            S::default()
        }
        Err(e) => {
            warn!("Ignoring grid snapshot under {key}: {e:#}");
            S::default()
        }
    }
}

/// Recreate `target`'s configuration from whatever `source` currently displays.
pub fn sync_widgets<W, T>(source: &W, target: &T) -> GridViewsResult<()>
where
    W: GridWidget,
    T: GridWidget<Snapshot = W::Snapshot>,
{
    let snapshot = source.capture_snapshot()?;
    target.apply_snapshot(&snapshot)
}
