//! Durable storage for view stores: a string keyed blob store and the serialised form a
//! [`ViewStoreState`] takes inside it.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use anyhow::{Context, Result, anyhow};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    GridViewsError, GridViewsResult, PersistMode,
    state::ViewStoreState,
    view::{View, ViewId},
};

/// Provide an implementation of a durable key-value store for serialised state.
///
/// Writes must complete before `set` returns, they may be issued while the page is unloading.
pub trait BlobStore {
    /// `Ok(None)` if nothing has been stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// What is written for a store. `draftLabel` and `menuOpen` are only present in
/// [`PersistMode::Full`]. The menu anchor is never written, so `menuOpen` is not read back.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PersistedStateRef<'a, S> {
    views: &'a IndexMap<ViewId, View<S>>,
    active_view_id: Option<ViewId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    draft_label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    menu_open: Option<bool>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PersistedState<S> {
    views: IndexMap<ViewId, View<S>>,
    #[serde(default)]
    active_view_id: Option<ViewId>,
    #[serde(default)]
    draft_label: Option<String>,
}

impl<S> PersistedState<S> {
    fn into_state<A>(self) -> ViewStoreState<S, A> {
        // A stale id in a stored blob must not break the active view invariant.
        let active_view_id = self
            .active_view_id
            .filter(|id| self.views.contains_key(id));
        ViewStoreState {
            views: self.views,
            draft_label: self.draft_label.unwrap_or_default(),
            active_view_id,
            // Without its anchor an open menu could only be closed, never shown.
            menu_open: false,
            menu_anchor: None,
        }
    }
}

/// Serialise `state` according to `mode`. `None` for [`PersistMode::Off`].
pub fn serialize_state<S: Serialize, A>(
    state: &ViewStoreState<S, A>,
    mode: PersistMode,
) -> Result<Option<String>> {
    let persisted = match mode {
        PersistMode::Off => return Ok(None),
        PersistMode::Minimal => PersistedStateRef {
            views: &state.views,
            active_view_id: state.active_view_id,
            draft_label: None,
            menu_open: None,
        },
        PersistMode::Full => PersistedStateRef {
            views: &state.views,
            active_view_id: state.active_view_id,
            draft_label: Some(&state.draft_label),
            menu_open: Some(state.menu_open),
        },
    };
    Ok(Some(serde_json::to_string(&persisted)?))
}

pub fn deserialize_state<S: DeserializeOwned, A>(blob: &str) -> Result<ViewStoreState<S, A>> {
    let persisted: PersistedState<S> = serde_json::from_str(blob)?;
    Ok(persisted.into_state())
}

/// Write `state` under `key`.
pub fn save_state<S: Serialize, A>(
    store: &dyn BlobStore,
    key: &str,
    state: &ViewStoreState<S, A>,
    mode: PersistMode,
) -> GridViewsResult<()> {
    let Some(blob) = serialize_state(state, mode)
        .with_context(|| format!("Serialising view state for {key}"))
        .map_err(GridViewsError::PersistenceUnavailable)?
    else {
        return Ok(());
    };
    debug!("Writing {} bytes of view state to {key}", blob.len());
    store
        .set(key, &blob)
        .with_context(|| format!("Writing view state to {key}"))
        .map_err(GridViewsError::PersistenceUnavailable)
}

/// Read a state previously written under `key`. `Ok(None)` if there is none.
pub fn load_state<S: DeserializeOwned, A>(
    store: &dyn BlobStore,
    key: &str,
) -> GridViewsResult<Option<ViewStoreState<S, A>>> {
    let blob = store
        .get(key)
        .with_context(|| format!("Reading view state from {key}"))
        .map_err(GridViewsError::PersistenceUnavailable)?;
    blob.map(|blob| {
        deserialize_state(&blob)
            .with_context(|| format!("Parsing view state stored under {key}"))
            .map_err(GridViewsError::PersistenceUnavailable)
    })
    .transpose()
}

/// A `HashMap` backed store to unit test persistence.
///
/// Hardcoded case: a store created with [`MemoryBlobStore::failing`] refuses every read and write.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RefCell<HashMap<String, String>>,
    failing: Cell<bool>,
}

impl MemoryBlobStore {
    pub fn failing() -> Self {
        MemoryBlobStore {
            failing: Cell::new(true),
            ..Default::default()
        }
    }

    /// Start (or stop) refusing reads and writes.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn keys(&self) -> Vec<String> {
        self.blobs.borrow().keys().cloned().collect()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.failing.get() {
            return Err(anyhow!("Storage unavailable reading {key}"));
        }
        Ok(self.blobs.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.failing.get() {
            return Err(anyhow!("Storage unavailable writing {key}"));
        }
        self.blobs
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
