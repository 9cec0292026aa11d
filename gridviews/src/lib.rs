//! Saved views for every grid on a page.
//!
//! A [`GridPage`] owns one [`ViewController`] per grid, keyed by grid id, all persisted into the
//! same [`BlobStore`] under separate keys. Construct it once for the page and pass it to whatever
//! renders the grids.

use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};

pub use gridviews_core::*;
use gridviews_core::snapshot::{load_widget_snapshot, save_widget_snapshot};

struct Grid<W: GridWidget, A> {
    widget: Weak<W>,
    controller: ViewController<W, A>,
}

pub struct GridPage<W: GridWidget, A = ()> {
    store: Rc<dyn BlobStore>,
    config: GridViewsConfig,
    grids: IndexMap<String, Grid<W, A>>,
}

impl<W: GridWidget, A: 'static> GridPage<W, A>
where
    W::Snapshot: Serialize + DeserializeOwned + Default + 'static,
{
    pub fn new(store: Rc<dyn BlobStore>, config: GridViewsConfig) -> Self {
        GridPage {
            store,
            config,
            grids: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &GridViewsConfig {
        &self.config
    }

    /// Set up saved views for `widget`, restoring whatever was stored for `grid_id` previously.
    ///
    /// The first grid added is the page's primary grid, see [`Self::on_unload`].
    pub fn add_grid(
        &mut self,
        grid_id: impl Into<String>,
        widget: &Rc<W>,
    ) -> GridViewsResult<&mut ViewController<W, A>> {
        let grid_id = grid_id.into();
        if self.grids.contains_key(&grid_id) {
            return Err(GridViewsError::DuplicateGrid { grid_id });
        }
        debug!("Adding grid {grid_id}");
        let controller = ViewController::persisted(
            widget,
            self.store.clone(),
            self.config.state_key(&grid_id),
            self.config.persist_mode,
        );
        let grid = Grid {
            widget: Rc::downgrade(widget),
            controller,
        };
        let controller = &mut self.grids.entry(grid_id).or_insert(grid).controller;
        Ok(controller)
    }

    pub fn grid(&self, grid_id: &str) -> Option<&ViewController<W, A>> {
        self.grids.get(grid_id).map(|grid| &grid.controller)
    }

    pub fn grid_mut(&mut self, grid_id: &str) -> Option<&mut ViewController<W, A>> {
        self.grids.get_mut(grid_id).map(|grid| &mut grid.controller)
    }

    /// In the order they were added.
    pub fn grid_ids(&self) -> impl Iterator<Item = &str> {
        self.grids.keys().map(String::as_str)
    }

    fn primary_widget(&self) -> Option<GridViewsResult<Rc<W>>> {
        self.grids
            .first()
            .map(|(_, grid)| grid.widget.upgrade().ok_or(GridViewsError::NotReady))
    }

    /// Put the primary grid back into the configuration it had when the page was last unloaded.
    /// Without a stored configuration, the grid is reset to the default (empty) one.
    pub fn restore_primary_snapshot(&self) -> GridViewsResult<()> {
        let Some(widget) = self.primary_widget() else {
            return Ok(());
        };
        let snapshot: W::Snapshot =
            load_widget_snapshot(self.store.as_ref(), &self.config.widget_snapshot_key);
        widget?.apply_snapshot(&snapshot)
    }

    /// Write everything out before the page goes away: the primary grid's current configuration
    /// and every grid's views. Each write is attempted regardless of earlier failures.
    pub fn on_unload(&self) {
        match self.primary_widget() {
            Some(Ok(widget)) => {
                if let Err(e) = save_widget_snapshot(
                    widget.as_ref(),
                    self.store.as_ref(),
                    &self.config.widget_snapshot_key,
                ) {
                    warn!("Could not save grid snapshot: {e}");
                }
            }
            Some(Err(e)) => warn!("Could not save grid snapshot: {e}"),
            None => (),
        }
        for (grid_id, grid) in &self.grids {
            if let Err(e) = grid.controller.persist() {
                warn!("Could not save views for grid {grid_id}: {e}");
            }
        }
    }
}
