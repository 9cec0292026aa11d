//! Saved views for a data grid. This provides the view store, the controller which ties it to a
//! live grid widget, and the persistence plumbing needed to keep views across reloads.

pub mod config;
pub mod controller;
pub mod snapshot;
pub mod state;
pub mod storage;
pub mod view;
pub mod widget;

pub use config::{GridViewsConfig, PersistMode};
pub use controller::ViewController;
pub use state::{Action, MenuKey, ViewStoreState};
pub use storage::BlobStore;
pub use view::{View, ViewId};
pub use widget::GridWidget;

#[derive(Debug, thiserror::Error)]
pub enum GridViewsError {
    #[error("grid widget is not ready")]
    NotReady,

    #[error("404 No view found with id {id}")]
    NotFound { id: ViewId },

    #[error("view id ({id:?}) is not a valid UUID")]
    InvalidID { id: String },

    #[error("a controller for grid {grid_id:?} already exists")]
    DuplicateGrid { grid_id: String },

    #[error("persistence unavailable: {0:#}")]
    PersistenceUnavailable(anyhow::Error),

    // The #[from] anyhow::Error will convert anything that offers `into anyhow::Error`.
    #[error("widget error: {0}")]
    WidgetError(#[from] anyhow::Error),
}

pub type GridViewsResult<T> = std::result::Result<T, GridViewsError>;
