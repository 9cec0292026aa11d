//! The imperative face of a view store: every operation the rendering layer can trigger, wired to
//! the grid widget and (optionally) to durable storage.

use std::rc::{Rc, Weak};

use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    GridViewsError, GridViewsResult, PersistMode,
    state::{Action, MenuKey, ViewStoreState},
    storage::{BlobStore, load_state, save_state},
    view::ViewId,
    widget::GridWidget,
};

type SaveFn<S, A> = Box<dyn Fn(&ViewStoreState<S, A>) -> GridViewsResult<()>>;
type LoadFn<S, A> = Box<dyn Fn() -> GridViewsResult<Option<ViewStoreState<S, A>>>>;

/// Where a controller mirrors its state. Only [`ViewController::persisted`] needs to know how a
/// snapshot is serialised.
struct Persistence<S, A> {
    key: String,
    save: SaveFn<S, A>,
    load: LoadFn<S, A>,
}

/// Saved views for one grid instance.
///
/// The controller only holds a `Weak` reference to its widget: once the widget is dropped (or
/// before one is bound) operations which need it fail with [`GridViewsError::NotReady`].
///
/// Failed operations never change the state.
pub struct ViewController<W: GridWidget, A = ()> {
    state: ViewStoreState<W::Snapshot, A>,
    widget: Weak<W>,
    persistence: Option<Persistence<W::Snapshot, A>>,
}

impl<W: GridWidget, A: 'static> ViewController<W, A>
where
    W::Snapshot: Serialize + DeserializeOwned + 'static,
{
    /// A controller which mirrors its state to `store` under `key` after every change, starting
    /// from whatever was stored there previously.
    ///
    /// A missing or unreadable prior state is not an error: the controller starts empty.
    pub fn persisted(
        widget: &Rc<W>,
        store: Rc<dyn BlobStore>,
        key: impl Into<String>,
        mode: PersistMode,
    ) -> Self {
        let key = key.into();
        let save: SaveFn<W::Snapshot, A> = {
            let (store, key) = (store.clone(), key.clone());
            Box::new(move |state: &ViewStoreState<W::Snapshot, A>| {
                save_state(store.as_ref(), &key, state, mode)
            })
        };
        let load: LoadFn<W::Snapshot, A> = {
            let key = key.clone();
            Box::new(move || match mode {
                PersistMode::Off => Ok(None),
                _ => load_state(store.as_ref(), &key),
            })
        };
        let mut controller = ViewController {
            state: ViewStoreState::default(),
            widget: Rc::downgrade(widget),
            persistence: Some(Persistence { key, save, load }),
        };
        if let Err(e) = controller.reload() {
            warn!("Ignoring stored view state: {e}");
        }
        controller
    }
}

impl<W: GridWidget, A> ViewController<W, A> {
    /// A controller whose views live only as long as it does.
    pub fn new(widget: &Rc<W>) -> Self {
        ViewController {
            state: ViewStoreState::default(),
            widget: Rc::downgrade(widget),
            persistence: None,
        }
    }

    /// A controller with no widget bound yet.
    pub fn unbound() -> Self {
        ViewController {
            state: ViewStoreState::default(),
            widget: Weak::new(),
            persistence: None,
        }
    }

    pub fn bind(&mut self, widget: &Rc<W>) {
        self.widget = Rc::downgrade(widget);
    }

    pub fn state(&self) -> &ViewStoreState<W::Snapshot, A> {
        &self.state
    }

    fn widget(&self) -> GridViewsResult<Rc<W>> {
        self.widget.upgrade().ok_or(GridViewsError::NotReady)
    }

    /// Reduce `action` into the state, then mirror the new state to storage (best effort).
    pub fn dispatch(&mut self, action: Action<W::Snapshot, A>) {
        self.state.dispatch(action);
        if let Err(e) = self.persist() {
            warn!("{e}");
        }
    }

    /// Write the current state to storage now. A no-op for controllers without storage.
    pub fn persist(&self) -> GridViewsResult<()> {
        match &self.persistence {
            Some(persistence) => (persistence.save)(&self.state),
            None => Ok(()),
        }
    }

    /// Replace the state with the one currently stored for this controller, e.g. after another
    /// controller wrote under the same key. Without a stored state nothing changes.
    ///
    /// A no-op for controllers without storage. On error the state is left as it was.
    pub fn reload(&mut self) -> GridViewsResult<()> {
        let Some(persistence) = &self.persistence else {
            return Ok(());
        };
        match (persistence.load)()? {
            Some(state) => {
                debug!("Restored view state for {}", persistence.key);
                self.state.dispatch(Action::Hydrate(state));
            }
            None => debug!("No stored view state for {}", persistence.key),
        }
        Ok(())
    }

    /// Save whatever the grid currently displays as a new view labelled with the draft label.
    ///
    /// This does not check [`Self::is_draft_label_valid`]: gating submission is up to the caller.
    pub fn create_new_view(&mut self) -> GridViewsResult<ViewId> {
        let snapshot = self.widget()?.capture_snapshot()?;
        let id = ViewId::new();
        debug!("Creating view {id} ({:?})", self.state.draft_label());
        self.dispatch(Action::CreateView { id, snapshot });
        Ok(id)
    }

    /// Forget a view. The grid keeps displaying whatever it currently displays.
    pub fn delete_view(&mut self, id: &ViewId) {
        debug!("Deleting view {id}");
        self.dispatch(Action::DeleteView(*id));
    }

    /// Show a saved view on the grid and mark it active.
    ///
    /// The snapshot is applied first, so a failure leaves the active view unchanged.
    pub fn set_active_view(&mut self, id: &ViewId) -> GridViewsResult<()> {
        let view = self
            .state
            .view(id)
            .ok_or(GridViewsError::NotFound { id: *id })?;
        self.widget()?.apply_snapshot(&view.snapshot)?;
        debug!("Activated view {id} ({:?})", view.label);
        self.dispatch(Action::SetActiveView(Some(*id)));
        Ok(())
    }

    /// [`Self::set_active_view`] for an id as the rendering layer hands it back.
    pub fn set_active_view_str(&mut self, id: &str) -> GridViewsResult<()> {
        self.set_active_view(&id.parse()?)
    }

    /// [`Self::delete_view`] for an id as the rendering layer hands it back.
    pub fn delete_view_str(&mut self, id: &str) -> GridViewsResult<()> {
        self.delete_view(&id.parse()?);
        Ok(())
    }

    pub fn deselect_view(&mut self) {
        self.dispatch(Action::SetActiveView(None));
    }

    pub fn set_draft_label(&mut self, label: impl Into<String>) {
        self.dispatch(Action::SetDraftLabel(label.into()));
    }

    pub fn is_draft_label_valid(&self) -> bool {
        self.state.is_draft_label_valid()
    }

    /// Click on the menu trigger: toggles the menu.
    pub fn open_menu(&mut self, anchor: A) {
        self.dispatch(Action::OpenMenu(anchor));
    }

    pub fn close_menu(&mut self) {
        self.dispatch(Action::CloseMenu);
    }

    /// Key press inside the open menu. Returns `true` if the key's default behaviour should be
    /// suppressed.
    pub fn on_menu_key(&mut self, key: MenuKey) -> bool {
        if key.closes_menu() {
            self.close_menu();
        }
        key.suppresses_default()
    }
}
