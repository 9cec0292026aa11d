//! The view store: its state and the reducer which moves it from one state to the next.

use indexmap::IndexMap;

use crate::view::{View, ViewId, is_label_valid};

/// Accessibility id for the popup, only handed out while the popup can actually be shown.
pub const POPUP_ID: &str = "transition-popper";

/// The entire state of one grid's saved views.
///
/// `S` is the widget's opaque snapshot type, `A` is whatever handle the rendering layer uses to
/// anchor the popup menu.
#[derive(Debug, PartialEq, Clone)]
#[non_exhaustive]
pub struct ViewStoreState<S, A = ()> {
    pub(crate) views: IndexMap<ViewId, View<S>>,
    pub(crate) draft_label: String,
    pub(crate) active_view_id: Option<ViewId>,
    pub(crate) menu_open: bool,
    pub(crate) menu_anchor: Option<A>,
}

impl<S, A> Default for ViewStoreState<S, A> {
    fn default() -> Self {
        ViewStoreState {
            views: IndexMap::new(),
            draft_label: String::new(),
            active_view_id: None,
            menu_open: false,
            menu_anchor: None,
        }
    }
}

impl<S, A> ViewStoreState<S, A> {
    /// Saved views, in the order they were created.
    pub fn views(&self) -> &IndexMap<ViewId, View<S>> {
        &self.views
    }

    pub fn view(&self, id: &ViewId) -> Option<&View<S>> {
        self.views.get(id)
    }

    pub fn draft_label(&self) -> &str {
        &self.draft_label
    }

    /// The view last explicitly selected or created. This is not kept in sync with changes made
    /// directly on the grid.
    pub fn active_view_id(&self) -> Option<&ViewId> {
        self.active_view_id.as_ref()
    }

    pub fn active_view(&self) -> Option<&View<S>> {
        self.active_view_id.as_ref().and_then(|id| self.views.get(id))
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn menu_anchor(&self) -> Option<&A> {
        self.menu_anchor.as_ref()
    }

    /// The menu is only displayable once it has been asked to open *and* has something to anchor
    /// to.
    pub fn can_open(&self) -> bool {
        self.menu_open && self.menu_anchor.is_some()
    }

    pub fn popup_id(&self) -> Option<&'static str> {
        self.can_open().then_some(POPUP_ID)
    }

    pub fn is_draft_label_valid(&self) -> bool {
        is_label_valid(&self.draft_label, &self.views)
    }

    /// Apply `action` in place.
    pub fn dispatch(&mut self, action: Action<S, A>) {
        let state = std::mem::take(self);
        *self = reduce(state, action);
    }
}

/// Everything that can happen to a [`ViewStoreState`].
#[derive(Debug, PartialEq, Clone)]
pub enum Action<S, A = ()> {
    /// Replace the whole state, e.g. with one restored from storage by
    /// [`crate::ViewController::reload`].
    Hydrate(ViewStoreState<S, A>),
    /// Save `snapshot` under the current draft label.
    CreateView { id: ViewId, snapshot: S },
    DeleteView(ViewId),
    /// `None` deselects.
    SetActiveView(Option<ViewId>),
    SetDraftLabel(String),
    /// Toggles the menu and (re-)anchors it.
    OpenMenu(A),
    CloseMenu,
}

impl<S, A> Action<S, A> {
    /// A `CreateView` with a freshly generated id.
    pub fn create_view(snapshot: S) -> Self {
        Action::CreateView {
            id: ViewId::new(),
            snapshot,
        }
    }
}

/// Keys the open menu reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Tab,
    Escape,
    Other,
}

impl MenuKey {
    pub fn closes_menu(&self) -> bool {
        matches!(self, MenuKey::Tab | MenuKey::Escape)
    }

    /// Tab would otherwise move focus out of the menu.
    pub fn suppresses_default(&self) -> bool {
        matches!(self, MenuKey::Tab)
    }
}

/// Compute the state which follows `state` once `action` has happened. Never fails.
pub fn reduce<S, A>(
    mut state: ViewStoreState<S, A>,
    action: Action<S, A>,
) -> ViewStoreState<S, A> {
    match action {
        Action::Hydrate(hydrated) => return hydrated,
        Action::CreateView { id, snapshot } => {
            let label = std::mem::take(&mut state.draft_label);
            state.views.insert(id, View { label, snapshot });
            state.active_view_id = Some(id);
            state.menu_open = false;
        }
        Action::DeleteView(id) => {
            state.views.shift_remove(&id);
            if state.active_view_id == Some(id) {
                state.active_view_id = state.views.keys().next().copied();
            }
        }
        Action::SetActiveView(id) => {
            state.active_view_id = id;
            state.menu_open = false;
        }
        Action::SetDraftLabel(label) => state.draft_label = label,
        Action::OpenMenu(anchor) => {
            state.menu_open = !state.menu_open;
            state.menu_anchor = Some(anchor);
        }
        Action::CloseMenu => state.menu_open = false,
    }
    state
}
