//! The grid widget, as far as saved views are concerned: something which can describe its current
//! visual configuration and be told to take on another one.

use std::cell::{Cell, RefCell};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::{GridViewsError, GridViewsResult};

/// Provide an implementation of a grid widget.
///
/// Both methods should fail with [`GridViewsError::NotReady`] when no live widget instance is
/// bound. Any other failure (e.g. a snapshot which no longer fits the grid's columns) should be
/// reported as [`GridViewsError::WidgetError`] and affects only that call.
pub trait GridWidget {
    /// The opaque configuration blob. Saved views store and forward this untouched.
    type Snapshot: Clone;

    /// Describe the current columns, filters, sorting, pagination, density ...
    fn capture_snapshot(&self) -> GridViewsResult<Self::Snapshot>;

    /// Reconfigure the display to match `snapshot`.
    fn apply_snapshot(&self, snapshot: &Self::Snapshot) -> GridViewsResult<()>;
}

/// What the [`TestWidget`] is currently displaying.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TestSnapshot {
    pub columns: Vec<String>,
    pub sort: Option<String>,
    pub page_size: Option<u32>,
    pub density: Option<String>,
}

impl TestSnapshot {
    pub fn with_columns(columns: &[&str]) -> Self {
        TestSnapshot {
            columns: columns.iter().map(|&column| column.to_owned()).collect(),
            ..Default::default()
        }
    }
}

/// An in-memory grid to unit test the controller.
///
/// Hardcoded cases: a snapshot containing a column named `FAIL` cannot be applied, and a widget
/// which has been `unbind`-ed is not ready.
#[derive(Debug, Default)]
pub struct TestWidget {
    display: RefCell<TestSnapshot>,
    unbound: Cell<bool>,
    applied: Cell<usize>,
}

impl TestWidget {
    pub fn new(display: TestSnapshot) -> Self {
        TestWidget {
            display: RefCell::new(display),
            ..Default::default()
        }
    }

    /// What the user currently sees.
    pub fn display(&self) -> TestSnapshot {
        self.display.borrow().clone()
    }

    /// Simulate the user reconfiguring the grid directly.
    pub fn reconfigure(&self, display: TestSnapshot) {
        *self.display.borrow_mut() = display;
    }

    pub fn unbind(&self) {
        self.unbound.set(true);
    }

    /// Number of snapshots successfully applied so far.
    pub fn applied(&self) -> usize {
        self.applied.get()
    }
}

impl GridWidget for TestWidget {
    type Snapshot = TestSnapshot;

    fn capture_snapshot(&self) -> GridViewsResult<TestSnapshot> {
        if self.unbound.get() {
            return Err(GridViewsError::NotReady);
        }
        Ok(self.display())
    }

    fn apply_snapshot(&self, snapshot: &TestSnapshot) -> GridViewsResult<()> {
        if self.unbound.get() {
            return Err(GridViewsError::NotReady);
        }
        if snapshot.columns.iter().any(|column| column == "FAIL") {
            return Err(anyhow!("Incompatible snapshot: unknown column FAIL").into());
        }
        self.reconfigure(snapshot.clone());
        self.applied.set(self.applied.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_current_display() {
        let widget = TestWidget::new(TestSnapshot::with_columns(&["name", "price"]));
        let snapshot = widget.capture_snapshot().unwrap();
        assert_eq!(snapshot.columns, vec!["name", "price"]);
        assert_eq!(snapshot.sort, None);
    }

    #[test]
    fn apply_reconfigures() {
        let widget = TestWidget::default();
        let snapshot = TestSnapshot {
            sort: Some("price desc".into()),
            ..TestSnapshot::with_columns(&["price"])
        };
        widget.apply_snapshot(&snapshot).unwrap();
        assert_eq!(widget.display(), snapshot);
        assert_eq!(widget.applied(), 1);
    }

    #[test]
    fn incompatible_snapshot() {
        let widget = TestWidget::new(TestSnapshot::with_columns(&["name"]));
        let err = widget
            .apply_snapshot(&TestSnapshot::with_columns(&["FAIL"]))
            .unwrap_err();
        assert_eq!(
            format!("{}", err),
            "widget error: Incompatible snapshot: unknown column FAIL"
        );
        assert_eq!(widget.display(), TestSnapshot::with_columns(&["name"]));
        assert_eq!(widget.applied(), 0);
    }

    #[test]
    fn unbound_widget_not_ready() {
        let widget = TestWidget::default();
        widget.unbind();
        assert!(matches!(
            widget.capture_snapshot(),
            Err(GridViewsError::NotReady)
        ));
        assert!(matches!(
            widget.apply_snapshot(&TestSnapshot::default()),
            Err(GridViewsError::NotReady)
        ));
    }
}
