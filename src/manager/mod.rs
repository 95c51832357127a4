// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Coordination of the views of one scope.
//!
//! The manager owns the blank registry and the live view set, and turns view invalidations into
//! one coalesced render pass per tick.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::config::TabConfig;
use crate::model::{EntryRef, ViewerId};
use crate::render::FrameSink;
use crate::schedule::{Scheduler, TaskHandle};
use crate::view::{GridSize, TabView, ViewState};

mod blanks;

pub use blanks::BlankRegistry;

pub(crate) struct ManagerInner {
    config: TabConfig,
    blanks: BlankRegistry,
    views: RefCell<BTreeMap<ViewerId, Weak<RefCell<ViewState>>>>,
    scheduler: Rc<dyn Scheduler>,
    pending_pass: RefCell<Option<TaskHandle>>,
}

impl fmt::Debug for ManagerInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerInner")
            .field("config", &self.config)
            .field("blanks", &self.blanks.len())
            .field("views", &self.views.borrow().keys().collect::<Vec<_>>())
            .field("pending_pass", &self.pending_pass.borrow().is_some())
            .finish()
    }
}

/// Cheap-clone handle to a manager. Clones share the same state.
#[derive(Debug, Clone)]
pub struct TabManager {
    inner: Rc<ManagerInner>,
}

impl TabManager {
    pub fn new(config: TabConfig, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            inner: Rc::new(ManagerInner {
                config,
                blanks: BlankRegistry::new(),
                views: RefCell::new(BTreeMap::new()),
                scheduler,
                pending_pass: RefCell::new(None),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<ManagerInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ManagerInner> {
        Rc::downgrade(&self.inner)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn config(&self) -> &TabConfig {
        &self.inner.config
    }

    pub fn grid(&self) -> GridSize {
        self.inner.config.grid()
    }

    pub(crate) fn scheduler(&self) -> &dyn Scheduler {
        self.inner.scheduler.as_ref()
    }

    /// Canonical blank for `slot`. Repeated calls return the same entry.
    pub fn blank_entry(&self, slot: usize) -> EntryRef {
        self.inner.blanks.get(slot)
    }

    /// Create a disabled view sized from this manager's configuration.
    pub fn create_view(&self, viewer: ViewerId, sink: impl FrameSink + 'static) -> TabView {
        TabView::new(viewer, self.grid(), sink)
    }

    pub(crate) fn register_view(&self, viewer: &ViewerId, state: Weak<RefCell<ViewState>>) {
        let previous = self.inner.views.borrow_mut().insert(viewer.clone(), state);
        if previous.is_some_and(|previous| previous.strong_count() > 0) {
            warn!(viewer = %viewer, "replacing a live view registered for the same viewer");
        }
    }

    pub(crate) fn unregister_view(&self, viewer: &ViewerId, state: &Rc<RefCell<ViewState>>) {
        let mut views = self.inner.views.borrow_mut();
        let tracked = views
            .get(viewer)
            .is_some_and(|registered| registered.as_ptr() == Rc::as_ptr(state));
        if tracked {
            views.remove(viewer);
        }
    }

    /// Disable `view` if this manager tracks it. Returns whether it was tracked.
    pub fn remove_view(&self, view: &TabView) -> bool {
        if !self.is_tracking(view) {
            return false;
        }
        view.disable();
        true
    }

    pub fn is_tracking(&self, view: &TabView) -> bool {
        self.inner
            .views
            .borrow()
            .get(&view.viewer())
            .is_some_and(|registered| view.is_state(registered))
    }

    pub fn view(&self, viewer: &ViewerId) -> Option<TabView> {
        self.inner
            .views
            .borrow()
            .get(viewer)
            .and_then(Weak::upgrade)
            .map(TabView::from_state)
    }

    pub fn views(&self) -> Vec<TabView> {
        self.live_states().into_iter().map(TabView::from_state).collect()
    }

    pub fn view_count(&self) -> usize {
        self.live_states().len()
    }

    pub fn is_pass_pending(&self) -> bool {
        self.inner.pending_pass.borrow().is_some()
    }

    /// Note that some view changed. Schedules one render pass unless one is already pending.
    pub fn invalidate(&self) {
        if !self.inner.config.coalesce_renders {
            return;
        }
        if self.is_pass_pending() {
            return;
        }

        trace!("scheduling coalesced render pass");
        let manager = self.downgrade();
        let handle = self.scheduler().run_once(Box::new(move || {
            if let Some(inner) = manager.upgrade() {
                let manager = TabManager::from_inner(inner);
                manager.inner.pending_pass.borrow_mut().take();
                manager.render_dirty();
            }
        }));
        if !handle.has_started() {
            *self.inner.pending_pass.borrow_mut() = Some(handle);
        }
    }

    /// Drop a scheduled pass, if any. Dirty views stay dirty.
    pub fn cancel_pending_pass(&self) {
        if let Some(handle) = self.inner.pending_pass.borrow_mut().take() {
            handle.cancel();
        }
    }

    /// Render every live dirty view once. Returns how many views rendered.
    pub fn render_dirty(&self) -> usize {
        let states = self.live_states();
        let mut rendered = 0;
        let mut deferred = 0;

        for state in &states {
            let Ok(mut state) = state.try_borrow_mut() else {
                deferred += 1;
                continue;
            };
            if state.dirty().any() {
                state.render();
                rendered += 1;
            }
        }

        if deferred > 0 {
            warn!(deferred, "views busy during render pass; rescheduling");
            self.invalidate();
        }
        debug!(views = states.len(), rendered, "render pass complete");
        rendered
    }

    fn live_states(&self) -> Vec<Rc<RefCell<ViewState>>> {
        let mut views = self.inner.views.borrow_mut();
        views.retain(|_, state| state.strong_count() > 0);
        views.values().filter_map(Weak::upgrade).collect()
    }
}
