// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Per-client virtualized grid views.
//!
//! A view holds the desired entry for every slot and a snapshot of what the client last
//! received. Mutations only flip dirty flags; a render pass diffs desired against rendered and
//! flushes the result as one frame.
//!
//! The view is always full: once enabled, every slot holds either a real entry or the manager's
//! blank for that index.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::manager::TabManager;
use crate::model::{same_entry, same_handle, EntryRef, TabEntry, ViewerId};
use crate::render::{FrameSink, TabRender};
use crate::schedule::TaskHandle;

mod diff;
mod grid;
mod signals;

pub use grid::{GridSize, SlotRegion};
pub use signals::{DirtyState, ViewSignals};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    NotEnabled {
        viewer: ViewerId,
    },
    SlotOutOfRange {
        slot: usize,
        slot_count: usize,
    },
    CoordinatesOutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnabled { viewer } => write!(f, "view for {viewer} is not enabled"),
            Self::SlotOutOfRange { slot, slot_count } => {
                write!(f, "slot {slot} is out of range (slot_count={slot_count})")
            }
            Self::CoordinatesOutOfRange {
                x,
                y,
                width,
                height,
            } => write!(f, "cell ({x}, {y}) is outside the {width}x{height} grid"),
        }
    }
}

impl std::error::Error for ViewError {}

pub(crate) struct ViewState {
    grid: GridSize,
    signals: Rc<ViewSignals>,
    manager: Option<TabManager>,
    // Empty while disabled, `grid.slot_count()` long while enabled.
    slots: Vec<EntryRef>,
    // `None` means the slot is not live on the client.
    rendered: Vec<Option<EntryRef>>,
    sink: Box<dyn FrameSink>,
    // Shared with the scheduled task so it can reschedule itself while the view is busy.
    refresh_task: Rc<RefCell<Option<TaskHandle>>>,
}

impl fmt::Debug for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewState")
            .field("viewer", self.viewer())
            .field("grid", &self.grid)
            .field("enabled", &self.manager.is_some())
            .field("dirty", &self.dirty())
            .field("refresh_pending", &self.refresh_task.borrow().is_some())
            .finish()
    }
}

impl ViewState {
    fn new(viewer: ViewerId, grid: GridSize, sink: Box<dyn FrameSink>) -> Self {
        Self {
            grid,
            signals: Rc::new(ViewSignals::new(viewer)),
            manager: None,
            slots: Vec::new(),
            rendered: vec![None; grid.slot_count()],
            sink,
            refresh_task: Rc::new(RefCell::new(None)),
        }
    }

    fn viewer(&self) -> &ViewerId {
        self.signals.viewer()
    }

    pub(crate) fn dirty(&self) -> DirtyState {
        self.signals.snapshot()
    }

    fn manager(&self) -> Result<&TabManager, ViewError> {
        self.manager.as_ref().ok_or_else(|| ViewError::NotEnabled {
            viewer: self.viewer().clone(),
        })
    }

    fn check_slot(&self, slot: usize) -> Result<(), ViewError> {
        if slot >= self.grid.slot_count() {
            return Err(ViewError::SlotOutOfRange {
                slot,
                slot_count: self.grid.slot_count(),
            });
        }
        Ok(())
    }

    fn position(&self, entry: &dyn TabEntry) -> Option<usize> {
        self.slots
            .iter()
            .position(|occupant| same_entry(&**occupant, entry))
    }

    fn attach(&mut self, manager: &TabManager) {
        self.manager = Some(manager.clone());
        self.signals.bind(manager.downgrade());

        let grid = self.grid;
        let signals = &self.signals;
        self.slots = (0..grid.slot_count())
            .map(|slot| {
                let blank = manager.blank_entry(slot);
                blank.add_to_view(signals, grid.region(slot));
                blank
            })
            .collect();
        self.rendered.iter_mut().for_each(|rendered| *rendered = None);

        self.signals.invalidate_layout_and_content();
        self.signals.invalidate_header_footer();
        debug!(viewer = %self.viewer(), slots = grid.slot_count(), "view enabled");
    }

    fn detach(&mut self) -> Option<TabManager> {
        let manager = self.manager.take()?;
        self.cancel_refresh();
        self.tear_down(&manager);
        self.release_slots();
        self.signals.unbind();
        debug!(viewer = %self.viewer(), "view disabled");
        Some(manager)
    }

    fn tear_down(&mut self, manager: &TabManager) {
        let mut render = TabRender::new(self.viewer().clone());
        let header = self.grid.header_slot();
        let footer = self.grid.footer_slot();

        if self.rendered[header].is_some() || self.rendered[footer].is_some() {
            render.set_header_footer(manager.blank_entry(header), manager.blank_entry(footer));
        }
        for index in 0..self.grid.size() {
            if let Some(entry) = self.rendered[index].take() {
                render.destroy_slot(entry, index);
            }
        }
        self.rendered[header] = None;
        self.rendered[footer] = None;

        render.finish(self.sink.as_mut());
    }

    fn release_slots(&mut self) {
        let viewer = self.signals.viewer();
        for entry in self.slots.drain(..) {
            entry.remove_from_view(viewer);
        }
    }

    fn set_slot(&mut self, slot: usize, entry: Option<EntryRef>) -> Result<(), ViewError> {
        let manager = self.manager()?.clone();
        self.check_slot(slot)?;

        // Blanks only ever sit in their own slot.
        let entry = match entry {
            Some(entry) if !entry.is_blank() => entry,
            _ => manager.blank_entry(slot),
        };

        let occupant = self.slots[slot].clone();
        if same_entry(&*occupant, &*entry) {
            if same_handle(&occupant, &entry) {
                return Ok(());
            }
            // Same entry behind another handle: relink and resend its content.
            occupant.remove_from_view(self.signals.viewer());
            entry.add_to_view(&self.signals, self.grid.region(slot));
            entry.links().mark_dirty(self.signals.viewer());
            self.slots[slot] = entry;
            self.invalidate_slot(slot);
            return Ok(());
        }

        occupant.remove_from_view(self.signals.viewer());

        if let Some(previous) = self.position(&*entry) {
            let blank = manager.blank_entry(previous);
            blank.add_to_view(&self.signals, self.grid.region(previous));
            let evicted = std::mem::replace(&mut self.slots[previous], blank);
            if !same_handle(&evicted, &entry) {
                evicted.remove_from_view(self.signals.viewer());
            }
            self.invalidate_slot(previous);
        }

        entry.add_to_view(&self.signals, self.grid.region(slot));
        self.slots[slot] = entry;
        self.invalidate_slot(slot);

        debug_assert!(
            self.holds_each_entry_once(),
            "entry placed in more than one slot of {}",
            self.viewer()
        );
        Ok(())
    }

    fn invalidate_slot(&self, slot: usize) {
        match self.grid.region(slot) {
            SlotRegion::Body => self.signals.invalidate_layout_and_content(),
            SlotRegion::HeaderFooter => self.signals.invalidate_header_footer(),
        }
    }

    fn holds_each_entry_once(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.slots.len());
        self.slots
            .iter()
            .all(|entry| seen.insert((entry.blank_index(), entry.id().clone())))
    }

    fn refresh_entry(&mut self, entry: &dyn TabEntry) -> bool {
        if self.manager.is_none() {
            return false;
        }
        let Some(slot) = self.position(entry) else {
            return false;
        };

        let mut render = TabRender::new(self.viewer().clone());
        if slot < self.grid.size() {
            render.refresh_entry(self.slots[slot].clone(), slot);
        } else {
            self.render_header_footer(&mut render, true);
        }
        render.finish(self.sink.as_mut())
    }

    fn cancel_refresh(&self) {
        if let Some(task) = self.refresh_task.borrow_mut().take() {
            task.cancel();
        }
    }

    /// An empty refresh slot means the refresh was cancelled.
    fn run_scheduled_refresh(&mut self) {
        let Some(task) = self.refresh_task.borrow_mut().take() else {
            return;
        };
        if task.is_cancelled() || self.manager.is_none() {
            return;
        }

        let mut render = TabRender::new(self.viewer().clone());
        for (index, entry) in self.rendered[..self.grid.size()].iter().enumerate() {
            if let Some(entry) = entry {
                render.refresh_entry(entry.clone(), index);
            }
        }
        let ops = render.len();
        if render.finish(self.sink.as_mut()) {
            debug!(viewer = %self.viewer(), ops, "forced refresh flushed");
        }
    }
}

impl Drop for ViewState {
    fn drop(&mut self) {
        self.cancel_refresh();
        self.release_slots();
    }
}

/// Handle to one client's view. Clones share the same view.
#[derive(Clone)]
pub struct TabView {
    state: Rc<RefCell<ViewState>>,
}

impl fmt::Debug for TabView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_borrow() {
            Ok(state) => fmt::Debug::fmt(&*state, f),
            Err(_) => f.write_str("TabView { <busy> }"),
        }
    }
}

impl TabView {
    /// Create a disabled view. Frames for this viewer go to `sink`.
    ///
    /// Sinks must not call back into the view that is flushing to them.
    pub fn new(viewer: ViewerId, grid: GridSize, sink: impl FrameSink + 'static) -> Self {
        Self::from_state(Rc::new(RefCell::new(ViewState::new(
            viewer,
            grid,
            Box::new(sink),
        ))))
    }

    pub(crate) fn from_state(state: Rc<RefCell<ViewState>>) -> Self {
        Self { state }
    }

    pub(crate) fn is_state(&self, other: &Weak<RefCell<ViewState>>) -> bool {
        Rc::as_ptr(&self.state) == other.as_ptr()
    }

    pub fn viewer(&self) -> ViewerId {
        self.state.borrow().viewer().clone()
    }

    pub fn grid(&self) -> GridSize {
        self.state.borrow().grid
    }

    pub fn width(&self) -> usize {
        self.grid().width()
    }

    pub fn height(&self) -> usize {
        self.grid().height()
    }

    pub fn size(&self) -> usize {
        self.grid().size()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.borrow().manager.is_some()
    }

    pub fn manager(&self) -> Option<TabManager> {
        self.state.borrow().manager.clone()
    }

    pub fn dirty(&self) -> DirtyState {
        self.state.borrow().dirty()
    }

    /// Bind to `manager`, fill every slot with its blank and force a full first render.
    ///
    /// Enabling under the manager already in use is a no-op; under another manager the view is
    /// disabled first.
    pub fn enable(&self, manager: &TabManager) {
        let already_bound = self
            .state
            .borrow()
            .manager
            .as_ref()
            .is_some_and(|current| current.ptr_eq(manager));
        if already_bound {
            return;
        }

        self.disable();
        manager.register_view(&self.viewer(), Rc::downgrade(&self.state));
        self.state.borrow_mut().attach(manager);
    }

    /// Tear down every live slot, release every entry and detach from the manager.
    pub fn disable(&self) {
        let (viewer, manager) = {
            let mut state = self.state.borrow_mut();
            (state.viewer().clone(), state.detach())
        };
        if let Some(manager) = manager {
            manager.unregister_view(&viewer, &self.state);
        }
    }

    /// Place `entry` in `slot`, or the slot's blank for `None`.
    ///
    /// If the entry already occupies another slot of this view, that slot falls back to its
    /// own blank in the same call.
    pub fn set_slot(&self, slot: usize, entry: Option<EntryRef>) -> Result<(), ViewError> {
        self.state.borrow_mut().set_slot(slot, entry)
    }

    pub fn set_slot_at(&self, x: usize, y: usize, entry: Option<EntryRef>) -> Result<(), ViewError> {
        let grid = self.grid();
        let slot = grid
            .index_at(x, y)
            .ok_or(ViewError::CoordinatesOutOfRange {
                x,
                y,
                width: grid.width(),
                height: grid.height(),
            })?;
        self.set_slot(slot, entry)
    }

    pub fn set_header(&self, entry: Option<EntryRef>) -> Result<(), ViewError> {
        let slot = self.grid().header_slot();
        self.set_slot(slot, entry)
    }

    pub fn set_footer(&self, entry: Option<EntryRef>) -> Result<(), ViewError> {
        let slot = self.grid().footer_slot();
        self.set_slot(slot, entry)
    }

    pub fn slot(&self, slot: usize) -> Result<EntryRef, ViewError> {
        let state = self.state.borrow();
        state.manager()?;
        state.check_slot(slot)?;
        Ok(state.slots[slot].clone())
    }

    /// What the client last received for `slot`, if the slot is live.
    pub fn rendered(&self, slot: usize) -> Option<EntryRef> {
        self.state.borrow().rendered.get(slot).cloned().flatten()
    }

    pub fn slot_of(&self, entry: &dyn TabEntry) -> Option<usize> {
        self.state.borrow().position(entry)
    }

    /// Run all three diff phases and flush the result as one frame.
    pub fn render(&self) {
        self.state.borrow_mut().render();
    }

    pub fn render_layout(&self, render: &mut TabRender) {
        self.state.borrow_mut().render_layout(render);
    }

    pub fn render_content(&self, render: &mut TabRender) {
        self.state.borrow_mut().render_content(render);
    }

    pub fn mark_slots_clean(&self) {
        self.state.borrow().mark_slots_clean();
    }

    pub fn render_header_footer(&self, render: &mut TabRender, force: bool) {
        self.state.borrow_mut().render_header_footer(render, force);
    }

    /// Flush a batch assembled from the split phases to this view's sink.
    pub fn finish(&self, render: TabRender) -> bool {
        render.finish(self.state.borrow_mut().sink.as_mut())
    }

    /// Resend `entry` where this view shows it. Returns whether a frame was flushed.
    pub fn refresh_entry(&self, entry: &dyn TabEntry) -> bool {
        self.state.borrow_mut().refresh_entry(entry)
    }

    /// React to the viewer respawning or changing context by scheduling one forced refresh.
    pub fn on_context_change(&self, viewer: &ViewerId) {
        if *viewer == self.viewer() {
            self.schedule_refresh();
        }
    }

    pub fn is_refresh_pending(&self) -> bool {
        self.state.borrow().refresh_task.borrow().is_some()
    }

    /// Schedule a deferred refresh of every live body slot. At most one is pending at a time;
    /// returns whether a new one was scheduled.
    pub fn schedule_refresh(&self) -> bool {
        let (manager, pending) = {
            let state = self.state.borrow();
            let Some(manager) = state.manager.clone() else {
                return false;
            };
            if state.refresh_task.borrow().is_some() {
                return false;
            }
            (manager, state.refresh_task.clone())
        };

        queue_refresh(&manager, Rc::downgrade(&self.state), pending);
        true
    }
}

/// Queue a forced refresh and record its handle in `pending`. A run that finds the view busy
/// queues itself again, unless the refresh was cancelled in the meantime.
fn queue_refresh(
    manager: &TabManager,
    view: Weak<RefCell<ViewState>>,
    pending: Rc<RefCell<Option<TaskHandle>>>,
) {
    let retry_manager = manager.downgrade();
    let task_pending = pending.clone();
    let handle = manager.scheduler().run_once(Box::new(move || {
        let Some(shared) = view.upgrade() else {
            return;
        };
        let Ok(mut state) = shared.try_borrow_mut() else {
            if task_pending.borrow().is_none() {
                return;
            }
            match retry_manager.upgrade() {
                Some(inner) => {
                    warn!("view busy when its scheduled refresh ran; rescheduling");
                    queue_refresh(&TabManager::from_inner(inner), view, task_pending);
                }
                None => {
                    task_pending.borrow_mut().take();
                }
            }
            return;
        };
        state.run_scheduled_refresh();
    }));
    if !handle.has_started() {
        *pending.borrow_mut() = Some(handle);
    }
}
