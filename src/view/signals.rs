// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::{Cell, RefCell};
use std::rc::Weak;

use tracing::trace;

use super::grid::SlotRegion;
use crate::manager::{ManagerInner, TabManager};
use crate::model::ViewerId;

/// Snapshot of a view's three dirty axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyState {
    pub layout: bool,
    pub content: bool,
    pub header_footer: bool,
}

impl DirtyState {
    pub fn any(&self) -> bool {
        self.layout || self.content || self.header_footer
    }
}

/// Dirty flags of one view, shared with the entries it shows.
///
/// Entries reach a view only through this cell, so a content change never needs to borrow the
/// view itself. Every false-to-true transition notifies the bound manager.
#[derive(Debug)]
pub struct ViewSignals {
    viewer: ViewerId,
    layout: Cell<bool>,
    content: Cell<bool>,
    header_footer: Cell<bool>,
    manager: RefCell<Option<Weak<ManagerInner>>>,
}

impl ViewSignals {
    pub(crate) fn new(viewer: ViewerId) -> Self {
        Self {
            viewer,
            layout: Cell::new(false),
            content: Cell::new(false),
            header_footer: Cell::new(false),
            manager: RefCell::new(None),
        }
    }

    pub fn viewer(&self) -> &ViewerId {
        &self.viewer
    }

    pub fn snapshot(&self) -> DirtyState {
        DirtyState {
            layout: self.layout.get(),
            content: self.content.get(),
            header_footer: self.header_footer.get(),
        }
    }

    pub(crate) fn bind(&self, manager: Weak<ManagerInner>) {
        *self.manager.borrow_mut() = Some(manager);
    }

    pub(crate) fn unbind(&self) {
        self.manager.borrow_mut().take();
        self.layout.set(false);
        self.content.set(false);
        self.header_footer.set(false);
    }

    pub(crate) fn invalidate_layout_and_content(&self) {
        if !self.layout.get() || !self.content.get() {
            self.layout.set(true);
            self.content.set(true);
            self.notify("layout");
        }
    }

    pub(crate) fn invalidate_content(&self) {
        if !self.content.replace(true) {
            self.notify("content");
        }
    }

    pub(crate) fn invalidate_header_footer(&self) {
        if !self.header_footer.replace(true) {
            self.notify("header_footer");
        }
    }

    pub(crate) fn invalidate_region(&self, region: SlotRegion) {
        match region {
            SlotRegion::Body => self.invalidate_content(),
            SlotRegion::HeaderFooter => self.invalidate_header_footer(),
        }
    }

    pub(crate) fn take_layout(&self) -> bool {
        self.layout.replace(false)
    }

    pub(crate) fn take_content(&self) -> bool {
        self.content.replace(false)
    }

    pub(crate) fn take_header_footer(&self) -> bool {
        self.header_footer.replace(false)
    }

    fn notify(&self, axis: &'static str) {
        trace!(viewer = %self.viewer, axis, "view invalidated");
        let manager = self.manager.borrow().as_ref().and_then(Weak::upgrade);
        if let Some(inner) = manager {
            TabManager::from_inner(inner).invalidate();
        }
    }
}
