// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::Serialize;

use super::ids::{EntryId, ViewerId};
use crate::view::{SlotRegion, ViewSignals};

/// Shared handle to an entry. Views hold these in their slot arrays; many views may hold the
/// same entry at once.
pub type EntryRef = Rc<dyn TabEntry>;

/// Display payload of an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct EntryContent {
    text: String,
}

impl EntryContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Capability contract shared by real content and blank placeholders.
///
/// An entry only knows which views show it and whether its content is stale there. It never
/// learns slot indices and never controls a view's lifetime.
pub trait TabEntry: fmt::Debug {
    fn id(&self) -> &EntryId;

    fn content(&self) -> EntryContent;

    fn links(&self) -> &ViewLinks;

    /// Slot index of a canonical blank; `None` for real content.
    fn blank_index(&self) -> Option<usize> {
        None
    }

    fn is_blank(&self) -> bool {
        self.blank_index().is_some()
    }

    /// Record that `view` shows this entry in `region`. Re-adding updates the region and keeps
    /// the current dirty bit.
    fn add_to_view(&self, view: &Rc<ViewSignals>, region: SlotRegion) {
        self.links().link(view, region);
    }

    /// Forget `viewer`. Absent viewers are ignored.
    fn remove_from_view(&self, viewer: &ViewerId) {
        self.links().unlink(viewer);
    }

    fn is_dirty(&self, viewer: &ViewerId) -> bool {
        self.links().is_dirty(viewer)
    }

    fn mark_clean(&self, viewer: &ViewerId) {
        self.links().mark_clean(viewer);
    }

    fn shown_in(&self, viewer: &ViewerId) -> bool {
        self.links().contains(viewer)
    }
}

/// Entry identity. Blanks are equal only to the blank of the same index; real entries are
/// equal when their ids are, so two handles with one id are the same entry. A real entry never
/// equals a blank, whatever its id.
pub fn same_entry(a: &dyn TabEntry, b: &dyn TabEntry) -> bool {
    match (a.blank_index(), b.blank_index()) {
        (Some(a), Some(b)) => a == b,
        (None, None) => a.id() == b.id(),
        _ => false,
    }
}

/// Whether `a` and `b` are the very same handle, not just the same entry.
pub(crate) fn same_handle(a: &EntryRef, b: &EntryRef) -> bool {
    Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}

#[derive(Debug)]
struct Placement {
    region: SlotRegion,
    dirty: bool,
    signals: Weak<ViewSignals>,
}

/// Back-reference registry kept inside every entry: which views show it, in which region, and
/// whether its content is stale for each of them.
///
/// The links are non-owning. A view that is dropped without being disabled leaves a dead
/// `Weak` behind until it unlinks itself on drop.
#[derive(Debug, Default)]
pub struct ViewLinks {
    placements: RefCell<BTreeMap<ViewerId, Placement>>,
}

impl ViewLinks {
    pub fn new() -> Self {
        Self::default()
    }

    fn link(&self, view: &Rc<ViewSignals>, region: SlotRegion) {
        let mut placements = self.placements.borrow_mut();
        match placements.get_mut(view.viewer()) {
            Some(placement) => {
                placement.region = region;
                placement.signals = Rc::downgrade(view);
            }
            None => {
                placements.insert(
                    view.viewer().clone(),
                    Placement {
                        region,
                        dirty: false,
                        signals: Rc::downgrade(view),
                    },
                );
            }
        }
    }

    fn unlink(&self, viewer: &ViewerId) -> bool {
        self.placements.borrow_mut().remove(viewer).is_some()
    }

    pub fn contains(&self, viewer: &ViewerId) -> bool {
        self.placements.borrow().contains_key(viewer)
    }

    pub fn is_dirty(&self, viewer: &ViewerId) -> bool {
        self.placements
            .borrow()
            .get(viewer)
            .is_some_and(|placement| placement.dirty)
    }

    pub fn mark_clean(&self, viewer: &ViewerId) {
        if let Some(placement) = self.placements.borrow_mut().get_mut(viewer) {
            placement.dirty = false;
        }
    }

    pub(crate) fn mark_dirty(&self, viewer: &ViewerId) {
        if let Some(placement) = self.placements.borrow_mut().get_mut(viewer) {
            placement.dirty = true;
        }
    }

    pub fn region(&self, viewer: &ViewerId) -> Option<SlotRegion> {
        self.placements.borrow().get(viewer).map(|placement| placement.region)
    }

    pub fn viewers(&self) -> Vec<ViewerId> {
        self.placements.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.placements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.borrow().is_empty()
    }

    /// Mark the entry stale in every view that shows it and escalate to those views.
    pub fn invalidate_content(&self) {
        // Collect first: escalation reaches the manager, which must not observe a held borrow.
        let targets = {
            let mut placements = self.placements.borrow_mut();
            placements
                .values_mut()
                .map(|placement| {
                    placement.dirty = true;
                    (placement.signals.clone(), placement.region)
                })
                .collect::<Vec<_>>()
        };

        for (signals, region) in targets {
            if let Some(signals) = signals.upgrade() {
                signals.invalidate_region(region);
            }
        }
    }
}

/// An entry carrying real, mutable display content.
#[derive(Debug)]
pub struct TextEntry {
    id: EntryId,
    content: RefCell<EntryContent>,
    links: ViewLinks,
}

impl TextEntry {
    pub fn new(id: EntryId, text: impl Into<String>) -> Self {
        Self {
            id,
            content: RefCell::new(EntryContent::new(text)),
            links: ViewLinks::new(),
        }
    }

    pub fn shared(id: EntryId, text: impl Into<String>) -> Rc<Self> {
        Rc::new(Self::new(id, text))
    }

    pub fn as_entry(self: &Rc<Self>) -> EntryRef {
        self.clone()
    }

    pub fn text(&self) -> String {
        self.content.borrow().text().to_owned()
    }

    /// Replace the text. Returns `false` (and notifies nobody) if the text is unchanged.
    pub fn set_text(&self, text: impl Into<String>) -> bool {
        let next = EntryContent::new(text);
        {
            let mut content = self.content.borrow_mut();
            if *content == next {
                return false;
            }
            *content = next;
        }
        self.links.invalidate_content();
        true
    }
}

impl TabEntry for TextEntry {
    fn id(&self) -> &EntryId {
        &self.id
    }

    fn content(&self) -> EntryContent {
        self.content.borrow().clone()
    }

    fn links(&self) -> &ViewLinks {
        &self.links
    }
}

/// Canonical placeholder for one slot index. Its content never changes.
#[derive(Debug)]
pub struct BlankEntry {
    id: EntryId,
    index: usize,
    links: ViewLinks,
}

impl BlankEntry {
    pub(crate) fn new(id: EntryId, index: usize) -> Self {
        Self {
            id,
            index,
            links: ViewLinks::new(),
        }
    }
}

impl TabEntry for BlankEntry {
    fn id(&self) -> &EntryId {
        &self.id
    }

    fn content(&self) -> EntryContent {
        EntryContent::default()
    }

    fn links(&self) -> &ViewLinks {
        &self.links
    }

    fn blank_index(&self) -> Option<usize> {
        Some(self.index)
    }
}
