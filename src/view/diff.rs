// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;

use tracing::trace;

use super::ViewState;
use crate::model::{same_entry, EntryId, EntryRef, TabEntry};
use crate::render::TabRender;

type Pending = HashMap<EntryId, (usize, EntryRef)>;

impl ViewState {
    pub(crate) fn render(&mut self) {
        if self.manager.is_none() {
            return;
        }

        let mut render = TabRender::new(self.viewer().clone());
        self.render_layout(&mut render);
        self.render_content(&mut render);
        self.mark_slots_clean();
        self.render_header_footer(&mut render, false);

        let ops = render.len();
        if render.finish(self.sink.as_mut()) {
            trace!(viewer = %self.viewer(), ops, "frame flushed");
        }
    }

    /// Single pass over the body slots. Moves are emitted as soon as both ends are known;
    /// leftover removals and additions follow, each in slot order.
    pub(super) fn render_layout(&mut self, render: &mut TabRender) {
        if self.manager.is_none() || !self.signals.take_layout() {
            return;
        }

        let mut removals = Pending::new();
        let mut additions = Pending::new();

        for index in 0..self.grid.size() {
            let desired = self.slots[index].clone();
            let Some(previous) = self.rendered[index].replace(desired.clone()) else {
                render.create_slot(desired, index);
                continue;
            };
            if same_entry(&*previous, &*desired) {
                continue;
            }

            if !desired.is_blank() {
                match removals.remove(desired.id()) {
                    Some((from, _)) => render.change_slot(desired, from, index),
                    None => {
                        additions.insert(desired.id().clone(), (index, desired));
                    }
                }
            }
            if !previous.is_blank() {
                match additions.remove(previous.id()) {
                    Some((to, _)) => render.change_slot(previous, index, to),
                    None => {
                        removals.insert(previous.id().clone(), (index, previous));
                    }
                }
            }
        }

        for (slot, entry) in by_slot(removals) {
            render.remove_entry(entry, slot);
        }
        for (slot, entry) in by_slot(additions) {
            render.add_entry(entry, slot);
        }
    }

    /// Update every dirty body entry whose slot the layout phase left alone.
    pub(super) fn render_content(&mut self, render: &mut TabRender) {
        if self.manager.is_none() || !self.signals.take_content() {
            return;
        }

        let viewer = self.signals.viewer();
        for (index, entry) in self.slots[..self.grid.size()].iter().enumerate() {
            if !render.touched(index) && entry.is_dirty(viewer) {
                render.update_entry(entry.clone(), index);
            }
        }
    }

    pub(super) fn mark_slots_clean(&self) {
        let viewer = self.signals.viewer();
        for entry in &self.slots {
            entry.mark_clean(viewer);
        }
    }

    pub(super) fn render_header_footer(&mut self, render: &mut TabRender, force: bool) {
        if self.manager.is_none() {
            return;
        }
        let dirty = self.signals.take_header_footer();
        if !dirty && !force {
            return;
        }

        let header_slot = self.grid.header_slot();
        let footer_slot = self.grid.footer_slot();
        let header = self.slots[header_slot].clone();
        let footer = self.slots[footer_slot].clone();

        let viewer = self.signals.viewer();
        header.mark_clean(viewer);
        footer.mark_clean(viewer);

        self.rendered[header_slot] = Some(header.clone());
        self.rendered[footer_slot] = Some(footer.clone());
        render.set_header_footer(header, footer);
    }
}

fn by_slot(pending: Pending) -> Vec<(usize, EntryRef)> {
    let mut ordered = pending.into_values().collect::<Vec<_>>();
    ordered.sort_unstable_by_key(|(slot, _)| *slot);
    ordered
}
