// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

// Deterministic grids and rosters for the render benches (no RNG).

use std::rc::Rc;

use tabgrid::config::TabConfig;
use tabgrid::manager::TabManager;
use tabgrid::model::{EntryId, TextEntry, ViewerId};
use tabgrid::render::MemorySink;
use tabgrid::schedule::TickScheduler;
use tabgrid::view::TabView;

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Compact,
    Default,
    Large,
}

impl Case {
    pub const ALL: [Case; 3] = [Case::Compact, Case::Default, Case::Large];

    pub fn id(self) -> &'static str {
        match self {
            Case::Compact => "4x3",
            Case::Default => "4x20",
            Case::Large => "8x40",
        }
    }

    fn config(self) -> TabConfig {
        let (width, height) = match self {
            Case::Compact => (4, 3),
            Case::Default => (4, 20),
            Case::Large => (8, 40),
        };
        TabConfig {
            width,
            height,
            coalesce_renders: false,
        }
    }
}

pub struct Scene {
    pub manager: TabManager,
    pub view: TabView,
    pub sink: MemorySink,
    pub roster: Vec<Rc<TextEntry>>,
}

pub fn roster(len: usize) -> Vec<Rc<TextEntry>> {
    (0..len)
        .map(|n| {
            let id = EntryId::new(format!("player:{n}")).expect("player id");
            TextEntry::shared(id, format!("Player {n}"))
        })
        .collect()
}

/// Enabled view with every body slot holding a roster entry, already rendered once.
pub fn scene(case: Case) -> Scene {
    let manager = TabManager::new(case.config(), Rc::new(TickScheduler::new()));
    let sink = MemorySink::new();
    let view = manager.create_view(ViewerId::new("bench").expect("viewer id"), sink.clone());
    view.enable(&manager);

    let roster = roster(manager.grid().size());
    for (slot, entry) in roster.iter().enumerate() {
        view.set_slot(slot, Some(entry.as_entry())).expect("set_slot");
    }
    view.render();
    sink.take();

    Scene {
        manager,
        view,
        sink,
        roster,
    }
}
