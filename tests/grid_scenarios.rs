// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::json;
use tabgrid::config::{ConfigError, TabConfig};
use tabgrid::manager::TabManager;
use tabgrid::model::{EntryId, TabEntry, TextEntry, ViewerId};
use tabgrid::render::{Frame, FrameStats, MemorySink, OpKind, RenderOp};
use tabgrid::schedule::TickScheduler;
use tabgrid::view::TabView;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("grid_scenarios")
}

fn load_config(name: &str) -> TabConfig {
    let path = fixtures_dir().join(name);
    TabConfig::load(&path).unwrap_or_else(|err| panic!("failed to load {path:?}: {err}"))
}

fn player(n: usize) -> Rc<TextEntry> {
    TextEntry::shared(EntryId::new(format!("player:{n}")).unwrap(), format!("Player {n}"))
}

fn open_view(manager: &TabManager, name: &str) -> (TabView, MemorySink) {
    let sink = MemorySink::new();
    let view = manager.create_view(ViewerId::new(name).unwrap(), sink.clone());
    view.enable(manager);
    (view, sink)
}

fn kinds(frame: &Frame) -> Vec<OpKind> {
    frame.ops().iter().map(RenderOp::kind).collect()
}

#[test]
fn roster_reshuffle_reaches_every_viewer_in_one_tick() {
    let scheduler = Rc::new(TickScheduler::new());
    let manager = TabManager::new(load_config("compact.json"), scheduler.clone());
    let (alice, alice_sink) = open_view(&manager, "alice");
    let (bob, bob_sink) = open_view(&manager, "bob");

    let roster = (0..4).map(player).collect::<Vec<_>>();
    for (slot, entry) in roster.iter().enumerate() {
        alice.set_slot(slot, Some(entry.as_entry())).unwrap();
        bob.set_slot(11 - slot, Some(entry.as_entry())).unwrap();
    }

    assert_eq!(scheduler.run_pending(), 1);
    let first = alice_sink.take();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].ops().len(), 13);
    assert_eq!(bob_sink.take().len(), 1);

    // Player 0 climbs to the bottom of alice's first column; its score changes in the same tick.
    alice.set_slot(2, Some(roster[0].as_entry())).unwrap();
    roster[0].set_text("Player 0 (12 points)");
    assert_eq!(scheduler.pending(), 1);
    scheduler.run_pending();

    let alice_frames = alice_sink.take();
    assert_eq!(alice_frames.len(), 1);
    let record = serde_json::to_value(alice_frames[0].record()).unwrap();
    assert_eq!(
        record,
        json!({
            "viewer": "alice",
            "ops": [
                { "kind": "move", "entry": "player:0", "text": "Player 0 (12 points)", "slot": 0, "to": 2 },
                { "kind": "remove", "entry": "player:2", "text": "Player 2", "slot": 2 },
            ]
        })
    );

    let bob_frames = bob_sink.take();
    assert_eq!(bob_frames.len(), 1);
    assert_eq!(kinds(&bob_frames[0]), vec![OpKind::Update]);
    assert_eq!(bob.slot_of(&*roster[0]), Some(11));
    assert!(!roster[2].shown_in(&alice.viewer()));
}

#[test]
fn leaving_viewer_is_torn_down_without_disturbing_others() {
    let scheduler = Rc::new(TickScheduler::new());
    let manager = TabManager::new(load_config("compact.json"), scheduler.clone());
    let (alice, alice_sink) = open_view(&manager, "alice");
    let (bob, bob_sink) = open_view(&manager, "bob");
    let shared = player(7);
    alice.set_slot(5, Some(shared.as_entry())).unwrap();
    bob.set_slot(5, Some(shared.as_entry())).unwrap();
    scheduler.run_pending();
    alice_sink.take();
    bob_sink.take();

    assert!(manager.remove_view(&bob));
    let teardown = bob_sink.take();
    assert_eq!(teardown.len(), 1);
    assert_eq!(teardown[0].ops()[0].kind(), OpKind::SetHeaderFooter);
    assert!(teardown[0].ops()[1..]
        .iter()
        .all(|op| op.kind() == OpKind::Destroy));
    assert_eq!(manager.view_count(), 1);

    shared.set_text("Player 7 (afk)");
    scheduler.run_pending();
    assert_eq!(alice_sink.take().len(), 1);
    assert!(bob_sink.is_empty());
    assert_eq!(shared.links().viewers(), vec![alice.viewer()]);
}

#[test]
fn manual_grid_renders_only_on_request() {
    let scheduler = Rc::new(TickScheduler::new());
    let manager = TabManager::new(load_config("manual.json"), scheduler.clone());
    assert_eq!(manager.grid().size(), 10);

    let (view, sink) = open_view(&manager, "carol");
    view.set_slot_at(1, 4, Some(player(1).as_entry())).unwrap();
    assert_eq!(scheduler.pending(), 0);
    assert!(sink.is_empty());

    assert_eq!(manager.render_dirty(), 1);
    let frames = sink.take();
    let stats = FrameStats::collect(&frames);
    assert_eq!(stats.frames, 1);
    assert_eq!(stats.ops, 11);
    assert_eq!(
        frames[0].ops()[9].record().entry.as_deref(),
        Some("player:1")
    );
}

#[test]
fn respawn_forces_a_refresh_of_every_live_slot() {
    let scheduler = Rc::new(TickScheduler::new());
    let manager = TabManager::new(load_config("compact.json"), scheduler.clone());
    let (view, sink) = open_view(&manager, "dave");
    scheduler.run_pending();
    sink.take();

    view.on_context_change(&view.viewer());
    scheduler.run_pending();

    let frames = sink.take();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].ops().len(), 12);
    assert!(kinds(&frames[0]).iter().all(|kind| *kind == OpKind::Refresh));
}

#[test]
fn zero_sized_grid_config_is_rejected() {
    let err = TabConfig::load(fixtures_dir().join("zero_width.json")).unwrap_err();
    assert!(matches!(err, ConfigError::ZeroDimension { width: 0, height: 5 }));
}
