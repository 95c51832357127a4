// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tabgrid demo host.
//!
//! Simulates a few viewers sharing a roster of player entries, drives the coalesced render pass
//! from a tick loop and prints every flushed frame to stdout as one JSON object per line.
//! Logs go to stderr and honor `RUST_LOG`.

use std::error::Error;
use std::io::{self, Write};
use std::rc::Rc;

use tabgrid::config::TabConfig;
use tabgrid::manager::TabManager;
use tabgrid::model::{EntryId, TextEntry, ViewerId};
use tabgrid::render::{FrameStats, MemorySink};
use tabgrid::schedule::TickScheduler;
use tabgrid::view::TabView;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_VIEWERS: usize = 2;
const DEFAULT_TICKS: usize = 5;
const MAX_PLAYERS: usize = 8;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--config <path>] [--viewers <n>] [--ticks <n>]\n\n--config reads grid settings from a JSON file (defaults: 4x20, coalesced renders).\n--viewers sets how many simulated clients get a view (default {DEFAULT_VIEWERS}, at least 1).\n--ticks sets how many simulation ticks run (default {DEFAULT_TICKS})."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: Option<String>,
    viewers: Option<usize>,
    ticks: Option<usize>,
}

fn parse_count(raw: Option<String>) -> Result<usize, ()> {
    raw.ok_or(())?.parse().map_err(|_| ())
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                if options.config_path.is_some() {
                    return Err(());
                }
                options.config_path = Some(args.next().ok_or(())?);
            }
            "--viewers" => {
                if options.viewers.is_some() {
                    return Err(());
                }
                let viewers = parse_count(args.next())?;
                if viewers == 0 {
                    return Err(());
                }
                options.viewers = Some(viewers);
            }
            "--ticks" => {
                if options.ticks.is_some() {
                    return Err(());
                }
                options.ticks = Some(parse_count(args.next())?);
            }
            _ => return Err(()),
        }
    }

    Ok(options)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

struct Client {
    view: TabView,
    sink: MemorySink,
    footer: Rc<TextEntry>,
}

fn entry(id: String, text: String) -> Result<Rc<TextEntry>, Box<dyn Error>> {
    Ok(TextEntry::shared(EntryId::new(id)?, text))
}

/// Print every frame buffered since the last drain and fold it into `stats`.
fn drain_frames(
    clients: &[Client],
    out: &mut impl Write,
    stats: &mut FrameStats,
) -> Result<(), Box<dyn Error>> {
    for client in clients {
        let frames = client.sink.take();
        let batch = FrameStats::collect(&frames);
        stats.frames += batch.frames;
        stats.ops += batch.ops;
        for frame in &frames {
            serde_json::to_writer(&mut *out, &frame.record())?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn run(options: CliOptions) -> Result<FrameStats, Box<dyn Error>> {
    let config = match options.config_path.as_deref() {
        Some(path) => TabConfig::load(path)?,
        None => TabConfig::default(),
    };
    let viewers = options.viewers.unwrap_or(DEFAULT_VIEWERS);
    let ticks = options.ticks.unwrap_or(DEFAULT_TICKS);

    let scheduler = Rc::new(TickScheduler::new());
    let manager = TabManager::new(config, scheduler.clone());
    let size = manager.grid().size();
    info!(
        width = config.width,
        height = config.height,
        viewers,
        ticks,
        "starting demo"
    );

    let players = (0..size.min(MAX_PLAYERS))
        .map(|n| entry(format!("player:{n}"), format!("Player {n}")))
        .collect::<Result<Vec<_>, _>>()?;
    let banner = entry("banner".to_owned(), "Tabgrid demo".to_owned())?;

    let mut clients = Vec::with_capacity(viewers);
    for index in 0..viewers {
        let viewer = ViewerId::new(format!("viewer-{index}"))?;
        let sink = MemorySink::new();
        let view = manager.create_view(viewer, sink.clone());
        view.enable(&manager);

        for (n, player) in players.iter().enumerate() {
            view.set_slot((n + index) % size, Some(player.as_entry()))?;
        }
        view.set_header(Some(banner.as_entry()))?;
        let footer = entry(format!("footer:{index}"), format!("tick 0 for viewer {index}"))?;
        view.set_footer(Some(footer.as_entry()))?;

        clients.push(Client { view, sink, footer });
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut stats = FrameStats::default();

    for tick in 0..ticks {
        if tick > 0 {
            let player = &players[tick % players.len()];
            player.set_text(format!("Player {} ({tick} points)", tick % players.len()));

            let mover = &clients[tick % clients.len()];
            mover
                .view
                .set_slot((tick * 3) % size, Some(player.as_entry()))?;

            for (index, client) in clients.iter().enumerate() {
                client
                    .footer
                    .set_text(format!("tick {tick} for viewer {index}"));
            }
            if tick % 5 == 4 {
                let first = &clients[0].view;
                first.on_context_change(&first.viewer());
            }
        }

        let ran = scheduler.run_pending();
        debug!(tick, tasks = ran, "tick drained");
        drain_frames(&clients, &mut out, &mut stats)?;
    }

    for client in &clients {
        manager.remove_view(&client.view);
    }
    drain_frames(&clients, &mut out, &mut stats)?;
    out.flush()?;

    Ok(stats)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "tabgrid".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_tracing();
        let stats = run(options)?;
        info!(frames = stats.frames, ops = stats.ops, "demo finished");
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("tabgrid: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, run, CliOptions};

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter()
            .map(|arg| (*arg).to_owned())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_all_flags_in_any_order() {
        let options =
            parse_options(args(&["--ticks", "3", "--config", "grid.json", "--viewers", "4"]))
                .expect("parse options");
        assert_eq!(options.config_path.as_deref(), Some("grid.json"));
        assert_eq!(options.viewers, Some(4));
        assert_eq!(options.ticks, Some(3));
    }

    #[test]
    fn accepts_zero_ticks() {
        let options = parse_options(args(&["--ticks", "0"])).expect("parse options");
        assert_eq!(options.ticks, Some(0));
    }

    #[test]
    fn rejects_zero_viewers() {
        assert!(parse_options(args(&["--viewers", "0"])).is_err());
    }

    #[test]
    fn rejects_non_numeric_counts() {
        assert!(parse_options(args(&["--viewers", "many"])).is_err());
        assert!(parse_options(args(&["--ticks", "-1"])).is_err());
    }

    #[test]
    fn rejects_missing_values() {
        assert!(parse_options(args(&["--config"])).is_err());
        assert!(parse_options(args(&["--ticks"])).is_err());
    }

    #[test]
    fn rejects_duplicate_flags() {
        assert!(parse_options(args(&["--ticks", "1", "--ticks", "2"])).is_err());
        assert!(parse_options(args(&["--config", "a", "--config", "b"])).is_err());
    }

    #[test]
    fn rejects_unknown_and_positional_args() {
        assert!(parse_options(args(&["--demo"])).is_err());
        assert!(parse_options(args(&["grid.json"])).is_err());
    }

    #[test]
    fn demo_run_flushes_initial_and_teardown_frames() {
        let stats = run(CliOptions {
            config_path: None,
            viewers: Some(2),
            ticks: Some(1),
        })
        .expect("demo run");
        // One initial frame and one teardown frame per viewer.
        assert_eq!(stats.frames, 4);
        // 80 creates plus a header/footer op, then the header/footer reset plus 80 destroys.
        assert_eq!(stats.ops, 2 * (81 + 81));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = run(CliOptions {
            config_path: Some("/nonexistent/tabgrid.json".to_owned()),
            viewers: None,
            ticks: Some(0),
        })
        .unwrap_err();
        assert!(err.to_string().contains("io error"), "{err}");
    }
}
