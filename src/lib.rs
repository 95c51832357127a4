// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tabgrid: per-client virtualized grid views kept in sync through minimal incremental diffs.
//!
//! A [`manager::TabManager`] owns the canonical blank entries and the live set of
//! [`view::TabView`]s. Each view maps a fixed grid of slots to shared entries; mutations mark the
//! view dirty and a coalesced render pass flushes one [`render::Frame`] per changed view.

pub mod config;
pub mod manager;
pub mod model;
pub mod render;
pub mod schedule;
pub mod view;
