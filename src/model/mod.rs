// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Identifiers and the entry model.
//!
//! Entries are shared, identity-bearing units of display content. Views place references to
//! them; entries keep a non-owning record of the views that show them.

pub mod entry;
pub mod ids;

pub use entry::{
    same_entry, BlankEntry, EntryContent, EntryRef, TabEntry, TextEntry, ViewLinks,
};
pub use ids::{EntryId, Id, IdError, ViewerId};

pub(crate) use entry::same_handle;
