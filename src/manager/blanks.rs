// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::model::{BlankEntry, EntryId, EntryRef};

const BLANK_ID_PREFIX: &str = "blank-";

/// Get-or-create registry of canonical blank entries, one per slot index.
///
/// Owned by a manager; the same index always yields the same entry for the manager's lifetime.
#[derive(Debug, Default)]
pub struct BlankRegistry {
    blanks: RefCell<Vec<Option<Rc<BlankEntry>>>>,
}

impl BlankRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> EntryRef {
        let mut blanks = self.blanks.borrow_mut();
        if blanks.len() <= index {
            blanks.resize(index + 1, None);
        }
        let blank = blanks[index]
            .get_or_insert_with(|| Rc::new(BlankEntry::new(blank_id(index), index)))
            .clone();
        blank
    }

    pub fn len(&self) -> usize {
        self.blanks.borrow().iter().filter(|blank| blank.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn blank_id(index: usize) -> EntryId {
    let mut buf = itoa::Buffer::new();
    let digits = buf.format(index);
    let mut id = String::with_capacity(BLANK_ID_PREFIX.len() + digits.len());
    id.push_str(BLANK_ID_PREFIX);
    id.push_str(digits);
    EntryId::from_smol(SmolStr::new(id))
}
