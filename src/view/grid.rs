// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Which part of a view a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRegion {
    Body,
    HeaderFooter,
}

/// Fixed grid dimensions of a view.
///
/// Body slots are `0..size`, addressed column-major (`x * height + y`). The header sits at
/// `size` and the footer at `size + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSize {
    width: usize,
    height: usize,
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(4, 20)
    }
}

impl GridSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> usize {
        self.width * self.height
    }

    pub fn header_slot(&self) -> usize {
        self.size()
    }

    pub fn footer_slot(&self) -> usize {
        self.size() + 1
    }

    pub fn slot_count(&self) -> usize {
        self.size() + 2
    }

    /// Region of an in-range slot. Anything past the body is treated as header/footer.
    pub fn region(&self, slot: usize) -> SlotRegion {
        if slot < self.size() {
            SlotRegion::Body
        } else {
            SlotRegion::HeaderFooter
        }
    }

    pub fn index_at(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| x * self.height + y)
    }
}
