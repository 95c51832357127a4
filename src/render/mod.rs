// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diff batches and the frame sink boundary.
//!
//! A [`TabRender`] collects the operations of one pass over one view. `finish` hands them to a
//! [`FrameSink`] as a single [`Frame`]; how the sink serializes or transports the frame is not
//! this crate's concern.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use smallvec::SmallVec;

use crate::model::{EntryRef, ViewerId};

mod record;
#[cfg(test)]
pub(crate) mod test_utils;

pub use record::{FrameRecord, OpKind, OpRecord};

#[derive(Debug, Clone)]
pub enum RenderOp {
    Create { entry: EntryRef, slot: usize },
    Destroy { entry: EntryRef, slot: usize },
    Add { entry: EntryRef, slot: usize },
    Remove { entry: EntryRef, slot: usize },
    Move { entry: EntryRef, from: usize, to: usize },
    Update { entry: EntryRef, slot: usize },
    SetHeaderFooter { header: EntryRef, footer: EntryRef },
    Refresh { entry: EntryRef, slot: usize },
}

impl RenderOp {
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Create { .. } => OpKind::Create,
            Self::Destroy { .. } => OpKind::Destroy,
            Self::Add { .. } => OpKind::Add,
            Self::Remove { .. } => OpKind::Remove,
            Self::Move { .. } => OpKind::Move,
            Self::Update { .. } => OpKind::Update,
            Self::SetHeaderFooter { .. } => OpKind::SetHeaderFooter,
            Self::Refresh { .. } => OpKind::Refresh,
        }
    }
}

/// One flushed batch for one viewer.
#[derive(Debug, Clone)]
pub struct Frame {
    viewer: ViewerId,
    ops: Vec<RenderOp>,
}

impl Frame {
    pub fn viewer(&self) -> &ViewerId {
        &self.viewer
    }

    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    pub fn record(&self) -> FrameRecord {
        FrameRecord {
            viewer: self.viewer.to_string(),
            ops: self.ops.iter().map(RenderOp::record).collect(),
        }
    }
}

/// Receiver of flushed frames (the transport boundary).
pub trait FrameSink {
    fn flush(&mut self, frame: Frame);
}

impl<F> FrameSink for F
where
    F: FnMut(Frame),
{
    fn flush(&mut self, frame: Frame) {
        self(frame)
    }
}

/// Sink that keeps every frame in a shared buffer. Clones observe the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    frames: Rc<RefCell<Vec<Frame>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.borrow().is_empty()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.borrow().clone()
    }

    pub fn take(&self) -> Vec<Frame> {
        std::mem::take(&mut *self.frames.borrow_mut())
    }
}

impl FrameSink for MemorySink {
    fn flush(&mut self, frame: Frame) {
        self.frames.borrow_mut().push(frame);
    }
}

/// Ordered operations of a single pass over one view.
///
/// Tracks which body slots were already touched by a layout op so the content phase can skip
/// them.
#[derive(Debug)]
pub struct TabRender {
    viewer: ViewerId,
    ops: SmallVec<[RenderOp; 8]>,
    touched: Vec<bool>,
}

impl TabRender {
    pub fn new(viewer: ViewerId) -> Self {
        Self {
            viewer,
            ops: SmallVec::new(),
            touched: Vec::new(),
        }
    }

    pub fn viewer(&self) -> &ViewerId {
        &self.viewer
    }

    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn touched(&self, slot: usize) -> bool {
        self.touched.get(slot).copied().unwrap_or(false)
    }

    fn touch(&mut self, slot: usize) {
        if self.touched.len() <= slot {
            self.touched.resize(slot + 1, false);
        }
        self.touched[slot] = true;
    }

    pub fn create_slot(&mut self, entry: EntryRef, slot: usize) {
        self.touch(slot);
        self.ops.push(RenderOp::Create { entry, slot });
    }

    pub fn destroy_slot(&mut self, entry: EntryRef, slot: usize) {
        self.touch(slot);
        self.ops.push(RenderOp::Destroy { entry, slot });
    }

    pub fn add_entry(&mut self, entry: EntryRef, slot: usize) {
        self.touch(slot);
        self.ops.push(RenderOp::Add { entry, slot });
    }

    pub fn remove_entry(&mut self, entry: EntryRef, slot: usize) {
        self.touch(slot);
        self.ops.push(RenderOp::Remove { entry, slot });
    }

    pub fn change_slot(&mut self, entry: EntryRef, from: usize, to: usize) {
        self.touch(from);
        self.touch(to);
        self.ops.push(RenderOp::Move { entry, from, to });
    }

    pub fn update_entry(&mut self, entry: EntryRef, slot: usize) {
        self.ops.push(RenderOp::Update { entry, slot });
    }

    pub fn set_header_footer(&mut self, header: EntryRef, footer: EntryRef) {
        self.ops.push(RenderOp::SetHeaderFooter { header, footer });
    }

    pub fn refresh_entry(&mut self, entry: EntryRef, slot: usize) {
        self.ops.push(RenderOp::Refresh { entry, slot });
    }

    /// Flush the batch as one frame. Empty batches are dropped; returns whether a frame was sent.
    pub fn finish(self, sink: &mut dyn FrameSink) -> bool {
        if self.ops.is_empty() {
            return false;
        }
        sink.flush(Frame {
            viewer: self.viewer,
            ops: self.ops.into_vec(),
        });
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FrameStats {
    pub frames: usize,
    pub ops: usize,
}

impl FrameStats {
    pub fn collect(frames: &[Frame]) -> Self {
        Self {
            frames: frames.len(),
            ops: frames.iter().map(|frame| frame.ops().len()).sum(),
        }
    }
}
