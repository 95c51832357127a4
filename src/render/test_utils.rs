// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::{Frame, RenderOp};
use crate::model::TabEntry;

pub(crate) fn describe_op(op: &RenderOp) -> String {
    match op {
        RenderOp::Create { entry, slot } => format!("create {}@{slot}", entry.id()),
        RenderOp::Destroy { entry, slot } => format!("destroy {}@{slot}", entry.id()),
        RenderOp::Add { entry, slot } => format!("add {}@{slot}", entry.id()),
        RenderOp::Remove { entry, slot } => format!("remove {}@{slot}", entry.id()),
        RenderOp::Move { entry, from, to } => format!("move {} {from}->{to}", entry.id()),
        RenderOp::Update { entry, slot } => format!("update {}@{slot}", entry.id()),
        RenderOp::SetHeaderFooter { header, footer } => {
            format!("header_footer {} {}", header.id(), footer.id())
        }
        RenderOp::Refresh { entry, slot } => format!("refresh {}@{slot}", entry.id()),
    }
}

pub(crate) fn describe_frame(frame: &Frame) -> Vec<String> {
    frame.ops().iter().map(describe_op).collect()
}
