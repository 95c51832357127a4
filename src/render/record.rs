// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::Serialize;

use super::RenderOp;
use crate::model::{EntryRef, TabEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Create,
    Destroy,
    Add,
    Remove,
    Move,
    Update,
    SetHeaderFooter,
    Refresh,
}

/// Plain, serializable view of a [`RenderOp`] for transports and debug output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpRecord {
    pub kind: OpKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameRecord {
    pub viewer: String,
    pub ops: Vec<OpRecord>,
}

impl OpRecord {
    fn empty(kind: OpKind) -> Self {
        Self {
            kind,
            entry: None,
            text: None,
            slot: None,
            to: None,
            header: None,
            header_text: None,
            footer: None,
            footer_text: None,
        }
    }

    fn at(kind: OpKind, entry: &EntryRef, slot: usize) -> Self {
        Self {
            entry: Some(entry.id().to_string()),
            text: Some(entry.content().text().to_owned()),
            slot: Some(slot),
            ..Self::empty(kind)
        }
    }
}

impl RenderOp {
    pub fn record(&self) -> OpRecord {
        let kind = self.kind();
        match self {
            Self::Create { entry, slot }
            | Self::Destroy { entry, slot }
            | Self::Add { entry, slot }
            | Self::Remove { entry, slot }
            | Self::Update { entry, slot }
            | Self::Refresh { entry, slot } => OpRecord::at(kind, entry, *slot),
            Self::Move { entry, from, to } => OpRecord {
                to: Some(*to),
                ..OpRecord::at(kind, entry, *from)
            },
            Self::SetHeaderFooter { header, footer } => OpRecord {
                header: Some(header.id().to_string()),
                header_text: Some(header.content().text().to_owned()),
                footer: Some(footer.id().to_string()),
                footer_text: Some(footer.content().text().to_owned()),
                ..OpRecord::empty(kind)
            },
        }
    }
}
