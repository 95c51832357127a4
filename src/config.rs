// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Grid configuration.
//!
//! Dimensions are fixed for the lifetime of a manager and its views; they are read once from
//! JSON and never reconfigured at runtime.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::view::GridSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TabConfig {
    pub width: usize,
    pub height: usize,
    /// Schedule one render pass per tick on invalidation. When off, the host calls
    /// `TabManager::render_dirty` itself.
    pub coalesce_renders: bool,
}

impl Default for TabConfig {
    fn default() -> Self {
        let grid = GridSize::default();
        Self {
            width: grid.width(),
            height: grid.height(),
            coalesce_renders: true,
        }
    }
}

impl TabConfig {
    pub fn grid(&self) -> GridSize {
        GridSize::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|source| ConfigError::Json { path: None, source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: Some(path.to_path_buf()),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    ZeroDimension {
        width: usize,
        height: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json {
                path: Some(path),
                source,
            } => write!(f, "json error at {path:?}: {source}"),
            Self::Json { path: None, source } => write!(f, "json error: {source}"),
            Self::ZeroDimension { width, height } => {
                write!(f, "grid dimensions must be positive (width={width}, height={height})")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::ZeroDimension { .. } => None,
        }
    }
}
