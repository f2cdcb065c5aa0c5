// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Path configuration.
//!
//! ```text
//! prefix/
//!   dist/    (out: composed archives)
//!   work/    (staging scratch space)
//! ```
//!
//! All paths are optional and resolved from `prefix` if not set.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Composition workspace paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Workspace root (all other paths relative to this).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<PathBuf>,
    /// Output directory for composed archives (default: prefix/dist).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<PathBuf>,
    /// Staging scratch directory (default: prefix/work).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work: Option<PathBuf>,
}

impl PathsConfig {
    /// Resolve all relative paths against prefix and fill in defaults.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if the `prefix` path is not set.
    pub fn resolve(&mut self) -> Result<()> {
        let prefix = self.prefix.clone().ok_or_else(|| ConfigError::MissingKey {
            section: "paths".to_string(),
            key: "prefix".to_string(),
        })?;

        let resolve = |path: &mut Option<PathBuf>, parent: &Path, default: &str| match path {
            Some(p) if p.is_relative() => {
                *path = Some(parent.join(p.clone()));
            }
            None => {
                *path = Some(parent.join(default));
            }
            _ => {}
        };

        resolve(&mut self.out, &prefix, "dist");
        resolve(&mut self.work, &prefix, "work");

        Ok(())
    }

    /// Get the prefix path, returning an error if not set.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if the `prefix` path is not set.
    pub fn prefix(&self) -> Result<&Path> {
        self.prefix.as_deref().ok_or_else(|| {
            ConfigError::MissingKey {
                section: "paths".to_string(),
                key: "prefix".to_string(),
            }
            .into()
        })
    }

    /// Get the output directory, returning an error if unresolved.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if neither `out` nor `prefix` is set.
    pub fn out(&self) -> Result<&Path> {
        self.out.as_deref().ok_or_else(|| {
            ConfigError::MissingKey {
                section: "paths".to_string(),
                key: "out".to_string(),
            }
            .into()
        })
    }

    /// Get the staging directory, returning an error if unresolved.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if neither `work` nor `prefix` is set.
    pub fn work(&self) -> Result<&Path> {
        self.work.as_deref().ok_or_else(|| {
            ConfigError::MissingKey {
                section: "paths".to_string(),
                key: "work".to_string(),
            }
            .into()
        })
    }

    /// Resolves an input path against the workspace prefix.
    ///
    /// Absolute paths pass through unchanged; relative ones are joined to
    /// `prefix` (or returned as-is when no prefix is configured, e.g. in
    /// tests operating on the current directory).
    #[must_use]
    pub fn under_prefix(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        self.prefix
            .as_deref()
            .map_or_else(|| path.to_path_buf(), |prefix| prefix.join(path))
    }
}
