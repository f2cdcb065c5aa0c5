// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for bento.
//!
//! ```text
//! Config: GlobalConfig, PathsConfig, Tokens, modules, bundles
//! Aliases: bundle name → [bundle pattern list]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::logging::LogLevel;

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Simulate filesystem operations without making changes.
    pub dry: bool,
    /// Keep the staged bundle tree next to the archive for inspection.
    pub keep_staging: bool,
    /// Log level for stdout output (0-5).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-5).
    pub file_log_level: LogLevel,
    /// Path to log file.
    pub log_file: PathBuf,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            dry: false,
            keep_staging: false,
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: PathBuf::from("bento.log"),
        }
    }
}

/// Bundle aliases mapping alias names to bundle patterns.
pub type Aliases = BTreeMap<String, Vec<String>>;

/// Token substitution table (placeholder name → replacement).
pub type Tokens = BTreeMap<String, String>;

/// A module output produced by an upstream build step.
///
/// Both trees are read-only inputs to the composer. Relative paths are
/// resolved against `paths.prefix`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleConfig {
    /// Compiled output tree of this module.
    pub output: PathBuf,
    /// Source tree of this module, used for the sources variant.
    pub sources: PathBuf,
}

/// A bundle spec: how to merge module outputs into one distributable
/// artifact.
///
/// `sources` is ordered; the first entry is the platform-primary module
/// whose manifest becomes canonical, and earlier entries win path
/// collisions against later ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleConfig {
    /// Ordered list of source module names (first = primary).
    pub sources: Vec<String>,
    /// Canonical manifest path inside the composed bundle.
    pub manifest: String,
    /// Explicit manifest template file, overriding the primary source's
    /// copy at the canonical path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_template: Option<PathBuf>,
    /// Base name of the output archives.
    pub base_name: String,
    /// Version string baked into the archive names.
    pub version: String,
    /// Optional archive classifier (e.g. a platform tag).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub classifier: String,
    /// Bundles that must compose successfully before this one.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    /// Per-source exclusion globs (source module name → glob list).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub excludes: BTreeMap<String, Vec<String>>,
    /// Per-bundle token overrides, merged over the global `[tokens]` table.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tokens: Tokens,
}

impl BundleConfig {
    /// Returns the primary (first-listed) source module, if any.
    #[must_use]
    pub fn primary_source(&self) -> Option<&str> {
        self.sources.first().map(String::as_str)
    }

    /// Returns the exclusion globs configured for a source module.
    #[must_use]
    pub fn excludes_for(&self, module: &str) -> &[String] {
        self.excludes.get(module).map_or(&[], Vec::as_slice)
    }
}
