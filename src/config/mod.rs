// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for bento.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. bento.toml (cwd, optional)
//! 3. --config files (in order)
//! 4. BENTO_* env vars
//! 5. CLI overrides (--set, --dry, --destination)
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! BENTO_GLOBAL_DRY=true     → global.dry = true
//! BENTO_PATHS_PREFIX=/path  → paths.prefix = "/path"
//! ```
//!
//! # Token Overrides
//!
//! ```toml
//! [tokens]
//! version = "1.2.0"
//!
//! [bundles.fabric.tokens]
//! loader_version = "0.16.9" # merged over [tokens] for this bundle only
//! ```

pub mod loader;
pub mod merge;
pub mod paths;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

use loader::ConfigLoader;
use paths::PathsConfig;
use types::{Aliases, BundleConfig, GlobalConfig, ModuleConfig, Tokens};

/// Complete application configuration.
///
/// This is the explicit, immutable build state handed to the composer at
/// startup; nothing reads ambient global state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Bundle aliases.
    pub aliases: Aliases,
    /// Global token substitution table.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tokens: Tokens,
    /// Module outputs by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modules: BTreeMap<String, ModuleConfig>,
    /// Bundle specs by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub bundles: BTreeMap<String, BundleConfig>,
    /// Paths configuration.
    pub paths: PathsConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bento::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file("bento.toml")
    ///     .add_toml_file_optional("bento.local.toml")
    ///     .with_env_prefix("BENTO")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file (simple API).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Effective token table for a bundle.
    ///
    /// Global `[tokens]` merged with the bundle's own overrides; bundle
    /// entries win key-by-key.
    #[must_use]
    pub fn bundle_tokens(&self, bundle: &str) -> Tokens {
        self.bundles.get(bundle).map_or_else(
            || self.tokens.clone(),
            |spec| merge::merge_tokens(&self.tokens, &spec.tokens),
        )
    }

    /// Resolve all paths and validate configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if path resolution fails (e.g., missing required `prefix`).
    pub fn resolve_and_validate(&mut self) -> Result<()> {
        if self.paths.prefix.is_some() {
            self.paths.resolve()?;
        }
        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// Returns a vector of formatted strings representing all configuration
    /// options. Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_token_options(&mut options);
        self.format_module_options(&mut options);
        self.format_bundle_options(&mut options);
        self.format_paths_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("global.dry".into(), self.global.dry.to_string());
        options.insert(
            "global.keep_staging".into(),
            self.global.keep_staging.to_string(),
        );
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global.log_file.display().to_string(),
        );
    }

    fn format_token_options(&self, options: &mut BTreeMap<String, String>) {
        for (name, value) in &self.tokens {
            options.insert(format!("tokens.{name}"), value.clone());
        }
    }

    fn format_module_options(&self, options: &mut BTreeMap<String, String>) {
        for (name, module) in &self.modules {
            options.insert(
                format!("modules.{name}.output"),
                module.output.display().to_string(),
            );
            options.insert(
                format!("modules.{name}.sources"),
                module.sources.display().to_string(),
            );
        }
    }

    fn format_bundle_options(&self, options: &mut BTreeMap<String, String>) {
        for (name, bundle) in &self.bundles {
            options.insert(
                format!("bundles.{name}.sources"),
                bundle.sources.join(", "),
            );
            options.insert(format!("bundles.{name}.manifest"), bundle.manifest.clone());
            options.insert(
                format!("bundles.{name}.base_name"),
                bundle.base_name.clone(),
            );
            options.insert(format!("bundles.{name}.version"), bundle.version.clone());
            if !bundle.classifier.is_empty() {
                options.insert(
                    format!("bundles.{name}.classifier"),
                    bundle.classifier.clone(),
                );
            }
            if !bundle.requires.is_empty() {
                options.insert(
                    format!("bundles.{name}.requires"),
                    bundle.requires.join(", "),
                );
            }
        }
    }

    fn format_paths_options(&self, options: &mut BTreeMap<String, String>) {
        let fmt = |p: &Option<std::path::PathBuf>| {
            p.as_ref()
                .map_or_else(String::new, |p| p.display().to_string())
        };

        options.insert("paths.prefix".into(), fmt(&self.paths.prefix));
        options.insert("paths.out".into(), fmt(&self.paths.out));
        options.insert("paths.work".into(), fmt(&self.paths.work));
    }
}
