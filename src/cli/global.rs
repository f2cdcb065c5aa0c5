// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Global CLI options available for all commands.
//!
//! # Option Precedence
//!
//! ```text
//! --config FILE     ← Additional config files (can repeat)
//! --dry             ← Plan and log without writing
//! --log-level N     ← Console verbosity (0-5)
//! --file-log-level  ← File verbosity (overrides --log-level)
//! --destination DIR ← paths.prefix override
//! --set KEY=VAL     ← Direct config override
//!
//! Precedence: CLI flags > --set > --config > bento.toml > defaults
//! ```

use clap::Args;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Global options available for all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Path to additional TOML configuration file(s).
    /// Can be specified multiple times.
    #[arg(short = 'c', long = "config", value_name = "FILE", action = clap::ArgAction::Append)]
    pub configs: Vec<PathBuf>,

    /// Plans and logs every composition without writing any output.
    #[arg(long)]
    pub dry: bool,

    /// Console log level (0=silent, 1=errors, 2=warnings, 3=info, 4=debug, 5=trace).
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=5)
    )]
    pub log_level: Option<u8>,

    /// File log level, overrides --log-level for the log file.
    #[arg(long = "file-log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=5)
    )]
    pub file_log_level: Option<u8>,

    /// Path to log file.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Workspace root (will contain dist/, work/, etc.).
    #[arg(short = 'd', long = "destination", value_name = "DIR")]
    pub prefix: Option<PathBuf>,

    /// Sets an option, such as 'tokens.version=1.2.0' or 'paths.out=dist'.
    /// Can be specified multiple times.
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE", action = clap::ArgAction::Append)]
    pub options: Vec<String>,

    /// Disables auto loading of bento.toml, only uses --config.
    #[arg(long = "no-default-configs")]
    pub no_default_configs: bool,
}

impl GlobalOptions {
    /// Converts command-line options to configuration override pairs.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::InvalidValue` for a `--set` argument without
    /// a `key=value` shape.
    pub fn to_config_overrides(&self) -> Result<Vec<(String, String)>> {
        let mut overrides = Vec::new();

        for option in &self.options {
            let (key, value) = option.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
                section: "cli".to_string(),
                key: "--set".to_string(),
                message: format!("expected key=value, got '{option}'"),
            })?;
            overrides.push((key.to_string(), value.to_string()));
        }

        if let Some(level) = self.log_level {
            overrides.push(("global.output_log_level".to_string(), level.to_string()));
        }

        // file_log_level falls back to log_level if not specified
        if let Some(level) = self.file_log_level.or(self.log_level) {
            overrides.push(("global.file_log_level".to_string(), level.to_string()));
        }

        if let Some(path) = &self.log_file {
            overrides.push(("global.log_file".to_string(), path.display().to_string()));
        }

        if self.dry {
            overrides.push(("global.dry".to_string(), "true".to_string()));
        }

        if let Some(prefix) = &self.prefix {
            overrides.push(("paths.prefix".to_string(), prefix.display().to_string()));
        }

        Ok(overrides)
    }
}
