// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for bento using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! bento [global options] <command>
//! compose [--bundle NAME]... | --all
//! list
//! options
//! configs
//! version
//! ```

pub mod compose;
pub mod global;

#[cfg(test)]
mod tests;

use crate::cli::compose::{ComposeArgs, ListArgs};
use crate::cli::global::GlobalOptions;
use clap::{Parser, Subcommand};

/// Multi-target bundle composition tool.
///
/// Merges previously built module output trees into distributable bundles.
#[derive(Debug, Parser)]
#[command(
    name = "bento",
    author,
    version,
    about = "Multi-target bundle composition tool",
    long_about = "bento composes previously built module outputs into merged\n\
                  per-target bundles: for each configured bundle it copies the\n\
                  declared source trees in order (earlier sources win path\n\
                  collisions), substitutes tokens into the canonical manifest,\n\
                  and writes a deterministic archive plus a sources variant.\n\n\
                  Invoking `bento -d some/prefix compose --all` composes every\n\
                  configured bundle. See `bento <command> --help` for more\n\
                  information about a command.",
    after_help = "CONFIG FILES:\n\n\
                  By default, bento loads `bento.toml` from the current\n\
                  directory when present. Additional files can be specified\n\
                  with --config; those are loaded afterwards and override\n\
                  earlier values key by key. Use --no-default-configs to\n\
                  disable auto detection and only use --config. BENTO_*\n\
                  environment variables and --set apply on top."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their values from the configs.
    Options,

    /// Lists the config files used by bento.
    Configs,

    /// Composes bundles.
    Compose(ComposeArgs),

    /// Lists available bundles.
    List(ListArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
