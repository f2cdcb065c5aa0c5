// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Compose command arguments.
//!
//! # Flag Effects
//!
//! ```text
//! --bundle NAME      select one bundle (repeatable; globs and aliases work)
//! --all              select every configured bundle
//! --no-sources       emit only the primary archives
//! --sources-only     emit only the sources archives
//! ```

use clap::ArgAction;
use clap::Args;

use crate::compose::VariantSet;

/// Arguments for the `compose` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ComposeArgs {
    /// Bundle to compose. Can be specified multiple times; aliases and
    /// globs like 'ui-*' are supported.
    #[arg(long = "bundle", value_name = "NAME", action = ArgAction::Append, conflicts_with = "all")]
    pub bundles: Vec<String>,

    /// Composes every configured bundle.
    #[arg(long, action = ArgAction::SetTrue)]
    pub all: bool,

    /// Skips the sources variant.
    #[arg(long = "no-sources", action = ArgAction::SetTrue, conflicts_with = "sources_only")]
    pub no_sources: bool,

    /// Emits only the sources variant.
    #[arg(long = "sources-only", action = ArgAction::SetTrue, conflicts_with = "no_sources")]
    pub sources_only: bool,
}

impl ComposeArgs {
    /// Returns the effective variant selection.
    #[must_use]
    pub fn variant_set(&self) -> VariantSet {
        if self.no_sources {
            VariantSet::PRIMARY
        } else if self.sources_only {
            VariantSet::SOURCES
        } else {
            VariantSet::all()
        }
    }
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Shows only aliases.
    #[arg(short = 'i', long)]
    pub aliases: bool,

    /// When given, shows only the bundles matching these patterns.
    #[arg(value_name = "BUNDLE")]
    pub bundles: Vec<String>,
}
