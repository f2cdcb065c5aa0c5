// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bundle composition system.
//!
//! # Architecture
//!
//! ```text
//! ComposeManager
//!      |
//!      v
//!  BundleGraph ----> topological waves over `requires`
//!      |
//!      v
//!  per bundle, per variant:
//!   Plan --> Stage --> Pack
//!    |        |         |
//!    v        v         v
//!  file map  temp dir  .tar.zst (atomic rename)
//! ```
//!
//! # Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`manager::ComposeManager`] | Orchestrates bundle composition with cancellation |
//! | [`registry::BundleRegistry`] | Resolves bundle names, aliases, and glob patterns |
//! | [`graph::BundleGraph`] | Topological execution order over `requires` edges |
//! | [`plan::BundlePlan`] | Validated file map + canonical manifest for one variant |
//! | [`Variant`] | Primary or sources rendition of a bundle |
//! | [`VariantSet`] | Bitflags selecting which variants to emit |
//! | [`ComposeContext`] | Execution context with config and cancellation token |
//!
//! Each bundle composition is a pure function of its inputs: two
//! compositions from identical inputs produce byte-identical archives.
//! Within one bundle, sources apply in declared order so collision
//! resolution is deterministic; across bundles, composition runs
//! concurrently.

pub mod archive;
pub mod graph;
pub mod manager;
pub mod manifest;
pub mod plan;
pub mod registry;
pub mod stage;

use bitflags::bitflags;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::config::types::ModuleConfig;
use crate::error::Result;

/// Composition phase.
///
/// Each bundle variant goes through these phases in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Plan phase: validate the spec, enumerate and filter source trees,
    /// resolve collisions, designate the canonical manifest.
    Plan,

    /// Stage phase: copy the planned file map into a temporary tree and
    /// write the substituted manifest.
    Stage,

    /// Pack phase: write the deterministic archive and move it into place.
    Pack,
}

impl Phase {
    /// Returns all phases in execution order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Plan, Self::Stage, Self::Pack]
    }

    /// Returns the display name for this phase.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Stage => "stage",
            Self::Pack => "pack",
        }
    }
}

/// Bundle rendition: the compiled output trees or the source trees.
///
/// Both variants are built by the same algorithm; only the tree selector
/// and the archive classifier differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Compiled module output trees.
    Primary,
    /// Module source trees (`-sources` classifier).
    Sources,
}

impl Variant {
    /// Returns all variants in emission order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Primary, Self::Sources]
    }

    /// Returns the display name for this variant.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Sources => "sources",
        }
    }

    /// Selects this variant's tree from a module.
    #[must_use]
    pub fn tree<'a>(&self, module: &'a ModuleConfig) -> &'a std::path::Path {
        match self {
            Self::Primary => &module.output,
            Self::Sources => &module.sources,
        }
    }

    /// Returns whether the canonical manifest is mandatory for this variant.
    ///
    /// The composed primary bundle must carry exactly one manifest; source
    /// trees may ship without one.
    #[must_use]
    pub const fn requires_manifest(&self) -> bool {
        matches!(self, Self::Primary)
    }
}

bitflags! {
    /// Flags selecting which bundle variants to emit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VariantSet: u8 {
        /// Emit the primary archive.
        const PRIMARY = 0x01;

        /// Emit the sources archive.
        const SOURCES = 0x02;
    }
}

impl VariantSet {
    /// Returns whether the given variant is selected.
    #[must_use]
    pub const fn has(&self, variant: Variant) -> bool {
        match variant {
            Variant::Primary => self.contains(Self::PRIMARY),
            Variant::Sources => self.contains(Self::SOURCES),
        }
    }
}

/// Context provided to bundle composition.
///
/// Contains configuration, cancellation tokens, and execution flags.
#[derive(Clone)]
pub struct ComposeContext {
    /// Reference to the configuration.
    config: Arc<Config>,

    /// Cancellation token for cooperative cancellation.
    cancel_token: CancellationToken,

    /// Whether this is a dry-run execution.
    dry_run: bool,

    /// Which variants to emit.
    variants: VariantSet,
}

impl ComposeContext {
    /// Creates a new `ComposeContext`.
    #[must_use]
    pub const fn new(config: Arc<Config>, cancel_token: CancellationToken) -> Self {
        Self {
            config,
            cancel_token,
            dry_run: false,
            variants: VariantSet::all(),
        }
    }

    /// Gets a reference to the configuration.
    #[must_use]
    pub const fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Gets a reference to the cancellation token.
    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    /// Returns whether this is a dry-run execution.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Gets the selected variants.
    #[must_use]
    pub const fn variants(&self) -> VariantSet {
        self.variants
    }

    /// Sets dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets the variants to emit.
    #[must_use]
    pub const fn with_variants(mut self, variants: VariantSet) -> Self {
        self.variants = variants;
        self
    }

    /// Checks if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// A single composed archive.
#[derive(Debug, Clone)]
pub struct ComposedArtifact {
    /// Variant this archive represents.
    pub variant: Variant,
    /// Final archive location.
    pub archive: PathBuf,
    /// Number of files packed (manifest included).
    pub file_count: usize,
}

/// Result of composing one bundle (all requested variants).
pub struct BundleOutcome {
    /// Bundle name.
    pub name: String,
    /// Artifacts on success, the first fatal error otherwise.
    pub result: Result<Vec<ComposedArtifact>>,
}
