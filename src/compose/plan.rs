// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bundle planning: validation, enumeration, filtering, collision
//! resolution, and canonical manifest designation.
//!
//! ```text
//! BundleConfig + module trees
//!        |
//!        v
//!   for each source (declared order):
//!     walk --> sort --> apply exclusion globs
//!     collision: earlier-listed source wins (logged)
//!     canonical manifest path: primary keeps, others drop
//!        |
//!        v
//!   BundlePlan { files (sorted), manifest, tokens, archive name }
//! ```
//!
//! Planning is read-only; nothing is written until staging. All fatal
//! conditions (missing module, missing manifest, empty bundle) surface
//! here, before any output exists.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use wax::{Glob, Program};

use crate::compose::{Phase, Variant};
use crate::config::Config;
use crate::config::types::{BundleConfig, Tokens};
use crate::error::{ComposeError, ConfigError, Result};
use crate::utility::fs::walk::{WalkOptions, sorted_relative_files};

/// A single file selected into a bundle.
#[derive(Debug, Clone)]
pub struct PlannedFile {
    /// Path inside the composed bundle.
    pub rel: PathBuf,
    /// Absolute location of the winning copy.
    pub source: PathBuf,
    /// Module the winning copy came from.
    pub module: String,
}

/// The canonical manifest selected for a bundle variant.
#[derive(Debug, Clone)]
pub struct PlannedManifest {
    /// Path inside the composed bundle.
    pub rel: PathBuf,
    /// Absolute location of the template to substitute.
    pub template: PathBuf,
}

/// Validated composition plan for one bundle variant.
#[derive(Debug)]
pub struct BundlePlan {
    /// Bundle name.
    pub name: String,
    /// Variant this plan renders.
    pub variant: Variant,
    /// Selected files, sorted by bundle-relative path. The canonical
    /// manifest is not listed here.
    pub files: Vec<PlannedFile>,
    /// Canonical manifest, if this variant carries one.
    pub manifest: Option<PlannedManifest>,
    /// Effective token table.
    pub tokens: Tokens,
    /// Output archive file name.
    pub archive_file_name: String,
}

impl BundlePlan {
    /// Total number of files the composed bundle will contain.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len() + usize::from(self.manifest.is_some())
    }
}

/// Plans one variant of a bundle.
///
/// # Errors
///
/// * `ConfigError::UnknownBundle` / `MissingKey` / `InvalidValue` for a
///   malformed spec.
/// * `ComposeError::MissingInput` naming the module whose output is unknown
///   or absent.
/// * `ComposeError::EmptyBundle` if exclusion filtering leaves nothing.
/// * `ConfigError::ManifestMissing` if the primary variant has no canonical
///   manifest.
pub fn plan_bundle(config: &Config, name: &str, variant: Variant) -> Result<BundlePlan> {
    let spec = config
        .bundles
        .get(name)
        .ok_or_else(|| ConfigError::UnknownBundle(name.to_string()))?;

    validate_spec(name, spec)?;

    debug!(
        bundle = name,
        variant = variant.name(),
        phase = Phase::Plan.name(),
        sources = ?spec.sources,
        "Planning bundle"
    );

    let manifest_rel = Path::new(&spec.manifest);
    let walk_options = WalkOptions::for_module_output();

    let mut selected: BTreeMap<PathBuf, PlannedFile> = BTreeMap::new();
    let mut manifest_candidate: Option<PlannedManifest> = None;

    for (index, module_name) in spec.sources.iter().enumerate() {
        let is_primary = index == 0;

        let module = config
            .modules
            .get(module_name)
            .ok_or_else(|| ComposeError::MissingInput {
                module: module_name.clone(),
            })?;

        let root = config.paths.under_prefix(variant.tree(module));
        if !root.is_dir() {
            return Err(ComposeError::MissingInput {
                module: module_name.clone(),
            }
            .into());
        }

        let excludes = compile_excludes(name, module_name, spec)?;

        for rel in sorted_relative_files(&root, &walk_options)? {
            if excludes.iter().any(|glob| glob.is_match(rel.as_path())) {
                debug!(
                    bundle = name,
                    module = module_name.as_str(),
                    path = %rel.display(),
                    "Excluded by glob"
                );
                continue;
            }

            if rel == manifest_rel {
                if is_primary && spec.manifest_template.is_none() {
                    manifest_candidate = Some(PlannedManifest {
                        rel: rel.clone(),
                        template: root.join(&rel),
                    });
                } else {
                    // Non-primary manifests are dropped unconditionally;
                    // this is not a collision.
                    debug!(
                        bundle = name,
                        module = module_name.as_str(),
                        path = %rel.display(),
                        "Dropping non-canonical manifest"
                    );
                }
                continue;
            }

            match selected.entry(rel) {
                std::collections::btree_map::Entry::Occupied(entry) => {
                    warn!(
                        bundle = name,
                        path = %entry.key().display(),
                        kept = entry.get().module.as_str(),
                        dropped = module_name.as_str(),
                        "Path collision, earlier-listed source wins"
                    );
                }
                std::collections::btree_map::Entry::Vacant(entry) => {
                    let file = PlannedFile {
                        rel: entry.key().clone(),
                        source: root.join(entry.key()),
                        module: module_name.clone(),
                    };
                    entry.insert(file);
                }
            }
        }
    }

    if let Some(template) = &spec.manifest_template {
        let template = config.paths.under_prefix(template);
        if !template.is_file() {
            return Err(ConfigError::ManifestMissing {
                bundle: name.to_string(),
                path: template.display().to_string(),
            }
            .into());
        }
        manifest_candidate = Some(PlannedManifest {
            rel: manifest_rel.to_path_buf(),
            template,
        });
    }

    if selected.is_empty() && manifest_candidate.is_none() {
        return Err(ComposeError::EmptyBundle {
            bundle: name.to_string(),
            variant: variant.name().to_string(),
        }
        .into());
    }

    if manifest_candidate.is_none() && variant.requires_manifest() {
        return Err(ConfigError::ManifestMissing {
            bundle: name.to_string(),
            path: spec.manifest.clone(),
        }
        .into());
    }

    let plan = BundlePlan {
        name: name.to_string(),
        variant,
        files: selected.into_values().collect(),
        manifest: manifest_candidate,
        tokens: config.bundle_tokens(name),
        archive_file_name: archive_file_name(spec, variant),
    };

    debug!(
        bundle = name,
        variant = variant.name(),
        files = plan.file_count(),
        archive = plan.archive_file_name.as_str(),
        "Planned bundle"
    );

    Ok(plan)
}

fn validate_spec(name: &str, spec: &BundleConfig) -> Result<()> {
    let missing = |key: &str| ConfigError::MissingKey {
        section: format!("bundles.{name}"),
        key: key.to_string(),
    };

    if spec.sources.is_empty() {
        return Err(missing("sources").into());
    }
    if spec.manifest.is_empty() {
        return Err(missing("manifest").into());
    }
    if spec.base_name.is_empty() {
        return Err(missing("base_name").into());
    }
    if spec.version.is_empty() {
        return Err(missing("version").into());
    }
    Ok(())
}

fn compile_excludes(bundle: &str, module: &str, spec: &BundleConfig) -> Result<Vec<Glob<'static>>> {
    spec.excludes_for(module)
        .iter()
        .map(|pattern| {
            Glob::new(pattern)
                .map(Glob::into_owned)
                .map_err(|e| {
                    ConfigError::InvalidValue {
                        section: format!("bundles.{bundle}.excludes"),
                        key: module.to_string(),
                        message: format!("invalid glob '{pattern}': {e}"),
                    }
                    .into()
                })
        })
        .collect()
}

/// Deterministic archive file name:
/// `{base_name}-{version}[-{classifier}][-sources].tar.zst`.
fn archive_file_name(spec: &BundleConfig, variant: Variant) -> String {
    let mut name = format!("{}-{}", spec.base_name, spec.version);
    if !spec.classifier.is_empty() {
        name.push('-');
        name.push_str(&spec.classifier);
    }
    if variant == Variant::Sources {
        name.push_str("-sources");
    }
    name.push('.');
    name.push_str(crate::compose::archive::ARCHIVE_EXTENSION);
    name
}
