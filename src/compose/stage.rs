// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bundle staging: materializes a plan into a temporary tree.
//!
//! ```text
//! BundlePlan --> stage_root/
//!   files copied in plan order
//!   canonical manifest substituted and written
//! ```
//!
//! The stage root is always a scratch location; the caller moves or packs
//! it only after staging completes, so a failure leaves no partial output
//! in the destination.

use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::compose::manifest::substitute;
use crate::compose::plan::BundlePlan;
use crate::compose::{ComposeContext, Phase};
use crate::error::Result;
use crate::utility::fs::copy::copy_file_async;

/// Stages a planned bundle variant into `stage_root`.
///
/// The caller handles dry-run mode; this function always writes.
///
/// # Errors
///
/// Returns an error if a file copy fails, the manifest template cannot be
/// read, or a manifest placeholder is unresolved.
pub async fn stage_plan(ctx: &ComposeContext, plan: &BundlePlan, stage_root: &Path) -> Result<()> {
    debug_assert!(!ctx.is_dry_run());

    debug!(
        bundle = plan.name.as_str(),
        variant = plan.variant.name(),
        phase = Phase::Stage.name(),
        stage = %stage_root.display(),
        "Staging bundle"
    );

    for file in &plan.files {
        let dst = stage_root.join(&file.rel);
        copy_file_async(&file.source, &dst)
            .await
            .with_context(|| {
                format!(
                    "failed to stage {} from module '{}'",
                    file.rel.display(),
                    file.module
                )
            })?;
    }

    if let Some(manifest) = &plan.manifest {
        let template = tokio::fs::read_to_string(&manifest.template)
            .await
            .with_context(|| {
                format!("failed to read manifest template {}", manifest.template.display())
            })?;

        let rendered = substitute(&template, &plan.tokens, &manifest.rel.display().to_string())?;

        let dst = stage_root.join(&manifest.rel);
        if let Some(parent) = dst.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        tokio::fs::write(&dst, rendered)
            .await
            .with_context(|| format!("failed to write manifest {}", dst.display()))?;

        debug!(
            bundle = plan.name.as_str(),
            manifest = %manifest.rel.display(),
            "Wrote canonical manifest"
        );
    }

    Ok(())
}
