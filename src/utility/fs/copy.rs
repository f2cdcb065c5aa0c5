// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::Result;
use anyhow::Context;
use std::path::Path;
use tokio::fs;

/// Copies a single file, creating the destination's parent directories.
///
/// # Errors
///
/// Returns an error if the parent directories cannot be created or the copy
/// itself fails.
pub async fn copy_file_async(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    fs::copy(src, dst)
        .await
        .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;

    Ok(())
}

/// Moves a directory into place, replacing any existing directory at `dst`.
///
/// Used to relocate a fully staged bundle tree from its temporary location.
/// The rename is the atomicity boundary: `dst` either keeps its previous
/// content or receives the complete new tree.
///
/// # Errors
///
/// Returns an error if the existing destination cannot be removed or the
/// rename fails (e.g. across filesystems).
pub async fn replace_dir_async(src: &Path, dst: &Path) -> Result<()> {
    if fs::metadata(dst).await.is_ok() {
        fs::remove_dir_all(dst)
            .await
            .with_context(|| format!("failed to remove {}", dst.display()))?;
    }

    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    fs::rename(src, dst)
        .await
        .with_context(|| format!("failed to move {} to {}", src.display(), dst.display()))?;

    Ok(())
}
