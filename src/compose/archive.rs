// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Deterministic archive writer (`.tar.zst`).
//!
//! ```text
//! staged tree --> sorted entries --> tar --> zstd --> temp file --> rename
//! ```
//!
//! Entry order, timestamps, ownership, and permission bits are all fixed so
//! that composing twice from identical inputs yields byte-identical
//! archives. The archive is written to a temporary file in the output
//! directory and renamed into place only on full success.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Result;
use crate::utility::fs::walk::{WalkOptions, sorted_relative_files};

/// File extension of composed bundle archives.
pub const ARCHIVE_EXTENSION: &str = "tar.zst";

/// Fixed zstd compression level.
const COMPRESSION_LEVEL: i32 = 19;

/// Fixed modification time for all entries (epoch).
const ENTRY_MTIME: u64 = 0;

/// Fixed permission bits for all entries.
const ENTRY_MODE: u32 = 0o644;

/// Packs a staged tree into a deterministic `.tar.zst` archive.
///
/// Entries are file paths relative to `base_dir`, appended in sorted
/// order. Directories are not stored as separate entries; extractors
/// create them from entry paths.
///
/// # Errors
///
/// Returns an error if the tree cannot be enumerated, an entry cannot be
/// read, or the archive cannot be written or renamed into place.
pub fn pack_dir(base_dir: &Path, output: &Path) -> Result<usize> {
    let entries = sorted_relative_files(base_dir, &WalkOptions::for_module_output())?;

    let out_dir = output
        .parent()
        .context("archive output path has no parent directory")?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create directory {}", out_dir.display()))?;

    // Temp file in the output directory so the final rename stays on one
    // filesystem.
    let tmp = NamedTempFile::new_in(out_dir)
        .with_context(|| format!("failed to create temp file in {}", out_dir.display()))?;

    let writer = tmp
        .reopen()
        .with_context(|| format!("failed to reopen temp file {}", tmp.path().display()))?;

    let encoder = zstd::Encoder::new(writer, COMPRESSION_LEVEL)
        .context("failed to create zstd encoder")?;
    let mut builder = tar::Builder::new(encoder);

    for rel in &entries {
        let path = base_dir.join(rel);
        let file =
            File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("failed to stat {}", path.display()))?
            .len();

        let mut header = tar::Header::new_gnu();
        header.set_size(len);
        header.set_mode(ENTRY_MODE);
        header.set_mtime(ENTRY_MTIME);
        header.set_uid(0);
        header.set_gid(0);

        builder
            .append_data(&mut header, rel, file)
            .with_context(|| format!("failed to append {} to archive", rel.display()))?;
    }

    let encoder = builder
        .into_inner()
        .context("failed to finalize tar stream")?;
    encoder.finish().context("failed to finalize zstd stream")?;

    tmp.persist(output)
        .with_context(|| format!("failed to move archive into place at {}", output.display()))?;

    debug!(
        archive = %output.display(),
        entries = entries.len(),
        "Archive written"
    );

    Ok(entries.len())
}
