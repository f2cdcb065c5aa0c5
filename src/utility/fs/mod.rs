// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem utilities with parallel traversal and async staging copy.
//!
//! ```text
//! walk:  parallel_walk()          ignore::WalkParallel (multi-core)
//!        sorted_relative_files()  deterministic tree enumeration
//!        WalkOptions              max_depth, hidden, gitignore
//! copy:  copy_file_async()        tokio::fs copy with parent creation
//!        replace_dir_async()      move a staged tree into place
//! ```

pub mod copy;
pub mod walk;
