// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Token table merging.
//!
//! ```text
//! [tokens] + [bundles.<name>.tokens] --> effective substitution table
//! ```
//!
//! Only keys present in the bundle override replace global values.

use super::types::Tokens;

/// Merge bundle-specific tokens over the global token table.
///
/// The global table supplies defaults; bundle-level entries take
/// precedence key-by-key. Neither input is modified.
pub(super) fn merge_tokens(base: &Tokens, overrides: &Tokens) -> Tokens {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
