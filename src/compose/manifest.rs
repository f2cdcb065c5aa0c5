// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Canonical manifest token substitution.
//!
//! ```text
//! "version": "${version}"   +   tokens[version] = "1.2.0"
//!        |
//!        v
//! "version": "1.2.0"
//! ```
//!
//! The manifest format itself is opaque to the composer; substitution is
//! plain text. An unresolved placeholder is fatal to the bundle.

use regex::Regex;
use std::sync::OnceLock;

use crate::config::types::Tokens;
use crate::error::{ComposeError, Result};

/// Placeholder syntax: `${name}` where name is alphanumeric plus `_.-`.
fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_.-]*)\}").expect("placeholder regex is valid")
    })
}

/// Substitutes `${token}` placeholders in a manifest template.
///
/// Every placeholder must resolve against the token table; text without
/// placeholders passes through unchanged.
///
/// # Arguments
///
/// * `template` - Manifest template content
/// * `tokens` - Effective substitution table for the bundle
/// * `manifest` - Manifest display name, used in error messages
///
/// # Errors
///
/// Returns `ComposeError::UnresolvedPlaceholder` naming the first token
/// with no table entry.
pub fn substitute(template: &str, tokens: &Tokens, manifest: &str) -> Result<String> {
    let re = placeholder_re();

    let mut output = String::with_capacity(template.len());
    let mut last_end = 0;

    for captures in re.captures_iter(template) {
        let whole = captures.get(0).expect("capture 0 always present");
        let token = &captures[1];

        let value = tokens.get(token).ok_or_else(|| ComposeError::UnresolvedPlaceholder {
            manifest: manifest.to_string(),
            token: token.to_string(),
        })?;

        output.push_str(&template[last_end..whole.start()]);
        output.push_str(value);
        last_end = whole.end();
    }

    output.push_str(&template[last_end..]);
    Ok(output)
}

/// Returns the placeholder names present in a template, in order of first
/// appearance.
///
/// Used by dry-run logging to report what a bundle would substitute.
#[must_use]
pub fn placeholders(template: &str) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut names = Vec::new();
    for captures in placeholder_re().captures_iter(template) {
        let token = captures[1].to_string();
        if seen.insert(token.clone()) {
            names.push(token);
        }
    }
    names
}
