// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bundle registry for resolving bundle names and aliases.
//!
//! ```text
//! input ["release", "ui-*"]
//!   resolve_aliases: "release" --> [fabric, neoforge, ...]
//!   match_pattern:   "ui-*"    --> [ui-fabric, ui-neoforge, ...]
//!   dedupe + preserve order
//! ```

use std::collections::BTreeSet;

use crate::error::{ConfigError, Result};
use anyhow::Context;
use wax::{Glob, Program};

use crate::config::types::Aliases;

/// Registry for looking up bundles by name or pattern.
pub struct BundleRegistry {
    /// Available bundle names.
    bundle_names: BTreeSet<String>,

    /// Aliases mapping names to bundle pattern lists.
    aliases: Aliases,
}

impl BundleRegistry {
    /// Creates a new `BundleRegistry`.
    #[must_use]
    pub const fn new(aliases: Aliases) -> Self {
        Self {
            bundle_names: BTreeSet::new(),
            aliases,
        }
    }

    /// Registers a bundle name.
    pub fn register(&mut self, name: impl Into<String>) {
        self.bundle_names.insert(name.into());
    }

    /// Registers multiple bundle names.
    pub fn register_all(&mut self, names: impl IntoIterator<Item = impl Into<String>>) {
        for name in names {
            self.bundle_names.insert(name.into());
        }
    }

    /// Returns all registered bundle names.
    #[must_use]
    pub const fn all_bundles(&self) -> &BTreeSet<String> {
        &self.bundle_names
    }

    /// Resolves aliases in a list of bundle patterns.
    ///
    /// If a pattern matches an alias, it's expanded to the alias targets.
    /// Non-alias patterns are returned as-is.
    #[must_use]
    pub fn resolve_aliases(&self, patterns: &[String]) -> Vec<String> {
        let mut result = Vec::new();

        for pattern in patterns {
            if let Some(targets) = self.aliases.get(pattern) {
                // Alias found - expand it (recursively resolve nested aliases)
                result.extend(self.resolve_aliases(targets));
            } else {
                // Not an alias - keep as-is
                result.push(pattern.clone());
            }
        }

        result
    }

    /// Matches a pattern against registered bundle names.
    ///
    /// An exact name resolves to itself. Anything else is treated as a glob
    /// and returns all matching bundle names.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownBundle` for a literal name that is not
    /// configured, or an error if the pattern is not a valid glob.
    pub fn match_pattern(&self, pattern: &str) -> Result<Vec<String>> {
        // If pattern is an exact match, return it directly
        if self.bundle_names.contains(pattern) {
            return Ok(vec![pattern.to_string()]);
        }

        // A literal (non-glob) name that didn't match is a hard error: the
        // caller asked for a specific bundle that doesn't exist.
        if !pattern.contains(['*', '?', '[', '{']) {
            return Err(ConfigError::UnknownBundle(pattern.to_string()).into());
        }

        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))?;

        let matched: Vec<String> = self
            .bundle_names
            .iter()
            .filter(|name| glob.is_match(name.as_str()))
            .cloned()
            .collect();

        Ok(matched)
    }

    /// Resolves a list of bundle specifications to concrete bundle names.
    ///
    /// This method:
    /// 1. Expands aliases
    /// 2. Matches glob patterns
    /// 3. Deduplicates results
    /// 4. Preserves order
    ///
    /// # Errors
    ///
    /// Returns an error if a literal name is unknown or a glob pattern is
    /// invalid.
    pub fn resolve(&self, specs: &[String]) -> Result<Vec<String>> {
        // First expand all aliases
        let expanded = self.resolve_aliases(specs);

        // Then match each pattern
        let mut result = Vec::new();
        let mut seen = BTreeSet::new();

        for pattern in &expanded {
            let matches = self.match_pattern(pattern)?;

            if matches.is_empty() {
                tracing::warn!(pattern = %pattern, "Pattern matched no bundles");
            }

            for name in matches {
                if seen.insert(name.clone()) {
                    result.push(name);
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BundleRegistry {
        let mut aliases = Aliases::new();
        aliases.insert(
            "release".to_string(),
            vec!["ui-fabric".to_string(), "ui-neoforge".to_string()],
        );
        aliases.insert("everything".to_string(), vec!["release".to_string()]);

        let mut registry = BundleRegistry::new(aliases);
        registry.register_all(["ui-fabric", "ui-neoforge", "core"]);
        registry
    }

    #[test]
    fn test_exact_match() {
        let registry = registry();
        let resolved = registry.resolve(&["core".to_string()]).unwrap();
        assert_eq!(resolved, vec!["core".to_string()]);
    }

    #[test]
    fn test_glob_match() {
        let registry = registry();
        let resolved = registry.resolve(&["ui-*".to_string()]).unwrap();
        assert_eq!(
            resolved,
            vec!["ui-fabric".to_string(), "ui-neoforge".to_string()]
        );
    }

    #[test]
    fn test_alias_expansion_recursive() {
        let registry = registry();
        let resolved = registry.resolve(&["everything".to_string()]).unwrap();
        assert_eq!(
            resolved,
            vec!["ui-fabric".to_string(), "ui-neoforge".to_string()]
        );
    }

    #[test]
    fn test_dedupe_preserves_order() {
        let registry = registry();
        let resolved = registry
            .resolve(&["core".to_string(), "release".to_string(), "core".to_string()])
            .unwrap();
        assert_eq!(
            resolved,
            vec![
                "core".to_string(),
                "ui-fabric".to_string(),
                "ui-neoforge".to_string(),
            ]
        );
    }

    #[test]
    fn test_unknown_literal_is_error() {
        let registry = registry();
        let err = registry.resolve(&["nope".to_string()]).unwrap_err();
        let config_err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(config_err, ConfigError::UnknownBundle(name) if name == "nope"));
    }

    #[test]
    fn test_unmatched_glob_is_empty_not_error() {
        let registry = registry();
        let resolved = registry.resolve(&["gui-*".to_string()]).unwrap();
        assert!(resolved.is_empty());
    }
}
