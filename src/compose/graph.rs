// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bundle dependency graph.
//!
//! ```text
//! selected bundles + transitive `requires`
//!        |
//!        v
//!   Kahn's algorithm --> waves: [[a, b], [c], ...]
//! ```
//!
//! The graph is computed once per invocation; bundles inside a wave have no
//! edges between them and may compose concurrently, waves execute in order.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::config::types::BundleConfig;
use crate::error::{ConfigError, Result};

/// Topologically ordered execution plan over bundle `requires` edges.
#[derive(Debug)]
pub struct BundleGraph {
    waves: Vec<Vec<String>>,
}

impl BundleGraph {
    /// Builds the execution order for the selected bundles.
    ///
    /// Required bundles are pulled in transitively even when not selected
    /// directly. Names are deduplicated; ordering within a wave is the
    /// lexicographic bundle name order, so the plan is deterministic.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownBundle` if a selected or required name
    /// is not configured, and `ConfigError::DependencyCycle` if the
    /// `requires` edges are cyclic.
    pub fn build(bundles: &BTreeMap<String, BundleConfig>, selected: &[String]) -> Result<Self> {
        // Transitive closure over `requires`
        let mut members = BTreeSet::new();
        let mut queue: VecDeque<&str> = selected.iter().map(String::as_str).collect();

        while let Some(name) = queue.pop_front() {
            let spec = bundles
                .get(name)
                .ok_or_else(|| ConfigError::UnknownBundle(name.to_string()))?;
            if members.insert(name.to_string()) {
                for dep in &spec.requires {
                    queue.push_back(dep);
                }
            }
        }

        // Kahn's algorithm, level by level
        let mut remaining = members;
        let mut done: BTreeSet<String> = BTreeSet::new();
        let mut waves = Vec::new();

        while !remaining.is_empty() {
            let ready: Vec<String> = remaining
                .iter()
                .filter(|name| {
                    bundles[name.as_str()]
                        .requires
                        .iter()
                        .all(|dep| done.contains(dep))
                })
                .cloned()
                .collect();

            if ready.is_empty() {
                let cycle = remaining.iter().cloned().collect::<Vec<_>>().join(", ");
                return Err(ConfigError::DependencyCycle(cycle).into());
            }

            for name in &ready {
                remaining.remove(name);
                done.insert(name.clone());
            }
            waves.push(ready);
        }

        Ok(Self { waves })
    }

    /// Returns the execution waves in order.
    #[must_use]
    pub fn waves(&self) -> &[Vec<String>] {
        &self.waves
    }

    /// Returns the total number of bundles in the plan.
    #[must_use]
    pub fn bundle_count(&self) -> usize {
        self.waves.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(requires: &[&str]) -> BundleConfig {
        BundleConfig {
            sources: vec!["core".to_string()],
            manifest: "manifest.json".to_string(),
            base_name: "test".to_string(),
            version: "1.0".to_string(),
            requires: requires.iter().map(ToString::to_string).collect(),
            ..Default::default()
        }
    }

    fn bundles(specs: &[(&str, &[&str])]) -> BTreeMap<String, BundleConfig> {
        specs
            .iter()
            .map(|(name, requires)| ((*name).to_string(), bundle(requires)))
            .collect()
    }

    #[test]
    fn test_independent_bundles_share_a_wave() {
        let bundles = bundles(&[("a", &[]), ("b", &[])]);
        let graph =
            BundleGraph::build(&bundles, &["a".to_string(), "b".to_string()]).unwrap();

        assert_eq!(graph.waves(), &[vec!["a".to_string(), "b".to_string()]]);
        assert_eq!(graph.bundle_count(), 2);
    }

    #[test]
    fn test_requires_order_waves() {
        let bundles = bundles(&[("app", &["core"]), ("core", &[]), ("extra", &["app"])]);
        let graph = BundleGraph::build(&bundles, &["extra".to_string()]).unwrap();

        assert_eq!(
            graph.waves(),
            &[
                vec!["core".to_string()],
                vec!["app".to_string()],
                vec!["extra".to_string()],
            ]
        );
    }

    #[test]
    fn test_requires_pulled_in_transitively() {
        let bundles = bundles(&[("app", &["core"]), ("core", &[])]);
        let graph = BundleGraph::build(&bundles, &["app".to_string()]).unwrap();

        assert_eq!(graph.bundle_count(), 2);
        assert_eq!(graph.waves()[0], vec!["core".to_string()]);
    }

    #[test]
    fn test_unknown_bundle_rejected() {
        let bundles = bundles(&[("app", &["missing"])]);
        let err = BundleGraph::build(&bundles, &["app".to_string()]).unwrap_err();

        let config_err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(config_err, ConfigError::UnknownBundle(name) if name == "missing"));
    }

    #[test]
    fn test_cycle_rejected() {
        let bundles = bundles(&[("a", &["b"]), ("b", &["a"])]);
        let err = BundleGraph::build(&bundles, &["a".to_string()]).unwrap_err();

        let config_err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(config_err, ConfigError::DependencyCycle(_)));
        assert!(err.to_string().contains("a, b"));
    }
}
