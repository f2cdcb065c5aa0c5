// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Compose command implementation for bento.

use std::sync::Arc;

use crate::cli::compose::ComposeArgs;
use crate::compose::graph::BundleGraph;
use crate::compose::manager::ComposeManager;
use crate::compose::registry::BundleRegistry;
use crate::config::Config;
use crate::error::Result;

/// Main handler for the compose command.
///
/// Composes every selected bundle (plus transitive `requires`); sibling
/// bundles keep composing after one fails, and the returned error reflects
/// "at least one failure".
///
/// # Errors
///
/// Returns an error if bundle resolution fails, the dependency graph is
/// invalid, or any bundle fails to compose.
pub async fn run_compose_command(args: &ComposeArgs, config: &Config, dry_run: bool) -> Result<()> {
    let config = Arc::new(config.clone());

    let selected = resolve_bundle_names(&config, args)?;
    if selected.is_empty() {
        anyhow::bail!("no bundles selected; use --bundle <name> or --all");
    }

    let graph = BundleGraph::build(&config.bundles, &selected)?;

    let manager = ComposeManager::new(Arc::clone(&config))
        .with_dry_run(dry_run)
        .with_variants(args.variant_set());

    let cancel_token = manager.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received Ctrl+C, interrupting composition...");
            cancel_token.cancel();
        }
    });

    let outcomes = manager.run(&graph).await;

    let mut failures = Vec::new();
    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            eprintln!("bundle '{}' failed: {e:#}", outcome.name);
            failures.push(outcome.name.clone());
        }
    }

    if failures.is_empty() {
        tracing::info!(bundles = outcomes.len(), "Composition completed successfully");
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{} of {} bundle(s) failed: {}",
            failures.len(),
            outcomes.len(),
            failures.join(", ")
        ))
    }
}

/// Builds the bundle registry from configured bundles and aliases.
pub(crate) fn build_registry(config: &Config) -> BundleRegistry {
    let mut registry = BundleRegistry::new(config.aliases.clone());
    registry.register_all(config.bundles.keys().cloned());
    registry
}

fn resolve_bundle_names(config: &Config, args: &ComposeArgs) -> Result<Vec<String>> {
    let registry = build_registry(config);

    let resolved = if args.all {
        registry.all_bundles().iter().cloned().collect()
    } else {
        registry.resolve(&args.bundles)?
    };

    if resolved.is_empty() {
        tracing::warn!(patterns = ?args.bundles, "No bundles resolved from patterns");
    } else {
        tracing::info!(bundles = ?resolved, "Resolved bundles to compose");
    }

    Ok(resolved)
}
