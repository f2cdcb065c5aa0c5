// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Compose manager for orchestrating bundle composition.
//!
//! ```text
//! ComposeManager::new(config)
//!   .with_dry_run()  .with_variants()  .with_concurrency()
//!   .run(&graph).await
//!       per wave: bundles spawn on a JoinSet
//!       global semaphore caps concurrency
//!       one bundle's failure never aborts siblings
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{ComposeError, Result};

use super::graph::BundleGraph;
use super::plan::plan_bundle;
use super::stage::stage_plan;
use super::{BundleOutcome, ComposeContext, ComposedArtifact, Phase, Variant, VariantSet};

/// Manager for orchestrating bundle composition.
///
/// Bundles execute wave by wave in graph order; bundles within a wave run
/// concurrently up to the global concurrency limit. A failed bundle marks
/// its dependents as failed but never aborts unrelated siblings.
pub struct ComposeManager {
    /// Shared configuration.
    config: Arc<Config>,

    /// Cancellation token for cooperative cancellation.
    cancel_token: CancellationToken,

    /// Semaphore for limiting concurrent bundle jobs.
    concurrency_semaphore: Arc<Semaphore>,

    /// Whether to run in dry-run mode.
    dry_run: bool,

    /// Which variants to emit.
    variants: VariantSet,
}

impl ComposeManager {
    /// Creates a new `ComposeManager` with the given configuration.
    ///
    /// The default concurrency limit is the number of CPU cores.
    #[must_use]
    pub fn new(config: Arc<Config>) -> Self {
        let max_concurrent = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(4); // Fallback to 4 if unavailable
        Self::with_concurrency(config, max_concurrent)
    }

    /// Creates a `ComposeManager` with a specific concurrency limit.
    #[must_use]
    pub fn with_concurrency(config: Arc<Config>, max_concurrent: usize) -> Self {
        Self {
            config,
            cancel_token: CancellationToken::new(),
            concurrency_semaphore: Arc::new(Semaphore::new(max_concurrent)),
            dry_run: false,
            variants: VariantSet::all(),
        }
    }

    /// Sets dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets which variants to emit.
    #[must_use]
    pub const fn with_variants(mut self, variants: VariantSet) -> Self {
        self.variants = variants;
        self
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Returns the cancellation token for sharing with signal handlers.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Returns the concurrency semaphore.
    #[must_use]
    pub fn concurrency_semaphore(&self) -> Arc<Semaphore> {
        Arc::clone(&self.concurrency_semaphore)
    }

    /// Returns whether dry-run mode is enabled.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Triggers cancellation for all bundle jobs.
    pub fn interrupt_all(&self) {
        tracing::info!("Interrupting bundle composition");
        self.cancel_token.cancel();
    }

    /// Creates a `ComposeContext` for bundle jobs.
    fn create_context(&self) -> ComposeContext {
        ComposeContext::new(Arc::clone(&self.config), self.cancel_token.clone())
            .with_dry_run(self.dry_run)
            .with_variants(self.variants)
    }

    /// Runs all bundles in the graph and collects per-bundle outcomes.
    ///
    /// Never short-circuits: every bundle gets an outcome, either its
    /// artifacts, its own fatal error, or `DependencyFailed` when a
    /// required bundle failed earlier.
    pub async fn run(&self, graph: &BundleGraph) -> Vec<BundleOutcome> {
        let ctx = self.create_context();
        let mut outcomes = Vec::new();
        let mut failed: BTreeSet<String> = BTreeSet::new();

        info!(
            bundles = graph.bundle_count(),
            waves = graph.waves().len(),
            dry_run = self.dry_run,
            "Starting bundle composition"
        );

        for wave in graph.waves() {
            let mut set: JoinSet<BundleOutcome> = JoinSet::new();
            let mut names_by_id = HashMap::new();

            for name in wave {
                // A failed prerequisite fails its dependents without
                // running them.
                let failed_dep = self.config.bundles.get(name).and_then(|spec| {
                    spec.requires.iter().find(|dep| failed.contains(dep.as_str()))
                });
                if let Some(dep) = failed_dep {
                    failed.insert(name.clone());
                    outcomes.push(BundleOutcome {
                        name: name.clone(),
                        result: Err(ComposeError::DependencyFailed {
                            bundle: name.clone(),
                            dependency: dep.clone(),
                        }
                        .into()),
                    });
                    continue;
                }

                if self.is_cancelled() {
                    failed.insert(name.clone());
                    outcomes.push(BundleOutcome {
                        name: name.clone(),
                        result: Err(anyhow::anyhow!(
                            "bundle '{name}' interrupted before composition"
                        )),
                    });
                    continue;
                }

                let ctx = ctx.clone();
                let semaphore = Arc::clone(&self.concurrency_semaphore);
                let job_name = name.clone();
                let handle = set.spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return BundleOutcome {
                            name: job_name,
                            result: Err(anyhow::anyhow!("concurrency semaphore closed")),
                        };
                    };
                    let result = compose_bundle(&ctx, &job_name).await;
                    BundleOutcome {
                        name: job_name,
                        result,
                    }
                });
                names_by_id.insert(handle.id(), name.clone());
            }

            let mut wave_outcomes = Vec::new();
            while let Some(joined) = set.join_next_with_id().await {
                match joined {
                    Ok((_, outcome)) => wave_outcomes.push(outcome),
                    Err(e) => {
                        let name = names_by_id
                            .get(&e.id())
                            .cloned()
                            .unwrap_or_else(|| "<unknown>".to_string());
                        wave_outcomes.push(BundleOutcome {
                            name,
                            result: Err(anyhow::anyhow!("bundle job panicked: {e}")),
                        });
                    }
                }
            }

            wave_outcomes.sort_by(|a, b| a.name.cmp(&b.name));
            for outcome in wave_outcomes {
                match &outcome.result {
                    Ok(artifacts) => {
                        info!(
                            bundle = outcome.name.as_str(),
                            artifacts = artifacts.len(),
                            "Bundle composed"
                        );
                    }
                    Err(e) => {
                        error!(bundle = outcome.name.as_str(), error = %e, "Bundle failed");
                        failed.insert(outcome.name.clone());
                    }
                }
                outcomes.push(outcome);
            }
        }

        outcomes
    }
}

/// Composes every requested variant of one bundle.
///
/// Each variant is planned, staged into a scratch directory under
/// `paths.work`, and packed into `paths.out`; the archive lands under its
/// final name only on full success.
///
/// # Errors
///
/// Returns the first fatal error from planning, staging, or packing.
async fn compose_bundle(ctx: &ComposeContext, name: &str) -> Result<Vec<ComposedArtifact>> {
    let config = ctx.config();
    let out_dir = config.paths.out()?.to_path_buf();
    let work_dir = config.paths.work()?.to_path_buf();

    let mut artifacts = Vec::new();

    for variant in Variant::all().iter().copied() {
        if !ctx.variants().has(variant) {
            continue;
        }
        if ctx.is_cancelled() {
            anyhow::bail!(
                "bundle '{name}' interrupted before {} variant",
                variant.name()
            );
        }

        let plan = plan_bundle(config, name, variant)?;
        let archive = out_dir.join(&plan.archive_file_name);

        if ctx.is_dry_run() {
            if let Some(manifest) = &plan.manifest {
                let template = tokio::fs::read_to_string(&manifest.template)
                    .await
                    .with_context(|| {
                        format!(
                            "failed to read manifest template {}",
                            manifest.template.display()
                        )
                    })?;
                info!(
                    bundle = name,
                    manifest = %manifest.rel.display(),
                    tokens = ?super::manifest::placeholders(&template),
                    "[dry-run] Would substitute manifest tokens"
                );
            }
            info!(
                bundle = name,
                variant = variant.name(),
                files = plan.file_count(),
                archive = %archive.display(),
                "[dry-run] Would compose bundle variant"
            );
            artifacts.push(ComposedArtifact {
                variant,
                archive,
                file_count: plan.file_count(),
            });
            continue;
        }

        tokio::fs::create_dir_all(&work_dir)
            .await
            .with_context(|| format!("failed to create {}", work_dir.display()))?;

        let stage_dir = tempfile::tempdir_in(&work_dir)
            .with_context(|| format!("failed to create staging directory in {}", work_dir.display()))?;

        stage_plan(ctx, &plan, stage_dir.path()).await?;

        let base = stage_dir.path().to_path_buf();
        let target = archive.clone();
        let file_count = tokio::task::spawn_blocking(move || super::archive::pack_dir(&base, &target))
            .await
            .context("archive job failed to join")??;

        if config.global.keep_staging {
            let keep = work_dir.join(format!("{name}-{}", variant.name()));
            let staged = stage_dir.keep();
            crate::utility::fs::copy::replace_dir_async(&staged, &keep).await?;
        }

        info!(
            bundle = name,
            variant = variant.name(),
            phase = Phase::Pack.name(),
            files = file_count,
            archive = %archive.display(),
            "Composed bundle variant"
        );

        artifacts.push(ComposedArtifact {
            variant,
            archive,
            file_count,
        });
    }

    Ok(artifacts)
}
