// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for bundle composition.
//!
//! Exercises the full plan → stage → pack pipeline against real module
//! trees in a temp workspace: determinism, collision precedence, canonical
//! manifest handling, and the fatal error taxonomy.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use bento::compose::graph::BundleGraph;
use bento::compose::manager::ComposeManager;
use bento::compose::{BundleOutcome, Variant, VariantSet};
use bento::config::Config;
use bento::error::ComposeError;
use tempfile::TempDir;

/// Temp workspace with module trees and a config rooted at its prefix.
struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            temp: tempfile::tempdir().expect("failed to create temp workspace"),
        }
    }

    fn prefix(&self) -> &Path {
        self.temp.path()
    }

    /// Writes a file under the workspace, creating parent directories.
    fn write(&self, rel: &str, content: &str) {
        let path = self.temp.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn mkdir(&self, rel: &str) {
        std::fs::create_dir_all(self.temp.path().join(rel)).unwrap();
    }

    /// Parses a config with `paths.prefix` pinned to this workspace.
    fn config(&self, body: &str) -> Config {
        let toml = format!(
            "[paths]\nprefix = \"{}\"\n\n{body}",
            self.prefix().display()
        );
        Config::parse(&toml).expect("test config must parse")
    }

    fn dist(&self, file_name: &str) -> std::path::PathBuf {
        self.prefix().join("dist").join(file_name)
    }
}

/// Declares a module with standard `NAME/out` and `NAME/src` trees.
fn module_section(name: &str) -> String {
    format!("[modules.{name}]\noutput = \"{name}/out\"\nsources = \"{name}/src\"\n")
}

async fn compose(config: Config, bundles: &[&str], variants: VariantSet) -> Vec<BundleOutcome> {
    let config = Arc::new(config);
    let selected: Vec<String> = bundles.iter().map(ToString::to_string).collect();
    let graph = BundleGraph::build(&config.bundles, &selected).expect("graph must build");

    ComposeManager::with_concurrency(config, 2)
        .with_variants(variants)
        .run(&graph)
        .await
}

/// Reads every entry of a `.tar.zst` archive into (path → content).
fn read_archive(path: &Path) -> BTreeMap<String, String> {
    let file = std::fs::File::open(path)
        .unwrap_or_else(|e| panic!("failed to open {}: {e}", path.display()));
    let decoder = zstd::Decoder::new(file).unwrap();
    let mut reader = tar::Archive::new(decoder);

    let mut entries = BTreeMap::new();
    for entry in reader.entries().unwrap() {
        let mut entry = entry.unwrap();
        let name = entry.path().unwrap().display().to_string();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        entries.insert(name, content);
    }
    entries
}

fn fabric_workspace() -> (Workspace, Config) {
    let ws = Workspace::new();

    ws.write(
        "fabric/out/loader.mod.json",
        r#"{"id": "acme-ui", "version": "${version}", "min": "${platform_version}", "max": "${platform_version_max}"}"#,
    );
    ws.write("fabric/out/assets/fabric.bin", "fabric-bytes");
    ws.write("fabric/src/Entry.java", "class Entry {}");

    ws.write("common/out/assets/shared.bin", "shared-bytes");
    ws.write("common/src/Shared.java", "class Shared {}");

    let config = ws.config(&format!(
        r#"
        [tokens]
        version = "1.2.0+build5"
        platform_version = "1.21.4"
        platform_version_max = "1.21.5"

        {fabric}
        {common}

        [bundles.fabric]
        sources = ["fabric", "common"]
        manifest = "loader.mod.json"
        base_name = "acme-ui"
        version = "1.2.0-fabric"
        "#,
        fabric = module_section("fabric"),
        common = module_section("common"),
    ));

    (ws, config)
}

#[tokio::test]
async fn test_compose_end_to_end() {
    let (ws, config) = fabric_workspace();

    let outcomes = compose(config, &["fabric"], VariantSet::all()).await;
    assert_eq!(outcomes.len(), 1);
    let artifacts = outcomes[0].result.as_ref().expect("bundle must compose");
    assert_eq!(artifacts.len(), 2);
    assert_eq!(artifacts[0].variant, Variant::Primary);
    assert_eq!(artifacts[0].file_count, 3);
    assert_eq!(artifacts[1].variant, Variant::Sources);
    assert_eq!(artifacts[1].file_count, 2);

    // Primary archive: merged trees plus the substituted manifest
    let primary = read_archive(&ws.dist("acme-ui-1.2.0-fabric.tar.zst"));
    assert_eq!(
        primary.keys().collect::<Vec<_>>(),
        vec!["assets/fabric.bin", "assets/shared.bin", "loader.mod.json"]
    );

    let manifest = &primary["loader.mod.json"];
    assert_eq!(
        manifest,
        r#"{"id": "acme-ui", "version": "1.2.0+build5", "min": "1.21.4", "max": "1.21.5"}"#
    );
    assert!(!manifest.contains("${"), "no unresolved placeholders");

    // Sources archive: same algorithm over the source trees
    let sources = read_archive(&ws.dist("acme-ui-1.2.0-fabric-sources.tar.zst"));
    assert_eq!(
        sources.keys().collect::<Vec<_>>(),
        vec!["Entry.java", "Shared.java"]
    );
}

#[tokio::test]
async fn test_compose_twice_is_byte_identical() {
    let (ws, config) = fabric_workspace();

    let outcomes = compose(config.clone(), &["fabric"], VariantSet::all()).await;
    assert!(outcomes[0].result.is_ok());
    let first = std::fs::read(ws.dist("acme-ui-1.2.0-fabric.tar.zst")).unwrap();
    let first_sources = std::fs::read(ws.dist("acme-ui-1.2.0-fabric-sources.tar.zst")).unwrap();

    let outcomes = compose(config, &["fabric"], VariantSet::all()).await;
    assert!(outcomes[0].result.is_ok());
    let second = std::fs::read(ws.dist("acme-ui-1.2.0-fabric.tar.zst")).unwrap();
    let second_sources = std::fs::read(ws.dist("acme-ui-1.2.0-fabric-sources.tar.zst")).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_sources, second_sources);
}

#[tokio::test]
async fn test_collision_earlier_source_wins() {
    let ws = Workspace::new();

    // Spec example: sources [A, B], A has x.txt="a", B has x.txt="b", y.txt="y"
    ws.write("a/out/x.txt", "a");
    ws.write("a/out/manifest.txt", "m");
    ws.write("b/out/x.txt", "b");
    ws.write("b/out/y.txt", "y");
    ws.mkdir("a/src");
    ws.mkdir("b/src");

    let config = ws.config(&format!(
        r#"
        {a}
        {b}

        [bundles.merged]
        sources = ["a", "b"]
        manifest = "manifest.txt"
        base_name = "merged"
        version = "1.0"
        "#,
        a = module_section("a"),
        b = module_section("b"),
    ));

    let outcomes = compose(config, &["merged"], VariantSet::PRIMARY).await;
    assert!(outcomes[0].result.is_ok());

    let entries = read_archive(&ws.dist("merged-1.0.tar.zst"));
    assert_eq!(entries["x.txt"], "a");
    assert_eq!(entries["y.txt"], "y");
}

#[tokio::test]
async fn test_non_primary_manifest_dropped() {
    let ws = Workspace::new();

    ws.write("fabric/out/loader.mod.json", r#"{"id": "primary"}"#);
    ws.write("common/out/loader.mod.json", r#"{"id": "shadowed"}"#);
    ws.write("common/out/extra.bin", "extra");

    let config = ws.config(&format!(
        r#"
        {fabric}
        {common}

        [bundles.fabric]
        sources = ["fabric", "common"]
        manifest = "loader.mod.json"
        base_name = "acme-ui"
        version = "1.0"
        "#,
        fabric = module_section("fabric"),
        common = module_section("common"),
    ));

    let outcomes = compose(config, &["fabric"], VariantSet::PRIMARY).await;
    assert!(outcomes[0].result.is_ok());

    let entries = read_archive(&ws.dist("acme-ui-1.0.tar.zst"));

    // Exactly one manifest survives, and it is the primary source's
    let manifest_count = entries.keys().filter(|k| *k == "loader.mod.json").count();
    assert_eq!(manifest_count, 1);
    assert_eq!(entries["loader.mod.json"], r#"{"id": "primary"}"#);
}

#[tokio::test]
async fn test_explicit_manifest_template_overrides_primary() {
    let ws = Workspace::new();

    ws.write("fabric/out/loader.mod.json", r#"{"id": "from-module"}"#);
    ws.write("templates/loader.mod.json", r#"{"id": "from-template", "v": "${version}"}"#);

    let config = ws.config(&format!(
        r#"
        [tokens]
        version = "2.0"

        {fabric}

        [bundles.fabric]
        sources = ["fabric"]
        manifest = "loader.mod.json"
        manifest_template = "templates/loader.mod.json"
        base_name = "acme-ui"
        version = "2.0"
        "#,
        fabric = module_section("fabric"),
    ));

    let outcomes = compose(config, &["fabric"], VariantSet::PRIMARY).await;
    assert!(outcomes[0].result.is_ok());

    let entries = read_archive(&ws.dist("acme-ui-2.0.tar.zst"));
    assert_eq!(entries["loader.mod.json"], r#"{"id": "from-template", "v": "2.0"}"#);
}

#[tokio::test]
async fn test_exclusion_globs_filter_per_source() {
    let ws = Workspace::new();

    ws.write("fabric/out/loader.mod.json", "{}");
    ws.write("fabric/out/keep.bin", "keep");
    ws.write("fabric/out/drop.dbg", "drop");
    ws.write("common/out/internal/secret.bin", "secret");
    ws.write("common/out/public.bin", "public");

    let config = ws.config(&format!(
        r#"
        {fabric}
        {common}

        [bundles.fabric]
        sources = ["fabric", "common"]
        manifest = "loader.mod.json"
        base_name = "acme-ui"
        version = "1.0"

        [bundles.fabric.excludes]
        fabric = ["*.dbg"]
        common = ["internal/**"]
        "#,
        fabric = module_section("fabric"),
        common = module_section("common"),
    ));

    let outcomes = compose(config, &["fabric"], VariantSet::PRIMARY).await;
    assert!(outcomes[0].result.is_ok());

    let entries = read_archive(&ws.dist("acme-ui-1.0.tar.zst"));
    assert_eq!(
        entries.keys().collect::<Vec<_>>(),
        vec!["keep.bin", "loader.mod.json", "public.bin"]
    );
}

#[tokio::test]
async fn test_missing_module_fails_without_output() {
    let ws = Workspace::new();

    ws.write("fabric/out/loader.mod.json", "{}");

    let config = ws.config(&format!(
        r#"
        {fabric}

        [bundles.fabric]
        sources = ["fabric", "phantom"]
        manifest = "loader.mod.json"
        base_name = "acme-ui"
        version = "1.0"
        "#,
        fabric = module_section("fabric"),
    ));

    let outcomes = compose(config, &["fabric"], VariantSet::PRIMARY).await;
    let err = outcomes[0].result.as_ref().unwrap_err();

    let compose_err = err.downcast_ref::<ComposeError>().unwrap();
    assert!(matches!(
        compose_err,
        ComposeError::MissingInput { module } if module == "phantom"
    ));

    // No output file was written
    assert!(!ws.dist("acme-ui-1.0.tar.zst").exists());
}

#[tokio::test]
async fn test_all_excluded_is_empty_bundle_error() {
    let ws = Workspace::new();

    ws.write("fabric/out/loader.mod.json", "{}");
    ws.write("fabric/out/data.bin", "data");

    let config = ws.config(&format!(
        r#"
        {fabric}

        [bundles.fabric]
        sources = ["fabric"]
        manifest = "loader.mod.json"
        base_name = "acme-ui"
        version = "1.0"

        [bundles.fabric.excludes]
        fabric = ["**"]
        "#,
        fabric = module_section("fabric"),
    ));

    let outcomes = compose(config, &["fabric"], VariantSet::PRIMARY).await;
    let err = outcomes[0].result.as_ref().unwrap_err();

    let compose_err = err.downcast_ref::<ComposeError>().unwrap();
    assert!(matches!(
        compose_err,
        ComposeError::EmptyBundle { bundle, .. } if bundle == "fabric"
    ));
    assert!(!ws.dist("acme-ui-1.0.tar.zst").exists());
}

#[tokio::test]
async fn test_unresolved_placeholder_fails_without_output() {
    let ws = Workspace::new();

    ws.write("fabric/out/loader.mod.json", r#"{"v": "${version}", "l": "${loader_version}"}"#);

    let config = ws.config(&format!(
        r#"
        [tokens]
        version = "1.0"

        {fabric}

        [bundles.fabric]
        sources = ["fabric"]
        manifest = "loader.mod.json"
        base_name = "acme-ui"
        version = "1.0"
        "#,
        fabric = module_section("fabric"),
    ));

    let outcomes = compose(config, &["fabric"], VariantSet::PRIMARY).await;
    let err = outcomes[0].result.as_ref().unwrap_err();

    let compose_err = err.downcast_ref::<ComposeError>().unwrap();
    assert!(matches!(
        compose_err,
        ComposeError::UnresolvedPlaceholder { token, .. } if token == "loader_version"
    ));
    assert!(!ws.dist("acme-ui-1.0.tar.zst").exists());
}

#[tokio::test]
async fn test_failed_dependency_skips_dependents_but_not_siblings() {
    let ws = Workspace::new();

    // "core" is broken (module dir missing); "app" requires it;
    // "standalone" is unrelated and must still compose.
    ws.write("good/out/manifest.txt", "ok");
    ws.mkdir("good/src");

    let config = ws.config(&format!(
        r#"
        {good}

        [modules.broken]
        output = "broken/out"
        sources = "broken/src"

        [bundles.core]
        sources = ["broken"]
        manifest = "manifest.txt"
        base_name = "core"
        version = "1.0"

        [bundles.app]
        sources = ["good"]
        manifest = "manifest.txt"
        base_name = "app"
        version = "1.0"
        requires = ["core"]

        [bundles.standalone]
        sources = ["good"]
        manifest = "manifest.txt"
        base_name = "standalone"
        version = "1.0"
        "#,
        good = module_section("good"),
    ));

    let outcomes = compose(config, &["app", "standalone"], VariantSet::PRIMARY).await;

    let by_name: BTreeMap<&str, &BundleOutcome> =
        outcomes.iter().map(|o| (o.name.as_str(), o)).collect();

    // core failed on its own
    let core_err = by_name["core"].result.as_ref().unwrap_err();
    assert!(matches!(
        core_err.downcast_ref::<ComposeError>().unwrap(),
        ComposeError::MissingInput { module } if module == "broken"
    ));

    // app failed because core failed, without running
    let app_err = by_name["app"].result.as_ref().unwrap_err();
    assert!(matches!(
        app_err.downcast_ref::<ComposeError>().unwrap(),
        ComposeError::DependencyFailed { dependency, .. } if dependency == "core"
    ));
    assert!(!ws.dist("app-1.0.tar.zst").exists());

    // standalone composed despite the sibling failure
    assert!(by_name["standalone"].result.is_ok());
    assert!(ws.dist("standalone-1.0.tar.zst").exists());
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let (ws, config) = fabric_workspace();

    let config = Arc::new(config);
    let graph =
        BundleGraph::build(&config.bundles, &["fabric".to_string()]).expect("graph must build");

    let outcomes = ComposeManager::with_concurrency(Arc::clone(&config), 2)
        .with_dry_run(true)
        .run(&graph)
        .await;

    assert!(outcomes[0].result.is_ok());
    assert!(!ws.prefix().join("dist").exists());
    assert!(!ws.prefix().join("work").exists());
}

#[tokio::test]
async fn test_missing_canonical_manifest_is_fatal() {
    let ws = Workspace::new();

    ws.write("fabric/out/data.bin", "data");

    let config = ws.config(&format!(
        r#"
        {fabric}

        [bundles.fabric]
        sources = ["fabric"]
        manifest = "loader.mod.json"
        base_name = "acme-ui"
        version = "1.0"
        "#,
        fabric = module_section("fabric"),
    ));

    let outcomes = compose(config, &["fabric"], VariantSet::PRIMARY).await;
    let err = outcomes[0].result.as_ref().unwrap_err();
    assert!(err.to_string().contains("loader.mod.json"));
    assert!(!ws.dist("acme-ui-1.0.tar.zst").exists());
}

#[tokio::test]
async fn test_keep_staging_retains_tree() {
    let ws = Workspace::new();

    ws.write("fabric/out/manifest.txt", "m");
    ws.write("fabric/out/data.bin", "data");

    let config = ws.config(&format!(
        r#"
        [global]
        keep_staging = true

        {fabric}

        [bundles.fabric]
        sources = ["fabric"]
        manifest = "manifest.txt"
        base_name = "acme-ui"
        version = "1.0"
        "#,
        fabric = module_section("fabric"),
    ));

    let outcomes = compose(config, &["fabric"], VariantSet::PRIMARY).await;
    assert!(outcomes[0].result.is_ok());

    let staged = ws.prefix().join("work").join("fabric-primary");
    assert!(staged.join("data.bin").exists());
    assert!(staged.join("manifest.txt").exists());
}
