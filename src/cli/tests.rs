// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::cli::{Cli, Command};
use crate::compose::VariantSet;
use clap::Parser;

#[test]
fn test_parse_version() {
    let cli = Cli::try_parse_from(["bento", "version"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
}

#[test]
fn test_parse_global_options() {
    let cli = Cli::try_parse_from([
        "bento", "-l", "5", "-d", "/tmp/ws", "--dry", "compose", "--all",
    ])
    .unwrap();

    assert_eq!(cli.global.log_level, Some(5));
    assert_eq!(
        cli.global.prefix.as_deref(),
        Some(std::path::Path::new("/tmp/ws"))
    );
    assert!(cli.global.dry);
    assert!(matches!(cli.command, Some(Command::Compose(args)) if args.all));
}

#[test]
fn test_parse_compose_bundles() {
    let cli = Cli::try_parse_from([
        "bento", "compose", "--bundle", "fabric", "--bundle", "ui-*",
    ])
    .unwrap();

    let Some(Command::Compose(args)) = cli.command else {
        panic!("expected compose command");
    };
    assert_eq!(args.bundles, vec!["fabric".to_string(), "ui-*".to_string()]);
    assert!(!args.all);
    assert_eq!(args.variant_set(), VariantSet::all());
}

#[test]
fn test_compose_bundle_conflicts_with_all() {
    let result = Cli::try_parse_from(["bento", "compose", "--bundle", "fabric", "--all"]);
    assert!(result.is_err());
}

#[test]
fn test_compose_variant_flags() {
    let cli = Cli::try_parse_from(["bento", "compose", "--all", "--no-sources"]).unwrap();
    let Some(Command::Compose(args)) = cli.command else {
        panic!("expected compose command");
    };
    assert_eq!(args.variant_set(), VariantSet::PRIMARY);

    let cli = Cli::try_parse_from(["bento", "compose", "--all", "--sources-only"]).unwrap();
    let Some(Command::Compose(args)) = cli.command else {
        panic!("expected compose command");
    };
    assert_eq!(args.variant_set(), VariantSet::SOURCES);

    let result =
        Cli::try_parse_from(["bento", "compose", "--all", "--no-sources", "--sources-only"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_list_aliases() {
    let cli = Cli::try_parse_from(["bento", "list", "-i"]).unwrap();
    assert!(matches!(cli.command, Some(Command::List(args)) if args.aliases));
}

#[test]
fn test_parse_set_options() {
    let cli = Cli::try_parse_from([
        "bento",
        "-s",
        "tokens.version=1.2.0",
        "-s",
        "global.keep_staging=true",
        "options",
    ])
    .unwrap();

    let overrides = cli.global.to_config_overrides().unwrap();
    assert!(overrides.contains(&("tokens.version".to_string(), "1.2.0".to_string())));
    assert!(overrides.contains(&("global.keep_staging".to_string(), "true".to_string())));
}

#[test]
fn test_malformed_set_option_rejected() {
    let cli = Cli::try_parse_from(["bento", "-s", "no-equals-sign", "options"]).unwrap();
    assert!(cli.global.to_config_overrides().is_err());
}

#[test]
fn test_file_log_level_falls_back_to_log_level() {
    let cli = Cli::try_parse_from(["bento", "-l", "4", "options"]).unwrap();
    let overrides = cli.global.to_config_overrides().unwrap();
    assert!(overrides.contains(&("global.output_log_level".to_string(), "4".to_string())));
    assert!(overrides.contains(&("global.file_log_level".to_string(), "4".to_string())));
}
