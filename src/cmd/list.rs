// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! List command implementation for bento.

use crate::cli::compose::ListArgs;
use crate::cmd::compose::build_registry;
use crate::config::Config;
use crate::error::Result;

/// Main handler for the list command.
///
/// # Errors
///
/// Returns an error if bundle resolution fails.
pub fn run_list_command(args: &ListArgs, config: &Config) -> Result<()> {
    if args.aliases {
        if config.aliases.is_empty() {
            println!("No aliases defined");
        } else {
            for (name, targets) in &config.aliases {
                println!("{} = {}", name, targets.join(", "));
            }
        }
        return Ok(());
    }

    let registry = build_registry(config);

    let bundles_to_list = if args.bundles.is_empty() {
        registry.all_bundles().iter().cloned().collect()
    } else {
        match registry.resolve(&args.bundles) {
            Ok(names) => names,
            Err(e) => {
                eprintln!("Failed to resolve bundle patterns: {e}");
                return Err(e);
            }
        }
    };

    if bundles_to_list.is_empty() {
        println!("No bundles found");
    } else {
        for bundle in &bundles_to_list {
            println!("{bundle}");
        }
    }
    Ok(())
}
