// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Project scaffolding command.

use console::style;
use rizzler::{Rizzler, RizzlerConfig};
use std::fs;
use std::path::Path;

use super::with_spinner;
use crate::cli::{resolve_config, FrameworkFlags, PackageManagerFlags};
use crate::scaffold::{self, TMP_DIR};

/// Scaffolds a Vite SPA into the current directory and installs its dependencies.
pub async fn run(
    package_manager: &PackageManagerFlags,
    framework: &FrameworkFlags,
    quiet: bool,
) -> anyhow::Result<()> {
    let root = std::env::current_dir()?;
    let config = resolve_config(&root, package_manager, Some(framework))?;
    let rizzler = Rizzler::new(config.clone()).with_working_dir(&root);

    fs::create_dir_all(root.join(TMP_DIR))?;
    let scaffolded = with_spinner(
        &format!("{} create {}", config.command, config.framework),
        quiet,
        rizzler.initiate(TMP_DIR),
    )
    .await;
    if let Err(err) = scaffolded {
        if let Err(cleanup) = scaffold::remove_path(&root.join(TMP_DIR)) {
            tracing::warn!("Could not remove {}: {}", TMP_DIR, cleanup);
        }
        return Err(err.into());
    }

    adopt(&root, &config, quiet)?;

    with_spinner(
        &format!("{} install", config.command),
        quiet,
        rizzler.install(),
    )
    .await?;

    if !quiet {
        print_success(&config);
    }
    Ok(())
}

/// Moves the scaffolded project into place and writes `rizzler.toml`.
pub fn adopt(root: &Path, config: &RizzlerConfig, quiet: bool) -> anyhow::Result<()> {
    let adopted = scaffold::adopt(root, config.framework, &config.dev.vite_url)?;
    if !adopted.vite_config_patched {
        tracing::warn!("Add `build.manifest: true` to the Vite config before `rzl build`");
    }

    let wrote_config = scaffold::write_config_if_absent(root, config)?;

    if !quiet {
        for path in &adopted.paths {
            println!("  {} {}", style("A").green(), path.display());
        }
        if wrote_config {
            println!("  {} {}", style("A").green(), crate::cli::CONFIG_FILE);
        }
    }
    Ok(())
}

fn print_success(config: &RizzlerConfig) {
    println!();
    println!(
        "Initiated {} project with {}",
        style(config.framework).cyan(),
        style(config.command).cyan()
    );
    println!();
    println!("Next steps:");
    println!("  rzl serve");
    println!();
    println!(
        "Then visit {}",
        style(format!("http://{}:{}", config.dev.host, config.dev.port)).green()
    );
}
