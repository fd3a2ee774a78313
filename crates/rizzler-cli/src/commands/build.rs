// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Production build command.
//!
//! Runs the package manager's `build` script, then rewrites the host template
//! into `<dist_dir>/index.html` using the Vite manifest, so the build can be
//! served without the template engine.

use anyhow::Context;
use console::style;
use rizzler::rewrite::rewrite_entry_html;
use rizzler::{Manifest, Rizzler, RizzlerConfig};
use std::fs;
use std::path::{Path, PathBuf};

use super::with_spinner;
use crate::cli::{resolve_config, PackageManagerFlags};

/// Builds production assets for the project in the current directory.
pub async fn run(package_manager: &PackageManagerFlags, quiet: bool) -> anyhow::Result<()> {
    let root = std::env::current_dir()?;
    let config = resolve_config(&root, package_manager, None)?;
    let rizzler = Rizzler::new(config.clone()).with_working_dir(&root);

    with_spinner(&format!("{} build", config.command), quiet, rizzler.build()).await?;

    let entry = write_entry_html(&root, &config)?;
    if !quiet {
        println!(
            "{} {}",
            style("Entry:").cyan(),
            style(entry.display()).green()
        );
    }
    Ok(())
}

/// Rewrites `templates/index.html` into the build directory.
///
/// Returns the path of the written file.
pub fn write_entry_html(root: &Path, config: &RizzlerConfig) -> anyhow::Result<PathBuf> {
    let dist = root.join(&config.build.dist_dir);
    let manifest = Manifest::from_dist(&dist)?;

    let template_path = root.join(&config.dev.templates_dir).join("index.html");
    let template = fs::read_to_string(&template_path)
        .with_context(|| format!("Failed to read {}", template_path.display()))?;

    let html = rewrite_entry_html(&template, &manifest, &config.build.assets_base)?;

    let entry = dist.join("index.html");
    fs::write(&entry, html).with_context(|| format!("Failed to write {}", entry.display()))?;
    tracing::debug!("Wrote {}", entry.display());
    Ok(entry)
}
