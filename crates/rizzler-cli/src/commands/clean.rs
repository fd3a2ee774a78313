// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Removes files generated by the JavaScript package manager.
//!
//! `pages/`, `public/`, `templates/` and `rizzler.toml` are project sources
//! and stay. The configured `dist_dir` is only removed when it names a
//! directory inside the project that is not one of those sources.

use anyhow::bail;
use rizzler::rewrite::VITE_CONFIG_FILES;
use rizzler::{PackageManager, RizzlerConfig};
use std::path::{Component, Path};

use crate::cli::CONFIG_FILE;
use crate::scaffold::remove_path;

/// Cleans the project in the current directory.
pub fn run() -> anyhow::Result<()> {
    let root = std::env::current_dir()?;
    let dist_dir = RizzlerConfig::load_or_default(root.join(CONFIG_FILE))
        .map(|config| config.build.dist_dir)
        .unwrap_or_else(|err| {
            tracing::warn!("Ignoring {}: {}", CONFIG_FILE, err);
            RizzlerConfig::default().build.dist_dir
        });

    for name in clean(&root, &dist_dir)? {
        tracing::info!("D {}", name);
    }
    Ok(())
}

/// Top-level entries a build output directory may never overlap.
const PROJECT_SOURCES: &[&str] = &["pages", "public", "templates", CONFIG_FILE];

/// Checks that `dist_dir` is a relative path below the project root that
/// does not reach into the project sources.
pub fn validate_dist_dir(dist_dir: &str) -> anyhow::Result<()> {
    let path = Path::new(dist_dir);
    let mut components = path.components().peekable();
    if components.peek().is_none() {
        bail!("Refusing to clean an empty dist_dir");
    }
    if !components.all(|component| matches!(component, Component::Normal(_))) {
        bail!("Refusing to clean dist_dir `{}`: it must stay inside the project", dist_dir);
    }
    if let Some(Component::Normal(first)) = path.components().next() {
        if PROJECT_SOURCES.iter().any(|source| first == *source) {
            bail!("Refusing to clean dist_dir `{}`: it overlaps the project sources", dist_dir);
        }
    }
    Ok(())
}

/// Every path `clean` considers, relative to the project root.
pub fn candidates(dist_dir: &str) -> Vec<String> {
    let mut names = vec!["node_modules".to_string(), "package.json".to_string()];
    names.extend(
        PackageManager::ALL
            .iter()
            .flat_map(|pm| pm.lockfiles())
            .map(|lockfile| lockfile.to_string()),
    );
    names.extend(VITE_CONFIG_FILES.iter().map(|name| name.to_string()));
    names.push(dist_dir.to_string());
    names
}

/// Removes the generated files under `root`.
///
/// Returns the names that existed and were removed. Nothing is removed if
/// `dist_dir` fails [`validate_dist_dir`].
pub fn clean(root: &Path, dist_dir: &str) -> anyhow::Result<Vec<String>> {
    validate_dist_dir(dist_dir)?;

    let mut removed = Vec::new();
    for name in candidates(dist_dir) {
        let path = root.join(&name);
        if path.symlink_metadata().is_ok() {
            remove_path(&path)?;
            removed.push(name);
        }
    }
    Ok(removed)
}
