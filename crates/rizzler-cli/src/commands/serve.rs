// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Host application server command.
//!
//! In development the Vite dev server runs for as long as the host app does
//! and templates reload on change. With `--production` the build is served
//! with manifest-resolved assets and no dev server.

use anyhow::Context;
use console::style;
use rizzler::lifespan::{serve_app, shutdown_signal};
use rizzler::{AssetMode, Manifest, RizzleTemplates, Rizzler, RizzlerConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::cli::{resolve_config, PackageManagerFlags};
use crate::server::create_app;
use crate::watcher::FileWatcher;

/// Options for `rzl serve`.
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    /// Bind address, overriding `dev.host`.
    pub host: Option<String>,
    /// Port, overriding `dev.port`.
    pub port: Option<u16>,
    /// Serve the production build.
    pub production: bool,
    /// Suppress the banner.
    pub quiet: bool,
}

/// Runs the host application until Ctrl+C.
pub async fn run(package_manager: &PackageManagerFlags, options: ServeOptions) -> anyhow::Result<()> {
    let root = std::env::current_dir()?;
    let config = resolve_config(&root, package_manager, None)?;

    let mode = asset_mode(&root, &config, options.production)?;
    let templates_dir = root.join(&config.dev.templates_dir);
    let templates = RizzleTemplates::new(&templates_dir, mode)
        .with_context(|| format!("Failed to load templates from {}", templates_dir.display()))?;
    let (app, state) = create_app(templates, &config);

    let reload_state = state.clone();
    let _watcher = FileWatcher::new(&templates_dir, root.clone(), &["html"], move |paths: Vec<PathBuf>| {
        let changed = paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        let mut templates = reload_state.templates.blocking_write();
        match templates.reload() {
            Ok(()) => tracing::info!("Reloaded {}", changed),
            Err(err) => tracing::error!("Failed to reload {}: {}", changed, err),
        }
    })?;

    let host = options.host.unwrap_or_else(|| config.dev.host.clone());
    let port = options.port.unwrap_or(config.dev.port);
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    if !options.quiet {
        println!(
            "{} {}",
            style("Server:").cyan(),
            style(format!("http://{}", addr)).green().bold()
        );
        if options.production {
            println!(
                "{} {}",
                style("Assets:").cyan(),
                style(&config.build.dist_dir).dim()
            );
        } else {
            println!(
                "{} {}",
                style("Vite:").cyan(),
                style(&config.dev.vite_url).dim()
            );
        }
        println!();
    }

    if options.production {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        let rizzler = Rizzler::new(config).with_working_dir(&root);
        serve_app(listener, app, &rizzler).await?;
    }

    Ok(())
}

/// Dev server assets, or the build's manifest in production.
pub fn asset_mode(root: &Path, config: &RizzlerConfig, production: bool) -> anyhow::Result<AssetMode> {
    if !production {
        return Ok(AssetMode::Dev {
            vite_url: config.dev.vite_url.clone(),
        });
    }

    let dist = root.join(&config.build.dist_dir);
    let manifest = Manifest::from_dist(&dist).context("Run `rzl build` before serving in production")?;
    Ok(AssetMode::Production {
        manifest: Arc::new(manifest),
        base: config.build.assets_base.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_asset_mode() {
        let dir = tempfile::tempdir().unwrap();
        let config = RizzlerConfig::default();

        match asset_mode(dir.path(), &config, false).unwrap() {
            AssetMode::Dev { vite_url } => assert_eq!(vite_url, "http://localhost:5173"),
            other => panic!("unexpected mode: {other:?}"),
        }

        assert!(asset_mode(dir.path(), &config, true).is_err());

        fs::create_dir_all(dir.path().join("dist")).unwrap();
        fs::write(dir.path().join("dist/manifest.json"), "{}").unwrap();
        match asset_mode(dir.path(), &config, true).unwrap() {
            AssetMode::Production { base, .. } => assert_eq!(base, "/dist"),
            other => panic!("unexpected mode: {other:?}"),
        }
    }
}
