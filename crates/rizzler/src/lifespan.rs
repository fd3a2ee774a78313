// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Axum integration.
//!
//! The host application starts the Vite dev server before accepting
//! requests and stops it once the server has shut down.

use crate::config::RizzlerConfig;
use crate::error::RizzlerResult;
use crate::process::Rizzler;
use crate::templating::AssetMode;
use axum::Router;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

/// Runs `body` while the dev server is up.
///
/// The dev server is started first and always shut down afterwards,
/// whatever `body` returns.
///
/// # Errors
///
/// Returns an error only if the dev server fails to start.
pub async fn with_dev_server<F, T>(rizzler: &Rizzler, body: F) -> RizzlerResult<T>
where
    F: Future<Output = T>,
{
    rizzler.serve().await?;
    let output = body.await;
    rizzler.shutdown().await;
    Ok(output)
}

/// Serves `app` with the dev server running alongside, until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the dev server fails to start or the HTTP server fails.
pub async fn serve_app(listener: TcpListener, app: Router, rizzler: &Rizzler) -> RizzlerResult<()> {
    serve_app_with_shutdown(listener, app, rizzler, shutdown_signal()).await
}

/// Like [`serve_app`], stopping when `signal` resolves.
///
/// # Errors
///
/// Returns an error if the dev server fails to start or the HTTP server fails.
pub async fn serve_app_with_shutdown<S>(
    listener: TcpListener,
    app: Router,
    rizzler: &Rizzler,
    signal: S,
) -> RizzlerResult<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let served = with_dev_server(rizzler, async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await
    })
    .await?;
    Ok(served?)
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("Could not listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::warn!("Could not listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutting down");
}

/// Static file routes for the host application.
///
/// `/public` serves `dev.public_dir`. In production the build directory is
/// served under `build.assets_base` as well.
pub fn static_routes<S>(config: &RizzlerConfig, mode: &AssetMode) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let router = Router::new().nest_service("/public", ServeDir::new(&config.dev.public_dir));

    match mode {
        AssetMode::Dev { .. } => router,
        AssetMode::Production { base, .. } => {
            let base = format!("/{}", base.trim_matches('/'));
            let dist = ServeDir::new(&config.build.dist_dir);
            if base == "/" {
                router.fallback_service(dist)
            } else {
                router.nest_service(&base, dist)
            }
        }
    }
}
