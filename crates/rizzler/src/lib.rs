// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! # Rizzler
//!
//! Embed a Vite single-page application into a server-rendered web app.
//!
//! Rizzler keeps the Vite dev server alive for as long as the host
//! application runs, injects the hot-module-reload client into rendered
//! HTML, and resolves built assets through the Vite manifest in production.
//!
//! ## Features
//!
//! - Dev server supervision with output streamed into `tracing`
//! - `vite_hmr_client()` and `vite_asset(path=...)` template globals (Tera)
//! - Production asset resolution from `.vite/manifest.json`
//! - Axum lifespan helper that stops the dev server on shutdown
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rizzler::{AssetMode, RizzleTemplates, Rizzler, RizzlerConfig};
//!
//! let config = RizzlerConfig::from_pairs([("framework", "react")])?;
//! let rizzler = Rizzler::new(config);
//! let mode = AssetMode::Dev {
//!     vite_url: rizzler.config().dev.vite_url.clone(),
//! };
//! let templates = RizzleTemplates::new("templates", mode)?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! rizzler::lifespan::serve_app(listener, app, &rizzler).await?;
//! ```

/// Configuration record and its validated enumerations.
pub mod config;
/// Error types.
pub mod error;
/// Axum integration: dev server lifespan and static routes.
pub mod lifespan;
/// Vite build manifest.
pub mod manifest;
/// Child process output draining.
pub mod output;
/// Dev server supervision and one-shot package manager commands.
pub mod process;
/// Text edits over scaffolded and built files.
pub mod rewrite;
/// Template globals and tag generation.
pub mod templating;

pub use config::{Framework, LoggerName, PackageManager, RizzlerConfig};
pub use error::{RizzlerError, RizzlerResult};
pub use manifest::{EntryAssets, Manifest, ManifestChunk};
pub use process::{CommandLine, Rizzler};
pub use templating::{AssetMode, RizzleTemplates};
