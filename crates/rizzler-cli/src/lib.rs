// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! Rizzler CLI library.
//!
//! This crate provides the `rzl` command-line interface: it scaffolds a Vite
//! single-page application into a server-rendered project, runs the host app
//! with the Vite dev server alongside, and builds production assets.
//!
//! # Usage
//!
//! ```bash
//! rzl initiate --react   # Scaffold pages/, templates/ and rizzler.toml
//! rzl serve              # Host app on :8000, Vite on :5173
//! rzl build              # Production assets and dist/index.html
//! rzl serve --production # Serve the build
//! rzl clean              # Remove package manager files
//! ```
//!
//! # Configuration
//!
//! Projects are configured via `rizzler.toml` at the project root. Command
//! line flags take precedence over the file.

/// Package manager and framework flags shared by the commands.
pub mod cli;
/// CLI commands (initiate, build, clean, serve, config).
pub mod commands;
/// Moving a scaffolded Vite project into the Rizzler layout.
pub mod scaffold;
/// Host application routes.
pub mod server;
/// File system watching for template reload.
pub mod watcher;
