// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! - `initiate`: Scaffold a Vite SPA into the project
//! - `build`: Build production assets and `dist/index.html`
//! - `clean`: Remove package manager files
//! - `serve`: Run the host app with the dev server alongside
//! - `config`: Print the resolved configuration

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::{Duration, Instant};

/// Production build command.
pub mod build;
/// Package manager cleanup command.
pub mod clean;
/// Configuration printing command.
pub mod config;
/// Project scaffolding command.
pub mod initiate;
/// Host application server command.
pub mod serve;

/// Awaits `step` behind a spinner and reports how long it took.
pub(crate) async fn with_spinner<F, T, E>(label: &str, quiet: bool, step: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    if quiet {
        return step.await;
    }

    let start = Instant::now();
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
        pb.set_style(spinner);
    }
    pb.set_message(label.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));

    let result = step.await;

    let elapsed = format!("{}ms", start.elapsed().as_millis());
    match &result {
        Ok(_) => pb.finish_with_message(format!(
            "{} {} {}",
            style("✓").green(),
            style(label).dim(),
            style(elapsed).dim()
        )),
        Err(_) => pb.abandon_with_message(format!(
            "{} {}",
            style("✗").red(),
            style(label).red()
        )),
    }
    result
}
