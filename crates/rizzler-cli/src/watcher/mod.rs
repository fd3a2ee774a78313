// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! File system watching for template reload.
//!
//! Vite reloads the SPA itself; this only covers the server-side templates
//! the host application renders.
//!
//! # Features
//!
//! - Debounced file change events (750ms)
//! - Filters for relevant file types
//! - Recursive directory watching

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, RecommendedCache};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Debounce window for change events.
pub const DEBOUNCE: Duration = Duration::from_millis(750);

/// Watches a directory for changes to files with given extensions.
///
/// Watching stops when the value is dropped.
pub struct FileWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl FileWatcher {
    /// Creates a watcher over `path`, recursively.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory to watch
    /// * `base_path` - Base path for computing relative paths
    /// * `extensions` - File extensions (without the dot) that trigger `on_change`
    /// * `on_change` - Callback invoked with the changed paths, relative to `base_path`
    pub fn new<F>(
        path: &Path,
        base_path: PathBuf,
        extensions: &'static [&'static str],
        on_change: F,
    ) -> anyhow::Result<Self>
    where
        F: Fn(Vec<PathBuf>) + Send + 'static,
    {
        let mut debouncer = new_debouncer(DEBOUNCE, None, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    let mut changed: Vec<PathBuf> = events
                        .iter()
                        .flat_map(|e| e.paths.iter())
                        .filter(|p| has_extension(p, extensions))
                        .map(|p| p.strip_prefix(&base_path).unwrap_or(p).to_path_buf())
                        .collect();
                    changed.sort();
                    changed.dedup();

                    if !changed.is_empty() {
                        on_change(changed);
                    }
                }
                Err(errors) => {
                    for error in errors {
                        tracing::warn!("Watch error: {}", error);
                    }
                }
            }
        })?;

        debouncer.watch(path, RecursiveMode::Recursive)?;
        tracing::debug!("Watching {} for {:?}", path.display(), extensions);

        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.contains(&ext))
}
