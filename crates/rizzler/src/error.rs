// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for Rizzler.
//!
//! Configuration errors are raised as soon as a value is read. Subprocess
//! and filesystem errors carry enough context (the command line, the path)
//! to be reported directly by the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by configuration, supervision and rendering.
#[derive(Debug, Error)]
pub enum RizzlerError {
    /// The package manager is not one of the supported commands.
    #[error(
        "The \"command\" value must be one of \"bun\", \"deno\", \"npm\", \"pnpm\", or \"yarn\" (got {0:?})."
    )]
    InvalidCommand(String),

    /// The frontend framework is not supported.
    #[error(
        "The \"framework\" value must be one of \"angular\", \"react\", \"svelte\", or \"vue\" (got {0:?})."
    )]
    InvalidFramework(String),

    /// The logger name is not one of the known targets.
    #[error(
        "The \"logger_name\" value must be one of \"gunicorn\", \"rzl\", or \"uvicorn\" (got {0:?})."
    )]
    InvalidLoggerName(String),

    /// `serve` was called while a dev server is still alive.
    #[error("Dev server is already running (pid {0})")]
    AlreadyRunning(u32),

    /// The child process could not be started.
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        /// Command line that failed.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The child process exited unsuccessfully.
    #[error("`{command}` exited with {}", exit_code_label(.code))]
    CommandFailed {
        /// Command line that failed.
        command: String,
        /// Exit code, `None` when the process was killed by a signal.
        code: Option<i32>,
    },

    /// No Vite manifest was found in the build output.
    #[error("Vite manifest not found in {0} (is `build.manifest` enabled?)")]
    ManifestNotFound(PathBuf),

    /// The manifest has no chunk for the requested source path.
    #[error("No manifest entry for {0:?}")]
    MissingEntry(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `rizzler.toml` could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration could not be serialized.
    #[error("Could not serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// The manifest JSON could not be parsed.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Template loading or rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}

/// Result type alias for Rizzler operations.
pub type RizzlerResult<T> = Result<T, RizzlerError>;
