// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Flags shared by several commands and configuration resolution.
//!
//! Within each group at most one flag may be given. A flag wins over
//! `rizzler.toml`, which wins over the built-in default.

use clap::Args;
use rizzler::{Framework, LoggerName, PackageManager, RizzlerConfig};
use std::path::Path;

/// Project configuration file, relative to the project root.
pub const CONFIG_FILE: &str = "rizzler.toml";

/// Package manager selection. Mutually exclusive.
#[derive(Args, Debug, Clone, Default)]
#[group(multiple = false)]
pub struct PackageManagerFlags {
    /// Use bun
    #[arg(long)]
    pub bun: bool,
    /// Use deno
    #[arg(long)]
    pub deno: bool,
    /// Use npm
    #[arg(long)]
    pub npm: bool,
    /// Use pnpm
    #[arg(long)]
    pub pnpm: bool,
    /// Use yarn
    #[arg(long)]
    pub yarn: bool,
}

impl PackageManagerFlags {
    /// The package manager picked on the command line, if any.
    pub fn selected(&self) -> Option<PackageManager> {
        let flags = [self.bun, self.deno, self.npm, self.pnpm, self.yarn];
        PackageManager::ALL
            .into_iter()
            .zip(flags)
            .find_map(|(pm, set)| set.then_some(pm))
    }
}

/// Framework selection. Mutually exclusive.
#[derive(Args, Debug, Clone, Default)]
#[group(multiple = false)]
pub struct FrameworkFlags {
    /// Scaffold Angular (through Analog)
    #[arg(long)]
    pub angular: bool,
    /// Scaffold React
    #[arg(long)]
    pub react: bool,
    /// Scaffold Svelte
    #[arg(long)]
    pub svelte: bool,
    /// Scaffold Vue
    #[arg(long)]
    pub vue: bool,
}

impl FrameworkFlags {
    /// The framework picked on the command line, if any.
    pub fn selected(&self) -> Option<Framework> {
        let flags = [self.angular, self.react, self.svelte, self.vue];
        Framework::ALL
            .into_iter()
            .zip(flags)
            .find_map(|(fw, set)| set.then_some(fw))
    }
}

/// Loads `rizzler.toml` from `root` and applies the command line flags.
///
/// Child process output always goes to the `rzl` logger.
pub fn resolve_config(
    root: &Path,
    package_manager: &PackageManagerFlags,
    framework: Option<&FrameworkFlags>,
) -> anyhow::Result<RizzlerConfig> {
    let mut config = RizzlerConfig::load_or_default(root.join(CONFIG_FILE))?;

    if let Some(pm) = package_manager.selected() {
        config.command = pm;
    }
    if let Some(fw) = framework.and_then(FrameworkFlags::selected) {
        config.framework = fw;
    }
    config.logger_name = LoggerName::Rzl;

    tracing::debug!(
        "Using {} with {} (logger {})",
        config.command,
        config.framework,
        config.logger_name
    );
    Ok(config)
}
