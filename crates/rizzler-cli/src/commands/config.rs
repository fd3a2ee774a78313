// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use crate::cli::{resolve_config, FrameworkFlags, PackageManagerFlags};

/// Prints the configuration the other commands would use, as TOML.
pub fn run(package_manager: &PackageManagerFlags, framework: &FrameworkFlags) -> anyhow::Result<()> {
    let root = std::env::current_dir()?;
    let config = resolve_config(&root, package_manager, Some(framework))?;
    print!("{}", config.to_toml()?);
    Ok(())
}
