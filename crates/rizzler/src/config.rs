// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Rizzler configuration.
//!
//! Configuration is an explicit [`RizzlerConfig`] value. It can be built from
//! `(key, value)` pairs or loaded from `rizzler.toml` at the project root.
//!
//! # Example Configuration
//!
//! ```toml
//! command = "pnpm"
//! framework = "react"
//! logger_name = "rzl"
//!
//! [dev]
//! host = "127.0.0.1"
//! port = 8000
//! vite_url = "http://localhost:5173"
//!
//! [build]
//! dist_dir = "dist"
//! assets_base = "/dist"
//! ```

use crate::error::{RizzlerError, RizzlerResult};
use crate::process::CommandLine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// JavaScript package manager used to run Vite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PackageManager {
    /// Bun
    Bun,
    /// Deno (npm compatibility mode)
    Deno,
    /// npm
    Npm,
    /// pnpm
    #[default]
    Pnpm,
    /// Yarn
    Yarn,
}

impl PackageManager {
    /// Every supported package manager, in flag order.
    pub const ALL: [PackageManager; 5] = [
        PackageManager::Bun,
        PackageManager::Deno,
        PackageManager::Npm,
        PackageManager::Pnpm,
        PackageManager::Yarn,
    ];

    /// Returns the executable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Bun => "bun",
            PackageManager::Deno => "deno",
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
        }
    }

    /// Scaffolds a new Vite project for `framework` into `dir`.
    pub fn create_command(&self, framework: Framework, dir: &str) -> CommandLine {
        let package = match framework {
            Framework::Angular => "analog@latest",
            _ => "vite@latest",
        };
        let mut forwarded = Vec::new();
        if let Some(template) = framework.vite_template() {
            forwarded.push("--template".to_string());
            forwarded.push(template.to_string());
        }

        let mut args: Vec<String> = match self {
            PackageManager::Deno => vec![
                "run".to_string(),
                "-A".to_string(),
                format!("npm:create-{}", package),
                dir.to_string(),
            ],
            _ => vec!["create".to_string(), package.to_string(), dir.to_string()],
        };

        // npm swallows flags meant for the initializer unless they follow `--`
        if *self == PackageManager::Npm && !forwarded.is_empty() {
            args.push("--".to_string());
        }
        args.extend(forwarded);

        CommandLine::new(self.as_str(), args)
    }

    /// Installs the dependencies listed in `package.json`.
    pub fn install_command(&self) -> CommandLine {
        CommandLine::new(self.as_str(), ["install"])
    }

    /// Starts the Vite dev server.
    pub fn dev_command(&self) -> CommandLine {
        self.script_command("dev")
    }

    /// Runs the Vite production build.
    pub fn build_command(&self) -> CommandLine {
        self.script_command("build")
    }

    fn script_command(&self, script: &str) -> CommandLine {
        match self {
            PackageManager::Deno => CommandLine::new("deno", ["task", script]),
            _ => CommandLine::new(self.as_str(), ["run", script]),
        }
    }

    /// Lockfiles this package manager writes next to `package.json`.
    pub fn lockfiles(&self) -> &'static [&'static str] {
        match self {
            PackageManager::Bun => &["bun.lockb", "bun.lock"],
            PackageManager::Deno => &["deno.lock"],
            PackageManager::Npm => &["package-lock.json"],
            PackageManager::Pnpm => &["pnpm-lock.yaml"],
            PackageManager::Yarn => &["yarn.lock"],
        }
    }
}

impl FromStr for PackageManager {
    type Err = RizzlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bun" => Ok(PackageManager::Bun),
            "deno" => Ok(PackageManager::Deno),
            "npm" => Ok(PackageManager::Npm),
            "pnpm" => Ok(PackageManager::Pnpm),
            "yarn" => Ok(PackageManager::Yarn),
            _ => Err(RizzlerError::InvalidCommand(s.to_string())),
        }
    }
}

/// Frontend framework scaffolded into `pages/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Framework {
    /// Angular through Analog
    Angular,
    /// React
    React,
    /// Svelte
    Svelte,
    /// Vue
    #[default]
    Vue,
}

impl Framework {
    /// Every supported framework, in flag order.
    pub const ALL: [Framework; 4] = [
        Framework::Angular,
        Framework::React,
        Framework::Svelte,
        Framework::Vue,
    ];

    /// Returns the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Angular => "angular",
            Framework::React => "react",
            Framework::Svelte => "svelte",
            Framework::Vue => "vue",
        }
    }

    /// `create-vite` template name. Angular is scaffolded by `create-analog`.
    pub fn vite_template(&self) -> Option<&'static str> {
        match self {
            Framework::Angular => None,
            Framework::React => Some("react"),
            Framework::Svelte => Some("svelte"),
            Framework::Vue => Some("vue"),
        }
    }

    /// Entry module inside `pages/`.
    pub fn entry_file(&self) -> &'static str {
        match self {
            Framework::Angular => "main.ts",
            Framework::React => "main.jsx",
            Framework::Svelte | Framework::Vue => "main.js",
        }
    }

    /// Entry module path relative to the project root, as Vite sees it.
    pub fn entry_path(&self) -> String {
        format!("pages/{}", self.entry_file())
    }

    /// Element the application mounts onto.
    pub fn mount_markup(&self) -> &'static str {
        match self {
            Framework::Angular => "<app-root></app-root>",
            Framework::React => r#"<div id="root"></div>"#,
            Framework::Svelte | Framework::Vue => r#"<div id="app"></div>"#,
        }
    }
}

impl FromStr for Framework {
    type Err = RizzlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "angular" => Ok(Framework::Angular),
            "react" => Ok(Framework::React),
            "svelte" => Ok(Framework::Svelte),
            "vue" => Ok(Framework::Vue),
            _ => Err(RizzlerError::InvalidFramework(s.to_string())),
        }
    }
}

/// `tracing` target that child process output is logged under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LoggerName {
    /// `gunicorn`
    Gunicorn,
    /// `rzl`, used by the CLI
    Rzl,
    /// `uvicorn`
    #[default]
    Uvicorn,
}

impl LoggerName {
    /// Returns the target name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoggerName::Gunicorn => "gunicorn",
            LoggerName::Rzl => "rzl",
            LoggerName::Uvicorn => "uvicorn",
        }
    }
}

impl FromStr for LoggerName {
    type Err = RizzlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gunicorn" => Ok(LoggerName::Gunicorn),
            "rzl" => Ok(LoggerName::Rzl),
            "uvicorn" => Ok(LoggerName::Uvicorn),
            _ => Err(RizzlerError::InvalidLoggerName(s.to_string())),
        }
    }
}

macro_rules! string_enum_conversions {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl TryFrom<String> for $ty {
                type Error = RizzlerError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    value.parse()
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> Self {
                    value.as_str().to_string()
                }
            }
        )*
    };
}

string_enum_conversions!(PackageManager, Framework, LoggerName);

/// Main configuration structure, usually loaded from `rizzler.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RizzlerConfig {
    /// Package manager used to run Vite.
    #[serde(default)]
    pub command: PackageManager,
    /// Frontend framework.
    #[serde(default)]
    pub framework: Framework,
    /// Logger target for dev server output.
    #[serde(default)]
    pub logger_name: LoggerName,
    /// Host application and dev server settings.
    #[serde(default)]
    pub dev: DevConfig,
    /// Production build settings.
    #[serde(default)]
    pub build: BuildConfig,
}

/// Development settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevConfig {
    /// Host application bind address (default: "127.0.0.1").
    #[serde(default = "default_host")]
    pub host: String,
    /// Host application port (default: 8000).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origin of the Vite dev server (default: "http://localhost:5173").
    #[serde(default = "default_vite_url")]
    pub vite_url: String,
    /// Server-side templates directory (default: "templates").
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
    /// Static files mounted at `/public` (default: "public").
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    /// Page title passed to templates (default: "Unspoken Rizz").
    #[serde(default = "default_title")]
    pub title: String,
}

/// Production build settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Vite output directory (default: "dist").
    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,
    /// URL prefix the build output is served under (default: "/dist").
    #[serde(default = "default_assets_base")]
    pub assets_base: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_vite_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_title() -> String {
    "Unspoken Rizz".to_string()
}

fn default_dist_dir() -> String {
    "dist".to_string()
}

fn default_assets_base() -> String {
    "/dist".to_string()
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            vite_url: default_vite_url(),
            templates_dir: default_templates_dir(),
            public_dir: default_public_dir(),
            title: default_title(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            dist_dir: default_dist_dir(),
            assets_base: default_assets_base(),
        }
    }
}

impl RizzlerConfig {
    /// Builds a configuration from `(key, value)` pairs on top of the defaults.
    ///
    /// Keys are matched case-insensitively. `command`, `framework` and
    /// `logger_name` are recognized; other keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the first invalid value.
    pub fn from_pairs<I, K, V>(pairs: I) -> RizzlerResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        config.apply_pairs(pairs)?;
        Ok(config)
    }

    /// Applies `(key, value)` pairs to this configuration. Later pairs win.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the first invalid value. Pairs
    /// before it have already been applied.
    pub fn apply_pairs<I, K, V>(&mut self, pairs: I) -> RizzlerResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref().to_lowercase().as_str() {
                "command" => self.command = value.parse()?,
                "framework" => self.framework = value.parse()?,
                "logger_name" => self.logger_name = value.parse()?,
                other => tracing::debug!("Ignoring unknown configuration key {:?}", other),
            }
        }
        Ok(())
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid values.
    pub fn load(path: impl AsRef<Path>) -> RizzlerResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads configuration from a TOML file, or the defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> RizzlerResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Serializes the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> RizzlerResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RizzlerConfig::default();
        assert_eq!(config.command, PackageManager::Pnpm);
        assert_eq!(config.framework, Framework::Vue);
        assert_eq!(config.logger_name, LoggerName::Uvicorn);
        assert_eq!(config.dev.vite_url, "http://localhost:5173");
    }

    #[test]
    fn test_accepts_exactly_the_enumerated_values() {
        for pm in ["bun", "deno", "npm", "pnpm", "yarn"] {
            assert_eq!(pm.parse::<PackageManager>().unwrap().as_str(), pm);
        }
        for fw in ["angular", "react", "svelte", "vue"] {
            assert_eq!(fw.parse::<Framework>().unwrap().as_str(), fw);
        }
        for name in ["gunicorn", "rzl", "uvicorn"] {
            assert_eq!(name.parse::<LoggerName>().unwrap().as_str(), name);
        }

        assert!(matches!(
            "cargo".parse::<PackageManager>(),
            Err(RizzlerError::InvalidCommand(_))
        ));
        assert!(matches!(
            "solid".parse::<Framework>(),
            Err(RizzlerError::InvalidFramework(_))
        ));
        assert!(matches!(
            "hypercorn".parse::<LoggerName>(),
            Err(RizzlerError::InvalidLoggerName(_))
        ));
        assert!("".parse::<PackageManager>().is_err());
    }

    #[test]
    fn test_command_and_framework_are_case_insensitive() {
        assert_eq!("PNPM".parse::<PackageManager>().unwrap(), PackageManager::Pnpm);
        assert_eq!("React".parse::<Framework>().unwrap(), Framework::React);
    }

    #[test]
    fn test_from_pairs() {
        let config = RizzlerConfig::from_pairs([
            ("COMMAND", "bun"),
            ("framework", "svelte"),
            ("logger_name", "rzl"),
            ("unrelated", "value"),
        ])
        .unwrap();
        assert_eq!(config.command, PackageManager::Bun);
        assert_eq!(config.framework, Framework::Svelte);
        assert_eq!(config.logger_name, LoggerName::Rzl);
    }

    #[test]
    fn test_from_pairs_rejects_invalid_value() {
        let err = RizzlerConfig::from_pairs([("command", "pip")]).unwrap_err();
        assert!(err.to_string().contains("\"command\" value must be one of"));
    }

    #[test]
    fn test_toml_roundtrip_and_validation() {
        let config: RizzlerConfig = toml::from_str(
            r#"
command = "yarn"
framework = "react"

[dev]
port = 9000
"#,
        )
        .unwrap();
        assert_eq!(config.command, PackageManager::Yarn);
        assert_eq!(config.framework, Framework::React);
        assert_eq!(config.dev.port, 9000);
        assert_eq!(config.dev.templates_dir, "templates");
        assert_eq!(config.build.dist_dir, "dist");

        let reparsed: RizzlerConfig = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(reparsed, config);

        let invalid = toml::from_str::<RizzlerConfig>(r#"framework = "ember""#);
        assert!(invalid.is_err());
    }

    #[test]
    fn test_create_command_per_package_manager() {
        assert_eq!(
            PackageManager::Pnpm
                .create_command(Framework::React, "rzl-tmp")
                .to_string(),
            "pnpm create vite@latest rzl-tmp --template react"
        );
        assert_eq!(
            PackageManager::Npm
                .create_command(Framework::Vue, "rzl-tmp")
                .to_string(),
            "npm create vite@latest rzl-tmp -- --template vue"
        );
        assert_eq!(
            PackageManager::Deno
                .create_command(Framework::Svelte, "rzl-tmp")
                .to_string(),
            "deno run -A npm:create-vite@latest rzl-tmp --template svelte"
        );
        assert_eq!(
            PackageManager::Npm
                .create_command(Framework::Angular, "rzl-tmp")
                .to_string(),
            "npm create analog@latest rzl-tmp"
        );
    }

    #[test]
    fn test_script_commands() {
        assert_eq!(PackageManager::Yarn.dev_command().to_string(), "yarn run dev");
        assert_eq!(PackageManager::Deno.build_command().to_string(), "deno task build");
        assert_eq!(PackageManager::Bun.install_command().to_string(), "bun install");
    }
}
