// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use clap::{Parser, Subcommand};
use rizzler_cli::cli::{FrameworkFlags, PackageManagerFlags};
use rizzler_cli::commands;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rzl")]
#[command(author = "Sitt Guruvanich")]
#[command(version)]
#[command(about = "Embed a Vite SPA into a server-rendered web app", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Quiet mode: only show errors (useful for CI)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initiate a new project
    Initiate {
        #[command(flatten)]
        package_manager: PackageManagerFlags,
        #[command(flatten)]
        framework: FrameworkFlags,
    },
    /// Build production assets and the HTML entry point
    Build {
        #[command(flatten)]
        package_manager: PackageManagerFlags,
    },
    /// Clean up files generated by the package manager
    Clean,
    /// Run the host app with the Vite dev server alongside
    Serve {
        #[command(flatten)]
        package_manager: PackageManagerFlags,
        /// Port to run the server on (defaults to rizzler.toml, then 8000)
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to (defaults to rizzler.toml, then 127.0.0.1)
        #[arg(long)]
        host: Option<String>,
        /// Serve the production build instead of the dev server
        #[arg(long)]
        production: bool,
    },
    /// Print the resolved configuration
    Config {
        #[command(flatten)]
        package_manager: PackageManagerFlags,
        #[command(flatten)]
        framework: FrameworkFlags,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with the specified log level
    let level = if cli.quiet { "error" } else { cli.log_level.as_str() };
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Initiate {
            package_manager,
            framework,
        } => commands::initiate::run(&package_manager, &framework, cli.quiet).await,
        Commands::Build { package_manager } => {
            commands::build::run(&package_manager, cli.quiet).await
        }
        Commands::Clean => commands::clean::run(),
        Commands::Serve {
            package_manager,
            port,
            host,
            production,
        } => {
            let options = commands::serve::ServeOptions {
                host,
                port,
                production,
                quiet: cli.quiet,
            };
            commands::serve::run(&package_manager, options).await
        }
        Commands::Config {
            package_manager,
            framework,
        } => commands::config::run(&package_manager, &framework),
    }
}
