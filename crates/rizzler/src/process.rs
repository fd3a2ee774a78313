// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Dev server supervision.
//!
//! [`Rizzler`] owns the configuration and at most one running Vite dev
//! server. One-shot commands (scaffold, install, build) run to completion
//! with their output drained into the configured logger; the dev server is
//! spawned in the background and kept until [`Rizzler::shutdown`].

use crate::config::RizzlerConfig;
use crate::error::{RizzlerError, RizzlerResult};
use crate::output::{spawn_line_logger, Stream};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// How long `shutdown` waits after SIGTERM before killing the dev server.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Executable name or path.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
}

impl CommandLine {
    /// Creates a command line.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn to_command(&self, working_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// A dev server child and the tasks draining its output.
#[derive(Debug)]
struct DevServer {
    command: String,
    child: Child,
    drains: Vec<JoinHandle<()>>,
}

/// Vite integration for a host application.
///
/// Holds the configuration and a single dev server slot. All operations
/// run inside `working_dir` (the project root containing `package.json`).
#[derive(Debug)]
pub struct Rizzler {
    config: RizzlerConfig,
    working_dir: PathBuf,
    grace_period: Duration,
    dev_command: Option<CommandLine>,
    dev_server: Mutex<Option<DevServer>>,
}

impl Rizzler {
    /// Creates a supervisor rooted at the current directory.
    pub fn new(config: RizzlerConfig) -> Self {
        Self {
            config,
            working_dir: PathBuf::from("."),
            grace_period: DEFAULT_GRACE_PERIOD,
            dev_command: None,
            dev_server: Mutex::new(None),
        }
    }

    /// Sets the project root that commands run in.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Sets how long `shutdown` waits for a graceful exit.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Replaces the package manager's `dev` script with another command.
    pub fn with_dev_command(mut self, cmd: CommandLine) -> Self {
        self.dev_command = Some(cmd);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RizzlerConfig {
        &self.config
    }

    /// Returns the project root.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Scaffolds a new Vite project into `dir` (relative to the project root)
    /// and waits for the scaffolding tool to finish.
    ///
    /// # Errors
    ///
    /// Fails if the tool cannot be spawned or exits unsuccessfully.
    pub async fn initiate(&self, dir: &str) -> RizzlerResult<()> {
        let cmd = self
            .config
            .command
            .create_command(self.config.framework, dir);
        self.run(&cmd).await
    }

    /// Installs the project's JavaScript dependencies.
    ///
    /// # Errors
    ///
    /// Fails if the package manager cannot be spawned or exits unsuccessfully.
    pub async fn install(&self) -> RizzlerResult<()> {
        self.run(&self.config.command.install_command()).await
    }

    /// Runs the Vite production build and waits for it to finish.
    ///
    /// # Errors
    ///
    /// Fails if the build cannot be spawned or exits unsuccessfully.
    pub async fn build(&self) -> RizzlerResult<()> {
        self.run(&self.config.command.build_command()).await
    }

    /// Starts the Vite dev server in the background and returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`RizzlerError::AlreadyRunning`] if a dev server started by
    /// this instance is still alive, or a spawn error.
    pub async fn serve(&self) -> RizzlerResult<()> {
        let cmd = self
            .dev_command
            .clone()
            .unwrap_or_else(|| self.config.command.dev_command());
        self.spawn(&cmd).await
    }

    /// Starts `cmd` as the supervised background process.
    ///
    /// # Errors
    ///
    /// See [`Rizzler::serve`].
    pub async fn spawn(&self, cmd: &CommandLine) -> RizzlerResult<()> {
        let mut slot = self.dev_server.lock().await;

        if let Some(server) = slot.as_mut() {
            match server.child.try_wait()? {
                Some(status) => {
                    tracing::debug!("Previous dev server `{}` exited with {}", server.command, status);
                }
                None => {
                    if let Some(pid) = server.child.id() {
                        return Err(RizzlerError::AlreadyRunning(pid));
                    }
                }
            }
        }

        let mut command = cmd.to_command(&self.working_dir);
        // Own process group so the package manager and Vite stop together.
        #[cfg(unix)]
        command.process_group(0);
        command.kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| RizzlerError::Spawn {
            command: cmd.to_string(),
            source,
        })?;
        let drains = self.drain(&mut child);

        tracing::info!(pid = child.id(), "Started `{}`", cmd);
        *slot = Some(DevServer {
            command: cmd.to_string(),
            child,
            drains,
        });

        Ok(())
    }

    /// Runs `cmd` to completion, draining its output into the logger.
    ///
    /// # Errors
    ///
    /// Fails if the command cannot be spawned or exits unsuccessfully.
    pub async fn run(&self, cmd: &CommandLine) -> RizzlerResult<()> {
        let status = self.run_status(cmd).await?;
        if status.success() {
            Ok(())
        } else {
            Err(RizzlerError::CommandFailed {
                command: cmd.to_string(),
                code: status.code(),
            })
        }
    }

    /// Runs `cmd` to completion and returns its exit status.
    ///
    /// # Errors
    ///
    /// Fails if the command cannot be spawned or awaited.
    pub async fn run_status(&self, cmd: &CommandLine) -> RizzlerResult<ExitStatus> {
        tracing::info!("Running `{}`", cmd);

        let mut child = cmd
            .to_command(&self.working_dir)
            .spawn()
            .map_err(|source| RizzlerError::Spawn {
                command: cmd.to_string(),
                source,
            })?;
        let drains = self.drain(&mut child);

        let status = child.wait().await?;
        for drain in drains {
            let _ = drain.await;
        }

        tracing::debug!("`{}` finished with {}", cmd, status);
        Ok(status)
    }

    /// Returns `true` while a dev server started by this instance is alive.
    pub async fn is_running(&self) -> bool {
        let mut slot = self.dev_server.lock().await;
        match slot.as_mut() {
            Some(server) => matches!(server.child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Process id of the running dev server.
    pub async fn dev_server_pid(&self) -> Option<u32> {
        let slot = self.dev_server.lock().await;
        slot.as_ref().and_then(|server| server.child.id())
    }

    /// Stops the dev server.
    ///
    /// Sends SIGTERM to the dev server's process group, waits for the grace
    /// period, then kills it. A process that has already exited is ignored,
    /// and calling this with no dev server is a no-op.
    pub async fn shutdown(&self) {
        let Some(mut server) = self.dev_server.lock().await.take() else {
            return;
        };

        if let Err(err) = terminate(&mut server.child, self.grace_period).await {
            tracing::debug!("Dev server `{}` was already gone: {}", server.command, err);
        }
        for drain in server.drains {
            let _ = drain.await;
        }
        tracing::info!("Stopped `{}`", server.command);
    }

    fn drain(&self, child: &mut Child) -> Vec<JoinHandle<()>> {
        let logger = self.config.logger_name;
        let mut drains = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            drains.push(spawn_line_logger(stdout, logger, Stream::Stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            drains.push(spawn_line_logger(stderr, logger, Stream::Stderr));
        }
        drains
    }
}

#[cfg(unix)]
async fn terminate(child: &mut Child, grace_period: Duration) -> std::io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        // Already reaped
        return Ok(());
    };

    let pgid = Pid::from_raw(i32::try_from(pid).unwrap_or(i32::MAX));
    match killpg(pgid, Signal::SIGTERM) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(errno) => return Err(std::io::Error::from(errno)),
    }

    match tokio::time::timeout(grace_period, child.wait()).await {
        Ok(result) => result.map(|_| ()),
        Err(_) => {
            tracing::warn!(pid, "Dev server ignored SIGTERM, killing it");
            let _ = killpg(pgid, Signal::SIGKILL);
            child.kill().await
        }
    }
}

#[cfg(not(unix))]
async fn terminate(child: &mut Child, _grace_period: Duration) -> std::io::Result<()> {
    child.kill().await
}
