// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Output draining for child processes.
//!
//! Vite and the package managers write colourised, line-oriented output.
//! Each stream is read line by line and forwarded into `tracing` under the
//! configured logger target, with ANSI escapes removed.

use crate::config::LoggerName;
use regex::Regex;
use std::sync::OnceLock;
use std::io::ErrorKind;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;

/// Which standard stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Standard output, logged at INFO.
    Stdout,
    /// Standard error, logged at WARN.
    Stderr,
}

fn ansi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07]*\x07").expect("valid ANSI pattern")
    })
}

/// Removes ANSI colour and cursor escapes from a line.
pub fn strip_ansi(line: &str) -> String {
    ansi_pattern().replace_all(line, "").into_owned()
}

/// Cleans a raw line for logging. Returns `None` for lines with no content.
pub fn clean_line(line: &str) -> Option<String> {
    let cleaned = strip_ansi(line);
    let cleaned = cleaned.trim_end();
    if cleaned.trim().is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

// `tracing` targets must be constants, so every logger gets its own arm.
macro_rules! emit_for_targets {
    ($logger:expr, $stream:expr, $line:expr, [$($variant:ident => $target:literal),*]) => {
        match ($logger, $stream) {
            $(
                (LoggerName::$variant, Stream::Stdout) => tracing::info!(target: $target, "{}", $line),
                (LoggerName::$variant, Stream::Stderr) => tracing::warn!(target: $target, "{}", $line),
            )*
        }
    };
}

/// Logs one line under the logger's target.
pub fn emit(logger: LoggerName, stream: Stream, line: &str) {
    emit_for_targets!(logger, stream, line, [
        Gunicorn => "gunicorn",
        Rzl => "rzl",
        Uvicorn => "uvicorn"
    ]);
}

/// Spawns a task that forwards every line of `reader` to the logger.
///
/// See [`drain_lines`].
pub fn spawn_line_logger<R>(reader: R, logger: LoggerName, stream: Stream) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(drain_lines(reader, logger, stream))
}

/// Forwards every line of `reader` to the logger until EOF.
///
/// Lines are decoded lossily, so non-UTF-8 output never stops the drain. If
/// a read fails the rest of the stream is still consumed and discarded, so
/// the child never writes into a closed pipe.
pub async fn drain_lines<R>(reader: R, logger: LoggerName, stream: Stream)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => return,
            Ok(_) => {
                let raw = String::from_utf8_lossy(&buf);
                if let Some(line) = clean_line(raw.trim_end_matches(['\r', '\n'])) {
                    emit(logger, stream, &line);
                }
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                tracing::debug!("Discarding the rest of {:?}: {}", stream, err);
                if let Err(err) = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await {
                    tracing::debug!("Stopped reading {:?}: {}", stream, err);
                }
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_strip_ansi() {
        assert_eq!(
            strip_ansi("\x1b[32m\x1b[1mVITE\x1b[22m v5.2.0\x1b[39m  ready in 312 ms"),
            "VITE v5.2.0  ready in 312 ms"
        );
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn test_clean_line_drops_blank_lines() {
        assert_eq!(clean_line(""), None);
        assert_eq!(clean_line("   \x1b[2K"), None);
        assert_eq!(
            clean_line("  ➜  Local:   http://localhost:5173/  "),
            Some("  ➜  Local:   http://localhost:5173/".to_string())
        );
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn capture() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::TRACE)
            .finish();
        (captured, tracing::subscriber::set_default(subscriber))
    }

    #[tokio::test]
    async fn test_stdout_lines_logged_at_info_under_target() {
        let (captured, _guard) = capture();

        let input: &[u8] = b"first\n\n   \n\x1b[32mVITE\x1b[39m ready\nlast";
        drain_lines(input, LoggerName::Rzl, Stream::Stdout).await;

        let text = captured.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3, "{text}");
        assert!(lines[0].ends_with("INFO rzl: first"), "{text}");
        assert!(lines[1].ends_with("INFO rzl: VITE ready"), "{text}");
        assert!(lines[2].ends_with("INFO rzl: last"), "{text}");
    }

    #[tokio::test]
    async fn test_stderr_lines_logged_at_warn_under_target() {
        let (captured, _guard) = capture();

        let input: &[u8] = b"deprecated option\r\n";
        drain_lines(input, LoggerName::Gunicorn, Stream::Stderr).await;
        drain_lines(input, LoggerName::Uvicorn, Stream::Stdout).await;

        let text = captured.text();
        assert!(text.contains("WARN gunicorn: deprecated option\n"), "{text}");
        assert!(text.contains("INFO uvicorn: deprecated option\n"), "{text}");
        assert!(!text.contains('\r'));
    }

    #[tokio::test]
    async fn test_non_utf8_line_does_not_stop_the_drain() {
        let (captured, _guard) = capture();

        let input: &[u8] = b"caf\xe9\n\xff\nafter\n";
        drain_lines(input, LoggerName::Rzl, Stream::Stdout).await;

        let text = captured.text();
        assert!(text.contains("INFO rzl: caf\u{FFFD}"), "{text}");
        assert!(text.contains("INFO rzl: after"), "{text}");
    }

    #[tokio::test]
    async fn test_line_logger_finishes_at_eof() {
        let input: &[u8] = b"first\n\nsecond\n";
        let handle = spawn_line_logger(input, LoggerName::Rzl, Stream::Stdout);
        handle.await.unwrap();
    }
}
