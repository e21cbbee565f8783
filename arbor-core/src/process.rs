//! Child process spawning with stderr capture.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, trace};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    pub cwd: Option<PathBuf>,
    /// Added to the inherited environment.
    pub env: Vec<(String, String)>,
}

/// Runs `program` to completion.
///
/// Stdout goes straight to the terminal. Stderr is copied through as it
/// arrives and also captured, so a non-zero exit can report it in
/// [`Error::Spawn`].
pub fn spawn(program: &str, args: &[String], options: &SpawnOptions) -> Result<()> {
    let command_text = command_line(program, args);
    debug!(command = %command_text, cwd = ?options.cwd, "spawning");

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .envs(options.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if let Some(cwd) = &options.cwd {
        command.current_dir(cwd);
    }

    let mut child = command.spawn()?;
    let tee = child.stderr.take().map(|pipe| thread::spawn(move || tee_stderr(pipe)));

    let status = child.wait()?;
    let captured = tee.and_then(|handle| handle.join().ok()).unwrap_or_default();
    trace!(command = %command_text, ?status, "child exited");

    if status.success() {
        return Ok(());
    }

    Err(Error::Spawn {
        command: command_text,
        // Killed by a signal.
        code: status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&captured).into_owned(),
    })
}

fn tee_stderr(mut pipe: impl Read) -> Vec<u8> {
    let mut captured = Vec::new();
    let mut buf = [0u8; 8192];
    let mut terminal = io::stderr();

    loop {
        match pipe.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                let _ = terminal.write_all(&buf[..n]);
                captured.extend_from_slice(&buf[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
    let _ = terminal.flush();
    captured
}

fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|a| shell_quote(a)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quotes `arg` for a POSIX shell, leaving plain words alone.
pub fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
