use std::process::{Child, Command, Stdio};

use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_TERMINAL: &str = "konsole";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("empty host")]
    EmptyHost,
    #[error("host may not start with '-': {0}")]
    OptionLikeHost(String),
    #[error("host cannot be quoted for a shell: {0:?}")]
    UnquotableHost(String),
    #[error("empty terminal command")]
    EmptyTerminal,
    #[error("terminal command cannot be parsed: {0}")]
    InvalidTerminal(String),
    #[error("Failed to launch command: {command}: {message}")]
    LaunchFailed { command: String, message: String },
}

/// `ssh <host>` with the host shell-quoted.
pub fn ssh_command(host: &str) -> Result<String, LaunchError> {
    if host.is_empty() {
        return Err(LaunchError::EmptyHost);
    }
    if host.starts_with('-') {
        return Err(LaunchError::OptionLikeHost(host.to_string()));
    }

    let quoted =
        shlex::try_quote(host).map_err(|_| LaunchError::UnquotableHost(host.to_string()))?;
    Ok(format!("ssh {quoted}"))
}

/// Full command line in the shape `<terminal> -e ssh <quoted-host>`.
pub fn terminal_command_line(terminal: &str, host: &str) -> Result<String, LaunchError> {
    let terminal = terminal.trim();
    if terminal.is_empty() {
        return Err(LaunchError::EmptyTerminal);
    }
    Ok(format!("{terminal} -e {}", ssh_command(host)?))
}

/// Splits the command line back into argv. The quoted host always comes back
/// as a single trailing argument.
pub fn terminal_argv(terminal: &str, host: &str) -> Result<Vec<String>, LaunchError> {
    let command_line = terminal_command_line(terminal, host)?;
    let argv = shlex::split(&command_line)
        .ok_or_else(|| LaunchError::InvalidTerminal(terminal.trim().to_string()))?;
    if argv.is_empty() {
        return Err(LaunchError::EmptyTerminal);
    }
    Ok(argv)
}

/// Spawns the terminal without blocking the caller. A detached thread waits on
/// the child so an exited session never lingers as a zombie.
pub fn launch_ssh(terminal: &str, host: &str) -> Result<(), LaunchError> {
    let argv = terminal_argv(terminal, host)?;
    let (program, args) = argv.split_first().ok_or(LaunchError::EmptyTerminal)?;

    match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => {
            info!(%program, host, pid = child.id(), "launched ssh session");
            reap_in_background(child);
            Ok(())
        }
        Err(error) => {
            let command = ssh_command(host)?;
            warn!(%program, %command, %error, "terminal launch failed");
            Err(LaunchError::LaunchFailed {
                command,
                message: error.to_string(),
            })
        }
    }
}

fn reap_in_background(mut child: Child) {
    let pid = child.id();
    let spawned = std::thread::Builder::new()
        .name(format!("ssh-session-{pid}"))
        .spawn(move || match child.wait() {
            Ok(status) => debug!(pid, %status, "ssh session exited"),
            Err(error) => warn!(pid, %error, "failed to wait on ssh session"),
        });
    if let Err(error) = spawned {
        warn!(pid, %error, "failed to start session reaper");
    }
}
