//! ssh command assembly
//!
//! Builds the command line for an interactive session to an already resolved
//! target. Running it is left to the caller.

use crate::config::Settings;
use std::fmt;
use std::process::Command;
use thiserror::Error;

/// Session assembly error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// `--jump` was requested but no jump host is configured
    #[error("No jump host configured. Set one with `ssm --configure` or pass -J <host>")]
    NoJumpHost,
}

/// Per-invocation session options from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionRequest {
    /// Route through the jump host
    pub use_jump: bool,
    /// Open a SOCKS tunnel on the configured tunnel port
    pub tunnel: bool,
}

/// Program plus arguments for one ssh session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SessionCommand {
    /// Assemble `ssh -p <port> <target> [-J <jump>] [-D <tunnel port>]`.
    ///
    /// sshpass is only used without a jump host and when the target has no
    /// `user@` prefix.
    pub fn build(
        target: &str,
        settings: &Settings,
        request: &SessionRequest,
    ) -> Result<Self, SessionError> {
        let mut args = vec![
            "-p".to_string(),
            settings.ssh_port.clone(),
            target.to_string(),
        ];
        let mut program = "ssh".to_string();

        if request.use_jump {
            let jump = settings
                .jump_host
                .as_deref()
                .filter(|jump| !jump.is_empty())
                .ok_or(SessionError::NoJumpHost)?;
            args.push("-J".to_string());
            args.push(jump.to_string());
        } else if settings.sshpass && !target.contains('@') {
            args.insert(0, program);
            args.insert(0, "-e".to_string());
            program = "sshpass".to_string();
        }

        if request.tunnel {
            args.push("-D".to_string());
            args.push(settings.tunnel_port.clone());
        }

        Ok(Self { program, args })
    }

    /// Process builder for this command, inheriting stdio
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for SessionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
