//! Resolve the host and start the ssh session

use anyhow::{Context, Result};
use ssm_core::config::{resolve_settings, ConfigOverrides, ConfigPaths};
use ssm_core::resolver::{resolve, SystemLookup};
use ssm_core::session::{SessionCommand, SessionRequest};
use std::time::Duration;
use tracing::debug;

/// Options for one connection
#[derive(Debug, Clone)]
pub struct ConnectArgs {
    pub host: String,
    pub jump: bool,
    pub jumphost: Option<String>,
    pub port: Option<String>,
    pub tunnel: bool,
    pub dry_run: bool,
    pub lookup_timeout: u64,
}

/// Execute a connection
pub fn execute(args: ConnectArgs) -> Result<()> {
    let paths = ConfigPaths::discover()?;
    let request = SessionRequest {
        use_jump: args.jump || args.jumphost.is_some(),
        tunnel: args.tunnel,
    };
    let overrides = ConfigOverrides {
        port: args.port,
        jump_host: args.jumphost,
    };

    let settings = resolve_settings(&overrides, &paths)?;
    let lookup = SystemLookup::new(Duration::from_secs(args.lookup_timeout));

    let target = resolve(&args.host, &settings.domains, &lookup)?;
    debug!(host = %args.host, target = %target, "Resolved host");

    let command = SessionCommand::build(&target, &settings, &request)?;

    if args.dry_run {
        println!("{command}");
        return Ok(());
    }

    debug!(command = %command, "Starting session");
    let status = command
        .to_command()
        .status()
        .with_context(|| format!("Failed to run '{}'. Is it installed?", command.program))?;

    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }

    Ok(())
}
