//! CLI definition and dispatch

use anyhow::Result;
use clap::Parser;

mod config_cmd;
mod configure;
mod connect;

/// ssm - An SSH wrapper to simplify life
#[derive(Parser, Debug)]
#[command(
    name = "ssm",
    version,
    about = "An SSH wrapper to simplify life",
    long_about = "Resolves a short host name by trying it as an IP address, as a fully \
                  qualified name, and then with each configured candidate domain appended, \
                  and starts an ssh session to the first one that resolves"
)]
pub struct Cli {
    /// Subdomain of the host's url or the host's IP address, optionally as user@host
    #[arg(required_unless_present_any = ["show_config", "configure"])]
    host: Option<String>,

    /// SSH via the jump host specified in the configuration file
    #[arg(short = 'j', long, conflicts_with = "jumphost")]
    jump: bool,

    /// Override the jump host specified in the configuration file (implies --jump)
    #[arg(short = 'J', long, value_name = "HOST")]
    jumphost: Option<String>,

    /// Port to use for the SSH session
    #[arg(short, long)]
    port: Option<String>,

    /// Start a SOCKS5 tunnel on the port defined in the configuration file
    #[arg(short, long)]
    tunnel: bool,

    /// Print the ssh command instead of running it
    #[arg(long)]
    dry_run: bool,

    /// Upper bound in seconds for each name lookup
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 3,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    lookup_timeout: u64,

    /// Show the effective configuration and exit
    #[arg(long, conflicts_with = "configure")]
    show_config: bool,

    /// Output --show-config as JSON
    #[arg(long, requires = "show_config")]
    json: bool,

    /// Interactively edit and save the configuration
    #[arg(long)]
    configure: bool,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        if self.configure {
            return configure::execute();
        }

        if self.show_config {
            return config_cmd::execute(self.json);
        }

        connect::execute(connect::ConnectArgs {
            host: self.host.unwrap_or_default(),
            jump: self.jump,
            jumphost: self.jumphost,
            port: self.port,
            tunnel: self.tunnel,
            dry_run: self.dry_run,
            lookup_timeout: self.lookup_timeout,
        })
    }
}
