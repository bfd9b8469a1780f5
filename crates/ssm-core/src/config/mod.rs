//! Configuration resolution
//!
//! Resolves settings from multiple sources with priority:
//! 1. Command-line flags (passed as [`ConfigOverrides`])
//! 2. User config (~/.config/ssm.conf), or failing that the system config
//!    (/usr/local/etc/ssm.conf); the first file found wins, they are not merged
//! 3. Defaults, plus sshpass availability detected from the environment

mod discovery;
pub mod edit;
mod types;

pub use discovery::{
    load, resolve_settings, sshpass_available, sshpass_installed, ConfigError, ConfigOverrides,
    ConfigPaths, ConfigSource,
};
pub use types::{
    Settings, SettingsDocument, SshSection, TunnelSection, DEFAULT_SSH_PORT, DEFAULT_TUNNEL_PORT,
};
