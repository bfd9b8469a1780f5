//! Settings and the persisted document shape

use serde::{Deserialize, Serialize};

/// Default ssh port
pub const DEFAULT_SSH_PORT: &str = "22";

/// Default SOCKS tunnel port
pub const DEFAULT_TUNNEL_PORT: &str = "6060";

/// Effective settings for one invocation
///
/// Built once by [`super::resolve_settings`] and then only read. Ports are
/// kept as strings: values loaded from a file are passed to ssh verbatim and
/// only the config editor validates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Port passed to `ssh -p`
    pub ssh_port: String,
    /// Host passed to `ssh -J` when jumping
    pub jump_host: Option<String>,
    /// Local port for the `ssh -D` SOCKS tunnel
    pub tunnel_port: String,
    /// Candidate domain suffixes, tried in order
    pub domains: Vec<String>,
    /// Run ssh through `sshpass -e`
    pub sshpass: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ssh_port: DEFAULT_SSH_PORT.to_string(),
            jump_host: None,
            tunnel_port: DEFAULT_TUNNEL_PORT.to_string(),
            domains: Vec::new(),
            sshpass: false,
        }
    }
}

impl Settings {
    /// Serialize into the document shape used for display and persistence.
    ///
    /// A missing jump host becomes an empty string.
    pub fn to_document(&self) -> SettingsDocument {
        SettingsDocument {
            domains: self.domains.clone(),
            ssh: SshSection {
                port: self.ssh_port.clone(),
                jump: self.jump_host.clone().unwrap_or_default(),
                sshpass: self.sshpass,
            },
            tunnel: TunnelSection {
                port: self.tunnel_port.clone(),
            },
        }
    }
}

/// Persisted config document
///
/// ```toml
/// domains = ["example.com", "internal.example.org"]
///
/// [ssh]
/// port = "22"
/// jump = "jump.example.com"
/// sshpass = false
///
/// [tunnel]
/// port = "6060"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsDocument {
    pub domains: Vec<String>,
    pub ssh: SshSection,
    pub tunnel: TunnelSection,
}

/// `[ssh]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshSection {
    pub port: String,
    pub jump: String,
    pub sshpass: bool,
}

/// `[tunnel]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelSection {
    pub port: String,
}

impl SettingsDocument {
    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}
