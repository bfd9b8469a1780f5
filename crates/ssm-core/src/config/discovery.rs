//! Config file discovery and layered loading

use super::types::Settings;
use crate::home;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml::{Table, Value};
use tracing::debug;

/// Environment variable holding the password for `sshpass -e`
pub const SSHPASS_ENV: &str = "SSHPASS";

/// Configuration error
///
/// Only a config file that exists but cannot be used is an error. A missing
/// file falls back to defaults, and a single key of the wrong shape is skipped.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file exists but could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file exists but is not valid TOML
    #[error("Config file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Settings could not be rendered as TOML
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Candidate config file locations, checked in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// User-scoped config, checked first
    pub user: PathBuf,
    /// System-wide config, checked when the user file is absent
    pub system: PathBuf,
}

/// Where the loaded settings came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    User,
    System,
    Defaults,
}

impl ConfigSource {
    /// Short label for display
    pub fn label(self) -> &'static str {
        match self {
            ConfigSource::User => "user config",
            ConfigSource::System => "system config",
            ConfigSource::Defaults => "defaults",
        }
    }
}

impl ConfigPaths {
    /// Standard locations for this user and host
    pub fn discover() -> anyhow::Result<Self> {
        let home_dir = home::get_home_dir()?;
        Ok(Self {
            user: home::user_config_path(&home_dir),
            system: home::system_config_path(),
        })
    }

    /// First existing config file, if any
    pub fn locate(&self) -> Option<(ConfigSource, &Path)> {
        if self.user.is_file() {
            return Some((ConfigSource::User, &self.user));
        }

        if self.system.is_file() {
            return Some((ConfigSource::System, &self.system));
        }

        None
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Override ssh port
    pub port: Option<String>,
    /// Override jump host
    pub jump_host: Option<String>,
}

/// Whether the `sshpass` binary is on PATH
pub fn sshpass_installed() -> bool {
    which::which("sshpass").is_ok()
}

/// Whether `sshpass` can be used: the binary is on PATH and `SSHPASS` is set.
pub fn sshpass_available() -> bool {
    if !sshpass_installed() {
        return false;
    }

    std::env::var_os(SSHPASS_ENV).is_some()
}

/// Load settings from defaults and the first config file found
///
/// # Errors
///
/// Returns [`ConfigError::Io`] or [`ConfigError::Corrupt`] when a config file
/// exists but cannot be read or parsed. Absence of both files is not an error.
pub fn load(paths: &ConfigPaths) -> Result<Settings, ConfigError> {
    let base = Settings {
        sshpass: sshpass_available(),
        ..Settings::default()
    };
    load_over(base, paths)
}

/// Resolve settings from all sources
///
/// Priority (highest to lowest):
/// 1. Command-line overrides
/// 2. Config file (user, else system)
/// 3. Defaults
pub fn resolve_settings(
    overrides: &ConfigOverrides,
    paths: &ConfigPaths,
) -> Result<Settings, ConfigError> {
    let mut settings = load(paths)?;
    apply_cli_overrides(&mut settings, overrides);
    Ok(settings)
}

fn load_over(mut settings: Settings, paths: &ConfigPaths) -> Result<Settings, ConfigError> {
    let Some((source, path)) = paths.locate() else {
        debug!("No config file found, using defaults");
        return Ok(settings);
    };

    debug!(source = source.label(), path = %path.display(), "Loading config file");
    let document = read_document(path)?;
    overlay(&mut settings, &document);
    Ok(settings)
}

fn read_document(path: &Path) -> Result<Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    contents.parse::<Table>().map_err(|source| ConfigError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Overlay the keys present in `document` onto `settings`, one key at a time.
///
/// A key with an unexpected type is skipped and the prior value kept; it
/// never affects the other keys.
fn overlay(settings: &mut Settings, document: &Table) {
    let ssh = section(document, "ssh");
    let tunnel = section(document, "tunnel");

    if let Some(port) = ssh.and_then(|t| port_value(t, "port", "ssh.port")) {
        settings.ssh_port = port;
    }

    if let Some(jump) = ssh.and_then(|t| string_value(t, "jump", "ssh.jump")) {
        settings.jump_host = if jump.is_empty() { None } else { Some(jump) };
    }

    if let Some(sshpass) = ssh.and_then(|t| bool_value(t, "sshpass", "ssh.sshpass")) {
        settings.sshpass = sshpass;
    }

    if let Some(port) = tunnel.and_then(|t| port_value(t, "port", "tunnel.port")) {
        settings.tunnel_port = port;
    }

    if let Some(domains) = domains_value(document) {
        settings.domains = domains;
    }
}

fn section<'a>(document: &'a Table, name: &str) -> Option<&'a Table> {
    match document.get(name)? {
        Value::Table(table) => Some(table),
        other => {
            skip(name, other);
            None
        }
    }
}

fn port_value(table: &Table, key: &str, label: &str) -> Option<String> {
    match table.get(key)? {
        Value::String(port) => Some(port.clone()),
        Value::Integer(port) => Some(port.to_string()),
        other => {
            skip(label, other);
            None
        }
    }
}

fn string_value(table: &Table, key: &str, label: &str) -> Option<String> {
    match table.get(key)? {
        Value::String(value) => Some(value.clone()),
        other => {
            skip(label, other);
            None
        }
    }
}

fn bool_value(table: &Table, key: &str, label: &str) -> Option<bool> {
    match table.get(key)? {
        Value::Boolean(value) => Some(*value),
        other => {
            skip(label, other);
            None
        }
    }
}

fn domains_value(document: &Table) -> Option<Vec<String>> {
    let value = document.get("domains")?;
    let Value::Array(items) = value else {
        skip("domains", value);
        return None;
    };

    let domains: Option<Vec<String>> = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect();

    if domains.is_none() {
        skip("domains", value);
    }
    domains
}

fn skip(key: &str, value: &Value) {
    debug!(key, found = value.type_str(), "Ignoring config key with unexpected type");
}

/// Apply command-line overrides
fn apply_cli_overrides(settings: &mut Settings, overrides: &ConfigOverrides) {
    if let Some(ref port) = overrides.port {
        settings.ssh_port = port.clone();
    }

    if let Some(ref jump_host) = overrides.jump_host {
        settings.jump_host = Some(jump_host.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn paths_in(temp_dir: &TempDir) -> ConfigPaths {
        ConfigPaths {
            user: temp_dir.path().join("home/.config/ssm.conf"),
            system: temp_dir.path().join("etc/ssm.conf"),
        }
    }

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn load_plain(paths: &ConfigPaths) -> Result<Settings, ConfigError> {
        load_over(Settings::default(), paths)
    }

    #[test]
    fn test_no_config_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = load_plain(&paths_in(&temp_dir)).unwrap();

        assert_eq!(settings.ssh_port, "22");
        assert_eq!(settings.tunnel_port, "6060");
        assert_eq!(settings.jump_host, None);
        assert!(settings.domains.is_empty());
    }

    #[test]
    fn test_only_ssh_port_overridden() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        write(&paths.user, "[ssh]\nport = \"2222\"\n");

        let settings = load_plain(&paths).unwrap();
        assert_eq!(
            settings,
            Settings {
                ssh_port: "2222".to_string(),
                ..Settings::default()
            }
        );
    }

    #[test]
    fn test_integer_port_is_accepted() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        write(&paths.user, "[ssh]\nport = 2200\n\n[tunnel]\nport = 9090\n");

        let settings = load_plain(&paths).unwrap();
        assert_eq!(settings.ssh_port, "2200");
        assert_eq!(settings.tunnel_port, "9090");
    }

    #[test]
    fn test_malformed_port_string_passes_through() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        write(&paths.user, "[ssh]\nport = \"not-a-port\"\n");

        let settings = load_plain(&paths).unwrap();
        assert_eq!(settings.ssh_port, "not-a-port");
    }

    #[test]
    fn test_invalid_key_does_not_affect_others() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        write(
            &paths.user,
            r#"
[ssh]
port = ["22"]
jump = "jump.example.com"

[tunnel]
port = "7070"
"#,
        );

        let settings = load_plain(&paths).unwrap();
        assert_eq!(settings.ssh_port, "22");
        assert_eq!(settings.jump_host.as_deref(), Some("jump.example.com"));
        assert_eq!(settings.tunnel_port, "7070");
    }

    #[test]
    fn test_section_of_wrong_type_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        write(&paths.user, "ssh = \"oops\"\ndomains = [\"example.com\"]\n");

        let settings = load_plain(&paths).unwrap();
        assert_eq!(settings.ssh_port, "22");
        assert_eq!(settings.domains, vec!["example.com"]);
    }

    #[test]
    fn test_domains_with_non_string_entry_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        write(&paths.user, "domains = [\"example.com\", 42]\n");

        let settings = load_plain(&paths).unwrap();
        assert!(settings.domains.is_empty());
    }

    #[test]
    fn test_full_document() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        write(
            &paths.user,
            r#"
domains = ["example.com", "internal.example.org"]

[ssh]
port = "22"
jump = "jump.example.com"

[tunnel]
port = "6060"

[unknown]
key = "ignored"
"#,
        );

        let settings = load_plain(&paths).unwrap();
        assert_eq!(settings.domains, vec!["example.com", "internal.example.org"]);
        assert_eq!(settings.jump_host.as_deref(), Some("jump.example.com"));
    }

    #[test]
    fn test_empty_jump_means_none() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        write(&paths.user, "[ssh]\njump = \"\"\n");

        let base = Settings {
            jump_host: Some("previous.example.com".to_string()),
            ..Settings::default()
        };
        let settings = load_over(base, &paths).unwrap();
        assert_eq!(settings.jump_host, None);
    }

    #[test]
    fn test_persisted_sshpass_wins_over_detected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        write(&paths.user, "[ssh]\nsshpass = false\n");

        let base = Settings {
            sshpass: true,
            ..Settings::default()
        };
        assert!(!load_over(base.clone(), &paths).unwrap().sshpass);

        write(&paths.user, "[ssh]\nport = \"22\"\n");
        assert!(load_over(base, &paths).unwrap().sshpass);
    }

    #[test]
    fn test_user_config_wins_without_merge() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        write(&paths.user, "[ssh]\nport = \"2222\"\n");
        write(&paths.system, "[tunnel]\nport = \"9999\"\n");

        let settings = load_plain(&paths).unwrap();
        assert_eq!(settings.ssh_port, "2222");
        assert_eq!(settings.tunnel_port, "6060");
        assert_eq!(paths.locate().map(|(s, _)| s), Some(ConfigSource::User));
    }

    #[test]
    fn test_system_config_used_when_user_absent() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        write(&paths.system, "[tunnel]\nport = \"9999\"\n");

        let settings = load_plain(&paths).unwrap();
        assert_eq!(settings.tunnel_port, "9999");
        assert_eq!(paths.locate().map(|(s, _)| s), Some(ConfigSource::System));
    }

    #[test]
    fn test_corrupt_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        write(&paths.user, "invalid toml [[[");

        let result = load_plain(&paths);
        assert!(matches!(result, Err(ConfigError::Corrupt { .. })));
    }

    #[test]
    fn test_corrupt_user_config_does_not_fall_back_to_system() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        write(&paths.user, "[ssh\n");
        write(&paths.system, "[ssh]\nport = \"2222\"\n");

        assert!(load_plain(&paths).is_err());
    }

    #[test]
    fn test_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        let original = Settings {
            ssh_port: "2022".to_string(),
            jump_host: Some("jump.example.com".to_string()),
            tunnel_port: "1080".to_string(),
            domains: vec!["corp.local".to_string(), "example.com".to_string()],
            sshpass: true,
        };

        write(&paths.user, &original.to_document().to_toml().unwrap());
        let reloaded = load_plain(&paths).unwrap();

        assert_eq!(reloaded, original);
        assert_eq!(reloaded.to_document(), original.to_document());
    }

    #[test]
    fn test_cli_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let paths = paths_in(&temp_dir);
        write(&paths.user, "[ssh]\nport = \"2222\"\njump = \"jump.example.com\"\n");

        let overrides = ConfigOverrides {
            port: Some("2200".to_string()),
            jump_host: Some("other-jump.example.com".to_string()),
        };
        let settings = resolve_settings(&overrides, &paths).unwrap();

        assert_eq!(settings.ssh_port, "2200");
        assert_eq!(settings.jump_host.as_deref(), Some("other-jump.example.com"));
    }

    #[test]
    #[serial]
    fn test_sshpass_requires_env_var() {
        let original = std::env::var_os(SSHPASS_ENV);
        unsafe { std::env::remove_var(SSHPASS_ENV) };

        assert!(!sshpass_available());

        unsafe {
            if let Some(value) = original {
                std::env::set_var(SSHPASS_ENV, value);
            }
        }
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_sshpass_detected_with_binary_and_env_var() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let binary = temp_dir.path().join("sshpass");
        fs::write(&binary, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();

        let original_path = std::env::var_os("PATH");
        let original_pass = std::env::var_os(SSHPASS_ENV);
        unsafe {
            std::env::set_var("PATH", temp_dir.path());
            std::env::set_var(SSHPASS_ENV, "secret");
        }

        assert!(sshpass_available());

        unsafe {
            std::env::remove_var(SSHPASS_ENV);
        }
        assert!(!sshpass_available());

        unsafe {
            match original_path {
                Some(v) => std::env::set_var("PATH", v),
                None => std::env::remove_var("PATH"),
            }
            if let Some(v) = original_pass {
                std::env::set_var(SSHPASS_ENV, v);
            }
        }
    }
}
