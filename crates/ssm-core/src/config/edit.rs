//! Validation and persistence for the interactive config editor
//!
//! The editor works on a [`SettingsDocument`] copy and writes a whole new
//! file on save. The loaded [`super::Settings`] value is never modified.

use super::discovery::{ConfigError, ConfigPaths};
use super::types::SettingsDocument;
use crate::resolver::HostLookup;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Rejected editor input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("Invalid port \"{0}\": expected a number between 1 and 65535")]
    InvalidPort(String),

    #[error("\"{0}\" does not appear to be a valid FQDN")]
    NotFqdn(String),

    #[error("\"{0}\" does not resolve")]
    Unresolvable(String),

    #[error("Invalid domain \"{0}\": must be non-empty without leading or trailing dots")]
    InvalidDomain(String),
}

/// Validate a port entered in the editor, returning its canonical form.
pub fn validate_port(input: &str) -> Result<String, EditError> {
    let trimmed = input.trim();
    match trimmed.parse::<u32>() {
        Ok(port) if port > 0 && port < 65536 => Ok(port.to_string()),
        _ => Err(EditError::InvalidPort(trimmed.to_string())),
    }
}

/// Check that a jump host looks like a resolvable FQDN.
///
/// The editor lets the user keep a value that fails this check after
/// confirmation, so the error only describes the problem.
pub fn check_jump_host<L>(input: &str, lookup: &L) -> Result<(), EditError>
where
    L: HostLookup + ?Sized,
{
    if !input.contains('.') || input.starts_with('.') || input.ends_with('.') {
        return Err(EditError::NotFqdn(input.to_string()));
    }

    if !lookup.lookup(input) {
        return Err(EditError::Unresolvable(input.to_string()));
    }

    Ok(())
}

/// Parse a comma or whitespace separated list of candidate domains.
///
/// Order is preserved. An empty input yields an empty list.
pub fn parse_domains(input: &str) -> Result<Vec<String>, EditError> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            if entry.starts_with('.') || entry.ends_with('.') {
                Err(EditError::InvalidDomain(entry.to_string()))
            } else {
                Ok(entry.to_string())
            }
        })
        .collect()
}

/// File the editor writes to: system-wide for root, user-scoped otherwise.
pub fn save_path(paths: &ConfigPaths, is_root: bool) -> &Path {
    if is_root {
        paths.system.as_path()
    } else {
        paths.user.as_path()
    }
}

/// Write `document` to `path`, creating parent directories.
pub fn save(document: &SettingsDocument, path: &Path) -> Result<PathBuf, ConfigError> {
    let contents = document.to_toml()?;
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, contents).map_err(io_err)?;
    Ok(path.to_path_buf())
}
