//! Home directory and config file location resolution
//!
//! # Precedence
//!
//! Home directory:
//! 1. `SSM_HOME` environment variable (if set and non-empty)
//! 2. `dirs::home_dir()` platform default
//!
//! System-wide config file:
//! 1. `SSM_SYSTEM_CONFIG` environment variable (if set and non-empty)
//! 2. `/usr/local/etc/ssm.conf`
//!
//! Integration tests set both variables to point into a temp directory so they
//! never read the real user or system config.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default system-wide config file
pub const SYSTEM_CONFIG_PATH: &str = "/usr/local/etc/ssm.conf";

/// User config file, relative to the home directory
pub const USER_CONFIG_RELATIVE: &str = ".config/ssm.conf";

fn non_empty_env(name: &str) -> Option<PathBuf> {
    let value = std::env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

/// Get the home directory for ssm operations
///
/// # Errors
///
/// Returns an error if `SSM_HOME` is unset and the platform home directory
/// cannot be determined.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Some(home) = non_empty_env("SSM_HOME") {
        return Ok(home);
    }

    dirs::home_dir().context("Could not determine home directory")
}

/// User-scoped config file under `home`
pub fn user_config_path(home: &Path) -> PathBuf {
    home.join(USER_CONFIG_RELATIVE)
}

/// System-wide config file
pub fn system_config_path() -> PathBuf {
    non_empty_env("SSM_SYSTEM_CONFIG").unwrap_or_else(|| PathBuf::from(SYSTEM_CONFIG_PATH))
}

/// Whether the current process runs as root.
///
/// Root saves the edited config to the system-wide file instead of its own.
#[cfg(unix)]
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn is_root() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn with_env<F: FnOnce()>(name: &str, value: Option<&str>, f: F) {
        let original = env::var(name).ok();
        unsafe {
            match value {
                Some(v) => env::set_var(name, v),
                None => env::remove_var(name),
            }
        }

        f();

        unsafe {
            match original {
                Some(v) => env::set_var(name, v),
                None => env::remove_var(name),
            }
        }
    }

    #[test]
    #[serial]
    fn test_ssm_home_set() {
        with_env("SSM_HOME", Some("/custom/home"), || {
            assert_eq!(get_home_dir().unwrap(), PathBuf::from("/custom/home"));
        });
    }

    #[test]
    #[serial]
    fn test_ssm_home_whitespace_is_trimmed() {
        with_env("SSM_HOME", Some("  /custom/home  "), || {
            assert_eq!(get_home_dir().unwrap(), PathBuf::from("/custom/home"));
        });
    }

    #[test]
    #[serial]
    fn test_ssm_home_empty_uses_platform_default() {
        with_env("SSM_HOME", Some("   "), || {
            assert_eq!(get_home_dir().unwrap(), dirs::home_dir().unwrap());
        });
    }

    #[test]
    fn test_user_config_path() {
        let path = user_config_path(Path::new("/home/alice"));
        assert_eq!(path, PathBuf::from("/home/alice/.config/ssm.conf"));
    }

    #[test]
    #[serial]
    fn test_system_config_path_default() {
        with_env("SSM_SYSTEM_CONFIG", None, || {
            assert_eq!(system_config_path(), PathBuf::from(SYSTEM_CONFIG_PATH));
        });
    }

    #[test]
    #[serial]
    fn test_system_config_path_override() {
        with_env("SSM_SYSTEM_CONFIG", Some("/tmp/ssm-test.conf"), || {
            assert_eq!(system_config_path(), PathBuf::from("/tmp/ssm-test.conf"));
        });
    }
}
