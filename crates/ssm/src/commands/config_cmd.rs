//! Show the effective configuration

use anyhow::Result;
use serde_json::json;
use ssm_core::config::{load, ConfigPaths, ConfigSource};

/// Execute `ssm --show-config`
pub fn execute(json: bool) -> Result<()> {
    let paths = ConfigPaths::discover()?;
    let settings = load(&paths)?;
    let document = settings.to_document();

    let (source, source_path) = match paths.locate() {
        Some((source, path)) => (source, Some(path.display().to_string())),
        None => (ConfigSource::Defaults, None),
    };

    if json {
        let output = json!({
            "config": document,
            "source": source.label(),
            "path": source_path,
            "configFiles": {
                "user": {
                    "path": paths.user.display().to_string(),
                    "exists": paths.user.is_file(),
                },
                "system": {
                    "path": paths.system.display().to_string(),
                    "exists": paths.system.is_file(),
                }
            }
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let source_display = match &source_path {
            Some(path) => format!("{} ({path})", source.label()),
            None => source.label().to_string(),
        };
        println!("Configuration (from {source_display}):");
        println!();
        print!("{}", document.to_toml()?);
        println!();
        println!("Config files:");
        println!("  User: {} {}", paths.user.display(), found(paths.user.is_file()));
        println!("  System: {} {}", paths.system.display(), found(paths.system.is_file()));
    }

    Ok(())
}

fn found(exists: bool) -> &'static str {
    if exists { "(found)" } else { "(not found)" }
}
