//! Config file discovery, loading, and saving.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::types::Config;

/// Platform config directory for Pwyll (e.g. `~/.config/pwyll` on Linux).
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pwyll"))
}

/// Default config file path (`<config_dir>/config.toml`).
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load the configuration.
///
/// Reads the given path, or the default config path when `None`. A missing
/// file yields the default (empty) configuration rather than an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => p,
            None => return Err(ConfigError::NoConfigDir),
        },
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;

    Ok(toml::from_str(&contents)?)
}

/// Save the configuration to the given path, creating parent directories.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::WriteFile {
            path: path.display().to_string(),
            source,
        })?;
    }

    let contents = toml::to_string_pretty(config)?;

    std::fs::write(path, contents).map_err(|source| ConfigError::WriteFile {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServerEntry;

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = load_config(Some(&path)).unwrap();
        assert!(cfg.servers.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.servers.push(ServerEntry::new("fs", "mcp-server-fs"));
        cfg.servers
            .push(ServerEntry::http("remote", "http://localhost:8080"));

        save_config(&cfg, &path).unwrap();
        let loaded = load_config(Some(&path)).unwrap();

        assert_eq!(loaded.servers, cfg.servers);
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let result = load_config(Some(&path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
