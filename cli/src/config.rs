//! Configuration management for CLI tools.
//!
//! Configuration is stored in ~/.voxtrace/{app_name}/config.yaml

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths::Paths;

/// Default database filename, placed under the app's data directory.
pub const DEFAULT_DATABASE_FILE: &str = "voxtrace.db";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Application name (not serialized).
    #[serde(skip)]
    pub app_name: String,

    /// Snapshot file of the matching engine. Relative paths resolve
    /// against the config directory; empty means data/voxtrace.db.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub database: String,

    /// Engine defaults (thresholds, limits, clustering parameters).
    #[serde(default)]
    pub matcher: voxtrace_matcher::Config,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

impl Config {
    /// Gets the default config file path.
    pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
        Paths::new(app_name).ok().map(|p| p.config_file())
    }

    /// Returns the config file path.
    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Returns the config directory path.
    pub fn dir(&self) -> Option<&Path> {
        self.config_path.parent()
    }

    /// Returns the paths rooted at the config directory.
    pub fn paths(&self) -> Paths {
        Paths::from_app_dir(self.dir().unwrap_or_else(|| Path::new(".")))
    }

    /// Resolves the database path.
    pub fn database_path(&self) -> PathBuf {
        let paths = self.paths();
        if self.database.is_empty() {
            return paths.data_path(DEFAULT_DATABASE_FILE);
        }
        let db = PathBuf::from(&self.database);
        if db.is_absolute() {
            db
        } else {
            paths.app_dir().join(db)
        }
    }
}

fn resolve_path(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<PathBuf> {
    match custom_path {
        Some(p) => Ok(PathBuf::from(p)),
        None => Config::default_config_path(app_name)
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path")),
    }
}

/// Loads configuration for the specified app, creating an empty config
/// file on first use.
pub fn load_config(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = resolve_path(app_name, custom_path)?;

    // Ensure config directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut cfg = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&content)?
        }
    } else {
        let cfg = Config::default();
        let content = serde_yaml::to_string(&cfg)?;
        std::fs::write(&config_path, content)?;
        cfg
    };

    cfg.app_name = app_name.to_string();
    cfg.config_path = config_path;

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let cfg = load_config("voxtrace", path.to_str()).unwrap();

        assert!(path.exists());
        assert_eq!(cfg.app_name, "voxtrace");
        assert_eq!(cfg.path(), &path);
        assert!(cfg.database.is_empty());
        assert_eq!(
            cfg.database_path(),
            dir.path().join("nested").join("data").join(DEFAULT_DATABASE_FILE)
        );
    }

    #[test]
    fn test_load_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "database: engine.db\nmatcher:\n  threshold: 0.75\n  limit: 5\n",
        )
        .unwrap();

        let cfg = load_config("voxtrace", path.to_str()).unwrap();
        assert_eq!(cfg.database_path(), dir.path().join("engine.db"));
        assert_eq!(cfg.matcher.threshold, 0.75);
        assert_eq!(cfg.matcher.limit, 5);
        assert_eq!(cfg.matcher.eps, 0.0);
    }

    #[test]
    fn test_absolute_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let db = dir.path().join("elsewhere").join("x.db");
        std::fs::write(&path, format!("database: {}\n", db.display())).unwrap();

        let cfg = load_config("voxtrace", path.to_str()).unwrap();
        assert_eq!(cfg.database_path(), db);
    }

    #[test]
    fn test_default_database_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let cfg = load_config("voxtrace", path.to_str()).unwrap();

        assert_eq!(cfg.paths().data_dir(), dir.path().join("data"));
        assert_eq!(
            cfg.database_path(),
            cfg.paths().data_path(DEFAULT_DATABASE_FILE)
        );
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("app_name"));
    }
}
