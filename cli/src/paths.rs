//! Path utilities for voxtrace applications.

use std::io;
use std::path::{Path, PathBuf};

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".voxtrace";

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Subdirectory of the app directory holding engine snapshots.
pub const DATA_DIR: &str = "data";

/// Locates the files of one voxtrace app.
///
/// The app directory is `~/.voxtrace/<app>` unless a config file was given
/// explicitly, in which case the directory holding that file takes its place.
#[derive(Debug, Clone)]
pub struct Paths {
    app_dir: PathBuf,
}

impl Paths {
    /// Resolves `~/.voxtrace/<app_name>`.
    pub fn new(app_name: &str) -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not find home directory")
        })?;
        Ok(Self::from_app_dir(
            home_dir.join(DEFAULT_BASE_DIR).join(app_name),
        ))
    }

    /// Uses `dir` as the app directory.
    pub fn from_app_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: dir.into(),
        }
    }

    /// Returns the app directory.
    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    /// Returns the config file path (<app_dir>/config.yaml).
    pub fn config_file(&self) -> PathBuf {
        self.app_dir.join(DEFAULT_CONFIG_FILE)
    }

    /// Returns the data directory (<app_dir>/data).
    pub fn data_dir(&self) -> PathBuf {
        self.app_dir.join(DATA_DIR)
    }

    /// Returns a path within the data directory.
    pub fn data_path(&self, name: &str) -> PathBuf {
        self.data_dir().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_layout() {
        let paths = Paths::new("testapp").unwrap();

        assert!(paths.app_dir().ends_with(".voxtrace/testapp"));
        assert!(paths.config_file().ends_with("testapp/config.yaml"));
        assert!(paths.data_dir().ends_with("testapp/data"));
    }

    #[test]
    fn test_explicit_app_dir() {
        let paths = Paths::from_app_dir("/srv/voxtrace");

        assert_eq!(paths.config_file(), Path::new("/srv/voxtrace/config.yaml"));
        assert_eq!(
            paths.data_path("voxtrace.db"),
            Path::new("/srv/voxtrace/data/voxtrace.db")
        );
    }
}
