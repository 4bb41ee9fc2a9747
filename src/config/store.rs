use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::types::Backend;
use crate::utils::validation::absolutize;

/// Directory below the home directory that holds the configuration record
pub const CONFIG_DIR_NAME: &str = ".phorager";

/// File name of the configuration record
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the home directory; pass --config-dir explicitly")]
    NoHomeDirectory,

    #[error("Failed to read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Failed to parse configuration file {}: {source}\n\
         Fix the file or run 'phorager config reset'.",
        .path.display()
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write configuration file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot use {} as a location: {source}", .path.display())]
    InvalidLocation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persisted user settings.
///
/// Missing keys take their defaults and unknown keys are ignored, so files
/// written by older or newer releases still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: Backend,
    /// Base directory holding the tool databases; `None` uses the engine default
    pub db_location: Option<PathBuf>,
    /// Backend cache directory; `None` leaves caching to the engine
    pub cache_location: Option<PathBuf>,
}

/// A partial change to [`Settings`]; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub backend: Option<Backend>,
    pub db_location: Option<PathBuf>,
    pub cache_location: Option<PathBuf>,
}

impl SettingsUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backend.is_none() && self.db_location.is_none() && self.cache_location.is_none()
    }
}

impl Settings {
    /// Apply `update` and report whether anything actually changed
    pub fn apply(&mut self, update: SettingsUpdate) -> bool {
        let before = self.clone();
        if let Some(backend) = update.backend {
            self.backend = backend;
        }
        if let Some(location) = update.db_location {
            self.db_location = Some(location);
        }
        if let Some(location) = update.cache_location {
            self.cache_location = Some(location);
        }
        *self != before
    }
}

/// Expand `~`, make `path` absolute against `cwd`, and create the directory.
///
/// # Errors
///
/// Returns `ConfigError::InvalidLocation` if the directory cannot be created.
pub fn prepare_location(path: &Path, cwd: &Path) -> Result<PathBuf, ConfigError> {
    let resolved = absolutize(path, cwd);
    fs::create_dir_all(&resolved).map_err(|source| ConfigError::InvalidLocation {
        path: resolved.clone(),
        source,
    })?;
    Ok(resolved)
}

/// File-backed configuration record
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Store rooted at an explicit directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<home>/.phorager`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHomeDirectory` if no home directory is known.
    pub fn default_location() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME))
            .ok_or(ConfigError::NoHomeDirectory)
    }

    /// Store at `dir` if given, otherwise at the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHomeDirectory` if `dir` is `None` and no home
    /// directory is known.
    pub fn open(dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        match dir {
            Some(dir) => Ok(Self::new(dir)),
            None => Ok(Self::new(Self::default_location()?)),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Load the record, or the defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file exists but cannot be read and
    /// `ConfigError::Parse` if it is not valid JSON.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no configuration file, using defaults");
                return Ok(Settings::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Replace the record on disk in one step.
    ///
    /// The new content is written to a temporary file in the same directory
    /// and renamed over the old file, so readers never see a partial record.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Write` on any filesystem failure.
    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        let path = self.path();
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| write_err(std::io::Error::new(ErrorKind::InvalidData, e)))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Load, apply `update`, and save only if something changed.
    ///
    /// Returns the resulting settings and whether the file was rewritten.
    ///
    /// # Errors
    ///
    /// Any error from [`ConfigStore::load`] or [`ConfigStore::save`].
    pub fn update(&self, update: SettingsUpdate) -> Result<(Settings, bool), ConfigError> {
        let mut settings = self.load()?;
        let changed = settings.apply(update);
        if changed {
            self.save(&settings)?;
        }
        Ok((settings, changed))
    }

    /// Remove the record so defaults apply again. Works on malformed files.
    ///
    /// Returns whether a file was removed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Write` if an existing file cannot be removed.
    pub fn reset(&self) -> Result<bool, ConfigError> {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(ConfigError::Write { path, source }),
        }
    }
}
