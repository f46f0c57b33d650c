use crate::{AppConfig, Result, TreeCmpError};
use directories::ProjectDirs;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "treecmp.toml";

/// Where the config file in use was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Named on the command line
    Explicit,
    /// Next to the executable
    Portable,
    /// The per-user config directory
    User,
}

impl fmt::Display for ConfigLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigLocation::Explicit => "explicit",
            ConfigLocation::Portable => "portable",
            ConfigLocation::User => "user",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
    pub location: ConfigLocation,
    /// False when the file was absent and defaults are in use
    pub exists: bool,
}

/// Load the config from its default location.
///
/// A `treecmp.toml` next to the executable wins when it exists or when
/// `prefer_portable` is set; otherwise the per-user config directory is used.
pub fn load_config(prefer_portable: bool) -> Result<LoadedConfig> {
    let (path, location) = resolve_config_path(prefer_portable)?;
    read_config(path, location)
}

/// Load a config from an explicit path; a missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<LoadedConfig> {
    read_config(path.to_path_buf(), ConfigLocation::Explicit)
}

/// Load the config from its default location, writing defaults if absent
pub fn ensure_config(prefer_portable: bool) -> Result<LoadedConfig> {
    let loaded = load_config(prefer_portable)?;
    if !loaded.exists {
        save_config(&loaded.path, &loaded.config)?;
    }
    Ok(loaded)
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let data = toml::to_string_pretty(config)
        .map_err(|e| TreeCmpError::Serialization(e.to_string()))?;
    fs::write(path, data)?;
    Ok(())
}

fn read_config(path: PathBuf, location: ConfigLocation) -> Result<LoadedConfig> {
    let exists = path.exists();

    let config = if exists {
        let data = fs::read_to_string(&path)?;
        toml::from_str(&data).map_err(|e| {
            TreeCmpError::Serialization(format!("{}: {}", path.display(), e))
        })?
    } else {
        AppConfig::default()
    };

    Ok(LoadedConfig {
        config,
        path,
        location,
        exists,
    })
}

fn resolve_config_path(prefer_portable: bool) -> Result<(PathBuf, ConfigLocation)> {
    if let Some(portable_path) = portable_config_path() {
        if prefer_portable || portable_path.exists() {
            return Ok((portable_path, ConfigLocation::Portable));
        }
    }

    let dirs = ProjectDirs::from("", "aecs4u", "treecmp")
        .ok_or_else(|| TreeCmpError::Config("Unable to determine config directory".to_string()))?;
    Ok((dirs.config_dir().join(CONFIG_FILE_NAME), ConfigLocation::User))
}

fn portable_config_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
}
