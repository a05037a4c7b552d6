//! Locating and layering config files.
//!
//! Two layers are read, lowest precedence first:
//!
//! | Layer   | File                                                   |
//! |---------|--------------------------------------------------------|
//! | user    | `$TESSERA_CONFIG_DIR/config.toml`, else `<config dir>/tessera/config.toml` |
//! | project | `tessera.toml` in the working (or given) directory     |
//!
//! A section present in a later layer replaces the whole section from an
//! earlier one. Missing files are skipped; unreadable or malformed files are
//! skipped with a warning so a broken project file never blocks the CLI.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{ConfigError, Result, TesseraConfig};

/// Project-local config filename.
pub const PROJECT_CONFIG_FILE: &str = "tessera.toml";

const USER_CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV: &str = "TESSERA_CONFIG_DIR";
const AUTH_TOKEN_ENV: &str = "TESSERA_AUTH_TOKEN";

/// Which layer a config file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    User,
    Project,
}

impl LayerKind {
    pub fn label(self) -> &'static str {
        match self {
            LayerKind::User => "user",
            LayerKind::Project => "project",
        }
    }
}

/// What happened when a layer was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerStatus {
    Missing,
    Loaded,
    /// The file exists but could not be read or parsed.
    Invalid(String),
}

/// One candidate config file and its outcome.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub kind: LayerKind,
    pub path: PathBuf,
    pub status: LayerStatus,
}

impl ConfigLayer {
    pub fn is_loaded(&self) -> bool {
        self.status == LayerStatus::Loaded
    }
}

/// The merged configuration plus how it was assembled.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: TesseraConfig,
    /// Every candidate file, lowest precedence first.
    pub layers: Vec<ConfigLayer>,
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Paths of the layers that contributed to `config`.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.layers
            .iter()
            .filter(|l| l.is_loaded())
            .map(|l| l.path.as_path())
            .collect()
    }
}

/// Load the user layer and the project layer found in `project_dir`
/// (the working directory when `None`).
pub fn load_config(project_dir: Option<&Path>) -> LoadedConfig {
    let project = match project_dir {
        Some(dir) => dir.join(PROJECT_CONFIG_FILE),
        None => PathBuf::from(PROJECT_CONFIG_FILE),
    };
    let user = user_config_path().map(|path| (LayerKind::User, path));
    resolve(user.into_iter().chain([(LayerKind::Project, project)]))
}

/// Load layers from explicit directories, ignoring `TESSERA_CONFIG_DIR`.
pub fn load_config_in(user_dir: &Path, project_dir: &Path) -> LoadedConfig {
    resolve([
        (LayerKind::User, user_dir.join(USER_CONFIG_FILE)),
        (LayerKind::Project, project_dir.join(PROJECT_CONFIG_FILE)),
    ])
}

/// Directory holding the user config and log files.
pub fn user_config_dir() -> Option<PathBuf> {
    match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|d| d.join("tessera")),
    }
}

/// Path of the user config file.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

fn resolve(candidates: impl IntoIterator<Item = (LayerKind, PathBuf)>) -> LoadedConfig {
    let mut loaded = LoadedConfig::default();

    for (kind, path) in candidates {
        let status = match read_layer(&path) {
            Ok(None) => LayerStatus::Missing,
            Ok(Some(layer)) => {
                if layer.server.as_ref().is_some_and(|s| s.has_plaintext_auth_token()) {
                    loaded.warnings.push(format!(
                        "{} stores a plaintext auth_token; set {} instead",
                        path.display(),
                        AUTH_TOKEN_ENV
                    ));
                }
                loaded.config.merge(layer);
                LayerStatus::Loaded
            }
            Err(e) => {
                loaded.warnings.push(format!("Failed to load {}: {}", path.display(), e));
                LayerStatus::Invalid(e.to_string())
            }
        };
        loaded.layers.push(ConfigLayer { kind, path, status });
    }

    loaded
}

fn read_layer(path: &Path) -> Result<Option<TesseraConfig>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::ReadFile {
                path: path.display().to_string(),
                source,
            });
        }
    };
    TesseraConfig::from_toml(&contents).map(Some)
}
