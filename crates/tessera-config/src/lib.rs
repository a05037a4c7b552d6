//! Configuration system for Tessera.
//!
//! Provides TOML-based configuration with:
//! - `[server]`: the hosting application serving action handlers and data
//!   bindings
//! - `[workflow]`: the workflow engine and polling behaviour
//! - `[renderer]`: UI config validation strictness
//! - `[logging]`: log level and file output
//!
//! Config files are layered: the user config (`$TESSERA_CONFIG_DIR` or the
//! platform config dir) first, then a project-local `tessera.toml`. CLI flags
//! and environment variables override both and are applied by the caller.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigLayer, LayerKind, LayerStatus, LoadedConfig, PROJECT_CONFIG_FILE, load_config, load_config_in,
    user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
