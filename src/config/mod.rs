//! Configuration file loading.
//!
//! The configuration types live in `reel_core::config`; this module finds
//! and reads the file.

pub use reel_core::config::*;
pub use reel_core::Config;

use anyhow::{Context, Result};
use std::path::Path;

/// Default locations searched when no `--config` is given.
const DEFAULT_PATHS: &[&str] = &[
    "./photoreel.toml",
    "~/.config/photoreel/config.toml",
];

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = Config::from_toml(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    for warning in config.warnings() {
        tracing::warn!("{}: {}", path.display(), warning);
    }

    Ok(config)
}

/// Load config from the given path, else from default locations, else
/// return the default config.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[album]\ntile_capacity = 4\nfile_prefix = \"trip\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.album.tile_capacity, 4);
        assert_eq!(config.album.file_prefix, "trip");
    }

    #[test]
    fn invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[album]\ntile_capacity = 0").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("tile_capacity"));
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let err = load_config_or_default(Some(Path::new("/nonexistent/photoreel.toml")));
        assert!(err.is_err());
    }
}
