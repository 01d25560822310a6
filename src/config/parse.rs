use std::path::Path;

use crate::config::format::{detect_format, ConfigFormat};
use crate::config::types::RunConfig;
use crate::config::validate::validate_config;
use crate::CertsendError;

/// Read, parse and validate the run configuration at `path`.
///
/// Relative template and font paths resolve against the directory holding
/// the configuration file.
pub fn load_config(path: &Path) -> crate::Result<RunConfig> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| CertsendError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse_config_str(&content, &format, path)?;
    config.base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    validate_config(&config)?;
    Ok(config)
}

/// Parse a configuration document without touching the filesystem.
///
/// `origin` only labels parse errors.
pub fn parse_config_str(
    content: &str,
    format: &ConfigFormat,
    origin: &Path,
) -> crate::Result<RunConfig> {
    match format {
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|source| CertsendError::JsonParse {
                path: origin.to_path_buf(),
                source,
            })
        }
        ConfigFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|source| CertsendError::YamlParse {
                path: origin.to_path_buf(),
                source,
            })
        }
        ConfigFormat::Toml => toml::from_str(content).map_err(|source| CertsendError::TomlParse {
            path: origin.to_path_buf(),
            source,
        }),
    }
}
