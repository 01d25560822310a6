use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

pub fn detect_format(path: &Path) -> crate::Result<ConfigFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "json" => Ok(ConfigFormat::Json),
        "yml" | "yaml" => Ok(ConfigFormat::Yaml),
        "toml" => Ok(ConfigFormat::Toml),
        other => Err(crate::CertsendError::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}
