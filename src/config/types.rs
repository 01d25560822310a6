use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::smtp::Encryption;

fn default_font_size() -> f32 {
    48.0
}

fn default_fill_color() -> String {
    "#000000".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TextStyle {
    pub font_filename: Option<PathBuf>,
    #[serde(default = "default_font_size")]
    pub size: f32,
    pub top_coordinate: i32,
    #[serde(default = "default_fill_color")]
    pub fill_color: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TemplateSection {
    pub filename: PathBuf,
    pub styles: TextStyle,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SenderCredentials {
    pub email: String,
    pub password: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub encryption: Option<Encryption>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EmailSection {
    pub subject: String,
    pub body: String,
    pub attached_certificate_filename: String,
    pub sender_credentials: SenderCredentials,
}

/// The run configuration document as written on disk.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunConfig {
    pub template: TemplateSection,
    pub email: EmailSection,
    /// Directory relative paths resolve against. Set by the loader.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl RunConfig {
    pub fn template_path(&self) -> PathBuf {
        self.base_dir.join(&self.template.filename)
    }

    pub fn font_path(&self) -> Option<PathBuf> {
        self.template
            .styles
            .font_filename
            .as_ref()
            .map(|f| self.base_dir.join(f))
    }

    /// Extension of the template file as written, used for output file names.
    pub fn template_extension(&self) -> &str {
        self.template
            .filename
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
    }
}
