use std::path::Path;

use crate::config::types::RunConfig;
use crate::render::color::parse_fill_color;
use crate::CertsendError;

const TEMPLATE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
const FONT_EXTENSIONS: &[&str] = &["ttf"];
pub const MAX_FONT_SIZE: f32 = 2000.0;

/// Reject configurations that cannot be rendered, before any file is touched.
pub fn validate_config(config: &RunConfig) -> crate::Result<()> {
    if !has_extension(&config.template.filename, TEMPLATE_EXTENSIONS) {
        return Err(CertsendError::FileFormat {
            message: format!(
                "template file must be in either PNG or JPG format: {}",
                config.template.filename.display()
            ),
        });
    }

    if let Some(font) = &config.template.styles.font_filename {
        if !has_extension(font, FONT_EXTENSIONS) {
            return Err(CertsendError::FileFormat {
                message: format!("font file must be in TTF format: {}", font.display()),
            });
        }
    }

    validate_font_size(config.template.styles.size)?;
    parse_fill_color(&config.template.styles.fill_color)?;
    Ok(())
}

/// A size outside `(0, MAX_FONT_SIZE]` would render nothing or overflow glyph math.
pub fn validate_font_size(size: f32) -> crate::Result<()> {
    if size.is_finite() && size > 0.0 && size <= MAX_FONT_SIZE {
        Ok(())
    } else {
        Err(CertsendError::InvalidFontSize {
            size,
            max: MAX_FONT_SIZE,
        })
    }
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| allowed.iter().any(|a| e.eq_ignore_ascii_case(a)))
        .unwrap_or(false)
}
