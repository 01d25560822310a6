use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Pixel, Rgba, RgbaImage};

use crate::CertsendError;

const BUILTIN_GLYPH_PX: u32 = 8;

/// Typeface used to draw attendee names.
pub enum CertificateFont {
    TrueType(FontVec),
    /// 8x8 bitmap glyphs scaled up to roughly the requested size.
    Builtin,
}

impl std::fmt::Debug for CertificateFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrueType(_) => f.write_str("CertificateFont::TrueType"),
            Self::Builtin => f.write_str("CertificateFont::Builtin"),
        }
    }
}

impl CertificateFont {
    /// Load a TrueType font, or fall back to the built-in glyphs when no path is given.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Builtin);
        };
        let bytes = std::fs::read(path).map_err(|source| CertsendError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font = FontVec::try_from_vec(bytes).map_err(|e| CertsendError::FontLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::TrueType(font))
    }

    /// Rendered width of `text` in pixels at `size`.
    pub fn text_width(&self, size: f32, text: &str) -> u32 {
        match self {
            Self::TrueType(font) => {
                imageproc::drawing::text_size(PxScale::from(size), font, text).0
            }
            Self::Builtin => {
                let glyphs = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                glyphs.saturating_mul(BUILTIN_GLYPH_PX.saturating_mul(builtin_scale(size)))
            }
        }
    }

    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        color: Rgba<u8>,
        x: i32,
        y: i32,
        size: f32,
        text: &str,
    ) {
        match self {
            Self::TrueType(font) => {
                let scale = PxScale::from(size);
                imageproc::drawing::draw_text_mut(canvas, color, x, y, scale, font, text);
            }
            Self::Builtin => draw_builtin(canvas, color, x, y, builtin_scale(size), text),
        }
    }
}

fn builtin_scale(size: f32) -> u32 {
    ((size / BUILTIN_GLYPH_PX as f32).round() as u32).max(1)
}

fn builtin_glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn draw_builtin(canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, scale: u32, text: &str) {
    let advance = i64::from(BUILTIN_GLYPH_PX.saturating_mul(scale));
    let scale = i64::from(scale);
    for (index, c) in text.chars().enumerate() {
        let origin_x = i64::from(x).saturating_add((index as i64).saturating_mul(advance));
        if origin_x >= i64::from(canvas.width()) {
            break;
        }
        for (row, bits) in builtin_glyph(c).iter().enumerate() {
            for bit in 0..8u32 {
                if bits & (1u8 << bit) == 0 {
                    continue;
                }
                let cell_x = origin_x.saturating_add(i64::from(bit) * scale);
                let cell_y = i64::from(y).saturating_add(row as i64 * scale);
                fill_cell(canvas, color, cell_x, cell_y, scale);
            }
        }
    }
}

fn fill_cell(canvas: &mut RgbaImage, color: Rgba<u8>, x: i64, y: i64, scale: i64) {
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    for py in y.max(0)..y.saturating_add(scale).min(height) {
        for px in x.max(0)..x.saturating_add(scale).min(width) {
            // Both coordinates are clamped into the canvas above.
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            if color[3] == u8::MAX {
                *pixel = color;
            } else {
                pixel.blend(&color);
            }
        }
    }
}
