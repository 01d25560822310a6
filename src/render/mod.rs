pub mod color;
pub mod font;

use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};

use crate::config::{validate_font_size, RunConfig};
use crate::CertsendError;

pub use color::parse_fill_color;
pub use font::CertificateFont;

/// Draws attendee names onto a decoded certificate template.
///
/// The template is decoded once and copied for every certificate; the file on
/// disk is never written to.
#[derive(Debug)]
pub struct CertificateRenderer {
    template: RgbaImage,
    format: ImageFormat,
    extension: String,
    font: CertificateFont,
    size: f32,
    top: i32,
    color: Rgba<u8>,
}

impl CertificateRenderer {
    pub fn from_config(config: &RunConfig) -> crate::Result<Self> {
        let extension = config.template_extension().to_string();
        let format = output_format(&extension)?;
        let template = load_template(&config.template_path())?;
        let font = CertificateFont::load(config.font_path().as_deref())?;
        let styles = &config.template.styles;
        validate_font_size(styles.size)?;
        Ok(Self {
            template,
            format,
            extension,
            font,
            size: styles.size,
            top: styles.top_coordinate,
            color: parse_fill_color(&styles.fill_color)?,
        })
    }

    pub fn new(
        template: RgbaImage,
        extension: &str,
        font: CertificateFont,
        size: f32,
        top: i32,
        color: Rgba<u8>,
    ) -> crate::Result<Self> {
        validate_font_size(size)?;
        Ok(Self {
            template,
            format: output_format(extension)?,
            extension: extension.to_string(),
            font,
            size,
            top,
            color,
        })
    }

    /// Extension output files are written with, as spelled in the template name.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Left edge of `name` when horizontally centered on the template.
    pub fn text_left(&self, name: &str) -> i32 {
        centered_left(self.template.width(), self.font.text_width(self.size, name))
    }

    pub fn render(&self, name: &str) -> RgbaImage {
        let mut canvas = self.template.clone();
        let left = self.text_left(name);
        self.font
            .draw(&mut canvas, self.color, left, self.top, self.size, name);
        canvas
    }
}

/// `(image_width - text_width) / 2`; negative when the text is wider than the image.
pub fn centered_left(image_width: u32, text_width: u32) -> i32 {
    let left = (i64::from(image_width) - i64::from(text_width)) / 2;
    i32::try_from(left).unwrap_or(if left < 0 { i32::MIN } else { i32::MAX })
}

pub fn load_template(path: &Path) -> crate::Result<RgbaImage> {
    let io_err = |source| CertsendError::Io {
        path: path.to_path_buf(),
        source,
    };
    let image = ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?
        .decode()
        .map_err(|source| CertsendError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(image.into_rgba8())
}

/// Encode `image` to `path`. JPEG has no alpha channel, so it is dropped there.
pub fn save_certificate(image: &RgbaImage, path: &Path, format: ImageFormat) -> crate::Result<()> {
    let result = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgba8(image.clone())
            .to_rgb8()
            .save_with_format(path, format)
    } else {
        image.save_with_format(path, format)
    };
    result.map_err(|source| CertsendError::ImageEncode {
        path: path.to_path_buf(),
        source,
    })
}

fn output_format(extension: &str) -> crate::Result<ImageFormat> {
    ImageFormat::from_extension(extension).ok_or_else(|| CertsendError::FileFormat {
        message: format!("cannot encode certificates with extension '{extension}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const INK: Rgba<u8> = Rgba([20, 30, 40, 255]);

    fn renderer(width: u32, height: u32) -> CertificateRenderer {
        CertificateRenderer::new(
            RgbaImage::from_pixel(width, height, WHITE),
            "png",
            CertificateFont::Builtin,
            16.0,
            10,
            INK,
        )
        .unwrap()
    }

    fn inked_columns(image: &RgbaImage) -> (u32, u32) {
        let xs: Vec<u32> = image
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == INK)
            .map(|(x, _, _)| x)
            .collect();
        (*xs.iter().min().unwrap(), *xs.iter().max().unwrap())
    }

    #[test]
    fn test_centered_left_formula() {
        assert_eq!(centered_left(1000, 200), 400);
        assert_eq!(centered_left(1001, 200), 400);
        assert_eq!(centered_left(100, 100), 0);
        assert_eq!(centered_left(100, 140), -20);
    }

    #[test]
    fn test_text_left_uses_measured_width() {
        let r = renderer(400, 60);
        // 5 glyphs * 8px * scale 2 = 80px wide
        assert_eq!(r.text_left("Alice"), (400 - 80) / 2);
    }

    #[test]
    fn test_render_is_horizontally_centered() {
        let r = renderer(400, 60);
        let image = r.render("HH");
        let (min_x, max_x) = inked_columns(&image);
        let text_left = r.text_left("HH") as u32;
        assert!(min_x >= text_left && max_x < text_left + 32);
        // 'H' is symmetric-ish in font8x8; the ink box straddles the center
        assert!(min_x < 200 && max_x > 200);
    }

    #[test]
    fn test_render_is_deterministic_and_leaves_template_alone() {
        let r = renderer(300, 60);
        let first = r.render("Bob Stone");
        let second = r.render("Bob Stone");
        assert_eq!(first, second);
        assert!(r.template.pixels().all(|p| *p == WHITE));
        assert_eq!(first.dimensions(), (300, 60));
    }

    #[test]
    fn test_render_uses_configured_top_offset() {
        let r = renderer(300, 80);
        let image = r.render("T");
        let rows: Vec<u32> = image
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == INK)
            .map(|(_, y, _)| y)
            .collect();
        assert!(rows.iter().all(|&y| (10..26).contains(&y)));
    }

    #[test]
    fn test_truetype_name_is_centered_within_measured_box() {
        let font_path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures/fonts/DejaVuSans-ExtraLight.ttf");
        let font = CertificateFont::load(Some(&font_path)).unwrap();
        assert!(matches!(font, CertificateFont::TrueType(_)));

        let r = CertificateRenderer::new(
            RgbaImage::from_pixel(800, 120, WHITE),
            "png",
            font,
            40.0,
            30,
            INK,
        )
        .unwrap();
        let name = "Carol Nguyen";
        let width = r.font.text_width(r.size, name);
        assert!(width > 0 && width < 800);
        let left = r.text_left(name);
        assert_eq!(left, (800 - width as i32) / 2);

        let image = r.render(name);
        let xs: Vec<u32> = image
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != WHITE)
            .map(|(x, _, _)| x)
            .collect();
        assert!(!xs.is_empty(), "TrueType text left no ink");
        let (min_x, max_x) = (*xs.iter().min().unwrap(), *xs.iter().max().unwrap());
        assert!(
            min_x >= left as u32 && max_x <= left as u32 + width,
            "ink {min_x}..{max_x} outside {left}..{}",
            left as u32 + width
        );
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let result = CertificateRenderer::new(
            RgbaImage::new(1, 1),
            "gif2",
            CertificateFont::Builtin,
            8.0,
            0,
            INK,
        );
        assert!(matches!(result, Err(CertsendError::FileFormat { .. })));
    }

    #[test]
    fn test_unrenderable_sizes_rejected() {
        for size in [0.0, -40.0, f32::NAN, 1.0e10] {
            let result = CertificateRenderer::new(
                RgbaImage::new(1, 1),
                "png",
                CertificateFont::Builtin,
                size,
                0,
                INK,
            );
            assert!(
                matches!(result, Err(CertsendError::InvalidFontSize { .. })),
                "{size} should be rejected"
            );
        }
    }

    #[test]
    fn test_save_and_reload_png_and_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let image = renderer(64, 32).render("x");
        for (name, format) in [("1.png", ImageFormat::Png), ("2.jpg", ImageFormat::Jpeg)] {
            let path = dir.path().join(name);
            save_certificate(&image, &path, format).unwrap();
            let reloaded = load_template(&path).unwrap();
            assert_eq!(reloaded.dimensions(), (64, 32));
        }
    }

    #[test]
    fn test_load_template_missing_file() {
        assert!(matches!(
            load_template(Path::new("/nonexistent/template.png")),
            Err(CertsendError::Io { .. })
        ));
    }
}
