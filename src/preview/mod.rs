//! Optional on-screen display of each certificate before it is saved or sent.

#[cfg(feature = "preview-window")]
mod window;

use image::{imageops::FilterType, RgbaImage};

#[cfg(feature = "preview-window")]
pub use window::WindowPreview;

/// Widest image shown unscaled in a preview window.
pub const MAX_PREVIEW_WIDTH: u32 = 900;

/// Something that can show a rendered certificate to the operator.
///
/// Implementations may block until the operator dismisses the preview.
pub trait Previewer {
    fn show(&mut self, title: &str, image: &RgbaImage) -> crate::Result<()>;
}

/// Records what would have been shown. Used for headless runs and tests.
#[derive(Debug, Default)]
pub struct CapturePreview {
    pub shown: Vec<PreviewRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRecord {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Previewer for CapturePreview {
    fn show(&mut self, title: &str, image: &RgbaImage) -> crate::Result<()> {
        self.shown.push(PreviewRecord {
            title: title.to_string(),
            width: image.width(),
            height: image.height(),
        });
        Ok(())
    }
}

/// Shrink `image` to at most `max_width` pixels wide, keeping its aspect ratio.
pub fn fit_to_width(image: &RgbaImage, max_width: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width <= max_width || width == 0 {
        return image.clone();
    }
    let scaled_height = (u64::from(height) * u64::from(max_width) / u64::from(width)).max(1);
    image::imageops::resize(
        image,
        max_width,
        u32::try_from(scaled_height).unwrap_or(u32::MAX),
        FilterType::Triangle,
    )
}

/// The previewer the CLI uses when the `preview` action is selected.
#[cfg(feature = "preview-window")]
pub fn default_previewer() -> crate::Result<Box<dyn Previewer>> {
    Ok(Box::new(WindowPreview::new()))
}

#[cfg(not(feature = "preview-window"))]
pub fn default_previewer() -> crate::Result<Box<dyn Previewer>> {
    Err(crate::CertsendError::PreviewUnavailable)
}
