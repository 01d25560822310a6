use image::RgbaImage;
use minifb::{Window, WindowOptions};

use super::{fit_to_width, Previewer, MAX_PREVIEW_WIDTH};
use crate::CertsendError;

/// Opens a native window per certificate and waits for any key press.
#[derive(Debug, Default)]
pub struct WindowPreview;

impl WindowPreview {
    pub fn new() -> Self {
        Self
    }
}

impl Previewer for WindowPreview {
    fn show(&mut self, title: &str, image: &RgbaImage) -> crate::Result<()> {
        let shown = fit_to_width(image, MAX_PREVIEW_WIDTH);
        let (width, height) = (shown.width() as usize, shown.height() as usize);
        let buffer = to_xrgb(&shown);

        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| CertsendError::Preview {
                reason: e.to_string(),
            })?;
        window.set_target_fps(30);

        while window.is_open() && window.get_keys().is_empty() {
            window
                .update_with_buffer(&buffer, width, height)
                .map_err(|e| CertsendError::Preview {
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }
}

/// minifb wants one `0RGB` u32 per pixel. Alpha is composited over white.
fn to_xrgb(image: &RgbaImage) -> Vec<u32> {
    image
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            let over_white = |c: u8| {
                let c = u32::from(c) * u32::from(a) + 255 * (255 - u32::from(a));
                c / 255
            };
            (over_white(r) << 16) | (over_white(g) << 8) | over_white(b)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_to_xrgb_packs_channels() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([0x12, 0x34, 0x56, 255]));
        assert_eq!(to_xrgb(&image), vec![0x0012_3456]);
    }

    #[test]
    fn test_to_xrgb_transparent_is_white() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        assert_eq!(to_xrgb(&image), vec![0x00FF_FFFF]);
    }
}
