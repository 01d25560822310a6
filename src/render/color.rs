use image::Rgba;

use crate::CertsendError;

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` into an RGBA pixel.
pub fn parse_fill_color(value: &str) -> crate::Result<Rgba<u8>> {
    let invalid = || CertsendError::InvalidColor {
        value: value.to_string(),
    };
    let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = channel(&c.to_string())?;
                rgb[i] = v * 17;
            }
            Ok(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 => Ok(Rgba([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            255,
        ])),
        8 => Ok(Rgba([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        ])),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_digit() {
        assert_eq!(parse_fill_color("#767676").unwrap(), Rgba([118, 118, 118, 255]));
    }

    #[test]
    fn test_short_form_expands() {
        assert_eq!(parse_fill_color("#f0a").unwrap(), Rgba([255, 0, 170, 255]));
    }

    #[test]
    fn test_alpha_channel() {
        assert_eq!(parse_fill_color("#00000080").unwrap(), Rgba([0, 0, 0, 128]));
    }

    #[test]
    fn test_rejects_garbage() {
        for v in ["767676", "#12345", "#ggg", "", "#"] {
            assert!(
                matches!(parse_fill_color(v), Err(CertsendError::InvalidColor { .. })),
                "{v} should be rejected"
            );
        }
    }
}
