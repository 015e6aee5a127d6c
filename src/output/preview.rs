//! Terminal preview of rendered images using half-block characters

use crate::error::Result;
use crate::theme::Theme;
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};

/// Default preview width in terminal columns
pub const DEFAULT_PREVIEW_COLUMNS: u32 = 64;

const DARK_THRESHOLD: u8 = 128;

/// Draw image bytes as lines of `▀`, `▄`, `█` and spaces.
///
/// Each character covers two vertically stacked pixels. Glyphs are painted in
/// the terminal foreground colour, which is dark on a light theme and light on
/// a dark one, so the dark theme inverts which pixels get ink.
pub fn render_preview(bytes: &[u8], theme: Theme, max_columns: u32) -> Result<Vec<String>> {
    let gray = image::load_from_memory(bytes)?.to_luma8();
    let scaled = fit_width(gray, max_columns.max(1));

    let (width, height) = scaled.dimensions();
    let mut lines = Vec::with_capacity(height.div_ceil(2) as usize);
    for y in (0..height).step_by(2) {
        let line: String = (0..width)
            .map(|x| {
                let top = ink(&scaled, x, y, theme);
                let bottom = y + 1 < height && ink(&scaled, x, y + 1, theme);
                match (top, bottom) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                }
            })
            .collect();
        lines.push(line.trim_end().to_string());
    }

    Ok(lines)
}

fn fit_width(image: GrayImage, max_columns: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width <= max_columns {
        return image;
    }
    let scaled_height = ((height as u64 * max_columns as u64) / width as u64).max(1) as u32;
    imageops::resize(&image, max_columns, scaled_height, FilterType::Nearest)
}

fn ink(image: &GrayImage, x: u32, y: u32, theme: Theme) -> bool {
    let Luma([value]) = *image.get_pixel(x, y);
    let dark = value < DARK_THRESHOLD;
    match theme {
        Theme::Light => dark,
        Theme::Dark => !dark,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn png(image: GrayImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(image)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    // 2x2 checker: dark top-left and bottom-right.
    fn checker() -> Vec<u8> {
        png(GrayImage::from_fn(2, 2, |x, y| {
            if x == y { Luma([0]) } else { Luma([255]) }
        }))
    }

    #[test]
    fn test_light_theme_inks_dark_pixels() {
        let lines = render_preview(&checker(), Theme::Light, 10).unwrap();
        assert_eq!(lines, vec!["▀▄".to_string()]);
    }

    #[test]
    fn test_dark_theme_inverts() {
        let lines = render_preview(&checker(), Theme::Dark, 10).unwrap();
        assert_eq!(lines, vec!["▄▀".to_string()]);
    }

    #[test]
    fn test_wide_images_are_scaled_down() {
        let bytes = png(GrayImage::from_pixel(300, 300, Luma([0])));
        let lines = render_preview(&bytes, Theme::Light, 30).unwrap();
        assert_eq!(lines.len(), 15);
        assert!(lines.iter().all(|line| line.chars().count() == 30));
        assert!(lines.iter().all(|line| line.chars().all(|c| c == '█')));
    }

    #[test]
    fn test_odd_height_keeps_last_row() {
        let bytes = png(GrayImage::from_pixel(1, 3, Luma([0])));
        let lines = render_preview(&bytes, Theme::Light, 10).unwrap();
        assert_eq!(lines, vec!["█".to_string(), "▀".to_string()]);
    }

    #[test]
    fn test_non_image_bytes_fail() {
        assert!(render_preview(b"<html>oops</html>", Theme::Light, 10).is_err());
    }
}
