//! 8-bit raster images (PNG, JPEG, BMP, ...) decoded with the `image` crate.

use super::{pixel_index, PixelSource, SourceKind};
use crate::error::LoadError;
use glam::Vec3;
use image::DynamicImage;
use std::path::Path;

/// Decoded 8-bit raster with 1, 3 or 4 interleaved channels.
#[derive(Debug, Clone)]
pub struct RasterImage {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl RasterImage {
    /// Wraps an interleaved 8-bit buffer.
    ///
    /// Two-channel buffers are treated as gray + alpha and reduced to gray.
    pub fn from_raw(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self, LoadError> {
        if width == 0 || height == 0 {
            return Err(LoadError::Empty);
        }
        if channels == 0 {
            return Err(LoadError::UnsupportedChannels(channels));
        }

        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(LoadError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        if channels == 2 {
            let gray = data.chunks_exact(2).map(|px| px[0]).collect();
            return Ok(Self {
                width,
                height,
                channels: 1,
                data: gray,
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Decodes a raster file.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let img = image::open(path)?;
        Self::from_dynamic(img)
    }

    /// Converts a decoded image into one of the 8-bit layouts we sample from.
    pub fn from_dynamic(img: DynamicImage) -> Result<Self, LoadError> {
        let (width, height) = (img.width(), img.height());
        let color = img.color();

        let (channels, data) = match img {
            DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
            other if color.has_color() && color.has_alpha() => (4, other.to_rgba8().into_raw()),
            other if color.has_color() => (3, other.to_rgb8().into_raw()),
            other => (1, other.to_luma8().into_raw()),
        };

        Self::from_raw(width, height, channels, data)
    }

    /// Rec.601 luma, truncated to 8 bits. Gray images return the sample.
    pub fn luminance(&self, x: i32, y: i32) -> u8 {
        let Some(base) = self.base(x, y) else {
            return 0;
        };
        if self.channels < 3 {
            return self.data[base];
        }
        let r = self.data[base] as f32;
        let g = self.data[base + 1] as f32;
        let b = self.data[base + 2] as f32;
        (0.299 * r + 0.587 * g + 0.114 * b) as u8
    }

    fn base(&self, x: i32, y: i32) -> Option<usize> {
        pixel_index(self.width, self.height, x, y).map(|i| i * self.channels as usize)
    }
}

impl PixelSource for RasterImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Raster
    }

    fn normalized_value(&self, x: i32, y: i32) -> f32 {
        self.luminance(x, y) as f32 / 255.0
    }

    fn rgb(&self, x: i32, y: i32) -> Vec3 {
        let Some(base) = self.base(x, y) else {
            return Vec3::ZERO;
        };
        if self.channels < 3 {
            let v = self.data[base] as f32 / 255.0;
            return Vec3::splat(v);
        }
        Vec3::new(
            self.data[base] as f32,
            self.data[base + 1] as f32,
            self.data[base + 2] as f32,
        ) / 255.0
    }

    fn is_loaded(&self) -> bool {
        !self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{GrayAlphaImage, LumaA, Rgb, RgbImage};

    #[test]
    fn test_luminance_truncates() {
        // 0.299*10 + 0.587*20 + 0.114*30 = 18.11
        let img = RasterImage::from_raw(1, 1, 3, vec![10, 20, 30]).unwrap();
        assert_eq!(img.luminance(0, 0), 18);
        assert_relative_eq!(img.normalized_value(0, 0), 18.0 / 255.0);
    }

    #[test]
    fn test_gray_rgb_replicates_sample() {
        let img = RasterImage::from_raw(2, 1, 1, vec![0, 255]).unwrap();
        assert_eq!(img.rgb(0, 0), Vec3::ZERO);
        assert_eq!(img.rgb(1, 0), Vec3::ONE);
        assert_eq!(img.normalized_value(1, 0), 1.0);
    }

    #[test]
    fn test_rgba_ignores_alpha() {
        let img = RasterImage::from_raw(1, 1, 4, vec![255, 0, 0, 10]).unwrap();
        assert_eq!(img.rgb(0, 0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(img.luminance(0, 0), 76);
    }

    #[test]
    fn test_out_of_range_is_black() {
        let img = RasterImage::from_raw(2, 2, 3, vec![200; 12]).unwrap();
        assert_eq!(img.normalized_value(2, 0), 0.0);
        assert_eq!(img.normalized_value(0, -1), 0.0);
        assert_eq!(img.rgb(-1, 0), Vec3::ZERO);
        assert_eq!(img.rgb(0, 2), Vec3::ZERO);
    }

    #[test]
    fn test_from_raw_rejects_bad_buffers() {
        assert!(matches!(
            RasterImage::from_raw(2, 2, 3, vec![0; 5]),
            Err(LoadError::SizeMismatch { expected: 12, actual: 5 })
        ));
        assert!(matches!(RasterImage::from_raw(0, 2, 1, vec![]), Err(LoadError::Empty)));
        assert!(matches!(
            RasterImage::from_raw(1, 1, 0, vec![]),
            Err(LoadError::UnsupportedChannels(0))
        ));
    }

    #[test]
    fn test_gray_alpha_reduced_to_gray() {
        let mut buf = GrayAlphaImage::new(2, 1);
        buf.put_pixel(0, 0, LumaA([40, 255]));
        buf.put_pixel(1, 0, LumaA([200, 0]));
        let img = RasterImage::from_dynamic(DynamicImage::ImageLumaA8(buf)).unwrap();
        assert_eq!(img.channels, 1);
        assert_eq!(img.luminance(0, 0), 40);
        assert_eq!(img.luminance(1, 0), 200);
    }

    #[test]
    fn test_from_dynamic_rgb() {
        let mut buf = RgbImage::new(3, 2);
        buf.put_pixel(2, 1, Rgb([0, 255, 0]));
        let img = RasterImage::from_dynamic(DynamicImage::ImageRgb8(buf)).unwrap();
        assert_eq!((img.width(), img.height(), img.channels), (3, 2, 3));
        assert_eq!(img.rgb(2, 1), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(img.kind(), SourceKind::Raster);
    }
}
