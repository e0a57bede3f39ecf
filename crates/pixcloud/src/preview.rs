//! Square RGBA crops of a [`PixelSource`] for on-screen inspection.
//!
//! Scientific sources get a contrast stretch computed over the crop window
//! only (1st..99th percentile, then a sqrt gamma), so a small patch of a
//! high-dynamic-range frame stays legible wherever it sits.

use crate::generate::PixelCenter;
use crate::source::{PixelSource, SourceKind};

pub const MIN_PREVIEW_SIZE: i32 = 1;
pub const MAX_PREVIEW_SIZE: i32 = 300;

const LOW_PERCENTILE: f32 = 0.01;
const HIGH_PERCENTILE: f32 = 0.99;
/// Stretch ranges narrower than this fall back to [0, 1].
const MIN_STRETCH_SPAN: f32 = 1e-6;

/// An RGBA8 crop, row-major, `size * size * 4` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub size: u32,
    /// Image pixel at preview (0, 0) before edge clamping.
    pub origin: PixelCenter,
    /// Width and height of the sampled image.
    pub image_size: (u32, u32),
    pub rgba: Vec<u8>,
}

impl PreviewImage {
    /// Image pixel shown at preview-local `(u, v)`; `None` outside the crop.
    ///
    /// Cells past the image edge show the edge pixel, so they map to it too.
    pub fn pixel_at(&self, u: u32, v: u32) -> Option<PixelCenter> {
        if u >= self.size || v >= self.size {
            return None;
        }
        let (x, y) = clamp_to_image(self.image_size, self.origin.x + u as i32, self.origin.y + v as i32);
        Some(PixelCenter::new(x, y))
    }
}

#[inline]
fn clamp_to_image((width, height): (u32, u32), x: i32, y: i32) -> (i32, i32) {
    (x.clamp(0, width as i32 - 1), y.clamp(0, height as i32 - 1))
}

/// Nearest-rank percentile of an already sorted slice.
fn percentile(sorted: &[f32], p: f32) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (p * (sorted.len() - 1) as f32).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Crops a `size x size` window centered on `center`.
///
/// The window covers `[c - size/2, c - size/2 + size - 1]` on each axis;
/// samples outside the image repeat the nearest edge pixel. Returns `None`
/// when the source holds no image.
pub fn sample_preview<S: PixelSource + ?Sized>(source: &S, center: PixelCenter, size: i32) -> Option<PreviewImage> {
    if !source.is_loaded() {
        return None;
    }

    let size = size.clamp(MIN_PREVIEW_SIZE, MAX_PREVIEW_SIZE);
    let origin = PixelCenter::new(center.x - size / 2, center.y - size / 2);
    let image_size = (source.width(), source.height());

    let coords: Vec<(i32, i32)> = (0..size)
        .flat_map(|v| (0..size).map(move |u| (u, v)))
        .map(|(u, v)| clamp_to_image(image_size, origin.x + u, origin.y + v))
        .collect();

    let mut rgba = Vec::with_capacity(coords.len() * 4);

    match source.kind() {
        SourceKind::Raster => {
            for &(x, y) in &coords {
                let c = source.rgb(x, y);
                rgba.extend_from_slice(&[to_byte(c.x), to_byte(c.y), to_byte(c.z), 255]);
            }
        }
        SourceKind::Scientific => {
            let values: Vec<f32> = coords
                .iter()
                .map(|&(x, y)| source.normalized_value(x, y))
                .collect();

            let mut sorted = values.clone();
            sorted.sort_by(f32::total_cmp);
            let mut lo = percentile(&sorted, LOW_PERCENTILE);
            let mut hi = percentile(&sorted, HIGH_PERCENTILE);
            if hi - lo < MIN_STRETCH_SPAN {
                lo = 0.0;
                hi = 1.0;
            }

            for v in values {
                let t = ((v - lo) / (hi - lo)).clamp(0.0, 1.0).sqrt();
                let g = to_byte(t);
                rgba.extend_from_slice(&[g, g, g, 255]);
            }
        }
    }

    Some(PreviewImage {
        size: size as u32,
        origin,
        image_size,
        rgba,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FitsImage, ImageLoader, RasterImage};

    fn texel(p: &PreviewImage, u: u32, v: u32) -> [u8; 4] {
        let i = ((v * p.size + u) * 4) as usize;
        [p.rgba[i], p.rgba[i + 1], p.rgba[i + 2], p.rgba[i + 3]]
    }

    #[test]
    fn test_unloaded_has_no_preview() {
        assert!(sample_preview(&ImageLoader::new(), PixelCenter::new(0, 0), 8).is_none());
    }

    #[test]
    fn test_size_is_clamped() {
        let img = RasterImage::from_raw(2, 2, 1, vec![10; 4]).unwrap();
        let p = sample_preview(&img, PixelCenter::new(0, 0), 0).unwrap();
        assert_eq!(p.size, 1);
        let p = sample_preview(&img, PixelCenter::new(0, 0), 1000).unwrap();
        assert_eq!(p.size, 300);
        assert_eq!(p.rgba.len(), 300 * 300 * 4);
    }

    #[test]
    fn test_raster_colors_pass_through() {
        let img = RasterImage::from_raw(2, 1, 3, vec![255, 0, 0, 0, 128, 255]).unwrap();
        let p = sample_preview(&img, PixelCenter::new(1, 0), 2).unwrap();
        assert_eq!(p.origin, PixelCenter::new(0, -1));
        // Row above the image is clamped onto row 0.
        assert_eq!(texel(&p, 0, 0), [255, 0, 0, 255]);
        assert_eq!(texel(&p, 1, 0), [0, 128, 255, 255]);
        assert_eq!(texel(&p, 1, 1), [0, 128, 255, 255]);
    }

    #[test]
    fn test_edges_are_clamped() {
        let data: Vec<u8> = (0..9).map(|i| i * 20).collect();
        let img = RasterImage::from_raw(3, 3, 1, data).unwrap();
        let p = sample_preview(&img, PixelCenter::new(0, 0), 3).unwrap();
        // (-1,-1) → (0,0)
        assert_eq!(texel(&p, 0, 0)[0], 0);
        // (1,1) → value 4*20
        assert_eq!(texel(&p, 2, 2)[0], 80);
    }

    #[test]
    fn test_scientific_window_stretch() {
        // 0..=99 in a 10x10 frame; window covers all of it.
        let samples: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let img = FitsImage::from_samples(10, 10, samples).unwrap();
        let p = sample_preview(&img, PixelCenter::new(5, 5), 10).unwrap();

        // p1 = value at rank round(0.99) = 1 → 1/99; darkest pixels clamp to 0.
        assert_eq!(texel(&p, 0, 0), [0, 0, 0, 255]);
        assert_eq!(texel(&p, 1, 0)[0], 0);
        // p99 = rank round(98.01) = 98; the top two pixels saturate.
        assert_eq!(texel(&p, 8, 9)[0], 255);
        assert_eq!(texel(&p, 9, 9)[0], 255);
        // Midpoint is lifted by the sqrt gamma.
        let mid = texel(&p, 0, 5)[0];
        assert!(mid > 128, "gamma should lift mid-tones, got {mid}");
    }

    #[test]
    fn test_scientific_stretch_is_window_local() {
        // Left half is a faint gradient, right half is bright.
        let mut samples = vec![0.0f32; 40 * 4];
        for y in 0..4 {
            for x in 0..40 {
                samples[y * 40 + x] = if x < 20 { x as f32 } else { 10_000.0 };
            }
        }
        let img = FitsImage::from_samples(40, 4, samples).unwrap();
        let p = sample_preview(&img, PixelCenter::new(5, 2), 8).unwrap();
        let first = texel(&p, 0, 0)[0];
        let last = texel(&p, 7, 0)[0];
        assert_eq!(first, 0);
        assert_eq!(last, 255);
    }

    #[test]
    fn test_flat_window_falls_back_to_unit_range() {
        let mut samples = vec![0.0f32; 16];
        samples[15] = 4.0;
        let img = FitsImage::from_samples(4, 4, samples).unwrap();
        // A 2x2 window of zeros is degenerate; values map through [0,1] unchanged.
        let p = sample_preview(&img, PixelCenter::new(1, 1), 2).unwrap();
        assert!(p.rgba.chunks(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn test_pixel_at_maps_back() {
        let img = RasterImage::from_raw(50, 50, 1, vec![0; 2500]).unwrap();
        let p = sample_preview(&img, PixelCenter::new(20, 30), 11).unwrap();
        assert_eq!(p.pixel_at(5, 5), Some(PixelCenter::new(20, 30)));
        assert_eq!(p.pixel_at(0, 0), Some(PixelCenter::new(15, 25)));
        assert_eq!(p.pixel_at(11, 0), None);
    }

    #[test]
    fn test_pixel_at_edge_cells_stay_in_image() {
        let img = RasterImage::from_raw(50, 50, 1, vec![0; 2500]).unwrap();

        let p = sample_preview(&img, PixelCenter::new(0, 0), 11).unwrap();
        assert_eq!(p.origin, PixelCenter::new(-5, -5));
        assert_eq!(p.pixel_at(0, 0), Some(PixelCenter::new(0, 0)));
        assert_eq!(p.pixel_at(3, 7), Some(PixelCenter::new(0, 2)));
        assert_eq!(p.pixel_at(5, 5), Some(PixelCenter::new(0, 0)));

        let p = sample_preview(&img, PixelCenter::new(49, 48), 11).unwrap();
        assert_eq!(p.pixel_at(10, 10), Some(PixelCenter::new(49, 49)));
        assert_eq!(p.pixel_at(4, 2), Some(PixelCenter::new(48, 45)));
    }
}
