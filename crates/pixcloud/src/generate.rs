//! Point-cloud generation from a [`PixelSource`].
//!
//! Axis convention: pixel column → world X, pixel row → world Z, normalized
//! value → world Y. X and Z are centered on the *full* image (W/2, H/2) in
//! every mode, so an ROI cloud lands exactly where the same pixels sit in a
//! full cloud of that image.

use crate::source::PixelSource;
use glam::{Vec3, Vec4};
use rayon::prelude::*;

/// Default highlight color (opaque red-ish).
pub const DEFAULT_HIGHLIGHT_COLOR: Vec4 = Vec4::new(1.0, 0.2, 0.2, 1.0);

/// Per-axis world scale applied to pixel coordinates and values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudScale {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl CloudScale {
    pub const UNIT: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Default for CloudScale {
    /// Flat, wide clouds: 0.1 world units per pixel, 10 units of relief.
    fn default() -> Self {
        Self::new(0.1, 10.0, 0.1)
    }
}

/// A pixel coordinate in image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCenter {
    pub x: i32,
    pub y: i32,
}

impl PixelCenter {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Index-aligned positions and colors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloudBuffer {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec4>,
}

impl PointCloudBuffer {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            positions: Vec::with_capacity(n),
            colors: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn push(&mut self, position: Vec3, color: Vec4) {
        self.positions.push(position);
        self.colors.push(color);
    }

    /// Pads colors with opaque white so every position has one.
    pub fn pad_colors(&mut self) {
        if self.colors.len() < self.positions.len() {
            self.colors.resize(self.positions.len(), Vec4::ONE);
        }
    }

    /// Axis-aligned bounds of the positions, `None` when empty.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }

    fn extend(&mut self, other: PointCloudBuffer) {
        self.positions.extend(other.positions);
        self.colors.extend(other.colors);
    }
}

/// Output of highlight-split generation. A pixel lands in exactly one half.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitCloud {
    pub primary: PointCloudBuffer,
    pub highlight: PointCloudBuffer,
}

impl SplitCloud {
    pub fn len(&self) -> usize {
        self.primary.len() + self.highlight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.highlight.is_empty()
    }
}

/// Square pixel window around a center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub center: PixelCenter,
    pub radius: i32,
}

/// Square sub-window whose points are pulled out and recolored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    pub center: PixelCenter,
    pub size: i32,
    pub color: Vec4,
}

impl Highlight {
    /// Inclusive pixel range covered on one axis.
    fn span(c: i32, size: i32) -> (i32, i32) {
        let lo = c - size / 2;
        (lo, lo + size - 1)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        if self.size <= 0 {
            return false;
        }
        let (x0, x1) = Self::span(self.center.x, self.size);
        let (y0, y1) = Self::span(self.center.y, self.size);
        (x0..=x1).contains(&x) && (y0..=y1).contains(&y)
    }
}

/// Which generator a (re)load should run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GenerationMode {
    Full,
    RoiHighlight { roi: Roi, highlight: Highlight },
}

/// World position of pixel `(x, y)`.
pub fn pixel_to_world<S: PixelSource + ?Sized>(source: &S, x: i32, y: i32, scale: CloudScale) -> Vec3 {
    let cx = source.width() as f32 * 0.5;
    let cz = source.height() as f32 * 0.5;
    Vec3::new(
        (x as f32 - cx) * scale.x,
        source.normalized_value(x, y) * scale.y,
        (y as f32 - cz) * scale.z,
    )
}

/// Inclusive pixel bounds of an ROI clipped to the image; `None` if empty.
pub fn roi_bounds(width: u32, height: u32, roi: Roi) -> Option<(i32, i32, i32, i32)> {
    if width == 0 || height == 0 {
        return None;
    }
    let r = roi.radius.max(0);
    let x0 = roi.center.x.saturating_sub(r).max(0);
    let x1 = roi.center.x.saturating_add(r).min(width as i32 - 1);
    let y0 = roi.center.y.saturating_sub(r).max(0);
    let y1 = roi.center.y.saturating_add(r).min(height as i32 - 1);
    (x0 <= x1 && y0 <= y1).then_some((x0, x1, y0, y1))
}

/// Samples rows `y0..=y1`, columns `x0..=x1` in parallel, keeping row-major order.
fn sample_window<S: PixelSource + ?Sized>(
    source: &S,
    (x0, x1, y0, y1): (i32, i32, i32, i32),
    scale: CloudScale,
    highlight: Option<&Highlight>,
) -> SplitCloud {
    let rows: Vec<SplitCloud> = (y0..=y1)
        .into_par_iter()
        .map(|y| {
            let mut row = SplitCloud {
                primary: PointCloudBuffer::with_capacity((x1 - x0 + 1) as usize),
                highlight: PointCloudBuffer::default(),
            };
            for x in x0..=x1 {
                let pos = pixel_to_world(source, x, y, scale);
                match highlight {
                    Some(h) if h.contains(x, y) => row.highlight.push(pos, h.color),
                    _ => row.primary.push(pos, source.rgb(x, y).extend(1.0)),
                }
            }
            row
        })
        .collect();

    let total: usize = rows.iter().map(|r| r.primary.len()).sum();
    let mut out = SplitCloud {
        primary: PointCloudBuffer::with_capacity(total),
        highlight: PointCloudBuffer::default(),
    };
    for row in rows {
        out.primary.extend(row.primary);
        out.highlight.extend(row.highlight);
    }
    out.primary.pad_colors();
    out.highlight.pad_colors();
    out
}

/// Every pixel, row-major. Empty if the source is not loaded.
pub fn generate_full<S: PixelSource + ?Sized>(source: &S, scale: CloudScale) -> PointCloudBuffer {
    if !source.is_loaded() {
        return PointCloudBuffer::default();
    }
    let bounds = (0, source.width() as i32 - 1, 0, source.height() as i32 - 1);
    let cloud = sample_window(source, bounds, scale, None).primary;
    log::debug!("Generated full point cloud with {} points", cloud.len());
    cloud
}

/// Pixels within `radius` (Chebyshev) of the center, clipped to the image.
pub fn generate_roi<S: PixelSource + ?Sized>(source: &S, roi: Roi, scale: CloudScale) -> PointCloudBuffer {
    let Some(bounds) = roi_bounds(source.width(), source.height(), roi) else {
        return PointCloudBuffer::default();
    };
    let cloud = sample_window(source, bounds, scale, None).primary;
    log::debug!(
        "Generated ROI point cloud with {} points around ({}, {}) r={}",
        cloud.len(),
        roi.center.x,
        roi.center.y,
        roi.radius
    );
    cloud
}

/// ROI cloud with the highlight square moved into its own buffer.
pub fn generate_roi_split_highlight<S: PixelSource + ?Sized>(
    source: &S,
    roi: Roi,
    highlight: Highlight,
    scale: CloudScale,
) -> SplitCloud {
    let Some(bounds) = roi_bounds(source.width(), source.height(), roi) else {
        return SplitCloud::default();
    };
    let split = sample_window(source, bounds, scale, Some(&highlight));
    log::debug!(
        "Generated ROI point cloud: {} primary, {} highlighted",
        split.primary.len(),
        split.highlight.len()
    );
    split
}

/// Runs the generator selected by `mode`.
pub fn generate<S: PixelSource + ?Sized>(source: &S, mode: GenerationMode, scale: CloudScale) -> SplitCloud {
    match mode {
        GenerationMode::Full => SplitCloud {
            primary: generate_full(source, scale),
            highlight: PointCloudBuffer::default(),
        },
        GenerationMode::RoiHighlight { roi, highlight } => {
            generate_roi_split_highlight(source, roi, highlight, scale)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FitsImage, ImageLoader, RasterImage};
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    fn gray(w: u32, h: u32) -> RasterImage {
        let data = (0..w * h).map(|i| (i * 37 % 256) as u8).collect();
        RasterImage::from_raw(w, h, 1, data).unwrap()
    }

    fn roi(x: i32, y: i32, radius: i32) -> Roi {
        Roi {
            center: PixelCenter::new(x, y),
            radius,
        }
    }

    fn expected_roi_count(w: i32, h: i32, cx: i32, cy: i32, r: i32) -> usize {
        let nx = (w - 1).min(cx + r) - 0.max(cx - r) + 1;
        let ny = (h - 1).min(cy + r) - 0.max(cy - r) + 1;
        if nx <= 0 || ny <= 0 {
            0
        } else {
            (nx * ny) as usize
        }
    }

    #[test]
    fn test_full_4x2_positions() {
        let data = vec![0, 85, 170, 255, 0, 85, 170, 255];
        let img = RasterImage::from_raw(4, 2, 1, data).unwrap();
        let cloud = generate_full(&img, CloudScale::UNIT);

        assert_eq!(cloud.len(), 8);
        assert_eq!(cloud.colors.len(), 8);
        assert_eq!(cloud.positions[0], Vec3::new(-2.0, 0.0, -1.0));
        assert_eq!(cloud.positions[3], Vec3::new(1.0, 1.0, -1.0));
        assert_eq!(cloud.positions[4], Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(cloud.colors[3], Vec4::ONE);
    }

    #[test]
    fn test_full_unloaded_is_empty() {
        let loader = ImageLoader::new();
        assert!(generate_full(&loader, CloudScale::default()).is_empty());
    }

    #[test]
    fn test_full_is_centered() {
        let img = gray(6, 4);
        let cloud = generate_full(&img, CloudScale::UNIT);
        let n = cloud.len() as f32;
        let mean_x: f32 = cloud.positions.iter().map(|p| p.x).sum::<f32>() / n;
        let mean_z: f32 = cloud.positions.iter().map(|p| p.z).sum::<f32>() / n;
        assert!(mean_x.abs() <= 1.0);
        assert!(mean_z.abs() <= 1.0);
    }

    #[test]
    fn test_scales_apply_per_axis() {
        let img = FitsImage::from_samples(2, 2, vec![0.0, 1.0, 2.0, 4.0]).unwrap();
        let p = pixel_to_world(&img, 1, 1, CloudScale::new(0.5, 10.0, 2.0));
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 10.0);
        assert_relative_eq!(p.z, 0.0);
        let p = pixel_to_world(&img, 0, 1, CloudScale::new(0.5, 10.0, 2.0));
        assert_relative_eq!(p.x, -0.5);
        assert_relative_eq!(p.y, 5.0);
    }

    #[test]
    fn test_roi_5x5_counts() {
        let img = gray(5, 5);
        let cloud = generate_roi(&img, roi(2, 2, 1), CloudScale::UNIT);
        assert_eq!(cloud.len(), 9);
        // Row-major from (1,1): first point is x=1, y=1 relative to center 2.5.
        assert_eq!(cloud.positions[0].x, -1.5);
        assert_eq!(cloud.positions[0].z, -1.5);
        assert_eq!(cloud.positions[8].x, 0.5);

        assert_eq!(generate_roi(&img, roi(0, 0, 0), CloudScale::UNIT).len(), 1);
    }

    #[test]
    fn test_roi_count_formula_and_edges() {
        let img = gray(7, 5);
        for &(cx, cy, r) in &[(0, 0, 2), (6, 4, 3), (3, 2, 10), (-3, 2, 2), (20, 20, 1), (3, 2, -4)] {
            let got = generate_roi(&img, roi(cx, cy, r), CloudScale::UNIT).len();
            assert_eq!(got, expected_roi_count(7, 5, cx, cy, r.max(0)), "roi ({cx},{cy}) r={r}");
        }
    }

    #[test]
    fn test_roi_keeps_full_image_centering() {
        let img = gray(8, 6);
        let full = generate_full(&img, CloudScale::UNIT);
        let part = generate_roi(&img, roi(5, 4, 0), CloudScale::UNIT);
        assert_eq!(part.positions[0], full.positions[4 * 8 + 5]);
    }

    #[test]
    fn test_split_is_strict_partition() {
        let img = gray(9, 9);
        let r = roi(4, 4, 3);
        let h = Highlight {
            center: PixelCenter::new(4, 4),
            size: 3,
            color: DEFAULT_HIGHLIGHT_COLOR,
        };
        let split = generate_roi_split_highlight(&img, r, h, CloudScale::UNIT);
        let plain = generate_roi(&img, r, CloudScale::UNIT);

        assert_eq!(split.highlight.len(), 9);
        assert_eq!(split.len(), plain.len());

        let key = |p: &Vec3| (p.x.to_bits(), p.z.to_bits());
        let a: HashSet<_> = split.primary.positions.iter().map(key).collect();
        let b: HashSet<_> = split.highlight.positions.iter().map(key).collect();
        assert!(a.is_disjoint(&b));
        assert!(split.highlight.colors.iter().all(|&c| c == DEFAULT_HIGHLIGHT_COLOR));
    }

    #[test]
    fn test_even_highlight_window_is_offset_low() {
        let h = Highlight {
            center: PixelCenter::new(5, 5),
            size: 4,
            color: Vec4::ONE,
        };
        assert!(h.contains(3, 3));
        assert!(h.contains(6, 6));
        assert!(!h.contains(7, 5));
        assert!(!h.contains(2, 5));
    }

    #[test]
    fn test_highlight_outside_roi_is_empty() {
        let img = gray(10, 10);
        let h = Highlight {
            center: PixelCenter::new(9, 9),
            size: 1,
            color: Vec4::ONE,
        };
        let split = generate_roi_split_highlight(&img, roi(1, 1, 1), h, CloudScale::UNIT);
        assert!(split.highlight.is_empty());
        assert_eq!(split.primary.len(), 9);
    }

    #[test]
    fn test_generate_dispatch() {
        let img = gray(4, 4);
        assert_eq!(generate(&img, GenerationMode::Full, CloudScale::UNIT).len(), 16);
        let mode = GenerationMode::RoiHighlight {
            roi: roi(0, 0, 1),
            highlight: Highlight {
                center: PixelCenter::new(0, 0),
                size: 1,
                color: Vec4::ONE,
            },
        };
        let split = generate(&img, mode, CloudScale::UNIT);
        assert_eq!(split.primary.len(), 3);
        assert_eq!(split.highlight.len(), 1);
    }

    #[test]
    fn test_pad_colors_and_bounds() {
        let mut buf = PointCloudBuffer::default();
        assert!(buf.bounds().is_none());
        buf.positions.push(Vec3::new(-1.0, 0.0, 2.0));
        buf.positions.push(Vec3::new(3.0, 1.0, -2.0));
        buf.pad_colors();
        assert_eq!(buf.colors, vec![Vec4::ONE; 2]);
        let (lo, hi) = buf.bounds().unwrap();
        assert_eq!(lo, Vec3::new(-1.0, 0.0, -2.0));
        assert_eq!(hi, Vec3::new(3.0, 1.0, 2.0));
    }
}
