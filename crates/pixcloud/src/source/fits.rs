//! FITS images read through `fitsio` and normalized to [0, 1] at load time.

use super::{pixel_index, PixelSource, SourceKind};
use crate::error::LoadError;
use fitsio::hdu::{FitsHdu, HduInfo};
use fitsio::FitsFile;
use glam::Vec3;
use rayon::prelude::*;
use std::path::Path;

/// Single-channel scientific image with samples normalized to [0, 1].
#[derive(Debug, Clone)]
pub struct FitsImage {
    width: u32,
    height: u32,
    data: Vec<f32>,
    raw_range: Option<(f32, f32)>,
}

/// `[height, width, ..]` of an image HDU, as cfitsio reports it.
///
/// The shape comes from the image parameters rather than the raw `NAXISn`
/// keywords, so tile-compressed extensions report the image, not the
/// binary table that stores it.
fn image_shape(hdu: &FitsHdu) -> &[usize] {
    match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => shape,
        _ => &[],
    }
}

impl FitsImage {
    /// Reads the first HDU carrying image data.
    ///
    /// Compressed files store an empty primary HDU and put the image in
    /// the first extension, so an empty primary falls through to HDU 1.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let mut fptr = FitsFile::open(path)?;

        let mut hdu = fptr.primary_hdu()?;
        if image_shape(&hdu).is_empty() {
            if let Ok(ext) = fptr.hdu(1) {
                hdu = ext;
            }
        }

        let (height, width) = match image_shape(&hdu) {
            &[height, width] => (height, width),
            other => {
                return Err(LoadError::UnsupportedDimensions { naxis: other.len() });
            }
        };
        if width == 0 || height == 0 {
            return Err(LoadError::Empty);
        }

        let samples: Vec<f32> = hdu.read_image(&mut fptr)?;

        let img = Self::from_samples(width as u32, height as u32, samples)?;
        log::debug!(
            "FITS {}: {}x{}, raw range {:?}",
            path.display(),
            width,
            height,
            img.raw_range
        );
        Ok(img)
    }

    /// Normalizes raw samples with their own finite min/max.
    ///
    /// Non-finite samples become 0; a constant image maps entirely to 0.
    pub fn from_samples(width: u32, height: u32, mut samples: Vec<f32>) -> Result<Self, LoadError> {
        if width == 0 || height == 0 {
            return Err(LoadError::Empty);
        }
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(LoadError::SizeMismatch {
                expected,
                actual: samples.len(),
            });
        }

        let (min, max) = samples
            .par_iter()
            .filter(|v| v.is_finite())
            .fold(
                || (f32::INFINITY, f32::NEG_INFINITY),
                |(lo, hi), &v| (lo.min(v), hi.max(v)),
            )
            .reduce(
                || (f32::INFINITY, f32::NEG_INFINITY),
                |a, b| (a.0.min(b.0), a.1.max(b.1)),
            );

        let raw_range = (min <= max).then_some((min, max));
        let span = max - min;

        samples.par_iter_mut().for_each(|v| {
            *v = if v.is_finite() && span > 0.0 {
                ((*v - min) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
        });

        Ok(Self {
            width,
            height,
            data: samples,
            raw_range,
        })
    }
}

impl PixelSource for FitsImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Scientific
    }

    fn normalized_value(&self, x: i32, y: i32) -> f32 {
        pixel_index(self.width, self.height, x, y).map_or(0.0, |i| self.data[i])
    }

    fn rgb(&self, x: i32, y: i32) -> Vec3 {
        Vec3::splat(self.normalized_value(x, y))
    }

    fn is_loaded(&self) -> bool {
        !self.data.is_empty()
    }
}
