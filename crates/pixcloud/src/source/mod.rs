//! Pixel sources: one accessor over decoded raster and FITS images.
//!
//! Every consumer in this crate (point-cloud generation, previews) reads
//! pixels through [`PixelSource`]. The backend is picked once, at load time,
//! from the file extension; per-pixel calls never re-dispatch on format.

mod fits;
mod raster;

pub use fits::FitsImage;
pub use raster::RasterImage;

use crate::error::LoadError;
use glam::Vec3;
use std::path::{Path, PathBuf};

/// File extensions routed to the FITS loader (compared case-insensitively).
pub const FITS_EXTENSIONS: [&str; 3] = ["fits", "fit", "fts"];

/// File extensions the raster loader is expected to decode.
pub const RASTER_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "bmp", "tga", "gif", "tif", "tiff"];

/// How a source's samples should be interpreted for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// 8-bit display-range samples; colors are meaningful as-is.
    Raster,
    /// High-dynamic-range samples normalized to [0, 1] at load time.
    Scientific,
}

/// Uniform read access to a decoded image.
///
/// Coordinates are signed so callers can sample around the image edges;
/// any query outside `[0, width) x [0, height)` yields 0 / black.
pub trait PixelSource: Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn kind(&self) -> SourceKind;

    /// Scalar value in [0, 1] used as the point's height.
    fn normalized_value(&self, x: i32, y: i32) -> f32;

    /// Display color with components in [0, 1].
    fn rgb(&self, x: i32, y: i32) -> Vec3;

    fn is_loaded(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }
}

/// Returns the linear sample index of `(x, y)` if it lies inside the image.
#[inline]
pub(crate) fn pixel_index(width: u32, height: u32, x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
        return None;
    }
    Some(y as usize * width as usize + x as usize)
}

fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// True if the path names a FITS file (`.fits`, `.fit`, `.fts`).
pub fn is_fits_path(path: &Path) -> bool {
    extension_lower(path).map_or(false, |ext| FITS_EXTENSIONS.contains(&ext.as_str()))
}

/// True if the path names a file this crate can turn into a point cloud.
pub fn is_supported_image(path: &Path) -> bool {
    extension_lower(path).map_or(false, |ext| {
        FITS_EXTENSIONS.contains(&ext.as_str()) || RASTER_EXTENSIONS.contains(&ext.as_str())
    })
}

/// A decoded image of either backend.
#[derive(Debug, Clone)]
pub enum LoadedImage {
    Raster(RasterImage),
    Fits(FitsImage),
}

impl LoadedImage {
    /// Decodes `path`, choosing the backend from its extension.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        if is_fits_path(path) {
            Ok(Self::Fits(FitsImage::open(path)?))
        } else {
            Ok(Self::Raster(RasterImage::open(path)?))
        }
    }

    fn as_source(&self) -> &dyn PixelSource {
        match self {
            LoadedImage::Raster(img) => img,
            LoadedImage::Fits(img) => img,
        }
    }
}

impl PixelSource for LoadedImage {
    fn width(&self) -> u32 {
        self.as_source().width()
    }

    fn height(&self) -> u32 {
        self.as_source().height()
    }

    fn kind(&self) -> SourceKind {
        self.as_source().kind()
    }

    fn normalized_value(&self, x: i32, y: i32) -> f32 {
        self.as_source().normalized_value(x, y)
    }

    fn rgb(&self, x: i32, y: i32) -> Vec3 {
        self.as_source().rgb(x, y)
    }
}

/// Holder of the single "current" pixel source.
///
/// Loading replaces the previous image wholesale: the old buffer is
/// released before decoding starts, and a failed load leaves the loader
/// empty rather than holding stale data.
#[derive(Debug, Default)]
pub struct ImageLoader {
    current: Option<LoadedImage>,
    path: Option<PathBuf>,
}

impl ImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `path` as the current source.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let path = path.as_ref();
        self.unload();

        std::fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let image = LoadedImage::open(path)?;

        log::info!(
            "Loaded {} ({}x{}, {:?})",
            path.display(),
            image.width(),
            image.height(),
            image.kind()
        );

        self.current = Some(image);
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Installs an already decoded image as the current source.
    pub fn replace(&mut self, image: LoadedImage, path: Option<PathBuf>) {
        self.unload();
        self.current = Some(image);
        self.path = path;
    }

    pub fn unload(&mut self) {
        self.current = None;
        self.path = None;
    }

    pub fn current(&self) -> Option<&LoadedImage> {
        self.current.as_ref()
    }

    /// Path of the current source, if it came from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl PixelSource for ImageLoader {
    fn width(&self) -> u32 {
        self.current.as_ref().map_or(0, PixelSource::width)
    }

    fn height(&self) -> u32 {
        self.current.as_ref().map_or(0, PixelSource::height)
    }

    fn kind(&self) -> SourceKind {
        self.current
            .as_ref()
            .map_or(SourceKind::Raster, PixelSource::kind)
    }

    fn normalized_value(&self, x: i32, y: i32) -> f32 {
        self.current
            .as_ref()
            .map_or(0.0, |img| img.normalized_value(x, y))
    }

    fn rgb(&self, x: i32, y: i32) -> Vec3 {
        self.current.as_ref().map_or(Vec3::ZERO, |img| img.rgb(x, y))
    }
}
