//! Error types for pixcloud.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to install a new pixel source.
///
/// A failed load always leaves the loader unloaded; callers log the error
/// and keep whatever they were showing before.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("FITS error: {0}")]
    Fits(#[from] fitsio::errors::Error),

    /// Only two-dimensional FITS images are displayable.
    #[error("only 2D FITS images are supported (NAXIS={naxis})")]
    UnsupportedDimensions { naxis: usize },

    /// Raster layouts other than gray, RGB or RGB plus extra channels.
    #[error("unsupported channel count {0}")]
    UnsupportedChannels(u8),

    #[error("image has no pixels")]
    Empty,

    #[error("sample buffer holds {actual} values, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Failure to read a label-data target file.
#[derive(Error, Debug)]
pub enum TargetsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no target records found in {0}")]
    NoRecords(PathBuf),
}
