//! pixcloud: scalar images as colored 3D point clouds.
//!
//! - [`source`]: one [`PixelSource`] accessor over 8-bit rasters and FITS frames.
//! - [`generate`]: full, ROI and ROI+highlight point clouds.
//! - [`preview`]: contrast-stretched crops around a pixel.
//! - [`camera`]: orbit/pan/zoom camera with auto-framing.
//! - [`selection`]: focus pixel, ROI and highlight settings, consume-once requests.
//! - [`targets`]: label-data records naming FITS pairs.
//! - [`scene`]: the object list: shapes and image clouds with visibility.
//! - [`browse`], [`shapes`]: helpers for the viewer's file panels and static scene.
//!
//! World axes: pixel column → X, pixel row → Z, normalized value → Y.

pub mod browse;
pub mod camera;
pub mod error;
pub mod generate;
pub mod preview;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod source;
pub mod targets;

pub use camera::OrbitCamera;
pub use error::{LoadError, TargetsError};
pub use generate::{
    generate, generate_full, generate_roi, generate_roi_split_highlight, pixel_to_world, CloudScale,
    GenerationMode, Highlight, PixelCenter, PointCloudBuffer, Roi, SplitCloud,
};
pub use preview::{sample_preview, PreviewImage};
pub use scene::{ObjectId, SceneObjects, Shape, ShapeKind};
pub use selection::SelectionState;
pub use source::{ImageLoader, LoadedImage, PixelSource, SourceKind};
pub use targets::{FitsPair, TargetRecord};
