use clap::Parser;
use pixcloud::CloudScale;
use std::path::PathBuf;

/// `pixcloud-viewer` - Browse images and FITS frames as 3D point clouds.
///
/// Each checked image becomes a cloud: pixel column and row span the ground
/// plane, brightness lifts points upwards. Label files name aligned/template
/// FITS pairs and the pixel to focus on.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct ViewerConfig {
    /// Directory listed by the file browser on start-up.
    #[arg(long, env = "PIXCLOUD_IMAGE_ROOT", default_value = "test-img")]
    pub image_root: PathBuf,

    /// File name (inside `image_root`) checked automatically on the first frame.
    #[arg(long, env = "PIXCLOUD_DEFAULT_FILE", default_value = "small_image.jpg")]
    pub default_file: String,

    /// Root of the label-data tree (target `.txt` files).
    #[arg(long, env = "PIXCLOUD_LABEL_ROOT", default_value = "test-label-data")]
    pub label_root: PathBuf,

    /// World units per pixel column.
    #[arg(long, env = "PIXCLOUD_SCALE_X", default_value_t = 0.1)]
    pub scale_x: f32,

    /// World units of height for a fully bright pixel.
    #[arg(long, env = "PIXCLOUD_SCALE_Y", default_value_t = 10.0)]
    pub scale_y: f32,

    /// World units per pixel row.
    #[arg(long, env = "PIXCLOUD_SCALE_Z", default_value_t = 0.1)]
    pub scale_z: f32,

    /// Base point sprite size in pixels.
    #[arg(long, env = "PIXCLOUD_POINT_SIZE", default_value_t = 3.0)]
    pub point_size: f32,

    /// Vertical field of view in degrees; also sets how far framing backs off.
    #[arg(long, env = "PIXCLOUD_FOV", default_value_t = 45.0)]
    pub fov: f32,

    #[arg(long, default_value_t = 1600)]
    pub width: u32,

    #[arg(long, default_value_t = 900)]
    pub height: u32,
}

impl ViewerConfig {
    pub fn scale(&self) -> CloudScale {
        CloudScale::new(self.scale_x, self.scale_y, self.scale_z)
    }
}
