//! GPU buffers and layouts for clouds and line geometry.

pub mod point_cloud;
pub mod types;

pub use self::point_cloud::CloudGpu;
pub use self::types::{CloudUniform, LineUniform, LineVertexGpu, PointInstance};
