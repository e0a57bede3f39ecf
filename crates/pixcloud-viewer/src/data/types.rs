//! GPU-side data layouts, shared with the inline WGSL in the pipelines.

use glam::{Vec3, Vec4};
use pixcloud::shapes::LineVertex;

/// Per-instance point data. Must match the instance inputs of the point shader.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct PointInstance {
    pub pos: [f32; 3],
    /// RGBA8, read as `Unorm8x4`.
    pub color: [u8; 4],
}

impl PointInstance {
    pub fn new(pos: Vec3, color: Vec4) -> Self {
        let c = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
        Self {
            pos: pos.to_array(),
            color: [c.x as u8, c.y as u8, c.z as u8, c.w as u8],
        }
    }
}

/// Per-cloud uniform, std140.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CloudUniform {
    pub view_proj: [[f32; 4]; 4], // 64 B
    /// Viewport in physical pixels.
    pub viewport_size: [f32; 2], // +8
    pub point_size_px: f32,      // +4
    pub _pad: f32,               // +4 -> 80
}

const _: [(); 80] = [(); core::mem::size_of::<CloudUniform>()];

/// Uniform for the line pipeline: just the camera.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineUniform {
    pub view_proj: [[f32; 4]; 4],
}

const _: [(); 64] = [(); core::mem::size_of::<LineUniform>()];

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct LineVertexGpu {
    pub pos: [f32; 3],
    pub color: [f32; 3],
}

impl From<&LineVertex> for LineVertexGpu {
    fn from(v: &LineVertex) -> Self {
        Self {
            pos: v.position.to_array(),
            color: v.color.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_instance_packs_color() {
        let p = PointInstance::new(Vec3::new(1.0, 2.0, 3.0), Vec4::new(1.0, 0.5, -1.0, 2.0));
        assert_eq!(p.pos, [1.0, 2.0, 3.0]);
        assert_eq!(p.color, [255, 128, 0, 255]);
        assert_eq!(std::mem::size_of::<PointInstance>(), 16);
    }

    #[test]
    fn test_line_vertex_conversion() {
        let v = LineVertex::new(Vec3::X, Vec3::new(0.5, 0.5, 0.5));
        let g = LineVertexGpu::from(&v);
        assert_eq!(g.pos, [1.0, 0.0, 0.0]);
        assert_eq!(g.color, [0.5; 3]);
    }
}
