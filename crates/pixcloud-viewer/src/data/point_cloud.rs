//! Uploading generated clouds to the GPU.

use crate::data::types::{CloudUniform, PointInstance};
use glam::{Mat4, Vec4};
use pixcloud::PointCloudBuffer;
use rayon::prelude::*;
use wgpu::util::DeviceExt;

/// One renderable cloud: instance buffer plus its own uniform.
///
/// The buffers are freed when the value is dropped, so replacing a cloud in
/// the scene map releases the old GPU memory.
#[derive(Debug)]
pub struct CloudGpu {
    pub instances_len: u32,
    /// Multiplier on the frame's base point size (highlight clouds draw larger).
    pub size_factor: f32,

    /// Vertex buffer containing `PointInstance` data.
    pub vtx: wgpu::Buffer,
    /// Uniform buffer containing `CloudUniform` data.
    pub ubo: wgpu::Buffer,
    pub bind: wgpu::BindGroup,
}

/// Interleaves positions and colors; missing colors fall back to opaque white.
pub fn to_instances(cloud: &PointCloudBuffer) -> Vec<PointInstance> {
    cloud
        .positions
        .par_iter()
        .enumerate()
        .map(|(i, p)| PointInstance::new(*p, cloud.colors.get(i).copied().unwrap_or(Vec4::ONE)))
        .collect()
}

impl CloudGpu {
    /// Uploads `cloud`. Returns `None` for an empty cloud (nothing to draw).
    pub fn upload(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        cloud: &PointCloudBuffer,
        size_factor: f32,
    ) -> Option<Self> {
        if cloud.is_empty() {
            return None;
        }
        let instances = to_instances(cloud);

        let vtx = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let initial = CloudUniform {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            viewport_size: [1.0, 1.0],
            point_size_px: 1.0,
            _pad: 0.0,
        };
        let ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cloud UBO"),
            contents: bytemuck::bytes_of(&initial),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cloud BindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        log::debug!("Uploaded {} points for {}", instances.len(), label);

        Some(Self {
            instances_len: instances.len() as u32,
            size_factor,
            vtx,
            ubo,
            bind,
        })
    }

    pub fn make_uniform(&self, view_proj: Mat4, viewport_size: [f32; 2], base_point_size: f32) -> CloudUniform {
        CloudUniform {
            view_proj: view_proj.to_cols_array_2d(),
            viewport_size,
            point_size_px: base_point_size * self.size_factor,
            _pad: 0.0,
        }
    }
}
