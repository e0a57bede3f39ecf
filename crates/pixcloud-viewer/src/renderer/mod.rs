//! Owns the GPU context, the depth target and the scene pipelines.

pub mod context;
pub mod pipelines;
pub mod targets;

use self::{
    context::GfxContext,
    pipelines::{lines::LinePipeline, points::PointPipeline},
    targets::Targets,
};
use crate::data::CloudGpu;
use glam::Mat4;
use std::sync::Arc;
use winit::window::Window;

/// Light gray backdrop.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.95,
    g: 0.95,
    b: 0.95,
    a: 1.0,
};

pub struct Renderer {
    pub gfx: GfxContext,
    pub targets: Targets,
    pub points: PointPipeline,
    pub lines: LinePipeline,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window).await?;
        let targets = Targets::new(&gfx.device, gfx.size);
        let points = PointPipeline::new(&gfx.device, gfx.config.format, targets.depth_fmt);
        let lines = LinePipeline::new(&gfx.device, gfx.config.format, targets.depth_fmt);

        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Ok(Self {
            gfx,
            targets,
            points,
            lines,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.targets.resize(&self.gfx.device, new_size);
        }
    }

    /// Writes each cloud's uniform for this frame.
    pub fn update_clouds<'c>(
        &self,
        clouds: impl IntoIterator<Item = &'c CloudGpu>,
        view_proj: Mat4,
        point_size_px: f32,
    ) {
        let viewport = self.gfx.viewport_size();
        for cloud in clouds {
            let ubo = cloud.make_uniform(view_proj, viewport, point_size_px);
            self.gfx.queue.write_buffer(&cloud.ubo, 0, bytemuck::bytes_of(&ubo));
        }
    }

    /// Scene pass: clear, static lines, then every cloud.
    pub fn render<'c>(
        &mut self,
        swap_view: &wgpu::TextureView,
        clouds: impl IntoIterator<Item = &'c CloudGpu>,
        view_proj: Mat4,
    ) {
        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.lines.draw(&mut pass, &self.gfx.queue, view_proj);

            for cloud in clouds {
                self.points.draw_cloud(&mut pass, cloud);
            }
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}
