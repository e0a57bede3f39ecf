//! Interactive viewer for pixcloud point clouds.
//!
//! wgpu renders the clouds and a static reference scene; egui provides the
//! file browser, label browser and ROI preview on top.

pub mod app;
pub mod camera;
pub mod config;
pub mod data;
pub mod renderer;
pub mod ui;
