use crate::{
    camera::CameraController,
    config::ViewerConfig,
    data::CloudGpu,
    renderer::Renderer,
    ui::{self, HudInfo, UiEvent, UiState},
};
use anyhow::Result;
use pixcloud::browse::resolve_root;
use pixcloud::preview::MAX_PREVIEW_SIZE;
use pixcloud::shapes::{self, LineVertex, WorldLabel};
use pixcloud::targets::default_search_roots;
use pixcloud::{
    generate, pixel_to_world, sample_preview, CloudScale, FitsPair, ImageLoader, OrbitCamera,
    ObjectId, PixelSource, SceneObjects, SelectionState, TargetRecord,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use winit::{event::WindowEvent, window::Window};

const GRID_SIZE: f32 = 20.0;
const GRID_DIVISIONS: u32 = 20;
const AXIS_LENGTH: f32 = 5.0;
/// Images wider than this (world units, diagonal) always re-frame the camera.
const REFRAME_DIAGONAL: f32 = 50.0;

/// GPU buffers for one image. Dropping it frees them.
#[derive(Debug)]
pub struct SceneCloud {
    pub primary: Option<CloudGpu>,
    pub highlight: Option<CloudGpu>,
    pub points: usize,
}

impl SceneCloud {
    pub fn iter(&self) -> impl Iterator<Item = &CloudGpu> {
        self.primary.iter().chain(self.highlight.iter())
    }
}

/// World-space diagonal of an image's ground footprint.
fn image_diagonal(width: u32, height: u32, scale: CloudScale) -> f32 {
    let w = width as f32 * scale.x;
    let d = height as f32 * scale.z;
    (w * w + d * d).sqrt()
}

fn should_frame(first_image: bool, diagonal: f32) -> bool {
    first_image || diagonal > REFRAME_DIAGONAL
}

/// Crop side for the ROI preview: the ROI diameter, capped.
fn preview_crop_size(roi_radius: i32) -> i32 {
    (roi_radius * 2).min(MAX_PREVIEW_SIZE)
}

/// Grid and axes followed by every visible scene shape.
fn scene_lines(scene: &SceneObjects) -> Vec<LineVertex> {
    let mut lines = shapes::grid(GRID_SIZE, GRID_DIVISIONS);
    lines.extend(shapes::axes(AXIS_LENGTH));
    lines.extend(scene.shape_lines());
    lines
}

/// Moves `last` to the end of `paths`, so it is the image left in the loader.
fn reload_order(mut paths: Vec<PathBuf>, last: Option<&Path>) -> Vec<PathBuf> {
    if let Some(i) = last.and_then(|last| paths.iter().position(|p| p == last)) {
        let path = paths.remove(i);
        paths.push(path);
    }
    paths
}

fn static_labels() -> Vec<WorldLabel> {
    let mut labels = shapes::grid_labels(GRID_SIZE, GRID_DIVISIONS);
    labels.extend(shapes::axis_labels(AXIS_LENGTH));
    labels
}

pub struct App {
    pub renderer: Renderer,
    pub camera: OrbitCamera,
    pub camera_controller: CameraController,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,

    config: ViewerConfig,
    loader: ImageLoader,
    selection: SelectionState,
    ui: UiState,
    search_roots: Vec<PathBuf>,

    clouds: BTreeMap<PathBuf, SceneCloud>,
    scene: SceneObjects,
    /// Scene revision the line buffer was last built from.
    lines_revision: Option<u64>,
    labels: Vec<WorldLabel>,
    /// Image the preview and recentering read from.
    preview_source: Option<PathBuf>,
    /// Images of the picked target record; ROI reloads regenerate only these.
    target_pair: Option<FitsPair>,

    last_frame: Instant,
    fps: f32,
}

impl App {
    pub async fn new(window: Arc<Window>, config: ViewerConfig) -> Result<Self> {
        let renderer = Renderer::new(window.clone()).await?;

        let size = renderer.gfx.size;
        let mut camera = OrbitCamera::default();
        camera.set_aspect_ratio(size.width as f32 / size.height.max(1) as f32);
        camera.set_fov(config.fov);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        let cwd = std::env::current_dir()?;
        let image_root = resolve_root(&config.image_root, &cwd);
        let label_root = resolve_root(&config.label_root, &cwd);
        let mut search_roots = vec![image_root.clone(), label_root.clone()];
        search_roots.extend(default_search_roots(&cwd));
        search_roots.dedup();

        log::info!(
            "Image root {}, label root {}",
            image_root.display(),
            label_root.display()
        );

        let ui = UiState::new(image_root, config.default_file.clone(), label_root);

        Ok(Self {
            renderer,
            camera,
            camera_controller: CameraController::new(),
            egui_ctx,
            egui_state,
            config,
            loader: ImageLoader::new(),
            selection: SelectionState::new(),
            ui,
            search_roots,
            clouds: BTreeMap::new(),
            scene: SceneObjects::with_reference_shapes(),
            lines_revision: None,
            labels: static_labels(),
            preview_source: None,
            target_pair: None,
            last_frame: Instant::now(),
            fps: 0.0,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        if response.consumed {
            return true;
        }

        self.camera_controller.handle_event(event, &mut self.camera);

        if let WindowEvent::Resized(physical_size) = event {
            self.resize(*physical_size);
        }

        false
    }

    fn build_cloud(&self, path: &Path) -> SceneCloud {
        let mode = self
            .selection
            .generation_mode(self.loader.width(), self.loader.height());
        let split = generate(&self.loader, mode, self.config.scale());

        if let Some((lo, hi)) = split.primary.bounds() {
            log::debug!("{}: bounds {:?} .. {:?}", path.display(), lo, hi);
        }

        let name = path.display().to_string();
        let device = &self.renderer.gfx.device;
        let layout = &self.renderer.points.cloud_layout;
        SceneCloud {
            points: split.len(),
            primary: CloudGpu::upload(device, layout, &name, &split.primary, 1.0),
            highlight: CloudGpu::upload(
                device,
                layout,
                &format!("{name} (highlight)"),
                &split.highlight,
                self.selection.highlight_scale(),
            ),
        }
    }

    /// Loads `path` and (re)builds its cloud. Returns false if loading failed.
    fn regenerate(&mut self, path: &Path) -> bool {
        if let Err(e) = self.loader.load(path) {
            log::error!("Failed to load {}: {}", path.display(), e);
            self.ui.set_status(format!("Failed to load {}: {e}", path.display()));
            return false;
        }
        let scene = self.build_cloud(path);
        log::info!("{}: {} points", path.display(), scene.points);
        // Replacing drops the previous buffers.
        self.clouds.insert(path.to_path_buf(), scene);
        self.scene.add_image(path);
        true
    }

    fn load_file(&mut self, path: &Path) {
        if self.clouds.contains_key(path) {
            log::info!("Already shown: {}", path.display());
            return;
        }
        let first = self.clouds.is_empty();
        if !self.regenerate(path) {
            self.ui.uncheck(path);
            return;
        }
        let diagonal = image_diagonal(self.loader.width(), self.loader.height(), self.config.scale());
        if should_frame(first, diagonal) {
            self.camera.frame_view(diagonal);
            log::info!("Camera framed on image (size {diagonal:.1} units)");
        }
        self.preview_source = Some(path.to_path_buf());
        self.refresh_preview();
    }

    fn unload_file(&mut self, path: &Path) {
        if self.clouds.remove(path).is_some() {
            log::info!("Removed cloud for {}", path.display());
        }
        self.scene.remove_image(path);
        if self.preview_source.as_deref() == Some(path) {
            self.preview_source = None;
        }
    }

    /// Removes an object from the list; image objects also drop their cloud.
    fn delete_object(&mut self, id: ObjectId) {
        let Some(path) = self.scene.get(id).map(|o| o.image_path().map(Path::to_path_buf)) else {
            return;
        };
        match path {
            Some(path) => {
                if self
                    .target_pair
                    .as_ref()
                    .is_some_and(|pair| pair.aligned == path || pair.template == path)
                {
                    self.target_pair = None;
                }
                self.ui.uncheck(&path);
                self.unload_file(&path);
            }
            None => {
                if let Some(obj) = self.scene.remove(id) {
                    log::info!("Deleted {}", obj.name);
                }
            }
        }
    }

    /// Rebuilds the line buffer when the object list changed.
    fn sync_lines(&mut self) {
        let revision = self.scene.revision();
        if self.lines_revision != Some(revision) {
            self.renderer
                .lines
                .set_lines(&self.renderer.gfx.device, &scene_lines(&self.scene));
            self.lines_revision = Some(revision);
        }
    }

    fn select_target(&mut self, record: &TargetRecord) {
        let pair = record.resolve(&self.search_roots);
        log::info!(
            "Target {}: aligned {}, template {}",
            record.index,
            pair.aligned.display(),
            pair.template.display()
        );
        if let Some(old) = self.target_pair.take() {
            self.unload_file(&old.aligned);
            self.unload_file(&old.template);
        }
        self.target_pair = Some(pair);
        // Arms the reload that builds the pair's clouds this frame.
        self.selection.apply_target(record);
    }

    /// Rebuilds the target pair (or every shown image) with the current selection.
    fn reload(&mut self) {
        let paths: Vec<PathBuf> = match &self.target_pair {
            // Aligned last, so it is the image left in the loader for the preview.
            Some(pair) => {
                self.preview_source = Some(pair.aligned.clone());
                vec![pair.template.clone(), pair.aligned.clone()]
            }
            None => reload_order(
                self.clouds.keys().cloned().collect(),
                self.preview_source.as_deref(),
            ),
        };
        for path in &paths {
            self.regenerate(path);
        }
        self.refresh_preview();
    }

    fn recenter(&mut self) {
        let Some(c) = self.selection.active_center() else {
            return;
        };
        if !self.loader.is_loaded() {
            return;
        }
        let world = pixel_to_world(&self.loader, c.x, c.y, self.config.scale());
        log::debug!("Recentering on pixel ({}, {}) at {:?}", c.x, c.y, world);
        self.camera.recenter_on(world);
    }

    fn refresh_preview(&mut self) {
        let size = preview_crop_size(self.selection.roi_radius());
        let preview = self
            .selection
            .active_center()
            .and_then(|c| sample_preview(&self.loader, c, size));
        self.ui.set_preview(preview);
    }

    fn process_requests(&mut self) {
        if self.selection.consume_reload_request() {
            self.reload();
        }
        if self.selection.consume_recenter_request() {
            self.recenter();
        }
    }

    fn handle_ui_events(&mut self, events: Vec<UiEvent>) {
        for event in events {
            match event {
                UiEvent::LoadFile(path) => self.load_file(&path),
                UiEvent::UnloadFile(path) => self.unload_file(&path),
                UiEvent::LoadTarget(record) => self.select_target(&record),
                UiEvent::DeleteObject(id) => self.delete_object(id),
            }
        }
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        if dt > 0.0 {
            self.fps = self.fps * 0.9 + 0.1 / dt;
        }

        self.camera_controller.update(dt, &mut self.camera);
        self.process_requests();
        self.sync_lines();

        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Highlight size follows the slider without a reload.
        let highlight_scale = self.selection.highlight_scale();
        for scene in self.clouds.values_mut() {
            if let Some(h) = scene.highlight.as_mut() {
                h.size_factor = highlight_scale;
            }
        }

        let view_proj = self.camera.view_proj();
        let scene = &self.scene;
        let clouds = &self.clouds;
        let visible = move || {
            clouds
                .iter()
                .filter(move |(path, _)| scene.is_image_visible(path))
                .flat_map(|(_, cloud)| cloud.iter())
        };
        self.renderer
            .update_clouds(visible(), view_proj, self.config.point_size);
        self.renderer.render(&swap_view, visible(), view_proj);

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);

        let events = ui::draw_windows(
            &self.egui_ctx,
            &mut self.ui,
            &mut self.selection,
            &mut self.scene,
            &self.camera,
        );
        let hud = HudInfo {
            clouds: self.clouds.len(),
            points: self.clouds.values().map(|c| c.points).sum(),
            fps: self.fps,
        };
        ui::draw_hud(&self.egui_ctx, &hud, &self.camera);
        ui::draw_world_labels(&self.egui_ctx, &self.camera, &self.labels);

        let egui_output = self.egui_ctx.end_frame();
        self.egui_state
            .handle_platform_output(window, egui_output.platform_output);
        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();

        self.handle_ui_events(events);

        Ok(())
    }
}
