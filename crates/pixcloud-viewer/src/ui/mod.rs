//! egui windows: file browser, label browser, ROI preview, object list and HUD.
//!
//! Drawing functions never touch the scene directly. Anything that needs the
//! GPU or the image loader is pushed as a [`UiEvent`] and handled by the app
//! after the frame; selection edits and visibility toggles go straight to
//! [`SelectionState`] and [`SceneObjects`].

mod files;
mod labels;
mod objects;
mod overlay;
mod preview;

pub use self::overlay::{draw_hud, draw_world_labels, HudInfo};

use pixcloud::browse::{DirCache, DirEntry};
use pixcloud::{ObjectId, OrbitCamera, PreviewImage, SceneObjects, SelectionState, TargetRecord};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// A file was checked in the browser.
    LoadFile(PathBuf),
    /// A file was unchecked.
    UnloadFile(PathBuf),
    /// A row of the target table was picked.
    LoadTarget(TargetRecord),
    /// "Delete Selected" in the object list.
    DeleteObject(ObjectId),
}

/// Everything the windows remember between frames.
pub struct UiState {
    // File browser
    image_root: PathBuf,
    default_file: String,
    default_pending: bool,
    browse_dir: PathBuf,
    listing: Option<Vec<DirEntry>>,
    checked: BTreeSet<PathBuf>,

    // Label browser
    label_root: PathBuf,
    label_cache: DirCache,
    /// Every label file under the root, listed on first use.
    label_files: Option<Vec<PathBuf>>,
    selected_label: Option<PathBuf>,
    label_text: Option<String>,
    targets: Vec<TargetRecord>,
    selected_target: Option<usize>,

    // ROI preview
    preview: Option<PreviewImage>,
    preview_texture: Option<egui::TextureHandle>,
    preview_dirty: bool,

    // Object list
    selected_object: Option<ObjectId>,

    status: Option<String>,
}

impl UiState {
    pub fn new(image_root: PathBuf, default_file: String, label_root: PathBuf) -> Self {
        Self {
            browse_dir: image_root.clone(),
            image_root,
            default_file,
            default_pending: true,
            listing: None,
            checked: BTreeSet::new(),
            label_root,
            label_cache: DirCache::new(),
            label_files: None,
            selected_label: None,
            label_text: None,
            targets: Vec::new(),
            selected_target: None,
            preview: None,
            preview_texture: None,
            preview_dirty: false,
            selected_object: None,
            status: None,
        }
    }

    pub fn is_checked(&self, path: &std::path::Path) -> bool {
        self.checked.contains(path)
    }

    /// Unchecks a file whose load failed, so the box matches the scene.
    pub fn uncheck(&mut self, path: &std::path::Path) {
        self.checked.remove(path);
    }

    /// Replaces the image shown in the ROI preview window.
    pub fn set_preview(&mut self, preview: Option<PreviewImage>) {
        self.preview = preview;
        self.preview_dirty = true;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }
}

/// Draws all windows for this frame and returns the actions they produced.
pub fn draw_windows(
    ctx: &egui::Context,
    state: &mut UiState,
    selection: &mut SelectionState,
    scene: &mut SceneObjects,
    camera: &OrbitCamera,
) -> Vec<UiEvent> {
    let mut events = Vec::new();
    files::draw_file_browser(ctx, state, &mut events);
    labels::draw_label_browser(ctx, state, selection, &mut events);
    preview::draw_roi_preview(ctx, state, selection);
    objects::draw_objects(ctx, state, scene, camera, &mut events);
    events
}
