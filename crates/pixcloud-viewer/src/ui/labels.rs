use super::{UiEvent, UiState};
use pixcloud::browse::{self, DirCache};
use pixcloud::selection::{HIGHLIGHT_SCALE_RANGE, HIGHLIGHT_SIZE_RANGE, ROI_RADIUS_RANGE};
use pixcloud::targets::read_targets;
use pixcloud::{SelectionState, TargetRecord};
use std::path::{Path, PathBuf};

const PREVIEW_MAX_LINES: usize = 80;
const PREVIEW_MAX_BYTES: usize = 64 * 1024;

fn is_label_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("txt"))
}

/// Reads the text preview and target records of a newly picked label file.
fn select_label(state: &mut UiState, path: PathBuf) {
    state.label_text = Some(
        browse::read_text_preview(&path, PREVIEW_MAX_LINES, PREVIEW_MAX_BYTES)
            .unwrap_or_else(|e| format!("<cannot read {}: {e}>", path.display())),
    );
    state.selected_target = None;
    state.targets = match read_targets(&path) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("{e}");
            state.set_status(e.to_string());
            Vec::new()
        }
    };
    state.selected_label = Some(path);
}

/// Flat list of every label file under the root, paths shown relative to it.
fn draw_flat_list(ui: &mut egui::Ui, root: &Path, files: &[PathBuf], selected: &Option<PathBuf>) -> Option<PathBuf> {
    let mut picked = None;
    for path in files {
        let shown = path.strip_prefix(root).unwrap_or(path);
        let is_sel = selected.as_deref() == Some(path.as_path());
        if ui.selectable_label(is_sel, shown.display().to_string()).clicked() {
            picked = Some(path.clone());
        }
    }
    picked
}

/// One level of the label-data tree; directories expand lazily.
fn draw_tree(ui: &mut egui::Ui, cache: &mut DirCache, dir: &Path, selected: &Option<PathBuf>) -> Option<PathBuf> {
    let mut picked = None;
    let entries = cache.entries(dir).to_vec();
    for entry in entries {
        if entry.is_dir {
            egui::CollapsingHeader::new(&entry.name)
                .id_source(&entry.path)
                .show(ui, |ui| {
                    if let Some(p) = draw_tree(ui, cache, &entry.path, selected) {
                        picked = Some(p);
                    }
                });
        } else if is_label_file(&entry.path) {
            let is_sel = selected.as_deref() == Some(entry.path.as_path());
            if ui.selectable_label(is_sel, &entry.name).clicked() {
                picked = Some(entry.path.clone());
            }
        }
    }
    picked
}

fn fmt_opt<T: std::fmt::Display>(v: Option<T>) -> String {
    v.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Cells of one target-table row: idx, pixel_x, pixel_y, ra, dec.
fn target_row(record: &TargetRecord) -> [String; 5] {
    [
        record.index.clone(),
        fmt_opt(record.pixel_center.map(|c| c.x)),
        fmt_opt(record.pixel_center.map(|c| c.y)),
        fmt_opt(record.ra_dec.map(|(ra, _)| format!("{ra:.5}"))),
        fmt_opt(record.ra_dec.map(|(_, dec)| format!("{dec:.5}"))),
    ]
}

fn draw_roi_controls(ui: &mut egui::Ui, state: &mut UiState, selection: &mut SelectionState) {
    let mut roi_on = selection.roi_enabled();
    if ui
        .checkbox(&mut roi_on, "Only show neighborhood points (ROI)")
        .changed()
        && !selection.set_roi_enabled(roi_on)
    {
        state.set_status("Pick a target or a preview pixel before enabling ROI.");
    }

    let mut radius = selection.roi_radius();
    if ui
        .add(egui::Slider::new(&mut radius, ROI_RADIUS_RANGE).text("ROI radius (px)"))
        .changed()
    {
        selection.set_roi_radius(radius);
    }

    let mut size = selection.highlight_size();
    if ui
        .add(egui::Slider::new(&mut size, HIGHLIGHT_SIZE_RANGE).text("Highlight size (px)"))
        .changed()
    {
        selection.set_highlight_size(size);
    }

    let mut scale = selection.highlight_scale();
    if ui
        .add(
            egui::Slider::new(&mut scale, HIGHLIGHT_SCALE_RANGE)
                .text("Highlight point scale")
                .fixed_decimals(1)
                .suffix("x"),
        )
        .changed()
    {
        selection.set_highlight_scale(scale);
    }

    ui.horizontal(|ui| {
        let current = selection.highlight_color();
        let mut rgb = current.truncate().to_array();
        if ui.color_edit_button_rgb(&mut rgb).changed() {
            selection.set_highlight_color(glam::Vec3::from_array(rgb).extend(current.w));
        }
        ui.label("Highlight color (applies on reload)");
    });

    ui.horizontal(|ui| {
        let has_center = selection.active_center().is_some();
        if ui
            .add_enabled(has_center, egui::Button::new("Reload FITS with ROI"))
            .clicked()
        {
            selection.request_reload();
        }
        if ui
            .add_enabled(has_center, egui::Button::new("Center view/rotate on ROI"))
            .clicked()
        {
            selection.request_recenter();
        }
    });

    match selection.active_center() {
        Some(c) => ui.label(format!("Active pixel: ({}, {})", c.x, c.y)),
        None => ui.weak("No active pixel"),
    };
}

pub(super) fn draw_label_browser(
    ctx: &egui::Context,
    state: &mut UiState,
    selection: &mut SelectionState,
    events: &mut Vec<UiEvent>,
) {
    egui::Window::new("Label Data")
        .default_pos([10.0, 460.0])
        .default_width(420.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(state.label_root.display().to_string()).monospace());
                if ui.small_button("Refresh").clicked() {
                    state.label_cache.clear();
                    state.label_files = None;
                }
            });

            if !state.label_root.is_dir() {
                ui.colored_label(egui::Color32::RED, "Label directory not found.");
            } else {
                let root = state.label_root.clone();
                let mut picked = egui::ScrollArea::vertical()
                    .id_source("label_tree")
                    .max_height(180.0)
                    .show(ui, |ui| draw_tree(ui, &mut state.label_cache, &root, &state.selected_label))
                    .inner;

                let files: &[PathBuf] = state
                    .label_files
                    .get_or_insert_with(|| browse::find_label_files(&root));
                let flat = egui::CollapsingHeader::new(format!("All label files ({})", files.len()))
                    .default_open(false)
                    .show(ui, |ui| {
                        egui::ScrollArea::vertical()
                            .id_source("label_flat")
                            .max_height(160.0)
                            .show(ui, |ui| draw_flat_list(ui, &root, files, &state.selected_label))
                            .inner
                    })
                    .body_returned
                    .flatten();
                picked = picked.or(flat);

                if let Some(path) = picked {
                    select_label(state, path);
                }
            }

            if let Some(text) = &state.label_text {
                egui::CollapsingHeader::new("File preview")
                    .default_open(false)
                    .show(ui, |ui| {
                        egui::ScrollArea::vertical()
                            .id_source("label_text")
                            .max_height(160.0)
                            .show(ui, |ui| {
                                ui.label(egui::RichText::new(text).monospace().small());
                            });
                    });
            }

            if !state.targets.is_empty() {
                ui.separator();
                ui.label(format!("{} target(s)", state.targets.len()));
                let mut clicked = None;
                egui::ScrollArea::vertical()
                    .id_source("target_table")
                    .max_height(200.0)
                    .show(ui, |ui| {
                        egui::Grid::new("target_grid")
                            .num_columns(5)
                            .striped(true)
                            .show(ui, |ui| {
                                for header in ["idx", "pixel_x", "pixel_y", "ra", "dec"] {
                                    ui.strong(header);
                                }
                                ui.end_row();

                                for (i, record) in state.targets.iter().enumerate() {
                                    let [idx, px, py, ra, dec] = target_row(record);
                                    let is_sel = state.selected_target == Some(i);
                                    if ui.selectable_label(is_sel, idx).clicked() {
                                        clicked = Some(i);
                                    }
                                    ui.label(px);
                                    ui.label(py);
                                    ui.label(ra);
                                    ui.label(dec);
                                    ui.end_row();
                                }
                            });
                    });

                if let Some(i) = clicked {
                    state.selected_target = Some(i);
                    if let Some(record) = state.targets.get(i) {
                        events.push(UiEvent::LoadTarget(record.clone()));
                    }
                }
            }

            ui.separator();
            draw_roi_controls(ui, state, selection);

            if let Some(status) = &state.status {
                ui.separator();
                ui.weak(status);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixcloud::PixelCenter;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_target_row_formats_optional_fields() {
        let mut record = TargetRecord {
            index: "3".into(),
            file_dir: "d".into(),
            aligned_filename: "a.fits".into(),
            template_aligned_filename: "t.fits".into(),
            pixel_center: Some(PixelCenter::new(12, 40)),
            ra_dec: Some((150.123456, -2.5)),
        };
        assert_eq!(target_row(&record), ["3", "12", "40", "150.12346", "-2.50000"]);

        record.pixel_center = None;
        record.ra_dec = None;
        assert_eq!(target_row(&record), ["3", "-", "-", "-", "-"]);
    }

    #[test]
    fn test_select_label_loads_records_and_preview() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        fs::write(&path, "# header\n1 d a.fits t.fits 1.0 2.0 t 5 6\n").unwrap();

        let mut state = UiState::new("img".into(), "x.jpg".into(), dir.path().to_path_buf());
        select_label(&mut state, path.clone());
        assert_eq!(state.targets.len(), 1);
        assert_eq!(state.selected_label, Some(path));
        assert!(state.label_text.as_deref().unwrap().starts_with("# header"));
        assert!(state.status.is_none());
    }

    #[test]
    fn test_select_label_without_records_reports() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "# nothing\n").unwrap();

        let mut state = UiState::new("img".into(), "x.jpg".into(), dir.path().to_path_buf());
        select_label(&mut state, path);
        assert!(state.targets.is_empty());
        assert!(state.status.is_some());
    }
}
