use super::{UiEvent, UiState};
use pixcloud::browse::{self, DirEntry};
use std::path::{Path, PathBuf};

/// Files the viewer can turn into a cloud.
fn is_loadable(entry: &DirEntry) -> bool {
    !entry.is_dir && browse::is_supported_image(&entry.path)
}

/// Checks the configured default file once, if it is in the listing.
fn take_default(state: &mut UiState, entries: &[DirEntry]) -> Option<PathBuf> {
    if !state.default_pending {
        return None;
    }
    state.default_pending = false;
    let found = entries
        .iter()
        .find(|e| is_loadable(e) && e.name == state.default_file)?;
    state.checked.insert(found.path.clone());
    Some(found.path.clone())
}

fn navigate(state: &mut UiState, dir: PathBuf) {
    log::debug!("Browsing {}", dir.display());
    state.browse_dir = dir;
    state.listing = None;
}

pub(super) fn draw_file_browser(ctx: &egui::Context, state: &mut UiState, events: &mut Vec<UiEvent>) {
    let entries = state
        .listing
        .get_or_insert_with(|| browse::list_dir(&state.browse_dir))
        .clone();

    if let Some(path) = take_default(state, &entries) {
        log::info!("Auto-loading default file {}", path.display());
        events.push(UiEvent::LoadFile(path));
    }

    egui::Window::new("Image Files")
        .default_pos([10.0, 10.0])
        .default_width(360.0)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(state.browse_dir.display().to_string()).monospace());

            ui.horizontal(|ui| {
                let parent = state.browse_dir.parent().map(Path::to_path_buf);
                if ui
                    .add_enabled(parent.is_some(), egui::Button::new("Parent"))
                    .clicked()
                {
                    if let Some(parent) = parent {
                        navigate(state, parent);
                    }
                }
                if ui.button("Refresh").clicked() {
                    state.listing = None;
                }
                if ui.button("Default Path").clicked() {
                    let root = state.image_root.clone();
                    navigate(state, root);
                }
            });
            ui.separator();

            if entries.is_empty() {
                ui.label("Directory is empty or unreadable.");
                return;
            }

            egui::ScrollArea::vertical()
                .id_source("file_list")
                .max_height(320.0)
                .show(ui, |ui| {
                    egui::Grid::new("file_grid")
                        .num_columns(2)
                        .striped(true)
                        .show(ui, |ui| {
                            for entry in &entries {
                                if entry.is_dir {
                                    if ui.selectable_label(false, format!("[{}]", entry.name)).clicked() {
                                        navigate(state, entry.path.clone());
                                    }
                                    ui.label("");
                                } else if is_loadable(entry) {
                                    let mut on = state.checked.contains(&entry.path);
                                    if ui.checkbox(&mut on, &entry.name).changed() {
                                        if on {
                                            state.checked.insert(entry.path.clone());
                                            events.push(UiEvent::LoadFile(entry.path.clone()));
                                        } else {
                                            state.checked.remove(&entry.path);
                                            events.push(UiEvent::UnloadFile(entry.path.clone()));
                                        }
                                    }
                                    ui.label(browse::format_size(entry.size));
                                } else {
                                    ui.weak(&entry.name);
                                    ui.label(browse::format_size(entry.size));
                                }
                                ui.end_row();
                            }
                        });
                });

            ui.separator();
            ui.label(format!("{} file(s) shown", state.checked.len()));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_dir: bool) -> DirEntry {
        DirEntry {
            name: name.to_string(),
            path: PathBuf::from("/img").join(name),
            is_dir,
            size: 10,
        }
    }

    #[test]
    fn test_default_file_is_checked_once() {
        let mut state = UiState::new("/img".into(), "small_image.jpg".into(), "labels".into());
        let entries = vec![entry("sub", true), entry("small_image.jpg", false)];

        assert_eq!(
            take_default(&mut state, &entries),
            Some(PathBuf::from("/img/small_image.jpg"))
        );
        assert!(state.is_checked(Path::new("/img/small_image.jpg")));
        assert_eq!(take_default(&mut state, &entries), None);
    }

    #[test]
    fn test_missing_default_is_not_retried() {
        let mut state = UiState::new("/img".into(), "small_image.jpg".into(), "labels".into());
        assert_eq!(take_default(&mut state, &[entry("other.png", false)]), None);
        assert_eq!(take_default(&mut state, &[entry("small_image.jpg", false)]), None);
    }

    #[test]
    fn test_only_images_are_loadable() {
        assert!(is_loadable(&entry("a.fits", false)));
        assert!(is_loadable(&entry("b.PNG", false)));
        assert!(!is_loadable(&entry("notes.txt", false)));
        assert!(!is_loadable(&entry("dir.png", true)));
    }
}
