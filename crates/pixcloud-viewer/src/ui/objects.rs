use super::{UiEvent, UiState};
use pixcloud::scene::{ObjectKind, SceneObject};
use pixcloud::{ObjectId, OrbitCamera, SceneObjects, ShapeKind};

fn fmt_vec3(v: glam::Vec3) -> String {
    format!("{:.2}, {:.2}, {:.2}", v.x, v.y, v.z)
}

/// Property rows of one object, label then value.
fn properties(obj: &SceneObject) -> Vec<(&'static str, String)> {
    let mut rows = vec![("Name", obj.name.clone())];
    match &obj.kind {
        ObjectKind::Shape { shape, color } => {
            rows.push(("Type", shape.kind().name().to_string()));
            rows.push(("Position", fmt_vec3(shape.position())));
            rows.push(("Color", fmt_vec3(*color)));
        }
        ObjectKind::Image(path) => {
            rows.push(("Type", "Image cloud".to_string()));
            rows.push(("Path", path.display().to_string()));
        }
    }
    rows
}

/// Drops a selection whose object no longer exists.
fn valid_selection(selected: Option<ObjectId>, objects: &SceneObjects) -> Option<ObjectId> {
    selected.filter(|id| objects.get(*id).is_some())
}

pub(super) fn draw_objects(
    ctx: &egui::Context,
    state: &mut UiState,
    objects: &mut SceneObjects,
    camera: &OrbitCamera,
    events: &mut Vec<UiEvent>,
) {
    state.selected_object = valid_selection(state.selected_object, objects);

    egui::Window::new("Objects")
        .default_pos([1280.0, 200.0])
        .default_width(280.0)
        .show(ctx, |ui| {
            ui.label("Create");
            ui.horizontal_wrapped(|ui| {
                for kind in ShapeKind::ALL {
                    if ui.button(kind.name()).clicked() {
                        let id = objects.add_shape(kind.default_shape(), kind.default_color());
                        log::info!("Added {}", kind.name());
                        state.selected_object = Some(id);
                    }
                }
            });
            ui.separator();

            let mut toggled = Vec::new();
            egui::ScrollArea::vertical()
                .id_source("object_list")
                .max_height(220.0)
                .show(ui, |ui| {
                    for obj in objects.iter() {
                        ui.horizontal(|ui| {
                            let mut visible = obj.visible;
                            if ui.checkbox(&mut visible, "").changed() {
                                toggled.push((obj.id, visible));
                            }
                            let is_sel = state.selected_object == Some(obj.id);
                            if ui.selectable_label(is_sel, &obj.name).clicked() {
                                state.selected_object = Some(obj.id);
                            }
                        });
                    }
                });
            for (id, visible) in toggled {
                objects.set_visible(id, visible);
            }

            if ui
                .add_enabled(state.selected_object.is_some(), egui::Button::new("Delete Selected"))
                .clicked()
            {
                if let Some(id) = state.selected_object.take() {
                    events.push(UiEvent::DeleteObject(id));
                }
            }

            ui.separator();
            ui.strong("Properties");
            match state.selected_object.and_then(|id| objects.get(id)) {
                Some(obj) => {
                    egui::Grid::new("object_props").num_columns(2).show(ui, |ui| {
                        for (label, value) in properties(obj) {
                            ui.label(label);
                            ui.label(value);
                            ui.end_row();
                        }
                    });
                }
                None => {
                    ui.weak("Nothing selected");
                }
            }

            ui.separator();
            ui.strong("Camera");
            ui.label(format!("Position: {}", fmt_vec3(camera.position())));
            ui.label(format!("Target: {}", fmt_vec3(camera.target())));
        });
}
