use super::UiState;
use pixcloud::{PixelCenter, PreviewImage, SelectionState};

/// On-screen size of the preview in points.
const PREVIEW_DISPLAY_SIZE: f32 = 300.0;

/// Image pixel under `pos` for a preview drawn into `rect`.
fn pixel_under(preview: &PreviewImage, rect: egui::Rect, pos: egui::Pos2) -> Option<PixelCenter> {
    if !rect.contains(pos) || rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let rel = pos - rect.min;
    let u = (rel.x / rect.width() * preview.size as f32).floor() as u32;
    let v = (rel.y / rect.height() * preview.size as f32).floor() as u32;
    preview.pixel_at(u.min(preview.size - 1), v.min(preview.size - 1))
}

fn upload(ctx: &egui::Context, state: &mut UiState) {
    state.preview_dirty = false;
    let Some(preview) = &state.preview else {
        state.preview_texture = None;
        return;
    };
    let side = preview.size as usize;
    let image = egui::ColorImage::from_rgba_unmultiplied([side, side], &preview.rgba);
    match &mut state.preview_texture {
        Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
        None => {
            state.preview_texture = Some(ctx.load_texture("roi_preview", image, egui::TextureOptions::NEAREST));
        }
    }
}

pub(super) fn draw_roi_preview(ctx: &egui::Context, state: &mut UiState, selection: &mut SelectionState) {
    if state.preview_dirty {
        upload(ctx, state);
    }
    let (Some(preview), Some(texture)) = (&state.preview, &state.preview_texture) else {
        return;
    };

    let mut picked = None;
    egui::Window::new("ROI Preview")
        .default_pos([440.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            let (rect, response) = ui.allocate_exact_size(
                egui::vec2(PREVIEW_DISPLAY_SIZE, PREVIEW_DISPLAY_SIZE),
                egui::Sense::click(),
            );
            ui.painter().image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            // Crosshair on the active pixel when it is inside the crop.
            if let Some(c) = selection.active_center() {
                let cell = rect.width() / preview.size as f32;
                let u = (c.x - preview.origin.x) as f32;
                let v = (c.y - preview.origin.y) as f32;
                if (0.0..preview.size as f32).contains(&u) && (0.0..preview.size as f32).contains(&v) {
                    let center = rect.min + egui::vec2((u + 0.5) * cell, (v + 0.5) * cell);
                    let stroke = egui::Stroke::new(1.0, egui::Color32::RED);
                    ui.painter().circle_stroke(center, (cell * 2.0).max(4.0), stroke);
                }
            }

            let hovered = response.hover_pos().and_then(|pos| pixel_under(preview, rect, pos));
            if response.clicked() {
                picked = response
                    .interact_pointer_pos()
                    .and_then(|pos| pixel_under(preview, rect, pos));
            }
            match hovered {
                Some(p) => ui.label(format!("Pixel ({}, {}), click to focus", p.x, p.y)),
                None => ui.weak("Click a pixel to focus on it"),
            };
        });

    if let Some(p) = picked {
        log::info!("Preview click at pixel ({}, {})", p.x, p.y);
        selection.set_active_center(p.x, p.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(size: u32, origin: PixelCenter) -> PreviewImage {
        PreviewImage {
            size,
            origin,
            image_size: (1000, 1000),
            rgba: vec![0; (size * size * 4) as usize],
        }
    }

    #[test]
    fn test_pixel_under_maps_cells() {
        let p = preview(10, PixelCenter::new(100, 200));
        let rect = egui::Rect::from_min_size(egui::pos2(50.0, 50.0), egui::vec2(300.0, 300.0));

        assert_eq!(pixel_under(&p, rect, egui::pos2(50.0, 50.0)), Some(PixelCenter::new(100, 200)));
        assert_eq!(pixel_under(&p, rect, egui::pos2(95.0, 125.0)), Some(PixelCenter::new(101, 202)));
        // Bottom-right edge stays on the last cell.
        assert_eq!(pixel_under(&p, rect, egui::pos2(350.0, 350.0)), Some(PixelCenter::new(109, 209)));
        assert_eq!(pixel_under(&p, rect, egui::pos2(10.0, 60.0)), None);
    }

    #[test]
    fn test_click_past_image_edge_picks_edge_pixel() {
        let mut p = preview(10, PixelCenter::new(-5, -5));
        p.image_size = (50, 50);
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(300.0, 300.0));

        assert_eq!(pixel_under(&p, rect, egui::pos2(1.0, 1.0)), Some(PixelCenter::new(0, 0)));
        assert_eq!(pixel_under(&p, rect, egui::pos2(245.0, 15.0)), Some(PixelCenter::new(3, 0)));
    }
}
