use glam::Vec2;
use pixcloud::shapes::WorldLabel;
use pixcloud::OrbitCamera;

/// Per-frame numbers shown in the corner HUD.
#[derive(Debug, Clone, Default)]
pub struct HudInfo {
    pub clouds: usize,
    pub points: usize,
    pub fps: f32,
}

pub fn draw_hud(ctx: &egui::Context, hud: &HudInfo, camera: &OrbitCamera) {
    egui::Area::new(egui::Id::new("hud"))
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(format!("{} cloud(s), {} points", hud.clouds, hud.points));
                ui.label(format!("{:.0} fps", hud.fps));
                let p = camera.position();
                ui.label(format!("camera ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z));
                let t = camera.target();
                ui.label(format!("target ({:.1}, {:.1}, {:.1})", t.x, t.y, t.z));
                ui.label(format!(
                    "distance {:.1}  yaw {:.0}°  pitch {:.0}°",
                    camera.distance(),
                    camera.yaw(),
                    camera.pitch()
                ));
                ui.weak("RMB orbit, MMB pan, wheel zoom, WASD move");
            });
        });
}

fn to_color32(c: glam::Vec4) -> egui::Color32 {
    let c = (c.clamp(glam::Vec4::ZERO, glam::Vec4::ONE) * 255.0).round();
    egui::Color32::from_rgba_unmultiplied(c.x as u8, c.y as u8, c.z as u8, c.w as u8)
}

/// Paints world-anchored text behind all windows.
pub fn draw_world_labels(ctx: &egui::Context, camera: &OrbitCamera, labels: &[WorldLabel]) {
    let screen = ctx.screen_rect();
    let viewport = Vec2::new(screen.width(), screen.height());
    let painter = ctx.layer_painter(egui::LayerId::background());

    for label in labels {
        let Some(p) = camera.world_to_screen(label.position, viewport) else {
            continue;
        };
        let pos = screen.min + egui::vec2(p.x, p.y);
        if !screen.contains(pos) {
            continue;
        }
        painter.text(
            pos,
            egui::Align2::CENTER_CENTER,
            &label.text,
            egui::FontId::proportional(13.0),
            to_color32(label.color),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_colors() {
        assert_eq!(
            to_color32(glam::Vec4::new(1.0, 0.0, 0.0, 1.0)),
            egui::Color32::from_rgba_unmultiplied(255, 0, 0, 255)
        );
        assert_eq!(
            to_color32(glam::Vec4::new(2.0, -1.0, 0.5, 0.0)),
            egui::Color32::from_rgba_unmultiplied(255, 0, 128, 0)
        );
    }
}
