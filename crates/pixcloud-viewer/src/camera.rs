//! Mouse and keyboard input mapped onto an [`OrbitCamera`].

use glam::Vec3;
use pixcloud::OrbitCamera;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Degrees of orbit per pixel of right-drag.
const ORBIT_DEG_PER_PX: f32 = 0.1;
/// World units of pan per pixel of middle-drag.
const PAN_UNITS_PER_PX: f32 = 0.01;
/// Keyboard fly speed, world units per second.
const MOVE_SPEED: f32 = 5.0;

#[derive(Debug, Default, Clone, Copy)]
struct MoveKeys {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
}

#[derive(Debug, Default)]
pub struct CameraController {
    orbiting: bool,
    panning: bool,
    last_mouse: Option<(f64, f64)>,
    keys: MoveKeys,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles a window event the UI did not consume.
    pub fn handle_event(&mut self, event: &WindowEvent, camera: &mut OrbitCamera) {
        match event {
            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Right => self.orbiting = pressed,
                    MouseButton::Middle => self.panning = pressed,
                    _ => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor((position.x, position.y), camera);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };
                camera.zoom(scroll);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.set_key(code, pressed);
                }
            }
            WindowEvent::Resized(size) if size.width > 0 && size.height > 0 => {
                camera.set_aspect_ratio(size.width as f32 / size.height as f32);
            }
            WindowEvent::Focused(false) => {
                // Key-up events are lost while unfocused.
                self.keys = MoveKeys::default();
                self.orbiting = false;
                self.panning = false;
            }
            _ => {}
        }
    }

    fn set_key(&mut self, code: KeyCode, pressed: bool) {
        match code {
            KeyCode::KeyW => self.keys.forward = pressed,
            KeyCode::KeyS => self.keys.back = pressed,
            KeyCode::KeyA => self.keys.left = pressed,
            KeyCode::KeyD => self.keys.right = pressed,
            _ => {}
        }
    }

    fn handle_cursor(&mut self, xy: (f64, f64), camera: &mut OrbitCamera) {
        if let Some(last) = self.last_mouse {
            let dx = (xy.0 - last.0) as f32;
            let dy = (xy.1 - last.1) as f32;
            if self.orbiting {
                camera.orbit(dx * ORBIT_DEG_PER_PX, dy * ORBIT_DEG_PER_PX);
            } else if self.panning {
                camera.pan(-dx * PAN_UNITS_PER_PX, dy * PAN_UNITS_PER_PX);
            }
        }
        self.last_mouse = Some(xy);
    }

    /// Applies held movement keys for a frame of `dt` seconds.
    pub fn update(&mut self, dt: f32, camera: &mut OrbitCamera) {
        let mut dir = Vec3::ZERO;
        if self.keys.forward {
            dir += camera.forward();
        }
        if self.keys.back {
            dir -= camera.forward();
        }
        if self.keys.right {
            dir += camera.right();
        }
        if self.keys.left {
            dir -= camera.right();
        }
        if dir != Vec3::ZERO {
            camera.translate(dir.normalize() * MOVE_SPEED * dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_update_leaves_camera() {
        let mut cam = OrbitCamera::default();
        let before = cam.position();
        let mut ctl = CameraController::new();
        ctl.update(0.5, &mut cam);
        assert_eq!(cam.position(), before);
    }

    #[test]
    fn test_forward_key_moves_rig() {
        let mut cam = OrbitCamera::default();
        let mut ctl = CameraController::new();
        ctl.set_key(KeyCode::KeyW, true);
        let target = cam.target();
        let distance = cam.distance();
        ctl.update(1.0, &mut cam);
        assert!(((cam.target() - target).length() - MOVE_SPEED).abs() < 1e-4);
        assert!((cam.distance() - distance).abs() < 1e-4);

        ctl.set_key(KeyCode::KeyW, false);
        let target = cam.target();
        ctl.update(1.0, &mut cam);
        assert_eq!(cam.target(), target);
    }

    #[test]
    fn test_cursor_without_button_does_nothing() {
        let mut cam = OrbitCamera::default();
        let before = cam.position();
        let mut ctl = CameraController::new();
        ctl.handle_cursor((10.0, 10.0), &mut cam);
        ctl.handle_cursor((50.0, 80.0), &mut cam);
        assert_eq!(cam.position(), before);

        ctl.orbiting = true;
        ctl.handle_cursor((90.0, 80.0), &mut cam);
        assert!((cam.yaw() - (before.z.atan2(before.x).to_degrees() + 4.0)).abs() < 1e-3);
    }
}
