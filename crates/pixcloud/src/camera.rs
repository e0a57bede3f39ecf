//! Orbit camera: a look-at target plus a spherical offset (distance, yaw, pitch).
//!
//! `distance` is the single source of truth for zoom level. Direct edits of
//! position or target re-derive the spherical state immediately, so orbit and
//! frame operations always start from the camera that is actually on screen.

use glam::{Mat4, Vec2, Vec3};

pub const MIN_DISTANCE: f32 = 0.5;
pub const MAX_DISTANCE: f32 = 1000.0;
pub const PITCH_LIMIT_DEG: f32 = 89.0;

/// Extra room left around an object by [`OrbitCamera::frame_view`].
const FRAME_PADDING: f32 = 1.5;
/// Fraction of the distance removed per unit of zoom.
const ZOOM_STEP: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    position: Vec3,
    target: Vec3,
    up: Vec3,

    /// Vertical field of view in degrees.
    fov_deg: f32,
    aspect: f32,
    near: f32,
    far: f32,

    // --- Spherical state, kept consistent with position/target ---
    distance: f32,
    /// Azimuth in the XZ plane, degrees from +X towards +Z.
    yaw_deg: f32,
    /// Elevation above the XZ plane, degrees.
    pitch_deg: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(45.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}

impl OrbitCamera {
    /// Creates a camera at (0, 5, 10) looking at the origin.
    pub fn new(fov_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 5.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_deg,
            aspect,
            near,
            far,
            distance: 10.0,
            yaw_deg: 0.0,
            pitch_deg: 30.0,
        };
        camera.sync_spherical();
        camera
    }

    /// Recomputes distance, yaw and pitch from the position/target offset.
    fn sync_spherical(&mut self) {
        let offset = self.position - self.target;
        self.distance = offset.length();
        if self.distance > f32::EPSILON {
            self.yaw_deg = offset.z.atan2(offset.x).to_degrees();
            self.pitch_deg = (offset.y / self.distance)
                .clamp(-1.0, 1.0)
                .asin()
                .to_degrees()
                .clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        }
    }

    /// Unit vector from target to position for the current yaw/pitch.
    fn spherical_direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw_deg.to_radians().sin_cos();
        let (sp, cp) = self.pitch_deg.to_radians().sin_cos();
        Vec3::new(cp * cy, sp, cp * sy)
    }

    /// Places the camera on its sphere using the current yaw/pitch/distance.
    fn place_on_sphere(&mut self) {
        self.position = self.target + self.spherical_direction() * self.distance;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn yaw(&self) -> f32 {
        self.yaw_deg
    }

    pub fn pitch(&self) -> f32 {
        self.pitch_deg
    }

    pub fn fov(&self) -> f32 {
        self.fov_deg
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.sync_spherical();
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.sync_spherical();
    }

    /// Non-finite values are ignored; the rest is clamped to [1, 170] degrees.
    pub fn set_fov(&mut self, fov_deg: f32) {
        if fov_deg.is_finite() {
            self.fov_deg = fov_deg.clamp(1.0, 170.0);
        }
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or_zero()
    }

    /// Rotates around the target; pitch is clamped to ±89°.
    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw_deg += d_yaw;
        self.pitch_deg = (self.pitch_deg + d_pitch).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        self.place_on_sphere();
    }

    /// Slides position and target together along the camera right and world up.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let delta = self.right() * dx + self.up * dy;
        self.position += delta;
        self.target += delta;
    }

    /// Multiplicative zoom: each unit of `delta` removes 10% of the distance.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta * ZOOM_STEP)).clamp(MIN_DISTANCE, MAX_DISTANCE);
        let dir = (self.position - self.target).normalize_or_zero();
        if dir == Vec3::ZERO {
            self.place_on_sphere();
        } else {
            self.position = self.target + dir * self.distance;
        }
    }

    /// Backs off far enough to fit an object of `object_size` world units,
    /// keeping the current viewing angle.
    pub fn frame_view(&mut self, object_size: f32) {
        let half_fov = (self.fov_deg * 0.5).to_radians();
        let distance = (object_size * 0.5) / half_fov.tan() * FRAME_PADDING;
        self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.place_on_sphere();
    }

    /// Moves the whole rig so it looks at `new_target` from the same offset.
    pub fn recenter_on(&mut self, new_target: Vec3) {
        let delta = new_target - self.target;
        self.target = new_target;
        self.position += delta;
    }

    /// Moves the whole rig by `delta` (keyboard fly-through).
    pub fn translate(&mut self, delta: Vec3) {
        self.recenter_on(self.target + delta);
    }

    /// Right-handed look-at view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Right-handed perspective with a [0, 1] depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Screen position (pixels, origin top-left) of a world point, or `None`
    /// when it lies behind the camera.
    pub fn world_to_screen(&self, world: Vec3, viewport: Vec2) -> Option<Vec2> {
        let clip = self.view_proj() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.x,
            (1.0 - ndc.y) * 0.5 * viewport.y,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera_at_distance_10() -> OrbitCamera {
        let mut cam = OrbitCamera::default();
        cam.set_position(Vec3::new(0.0, 0.0, 10.0));
        cam
    }

    fn assert_distance_tracks(cam: &OrbitCamera) {
        assert_relative_eq!(
            (cam.position() - cam.target()).length(),
            cam.distance(),
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_defaults() {
        let cam = OrbitCamera::default();
        assert_eq!(cam.position(), Vec3::new(0.0, 5.0, 10.0));
        assert_eq!(cam.target(), Vec3::ZERO);
        assert_relative_eq!(cam.distance(), 125f32.sqrt());
        assert_relative_eq!(cam.fov(), 45.0);
        assert_relative_eq!(cam.aspect_ratio(), 16.0 / 9.0);
    }

    #[test]
    fn test_zoom_is_multiplicative() {
        let mut cam = camera_at_distance_10();
        cam.zoom(1.0);
        assert_relative_eq!(cam.distance(), 9.0, epsilon = 1e-5);
        cam.zoom(-1.0);
        assert_relative_eq!(cam.distance(), 9.9, epsilon = 1e-5);
        assert_distance_tracks(&cam);
        // Direction is kept.
        assert_relative_eq!(cam.position().z, 9.9, epsilon = 1e-5);
    }

    #[test]
    fn test_zoom_is_bounded() {
        let mut cam = camera_at_distance_10();
        for _ in 0..200 {
            cam.zoom(3.0);
            assert!(cam.distance() >= MIN_DISTANCE);
        }
        assert_relative_eq!(cam.distance(), MIN_DISTANCE);
        for _ in 0..200 {
            cam.zoom(-5.0);
            assert!(cam.distance() <= MAX_DISTANCE);
        }
        assert_relative_eq!(cam.distance(), MAX_DISTANCE);
    }

    #[test]
    fn test_frame_view() {
        let mut cam = OrbitCamera::default();
        cam.frame_view(50.0);
        let expected = 25.0 / 22.5f32.to_radians().tan() * 1.5;
        assert_relative_eq!(cam.distance(), expected, epsilon = 1e-3);
        assert_relative_eq!(cam.distance(), 90.53, epsilon = 0.01);
        assert_distance_tracks(&cam);

        cam.frame_view(1.0e6);
        assert_relative_eq!(cam.distance(), MAX_DISTANCE);
        cam.frame_view(0.0);
        assert_relative_eq!(cam.distance(), MIN_DISTANCE);
    }

    #[test]
    fn test_wider_fov_frames_closer() {
        let mut cam = OrbitCamera::default();
        cam.set_fov(90.0);
        cam.frame_view(50.0);
        // tan(45°) = 1
        assert_relative_eq!(cam.distance(), 37.5, epsilon = 1e-3);

        cam.set_fov(f32::NAN);
        assert_eq!(cam.fov(), 90.0);
        cam.set_fov(500.0);
        assert_eq!(cam.fov(), 170.0);
    }

    #[test]
    fn test_frame_view_keeps_angles() {
        let mut cam = OrbitCamera::default();
        cam.orbit(40.0, 10.0);
        let (yaw, pitch) = (cam.yaw(), cam.pitch());
        let dir = (cam.position() - cam.target()).normalize();
        cam.frame_view(20.0);
        assert_relative_eq!(cam.yaw(), yaw);
        assert_relative_eq!(cam.pitch(), pitch);
        let after = (cam.position() - cam.target()).normalize();
        assert!(dir.abs_diff_eq(after, 1e-4));
    }

    #[test]
    fn test_orbit_clamps_pitch() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, 500.0);
        assert_relative_eq!(cam.pitch(), PITCH_LIMIT_DEG);
        cam.orbit(0.0, -1000.0);
        assert_relative_eq!(cam.pitch(), -PITCH_LIMIT_DEG);
        assert_distance_tracks(&cam);
    }

    #[test]
    fn test_orbit_offset_formula() {
        let mut cam = camera_at_distance_10();
        // From +Z: yaw 90, pitch 0.
        assert_relative_eq!(cam.yaw(), 90.0, epsilon = 1e-4);
        assert_relative_eq!(cam.pitch(), 0.0, epsilon = 1e-4);
        cam.orbit(-90.0, 0.0);
        assert!(cam.position().abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-4));
    }

    #[test]
    fn test_distance_invariant_over_sequence() {
        let mut cam = OrbitCamera::default();
        cam.orbit(33.0, -12.0);
        cam.pan(1.5, -2.0);
        cam.zoom(0.7);
        cam.orbit(-100.0, 45.0);
        cam.pan(-3.0, 0.25);
        cam.zoom(-2.0);
        assert_distance_tracks(&cam);
    }

    #[test]
    fn test_pan_preserves_distance_and_direction() {
        let mut cam = OrbitCamera::default();
        let before = cam.position() - cam.target();
        cam.pan(2.0, 1.0);
        let after = cam.position() - cam.target();
        assert!(before.abs_diff_eq(after, 1e-5));
        assert_relative_eq!(cam.target().y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_recenter_preserves_offset() {
        let mut cam = OrbitCamera::default();
        cam.orbit(25.0, 5.0);
        let before = cam.position() - cam.target();
        let dist = cam.distance();
        cam.recenter_on(Vec3::new(4.0, -2.0, 7.5));
        assert_eq!(cam.target(), Vec3::new(4.0, -2.0, 7.5));
        let after = cam.position() - cam.target();
        assert!(before.abs_diff_eq(after, 1e-4));
        assert_relative_eq!(after.length(), dist, epsilon = 1e-4);
    }

    #[test]
    fn test_set_target_rederives_spherical_state() {
        let mut cam = camera_at_distance_10();
        cam.set_target(Vec3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(cam.distance(), 5.0);
        // Orbit now uses the new radius.
        cam.orbit(10.0, 0.0);
        assert_distance_tracks(&cam);
        assert_relative_eq!(cam.distance(), 5.0);
    }

    #[test]
    fn test_translate_moves_rig() {
        let mut cam = OrbitCamera::default();
        let pos = cam.position();
        cam.translate(Vec3::new(1.0, 0.0, -1.0));
        assert_eq!(cam.position(), pos + Vec3::new(1.0, 0.0, -1.0));
        assert_eq!(cam.target(), Vec3::new(1.0, 0.0, -1.0));
    }

    #[test]
    fn test_view_maps_target_to_forward_axis() {
        let cam = OrbitCamera::default();
        let t = cam.view_matrix().transform_point3(cam.target());
        assert_relative_eq!(t.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(t.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(t.z, -cam.distance(), epsilon = 1e-4);

        let clip = cam.view_proj().project_point3(cam.target());
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn test_aspect_rejects_degenerate_values() {
        let mut cam = OrbitCamera::default();
        cam.set_aspect_ratio(0.0);
        assert_relative_eq!(cam.aspect_ratio(), 16.0 / 9.0);
        cam.set_aspect_ratio(2.0);
        assert_relative_eq!(cam.aspect_ratio(), 2.0);
    }

    #[test]
    fn test_world_to_screen() {
        let cam = camera_at_distance_10();
        let viewport = Vec2::new(1600.0, 900.0);
        let center = cam.world_to_screen(Vec3::ZERO, viewport).unwrap();
        assert_relative_eq!(center.x, 800.0, epsilon = 1e-3);
        assert_relative_eq!(center.y, 450.0, epsilon = 1e-3);

        // Up in the world is up on screen, so a smaller y.
        let above = cam.world_to_screen(Vec3::Y, viewport).unwrap();
        assert!(above.y < center.y);

        assert!(cam.world_to_screen(Vec3::new(0.0, 0.0, 20.0), viewport).is_none());
    }
}
