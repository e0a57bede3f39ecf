//! Flat list of independent drawables: wireframe shapes and image clouds.
//!
//! Every object has a stable id, a display name and a visibility flag. Image
//! clouds are listed here by path only; their GPU buffers live in the viewer.
//! [`SceneObjects::revision`] bumps on every change that alters the shape
//! line list, so the viewer re-uploads it only when needed.

use crate::shapes::{self, LineVertex};
use glam::Vec3;
use std::path::{Path, PathBuf};

pub type ObjectId = u64;

const SPHERE_SEGMENTS: u32 = 24;
const PLANE_DIVISIONS: u32 = 10;

/// The shapes that can be created from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Point,
    Line,
    Plane,
    Sphere,
    Cube,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Point,
        ShapeKind::Line,
        ShapeKind::Plane,
        ShapeKind::Sphere,
        ShapeKind::Cube,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Point => "Point",
            ShapeKind::Line => "Line",
            ShapeKind::Plane => "Plane",
            ShapeKind::Sphere => "Sphere",
            ShapeKind::Cube => "Cube",
        }
    }

    /// Placement and size a freshly created shape starts with.
    pub fn default_shape(self) -> Shape {
        match self {
            ShapeKind::Point => Shape::Point {
                position: Vec3::ZERO,
                size: 0.2,
            },
            ShapeKind::Line => Shape::Line {
                start: Vec3::ZERO,
                end: Vec3::new(2.0, 0.0, 0.0),
            },
            ShapeKind::Plane => Shape::Plane {
                center: Vec3::ZERO,
                half_size: 5.0,
            },
            ShapeKind::Sphere => Shape::Sphere {
                center: Vec3::new(0.0, 1.0, 0.0),
                radius: 1.0,
            },
            ShapeKind::Cube => Shape::Cube {
                center: Vec3::new(0.0, 0.5, 0.0),
                size: 1.0,
            },
        }
    }

    pub fn default_color(self) -> Vec3 {
        match self {
            ShapeKind::Point => Vec3::new(1.0, 0.0, 0.0),
            ShapeKind::Line => Vec3::new(0.0, 1.0, 0.0),
            ShapeKind::Plane => Vec3::new(0.5, 0.5, 0.8),
            ShapeKind::Sphere => Vec3::new(0.2, 0.5, 0.9),
            ShapeKind::Cube => Vec3::new(0.9, 0.3, 0.2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Point { position: Vec3, size: f32 },
    Line { start: Vec3, end: Vec3 },
    Plane { center: Vec3, half_size: f32 },
    Sphere { center: Vec3, radius: f32 },
    Cube { center: Vec3, size: f32 },
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Point { .. } => ShapeKind::Point,
            Shape::Line { .. } => ShapeKind::Line,
            Shape::Plane { .. } => ShapeKind::Plane,
            Shape::Sphere { .. } => ShapeKind::Sphere,
            Shape::Cube { .. } => ShapeKind::Cube,
        }
    }

    /// Reference position shown in the properties panel.
    pub fn position(&self) -> Vec3 {
        match *self {
            Shape::Point { position, .. } => position,
            Shape::Line { start, .. } => start,
            Shape::Plane { center, .. } | Shape::Sphere { center, .. } | Shape::Cube { center, .. } => center,
        }
    }

    pub fn lines(&self, color: Vec3) -> Vec<LineVertex> {
        match *self {
            Shape::Point { position, size } => shapes::point_marker(position, size, color),
            Shape::Line { start, end } => shapes::line(start, end, color),
            Shape::Plane { center, half_size } => shapes::wire_plane(center, half_size, PLANE_DIVISIONS, color),
            Shape::Sphere { center, radius } => shapes::wire_sphere(center, radius, SPHERE_SEGMENTS, color),
            Shape::Cube { center, size } => shapes::wire_cube(center, size, color),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Shape { shape: Shape, color: Vec3 },
    Image(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub visible: bool,
    pub kind: ObjectKind,
}

impl SceneObject {
    pub fn image_path(&self) -> Option<&Path> {
        match &self.kind {
            ObjectKind::Image(path) => Some(path),
            ObjectKind::Shape { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneObjects {
    objects: Vec<SceneObject>,
    next_id: ObjectId,
    revision: u64,
}

impl SceneObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// The scene a fresh viewer opens with: one sphere and one cube.
    pub fn with_reference_shapes() -> Self {
        let mut scene = Self::new();
        scene.add_shape(ShapeKind::Sphere.default_shape(), ShapeKind::Sphere.default_color());
        scene.add_shape(
            Shape::Cube {
                center: Vec3::new(3.0, 0.5, 0.0),
                size: 1.0,
            },
            ShapeKind::Cube.default_color(),
        );
        scene
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn push(&mut self, name: String, kind: ObjectKind) -> ObjectId {
        self.next_id += 1;
        let id = self.next_id;
        self.objects.push(SceneObject {
            id,
            name,
            visible: true,
            kind,
        });
        self.revision += 1;
        id
    }

    /// Adds a shape named after its kind and a running number ("Sphere 2").
    pub fn add_shape(&mut self, shape: Shape, color: Vec3) -> ObjectId {
        let kind = shape.kind();
        let n = self
            .objects
            .iter()
            .filter(|o| matches!(&o.kind, ObjectKind::Shape { shape: s, .. } if s.kind() == kind))
            .count();
        let name = format!("{} {}", kind.name(), n + 1);
        self.push(name, ObjectKind::Shape { shape, color })
    }

    /// Lists an image cloud. Adding a path that is already listed returns
    /// the existing id.
    pub fn add_image(&mut self, path: &Path) -> ObjectId {
        if let Some(id) = self.image_id(path) {
            return id;
        }
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        self.push(name, ObjectKind::Image(path.to_path_buf()))
    }

    pub fn image_id(&self, path: &Path) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|o| o.image_path() == Some(path))
            .map(|o| o.id)
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let idx = self.objects.iter().position(|o| o.id == id)?;
        self.revision += 1;
        Some(self.objects.remove(idx))
    }

    pub fn remove_image(&mut self, path: &Path) -> Option<SceneObject> {
        self.image_id(path).and_then(|id| self.remove(id))
    }

    /// Returns false for an unknown id.
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> bool {
        let Some(obj) = self.objects.iter_mut().find(|o| o.id == id) else {
            return false;
        };
        if obj.visible != visible {
            obj.visible = visible;
            self.revision += 1;
        }
        true
    }

    /// Unlisted images count as visible, so clouds built before they are
    /// listed still draw.
    pub fn is_image_visible(&self, path: &Path) -> bool {
        self.objects
            .iter()
            .find(|o| o.image_path() == Some(path))
            .map_or(true, |o| o.visible)
    }

    /// Line list of every visible shape, in list order.
    pub fn shape_lines(&self) -> Vec<LineVertex> {
        self.objects
            .iter()
            .filter(|o| o.visible)
            .flat_map(|o| match &o.kind {
                ObjectKind::Shape { shape, color } => shape.lines(*color),
                ObjectKind::Image(_) => Vec::new(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_shapes() {
        let scene = SceneObjects::with_reference_shapes();
        let names: Vec<&str> = scene.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["Sphere 1", "Cube 1"]);
        assert!(scene.iter().all(|o| o.visible));

        let sphere = shapes::wire_sphere(Vec3::ZERO, 1.0, SPHERE_SEGMENTS, Vec3::ONE).len();
        assert_eq!(scene.shape_lines().len(), sphere + 24);
    }

    #[test]
    fn test_add_names_per_kind() {
        let mut scene = SceneObjects::new();
        let a = scene.add_shape(ShapeKind::Point.default_shape(), Vec3::ONE);
        scene.add_shape(ShapeKind::Line.default_shape(), Vec3::ONE);
        let b = scene.add_shape(ShapeKind::Point.default_shape(), Vec3::ONE);
        assert_ne!(a, b);
        assert_eq!(scene.get(b).unwrap().name, "Point 2");
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn test_visibility_filters_lines() {
        let mut scene = SceneObjects::new();
        let line = scene.add_shape(ShapeKind::Line.default_shape(), Vec3::Y);
        let plane = scene.add_shape(ShapeKind::Plane.default_shape(), Vec3::ONE);
        let all = scene.shape_lines().len();

        let rev = scene.revision();
        assert!(scene.set_visible(plane, false));
        assert!(scene.revision() > rev);
        assert_eq!(scene.shape_lines().len(), 2);
        assert_eq!(scene.shape_lines()[1].position, Vec3::new(2.0, 0.0, 0.0));

        // Same value again is not a change.
        let rev = scene.revision();
        assert!(scene.set_visible(plane, false));
        assert_eq!(scene.revision(), rev);

        assert!(scene.set_visible(plane, true));
        assert_eq!(scene.shape_lines().len(), all);
        assert!(!scene.set_visible(line + 100, false));
    }

    #[test]
    fn test_images_listed_once() {
        let mut scene = SceneObjects::new();
        let path = Path::new("data/frame.fits");
        let id = scene.add_image(path);
        assert_eq!(scene.add_image(path), id);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.get(id).unwrap().name, "frame.fits");
        assert!(scene.shape_lines().is_empty());

        assert!(scene.is_image_visible(path));
        scene.set_visible(id, false);
        assert!(!scene.is_image_visible(path));
        assert!(scene.is_image_visible(Path::new("other.png")));

        let removed = scene.remove_image(path).unwrap();
        assert_eq!(removed.image_path(), Some(path));
        assert!(scene.is_empty());
        assert!(scene.remove(id).is_none());
    }
}
