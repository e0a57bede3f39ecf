//! Line-list geometry: ground grid, axes and the wireframe scene shapes.
//!
//! Every function returns vertex pairs; vertex `2k` and `2k + 1` form one
//! segment.

use glam::{Vec3, Vec4};
use std::f32::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineVertex {
    pub position: Vec3,
    pub color: Vec3,
}

impl LineVertex {
    pub const fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }
}

/// Text anchored at a world position, drawn as a screen-space overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldLabel {
    pub position: Vec3,
    pub text: String,
    pub color: Vec4,
}

const GRID_GRAY: f32 = 0.7;
const GRID_CENTER_GRAY: f32 = 0.5;
const GRID_LABEL_COLOR: Vec4 = Vec4::new(100.0 / 255.0, 100.0 / 255.0, 100.0 / 255.0, 200.0 / 255.0);
/// How far labels sit beyond the end of the line they name.
const LABEL_OFFSET: f32 = 0.5;

fn segment(out: &mut Vec<LineVertex>, a: Vec3, b: Vec3, color: Vec3) {
    out.push(LineVertex::new(a, color));
    out.push(LineVertex::new(b, color));
}

/// Square grid on the XZ plane, `size` wide, centered on the origin.
/// The middle line on each axis is drawn darker.
pub fn grid(size: f32, divisions: u32) -> Vec<LineVertex> {
    let divisions = divisions.max(1);
    let half = size * 0.5;
    let step = size / divisions as f32;
    let mut out = Vec::with_capacity((divisions as usize + 1) * 4);

    for i in 0..=divisions {
        let gray = if i == divisions / 2 { GRID_CENTER_GRAY } else { GRID_GRAY };
        let color = Vec3::splat(gray);
        let t = -half + i as f32 * step;
        segment(&mut out, Vec3::new(-half, 0.0, t), Vec3::new(half, 0.0, t), color);
        segment(&mut out, Vec3::new(t, 0.0, -half), Vec3::new(t, 0.0, half), color);
    }
    out
}

/// Coordinate labels along two edges of [`grid`], every second line.
pub fn grid_labels(size: f32, divisions: u32) -> Vec<WorldLabel> {
    let divisions = divisions.max(1);
    let half = size * 0.5;
    let step = size / divisions as f32;
    let mut out = Vec::new();

    for i in (0..=divisions).filter(|i| i % 2 == 0 || *i == divisions) {
        let t = -half + i as f32 * step;
        out.push(WorldLabel {
            position: Vec3::new(-half - LABEL_OFFSET, 0.0, t),
            text: (t as i32).to_string(),
            color: GRID_LABEL_COLOR,
        });
    }
    for i in (0..=divisions).filter(|i| i % 2 == 0 || *i == divisions) {
        let t = -half + i as f32 * step;
        out.push(WorldLabel {
            position: Vec3::new(t, 0.0, -half - LABEL_OFFSET),
            text: (t as i32).to_string(),
            color: GRID_LABEL_COLOR,
        });
    }
    out
}

/// X (red), Y (green) and Z (blue) from the origin.
pub fn axes(length: f32) -> Vec<LineVertex> {
    let mut out = Vec::with_capacity(6);
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        segment(&mut out, Vec3::ZERO, axis * length, axis);
    }
    out
}

/// "X", "Y", "Z" just past the tips of [`axes`].
pub fn axis_labels(length: f32) -> Vec<WorldLabel> {
    [(Vec3::X, "X"), (Vec3::Y, "Y"), (Vec3::Z, "Z")]
        .into_iter()
        .map(|(axis, name)| WorldLabel {
            position: axis * (length + LABEL_OFFSET),
            text: name.to_string(),
            color: axis.extend(1.0),
        })
        .collect()
}

/// A single segment.
pub fn line(start: Vec3, end: Vec3, color: Vec3) -> Vec<LineVertex> {
    vec![LineVertex::new(start, color), LineVertex::new(end, color)]
}

/// Three axis-aligned strokes crossing at `center`, each `size` long.
pub fn point_marker(center: Vec3, size: f32, color: Vec3) -> Vec<LineVertex> {
    let h = size * 0.5;
    let mut out = Vec::with_capacity(6);
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        segment(&mut out, center - axis * h, center + axis * h, color);
    }
    out
}

/// Horizontal square of half-width `half_size` at `center`, ruled into
/// `divisions` cells per side.
pub fn wire_plane(center: Vec3, half_size: f32, divisions: u32, color: Vec3) -> Vec<LineVertex> {
    let divisions = divisions.max(1);
    let step = 2.0 * half_size / divisions as f32;
    let mut out = Vec::with_capacity((divisions as usize + 1) * 4);
    for i in 0..=divisions {
        let t = -half_size + i as f32 * step;
        segment(
            &mut out,
            center + Vec3::new(-half_size, 0.0, t),
            center + Vec3::new(half_size, 0.0, t),
            color,
        );
        segment(
            &mut out,
            center + Vec3::new(t, 0.0, -half_size),
            center + Vec3::new(t, 0.0, half_size),
            color,
        );
    }
    out
}

/// The 12 edges of an axis-aligned cube.
pub fn wire_cube(center: Vec3, size: f32, color: Vec3) -> Vec<LineVertex> {
    let s = size * 0.5;
    let corner = |i: usize| {
        center
            + Vec3::new(
                if i & 1 == 0 { -s } else { s },
                if i & 2 == 0 { -s } else { s },
                if i & 4 == 0 { -s } else { s },
            )
    };

    let mut out = Vec::with_capacity(24);
    for a in 0..8usize {
        for bit in [1usize, 2, 4] {
            // Each edge once: from the corner with the bit cleared.
            if a & bit == 0 {
                segment(&mut out, corner(a), corner(a | bit), color);
            }
        }
    }
    out
}

/// Latitude rings and meridians of a sphere, `segments` around the equator.
pub fn wire_sphere(center: Vec3, radius: f32, segments: u32, color: Vec3) -> Vec<LineVertex> {
    let segments = segments.max(3);
    let stacks = (segments / 2).max(2);
    let point = |theta: f32, phi: f32| {
        let (st, ct) = theta.sin_cos();
        let (sp, cp) = phi.sin_cos();
        center + Vec3::new(sp * ct, cp, sp * st) * radius
    };

    let mut out = Vec::new();
    for i in 1..stacks {
        let phi = PI * i as f32 / stacks as f32;
        for j in 0..segments {
            let t0 = TAU * j as f32 / segments as f32;
            let t1 = TAU * (j + 1) as f32 / segments as f32;
            segment(&mut out, point(t0, phi), point(t1, phi), color);
        }
    }
    for j in 0..segments {
        let theta = TAU * j as f32 / segments as f32;
        for i in 0..stacks {
            let p0 = PI * i as f32 / stacks as f32;
            let p1 = PI * (i + 1) as f32 / stacks as f32;
            segment(&mut out, point(theta, p0), point(theta, p1), color);
        }
    }
    out
}
