//! The current focus region: active pixel, ROI radius, highlight window.
//!
//! UI code mutates this on clicks and target selection; the frame loop reads
//! it back through the consume-once reload/recenter requests.

use crate::generate::{GenerationMode, Highlight, PixelCenter, Roi, DEFAULT_HIGHLIGHT_COLOR};
use crate::targets::TargetRecord;
use glam::Vec4;
use std::ops::RangeInclusive;

pub const ROI_RADIUS_RANGE: RangeInclusive<i32> = 50..=500;
pub const HIGHLIGHT_SIZE_RANGE: RangeInclusive<i32> = 1..=300;
pub const HIGHLIGHT_SCALE_RANGE: RangeInclusive<f32> = 1.0..=20.0;

#[derive(Debug, Clone)]
pub struct SelectionState {
    active_center: Option<PixelCenter>,
    roi_enabled: bool,
    roi_radius: i32,
    highlight_size: i32,
    highlight_scale: f32,
    highlight_color: Vec4,

    reload_pending: bool,
    recenter_pending: bool,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            active_center: None,
            roi_enabled: false,
            roi_radius: 200,
            highlight_size: 10,
            highlight_scale: 4.0,
            highlight_color: DEFAULT_HIGHLIGHT_COLOR,
            reload_pending: false,
            recenter_pending: false,
        }
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_center(&self) -> Option<PixelCenter> {
        self.active_center
    }

    pub fn roi_enabled(&self) -> bool {
        self.roi_enabled
    }

    pub fn roi_radius(&self) -> i32 {
        self.roi_radius
    }

    pub fn highlight_size(&self) -> i32 {
        self.highlight_size
    }

    pub fn highlight_scale(&self) -> f32 {
        self.highlight_scale
    }

    pub fn highlight_color(&self) -> Vec4 {
        self.highlight_color
    }

    /// Focuses on `(x, y)` and arms both a reload and a camera recenter.
    pub fn set_active_center(&mut self, x: i32, y: i32) {
        self.active_center = Some(PixelCenter::new(x, y));
        self.reload_pending = true;
        self.recenter_pending = true;
    }

    /// Drops the focus pixel. ROI cannot stay on without one.
    pub fn clear_active_center(&mut self) {
        self.active_center = None;
        self.roi_enabled = false;
    }

    /// Enables ROI restriction; refused (returns false) without a center.
    pub fn set_roi_enabled(&mut self, enabled: bool) -> bool {
        if enabled && self.active_center.is_none() {
            self.roi_enabled = false;
            return false;
        }
        self.roi_enabled = enabled;
        true
    }

    pub fn set_roi_radius(&mut self, radius: i32) {
        self.roi_radius = radius.clamp(*ROI_RADIUS_RANGE.start(), *ROI_RADIUS_RANGE.end());
    }

    pub fn set_highlight_size(&mut self, size: i32) {
        self.highlight_size = size.clamp(*HIGHLIGHT_SIZE_RANGE.start(), *HIGHLIGHT_SIZE_RANGE.end());
    }

    pub fn set_highlight_scale(&mut self, scale: f32) {
        let scale = if scale.is_nan() { *HIGHLIGHT_SCALE_RANGE.start() } else { scale };
        self.highlight_scale = scale.clamp(*HIGHLIGHT_SCALE_RANGE.start(), *HIGHLIGHT_SCALE_RANGE.end());
    }

    /// Channels are clamped to [0, 1]; NaN channels become 0.
    pub fn set_highlight_color(&mut self, color: Vec4) {
        let color = Vec4::select(color.is_nan_mask(), Vec4::ZERO, color);
        self.highlight_color = color.clamp(Vec4::ZERO, Vec4::ONE);
    }

    /// "Reload with ROI": regenerate without moving the camera.
    pub fn request_reload(&mut self) {
        self.reload_pending = true;
    }

    /// "Center view on ROI": move the camera without regenerating.
    pub fn request_recenter(&mut self) {
        self.recenter_pending = true;
    }

    /// Returns whether a reload was pending, clearing the request.
    pub fn consume_reload_request(&mut self) -> bool {
        std::mem::take(&mut self.reload_pending)
    }

    /// Returns whether a recenter was pending, clearing the request.
    pub fn consume_recenter_request(&mut self) -> bool {
        std::mem::take(&mut self.recenter_pending)
    }

    /// Adopts a target record's pixel center (or clears ours if it has none).
    pub fn apply_target(&mut self, record: &TargetRecord) {
        match record.pixel_center {
            Some(c) => self.active_center = Some(c),
            None => self.clear_active_center(),
        }
        self.reload_pending = true;
        self.recenter_pending = true;
    }

    /// The generator to run for an image of `width x height`.
    ///
    /// With a center but no ROI restriction, the ROI is widened to the whole
    /// image so the highlight window still applies.
    pub fn generation_mode(&self, width: u32, height: u32) -> GenerationMode {
        let Some(center) = self.active_center else {
            return GenerationMode::Full;
        };
        let radius = if self.roi_enabled {
            self.roi_radius
        } else {
            width.max(height).min(i32::MAX as u32) as i32
        };
        GenerationMode::RoiHighlight {
            roi: Roi { center, radius },
            highlight: Highlight {
                center,
                size: self.highlight_size,
                color: self.highlight_color,
            },
        }
    }
}
