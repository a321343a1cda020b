use crate::{
    composition::spec::MaskGeometry,
    foundation::core::{Point, Rect, Vec2},
    foundation::error::{PortraitError, PortraitResult},
};

/// Smallest scale offered by the editing controls.
pub const SCALE_MIN: f64 = 0.5;
/// Largest scale offered by the editing controls.
pub const SCALE_MAX: f64 = 3.0;
/// Scale slider step.
pub const SCALE_STEP: f64 = 0.05;
/// Smallest offset offered by the editing controls.
pub const OFFSET_MIN: f64 = -200.0;
/// Largest offset offered by the editing controls.
pub const OFFSET_MAX: f64 = 200.0;
/// Offset slider step.
pub const OFFSET_STEP: f64 = 5.0;

/// User-adjustable placement of the photo inside the mask.
///
/// The ranges above are a contract of the editing controls; rendering accepts any finite value.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransformState {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl TransformState {
    pub fn new(scale: f64, offset_x: f64, offset_y: f64) -> PortraitResult<Self> {
        for (name, v) in [("scale", scale), ("offset_x", offset_x), ("offset_y", offset_y)] {
            check_finite(name, v)?;
        }
        Ok(Self {
            scale,
            offset_x,
            offset_y,
        })
    }

    /// Clamp to the control ranges and quantize to the slider steps.
    pub fn snapped(self) -> Self {
        Self {
            scale: snap(self.scale, SCALE_MIN, SCALE_MAX, SCALE_STEP),
            offset_x: snap(self.offset_x, OFFSET_MIN, OFFSET_MAX, OFFSET_STEP),
            offset_y: snap(self.offset_y, OFFSET_MIN, OFFSET_MAX, OFFSET_STEP),
        }
    }

    pub fn offset(self) -> Vec2 {
        Vec2::new(self.offset_x, self.offset_y)
    }

    /// Where a `photo_w`×`photo_h` photo lands on the canvas.
    ///
    /// The photo is as wide as the mask diameter times `scale`, keeps its aspect ratio, and is
    /// centered on the mask center before the offset is applied.
    pub fn placement(self, geometry: &MaskGeometry, photo_w: u32, photo_h: u32) -> Rect {
        let w = geometry.radius * 2.0 * self.scale;
        let h = if photo_w == 0 {
            0.0
        } else {
            f64::from(photo_h) / f64::from(photo_w) * w
        };
        let origin: Point = geometry.center - Vec2::new(w / 2.0, h / 2.0) + self.offset();
        Rect::from_origin_size(origin, (w, h))
    }
}

pub(crate) fn check_finite(name: &str, v: f64) -> PortraitResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(PortraitError::validation(format!(
            "{name} must be finite, got {v}"
        )))
    }
}

fn snap(v: f64, min: f64, max: f64, step: f64) -> f64 {
    let clamped = v.clamp(min, max);
    let steps = ((clamped - min) / step).round();
    (min + steps * step).clamp(min, max)
}

#[cfg(test)]
#[path = "../../tests/unit/composition/transform.rs"]
mod tests;
