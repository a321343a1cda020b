use crate::foundation::{
    core::{Canvas, Point},
    error::{PortraitError, PortraitResult},
};

/// Fixed layout constants of the composite.
///
/// These come from configuration and are not changed by the user while editing.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositionSpec {
    /// Output canvas size.
    pub canvas: Canvas,
    /// Radius of the circular photo mask, in pixels.
    pub mask_radius: f64,
    /// Vertical displacement of the mask center from the canvas center (negative moves it up).
    pub vertical_bias: f64,
    /// Width of the soft ring at the mask edge.
    pub feather_width: f64,
    /// Height of the fade band that ends at the bottom of the circle.
    pub fade_band_height: f64,
    /// Whether the bottom fade pass runs.
    pub bottom_fade: bool,
}

impl Default for CompositionSpec {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1500,
                height: 1500,
            },
            mask_radius: 320.0,
            vertical_bias: -170.0,
            feather_width: 24.0,
            fade_band_height: 160.0,
            bottom_fade: true,
        }
    }
}

impl CompositionSpec {
    /// Reject specs that cannot back a surface or describe an impossible mask.
    pub fn validate(&self) -> PortraitResult<()> {
        self.canvas.validate()?;
        let finite = [
            self.mask_radius,
            self.vertical_bias,
            self.feather_width,
            self.fade_band_height,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(PortraitError::validation(
                "composition constants must be finite",
            ));
        }
        if self.mask_radius <= 0.0 {
            return Err(PortraitError::validation("mask_radius must be > 0"));
        }
        if self.feather_width < 0.0 || self.feather_width > self.mask_radius {
            return Err(PortraitError::validation(
                "feather_width must be within [0, mask_radius]",
            ));
        }
        if self.fade_band_height < 0.0 {
            return Err(PortraitError::validation("fade_band_height must be >= 0"));
        }
        Ok(())
    }

    /// Derived mask geometry.
    pub fn geometry(&self) -> MaskGeometry {
        let c = self.canvas.center();
        MaskGeometry {
            center: Point::new(c.x, c.y + self.vertical_bias),
            radius: self.mask_radius,
            feather_width: self.feather_width,
            fade_band_height: self.fade_band_height,
        }
    }
}

/// Circle placement and edge treatment, in canvas pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskGeometry {
    pub center: Point,
    pub radius: f64,
    pub feather_width: f64,
    pub fade_band_height: f64,
}

impl MaskGeometry {
    /// Distance from the center inside which the feather leaves full opacity.
    pub fn feather_inner_radius(&self) -> f64 {
        (self.radius - self.feather_width).max(0.0)
    }

    /// The lowest point of the circle; the fade band ends here.
    pub fn bottom_y(&self) -> f64 {
        self.center.y + self.radius
    }

    /// Top edge of the fade band.
    pub fn fade_top_y(&self) -> f64 {
        self.bottom_y() - self.fade_band_height
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/spec.rs"]
mod tests;
