//! Soft-edge masks applied to the photo layer.
//!
//! Masks are alpha-only coverage buffers of canvas size. They depend only on the composition
//! constants, so the compositor builds each one once and reuses it for every render.

use crate::{
    composition::spec::MaskGeometry,
    foundation::core::Canvas,
    foundation::error::{PortraitError, PortraitResult},
    foundation::math::{mul_div255_u8, unit_to_u8},
};

/// Opacity stops of the bottom fade as `(position, opacity)`, top of the band first.
pub const BOTTOM_FADE_STOPS: [(f32, f32); 4] = [(0.0, 1.0), (0.5, 0.7), (0.7, 0.1), (1.0, 0.0)];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Which mask a [`crate::render::plan::Pass::ApplyMask`] multiplies in.
pub enum MaskShape {
    /// Radial ramp from opaque at `radius - feather_width` to transparent at `radius`.
    Feather,
    /// Vertical ramp over the fade band ending at the bottom of the circle.
    BottomFade,
}

/// Feather opacity at `dist` pixels from the mask center.
pub fn feather_alpha(dist: f64, g: &MaskGeometry) -> f32 {
    if dist >= g.radius {
        return 0.0;
    }
    let inner = g.feather_inner_radius();
    if dist <= inner {
        return 1.0;
    }
    ((g.radius - dist) / (g.radius - inner)).clamp(0.0, 1.0) as f32
}

/// Bottom fade opacity at canvas row coordinate `y`.
pub fn bottom_fade_alpha(y: f64, g: &MaskGeometry) -> f32 {
    let bottom = g.bottom_y();
    if y >= bottom {
        return 0.0;
    }
    let top = g.fade_top_y();
    if y <= top || g.fade_band_height <= 0.0 {
        return 1.0;
    }
    let t = ((y - top) / g.fade_band_height) as f32;
    gradient_at(&BOTTOM_FADE_STOPS, t)
}

fn gradient_at(stops: &[(f32, f32)], t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    for pair in stops.windows(2) {
        let (p0, v0) = pair[0];
        let (p1, v1) = pair[1];
        if t <= p1 {
            let span = p1 - p0;
            if span <= 0.0 {
                return v1;
            }
            return v0 + (v1 - v0) * ((t - p0) / span);
        }
    }
    stops.last().map_or(1.0, |s| s.1)
}

/// Canvas-sized 8-bit coverage buffer.
#[derive(Clone, Debug)]
pub(crate) struct AlphaMask {
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

impl AlphaMask {
    /// Sample `shape` at every pixel center of `canvas`.
    pub(crate) fn build(shape: MaskShape, canvas: Canvas, g: &MaskGeometry) -> Self {
        let (w, h) = (canvas.width as usize, canvas.height as usize);
        let mut coverage = vec![0u8; w.saturating_mul(h)];
        match shape {
            MaskShape::Feather => {
                for (y, row) in coverage.chunks_exact_mut(w).enumerate() {
                    let dy = (y as f64 + 0.5) - g.center.y;
                    for (x, c) in row.iter_mut().enumerate() {
                        let dx = (x as f64 + 0.5) - g.center.x;
                        *c = unit_to_u8(feather_alpha((dx * dx + dy * dy).sqrt(), g));
                    }
                }
            }
            MaskShape::BottomFade => {
                // Rows are uniform; evaluate once per row.
                for (y, row) in coverage.chunks_exact_mut(w).enumerate() {
                    row.fill(unit_to_u8(bottom_fade_alpha(y as f64 + 0.5, g)));
                }
            }
        }
        tracing::debug!(?shape, width = w, height = h, "built alpha mask");
        Self {
            width: canvas.width,
            height: canvas.height,
            coverage,
        }
    }

    #[cfg(test)]
    pub(crate) fn coverage_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.coverage
            .get((y as usize) * (self.width as usize) + (x as usize))
            .copied()
    }

    /// "destination-in": scale every premultiplied pixel of `dst` by the mask coverage.
    pub(crate) fn apply_in_place(&self, dst: &mut [u8]) -> PortraitResult<()> {
        let expected = (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4);
        if dst.len() != expected || self.coverage.len().saturating_mul(4) != expected {
            return Err(PortraitError::render(
                "mask apply expects a surface matching the mask size",
            ));
        }
        for (d, &m) in dst.chunks_exact_mut(4).zip(self.coverage.iter()) {
            match m {
                255 => {}
                0 => d.fill(0),
                _ => {
                    let w16 = u16::from(m);
                    for c in d.iter_mut() {
                        *c = mul_div255_u8(u16::from(*c), w16);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/masks.rs"]
mod tests;
