use crate::{
    composition::spec::CompositionSpec,
    foundation::core::{Canvas, Rgba8Premul},
    render::masks::MaskShape,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Identifier for a render surface declared in [`RenderPlan::surfaces`].
pub struct SurfaceId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Supported pixel formats for render surfaces.
pub enum PixelFormat {
    Rgba8Premul,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Surface declaration: dimensions + pixel format.
pub struct SurfaceDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl SurfaceDesc {
    fn canvas(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            format: PixelFormat::Rgba8Premul,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A layer drawn by a [`Pass::Composite`], bottom to top.
pub enum CompositeOp {
    /// The background source stretched over the full canvas.
    Background,
    /// A surface produced earlier in the plan.
    Surface(SurfaceId),
    /// The overlay source stretched over the full canvas.
    Overlay,
}

#[derive(Clone, Debug, PartialEq)]
/// A single full-canvas raster step.
pub enum Pass {
    /// Fill `target` with a premultiplied color.
    Clear {
        target: SurfaceId,
        color: Rgba8Premul,
    },
    /// Clear `target` to transparent and draw the photo through the circular clip.
    DrawPhoto { target: SurfaceId },
    /// Multiply `target` by a mask ("destination-in").
    ApplyMask { target: SurfaceId, mask: MaskShape },
    /// Draw layers over `target` in order with source-over.
    Composite {
        target: SurfaceId,
        ops: Vec<CompositeOp>,
    },
}

#[derive(Clone, Debug, PartialEq)]
/// Ordered passes for one render, over explicitly declared surfaces.
pub struct RenderPlan {
    pub canvas: Canvas,
    pub surfaces: Vec<SurfaceDesc>,
    pub passes: Vec<Pass>,
    pub final_surface: SurfaceId,
    /// Surface holding the masked photo before it is composited.
    pub photo_surface: SurfaceId,
}

pub(crate) const FINAL_SURFACE: SurfaceId = SurfaceId(0);
pub(crate) const PHOTO_SURFACE: SurfaceId = SurfaceId(1);

/// Compile the pass list for `spec`.
///
/// The plan only depends on the spec, the clear color and whether an overlay is drawn, so callers
/// can reuse it across renders.
pub fn compile_plan(
    spec: &CompositionSpec,
    clear: Option<Rgba8Premul>,
    has_overlay: bool,
) -> RenderPlan {
    let desc = SurfaceDesc::canvas(spec.canvas);

    let mut passes = vec![
        Pass::Clear {
            target: FINAL_SURFACE,
            color: clear.unwrap_or_else(Rgba8Premul::transparent),
        },
        Pass::DrawPhoto {
            target: PHOTO_SURFACE,
        },
        Pass::ApplyMask {
            target: PHOTO_SURFACE,
            mask: MaskShape::Feather,
        },
    ];
    if spec.bottom_fade {
        passes.push(Pass::ApplyMask {
            target: PHOTO_SURFACE,
            mask: MaskShape::BottomFade,
        });
    }

    let mut ops = vec![CompositeOp::Background, CompositeOp::Surface(PHOTO_SURFACE)];
    if has_overlay {
        ops.push(CompositeOp::Overlay);
    }
    passes.push(Pass::Composite {
        target: FINAL_SURFACE,
        ops,
    });

    RenderPlan {
        canvas: spec.canvas,
        surfaces: vec![desc, desc],
        passes,
        final_surface: FINAL_SURFACE,
        photo_surface: PHOTO_SURFACE,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
