use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    assets::source::{RasterSource, SourceId, SourceRole},
    composition::spec::{CompositionSpec, MaskGeometry},
    composition::transform::{TransformState, check_finite},
    foundation::core::{Affine, Rgba8Premul},
    foundation::error::{PortraitError, PortraitResult},
    render::composite::{
        affine_to_cpu, circle_path_cpu, fill_rgba8, image_paint, pixmap_from_premul_bytes,
        pixmap_paint, premul_over_in_place,
    },
    render::frame::FrameRGBA,
    render::masks::{AlphaMask, MaskShape},
    render::plan::{CompositeOp, Pass, RenderPlan, SurfaceId, compile_plan},
    render::surface_pool::{SurfacePool, SurfacePoolOpts},
};

/// Everything one render reads. Sources must already be decoded.
#[derive(Clone, Copy, Debug)]
pub struct RenderInputs<'a> {
    pub background: &'a RasterSource,
    pub photo: &'a RasterSource,
    pub overlay: Option<&'a RasterSource>,
    pub transform: TransformState,
}

/// Counters describing work done by a [`Compositor`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Completed full renders.
    pub renders: u64,
    /// Background/overlay rasterizations (cache misses).
    pub layer_rasterizations: u64,
    /// Mask builds (cache misses).
    pub mask_builds: u64,
    /// Photo uploads into a drawable pixmap (cache misses).
    pub photo_uploads: u64,
    /// Surfaces allocated by the pool (not reused).
    pub surface_allocations: u64,
    /// Surfaces currently kept for reuse, and their size in bytes.
    pub retained_surfaces: usize,
    pub retained_bytes: usize,
    /// Released surfaces the pool refused to keep.
    pub surfaces_dropped: u64,
}

struct CachedLayer {
    source: SourceId,
    pixmap: vello_cpu::Pixmap,
}

#[derive(Clone, Copy)]
struct PassSources<'a> {
    background: Option<&'a RasterSource>,
    photo: &'a RasterSource,
    overlay: Option<&'a RasterSource>,
    transform: TransformState,
}

/// Renders the layered portrait composite.
///
/// The output is a pure function of the inputs and the [`CompositionSpec`]; the compositor only
/// keeps caches (masks, stretched background/overlay, surfaces) that never change a pixel.
pub struct Compositor {
    spec: CompositionSpec,
    geometry: MaskGeometry,
    clear: Option<Rgba8Premul>,

    pool: SurfacePool,
    ctx: Option<vello_cpu::RenderContext>,

    masks: HashMap<MaskShape, AlphaMask>,
    backdrop: Option<CachedLayer>,
    photo_pixmap: Option<(SourceId, Arc<vello_cpu::Pixmap>)>,
    foreground: Option<CachedLayer>,
    plans: HashMap<bool, RenderPlan>,

    stats: RenderStats,
}

impl Compositor {
    /// Create a compositor for `spec`.
    ///
    /// `clear_rgba` is a straight-alpha color painted under the background; pass `None` to keep
    /// the canvas transparent where the background is.
    pub fn new(spec: CompositionSpec, clear_rgba: Option<[u8; 4]>) -> PortraitResult<Self> {
        spec.validate()?;
        Ok(Self {
            geometry: spec.geometry(),
            spec,
            clear: clear_rgba.map(|[r, g, b, a]| Rgba8Premul::from_straight_rgba(r, g, b, a)),
            pool: SurfacePool::new(SurfacePoolOpts::default()),
            ctx: None,
            masks: HashMap::new(),
            backdrop: None,
            photo_pixmap: None,
            foreground: None,
            plans: HashMap::new(),
            stats: RenderStats::default(),
        })
    }

    pub fn spec(&self) -> &CompositionSpec {
        &self.spec
    }

    pub fn geometry(&self) -> &MaskGeometry {
        &self.geometry
    }

    pub fn stats(&self) -> RenderStats {
        let pool = self.pool.stats();
        RenderStats {
            surface_allocations: pool.alloc_surfaces,
            retained_surfaces: pool.retained_surfaces,
            retained_bytes: pool.retained_bytes,
            surfaces_dropped: pool.dropped_on_release,
            ..self.stats
        }
    }

    /// The plan executed for renders with or without an overlay.
    pub fn plan(&mut self, has_overlay: bool) -> &RenderPlan {
        let (spec, clear) = (self.spec, self.clear);
        self.plans
            .entry(has_overlay)
            .or_insert_with(|| compile_plan(&spec, clear, has_overlay))
    }

    /// Render the full composite: background, masked photo, overlay.
    #[tracing::instrument(skip(self, inputs), fields(photo = %inputs.photo.origin()))]
    pub fn render(&mut self, inputs: &RenderInputs<'_>) -> PortraitResult<FrameRGBA> {
        let plan = self.plan(inputs.overlay.is_some()).clone();
        let sources = PassSources {
            background: Some(inputs.background),
            photo: inputs.photo,
            overlay: inputs.overlay,
            transform: inputs.transform,
        };
        let frame = self.run(&plan, &plan.passes, sources, plan.final_surface)?;
        self.stats.renders = self.stats.renders.saturating_add(1);
        tracing::debug!(renders = self.stats.renders, "render complete");
        Ok(frame)
    }

    /// Render only the off-surface photo buffer (clip, feather, bottom fade) without compositing.
    pub fn render_photo_layer(
        &mut self,
        photo: &RasterSource,
        transform: TransformState,
    ) -> PortraitResult<FrameRGBA> {
        let plan = self.plan(false).clone();
        let passes: Vec<Pass> = plan
            .passes
            .iter()
            .filter(|p| {
                matches!(p, Pass::DrawPhoto { target } | Pass::ApplyMask { target, .. }
                    if *target == plan.photo_surface)
            })
            .cloned()
            .collect();
        let sources = PassSources {
            background: None,
            photo,
            overlay: None,
            transform,
        };
        self.run(&plan, &passes, sources, plan.photo_surface)
    }

    fn run(
        &mut self,
        plan: &RenderPlan,
        passes: &[Pass],
        sources: PassSources<'_>,
        readback: SurfaceId,
    ) -> PortraitResult<FrameRGBA> {
        let t = sources.transform;
        check_finite("scale", t.scale)?;
        check_finite("offset_x", t.offset_x)?;
        check_finite("offset_y", t.offset_y)?;

        let mut surfaces = Vec::with_capacity(plan.surfaces.len());
        for desc in &plan.surfaces {
            match self.pool.borrow(*desc) {
                Ok(p) => surfaces.push(p),
                Err(e) => {
                    self.release_all(plan, surfaces);
                    return Err(e);
                }
            }
        }

        let mut result = Ok(());
        for pass in passes {
            result = self.exec_pass(pass, sources, &mut surfaces);
            if result.is_err() {
                break;
            }
        }
        let out = result.and_then(|()| {
            let pm = surface(&surfaces, readback)?;
            Ok(FrameRGBA {
                width: u32::from(pm.width()),
                height: u32::from(pm.height()),
                data: pm.data_as_u8_slice().to_vec(),
                premultiplied: true,
            })
        });

        self.release_all(plan, surfaces);
        out
    }

    fn release_all(&mut self, plan: &RenderPlan, surfaces: Vec<vello_cpu::Pixmap>) {
        for (desc, pm) in plan.surfaces.iter().zip(surfaces) {
            self.pool.release(*desc, pm);
        }
    }

    fn exec_pass(
        &mut self,
        pass: &Pass,
        sources: PassSources<'_>,
        surfaces: &mut [vello_cpu::Pixmap],
    ) -> PortraitResult<()> {
        match pass {
            Pass::Clear { target, color } => {
                let dst = surface_mut(surfaces, *target)?;
                fill_rgba8(dst.data_as_u8_slice_mut(), color.to_array());
                Ok(())
            }
            Pass::DrawPhoto { target } => {
                let dst = surface_mut(surfaces, *target)?;
                self.draw_photo(sources.photo, sources.transform, dst)
            }
            Pass::ApplyMask { target, mask } => {
                let dst = surface_mut(surfaces, *target)?;
                self.mask(*mask).apply_in_place(dst.data_as_u8_slice_mut())
            }
            Pass::Composite { target, ops } => {
                for op in ops {
                    match op {
                        CompositeOp::Background => {
                            let src = sources.background.ok_or_else(|| {
                                PortraitError::render("composite needs a background source")
                            })?;
                            self.composite_layer(SourceRole::Background, src, surfaces, *target)?;
                        }
                        CompositeOp::Overlay => {
                            let src = sources.overlay.ok_or_else(|| {
                                PortraitError::render("plan draws an overlay but none was given")
                            })?;
                            self.composite_layer(SourceRole::Overlay, src, surfaces, *target)?;
                        }
                        CompositeOp::Surface(id) => {
                            let (dst, src) = surface_pair_mut(surfaces, *target, *id)?;
                            premul_over_in_place(
                                dst.data_as_u8_slice_mut(),
                                src.data_as_u8_slice(),
                            )?;
                        }
                    }
                }
                Ok(())
            }
        }
    }

    fn draw_photo(
        &mut self,
        photo: &RasterSource,
        transform: TransformState,
        dst: &mut vello_cpu::Pixmap,
    ) -> PortraitResult<()> {
        dst.data_as_u8_slice_mut().fill(0);

        let g = self.geometry;
        let (pw, ph) = (photo.width(), photo.height());
        let rect = transform.placement(&g, pw, ph);
        // Zero or negative sizes draw nothing.
        if !(rect.width() > 0.0 && rect.height() > 0.0) {
            tracing::debug!(scale = transform.scale, "photo placement is empty");
            return Ok(());
        }

        let paint = pixmap_paint(self.photo_pixmap(photo)?);
        let tr = Affine::translate(rect.origin().to_vec2())
            * Affine::scale_non_uniform(rect.width() / f64::from(pw), rect.height() / f64::from(ph));
        let clip = circle_path_cpu(g.center, g.radius);

        self.with_ctx(dst.width(), dst.height(), |ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.push_clip_layer(&clip);
            ctx.set_transform(affine_to_cpu(tr));
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(pw),
                f64::from(ph),
            ));
            ctx.pop_layer();
            ctx.flush();
            ctx.render_to_pixmap(dst);
        });
        Ok(())
    }

    /// Upload the photo once per source identity; slider changes only redraw it.
    fn photo_pixmap(&mut self, photo: &RasterSource) -> PortraitResult<Arc<vello_cpu::Pixmap>> {
        if let Some((id, pixmap)) = &self.photo_pixmap
            && *id == photo.id()
        {
            return Ok(Arc::clone(pixmap));
        }
        let img = photo.image();
        let pixmap = Arc::new(pixmap_from_premul_bytes(
            &img.rgba8_premul,
            img.width,
            img.height,
        )?);
        self.photo_pixmap = Some((photo.id(), Arc::clone(&pixmap)));
        self.stats.photo_uploads = self.stats.photo_uploads.saturating_add(1);
        tracing::debug!(origin = %photo.origin(), "uploaded photo pixmap");
        Ok(pixmap)
    }

    fn mask(&mut self, shape: MaskShape) -> &AlphaMask {
        let (canvas, g) = (self.spec.canvas, self.geometry);
        let stats = &mut self.stats;
        self.masks.entry(shape).or_insert_with(|| {
            stats.mask_builds = stats.mask_builds.saturating_add(1);
            AlphaMask::build(shape, canvas, &g)
        })
    }

    fn composite_layer(
        &mut self,
        role: SourceRole,
        src: &RasterSource,
        surfaces: &mut [vello_cpu::Pixmap],
        target: SurfaceId,
    ) -> PortraitResult<()> {
        self.ensure_layer(role, src)?;
        let layer = self
            .layer(role)
            .ok_or_else(|| PortraitError::render(format!("no cached {role} layer")))?;
        let dst = surface_mut(surfaces, target)?;
        premul_over_in_place(dst.data_as_u8_slice_mut(), layer.data_as_u8_slice())
    }

    fn layer(&self, role: SourceRole) -> Option<&vello_cpu::Pixmap> {
        match role {
            SourceRole::Background => self.backdrop.as_ref().map(|l| &l.pixmap),
            SourceRole::Overlay => self.foreground.as_ref().map(|l| &l.pixmap),
            SourceRole::Photo => None,
        }
    }

    /// Stretch a full-canvas source to the canvas once per source identity.
    fn ensure_layer(&mut self, role: SourceRole, src: &RasterSource) -> PortraitResult<()> {
        let cached = match role {
            SourceRole::Background => self.backdrop.as_ref(),
            SourceRole::Overlay => self.foreground.as_ref(),
            SourceRole::Photo => {
                return Err(PortraitError::render("photo is not a full-canvas layer"));
            }
        };
        if cached.is_some_and(|l| l.source == src.id()) {
            return Ok(());
        }

        let canvas = self.spec.canvas;
        let (w, h): (u16, u16) = (
            canvas
                .width
                .try_into()
                .map_err(|_| PortraitError::render("canvas width exceeds u16"))?,
            canvas
                .height
                .try_into()
                .map_err(|_| PortraitError::render("canvas height exceeds u16"))?,
        );
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        pixmap.data_as_u8_slice_mut().fill(0);

        let paint = image_paint(src.image())?;
        let (sw, sh) = (f64::from(src.width()), f64::from(src.height()));
        let tr = Affine::scale_non_uniform(f64::from(canvas.width) / sw, f64::from(canvas.height) / sh);
        self.with_ctx(w, h, |ctx| {
            ctx.set_transform(affine_to_cpu(tr));
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, sw, sh));
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
        });

        self.stats.layer_rasterizations = self.stats.layer_rasterizations.saturating_add(1);
        tracing::debug!(%role, origin = %src.origin(), "rasterized full-canvas layer");
        let layer = Some(CachedLayer {
            source: src.id(),
            pixmap,
        });
        match role {
            SourceRole::Background => self.backdrop = layer,
            _ => self.foreground = layer,
        }
        Ok(())
    }

    fn with_ctx<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> R,
    ) -> R {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx);
        self.ctx = Some(ctx);
        out
    }
}

fn surface(surfaces: &[vello_cpu::Pixmap], id: SurfaceId) -> PortraitResult<&vello_cpu::Pixmap> {
    surfaces
        .get(id.0 as usize)
        .ok_or_else(|| PortraitError::render(format!("undeclared surface {}", id.0)))
}

fn surface_mut(
    surfaces: &mut [vello_cpu::Pixmap],
    id: SurfaceId,
) -> PortraitResult<&mut vello_cpu::Pixmap> {
    surfaces
        .get_mut(id.0 as usize)
        .ok_or_else(|| PortraitError::render(format!("undeclared surface {}", id.0)))
}

fn surface_pair_mut(
    surfaces: &mut [vello_cpu::Pixmap],
    dst: SurfaceId,
    src: SurfaceId,
) -> PortraitResult<(&mut vello_cpu::Pixmap, &vello_cpu::Pixmap)> {
    let (d, s) = (dst.0 as usize, src.0 as usize);
    if d == s || d >= surfaces.len() || s >= surfaces.len() {
        return Err(PortraitError::render(
            "composite needs two distinct declared surfaces",
        ));
    }
    if d < s {
        let (lo, hi) = surfaces.split_at_mut(s);
        Ok((&mut lo[d], &hi[0]))
    } else {
        let (lo, hi) = surfaces.split_at_mut(d);
        Ok((&mut hi[0], &lo[s]))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
