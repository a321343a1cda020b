use std::collections::HashMap;

use crate::{
    foundation::error::{PortraitError, PortraitResult},
    render::plan::{PixelFormat, SurfaceDesc},
};

/// Pool configuration for cached surfaces.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SurfacePoolOpts {
    /// Maximum bytes retained across all buckets.
    pub(crate) max_pool_bytes: usize,
    /// Maximum number of retained surfaces per (w,h,format) bucket.
    pub(crate) max_surfaces_per_bucket: usize,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            // Two canvas-sized surfaces per render at 1500x1500 are ~18 MiB.
            max_pool_bytes: 64 * 1024 * 1024,
            max_surfaces_per_bucket: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SurfaceKey {
    w: u32,
    h: u32,
    format: PixelFormat,
}

impl SurfaceKey {
    fn from_desc(desc: SurfaceDesc) -> Self {
        Self {
            w: desc.width,
            h: desc.height,
            format: desc.format,
        }
    }

    fn byte_len(self) -> usize {
        let px = (self.w as usize).saturating_mul(self.h as usize);
        match self.format {
            PixelFormat::Rgba8Premul => px.saturating_mul(4),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct SurfacePoolStats {
    pub(crate) retained_surfaces: usize,
    pub(crate) retained_bytes: usize,
    pub(crate) alloc_surfaces: u64,
    pub(crate) dropped_on_release: u64,
}

/// Bounded pool of CPU pixmaps reused across renders.
///
/// Renders can arrive at slider-drag frequency; reusing surfaces keeps memory flat.
pub(crate) struct SurfacePool {
    opts: SurfacePoolOpts,
    stats: SurfacePoolStats,
    buckets: HashMap<SurfaceKey, Vec<vello_cpu::Pixmap>>,
}

impl SurfacePool {
    pub(crate) fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            opts,
            stats: SurfacePoolStats::default(),
            buckets: HashMap::new(),
        }
    }

    pub(crate) fn stats(&self) -> SurfacePoolStats {
        self.stats.clone()
    }

    /// Take a surface of `desc` size. Contents are unspecified; callers clear what they use.
    pub(crate) fn borrow(&mut self, desc: SurfaceDesc) -> PortraitResult<vello_cpu::Pixmap> {
        let key = SurfaceKey::from_desc(desc);
        if let Some(p) = self.buckets.get_mut(&key).and_then(Vec::pop) {
            self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(key.byte_len());
            return Ok(p);
        }

        let w: u16 = key.w.try_into().map_err(|_| {
            PortraitError::render(format!("surface width exceeds u16: {}", key.w))
        })?;
        let h: u16 = key.h.try_into().map_err(|_| {
            PortraitError::render(format!("surface height exceeds u16: {}", key.h))
        })?;
        self.stats.alloc_surfaces = self.stats.alloc_surfaces.saturating_add(1);
        Ok(vello_cpu::Pixmap::new(w, h))
    }

    pub(crate) fn release(&mut self, desc: SurfaceDesc, pixmap: vello_cpu::Pixmap) {
        let key = SurfaceKey::from_desc(desc);
        let bytes = key.byte_len();

        if self.opts.max_surfaces_per_bucket == 0
            || self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes
        {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bucket = self.buckets.entry(key).or_default();
        if bucket.len() >= self.opts.max_surfaces_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.push(pixmap);
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface_pool.rs"]
mod tests;
