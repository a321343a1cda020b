//! portrait-frame composes a user portrait into a fixed circular frame on a branded background
//! and exports the result as a PNG.
//!
//! # Pipeline overview
//!
//! 1. **Load**: encoded bytes (upload, preset or packaged asset) become a [`RasterSource`]
//!    through the load gate of an [`EditorSession`]
//! 2. **Plan**: [`CompositionSpec`] compiles to a [`RenderPlan`] (ordered full-canvas passes)
//! 3. **Render**: [`Compositor`] executes the plan into a premultiplied [`FrameRGBA`]
//! 4. **Export**: [`encode_png`] turns the frame into PNG bytes ([`ExportArtifact`])
//!
//! Rendering is deterministic: the same sources, [`TransformState`] and [`CompositionSpec`]
//! always produce the same bytes. The library never installs a `tracing` subscriber.
#![forbid(unsafe_code)]

mod assets;
mod composition;
mod export;
mod foundation;
mod render;
mod session;

pub use assets::decode::decode_image;
pub use assets::gate::{GateStatus, LoadTicket, SlotUpdate};
pub use assets::source::{PreparedImage, RasterSource, SourceId, SourceOrigin, SourceRole};
pub use assets::store::{AssetStore, PresetCatalog, PresetEntry, normalize_rel_path};
pub use composition::config::{DEFAULT_EXPORT_FILE_NAME, EditorConfig};
pub use composition::spec::{CompositionSpec, MaskGeometry};
pub use composition::transform::{
    OFFSET_MAX, OFFSET_MIN, OFFSET_STEP, SCALE_MAX, SCALE_MIN, SCALE_STEP, TransformState,
};
pub use export::png::{ExportArtifact, encode_png};
pub use foundation::core::{Affine, Canvas, MAX_SURFACE_EDGE, Point, Rect, Rgba8Premul, Vec2};
pub use foundation::error::{PortraitError, PortraitResult};
pub use render::compositor::{Compositor, RenderInputs, RenderStats};
pub use render::frame::FrameRGBA;
pub use render::masks::{BOTTOM_FADE_STOPS, MaskShape, bottom_fade_alpha, feather_alpha};
pub use render::plan::{
    CompositeOp, Pass, PixelFormat, RenderPlan, SurfaceDesc, SurfaceId, compile_plan,
};
pub use session::editor::EditorSession;
