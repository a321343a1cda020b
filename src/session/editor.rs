//! Editing state around the compositor.
//!
//! The session is the single owner of everything that changes while a user edits: the three
//! source slots, the transform and the last good frame. Input handlers call setters and loaders;
//! a controller calls [`EditorSession::render_if_ready`] when it wants a fresh preview. Repeated
//! setter calls between two renders collapse into one render through the dirty flag.

use crate::{
    assets::gate::{self, GateStatus, LoadTicket, SlotUpdate, SourceSlot},
    assets::source::{RasterSource, SourceOrigin, SourceRole},
    assets::store::{AssetStore, PresetCatalog, normalize_rel_path},
    composition::config::EditorConfig,
    composition::transform::{TransformState, check_finite},
    export::png::{ExportArtifact, encode_png},
    foundation::error::{PortraitError, PortraitResult},
    render::compositor::{Compositor, RenderInputs, RenderStats},
    render::frame::FrameRGBA,
};

pub struct EditorSession {
    config: EditorConfig,
    presets: PresetCatalog,
    store: Option<AssetStore>,
    compositor: Compositor,

    background: SourceSlot,
    photo: SourceSlot,
    photo_selected: bool,
    overlay: Option<SourceSlot>,

    transform: TransformState,
    dirty: bool,
    last_frame: Option<FrameRGBA>,
}

impl EditorSession {
    /// Validate `config` and set up the compositor.
    ///
    /// Fails only when the configuration cannot back a surface or is otherwise invalid.
    pub fn new(config: EditorConfig) -> PortraitResult<Self> {
        config.validate()?;
        let presets = config.preset_catalog()?;
        let compositor = Compositor::new(config.spec, config.clear_rgba)?;
        let overlay = config
            .overlay
            .as_ref()
            .map(|_| SourceSlot::new(SourceRole::Overlay));
        Ok(Self {
            config,
            presets,
            store: None,
            compositor,
            background: SourceSlot::new(SourceRole::Background),
            photo: SourceSlot::new(SourceRole::Photo),
            photo_selected: false,
            overlay,
            transform: TransformState::default(),
            dirty: false,
            last_frame: None,
        })
    }

    /// Resolve embedded assets and presets through `store`.
    pub fn with_store(mut self, store: AssetStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn presets(&self) -> &PresetCatalog {
        &self.presets
    }

    pub fn render_stats(&self) -> RenderStats {
        self.compositor.stats()
    }

    // ---- loading ----

    /// Start loading a source into `role`, superseding any load in flight for that role.
    ///
    /// Starting an overlay load on a session without a configured overlay adds one: from then on
    /// renders wait for it.
    pub fn begin_load(&mut self, role: SourceRole) -> LoadTicket {
        tracing::debug!(%role, "begin load");
        if role == SourceRole::Photo {
            self.photo_selected = true;
        }
        self.slot_mut(role).begin()
    }

    /// Decode `bytes` and complete the load for `ticket`.
    ///
    /// Decode failures are not returned: the slot is marked failed, a warning is logged and the
    /// last good frame stays visible.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        origin: SourceOrigin,
        bytes: &[u8],
    ) -> SlotUpdate {
        let decoded = RasterSource::decode(origin, bytes);
        self.finish(ticket, decoded)
    }

    /// Complete the load for `ticket` as failed.
    pub fn fail_load(&mut self, ticket: LoadTicket, reason: impl Into<String>) -> SlotUpdate {
        self.finish(ticket, Err(PortraitError::decode(reason)))
    }

    /// Load a user photo from encoded bytes (file picker upload).
    pub fn load_photo_bytes(&mut self, label: impl Into<String>, bytes: &[u8]) -> SlotUpdate {
        let ticket = self.begin_load(SourceRole::Photo);
        self.complete_load(ticket, SourceOrigin::Buffer(label.into()), bytes)
    }

    /// Load one of the preset photos by id.
    pub fn load_preset(&mut self, id: &str) -> PortraitResult<SlotUpdate> {
        let path = self
            .presets
            .get(id)
            .map(|e| e.path.clone())
            .ok_or_else(|| PortraitError::validation(format!("unknown preset '{id}'")))?;
        self.load_embedded(SourceRole::Photo, &path)
    }

    /// Load a packaged asset into `role` through the asset store.
    ///
    /// Errors are returned for caller mistakes (no store, invalid path); a missing or unreadable
    /// file is a silent load failure like any other.
    pub fn load_embedded(&mut self, role: SourceRole, path: &str) -> PortraitResult<SlotUpdate> {
        let norm = normalize_rel_path(path)?;
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| PortraitError::validation("no asset store configured"))?;
        let read = store.read_bytes(&norm);

        let ticket = self.begin_load(role);
        Ok(match read {
            Ok(bytes) => self.complete_load(ticket, SourceOrigin::Embedded(norm), &bytes),
            Err(e) => self.finish(ticket, Err(e)),
        })
    }

    /// Load the configured background and overlay.
    pub fn load_configured_assets(&mut self) -> PortraitResult<()> {
        let background = self.config.background.clone();
        self.load_embedded(SourceRole::Background, &background)?;
        if let Some(overlay) = self.config.overlay.clone() {
            self.load_embedded(SourceRole::Overlay, &overlay)?;
        }
        Ok(())
    }

    /// Deselect the user photo. The preview is dropped and export yields nothing.
    pub fn clear_photo(&mut self) {
        self.photo.clear();
        self.photo_selected = false;
        self.transform = TransformState::default();
        self.last_frame = None;
        self.dirty = false;
    }

    fn finish(&mut self, ticket: LoadTicket, result: PortraitResult<RasterSource>) -> SlotUpdate {
        let role = ticket.role();
        let update = self.slot_mut(role).complete(ticket, result);
        if let SlotUpdate::Ready { new_identity } = update {
            if role == SourceRole::Photo && new_identity {
                tracing::debug!("new photo identity, transform reset");
                self.transform = TransformState::default();
            }
            self.dirty = true;
        }
        update
    }

    fn slot_mut(&mut self, role: SourceRole) -> &mut SourceSlot {
        match role {
            SourceRole::Background => &mut self.background,
            SourceRole::Photo => &mut self.photo,
            SourceRole::Overlay => self
                .overlay
                .get_or_insert_with(|| SourceSlot::new(SourceRole::Overlay)),
        }
    }

    /// Why the last load of `role` failed, if it did.
    pub fn load_failure(&self, role: SourceRole) -> Option<&str> {
        match role {
            SourceRole::Background => self.background.failure(),
            SourceRole::Photo => self.photo.failure(),
            SourceRole::Overlay => self.overlay.as_ref().and_then(|s| s.failure()),
        }
    }

    pub fn has_photo(&self) -> bool {
        self.photo.ready().is_some()
    }

    pub fn gate_status(&self) -> GateStatus {
        gate::status(&self.background, &self.photo, self.overlay.as_ref())
    }

    // ---- transform ----

    pub fn transform(&self) -> TransformState {
        self.transform
    }

    pub fn set_scale(&mut self, scale: f64) -> PortraitResult<()> {
        check_finite("scale", scale)?;
        self.update_transform(TransformState {
            scale,
            ..self.transform
        });
        Ok(())
    }

    pub fn set_offset_x(&mut self, offset_x: f64) -> PortraitResult<()> {
        check_finite("offset_x", offset_x)?;
        self.update_transform(TransformState {
            offset_x,
            ..self.transform
        });
        Ok(())
    }

    pub fn set_offset_y(&mut self, offset_y: f64) -> PortraitResult<()> {
        check_finite("offset_y", offset_y)?;
        self.update_transform(TransformState {
            offset_y,
            ..self.transform
        });
        Ok(())
    }

    /// Replace the whole transform; rejected without change if any value is non-finite.
    pub fn set_transform(&mut self, t: TransformState) -> PortraitResult<()> {
        let t = TransformState::new(t.scale, t.offset_x, t.offset_y)?;
        self.update_transform(t);
        Ok(())
    }

    fn update_transform(&mut self, t: TransformState) {
        if t != self.transform {
            self.transform = t;
            self.dirty = true;
        }
    }

    // ---- rendering ----

    /// Whether a change is waiting for the next render.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_frame(&self) -> Option<&FrameRGBA> {
        self.last_frame.as_ref()
    }

    /// Render once if something changed and all required sources are decoded.
    ///
    /// Returns the newest frame, which is the last good one when nothing could be rendered.
    pub fn render_if_ready(&mut self) -> Option<&FrameRGBA> {
        if self.dirty {
            match self.render_now() {
                Ok(true) => {}
                Ok(false) => tracing::debug!(status = ?self.gate_status(), "render waiting on sources"),
                Err(e) => {
                    tracing::warn!(error = %e, "render failed, keeping last frame");
                    self.dirty = false;
                }
            }
        }
        self.last_frame.as_ref()
    }

    /// Render with the current transform; `Ok(false)` when the gate is closed.
    fn render_now(&mut self) -> PortraitResult<bool> {
        let Some(ready) = gate::join(&self.background, &self.photo, self.overlay.as_ref()) else {
            return Ok(false);
        };
        let frame = self.compositor.render(&RenderInputs {
            background: &ready.background,
            photo: &ready.photo,
            overlay: ready.overlay.as_deref(),
            transform: self.transform,
        })?;
        self.last_frame = Some(frame);
        self.dirty = false;
        Ok(true)
    }

    /// Encode the current composite as PNG.
    ///
    /// Renders first when the preview is stale and all sources are decoded; otherwise the frame
    /// on screen is exported as is, including the last good frame after a failed or pending photo
    /// replacement. Yields `None` while no photo is selected or nothing was rendered yet.
    #[tracing::instrument(skip(self))]
    pub fn export_png(&mut self) -> PortraitResult<Option<ExportArtifact>> {
        if !self.photo_selected {
            tracing::debug!("export skipped, no photo selected");
            return Ok(None);
        }
        if (self.dirty || self.last_frame.is_none()) && !self.render_now()? {
            tracing::debug!(status = ?self.gate_status(), "sources not ready, exporting last frame");
        }
        let Some(frame) = self.last_frame.as_ref() else {
            tracing::debug!("export skipped, nothing rendered yet");
            return Ok(None);
        };
        let bytes = encode_png(frame)?;
        tracing::debug!(bytes = bytes.len(), "export encoded");
        Ok(Some(ExportArtifact {
            file_name: self.config.export_file_name.clone(),
            bytes,
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
