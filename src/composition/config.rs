use std::path::Path;

use anyhow::Context;

use crate::{
    assets::store::{PresetCatalog, PresetEntry, normalize_rel_path},
    composition::spec::CompositionSpec,
    foundation::error::{PortraitError, PortraitResult},
};

/// File name offered for the exported PNG unless configured otherwise.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "profile-photo.png";

/// Editor configuration, usually loaded from a JSON file shipped next to the assets.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Canvas and mask constants.
    pub spec: CompositionSpec,
    /// Relative path of the background asset.
    pub background: String,
    /// Relative path of the optional overlay asset.
    pub overlay: Option<String>,
    /// Preset portraits offered next to the upload option.
    pub presets: Vec<PresetEntry>,
    /// Suggested file name of the exported PNG.
    pub export_file_name: String,
    /// Straight RGBA8 color the canvas is cleared to before the background; `None` keeps it
    /// transparent.
    pub clear_rgba: Option<[u8; 4]>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            spec: CompositionSpec::default(),
            background: "images/bg.png".to_string(),
            overlay: None,
            presets: Vec::new(),
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            clear_rgba: Some([255, 255, 255, 255]),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> PortraitResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| PortraitError::validation(format!("invalid editor config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> PortraitResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read editor config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> PortraitResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PortraitError::validation(format!("serialize editor config: {e}")))
    }

    pub fn validate(&self) -> PortraitResult<()> {
        self.spec.validate()?;
        normalize_rel_path(&self.background)?;
        if let Some(o) = &self.overlay {
            normalize_rel_path(o)?;
        }
        if self.export_file_name.trim().is_empty() {
            return Err(PortraitError::validation(
                "export_file_name must be non-empty",
            ));
        }
        PresetCatalog::new(self.presets.clone())?;
        Ok(())
    }

    /// Preset catalog described by this config.
    pub fn preset_catalog(&self) -> PortraitResult<PresetCatalog> {
        PresetCatalog::new(self.presets.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/config.rs"]
mod tests;
