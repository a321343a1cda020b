use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    assets::source::{RasterSource, SourceOrigin},
    foundation::error::{PortraitError, PortraitResult},
};

/// Resolves packaged assets (background, overlay, preset photos) below a root directory.
#[derive(Clone, Debug)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    /// Create a store that resolves relative asset paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return root directory used when resolving relative asset paths.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read raw bytes for a relative asset path.
    pub fn read_bytes(&self, rel: &str) -> PortraitResult<Vec<u8>> {
        let norm = normalize_rel_path(rel)?;
        let p = self.root.join(Path::new(&norm));
        let bytes =
            std::fs::read(&p).with_context(|| format!("read asset '{}'", p.display()))?;
        Ok(bytes)
    }

    /// Read and decode a relative asset path into a [`RasterSource`].
    pub fn load(&self, rel: &str) -> PortraitResult<RasterSource> {
        let norm = normalize_rel_path(rel)?;
        let bytes = self.read_bytes(&norm)?;
        RasterSource::decode(SourceOrigin::Embedded(norm), &bytes)
    }
}

/// One selectable preset portrait.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PresetEntry {
    /// Stable identifier used by callers.
    pub id: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Relative asset path of the image.
    pub path: String,
}

/// Fixed catalog of preset portraits, in display order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PresetCatalog {
    entries: Vec<PresetEntry>,
}

impl PresetCatalog {
    /// Build a catalog, rejecting duplicate ids and invalid paths.
    pub fn new(entries: Vec<PresetEntry>) -> PortraitResult<Self> {
        for (i, e) in entries.iter().enumerate() {
            if e.id.trim().is_empty() {
                return Err(PortraitError::validation("preset id must be non-empty"));
            }
            normalize_rel_path(&e.path)?;
            if entries[..i].iter().any(|prev| prev.id == e.id) {
                return Err(PortraitError::validation(format!(
                    "duplicate preset id '{}'",
                    e.id
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PresetEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&PresetEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalize a relative asset path (slashes, `.` segments) and reject escapes from the root.
pub fn normalize_rel_path(source: &str) -> PortraitResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(PortraitError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(PortraitError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PortraitError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PortraitError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
