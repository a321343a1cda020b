use std::io::Cursor;
use std::path::Path;

use anyhow::Context as _;

use crate::{
    foundation::error::{PortraitError, PortraitResult},
    render::frame::FrameRGBA,
};

/// An encoded export ready to be offered as a download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name, e.g. `profile-photo.png`.
    pub file_name: String,
    /// PNG bytes.
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write the PNG to `path`, creating missing parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> PortraitResult<()> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write export '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = self.bytes.len(), "export saved");
        Ok(())
    }
}

/// Encode a frame as an RGBA8 PNG. Premultiplied frames are converted to straight alpha first.
#[tracing::instrument(skip(frame), fields(width = frame.width, height = frame.height))]
pub fn encode_png(frame: &FrameRGBA) -> PortraitResult<Vec<u8>> {
    let expected = (frame.width as usize)
        .checked_mul(frame.height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| PortraitError::encode("frame dimensions overflow"))?;
    if frame.width == 0 || frame.height == 0 || frame.data.len() != expected {
        return Err(PortraitError::encode(format!(
            "frame data has {} bytes, expected {expected} for {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba8())
        .ok_or_else(|| PortraitError::encode("frame buffer does not match its dimensions"))?;
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| PortraitError::encode(format!("png: {e}")))?;
    Ok(out)
}

pub(crate) fn ensure_parent_dir(path: &Path) -> PortraitResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/png.rs"]
mod tests;
