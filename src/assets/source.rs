use std::sync::Arc;

use crate::{
    assets::decode::decode_image, foundation::error::PortraitResult, foundation::math::Fnv1a64,
};

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Where a raster source came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceOrigin {
    /// A packaged asset addressed by a normalized relative path.
    Embedded(String),
    /// A caller-provided buffer (file picker upload); the label is informational.
    Buffer(String),
}

impl SourceOrigin {
    fn tag(&self) -> u8 {
        match self {
            Self::Embedded(_) => 1,
            Self::Buffer(_) => 2,
        }
    }

    fn label(&self) -> &str {
        match self {
            Self::Embedded(s) | Self::Buffer(s) => s,
        }
    }
}

impl std::fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedded(p) => write!(f, "asset:{p}"),
            Self::Buffer(l) => write!(f, "buffer:{l}"),
        }
    }
}

/// Stable identity of a raster source: origin plus encoded content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceId(pub(crate) u64);

impl SourceId {
    /// Derive the identity of `bytes` loaded from `origin`.
    pub fn for_content(origin: &SourceOrigin, bytes: &[u8]) -> Self {
        let mut h = Fnv1a64::new_default();
        h.write_u8(origin.tag());
        h.write_bytes(origin.label().as_bytes());
        h.write_u8(0);
        h.write_u64(bytes.len() as u64);
        h.write_bytes(bytes);
        Self(h.finish())
    }

    /// Access raw 64-bit identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Which layer of the composite a source feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceRole {
    /// Full-canvas branded background, drawn first.
    Background,
    /// The user's portrait, drawn inside the circular mask.
    Photo,
    /// Optional full-canvas foreground graphic, drawn last.
    Overlay,
}

impl std::fmt::Display for SourceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Background => "background",
            Self::Photo => "photo",
            Self::Overlay => "overlay",
        })
    }
}

/// An immutable, fully decoded image ready for compositing.
#[derive(Clone, Debug)]
pub struct RasterSource {
    id: SourceId,
    origin: SourceOrigin,
    image: PreparedImage,
}

impl RasterSource {
    /// Decode `bytes` and tag the result with its identity.
    pub fn decode(origin: SourceOrigin, bytes: &[u8]) -> PortraitResult<Self> {
        let image = decode_image(bytes)?;
        Ok(Self {
            id: SourceId::for_content(&origin, bytes),
            origin,
            image,
        })
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn origin(&self) -> &SourceOrigin {
        &self.origin
    }

    pub fn width(&self) -> u32 {
        self.image.width
    }

    pub fn height(&self) -> u32 {
        self.image.height
    }

    /// Decoded premultiplied pixels.
    pub fn image(&self) -> &PreparedImage {
        &self.image
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
