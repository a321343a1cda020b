use std::io::Cursor;
use std::sync::Arc;

use image::ImageDecoder as _;

use crate::{
    assets::source::PreparedImage,
    foundation::core::MAX_SURFACE_EDGE,
    foundation::error::{PortraitError, PortraitResult},
};

/// Decode encoded image bytes (PNG, JPEG, ...) into premultiplied RGBA8.
///
/// Images whose edges exceed the raster surface limit are rejected here so that a source which
/// made it past loading can always be drawn.
pub fn decode_image(bytes: &[u8]) -> PortraitResult<PreparedImage> {
    if bytes.is_empty() {
        return Err(PortraitError::decode("image buffer is empty"));
    }
    let mut decoder = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PortraitError::decode(format!("sniff image format: {e}")))?
        .into_decoder()
        .map_err(|e| PortraitError::decode(format!("decode image from memory: {e}")))?;
    // Camera photos are commonly stored sideways with an EXIF orientation tag.
    let orientation = decoder
        .orientation()
        .map_err(|e| PortraitError::decode(format!("read image orientation: {e}")))?;
    let mut dyn_img = image::DynamicImage::from_decoder(decoder)
        .map_err(|e| PortraitError::decode(format!("decode image from memory: {e}")))?;
    dyn_img.apply_orientation(orientation);
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(PortraitError::decode("decoded image has no pixels"));
    }
    if width > MAX_SURFACE_EDGE || height > MAX_SURFACE_EDGE {
        return Err(PortraitError::decode(format!(
            "image {width}x{height} exceeds the {MAX_SURFACE_EDGE}px raster limit"
        )));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
