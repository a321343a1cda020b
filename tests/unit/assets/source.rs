use std::io::Cursor;

use super::*;

fn solid_png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn identity_depends_on_origin_and_content() {
    let a = solid_png(2, 2, [255, 0, 0, 255]);
    let b = solid_png(2, 2, [0, 0, 255, 255]);
    let up = SourceOrigin::Buffer("upload".to_string());
    let asset = SourceOrigin::Embedded("upload".to_string());

    assert_eq!(SourceId::for_content(&up, &a), SourceId::for_content(&up, &a));
    assert_ne!(SourceId::for_content(&up, &a), SourceId::for_content(&up, &b));
    assert_ne!(SourceId::for_content(&up, &a), SourceId::for_content(&asset, &a));
}

#[test]
fn decode_keeps_dimensions_and_origin() {
    let bytes = solid_png(8, 4, [0, 255, 0, 255]);
    let src = RasterSource::decode(SourceOrigin::Buffer("me.png".into()), &bytes).unwrap();
    assert_eq!((src.width(), src.height()), (8, 4));
    assert_eq!(src.origin().to_string(), "buffer:me.png");
    assert_eq!(src.image().rgba8_premul.len(), 8 * 4 * 4);
}

#[test]
fn decode_failure_surfaces_as_error() {
    let err = RasterSource::decode(SourceOrigin::Buffer("x".into()), b"nope").unwrap_err();
    assert!(err.to_string().contains("decode error"));
}
