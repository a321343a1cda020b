use super::*;

fn frame(w: u32, h: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied: true,
    }
}

#[test]
fn png_decodes_back_to_same_size_and_pixels() {
    let bytes = encode_png(&frame(3, 2, [0, 0, 255, 255])).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (3, 2));
    assert!(img.pixels().all(|p| p.0 == [0, 0, 255, 255]));
}

#[test]
fn premultiplied_pixels_are_unpremultiplied() {
    let bytes = encode_png(&frame(1, 1, [64, 0, 0, 128])).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [128, 0, 0, 128]);
}

#[test]
fn mismatched_buffer_is_an_encode_error() {
    let mut f = frame(2, 2, [0, 0, 0, 255]);
    f.data.pop();
    assert!(matches!(encode_png(&f), Err(PortraitError::Encode(_))));
}

#[test]
fn save_creates_parent_directories() {
    let dir = std::env::temp_dir().join(format!("portrait-frame-export-{}", std::process::id()));
    let path = dir.join("nested").join("profile-photo.png");
    let artifact = ExportArtifact {
        file_name: "profile-photo.png".to_string(),
        bytes: encode_png(&frame(1, 1, [255, 255, 255, 255])).unwrap(),
    };
    artifact.save(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes);
    let _ = std::fs::remove_dir_all(&dir);
}
