use std::io::Cursor;

use super::*;
use crate::assets::store::PresetEntry;
use crate::composition::spec::CompositionSpec;
use crate::foundation::core::Canvas;

fn config() -> EditorConfig {
    EditorConfig {
        spec: CompositionSpec {
            canvas: Canvas {
                width: 64,
                height: 64,
            },
            mask_radius: 20.0,
            vertical_bias: -4.0,
            feather_width: 2.0,
            fade_band_height: 6.0,
            bottom_fade: true,
        },
        presets: vec![PresetEntry {
            id: "p1".to_string(),
            label: "Preset one".to_string(),
            path: "presets/p1.png".to_string(),
        }],
        ..EditorConfig::default()
    }
}

fn png(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn ready_session() -> EditorSession {
    let mut s = EditorSession::new(config()).unwrap();
    let t = s.begin_load(SourceRole::Background);
    s.complete_load(t, SourceOrigin::Embedded("bg.png".into()), &png([255, 0, 0, 255]));
    s.load_photo_bytes("me.png", &png([0, 0, 255, 255]));
    s
}

#[test]
fn invalid_config_is_rejected() {
    let mut cfg = config();
    cfg.spec.canvas.width = 0;
    assert!(EditorSession::new(cfg).is_err());
}

#[test]
fn gate_waits_for_missing_sources() {
    let mut s = EditorSession::new(config()).unwrap();
    assert_eq!(
        s.gate_status(),
        GateStatus::Waiting(vec![SourceRole::Background, SourceRole::Photo])
    );
    assert!(s.render_if_ready().is_none());

    let s2 = ready_session();
    assert_eq!(s2.gate_status(), GateStatus::Open);

    s = s2;
    let _ticket = s.begin_load(SourceRole::Overlay);
    assert_eq!(s.gate_status(), GateStatus::Waiting(vec![SourceRole::Overlay]));
}

#[test]
fn unchanged_setters_do_not_mark_dirty() {
    let mut s = ready_session();
    assert!(s.render_if_ready().is_some());
    assert!(!s.is_dirty());

    s.set_scale(1.0).unwrap();
    s.set_offset_x(0.0).unwrap();
    s.set_offset_y(0.0).unwrap();
    assert!(!s.is_dirty());

    s.set_scale(1.5).unwrap();
    s.set_scale(2.0).unwrap();
    assert!(s.is_dirty());
    s.render_if_ready();
    assert_eq!(s.render_stats().renders, 2);
}

#[test]
fn non_finite_values_leave_transform_untouched() {
    let mut s = ready_session();
    s.set_offset_x(10.0).unwrap();
    assert!(s.set_scale(f64::INFINITY).is_err());
    assert!(
        s.set_transform(TransformState {
            scale: 1.0,
            offset_x: f64::NAN,
            offset_y: 0.0
        })
        .is_err()
    );
    assert_eq!(s.transform(), TransformState::new(1.0, 10.0, 0.0).unwrap());
}

#[test]
fn new_photo_resets_transform_but_same_photo_does_not() {
    let mut s = ready_session();
    s.set_transform(TransformState::new(2.0, 15.0, -20.0).unwrap())
        .unwrap();

    s.load_photo_bytes("me.png", &png([0, 0, 255, 255]));
    assert_eq!(s.transform().scale, 2.0);

    s.load_photo_bytes("other.png", &png([0, 255, 0, 255]));
    assert_eq!(s.transform(), TransformState::default());
}

#[test]
fn unknown_preset_and_missing_store_are_errors() {
    let mut s = EditorSession::new(config()).unwrap();
    assert!(matches!(
        s.load_preset("nope"),
        Err(PortraitError::Validation(_))
    ));
    assert!(matches!(
        s.load_preset("p1"),
        Err(PortraitError::Validation(_))
    ));
}

#[test]
fn unreadable_asset_is_a_silent_failure() {
    let dir = std::env::temp_dir().join(format!("portrait-frame-session-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let mut s = EditorSession::new(config())
        .unwrap()
        .with_store(AssetStore::new(&dir));

    assert_eq!(s.load_preset("p1").unwrap(), SlotUpdate::Failed);
    assert!(s.load_failure(SourceRole::Photo).is_some());
    assert!(!s.has_photo());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn clear_photo_drops_preview_and_export() {
    let mut s = ready_session();
    assert!(s.render_if_ready().is_some());
    s.clear_photo();
    assert!(s.last_frame().is_none());
    assert!(s.export_png().unwrap().is_none());
}
