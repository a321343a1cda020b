use super::*;

#[test]
fn empty_document_yields_defaults() {
    let cfg = EditorConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, EditorConfig::default());
    assert_eq!(cfg.export_file_name, "profile-photo.png");
    assert_eq!(cfg.clear_rgba, Some([255, 255, 255, 255]));
}

#[test]
fn full_document_parses() {
    let cfg = EditorConfig::from_json_str(
        r#"{
            "spec": { "canvas": { "width": 600, "height": 600 }, "mask_radius": 120.0,
                      "vertical_bias": 0.0, "feather_width": 8.0, "fade_band_height": 40.0,
                      "bottom_fade": false },
            "background": "brand/bg.png",
            "overlay": "brand/overlay.png",
            "presets": [ { "id": "p1", "label": "Preset 1", "path": "presets/p1.jpg" } ],
            "export_file_name": "avatar.png",
            "clear_rgba": null
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.spec.canvas.width, 600);
    assert!(!cfg.spec.bottom_fade);
    assert_eq!(cfg.overlay.as_deref(), Some("brand/overlay.png"));
    assert_eq!(cfg.preset_catalog().unwrap().get("p1").unwrap().label, "Preset 1");
    assert_eq!(cfg.clear_rgba, None);
}

#[test]
fn invalid_documents_are_validation_errors() {
    for doc in [
        r#"{ "background": "../escape.png" }"#,
        r#"{ "overlay": "/abs.png" }"#,
        r#"{ "export_file_name": "  " }"#,
        r#"{ "spec": { "mask_radius": -1.0 } }"#,
        r#"{ "unknown_key": 1 }"#,
        r#"{ "presets": [ { "id": "a", "path": "a.png" }, { "id": "a", "path": "b.png" } ] }"#,
        "not json",
    ] {
        let err = EditorConfig::from_json_str(doc).unwrap_err();
        assert!(
            matches!(err, PortraitError::Validation(_)),
            "expected validation error for {doc}: {err}"
        );
    }
}

#[test]
fn json_roundtrip_preserves_config() {
    let mut cfg = EditorConfig::default();
    cfg.overlay = Some("images/frame.png".to_string());
    let back = EditorConfig::from_json_str(&cfg.to_json_pretty().unwrap()).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn from_path_reports_missing_file() {
    let err = EditorConfig::from_path("/definitely/not/here/config.json").unwrap_err();
    assert!(err.to_string().contains("config.json"));
}
