use std::io::Cursor;

use super::*;
use crate::assets::source::SourceOrigin;
use crate::foundation::error::PortraitError;

fn source(label: &str, rgba: [u8; 4]) -> RasterSource {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    RasterSource::decode(SourceOrigin::Buffer(label.to_string()), &buf).unwrap()
}

#[test]
fn stale_ticket_is_ignored() {
    let mut slot = SourceSlot::new(SourceRole::Photo);
    let old = slot.begin();
    let new = slot.begin();

    assert_eq!(
        slot.complete(old, Ok(source("old", [255, 0, 0, 255]))),
        SlotUpdate::Stale
    );
    assert!(slot.ready().is_none());

    assert_eq!(
        slot.complete(new, Ok(source("new", [0, 0, 255, 255]))),
        SlotUpdate::Ready { new_identity: true }
    );
    assert_eq!(
        slot.ready().unwrap().origin(),
        &SourceOrigin::Buffer("new".into())
    );
}

#[test]
fn ticket_for_other_role_is_stale() {
    let mut bg = SourceSlot::new(SourceRole::Background);
    let mut photo = SourceSlot::new(SourceRole::Photo);
    let _ = bg.begin();
    let t = photo.begin();
    assert_eq!(
        bg.complete(t, Ok(source("x", [0, 0, 0, 255]))),
        SlotUpdate::Stale
    );
}

#[test]
fn reloading_same_content_is_not_a_new_identity() {
    let mut slot = SourceSlot::new(SourceRole::Photo);
    let t = slot.begin();
    slot.complete(t, Ok(source("a", [1, 2, 3, 255])));
    let t = slot.begin();
    assert_eq!(
        slot.complete(t, Ok(source("a", [1, 2, 3, 255]))),
        SlotUpdate::Ready {
            new_identity: false
        }
    );
}

#[test]
fn failed_load_closes_slot() {
    let mut slot = SourceSlot::new(SourceRole::Background);
    let t = slot.begin();
    assert_eq!(
        slot.complete(t, Err(PortraitError::decode("bad bytes"))),
        SlotUpdate::Failed
    );
    assert!(slot.ready().is_none());
    assert!(slot.failure().unwrap().contains("bad bytes"));
}

#[test]
fn gate_waits_for_every_required_source() {
    let mut bg = SourceSlot::new(SourceRole::Background);
    let mut photo = SourceSlot::new(SourceRole::Photo);
    let mut overlay = SourceSlot::new(SourceRole::Overlay);

    assert_eq!(
        status(&bg, &photo, Some(&overlay)),
        GateStatus::Waiting(vec![
            SourceRole::Background,
            SourceRole::Photo,
            SourceRole::Overlay
        ])
    );

    let t = bg.begin();
    bg.complete(t, Ok(source("bg", [255, 0, 0, 255])));
    let t = photo.begin();
    photo.complete(t, Ok(source("me", [0, 0, 255, 255])));

    assert!(join(&bg, &photo, Some(&overlay)).is_none());
    assert_eq!(status(&bg, &photo, None), GateStatus::Open);
    assert!(join(&bg, &photo, None).unwrap().overlay.is_none());

    let t = overlay.begin();
    overlay.complete(t, Ok(source("ov", [0, 0, 0, 0])));
    let ready = join(&bg, &photo, Some(&overlay)).unwrap();
    assert!(ready.overlay.is_some());
    assert_eq!(status(&bg, &photo, Some(&overlay)), GateStatus::Open);
}

#[test]
fn pending_reload_closes_gate_until_complete() {
    let mut bg = SourceSlot::new(SourceRole::Background);
    let mut photo = SourceSlot::new(SourceRole::Photo);
    let t = bg.begin();
    bg.complete(t, Ok(source("bg", [255, 0, 0, 255])));
    let t = photo.begin();
    photo.complete(t, Ok(source("a", [0, 0, 255, 255])));
    assert!(join(&bg, &photo, None).is_some());

    let _pending = photo.begin();
    assert!(join(&bg, &photo, None).is_none());

    photo.clear();
    assert!(photo.ready().is_none() && photo.failure().is_none());
}
