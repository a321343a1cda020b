use super::*;
use crate::composition::spec::CompositionSpec;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn default_is_identity_placement() {
    let t = TransformState::default();
    assert_eq!((t.scale, t.offset_x, t.offset_y), (1.0, 0.0, 0.0));
}

#[test]
fn unit_scale_without_offset_centers_photo_on_mask() {
    let g = CompositionSpec::default().geometry();
    let r = TransformState::default().placement(&g, 800, 800);
    assert_eq!(r.center(), g.center);
    assert!(approx(r.width(), 2.0 * g.radius));
    assert!(approx(r.height(), 2.0 * g.radius));
}

#[test]
fn width_follows_scale_and_height_keeps_aspect() {
    let g = CompositionSpec::default().geometry();
    for scale in [0.5, 1.0, 1.75, 3.0] {
        let t = TransformState::new(scale, 35.0, -20.0).unwrap();
        let r = t.placement(&g, 400, 600);
        assert!(approx(r.width(), 2.0 * g.radius * scale));
        assert!(approx(r.height(), r.width() * 1.5));
        assert!(approx(r.center().x, g.center.x + 35.0));
        assert!(approx(r.center().y, g.center.y - 20.0));
    }
}

#[test]
fn non_finite_parameters_are_rejected() {
    assert!(TransformState::new(f64::NAN, 0.0, 0.0).is_err());
    assert!(TransformState::new(1.0, f64::INFINITY, 0.0).is_err());
    assert!(TransformState::new(1.0, 0.0, f64::NEG_INFINITY).is_err());
    assert!(TransformState::new(7.5, -900.0, 900.0).is_ok());
}

#[test]
fn snapped_clamps_and_quantizes() {
    let t = TransformState::new(1.234, 12.6, -999.0).unwrap().snapped();
    assert!(approx(t.scale, 1.25));
    assert!(approx(t.offset_x, 15.0));
    assert!(approx(t.offset_y, OFFSET_MIN));

    let t = TransformState::new(0.1, 300.0, 2.4).unwrap().snapped();
    assert!(approx(t.scale, SCALE_MIN));
    assert!(approx(t.offset_x, OFFSET_MAX));
    assert!(approx(t.offset_y, 0.0));
}
