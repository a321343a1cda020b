use super::*;

#[test]
fn full_plan_orders_passes_bottom_to_top() {
    let spec = CompositionSpec::default();
    let white = Rgba8Premul::from_straight_rgba(255, 255, 255, 255);
    let plan = compile_plan(&spec, Some(white), true);

    assert_eq!(plan.surfaces.len(), 2);
    assert!(plan.surfaces.iter().all(|d| d.width == 1500 && d.height == 1500));
    assert_eq!(
        plan.passes,
        vec![
            Pass::Clear {
                target: FINAL_SURFACE,
                color: white
            },
            Pass::DrawPhoto {
                target: PHOTO_SURFACE
            },
            Pass::ApplyMask {
                target: PHOTO_SURFACE,
                mask: MaskShape::Feather
            },
            Pass::ApplyMask {
                target: PHOTO_SURFACE,
                mask: MaskShape::BottomFade
            },
            Pass::Composite {
                target: FINAL_SURFACE,
                ops: vec![
                    CompositeOp::Background,
                    CompositeOp::Surface(PHOTO_SURFACE),
                    CompositeOp::Overlay
                ]
            },
        ]
    );
}

#[test]
fn plan_without_fade_or_overlay_skips_those_steps() {
    let spec = CompositionSpec {
        bottom_fade: false,
        ..CompositionSpec::default()
    };
    let plan = compile_plan(&spec, None, false);

    assert!(!plan.passes.iter().any(|p| matches!(
        p,
        Pass::ApplyMask {
            mask: MaskShape::BottomFade,
            ..
        }
    )));
    assert_eq!(
        plan.passes.first(),
        Some(&Pass::Clear {
            target: FINAL_SURFACE,
            color: Rgba8Premul::transparent()
        })
    );
    assert_eq!(
        plan.passes.last(),
        Some(&Pass::Composite {
            target: FINAL_SURFACE,
            ops: vec![CompositeOp::Background, CompositeOp::Surface(PHOTO_SURFACE)]
        })
    );
}
