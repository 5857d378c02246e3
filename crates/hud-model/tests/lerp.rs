use hud_model::{BoundingBox, snapshot::lerp};
use proptest::prelude::*;

fn unit() -> impl Strategy<Value = f64> {
    0.0f64..=1.0
}

fn bbox() -> impl Strategy<Value = BoundingBox> {
    (unit(), unit(), unit(), unit()).prop_map(|(x, y, w, h)| BoundingBox::new(x, y, w, h))
}

proptest! {
    #[test]
    fn endpoints_are_exact(a in bbox(), b in bbox()) {
        prop_assert_eq!(a.lerp(&b, 0.0), a);
        prop_assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn interior_is_linear_blend(a in unit(), b in unit(), t in 0.001f64..0.999) {
        prop_assert_eq!(lerp(a, b, t), a + (b - a) * t);
    }

    #[test]
    fn blend_stays_between_endpoints(a in bbox(), b in bbox(), t in 0.0f64..=1.0) {
        let mid = a.lerp(&b, t);
        for ((_, lo), ((_, hi), (_, v))) in a
            .components()
            .into_iter()
            .zip(b.components().into_iter().zip(mid.components()))
        {
            prop_assert!(v >= lo.min(hi) - 1e-12 && v <= lo.max(hi) + 1e-12);
        }
    }
}

#[test]
fn clamped_pulls_components_into_unit_range() {
    let b = BoundingBox::new(-0.1, 1.4, 0.5, -2.0).clamped();
    assert_eq!(b, BoundingBox::new(0.0, 1.0, 0.5, 0.0));
}
