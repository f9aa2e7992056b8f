//! Additional math helpers layered on top of `glam`.

use glam::Vec2;

/// Replaces NaN components with zero.
pub fn zero_nan(v: Vec2) -> Vec2 {
    Vec2::new(
        if v.x.is_nan() { 0.0 } else { v.x },
        if v.y.is_nan() { 0.0 } else { v.y },
    )
}

/// Layer-mask membership test: whether `layer` is set in `mask`.
pub fn mask_contains(mask: u32, layer: u8) -> bool {
    layer < 32 && mask & (1u32 << layer) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_components_become_zero() {
        let v = zero_nan(Vec2::new(f32::NAN, 3.0));
        assert_eq!(v, Vec2::new(0.0, 3.0));
    }

    #[test]
    fn layer_membership() {
        assert!(mask_contains(0b101, 0));
        assert!(!mask_contains(0b101, 1));
        assert!(mask_contains(u32::MAX, 31));
        assert!(!mask_contains(u32::MAX, 40));
    }
}
