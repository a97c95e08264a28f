// Re-export glam for convenience
pub use glam::*;

mod ray;
pub use ray::Ray;

/// Clamp every component of `v` so that none exceeds `max`.
///
/// Shading accumulates additive terms (ambient + diffuse + specular +
/// transmission) that can push a channel past displayable range, so
/// colors are truncated before they land in the pixel buffer.
#[inline]
pub fn truncate(v: Vec3, max: f32) -> Vec3 {
    v.min(Vec3::splat(max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(a.dot(b), 32.0);
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
    }

    #[test]
    fn test_truncate_caps_components_independently() {
        let v = Vec3::new(0.25, 1.5, 3.0);
        assert_eq!(truncate(v, 1.0), Vec3::new(0.25, 1.0, 1.0));
    }

    #[test]
    fn test_truncate_leaves_in_range_values_alone() {
        let v = Vec3::new(0.1, 0.2, 0.3);
        assert_eq!(truncate(v, 1.0), v);
    }
}
