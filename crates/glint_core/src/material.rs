//! Surface materials.
//!
//! A material bundles the reflectance coefficients used by the shading
//! loop with a color pattern. Coefficients are in [0, 1] but are not
//! required to sum to 1. Materials are shared between primitives via
//! `Arc`, so one declaration in a scene file can texture many objects.

use glint_math::Vec3;

/// How a material resolves its color at a surface coordinate.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// The same color everywhere.
    Solid,
    /// Two colors alternating in a 3D checkerboard with cells of width
    /// `grain`, keyed by whichever coordinates the primitive supplies
    /// (world space for planes, spherical UV for spheres).
    Checkerboard { odd_color: Vec3, grain: f32 },
}

/// Reflectance coefficients plus a color pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Primary color ("even" color for checkerboards)
    pub color: Vec3,
    /// Contribution independent of lighting
    pub ambient: f32,
    /// Lambertian contribution per light
    pub diffuse: f32,
    /// Mirror-reflection contribution
    pub specular: f32,
    /// Refracted-ray contribution; also attenuates shadows cast by
    /// this object
    pub transmission: f32,
    /// Index of refraction of the object's medium (> 0, glass ~1.5)
    pub refractive_index: f32,
    pub pattern: Pattern,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec3::ZERO,
            ambient: 0.0,
            diffuse: 1.0,
            specular: 0.0,
            transmission: 0.0,
            refractive_index: 1.0,
            pattern: Pattern::Solid,
        }
    }
}

impl Material {
    /// Create a plain solid-color material with the given coefficients.
    pub fn solid(
        color: Vec3,
        ambient: f32,
        diffuse: f32,
        specular: f32,
        transmission: f32,
        refractive_index: f32,
    ) -> Self {
        Self {
            color,
            ambient,
            diffuse,
            specular,
            transmission,
            refractive_index,
            pattern: Pattern::Solid,
        }
    }

    /// Resolve the material color at a surface coordinate.
    ///
    /// The coordinate triple is whatever the owning primitive chose to
    /// parameterize its surface with; solid materials ignore it.
    pub fn color_at(&self, u: f32, v: f32, w: f32) -> Vec3 {
        match &self.pattern {
            Pattern::Solid => self.color,
            Pattern::Checkerboard { odd_color, grain } => {
                let k = (u / grain).floor() as i64
                    + (v / grain).floor() as i64
                    + (w / grain).floor() as i64;
                if k.rem_euclid(2) == 0 {
                    self.color
                } else {
                    *odd_color
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(grain: f32) -> Material {
        Material {
            color: Vec3::ONE,
            pattern: Pattern::Checkerboard {
                odd_color: Vec3::ZERO,
                grain,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_solid_ignores_coordinates() {
        let m = Material::solid(Vec3::new(0.2, 0.4, 0.6), 0.1, 0.5, 0.4, 0.0, 1.0);
        assert_eq!(m.color_at(0.0, 0.0, 0.0), Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(m.color_at(13.0, -7.5, 0.2), Vec3::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn test_checkerboard_alternates_along_one_axis() {
        let m = checker(1.0);
        assert_eq!(m.color_at(0.5, 0.5, 0.5), Vec3::ONE);
        assert_eq!(m.color_at(1.5, 0.5, 0.5), Vec3::ZERO);
        assert_eq!(m.color_at(2.5, 0.5, 0.5), Vec3::ONE);
    }

    #[test]
    fn test_checkerboard_sums_floored_cells() {
        let m = checker(1.0);
        // floor sums of 0+1+1 = even, 1+1+1 = odd
        assert_eq!(m.color_at(0.5, 1.5, 1.5), Vec3::ONE);
        assert_eq!(m.color_at(1.5, 1.5, 1.5), Vec3::ZERO);
    }

    #[test]
    fn test_checkerboard_negative_coordinates() {
        let m = checker(0.5);
        // floor(-0.25 / 0.5) = -1, an odd cell
        assert_eq!(m.color_at(-0.25, 0.0, 0.0), Vec3::ZERO);
        // -1 + -1 = -2, even again
        assert_eq!(m.color_at(-0.25, -0.25, 0.0), Vec3::ONE);
    }
}
