//! Point lights.

use glint_math::Vec3;
use rand::{Rng, RngCore};

/// A positional light with uniform intensity.
#[derive(Debug, Clone)]
pub struct PointLight {
    pub position: Vec3,
    /// Scales this light's diffuse contribution (>= 0)
    pub intensity: f32,
    /// Soft-shadow jitter radius; only consulted when soft shadows are
    /// enabled
    pub radius: f32,
}

impl PointLight {
    pub fn new(position: Vec3, intensity: f32, radius: f32) -> Self {
        Self {
            position,
            intensity,
            radius,
        }
    }

    /// Unit direction from `point` toward the light, and the distance
    /// to it.
    ///
    /// When `jitter` is supplied the light's effective position is
    /// perturbed inside a cube of half-width `radius`, faking a volume
    /// light. Averaged over many samples (anti-aliasing or noise
    /// reduction iterations) this softens shadow edges at the cost of
    /// per-sample noise.
    pub fn direction_to(
        &self,
        point: Vec3,
        jitter: Option<&mut dyn RngCore>,
    ) -> (Vec3, f32) {
        let mut position = self.position;
        if let Some(rng) = jitter {
            let offset = Vec3::new(
                rng.gen::<f32>() * 2.0 - 1.0,
                rng.gen::<f32>() * 2.0 - 1.0,
                rng.gen::<f32>() * 2.0 - 1.0,
            );
            position += offset * self.radius;
        }

        let toward = position - point;
        (toward.normalize(), toward.length())
    }
}
