//! Scene container and nearest-intersection query.

use glint_math::Vec3;

use crate::camera::Camera;
use crate::light::PointLight;
use crate::primitive::SceneObject;

/// Everything the renderer traces against: objects, lights, and the
/// camera. Populated once before a render and read-only after, so
/// worker threads share it freely.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub lights: Vec<PointLight>,
    pub camera: Camera,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            camera,
        }
    }

    /// Find the nearest object hit by a ray.
    ///
    /// Linear scan over every object, keeping the smallest positive
    /// intersection scalar. Returns the hit object's index (used by the
    /// shadow loop to skip self-intersection) and the scalar. O(objects)
    /// per ray; fine at this scene scale, and the known limit to fix
    /// first if scenes grow.
    pub fn nearest_intersection(&self, origin: Vec3, direction: Vec3) -> Option<(usize, f32)> {
        let mut nearest: Option<(usize, f32)> = None;
        for (index, object) in self.objects.iter().enumerate() {
            if let Some(t) = object.intersect(origin, direction) {
                if nearest.map_or(true, |(_, best)| t < best) {
                    nearest = Some((index, t));
                }
            }
        }
        nearest
    }
}
