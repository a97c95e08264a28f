//! The recursive trace/shade algorithm.
//!
//! `trace` follows a ray into the scene and accumulates the color of
//! the nearest surface it hits:
//!
//!   - Ambient, independent of lighting and recursion
//!   - Diffuse, per light, attenuated by shadow tests
//!   - Transmission, a recursive call along the refracted direction
//!   - Specular, a recursive call along the mirror reflection
//!
//! The `depth` argument bounds the recursion: both recursive branches
//! are gated on `depth < max_depth`, so depth strictly increases until
//! the branches stop firing.

use glint_core::{RenderConfig, Scene};
use glint_math::{truncate, Vec3};
use rand::RngCore;

use crate::stats::Stats;

/// Color returned when a ray escapes the scene.
const BACKGROUND: Vec3 = Vec3::ZERO;

/// Shadow rays must travel at least this far before an occluder
/// counts, so the shading point does not occlude itself through
/// floating-point error.
const SHADOW_BIAS: f32 = 1e-4;

/// Shadow intensity below this is treated as fully dark; it can never
/// recover, so the occluder scan stops early.
const SHADOW_CUTOFF: f32 = 1e-4;

/// Offsets applied along secondary-ray directions so the new ray
/// starts clear of the surface it spawned from.
const TRANSMISSION_OFFSET: f32 = 1e-4;
const REFLECTION_OFFSET: f32 = 1e-5;

/// Trace a ray and return the color it accumulates.
///
/// `direction` must be normalized. `rng` feeds soft-shadow jitter and
/// is threaded through recursive calls; each worker supplies its own
/// generator so threads never contend over shared random state.
pub fn trace(
    scene: &Scene,
    config: &RenderConfig,
    origin: Vec3,
    direction: Vec3,
    depth: u32,
    rng: &mut dyn RngCore,
    stats: &mut Stats,
) -> Vec3 {
    let Some((hit_index, t)) = scene.nearest_intersection(origin, direction) else {
        return BACKGROUND;
    };
    stats.intersections += 1;

    // The intersection routine only yields the parametric scalar; the
    // shading math needs the actual point and the surface normal there.
    let object = &scene.objects[hit_index];
    let intersection = origin + direction * t;
    let normal = object.normal_at(intersection);
    let material_color = object.color_at(intersection);

    let mut color = material_color * object.material.ambient;

    let diffuse = object.material.diffuse;
    if diffuse > 0.0 {
        for light in &scene.lights {
            let jitter: Option<&mut dyn RngCore> =
                if config.soft_shadows { Some(&mut *rng) } else { None };
            let (shadow_dir, light_distance) = light.direction_to(intersection, jitter);
            stats.shadow_rays += 1;

            // Occluders between the point and the light attenuate its
            // contribution; transparent occluders only partially. The
            // hit object itself is skipped, the bias guards against
            // numerically re-hitting the surface, and the distance
            // bound ignores objects beyond the light.
            let mut intensity = 1.0;
            for (other_index, other) in scene.objects.iter().enumerate() {
                if other_index == hit_index {
                    continue;
                }
                match other.intersect(intersection, shadow_dir) {
                    Some(k) if k >= SHADOW_BIAS && k < light_distance => {
                        intensity -= 1.0 - other.material.transmission.max(0.0);
                        if intensity <= SHADOW_CUTOFF {
                            break;
                        }
                    }
                    _ => {}
                }
            }

            // Lambertian falloff, clamped so lights behind the surface
            // contribute nothing.
            color += material_color
                * (intensity
                    * light.intensity
                    * diffuse
                    * shadow_dir.dot(normal).max(0.0));
        }
    }

    let mut total_internal_reflection = false;
    if object.material.transmission > 0.0 && depth < config.max_depth {
        match refraction_dir(direction, normal, object.material.refractive_index) {
            Some(refracted) => {
                let transmitted = trace(
                    scene,
                    config,
                    intersection + refracted * TRANSMISSION_OFFSET,
                    refracted,
                    depth + 1,
                    rng,
                    stats,
                );
                color += transmitted * object.material.transmission;
                stats.transmission_rays += 1;
            }
            None => total_internal_reflection = true,
        }
    }

    let mut reflective_intensity = object.material.specular;
    // Energy that could not refract is redirected into the reflection.
    if total_internal_reflection {
        reflective_intensity += object.material.transmission;
    }
    if reflective_intensity > 0.0 && depth < config.max_depth {
        let reflected = reflection_dir(direction, normal);
        let reflection = trace(
            scene,
            config,
            intersection + reflected * REFLECTION_OFFSET,
            reflected,
            depth + 1,
            rng,
            stats,
        );
        color += reflection * reflective_intensity;
        stats.specular_rays += 1;
    }

    truncate(color, 1.0)
}

/// Mirror-reflection direction.
///
/// Projection theorem: subtracting twice the incident ray's projection
/// onto the normal flips its normal component.
#[inline]
pub fn reflection_dir(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - normal * (2.0 * incident.dot(normal))
}

/// Whether a ray is travelling inside the object whose surface normal
/// it intersected.
#[inline]
fn is_inside(direction: Vec3, normal: Vec3) -> bool {
    direction.dot(normal) > 0.0
}

/// Refracted (transmission) direction, or `None` under total internal
/// reflection.
///
/// The interface is assumed to sit between air and the intersected
/// object's medium, so a ray passing directly from one object into
/// another without an air gap refracts as if it had exited to air
/// first. Nested transparent objects are out of scope for this model.
pub fn refraction_dir(incident: Vec3, normal: Vec3, refractive_index: f32) -> Option<Vec3> {
    let mut normal = normal;
    let mut cosi = -incident.dot(normal);
    let relative_index;
    if is_inside(incident, normal) {
        relative_index = refractive_index;
        cosi = -cosi;
    } else {
        relative_index = 1.0 / refractive_index;
        normal = -normal;
    }

    let base = 1.0 - relative_index * relative_index * (1.0 - cosi * cosi);
    if base < 0.0 {
        return None;
    }

    Some(incident * relative_index + normal * (base.sqrt() - relative_index * cosi))
}
