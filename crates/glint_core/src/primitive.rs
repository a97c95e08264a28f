//! Geometric primitives and ray intersection.
//!
//! Primitives are a closed sum over shape kinds rather than a trait
//! object hierarchy; intersection, normals, and surface color all
//! dispatch on the `Shape` tag.

use std::f32::consts::PI;
use std::sync::Arc;

use glint_math::Vec3;

use crate::material::Material;

/// Rays closer to parallel with a plane than this never intersect it.
const PLANE_PARALLEL_EPSILON: f32 = 1e-6;

/// Minimum accepted plane intersection scalar. Slightly positive so a
/// ray starting numerically on a plane does not re-hit it.
const PLANE_SCALAR_EPSILON: f32 = 1e-6;

/// Shape parameters per primitive kind. Normals are normalized at
/// construction.
#[derive(Debug, Clone)]
pub enum Shape {
    Sphere {
        origin: Vec3,
        radius: f32,
    },
    /// An infinite plane through `point`.
    Plane {
        point: Vec3,
        normal: Vec3,
    },
    /// A flat circle of `radius` around `origin`.
    Disk {
        origin: Vec3,
        normal: Vec3,
        radius: f32,
    },
}

/// A renderable object: a shape plus a shared material.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub shape: Shape,
    pub material: Arc<Material>,
}

impl SceneObject {
    pub fn sphere(material: Arc<Material>, origin: Vec3, radius: f32) -> Self {
        Self {
            shape: Shape::Sphere { origin, radius },
            material,
        }
    }

    pub fn plane(material: Arc<Material>, point: Vec3, normal: Vec3) -> Self {
        Self {
            shape: Shape::Plane {
                point,
                normal: normal.normalize(),
            },
            material,
        }
    }

    pub fn disk(material: Arc<Material>, origin: Vec3, normal: Vec3, radius: f32) -> Self {
        Self {
            shape: Shape::Disk {
                origin,
                normal: normal.normalize(),
                radius,
            },
            material,
        }
    }

    /// Intersect a ray with this object.
    ///
    /// Returns the smallest positive scalar `t` such that
    /// `origin + t * direction` lies on the surface, or `None` when the
    /// ray misses. `direction` must be normalized.
    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        match self.shape {
            Shape::Sphere {
                origin: center,
                radius,
            } => sphere_intersection(origin, direction, center, radius),
            Shape::Plane { point, normal } => {
                plane_intersection(origin, direction, point, normal)
            }
            Shape::Disk {
                origin: center,
                normal,
                radius,
            } => {
                let t = plane_intersection(origin, direction, center, normal)?;
                let hit = origin + direction * t;
                if (hit - center).length() < radius {
                    Some(t)
                } else {
                    None
                }
            }
        }
    }

    /// Outward surface normal at a point on the object.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        match self.shape {
            Shape::Sphere { origin, .. } => (point - origin).normalize(),
            // Planes and disks are flat; the normal is position-independent.
            Shape::Plane { normal, .. } | Shape::Disk { normal, .. } => normal,
        }
    }

    /// Material color at a point on the object's surface.
    ///
    /// Spheres remap the point to spherical UV so checkerboard patterns
    /// wrap without distortion; flat shapes hand world coordinates to
    /// the material directly, aligning patterns to the world axes.
    pub fn color_at(&self, point: Vec3) -> Vec3 {
        match self.shape {
            Shape::Sphere { origin, radius } => {
                let theta = (-(point.z - origin.z)).atan2(point.x - origin.x);
                let u = (theta + PI) / (2.0 * PI);
                let phi = (-(point.y - origin.y) / radius).acos();
                let v = phi / PI;
                self.material.color_at(u, v, 0.0)
            }
            Shape::Plane { .. } | Shape::Disk { .. } => {
                self.material.color_at(point.x, point.y, point.z)
            }
        }
    }
}

/// Ray-sphere intersection by the geometric method.
///
/// Projects the ray-to-center segment onto the ray and compares the
/// perpendicular distance against the radius. Selecting the smallest
/// positive root handles the origin sitting inside the sphere (only the
/// far root is positive) and behind it (neither root is positive).
fn sphere_intersection(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let segment = center - origin;
    let proj = segment.dot(direction);
    let discriminant = segment.dot(segment) - proj * proj;
    let radius_sq = radius * radius;
    if discriminant > radius_sq {
        return None;
    }

    let delta = (radius_sq - discriminant).sqrt();
    let near = proj - delta;
    let far = proj + delta;
    if near < far && near > 0.0 {
        Some(near)
    } else if far > 0.0 {
        Some(far)
    } else {
        None
    }
}

/// Ray-plane intersection.
///
/// Rejects rays parallel to the plane before solving the parametric
/// equation, and requires the scalar to be (slightly) positive so that
/// hits behind the ray origin do not count.
fn plane_intersection(origin: Vec3, direction: Vec3, point: Vec3, normal: Vec3) -> Option<f32> {
    let direction_dot_normal = normal.dot(direction);
    if direction_dot_normal.abs() <= PLANE_PARALLEL_EPSILON {
        return None;
    }

    let t = (point - origin).dot(normal) / direction_dot_normal;
    if t >= PLANE_SCALAR_EPSILON {
        Some(t)
    } else {
        None
    }
}
