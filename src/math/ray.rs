//! Ray intersection against the primitive shapes used by scene entities.
//!
//! Every intersector returns the smallest non-negative ray parameter `t` at
//! which the ray enters the shape, or the exit parameter when the origin is
//! already inside. The ray direction is expected to be unit length, so `t`
//! is a world distance.

use crate::math::vec::Vec3;

const PARALLEL_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Ray from `origin` through `target`, with a normalized direction.
    pub fn toward(origin: Vec3, target: Vec3) -> Self {
        Self {
            origin,
            direction: (target - origin).normalize(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Slab test against an axis-aligned box.
pub fn intersect_aabb(ray: &Ray, min: [f32; 3], max: [f32; 3]) -> Option<f32> {
    let origin = ray.origin.as_array();
    let dir = ray.direction.as_array();
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        if dir[axis].abs() < PARALLEL_EPSILON {
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir[axis];
        let t1 = (min[axis] - origin[axis]) * inv;
        let t2 = (max[axis] - origin[axis]) * inv;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
    }

    nearest_forward(t_enter, t_exit)
}

pub fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(&ray.direction);
    let c = oc.dot(&oc) - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    nearest_forward(-b - root, -b + root)
}

/// Upright cylinder centred on `center`, capped at `center.y ± height / 2`.
pub fn intersect_cylinder(ray: &Ray, center: Vec3, radius: f32, height: f32) -> Option<f32> {
    let half = height / 2.0;
    let (bottom, top) = (center.y() - half, center.y() + half);

    // Side wall: solve in the horizontal plane.
    let ox = ray.origin.x() - center.x();
    let oz = ray.origin.z() - center.z();
    let (dx, dz) = (ray.direction.x(), ray.direction.z());
    let a = dx * dx + dz * dz;

    let (mut t_enter, mut t_exit) = if a < PARALLEL_EPSILON {
        if ox * ox + oz * oz > radius * radius {
            return None;
        }
        (f32::NEG_INFINITY, f32::INFINITY)
    } else {
        let b = ox * dx + oz * dz;
        let c = ox * ox + oz * oz - radius * radius;
        let discriminant = b * b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        ((-b - root) / a, (-b + root) / a)
    };

    // Caps: clip against the vertical slab.
    let dy = ray.direction.y();
    if dy.abs() < PARALLEL_EPSILON {
        if ray.origin.y() < bottom || ray.origin.y() > top {
            return None;
        }
    } else {
        let t1 = (bottom - ray.origin.y()) / dy;
        let t2 = (top - ray.origin.y()) / dy;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
    }

    nearest_forward(t_enter, t_exit)
}

fn nearest_forward(t_enter: f32, t_exit: f32) -> Option<f32> {
    if t_exit < t_enter || t_exit < 0.0 {
        None
    } else if t_enter >= 0.0 {
        Some(t_enter)
    } else {
        Some(t_exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward_ray() -> Ray {
        Ray::toward(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 10.0))
    }

    #[test]
    fn test_box_hit_distance() {
        let t = intersect_aabb(&forward_ray(), [-1.0, 0.0, 4.0], [1.0, 2.0, 6.0]);
        assert_eq!(t, Some(4.0));
    }

    #[test]
    fn test_box_behind_is_missed() {
        let t = intersect_aabb(&forward_ray(), [-1.0, 0.0, -6.0], [1.0, 2.0, -4.0]);
        assert_eq!(t, None);
    }

    /// A ray grazing past the side of a box misses.
    #[test]
    fn test_box_side_miss() {
        let t = intersect_aabb(&forward_ray(), [2.0, 0.0, 4.0], [3.0, 2.0, 6.0]);
        assert_eq!(t, None);
    }

    #[test]
    fn test_origin_inside_box_reports_exit() {
        let t = intersect_aabb(&forward_ray(), [-1.0, 0.0, -1.0], [1.0, 2.0, 3.0]);
        assert_eq!(t, Some(3.0));
    }

    #[test]
    fn test_sphere_hit_distance() {
        let t = intersect_sphere(&forward_ray(), Vec3::new(0.0, 1.0, 5.0), 0.5).expect("hit");
        assert!((t - 4.5).abs() < 1e-4);
    }

    #[test]
    fn test_cylinder_side_and_cap() {
        let side = intersect_cylinder(&forward_ray(), Vec3::new(0.0, 1.0, 5.0), 0.4, 0.8)
            .expect("side hit");
        assert!((side - 4.6).abs() < 1e-4);

        // Looking straight down onto the top cap.
        let down = Ray::toward(Vec3::new(0.0, 5.0, 5.0), Vec3::new(0.0, 0.0, 5.0));
        let cap = intersect_cylinder(&down, Vec3::new(0.0, 1.0, 5.0), 0.4, 0.8).expect("cap hit");
        assert!((cap - 3.6).abs() < 1e-4);

        // Passing above the cylinder misses.
        let high = Ray::toward(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, 3.0, 10.0));
        assert_eq!(
            intersect_cylinder(&high, Vec3::new(0.0, 1.0, 5.0), 0.4, 0.8),
            None
        );
    }
}
