//! Flat collision world of axis-aligned boxes.
//!
//! # Overview
//!
//! Every obstacle in the maze (wall blocks, sculptures, mini figures)
//! contributes one [`AABB`] to the [`CollisionWorld`], tagged with the entity
//! that owns it. The player is a disc in the horizontal plane, so a query only
//! looks at X and Z: a position collides when it lies strictly inside some box
//! grown by the player radius.
//!
//! Boxes are computed once when an entity is placed and never follow the
//! entity afterwards. Destroyed entities take their boxes with them through
//! [`CollisionWorld::remove`], and the escape sequence empties the world with
//! [`CollisionWorld::clear`].

use crate::game::entity::EntityId;

/// Axis-Aligned Bounding Box (AABB).
///
/// An AABB is a rectangular box whose faces are aligned with the world
/// coordinate axes, defined by its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl AABB {
    /// Creates a new AABB from minimum and maximum corner points.
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Box of the given full `size` centred on `center`.
    pub fn from_center_size(center: [f32; 3], size: [f32; 3]) -> Self {
        let half = [size[0] / 2.0, size[1] / 2.0, size[2] / 2.0];
        Self {
            min: [center[0] - half[0], center[1] - half[1], center[2] - half[2]],
            max: [center[0] + half[0], center[1] + half[1], center[2] + half[2]],
        }
    }

    /// Returns the center point of the AABB.
    #[cfg(test)]
    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    /// Strict footprint test: is `(x, z)` inside this box grown by `radius`
    /// on X and Z?
    pub fn footprint_contains(&self, x: f32, z: f32, radius: f32) -> bool {
        x > self.min[0] - radius
            && x < self.max[0] + radius
            && z > self.min[2] - radius
            && z < self.max[2] + radius
    }
}

/// Every obstacle box currently able to block the player.
#[derive(Debug, Default, Clone)]
pub struct CollisionWorld {
    boxes: Vec<(EntityId, AABB)>,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, owner: EntityId, bounds: AABB) {
        self.boxes.push((owner, bounds));
    }

    /// True if any box, grown by `radius` on X and Z, contains the X/Z of
    /// `position`. Y is ignored.
    pub fn query(&self, position: [f32; 3], radius: f32) -> bool {
        self.boxes
            .iter()
            .any(|(_, bounds)| bounds.footprint_contains(position[0], position[2], radius))
    }

    /// Drops every box owned by `owner` and reports how many went. Removing an
    /// entity that owns nothing is a no-op.
    pub fn remove(&mut self, owner: EntityId) -> usize {
        let before = self.boxes.len();
        self.boxes.retain(|(id, _)| *id != owner);
        before - self.boxes.len()
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn boxes(&self) -> impl Iterator<Item = &(EntityId, AABB)> {
        self.boxes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.insert(EntityId(1), AABB::new([0.0, 0.0, 0.0], [1.0, 5.0, 1.0]));
        world
    }

    /// No obstacles, no collision, whatever the position or radius.
    #[test]
    fn test_empty_world_never_collides() {
        let world = CollisionWorld::new();
        for &(x, z, r) in &[(0.0, 0.0, 0.0), (10.0, -3.0, 100.0), (-1e6, 1e6, 1.0)] {
            assert!(!world.query([x, 0.0, z], r));
        }
    }

    /// Growing the radius can only turn a miss into a hit, never the reverse.
    #[test]
    fn test_query_monotonic_in_radius() {
        let world = unit_box_world();
        let probes = [
            [1.3, 0.0, 0.5],
            [-0.2, 9.0, -0.2],
            [0.5, 0.0, 0.5],
            [2.0, 0.0, 2.0],
        ];
        let radii = [0.0, 0.1, 0.35, 0.6, 1.0, 2.0];
        for p in probes {
            for (i, r1) in radii.iter().enumerate() {
                if world.query(p, *r1) {
                    for r2 in &radii[i..] {
                        assert!(world.query(p, *r2), "lost hit at {p:?} r={r2}");
                    }
                }
            }
        }
    }

    /// The expanded boundary itself does not count as contact.
    #[test]
    fn test_query_is_strict_and_ignores_height() {
        let world = unit_box_world();
        assert!(!world.query([1.6, 0.0, 0.5], 0.6));
        assert!(world.query([1.59, 0.0, 0.5], 0.6));
        assert!(world.query([0.5, 1000.0, 0.5], 0.0));
    }

    #[test]
    fn test_remove_only_touches_owner() {
        let mut world = unit_box_world();
        world.insert(EntityId(2), AABB::new([5.0, 0.0, 5.0], [6.0, 1.0, 6.0]));
        world.insert(EntityId(2), AABB::new([7.0, 0.0, 7.0], [8.0, 1.0, 8.0]));
        assert_eq!(world.remove(EntityId(2)), 2);
        assert_eq!(world.remove(EntityId(2)), 0);
        assert_eq!(world.len(), 1);
        assert!(world.query([0.5, 0.0, 0.5], 0.0));
        world.clear();
        assert!(world.is_empty());
    }

    #[test]
    fn test_from_center_size() {
        let bounds = AABB::from_center_size([0.0, 2.5, 6.0], [6.0, 5.0, 6.0]);
        assert_eq!(bounds.min, [-3.0, 0.0, 3.0]);
        assert_eq!(bounds.max, [3.0, 5.0, 9.0]);
        assert_eq!(bounds.center(), [0.0, 2.5, 6.0]);
    }
}
