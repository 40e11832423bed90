//! Player state and first-person movement.
//!
//! This module defines the [`Player`] struct, which tracks the player's position, orientation
//! and movement parameters, and turns held keys plus mouse deltas into a new position that
//! never overlaps an obstacle.
//!
//! # Overview
//!
//! The player system handles:
//! - **Look**: yaw/pitch accumulated from pointer deltas, pitch clamped to a quarter turn
//! - **Movement**: forward/back/strafe on the horizontal plane, walk or run speed
//! - **Collision**: each frame's step is tested as a whole against the [`CollisionWorld`]
//! - **Camera**: eye point and look target for the renderer and for picking
//!
//! # Coordinate System
//!
//! Right-handed, Y up. With `yaw = 0` the player faces +Z and their right hand points
//! toward -X. Angles are in radians:
//! - **Yaw**: unbounded, grows when the pointer moves left
//! - **Pitch**: `[-π/2, π/2]`, grows when the pointer moves up
//!
//! # Movement Rule
//!
//! A step is all or nothing. The candidate position is computed from the full
//! `speed * dt` displacement; if it collides the player stays exactly where they were.
//! There is no sliding along walls.

use crate::config::PlayerConfig;
use crate::game::collision::CollisionWorld;
use crate::math::ray::Ray;
use crate::math::vec::Vec3;
use std::f32::consts::FRAC_PI_2;

/// Distance from the eye to the point the camera looks at.
pub const LOOK_DISTANCE: f32 = 10.0;

/// Movement keys held during one frame, sampled level-triggered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MoveInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub run: bool,
}

impl MoveInput {
    pub fn is_idle(&self) -> bool {
        !(self.forward || self.back || self.left || self.right)
    }
}

/// Represents the player character's state in the world.
///
/// # Fields
///
/// ## Position and Orientation
/// - `position`: world coordinates `[x, y, z]`; `y` stays at the spawn height
/// - `yaw`, `pitch`: look angles in radians
///
/// ## Movement Parameters
/// - `radius`: footprint radius used for collision, also sets the eye height
/// - `base_speed`, `run_speed`: units per second while walking or running
/// - `look_sensitivity`: radians per pointer pixel
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Player's world position in 3D space `[x, y, z]`.
    pub position: [f32; 3],

    /// Horizontal look angle in radians.
    ///
    /// - `0`: facing +Z
    /// - `π/2`: facing +X
    pub yaw: f32,

    /// Vertical look angle in radians.
    ///
    /// - Positive values: looking up
    /// - Negative values: looking down
    /// - Clamped to `[-π/2, π/2]`
    pub pitch: f32,

    /// Footprint radius in world units.
    pub radius: f32,

    /// Walking speed in units per second.
    pub base_speed: f32,

    /// Running speed in units per second, used while the run key is held.
    pub run_speed: f32,

    /// Radians of rotation per pixel of pointer travel.
    pub look_sensitivity: f32,
}

impl Player {
    /// Spawns a player at `position` facing +Z.
    pub fn new(position: [f32; 3], config: &PlayerConfig) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            radius: config.radius,
            base_speed: config.base_speed,
            run_speed: config.run_speed,
            look_sensitivity: config.look_sensitivity,
        }
    }

    /// Applies a pointer delta in pixels.
    ///
    /// Moving the pointer right turns the player right (yaw decreases), moving it down tilts
    /// the view down. Pitch is clamped so the view never flips over the vertical.
    pub fn look(&mut self, delta_x: f64, delta_y: f64) {
        self.yaw -= delta_x as f32 * self.look_sensitivity;
        self.pitch -= delta_y as f32 * self.look_sensitivity;
        self.pitch = self.pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Horizontal unit vector the player faces. Pitch does not tilt movement.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }

    /// Horizontal unit vector to the player's right.
    pub fn right(&self) -> Vec3 {
        Vec3::new(-self.yaw.cos(), 0.0, self.yaw.sin())
    }

    pub fn speed(&self, input: &MoveInput) -> f32 {
        if input.run {
            self.run_speed
        } else {
            self.base_speed
        }
    }

    /// World-space unit direction for the held keys, or zero when idle or when
    /// opposite keys cancel out.
    pub fn move_direction(&self, input: &MoveInput) -> Vec3 {
        let mut mx = 0.0;
        let mut mz = 0.0;
        if input.forward {
            mz -= 1.0;
        }
        if input.back {
            mz += 1.0;
        }
        if input.left {
            mx -= 1.0;
        }
        if input.right {
            mx += 1.0;
        }
        if mx == 0.0 && mz == 0.0 {
            return Vec3::ZERO;
        }
        (self.forward() * -mz + self.right() * mx).normalize()
    }

    /// Where a full step of `dt` seconds would take the player.
    pub fn candidate(&self, input: &MoveInput, dt: f32) -> [f32; 3] {
        let step = self.move_direction(input) * (self.speed(input) * dt);
        (Vec3::from(self.position) + step).into()
    }

    /// Advances the player by one frame.
    ///
    /// The candidate is committed only if `world` reports no collision for it; otherwise the
    /// player does not move at all. Returns whether the position changed.
    pub fn step(&mut self, input: &MoveInput, dt: f32, world: &CollisionWorld) -> bool {
        if input.is_idle() || dt <= 0.0 {
            return false;
        }
        let candidate = self.candidate(input, dt);
        if candidate == self.position || world.query(candidate, self.radius) {
            return false;
        }
        self.position = candidate;
        true
    }

    /// Camera position: on the footprint, at twice the radius above the floor.
    pub fn eye(&self) -> Vec3 {
        Vec3::new(self.position[0], self.radius * 2.0, self.position[2])
    }

    pub fn look_target(&self) -> Vec3 {
        let dir = Vec3::new(self.yaw.sin(), self.pitch.sin(), self.yaw.cos());
        self.eye() + dir * LOOK_DISTANCE
    }

    /// Ray from the eye through the centre of the view, used for picking.
    pub fn aim(&self) -> Ray {
        Ray::toward(self.eye(), self.look_target())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::collision::AABB;
    use crate::game::entity::EntityId;

    fn player_at(x: f32, z: f32) -> Player {
        Player::new([x, 1.0, z], &PlayerConfig::default())
    }

    fn forward_input() -> MoveInput {
        MoveInput {
            forward: true,
            ..MoveInput::default()
        }
    }

    /// A wall block one cell ahead (+Z) of a player standing at the origin.
    fn wall_ahead() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.insert(
            EntityId(0),
            AABB::from_center_size([0.0, 2.5, 6.0], [6.0, 5.0, 6.0]),
        );
        world
    }

    /// Walking at yaw 0 goes toward +Z at base speed.
    #[test]
    fn test_walk_forward_moves_along_z() {
        let mut player = player_at(0.0, 0.0);
        assert!(player.step(&forward_input(), 0.5, &CollisionWorld::new()));
        assert!((player.position[2] - 3.0).abs() < 1e-5);
        assert!(player.position[0].abs() < 1e-5);
        assert_eq!(player.position[1], 1.0);
    }

    /// Holding run doubles the distance covered with default speeds.
    #[test]
    fn test_run_uses_run_speed() {
        let mut player = player_at(0.0, 0.0);
        let input = MoveInput {
            run: true,
            ..forward_input()
        };
        player.step(&input, 0.5, &CollisionWorld::new());
        assert!((player.position[2] - 6.0).abs() < 1e-5);
    }

    /// Strafing right at yaw 0 heads toward -X, and diagonals are normalized.
    #[test]
    fn test_strafe_and_diagonal() {
        let player = player_at(0.0, 0.0);
        let right = MoveInput {
            right: true,
            ..MoveInput::default()
        };
        let dir = player.move_direction(&right);
        assert!((dir.x() + 1.0).abs() < 1e-5);

        let diagonal = MoveInput {
            right: true,
            ..forward_input()
        };
        assert!((player.move_direction(&diagonal).length() - 1.0).abs() < 1e-5);

        let cancelled = MoveInput {
            left: true,
            right: true,
            ..MoveInput::default()
        };
        assert_eq!(player.move_direction(&cancelled), Vec3::ZERO);
    }

    /// Standing against a wall and pushing into it leaves the position unchanged.
    #[test]
    fn test_blocked_step_keeps_position() {
        let world = wall_ahead();
        // wall face at z = 3, player radius 0.6
        let mut player = player_at(0.0, 2.39);
        let before = player.position;
        for speed in [0.5, 6.0, 12.0, 50.0] {
            player.base_speed = speed;
            assert!(!player.step(&forward_input(), 0.1, &world));
            assert_eq!(player.position, before);
        }
    }

    /// No committed position ever lies inside an expanded obstacle.
    #[test]
    fn test_never_commits_into_obstacle() {
        let world = wall_ahead();
        let mut player = player_at(0.0, 0.0);
        for _ in 0..200 {
            player.step(&forward_input(), 0.016, &world);
            assert!(!world.query(player.position, player.radius));
        }
        assert!(player.position[2] < 3.0 - player.radius);
    }

    /// Pitch saturates at a quarter turn in both directions.
    #[test]
    fn test_pitch_is_clamped() {
        let mut player = player_at(0.0, 0.0);
        player.look(0.0, -100_000.0);
        assert_eq!(player.pitch, FRAC_PI_2);
        player.look(0.0, 100_000.0);
        assert_eq!(player.pitch, -FRAC_PI_2);
        player.look(100.0, 0.0);
        assert!((player.yaw + 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_eye_and_look_target() {
        let player = player_at(3.0, 4.0);
        assert_eq!(player.eye(), Vec3::new(3.0, 1.2, 4.0));
        let target = player.look_target();
        assert!((target.z() - 14.0).abs() < 1e-5);
        let aim = player.aim();
        assert!((aim.direction.length() - 1.0).abs() < 1e-5);
    }
}
