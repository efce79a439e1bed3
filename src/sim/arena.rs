//! Arena bounds and motion integration
//!
//! The arena is an axis-aligned rectangle `[0, width] x [0, height]`. After
//! every integration step an entity's center lies in
//! `[r, width - r] x [r, height - r]`.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Entity, random_spin};
use crate::consts::WALL_SPIN_JITTER;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Uniform position for an entity of radius `radius`, inset from the walls
    pub fn random_position(&self, radius: f32, rng: &mut impl Rng) -> Vec2 {
        Vec2::new(
            rng.random_range(radius..=(self.width - radius).max(radius)),
            rng.random_range(radius..=(self.height - radius).max(radius)),
        )
    }

    /// Clamp a center into the valid range for `radius`
    #[inline]
    pub fn clamp(&self, pos: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            pos.x.clamp(radius, (self.width - radius).max(radius)),
            pos.y.clamp(radius, (self.height - radius).max(radius)),
        )
    }

    /// Whether an entity sits fully inside the walls
    pub fn contains(&self, entity: &Entity) -> bool {
        let r = entity.radius;
        entity.pos.x >= r
            && entity.pos.x <= self.width - r
            && entity.pos.y >= r
            && entity.pos.y <= self.height - r
    }
}

/// Advance one entity by a tick and reflect it off the walls
///
/// Returns true if a wall was hit.
pub fn integrate(entity: &mut Entity, arena: &Arena, speed: f32, rng: &mut impl Rng) -> bool {
    entity.pos += entity.vel * speed;
    entity.rotation += entity.spin;

    let r = entity.radius;
    let mut hit = false;

    if entity.pos.x < r || entity.pos.x > arena.width - r {
        entity.vel.x = -entity.vel.x;
        hit = true;
    }
    if entity.pos.y < r || entity.pos.y > arena.height - r {
        entity.vel.y = -entity.vel.y;
        hit = true;
    }

    if hit {
        entity.pos = arena.clamp(entity.pos, r);
        // Wall contact gives the glyph a fresh wobble
        entity.spin = random_spin(WALL_SPIN_JITTER, rng);
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn entity_at(x: f32, y: f32, vx: f32, vy: f32) -> Entity {
        let mut e = Entity::new(1, Vec2::new(x, y), 0, 5.0);
        e.vel = Vec2::new(vx, vy);
        e
    }

    #[test]
    fn test_free_motion() {
        let arena = Arena::new(100.0, 100.0);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = entity_at(50.0, 50.0, 1.0, -0.5);
        e.spin = 0.02;

        let hit = integrate(&mut e, &arena, 2.0, &mut rng);
        assert!(!hit);
        assert_eq!(e.pos, Vec2::new(52.0, 49.0));
        assert!((e.rotation - 0.02).abs() < 1e-6);
        assert_eq!(e.spin, 0.02);
    }

    #[test]
    fn test_right_wall_reflects_and_clamps() {
        let arena = Arena::new(100.0, 100.0);
        let mut rng = Pcg32::seed_from_u64(2);
        let mut e = entity_at(94.5, 50.0, 1.0, 0.25);

        assert!(integrate(&mut e, &arena, 1.0, &mut rng));
        assert_eq!(e.vel.x, -1.0);
        assert_eq!(e.vel.y, 0.25);
        assert_eq!(e.pos.x, 95.0);
        assert!(e.spin.abs() <= WALL_SPIN_JITTER);
    }

    #[test]
    fn test_corner_reflects_both_axes() {
        let arena = Arena::new(100.0, 100.0);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut e = entity_at(5.5, 5.5, -1.0, -1.0);

        assert!(integrate(&mut e, &arena, 1.0, &mut rng));
        assert_eq!(e.vel, Vec2::new(1.0, 1.0));
        assert_eq!(e.pos, Vec2::new(5.0, 5.0));
        assert!(arena.contains(&e));
    }

    #[test]
    fn test_random_positions_are_inset() {
        let arena = Arena::new(60.0, 40.0);
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..500 {
            let p = arena.random_position(5.0, &mut rng);
            assert!((5.0..=55.0).contains(&p.x));
            assert!((5.0..=35.0).contains(&p.y));
        }
    }

    #[test]
    fn test_fast_entities_stay_inside() {
        let arena = Arena::new(200.0, 150.0);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut e = entity_at(100.0, 75.0, 0.9, -0.7);
        for _ in 0..2000 {
            integrate(&mut e, &arena, 7.5, &mut rng);
            assert!(arena.contains(&e), "escaped at {:?}", e.pos);
        }
    }
}
