//! Collision detection and response between entities
//!
//! Same-type contacts (and pairs with no dominance relation) bounce
//! elastically. Otherwise the loser takes the winner's type and owner.

use glam::Vec2;
use rand::Rng;

use super::grid::SpatialGrid;
use super::rules::Variation;
use super::state::{Entity, SimEvent, random_spin};
use crate::consts::BOUNCE_SPIN_JITTER;

/// What happened to a candidate pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairOutcome {
    /// Centers too far apart
    Miss,
    /// Elastic bounce applied
    Bounced,
    /// Coincident centers: touching, but no normal to bounce along
    Degenerate,
    /// Loser (`b` if `a_won`, otherwise `a`) switched from `from` to `to`
    Converted { a_won: bool, from: usize, to: usize },
}

/// Contact geometry between two overlapping circles
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Unit vector from `a` toward `b`
    pub normal: Vec2,
    /// Overlap distance
    pub penetration: f32,
}

/// Contact between two entities, `None` if apart or concentric
pub fn contact(a: &Entity, b: &Entity) -> Option<Contact> {
    let delta = b.pos - a.pos;
    let distance = delta.length();
    let reach = a.radius + b.radius;
    if distance >= reach || distance == 0.0 {
        return None;
    }
    Some(Contact {
        normal: delta / distance,
        penetration: reach - distance,
    })
}

/// Equal-mass elastic bounce. Exchanges the normal velocity components,
/// re-rolls both spins, and pushes each entity out by half the overlap.
///
/// Returns false (and changes nothing) when the pair is apart or the
/// centers coincide.
pub fn bounce(a: &mut Entity, b: &mut Entity, rng: &mut impl Rng) -> bool {
    let Some(Contact {
        normal,
        penetration,
    }) = contact(a, b)
    else {
        return false;
    };

    let impulse = (a.vel - b.vel).dot(normal);
    a.vel -= impulse * normal;
    b.vel += impulse * normal;

    a.spin = random_spin(BOUNCE_SPIN_JITTER, rng);
    b.spin = random_spin(BOUNCE_SPIN_JITTER, rng);

    let push = normal * (penetration / 2.0);
    a.pos -= push;
    b.pos += push;
    true
}

/// Resolve one candidate pair under the variation's dominance relation
pub fn resolve_pair(
    a: &mut Entity,
    b: &mut Entity,
    variation: &Variation,
    rng: &mut impl Rng,
) -> PairOutcome {
    if !a.collides_with(b) {
        return PairOutcome::Miss;
    }

    if a.kind != b.kind {
        if variation.defeats(a.kind, b.kind) {
            let from = b.kind;
            b.kind = a.kind;
            b.owner.clone_from(&a.owner);
            return PairOutcome::Converted {
                a_won: true,
                from,
                to: a.kind,
            };
        }
        if variation.defeats(b.kind, a.kind) {
            let from = a.kind;
            a.kind = b.kind;
            a.owner.clone_from(&b.owner);
            return PairOutcome::Converted {
                a_won: false,
                from,
                to: b.kind,
            };
        }
    }

    if bounce(a, b, rng) {
        PairOutcome::Bounced
    } else {
        PairOutcome::Degenerate
    }
}

/// Mutable references to two distinct entities
fn pair_mut(entities: &mut [Entity], i: usize, j: usize) -> (&mut Entity, &mut Entity) {
    debug_assert!(i < j);
    let (head, tail) = entities.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Resolve every neighboring pair once, in index order
///
/// Pairs are keyed canonically as `(lower, higher)` so each is visited once.
/// Types are read live, so a conversion early in the pass is seen by later
/// pairs in the same tick. Returns the number of conversions.
pub fn resolve_collisions(
    entities: &mut [Entity],
    grid: &SpatialGrid,
    variation: &Variation,
    rng: &mut impl Rng,
    neighbors: &mut Vec<usize>,
    events: &mut Vec<SimEvent>,
) -> usize {
    let mut conversions = 0;

    for i in 0..entities.len() {
        grid.query_neighbors(i, neighbors);
        // Stable visiting order regardless of bucket layout
        neighbors.sort_unstable();

        for &j in neighbors.iter() {
            if j <= i || j >= entities.len() {
                continue;
            }
            let (a, b) = pair_mut(entities, i, j);
            let kind = a.kind;
            match resolve_pair(a, b, variation, rng) {
                PairOutcome::Miss | PairOutcome::Degenerate => {}
                PairOutcome::Bounced => events.push(SimEvent::Bounced { kind }),
                PairOutcome::Converted { from, to, .. } => {
                    conversions += 1;
                    events.push(SimEvent::Converted { from, to });
                }
            }
        }
    }

    conversions
}
