//! Owner assignment and leaderboard
//!
//! Owners are named players attached to entities at round start. Ownership
//! follows conversions, so the leaderboard is recomputed from the live entity
//! set on every sample. Owners that drop to zero are eliminated with a fixed
//! rank that never changes until the round resets.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::state::Entity;

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRating {
    pub name: String,
    /// Live entity count (0 once eliminated)
    pub count: u32,
    /// 1-based position
    pub rank: usize,
    pub eliminated: bool,
    /// 1 for the first owner knocked out, 2 for the next, ...
    pub elimination_order: Option<usize>,
}

/// Shuffle `names` and hand them out round-robin over `entities`
pub fn assign_owners(names: &[String], entities: &mut [Entity], rng: &mut impl Rng) {
    if names.is_empty() {
        return;
    }
    let mut shuffled = names.to_vec();
    shuffled.shuffle(rng);
    for (i, entity) in entities.iter_mut().enumerate() {
        entity.owner = Some(shuffled[i % shuffled.len()].clone());
    }
}

/// Uniform pick among the distinct owners of `entities`
pub fn pick_winning_owner(entities: &[Entity], rng: &mut impl Rng) -> Option<String> {
    let owners: BTreeSet<&str> = entities.iter().filter_map(|e| e.owner.as_deref()).collect();
    if owners.is_empty() {
        return None;
    }
    let pick = rng.random_range(0..owners.len());
    owners.into_iter().nth(pick).map(str::to_string)
}

/// Sampled leaderboard with elimination tracking
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerTracker {
    top_k: usize,
    /// Owners with a nonzero count at the last sample
    alive: BTreeSet<String>,
    /// Eliminated owners in elimination order
    eliminated: Vec<OwnerRating>,
    ratings: Vec<OwnerRating>,
}

impl OwnerTracker {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k,
            ..Default::default()
        }
    }

    /// Forget everything (new round)
    pub fn reset(&mut self) {
        self.alive.clear();
        self.eliminated.clear();
        self.ratings.clear();
    }

    /// Recount owners from the live entity set and rebuild the leaderboard
    pub fn sample(&mut self, entities: &[Entity]) -> &[OwnerRating] {
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for owner in entities.iter().filter_map(|e| e.owner.as_deref()) {
            *counts.entry(owner).or_default() += 1;
        }

        let mut active: Vec<(&str, u32)> = counts.into_iter().collect();
        // Descending by count; BTreeMap order already breaks ties by name
        active.sort_by(|a, b| b.1.cmp(&a.1));

        let still_alive: BTreeSet<&str> = active.iter().map(|&(name, _)| name).collect();
        let knocked_out: Vec<String> = self
            .alive
            .iter()
            .filter(|name| !still_alive.contains(name.as_str()))
            .cloned()
            .collect();

        for (batch_pos, name) in knocked_out.into_iter().enumerate() {
            let rank = active.len() + batch_pos + 1;
            let order = self.eliminated.len() + 1;
            log::debug!("Owner {name} eliminated (rank {rank}, order {order})");
            self.eliminated.push(OwnerRating {
                name,
                count: 0,
                rank,
                eliminated: true,
                elimination_order: Some(order),
            });
        }

        self.alive = still_alive.iter().map(|s| s.to_string()).collect();

        self.ratings.clear();
        self.ratings
            .extend(active.iter().enumerate().map(|(i, &(name, count))| OwnerRating {
                name: name.to_string(),
                count,
                rank: i + 1,
                eliminated: false,
                elimination_order: None,
            }));
        let mut fallen = self.eliminated.clone();
        fallen.sort_by_key(|r| r.rank);
        self.ratings.extend(fallen);
        self.ratings.truncate(self.top_k);

        &self.ratings
    }

    /// Leaderboard from the last sample
    pub fn ratings(&self) -> &[OwnerRating] {
        &self.ratings
    }

    /// Every owner eliminated this round, in elimination order
    pub fn eliminated(&self) -> &[OwnerRating] {
        &self.eliminated
    }

    /// Owners still holding entities at the last sample
    pub fn active_count(&self) -> usize {
        self.alive.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn owned(owners: &[&str]) -> Vec<Entity> {
        owners
            .iter()
            .enumerate()
            .map(|(i, o)| {
                let mut e = Entity::new(i as u32, Vec2::ZERO, 0, 5.0);
                e.owner = Some(o.to_string());
                e
            })
            .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_round_robin_reuses_short_lists() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut entities: Vec<Entity> = (0..7).map(|i| Entity::new(i, Vec2::ZERO, 0, 5.0)).collect();
        assign_owners(&names(&["a", "b", "c"]), &mut entities, &mut rng);

        let mut per_owner: BTreeMap<String, usize> = BTreeMap::new();
        for e in &entities {
            *per_owner.entry(e.owner.clone().unwrap()).or_default() += 1;
        }
        let mut spread: Vec<usize> = per_owner.values().copied().collect();
        spread.sort_unstable();
        assert_eq!(spread, vec![2, 2, 3]);
        // Round-robin: the pattern repeats every three entities
        assert_eq!(entities[0].owner, entities[3].owner);
        assert_eq!(entities[1].owner, entities[4].owner);
    }

    #[test]
    fn test_no_names_leaves_entities_unowned() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut entities = vec![Entity::new(1, Vec2::ZERO, 0, 5.0)];
        assign_owners(&[], &mut entities, &mut rng);
        assert_eq!(entities[0].owner, None);
    }

    #[test]
    fn test_sorted_descending_with_ranks() {
        let mut tracker = OwnerTracker::new(10);
        let ratings = tracker.sample(&owned(&["b", "a", "a", "c", "a", "b"]));
        let rows: Vec<(&str, u32, usize)> = ratings
            .iter()
            .map(|r| (r.name.as_str(), r.count, r.rank))
            .collect();
        assert_eq!(rows, vec![("a", 3, 1), ("b", 2, 2), ("c", 1, 3)]);
    }

    #[test]
    fn test_truncates_to_top_k() {
        let mut tracker = OwnerTracker::new(2);
        tracker.sample(&owned(&["a", "b", "c", "c"]));
        assert_eq!(tracker.ratings().len(), 2);
        assert_eq!(tracker.ratings()[0].name, "c");
        assert_eq!(tracker.active_count(), 3);
    }

    #[test]
    fn test_elimination_ranks_are_fixed_and_monotonic() {
        let mut tracker = OwnerTracker::new(10);
        tracker.sample(&owned(&["a", "b", "c", "d", "e"]));

        // "e" converted away first: four left, so it finishes fifth
        tracker.sample(&owned(&["a", "b", "c", "d", "d"]));
        // then "c" and "d" in the same sample
        tracker.sample(&owned(&["a", "b", "b", "a", "a"]));

        let eliminated = tracker.eliminated();
        let rows: Vec<(&str, usize, Option<usize>)> = eliminated
            .iter()
            .map(|r| (r.name.as_str(), r.rank, r.elimination_order))
            .collect();
        assert_eq!(
            rows,
            vec![("e", 5, Some(1)), ("c", 3, Some(2)), ("d", 4, Some(3))]
        );

        // Eliminated rows stay visible with zero count after the live ones
        let board: Vec<(&str, u32, usize, bool)> = tracker
            .ratings()
            .iter()
            .map(|r| (r.name.as_str(), r.count, r.rank, r.eliminated))
            .collect();
        assert_eq!(
            board,
            vec![
                ("a", 3, 1, false),
                ("b", 2, 2, false),
                ("c", 0, 3, true),
                ("d", 0, 4, true),
                ("e", 0, 5, true),
            ]
        );

        // Ranks never move on later samples
        tracker.sample(&owned(&["a", "a", "a", "a", "a"]));
        assert_eq!(tracker.eliminated()[0].rank, 5);
        assert_eq!(tracker.eliminated()[3].name, "b");
        assert_eq!(tracker.eliminated()[3].rank, 2);
    }

    #[test]
    fn test_counts_follow_conversions() {
        let mut tracker = OwnerTracker::new(10);
        let mut entities = owned(&["x", "y", "y"]);
        tracker.sample(&entities);
        assert_eq!(tracker.ratings()[0].name, "y");

        // Both "y" entities lose to an "x" entity
        entities[1].owner = Some("x".to_string());
        entities[2].owner = Some("x".to_string());
        tracker.sample(&entities);
        assert_eq!(tracker.ratings()[0].name, "x");
        assert_eq!(tracker.ratings()[0].count, 3);
        assert!(tracker.ratings()[1].eliminated);
    }

    #[test]
    fn test_reset_clears_eliminations() {
        let mut tracker = OwnerTracker::new(10);
        tracker.sample(&owned(&["a", "b"]));
        tracker.sample(&owned(&["a", "a"]));
        assert_eq!(tracker.eliminated().len(), 1);
        tracker.reset();
        assert!(tracker.eliminated().is_empty());
        assert!(tracker.ratings().is_empty());
    }

    #[test]
    fn test_winning_owner_is_one_of_the_survivors() {
        let mut rng = Pcg32::seed_from_u64(3);
        let entities = owned(&["p", "q", "q", "r"]);
        for _ in 0..50 {
            let winner = pick_winning_owner(&entities, &mut rng).unwrap();
            assert!(["p", "q", "r"].contains(&winner.as_str()));
        }
        assert_eq!(pick_winning_owner(&[], &mut rng), None);
    }
}
