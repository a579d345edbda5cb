//! Random dice resolver - Rolls d20 pools locally
//!
//! Stands in for the external dice service. Scoring is deterministic given the
//! faces, so it lives in [`score`] and the resolver only supplies randomness.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::application::dto::{DiceRequest, DiceResponse};
use crate::application::ports::outbound::DiceResolverPort;

/// Faces on each die
const DIE_SIDES: u32 = 20;

pub struct RandomDiceResolver {
    rng: Mutex<StdRng>,
}

impl RandomDiceResolver {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// A resolver with a reproducible sequence
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomDiceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceResolverPort for RandomDiceResolver {
    fn resolve(&self, request: &DiceRequest) -> DiceResponse {
        let faces: Vec<u32> = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            (0..request.dice_count)
                .map(|_| rng.gen_range(1..=DIE_SIDES))
                .collect()
        };
        score(request, faces)
    }
}

/// Score rolled faces against a request
///
/// A face at or under the target number is one success, at or under the focus
/// two. A natural 20 is a complication. Successes beyond the difficulty become
/// momentum.
pub fn score(request: &DiceRequest, faces: Vec<u32>) -> DiceResponse {
    let mut successes = 0;
    let mut complications = 0;
    for &face in &faces {
        if face <= request.focus {
            successes += 2;
        } else if face <= request.target_number {
            successes += 1;
        }
        if face == DIE_SIDES {
            complications += 1;
        }
    }
    DiceResponse {
        successes,
        complications,
        momentum_generated: successes.saturating_sub(request.difficulty),
        rolls: faces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(dice_count: u32) -> DiceRequest {
        DiceRequest {
            target_number: 12,
            difficulty: 2,
            dice_count,
            focus: 3,
        }
    }

    #[test]
    fn test_score_counts_focus_twice_and_twenties() {
        let response = score(&request(4), vec![2, 11, 15, 20]);
        assert_eq!(response.successes, 3);
        assert_eq!(response.complications, 1);
        assert_eq!(response.momentum_generated, 1);
        assert!(response.succeeded(2));
    }

    #[test]
    fn test_score_failure_generates_no_momentum() {
        let response = score(&request(2), vec![13, 19]);
        assert_eq!(response.successes, 0);
        assert_eq!(response.momentum_generated, 0);
        assert!(!response.succeeded(2));
    }

    #[test]
    fn test_seeded_resolver_is_reproducible() {
        let a = RandomDiceResolver::seeded(7).resolve(&request(5));
        let b = RandomDiceResolver::seeded(7).resolve(&request(5));
        assert_eq!(a, b);
        assert_eq!(a.rolls.len(), 5);
        assert!(a.rolls.iter().all(|face| (1..=20).contains(face)));
    }
}
