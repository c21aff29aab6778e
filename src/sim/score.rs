//! Running score, combo and accuracy bookkeeping

use serde::{Deserialize, Serialize};

use super::judge::Rating;

/// Count of each judgment over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingTally {
    pub perfect: u32,
    pub good: u32,
    pub late: u32,
    pub miss: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u64,
    /// Consecutive hits; zeroed by any miss
    pub combo: u32,
    /// High-water mark of `combo`
    pub max_combo: u32,
    pub total_hits: u32,
    pub total_spawned: u32,
    pub tally: RatingTally,
    /// Spawn-to-press time for every hit (ms)
    pub reaction_times: Vec<f64>,
}

impl ScoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hit percentage over everything spawned (100 before anything spawns)
    pub fn accuracy(&self) -> f64 {
        if self.total_spawned == 0 {
            return 100.0;
        }
        (self.total_hits as f64 / self.total_spawned as f64 * 100.0).min(100.0)
    }

    pub fn record_spawn(&mut self) {
        self.total_spawned += 1;
    }

    /// Apply a scored hit; returns the combo value before this hit
    pub fn record_hit(&mut self, rating: Rating, points: u64, reaction_ms: f64) -> u32 {
        let before = self.combo;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.score += points;
        self.total_hits += 1;
        self.reaction_times.push(reaction_ms);
        match rating {
            Rating::Perfect => self.tally.perfect += 1,
            Rating::Good => self.tally.good += 1,
            Rating::Late => self.tally.late += 1,
        }
        before
    }

    pub fn record_miss(&mut self) {
        self.combo = 0;
        self.tally.miss += 1;
    }

    /// Mean reaction time over all hits
    pub fn mean_reaction_ms(&self) -> Option<f64> {
        if self.reaction_times.is_empty() {
            return None;
        }
        Some(self.reaction_times.iter().sum::<f64>() / self.reaction_times.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_accuracy_defaults_to_full() {
        assert_eq!(ScoreState::new().accuracy(), 100.0);
    }

    #[test]
    fn test_accuracy_seven_of_ten() {
        let mut score = ScoreState::new();
        for _ in 0..10 {
            score.record_spawn();
        }
        for _ in 0..7 {
            score.record_hit(Rating::Good, 50, 300.0);
        }
        assert!((score.accuracy() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_miss_resets_combo_keeps_max() {
        let mut score = ScoreState::new();
        score.record_hit(Rating::Perfect, 100, 100.0);
        score.record_hit(Rating::Perfect, 110, 100.0);
        score.record_miss();
        assert_eq!(score.combo, 0);
        assert_eq!(score.max_combo, 2);
        assert_eq!(score.tally.miss, 1);
        assert_eq!(score.score, 210);
    }

    #[test]
    fn test_mean_reaction() {
        let mut score = ScoreState::new();
        assert_eq!(score.mean_reaction_ms(), None);
        score.record_hit(Rating::Late, 20, 200.0);
        score.record_hit(Rating::Late, 20, 400.0);
        assert_eq!(score.mean_reaction_ms(), Some(300.0));
    }

    proptest! {
        #[test]
        fn prop_combo_and_accuracy_invariants(ops in proptest::collection::vec(0u8..3, 0..200)) {
            let mut score = ScoreState::new();
            let mut prev_max = 0;
            for op in ops {
                let prev_combo = score.combo;
                match op {
                    0 => score.record_spawn(),
                    1 => {
                        // Hits are only possible on a spawned, unscored block
                        if score.total_hits < score.total_spawned {
                            score.record_hit(Rating::Good, 50, 250.0);
                            prop_assert_eq!(score.combo, prev_combo + 1);
                        }
                    }
                    _ => {
                        score.record_miss();
                        prop_assert_eq!(score.combo, 0);
                    }
                }
                prop_assert!(score.max_combo >= prev_max);
                prop_assert!(score.max_combo >= score.combo);
                let acc = score.accuracy();
                prop_assert!((0.0..=100.0).contains(&acc));
                prev_max = score.max_combo;
            }
        }
    }
}
