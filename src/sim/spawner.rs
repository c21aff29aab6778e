//! Fixed-rate block emitter

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::difficulty::DifficultyProfile;
use super::events::GameEvent;
use super::field::BlockField;
use super::score::ScoreState;
use crate::consts::LANE_COUNT;

#[derive(Debug, Clone)]
pub struct BlockSpawner {
    rng: Pcg32,
    /// Time since the last spawn (ms)
    accumulator_ms: f64,
    interval_ms: f64,
    speed: f32,
}

impl BlockSpawner {
    pub fn new(profile: &DifficultyProfile, seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            accumulator_ms: 0.0,
            interval_ms: profile.spawn_interval_ms(),
            speed: profile.fall_speed,
        }
    }

    /// Accumulate elapsed time and emit at most one block.
    ///
    /// Once the accumulator exceeds the interval it restarts from zero, so the
    /// overshoot is dropped rather than carried into the next interval.
    pub fn update(
        &mut self,
        delta_ms: f64,
        now_ms: f64,
        field: &mut BlockField,
        score: &mut ScoreState,
        events: &mut Vec<GameEvent>,
    ) -> Option<u32> {
        self.accumulator_ms += delta_ms;
        if self.accumulator_ms <= self.interval_ms {
            return None;
        }
        self.accumulator_ms = 0.0;

        let lane = self.rng.random_range(0..LANE_COUNT);
        let block_id = field.push(lane, self.speed, now_ms);
        score.record_spawn();
        log::debug!("Spawned block {} in lane {}", block_id, lane);
        events.push(GameEvent::Spawned { block_id, lane });
        Some(block_id)
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FIELD_HEIGHT;
    use crate::sim::difficulty::Difficulty;

    fn rig(seed: u64) -> (BlockSpawner, BlockField, ScoreState, Vec<GameEvent>) {
        let profile = Difficulty::Easy.profile();
        (
            BlockSpawner::new(&profile, seed),
            BlockField::new(FIELD_HEIGHT),
            ScoreState::new(),
            Vec::new(),
        )
    }

    #[test]
    fn test_spawns_only_after_interval_exceeded() {
        let (mut spawner, mut field, mut score, mut events) = rig(1);
        let interval = spawner.interval_ms();

        assert!(spawner.update(interval, 0.0, &mut field, &mut score, &mut events).is_none());
        assert!(spawner.update(1.0, 0.0, &mut field, &mut score, &mut events).is_some());
        assert_eq!(field.len(), 1);
        assert_eq!(score.total_spawned, 1);
        assert!(matches!(events[0], GameEvent::Spawned { .. }));
    }

    #[test]
    fn test_overshoot_is_dropped() {
        let (mut spawner, mut field, mut score, mut events) = rig(2);
        let interval = spawner.interval_ms();

        // A huge delta still yields a single block
        spawner.update(interval * 5.0, 0.0, &mut field, &mut score, &mut events);
        assert_eq!(field.len(), 1);
        // And the next one needs a full interval again
        assert!(spawner.update(interval, 0.0, &mut field, &mut score, &mut events).is_none());
    }

    #[test]
    fn test_lanes_are_in_range_and_seeded() {
        let (mut a, mut field_a, mut score_a, mut events_a) = rig(42);
        let (mut b, mut field_b, mut score_b, mut events_b) = rig(42);
        let step = a.interval_ms() + 1.0;

        for i in 0..50 {
            let now = i as f64 * step;
            a.update(step, now, &mut field_a, &mut score_a, &mut events_a);
            b.update(step, now, &mut field_b, &mut score_b, &mut events_b);
        }

        assert_eq!(score_a.total_spawned, 50);
        let lanes_a: Vec<_> = field_a.blocks().iter().map(|blk| blk.lane).collect();
        let lanes_b: Vec<_> = field_b.blocks().iter().map(|blk| blk.lane).collect();
        assert_eq!(lanes_a, lanes_b);
        assert!(lanes_a.iter().all(|&lane| lane < LANE_COUNT));
    }
}
