//! Key-press hit judgment
//!
//! A press is matched against the first live block in its lane whose span
//! overlaps the hit zone (field order, no distance sort). Rating comes from the
//! distance between the block's bottom edge and the zone center.

use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyProfile;
use super::events::{GameEvent, MissKind};
use super::field::BlockField;
use super::lane::{LaneTrack, lane_for_key};
use super::score::ScoreState;
use crate::consts::*;

/// Hit quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Perfect,
    Good,
    Late,
}

impl Rating {
    /// Rate a hit by distance from the zone center, given the profile window
    pub fn from_distance(distance: f32, perfect_window: f32) -> Self {
        if distance < perfect_window / 2.0 {
            Rating::Perfect
        } else if distance < perfect_window {
            Rating::Good
        } else {
            // No upper bound: anything that overlapped the zone still counts
            Rating::Late
        }
    }

    pub fn base_points(&self) -> u64 {
        match self {
            Rating::Perfect => 100,
            Rating::Good => 50,
            Rating::Late => 20,
        }
    }

    /// Feedback text shown for this rating (Late has none)
    pub fn feedback(&self) -> Option<&'static str> {
        match self {
            Rating::Perfect => Some("Perfect!"),
            Rating::Good => Some("Good!"),
            Rating::Late => None,
        }
    }
}

/// Multiplier for a hit landing on top of `combo_before` consecutive hits
pub fn combo_multiplier(combo_before: u32) -> f64 {
    (1.0 + combo_before as f64 * COMBO_STEP).min(COMBO_MULTIPLIER_CAP)
}

/// Points awarded for a rating at a given pre-hit combo
pub fn award_points(rating: Rating, combo_before: u32) -> u64 {
    (rating.base_points() as f64 * combo_multiplier(combo_before)).floor() as u64
}

/// Horizontal band near the field bottom where presses are evaluated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitZone {
    pub top: f32,
    pub height: f32,
}

impl HitZone {
    pub fn for_field(field_height: f32) -> Self {
        Self {
            top: field_height - HIT_ZONE_OFFSET,
            height: HIT_ZONE_HEIGHT,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    #[inline]
    pub fn center(&self) -> f32 {
        self.top + self.height / 2.0
    }

    /// Whether a vertical span [top, bottom] touches the band
    pub fn overlaps(&self, top: f32, bottom: f32) -> bool {
        bottom >= self.top && top <= self.bottom()
    }
}

/// Outcome of a single key press
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Judgment {
    Hit {
        block_id: u32,
        lane: usize,
        rating: Rating,
        points: u64,
        reaction_ms: f64,
    },
    /// Mapped key, nothing in the zone
    Miss { lane: usize },
    /// Not one of the lane keys
    Ignored,
}

#[derive(Debug, Clone, Copy)]
pub struct HitJudge {
    pub zone: HitZone,
    pub perfect_window: f32,
}

impl HitJudge {
    pub fn new(profile: &DifficultyProfile, field_height: f32) -> Self {
        Self {
            zone: HitZone::for_field(field_height),
            perfect_window: profile.perfect_window,
        }
    }

    /// Judge a key press
    pub fn judge(
        &self,
        key: char,
        now_ms: f64,
        field: &mut BlockField,
        lanes: &[LaneTrack],
        score: &mut ScoreState,
        events: &mut Vec<GameEvent>,
    ) -> Judgment {
        let Some(lane) = lane_for_key(key) else {
            return Judgment::Ignored;
        };
        self.judge_lane(lane, now_ms, field, lanes, score, events)
    }

    /// Judge a press on a lane (keyboard or touch)
    pub fn judge_lane(
        &self,
        lane: usize,
        now_ms: f64,
        field: &mut BlockField,
        lanes: &[LaneTrack],
        score: &mut ScoreState,
        events: &mut Vec<GameEvent>,
    ) -> Judgment {
        let candidate = field
            .blocks_mut()
            .iter_mut()
            .find(|b| b.lane == lane && b.is_live() && self.zone.overlaps(b.top(), b.bottom()));

        let Some(block) = candidate else {
            score.record_miss();
            events.push(GameEvent::Miss {
                lane,
                kind: MissKind::EmptyPress,
            });
            return Judgment::Miss { lane };
        };

        let reaction_ms = now_ms - block.spawn_time_ms;
        let distance = (block.bottom() - self.zone.center()).abs();
        let rating = Rating::from_distance(distance, self.perfect_window);
        let points = award_points(rating, score.combo);

        block.mark_hit();
        score.record_hit(rating, points, reaction_ms);

        log::debug!(
            "Lane {} {:?} (distance {:.1}, +{}, combo {})",
            lane,
            rating,
            distance,
            points,
            score.combo
        );

        events.push(GameEvent::Hit {
            block_id: block.id,
            lane,
            rating,
            points,
            reaction_ms,
        });
        if let Some(track) = lanes.get(lane) {
            events.push(GameEvent::HitEffect {
                lane,
                pos: block.center(track),
                color: track.color,
            });
        }

        Judgment::Hit {
            block_id: block.id,
            lane,
            rating,
            points,
            reaction_ms,
        }
    }
}
