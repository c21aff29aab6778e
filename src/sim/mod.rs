//! Gameplay core
//!
//! Everything that decides what happens in a run lives here. This module is
//! host-agnostic:
//! - Time comes in as timestamps/deltas from the host
//! - Seeded RNG only
//! - Effects go out as queued events, never direct audio or drawing calls

pub mod clock;
pub mod difficulty;
pub mod events;
pub mod field;
pub mod judge;
pub mod lane;
pub mod score;
pub mod session;
pub mod spawner;

pub use clock::TimingClock;
pub use difficulty::{Difficulty, DifficultyProfile};
pub use events::{FeedbackStyle, GameEvent, MissKind, SoundCue};
pub use field::{Block, BlockField, BlockStatus};
pub use judge::{HitJudge, HitZone, Judgment, Rating, award_points, combo_multiplier};
pub use lane::{LaneTrack, key_for_lane, lane_at_x, lane_for_key, lanes};
pub use score::{RatingTally, ScoreState};
pub use session::{EndReason, GamePhase, GameSession, RenderBlock, RenderState, RunSummary};
pub use spawner::BlockSpawner;
