//! Effects emitted by the gameplay core for the host's collaborators
//!
//! The core never plays sounds or draws; it queues events and the host drains
//! them once per frame.

use glam::Vec2;

use super::judge::Rating;

/// Sound cues understood by the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Perfect,
    Good,
    Miss,
}

/// Why a miss was counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissKind {
    /// A live block fell past the bottom of the field
    FellThrough,
    /// A mapped key was pressed with nothing in the hit zone
    EmptyPress,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A block entered the field
    Spawned { block_id: u32, lane: usize },
    /// A key press scored a block
    Hit {
        block_id: u32,
        lane: usize,
        rating: Rating,
        points: u64,
        reaction_ms: f64,
    },
    /// Combo broken
    Miss { lane: usize, kind: MissKind },
    /// Particle burst for the visual-effects collaborator
    HitEffect {
        lane: usize,
        pos: Vec2,
        color: &'static str,
    },
    /// One second of the countdown elapsed
    TimeTick { time_left: u32 },
    /// The countdown ran out and the run finished normally
    TimeUp,
}

impl GameEvent {
    /// Sound to play for this event, if any
    pub fn sound_cue(&self) -> Option<SoundCue> {
        match self {
            GameEvent::Hit { rating, .. } => Some(match rating {
                Rating::Perfect => SoundCue::Perfect,
                Rating::Good | Rating::Late => SoundCue::Good,
            }),
            GameEvent::Miss { .. } => Some(SoundCue::Miss),
            _ => None,
        }
    }

    /// Feedback text for the combo display, if any
    pub fn feedback(&self) -> Option<(&'static str, FeedbackStyle)> {
        match self {
            GameEvent::Hit { rating, .. } => rating.feedback().map(|t| (t, FeedbackStyle::Hit)),
            GameEvent::Miss { .. } => Some(("Miss!", FeedbackStyle::Miss)),
            _ => None,
        }
    }
}

/// Styling class for feedback text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackStyle {
    Hit,
    Miss,
}

impl FeedbackStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStyle::Hit => "perfect",
            FeedbackStyle::Miss => "miss",
        }
    }
}
