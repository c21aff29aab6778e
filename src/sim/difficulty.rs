//! Difficulty tiers and their timing parameters

use serde::{Deserialize, Serialize};

/// Difficulty tier, chosen before a session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Label for menus and the record list
    pub fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Parameter set for this tier
    pub fn profile(&self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                tier: *self,
                fall_speed: 2.0,
                spawn_rate: 1.5,
                perfect_window: 150.0,
                color: "#00ff88",
            },
            // Medium = easy x1.5
            Difficulty::Medium => DifficultyProfile {
                tier: *self,
                fall_speed: 3.0,
                spawn_rate: 1.8,
                perfect_window: 120.0,
                color: "#ffcc00",
            },
            // Hard = easy x2
            Difficulty::Hard => DifficultyProfile {
                tier: *self,
                fall_speed: 4.0,
                spawn_rate: 2.2,
                perfect_window: 100.0,
                color: "#ff416c",
            },
        }
    }
}

/// Immutable timing parameters for one session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub tier: Difficulty,
    /// Pixels per reference frame (16 ms)
    pub fall_speed: f32,
    /// Blocks per second
    pub spawn_rate: f64,
    /// Distance threshold for Perfect/Good judgment
    pub perfect_window: f32,
    /// Accent color for the difficulty selector
    pub color: &'static str,
}

impl DifficultyProfile {
    /// Milliseconds between spawns
    pub fn spawn_interval_ms(&self) -> f64 {
        1000.0 / self.spawn_rate
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Difficulty::default().profile()
    }
}
