//! Lane Rush - A four-lane falling-block reaction game
//!
//! Core modules:
//! - `sim`: Gameplay core (spawning, falling, hit judgment, scoring, session state machine)
//! - `records`: Ranked run history
//! - `persistence`: Key-value storage seam used by records and settings
//! - `platform`: Browser storage backend
//! - `settings`: Player preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod persistence;
pub mod platform;
pub mod records;
pub mod settings;
pub mod sim;

pub use records::{Records, SessionRecord};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Logical playfield size (the host scales to its canvas)
    pub const FIELD_WIDTH: f32 = 400.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Number of lanes (fixed)
    pub const LANE_COUNT: usize = 4;

    /// Hit zone band: top edge sits this far above the field bottom
    pub const HIT_ZONE_OFFSET: f32 = 40.0;
    pub const HIT_ZONE_HEIGHT: f32 = 30.0;

    /// Block geometry
    pub const BLOCK_HEIGHT: f32 = 40.0;
    /// Spawn position (above the visible area)
    pub const BLOCK_SPAWN_Y: f32 = -50.0;

    /// A live block whose top passes FIELD_HEIGHT + this is missed
    pub const MISS_MARGIN: f32 = 50.0;
    /// Any block whose top passes FIELD_HEIGHT + this is dropped from the field
    pub const CULL_MARGIN: f32 = 100.0;

    /// Block speeds are expressed per reference frame of this many ms
    pub const REFERENCE_FRAME_MS: f32 = 16.0;

    /// Session length in seconds
    pub const SESSION_SECONDS: u32 = 60;

    /// Show the "N COMBO" banner at this combo and above
    pub const COMBO_BANNER_THRESHOLD: u32 = 5;

    /// Combo multiplier: +10% per combo step, capped at 2x
    pub const COMBO_STEP: f64 = 0.1;
    pub const COMBO_MULTIPLIER_CAP: f64 = 2.0;
}

/// Format an accuracy percentage the way the HUD and record list show it
pub fn format_accuracy(accuracy: f64) -> String {
    format!("{:.1}%", accuracy)
}
