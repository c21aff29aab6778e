//! Game session state machine
//!
//! Owns every gameplay component for one run. The host drives it: `frame` once
//! per animation frame, `key_down`/`tap` on input, then `drain_events` and
//! `render_state` to feed its audio and drawing collaborators.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::TimingClock;
use super::difficulty::{Difficulty, DifficultyProfile};
use super::events::GameEvent;
use super::field::{BlockField, BlockStatus};
use super::judge::{HitJudge, Judgment};
use super::lane::{LaneTrack, lane_at_x, lanes};
use super::score::{RatingTally, ScoreState};
use super::spawner::BlockSpawner;
use crate::consts::*;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Menu, nothing running
    Start,
    Playing,
    Paused,
    GameOver,
}

/// How the last run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Countdown reached zero; results are shown and recorded
    TimeUp,
    /// Player quit; the run is discarded
    Terminated,
}

/// Final results of a normally completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub max_combo: u32,
    pub accuracy: f64,
    pub difficulty: Difficulty,
    pub tally: RatingTally,
    pub total_hits: u32,
    pub total_spawned: u32,
    pub mean_reaction_ms: Option<f64>,
    /// Host wall-clock time the run ended (ms since epoch)
    pub finished_at_ms: f64,
}

/// Immutable per-frame snapshot for the render collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub phase: GamePhase,
    pub blocks: Vec<RenderBlock>,
    pub combo: u32,
    /// Draw the "N COMBO" banner
    pub show_combo_banner: bool,
    pub paused: bool,
    pub score: u64,
    pub time_left: u32,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderBlock {
    pub id: u32,
    pub lane: usize,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub status: BlockStatus,
    pub color: &'static str,
    pub key: char,
}

pub struct GameSession {
    phase: GamePhase,
    difficulty: Difficulty,
    profile: DifficultyProfile,
    duration_secs: u32,
    lanes: [LaneTrack; LANE_COUNT],
    field: BlockField,
    spawner: BlockSpawner,
    judge: HitJudge,
    score: ScoreState,
    clock: TimingClock,
    events: Vec<GameEvent>,
    end_reason: Option<EndReason>,
    summary: Option<RunSummary>,
}

impl GameSession {
    /// Create a session sitting in the start menu
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_duration(difficulty, SESSION_SECONDS)
    }

    /// Create a session with a non-standard run length
    pub fn with_duration(difficulty: Difficulty, duration_secs: u32) -> Self {
        let profile = difficulty.profile();
        Self {
            phase: GamePhase::Start,
            difficulty,
            profile,
            duration_secs,
            lanes: lanes(),
            field: BlockField::new(FIELD_HEIGHT),
            spawner: BlockSpawner::new(&profile, 0),
            judge: HitJudge::new(&profile, FIELD_HEIGHT),
            score: ScoreState::new(),
            clock: TimingClock::new(duration_secs),
            events: Vec::new(),
            end_reason: None,
            summary: None,
        }
    }

    // === Commands ===

    /// Change difficulty; only allowed while no run is active
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> bool {
        match self.phase {
            GamePhase::Start | GamePhase::GameOver => {
                self.difficulty = difficulty;
                self.profile = difficulty.profile();
                log::info!("Difficulty set to {}", difficulty.as_str());
                true
            }
            GamePhase::Playing | GamePhase::Paused => {
                log::warn!("Ignoring difficulty change during a run");
                false
            }
        }
    }

    /// Reset all run data and begin playing
    pub fn start(&mut self, seed: u64) -> bool {
        if !matches!(self.phase, GamePhase::Start | GamePhase::GameOver) {
            return false;
        }

        self.field = BlockField::new(FIELD_HEIGHT);
        self.spawner = BlockSpawner::new(&self.profile, seed);
        self.judge = HitJudge::new(&self.profile, FIELD_HEIGHT);
        self.score = ScoreState::new();
        self.clock.reset(self.duration_secs);
        self.events.clear();
        self.end_reason = None;
        self.summary = None;
        self.phase = GamePhase::Playing;

        log::info!(
            "Run started ({}, {}s, seed {})",
            self.difficulty.as_str(),
            self.duration_secs,
            seed
        );
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.phase = GamePhase::Paused;
        log::info!("Paused with {}s left", self.clock.time_left());
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.clock.reset_baseline();
        self.phase = GamePhase::Playing;
        log::info!("Resumed with {}s left", self.clock.time_left());
        true
    }

    /// Abandon the current run without recording it
    pub fn terminate(&mut self) -> bool {
        if !matches!(self.phase, GamePhase::Playing | GamePhase::Paused) {
            return false;
        }
        self.phase = GamePhase::GameOver;
        self.end_reason = Some(EndReason::Terminated);
        self.summary = None;
        self.events.clear();
        log::info!("Run terminated, score discarded");
        true
    }

    /// Leave the results screen for the start menu
    pub fn return_to_menu(&mut self) -> bool {
        if !matches!(self.phase, GamePhase::Start | GamePhase::GameOver) {
            return false;
        }
        self.phase = GamePhase::Start;
        true
    }

    /// Primary button: start, pause or resume depending on phase
    pub fn toggle(&mut self, seed: u64) -> bool {
        match self.phase {
            GamePhase::Start | GamePhase::GameOver => self.start(seed),
            GamePhase::Playing => self.pause(),
            GamePhase::Paused => self.resume(),
        }
    }

    /// Secondary button: back to menu when idle, quit the run when active
    pub fn mode_button(&mut self) -> bool {
        match self.phase {
            GamePhase::Start | GamePhase::GameOver => self.return_to_menu(),
            GamePhase::Playing | GamePhase::Paused => self.terminate(),
        }
    }

    // === Per-frame update ===

    /// Advance by the time since the previous frame.
    ///
    /// Returns the run summary on the frame the countdown runs out.
    pub fn frame(&mut self, now_ms: f64) -> Option<RunSummary> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        let delta_ms = self.clock.frame_delta(now_ms);
        self.advance(delta_ms, now_ms)
    }

    /// Advance by an explicit delta (ms)
    pub fn advance(&mut self, delta_ms: f64, now_ms: f64) -> Option<RunSummary> {
        if self.phase != GamePhase::Playing {
            return None;
        }

        self.field.advance(delta_ms, &mut self.score, &mut self.events);
        self.spawner.update(
            delta_ms,
            now_ms,
            &mut self.field,
            &mut self.score,
            &mut self.events,
        );

        if self.clock.advance_countdown(delta_ms) > 0 {
            self.events.push(GameEvent::TimeTick {
                time_left: self.clock.time_left(),
            });
        }

        if self.clock.expired() {
            return Some(self.finish(now_ms));
        }
        None
    }

    fn finish(&mut self, now_ms: f64) -> RunSummary {
        let summary = RunSummary {
            score: self.score.score,
            max_combo: self.score.max_combo,
            accuracy: self.score.accuracy(),
            difficulty: self.difficulty,
            tally: self.score.tally,
            total_hits: self.score.total_hits,
            total_spawned: self.score.total_spawned,
            mean_reaction_ms: self.score.mean_reaction_ms(),
            finished_at_ms: now_ms,
        };
        self.phase = GamePhase::GameOver;
        self.end_reason = Some(EndReason::TimeUp);
        self.summary = Some(summary.clone());
        self.events.push(GameEvent::TimeUp);

        log::info!(
            "Time up: score {}, max combo {}, accuracy {:.1}%",
            summary.score,
            summary.max_combo,
            summary.accuracy
        );
        summary
    }

    // === Input ===

    /// Key press; ignored unless playing
    pub fn key_down(&mut self, key: char, now_ms: f64) -> Judgment {
        if self.phase != GamePhase::Playing {
            return Judgment::Ignored;
        }
        self.judge.judge(
            key,
            now_ms,
            &mut self.field,
            &self.lanes,
            &mut self.score,
            &mut self.events,
        )
    }

    /// Touch at horizontal position `x` on a surface `surface_width` wide
    pub fn tap(&mut self, x: f32, surface_width: f32, now_ms: f64) -> Judgment {
        if self.phase != GamePhase::Playing {
            return Judgment::Ignored;
        }
        let Some(lane) = lane_at_x(x, surface_width) else {
            return Judgment::Ignored;
        };
        self.judge.judge_lane(
            lane,
            now_ms,
            &mut self.field,
            &self.lanes,
            &mut self.score,
            &mut self.events,
        )
    }

    // === Output ===

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn render_state(&self) -> RenderState {
        let blocks = self
            .field
            .blocks()
            .iter()
            .map(|block| {
                let lane = &self.lanes[block.lane];
                RenderBlock {
                    id: block.id,
                    lane: block.lane,
                    pos: Vec2::new(lane.x, block.y),
                    size: Vec2::new(lane.width, block.height),
                    status: block.status,
                    color: lane.color,
                    key: lane.key,
                }
            })
            .collect();

        RenderState {
            phase: self.phase,
            blocks,
            combo: self.score.combo,
            show_combo_banner: self.score.combo >= COMBO_BANNER_THRESHOLD,
            paused: self.phase == GamePhase::Paused,
            score: self.score.score,
            time_left: self.clock.time_left(),
            accuracy: self.score.accuracy(),
        }
    }

    /// Label for the primary (start/pause/resume) button
    pub fn start_label(&self) -> &'static str {
        match self.phase {
            GamePhase::Start | GamePhase::GameOver => "Start",
            GamePhase::Playing => "Pause",
            GamePhase::Paused => "Resume",
        }
    }

    /// Label for the secondary (difficulty/end) button
    pub fn mode_label(&self) -> &'static str {
        match self.phase {
            GamePhase::Start | GamePhase::GameOver => "Difficulty",
            GamePhase::Playing | GamePhase::Paused => "End Game",
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn lanes(&self) -> &[LaneTrack; LANE_COUNT] {
        &self.lanes
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn field(&self) -> &BlockField {
        &self.field
    }

    pub fn time_left(&self) -> u32 {
        self.clock.time_left()
    }

    pub fn accuracy(&self) -> f64 {
        self.score.accuracy()
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    /// Results of the last normally completed run
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::MissKind;

    const FRAME: f64 = 16.0;

    /// Run frames of FRAME ms starting at `start`; returns the next timestamp
    fn run_frames(session: &mut GameSession, start: f64, count: usize) -> f64 {
        let mut now = start;
        for _ in 0..count {
            session.frame(now);
            now += FRAME;
        }
        now
    }

    #[test]
    fn test_start_resets_and_plays() {
        let mut session = GameSession::new(Difficulty::Easy);
        assert_eq!(session.phase(), GamePhase::Start);
        assert_eq!(session.accuracy(), 100.0);

        assert!(session.start(7));
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.time_left(), SESSION_SECONDS);
        assert!(session.field().is_empty());

        // Starting again mid-run is refused
        assert!(!session.start(8));
    }

    #[test]
    fn test_frames_spawn_and_move_blocks() {
        let mut session = GameSession::new(Difficulty::Hard);
        session.start(1);
        run_frames(&mut session, 0.0, 120);

        assert!(session.score().total_spawned > 0);
        assert_eq!(session.score().total_spawned as usize, session.field().len());
        assert!(session.field().blocks().iter().all(|b| b.y >= BLOCK_SPAWN_Y));
        assert!(session.field().blocks()[0].y > BLOCK_SPAWN_Y);
    }

    #[test]
    fn test_pause_freezes_field_and_countdown() {
        let mut session = GameSession::new(Difficulty::Easy);
        session.start(3);
        let now = run_frames(&mut session, 0.0, 200);
        let time_left = session.time_left();
        let positions: Vec<f32> = session.field().blocks().iter().map(|b| b.y).collect();

        assert!(session.pause());
        assert_eq!(session.phase(), GamePhase::Paused);
        assert!(session.render_state().paused);

        // A long stretch of paused frames changes nothing
        let now = run_frames(&mut session, now, 500);
        assert_eq!(session.time_left(), time_left);
        let paused: Vec<f32> = session.field().blocks().iter().map(|b| b.y).collect();
        assert_eq!(positions, paused);

        // Resuming ten seconds later does not catch up
        assert!(session.resume());
        session.frame(now + 10_000.0);
        assert_eq!(session.time_left(), time_left);
        let resumed: Vec<f32> = session.field().blocks().iter().map(|b| b.y).collect();
        assert_eq!(positions, resumed);
    }

    #[test]
    fn test_keys_ignored_outside_playing() {
        let mut session = GameSession::new(Difficulty::Easy);
        assert_eq!(session.key_down('q', 0.0), Judgment::Ignored);

        session.start(1);
        session.pause();
        assert_eq!(session.key_down('q', 0.0), Judgment::Ignored);
        assert_eq!(session.tap(10.0, 400.0, 0.0), Judgment::Ignored);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_empty_press_while_playing_breaks_combo() {
        let mut session = GameSession::new(Difficulty::Easy);
        session.start(1);
        session.score.combo = 6;

        assert_eq!(session.key_down('w', 0.0), Judgment::Miss { lane: 1 });
        assert_eq!(session.score().combo, 0);
        assert_eq!(session.score().score, 0);
        assert_eq!(
            session.drain_events(),
            vec![GameEvent::Miss {
                lane: 1,
                kind: MissKind::EmptyPress
            }]
        );
    }

    #[test]
    fn test_tap_maps_to_lane() {
        let mut session = GameSession::new(Difficulty::Easy);
        session.start(1);
        assert_eq!(session.tap(250.0, 400.0, 0.0), Judgment::Miss { lane: 2 });
        assert_eq!(session.tap(800.0, 400.0, 0.0), Judgment::Ignored);
    }

    #[test]
    fn test_normal_end_produces_summary_once() {
        let mut session = GameSession::with_duration(Difficulty::Medium, 2);
        session.start(5);

        let mut now = 0.0;
        let mut summaries = Vec::new();
        for _ in 0..400 {
            if let Some(summary) = session.frame(now) {
                summaries.push(summary);
            }
            now += FRAME;
        }

        assert_eq!(summaries.len(), 1);
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert_eq!(session.end_reason(), Some(EndReason::TimeUp));
        assert_eq!(session.time_left(), 0);
        let summary = &summaries[0];
        assert_eq!(summary.difficulty, Difficulty::Medium);
        assert_eq!(Some(summary), session.summary());
        assert!(session.drain_events().contains(&GameEvent::TimeUp));
    }

    #[test]
    fn test_slow_frames_end_run_on_wall_time() {
        let mut session = GameSession::new(Difficulty::Easy);
        session.start(9);

        let mut ticks = Vec::new();
        let mut now = 0.0;
        let mut ended_at = None;
        while now <= 61_000.0 {
            if session.frame(now).is_some() {
                ended_at = Some(now);
            }
            for event in session.drain_events() {
                if let GameEvent::TimeTick { time_left } = event {
                    ticks.push(time_left);
                }
            }
            if ended_at.is_some() {
                break;
            }
            now += 250.0;
        }

        assert_eq!(ended_at, Some(SESSION_SECONDS as f64 * 1000.0));
        assert_eq!(session.phase(), GamePhase::GameOver);
        let expected: Vec<u32> = (0..SESSION_SECONDS).rev().collect();
        assert_eq!(ticks, expected);
    }

    #[test]
    fn test_long_frame_moves_blocks_full_distance() {
        let mut session = GameSession::new(Difficulty::Easy);
        session.start(4);

        let mut now = 0.0;
        while session.field().is_empty() {
            session.frame(now);
            now += 250.0;
        }
        let block = &session.field().blocks()[0];
        let (id, y, speed) = (block.id, block.y, block.speed);
        assert_eq!(y, BLOCK_SPAWN_Y);

        session.frame(now - 250.0 + 200.0);
        let moved = session
            .field()
            .blocks()
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.y - y);
        assert_eq!(moved, Some(speed * (200.0 / REFERENCE_FRAME_MS)));
    }

    #[test]
    fn test_terminate_discards_run() {
        let mut session = GameSession::new(Difficulty::Easy);
        session.start(1);
        run_frames(&mut session, 0.0, 100);
        session.pause();

        assert!(session.terminate());
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert_eq!(session.end_reason(), Some(EndReason::Terminated));
        assert!(session.summary().is_none());
        assert!(session.frame(10_000.0).is_none());

        assert!(session.mode_button());
        assert_eq!(session.phase(), GamePhase::Start);
    }

    #[test]
    fn test_restart_clears_previous_run() {
        let mut session = GameSession::with_duration(Difficulty::Easy, 1);
        session.start(1);
        run_frames(&mut session, 0.0, 100);
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert!(session.score().total_spawned > 0);

        assert!(session.toggle(2));
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.score().total_spawned, 0);
        assert_eq!(session.score().score, 0);
        assert_eq!(session.time_left(), 1);
        assert!(session.field().is_empty());
        assert!(session.summary().is_none());
    }

    #[test]
    fn test_difficulty_locked_during_run() {
        let mut session = GameSession::new(Difficulty::Easy);
        assert!(session.set_difficulty(Difficulty::Hard));
        session.start(1);
        assert!(!session.set_difficulty(Difficulty::Easy));
        assert_eq!(session.difficulty(), Difficulty::Hard);
        assert_eq!(session.profile().perfect_window, 100.0);
    }

    #[test]
    fn test_toggle_and_labels() {
        let mut session = GameSession::new(Difficulty::Easy);
        assert_eq!(session.start_label(), "Start");
        assert_eq!(session.mode_label(), "Difficulty");

        session.toggle(1);
        assert_eq!(session.start_label(), "Pause");
        assert_eq!(session.mode_label(), "End Game");

        session.toggle(1);
        assert_eq!(session.phase(), GamePhase::Paused);
        assert_eq!(session.start_label(), "Resume");

        session.toggle(1);
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_combo_banner_threshold() {
        let mut session = GameSession::new(Difficulty::Easy);
        session.start(1);
        session.score.combo = COMBO_BANNER_THRESHOLD - 1;
        assert!(!session.render_state().show_combo_banner);
        session.score.combo = COMBO_BANNER_THRESHOLD;
        assert!(session.render_state().show_combo_banner);
    }

    #[test]
    fn test_block_status_never_both() {
        // Hit everything reachable in lane 0, let the rest fall through
        let mut session = GameSession::new(Difficulty::Hard);
        session.start(11);
        let mut now = 0.0;
        for i in 0..2000 {
            session.frame(now);
            if i % 3 == 0 {
                session.key_down('q', now);
            }
            now += FRAME;
        }
        let score = session.score();
        assert!(score.total_hits <= score.total_spawned);
        assert!(score.max_combo >= score.combo);
        assert!((0.0..=100.0).contains(&session.accuracy()));
    }
}
