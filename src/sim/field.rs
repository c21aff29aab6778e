//! Falling blocks and the field that owns them

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{GameEvent, MissKind};
use super::lane::LaneTrack;
use super::score::ScoreState;
use crate::consts::*;

/// Lifecycle of a block; exactly one applies at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockStatus {
    #[default]
    Live,
    Hit,
    Missed,
}

/// A falling block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    pub lane: usize,
    /// Top edge (grows downward)
    pub y: f32,
    pub height: f32,
    /// Host timestamp at spawn (ms)
    pub spawn_time_ms: f64,
    /// Fall speed captured from the profile at spawn
    pub speed: f32,
    pub status: BlockStatus,
}

impl Block {
    pub fn new(id: u32, lane: usize, speed: f32, spawn_time_ms: f64) -> Self {
        Self {
            id,
            lane,
            y: BLOCK_SPAWN_Y,
            height: BLOCK_HEIGHT,
            spawn_time_ms,
            speed,
            status: BlockStatus::Live,
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.status == BlockStatus::Live
    }

    /// Flag as hit; only a live block can be hit
    pub fn mark_hit(&mut self) -> bool {
        if self.is_live() {
            self.status = BlockStatus::Hit;
            true
        } else {
            false
        }
    }

    /// Flag as missed; only a live block can be missed
    pub fn mark_missed(&mut self) -> bool {
        if self.is_live() {
            self.status = BlockStatus::Missed;
            true
        } else {
            false
        }
    }

    /// Block center for effects, given its lane
    pub fn center(&self, lane: &LaneTrack) -> Vec2 {
        Vec2::new(lane.center_x(), self.y + self.height / 2.0)
    }
}

/// Owns every block currently on screen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockField {
    blocks: Vec<Block>,
    field_height: f32,
    next_id: u32,
}

impl BlockField {
    pub fn new(field_height: f32) -> Self {
        Self {
            blocks: Vec::new(),
            field_height,
            next_id: 1,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    pub fn field_height(&self) -> f32 {
        self.field_height
    }

    /// Add a new block at the spawn line; returns its id
    pub fn push(&mut self, lane: usize, speed: f32, spawn_time_ms: f64) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.blocks.push(Block::new(id, lane, speed, spawn_time_ms));
        id
    }

    /// Move every block down, flag fall-through misses, then drop far-off blocks
    pub fn advance(&mut self, delta_ms: f64, score: &mut ScoreState, events: &mut Vec<GameEvent>) {
        let frames = delta_ms as f32 / REFERENCE_FRAME_MS;
        let miss_line = self.field_height + MISS_MARGIN;
        let cull_line = self.field_height + CULL_MARGIN;

        for block in &mut self.blocks {
            block.y += block.speed * frames;

            if block.top() > miss_line && block.mark_missed() {
                score.record_miss();
                log::debug!("Block {} fell through lane {}", block.id, block.lane);
                events.push(GameEvent::Miss {
                    lane: block.lane,
                    kind: MissKind::FellThrough,
                });
            }
        }

        self.blocks.retain(|b| b.top() <= cull_line);
    }
}
