//! Lane geometry and key bindings

use crate::consts::{FIELD_WIDTH, LANE_COUNT};

/// One of the four fixed vertical tracks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneTrack {
    pub index: usize,
    /// Left edge
    pub x: f32,
    pub width: f32,
    /// Bound input key (lowercase)
    pub key: char,
    pub color: &'static str,
}

impl LaneTrack {
    /// Horizontal center of the lane
    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

const LANE_KEYS: [char; LANE_COUNT] = ['q', 'w', 'e', 'r'];
const LANE_COLORS: [&str; LANE_COUNT] = ["#ff416c", "#ffcc00", "#00ff88", "#4169e1"];

/// The four lanes, laid out edge to edge across the field
pub fn lanes() -> [LaneTrack; LANE_COUNT] {
    let width = FIELD_WIDTH / LANE_COUNT as f32;
    std::array::from_fn(|index| LaneTrack {
        index,
        x: width * index as f32,
        width,
        key: LANE_KEYS[index],
        color: LANE_COLORS[index],
    })
}

/// Lane bound to a key, if any (case-insensitive)
pub fn lane_for_key(key: char) -> Option<usize> {
    let key = key.to_ascii_lowercase();
    LANE_KEYS.iter().position(|&k| k == key)
}

/// Lane under a horizontal position (touch input)
pub fn lane_at_x(x: f32, field_width: f32) -> Option<usize> {
    if field_width <= 0.0 || x < 0.0 {
        return None;
    }
    let index = (x / (field_width / LANE_COUNT as f32)).floor() as usize;
    (index < LANE_COUNT).then_some(index)
}

/// Key bound to a lane
pub fn key_for_lane(lane: usize) -> Option<char> {
    LANE_KEYS.get(lane).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lanes_tile_the_field() {
        let lanes = lanes();
        assert_eq!(lanes[0].x, 0.0);
        for pair in lanes.windows(2) {
            assert_eq!(pair[0].x + pair[0].width, pair[1].x);
        }
        let last = lanes[LANE_COUNT - 1];
        assert_eq!(last.x + last.width, FIELD_WIDTH);
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(lane_for_key('q'), Some(0));
        assert_eq!(lane_for_key('W'), Some(1));
        assert_eq!(lane_for_key('e'), Some(2));
        assert_eq!(lane_for_key('r'), Some(3));
        assert_eq!(lane_for_key('x'), None);
        assert_eq!(key_for_lane(3), Some('r'));
        assert_eq!(key_for_lane(4), None);
    }

    #[test]
    fn test_lane_at_x() {
        assert_eq!(lane_at_x(0.0, 400.0), Some(0));
        assert_eq!(lane_at_x(99.9, 400.0), Some(0));
        assert_eq!(lane_at_x(100.0, 400.0), Some(1));
        assert_eq!(lane_at_x(399.0, 400.0), Some(3));
        assert_eq!(lane_at_x(400.0, 400.0), None);
        assert_eq!(lane_at_x(-1.0, 400.0), None);
    }
}
