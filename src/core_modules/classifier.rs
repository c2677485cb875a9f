// THEORY:
// Pass 3 turns the two counts from the earlier passes into a label. It is a plain
// threshold table with no state: heavy motion wins outright, otherwise the number
// of vertical edges along the scanline separates a flat wall (almost none), a box
// (a handful) and a more complex object such as another robot (many).
//
// The proximity override lives here too but is applied by the caller, because it
// needs the range reading that the vision passes never see.

use crate::pipeline::PipelineConfig;
use std::fmt;

/// Classification of the scene in front of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Flat background with at most `wall_edge_limit` edges.
    Wall,
    /// Simple static object.
    Box,
    /// Static object with many vertical features.
    Complex,
    /// Enough motion between frames to call the obstacle moving.
    Dynamic,
    /// No frame pair available yet.
    Waiting,
    /// A "wall" seen from so close that the wall heuristic cannot be trusted.
    UnknownObstacle,
}

impl Label {
    pub fn is_wall(&self) -> bool {
        matches!(self, Label::Wall)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Label::Wall => "WALL (Background)",
            Label::Box => "STATIC (Box)",
            Label::Complex => "STATIC (Complex Obj)",
            Label::Dynamic => "DYNAMIC (Moving)",
            Label::Waiting => "WAITING",
            Label::UnknownObstacle => "STATIC (Unknown Obstacle)",
        };
        f.pad(text)
    }
}

pub fn classify(moving_pixels: u32, edge_count: u32, config: &PipelineConfig) -> Label {
    if moving_pixels > config.dynamic_motion_threshold {
        Label::Dynamic
    } else if edge_count <= config.wall_edge_limit {
        Label::Wall
    } else if edge_count <= config.box_edge_limit {
        Label::Box
    } else {
        Label::Complex
    }
}

/// Relabels a wall as an unknown obstacle when it is closer than `close_range_cm`.
pub fn apply_proximity_override(label: Label, distance_cm: f64, close_range_cm: f64) -> Label {
    if label.is_wall() && distance_cm < close_range_cm {
        Label::UnknownObstacle
    } else {
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(moving: u32, edges: u32) -> Label {
        classify(moving, edges, &PipelineConfig::default())
    }

    #[test]
    fn edge_count_boundaries() {
        assert_eq!(label(0, 0), Label::Wall);
        assert_eq!(label(0, 1), Label::Wall);
        assert_eq!(label(0, 2), Label::Box);
        assert_eq!(label(0, 8), Label::Box);
        assert_eq!(label(0, 9), Label::Complex);
    }

    #[test]
    fn motion_wins_regardless_of_edges() {
        assert_eq!(label(50, 0), Label::Wall);
        for edges in [0, 1, 5, 9, 400] {
            assert_eq!(label(51, edges), Label::Dynamic);
        }
    }

    #[test]
    fn classification_is_deterministic() {
        for moving in [0, 25, 50, 51, 1000] {
            for edges in 0..12 {
                assert_eq!(label(moving, edges), label(moving, edges));
            }
        }
    }

    #[test]
    fn close_wall_becomes_unknown_obstacle() {
        assert_eq!(apply_proximity_override(Label::Wall, 5.0, 8.0), Label::UnknownObstacle);
        assert_eq!(apply_proximity_override(Label::Wall, 8.0, 8.0), Label::Wall);
        assert_eq!(apply_proximity_override(Label::Box, 5.0, 8.0), Label::Box);
    }

    #[test]
    fn display_respects_padding() {
        assert_eq!(format!("{:22}|", Label::Box), "STATIC (Box)          |");
    }
}
