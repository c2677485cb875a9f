// THEORY:
// The `pipeline` module is the top-level API of the vision side of the controller.
// It chains the three passes (motion/color, edge extraction, classification) over
// a frame pair and returns a single `PipelineResult`. Nothing is cached between
// calls; the behavior state machine decides when a result is worth computing.

use crate::core_modules::classifier::{self, Label};
use crate::core_modules::edge_scan;
use crate::core_modules::frame::Frame;
use crate::core_modules::motion_scan;
use crate::core_modules::pixel::pixel::{GoalColorKey, Luminance};
use crate::core_modules::smoothed_sampler::smoothed_sampler::SmoothedSampler;

/// Configuration for the VisionPipeline, allowing for tunable behavior.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum brightness change (exclusive) for a sample to count as moving.
    pub motion_sensitivity: Luminance,
    /// Minimum smoothed brightness jump (exclusive) for a vertical edge.
    pub edge_sensitivity: Luminance,
    pub goal_color: GoalColorKey,
    /// Grid step of the motion/color pass on both axes.
    pub sample_stride: usize,
    /// Moving-sample count above which the obstacle is `Dynamic`.
    pub dynamic_motion_threshold: u32,
    pub wall_edge_limit: u32,
    pub box_edge_limit: u32,
    /// Columns skipped after an edge is counted.
    pub edge_cooldown_columns: u32,
    /// Edges closer than this to either side of the frame are ignored.
    pub edge_border_margin: u32,
    /// Horizontal distance between the two compared columns.
    pub edge_probe_offset: u32,
    /// Fixed row count for the sampler's border check. `None` uses the frame
    /// height; `Some(240)` reproduces the legacy controller bit for bit.
    pub sampler_height_bound: Option<u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            motion_sensitivity: 40,
            edge_sensitivity: 30,
            goal_color: GoalColorKey::default(),
            sample_stride: 2,
            dynamic_motion_threshold: 50,
            wall_edge_limit: 1,
            box_edge_limit: 8,
            edge_cooldown_columns: 30,
            edge_border_margin: 10,
            edge_probe_offset: 4,
            sampler_height_bound: None,
        }
    }
}

/// The analysis of one frame pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub label: Label,
    pub is_goal: bool,
    pub blob_center_x: u32,
    pub edge_count: u32,
    pub moving_pixels: u32,
    pub blob_extent: Option<(u32, u32)>,
}

impl PipelineResult {
    pub fn waiting() -> Self {
        Self {
            label: Label::Waiting,
            is_goal: false,
            blob_center_x: 0,
            edge_count: 0,
            moving_pixels: 0,
            blob_extent: None,
        }
    }
}

pub struct VisionPipeline {
    config: PipelineConfig,
    sampler: SmoothedSampler,
}

impl VisionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let sampler = SmoothedSampler::new(config.sampler_height_bound);
        Self { config, sampler }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs all three passes over a frame pair.
    ///
    /// Returns `Waiting` without scanning if either frame is missing, or if the
    /// two frames do not share a resolution and so cannot be compared.
    pub fn analyze(&self, current: Option<&Frame>, previous: Option<&Frame>) -> PipelineResult {
        let (current, previous) = match (current, previous) {
            (Some(current), Some(previous)) if current.dimensions() == previous.dimensions() => {
                (current, previous)
            }
            _ => return PipelineResult::waiting(),
        };
        let (width, height) = current.dimensions();

        // Pass 1: motion and color
        let motion = motion_scan::scan(current, previous, width, height, &self.config);

        // Pass 2: smoothed edges on the middle row
        let edge_count = edge_scan::scan(current, width, height, &self.sampler, &self.config);

        // Pass 3: classification
        let label = classifier::classify(motion.moving_pixels, edge_count, &self.config);

        PipelineResult {
            label,
            is_goal: motion.is_goal,
            blob_center_x: motion.blob_center_x,
            edge_count,
            moving_pixels: motion.moving_pixels,
            blob_extent: motion.blob_extent,
        }
    }
}

impl Default for VisionPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
