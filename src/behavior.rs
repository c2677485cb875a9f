// THEORY:
// The behavior layer is a four-state machine that decides what the wheels do and
// when the vision pipeline is worth running. The cyclic part is a patrol loop:
//
//   WANDER --(obstacle in range)--> INSPECT --(dwell, classify)--> AVOID --(dwell)--> WANDER
//
// STAY is a side state for stationary watching. It is entered from WANDER and left
// back to WANDER only by an external toggle; while in it the robot stops and runs
// the pipeline every few ticks as a heads-up display.
//
// Every state counts ticks in a dwell timer that resets on each transition. INSPECT
// waits out its dwell before sampling so the robot has come to rest and the image is
// stable. Dwell comparisons are strict, so a threshold of 20 fires on the 21st tick.

use crate::core_modules::classifier::{Label, apply_proximity_override};
use crate::core_modules::frame::FrameStore;
use crate::devices::{DriveCommand, raw_to_cm};
use crate::pipeline::{PipelineResult, VisionPipeline};
use log::{debug, info};
use std::fmt;

/// Tunables for the behavior loop.
#[derive(Debug, Clone)]
pub struct BehaviorConfig {
    /// Wheel speed while wandering, avoiding or driven manually.
    pub cruise_speed: f64,
    /// Motor limit of the platform. Commands are not clamped to it.
    pub max_speed: f64,
    /// Raw proximity reading (exclusive) that triggers an inspection.
    pub obstacle_threshold: f64,
    pub inspect_dwell_ticks: u32,
    pub avoid_dwell_ticks: u32,
    /// Ticks between heads-up analyses while in STAY.
    pub stay_dwell_ticks: u32,
    /// Distance under which a wall is reported as an unknown obstacle.
    pub close_range_cm: f64,
    /// Ticks the stay key must be held before the mode toggles.
    pub stay_press_ticks: u32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            cruise_speed: 3.0,
            max_speed: 6.28,
            obstacle_threshold: 60.0,
            inspect_dwell_ticks: 20,
            avoid_dwell_ticks: 30,
            stay_dwell_ticks: 10,
            close_range_cm: 8.0,
            stay_press_ticks: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BehaviorState {
    #[default]
    Wander,
    Inspect,
    Avoid,
    Stay,
}

/// Events that can move the machine between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    ObstacleDetected,
    InspectionComplete,
    AvoidanceComplete,
    StayToggled,
}

impl BehaviorState {
    /// The transition table. `None` means the trigger has no effect in this state.
    pub fn on(self, trigger: Trigger) -> Option<BehaviorState> {
        use BehaviorState::*;
        match (self, trigger) {
            (Wander, Trigger::ObstacleDetected) => Some(Inspect),
            (Inspect, Trigger::InspectionComplete) => Some(Avoid),
            (Avoid, Trigger::AvoidanceComplete) => Some(Wander),
            (Wander, Trigger::StayToggled) => Some(Stay),
            (Stay, Trigger::StayToggled) => Some(Wander),
            _ => None,
        }
    }
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BehaviorState::Wander => "WANDER",
            BehaviorState::Inspect => "INSPECT",
            BehaviorState::Avoid => "AVOID",
            BehaviorState::Stay => "STAY",
        };
        f.pad(name)
    }
}

/// Everything the machine remembers between ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct StateContext {
    pub state: BehaviorState,
    pub dwell_timer: u32,
    pub last_distance_cm: f64,
}

impl Default for StateContext {
    fn default() -> Self {
        Self {
            state: BehaviorState::Wander,
            dwell_timer: 0,
            last_distance_cm: crate::devices::OUT_OF_RANGE_CM,
        }
    }
}

/// What one automatic tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub command: DriveCommand,
    /// Present on ticks where the vision pipeline ran.
    pub analysis: Option<PipelineResult>,
    pub transition: Option<(BehaviorState, BehaviorState)>,
}

pub struct BehaviorStateMachine {
    config: BehaviorConfig,
    pipeline: VisionPipeline,
    context: StateContext,
}

impl BehaviorStateMachine {
    pub fn new(config: BehaviorConfig, pipeline: VisionPipeline) -> Self {
        Self {
            config,
            pipeline,
            context: StateContext::default(),
        }
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    pub fn context(&self) -> &StateContext {
        &self.context
    }

    pub fn state(&self) -> BehaviorState {
        self.context.state
    }

    /// Records the latest range reading without advancing the machine.
    pub fn observe_distance(&mut self, raw_distance: f64) {
        self.context.last_distance_cm = raw_to_cm(raw_distance);
    }

    /// Flips between STAY and WANDER. Returns `false` if the toggle was ignored
    /// because the patrol loop is busy inspecting or avoiding.
    pub fn toggle_stay(&mut self) -> bool {
        let from = self.context.state;
        if self.fire(Trigger::StayToggled).is_none() {
            debug!("Stay toggle ignored in {from}");
            return false;
        }
        match self.context.state {
            BehaviorState::Stay => info!(">>> STAY MODE ACTIVATED <<<"),
            _ => info!(">>> RESUMING PATROL <<<"),
        }
        true
    }

    /// Advances the machine by one tick.
    ///
    /// `raw_distance` is the larger of the two front proximity readings.
    pub fn tick(&mut self, raw_distance: f64, frames: &FrameStore) -> TickOutcome {
        self.observe_distance(raw_distance);
        self.context.dwell_timer += 1;

        let cruise = self.config.cruise_speed;
        let mut analysis = None;
        let mut transition = None;

        let command = match self.context.state {
            BehaviorState::Wander => {
                if raw_distance > self.config.obstacle_threshold {
                    info!(
                        "[!] Proximity Alert ({:.1} cm). Analyzing...",
                        self.context.last_distance_cm
                    );
                    transition = self.fire(Trigger::ObstacleDetected);
                }
                DriveCommand::forward(cruise)
            }
            BehaviorState::Inspect => {
                if self.context.dwell_timer > self.config.inspect_dwell_ticks {
                    let result = self.inspect(frames);
                    analysis = Some(result);
                    transition = self.fire(Trigger::InspectionComplete);
                }
                DriveCommand::STOP
            }
            BehaviorState::Avoid => {
                if self.context.dwell_timer > self.config.avoid_dwell_ticks {
                    transition = self.fire(Trigger::AvoidanceComplete);
                }
                DriveCommand::spin_right(cruise)
            }
            BehaviorState::Stay => {
                if self.context.dwell_timer > self.config.stay_dwell_ticks {
                    analysis = Some(self.watch(frames));
                    self.context.dwell_timer = 0;
                }
                DriveCommand::STOP
            }
        };

        TickOutcome {
            command,
            analysis,
            transition,
        }
    }

    fn fire(&mut self, trigger: Trigger) -> Option<(BehaviorState, BehaviorState)> {
        let from = self.context.state;
        let to = from.on(trigger)?;
        debug!("{from} -> {to} on {trigger:?}");
        self.context.state = to;
        self.context.dwell_timer = 0;
        Some((from, to))
    }

    fn inspect(&self, frames: &FrameStore) -> PipelineResult {
        let mut result = self.pipeline.analyze(frames.current(), frames.previous());
        result.label = apply_proximity_override(
            result.label,
            self.context.last_distance_cm,
            self.config.close_range_cm,
        );

        if result.label == Label::Wall {
            info!(
                ">> ANALYSIS: {} (Edges: {}) | Ignoring...",
                result.label, result.edge_count
            );
        } else {
            let goal_tag = if result.is_goal { " + [GOAL]" } else { "" };
            info!(
                ">> ANALYSIS: {}{} | Edges: {}",
                result.label, goal_tag, result.edge_count
            );
        }
        result
    }

    fn watch(&self, frames: &FrameStore) -> PipelineResult {
        let result = self.pipeline.analyze(frames.current(), frames.previous());
        let goal_tag = if result.is_goal { "[GOAL]" } else { "[    ]" };
        info!(
            "| HUD | {:22} | {:.1} cm | {} | Edges: {}",
            result.label, self.context.last_distance_cm, goal_tag, result.edge_count
        );
        result
    }
}
